use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Canonical four-field record derived from an inbound payload.
///
/// Missing fields are represented as empty strings; a record only reaches the
/// store once every field is non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedSubmission {
    pub name: String,
    pub email: String,
    pub message: String,
    pub submitted_at: String,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct StoredSubmission {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub message: String,
    pub submitted_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}
