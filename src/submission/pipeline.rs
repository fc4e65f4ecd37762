use serde_json::Value;

use crate::db::SubmissionStore;
use crate::error::AppError;
use crate::models::NormalizedSubmission;

use super::extractor::{FieldExtractor, Shape};
use super::validator;

pub struct PipelineResult {
    pub submission: NormalizedSubmission,
    pub shape: Shape,
}

/// Extract, validate and persist one webhook payload.
///
/// Incomplete candidates never reach the store; a store failure is terminal
/// for the request.
pub async fn run(
    extractor: &FieldExtractor,
    store: &dyn SubmissionStore,
    raw: Value,
) -> Result<PipelineResult, AppError> {
    let extraction = extractor.extract(&raw);

    if let Some(issue) = &extraction.issue {
        tracing::warn!(shape = ?extraction.shape, "Extraction degraded: {issue}");
    }
    tracing::debug!(shape = ?extraction.shape, candidate = ?extraction.candidate, "Payload extracted");

    let submission = validator::validate(extraction.candidate.clone()).map_err(|missing| {
        tracing::info!(
            shape = ?extraction.shape,
            missing = ?missing.missing(),
            "Rejecting incomplete submission"
        );
        AppError::Incomplete {
            received: extraction.candidate,
            missing,
        }
    })?;

    let stored = store.insert(&submission).await.map_err(|e| {
        tracing::error!(shape = ?extraction.shape, "Failed to store submission: {e}");
        AppError::Store(e)
    })?;

    tracing::info!(id = %stored.id, shape = ?extraction.shape, "Submission stored");

    Ok(PipelineResult {
        submission,
        shape: extraction.shape,
    })
}
