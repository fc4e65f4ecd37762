use std::sync::Arc;

use crate::db::SubmissionStore;
use crate::submission::extractor::FieldExtractor;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub store: Arc<dyn SubmissionStore>,
    pub extractor: FieldExtractor,
}
