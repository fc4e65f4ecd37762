pub mod submission;

pub use submission::{NormalizedSubmission, StoredSubmission};
