pub mod submissions;

pub use submissions::{PgSubmissionStore, SubmissionStore};
