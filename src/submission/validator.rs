use serde::Serialize;

use crate::models::NormalizedSubmission;

use super::extractor::SemanticField;

/// Fields that must be non-empty before a submission may be stored.
pub const REQUIRED_FIELDS: [SemanticField; 4] = SemanticField::ALL;

/// Per-field missing report. Always covers every field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldErrorSet {
    pub name: bool,
    pub email: bool,
    pub message: bool,
    pub submitted_at: bool,
}

impl FieldErrorSet {
    pub fn is_empty(&self) -> bool {
        !(self.name || self.email || self.message || self.submitted_at)
    }

    pub fn missing(&self) -> Vec<SemanticField> {
        SemanticField::ALL
            .into_iter()
            .filter(|f| self.flag(*f))
            .collect()
    }

    fn flag(&self, field: SemanticField) -> bool {
        match field {
            SemanticField::Name => self.name,
            SemanticField::Email => self.email,
            SemanticField::Message => self.message,
            SemanticField::SubmittedAt => self.submitted_at,
        }
    }

    fn set(&mut self, field: SemanticField) {
        match field {
            SemanticField::Name => self.name = true,
            SemanticField::Email => self.email = true,
            SemanticField::Message => self.message = true,
            SemanticField::SubmittedAt => self.submitted_at = true,
        }
    }
}

fn value_of(candidate: &NormalizedSubmission, field: SemanticField) -> &str {
    match field {
        SemanticField::Name => &candidate.name,
        SemanticField::Email => &candidate.email,
        SemanticField::Message => &candidate.message,
        SemanticField::SubmittedAt => &candidate.submitted_at,
    }
}

/// Check that every required field is present and non-blank.
pub fn validate(candidate: NormalizedSubmission) -> Result<NormalizedSubmission, FieldErrorSet> {
    let mut errors = FieldErrorSet::default();
    for field in REQUIRED_FIELDS {
        if value_of(&candidate, field).trim().is_empty() {
            errors.set(field);
        }
    }

    if errors.is_empty() {
        Ok(candidate)
    } else {
        Err(errors)
    }
}
