use std::sync::LazyLock;

use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::models::NormalizedSubmission;

/// `q<digits>_<suffix>`, the positional identifiers form builders generate.
static KEYED_IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^q\d+_([A-Za-z][A-Za-z0-9_]*)$").expect("valid keyed identifier pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SemanticField {
    Name,
    Email,
    Message,
    SubmittedAt,
}

impl SemanticField {
    pub const ALL: [SemanticField; 4] = [
        SemanticField::Name,
        SemanticField::Email,
        SemanticField::Message,
        SemanticField::SubmittedAt,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "name" => Some(SemanticField::Name),
            "email" => Some(SemanticField::Email),
            "message" => Some(SemanticField::Message),
            "submittedAt" | "submitted_at" => Some(SemanticField::SubmittedAt),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SemanticField::Name => "name",
            SemanticField::Email => "email",
            SemanticField::Message => "message",
            SemanticField::SubmittedAt => "submittedAt",
        }
    }
}

/// Field-name tables used to recognise sender payloads.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractorConfig {
    /// Literal key names accepted for each semantic field, in priority order.
    pub aliases: Vec<(SemanticField, Vec<String>)>,
    /// Exact positional identifiers, e.g. `q3_nombre -> name`.
    pub keyed_fields: Vec<(String, SemanticField)>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        let names = |names: &[&str]| names.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        Self {
            aliases: vec![
                (SemanticField::Name, names(&["name", "nombre"])),
                (SemanticField::Email, names(&["email", "correo"])),
                (SemanticField::Message, names(&["message", "mensaje"])),
                (
                    SemanticField::SubmittedAt,
                    names(&["submittedAt", "submitted_at", "fecha", "date"]),
                ),
            ],
            keyed_fields: vec![
                ("q3_nombre".to_string(), SemanticField::Name),
                ("q4_email".to_string(), SemanticField::Email),
                ("q5_mensaje".to_string(), SemanticField::Message),
                ("q6_fecha".to_string(), SemanticField::SubmittedAt),
            ],
        }
    }
}

/// The payload shape that produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    Direct,
    WrappedRaw,
    SubmissionWrapper,
    KeyedFields,
    FieldArray,
    Fallback,
}

/// Non-fatal problem met while extracting. The candidate is empty when set.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExtractionIssue {
    #[error("rawRequest could not be decoded: {0}")]
    MalformedRawRequest(String),
}

#[derive(Debug, Clone)]
pub struct Extraction {
    pub candidate: NormalizedSubmission,
    pub shape: Shape,
    pub issue: Option<ExtractionIssue>,
}

/// Per-field lookup result. `None` means the key was absent, `Some("")` that
/// it was present but empty.
#[derive(Debug, Default, Clone)]
struct PartialRecord {
    name: Option<String>,
    email: Option<String>,
    message: Option<String>,
    submitted_at: Option<String>,
}

impl PartialRecord {
    fn slot(&mut self, field: SemanticField) -> &mut Option<String> {
        match field {
            SemanticField::Name => &mut self.name,
            SemanticField::Email => &mut self.email,
            SemanticField::Message => &mut self.message,
            SemanticField::SubmittedAt => &mut self.submitted_at,
        }
    }

    /// Record a value, keeping an earlier non-empty one.
    fn offer(&mut self, field: SemanticField, value: String) {
        let slot = self.slot(field);
        if slot.as_deref().is_some_and(|s| !s.is_empty()) {
            return;
        }
        *slot = Some(value);
    }

    /// Fill slots this record left absent or empty from `other`.
    fn fill_from(&mut self, other: PartialRecord) {
        let values = [other.name, other.email, other.message, other.submitted_at];
        for (field, value) in SemanticField::ALL.into_iter().zip(values) {
            if let Some(value) = value {
                self.offer(field, value);
            }
        }
    }

    fn is_complete(&self) -> bool {
        [&self.name, &self.email, &self.message, &self.submitted_at]
            .iter()
            .all(|v| v.as_deref().is_some_and(|s| !s.is_empty()))
    }

    fn finish(self, now: DateTime<Utc>) -> NormalizedSubmission {
        NormalizedSubmission {
            name: self.name.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            message: self.message.unwrap_or_default(),
            submitted_at: self
                .submitted_at
                .unwrap_or_else(|| now.to_rfc3339_opts(SecondsFormat::Secs, true)),
        }
    }
}

/// Turns arbitrarily shaped webhook payloads into a [`NormalizedSubmission`].
#[derive(Debug, Clone, Default)]
pub struct FieldExtractor {
    config: ExtractorConfig,
}

impl FieldExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    pub fn extract(&self, raw: &Value) -> Extraction {
        self.extract_at(raw, Utc::now())
    }

    /// Like [`extract`](Self::extract) with an explicit processing time, used
    /// when the payload carries no date.
    pub fn extract_at(&self, raw: &Value, now: DateTime<Utc>) -> Extraction {
        let (partial, shape, issue) = match raw {
            Value::Object(obj) => self.match_object(obj),
            Value::Array(items) => {
                let folded = fold_field_array(items);
                let (partial, _, issue) = self.match_object(&folded);
                (partial, Shape::FieldArray, issue)
            }
            _ => (PartialRecord::default(), Shape::Fallback, None),
        };

        let candidate = if issue.is_some() {
            NormalizedSubmission::default()
        } else {
            partial.finish(now)
        };

        Extraction {
            candidate,
            shape,
            issue,
        }
    }

    fn match_object(&self, obj: &Map<String, Value>) -> (PartialRecord, Shape, Option<ExtractionIssue>) {
        let direct = self.lookup_direct(obj);
        if direct.is_complete() {
            return (direct, Shape::Direct, None);
        }

        if let Some(wrapped) = obj.get("rawRequest").filter(|v| !v.is_null()) {
            return match self.unwrap_raw_request(wrapped) {
                Ok(partial) => (partial, Shape::WrappedRaw, None),
                Err(issue) => (PartialRecord::default(), Shape::WrappedRaw, Some(issue)),
            };
        }

        for key in ["formData", "submission"] {
            if let Some(Value::Object(inner)) = obj.get(key) {
                return (self.resolve_inner(inner), Shape::SubmissionWrapper, None);
            }
        }

        if let Some(mut keyed) = self.lookup_keyed(obj) {
            keyed.fill_from(direct);
            return (keyed, Shape::KeyedFields, None);
        }

        (direct, Shape::Fallback, None)
    }

    fn unwrap_raw_request(&self, wrapped: &Value) -> Result<PartialRecord, ExtractionIssue> {
        match wrapped {
            Value::Object(inner) => Ok(self.resolve_inner(inner)),
            Value::String(encoded) => match serde_json::from_str::<Value>(encoded) {
                Ok(Value::Object(inner)) => Ok(self.resolve_inner(&inner)),
                Ok(_) => Err(ExtractionIssue::MalformedRawRequest(
                    "decoded value is not a mapping".to_string(),
                )),
                Err(e) => Err(ExtractionIssue::MalformedRawRequest(e.to_string())),
            },
            _ => Err(ExtractionIssue::MalformedRawRequest(
                "expected a mapping or an encoded mapping".to_string(),
            )),
        }
    }

    /// Resolution used for mappings found inside a wrapper.
    fn resolve_inner(&self, inner: &Map<String, Value>) -> PartialRecord {
        let direct = self.lookup_direct(inner);
        if direct.is_complete() {
            return direct;
        }
        match self.lookup_keyed(inner) {
            Some(mut keyed) => {
                keyed.fill_from(direct);
                keyed
            }
            None => direct,
        }
    }

    fn lookup_direct(&self, obj: &Map<String, Value>) -> PartialRecord {
        let mut partial = PartialRecord::default();
        for (field, names) in &self.config.aliases {
            for name in names {
                if let Some(value) = obj.get(name) {
                    partial.offer(*field, render(value));
                }
            }
        }
        partial
    }

    /// Returns `None` when no key in `obj` is a recognised identifier.
    fn lookup_keyed(&self, obj: &Map<String, Value>) -> Option<PartialRecord> {
        let mut partial = PartialRecord::default();
        let mut recognised = false;
        for (key, value) in obj {
            if let Some(field) = self.keyed_field(key) {
                partial.offer(field, render(value));
                recognised = true;
            }
        }
        recognised.then_some(partial)
    }

    fn keyed_field(&self, key: &str) -> Option<SemanticField> {
        if let Some((_, field)) = self.config.keyed_fields.iter().find(|(k, _)| k == key) {
            return Some(*field);
        }

        let suffix = KEYED_IDENTIFIER.captures(key)?.get(1)?.as_str();
        self.config
            .aliases
            .iter()
            .find(|(_, names)| names.iter().any(|n| n.eq_ignore_ascii_case(suffix)))
            .map(|(field, _)| *field)
    }
}

/// Fold `[{fieldName, value}, ...]` into a single mapping keyed by fieldName.
fn fold_field_array(items: &[Value]) -> Map<String, Value> {
    let mut folded = Map::new();
    for item in items {
        let Some(entry) = item.as_object() else {
            continue;
        };
        let Some(name) = entry
            .get("fieldName")
            .or_else(|| entry.get("name"))
            .and_then(|n| n.as_str())
        else {
            continue;
        };
        let value = entry.get("value").cloned().unwrap_or(Value::Null);
        folded.insert(name.to_string(), value);
    }
    folded
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Object(parts) => render_structured_date(parts).unwrap_or_default(),
        Value::Null | Value::Array(_) => String::new(),
    }
}

/// `{year, month, day}` -> `YYYY-MM-DD`.
fn render_structured_date(parts: &Map<String, Value>) -> Option<String> {
    let part = |key: &str, width: usize| -> Option<String> {
        let raw = render(parts.get(key)?);
        if raw.is_empty() {
            return None;
        }
        if raw.chars().all(|c| c.is_ascii_digit()) {
            Some(format!("{raw:0>width$}"))
        } else {
            Some(raw)
        }
    };

    let year = part("year", 4)?;
    let month = part("month", 2)?;
    let day = part("day", 2)?;
    Some(format!("{year}-{month}-{day}"))
}
