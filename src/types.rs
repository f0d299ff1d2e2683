use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::Serialize;
use serde_json::{Number, Value};

/// Shown in place of an empty or missing warnings list.
pub const WARNINGS_PLACEHOLDER: &str = "\u{2014}";

/// JSON body posted to the vision endpoint, built fresh per image.
#[derive(Debug, Clone, Serialize)]
pub struct VisionRequest {
    pub mode: String,
    pub timeout_ms: u64,
    pub filename: String,
    pub image_base64: String,
}

/// `meta.parse_warnings` as the server may send it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ParseWarnings {
    #[default]
    Absent,
    Single(String),
    List(Vec<String>),
}

impl ParseWarnings {
    pub fn from_value(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) => ParseWarnings::Absent,
            Some(Value::String(s)) => ParseWarnings::Single(s.clone()),
            Some(Value::Array(items)) => ParseWarnings::List(
                items
                    .iter()
                    .map(|item| match item {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect(),
            ),
            Some(other) => ParseWarnings::Single(other.to_string()),
        }
    }

    /// Joins list entries with `"; "`, falling back to the placeholder when
    /// the result is empty.
    pub fn render(&self) -> String {
        let joined = match self {
            ParseWarnings::Absent => String::new(),
            ParseWarnings::Single(s) => s.clone(),
            ParseWarnings::List(items) => items.join("; "),
        };
        if joined.is_empty() {
            WARNINGS_PLACEHOLDER.to_string()
        } else {
            joined
        }
    }
}

/// The `meta` block of a vision response, loosely typed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResponseMeta {
    pub duration_ms: Option<Number>,
    pub backend: Option<String>,
    pub parse_warnings: ParseWarnings,
}

impl ResponseMeta {
    /// Best-effort extraction. Anything missing or mistyped degrades to absent.
    pub fn from_response(response: &Value) -> Self {
        let Some(meta) = response.get("meta").and_then(Value::as_object) else {
            return ResponseMeta::default();
        };

        let duration_ms = match meta.get("duration_ms") {
            Some(Value::Number(n)) => Some(n.clone()),
            _ => None,
        };

        let backend = match meta.get("backend") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
        };

        ResponseMeta {
            duration_ms,
            backend,
            parse_warnings: ParseWarnings::from_value(meta.get("parse_warnings")),
        }
    }
}

/// One measured request.
#[derive(Debug, Clone)]
pub struct TimingRow {
    pub image: String,
    pub started_at: DateTime<Utc>,
    pub request_seconds: f64,
    pub model_duration_ms: Option<Number>,
    pub backend: Option<String>,
    pub parse_warnings: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
    Table,
}
