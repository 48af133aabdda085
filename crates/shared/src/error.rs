use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Field name to the messages reported for it, in field order.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Timeout,
    Transport,
    Validation,
    Rejected,
    NotFound,
    Decode,
}

/// Body the API sends with a non-2xx status or a `success: false` envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub errors: FieldErrors,
}

impl ApiErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn with_field_error(mut self, field: impl Into<String>, message: impl Into<String>) -> Self {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
        self
    }

    pub fn field_error(&self, field: &str) -> Option<&str> {
        self.errors
            .get(field)
            .and_then(|messages| messages.first())
            .map(String::as_str)
    }

    /// Top-level message, falling back to the legacy `error` key.
    pub fn summary(&self) -> Option<&str> {
        let non_blank = |text: &&str| !text.trim().is_empty();
        self.message
            .as_deref()
            .filter(non_blank)
            .or_else(|| self.error.as_deref().filter(non_blank))
    }
}
