/// A meter record that cannot be scored.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RecordError {
    #[error("record {record}: missing value for field '{field}'")]
    MissingField { record: String, field: &'static str },
    #[error("record {record}: invalid value '{value}' for field '{field}'")]
    InvalidField {
        record: String,
        field: &'static str,
        value: String,
    },
}

/// A threshold or selection parameter outside its valid domain.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("invalid configuration '{field}': {reason}")]
pub struct ConfigError {
    pub field: &'static str,
    pub reason: String,
}

impl ConfigError {
    pub(crate) fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}
