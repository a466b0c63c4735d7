//! Domain error types.

/// Top-level error type for tradejournal.
#[derive(Debug, thiserror::Error)]
pub enum JournalError {
    #[error("storage error: {reason}")]
    Storage { reason: String },

    #[error("serialization error: {reason}")]
    Serialization { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("csv error: {reason}")]
    Csv { reason: String },

    #[error("no trade with id {id}")]
    TradeNotFound { id: String },
}

impl JournalError {
    pub fn validation(field: &str, reason: impl Into<String>) -> Self {
        JournalError::Validation {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for JournalError {
    fn from(err: serde_json::Error) -> Self {
        JournalError::Serialization {
            reason: err.to_string(),
        }
    }
}

impl From<csv::Error> for JournalError {
    fn from(err: csv::Error) -> Self {
        JournalError::Csv {
            reason: err.to_string(),
        }
    }
}

impl JournalError {
    /// Process exit status reported for this error category.
    pub fn exit_status(&self) -> u8 {
        match self {
            JournalError::ConfigParse { .. }
            | JournalError::ConfigMissing { .. }
            | JournalError::ConfigInvalid { .. } => 2,
            JournalError::Storage { .. } | JournalError::Serialization { .. } => 3,
            JournalError::Validation { .. } => 4,
            JournalError::Csv { .. } => 5,
            JournalError::TradeNotFound { .. } => 6,
        }
    }
}

impl From<&JournalError> for std::process::ExitCode {
    fn from(err: &JournalError) -> Self {
        std::process::ExitCode::from(err.exit_status())
    }
}
