use thiserror::Error;

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("no student with id {0}")]
    NotFound(String),

    #[error("duplicate record id {0}")]
    DuplicateId(String),

    #[error("invalid record {id}: {reason}")]
    InvalidRecord { id: String, reason: String },
}

impl RosterError {
    pub(crate) fn invalid(id: &str, reason: impl Into<String>) -> Self {
        RosterError::InvalidRecord {
            id: id.to_string(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification receiver has been dropped")]
    Closed,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid cutoff {value:?}, expected HH:MM or HH:MM:SS")]
    InvalidCutoff { value: String },
}
