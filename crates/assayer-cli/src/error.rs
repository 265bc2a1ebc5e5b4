use thiserror::Error;

use assayer_core::EnrichError;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("command error: {0}")]
    Command(String),

    #[error(transparent)]
    Enrich(#[from] EnrichError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Command(_) => 2,
            Self::Enrich(error) if error.is_validation() => 2,
            Self::Enrich(error) if error.is_not_found() => 3,
            Self::Enrich(_) => 6,
            Self::Serialization(_) => 4,
            Self::Io(_) => 10,
        }
    }
}
