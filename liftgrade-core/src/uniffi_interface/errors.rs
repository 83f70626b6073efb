use thiserror::Error as ThisError;
use uniffi::Error;

/// Errors surfaced to the foreign-language side.
#[derive(Debug, ThisError, Error)]
#[non_exhaustive]
pub enum LiftgradeError {
    /// Opening or migrating the database failed, or it was never set up.
    #[error("database: {0}")]
    Database(String),
    /// The adaptation settings JSON could not be parsed.
    #[error("adaptation config: {0}")]
    Config(String),
    #[error("error: {0}")]
    Common(String),
}

impl LiftgradeError {
    pub fn database(e: impl std::fmt::Display) -> Self {
        LiftgradeError::Database(e.to_string())
    }
}

impl From<anyhow::Error> for LiftgradeError {
    fn from(e: anyhow::Error) -> Self {
        LiftgradeError::Common(format!("{:#}", e))
    }
}
