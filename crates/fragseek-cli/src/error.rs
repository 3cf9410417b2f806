use fragseek::engine::error::EngineError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse file '{path}': {source}", path = path.display())]
    FileParsing {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid argument: {0}")]
    Argument(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CliError {
    /// Maps fatal precondition failures to distinct process exit codes,
    /// so scripted callers can tell them apart.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Engine(EngineError::DatabaseTooSmall { .. }) => 2,
            CliError::Engine(EngineError::StemCount { .. }) => 3,
            CliError::Engine(EngineError::StemNotFound { .. }) => 4,
            CliError::Engine(EngineError::MissingAtom { .. }) => 5,
            CliError::FileParsing { .. } => 6,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_distinguish_precondition_failures() {
        let err = CliError::Engine(EngineError::DatabaseTooSmall { size: 0 });
        assert_eq!(err.exit_code(), 2);
        let err = CliError::Engine(EngineError::StemCount {
            expected: "exactly 3",
            actual: 2,
        });
        assert_eq!(err.exit_code(), 3);
        let err = CliError::Argument("bad".to_string());
        assert_eq!(err.exit_code(), 1);
    }
}
