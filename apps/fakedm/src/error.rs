//! CLI error handling

use std::fmt;

use fakedm_errors::UserFacingError;

/// CLI-specific error type
#[derive(Debug)]
pub enum CliError {
    /// Server or configuration error
    Server(fakedm_errors::Error),
    /// I/O error
    Io(std::io::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Server(e) => {
                let message = e.user_message();
                write!(f, "{message}")?;
                if let Some(code) = e.user_code() {
                    write!(f, "\n  Code: {code}")?;
                }
                if let Some(hint) = e.user_hint() {
                    write!(f, "\n  Hint: {hint}")?;
                }
                Ok(())
            }
            CliError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Server(e) => Some(e),
            CliError::Io(e) => Some(e),
        }
    }
}

impl From<fakedm_errors::Error> for CliError {
    fn from(e: fakedm_errors::Error) -> Self {
        CliError::Server(e)
    }
}

impl From<fakedm_errors::ConfigError> for CliError {
    fn from(e: fakedm_errors::ConfigError) -> Self {
        CliError::Server(e.into())
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}
