//! Configuration errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("no section '{0}'")]
    MissingSection(String),

    #[error("no option '{option}' in section '{section}'")]
    MissingOption { section: String, option: String },

    #[error("invalid {kind} value '{value}'")]
    InvalidNumber { value: String, kind: &'static str },

    #[error("cannot read configuration: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        ConfigError::Parse { line, message: message.into() }
    }
}
