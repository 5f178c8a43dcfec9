//! Crate error type

use crate::core::tokenizer::ParseError;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can stop a profile parse
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Options rejected before any input is touched
    #[error("Parser setup failed: {0}")]
    Setup(String),

    #[error("Parser used before initialize()")]
    NotInitialized,

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The input is not well-formed XML
    #[error("Malformed document: {0}")]
    Malformed(#[from] ParseError),

    /// A known element in the wrong place, or an unknown element under `UnknownElements::Reject`
    #[error("Unexpected <{element}> while {state}")]
    UnexpectedElement { element: String, state: &'static str },

    #[error("<{element}> is missing attribute #{index}")]
    MissingAttribute { element: String, index: usize },

    #[error("Concept '{concept}' has a non-numeric score '{value}'")]
    InvalidScore { concept: String, value: String },

    /// No successful parse has produced results
    #[error("No parse results available")]
    NotParsed,
}

impl Error {
    /// Short machine-readable category of the error
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Setup(_) => "setup",
            Error::NotInitialized => "not_initialized",
            Error::Io { .. } => "io",
            Error::Malformed(_) => "malformed",
            Error::UnexpectedElement { .. } => "unexpected_element",
            Error::MissingAttribute { .. } => "missing_attribute",
            Error::InvalidScore { .. } => "invalid_score",
            Error::NotParsed => "not_parsed",
        }
    }
}
