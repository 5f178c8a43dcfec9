//! Parser options

use crate::error::{Error, Result};
use crate::reader::buffered::DEFAULT_BUFFER_SIZE;

/// What to do with an element the profile schema does not name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownElements {
    /// Fail with `Error::UnexpectedElement`
    #[default]
    Reject,
    /// Ignore the element and everything inside it
    Skip,
}

/// Tunables for a `ProfileParser`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserOptions {
    pub unknown_elements: UnknownElements,
    /// Read buffer size for file input
    pub buffer_capacity: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        ParserOptions {
            unknown_elements: UnknownElements::Reject,
            buffer_capacity: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl ParserOptions {
    pub fn skip_unknown(mut self) -> Self {
        self.unknown_elements = UnknownElements::Skip;
        self
    }

    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }

    /// Reject option combinations the parser cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.buffer_capacity == 0 {
            return Err(Error::Setup("buffer_capacity must be greater than zero".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = ParserOptions::default();
        assert_eq!(opts.unknown_elements, UnknownElements::Reject);
        assert_eq!(opts.buffer_capacity, DEFAULT_BUFFER_SIZE);
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn test_builders() {
        let opts = ParserOptions::default().skip_unknown().with_buffer_capacity(64);
        assert_eq!(opts.unknown_elements, UnknownElements::Skip);
        assert_eq!(opts.buffer_capacity, 64);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let err = ParserOptions::default().with_buffer_capacity(0).validate().unwrap_err();
        assert!(matches!(err, Error::Setup(_)));
    }
}
