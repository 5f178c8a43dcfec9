//! ResourceArc Wrappers
//!
//! Persistent parser state handed to Elixir between NIF calls.

use crate::profile::ProfileParser;
use rustler::ResourceArc;
use std::sync::Mutex;

/// Wrapper for ProfileParser that can be stored in a ResourceArc
///
/// The mutex serializes BEAM processes sharing one reference; a parser
/// still handles one document at a time.
pub struct ProfileParserResource {
    pub inner: Mutex<ProfileParser>,
}

impl ProfileParserResource {
    pub fn new(parser: ProfileParser) -> Self {
        ProfileParserResource {
            inner: Mutex::new(parser),
        }
    }

    /// Run `f` with exclusive access to the parser.
    ///
    /// # Errors
    ///
    /// Returns `"mutex_poisoned"` if a previous holder panicked.
    pub fn with_parser<F, R>(&self, f: F) -> Result<R, &'static str>
    where
        F: FnOnce(&mut ProfileParser) -> R,
    {
        let mut guard = self.inner.lock().map_err(|_| "mutex_poisoned")?;
        Ok(f(&mut guard))
    }
}

#[rustler::resource_impl]
impl rustler::Resource for ProfileParserResource {}

impl Default for ProfileParserResource {
    fn default() -> Self {
        Self::new(ProfileParser::new())
    }
}

/// Type alias for the ResourceArc
pub type ProfileParserRef = ResourceArc<ProfileParserResource>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_parser_runs_lifecycle() {
        let resource = ProfileParserResource::default();

        let parsed = resource
            .with_parser(|p| {
                p.initialize(b"<root><user id=\"u1\"/></root>".to_vec()).unwrap();
                p.parse().map(|results| results.len())
            })
            .unwrap();
        assert_eq!(parsed.unwrap(), 1);

        let id = resource
            .with_parser(|p| p.results().map(|r| r.users()[0].id().to_string()))
            .unwrap();
        assert_eq!(id.unwrap(), "u1");
    }
}
