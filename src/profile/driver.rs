//! Parse driver
//!
//! Owns the receiver stack and the parse context for one document at a
//! time. Tokenizer events arrive through `SaxHandler`; every open event
//! pushes exactly one frame and every close pops one, so stack depth
//! mirrors element depth.

use super::model::ResultSet;
use super::receiver::{transition, Frame, ParseContext, Receiver};
use crate::config::ParserOptions;
use crate::error::{Error, Result};
use crate::reader::buffered::open_file;
use crate::reader::StartElement;
use crate::sax::{self, SaxHandler};
use log::{debug, trace};
use std::borrow::Cow;
use std::path::{Path, PathBuf};

/// Where a document comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

impl InputSource {
    fn label(&self) -> Cow<'_, str> {
        match self {
            InputSource::Path(path) => path.to_string_lossy(),
            InputSource::Bytes(bytes) => Cow::Owned(format!("<{} bytes in memory>", bytes.len())),
        }
    }

    fn load(&self, capacity: usize) -> Result<Cow<'_, [u8]>> {
        match self {
            InputSource::Path(path) => open_file(path, capacity)
                .map(Cow::Owned)
                .map_err(|source| Error::Io {
                    path: path.clone(),
                    source,
                }),
            InputSource::Bytes(bytes) => Ok(Cow::Borrowed(bytes)),
        }
    }
}

impl From<PathBuf> for InputSource {
    fn from(path: PathBuf) -> Self {
        InputSource::Path(path)
    }
}

impl From<&Path> for InputSource {
    fn from(path: &Path) -> Self {
        InputSource::Path(path.to_path_buf())
    }
}

impl From<&str> for InputSource {
    fn from(path: &str) -> Self {
        InputSource::Path(PathBuf::from(path))
    }
}

impl From<Vec<u8>> for InputSource {
    fn from(bytes: Vec<u8>) -> Self {
        InputSource::Bytes(bytes)
    }
}

/// Stack-driven profile parser
///
/// Lifecycle: `initialize` → `parse` → `results` (→ `finish`). A parser
/// handles one document at a time; `parse` resets all working state, so
/// an instance may be reused sequentially.
#[derive(Debug, Default)]
pub struct ProfileParser {
    options: ParserOptions,
    source: Option<InputSource>,
    stack: Vec<Frame>,
    ctx: ParseContext,
    results: Option<ResultSet>,
}

impl ProfileParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ParserOptions) -> Self {
        ProfileParser {
            options,
            ..Self::default()
        }
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// Validate options, remember the source and clear the stack
    pub fn initialize(&mut self, source: impl Into<InputSource>) -> Result<()> {
        self.options.validate()?;
        self.source = Some(source.into());
        self.reset();
        Ok(())
    }

    /// Read the initialized source and build its `ResultSet`
    pub fn parse(&mut self) -> Result<&ResultSet> {
        let source = self.source.take().ok_or(Error::NotInitialized)?;
        let outcome = self.parse_source(&source).map(|_| ());
        self.source = Some(source);
        outcome?;
        self.results()
    }

    fn parse_source(&mut self, source: &InputSource) -> Result<&ResultSet> {
        let label = source.label();
        debug!("parsing profiles from {}", label);

        let input = match source.load(self.options.buffer_capacity) {
            Ok(input) => input,
            Err(err) => {
                self.reset();
                debug!("cannot read {}: {}", label, err);
                return Err(err);
            }
        };
        let results = self.parse_slice(&input)?;
        debug!("parsed {} users from {}", results.len(), label);
        Ok(results)
    }

    /// Parse an in-memory document directly, bypassing `initialize`
    pub fn parse_slice(&mut self, input: &[u8]) -> Result<&ResultSet> {
        self.reset();
        self.stack.push(Frame {
            handled_by: Receiver::DocumentStart,
            active: Receiver::DocumentStart,
        });

        if let Err(err) = sax::drive(input, self) {
            debug!("parse failed ({}): {}", err.kind(), err);
            self.reset();
            return Err(err);
        }
        self.results()
    }

    /// Teardown hook; the parser holds no external resources
    pub fn finish(&mut self) {
        trace!("finish: {} frames left on the stack", self.stack.len());
    }

    /// Results of the last successful parse
    pub fn results(&self) -> Result<&ResultSet> {
        self.results.as_ref().ok_or(Error::NotParsed)
    }

    pub fn into_results(self) -> Result<ResultSet> {
        self.results.ok_or(Error::NotParsed)
    }

    /// Current receiver stack depth (one frame per open element, plus the base)
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    fn reset(&mut self) {
        self.stack.clear();
        self.ctx = ParseContext::new();
        self.results = None;
    }

    fn top(&self) -> Receiver {
        self.stack
            .last()
            .map_or(Receiver::DocumentStart, |frame| frame.active)
    }
}

impl SaxHandler for ProfileParser {
    type Error = Error;

    fn start_element(&mut self, element: &StartElement<'_>) -> Result<()> {
        let frame = transition(self.top(), element, &mut self.ctx, self.options.unknown_elements)?;
        self.stack.push(frame);
        Ok(())
    }

    fn end_element(&mut self, name: &str) -> Result<()> {
        if let Some(frame) = self.stack.pop() {
            trace!("</{}> finishes {:?}", name, frame.handled_by);
            frame.handled_by.finish_process_data(name, &mut self.ctx);
        }
        Ok(())
    }

    fn characters(&mut self, text: &str) -> Result<()> {
        let text = text.trim();
        if !text.is_empty() {
            trace!("character data under {:?}: {:?}", self.top(), text);
        }
        Ok(())
    }

    fn end_document(&mut self) -> Result<()> {
        let ctx = std::mem::take(&mut self.ctx);
        self.results = Some(ctx.into_results().ok_or(Error::NotParsed)?);
        Ok(())
    }
}

/// Parse an in-memory profile document with default options
pub fn parse_profiles(input: &[u8]) -> Result<ResultSet> {
    let mut parser = ProfileParser::new();
    parser.parse_slice(input)?;
    parser.into_results()
}

/// Parse a profile file with default options
pub fn parse_profiles_file(path: impl AsRef<Path>) -> Result<ResultSet> {
    parse_profiles_file_with(path, ParserOptions::default())
}

pub fn parse_profiles_file_with(path: impl AsRef<Path>, options: ParserOptions) -> Result<ResultSet> {
    let mut parser = ProfileParser::with_options(options);
    parser.initialize(path.as_ref())?;
    parser.parse()?;
    parser.finish();
    parser.into_results()
}
