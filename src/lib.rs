//! ProfileXML - Streaming parser for user/lesson/concept profile documents
//!
//! Layers, bottom up:
//! - core: scanner, tokenizer, entity and attribute decoding
//! - reader: well-formedness checking event reader, file input
//! - sax: push callbacks over the reader
//! - profile: receiver state machine building the `ResultSet`
//! - batch: parallel parsing of many files
//!
//! The same operations are exported to Elixir as `ProfileXML.Native`.

use rustler::{Binary, Encoder, Env, NifResult, ResourceArc, Term};

pub mod batch;
pub mod config;
pub mod core;
pub mod error;
pub mod profile;
pub mod reader;
mod resource;
pub mod sax;
mod term;

pub use config::{ParserOptions, UnknownElements};
pub use error::{Error, Result};
pub use profile::{InputSource, LessonRecord, ProfileParser, ResultSet, UserRecord, MISSING_SCORE};

use resource::{ProfileParserRef, ProfileParserResource};

// ============================================================================
// Allocator Configuration
// ============================================================================

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

// ============================================================================
// One-shot Parsing
// ============================================================================

/// Parse a profile document held in a binary
#[rustler::nif]
fn parse_profiles<'a>(env: Env<'a>, input: Binary<'a>) -> NifResult<Term<'a>> {
    let outcome = profile::parse_profiles(input.as_slice());
    term::outcome_to_term(env, &outcome)
}

/// Parse a profile document from disk
#[rustler::nif(schedule = "DirtyIo")]
fn parse_profiles_file<'a>(env: Env<'a>, path: String) -> NifResult<Term<'a>> {
    let outcome = profile::parse_profiles_file(&path);
    term::outcome_to_term(env, &outcome)
}

/// Parse many files in parallel; one `{:ok, users} | {:error, reason}` per path
#[rustler::nif(schedule = "DirtyCpu")]
fn parse_profiles_files<'a>(env: Env<'a>, paths: Vec<String>) -> NifResult<Term<'a>> {
    let outcomes = batch::parse_files(&paths, &ParserOptions::default());

    let mut list = Term::list_new_empty(env);
    for outcome in outcomes.iter().rev() {
        list = list.list_prepend(term::outcome_to_term(env, outcome)?);
    }
    Ok(list)
}

// ============================================================================
// Parser Lifecycle (initialize / parse / results)
// ============================================================================

/// Create and initialize a parser for `path`
#[rustler::nif]
fn parser_new<'a>(env: Env<'a>, path: String, skip_unknown: bool) -> NifResult<Term<'a>> {
    let mut options = ParserOptions::default();
    if skip_unknown {
        options = options.skip_unknown();
    }

    let mut parser = ProfileParser::with_options(options);
    match parser.initialize(path.as_str()) {
        Ok(()) => {
            let arc = ResourceArc::new(ProfileParserResource::new(parser));
            Ok((term::ok(), arc).encode(env))
        }
        Err(err) => Ok(term::error_to_term(env, &err)),
    }
}

/// Run the parse; returns `{:ok, user_count}` or `{:error, reason}`
#[rustler::nif(schedule = "DirtyIo")]
fn parser_parse<'a>(env: Env<'a>, parser: ProfileParserRef) -> NifResult<Term<'a>> {
    let result = parser.with_parser(|p| {
        let outcome = p.parse().map(|results| results.len());
        p.finish();
        match outcome {
            Ok(count) => (term::ok(), count).encode(env),
            Err(err) => term::error_to_term(env, &err),
        }
    });

    match result {
        Ok(term) => Ok(term),
        Err(e) => Ok((term::error(), e).encode(env)),
    }
}

/// Results of the last successful parse
#[rustler::nif]
fn parser_results<'a>(env: Env<'a>, parser: ProfileParserRef) -> NifResult<Term<'a>> {
    let result = parser.with_parser(|p| match p.results() {
        Ok(results) => term::results_to_term(env, results),
        Err(err) => Ok(term::error_to_term(env, &err)),
    });

    match result {
        Ok(term) => term,
        Err(e) => Ok((term::error(), e).encode(env)),
    }
}

// ============================================================================
// NIF Initialization
// ============================================================================

// Resources register themselves through `#[rustler::resource_impl]`
rustler::init!("Elixir.ProfileXML.Native");
