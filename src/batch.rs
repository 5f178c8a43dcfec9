//! Parallel Batch Parsing
//!
//! Uses Rayon to parse independent profile files concurrently. Every file
//! gets its own `ProfileParser`, so no parse state is shared between threads.

use crate::config::ParserOptions;
use crate::error::Result;
use crate::profile::{parse_profiles_file_with, ResultSet};
use rayon::prelude::*;
use std::path::PathBuf;

/// Parse every path, returning one result per path in input order
pub fn parse_files<P>(paths: &[P], options: &ParserOptions) -> Vec<Result<ResultSet>>
where
    P: Into<PathBuf> + Clone + Sync,
{
    paths
        .par_iter()
        .map(|path| parse_profiles_file_with(path.clone().into(), options.clone()))
        .collect()
}
