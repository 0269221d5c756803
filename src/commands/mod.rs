//! Subcommand handlers for the `bf` binary.
//!
//! Each handler returns the process exit code: 0 on success (including a
//! user interrupt), 1 on a failed run, 2 on usage or configuration errors.

pub mod check;
pub mod run;

use std::fs;
use std::io;
use std::path::Path;

use crate::config::{ConfigError, check_source_path};

/// Why program text could not be obtained.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to read code file '{path}' as UTF-8: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// Resolve program text from either `--file` or positional code parts.
///
/// Exactly one of the two must be given. Positional parts are concatenated.
pub fn load_source(file: Option<&str>, code: &[String]) -> Result<String, SourceError> {
    match (file, code.is_empty()) {
        (Some(_), false) => Err(ConfigError::ConflictingSource.into()),
        (None, true) => Err(ConfigError::MissingSource.into()),
        (None, false) => Ok(code.join("")),
        (Some(path), true) => {
            check_source_path(Path::new(path))?;
            fs::read_to_string(path).map_err(|source| SourceError::Read {
                path: path.to_string(),
                source,
            })
        }
    }
}

fn env_u64(key: &str) -> Option<u64> {
    std::env::var(key).ok().and_then(|s| s.trim().parse::<u64>().ok())
}
