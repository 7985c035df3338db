use std::io;
use thiserror::Error;

use crate::parser::ParseError;

/// Failures a dispatched line can run into.
///
/// None of these escape `Shell::run_line`; each one is rendered as a message
/// and the read loop carries on.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("tinysh: {0}")]
    Parse(#[from] ParseError),

    /// The executable was found on the search path but could not be started.
    #[error("{name}: failed to execute: {source}")]
    Spawn {
        name: String,
        #[source]
        source: io::Error,
    },
}
