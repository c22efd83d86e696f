//! Failure taxonomy for document conversion
//!
//! Every failure the conversion pipeline can surface is one of these four
//! kinds; callers (the CLI, tests) match on them rather than parsing
//! messages. There is no partial-success mode — a failed conversion leaves
//! no output file behind.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConvertError {
    /// The input path does not exist or cannot be read.
    #[error("input file not found: {path}")]
    NotFound { path: PathBuf },

    /// The input exists but is not a valid .docx package.
    #[error("not a valid .docx file: {path}: {reason}")]
    InvalidFormat { path: PathBuf, reason: String },

    /// A part's structure prevents complete traversal (e.g. a table row
    /// with no cells). Reported rather than skipped, since skipping would
    /// produce an incompletely converted output.
    #[error("malformed document structure in {part}: {reason}")]
    MalformedStructure { part: String, reason: String },

    /// The output path cannot be created or written.
    #[error("cannot write output file {path}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
