//! Ready-made readers built on the grammar engine.
//!
//! Each submodule defines a complete grammar for one input language and a
//! small front door that scans a document and shapes the branches into a
//! useful value.

use thiserror::Error;

use crate::error::{GrammarError, ScanError};

pub mod calc;
pub mod ini;
pub mod json;
pub mod lml;

/// Failure modes shared by the readers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReadError {
    #[error(transparent)]
    Grammar(#[from] GrammarError),
    #[error(transparent)]
    Scan(#[from] ScanError),
    /// The input is not a document of the reader's language.
    #[error("malformed {0} input")]
    Malformed(&'static str),
}
