//! Error types for the three failure channels of the engine.
//!
//! Grammatical failure is *not* an error: it surfaces as
//! `ScanResult { is_success: false, .. }`. The types here cover the other two
//! channels: configuration errors raised eagerly while building a grammar,
//! and semantic errors raised by transforms during a scan.

use thiserror::Error;

/// A syntax error found while compiling a pattern string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (offset {offset})")]
pub struct PatternError {
    /// Character offset into the pattern string where compilation stopped.
    pub offset: usize,
    pub message: String,
}

/// Configuration errors raised by `declare`, `add` and `ws`.
///
/// These are always author mistakes; none of them can be produced by input
/// text at scan time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    #[error("rule `{0}` is already defined")]
    AlreadyDefined(String),
    #[error("rule `{0}` is already declared")]
    AlreadyDeclared(String),
    #[error("pattern references unknown rule `{0}`")]
    UnknownReference(String),
    #[error("malformed pattern: {0}")]
    Pattern(#[from] PatternError),
}

/// Errors that abort a `scan` call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    #[error("no rule named `{0}`")]
    UnknownRule(String),
    #[error("rule `{0}` was declared but never defined")]
    UndefinedRule(String),
    /// A transform rejected a grammatically valid match. This propagates out
    /// of `scan` immediately and never triggers backtracking into other
    /// alternatives.
    #[error(transparent)]
    Semantic(#[from] SemanticError),
}

/// The error type returned by transform callbacks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct SemanticError {
    message: String,
}

impl SemanticError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
