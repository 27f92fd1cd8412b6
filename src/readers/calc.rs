//! Four-function calculator over `f64`.
//!
//! Precedence comes from the rule layering: `expr` -> `add` -> `mul` ->
//! `num`/`brackets`. The right-recursive tails fold as the transforms fire,
//! so `2+3*4` evaluates to 14.

use crate::error::{GrammarError, SemanticError};
use crate::grammar::Grammar;

use super::ReadError;

/// Build the calculator grammar. Branch values are running results.
pub fn grammar() -> Result<Grammar<f64>, GrammarError> {
    let mut g: Grammar<f64> = Grammar::new();
    g.declare(&["expr", "mul"])?;

    g.add("digit", "[0-9]")?;
    g.add_with("num", "<digit>+", |_, lexeme| {
        lexeme
            .parse::<f64>()
            .map(|n| vec![n])
            .map_err(|e| SemanticError::new(format!("bad number {lexeme:?}: {e}")))
    })?;
    g.add("brackets", "\\(<expr>\\)")?;
    g.add_with("mul", "(<num>|<brackets>)(\\*<mul>)?", |b, _| match b {
        [value] => Ok(vec![*value]),
        [lhs, rhs] => Ok(vec![lhs * rhs]),
        _ => Err(SemanticError::new("mul expects one or two operands")),
    })?;
    g.add_with("add", "<mul>(\\+<add>)?", |b, _| match b {
        [value] => Ok(vec![*value]),
        [lhs, rhs] => Ok(vec![lhs + rhs]),
        _ => Err(SemanticError::new("add expects one or two operands")),
    })?;
    g.add("expr", "(<add>|<brackets>)")?;
    Ok(g)
}

/// Evaluate one arithmetic expression.
pub fn evaluate(input: &str) -> Result<f64, ReadError> {
    let g = grammar()?;
    let result = g.scan("expr", input)?;
    match result.branches.as_slice() {
        [value] if result.is_success => Ok(*value),
        _ => Err(ReadError::Malformed("arithmetic")),
    }
}
