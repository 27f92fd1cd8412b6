//! # rulescan
//!
//! A backtracking text-pattern grammar engine. Rules are registered by name
//! with patterns written in a small mini-language, optionally paired with a
//! transform that turns the matched text and child values into new values.
//! Scanning matches the whole input from a root rule and yields the values
//! the root produced.
//!
//! ```text
//! let mut g: Grammar<u32> = Grammar::new();
//! g.add_with("digit", "[0-9]", |_, l| Ok(vec![l.parse().unwrap()]))?;
//! g.add("root", "<digit>+")?;
//! let result = g.scan("root", "407")?;   // branches [4, 0, 7]
//! ```
//!
//! Pattern syntax in brief: literals match themselves, `.` any character,
//! `[a-z]` / `[^...]` classes, `<name>` rule references, `(a|b)` ordered
//! choice, `*` `+` `?` `{n,m}` greedy repetition, `!x` negative lookahead,
//! `$` end of input, a space skips whitespace, `(~find,replace|...)`
//! substitutes text into the lexeme, and `\` escapes.
//!
//! The [`readers`] module builds complete INI, JSON, LML and calculator
//! readers on top of the engine.

mod compile;
mod expr;
mod matcher;

pub mod error;
pub mod grammar;
pub mod readers;

pub use error::{GrammarError, PatternError, ScanError, SemanticError};
pub use grammar::{BranchFn, Grammar, ScanResult};
