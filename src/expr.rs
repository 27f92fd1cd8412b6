//! Compiled representation of a pattern.
//!
//! Rule references are kept symbolic (by name) and resolved against the rule
//! table at match time, so self- and mutually-recursive grammars are
//! representable in a plain owned tree.

/// One node of a compiled pattern expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RuleExpr {
    /// Literal text, matched codepoint for codepoint.
    Literal(Vec<char>),
    /// `.` — any single character.
    AnyChar,
    /// `[...]` / `[^...]` — single characters as degenerate ranges.
    CharClass {
        ranges: Vec<(char, char)>,
        negated: bool,
    },
    /// `<name>` — resolved against the rule table when evaluated.
    RuleRef(String),
    Sequence(Vec<RuleExpr>),
    /// `(a|b|...)` — ordered choice.
    Alternation(Vec<RuleExpr>),
    /// `*`, `+`, `?`, `{n,m}`; `max == None` means unbounded.
    Quantifier {
        child: Box<RuleExpr>,
        min: u32,
        max: Option<u32>,
    },
    /// `!x` — zero-width negative lookahead.
    NotPredicate(Box<RuleExpr>),
    /// `$` — zero-width end-of-input anchor.
    EndAnchor,
    /// A literal space in the pattern: zero or more whitespace-class characters.
    WhitespaceGap,
    /// `(~find,replace|...)` — each pair is a literal text to match and the
    /// text substituted into the reconstructed lexeme on match.
    AlterGroup(Vec<(Vec<char>, String)>),
}
