//! Pattern mini-language compiler.
//!
//! Turns a pattern string into a [`RuleExpr`] tree. Compilation is eager and
//! structural only; rule references are validated later against the rule
//! table. This parser is intentionally hand-rolled:
//!
//! 1. `parse_sequence` accumulates elements until end of input (or `)` / `|`
//!    inside a group).
//! 2. `parse_element` reads one atom plus any `!` prefix and quantifier
//!    suffixes.
//! 3. `parse_atom` dispatches on the leading character.
//!
//! Adjacent literal characters are merged into literal runs after quantifier
//! binding, so `abc+` parses as `ab` followed by `c+`.

use crate::error::PatternError;
use crate::expr::RuleExpr;

/// Compile a pattern into an expression tree.
pub(crate) fn compile(pattern: &str) -> Result<RuleExpr, PatternError> {
    let mut parser = Parser {
        chars: pattern.chars().collect(),
        pos: 0,
    };
    let expr = parser.parse_sequence(false)?;
    if let Some(c) = parser.peek() {
        // The only way parse_sequence stops early at top level.
        debug_assert_eq!(c, ')');
        return Err(parser.error("unmatched ')'"));
    }
    Ok(expr)
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn error(&self, message: &str) -> PatternError {
        PatternError {
            offset: self.pos,
            message: message.to_string(),
        }
    }

    /// Parse elements until end of input, or until `)` / `|` when inside a
    /// group. The group delimiters are left unconsumed for the caller.
    fn parse_sequence(&mut self, in_group: bool) -> Result<RuleExpr, PatternError> {
        let mut items = Vec::new();
        loop {
            match self.peek() {
                None => break,
                Some(')') | Some('|') if in_group => break,
                Some(')') => return Err(self.error("unmatched ')'")),
                Some(_) => items.push(self.parse_element()?),
            }
        }
        Ok(seq(merge_literals(items)))
    }

    /// One atom with its optional `!` prefix and quantifier suffixes.
    fn parse_element(&mut self) -> Result<RuleExpr, PatternError> {
        if self.peek() == Some('!') {
            self.pos += 1;
            if self.peek().is_none() {
                return Err(self.error("'!' with nothing to negate"));
            }
            let inner = self.parse_element()?;
            return Ok(RuleExpr::NotPredicate(Box::new(inner)));
        }
        let mut expr = self.parse_atom()?;
        loop {
            match self.peek() {
                Some('*') => {
                    self.pos += 1;
                    expr = quantified(expr, 0, None);
                }
                Some('+') => {
                    self.pos += 1;
                    expr = quantified(expr, 1, None);
                }
                Some('?') => {
                    self.pos += 1;
                    expr = quantified(expr, 0, Some(1));
                }
                Some('{') => {
                    self.pos += 1;
                    let (min, max) = self.parse_bounds()?;
                    expr = quantified(expr, min, max);
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn parse_atom(&mut self) -> Result<RuleExpr, PatternError> {
        match self.peek() {
            None => Err(self.error("expected a pattern element")),
            Some('(') => {
                self.pos += 1;
                if self.peek() == Some('~') {
                    self.pos += 1;
                    return self.parse_alter_group();
                }
                self.parse_group()
            }
            Some('[') => {
                self.pos += 1;
                self.parse_class()
            }
            Some('<') => {
                self.pos += 1;
                self.parse_reference()
            }
            Some('.') => {
                self.pos += 1;
                Ok(RuleExpr::AnyChar)
            }
            Some('$') => {
                self.pos += 1;
                Ok(RuleExpr::EndAnchor)
            }
            Some(' ') => {
                self.pos += 1;
                Ok(RuleExpr::WhitespaceGap)
            }
            Some('\\') => {
                self.pos += 1;
                match self.bump() {
                    Some(c) => Ok(RuleExpr::Literal(vec![unescape(c)])),
                    None => Err(self.error("dangling escape at end of pattern")),
                }
            }
            Some(')') => Err(self.error("unmatched ')'")),
            Some(c @ ('*' | '+' | '?' | '{')) => {
                Err(self.error(&format!("'{c}' with nothing to repeat")))
            }
            Some(c) => {
                self.pos += 1;
                Ok(RuleExpr::Literal(vec![c]))
            }
        }
    }

    /// Body of `(...)` after the opening paren; consumes the closing paren.
    fn parse_group(&mut self) -> Result<RuleExpr, PatternError> {
        let mut arms = vec![self.parse_sequence(true)?];
        loop {
            match self.bump() {
                Some(')') => break,
                Some('|') => arms.push(self.parse_sequence(true)?),
                _ => return Err(self.error("unterminated group, expected ')'")),
            }
        }
        if arms.len() == 1 {
            let mut arms = arms;
            Ok(arms.remove(0))
        } else {
            Ok(RuleExpr::Alternation(arms))
        }
    }

    /// Body of `(~find,replace|...)` after the `~`; consumes the closing
    /// paren. Both texts are escape-processed literals, not sub-patterns.
    fn parse_alter_group(&mut self) -> Result<RuleExpr, PatternError> {
        let mut pairs = Vec::new();
        loop {
            let (find, _) = self.alter_text(&[','])?;
            if find.is_empty() {
                return Err(self.error("alternation pair has an empty find text"));
            }
            let (replace, stop) = self.alter_text(&['|', ')'])?;
            pairs.push((find, replace.into_iter().collect()));
            if stop == ')' {
                break;
            }
        }
        Ok(RuleExpr::AlterGroup(pairs))
    }

    /// Literal text up to one of `stops` (or `)` which always stops),
    /// decoding escapes. Returns the text and the consumed terminator.
    fn alter_text(&mut self, stops: &[char]) -> Result<(Vec<char>, char), PatternError> {
        let mut text = Vec::new();
        loop {
            match self.bump() {
                None => return Err(self.error("unterminated alternation group")),
                Some('\\') => match self.bump() {
                    Some(c) => text.push(unescape(c)),
                    None => return Err(self.error("dangling escape at end of pattern")),
                },
                Some(c) if stops.contains(&c) || c == ')' => {
                    if !stops.contains(&c) {
                        return Err(self.error("alternation pair is missing ','"));
                    }
                    return Ok((text, c));
                }
                Some(c) => text.push(c),
            }
        }
    }

    /// Body of `[...]` after the opening bracket; consumes the `]`.
    fn parse_class(&mut self) -> Result<RuleExpr, PatternError> {
        let negated = if self.peek() == Some('^') {
            self.pos += 1;
            true
        } else {
            false
        };
        let mut ranges: Vec<(char, char)> = Vec::new();
        loop {
            let lo = match self.bump() {
                None => return Err(self.error("unterminated character class")),
                Some(']') => break,
                Some('\\') => match self.bump() {
                    Some(c) => unescape(c),
                    None => return Err(self.error("dangling escape at end of pattern")),
                },
                Some(c) => c,
            };
            // A '-' is a range marker only when both endpoints exist.
            if self.peek() == Some('-') && self.chars.get(self.pos + 1) != Some(&']') {
                self.pos += 1;
                let hi = match self.bump() {
                    None => return Err(self.error("unterminated character class")),
                    Some('\\') => match self.bump() {
                        Some(c) => unescape(c),
                        None => return Err(self.error("dangling escape at end of pattern")),
                    },
                    Some(c) => c,
                };
                if lo > hi {
                    return Err(self.error("character range is reversed"));
                }
                ranges.push((lo, hi));
            } else {
                ranges.push((lo, lo));
            }
        }
        if ranges.is_empty() {
            return Err(self.error("empty character class"));
        }
        Ok(RuleExpr::CharClass { ranges, negated })
    }

    /// Body of `<name>` after the `<`; consumes the `>`.
    fn parse_reference(&mut self) -> Result<RuleExpr, PatternError> {
        let mut name = String::new();
        loop {
            match self.bump() {
                None => return Err(self.error("unterminated rule reference")),
                Some('>') => break,
                Some(c) => name.push(c),
            }
        }
        if name.is_empty() {
            return Err(self.error("empty rule reference"));
        }
        Ok(RuleExpr::RuleRef(name))
    }

    /// Body of `{...}` after the opening brace; consumes the `}`.
    fn parse_bounds(&mut self) -> Result<(u32, Option<u32>), PatternError> {
        let min = self.digits()?;
        let (min, max) = match self.peek() {
            Some(',') => {
                self.pos += 1;
                let max = self.digits()?;
                if min.is_none() && max.is_none() {
                    return Err(self.error("repetition bounds need at least one count"));
                }
                (min.unwrap_or(0), max)
            }
            _ => match min {
                Some(n) => (n, Some(n)),
                None => return Err(self.error("repetition bounds need at least one count")),
            },
        };
        match self.bump() {
            Some('}') => {}
            _ => return Err(self.error("unterminated repetition bounds, expected '}'")),
        }
        if let Some(max) = max {
            if min > max {
                return Err(self.error("repetition minimum exceeds maximum"));
            }
        }
        Ok((min, max))
    }

    fn digits(&mut self) -> Result<Option<u32>, PatternError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.pos += 1;
        }
        if self.pos == start {
            return Ok(None);
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        text.parse::<u32>()
            .map(Some)
            .map_err(|_| self.error("repetition count is out of range"))
    }
}

/// Decode one escaped character. Known control names map to their control
/// character; anything else escapes to itself.
fn unescape(c: char) -> char {
    match c {
        '0' => '\0',
        'b' => '\u{8}',
        'f' => '\u{c}',
        'n' => '\n',
        'r' => '\r',
        't' => '\t',
        'v' => '\u{b}',
        other => other,
    }
}

fn seq(mut items: Vec<RuleExpr>) -> RuleExpr {
    if items.len() == 1 {
        items.remove(0)
    } else {
        RuleExpr::Sequence(items)
    }
}

fn quantified(child: RuleExpr, min: u32, max: Option<u32>) -> RuleExpr {
    RuleExpr::Quantifier {
        child: Box::new(child),
        min,
        max,
    }
}

/// Collapse adjacent single-character literals into runs. Runs before a
/// quantified character stay separate, which keeps quantifier binding on the
/// last character only.
fn merge_literals(items: Vec<RuleExpr>) -> Vec<RuleExpr> {
    let mut merged: Vec<RuleExpr> = Vec::with_capacity(items.len());
    for item in items {
        if let (Some(RuleExpr::Literal(run)), RuleExpr::Literal(next)) =
            (merged.last_mut(), &item)
        {
            run.extend(next.iter().copied());
            continue;
        }
        merged.push(item);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(text: &str) -> RuleExpr {
        RuleExpr::Literal(text.chars().collect())
    }

    #[test]
    fn adjacent_literals_merge_around_quantifiers() {
        assert_eq!(compile("abc").unwrap(), lit("abc"));
        assert_eq!(
            compile("abc+").unwrap(),
            RuleExpr::Sequence(vec![
                lit("ab"),
                RuleExpr::Quantifier {
                    child: Box::new(lit("c")),
                    min: 1,
                    max: None,
                },
            ])
        );
    }

    #[test]
    fn escapes_decode_control_names_and_pass_through_the_rest() {
        assert_eq!(compile("\\n\\ \\[").unwrap(), lit("\n ["));
        assert_eq!(compile("\\q").unwrap(), lit("q"));
    }

    #[test]
    fn groups_alternate_and_unwrap_single_arms() {
        assert_eq!(
            compile("(a|b)").unwrap(),
            RuleExpr::Alternation(vec![lit("a"), lit("b")])
        );
        assert_eq!(compile("(ab)").unwrap(), lit("ab"));
    }

    #[test]
    fn classes_support_ranges_negation_and_edge_dashes() {
        assert_eq!(
            compile("[a-z0]").unwrap(),
            RuleExpr::CharClass {
                ranges: vec![('a', 'z'), ('0', '0')],
                negated: false,
            }
        );
        assert_eq!(
            compile("[^-a]").unwrap(),
            RuleExpr::CharClass {
                ranges: vec![('-', '-'), ('a', 'a')],
                negated: true,
            }
        );
        assert_eq!(
            compile("[a-]").unwrap(),
            RuleExpr::CharClass {
                ranges: vec![('a', 'a'), ('-', '-')],
                negated: false,
            }
        );
    }

    #[test]
    fn references_gap_dot_and_anchor() {
        assert_eq!(compile("<x>").unwrap(), RuleExpr::RuleRef("x".into()));
        assert_eq!(compile(" ").unwrap(), RuleExpr::WhitespaceGap);
        assert_eq!(compile(".").unwrap(), RuleExpr::AnyChar);
        assert_eq!(compile("$").unwrap(), RuleExpr::EndAnchor);
    }

    #[test]
    fn lookahead_binds_tighter_than_sequence() {
        assert_eq!(
            compile("!ab").unwrap(),
            RuleExpr::Sequence(vec![
                RuleExpr::NotPredicate(Box::new(lit("a"))),
                lit("b"),
            ])
        );
    }

    #[test]
    fn alter_groups_decode_both_texts() {
        assert_eq!(
            compile("(~\\n,x|a,\\t)").unwrap(),
            RuleExpr::AlterGroup(vec![
                (vec!['\n'], "x".to_string()),
                (vec!['a'], "\t".to_string()),
            ])
        );
        assert_eq!(
            compile("(~%%,%)").unwrap(),
            RuleExpr::AlterGroup(vec![(vec!['%', '%'], "%".to_string())])
        );
    }

    #[test]
    fn bounds_parse_all_four_shapes() {
        let q = |min, max| RuleExpr::Quantifier {
            child: Box::new(lit("a")),
            min,
            max,
        };
        assert_eq!(compile("a{3}").unwrap(), q(3, Some(3)));
        assert_eq!(compile("a{2,}").unwrap(), q(2, None));
        assert_eq!(compile("a{,4}").unwrap(), q(0, Some(4)));
        assert_eq!(compile("a{1,4}").unwrap(), q(1, Some(4)));
    }

    #[test]
    fn closing_brace_and_pipe_are_plain_literals_outside_context() {
        assert_eq!(compile("}").unwrap(), lit("}"));
        assert_eq!(compile("a|b").unwrap(), lit("a|b"));
    }

    #[test]
    fn malformed_patterns_are_rejected() {
        let bad = [
            "(a", ")", "[ab", "<", "<>", "(~a|b)", "a\\", "*", "+a{", "a{}",
            "a{,}", "a{4,2}", "[]", "(~,x)", "[z-a]",
        ];
        for pattern in bad {
            assert!(compile(pattern).is_err(), "expected error for {pattern:?}");
        }
    }

    #[test]
    fn errors_carry_the_offset() {
        let err = compile("ab[").unwrap_err();
        assert_eq!(err.offset, 3);
    }
}
