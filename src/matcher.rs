//! Backtracking evaluator.
//!
//! Expressions are evaluated in continuation-passing style: every node is
//! handed a `next` closure standing for "the rest of the pattern". A node
//! tries each of its own alternatives in order, calling `next` for each one;
//! `Ok(true)` means the whole remainder matched, `Ok(false)` asks the caller
//! to try its next alternative, and `Err` aborts the scan outright.
//!
//! Every node is responsible for undoing its own effects on the shared
//! [`MatchState`] before returning `Ok(false)`, so branches and lexeme text
//! from abandoned alternatives never leak into the surviving parse.

use crate::error::ScanError;
use crate::expr::RuleExpr;
use crate::grammar::Grammar;

/// Branches and reconstructed lexeme accumulated along the current path.
pub(crate) struct MatchState<V> {
    pub(crate) branches: Vec<V>,
    pub(crate) lexeme: String,
}

impl<V> MatchState<V> {
    pub(crate) fn new() -> Self {
        MatchState {
            branches: Vec::new(),
            lexeme: String::new(),
        }
    }
}

type Next<'a, V> = &'a mut dyn FnMut(&mut MatchState<V>, usize) -> Result<bool, ScanError>;

pub(crate) struct Scanner<'g, V> {
    grammar: &'g Grammar<V>,
    input: Vec<char>,
}

impl<'g, V> Scanner<'g, V> {
    pub(crate) fn new(grammar: &'g Grammar<V>, input: &str) -> Self {
        Scanner {
            grammar,
            input: input.chars().collect(),
        }
    }

    pub(crate) fn input_len(&self) -> usize {
        self.input.len()
    }

    pub(crate) fn eval(
        &self,
        expr: &RuleExpr,
        pos: usize,
        st: &mut MatchState<V>,
        next: Next<'_, V>,
    ) -> Result<bool, ScanError> {
        match expr {
            RuleExpr::Literal(text) => {
                let end = pos + text.len();
                if end > self.input.len() || self.input[pos..end] != text[..] {
                    return Ok(false);
                }
                let mark = st.lexeme.len();
                st.lexeme.extend(text.iter());
                if next(st, end)? {
                    Ok(true)
                } else {
                    st.lexeme.truncate(mark);
                    Ok(false)
                }
            }
            RuleExpr::AnyChar => match self.input.get(pos) {
                None => Ok(false),
                Some(&c) => {
                    let mark = st.lexeme.len();
                    st.lexeme.push(c);
                    if next(st, pos + 1)? {
                        Ok(true)
                    } else {
                        st.lexeme.truncate(mark);
                        Ok(false)
                    }
                }
            },
            RuleExpr::CharClass { ranges, negated } => match self.input.get(pos) {
                None => Ok(false),
                Some(&c) => {
                    let inside = ranges.iter().any(|&(lo, hi)| lo <= c && c <= hi);
                    if inside == *negated {
                        return Ok(false);
                    }
                    let mark = st.lexeme.len();
                    st.lexeme.push(c);
                    if next(st, pos + 1)? {
                        Ok(true)
                    } else {
                        st.lexeme.truncate(mark);
                        Ok(false)
                    }
                }
            },
            RuleExpr::RuleRef(name) => self.eval_rule(name, pos, st, next),
            RuleExpr::Sequence(items) => self.eval_sequence(items, pos, st, next),
            RuleExpr::Alternation(arms) => {
                for arm in arms {
                    if self.eval(arm, pos, st, &mut *next)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            RuleExpr::Quantifier { child, min, max } => {
                self.eval_repeat(child, *min, *max, 0, pos, st, next)
            }
            RuleExpr::NotPredicate(inner) => {
                let b_mark = st.branches.len();
                let l_mark = st.lexeme.len();
                let matched = self.eval(inner, pos, st, &mut |_, _| Ok(true))?;
                st.branches.truncate(b_mark);
                st.lexeme.truncate(l_mark);
                if matched {
                    Ok(false)
                } else {
                    next(st, pos)
                }
            }
            RuleExpr::EndAnchor => {
                if pos == self.input.len() {
                    next(st, pos)
                } else {
                    Ok(false)
                }
            }
            RuleExpr::WhitespaceGap => {
                self.eval_repeat(self.grammar.ws_expr(), 0, None, 0, pos, st, next)
            }
            RuleExpr::AlterGroup(pairs) => {
                for (find, replace) in pairs {
                    let end = pos + find.len();
                    if end > self.input.len() || self.input[pos..end] != find[..] {
                        continue;
                    }
                    let mark = st.lexeme.len();
                    st.lexeme.push_str(replace);
                    if next(st, end)? {
                        return Ok(true);
                    }
                    st.lexeme.truncate(mark);
                }
                Ok(false)
            }
        }
    }

    fn eval_sequence(
        &self,
        items: &[RuleExpr],
        pos: usize,
        st: &mut MatchState<V>,
        next: Next<'_, V>,
    ) -> Result<bool, ScanError> {
        match items.split_first() {
            None => next(st, pos),
            Some((head, rest)) => self.eval(head, pos, st, &mut |st, p| {
                self.eval_sequence(rest, p, st, &mut *next)
            }),
        }
    }

    /// Greedy repetition: try one more iteration first, back off to the
    /// continuation once the minimum is met. An iteration that consumes no
    /// input ends the repetition, otherwise zero-width matches loop forever.
    #[allow(clippy::too_many_arguments)]
    fn eval_repeat(
        &self,
        child: &RuleExpr,
        min: u32,
        max: Option<u32>,
        count: u32,
        pos: usize,
        st: &mut MatchState<V>,
        next: Next<'_, V>,
    ) -> Result<bool, ScanError> {
        if max.map_or(true, |m| count < m) {
            let more = self.eval(child, pos, st, &mut |st, p| {
                if p == pos {
                    next(st, p)
                } else {
                    self.eval_repeat(child, min, max, count + 1, p, st, &mut *next)
                }
            })?;
            if more {
                return Ok(true);
            }
        }
        if count >= min {
            next(st, pos)
        } else {
            Ok(false)
        }
    }

    /// Evaluate a named rule: match its pattern with a fresh view of the
    /// state, then run its transform over exactly the branches and lexeme
    /// text produced inside. Transforms fire speculatively along the current
    /// path; their branch output is undone on backtrack, any other side
    /// effects are the transform's own business.
    fn eval_rule(
        &self,
        name: &str,
        pos: usize,
        st: &mut MatchState<V>,
        next: Next<'_, V>,
    ) -> Result<bool, ScanError> {
        let rule = self
            .grammar
            .rule(name)
            .ok_or_else(|| ScanError::UnknownRule(name.to_string()))?;
        let expr = rule
            .expr
            .as_ref()
            .ok_or_else(|| ScanError::UndefinedRule(name.to_string()))?;
        let b_mark = st.branches.len();
        let l_mark = st.lexeme.len();
        self.eval(expr, pos, st, &mut |st, p| {
            let transform = match &rule.transform {
                Some(f) => f,
                // No transform: child branches pass through untouched.
                None => return next(st, p),
            };
            let children = st.branches.split_off(b_mark);
            let produced = transform(&children, &st.lexeme[l_mark..])?;
            st.branches.extend(produced);
            if next(st, p)? {
                Ok(true)
            } else {
                // Put the child branches back so the rule body can resume
                // backtracking from where it left off.
                st.branches.truncate(b_mark);
                st.branches.extend(children);
                Ok(false)
            }
        })
    }
}
