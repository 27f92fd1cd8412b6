//! Rule table and scan entry point.
//!
//! A [`Grammar`] maps rule names to compiled patterns plus optional
//! transforms. Rules can be declared ahead of definition so mutually
//! recursive grammars register in any order; `scan` walks the table from a
//! chosen root rule over the full input.

use std::collections::HashMap;

use crate::compile::compile;
use crate::error::{GrammarError, ScanError, SemanticError};
use crate::expr::RuleExpr;
use crate::matcher::{MatchState, Scanner};

/// Transform run over a rule's child branches and matched lexeme, producing
/// the branches the rule hands to its parent.
pub type BranchFn<V> = Box<dyn Fn(&[V], &str) -> Result<Vec<V>, SemanticError>>;

pub(crate) struct RuleDef<V> {
    /// `None` while the rule is declared but not yet defined.
    pub(crate) expr: Option<RuleExpr>,
    pub(crate) transform: Option<BranchFn<V>>,
}

/// Outcome of a scan. A failed scan is a value, not an error: the input
/// simply does not belong to the language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanResult<V> {
    pub is_success: bool,
    /// Branches produced by the root rule; empty when `is_success` is false.
    pub branches: Vec<V>,
}

/// A named-rule grammar over branch values of type `V`.
pub struct Grammar<V> {
    rules: HashMap<String, RuleDef<V>>,
    ws: RuleExpr,
}

impl<V> Default for Grammar<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Grammar<V> {
    pub fn new() -> Self {
        Grammar {
            rules: HashMap::new(),
            // Until `ws` overrides it, a gap skips plain spaces only.
            ws: RuleExpr::CharClass {
                ranges: vec![(' ', ' ')],
                negated: false,
            },
        }
    }

    /// Reserve rule names so later definitions may reference them before
    /// their own `add` runs.
    pub fn declare(&mut self, names: &[&str]) -> Result<(), GrammarError> {
        for &name in names {
            match self.rules.get(name) {
                Some(def) if def.expr.is_some() => {
                    return Err(GrammarError::AlreadyDefined(name.to_string()));
                }
                Some(_) => return Err(GrammarError::AlreadyDeclared(name.to_string())),
                None => {}
            }
            self.rules.insert(
                name.to_string(),
                RuleDef {
                    expr: None,
                    transform: None,
                },
            );
        }
        Ok(())
    }

    /// Define a rule whose branches are its children's, concatenated.
    pub fn add(&mut self, name: &str, pattern: &str) -> Result<(), GrammarError> {
        self.register(name, pattern, None)
    }

    /// Define a rule with a transform over its children and lexeme.
    pub fn add_with<F>(&mut self, name: &str, pattern: &str, transform: F) -> Result<(), GrammarError>
    where
        F: Fn(&[V], &str) -> Result<Vec<V>, SemanticError> + 'static,
    {
        self.register(name, pattern, Some(Box::new(transform)))
    }

    /// Replace the whitespace definition used by gap markers. Takes effect
    /// for every scan from now on, including rules added earlier.
    pub fn ws(&mut self, pattern: &str) -> Result<(), GrammarError> {
        let expr = compile(pattern)?;
        self.check_references(&expr, None)?;
        self.ws = expr;
        Ok(())
    }

    /// Match `input` in full against the rule named `root`.
    pub fn scan(&self, root: &str, input: &str) -> Result<ScanResult<V>, ScanError> {
        log::debug!("scanning {} chars from rule '{root}'", input.chars().count());
        let scanner = Scanner::new(self, input);
        let mut st = MatchState::new();
        let entry = RuleExpr::RuleRef(root.to_string());
        let matched = scanner.eval(&entry, 0, &mut st, &mut |_, pos| {
            Ok(pos == scanner.input_len())
        })?;
        if matched {
            Ok(ScanResult {
                is_success: true,
                branches: st.branches,
            })
        } else {
            log::debug!("rule '{root}' rejected the input");
            Ok(ScanResult {
                is_success: false,
                branches: Vec::new(),
            })
        }
    }

    pub(crate) fn rule(&self, name: &str) -> Option<&RuleDef<V>> {
        self.rules.get(name)
    }

    pub(crate) fn ws_expr(&self) -> &RuleExpr {
        &self.ws
    }

    fn register(
        &mut self,
        name: &str,
        pattern: &str,
        transform: Option<BranchFn<V>>,
    ) -> Result<(), GrammarError> {
        if matches!(self.rules.get(name), Some(def) if def.expr.is_some()) {
            return Err(GrammarError::AlreadyDefined(name.to_string()));
        }
        let expr = compile(pattern)?;
        self.check_references(&expr, Some(name))?;
        self.rules
            .insert(name.to_string(), RuleDef { expr: Some(expr), transform });
        log::debug!("registered rule '{name}'");
        Ok(())
    }

    /// Every `<name>` must resolve to a rule already in the table, or to the
    /// rule currently being defined.
    fn check_references(&self, expr: &RuleExpr, adding: Option<&str>) -> Result<(), GrammarError> {
        match expr {
            RuleExpr::RuleRef(name) => {
                if !self.rules.contains_key(name) && adding != Some(name.as_str()) {
                    return Err(GrammarError::UnknownReference(name.clone()));
                }
            }
            RuleExpr::Sequence(items) | RuleExpr::Alternation(items) => {
                for item in items {
                    self.check_references(item, adding)?;
                }
            }
            RuleExpr::Quantifier { child, .. } => self.check_references(child, adding)?,
            RuleExpr::NotPredicate(inner) => self.check_references(inner, adding)?,
            RuleExpr::Literal(_)
            | RuleExpr::AnyChar
            | RuleExpr::CharClass { .. }
            | RuleExpr::EndAnchor
            | RuleExpr::WhitespaceGap
            | RuleExpr::AlterGroup(_) => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_width_repetition_terminates() {
        let mut g: Grammar<()> = Grammar::new();
        g.add("maybe", "x?").unwrap();
        g.add("root", "<maybe>*$").unwrap();
        assert!(g.scan("root", "xx").unwrap().is_success);
        assert!(g.scan("root", "").unwrap().is_success);
    }

    #[test]
    fn default_transform_concatenates_child_branches() {
        let mut g: Grammar<i32> = Grammar::new();
        g.add_with("a", "a", |_, _| Ok(vec![1])).unwrap();
        g.add_with("b", "b", |_, _| Ok(vec![2, 3])).unwrap();
        g.add("root", "<a><b><a>").unwrap();
        let result = g.scan("root", "aba").unwrap();
        assert!(result.is_success);
        assert_eq!(result.branches, vec![1, 2, 3, 1]);
    }

    #[test]
    fn alter_substitution_flows_into_parent_lexemes() {
        let mut g: Grammar<String> = Grammar::new();
        g.add("pct", "(~%%,%)").unwrap();
        g.add_with("root", "a<pct>b", |_, lexeme| Ok(vec![lexeme.to_string()]))
            .unwrap();
        let result = g.scan("root", "a%%b").unwrap();
        assert!(result.is_success);
        assert_eq!(result.branches, vec!["a%b".to_string()]);
    }

    #[test]
    fn greedy_quantifier_backs_off() {
        let mut g: Grammar<u32> = Grammar::new();
        g.add_with("a", "a", |_, _| Ok(vec![1])).unwrap();
        g.add("root", "<a>*aa$").unwrap();
        let result = g.scan("root", "aaaa").unwrap();
        assert!(result.is_success);
        assert_eq!(result.branches, vec![1, 1]);
    }

    #[test]
    fn redefinition_and_unknown_references_are_config_errors() {
        let mut g: Grammar<()> = Grammar::new();
        g.add("a", "x").unwrap();
        assert_eq!(
            g.add("a", "y"),
            Err(GrammarError::AlreadyDefined("a".to_string()))
        );
        assert_eq!(
            g.add("b", "<missing>"),
            Err(GrammarError::UnknownReference("missing".to_string()))
        );
    }

    #[test]
    fn scanning_a_declared_but_undefined_rule_is_an_error() {
        let mut g: Grammar<()> = Grammar::new();
        g.declare(&["later"]).unwrap();
        g.add("root", "<later>").unwrap();
        assert_eq!(
            g.scan("root", "x"),
            Err(ScanError::UndefinedRule("later".to_string()))
        );
        assert_eq!(
            g.scan("nowhere", "x"),
            Err(ScanError::UnknownRule("nowhere".to_string()))
        );
    }
}
