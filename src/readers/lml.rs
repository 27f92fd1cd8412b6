//! LML ("lightweight markup language") reader.
//!
//! Documents are words and tagged braced branches, `tag { child child }`,
//! nesting freely. `{{` and `}}` escape literal braces inside words. The
//! result is a tree of [`LmlNode`]s under an untagged root.

use serde::Serialize;

use crate::error::{GrammarError, SemanticError};
use crate::grammar::Grammar;

use super::ReadError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LmlNode {
    pub tag: Option<String>,
    pub text: Option<String>,
    pub children: Vec<LmlNode>,
}

/// Branch values: a tag name on its way into a branch node, or a finished
/// node.
#[derive(Debug, Clone, PartialEq, Eq)]
enum LmlPart {
    Tag(String),
    Node(LmlNode),
}

fn grammar() -> Result<Grammar<LmlPart>, GrammarError> {
    let mut g: Grammar<LmlPart> = Grammar::new();
    g.ws("(\\ |\t|\n|\r)")?;
    g.declare(&["branch", "branch-start"])?;

    g.add("escape-chars", "(~\\{\\{,\\{|\\}\\},\\})")?;
    g.add("control-chars", "(\\ |\t|\n|\r|\\{|\\})")?;
    g.add("char", "(<escape-chars>|!<control-chars>.)")?;
    g.add_with("tag", "<char>+", |_, lexeme| {
        Ok(vec![LmlPart::Tag(lexeme.to_string())])
    })?;
    g.add("word", "!<branch-start><char>+")?;
    g.add_with("text", "<word>( <word>)*", |_, lexeme| {
        Ok(vec![LmlPart::Node(LmlNode {
            tag: None,
            text: Some(lexeme.to_string()),
            children: Vec::new(),
        })])
    })?;
    g.add("child", "(<text>|<branch>)")?;
    g.add("children", "<child>( <child>)*")?;
    g.add("branch-start", "<tag> \\{!(\\{)")?;
    g.add_with("branch", "<branch-start> <children>? }", |b, _| {
        let (tag, rest) = match b.split_first() {
            Some((LmlPart::Tag(tag), rest)) => (tag.clone(), rest),
            _ => return Err(SemanticError::new("branch is missing its tag")),
        };
        Ok(vec![LmlPart::Node(LmlNode {
            tag: Some(tag),
            text: None,
            children: nodes(rest)?,
        })])
    })?;
    g.add_with("root", " <children>? ", |b, _| {
        Ok(vec![LmlPart::Node(LmlNode {
            tag: None,
            text: None,
            children: nodes(b)?,
        })])
    })?;
    Ok(g)
}

fn nodes(parts: &[LmlPart]) -> Result<Vec<LmlNode>, SemanticError> {
    parts
        .iter()
        .map(|part| match part {
            LmlPart::Node(node) => Ok(node.clone()),
            LmlPart::Tag(_) => Err(SemanticError::new("stray tag outside a branch")),
        })
        .collect()
}

/// Parse one document into its root node.
pub fn read(input: &str) -> Result<LmlNode, ReadError> {
    let g = grammar()?;
    let result = g.scan("root", input)?;
    match result.branches.as_slice() {
        [LmlPart::Node(root)] if result.is_success => Ok(root.clone()),
        _ => Err(ReadError::Malformed("lml")),
    }
}
