//! INI reader producing a `serde_json` object tree.
//!
//! Sections nest with dotted headers (`[a.b]` is scope `b` inside `a`), and
//! properties land in the section most recently opened. The grammar's
//! transforms write into shared reader state as sections and properties
//! match, so the reader is re-armed with fresh state for every `read`.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::{Map, Value};

use crate::error::{GrammarError, SemanticError};
use crate::grammar::Grammar;

use super::ReadError;

/// Branch values carried between the name and value rules; the `prop` rule
/// consumes them both.
#[derive(Debug, Clone, PartialEq, Eq)]
enum IniPart {
    Name(String),
    Value(String),
}

#[derive(Default)]
struct IniState {
    doc: Map<String, Value>,
    /// Names of the scopes opened by the current section header.
    path: Vec<String>,
}

pub struct IniReader {
    grammar: Grammar<IniPart>,
    state: Rc<RefCell<IniState>>,
}

impl IniReader {
    pub fn new() -> Result<Self, GrammarError> {
        let state = Rc::new(RefCell::new(IniState::default()));
        let mut g: Grammar<IniPart> = Grammar::new();

        g.add("comment-char", "[^\r\n]")?;
        g.add("comment", ";<comment-char>*")?;

        g.add("prop-name-char", "[^\\[\\]\r\n=]")?;
        g.add_with("prop-name", "<prop-name-char>+", |_, lexeme| {
            Ok(vec![IniPart::Name(lexeme.to_string())])
        })?;
        g.add("prop-value-char", "[^\r\n]")?;
        g.add_with("prop-value", "<prop-value-char>+", |_, lexeme| {
            Ok(vec![IniPart::Value(lexeme.to_string())])
        })?;

        let st = Rc::clone(&state);
        g.add_with("prop", "<prop-name>=<prop-value>", move |b, _| {
            let (name, value) = match b {
                [IniPart::Name(name), IniPart::Value(value)] => (name, value),
                _ => return Err(SemanticError::new("property expects a name and a value")),
            };
            let mut st = st.borrow_mut();
            let path = st.path.clone();
            let scope = scope_mut(&mut st.doc, &path)?;
            if matches!(scope.get(name), Some(Value::Object(_))) {
                return Err(SemanticError::new(format!(
                    "section already exists with property name '{name}'"
                )));
            }
            scope.insert(name.clone(), Value::String(value.clone()));
            Ok(vec![])
        })?;

        g.add("section-char", "[^\\[\\]\r\n\\ \\.]")?;
        let st = Rc::clone(&state);
        g.add_with("section-scope", "<section-char>+", move |_, lexeme| {
            let mut st = st.borrow_mut();
            let path = st.path.clone();
            let scope = scope_mut(&mut st.doc, &path)?;
            match scope.get(lexeme) {
                Some(Value::String(_)) => {
                    return Err(SemanticError::new(format!(
                        "section name '{lexeme}' already used by a property"
                    )));
                }
                Some(Value::Object(_)) => {}
                _ => {
                    scope.insert(lexeme.to_string(), Value::Object(Map::new()));
                }
            }
            st.path.push(lexeme.to_string());
            Ok(vec![])
        })?;
        g.add("section-scope-loop", "\\.<section-scope>")?;
        let st = Rc::clone(&state);
        g.add_with("section-root", "\\[", move |_, _| {
            st.borrow_mut().path.clear();
            Ok(vec![])
        })?;
        g.add("section", "<section-root><section-scope><section-scope-loop>*\\]")?;

        g.add("content", "(<comment>|<prop>|<section>)")?;
        g.add("nl", "\r?\n")?;
        g.add("line", " <content>?(<nl>|$)")?;
        g.add("root", "<line>*")?;

        Ok(IniReader { grammar: g, state })
    }

    /// Parse one INI document into an object tree.
    pub fn read(&self, input: &str) -> Result<Map<String, Value>, ReadError> {
        {
            let mut st = self.state.borrow_mut();
            st.doc = Map::new();
            st.path.clear();
        }
        let result = self.grammar.scan("root", input)?;
        if !result.is_success {
            return Err(ReadError::Malformed("ini"));
        }
        Ok(self.state.borrow().doc.clone())
    }
}

/// Walk `path` down from the document root, reborrowing one scope per step.
fn scope_mut<'a>(
    doc: &'a mut Map<String, Value>,
    path: &[String],
) -> Result<&'a mut Map<String, Value>, SemanticError> {
    let mut scope = doc;
    for name in path {
        scope = match scope.get_mut(name) {
            Some(Value::Object(inner)) => inner,
            _ => return Err(SemanticError::new(format!("missing scope '{name}'"))),
        };
    }
    Ok(scope)
}
