//! Relaxed JSON reader producing `serde_json::Value`.
//!
//! Accepts a superset of strict JSON: unquoted property names, trailing
//! commas, hex (`0x1F`) and octal (`017`) integers, bare fractions (`.5`),
//! `undefined` (read as null), and the JavaScript string escapes including
//! `\xhh` and `\uhhhh`.

use serde_json::{Map, Number, Value};

use crate::error::{GrammarError, SemanticError};
use crate::grammar::Grammar;

use super::ReadError;

/// Branch values flowing through the grammar.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonPart {
    Value(Value),
    Prop(String),
    Pair(String, Value),
}

pub fn grammar() -> Result<Grammar<JsonPart>, GrammarError> {
    let mut g: Grammar<JsonPart> = Grammar::new();
    g.ws("(\\ |\t|\r|\n)")?;

    g.add("0", "0")?;
    g.add("non0", "[1-9]")?;
    g.add("dec", "[0-9]")?;
    g.add("oct", "[0-7]")?;
    g.add("hex", "[0-9a-fA-F]")?;
    g.add("letter", "[a-zA-Z]")?;
    g.add("alpha-num", "(<letter>|<dec>)")?;

    g.declare(&["value"])?;

    g.add_with("bool", "(true|false)", |_, lexeme| {
        Ok(vec![JsonPart::Value(Value::Bool(lexeme == "true"))])
    })?;
    g.add_with("null", "null", |_, _| Ok(vec![JsonPart::Value(Value::Null)]))?;
    // No undefined in the data model; read it as null.
    g.add_with("undefined", "undefined", |_, _| {
        Ok(vec![JsonPart::Value(Value::Null)])
    })?;

    g.add("non0-signed-int", "-?<non0><dec>*")?;
    g.add("signed-int", "(<0>|<non0-signed-int>)")?;
    g.add("fraction", "\\.<dec>+")?;
    g.add_with("hex-num", "0x<hex>+", |_, lexeme| parse_radix(lexeme, 2, 16))?;
    g.add_with("oct-num", "0<oct>+", |_, lexeme| parse_radix(lexeme, 1, 8))?;
    g.add_with("dec-num", "<signed-int><fraction>?", |_, lexeme| {
        parse_float(lexeme)
    })?;
    g.add_with("decfrac-num", "\\.<dec>+", |_, lexeme| parse_float(lexeme))?;

    g.add_with(
        "str-esc-control",
        "(~\\\\0,\\0|\\\\b,\\b|\\\\f,\\f|\\\\n,\\n|\\\\r,\\r|\\\\t,\\t|\\\\v,\\v|\\\",\")",
        pass_lexeme,
    )?;
    g.add_with("str-escape-latin1", "\\\\x<hex>{2}", |_, lexeme| {
        parse_char_code(lexeme)
    })?;
    g.add_with("str-escape-utf16", "\\\\u<hex>{4}", |_, lexeme| {
        parse_char_code(lexeme)
    })?;
    g.add_with("str-escape-unknown", "\\\\", pass_lexeme)?;
    g.add_with("str-plain-char", "[^\"]", pass_lexeme)?;
    g.add(
        "str-char",
        "(<str-esc-control>|<str-escape-latin1>|<str-escape-utf16>|<str-escape-unknown>|<str-plain-char>)",
    )?;
    g.add_with("str-value", "<str-char>*", |b, _| {
        let mut text = String::new();
        for part in b {
            match part {
                JsonPart::Value(Value::String(s)) => text.push_str(s),
                _ => return Err(SemanticError::new("string characters expected")),
            }
        }
        Ok(vec![JsonPart::Value(Value::String(text))])
    })?;
    g.add_with("str-empty", "\"\"", |_, _| {
        Ok(vec![JsonPart::Value(Value::String(String::new()))])
    })?;
    g.add("str", "(<str-empty>|\"<str-value>\")")?;

    g.add("arr-item", ", <value> ")?;
    g.add("arr-items", "<value> <arr-item>*,?")?;
    g.add_with("arr", "\\[ <arr-items>? \\]", |b, _| {
        let mut items = Vec::with_capacity(b.len());
        for part in b {
            match part {
                JsonPart::Value(v) => items.push(v.clone()),
                _ => return Err(SemanticError::new("array items must be values")),
            }
        }
        Ok(vec![JsonPart::Value(Value::Array(items))])
    })?;

    g.add("varname", "<letter><alpha-num>*")?;
    g.add_with("obj-propname", "(<str>|<varname>)", |b, lexeme| {
        // A quoted name arrives decoded as a branch; a bare name is the lexeme.
        let name = match b {
            [JsonPart::Value(Value::String(s))] => s.clone(),
            [] => lexeme.to_string(),
            _ => return Err(SemanticError::new("property name expected")),
        };
        Ok(vec![JsonPart::Prop(name)])
    })?;
    g.add_with("obj-prop", "<obj-propname> : <value>", |b, _| match b {
        [JsonPart::Prop(name), JsonPart::Value(v)] => {
            Ok(vec![JsonPart::Pair(name.clone(), v.clone())])
        }
        _ => Err(SemanticError::new("property expects a name and a value")),
    })?;
    g.add("obj-item", ", <obj-prop> ")?;
    g.add("obj-items", "<obj-prop> <obj-item>*,?")?;
    g.add_with("obj", "\\{ <obj-items>? \\}", |b, _| {
        let mut map = Map::new();
        for part in b {
            match part {
                JsonPart::Pair(name, v) => {
                    map.insert(name.clone(), v.clone());
                }
                _ => return Err(SemanticError::new("object entries must be properties")),
            }
        }
        Ok(vec![JsonPart::Value(Value::Object(map))])
    })?;

    g.add(
        "value",
        " (<bool>|<null>|<undefined>|<hex-num>|<oct-num>|<dec-num>|<decfrac-num>|<str>|<arr>|<obj>) ",
    )?;
    Ok(g)
}

/// Parse one document.
pub fn read(input: &str) -> Result<Value, ReadError> {
    let g = grammar()?;
    let result = g.scan("value", input)?;
    match result.branches.as_slice() {
        [JsonPart::Value(v)] if result.is_success => Ok(v.clone()),
        _ => Err(ReadError::Malformed("json")),
    }
}

#[allow(clippy::unnecessary_wraps)]
fn pass_lexeme(_: &[JsonPart], lexeme: &str) -> Result<Vec<JsonPart>, SemanticError> {
    Ok(vec![JsonPart::Value(Value::String(lexeme.to_string()))])
}

/// Integer literal with a `skip`-byte prefix (`0x`, `0`).
fn parse_radix(lexeme: &str, skip: usize, radix: u32) -> Result<Vec<JsonPart>, SemanticError> {
    u64::from_str_radix(&lexeme[skip..], radix)
        .map(|n| vec![JsonPart::Value(Value::Number(Number::from(n)))])
        .map_err(|e| SemanticError::new(format!("bad integer {lexeme:?}: {e}")))
}

fn parse_float(lexeme: &str) -> Result<Vec<JsonPart>, SemanticError> {
    let n = lexeme
        .parse::<f64>()
        .map_err(|e| SemanticError::new(format!("bad number {lexeme:?}: {e}")))?;
    match Number::from_f64(n) {
        Some(n) => Ok(vec![JsonPart::Value(Value::Number(n))]),
        None => Err(SemanticError::new(format!("non-finite number {lexeme:?}"))),
    }
}

/// `\xhh` / `\uhhhh`; unpaired surrogates fall back to U+FFFD.
fn parse_char_code(lexeme: &str) -> Result<Vec<JsonPart>, SemanticError> {
    let n = u32::from_str_radix(&lexeme[2..], 16)
        .map_err(|e| SemanticError::new(format!("bad character escape {lexeme:?}: {e}")))?;
    let c = char::from_u32(n).unwrap_or('\u{FFFD}');
    Ok(vec![JsonPart::Value(Value::String(c.to_string()))])
}
