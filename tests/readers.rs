//! INI, JSON and LML reader behavior.

use rstest::rstest;
use rulescan::readers::ini::IniReader;
use rulescan::readers::lml::{self, LmlNode};
use rulescan::readers::{json, ReadError};
use rulescan::ScanError;
use serde_json::{json, Value};

#[test]
fn ini_sections_nest_and_properties_land_in_scope() {
    let reader = IniReader::new().unwrap();
    let doc = reader
        .read("top=1\n; a comment\n[server]\nhost=localhost\nport=8080\n[server.tls]\ncert=/etc/cert\n[other]\nx=y\n")
        .unwrap();
    assert_eq!(
        Value::Object(doc),
        json!({
            "top": "1",
            "server": {
                "host": "localhost",
                "port": "8080",
                "tls": { "cert": "/etc/cert" },
            },
            "other": { "x": "y" },
        })
    );
}

#[test]
fn ini_reader_is_reusable_with_fresh_state() {
    let reader = IniReader::new().unwrap();
    let first = reader.read("[a]\nx=1\n").unwrap();
    let second = reader.read("[b]\ny=2\n").unwrap();
    assert_eq!(Value::Object(first), json!({ "a": { "x": "1" } }));
    assert_eq!(Value::Object(second), json!({ "b": { "y": "2" } }));
}

#[test]
fn ini_blank_lines_and_crlf_are_fine() {
    let reader = IniReader::new().unwrap();
    let doc = reader.read("\r\n[s]\r\n\r\nk=v\r\n").unwrap();
    assert_eq!(Value::Object(doc), json!({ "s": { "k": "v" } }));
}

#[rstest]
#[case("x=1\n[x]\n")]
#[case("[a.b]\n[a]\nb=1\n")]
fn ini_name_collisions_are_semantic_errors(#[case] input: &str) {
    let reader = IniReader::new().unwrap();
    assert!(matches!(
        reader.read(input),
        Err(ReadError::Scan(ScanError::Semantic(_)))
    ));
}

#[test]
fn json_reads_a_nested_relaxed_document() {
    let value = json::read(
        r#"{ a: [1, 2.5, "x\n", true, null], "b": 0x1F, c: 017, d: .5, e: undefined }"#,
    )
    .unwrap();
    assert_eq!(
        value,
        json!({
            "a": [1.0, 2.5, "x\n", true, null],
            "b": 31,
            "c": 15,
            "d": 0.5,
            "e": null,
        })
    );
}

#[rstest]
#[case("true", json!(true))]
#[case("false", json!(false))]
#[case("null", json!(null))]
#[case("0", json!(0.0))]
#[case("-12", json!(-12.0))]
#[case("3.25", json!(3.25))]
#[case("0x10", json!(16))]
#[case("07", json!(7))]
#[case("\"\"", json!(""))]
#[case("[]", json!([]))]
#[case("{}", json!({}))]
#[case("  [ 1 , 2 , ]  ", json!([1.0, 2.0]))]
fn json_scalars_and_empties(#[case] input: &str, #[case] expected: Value) {
    assert_eq!(json::read(input).unwrap(), expected);
}

#[test]
fn json_string_escapes_decode() {
    assert_eq!(json::read(r#""a\tb""#).unwrap(), json!("a\tb"));
    assert_eq!(json::read(r#""\x41B""#).unwrap(), json!("AB"));
}

#[rstest]
#[case("{")]
#[case("[1,,2]")]
#[case("tru")]
#[case("01x")]
fn json_rejects_malformed_documents(#[case] input: &str) {
    assert!(matches!(json::read(input), Err(ReadError::Malformed(_))));
}

fn text(s: &str) -> LmlNode {
    LmlNode {
        tag: None,
        text: Some(s.to_string()),
        children: Vec::new(),
    }
}

#[test]
fn lml_builds_a_tree_of_branches_and_text() {
    let root = lml::read("intro html { body { hello world } } outro").unwrap();
    assert_eq!(
        root,
        LmlNode {
            tag: None,
            text: None,
            children: vec![
                text("intro"),
                LmlNode {
                    tag: Some("html".to_string()),
                    text: None,
                    children: vec![LmlNode {
                        tag: Some("body".to_string()),
                        text: None,
                        children: vec![text("hello world")],
                    }],
                },
                text("outro"),
            ],
        }
    );
}

#[test]
fn lml_escaped_braces_stay_text() {
    let root = lml::read("a {{b}}").unwrap();
    assert_eq!(root.children, vec![text("a {b}")]);
}

#[test]
fn lml_empty_document_is_an_empty_root() {
    let root = lml::read("   ").unwrap();
    assert_eq!(
        root,
        LmlNode {
            tag: None,
            text: None,
            children: Vec::new(),
        }
    );
}

#[test]
fn lml_unclosed_branch_is_malformed() {
    assert!(matches!(
        lml::read("a { b"),
        Err(ReadError::Malformed("lml"))
    ));
}
