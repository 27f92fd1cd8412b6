//! Calculator reader behavior.

use rstest::rstest;
use rulescan::readers::calc;

#[rstest]
#[case("3*4*10", 120.0)]
#[case("10*(3+4)", 70.0)]
#[case("(3+4)+(5+7)", 19.0)]
#[case("2+3*4", 14.0)]
#[case("(2+3)*4", 20.0)]
#[case("42", 42.0)]
#[case("((7))", 7.0)]
fn evaluates_with_precedence(#[case] input: &str, #[case] expected: f64) {
    assert_eq!(calc::evaluate(input).unwrap(), expected);
}

#[rstest]
#[case("2*3x")]
#[case("2*")]
#[case("")]
#[case("(2+3")]
#[case("+2")]
fn rejects_malformed_expressions(#[case] input: &str) {
    assert!(calc::evaluate(input).is_err());
}
