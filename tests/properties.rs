//! Property tests for matching behavior.

use proptest::prelude::*;
use rulescan::Grammar;

proptest! {
    // Alphanumeric words have no pattern metacharacters, so a word used as
    // a literal pattern accepts exactly itself.
    #[test]
    fn literal_patterns_accept_exactly_their_own_text(word in "[a-z0-9]{1,20}") {
        let mut g: Grammar<()> = Grammar::new();
        g.add("root", &word).unwrap();
        prop_assert!(g.scan("root", &word).unwrap().is_success);
        let longer = format!("{word}z!");
        prop_assert!(!g.scan("root", &longer).unwrap().is_success);
        prop_assert!(!g.scan("root", &word[..word.len() - 1]).unwrap().is_success);
    }

    #[test]
    fn unbounded_minimum_accepts_any_longer_run(min in 0u32..8, extra in 0u32..8) {
        let mut g: Grammar<()> = Grammar::new();
        g.add("root", &format!("y{{{min},}}")).unwrap();
        let input = "y".repeat((min + extra) as usize);
        prop_assert!(g.scan("root", &input).unwrap().is_success);
        if min > 0 {
            let short = "y".repeat((min - 1) as usize);
            prop_assert!(!g.scan("root", &short).unwrap().is_success);
        }
    }

    #[test]
    fn bounded_repetition_accepts_only_counts_in_range(lo in 0u32..5, gap in 0u32..5, n in 0u32..12) {
        let hi = lo + gap;
        let mut g: Grammar<()> = Grammar::new();
        g.add("root", &format!("y{{{lo},{hi}}}")).unwrap();
        let input = "y".repeat(n as usize);
        let expected = lo <= n && n <= hi;
        prop_assert_eq!(g.scan("root", &input).unwrap().is_success, expected);
    }
}
