//! Token reconstitution and the no-bare-wildcard guarantee.
//!
//! Every anchored pattern a solution emits must be witnessed by an item of
//! the set it was solved on: prefix anchors appear at the start of some
//! item, suffix anchors at the end, exact patterns equal an item.

use proptest::prelude::*;

use patternforge::{solve, PatternKind, SolveOptions};

use crate::dataset_strategy;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn no_bare_wildcard_patterns((include, exclude) in dataset_strategy()) {
        let solution = solve(&include, &exclude, &SolveOptions::default()).unwrap();
        for pattern in &solution.patterns {
            prop_assert!(
                pattern.text.chars().any(|ch| ch != '*'),
                "bare wildcard pattern {:?}",
                pattern.text
            );
            prop_assert!(pattern.length > 0);
            prop_assert_eq!(
                pattern.wildcards,
                pattern.text.chars().filter(|&c| c == '*').count()
            );
        }
    }

    #[test]
    fn anchored_patterns_are_witnessed((include, exclude) in dataset_strategy()) {
        let solution = solve(&include, &exclude, &SolveOptions::default()).unwrap();
        // Patterns are solved against the include side unless inverted.
        let solved_on: Vec<String> = if solution.global_inverted {
            exclude.iter().map(|s| s.to_lowercase()).collect()
        } else {
            include.iter().map(|s| s.to_lowercase()).collect()
        };

        for pattern in &solution.patterns {
            match pattern.kind {
                PatternKind::Prefix => {
                    let anchor = pattern.text.trim_end_matches('*');
                    prop_assert!(
                        solved_on.iter().any(|item| item.starts_with(anchor)),
                        "prefix {:?} not witnessed",
                        pattern.text
                    );
                }
                PatternKind::Suffix => {
                    let anchor = pattern.text.trim_start_matches('*');
                    prop_assert!(
                        solved_on.iter().any(|item| item.ends_with(anchor)),
                        "suffix {:?} not witnessed",
                        pattern.text
                    );
                }
                PatternKind::Exact => {
                    prop_assert!(
                        solved_on.iter().any(|item| item == &pattern.text),
                        "exact {:?} not witnessed",
                        pattern.text
                    );
                }
                PatternKind::Substring | PatternKind::Multi => {}
            }
        }
    }
}
