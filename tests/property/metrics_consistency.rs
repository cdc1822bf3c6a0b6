//! Match soundness: the metrics a solution reports must agree with what
//! its patterns actually match when re-run through the public matcher.

use proptest::prelude::*;

use patternforge::matcher::matches;
use patternforge::{solve, InvertStrategy, QualityMode, Solution, SolveOptions};

use crate::dataset_strategy;

fn disjunction_matches(solution: &Solution, item: &str) -> bool {
    let normalized = item.to_lowercase();
    solution
        .patterns
        .iter()
        .any(|pattern| matches(&pattern.text, &normalized))
}

fn check_consistency(include: &[String], exclude: &[String], solution: &Solution) {
    let hits_include = include
        .iter()
        .filter(|item| disjunction_matches(solution, item))
        .count();
    let hits_exclude = exclude
        .iter()
        .filter(|item| disjunction_matches(solution, item))
        .count();

    let (covered, fp) = if solution.global_inverted {
        (include.len() - hits_include, exclude.len() - hits_exclude)
    } else {
        (hits_include, hits_exclude)
    };

    assert_eq!(solution.metrics.covered, covered, "{solution:?}");
    assert_eq!(solution.metrics.fp, fp, "{solution:?}");
    assert_eq!(
        solution.metrics.fn_,
        include.len() - covered,
        "{solution:?}"
    );
    assert_eq!(solution.metrics.total_positive, include.len());
    assert_eq!(solution.metrics.total_negative, exclude.len());
    assert_eq!(solution.metrics.patterns, solution.patterns.len());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn reported_metrics_match_reality((include, exclude) in dataset_strategy()) {
        let solution = solve(&include, &exclude, &SolveOptions::default()).unwrap();
        check_consistency(&include, &exclude, &solution);
    }

    #[test]
    fn approx_mode_metrics_match_reality((include, exclude) in dataset_strategy()) {
        let mut options = SolveOptions::default();
        options.mode = QualityMode::Approx;
        let solution = solve(&include, &exclude, &options).unwrap();
        check_consistency(&include, &exclude, &solution);
    }

    #[test]
    fn inverted_metrics_match_reality((include, exclude) in dataset_strategy()) {
        let mut options = SolveOptions::default();
        options.invert = InvertStrategy::Always;
        let solution = solve(&include, &exclude, &options).unwrap();
        check_consistency(&include, &exclude, &solution);
    }

    #[test]
    fn per_pattern_stats_match_reality((include, exclude) in dataset_strategy()) {
        let options = SolveOptions::default();
        let solution = solve(&include, &exclude, &options).unwrap();
        // Pattern-level stats are counted against the sets the patterns
        // were solved on: swapped when the solution is inverted.
        let (pos, neg) = if solution.global_inverted {
            (&exclude, &include)
        } else {
            (&include, &exclude)
        };
        for pattern in &solution.patterns {
            let matched = pos
                .iter()
                .filter(|item| matches(&pattern.text, &item.to_lowercase()))
                .count();
            let false_hits = neg
                .iter()
                .filter(|item| matches(&pattern.text, &item.to_lowercase()))
                .count();
            prop_assert_eq!(pattern.matches, Some(matched));
            prop_assert_eq!(pattern.fp, Some(false_hits));
        }
    }
}
