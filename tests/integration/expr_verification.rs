//! Verifying a solution's symbolic expression with the boolean evaluator,
//! the same way external tooling double-checks a hypothesis.

use std::collections::BTreeMap;

use patternforge::boolex::{self, ExprMetrics};
use patternforge::{solve, InvertStrategy, SolveOptions};

fn strings(texts: &[&str]) -> Vec<String> {
    texts.iter().map(|s| s.to_string()).collect()
}

fn catalog_of(solution: &patternforge::Solution) -> BTreeMap<String, String> {
    solution
        .patterns
        .iter()
        .map(|p| (p.id.clone(), p.text.clone()))
        .collect()
}

#[test]
fn symbolic_expr_reproduces_metrics() {
    let include = strings(&["a/x/fail", "b/y/fail", "c/z/fail"]);
    let exclude = strings(&["a/x/pass", "b/y/pass"]);
    let mut options = SolveOptions::default();
    options.invert = InvertStrategy::Never;
    let solution = solve(&include, &exclude, &options).unwrap();

    let metrics = boolex::evaluate_metrics(
        &solution.expr,
        &catalog_of(&solution),
        &include,
        &exclude,
    )
    .unwrap();

    assert_eq!(
        metrics,
        ExprMetrics {
            covered: solution.metrics.covered,
            total_positive: solution.metrics.total_positive,
            fp: solution.metrics.fp,
            fn_: solution.metrics.fn_,
        }
    );
}

#[test]
fn negated_expr_describes_inverted_solution() {
    let include = strings(&["alpha/mem", "beta/cache", "gamma/core"]);
    let exclude = strings(&["debug/a", "debug/b"]);
    let mut options = SolveOptions::default();
    options.invert = InvertStrategy::Always;
    let solution = solve(&include, &exclude, &options).unwrap();
    assert!(solution.global_inverted);

    // Wrap the reported disjunction in a negation to get the effective
    // predicate of an inverted solution.
    let negated = format!("!({})", solution.expr);
    let metrics = boolex::evaluate_metrics(
        &negated,
        &catalog_of(&solution),
        &include,
        &exclude,
    )
    .unwrap();

    assert_eq!(metrics.covered, solution.metrics.covered);
    assert_eq!(metrics.fp, solution.metrics.fp);
}

#[test]
fn malformed_expression_is_a_parse_error_not_a_solver_concern() {
    let catalog: BTreeMap<String, String> =
        [("P1".to_string(), "*x*".to_string())].into_iter().collect();
    let err = boolex::evaluate_metrics("P1 |", &catalog, &[], &[]).unwrap_err();
    assert!(matches!(err, boolex::ExprError::Parse(_)));
}
