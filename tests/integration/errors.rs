//! Fail-fast error reporting through the public entry points.

use patternforge::{
    solve, solve_structured, ConfigError, Effort, InputError, Limit, PerField, Row, SolveError,
    SolveOptions,
};

fn strings(texts: &[&str]) -> Vec<String> {
    texts.iter().map(|s| s.to_string()).collect()
}

#[test]
fn negative_weight_fails_before_any_work() {
    let mut options = SolveOptions::default();
    options.weights.w_fp = PerField::Uniform(-2.0);
    let err = solve(&strings(&["a/b"]), &[], &options).unwrap_err();
    assert!(matches!(
        err,
        SolveError::Config(ConfigError::NegativeWeight { name: "w_fp", .. })
    ));
}

#[test]
fn zero_min_token_len_rejected() {
    let mut options = SolveOptions::default();
    options.min_token_len = PerField::Uniform(0);
    let err = solve(&strings(&["a/b"]), &[], &options).unwrap_err();
    assert!(matches!(
        err,
        SolveError::Config(ConfigError::InvalidMinTokenLen)
    ));
}

#[test]
fn empty_allowed_patterns_rejected() {
    let mut options = SolveOptions::default();
    options.allowed_patterns = Some(Default::default());
    let err = solve(&strings(&["a/b"]), &[], &options).unwrap_err();
    assert!(matches!(
        err,
        SolveError::Config(ConfigError::NoAllowedKinds)
    ));
}

#[test]
fn improper_fraction_rejected() {
    let mut options = SolveOptions::default();
    options.budgets.max_fn = Some(Limit::Fraction(1.0));
    let err = solve(&strings(&["a/b"]), &[], &options).unwrap_err();
    assert!(matches!(
        err,
        SolveError::Config(ConfigError::InvalidFraction { name: "max_fn", .. })
    ));
}

#[test]
fn contradictory_budgets_rejected() {
    let mut options = SolveOptions::default();
    options.budgets.max_patterns = Some(Limit::Count(0));
    options.budgets.max_fn = Some(Limit::Count(0));
    let err = solve(&strings(&["a/b"]), &[], &options).unwrap_err();
    assert!(matches!(
        err,
        SolveError::Config(ConfigError::ContradictoryBudgets { .. })
    ));
}

#[test]
fn exhaustive_effort_needs_small_dataset() {
    let include: Vec<String> = (0..150).map(|i| format!("row/{i}")).collect();
    let mut options = SolveOptions::default();
    options.effort = Effort::Exhaustive;
    let err = solve(&include, &[], &options).unwrap_err();
    assert!(matches!(
        err,
        SolveError::Config(ConfigError::ExhaustiveTooLarge { rows: 150, fields: 1 })
    ));
}

#[test]
fn structured_field_mismatch_names_the_row() {
    let good: Row = [("a".to_string(), Some("x".to_string()))].into_iter().collect();
    let bad: Row = [("b".to_string(), Some("y".to_string()))].into_iter().collect();

    let err = solve_structured(
        &[good.clone()],
        &[good.clone(), bad],
        &SolveOptions::default(),
    )
    .unwrap_err();
    match err {
        SolveError::Input(InputError::FieldMismatch { row, .. }) => assert_eq!(row, 2),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn errors_render_human_readable_messages() {
    let err = SolveError::Config(ConfigError::InvalidMinTokenLen);
    assert_eq!(
        err.to_string(),
        "configuration error: min_token_len must be at least 1"
    );

    let err = SolveError::Input(InputError::FieldMismatch {
        row: 3,
        detail: "expected [\"a\"]".to_string(),
    });
    assert!(err.to_string().contains("row 3"));
}
