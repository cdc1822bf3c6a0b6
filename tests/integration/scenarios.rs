//! Literal end-to-end scenarios, EXACT mode unless noted.
//!
//! Assertions pin the coverage contract (covered/fp/fn) exactly and check
//! the expression semantically by re-matching every item; the precise
//! pattern texts are allowed to vary between equally-valid shapes.

use patternforge::matcher::matches;
use patternforge::{
    solve, solve_structured, InvertStrategy, QualityMode, Row, Solution, SolveOptions,
};

fn strings(texts: &[&str]) -> Vec<String> {
    texts.iter().map(|s| s.to_string()).collect()
}

fn row(pairs: &[(&str, Option<&str>)]) -> Row {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.map(|s| s.to_string())))
        .collect()
}

fn disjunction_matches(solution: &Solution, item: &str) -> bool {
    let normalized = item.to_lowercase();
    let hit = solution
        .patterns
        .iter()
        .any(|p| matches(&p.text, &normalized));
    hit != solution.global_inverted
}

/// Scenario: include items share a prefix or a keyword the excludes lack.
#[test]
fn shared_prefix() {
    let include = strings(&[
        "alpha/module1/mem/i0",
        "alpha/module2/io/i1",
        "beta/cache/bank0",
    ]);
    let exclude = strings(&["gamma/module1/mem/i0", "beta/router/debug"]);
    let solution = solve(&include, &exclude, &SolveOptions::default()).unwrap();

    assert_eq!(solution.metrics.covered, 3);
    assert_eq!(solution.metrics.fp, 0);
    assert_eq!(solution.metrics.fn_, 0);
    assert!(solution.patterns.len() <= 2, "{solution:?}");
    for item in &include {
        assert!(disjunction_matches(&solution, item), "misses {item}");
    }
    for item in &exclude {
        assert!(!disjunction_matches(&solution, item), "hits {item}");
    }
}

/// With inversion disabled the same dataset yields the direct form: an
/// alpha-anchored pattern plus one for the cache row.
#[test]
fn shared_prefix_direct_form() {
    let include = strings(&[
        "alpha/module1/mem/i0",
        "alpha/module2/io/i1",
        "beta/cache/bank0",
    ]);
    let exclude = strings(&["gamma/module1/mem/i0", "beta/router/debug"]);
    let mut options = SolveOptions::default();
    options.invert = InvertStrategy::Never;
    let solution = solve(&include, &exclude, &options).unwrap();

    assert_eq!(solution.metrics.covered, 3);
    assert_eq!(solution.metrics.fp, 0);
    assert_eq!(solution.metrics.fn_, 0);
    assert!(!solution.global_inverted);
    assert_eq!(solution.patterns.len(), 2, "{solution:?}");
    assert!(solution.raw_expr.contains("alpha"), "{}", solution.raw_expr);
}

/// Scenario: a single disjoint keyword separates the sets.
#[test]
fn simple_disjoint_keyword() {
    let include = strings(&["a/x/fail", "b/y/fail", "c/z/fail"]);
    let exclude = strings(&["a/x/pass", "b/y/pass"]);
    let solution = solve(&include, &exclude, &SolveOptions::default()).unwrap();

    // A single fail-anchored pattern; the suffix form is equivalent to
    // the substring form on this data and wins on wildcard count.
    assert!(
        ["*fail", "*fail*"].contains(&solution.raw_expr.as_str()),
        "{}",
        solution.raw_expr
    );
    assert_eq!(solution.expr, "P1");
    assert_eq!(solution.metrics.covered, 3);
    assert_eq!(solution.metrics.fp, 0);
    assert!(!solution.global_inverted);
}

/// Scenario: the same string on both sides makes EXACT unsolvable; the
/// empty solution is returned as success.
#[test]
fn unsolvable_exact() {
    let include = strings(&["x"]);
    let exclude = strings(&["x"]);
    let solution = solve(&include, &exclude, &SolveOptions::default()).unwrap();

    assert!(solution.patterns.is_empty());
    assert_eq!(solution.expr, "FALSE");
    assert_eq!(solution.metrics.covered, 0);
    assert_eq!(solution.metrics.fp, 0);
    assert_eq!(solution.metrics.fn_, 1);
}

/// Scenario: empty exclude set with a single include item must still give
/// a concrete pattern, never a bare `*`.
#[test]
fn empty_exclude_single_item() {
    let include = strings(&["chip/cpu/core0"]);
    let solution = solve(&include, &[], &SolveOptions::default()).unwrap();

    assert_eq!(solution.metrics.covered, 1);
    assert_eq!(solution.metrics.fp, 0);
    assert_eq!(solution.metrics.fn_, 0);
    assert!(!solution.patterns.is_empty());
    for pattern in &solution.patterns {
        assert!(
            pattern.text.chars().any(|c| c != '*'),
            "bare wildcard {:?}",
            pattern.text
        );
    }
    assert!(disjunction_matches(&solution, "chip/cpu/core0"));
}

/// Scenario: structured rows where only the pin field separates the sets.
#[test]
fn structured_multi_field_reduction() {
    let include = vec![
        row(&[("m", Some("SRAM")), ("i", Some("cpu/l1")), ("p", Some("DIN"))]),
        row(&[("m", Some("SRAM")), ("i", Some("cpu/l1")), ("p", Some("DOUT"))]),
    ];
    let exclude = vec![row(&[
        ("m", Some("SRAM")),
        ("i", Some("cpu/l1")),
        ("p", Some("CLK")),
    ])];
    let solution = solve_structured(&include, &exclude, &SolveOptions::default()).unwrap();

    assert_eq!(solution.metrics.covered, 2);
    assert_eq!(solution.metrics.fp, 0);
    // Only the pin field can separate these rows.
    for pattern in &solution.patterns {
        assert_eq!(pattern.field.as_deref(), Some("p"), "{pattern:?}");
    }
    let terms = solution.terms.as_ref().expect("structured terms");
    assert!(!terms.is_empty() && terms.len() <= 2, "{terms:?}");
}

/// Scenario: an exclude row with null (don't-care) fields rejects any
/// pattern that would match debug instances; patterns on non-debug
/// instances survive.
#[test]
fn none_wildcard_exclude() {
    let include = vec![
        row(&[("m", Some("SRAM")), ("i", Some("cpu/l1")), ("p", Some("DIN"))]),
        row(&[("m", Some("SRAM")), ("i", Some("cpu/l2")), ("p", Some("DIN"))]),
    ];
    let exclude = vec![row(&[("m", None), ("i", Some("debug/l1")), ("p", None)])];
    let solution = solve_structured(&include, &exclude, &SolveOptions::default()).unwrap();

    assert_eq!(solution.metrics.covered, 2);
    assert_eq!(solution.metrics.fp, 0);
    // The m and p fields are don't-care on the exclude row, so the
    // surviving expression must discriminate on i.
    assert!(
        solution
            .patterns
            .iter()
            .any(|p| p.field.as_deref() == Some("i")),
        "{solution:?}"
    );
    // And no selected i-pattern matches the debug instance.
    for pattern in &solution.patterns {
        if pattern.field.as_deref() == Some("i") {
            assert!(!matches(&pattern.text, "debug/l1"), "{pattern:?}");
        }
    }
}

/// Scenario: inversion FP safety. When the complement solution would
/// carry false positives, `invert = always` must fall back to the base
/// selection instead of returning a violating inverted answer.
#[test]
fn inversion_fp_safety() {
    let include = strings(&["m/i0/d", "m/i1/d", "m/i2/d"]);
    let exclude = strings(&["m/i3/d", "m/i4/d", "debug/i0/d"]);
    let mut options = SolveOptions::default();
    options.mode = QualityMode::Exact;
    options.invert = InvertStrategy::Always;
    let solution = solve(&include, &exclude, &options).unwrap();

    assert_eq!(solution.metrics.fp, 0, "{solution:?}");
    for item in &exclude {
        assert!(!disjunction_matches(&solution, item), "hits {item}");
    }
}

/// An inverted solution that is admissible should be taken under
/// `invert = always` and report complement semantics.
#[test]
fn inversion_happy_path() {
    // The exclude side has one crisp keyword; the include side is
    // heterogeneous, so the complement is the simpler description.
    let include = strings(&["alpha/mem", "beta/cache", "gamma/core"]);
    let exclude = strings(&["debug/a", "debug/b"]);
    let mut options = SolveOptions::default();
    options.invert = InvertStrategy::Always;
    let solution = solve(&include, &exclude, &options).unwrap();

    assert!(solution.global_inverted, "{solution:?}");
    assert_eq!(solution.metrics.covered, 3);
    assert_eq!(solution.metrics.fp, 0);
    for item in &include {
        assert!(disjunction_matches(&solution, item), "misses {item}");
    }
    for item in &exclude {
        assert!(!disjunction_matches(&solution, item), "hits {item}");
    }
}

/// Approx mode with an explicit FP budget may trade a false positive for
/// a simpler expression, but never beyond the budget.
#[test]
fn approx_mode_respects_explicit_budget() {
    let include = strings(&["top/fail/a", "top/fail/b", "top/warn/c"]);
    let exclude = strings(&["top/pass/a", "top/warn/d"]);
    let mut options = SolveOptions::default();
    options.mode = QualityMode::Approx;
    options.budgets.max_fp = Some(patternforge::Limit::Count(1));
    let solution = solve(&include, &exclude, &options).unwrap();

    assert!(solution.metrics.fp <= 1, "{solution:?}");
    assert!(solution.metrics.covered >= 2, "{solution:?}");
}
