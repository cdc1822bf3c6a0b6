//! Solution serialization: flat keys, primitive values, stable shape.

use patternforge::{solve, solve_structured, Row, Solution, SolveOptions};

fn strings(texts: &[&str]) -> Vec<String> {
    texts.iter().map(|s| s.to_string()).collect()
}

#[test]
fn single_field_solution_shape() {
    let include = strings(&["a/x/fail", "b/y/fail"]);
    let exclude = strings(&["a/x/pass"]);
    let solution = solve(&include, &exclude, &SolveOptions::default()).unwrap();

    let value: serde_json::Value = serde_json::to_value(&solution).unwrap();
    let object = value.as_object().unwrap();

    for key in [
        "expr",
        "raw_expr",
        "patterns",
        "metrics",
        "witnesses",
        "global_inverted",
        "diagnostics",
    ] {
        assert!(object.contains_key(key), "missing {key}");
    }
    // Terms are structured-mode only.
    assert!(!object.contains_key("terms"));

    let metrics = object["metrics"].as_object().unwrap();
    // The miss count serializes under the key "fn".
    assert!(metrics.contains_key("fn"));
    assert!(metrics.contains_key("covered"));
    assert!(metrics.contains_key("total_negative"));

    let patterns = object["patterns"].as_array().unwrap();
    assert!(!patterns.is_empty());
    let first = patterns[0].as_object().unwrap();
    for key in ["id", "text", "kind", "wildcards", "length", "matches", "fp"] {
        assert!(first.contains_key(key), "missing pattern key {key}");
    }
    // No field tag in single-field mode.
    assert!(!first.contains_key("field"));
}

#[test]
fn structured_solution_carries_terms_and_fields() {
    let row = |m: &str, p: &str| -> Row {
        [
            ("m".to_string(), Some(m.to_string())),
            ("p".to_string(), Some(p.to_string())),
        ]
        .into_iter()
        .collect()
    };
    let include = vec![row("sram", "din"), row("sram", "dout")];
    let exclude = vec![row("sram", "clk")];
    let solution = solve_structured(&include, &exclude, &SolveOptions::default()).unwrap();

    let value: serde_json::Value = serde_json::to_value(&solution).unwrap();
    let object = value.as_object().unwrap();
    let terms = object["terms"].as_array().unwrap();
    assert!(!terms.is_empty());
    let term = terms[0].as_object().unwrap();
    for key in [
        "fields",
        "matches",
        "fp",
        "fn",
        "incremental_matches",
        "incremental_fp",
        "length",
    ] {
        assert!(term.contains_key(key), "missing term key {key}");
    }

    for pattern in object["patterns"].as_array().unwrap() {
        assert!(pattern.as_object().unwrap().contains_key("field"));
    }
}

#[test]
fn round_trip_preserves_solution() {
    let include = strings(&["alpha/mem/i0", "alpha/io/i1"]);
    let exclude = strings(&["beta/mem/i0"]);
    let solution = solve(&include, &exclude, &SolveOptions::default()).unwrap();

    let json = serde_json::to_string_pretty(&solution).unwrap();
    let decoded: Solution = serde_json::from_str(&json).unwrap();
    assert_eq!(solution, decoded);
}

#[test]
fn options_round_trip_through_json() {
    let options = SolveOptions::default();
    let json = serde_json::to_string(&options).unwrap();
    let decoded: SolveOptions = serde_json::from_str(&json).unwrap();
    assert_eq!(options, decoded);
}
