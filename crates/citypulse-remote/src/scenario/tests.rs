use super::*;
use serde_json::json;

#[test]
fn test_parse_blank_is_none() {
    assert_eq!(Expectation::parse(""), None);
    assert_eq!(Expectation::parse("   "), None);
}

#[test]
fn test_parse_plain_text() {
    assert_eq!(
        Expectation::parse("contains: outage"),
        Some(Expectation::Text("contains: outage".to_string()))
    );
}

#[test]
fn test_parse_structured_predicate() {
    let parsed = Expectation::parse(r#"{"contains": "resolved", "hasActions": true}"#).unwrap();
    match parsed {
        Expectation::Structured(predicate) => {
            assert_eq!(predicate.contains.as_deref(), Some("resolved"));
            assert_eq!(predicate.has_actions, Some(true));
            assert!(predicate.extra.is_empty());
        }
        other => panic!("expected structured predicate, got {:?}", other),
    }
}

#[test]
fn test_parse_leading_whitespace_is_text() {
    let raw = r#"  {"contains": "resolved"}"#;
    assert_eq!(
        Expectation::parse(raw),
        Some(Expectation::Text(raw.to_string()))
    );
}

#[test]
fn test_parse_malformed_brace_falls_back_to_verbatim_text() {
    let raw = "{not json at all";
    assert_eq!(
        Expectation::parse(raw),
        Some(Expectation::Text(raw.to_string()))
    );
}

#[test]
fn test_expectation_wire_format_is_untagged() {
    let text: Expectation = serde_json::from_value(json!("all clear")).unwrap();
    assert_eq!(text, Expectation::Text("all clear".to_string()));

    let structured: Expectation =
        serde_json::from_value(json!({"hasActions": false, "tone": "calm"})).unwrap();
    match structured {
        Expectation::Structured(predicate) => {
            assert_eq!(predicate.has_actions, Some(false));
            assert_eq!(predicate.extra.get("tone"), Some(&json!("calm")));
        }
        other => panic!("expected structured predicate, got {:?}", other),
    }
}

#[test]
fn test_evaluate_three_way_classification() {
    let pass = evaluate(
        Some(&Expectation::Text("contains: outage".to_string())),
        &AgentReply::text("outage resolved"),
    );
    let fail = evaluate(
        Some(&Expectation::Text("contains: fail".to_string())),
        &AgentReply::text("all clear"),
    );
    let unknown = evaluate(None, &AgentReply::text("error"));

    assert_eq!(pass.outcome, ScenarioOutcome::Pass);
    assert_eq!(fail.outcome, ScenarioOutcome::Fail);
    assert_eq!(unknown.outcome, ScenarioOutcome::Unknown);
    assert!(fail.notes.contains("fail"));
}

#[test]
fn test_evaluate_text_is_case_insensitive() {
    let eval = evaluate(
        Some(&Expectation::Text("Outage".to_string())),
        &AgentReply::text("OUTAGE resolved on 5th Ave"),
    );
    assert_eq!(eval.outcome, ScenarioOutcome::Pass);
}

#[test]
fn test_evaluate_predicate_requires_actions() {
    let predicate = Expectation::Structured(ExpectationPredicate {
        contains: Some("dispatch".to_string()),
        has_actions: Some(true),
        extra: serde_json::Map::new(),
    });

    let without_actions = evaluate(Some(&predicate), &AgentReply::text("dispatch crew"));
    assert_eq!(without_actions.outcome, ScenarioOutcome::Fail);
    assert!(without_actions.notes.contains("no actions"));

    let with_actions = AgentReply {
        text: "Dispatch crew to zone 4".to_string(),
        actions: vec![json!({"type": "dispatch", "zone": 4})],
    };
    assert_eq!(
        evaluate(Some(&predicate), &with_actions).outcome,
        ScenarioOutcome::Pass
    );
}

#[test]
fn test_evaluate_predicate_without_known_keys_is_unknown() {
    let mut extra = serde_json::Map::new();
    extra.insert("sentiment".to_string(), json!("positive"));
    let predicate = Expectation::Structured(ExpectationPredicate {
        contains: None,
        has_actions: None,
        extra,
    });

    let eval = evaluate(Some(&predicate), &AgentReply::text("anything"));
    assert_eq!(eval.outcome, ScenarioOutcome::Unknown);
}

#[test]
fn test_tally_counts_outcomes() {
    let results = vec![
        ScenarioResult {
            scenario_name: "a".to_string(),
            outcome: ScenarioOutcome::Pass,
            ..Default::default()
        },
        ScenarioResult {
            scenario_name: "b".to_string(),
            outcome: ScenarioOutcome::Fail,
            ..Default::default()
        },
        ScenarioResult {
            scenario_name: "c".to_string(),
            outcome: ScenarioOutcome::Unknown,
            ..Default::default()
        },
    ];

    let summary = BatchSummary::tally(&results);
    assert_eq!(
        summary,
        BatchSummary {
            pass: 1,
            fail: 1,
            unknown: 1
        }
    );
    assert_eq!(summary.total(), 3);
}

#[test]
fn test_batch_result_missing_counts_default_to_zero() {
    let batch: BatchResult = serde_json::from_value(json!({
        "summary": {"pass": 2},
        "results": [{"scenarioName": "x", "outcome": "pass"}]
    }))
    .unwrap();

    assert_eq!(batch.summary.pass, 2);
    assert_eq!(batch.summary.fail, 0);
    assert_eq!(batch.summary.unknown, 0);
    assert_eq!(batch.results.len(), 1);

    let empty: BatchResult = serde_json::from_value(json!({})).unwrap();
    assert_eq!(empty.summary, BatchSummary::default());
}
