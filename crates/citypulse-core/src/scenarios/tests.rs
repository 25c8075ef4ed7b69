use super::*;
use crate::context::CityContext;
use crate::error::Error;
use crate::storage::ActiveCityStore;
use citypulse_remote::mock::ops;
use citypulse_remote::{Error as RemoteError, MockRemoteClient};
use std::sync::Arc;
use std::time::Duration;

fn create_runner() -> (ScenarioRunner, Arc<MockRemoteClient>, ActiveCityStore) {
    let mock = Arc::new(MockRemoteClient::new());
    let store = ActiveCityStore::in_memory();
    let context = CityContext::new(mock.clone(), store.clone());
    (ScenarioRunner::new(mock.clone(), context), mock, store)
}

async fn seed_three(runner: &ScenarioRunner, mock: &MockRemoteClient) {
    mock.set_agent_reply("Is the outage fixed?", AgentReply::text("outage resolved"));
    mock.set_agent_reply("Any failures?", AgentReply::text("all clear"));
    mock.set_agent_reply("Say anything", AgentReply::text("error"));

    runner
        .create(ScenarioDraft::new("Outage", "Is the outage fixed?").with_expectation("contains: outage"))
        .await
        .unwrap();
    runner
        .create(ScenarioDraft::new("Failures", "Any failures?").with_expectation("contains: fail"))
        .await
        .unwrap();
    runner
        .create(ScenarioDraft::new("Open", "Say anything"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_batch_yields_one_of_each_outcome() {
    let (runner, mock, _) = create_runner();
    seed_three(&runner, &mock).await;

    let batch = runner.run_all(None).await.unwrap();

    assert_eq!(
        batch.summary,
        BatchSummary {
            pass: 1,
            fail: 1,
            unknown: 1
        }
    );
    let outcome_of = |name: &str| {
        batch
            .results
            .iter()
            .find(|r| r.scenario_name == name)
            .map(|r| r.outcome)
    };
    assert_eq!(outcome_of("Outage"), Some(ScenarioOutcome::Pass));
    assert_eq!(outcome_of("Failures"), Some(ScenarioOutcome::Fail));
    assert_eq!(outcome_of("Open"), Some(ScenarioOutcome::Unknown));

    let board = runner.board();
    assert_eq!(board.last_batch.unwrap().summary.total(), 3);
    assert!(board.scenarios.iter().all(|s| s.last_run_outcome.is_some()));
    assert!(!board.busy);
}

#[tokio::test]
async fn test_list_keeps_backend_order() {
    let (runner, mock, _) = create_runner();
    seed_three(&runner, &mock).await;

    let names: Vec<String> = runner
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.name)
        .collect();
    assert_eq!(names, vec!["Open", "Failures", "Outage"]);
}

#[tokio::test]
async fn test_create_rejects_empty_input_without_remote_call() {
    let (runner, mock, _) = create_runner();

    let result = runner.create(ScenarioDraft::new("No input", "   ")).await;

    assert!(matches!(result, Err(Error::Validation(_))));
    assert_eq!(mock.call_count(ops::CREATE_SCENARIO), 0);
    assert!(runner.board().error.is_some());

    let result = runner.create(ScenarioDraft::new("", "hello")).await;
    assert!(matches!(result, Err(Error::Validation(_))));
    assert_eq!(mock.call_count(ops::CREATE_SCENARIO), 0);
}

#[tokio::test]
async fn test_create_sends_input_message_as_typed() {
    let (runner, _, _) = create_runner();

    let created = runner
        .create(ScenarioDraft::new("  Padded  ", "  check the grid\n"))
        .await
        .unwrap();

    assert_eq!(created.name, "Padded");
    assert_eq!(created.input_message, "  check the grid\n");
}

#[tokio::test]
async fn test_create_parses_structured_expectation() {
    let (runner, _, _) = create_runner();

    let created = runner
        .create(
            ScenarioDraft::new("Actions", "Turn on the lights")
                .with_expectation(r#"{"contains": "lights", "hasActions": true}"#),
        )
        .await
        .unwrap();

    match created.expected_outcome {
        Some(Expectation::Structured(predicate)) => {
            assert_eq!(predicate.contains.as_deref(), Some("lights"));
            assert_eq!(predicate.has_actions, Some(true));
        }
        other => panic!("expected structured predicate, got {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_predicate_degrades_to_text() {
    let (runner, _, _) = create_runner();

    let created = runner
        .create(ScenarioDraft::new("Broken", "hi").with_expectation("{not json"))
        .await
        .unwrap();

    assert_eq!(
        created.expected_outcome,
        Some(Expectation::Text("{not json".to_string()))
    );
}

#[tokio::test]
async fn test_failed_run_still_reloads_and_keeps_scenario() {
    let (runner, mock, _) = create_runner();
    let created = runner
        .create(ScenarioDraft::new("Flaky", "ping"))
        .await
        .unwrap();
    mock.set_run_error(Some(RemoteError::Api {
        status: 502,
        message: "agent unavailable".to_string(),
    }));
    let lists_before = mock.call_count(ops::LIST_SCENARIOS);

    let result = runner.run_one(&created.id, None).await;

    assert!(matches!(result, Err(Error::Remote(_))));
    assert_eq!(mock.call_count(ops::LIST_SCENARIOS), lists_before + 1);
    let board = runner.board();
    assert!(board.error.unwrap().contains("agent unavailable"));
    assert_eq!(board.scenarios.len(), 1);
    assert_eq!(board.scenarios[0].id, created.id);
    assert!(!board.busy);
}

#[tokio::test]
async fn test_failed_batch_still_reloads() {
    let (runner, mock, _) = create_runner();
    seed_three(&runner, &mock).await;
    mock.set_batch_error(Some(RemoteError::Timeout(30_000)));

    assert!(runner.run_all(None).await.is_err());

    // The batch ran before failing; the reload reflects it
    let board = runner.board();
    assert!(board.error.is_some());
    assert!(board.last_batch.is_none());
    assert!(board.scenarios.iter().all(|s| s.last_run_outcome.is_some()));
}

#[tokio::test]
async fn test_reported_summary_is_replaced_by_tally() {
    let (runner, mock, _) = create_runner();
    seed_three(&runner, &mock).await;
    mock.set_reported_summary(Some(BatchSummary {
        pass: 3,
        ..Default::default()
    }));

    let batch = runner.run_all(None).await.unwrap();
    assert_eq!(batch.summary, BatchSummary::tally(&batch.results));
    assert_eq!(batch.summary.pass, 1);
}

#[tokio::test]
async fn test_run_defaults_to_active_city() {
    let (runner, mock, store) = create_runner();
    seed_three(&runner, &mock).await;

    runner.run_all(None).await.unwrap();
    assert_eq!(mock.last_run_city(), None);

    store.persist("chicago").unwrap();
    runner.run_all(None).await.unwrap();
    assert_eq!(mock.last_run_city().as_deref(), Some("chicago"));

    runner.run_all(Some("la")).await.unwrap();
    assert_eq!(mock.last_run_city().as_deref(), Some("la"));
}

#[tokio::test]
async fn test_delete_requires_confirmation() {
    let (runner, mock, _) = create_runner();
    let created = runner
        .create(ScenarioDraft::new("Doomed", "bye"))
        .await
        .unwrap();

    let result = runner.delete(&created.id, Confirmation::Declined).await;
    assert!(matches!(result, Err(Error::ConfirmationRequired(_))));
    assert_eq!(mock.call_count(ops::DELETE_SCENARIO), 0);

    runner
        .delete(&created.id, Confirmation::from_flag(true))
        .await
        .unwrap();
    assert_eq!(mock.call_count(ops::DELETE_SCENARIO), 1);
    assert!(runner.board().scenarios.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_abandoned_run_clears_busy() {
    let (runner, mock, _) = create_runner();
    let created = runner
        .create(ScenarioDraft::new("Slow", "ping"))
        .await
        .unwrap();
    mock.set_run_delay(Duration::from_secs(30));
    let mut board = runner.subscribe();

    let abandoned =
        tokio::time::timeout(Duration::from_secs(1), runner.run_one(&created.id, None)).await;
    assert!(abandoned.is_err());
    assert!(board.has_changed().unwrap());
    assert!(!board.borrow_and_update().busy);

    let abandoned = tokio::time::timeout(Duration::from_secs(1), runner.run_all(None)).await;
    assert!(abandoned.is_err());
    assert!(!runner.board().busy);
}
