use super::*;
use crate::error::Error;
use crate::event_bus::{BusEvent, BusTopic, EventBus};
use crate::storage::{ActiveCityStore, KeyValueStore, SessionStore, ACTIVE_CITY_KEY};
use citypulse_remote::mock::ops;
use citypulse_remote::{
    CityRecord, Error as RemoteError, MockRemoteClient, SelectCityResponse, ZonesSummary,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;

struct TestContext {
    pipeline: Arc<ActivationPipeline>,
    mock: Arc<MockRemoteClient>,
    events: Arc<Mutex<Vec<BusEvent>>>,
    session: Arc<SessionStore>,
}

fn create_test_context() -> TestContext {
    let mock = Arc::new(MockRemoteClient::new());
    mock.set_cities(fallback_catalog());

    let bus = EventBus::default();
    let events = Arc::new(Mutex::new(Vec::new()));
    for topic in [BusTopic::ActiveCityChanged, BusTopic::CityProcessed] {
        let sink = events.clone();
        bus.subscribe(topic, move |event| {
            sink.lock().unwrap().push(event.clone());
            Ok(())
        });
    }

    let session = Arc::new(SessionStore::new());
    let store = ActiveCityStore::new(session.clone(), Arc::new(SessionStore::new()));
    let pipeline = Arc::new(ActivationPipeline::new(mock.clone(), bus, store));

    TestContext {
        pipeline,
        mock,
        events,
        session,
    }
}

#[tokio::test]
async fn test_activate_every_catalog_city_completes() {
    for city in fallback_catalog() {
        let ctx = create_test_context();

        let state = ctx.pipeline.activate(&city.id).await;

        assert_eq!(state.step, ActivationStep::Complete);
        assert!(state.is_consistent());
        let selected = state.selected_city.unwrap();
        assert_eq!(selected.city_id, city.id);
        assert_eq!(selected.name, city.name);
        assert!(state.error.is_none());

        let events = ctx.events.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert!(events
            .iter()
            .all(|e| e.city_id() == Some(city.id.as_str())));
        assert_eq!(events[0].topic(), BusTopic::ActiveCityChanged);
        assert_eq!(events[1].topic(), BusTopic::CityProcessed);
    }
}

#[tokio::test]
async fn test_rejected_selection_stops_pipeline() {
    let ctx = create_test_context();
    ctx.mock.set_select_response(
        "atlantis",
        Ok(SelectCityResponse::rejected("City not supported")),
    );

    let state = ctx.pipeline.activate("atlantis").await;

    assert_eq!(state.step, ActivationStep::Failed);
    assert_eq!(state.failure, Some(FailureKind::SelectionRejected));
    assert_eq!(state.error.as_deref(), Some("City not supported"));
    assert!(state.selected_city.is_none());
    assert!(state.is_consistent());
    assert_eq!(ctx.mock.call_count(ops::PROCESS_ZONES), 0);
    assert_eq!(ctx.mock.call_count(ops::PROCESS_EIA), 0);
    assert!(ctx.events.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_rejection_without_reason_gets_default_message() {
    let ctx = create_test_context();
    ctx.mock.set_select_response(
        "nyc",
        Ok(SelectCityResponse {
            success: Some(false),
            ..Default::default()
        }),
    );

    let state = ctx.pipeline.activate("nyc").await;
    assert!(state.error.unwrap().contains("rejected"));
}

#[tokio::test]
async fn test_missing_success_flag_is_not_a_rejection() {
    let ctx = create_test_context();
    ctx.mock.set_select_response(
        "nyc",
        Ok(SelectCityResponse {
            name: Some("New York City".to_string()),
            ..Default::default()
        }),
    );

    let state = ctx.pipeline.activate("nyc").await;
    assert_eq!(state.step, ActivationStep::Complete);
}

#[tokio::test]
async fn test_select_transport_failure_stops_pipeline() {
    let ctx = create_test_context();
    ctx.mock.set_select_response(
        "nyc",
        Err(RemoteError::Network("connection reset".to_string())),
    );

    let state = ctx.pipeline.activate("nyc").await;

    assert_eq!(state.step, ActivationStep::Failed);
    assert_eq!(state.failure, Some(FailureKind::SelectionFailed));
    assert!(state.error.unwrap().contains("connection reset"));
    assert!(state.selected_city.is_none());
    assert_eq!(ctx.mock.call_count(ops::PROCESS_ZONES), 0);
    assert_eq!(ctx.mock.call_count(ops::PROCESS_EIA), 0);
}

#[tokio::test]
async fn test_zone_failure_is_fatal() {
    let ctx = create_test_context();
    ctx.mock.set_zones_result(Err(RemoteError::Api {
        status: 500,
        message: "weather provider down".to_string(),
    }));

    let state = ctx.pipeline.activate("sf").await;

    assert_eq!(state.step, ActivationStep::Failed);
    assert_eq!(state.failure, Some(FailureKind::ZoneProcessingFailed));
    assert!(state.is_consistent());
    assert!(state.zones_summary.is_none());
    assert_eq!(ctx.mock.call_count(ops::PROCESS_EIA), 0);
    assert!(ctx.events.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_eia_failure_is_tolerated() {
    let ctx = create_test_context();
    ctx.mock.set_zones_result(Ok(ZonesSummary::new(20, 20)));
    ctx.mock.set_eia_result(Err(RemoteError::Timeout(30_000)));

    let state = ctx.pipeline.activate("nyc").await;

    assert_eq!(state.step, ActivationStep::Complete);
    assert_eq!(state.zones_summary, Some(ZonesSummary::new(20, 20)));
    assert!(state.error.is_none());
    assert_eq!(ctx.mock.call_count(ops::PROCESS_EIA), 1);

    let events = ctx.events.lock().unwrap();
    assert_eq!(events.len(), 2);
    match &events[1] {
        BusEvent::CityProcessed { city_id, summary } => {
            assert_eq!(city_id, "nyc");
            assert_eq!(summary.successful, 20);
            assert_eq!(summary.total, 20);
        }
        other => panic!("unexpected event {:?}", other),
    }
}

#[tokio::test]
async fn test_new_attempt_clears_previous_error() {
    let ctx = create_test_context();
    ctx.mock.set_select_response(
        "nyc",
        Err(RemoteError::Network("offline".to_string())),
    );
    assert_eq!(
        ctx.pipeline.activate("nyc").await.step,
        ActivationStep::Failed
    );

    let state = ctx.pipeline.activate("chicago").await;
    assert_eq!(state.step, ActivationStep::Complete);
    assert!(state.error.is_none());
    assert!(state.failure.is_none());
    assert_eq!(ctx.mock.call_count(ops::SELECT_CITY), 2);
}

#[tokio::test(start_paused = true)]
async fn test_progress_is_observable_mid_run() {
    let ctx = create_test_context();
    ctx.mock.set_zones_delay(Duration::from_secs(5));
    let mut progress = ctx.pipeline.subscribe();

    let pipeline = ctx.pipeline.clone();
    let handle = tokio::spawn(async move { pipeline.activate("la").await });

    progress
        .wait_for(|s| s.step == ActivationStep::Processing)
        .await
        .unwrap();
    let mid = ctx.pipeline.state();
    assert!(ctx.pipeline.is_busy());
    assert!(mid.is_consistent());
    assert_eq!(mid.selected_city.unwrap().city_id, "la");
    assert!(mid.zones_summary.is_none());

    let done = handle.await.unwrap();
    assert_eq!(done.step, ActivationStep::Complete);
    assert!(!ctx.pipeline.is_busy());
}

#[tokio::test]
async fn test_finalize_requires_completed_activation() {
    let ctx = create_test_context();
    assert!(matches!(
        ctx.pipeline.finalize_selection(),
        Err(Error::InvalidState(_))
    ));
    assert_eq!(ctx.session.get(ACTIVE_CITY_KEY).unwrap(), None);
}

#[tokio::test]
async fn test_finalize_persists_active_city() {
    let ctx = create_test_context();
    ctx.pipeline.activate("seattle").await;

    let outcome = ctx.pipeline.finalize_selection().unwrap();
    assert!(outcome.session);
    assert!(outcome.durable);
    assert_eq!(
        ctx.session.get(ACTIVE_CITY_KEY).unwrap().as_deref(),
        Some("seattle")
    );
}

#[tokio::test]
async fn test_request_city_selector_publishes() {
    let bus = EventBus::default();
    let hits = Arc::new(Mutex::new(0));
    let counter = hits.clone();
    bus.subscribe(BusTopic::OpenCitySelector, move |_| {
        *counter.lock().unwrap() += 1;
        Ok(())
    });

    let pipeline = ActivationPipeline::new(
        Arc::new(MockRemoteClient::new()),
        bus,
        ActiveCityStore::in_memory(),
    );
    assert_eq!(pipeline.request_city_selector(), 1);
    assert_eq!(*hits.lock().unwrap(), 1);
}

#[tokio::test]
async fn test_catalog_falls_back_on_registry_failure() {
    let mock = MockRemoteClient::new();
    mock.fail_cities(RemoteError::Network("dns".to_string()));

    let catalog = load_catalog(&mock).await;
    assert_eq!(catalog.source, CatalogSource::Fallback);
    assert!(catalog.find("nyc").is_some());
}

#[tokio::test]
async fn test_catalog_prefers_registry() {
    let mock = MockRemoteClient::new();
    mock.set_cities(vec![CityRecord::new(
        "boston",
        "Boston",
        "MA",
        "USA",
        None,
    )]);

    let catalog = load_catalog(&mock).await;
    assert_eq!(catalog.source, CatalogSource::Remote);
    assert_eq!(catalog.cities.len(), 1);
    assert_eq!(catalog.find("boston").unwrap().population, None);
}

#[tokio::test]
async fn test_empty_registry_uses_fallback() {
    let mock = MockRemoteClient::new();
    let catalog = load_catalog(&mock).await;
    assert_eq!(catalog.source, CatalogSource::Fallback);
    assert_eq!(catalog.cities, fallback_catalog());
}
