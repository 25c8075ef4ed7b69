use super::*;
use citypulse_remote::ZonesSummary;
use std::sync::{Arc, Mutex};

fn city_changed(id: &str) -> BusEvent {
    BusEvent::ActiveCityChanged {
        city_id: id.to_string(),
        name: id.to_uppercase(),
    }
}

#[test]
fn test_listeners_run_in_registration_order() {
    let bus = EventBus::default();
    let log: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));

    for name in ["first", "second", "third"] {
        let log = log.clone();
        bus.subscribe(BusTopic::ActiveCityChanged, move |_| {
            log.lock().unwrap().push(name.to_string());
            Ok(())
        });
    }

    let delivered = bus.publish(city_changed("nyc"));
    assert_eq!(delivered, 3);
    assert_eq!(*log.lock().unwrap(), vec!["first", "second", "third"]);
}

#[test]
fn test_publish_only_reaches_matching_topic() {
    let bus = EventBus::default();
    let hits = Arc::new(Mutex::new(0));

    let counter = hits.clone();
    bus.subscribe(BusTopic::CityProcessed, move |_| {
        *counter.lock().unwrap() += 1;
        Ok(())
    });

    assert_eq!(bus.publish(city_changed("nyc")), 0);
    assert_eq!(bus.publish(BusEvent::OpenCitySelector), 0);
    assert_eq!(
        bus.publish(BusEvent::CityProcessed {
            city_id: "nyc".to_string(),
            summary: ZonesSummary::new(20, 20),
        }),
        1
    );
    assert_eq!(*hits.lock().unwrap(), 1);
}

#[test]
fn test_failing_listener_does_not_break_delivery() {
    let bus = EventBus::default();
    let log: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));

    bus.subscribe(BusTopic::ActiveCityChanged, |_| Err("listener exploded".into()));
    bus.subscribe(BusTopic::ActiveCityChanged, |_| panic!("listener panicked"));
    let tail = log.clone();
    bus.subscribe(BusTopic::ActiveCityChanged, move |_| {
        tail.lock().unwrap().push("tail".to_string());
        Ok(())
    });

    let delivered = bus.publish(city_changed("sf"));
    assert_eq!(delivered, 3);
    assert_eq!(*log.lock().unwrap(), vec!["tail"]);
}

#[test]
fn test_unsubscribe_is_idempotent() {
    let bus = EventBus::default();
    let sub = bus.subscribe(BusTopic::OpenCitySelector, |_| Ok(()));
    let other = bus.subscribe(BusTopic::OpenCitySelector, |_| Ok(()));

    assert_eq!(bus.listener_count(BusTopic::OpenCitySelector), 2);
    sub.unsubscribe();
    sub.unsubscribe();
    assert!(!sub.is_active());
    assert!(other.is_active());
    assert_eq!(bus.listener_count(BusTopic::OpenCitySelector), 1);
    assert_eq!(bus.publish(BusEvent::OpenCitySelector), 1);
}

#[test]
fn test_listener_unsubscribing_itself_during_delivery() {
    let bus = EventBus::default();
    let calls = Arc::new(Mutex::new(Vec::new()));
    let own_handle: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));

    let before = calls.clone();
    bus.subscribe(BusTopic::ActiveCityChanged, move |_| {
        before.lock().unwrap().push("before");
        Ok(())
    });

    let me = own_handle.clone();
    let selfish = calls.clone();
    let sub = bus.subscribe(BusTopic::ActiveCityChanged, move |_| {
        selfish.lock().unwrap().push("self");
        if let Some(sub) = me.lock().unwrap().as_ref() {
            sub.unsubscribe();
        }
        Ok(())
    });
    *own_handle.lock().unwrap() = Some(sub);

    let after = calls.clone();
    bus.subscribe(BusTopic::ActiveCityChanged, move |_| {
        after.lock().unwrap().push("after");
        Ok(())
    });

    assert_eq!(bus.publish(city_changed("nyc")), 3);
    assert_eq!(*calls.lock().unwrap(), vec!["before", "self", "after"]);

    calls.lock().unwrap().clear();
    assert_eq!(bus.publish(city_changed("nyc")), 2);
    assert_eq!(*calls.lock().unwrap(), vec!["before", "after"]);
}

#[test]
fn test_listener_removed_mid_delivery_is_skipped() {
    let bus = EventBus::default();
    let calls = Arc::new(Mutex::new(Vec::new()));
    let victim_handle: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));

    let victim = victim_handle.clone();
    bus.subscribe(BusTopic::ActiveCityChanged, move |_| {
        if let Some(sub) = victim.lock().unwrap().as_ref() {
            sub.unsubscribe();
        }
        Ok(())
    });

    let log = calls.clone();
    let sub = bus.subscribe(BusTopic::ActiveCityChanged, move |_| {
        log.lock().unwrap().push("victim");
        Ok(())
    });
    *victim_handle.lock().unwrap() = Some(sub);

    assert_eq!(bus.publish(city_changed("nyc")), 1);
    assert!(calls.lock().unwrap().is_empty());
}

#[test]
fn test_no_replay_for_late_listeners() {
    let bus = EventBus::default();
    bus.publish(city_changed("nyc"));

    let hits = Arc::new(Mutex::new(0));
    let counter = hits.clone();
    bus.subscribe(BusTopic::ActiveCityChanged, move |_| {
        *counter.lock().unwrap() += 1;
        Ok(())
    });

    assert_eq!(*hits.lock().unwrap(), 0);
}

#[tokio::test]
async fn test_async_receivers_get_every_topic() {
    let bus = EventBus::new(16);
    let mut rx1 = bus.watch();
    let mut rx2 = bus.watch();
    assert_eq!(bus.receiver_count(), 2);

    bus.publish(city_changed("chicago"));
    bus.publish(BusEvent::OpenCitySelector);

    for rx in [&mut rx1, &mut rx2] {
        let first = rx.recv().await.unwrap();
        assert_eq!(first.city_id(), Some("chicago"));
        let second = rx.recv().await.unwrap();
        assert_eq!(second.topic(), BusTopic::OpenCitySelector);
    }
}

#[test]
fn test_event_serialization() {
    let event = BusEvent::CityProcessed {
        city_id: "nyc".to_string(),
        summary: ZonesSummary::new(18, 20),
    };
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["topic"], "city-processed");
    assert_eq!(json["cityId"], "nyc");
    assert_eq!(json["summary"]["successful"], 18);

    let selector = serde_json::to_value(BusEvent::OpenCitySelector).unwrap();
    assert_eq!(selector["topic"], BusTopic::OpenCitySelector.as_str());
}
