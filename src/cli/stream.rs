//! CLI command: `citypulse stream`
//!
//! One refresh with `--once`, otherwise polls until Ctrl-C and reprints the
//! panel after every applied refresh.

use chrono::Utc;
use citypulse_core::{headline, AgeBucket, AggregatorState, StreamPoller, StreamTopic};
use tracing::info;

use crate::app::App;

/// Run the stream subcommand.
pub async fn run(app: &App, once: bool) -> anyhow::Result<()> {
    let aggregator = app.aggregator();

    if once {
        aggregator.refresh(true).await;
        print_panel(&aggregator.state());
        return Ok(());
    }

    let mut updates = aggregator.subscribe();
    let poller = StreamPoller::new(&aggregator).spawn();

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = updates.borrow_and_update().clone();
                if !state.loading {
                    print_panel(&state);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, stopping live stream");
                break;
            }
        }
    }

    aggregator.shutdown();
    poller.await?;
    Ok(())
}

fn print_panel(state: &AggregatorState) {
    let now = Utc::now();
    let snapshot = &state.snapshot;

    println!();
    println!(
        "  Live Stream  [{}]",
        if snapshot.ok { "ok" } else { "degraded" }
    );
    println!("  {}", "-".repeat(72));
    if let Some(error) = &state.error {
        println!("  ⚠️ {}", error);
    }
    if snapshot.by_topic.is_empty() {
        println!("  (no data)");
    }

    for (topic, count) in snapshot.topic_counts() {
        let line = match snapshot.latest(topic) {
            Some(record) => format!(
                "{}  ({})",
                headline(topic, &record.payload),
                AgeBucket::since(record.ingested_at, now)
            ),
            None if topic == StreamTopic::CityAlerts => "no alert feed".to_string(),
            None => "no records".to_string(),
        };
        println!("  {:<14} {:>4}  {}", topic.as_str(), count, line);
    }

    println!("  {}", "-".repeat(72));
    if let Some(updated) = snapshot.last_updated {
        println!("  Last updated {}", AgeBucket::since(updated, now));
    }
}
