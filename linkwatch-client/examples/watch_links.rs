//! Example: Watching every link a monitor tracks
//!
//! This example lists the links a monitor knows about, subscribes to each
//! one, and prints a line whenever a link publishes a new sample.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example watch_links -- http://localhost:8000
//! ```

use std::time::Duration;

use linkwatch_client::{LinkWatcher, MonitorApi};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let endpoint = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "http://localhost:8000".to_string());

    let api = MonitorApi::builder()
        .endpoint(&endpoint)
        .timeout(Duration::from_secs(5))
        .build();

    let entries = api.links().await?;
    println!("Monitor at {} tracks {} links\n", endpoint, entries.len());

    let watcher = LinkWatcher::builder()
        .refetch_interval(Duration::from_secs(10))
        .build(api);

    let mut tasks = Vec::new();
    for entry in entries {
        let mut sub = watcher.subscribe(&entry.id());
        tasks.push(tokio::spawn(async move {
            loop {
                let sample = sub.next().await;
                match (sample.view(), sample.error) {
                    (Some(view), None) => {
                        println!(
                            "{} -> {}: {} delay={} delivering={}",
                            entry.src_name,
                            entry.dst_name,
                            view.color.as_str(),
                            view.delay_text,
                            view.delivering,
                        );
                    }
                    (view, Some(error)) => {
                        let known = if view.is_some() { "stale" } else { "no data" };
                        println!(
                            "{} -> {}: fetch failed ({known}): {error}",
                            entry.src_name, entry.dst_name,
                        );
                    }
                    (None, None) => {}
                }
            }
        }));
    }

    for task in tasks {
        task.await?;
    }

    Ok(())
}
