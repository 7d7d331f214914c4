//! Replay recorded ad events through the event queue.

use std::sync::Arc;

use anyhow::{bail, Result};
use board_core::SystemClock;
use board_telemetry::{
    tally, Collector, CollectorPayload, Enqueued, HttpCollector, MemoryCollector, PumpReport,
    TelemetryPipeline,
};
use serde::Serialize;

use super::ReplayEventsArgs;
use crate::context::Context;

#[derive(Debug, Default, Serialize)]
struct ReplaySummary {
    read: usize,
    duplicates: usize,
    batches: usize,
    delivered: usize,
    failed: usize,
}

impl ReplaySummary {
    fn add(&mut self, report: PumpReport) {
        self.batches += report.batches;
        self.delivered += report.delivered;
        self.failed += report.failed;
    }
}

/// Run the replay-events command.
pub async fn run(args: ReplayEventsArgs, ctx: &Context) -> Result<()> {
    let body = ctx.read_bytes(&args.events)?;
    let events = CollectorPayload::from_json(&body)?.into_events();

    let memory = Arc::new(MemoryCollector::new());
    let collector: Arc<dyn Collector> = if args.dry_run {
        memory.clone()
    } else {
        let url = args
            .collector_url
            .clone()
            .or_else(|| ctx.config.telemetry.collector_url.clone());
        match url {
            Some(url) => {
                ctx.output.debug(&format!("Sending to {}", url));
                Arc::new(HttpCollector::new(url))
            }
            None => bail!("No collector URL configured; pass --collector-url or --dry-run"),
        }
    };

    let pipeline = TelemetryPipeline::new(SystemClock, ctx.config.telemetry.clone(), collector);
    pipeline.start();

    let mut summary = ReplaySummary {
        read: events.len(),
        ..ReplaySummary::default()
    };
    for event in events {
        match pipeline.enqueue(event.ad_id, event.event_type) {
            Enqueued::Duplicate => summary.duplicates += 1,
            Enqueued::FlushedThenBuffered => summary.add(pipeline.pump().await),
            Enqueued::Buffered => {}
        }
    }
    pipeline.flush();
    summary.add(pipeline.pump().await);
    pipeline.dispose();

    if ctx.output.is_json() {
        ctx.output.json(&summary);
        return Ok(());
    }

    ctx.output.header("Event replay");
    ctx.output.kv("Events read", &summary.read.to_string());
    ctx.output.kv("Duplicates dropped", &summary.duplicates.to_string());
    ctx.output.kv("Batches", &summary.batches.to_string());
    ctx.output.kv("Delivered", &summary.delivered.to_string());

    if args.dry_run {
        let mut counts: Vec<_> = tally(&memory.events()).into_iter().collect();
        counts.sort_by(|a, b| a.0.cmp(&b.0));
        for (ad, c) in counts {
            ctx.output.kv(
                ad.as_str(),
                &format!("{} impressions, {} clicks", c.impressions, c.clicks),
            );
        }
    }

    if summary.failed > 0 {
        ctx.output
            .warn(&format!("{} batches were rejected and dropped", summary.failed));
    } else {
        ctx.output.success("Replay complete");
    }

    Ok(())
}
