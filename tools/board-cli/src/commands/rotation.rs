//! Rotation window inspection.

use std::time::Duration;

use anyhow::Result;
use board_core::{Clock, SystemClock};
use board_rank::{rotation_key, time_until_rotation, RotationKey, RotationWatcher};

use super::{rotation_window, RotationArgs};
use crate::context::{clock_at, Context};
use crate::output::format_duration;

/// Run the rotation command.
pub async fn run(args: RotationArgs, ctx: &Context) -> Result<()> {
    let window = rotation_window(&ctx.config.rotation, args.window_minutes);

    if args.watch {
        return watch(window, ctx).await;
    }

    let now_ms = clock_at(args.at).now_ms();
    let key = rotation_key(now_ms, window);
    show(key, window, time_until_rotation(now_ms, window), ctx);
    Ok(())
}

fn show(key: RotationKey, window: Duration, remaining: Duration, ctx: &Context) {
    let (start, end) = key.window_span(window);

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({
            "key": key,
            "window_minutes": window.as_secs() / 60,
            "start": start.to_rfc3339(),
            "end": end.to_rfc3339(),
            "next_rotation_in_ms": remaining.as_millis() as u64,
        }));
        return;
    }

    ctx.output.header(&format!("Rotation key {}", key));
    ctx.output.kv("Window", &format_duration(window));
    ctx.output.kv("Start", &start.to_rfc3339());
    ctx.output.kv("End", &end.to_rfc3339());
    ctx.output.kv("Next rotation in", &format_duration(remaining));
}

async fn watch(window: Duration, ctx: &Context) -> Result<()> {
    let mut watcher = RotationWatcher::new(
        SystemClock,
        window,
        ctx.config.rotation.check_interval(),
    );
    let key = watcher.start();
    show(key, window, time_until_rotation(SystemClock.now_ms(), window), ctx);
    ctx.output.info("Watching for rotations, Ctrl-C to stop.");

    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Some(key) = watcher.poll() {
                    show(key, window, time_until_rotation(SystemClock.now_ms(), window), ctx);
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    watcher.dispose();
    Ok(())
}
