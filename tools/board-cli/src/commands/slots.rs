//! Slot usage per placement.

use anyhow::Result;
use board_ads::{slot_usage, Creative, SlotLimits};
use board_core::Clock;

use super::SlotsArgs;
use crate::context::{clock_at, Context};
use crate::output::usage_badge;

/// Run the slots command.
pub async fn run(args: SlotsArgs, ctx: &Context) -> Result<()> {
    let creatives: Vec<Creative> = ctx.read_json(&args.creatives)?;
    let limits = SlotLimits::from_config(&ctx.config.ads);
    let usage = slot_usage(&creatives, &limits, clock_at(args.at).now());

    if ctx.output.is_json() {
        ctx.output.json(&usage);
        return Ok(());
    }

    ctx.output.header("Slot usage");
    let widths = [16, 8];
    for (position, slot) in &usage {
        ctx.output
            .table_row(&[position.as_str(), &usage_badge(*slot)], &widths);
    }

    let full: Vec<&str> = usage
        .iter()
        .filter(|(_, slot)| slot.is_full())
        .map(|(position, _)| position.as_str())
        .collect();
    if !full.is_empty() {
        ctx.output.warn(&format!("Full: {}", full.join(", ")));
    }

    Ok(())
}
