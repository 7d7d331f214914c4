//! Listing ranking command.

use anyhow::Result;
use board_core::Clock;
use board_rank::{
    current_rotation_key, paginate, rotation_score, sort_by_listing_type, tier_rank, Listing,
    Rankable,
};
use serde::Serialize;

use super::{rotation_window, RankArgs};
use crate::context::{clock_at, Context};
use crate::output::tier_badge;

#[derive(Serialize)]
struct RankedRow {
    position: usize,
    id: String,
    tier: &'static str,
    verified: bool,
    score: f64,
}

/// Run the rank command.
pub async fn run(args: RankArgs, ctx: &Context) -> Result<()> {
    let listings: Vec<Listing> = ctx.read_json(&args.listings)?;
    let window = rotation_window(&ctx.config.rotation, args.window_minutes);

    let seed = match args.seed {
        Some(seed) => seed,
        None => {
            let clock = clock_at(args.at);
            let key = current_rotation_key(&clock, window);
            ctx.output
                .debug(&format!("Rotation key {} at {}", key, clock.now().to_rfc3339()));
            key.value()
        }
    };

    let ranked = sort_by_listing_type(&listings, seed);
    let page = paginate(&ranked, args.page, args.per_page);
    let offset = page.pagination.offset();

    let rows: Vec<RankedRow> = page
        .items
        .iter()
        .enumerate()
        .map(|(i, listing)| RankedRow {
            position: offset + i + 1,
            id: listing.rank_id().to_string(),
            tier: listing.tier().unwrap_or_default().as_str(),
            verified: listing.is_verified(),
            score: rotation_score(listing.rank_id(), seed),
        })
        .collect();

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({
            "seed": seed,
            "pagination": page.pagination,
            "listings": rows,
        }));
        return Ok(());
    }

    ctx.output.header(&format!(
        "Ranking (seed {}, page {}/{})",
        seed, page.pagination.page, page.pagination.total_pages
    ));

    if rows.is_empty() {
        ctx.output.info("No listings on this page.");
        return Ok(());
    }

    let widths = [4, 28, 8, 8, 6];
    ctx.output
        .table_row(&["#", "ID", "TIER", "VERIFIED", "SCORE"], &widths);
    for row in &rows {
        let tier = tier_badge(row.tier);
        ctx.output.table_row(
            &[
                &row.position.to_string(),
                &row.id,
                &tier,
                if row.verified { "yes" } else { "no" },
                &format!("{:.3}", row.score),
            ],
            &widths,
        );
    }

    let top = listings
        .iter()
        .filter(|l| tier_rank(l.tier()) == 3)
        .count();
    ctx.output.kv(
        "Showing",
        &format!(
            "{}-{} of {} ({} top tier)",
            page.pagination.start_item(),
            page.pagination.end_item(),
            page.pagination.total,
            top
        ),
    );

    Ok(())
}
