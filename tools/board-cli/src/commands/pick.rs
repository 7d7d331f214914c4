//! Weighted selection simulation.

use std::collections::HashMap;

use anyhow::{bail, Result};
use board_ads::{effective_weight, live_pool, select_weighted_with_default, Creative};
use board_core::Clock;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use super::PickArgs;
use crate::context::{clock_at, Context};

#[derive(Serialize)]
struct ShareRow {
    id: String,
    weight: i64,
    expected: f64,
    observed: f64,
    draws: usize,
}

/// Run the pick command.
pub async fn run(args: PickArgs, ctx: &Context) -> Result<()> {
    let creatives: Vec<Creative> = ctx.read_json(&args.creatives)?;
    let now = clock_at(args.at).now();
    let pool = live_pool(&creatives, args.position, now);

    if pool.is_empty() {
        bail!("No live creatives for {}", args.position);
    }

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let default = ctx.config.ads.default_priority;

    let mut hits: HashMap<&str, usize> = HashMap::new();
    for _ in 0..args.draws {
        if let Some(creative) = select_weighted_with_default(&pool, default, &mut rng) {
            *hits.entry(creative.id.as_str()).or_default() += 1;
        }
    }

    let total_weight: f64 = pool
        .iter()
        .map(|c| effective_weight(c.priority, default) as f64)
        .sum();
    let rows: Vec<ShareRow> = pool
        .iter()
        .map(|c| {
            let weight = effective_weight(c.priority, default);
            let draws = hits.get(c.id.as_str()).copied().unwrap_or(0);
            ShareRow {
                id: c.id.to_string(),
                weight,
                expected: weight as f64 / total_weight,
                observed: if args.draws == 0 {
                    0.0
                } else {
                    draws as f64 / args.draws as f64
                },
                draws,
            }
        })
        .collect();

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({
            "position": args.position,
            "draws": args.draws,
            "creatives": rows,
        }));
        return Ok(());
    }

    ctx.output.header(&format!(
        "{} draws for {} ({} live)",
        args.draws,
        args.position,
        pool.len()
    ));
    let widths = [28, 8, 10, 10];
    ctx.output
        .table_row(&["ID", "WEIGHT", "EXPECTED", "OBSERVED"], &widths);
    for row in &rows {
        ctx.output.table_row(
            &[
                &row.id,
                &row.weight.to_string(),
                &format!("{:.2}%", row.expected * 100.0),
                &format!("{:.2}%", row.observed * 100.0),
            ],
            &widths,
        );
    }

    Ok(())
}
