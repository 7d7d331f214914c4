//! A ranked page of listings with inline ads, the way a city page is built.

use std::time::Duration;

use board_ads::{interleave, AdRotator, Creative, GridCell, Position};
use board_core::{AdConfig, ManualClock};
use board_rank::{paginate, sort_for_window, Listing, ListingTier};
use rand::rngs::StdRng;
use rand::SeedableRng;

const WINDOW: Duration = Duration::from_secs(30 * 60);

fn listings() -> Vec<Listing> {
    (0..30)
        .map(|i| {
            let tier = match i % 5 {
                0 => Some(ListingTier::Top),
                1 | 2 => Some(ListingTier::Premium),
                _ => None,
            };
            Listing::new(format!("profile-{}", i), tier).with_attribute("city", "Porto")
        })
        .collect()
}

#[test]
fn test_page_is_stable_within_window_and_carries_ads() {
    let clock = ManualClock::new(1_718_452_800_000);
    let creatives = vec![
        Creative::new("inline-a", Position::InlineGrid).with_priority(70),
        Creative::new("inline-b", Position::InlineGrid).with_priority(30),
        Creative::new("header", Position::HeaderBanner),
    ];

    let ranked = sort_for_window(&listings(), &clock, WINDOW);
    let page = paginate(&ranked, 1, 12);
    assert_eq!(page.len(), 12);

    // Top tier listings fill the head of page one.
    assert!(page.items[..6]
        .iter()
        .all(|l| l.listing_type == Some(ListingTier::Top)));

    let mut slot = AdRotator::new(
        clock.clone(),
        StdRng::seed_from_u64(5),
        Position::InlineGrid,
        creatives,
        &AdConfig::default(),
    );
    let ad = slot.start().cloned().expect("inline creatives are live");
    assert_eq!(ad.position, Position::InlineGrid);

    let grid = interleave(page.items.clone(), [ad.clone(), ad], 4);
    assert_eq!(grid.len(), 14);
    assert!(matches!(grid[4], GridCell::Ad(_)));
    assert!(matches!(grid[9], GridCell::Ad(_)));

    // A re-render later in the same window yields the same listing order.
    clock.advance(Duration::from_secs(10 * 60));
    let again = paginate(&sort_for_window(&listings(), &clock, WINDOW), 1, 12);
    assert_eq!(again.items, page.items);
}
