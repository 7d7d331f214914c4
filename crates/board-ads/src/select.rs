//! Priority-proportional random selection.

use rand::Rng;

use crate::creative::{effective_weight, Creative, DEFAULT_PRIORITY};

/// An item carrying a raw selection weight.
pub trait Weighted {
    /// Raw weight; `None` or non-positive values use the default.
    fn weight(&self) -> Option<i64>;
}

impl Weighted for Creative {
    fn weight(&self) -> Option<i64> {
        self.priority
    }
}

impl<T: Weighted + ?Sized> Weighted for &T {
    fn weight(&self) -> Option<i64> {
        (**self).weight()
    }
}

impl Weighted for Option<i64> {
    fn weight(&self) -> Option<i64> {
        *self
    }
}

/// Pick one item with probability `weight / total`.
///
/// Empty input gives `None`; a single item is returned without drawing.
pub fn select_weighted<'a, T: Weighted, R: Rng + ?Sized>(items: &'a [T], rng: &mut R) -> Option<&'a T> {
    select_weighted_with_default(items, DEFAULT_PRIORITY, rng)
}

/// [`select_weighted`] with a configurable fallback weight.
pub fn select_weighted_with_default<'a, T: Weighted, R: Rng + ?Sized>(
    items: &'a [T],
    default_weight: i64,
    rng: &mut R,
) -> Option<&'a T> {
    match items {
        [] => return None,
        [only] => return Some(only),
        _ => {}
    }

    let weights: Vec<u64> = items
        .iter()
        .map(|item| effective_weight(item.weight(), default_weight) as u64)
        .collect();
    let total = weights.iter().fold(0u64, |acc, w| acc.saturating_add(*w));

    let mut remaining = rng.gen_range(0..total);
    for (item, weight) in items.iter().zip(&weights) {
        if remaining < *weight {
            return Some(item);
        }
        remaining -= weight;
    }

    // Unreachable while `remaining < total`; never come back empty-handed.
    items.first()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::creative::Position;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_empty_returns_none() {
        let items: Vec<Option<i64>> = Vec::new();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(select_weighted(&items, &mut rng).is_none());
    }

    #[test]
    fn test_single_item_always_selected() {
        let items = vec![Creative::new("only", Position::Popup).with_priority(-3)];
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..100 {
            assert_eq!(select_weighted(&items, &mut rng).unwrap().id.as_str(), "only");
        }
    }

    #[test]
    fn test_weighted_probability() {
        let items = vec![Some(10), Some(90)];
        let mut rng = StdRng::seed_from_u64(42);
        let draws = 100_000;

        let second = (0..draws)
            .filter(|_| std::ptr::eq(select_weighted(&items, &mut rng).unwrap(), &items[1]))
            .count();

        let share = second as f64 / draws as f64;
        assert!((share - 0.9).abs() < 0.01, "share {}", share);
    }

    #[test]
    fn test_malformed_weights_use_default() {
        // 0, negative and missing all weigh 50, same as the explicit 50.
        let items = vec![Some(0), Some(-20), None, Some(50)];
        let mut rng = StdRng::seed_from_u64(7);
        let mut counts = [0usize; 4];
        for _ in 0..40_000 {
            let picked = select_weighted(&items, &mut rng).unwrap();
            let idx = items.iter().position(|i| std::ptr::eq(i, picked)).unwrap();
            counts[idx] += 1;
        }
        for count in counts {
            let share = count as f64 / 40_000.0;
            assert!((share - 0.25).abs() < 0.02, "counts {:?}", counts);
        }
    }

    #[test]
    fn test_custom_default_weight() {
        let items = vec![None, Some(900)];
        let mut rng = StdRng::seed_from_u64(9);
        let first = (0..20_000)
            .filter(|_| {
                std::ptr::eq(
                    select_weighted_with_default(&items, 100, &mut rng).unwrap(),
                    &items[0],
                )
            })
            .count();
        let share = first as f64 / 20_000.0;
        assert!((share - 0.1).abs() < 0.015, "share {}", share);
    }

    #[test]
    fn test_extreme_weights_do_not_panic() {
        let items = [Some(i64::MAX); 3];
        let mut rng = StdRng::seed_from_u64(1);
        let mut seen = [false; 3];
        for _ in 0..1_000 {
            let picked = select_weighted(&items, &mut rng).unwrap();
            let idx = items.iter().position(|i| std::ptr::eq(i, picked)).unwrap();
            seen[idx] = true;
        }
        assert_eq!(seen, [true; 3]);

        let mixed = [Some(i64::MAX), Some(i64::MIN), None];
        assert!(select_weighted(&mixed, &mut rng).is_some());
    }

    #[test]
    fn test_selects_over_borrowed_pool() {
        let creatives = vec![
            Creative::new("a", Position::SidebarLeft).with_priority(1),
            Creative::new("b", Position::SidebarLeft).with_priority(1_000_000),
        ];
        let pool: Vec<&Creative> = creatives.iter().collect();
        let mut rng = StdRng::seed_from_u64(3);
        let picked = select_weighted(&pool, &mut rng).unwrap();
        assert_eq!(picked.id.as_str(), "b");
    }
}
