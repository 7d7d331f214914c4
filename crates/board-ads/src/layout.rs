//! Interleaving ad cells into a listing grid.

use serde::Serialize;

/// One cell of a rendered grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "item", rename_all = "lowercase")]
pub enum GridCell<L, A> {
    Listing(L),
    Ad(A),
}

impl<L, A> GridCell<L, A> {
    /// Whether this cell holds an ad.
    pub fn is_ad(&self) -> bool {
        matches!(self, Self::Ad(_))
    }
}

/// Insert one ad after every `every` listings while ads remain.
///
/// Ads are never placed before the first listing or after the last one,
/// and `every == 0` disables interleaving.
pub fn interleave<L, A>(
    listings: impl IntoIterator<Item = L>,
    ads: impl IntoIterator<Item = A>,
    every: usize,
) -> Vec<GridCell<L, A>> {
    let listings: Vec<L> = listings.into_iter().collect();
    let total = listings.len();
    let mut ads = ads.into_iter();
    let mut cells = Vec::with_capacity(total + if every == 0 { 0 } else { total / every });

    for (i, listing) in listings.into_iter().enumerate() {
        cells.push(GridCell::Listing(listing));

        let placed = i + 1;
        if every > 0 && placed % every == 0 && placed < total {
            if let Some(ad) = ads.next() {
                cells.push(GridCell::Ad(ad));
            }
        }
    }

    cells
}
