//! Ranking of location estimates for the "highest frequency" panel.

use std::cmp::Ordering;

use haplomap_core::{Located, Scored};

/// Order by score, highest first; ties by location key.
pub fn by_score_desc<T: Scored + Located>(a: &T, b: &T) -> Ordering {
    b.score()
        .total_cmp(&a.score())
        .then_with(|| a.key().cmp(b.key()))
}

/// The `n` items with the highest score, highest first.
///
/// For [`LocationEstimate`](crate::estimate::LocationEstimate) the score is
/// the shrunk frequency. Fewer than `n` items are all returned. The input is
/// not reordered.
pub fn top_locations<T: Scored + Located>(items: &[T], n: usize) -> Vec<&T> {
    let mut ranked: Vec<&T> = items.iter().collect();
    ranked.sort_by(|a, b| by_score_desc(*a, *b));
    ranked.truncate(n);
    ranked
}
