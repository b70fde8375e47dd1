use std::collections::HashSet;

use tracing::debug;

use crate::math::polygon_2d::{clip_convex_polygons, convex_polygons_overlap};

use super::overlap::OverlapInfo;
use super::patterns::GroupPatterns;

/// Face triples of one group that pairwise overlap and share a common area,
/// ascending within each triple and in lexicographic order.
///
/// Three faces that overlap pairwise without a common point may legally
/// stack in a cycle, so they are not returned.
#[must_use]
pub fn transitivity_trios(overlap: &OverlapInfo, group: usize, epsilon: f64) -> Vec<[u32; 3]> {
    let mut trios = Vec::new();
    for &a in overlap.groups()[group].faces() {
        for &b in overlap.overlapping(a).iter().filter(|&&b| b > a) {
            let mut shared = None;
            for &c in overlap.overlapping(b).iter().filter(|&&c| c > b) {
                if !overlap.overlaps(a, c) {
                    continue;
                }
                let ab = shared.get_or_insert_with(|| {
                    clip_convex_polygons(overlap.polygon(a), overlap.polygon(b), epsilon)
                });
                if let Some(ab) = ab {
                    if convex_polygons_overlap(ab, overlap.polygon(c), epsilon) {
                        trios.push([a, b, c]);
                    }
                }
            }
        }
    }
    trios
}

/// Drops the trios whose three orders are already tied together by a
/// taco-taco or taco-tortilla pattern of the same group.
#[must_use]
pub fn filter_transitivity(trios: Vec<[u32; 3]>, patterns: &GroupPatterns) -> Vec<[u32; 3]> {
    let mut covered: HashSet<[u32; 3]> = HashSet::new();
    for &[a, b, c, d] in &patterns.taco_taco {
        for trio in [[a, b, c], [a, b, d], [a, c, d], [b, c, d]] {
            covered.insert(sorted(trio));
        }
    }
    for &trio in &patterns.taco_tortilla {
        covered.insert(sorted(trio));
    }
    let before = trios.len();
    let kept: Vec<[u32; 3]> = trios.into_iter().filter(|t| !covered.contains(t)).collect();
    debug!(trios = before, kept = kept.len(), "transitivity filter");
    kept
}

fn sorted(mut trio: [u32; 3]) -> [u32; 3] {
    trio.sort_unstable();
    trio
}
