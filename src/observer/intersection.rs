//! Intersection geometry.
//!
//! Mirrors the browser rules: the root margin is applied to the viewport
//! first, the ratio is the visible share of the target's area, and a
//! zero-area target that touches the root counts as fully visible.

use crate::config::RevealOptions;
use crate::types::{Rect, RegionId};

use super::IntersectionEntry;

/// Compute the intersection entry of `target` against `viewport`.
pub fn compute_entry(region: RegionId, target: Rect, viewport: Rect, options: &RevealOptions) -> IntersectionEntry {
    let root = viewport.expand(&options.root_margin);

    // A margin larger than the viewport collapses the root entirely
    if root.width < 0.0 || root.height < 0.0 {
        return IntersectionEntry::outside(region);
    }

    match target.intersection(&root) {
        None => IntersectionEntry::outside(region),
        Some(overlap) => {
            let area = target.area();
            let ratio = if area > 0.0 { overlap.area() / area } else { 1.0 };
            IntersectionEntry::intersecting(region, ratio)
        }
    }
}
