//! Partial-cluster layout bitmaps.
//!
//! The compiler may place the same network onto several different subsets of
//! the die's compute clusters and ship one compiled variant per placement.
//! Each variant is keyed by a 32-bit bitmap with one bit per cluster; bit `n`
//! set means cluster `n` is active in that placement.

/// Compute clusters on a TSR1 die.
pub const CLUSTERS_COUNT: u32 = 8;

/// Bitmap with every cluster of a TSR1 die active.
pub const FULL_CLUSTERS_LAYOUT: u32 = (1 << CLUSTERS_COUNT) - 1;

/// Reserved bitmap meaning "any layout will do".
///
/// Callers pass this when the placement does not matter (for example a
/// program compiled for a single layout); lookups keyed by it resolve to an
/// arbitrary registered variant. No real layout uses this value; the die
/// has far fewer than 32 clusters.
pub const PARTIAL_CLUSTERS_LAYOUT_IGNORE: u32 = u32::MAX;

/// Number of clusters enabled by `bitmap`.
#[must_use]
pub const fn active_clusters(bitmap: u32) -> u32 {
    bitmap.count_ones()
}

/// True if `bitmap` is the reserved "any layout" sentinel.
#[must_use]
pub const fn is_layout_ignore(bitmap: u32) -> bool {
    bitmap == PARTIAL_CLUSTERS_LAYOUT_IGNORE
}
