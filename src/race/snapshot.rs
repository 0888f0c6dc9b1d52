//! Per-year ranked slice of the race dataset

use super::data::BrandRecord;
use std::collections::HashSet;

/// A ranked brand for one year
#[derive(Debug, Clone, PartialEq)]
pub struct RankedItem {
    pub name: String,
    pub value: f64,
    pub last_value: f64,
    /// 0-based position after sorting by value, descending
    pub rank: usize,
}

/// Top `top_n` brands for `year`
///
/// Records whose year lies in `(year - tolerance, year + tolerance]` are
/// selected, so a record exactly between two years belongs to the earlier
/// one. They are sorted by value descending (stable, so ties keep file order)
/// and truncated. A name appearing twice keeps only its highest value, so keys
/// stay unique. Ranks are always exactly `0..len`.
pub fn year_slice(
    records: &[BrandRecord],
    year: f64,
    tolerance: f64,
    top_n: usize,
) -> Vec<RankedItem> {
    let mut rows: Vec<&BrandRecord> = records
        .iter()
        .filter(|r| in_window(r.year - year, tolerance) && !r.value.is_nan())
        .collect();

    rows.sort_by(|a, b| b.value.total_cmp(&a.value));

    let mut seen = HashSet::new();
    let mut slice = Vec::with_capacity(top_n.min(rows.len()));
    for row in rows {
        if slice.len() == top_n {
            break;
        }
        if !seen.insert(row.name.as_str()) {
            tracing::warn!(name = %row.name, year, "duplicate brand in one year, keeping the larger value");
            continue;
        }
        slice.push(RankedItem {
            name: row.name.clone(),
            value: row.value,
            last_value: row.last_value,
            rank: slice.len(),
        });
    }
    slice
}

/// Half-open year window, compared at the precision years are generated with
fn in_window(offset: f64, tolerance: f64) -> bool {
    let offset = (offset * 1e9).round() / 1e9;
    -tolerance < offset && offset <= tolerance
}
