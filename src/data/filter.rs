use std::collections::{BTreeMap, BTreeSet};

use super::classify::{Classification, ColumnRole};
use super::model::{CellValue, Dataset};

// ---------------------------------------------------------------------------
// Filter predicates: one widget's worth of state per filterable column
// ---------------------------------------------------------------------------

/// The selection behind one filter widget.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnFilter {
    /// Inclusive numeric range. Defaults to the column's observed bounds.
    Range { min: f64, max: f64 },
    /// Accepted categorical values. Defaults to all distinct values.
    Values(BTreeSet<CellValue>),
}

/// Per-column filter state: column name → selection.
/// Skipped columns never get an entry.
pub type FilterState = BTreeMap<String, ColumnFilter>;

/// Build the all-default filter state for a freshly classified dataset:
/// full range for numeric columns, everything selected for categorical
/// ones. Applying this state reproduces the whole dataset.
pub fn init_filter_state(dataset: &Dataset, classification: &Classification) -> FilterState {
    let mut filters = FilterState::new();
    for col in &dataset.columns {
        match classification.get(&col.name) {
            Some(ColumnRole::Numeric) => {
                if let Some((min, max)) = col.numeric_bounds() {
                    filters.insert(col.name.clone(), ColumnFilter::Range { min, max });
                }
            }
            Some(ColumnRole::Categorical) => {
                let all = dataset
                    .unique_values
                    .get(&col.name)
                    .cloned()
                    .unwrap_or_default();
                // Constant columns get no widget: there is nothing to narrow.
                if all.iter().filter(|v| !v.is_null()).count() > 1 {
                    filters.insert(col.name.clone(), ColumnFilter::Values(all));
                }
            }
            _ => {}
        }
    }
    filters
}

/// Whether a single row passes every active filter (logical AND).
///
/// A filter is inactive, and skipped, when it still matches everything:
/// a range equal to the column's observed bounds, or a value set covering
/// every distinct value. Inactive filters therefore never hide rows with
/// nulls; an explicitly narrowed range does.
pub fn row_passes(dataset: &Dataset, row: usize, filters: &FilterState) -> bool {
    for (col_name, filter) in filters {
        let Some(col) = dataset.column(col_name) else {
            continue;
        };
        let value = &col.values[row];
        match filter {
            ColumnFilter::Range { min, max } => {
                if let Some((lo, hi)) = col.numeric_bounds() {
                    if *min <= lo && *max >= hi {
                        continue; // full range, no constraint
                    }
                }
                match value.as_f64() {
                    Some(x) => {
                        if x < *min || x > *max {
                            return false;
                        }
                    }
                    None => return false,
                }
            }
            ColumnFilter::Values(selected) => {
                if selected.is_empty() {
                    // Nothing selected for this column → hide everything
                    return false;
                }
                if let Some(all_vals) = dataset.unique_values.get(col_name) {
                    if selected.len() == all_vals.len() {
                        continue; // everything selected, no filtering needed
                    }
                }
                if !selected.contains(value) {
                    return false;
                }
            }
        }
    }
    true
}

/// Indices of rows passing all active filters. Pure: same dataset and
/// filter state always give the same view.
pub fn filtered_indices(dataset: &Dataset, filters: &FilterState) -> Vec<usize> {
    (0..dataset.len())
        .filter(|&row| row_passes(dataset, row, filters))
        .collect()
}
