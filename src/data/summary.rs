use super::classify::{Classification, ColumnRole};
use super::model::Dataset;
use crate::error::ExploreError;

/// Cap on categorical value-count rows shown; the rest is reported as a
/// single "+N more" tail.
pub const MAX_VALUE_ROWS: usize = 20;

// ---------------------------------------------------------------------------
// Descriptive statistics for one column over the filtered view
// ---------------------------------------------------------------------------

/// Describe-style statistics for a numeric column. Quartiles use linear
/// interpolation; the standard deviation is the sample one and absent for
/// fewer than two values.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericSummary {
    pub count: usize,
    pub mean: f64,
    pub std: Option<f64>,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

/// Frequency table for a categorical column, descending by count.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueCounts {
    pub rows: Vec<(String, usize)>,
    /// Number of distinct values truncated off the table (0 = complete).
    pub truncated: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnSummary {
    Numeric(NumericSummary),
    Categorical(ValueCounts),
}

/// Summarise `column` over the rows of `view`.
///
/// Numeric columns (per the classification) get descriptive statistics over
/// their non-null values; everything else gets value counts. An empty view,
/// or a numeric column with no non-null values in the view, signals
/// [`ExploreError::EmptyResult`].
pub fn summarize(
    dataset: &Dataset,
    view: &[usize],
    classification: &Classification,
    column: &str,
) -> Result<ColumnSummary, ExploreError> {
    let col = dataset
        .column(column)
        .ok_or_else(|| ExploreError::unsupported(format!("unknown column '{column}'")))?;

    if view.is_empty() {
        return Err(ExploreError::EmptyResult);
    }

    if classification.get(column) == Some(&ColumnRole::Numeric) {
        let mut values: Vec<f64> = view
            .iter()
            .filter_map(|&row| col.values[row].as_f64())
            .collect();
        if values.is_empty() {
            return Err(ExploreError::EmptyResult);
        }
        values.sort_by(f64::total_cmp);
        Ok(ColumnSummary::Numeric(describe(&values)))
    } else {
        Ok(ColumnSummary::Categorical(value_counts(col, view)))
    }
}

fn describe(sorted: &[f64]) -> NumericSummary {
    let n = sorted.len();
    let mean = sorted.iter().sum::<f64>() / n as f64;
    let std = if n >= 2 {
        let ss = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>();
        Some((ss / (n - 1) as f64).sqrt())
    } else {
        None
    };
    NumericSummary {
        count: n,
        mean,
        std,
        min: sorted[0],
        q25: quantile(sorted, 0.25),
        median: quantile(sorted, 0.5),
        q75: quantile(sorted, 0.75),
        max: sorted[n - 1],
    }
}

/// Linearly interpolated quantile over an already-sorted slice.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        let frac = pos - lo as f64;
        sorted[lo] * (1.0 - frac) + sorted[hi] * frac
    }
}

fn value_counts(col: &crate::data::model::Column, view: &[usize]) -> ValueCounts {
    use std::collections::BTreeMap;

    let mut counts: BTreeMap<&crate::data::model::CellValue, usize> = BTreeMap::new();
    for &row in view {
        *counts.entry(&col.values[row]).or_default() += 1;
    }

    // Descending by frequency; BTreeMap iteration makes ties value-ordered.
    let mut rows: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(v, n)| (v.to_string(), n))
        .collect();
    rows.sort_by(|a, b| b.1.cmp(&a.1));

    let truncated = rows.len().saturating_sub(MAX_VALUE_ROWS);
    rows.truncate(MAX_VALUE_ROWS);
    ValueCounts { rows, truncated }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::classify::{classify, ClassifierConfig};
    use crate::data::loader::load_bytes;

    fn setup(csv: &[u8]) -> (Dataset, Classification, Vec<usize>) {
        let ds = load_bytes(csv).unwrap();
        let roles = classify(&ds, ClassifierConfig::default());
        let view: Vec<usize> = (0..ds.len()).collect();
        (ds, roles, view)
    }

    #[test]
    fn numeric_describe_matches_hand_computation() {
        let (ds, roles, view) = setup(b"v\n1\n2\n3\n4\n");
        let ColumnSummary::Numeric(s) = summarize(&ds, &view, &roles, "v").unwrap() else {
            panic!("expected numeric summary");
        };
        assert_eq!(s.count, 4);
        assert_eq!(s.mean, 2.5);
        assert_eq!(s.min, 1.0);
        assert_eq!(s.q25, 1.75);
        assert_eq!(s.median, 2.5);
        assert_eq!(s.q75, 3.25);
        assert_eq!(s.max, 4.0);
        let std = s.std.unwrap();
        assert!((std - 1.2909944487358056).abs() < 1e-12);
    }

    #[test]
    fn categorical_counts_descend_and_truncate() {
        let mut csv = String::from("c\n");
        for i in 0..25 {
            for _ in 0..=i {
                csv.push_str(&format!("v{i:02}\n"));
            }
        }
        let (ds, roles, view) = setup(csv.as_bytes());
        let ColumnSummary::Categorical(vc) = summarize(&ds, &view, &roles, "c").unwrap() else {
            panic!("expected value counts");
        };
        assert_eq!(vc.rows.len(), MAX_VALUE_ROWS);
        assert_eq!(vc.truncated, 5);
        assert_eq!(vc.rows[0], ("v24".into(), 25));
        assert!(vc.rows.windows(2).all(|w| w[0].1 >= w[1].1));
    }

    #[test]
    fn empty_view_signals_empty_result() {
        let (ds, roles, _) = setup(b"v\n1\n2\n");
        assert_eq!(
            summarize(&ds, &[], &roles, "v"),
            Err(ExploreError::EmptyResult)
        );
    }

    #[test]
    fn single_value_has_no_std() {
        let (ds, roles, _) = setup(b"v\n5\n9\n");
        let ColumnSummary::Numeric(s) = summarize(&ds, &[0], &roles, "v").unwrap() else {
            panic!("expected numeric summary");
        };
        assert_eq!(s.count, 1);
        assert_eq!(s.std, None);
        assert_eq!(s.median, 5.0);
    }
}
