use std::collections::BTreeMap;

use super::model::Dataset;

// ---------------------------------------------------------------------------
// Column classification: which columns get widgets and axis roles
// ---------------------------------------------------------------------------

/// Role assigned to each column, derived once per loaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    /// Numeric type: range-filterable and always eligible as a plot axis.
    Numeric,
    /// Non-numeric with a manageable number of distinct values:
    /// multi-select filterable and usable as a categorical axis.
    Categorical,
    /// Non-numeric with too many distinct values for a usable widget.
    Skipped,
}

/// Tunables for classification. The distinct-value cap exists for UI
/// usability, not as a statistical rule.
#[derive(Debug, Clone, Copy)]
pub struct ClassifierConfig {
    /// A non-numeric column with this many or more distinct values is
    /// skipped for filtering and categorical axis roles.
    pub max_distinct: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self { max_distinct: 100 }
    }
}

/// Column name → role, in the dataset's column order when iterated via
/// [`Dataset::column_names`].
pub type Classification = BTreeMap<String, ColumnRole>;

/// Classify every column of the dataset.
pub fn classify(dataset: &Dataset, config: ClassifierConfig) -> Classification {
    dataset
        .columns
        .iter()
        .map(|col| {
            let role = if col.ty.is_numeric() {
                ColumnRole::Numeric
            } else {
                // Null is a missing value, not a category of its own.
                let distinct = dataset
                    .unique_values
                    .get(&col.name)
                    .map_or(0, |set| set.iter().filter(|v| !v.is_null()).count());
                if distinct >= config.max_distinct {
                    ColumnRole::Skipped
                } else {
                    ColumnRole::Categorical
                }
            };
            (col.name.clone(), role)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::load_bytes;

    fn wide_text_column(n: usize) -> Dataset {
        let mut csv = String::from("id\n");
        for i in 0..n {
            csv.push_str(&format!("row-{i}\n"));
        }
        load_bytes(csv.as_bytes()).unwrap()
    }

    #[test]
    fn numeric_columns_are_numeric_regardless_of_cardinality() {
        let mut csv = String::from("v\n");
        for i in 0..500 {
            csv.push_str(&format!("{i}\n"));
        }
        let ds = load_bytes(csv.as_bytes()).unwrap();
        let roles = classify(&ds, ClassifierConfig::default());
        assert_eq!(roles["v"], ColumnRole::Numeric);
    }

    #[test]
    fn high_cardinality_text_is_skipped() {
        let ds = wide_text_column(150);
        let roles = classify(&ds, ClassifierConfig::default());
        assert_eq!(roles["id"], ColumnRole::Skipped);
    }

    #[test]
    fn threshold_boundary() {
        let cfg = ClassifierConfig { max_distinct: 100 };
        let under = classify(&wide_text_column(99), cfg);
        assert_eq!(under["id"], ColumnRole::Categorical);
        let at = classify(&wide_text_column(100), cfg);
        assert_eq!(at["id"], ColumnRole::Skipped);
    }

    #[test]
    fn nulls_do_not_count_toward_the_distinct_cap() {
        let mut csv = String::from("id,v\n");
        for i in 0..99 {
            csv.push_str(&format!("row-{i},1\n"));
        }
        csv.push_str(",1\n");
        let ds = load_bytes(csv.as_bytes()).unwrap();
        assert_eq!(ds.unique_values["id"].len(), 100);
        let roles = classify(&ds, ClassifierConfig { max_distinct: 100 });
        assert_eq!(roles["id"], ColumnRole::Categorical);
    }

    #[test]
    fn classification_is_deterministic() {
        let ds = load_bytes(b"a,b\n1,x\n2,y\n").unwrap();
        let cfg = ClassifierConfig::default();
        assert_eq!(classify(&ds, cfg), classify(&ds, cfg));
    }
}
