use std::collections::BTreeMap;

use serde::Serialize;

use super::spec::{ChartSpec, RelationshipMode};
use crate::data::classify::{Classification, ColumnRole};
use crate::data::model::{CellValue, Dataset};
use crate::error::ExploreError;

// ---------------------------------------------------------------------------
// Plot-ready data
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Scatter,
    Bar,
    Heatmap,
}

/// One scatter series: all points sharing a color-by value (a single
/// unlabeled series when no color column is chosen).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterSeries {
    pub label: Option<String>,
    pub points: Vec<[f64; 2]>,
}

/// Chart data ready for rendering, already aggregated where needed.
/// Serialized as-is into the HTML export's embedded JSON block.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartData {
    Scatter { series: Vec<ScatterSeries> },
    Bar { bars: Vec<(String, f64)> },
    Heatmap {
        x_labels: Vec<String>,
        y_labels: Vec<String>,
        /// counts[yi][xi], co-occurrences of (x_labels[xi], y_labels[yi]).
        counts: Vec<Vec<f64>>,
        max_count: f64,
    },
}

impl ChartData {
    pub fn kind(&self) -> ChartKind {
        match self {
            ChartData::Scatter { .. } => ChartKind::Scatter,
            ChartData::Bar { .. } => ChartKind::Bar,
            ChartData::Heatmap { .. } => ChartKind::Heatmap,
        }
    }
}

// ---------------------------------------------------------------------------
// Mode resolution: the decision table
// ---------------------------------------------------------------------------

/// Resolve the plot type for the chosen columns and mode.
///
/// | Mode         | X           | Y           | Plot    |
/// |--------------|-------------|-------------|---------|
/// | One-to-One   | numeric     | numeric     | scatter |
/// | One-to-Many  | categorical | numeric     | bar     |
/// | Many-to-Many | categorical | categorical | heatmap |
/// | Auto         | first matching rule, else unsupported |
pub fn resolve_kind(
    spec: &ChartSpec,
    classification: &Classification,
) -> Result<ChartKind, ExploreError> {
    let x_role = role_of(classification, &spec.x)?;
    let y_role = role_of(classification, &spec.y)?;

    match spec.mode {
        RelationshipMode::OneToOne => {
            require_numeric(&spec.x, x_role, "scatter plots")?;
            require_numeric(&spec.y, y_role, "scatter plots")?;
            Ok(ChartKind::Scatter)
        }
        RelationshipMode::OneToMany => {
            require_categorical(&spec.x, x_role, "bar charts group by X")?;
            require_numeric(&spec.y, y_role, "bar charts")?;
            Ok(ChartKind::Bar)
        }
        RelationshipMode::ManyToMany => {
            require_categorical(&spec.x, x_role, "heatmaps")?;
            require_categorical(&spec.y, y_role, "heatmaps")?;
            Ok(ChartKind::Heatmap)
        }
        RelationshipMode::Auto => match (x_role, y_role) {
            (ColumnRole::Numeric, ColumnRole::Numeric) => Ok(ChartKind::Scatter),
            (ColumnRole::Categorical, ColumnRole::Numeric) => Ok(ChartKind::Bar),
            (ColumnRole::Categorical, ColumnRole::Categorical) => Ok(ChartKind::Heatmap),
            _ => Err(ExploreError::unsupported(format!(
                "no chart rule matches X '{}' ({}) vs Y '{}' ({}); \
                 pick a numeric Y for scatter/bar or categorical X and Y for a heatmap",
                spec.x,
                role_name(x_role),
                spec.y,
                role_name(y_role),
            ))),
        },
    }
}

fn role_of(classification: &Classification, column: &str) -> Result<ColumnRole, ExploreError> {
    classification
        .get(column)
        .copied()
        .ok_or_else(|| ExploreError::unsupported(format!("unknown column '{column}'")))
}

fn role_name(role: ColumnRole) -> &'static str {
    match role {
        ColumnRole::Numeric => "numeric",
        ColumnRole::Categorical => "categorical",
        ColumnRole::Skipped => "high-cardinality text",
    }
}

fn require_numeric(column: &str, role: ColumnRole, what: &str) -> Result<(), ExploreError> {
    if role == ColumnRole::Numeric {
        Ok(())
    } else {
        Err(ExploreError::unsupported(format!(
            "{what} need a numeric column, but '{column}' is {}",
            role_name(role)
        )))
    }
}

fn require_categorical(column: &str, role: ColumnRole, what: &str) -> Result<(), ExploreError> {
    match role {
        ColumnRole::Categorical => Ok(()),
        ColumnRole::Numeric => Err(ExploreError::unsupported(format!(
            "{what} need a categorical column, but '{column}' is numeric"
        ))),
        ColumnRole::Skipped => Err(ExploreError::unsupported(format!(
            "'{column}' has too many distinct values to use as a categorical axis"
        ))),
    }
}

// ---------------------------------------------------------------------------
// Chart construction from the filtered view
// ---------------------------------------------------------------------------

/// Build plot-ready data for the spec over the filtered view.
pub fn build_chart(
    dataset: &Dataset,
    view: &[usize],
    classification: &Classification,
    spec: &ChartSpec,
) -> Result<ChartData, ExploreError> {
    let kind = resolve_kind(spec, classification)?;
    if view.is_empty() {
        return Err(ExploreError::EmptyResult);
    }
    match kind {
        ChartKind::Scatter => build_scatter(dataset, view, spec),
        ChartKind::Bar => build_bar(dataset, view, spec),
        ChartKind::Heatmap => build_heatmap(dataset, view, spec),
    }
}

fn build_scatter(
    dataset: &Dataset,
    view: &[usize],
    spec: &ChartSpec,
) -> Result<ChartData, ExploreError> {
    let x_col = dataset.column(&spec.x).expect("validated by resolve_kind");
    let y_col = dataset.column(&spec.y).expect("validated by resolve_kind");
    let color_col = spec.color_by.as_ref().and_then(|c| dataset.column(c));

    // Group points by the color-by value so each group becomes a series.
    let mut grouped: BTreeMap<Option<CellValue>, Vec<[f64; 2]>> = BTreeMap::new();
    for &row in view {
        let (Some(x), Some(y)) = (x_col.values[row].as_f64(), y_col.values[row].as_f64()) else {
            continue; // nulls carry no point
        };
        let key = color_col.map(|c| c.values[row].clone());
        grouped.entry(key).or_default().push([x, y]);
    }

    let series: Vec<ScatterSeries> = grouped
        .into_iter()
        .map(|(key, points)| ScatterSeries {
            label: key.map(|v| v.to_string()),
            points,
        })
        .collect();

    if series.iter().all(|s| s.points.is_empty()) || series.is_empty() {
        return Err(ExploreError::EmptyResult);
    }
    Ok(ChartData::Scatter { series })
}

fn build_bar(
    dataset: &Dataset,
    view: &[usize],
    spec: &ChartSpec,
) -> Result<ChartData, ExploreError> {
    let x_col = dataset.column(&spec.x).expect("validated by resolve_kind");
    let y_col = dataset.column(&spec.y).expect("validated by resolve_kind");

    // Per distinct X value: row count and the non-null numeric Y values.
    let mut groups: BTreeMap<CellValue, (usize, Vec<f64>)> = BTreeMap::new();
    for &row in view {
        let entry = groups.entry(x_col.values[row].clone()).or_default();
        entry.0 += 1;
        if let Some(y) = y_col.values[row].as_f64() {
            entry.1.push(y);
        }
    }

    let bars: Vec<(String, f64)> = groups
        .into_iter()
        .filter_map(|(x_value, (rows, ys))| {
            spec.aggregation
                .reduce(&ys, rows)
                .map(|v| (x_value.to_string(), v))
        })
        .collect();

    if bars.is_empty() {
        return Err(ExploreError::EmptyResult);
    }
    Ok(ChartData::Bar { bars })
}

fn build_heatmap(
    dataset: &Dataset,
    view: &[usize],
    spec: &ChartSpec,
) -> Result<ChartData, ExploreError> {
    let x_col = dataset.column(&spec.x).expect("validated by resolve_kind");
    let y_col = dataset.column(&spec.y).expect("validated by resolve_kind");

    // Axis labels: distinct values actually present in the view, sorted.
    let mut x_values: Vec<&CellValue> = Vec::new();
    let mut y_values: Vec<&CellValue> = Vec::new();
    for &row in view {
        x_values.push(&x_col.values[row]);
        y_values.push(&y_col.values[row]);
    }
    let mut x_axis: Vec<&CellValue> = x_values.clone();
    x_axis.sort();
    x_axis.dedup();
    let mut y_axis: Vec<&CellValue> = y_values.clone();
    y_axis.sort();
    y_axis.dedup();

    let x_index: BTreeMap<&CellValue, usize> =
        x_axis.iter().enumerate().map(|(i, v)| (*v, i)).collect();
    let y_index: BTreeMap<&CellValue, usize> =
        y_axis.iter().enumerate().map(|(i, v)| (*v, i)).collect();

    let mut counts = vec![vec![0.0; x_axis.len()]; y_axis.len()];
    let mut max_count = 0.0f64;
    for (xv, yv) in x_values.iter().zip(&y_values) {
        let cell = &mut counts[y_index[*yv]][x_index[xv]];
        *cell += 1.0;
        max_count = max_count.max(*cell);
    }

    Ok(ChartData::Heatmap {
        x_labels: x_axis.iter().map(|v| v.to_string()).collect(),
        y_labels: y_axis.iter().map(|v| v.to_string()).collect(),
        counts,
        max_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::spec::Aggregation;
    use crate::data::classify::{classify, ClassifierConfig};
    use crate::data::filter::{filtered_indices, init_filter_state};
    use crate::data::loader::load_bytes;

    fn setup(csv: &[u8]) -> (Dataset, Classification, Vec<usize>) {
        let ds = load_bytes(csv).unwrap();
        let roles = classify(&ds, ClassifierConfig::default());
        let filters = init_filter_state(&ds, &roles);
        let view = filtered_indices(&ds, &filters);
        (ds, roles, view)
    }

    #[test]
    fn one_to_many_sum_aggregates_per_category() {
        let (ds, roles, view) = setup(b"category,value\nA,1\nA,2\nB,3\n");
        let mut spec = ChartSpec::new("category", "value", RelationshipMode::OneToMany);
        spec.aggregation = Aggregation::Sum;
        let ChartData::Bar { bars } = build_chart(&ds, &view, &roles, &spec).unwrap() else {
            panic!("expected a bar chart");
        };
        assert_eq!(bars, vec![("A".to_string(), 3.0), ("B".to_string(), 3.0)]);
    }

    #[test]
    fn auto_picks_scatter_for_numeric_pair() {
        let (ds, roles, view) = setup(b"a,b\n1,2\n3,4\n");
        let spec = ChartSpec::new("a", "b", RelationshipMode::Auto);
        let data = build_chart(&ds, &view, &roles, &spec).unwrap();
        assert_eq!(data.kind(), ChartKind::Scatter);
    }

    #[test]
    fn auto_rejects_numeric_x_text_y() {
        let (ds, roles, view) = setup(b"a,b\n1,x\n2,y\n");
        let spec = ChartSpec::new("a", "b", RelationshipMode::Auto);
        match build_chart(&ds, &view, &roles, &spec) {
            Err(ExploreError::UnsupportedCombination(msg)) => {
                assert!(msg.contains('a') && msg.contains('b'), "{msg}");
            }
            other => panic!("expected UnsupportedCombination, got {other:?}"),
        }
    }

    #[test]
    fn one_to_one_refuses_non_numeric_y_with_guidance() {
        let (ds, roles, view) = setup(b"a,b\n1,x\n2,y\n");
        let spec = ChartSpec::new("a", "b", RelationshipMode::OneToOne);
        match build_chart(&ds, &view, &roles, &spec) {
            Err(ExploreError::UnsupportedCombination(msg)) => {
                assert!(msg.contains("'b'"), "{msg}");
                assert!(msg.contains("numeric"), "{msg}");
            }
            other => panic!("expected UnsupportedCombination, got {other:?}"),
        }
    }

    #[test]
    fn empty_view_signals_empty_result() {
        let (ds, roles, _) = setup(b"a,b\n1,2\n");
        let spec = ChartSpec::new("a", "b", RelationshipMode::Auto);
        assert_eq!(
            build_chart(&ds, &[], &roles, &spec),
            Err(ExploreError::EmptyResult)
        );
    }

    #[test]
    fn heatmap_counts_co_occurrences() {
        let (ds, roles, view) = setup(b"x,y\nA,p\nA,q\nA,p\nB,q\n");
        let spec = ChartSpec::new("x", "y", RelationshipMode::ManyToMany);
        let ChartData::Heatmap {
            x_labels,
            y_labels,
            counts,
            max_count,
        } = build_chart(&ds, &view, &roles, &spec).unwrap()
        else {
            panic!("expected a heatmap");
        };
        assert_eq!(x_labels, ["A", "B"]);
        assert_eq!(y_labels, ["p", "q"]);
        assert_eq!(counts, vec![vec![2.0, 0.0], vec![1.0, 1.0]]);
        assert_eq!(max_count, 2.0);
    }

    #[test]
    fn scatter_series_split_by_color_column() {
        let (ds, roles, view) = setup(b"a,b,g\n1,2,u\n3,4,v\n5,6,u\n");
        let mut spec = ChartSpec::new("a", "b", RelationshipMode::OneToOne);
        spec.color_by = Some("g".into());
        let ChartData::Scatter { series } = build_chart(&ds, &view, &roles, &spec).unwrap()
        else {
            panic!("expected scatter");
        };
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].label.as_deref(), Some("u"));
        assert_eq!(series[0].points.len(), 2);
    }

    #[test]
    fn bar_omits_groups_with_only_null_y_except_for_count() {
        let (ds, roles, view) = setup(b"c,v\nA,\nB,2\n");
        for agg in [
            Aggregation::Sum,
            Aggregation::Mean,
            Aggregation::Min,
            Aggregation::Max,
        ] {
            let mut spec = ChartSpec::new("c", "v", RelationshipMode::OneToMany);
            spec.aggregation = agg;
            let ChartData::Bar { bars } = build_chart(&ds, &view, &roles, &spec).unwrap() else {
                panic!("expected bars for {agg:?}");
            };
            assert_eq!(bars, vec![("B".to_string(), 2.0)], "{agg:?}");
        }

        let mut spec = ChartSpec::new("c", "v", RelationshipMode::OneToMany);
        spec.aggregation = Aggregation::Count;
        let ChartData::Bar { bars } = build_chart(&ds, &view, &roles, &spec).unwrap() else {
            panic!("expected bars");
        };
        assert_eq!(bars, vec![("A".to_string(), 1.0), ("B".to_string(), 1.0)]);
    }

    #[test]
    fn bar_count_counts_rows_even_without_numeric_values() {
        let (ds, roles, view) = setup(b"c,v\nA,1\nA,\nB,2\n");
        let mut spec = ChartSpec::new("c", "v", RelationshipMode::OneToMany);
        spec.aggregation = Aggregation::Count;
        let ChartData::Bar { bars } = build_chart(&ds, &view, &roles, &spec).unwrap() else {
            panic!("expected bars");
        };
        assert_eq!(bars, vec![("A".to_string(), 2.0), ("B".to_string(), 1.0)]);
    }
}
