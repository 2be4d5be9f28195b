use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::chart::build::{build_chart, ChartData};
use crate::chart::spec::{Aggregation, ChartSpec, RelationshipMode};
use crate::data::classify::{classify, Classification, ClassifierConfig, ColumnRole};
use crate::data::filter::{filtered_indices, init_filter_state, ColumnFilter, FilterState};
use crate::data::model::{CellValue, Dataset};
use crate::data::summary::{summarize, ColumnSummary};
use crate::error::ExploreError;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded dataset (None until the user opens a file).
    pub dataset: Option<Dataset>,

    /// Path of the loaded file; loading is keyed on it, so re-renders never
    /// re-parse.
    pub loaded_path: Option<PathBuf>,

    /// Per-column roles, recomputed once per load.
    pub classification: Classification,

    /// Classifier tunables (distinct-value cap for filter widgets).
    pub config: ClassifierConfig,

    /// Per-column filter selections.
    pub filters: FilterState,

    /// Indices of rows passing the current filters (cached).
    pub visible_indices: Vec<usize>,

    // ---- chart controls ----
    pub x_column: Option<String>,
    pub y_column: Option<String>,
    pub mode: RelationshipMode,
    pub aggregation: Aggregation,
    pub color_by: Option<String>,
    /// Axis label overrides; empty means "use the column name".
    pub x_label: String,
    pub y_label: String,
    pub plot_height: f32,

    /// Column shown in the summary-statistics table.
    pub summary_column: Option<String>,

    /// Chart built from the current selections (None until X and Y chosen).
    pub chart: Option<Result<ChartData, ExploreError>>,

    /// Summary for `summary_column` over the filtered view.
    pub summary: Option<Result<ColumnSummary, ExploreError>>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            dataset: None,
            loaded_path: None,
            classification: Classification::default(),
            config: ClassifierConfig::default(),
            filters: FilterState::default(),
            visible_indices: Vec::new(),
            x_column: None,
            y_column: None,
            mode: RelationshipMode::Auto,
            aggregation: Aggregation::Count,
            color_by: None,
            x_label: String::new(),
            y_label: String::new(),
            plot_height: 500.0,
            summary_column: None,
            chart: None,
            summary: None,
            status_message: None,
        }
    }
}

impl AppState {
    /// Ingest a newly loaded dataset: classify once, reset filters and
    /// chart selections.
    pub fn set_dataset(&mut self, dataset: Dataset, path: Option<PathBuf>) {
        self.classification = classify(&dataset, self.config);
        self.filters = init_filter_state(&dataset, &self.classification);
        self.visible_indices = (0..dataset.len()).collect();

        self.x_column = None;
        self.y_column = None;
        self.color_by = None;
        self.x_label.clear();
        self.y_label.clear();
        self.summary_column = dataset.column_names().first().cloned();
        self.chart = None;

        self.dataset = Some(dataset);
        self.loaded_path = path;
        self.status_message = None;
        self.rebuild_summary();
    }

    /// Recompute `visible_indices` after a filter change, then everything
    /// derived from the view.
    pub fn refilter(&mut self) {
        if let Some(ds) = &self.dataset {
            self.visible_indices = filtered_indices(ds, &self.filters);
        }
        self.rebuild_chart();
        self.rebuild_summary();
    }

    /// The chart request assembled from the current widget selections, once
    /// both axes are chosen.
    pub fn chart_spec(&self) -> Option<ChartSpec> {
        let x = self.x_column.clone()?;
        let y = self.y_column.clone()?;
        let mut spec = ChartSpec::new(x, y, self.mode);
        spec.aggregation = self.aggregation;
        spec.color_by = self.color_by.clone();
        if !self.x_label.trim().is_empty() {
            spec.x_label = Some(self.x_label.trim().to_string());
        }
        if !self.y_label.trim().is_empty() {
            spec.y_label = Some(self.y_label.trim().to_string());
        }
        spec.height = self.plot_height;
        Some(spec)
    }

    /// Rebuild the chart from the current selections and view.
    pub fn rebuild_chart(&mut self) {
        self.chart = match (&self.dataset, self.chart_spec()) {
            (Some(ds), Some(spec)) => Some(build_chart(
                ds,
                &self.visible_indices,
                &self.classification,
                &spec,
            )),
            _ => None,
        };
    }

    /// Rebuild the summary table for the selected column.
    pub fn rebuild_summary(&mut self) {
        self.summary = match (&self.dataset, &self.summary_column) {
            (Some(ds), Some(col)) => Some(summarize(
                ds,
                &self.visible_indices,
                &self.classification,
                col,
            )),
            _ => None,
        };
    }

    /// Columns eligible as categorical axes or color groups.
    pub fn categorical_columns(&self) -> Vec<String> {
        self.columns_with_role(ColumnRole::Categorical)
    }

    /// Columns eligible as numeric axes.
    pub fn numeric_columns(&self) -> Vec<String> {
        self.columns_with_role(ColumnRole::Numeric)
    }

    fn columns_with_role(&self, role: ColumnRole) -> Vec<String> {
        let Some(ds) = &self.dataset else {
            return Vec::new();
        };
        ds.column_names()
            .into_iter()
            .filter(|name| self.classification.get(name) == Some(&role))
            .collect()
    }

    /// X-axis candidates for the current relationship mode, mirroring the
    /// per-mode option lists of the controls row.
    pub fn x_candidates(&self) -> Vec<String> {
        match self.mode {
            RelationshipMode::ManyToMany => self.categorical_columns(),
            _ => self
                .dataset
                .as_ref()
                .map(|ds| ds.column_names())
                .unwrap_or_default(),
        }
    }

    /// Y-axis candidates for the current relationship mode.
    pub fn y_candidates(&self) -> Vec<String> {
        match self.mode {
            RelationshipMode::ManyToMany => self.categorical_columns(),
            RelationshipMode::Auto => self
                .dataset
                .as_ref()
                .map(|ds| ds.column_names())
                .unwrap_or_default(),
            _ => self.numeric_columns(),
        }
    }

    /// Toggle a single value in a categorical column's filter.
    pub fn toggle_filter_value(&mut self, column: &str, value: &CellValue) {
        if let Some(ColumnFilter::Values(selected)) = self.filters.get_mut(column) {
            if !selected.remove(value) {
                selected.insert(value.clone());
            }
            self.refilter();
        }
    }

    /// Select all values in a categorical column.
    pub fn select_all(&mut self, column: &str) {
        if let Some(ds) = &self.dataset {
            if let Some(all_vals) = ds.unique_values.get(column) {
                self.filters
                    .insert(column.to_string(), ColumnFilter::Values(all_vals.clone()));
                self.refilter();
            }
        }
    }

    /// Deselect all values in a categorical column.
    pub fn select_none(&mut self, column: &str) {
        if matches!(self.filters.get(column), Some(ColumnFilter::Values(_))) {
            self.filters
                .insert(column.to_string(), ColumnFilter::Values(BTreeSet::new()));
            self.refilter();
        }
    }

    /// Reset a numeric column's range to the observed bounds.
    pub fn reset_range(&mut self, column: &str) {
        if let Some(ds) = &self.dataset {
            if let Some((min, max)) = ds.column(column).and_then(|c| c.numeric_bounds()) {
                self.filters
                    .insert(column.to_string(), ColumnFilter::Range { min, max });
                self.refilter();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::load_bytes;

    fn state_with(csv: &[u8]) -> AppState {
        let mut state = AppState::default();
        let ds = load_bytes(csv).unwrap();
        state.set_dataset(ds, None);
        state
    }

    #[test]
    fn set_dataset_classifies_and_shows_all_rows() {
        let state = state_with(b"category,value\nA,1\nA,2\nB,3\n");
        assert_eq!(state.visible_indices, vec![0, 1, 2]);
        assert_eq!(state.classification["value"], ColumnRole::Numeric);
        assert_eq!(state.classification["category"], ColumnRole::Categorical);
        assert_eq!(state.summary_column.as_deref(), Some("category"));
    }

    #[test]
    fn toggling_a_value_refilters_and_updates_downstream() {
        let mut state = state_with(b"category,value\nA,1\nA,2\nB,3\n");
        state.x_column = Some("category".into());
        state.y_column = Some("value".into());
        state.mode = RelationshipMode::OneToMany;
        state.aggregation = Aggregation::Sum;
        state.rebuild_chart();

        state.toggle_filter_value("category", &CellValue::Text("B".into()));
        assert_eq!(state.visible_indices, vec![0, 1]);
        let Some(Ok(ChartData::Bar { bars })) = &state.chart else {
            panic!("expected a rebuilt bar chart, got {:?}", state.chart);
        };
        assert_eq!(bars, &[("A".to_string(), 3.0)]);
    }

    #[test]
    fn select_none_yields_empty_result_chart_and_summary() {
        let mut state = state_with(b"category,value\nA,1\nB,2\n");
        state.x_column = Some("category".into());
        state.y_column = Some("value".into());
        state.select_none("category");
        assert!(state.visible_indices.is_empty());
        assert_eq!(state.chart, Some(Err(ExploreError::EmptyResult)));
        assert_eq!(state.summary, Some(Err(ExploreError::EmptyResult)));
    }

    #[test]
    fn axis_candidates_follow_the_mode() {
        let mut state = state_with(b"category,value\nA,1\nB,2\n");
        state.mode = RelationshipMode::OneToMany;
        assert_eq!(state.x_candidates(), ["category", "value"]);
        assert_eq!(state.y_candidates(), ["value"]);
        state.mode = RelationshipMode::ManyToMany;
        assert_eq!(state.y_candidates(), ["category"]);
    }
}
