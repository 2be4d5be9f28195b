use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::{self, Color32, DragValue, RichText, ScrollArea, Slider, Ui};
use egui_extras::{Column as TableColumn, TableBuilder};

use crate::chart::spec::{Aggregation, RelationshipMode};
use crate::data::classify::ColumnRole;
use crate::data::filter::ColumnFilter;
use crate::data::model::CellValue;
use crate::data::summary::ColumnSummary;
use crate::error::ExploreError;
use crate::export;
use crate::state::AppState;

/// Rows shown in the filtered-data preview table.
const PREVIEW_ROWS: usize = 20;

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.menu_button("Export", |ui: &mut Ui| {
            if ui.button("Filtered data as CSV…").clicked() {
                export_csv_dialog(state);
                ui.close_menu();
            }
            if ui.button("Chart as HTML…").clicked() {
                export_chart_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            let name = state
                .loaded_path
                .as_ref()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "untitled".into());
            ui.label(format!(
                "{name}: {} rows loaded, {} after filters",
                ds.len(),
                state.visible_indices.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Left side panel – auto-generated filter widgets
// ---------------------------------------------------------------------------

/// Render the filter panel: a range widget per numeric column, a
/// multi-select per categorical column, a note for skipped columns.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let Some(dataset) = &state.dataset else {
        ui.label("No dataset loaded.");
        return;
    };

    // Clone what we need so we can mutate state inside the loop.
    let columns = dataset.column_names();
    let unique = dataset.unique_values.clone();
    let bounds: BTreeMap<String, (f64, f64)> = dataset
        .columns
        .iter()
        .filter_map(|c| c.numeric_bounds().map(|b| (c.name.clone(), b)))
        .collect();
    let classification = state.classification.clone();

    let mut range_changed = false;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for col in &columns {
                match classification.get(col) {
                    Some(ColumnRole::Numeric) => {
                        range_changed |= range_widget(ui, state, col, bounds.get(col));
                    }
                    Some(ColumnRole::Categorical) => {
                        let Some(all_values) = unique.get(col) else {
                            continue;
                        };
                        if state.filters.contains_key(col) {
                            category_widget(ui, state, col, all_values);
                        } else {
                            ui.weak(format!("{col}: constant"));
                        }
                    }
                    Some(ColumnRole::Skipped) => {
                        let distinct = unique.get(col).map_or(0, |v| v.len());
                        ui.weak(format!("{col}: skipped ({distinct} distinct values)"));
                    }
                    None => {}
                }
            }
        });

    if range_changed {
        state.refilter();
    }
}

fn range_widget(
    ui: &mut Ui,
    state: &mut AppState,
    col: &str,
    bounds: Option<&(f64, f64)>,
) -> bool {
    let speed = bounds.map_or(0.1, |(lo, hi)| ((hi - lo) / 200.0).max(0.001));
    let mut changed = false;
    let mut reset = false;

    ui.strong(col);
    if let Some(ColumnFilter::Range { min, max }) = state.filters.get_mut(col) {
        ui.horizontal(|ui: &mut Ui| {
            changed |= ui.add(DragValue::new(min).speed(speed).prefix("min ")).changed();
            changed |= ui.add(DragValue::new(max).speed(speed).prefix("max ")).changed();
            reset = ui.small_button("Reset").clicked();
        });
    }
    ui.separator();

    if reset {
        state.reset_range(col);
    }
    changed
}

fn category_widget(ui: &mut Ui, state: &mut AppState, col: &str, all_values: &BTreeSet<CellValue>) {
    let n_selected = match state.filters.get(col) {
        Some(ColumnFilter::Values(selected)) => selected.len(),
        _ => 0,
    };
    let n_total = all_values.len();
    let header_text = format!("{col}  ({n_selected}/{n_total})");

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt(col)
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    state.select_all(col);
                }
                if ui.small_button("None").clicked() {
                    state.select_none(col);
                }
            });

            for val in all_values {
                let is_selected = match state.filters.get(col) {
                    Some(ColumnFilter::Values(selected)) => selected.contains(val),
                    _ => false,
                };
                let mut checked = is_selected;
                if ui.checkbox(&mut checked, val.to_string()).changed() {
                    state.toggle_filter_value(col, val);
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Chart controls
// ---------------------------------------------------------------------------

/// Render the graph-generator controls row: relationship mode, X/Y columns,
/// summary column, and the advanced presentation options.
pub fn chart_controls(ui: &mut Ui, state: &mut AppState) {
    if state.dataset.is_none() {
        return;
    }

    ui.horizontal(|ui: &mut Ui| {
        ui.label("Relationship:");
        for mode in RelationshipMode::ALL {
            if ui
                .selectable_label(state.mode == mode, mode.label())
                .clicked()
            {
                state.mode = mode;
                // Deselect axes no longer offered under the new mode.
                if let Some(x) = state.x_column.clone() {
                    if !state.x_candidates().contains(&x) {
                        state.x_column = None;
                    }
                }
                if let Some(y) = state.y_column.clone() {
                    if !state.y_candidates().contains(&y) {
                        state.y_column = None;
                    }
                }
                state.rebuild_chart();
            }
        }
    });

    let x_options = state.x_candidates();
    let y_options = state.y_candidates();
    let all_columns = state
        .dataset
        .as_ref()
        .map(|ds| ds.column_names())
        .unwrap_or_default();

    ui.horizontal(|ui: &mut Ui| {
        let mut chart_changed = false;
        chart_changed |= column_combo(ui, "x_col", "X Column", &mut state.x_column, x_options);
        chart_changed |= column_combo(ui, "y_col", "Y Column", &mut state.y_column, y_options);
        if chart_changed {
            state.rebuild_chart();
        }

        if column_combo(ui, "summary_col", "Summary", &mut state.summary_column, all_columns) {
            state.rebuild_summary();
        }
    });

    egui::CollapsingHeader::new("Advanced graph options")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            let mut chart_changed = false;

            ui.horizontal(|ui: &mut Ui| {
                ui.label("Color by:");
                let selected = state.color_by.clone().unwrap_or_else(|| "None".into());
                egui::ComboBox::from_id_salt("color_by")
                    .selected_text(selected)
                    .show_ui(ui, |ui: &mut Ui| {
                        if ui
                            .selectable_label(state.color_by.is_none(), "None")
                            .clicked()
                        {
                            state.color_by = None;
                            chart_changed = true;
                        }
                        let columns = state
                            .dataset
                            .as_ref()
                            .map(|ds| ds.column_names())
                            .unwrap_or_default();
                        for col in columns {
                            if ui
                                .selectable_label(state.color_by.as_deref() == Some(col.as_str()), &col)
                                .clicked()
                            {
                                state.color_by = Some(col.clone());
                                chart_changed = true;
                            }
                        }
                    });

                ui.label("Aggregation:");
                egui::ComboBox::from_id_salt("aggregation")
                    .selected_text(state.aggregation.label())
                    .show_ui(ui, |ui: &mut Ui| {
                        for agg in Aggregation::ALL {
                            if ui
                                .selectable_label(state.aggregation == agg, agg.label())
                                .clicked()
                            {
                                state.aggregation = agg;
                                chart_changed = true;
                            }
                        }
                    });
            });

            ui.horizontal(|ui: &mut Ui| {
                ui.label("X label:");
                ui.text_edit_singleline(&mut state.x_label);
                ui.label("Y label:");
                ui.text_edit_singleline(&mut state.y_label);
            });

            ui.horizontal(|ui: &mut Ui| {
                ui.label("Plot height:");
                ui.add(Slider::new(&mut state.plot_height, 300.0..=1000.0).suffix(" px"));
            });

            if chart_changed {
                state.rebuild_chart();
            }
        });
}

fn column_combo(
    ui: &mut Ui,
    id: &str,
    label: &str,
    selection: &mut Option<String>,
    options: Vec<String>,
) -> bool {
    let mut changed = false;
    ui.label(format!("{label}:"));
    let selected_text = selection.clone().unwrap_or_else(|| "Select…".into());
    egui::ComboBox::from_id_salt(id)
        .selected_text(selected_text)
        .show_ui(ui, |ui: &mut Ui| {
            for col in options {
                if ui
                    .selectable_label(selection.as_deref() == Some(col.as_str()), &col)
                    .clicked()
                {
                    *selection = Some(col);
                    changed = true;
                }
            }
        });
    changed
}

// ---------------------------------------------------------------------------
// Summary statistics table
// ---------------------------------------------------------------------------

/// Render the summary-statistics table for the selected column.
pub fn summary_panel(ui: &mut Ui, state: &AppState) {
    let Some(col) = &state.summary_column else {
        return;
    };

    ui.strong(format!("Summary statistics for '{col}'"));
    match &state.summary {
        Some(Ok(ColumnSummary::Numeric(s))) => {
            egui::Grid::new("numeric_summary").striped(true).show(ui, |ui: &mut Ui| {
                ui.label("count");
                ui.label(s.count.to_string());
                ui.end_row();
                ui.label("mean");
                ui.label(format!("{:.4}", s.mean));
                ui.end_row();
                ui.label("std");
                ui.label(match s.std {
                    Some(std) => format!("{std:.4}"),
                    None => "-".to_string(),
                });
                ui.end_row();
                ui.label("min");
                ui.label(format!("{}", s.min));
                ui.end_row();
                ui.label("25%");
                ui.label(format!("{:.4}", s.q25));
                ui.end_row();
                ui.label("50%");
                ui.label(format!("{:.4}", s.median));
                ui.end_row();
                ui.label("75%");
                ui.label(format!("{:.4}", s.q75));
                ui.end_row();
                ui.label("max");
                ui.label(format!("{}", s.max));
                ui.end_row();
            });
        }
        Some(Ok(ColumnSummary::Categorical(vc))) => {
            egui::Grid::new("value_counts").striped(true).show(ui, |ui: &mut Ui| {
                ui.strong("value");
                ui.strong("count");
                ui.end_row();
                for (value, count) in &vc.rows {
                    ui.label(value);
                    ui.label(count.to_string());
                    ui.end_row();
                }
            });
            if vc.truncated > 0 {
                ui.weak(format!("+{} more", vc.truncated));
            }
        }
        Some(Err(err)) => {
            ui.label(RichText::new(err.to_string()).color(Color32::ORANGE));
        }
        None => {}
    }
}

// ---------------------------------------------------------------------------
// Filtered-data preview
// ---------------------------------------------------------------------------

/// Render the first rows of the filtered view in a table.
pub fn preview_panel(ui: &mut Ui, state: &AppState) {
    let Some(dataset) = &state.dataset else {
        return;
    };

    egui::CollapsingHeader::new("Preview data")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            if state.visible_indices.is_empty() {
                ui.label(
                    RichText::new(ExploreError::EmptyResult.to_string())
                        .color(Color32::ORANGE),
                );
                return;
            }

            let preview: Vec<usize> = state
                .visible_indices
                .iter()
                .copied()
                .take(PREVIEW_ROWS)
                .collect();

            TableBuilder::new(ui)
                .striped(true)
                .columns(TableColumn::auto().resizable(true), dataset.columns.len())
                .header(20.0, |mut header| {
                    for col in &dataset.columns {
                        header.col(|ui: &mut Ui| {
                            ui.strong(&col.name);
                        });
                    }
                })
                .body(|mut body| {
                    for &row in &preview {
                        body.row(18.0, |mut table_row| {
                            for col in &dataset.columns {
                                table_row.col(|ui: &mut Ui| {
                                    ui.label(col.values[row].to_string());
                                });
                            }
                        });
                    }
                });

            if state.visible_indices.len() > PREVIEW_ROWS {
                ui.weak(format!(
                    "+{} more rows",
                    state.visible_indices.len() - PREVIEW_ROWS
                ));
            }
        });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open CSV dataset")
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        match crate::data::loader::load_file(&path) {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} rows with columns {:?}",
                    dataset.len(),
                    dataset.column_names()
                );
                state.set_dataset(dataset, Some(path));
            }
            Err(e) => {
                log::error!("Failed to load file: {e}");
                state.status_message = Some(e.to_string());
            }
        }
    }
}

fn export_csv_dialog(state: &mut AppState) {
    let Some(dataset) = &state.dataset else {
        state.status_message = Some("Nothing to export: no dataset loaded".into());
        return;
    };

    let bytes = match export::filtered_csv(dataset, &state.visible_indices) {
        Ok(bytes) => bytes,
        Err(e) => {
            state.status_message = Some(e.to_string());
            return;
        }
    };

    let file = rfd::FileDialog::new()
        .set_title("Save filtered data")
        .set_file_name("filtered_data.csv")
        .save_file();
    if let Some(path) = file {
        match std::fs::write(&path, bytes) {
            Ok(()) => {
                log::info!("Exported filtered data to {}", path.display());
                state.status_message = None;
            }
            Err(e) => {
                log::error!("CSV export failed: {e}");
                state.status_message = Some(format!("Export failed: {e}"));
            }
        }
    }
}

fn export_chart_dialog(state: &mut AppState) {
    let (Some(Ok(data)), Some(spec)) = (&state.chart, state.chart_spec()) else {
        state.status_message = Some("Nothing to export: build a chart first".into());
        return;
    };

    let html = export::chart_html(data, &spec);
    let file = rfd::FileDialog::new()
        .set_title("Save chart")
        .set_file_name("chart.html")
        .save_file();
    if let Some(path) = file {
        match std::fs::write(&path, html) {
            Ok(()) => {
                log::info!("Exported {:?} chart to {}", data.kind(), path.display());
                state.status_message = None;
            }
            Err(e) => {
                log::error!("Chart export failed: {e}");
                state.status_message = Some(format!("Export failed: {e}"));
            }
        }
    }
}
