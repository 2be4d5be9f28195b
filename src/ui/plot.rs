use eframe::egui::{Color32, RichText, Ui};
use egui_plot::{Bar, BarChart, Legend, Plot, PlotPoint, PlotPoints, Points, Polygon, Text};

use crate::chart::build::ChartData;
use crate::chart::spec::ChartSpec;
use crate::color::{generate_palette, heat_color};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Chart area (central panel)
// ---------------------------------------------------------------------------

/// Render the chart built from the current selections, or the matching
/// guidance message.
pub fn chart_area(ui: &mut Ui, state: &AppState) {
    if state.dataset.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a CSV file to start exploring  (File → Open…)");
        });
        return;
    }

    let Some(spec) = state.chart_spec() else {
        ui.label("Select both X and Y columns to generate a chart.");
        return;
    };

    match &state.chart {
        Some(Ok(data)) => render_chart(ui, data, &spec),
        Some(Err(err)) => {
            ui.label(RichText::new(err.to_string()).color(Color32::ORANGE));
        }
        None => {
            ui.label("Select both X and Y columns to generate a chart.");
        }
    }
}

fn render_chart(ui: &mut Ui, data: &ChartData, spec: &ChartSpec) {
    match data {
        ChartData::Scatter { series } => scatter_plot(ui, series, spec),
        ChartData::Bar { bars } => bar_plot(ui, bars, spec),
        ChartData::Heatmap {
            x_labels,
            y_labels,
            counts,
            max_count,
        } => heatmap_plot(ui, x_labels, y_labels, counts, *max_count, spec),
    }
}

fn scatter_plot(ui: &mut Ui, series: &[crate::chart::build::ScatterSeries], spec: &ChartSpec) {
    let palette = generate_palette(series.len());

    Plot::new("chart_scatter")
        .legend(Legend::default())
        .x_axis_label(spec.x_label().to_string())
        .y_axis_label(spec.y_label().to_string())
        .height(spec.height)
        .show(ui, |plot_ui| {
            for (s, color) in series.iter().zip(&palette) {
                let points: PlotPoints = s.points.iter().copied().collect();
                let mut dots = Points::new(points).radius(2.5).color(*color);
                if let Some(label) = &s.label {
                    dots = dots.name(label);
                }
                plot_ui.points(dots);
            }
        });
}

fn bar_plot(ui: &mut Ui, bars: &[(String, f64)], spec: &ChartSpec) {
    let labels: Vec<String> = bars.iter().map(|(l, _)| l.clone()).collect();
    let palette = generate_palette(bars.len());

    let chart_bars: Vec<Bar> = bars
        .iter()
        .zip(&palette)
        .enumerate()
        .map(|(i, ((label, value), color))| {
            Bar::new(i as f64, *value)
                .width(0.6)
                .name(label)
                .fill(*color)
        })
        .collect();

    Plot::new("chart_bar")
        .x_axis_label(spec.x_label().to_string())
        .y_axis_label(spec.y_label().to_string())
        .height(spec.height)
        .x_axis_formatter(move |mark, _range| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
                return String::new();
            }
            labels.get(idx as usize).cloned().unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(chart_bars));
        });
}

fn heatmap_plot(
    ui: &mut Ui,
    x_labels: &[String],
    y_labels: &[String],
    counts: &[Vec<f64>],
    max_count: f64,
    spec: &ChartSpec,
) {
    let x_names = x_labels.to_vec();
    let y_names = y_labels.to_vec();

    Plot::new("chart_heatmap")
        .x_axis_label(spec.x_label().to_string())
        .y_axis_label(spec.y_label().to_string())
        .height(spec.height)
        .x_axis_formatter(move |mark, _range| {
            let idx = mark.value - 0.5;
            if (idx - idx.round()).abs() > 1e-6 || idx < -0.5 {
                return String::new();
            }
            x_names.get(idx.round() as usize).cloned().unwrap_or_default()
        })
        .y_axis_formatter(move |mark, _range| {
            let idx = mark.value - 0.5;
            if (idx - idx.round()).abs() > 1e-6 || idx < -0.5 {
                return String::new();
            }
            y_names.get(idx.round() as usize).cloned().unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            for (yi, row) in counts.iter().enumerate() {
                for (xi, &count) in row.iter().enumerate() {
                    let (x0, y0) = (xi as f64, yi as f64);
                    let cell: PlotPoints = vec![
                        [x0, y0],
                        [x0 + 1.0, y0],
                        [x0 + 1.0, y0 + 1.0],
                        [x0, y0 + 1.0],
                    ]
                    .into();
                    plot_ui.polygon(
                        Polygon::new(cell).fill_color(heat_color(count, max_count)),
                    );
                    plot_ui.text(Text::new(
                        PlotPoint::new(x0 + 0.5, y0 + 0.5),
                        RichText::new(format!("{count}")).color(Color32::DARK_GRAY),
                    ));
                }
            }
        });
}
