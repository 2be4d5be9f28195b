use std::fmt::Write as _;

use anyhow::Context;
use eframe::egui::Color32;

use crate::chart::build::{ChartData, ChartKind};
use crate::chart::spec::ChartSpec;
use crate::color::{generate_palette, heat_color};
use crate::data::model::Dataset;
use crate::error::ExploreError;

// ---------------------------------------------------------------------------
// Filtered-data CSV export
// ---------------------------------------------------------------------------

/// Serialize the filtered view as CSV bytes: header row plus one record per
/// surviving row, with the `csv` crate's standard quoting. An empty view
/// produces a header-only file.
pub fn filtered_csv(dataset: &Dataset, view: &[usize]) -> Result<Vec<u8>, ExploreError> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record(dataset.columns.iter().map(|c| c.name.as_str()))
        .context("writing CSV header")
        .map_err(ExploreError::load)?;

    for &row in view {
        let record: Vec<String> = dataset
            .columns
            .iter()
            .map(|c| c.values[row].as_csv_field())
            .collect();
        writer
            .write_record(&record)
            .with_context(|| format!("writing CSV row {row}"))
            .map_err(ExploreError::load)?;
    }

    writer
        .into_inner()
        .context("flushing CSV output")
        .map_err(ExploreError::load)
}

// ---------------------------------------------------------------------------
// Chart HTML export
// ---------------------------------------------------------------------------

const SVG_WIDTH: f64 = 800.0;
const MARGIN_LEFT: f64 = 70.0;
const MARGIN_RIGHT: f64 = 30.0;
const MARGIN_TOP: f64 = 30.0;
const MARGIN_BOTTOM: f64 = 60.0;

/// Render the chart as a self-contained HTML document: an inline SVG plus
/// the underlying data embedded as JSON. No scripts, stylesheets or other
/// external references, so the file opens offline.
pub fn chart_html(data: &ChartData, spec: &ChartSpec) -> String {
    let height = spec.height.max(200.0) as f64;
    let svg = render_svg(data, spec, height);
    let json = chart_json(data, spec);
    let title = escape_text(&format!("{} vs {}", spec.y_label(), spec.x_label()));

    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    let _ = writeln!(html, "<title>{title}</title>");
    html.push_str(
        "<style>body{font-family:sans-serif;margin:2em;}h1{font-size:1.2em;}</style>\n",
    );
    html.push_str("</head>\n<body>\n");
    let _ = writeln!(html, "<h1>{title}</h1>");
    html.push_str(&svg);
    let _ = writeln!(
        html,
        "<script type=\"application/json\" id=\"chart-data\">\n{json}\n</script>"
    );
    html.push_str("</body>\n</html>\n");
    html
}

fn chart_json(data: &ChartData, spec: &ChartSpec) -> String {
    let kind = match data.kind() {
        ChartKind::Scatter => "scatter",
        ChartKind::Bar => "bar",
        ChartKind::Heatmap => "heatmap",
    };
    let payload = serde_json::json!({
        "kind": kind,
        "x": spec.x,
        "y": spec.y,
        "aggregation": spec.aggregation.label(),
        "data": data,
    });
    serde_json::to_string_pretty(&payload).unwrap_or_else(|_| "{}".to_string())
}

fn render_svg(data: &ChartData, spec: &ChartSpec, height: f64) -> String {
    let mut svg = String::new();
    let _ = writeln!(
        svg,
        "<svg xmlns='http://www.w3.org/2000/svg' width='{SVG_WIDTH:.0}' height='{height:.0}' \
         viewBox='0 0 {SVG_WIDTH:.0} {height:.0}' role='img'>"
    );
    let _ = writeln!(
        svg,
        "  <rect x='0' y='0' width='{SVG_WIDTH:.0}' height='{height:.0}' fill='white'/>"
    );

    let plot_w = SVG_WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_h = height - MARGIN_TOP - MARGIN_BOTTOM;

    match data {
        ChartData::Scatter { series } => scatter_svg(&mut svg, series, plot_w, plot_h),
        ChartData::Bar { bars } => bar_svg(&mut svg, bars, plot_w, plot_h),
        ChartData::Heatmap {
            x_labels,
            y_labels,
            counts,
            max_count,
        } => heatmap_svg(&mut svg, x_labels, y_labels, counts, *max_count, plot_w, plot_h),
    }

    axis_labels_svg(&mut svg, spec, height);
    svg.push_str("</svg>\n");
    svg
}

fn axis_labels_svg(svg: &mut String, spec: &ChartSpec, height: f64) {
    let x_mid = MARGIN_LEFT + (SVG_WIDTH - MARGIN_LEFT - MARGIN_RIGHT) / 2.0;
    let y_mid = MARGIN_TOP + (height - MARGIN_TOP - MARGIN_BOTTOM) / 2.0;
    let _ = writeln!(
        svg,
        "  <text x='{x_mid:.0}' y='{:.0}' text-anchor='middle' font-size='13'>{}</text>",
        height - 12.0,
        escape_text(spec.x_label()),
    );
    let _ = writeln!(
        svg,
        "  <text x='16' y='{y_mid:.0}' text-anchor='middle' font-size='13' \
         transform='rotate(-90 16 {y_mid:.0})'>{}</text>",
        escape_text(spec.y_label()),
    );
}

fn frame_svg(svg: &mut String, plot_w: f64, plot_h: f64) {
    let _ = writeln!(
        svg,
        "  <rect x='{MARGIN_LEFT:.0}' y='{MARGIN_TOP:.0}' width='{plot_w:.0}' height='{plot_h:.0}' \
         fill='none' stroke='#888'/>"
    );
}

fn scatter_svg(svg: &mut String, series: &[crate::chart::build::ScatterSeries], plot_w: f64, plot_h: f64) {
    frame_svg(svg, plot_w, plot_h);

    let all: Vec<[f64; 2]> = series.iter().flat_map(|s| s.points.iter().copied()).collect();
    let (x_min, x_max) = spread(all.iter().map(|p| p[0]));
    let (y_min, y_max) = spread(all.iter().map(|p| p[1]));

    let palette = generate_palette(series.len());
    for (s, color) in series.iter().zip(&palette) {
        let fill = hex(*color);
        for p in &s.points {
            let cx = MARGIN_LEFT + (p[0] - x_min) / (x_max - x_min) * plot_w;
            let cy = MARGIN_TOP + plot_h - (p[1] - y_min) / (y_max - y_min) * plot_h;
            let _ = writeln!(svg, "  <circle cx='{cx:.1}' cy='{cy:.1}' r='3' fill='{fill}'/>");
        }
    }

    tick_labels(svg, x_min, x_max, y_min, y_max, plot_w, plot_h);
}

fn bar_svg(svg: &mut String, bars: &[(String, f64)], plot_w: f64, plot_h: f64) {
    frame_svg(svg, plot_w, plot_h);

    // Bars grow away from a zero baseline, so negative aggregates hang
    // below it instead of collapsing to zero height.
    let lo = bars.iter().map(|b| b.1).fold(0.0f64, f64::min);
    let hi = bars.iter().map(|b| b.1).fold(0.0f64, f64::max);
    let span = (hi - lo).max(f64::EPSILON);
    let y_of = |v: f64| MARGIN_TOP + plot_h - (v - lo) / span * plot_h;

    let slot = plot_w / bars.len() as f64;
    let bar_w = slot * 0.8;

    let palette = generate_palette(bars.len());
    for (i, ((label, value), color)) in bars.iter().zip(&palette).enumerate() {
        let x = MARGIN_LEFT + i as f64 * slot + slot * 0.1;
        let y = y_of(*value).min(y_of(0.0));
        let h = (y_of(*value) - y_of(0.0)).abs();
        let _ = writeln!(
            svg,
            "  <rect x='{x:.1}' y='{y:.1}' width='{bar_w:.1}' height='{h:.1}' fill='{}'/>",
            hex(*color),
        );
        let _ = writeln!(
            svg,
            "  <text x='{:.1}' y='{:.0}' text-anchor='middle' font-size='11'>{}</text>",
            x + bar_w / 2.0,
            MARGIN_TOP + plot_h + 16.0,
            escape_text(label),
        );
    }

    let _ = writeln!(
        svg,
        "  <text x='{:.0}' y='{:.0}' text-anchor='end' font-size='11'>{hi}</text>",
        MARGIN_LEFT - 6.0,
        MARGIN_TOP + 10.0,
    );
    let _ = writeln!(
        svg,
        "  <text x='{:.0}' y='{:.0}' text-anchor='end' font-size='11'>{lo}</text>",
        MARGIN_LEFT - 6.0,
        MARGIN_TOP + plot_h,
    );
}

fn heatmap_svg(
    svg: &mut String,
    x_labels: &[String],
    y_labels: &[String],
    counts: &[Vec<f64>],
    max_count: f64,
    plot_w: f64,
    plot_h: f64,
) {
    let cell_w = plot_w / x_labels.len() as f64;
    let cell_h = plot_h / y_labels.len() as f64;

    for (yi, row) in counts.iter().enumerate() {
        for (xi, &count) in row.iter().enumerate() {
            let fill = hex(heat_color(count, max_count));
            let x = MARGIN_LEFT + xi as f64 * cell_w;
            let y = MARGIN_TOP + yi as f64 * cell_h;
            let _ = writeln!(
                svg,
                "  <rect x='{x:.1}' y='{y:.1}' width='{cell_w:.1}' height='{cell_h:.1}' \
                 fill='{fill}' stroke='#ddd'/>"
            );
            let _ = writeln!(
                svg,
                "  <text x='{:.1}' y='{:.1}' text-anchor='middle' font-size='11'>{count}</text>",
                x + cell_w / 2.0,
                y + cell_h / 2.0 + 4.0,
            );
        }
    }

    for (xi, label) in x_labels.iter().enumerate() {
        let _ = writeln!(
            svg,
            "  <text x='{:.1}' y='{:.0}' text-anchor='middle' font-size='11'>{}</text>",
            MARGIN_LEFT + (xi as f64 + 0.5) * cell_w,
            MARGIN_TOP + plot_h + 16.0,
            escape_text(label),
        );
    }
    for (yi, label) in y_labels.iter().enumerate() {
        let _ = writeln!(
            svg,
            "  <text x='{:.0}' y='{:.1}' text-anchor='end' font-size='11'>{}</text>",
            MARGIN_LEFT - 6.0,
            MARGIN_TOP + (yi as f64 + 0.5) * cell_h + 4.0,
            escape_text(label),
        );
    }
}

fn tick_labels(svg: &mut String, x_min: f64, x_max: f64, y_min: f64, y_max: f64, plot_w: f64, plot_h: f64) {
    let bottom = MARGIN_TOP + plot_h;
    let _ = writeln!(
        svg,
        "  <text x='{MARGIN_LEFT:.0}' y='{:.0}' font-size='11'>{x_min}</text>",
        bottom + 16.0
    );
    let _ = writeln!(
        svg,
        "  <text x='{:.0}' y='{:.0}' text-anchor='end' font-size='11'>{x_max}</text>",
        MARGIN_LEFT + plot_w,
        bottom + 16.0
    );
    let _ = writeln!(
        svg,
        "  <text x='{:.0}' y='{bottom:.0}' text-anchor='end' font-size='11'>{y_min}</text>",
        MARGIN_LEFT - 6.0
    );
    let _ = writeln!(
        svg,
        "  <text x='{:.0}' y='{:.0}' text-anchor='end' font-size='11'>{y_max}</text>",
        MARGIN_LEFT - 6.0,
        MARGIN_TOP + 10.0
    );
}

/// Range of an iterator of values, padded when degenerate so the
/// pixel mapping never divides by zero.
fn spread(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (mut lo, mut hi) = (f64::INFINITY, f64::NEG_INFINITY);
    for v in values {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    if (hi - lo).abs() < f64::EPSILON {
        (lo - 0.5, hi + 0.5)
    } else {
        (lo, hi)
    }
}

fn hex(c: Color32) -> String {
    format!("#{:02x}{:02x}{:02x}", c.r(), c.g(), c.b())
}

fn escape_text(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::build::build_chart;
    use crate::chart::spec::{Aggregation, RelationshipMode};
    use crate::data::classify::{classify, ClassifierConfig};
    use crate::data::loader::load_bytes;

    #[test]
    fn csv_export_round_trips_content() {
        let input = b"category,value\nA,1\nA,2\nB,3\n";
        let ds = load_bytes(input).unwrap();
        let view: Vec<usize> = (0..ds.len()).collect();
        let out = filtered_csv(&ds, &view).unwrap();
        assert_eq!(out, input);
    }

    #[test]
    fn fields_containing_the_delimiter_are_quoted() {
        let ds = load_bytes(b"note,v\n\"a,b\",1\n").unwrap();
        let out = filtered_csv(&ds, &[0]).unwrap();
        let text = String::from_utf8(out.clone()).unwrap();
        assert!(text.contains("\"a,b\""), "{text}");
        let reloaded = load_bytes(&out).unwrap();
        assert_eq!(
            reloaded.column("note").unwrap().values,
            ds.column("note").unwrap().values
        );
    }

    #[test]
    fn empty_view_exports_header_only() {
        let ds = load_bytes(b"a,b\n1,2\n").unwrap();
        let out = filtered_csv(&ds, &[]).unwrap();
        assert_eq!(out, b"a,b\n");
    }

    #[test]
    fn chart_html_is_self_contained() {
        let ds = load_bytes(b"category,value\nA,1\nA,2\nB,3\n").unwrap();
        let roles = classify(&ds, ClassifierConfig::default());
        let view: Vec<usize> = (0..ds.len()).collect();
        let mut spec = ChartSpec::new("category", "value", RelationshipMode::OneToMany);
        spec.aggregation = Aggregation::Sum;
        let data = build_chart(&ds, &view, &roles, &spec).unwrap();

        let html = chart_html(&data, &spec);
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<svg"));
        assert!(html.contains("chart-data"));
        assert!(html.contains("\"kind\": \"bar\""));
        // No external fetches: the only URL is the SVG namespace.
        assert!(!html.replace("http://www.w3.org/2000/svg", "").contains("http"));
    }

    #[test]
    fn negative_bars_hang_below_the_zero_baseline() {
        let data = ChartData::Bar {
            bars: vec![("A".to_string(), -2.0), ("B".to_string(), 4.0)],
        };
        let spec = ChartSpec::new("category", "value", RelationshipMode::OneToMany);

        // Plot area is 410px tall at the default 500px chart height. The
        // value range is -2..4, so A spans a third of it and B two thirds.
        let html = chart_html(&data, &spec);
        assert!(html.contains("y='303.3' width='280.0' height='136.7'"), "{html}");
        assert!(html.contains("y='30.0' width='280.0' height='273.3'"), "{html}");
    }

    #[test]
    fn html_escapes_markup_in_labels() {
        let ds = load_bytes(b"a<b,v\nx,1\ny,2\n").unwrap();
        let roles = classify(&ds, ClassifierConfig::default());
        let spec = ChartSpec::new("a<b", "v", RelationshipMode::OneToMany);
        let data = build_chart(&ds, &[0, 1], &roles, &spec).unwrap();
        let html = chart_html(&data, &spec);
        assert!(html.contains("a&lt;b"));
        assert!(!html.contains("<title>a<b"));
    }
}
