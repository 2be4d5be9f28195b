use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
/// Series/bar order is deterministic, so index-based assignment keeps the
/// on-screen chart and the HTML export in agreement.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            to_color32(rgb)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Heatmap gradient
// ---------------------------------------------------------------------------

/// Map a co-occurrence count onto a white→red gradient.
pub fn heat_color(count: f64, max_count: f64) -> Color32 {
    let t = if max_count > 0.0 {
        (count / max_count).clamp(0.0, 1.0) as f32
    } else {
        0.0
    };
    let low: LinSrgb = Srgb::new(1.0f32, 1.0, 1.0).into_linear();
    let high: LinSrgb = Srgb::new(0.85f32, 0.15, 0.10).into_linear();
    let rgb: Srgb = Srgb::from_linear(low.mix(high, t));
    to_color32(rgb)
}

/// Rounded, not truncated: the linear→sRGB round-trip lands a hair under
/// the exact channel value.
fn to_color32(rgb: Srgb) -> Color32 {
    let rgb: Srgb<u8> = rgb.into_format();
    Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_requested_length_and_distinct_colors() {
        let p = generate_palette(6);
        assert_eq!(p.len(), 6);
        for i in 0..p.len() {
            for j in i + 1..p.len() {
                assert_ne!(p[i], p[j]);
            }
        }
    }

    #[test]
    fn heat_color_endpoints() {
        assert_eq!(heat_color(0.0, 4.0), Color32::from_rgb(255, 255, 255));
        let hot = heat_color(4.0, 4.0);
        assert!(hot.r() > hot.g() && hot.r() > hot.b());
    }
}
