use crate::theme::Theme;

/// Resolved colors and sizes used by [`super::GraphLayout`].
#[derive(Debug, Clone, PartialEq)]
pub struct ChartStyle {
    pub background: String,
    pub grid_stroke: String,
    pub axis_text: String,
    pub series_colors: [String; 4],
    pub font_family: String,
    pub font_size: f32,
    pub point_diameter: f32,
    pub graph_margin: f32,
    pub base_width: f32,
    pub base_height: f32,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self::from_theme(&Theme::classic())
    }
}

impl ChartStyle {
    pub fn from_theme(theme: &Theme) -> Self {
        // A grid that matches the background would vanish; fall back to the text color.
        let grid_stroke =
            pick_higher_contrast(&theme.background_color, &theme.grid_color, &theme.text_color);

        Self {
            background: theme.background_color.clone(),
            grid_stroke,
            axis_text: theme.text_color.clone(),
            series_colors: theme.series_colors.clone(),
            font_family: theme.font_family.clone(),
            font_size: theme.font_size,
            point_diameter: theme.point_diameter,
            graph_margin: theme.graph_margin,
            base_width: theme.base_width,
            base_height: theme.base_height,
        }
    }

    /// Text scale factor for a canvas of the given size.
    pub fn text_scale(&self, width: f32, height: f32) -> f32 {
        let base = self.base_width + self.base_height;
        if base > 0.0 {
            (width + height) / base
        } else {
            1.0
        }
    }
}

fn parse_hex_rgb(value: &str) -> Option<(f32, f32, f32)> {
    let hex = value.trim_start_matches('#');
    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()? as f32 / 255.0;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()? as f32 / 255.0;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()? as f32 / 255.0;
    Some((r, g, b))
}

fn relative_luminance(color: (f32, f32, f32)) -> f32 {
    let linear = |v: f32| {
        if v <= 0.03928 {
            v / 12.92
        } else {
            ((v + 0.055) / 1.055).powf(2.4)
        }
    };

    let (r, g, b) = color;
    0.2126 * linear(r) + 0.7152 * linear(g) + 0.0722 * linear(b)
}

fn contrast_ratio(a: &str, b: &str) -> Option<f32> {
    let l1 = relative_luminance(parse_hex_rgb(a)?);
    let l2 = relative_luminance(parse_hex_rgb(b)?);
    let (hi, lo) = if l1 >= l2 { (l1, l2) } else { (l2, l1) };
    Some((hi + 0.05) / (lo + 0.05))
}

/// Prefer `primary` unless `secondary` stands out more against `base`.
/// Unparseable colors count as zero contrast.
fn pick_higher_contrast(base: &str, primary: &str, secondary: &str) -> String {
    let p = contrast_ratio(base, primary).unwrap_or(0.0);
    let s = contrast_ratio(base, secondary).unwrap_or(0.0);

    if s > p {
        secondary.to_string()
    } else {
        primary.to_string()
    }
}
