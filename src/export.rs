//! Conversion of rendered SVG charts into other file formats.

use std::path::Path;

use resvg::usvg;
use tiny_skia::{Pixmap, Transform};

use crate::chart::ChartLayout;
use crate::chart::Primitive;

/// Output formats selectable by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
    Pdf,
    Json,
}

impl OutputFormat {
    pub fn from_path(path: &Path) -> Result<Self, String> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or("Output file has no extension")?
            .to_ascii_lowercase();

        match ext.as_str() {
            "svg" => Ok(Self::Svg),
            "png" => Ok(Self::Png),
            "pdf" => Ok(Self::Pdf),
            "json" => Ok(Self::Json),
            _ => Err(format!(
                "Unsupported output format: .{} (use .svg, .png, .pdf or .json)",
                ext
            )),
        }
    }
}

/// Serialize the primitive list of a layout, in draw order.
pub fn layout_to_json(layout: &ChartLayout) -> Result<String, String> {
    let primitives: Vec<&Primitive> = layout.primitives().collect();
    serde_json::to_string_pretty(&primitives)
        .map_err(|e| format!("Failed to serialize primitives: {}", e))
}

pub fn svg_to_png(svg: &str, scale: f32) -> Result<Vec<u8>, String> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(format!("Invalid --png-scale value: {}", scale));
    }

    let mut opts = usvg::Options::default();
    {
        let fontdb = opts.fontdb_mut();
        fontdb.load_system_fonts();

        let local_fonts = Path::new("fonts");
        if local_fonts.is_dir() {
            fontdb.load_fonts_dir(local_fonts);
        }

        configure_font_fallbacks(fontdb);
    }

    let tree =
        usvg::Tree::from_str(svg, &opts).map_err(|e| format!("Failed to parse SVG: {}", e))?;

    let width = (tree.size().width() * scale).ceil().max(1.0) as u32;
    let height = (tree.size().height() * scale).ceil().max(1.0) as u32;

    let mut pixmap = Pixmap::new(width, height).ok_or("Failed to create pixmap")?;
    resvg::render(&tree, Transform::from_scale(scale, scale), &mut pixmap.as_mut());

    pixmap
        .encode_png()
        .map_err(|e| format!("Failed to encode PNG: {}", e))
}

pub fn svg_to_pdf(svg: &str) -> Result<Vec<u8>, String> {
    use svg2pdf::usvg::fontdb;

    let mut fontdb = fontdb::Database::new();
    fontdb.load_system_fonts();

    let local_fonts = Path::new("fonts");
    if local_fonts.is_dir() {
        fontdb.load_fonts_dir(local_fonts);
    }

    configure_font_fallbacks_svg2pdf(&mut fontdb);

    let opts = svg2pdf::usvg::Options {
        fontdb: std::sync::Arc::new(fontdb),
        ..Default::default()
    };

    let tree = svg2pdf::usvg::Tree::from_str(svg, &opts)
        .map_err(|e| format!("Failed to parse SVG: {}", e))?;

    // Labels as paths: viewers without the font still show them.
    let options = svg2pdf::ConversionOptions {
        embed_text: false,
        ..Default::default()
    };

    svg2pdf::to_pdf(&tree, options, svg2pdf::PageOptions::default())
        .map_err(|e| format!("Failed to convert SVG to PDF: {}", e))
}

/// Generic family names resolved against the fonts that are actually installed.
#[derive(Debug, Default, PartialEq)]
struct FontFallbacks {
    serif: Option<String>,
    sans_serif: Option<String>,
}

impl FontFallbacks {
    fn scan<'a>(families: impl IntoIterator<Item = &'a str>) -> Self {
        let mut sans_family: Option<&str> = None;
        let mut serif_family: Option<&str> = None;
        let mut first_family: Option<&str> = None;

        for family in families {
            if first_family.is_none() {
                first_family = Some(family);
            }

            let lower = family.to_ascii_lowercase();
            if serif_family.is_none() && lower.contains("serif") && !lower.contains("sans") {
                serif_family = Some(family);
            }
            if sans_family.is_none() && lower.contains("sans") {
                sans_family = Some(family);
            }
        }

        Self {
            serif: serif_family.or(sans_family).or(first_family).map(str::to_string),
            sans_serif: sans_family.or(first_family).map(str::to_string),
        }
    }
}

// resvg and svg2pdf pin different usvg versions, so each database type is
// configured through its own call site.
fn configure_font_fallbacks(fontdb: &mut usvg::fontdb::Database) {
    let fallbacks = FontFallbacks::scan(
        fontdb
            .faces()
            .flat_map(|face| face.families.iter().map(|(name, _)| name.as_str())),
    );
    if let Some(family) = &fallbacks.serif {
        fontdb.set_serif_family(family.as_str());
    }
    if let Some(family) = &fallbacks.sans_serif {
        fontdb.set_sans_serif_family(family.as_str());
    }
}

fn configure_font_fallbacks_svg2pdf(fontdb: &mut svg2pdf::usvg::fontdb::Database) {
    let fallbacks = FontFallbacks::scan(
        fontdb
            .faces()
            .flat_map(|face| face.families.iter().map(|(name, _)| name.as_str())),
    );
    if let Some(family) = &fallbacks.serif {
        fontdb.set_serif_family(family.as_str());
    }
    if let Some(family) = &fallbacks.sans_serif {
        fontdb.set_sans_serif_family(family.as_str());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{ChartStyle, GraphLayout};
    use crate::fonts::RatioMeasure;
    use crate::series::RankSeries;

    #[test]
    fn format_follows_extension() {
        assert_eq!(OutputFormat::from_path(Path::new("out.SVG")), Ok(OutputFormat::Svg));
        assert_eq!(OutputFormat::from_path(Path::new("a/b.png")), Ok(OutputFormat::Png));
        assert_eq!(OutputFormat::from_path(Path::new("c.pdf")), Ok(OutputFormat::Pdf));
        assert_eq!(OutputFormat::from_path(Path::new("d.json")), Ok(OutputFormat::Json));
        assert!(OutputFormat::from_path(Path::new("noext")).is_err());
        assert!(OutputFormat::from_path(Path::new("e.gif")).is_err());
    }

    #[test]
    fn png_rejects_bad_scale() {
        assert!(svg_to_png("<svg/>", 0.0).is_err());
        assert!(svg_to_png("<svg/>", f32::NAN).is_err());
    }

    #[test]
    fn json_lists_primitives_in_draw_order() {
        let style = ChartStyle::default();
        let mut measure = RatioMeasure::default();
        let eric: RankSeries = "eric 1 2 3 0 0 0 0 0 0 0".parse().unwrap();
        let layout = GraphLayout::new(&mut measure, &style).layout(500.0, 300.0, &[eric]);

        let json = layout_to_json(&layout).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let items = value.as_array().unwrap();

        assert_eq!(items.len(), layout.primitive_count());
        assert_eq!(items[0]["kind"], "line");
        assert_eq!(items.last().unwrap()["kind"], "text");
        assert_eq!(items.last().unwrap()["text"], "eric*");
    }

    #[test]
    fn fallbacks_prefer_matching_families() {
        let found = FontFallbacks::scan(["Noto Sans", "DejaVu Serif", "Noto Sans Mono"]);
        assert_eq!(found.serif.as_deref(), Some("DejaVu Serif"));
        assert_eq!(found.sans_serif.as_deref(), Some("Noto Sans"));

        let only_sans = FontFallbacks::scan(["Liberation Sans"]);
        assert_eq!(only_sans.serif.as_deref(), Some("Liberation Sans"));

        assert_eq!(FontFallbacks::scan([]), FontFallbacks::default());
    }
}
