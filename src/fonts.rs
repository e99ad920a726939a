use std::collections::HashMap;

use cosmic_text::{Attrs, Buffer, Family, FontSystem, Metrics, Shaping, Weight};
use serde::Serialize;

/// Text weight used by chart labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    Bold,
    Plain,
}

/// Vertical extent of a line of text, measured from its baseline.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextMetrics {
    pub width: f32,
    pub ascent: f32,
    pub descent: f32,
}

pub trait TextMeasure {
    fn measure_text(&mut self, text: &str, font_size: f32, weight: FontWeight) -> TextMetrics;
}

/// Font-free metrics scaled from the font size. Used where no font system is
/// available and in tests, where results must not depend on installed fonts.
#[derive(Debug, Clone, Copy)]
pub struct RatioMeasure {
    pub ascent_ratio: f32,
    pub descent_ratio: f32,
    pub advance_ratio: f32,
}

impl Default for RatioMeasure {
    fn default() -> Self {
        Self {
            ascent_ratio: 0.8,
            descent_ratio: 0.2,
            advance_ratio: 0.55,
        }
    }
}

impl RatioMeasure {
    fn metrics(&self, text: &str, font_size: f32) -> TextMetrics {
        TextMetrics {
            width: text.chars().count() as f32 * font_size * self.advance_ratio,
            ascent: font_size * self.ascent_ratio,
            descent: font_size * self.descent_ratio,
        }
    }
}

impl TextMeasure for RatioMeasure {
    fn measure_text(&mut self, text: &str, font_size: f32, _weight: FontWeight) -> TextMetrics {
        self.metrics(text, font_size)
    }
}

#[derive(Hash, PartialEq, Eq, Clone)]
struct MeasureKey {
    text: String,
    font_size_bits: u32,
    weight: FontWeight,
}

pub struct CosmicTextMeasure {
    font_system: FontSystem,
    family: String,
    cache: HashMap<MeasureKey, TextMetrics>,
    fallback: RatioMeasure,
}

impl CosmicTextMeasure {
    pub fn new(family: &str) -> Result<Self, String> {
        Ok(Self {
            font_system: FontSystem::new(),
            family: family.to_string(),
            cache: HashMap::new(),
            fallback: RatioMeasure::default(),
        })
    }
}

fn family_for(name: &str) -> Family<'_> {
    match name.to_ascii_lowercase().as_str() {
        "serif" => Family::Serif,
        "sans-serif" | "sans" => Family::SansSerif,
        "monospace" => Family::Monospace,
        _ => Family::Name(name),
    }
}

impl TextMeasure for CosmicTextMeasure {
    fn measure_text(&mut self, text: &str, font_size: f32, weight: FontWeight) -> TextMetrics {
        // cosmic-text panics on zero-sized metrics
        if !font_size.is_finite() || font_size <= 0.0 {
            return TextMetrics::default();
        }

        let key = MeasureKey {
            text: text.to_string(),
            font_size_bits: font_size.to_bits(),
            weight,
        };

        if let Some(cached) = self.cache.get(&key) {
            return *cached;
        }

        let line_height = font_size * 1.2;
        let mut buffer = Buffer::new(
            &mut self.font_system,
            Metrics {
                font_size,
                line_height,
            },
        );
        buffer.set_size(&mut self.font_system, None, None);

        let family = family_for(&self.family);
        let attrs = Attrs::new().family(family).weight(match weight {
            FontWeight::Bold => Weight::BOLD,
            FontWeight::Plain => Weight::NORMAL,
        });
        buffer.set_text(&mut self.font_system, text, &attrs, Shaping::Advanced, None);

        let measured = buffer
            .layout_runs()
            .next()
            .map(|run| TextMetrics {
                width: run.line_w,
                ascent: run.line_y - run.line_top,
                descent: run.line_top + run.line_height - run.line_y,
            })
            .unwrap_or_else(|| {
                log::warn!("no layout run for {:?}; using ratio metrics", text);
                self.fallback.metrics(text, font_size)
            });

        self.cache.insert(key, measured);
        measured
    }
}
