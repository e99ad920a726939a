use std::path::Path;

use serde::{Deserialize, Serialize};

const CLASSIC_BACKGROUND: &str = "#ffffff";
const CLASSIC_GRID: &str = "#000000";
const CLASSIC_TEXT: &str = "#000000";
const CLASSIC_SERIES: [&str; 4] = ["#0000ff", "#ff0000", "#ff00ff", "#000000"];

const BUILTIN_THEMES: &[(&str, &str)] = &[
    ("classic", include_str!("../themes/classic.toml")),
    ("dracula", include_str!("../themes/dracula.toml")),
    ("nord", include_str!("../themes/nord.toml")),
    ("solarized_light", include_str!("../themes/solarized_light.toml")),
];

const FONT_FAMILY: &str = "serif";
const FONT_SIZE: f32 = 14.0;
const POINT_DIAMETER: f32 = 6.0;
const GRAPH_MARGIN: f32 = 20.0;
const BASE_WIDTH: f32 = 800.0;
const BASE_HEIGHT: f32 = 600.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    #[serde(default = "default_background")]
    pub background_color: String,
    #[serde(default = "default_grid")]
    pub grid_color: String,
    #[serde(default = "default_text")]
    pub text_color: String,
    /// One color per visual index; series five and up reuse the cycle.
    #[serde(default = "default_series")]
    pub series_colors: [String; 4],

    #[serde(default = "default_font_family")]
    pub font_family: String,
    /// Bold label size at the base canvas size; plain labels use 80% of it.
    #[serde(default = "default_font_size")]
    pub font_size: f32,
    #[serde(default = "default_point_diameter")]
    pub point_diameter: f32,
    #[serde(default = "default_graph_margin")]
    pub graph_margin: f32,

    /// Canvas size at which `font_size` applies unscaled.
    #[serde(default = "default_base_width")]
    pub base_width: f32,
    #[serde(default = "default_base_height")]
    pub base_height: f32,
}

fn default_background() -> String {
    CLASSIC_BACKGROUND.to_string()
}
fn default_grid() -> String {
    CLASSIC_GRID.to_string()
}
fn default_text() -> String {
    CLASSIC_TEXT.to_string()
}
fn default_series() -> [String; 4] {
    CLASSIC_SERIES.map(str::to_string)
}
fn default_font_family() -> String {
    FONT_FAMILY.to_string()
}
fn default_font_size() -> f32 {
    FONT_SIZE
}
fn default_point_diameter() -> f32 {
    POINT_DIAMETER
}
fn default_graph_margin() -> f32 {
    GRAPH_MARGIN
}
fn default_base_width() -> f32 {
    BASE_WIDTH
}
fn default_base_height() -> f32 {
    BASE_HEIGHT
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}

#[derive(Debug, Deserialize)]
struct AlacrittyColors {
    primary: AlacrittyPrimary,
    normal: AlacrittyNormal,
}

#[derive(Debug, Deserialize)]
struct AlacrittyPrimary {
    background: String,
    foreground: String,
}

#[derive(Debug, Deserialize)]
struct AlacrittyNormal {
    blue: String,
    red: String,
    magenta: String,
    white: String,
}

#[derive(Debug, Deserialize)]
struct AlacrittyTheme {
    colors: AlacrittyColors,
}

impl Theme {
    /// Blue, red, magenta and black on white.
    pub fn classic() -> Self {
        Theme {
            background_color: default_background(),
            grid_color: default_grid(),
            text_color: default_text(),
            series_colors: default_series(),
            font_family: default_font_family(),
            font_size: FONT_SIZE,
            point_diameter: POINT_DIAMETER,
            graph_margin: GRAPH_MARGIN,
            base_width: BASE_WIDTH,
            base_height: BASE_HEIGHT,
        }
    }

    pub fn from_builtin(name: &str) -> Result<Self, String> {
        let normalized = name.trim().to_ascii_lowercase().replace('-', "_");
        let content = BUILTIN_THEMES
            .iter()
            .find(|(n, _)| *n == normalized)
            .map(|(_, c)| *c)
            .ok_or_else(|| {
                format!(
                    "Unknown built-in theme '{}'. Available: {}",
                    name,
                    Self::list_builtins().join(", ")
                )
            })?;
        Self::from_toml(content)
    }

    /// Treat `theme` as a file path when such a file exists, otherwise as a
    /// built-in name.
    pub fn resolve(theme: &str) -> Result<Self, String> {
        let path = Path::new(theme);
        if path.is_file() {
            let content = std::fs::read_to_string(path)
                .map_err(|e| format!("Failed to read theme file: {}", e))?;
            Self::from_file_content(&content)
        } else {
            Self::from_builtin(theme)
        }
    }

    pub fn list_builtins() -> Vec<&'static str> {
        BUILTIN_THEMES.iter().map(|(n, _)| *n).collect()
    }

    pub fn from_toml(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| format!("Failed to parse theme TOML: {}", e))
    }

    pub fn from_yaml(content: &str) -> Result<Self, String> {
        serde_yaml::from_str(content).map_err(|e| format!("Failed to parse theme YAML: {}", e))
    }

    pub fn from_alacritty_yaml(content: &str) -> Result<Self, String> {
        let alacritty: AlacrittyTheme = serde_yaml::from_str(content)
            .map_err(|e| format!("Failed to parse Alacritty YAML: {}", e))?;

        Ok(Self::from_alacritty_theme(alacritty))
    }

    pub fn from_alacritty_toml(content: &str) -> Result<Self, String> {
        let alacritty: AlacrittyTheme = toml::from_str(content)
            .map_err(|e| format!("Failed to parse Alacritty TOML: {}", e))?;

        Ok(Self::from_alacritty_theme(alacritty))
    }

    /// Load a theme file in any supported format. Alacritty color schemes are
    /// tried first, since a native theme with every field defaulted would
    /// accept them too.
    pub fn from_file_content(content: &str) -> Result<Self, String> {
        if let Ok(theme) = Self::from_alacritty_toml(content) {
            return Ok(theme);
        }
        if let Ok(theme) = Self::from_alacritty_yaml(content) {
            return Ok(theme);
        }
        if let Ok(theme) = Self::from_toml(content) {
            return Ok(theme);
        }
        Self::from_yaml(content)
            .map_err(|_| "Failed to parse theme file as TOML or YAML".to_string())
    }

    fn from_alacritty_theme(alacritty: AlacrittyTheme) -> Self {
        let colors = alacritty.colors;

        Theme {
            background_color: colors.primary.background,
            grid_color: colors.normal.white,
            text_color: colors.primary.foreground.clone(),
            series_colors: [
                colors.normal.blue,
                colors.normal.red,
                colors.normal.magenta,
                colors.primary.foreground,
            ],
            ..Self::classic()
        }
    }
}
