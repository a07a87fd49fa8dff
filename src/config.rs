use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::palette::Palette;

const UNIT_HEIGHT: f32 = 25.0;
const RACK_WIDTH: f32 = 300.0;
const RACK_SPACING: f32 = 25.0;
const MARGIN: f32 = 25.0;
/// Height assumed for a rack without a usable `height` attribute.
pub const DEFAULT_RACK_HEIGHT: u32 = 42;

const RACK_FILL: &str = "#ffffff";
const STROKE: &str = "#333333";
const STROKE_WIDTH: f32 = 1.0;
const TEXT: &str = "#000000";
const FONT_FAMILY: &str = "sans-serif";
const FONT_SIZE: f32 = 14.0;
const HOVER_CSS: &str = "a:hover rect { fill-opacity: 0.6; stroke-width: 3; }";

/// Geometry constants for the layout engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    #[serde(default = "default_unit_height")]
    pub unit_height: f32,
    #[serde(default = "default_rack_width")]
    pub rack_width: f32,
    #[serde(default = "default_rack_spacing")]
    pub rack_spacing: f32,
    #[serde(default = "default_margin")]
    pub margin: f32,
    #[serde(default = "default_rack_height")]
    pub default_rack_height: u32,
}

fn default_unit_height() -> f32 {
    UNIT_HEIGHT
}
fn default_rack_width() -> f32 {
    RACK_WIDTH
}
fn default_rack_spacing() -> f32 {
    RACK_SPACING
}
fn default_margin() -> f32 {
    MARGIN
}
fn default_rack_height() -> u32 {
    DEFAULT_RACK_HEIGHT
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            unit_height: UNIT_HEIGHT,
            rack_width: RACK_WIDTH,
            rack_spacing: RACK_SPACING,
            margin: MARGIN,
            default_rack_height: DEFAULT_RACK_HEIGHT,
        }
    }
}

/// Presentation of the assembled document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RackStyle {
    #[serde(default = "default_rack_fill")]
    pub rack_fill: String,
    #[serde(default = "default_stroke")]
    pub stroke: String,
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f32,
    #[serde(default = "default_text")]
    pub text_color: String,
    #[serde(default = "default_font_family")]
    pub font_family: String,
    #[serde(default = "default_font_size")]
    pub font_size: f32,
    /// Full-canvas background fill; transparent when unset.
    #[serde(default)]
    pub background: Option<String>,
    #[serde(default = "default_hover_css")]
    pub hover_css: String,
}

fn default_rack_fill() -> String {
    RACK_FILL.to_string()
}
fn default_stroke() -> String {
    STROKE.to_string()
}
fn default_stroke_width() -> f32 {
    STROKE_WIDTH
}
fn default_text() -> String {
    TEXT.to_string()
}
fn default_font_family() -> String {
    FONT_FAMILY.to_string()
}
fn default_font_size() -> f32 {
    FONT_SIZE
}
fn default_hover_css() -> String {
    HOVER_CSS.to_string()
}

impl Default for RackStyle {
    fn default() -> Self {
        Self {
            rack_fill: default_rack_fill(),
            stroke: default_stroke(),
            stroke_width: STROKE_WIDTH,
            text_color: default_text(),
            font_family: default_font_family(),
            font_size: FONT_SIZE,
            background: None,
            hover_css: default_hover_css(),
        }
    }
}

/// Everything a compile call needs besides the markup itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub colors: Palette,
    #[serde(default)]
    pub style: RackStyle,
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| format!("Failed to parse config TOML: {}", e))
    }

    pub fn from_yaml(content: &str) -> Result<Self, String> {
        serde_yaml::from_str(content).map_err(|e| format!("Failed to parse config YAML: {}", e))
    }

    /// Load a config file, trying TOML first and YAML second.
    pub fn load(path: &Path) -> Result<Self, String> {
        if !path.is_file() {
            return Err(format!("Config file not found: {}", path.display()));
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        match Self::from_toml(&content) {
            Ok(config) => Ok(config),
            Err(toml_err) => Self::from_yaml(&content).map_err(|yaml_err| {
                log::debug!("config is not TOML: {}", toml_err);
                format!("Failed to parse config file as TOML or YAML: {}", yaml_err)
            }),
        }
    }
}
