//! PNG and PDF output for serialized SVG.

use std::path::Path;

use resvg::usvg;
use tiny_skia::{Pixmap, Transform};

/// Output format picked from a file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
    Pdf,
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
            _ => Err(format!(
                "Unsupported output format: .{} (use .svg, .png or .pdf)",
                ext
            )),
        }
    }
}

/// Relative directory searched for extra fonts.
const LOCAL_FONTS_DIR: &str = "fonts";

/// Load system and local fonts into a fontdb and map the generic families.
/// resvg and svg2pdf bundle different fontdb versions, hence a macro.
macro_rules! prepare_fontdb {
    ($db:expr) => {{
        let db = $db;
        db.load_system_fonts();

        let local_fonts = Path::new(LOCAL_FONTS_DIR);
        if local_fonts.is_dir() {
            db.load_fonts_dir(local_fonts);
        }

        let fallbacks = FontFallbacks::pick(
            db.faces()
                .flat_map(|face| face.families.iter().map(|(family, _)| family.as_str())),
        );
        log::debug!("font fallbacks: {:?}", fallbacks);

        if let Some(family) = fallbacks.sans.as_deref() {
            db.set_sans_serif_family(family);
        }
        if let Some(family) = fallbacks.serif.as_deref() {
            db.set_serif_family(family);
        }
        if let Some(family) = fallbacks.mono.as_deref() {
            db.set_monospace_family(family);
        }
    }};
}

pub fn svg_to_png(svg: &str, scale: f32) -> Result<Vec<u8>, String> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(format!("Invalid --png-scale value: {}", scale));
    }

    let mut opts = usvg::Options::default();
    prepare_fontdb!(opts.fontdb_mut());

    let tree =
        usvg::Tree::from_str(svg, &opts).map_err(|e| format!("Failed to parse SVG: {}", e))?;

    let (width, height) = raster_size(tree.size().width(), tree.size().height(), scale);
    log::debug!("rasterizing {}x{} at scale {}", width, height, scale);

    let mut pixmap = Pixmap::new(width, height)
        .ok_or_else(|| format!("Failed to create a {}x{} pixmap", width, height))?;
    resvg::render(&tree, Transform::from_scale(scale, scale), &mut pixmap.as_mut());

    pixmap
        .encode_png()
        .map_err(|e| format!("Failed to encode PNG: {}", e))
}

pub fn svg_to_pdf(svg: &str) -> Result<Vec<u8>, String> {
    let mut fontdb = svg2pdf::usvg::fontdb::Database::new();
    prepare_fontdb!(&mut fontdb);

    let opts = svg2pdf::usvg::Options {
        fontdb: std::sync::Arc::new(fontdb),
        ..Default::default()
    };
    let tree = svg2pdf::usvg::Tree::from_str(svg, &opts)
        .map_err(|e| format!("Failed to parse SVG: {}", e))?;

    // Text as paths: PDFs stay readable even when font embedding fails.
    let options = svg2pdf::ConversionOptions {
        embed_text: false,
        ..Default::default()
    };

    svg2pdf::to_pdf(&tree, options, svg2pdf::PageOptions::default())
        .map_err(|e| format!("Failed to convert SVG to PDF: {}", e))
}

/// Pixel size of the raster for a canvas at `scale`, never smaller than 1x1.
fn raster_size(width: f32, height: f32, scale: f32) -> (u32, u32) {
    let px = |v: f32| ((v * scale).ceil() as u32).max(1);
    (px(width), px(height))
}

/// Generic family names resolved against the installed fonts, chosen over
/// plain family names so both fontdb versions can share it.
#[derive(Debug, Default, PartialEq)]
struct FontFallbacks {
    sans: Option<String>,
    serif: Option<String>,
    mono: Option<String>,
}

impl FontFallbacks {
    fn pick<'a>(families: impl IntoIterator<Item = &'a str>) -> Self {
        let mut sans: Option<&str> = None;
        let mut serif: Option<&str> = None;
        let mut mono: Option<&str> = None;
        let mut first: Option<&str> = None;

        for family in families {
            first.get_or_insert(family);
            let lower = family.to_ascii_lowercase();
            if sans.is_none() && lower.contains("sans") {
                sans = Some(family);
            }
            if serif.is_none() && lower.contains("serif") && !lower.contains("sans") {
                serif = Some(family);
            }
            if mono.is_none() && (lower.contains("mono") || lower.contains("code")) {
                mono = Some(family);
            }
        }

        let sans = sans.or(first);
        Self {
            sans: sans.map(str::to_string),
            serif: serif.or(first).map(str::to_string),
            mono: mono.or(sans).map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_follows_extension() {
        assert_eq!(OutputFormat::from_path(Path::new("a.SVG")), Ok(OutputFormat::Svg));
        assert_eq!(OutputFormat::from_path(Path::new("a.png")), Ok(OutputFormat::Png));
        assert_eq!(OutputFormat::from_path(Path::new("a.pdf")), Ok(OutputFormat::Pdf));
        assert!(OutputFormat::from_path(Path::new("a.gif")).is_err());
        assert!(OutputFormat::from_path(Path::new("noext")).is_err());
    }

    #[test]
    fn fallbacks_prefer_named_families() {
        let picked =
            FontFallbacks::pick(["Noto Sans", "DejaVu Serif", "Fira Code", "Liberation Serif"]);
        assert_eq!(picked.sans.as_deref(), Some("Noto Sans"));
        assert_eq!(picked.serif.as_deref(), Some("DejaVu Serif"));
        assert_eq!(picked.mono.as_deref(), Some("Fira Code"));

        let plain = FontFallbacks::pick(["Garamond"]);
        assert_eq!(plain.sans.as_deref(), Some("Garamond"));
        assert_eq!(plain.serif.as_deref(), Some("Garamond"));
        assert_eq!(plain.mono.as_deref(), Some("Garamond"));

        assert_eq!(FontFallbacks::pick([]), FontFallbacks::default());
    }

    #[test]
    fn sans_serif_is_not_taken_as_serif() {
        let picked = FontFallbacks::pick(["Microsoft Sans Serif", "Georgia Serif"]);
        assert_eq!(picked.sans.as_deref(), Some("Microsoft Sans Serif"));
        assert_eq!(picked.serif.as_deref(), Some("Georgia Serif"));
    }

    #[test]
    fn raster_size_scales_and_rounds_up() {
        assert_eq!(raster_size(350.0, 1100.0, 1.0), (350, 1100));
        assert_eq!(raster_size(350.0, 1100.0, 2.0), (700, 2200));
        assert_eq!(raster_size(10.2, 0.0, 1.0), (11, 1));
    }

    #[test]
    fn png_scale_must_be_positive() {
        assert!(svg_to_png("<svg/>", 0.0).is_err());
        assert!(svg_to_png("<svg/>", f32::NAN).is_err());
    }
}
