use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use rackml::export::{OutputFormat, svg_to_pdf, svg_to_png};
use rackml::{Config, compile};
use std::path::PathBuf;

/// Render RackML rack layouts to SVG, PNG or PDF
#[derive(Parser, Debug)]
#[command(name = "rackml")]
#[command(version)]
#[command(about = "Render RackML rack layouts to SVG, PNG or PDF images", long_about = None)]
struct Args {
    /// Input RackML file (use "-" for stdin)
    #[arg(value_name = "INPUT", required_unless_present = "completions")]
    input: Option<PathBuf>,

    /// Output file path (extension determines format: .svg, .png or .pdf)
    #[arg(short, long, value_name = "OUTPUT", required_unless_present = "completions")]
    output: Option<PathBuf>,

    /// Config file with [layout], [colors] and [style] tables (TOML or YAML)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Height of one rack unit
    #[arg(long)]
    unit_height: Option<f32>,

    /// Width of every rack
    #[arg(long)]
    rack_width: Option<f32>,

    /// Horizontal space between racks
    #[arg(long)]
    rack_spacing: Option<f32>,

    /// Margin around the drawing
    #[arg(long)]
    margin: Option<f32>,

    /// Rack height in units when a rack has no usable height attribute
    #[arg(long)]
    default_rack_height: Option<u32>,

    /// Raster scale multiplier for PNG output (e.g. 2.0 for sharper output)
    #[arg(long, default_value_t = 1.0)]
    png_scale: f32,

    /// Also write the computed geometry as JSON
    #[arg(long, value_name = "FILE")]
    layout_json: Option<PathBuf>,

    /// Print shell completions and exit
    #[arg(long, value_enum, value_name = "SHELL")]
    completions: Option<Shell>,
}

impl Args {
    fn apply_overrides(&self, config: &mut Config) {
        let layout = &mut config.layout;
        if let Some(v) = self.unit_height {
            layout.unit_height = v;
        }
        if let Some(v) = self.rack_width {
            layout.rack_width = v;
        }
        if let Some(v) = self.rack_spacing {
            layout.rack_spacing = v;
        }
        if let Some(v) = self.margin {
            layout.margin = v;
        }
        if let Some(v) = self.default_rack_height {
            layout.default_rack_height = v;
        }
    }
}

fn main() -> Result<(), String> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    if let Some(shell) = args.completions {
        clap_complete::generate(shell, &mut Args::command(), "rackml", &mut std::io::stdout());
        return Ok(());
    }

    let (Some(input), Some(output)) = (args.input.as_ref(), args.output.as_ref()) else {
        return Err("INPUT and --output are required".to_string());
    };

    let mut config = match args.config {
        Some(ref path) => Config::load(path)?,
        None => Config::default(),
    };
    args.apply_overrides(&mut config);

    let markup = if input.to_str() == Some("-") {
        let mut buffer = String::new();
        std::io::Read::read_to_string(&mut std::io::stdin(), &mut buffer)
            .map_err(|e| format!("Failed to read from stdin: {}", e))?;
        buffer
    } else {
        std::fs::read_to_string(input).map_err(|e| format!("Failed to read input file: {}", e))?
    };

    let format = OutputFormat::from_path(output)?;

    let compiled = compile(&markup, &config).map_err(|e| {
        log::error!("{}: {}", e, e.detail());
        e.to_string()
    })?;
    log::info!(
        "{} rack(s), canvas {}x{}",
        compiled.layout.racks.len(),
        compiled.layout.width,
        compiled.layout.height
    );

    if let Some(ref path) = args.layout_json {
        let json = serde_json::to_string_pretty(&compiled.layout)
            .map_err(|e| format!("Failed to serialize layout: {}", e))?;
        std::fs::write(path, json).map_err(|e| format!("Failed to write layout JSON: {}", e))?;
        log::info!("Layout saved to: {}", path.display());
    }

    let svg = compiled.to_svg();
    match format {
        OutputFormat::Svg => {
            std::fs::write(output, svg).map_err(|e| format!("Failed to write SVG: {}", e))?;
            log::info!("SVG saved to: {}", output.display());
        }
        OutputFormat::Png => {
            let png_data = svg_to_png(&svg, args.png_scale)?;
            std::fs::write(output, png_data).map_err(|e| format!("Failed to write PNG: {}", e))?;
            log::info!("PNG saved to: {}", output.display());
        }
        OutputFormat::Pdf => {
            let pdf_data = svg_to_pdf(&svg)?;
            std::fs::write(output, pdf_data).map_err(|e| format!("Failed to write PDF: {}", e))?;
            log::info!("PDF saved to: {}", output.display());
        }
    }

    Ok(())
}
