//! Render RackML rack-layout markup to SVG.
//!
//! ```text
//! <racks>
//!   <rack name="A1" height="12">
//!     <switch href="https://netbox/sw1">core switch</switch>
//!     <gap height="2"/>
//!     <server height="2">db01</server>
//!   </rack>
//! </racks>
//! ```
//!
//! [`compile`] runs the whole pipeline: markup parsing, layout and document
//! assembly. It has no side effects, so callers can recompile on every edit
//! and simply drop stale results.

pub mod config;
pub mod document;
pub mod export;
pub mod layout;
pub mod markup;
pub mod palette;
pub mod svg;
pub mod xml;

pub use config::{Config, LayoutConfig, RackStyle};
pub use document::{Document, Primitive};
pub use layout::{Layout, LayoutEngine};
pub use markup::{MarkupError, RackSet, parse_rackml};
pub use palette::Palette;

/// Result of one compile call.
#[derive(Debug, Clone, PartialEq)]
pub struct Compiled {
    pub layout: Layout,
    pub document: Document,
}

impl Compiled {
    pub fn to_svg(&self) -> String {
        svg::to_svg(&self.document)
    }
}

/// Parse, lay out and assemble `markup`.
pub fn compile(markup: &str, config: &Config) -> Result<Compiled, MarkupError> {
    let rack_set = parse_rackml(markup)?;
    let layout = LayoutEngine::new(&config.layout, &config.colors).layout(&rack_set);
    let document = document::assemble(&layout, &config.style);
    Ok(Compiled { layout, document })
}

/// Compile straight to SVG text; returns the text with the canvas size.
pub fn compile_to_svg(markup: &str, config: &Config) -> Result<(String, f32, f32), MarkupError> {
    let compiled = compile(markup, config)?;
    let svg = compiled.to_svg();
    Ok((svg, compiled.layout.width, compiled.layout.height))
}
