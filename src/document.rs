//! Drawable primitive tree built from a computed layout.
//!
//! The tree knows nothing about any rendering host; `crate::svg` turns it
//! into SVG text.

use crate::config::RackStyle;
use crate::layout::{BBox, DeviceBox, Label, Layout, RackBox};

#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Group {
        class: Option<String>,
        translate: (f32, f32),
        children: Vec<Primitive>,
    },
    Rect {
        bounds: BBox,
        fill: String,
        stroke: String,
        stroke_width: f32,
        title: Option<String>,
    },
    Text {
        x: f32,
        y: f32,
        content: String,
        fill: String,
        font_family: String,
        font_size: f32,
    },
    Link {
        href: String,
        children: Vec<Primitive>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub width: f32,
    pub height: f32,
    pub style: String,
    pub background: Option<String>,
    pub children: Vec<Primitive>,
}

impl Document {
    /// Every primitive in the document, depth first.
    pub fn primitives(&self) -> Vec<&Primitive> {
        fn walk<'a>(nodes: &'a [Primitive], out: &mut Vec<&'a Primitive>) {
            for node in nodes {
                out.push(node);
                match node {
                    Primitive::Group { children, .. } | Primitive::Link { children, .. } => {
                        walk(children, out)
                    }
                    _ => {}
                }
            }
        }

        let mut out = Vec::new();
        walk(&self.children, &mut out);
        out
    }
}

/// Build the drawable tree: one group per rack holding its name, body and
/// devices, each device optionally wrapped in a link.
pub fn assemble(layout: &Layout, style: &RackStyle) -> Document {
    let children = layout
        .racks
        .iter()
        .map(|rack| rack_group(rack, style))
        .collect();

    Document {
        width: layout.width,
        height: layout.height,
        style: style.hover_css.clone(),
        background: style.background.clone(),
        children,
    }
}

fn rack_group(rack: &RackBox, style: &RackStyle) -> Primitive {
    let mut children = Vec::with_capacity(rack.devices.len() + 2);

    if let Some(name) = &rack.name {
        children.push(text(name, style));
    }

    children.push(Primitive::Rect {
        bounds: rack.body,
        fill: style.rack_fill.clone(),
        stroke: style.stroke.clone(),
        stroke_width: style.stroke_width,
        title: None,
    });

    children.extend(rack.devices.iter().map(|device| device_primitive(device, style)));

    Primitive::Group {
        class: Some("rack".to_string()),
        translate: (rack.x_offset, 0.0),
        children,
    }
}

fn device_primitive(device: &DeviceBox, style: &RackStyle) -> Primitive {
    let last_unit = device.unit.saturating_add(device.units - 1);
    let title = if last_unit == device.unit {
        format!("{} U{}", device.kind, device.unit)
    } else {
        format!("{} U{}-U{}", device.kind, device.unit, last_unit)
    };

    let mut parts = vec![Primitive::Rect {
        bounds: device.rect,
        fill: device.fill.clone(),
        stroke: style.stroke.clone(),
        stroke_width: style.stroke_width,
        title: Some(title),
    }];
    if let Some(label) = &device.label {
        parts.push(text(label, style));
    }

    match &device.href {
        Some(href) => Primitive::Link {
            href: href.clone(),
            children: parts,
        },
        None => Primitive::Group {
            class: Some(device.kind.clone()),
            translate: (0.0, 0.0),
            children: parts,
        },
    }
}

fn text(label: &Label, style: &RackStyle) -> Primitive {
    Primitive::Text {
        x: label.x,
        y: label.y,
        content: label.text.clone(),
        fill: style.text_color.clone(),
        font_family: style.font_family.clone(),
        font_size: style.font_size,
    }
}
