//! RackML markup parsing.
//!
//! Parsing happens in two steps: the text is read into a generic element
//! tree (the only step that can fail), and the tree is then walked into the
//! typed `RackSet` model. Attribute values are kept as authored; numeric
//! interpretation and defaulting belong to the layout engine.

use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesStart, Event as XmlEvent};
use quick_xml::reader::Reader as XmlReader;

pub const ROOT_TAG: &str = "racks";
pub const RACK_TAG: &str = "rack";
pub const GAP_TAG: &str = "gap";

/// The only error the compiler can raise: the input is not well-formed XML.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Failed to parse input")]
pub struct MarkupError {
    detail: String,
}

impl MarkupError {
    fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }

    /// Reader diagnostic describing where the input went wrong.
    pub fn detail(&self) -> &str {
        &self.detail
    }
}

/// A generic XML element: tag name, attributes in document order, child
/// elements and the concatenated character data directly inside it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Element>,
    pub text: String,
}

impl Element {
    fn new(name: String, attributes: Vec<(String, String)>) -> Self {
        Self {
            name,
            attributes,
            children: Vec::new(),
            text: String::new(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter(move |c| c.name == name)
    }
}

/// Equipment kinds with a known colour; anything else is `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DeviceKind {
    Ups,
    Pdu,
    Firewall,
    Switch,
    Blank,
    Patch,
    Cables,
    Server,
    San,
    Other(String),
}

impl DeviceKind {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "ups" => Self::Ups,
            "pdu" => Self::Pdu,
            "firewall" => Self::Firewall,
            "switch" => Self::Switch,
            "blank" => Self::Blank,
            "patch" => Self::Patch,
            "cables" => Self::Cables,
            "server" => Self::Server,
            "san" => Self::San,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn tag(&self) -> &str {
        match self {
            Self::Ups => "ups",
            Self::Pdu => "pdu",
            Self::Firewall => "firewall",
            Self::Switch => "switch",
            Self::Blank => "blank",
            Self::Patch => "patch",
            Self::Cables => "cables",
            Self::Server => "server",
            Self::San => "san",
            Self::Other(tag) => tag,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Device {
    pub kind: DeviceKind,
    pub at: Option<String>,
    pub height: Option<String>,
    pub color: Option<String>,
    pub href: Option<String>,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Gap {
    pub at: Option<String>,
    pub height: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    Device(Device),
    Gap(Gap),
}

impl Slot {
    pub fn at(&self) -> Option<&str> {
        match self {
            Slot::Device(d) => d.at.as_deref(),
            Slot::Gap(g) => g.at.as_deref(),
        }
    }

    pub fn height(&self) -> Option<&str> {
        match self {
            Slot::Device(d) => d.height.as_deref(),
            Slot::Gap(g) => g.height.as_deref(),
        }
    }
}

/// A rack; `slots` are in markup order, which is top-to-bottom.
#[derive(Debug, Clone, PartialEq)]
pub struct Rack {
    pub name: Option<String>,
    pub height: Option<String>,
    pub slots: Vec<Slot>,
}

/// Racks in left-to-right order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RackSet {
    pub racks: Vec<Rack>,
}

/// Parse RackML text into a `RackSet`.
pub fn parse_rackml(input: &str) -> Result<RackSet, MarkupError> {
    let root = parse_element_tree(input)?;
    Ok(rack_set_from_root(&root))
}

/// Read well-formed XML into an element tree. Exactly one root element is
/// required; anything malformed is rejected without partial output.
pub fn parse_element_tree(input: &str) -> Result<Element, MarkupError> {
    let mut reader = XmlReader::from_str(input);
    reader.config_mut().check_end_names = true;

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| MarkupError::new(format!("XML parse error: {}", e)))?;

        match event {
            XmlEvent::Start(ref e) => {
                if root.is_some() {
                    return Err(MarkupError::new("content after the root element"));
                }
                stack.push(start_element(e)?);
            }
            XmlEvent::Empty(ref e) => {
                let element = start_element(e)?;
                close_element(element, &mut stack, &mut root)?;
            }
            XmlEvent::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| MarkupError::new("unmatched end tag"))?;
                close_element(element, &mut stack, &mut root)?;
            }
            XmlEvent::Text(ref e) => {
                let text = e
                    .decode()
                    .map_err(|e| MarkupError::new(format!("invalid text: {}", e)))?;
                push_text(&mut stack, &text)?;
            }
            XmlEvent::CData(ref e) => {
                let text = e
                    .decode()
                    .map_err(|e| MarkupError::new(format!("invalid CDATA: {}", e)))?;
                push_text(&mut stack, &text)?;
            }
            XmlEvent::GeneralRef(ref e) => {
                let resolved = if let Some(ch) = e
                    .resolve_char_ref()
                    .map_err(|e| MarkupError::new(format!("invalid character reference: {}", e)))?
                {
                    ch.to_string()
                } else {
                    let name = e
                        .decode()
                        .map_err(|e| MarkupError::new(format!("invalid entity: {}", e)))?;
                    resolve_predefined_entity(&name)
                        .ok_or_else(|| MarkupError::new(format!("unknown entity &{};", name)))?
                        .to_string()
                };
                push_text(&mut stack, &resolved)?;
            }
            XmlEvent::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(MarkupError::new(format!("unclosed element <{}>", open.name)));
    }

    root.ok_or_else(|| MarkupError::new("no root element"))
}

fn start_element(e: &BytesStart) -> Result<Element, MarkupError> {
    let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
    let mut attributes = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|e| MarkupError::new(format!("bad attribute: {}", e)))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let value = attr
            .unescape_value()
            .map_err(|e| MarkupError::new(format!("bad attribute value: {}", e)))?
            .to_string();
        attributes.push((key, value));
    }
    Ok(Element::new(name, attributes))
}

fn close_element(
    element: Element,
    stack: &mut [Element],
    root: &mut Option<Element>,
) -> Result<(), MarkupError> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
        Ok(())
    } else if root.is_some() {
        Err(MarkupError::new("multiple root elements"))
    } else {
        *root = Some(element);
        Ok(())
    }
}

fn push_text(stack: &mut [Element], text: &str) -> Result<(), MarkupError> {
    match stack.last_mut() {
        Some(parent) => {
            parent.text.push_str(text);
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(MarkupError::new("text outside the root element")),
    }
}

fn rack_set_from_root(root: &Element) -> RackSet {
    if root.name != ROOT_TAG {
        log::warn!(
            "root element is <{}>, expected <{}>; laying out its racks anyway",
            root.name,
            ROOT_TAG
        );
    }

    let racks = root
        .children
        .iter()
        .filter(|child| {
            let is_rack = child.name == RACK_TAG;
            if !is_rack {
                log::warn!("ignoring <{}> inside <{}>", child.name, root.name);
            }
            is_rack
        })
        .map(rack_from_element)
        .collect::<Vec<_>>();

    log::debug!("parsed {} rack(s)", racks.len());
    RackSet { racks }
}

fn rack_from_element(element: &Element) -> Rack {
    Rack {
        name: element.attr("name").map(str::to_string),
        height: element.attr("height").map(str::to_string),
        slots: element.children.iter().map(slot_from_element).collect(),
    }
}

fn slot_from_element(element: &Element) -> Slot {
    let at = element.attr("at").map(str::to_string);
    let height = element.attr("height").map(str::to_string);

    if element.name == GAP_TAG {
        return Slot::Gap(Gap { at, height });
    }

    Slot::Device(Device {
        kind: DeviceKind::from_tag(&element.name),
        at,
        height,
        color: element.attr("color").map(str::to_string),
        href: element.attr("href").map(str::to_string),
        label: element.text.trim().to_string(),
    })
}
