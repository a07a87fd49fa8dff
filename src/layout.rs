//! Geometry for a parsed rack set.
//!
//! Racks are laid out left to right from the top margin. Inside a rack,
//! unit 1 is the bottom: slots are walked in reverse markup order and a
//! running cursor tracks the next free unit. Malformed numeric attributes
//! fall back to defaults, and overlapping manual placements are drawn as
//! authored; the engine never fails.

use serde::Serialize;

use crate::config::LayoutConfig;
use crate::markup::{Rack, RackSet, Slot};
use crate::palette::Palette;

/// Bounding box in output units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BBox {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }
}

/// Text anchored at its centre point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Label {
    pub x: f32,
    pub y: f32,
    pub text: String,
}

/// Where a slot ended up: `at` is the 0-based unit offset from the rack
/// bottom, `index` the slot's position in markup order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub index: usize,
    pub at: u32,
    pub height: u32,
}

impl Placement {
    pub fn top(&self) -> u32 {
        self.at.saturating_add(self.height)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceBox {
    pub kind: String,
    /// 1-based bottom unit, as it would be written in `at`.
    pub unit: u32,
    pub units: u32,
    /// Rack-local rectangle: x is relative to the rack, y is absolute.
    pub rect: BBox,
    pub fill: String,
    pub href: Option<String>,
    pub label: Option<Label>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RackBox {
    pub x_offset: f32,
    pub units: u32,
    /// Rack-local body outline.
    pub body: BBox,
    pub name: Option<Label>,
    /// Devices in drawing order, which is placement order.
    pub devices: Vec<DeviceBox>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub width: f32,
    pub height: f32,
    pub max_rack_units: u32,
    pub racks: Vec<RackBox>,
}

/// Parse a positive integer attribute; anything else counts as absent.
pub fn parse_units(value: Option<&str>) -> Option<u32> {
    value
        .and_then(|v| v.trim().parse::<u32>().ok())
        .filter(|v| *v > 0)
}

/// Resolve every slot's unit range, bottom-up.
///
/// Slots are visited last-declared first. A slot without `at` starts at the
/// cursor; a slot with `at` ignores it. Either way the cursor continues from
/// the slot's top. Results are in visiting order.
pub fn place_slots(slots: &[Slot]) -> Vec<Placement> {
    let (_, placements) = slots.iter().enumerate().rev().fold(
        (0u32, Vec::with_capacity(slots.len())),
        |(cursor, mut placements), (index, slot)| {
            let height = parse_units(slot.height()).unwrap_or(1);
            let at = parse_units(slot.at()).map_or(cursor, |at| at - 1);
            let placement = Placement { index, at, height };
            placements.push(placement);
            (placement.top(), placements)
        },
    );
    placements
}

pub struct LayoutEngine<'a> {
    config: &'a LayoutConfig,
    palette: &'a Palette,
}

impl<'a> LayoutEngine<'a> {
    pub fn new(config: &'a LayoutConfig, palette: &'a Palette) -> Self {
        Self { config, palette }
    }

    pub fn rack_units(&self, rack: &Rack) -> u32 {
        parse_units(rack.height.as_deref()).unwrap_or(self.config.default_rack_height)
    }

    pub fn layout(&self, set: &RackSet) -> Layout {
        let cfg = self.config;
        let max_rack_units = set
            .racks
            .iter()
            .map(|rack| self.rack_units(rack))
            .max()
            .unwrap_or(0);

        let rack_count = set.racks.len();
        let height = 2.0 * cfg.margin + cfg.unit_height * max_rack_units as f32;
        let width = 2.0 * cfg.margin
            + rack_count as f32 * cfg.rack_width
            + rack_count.saturating_sub(1) as f32 * cfg.rack_spacing;

        let racks = set
            .racks
            .iter()
            .enumerate()
            .map(|(idx, rack)| {
                let x_offset = cfg.margin + idx as f32 * (cfg.rack_width + cfg.rack_spacing);
                self.layout_rack(rack, x_offset)
            })
            .collect();

        log::debug!(
            "canvas {}x{} for {} rack(s), tallest {}U",
            width,
            height,
            rack_count,
            max_rack_units
        );

        Layout {
            width,
            height,
            max_rack_units,
            racks,
        }
    }

    fn layout_rack(&self, rack: &Rack, x_offset: f32) -> RackBox {
        let cfg = self.config;
        let units = self.rack_units(rack);
        let body = BBox::new(0.0, cfg.margin, cfg.rack_width, units as f32 * cfg.unit_height);
        let bottom_y = body.bottom();

        let name = rack.name.as_ref().map(|name| Label {
            x: body.center_x(),
            y: cfg.margin / 2.0,
            text: name.clone(),
        });

        let devices = place_slots(&rack.slots)
            .into_iter()
            .filter_map(|placement| match &rack.slots[placement.index] {
                Slot::Device(device) => {
                    let rect = BBox::new(
                        0.0,
                        bottom_y - placement.top() as f32 * cfg.unit_height,
                        cfg.rack_width,
                        placement.height as f32 * cfg.unit_height,
                    );
                    let label = (!device.label.is_empty()).then(|| Label {
                        x: rect.center_x(),
                        y: rect.center_y(),
                        text: device.label.clone(),
                    });
                    log::debug!(
                        "{} at U{} ({}U) in rack {:?}",
                        device.kind.tag(),
                        placement.at.saturating_add(1),
                        placement.height,
                        rack.name
                    );
                    Some(DeviceBox {
                        kind: device.kind.tag().to_string(),
                        unit: placement.at.saturating_add(1),
                        units: placement.height,
                        rect,
                        fill: self
                            .palette
                            .resolve(&device.kind, device.color.as_deref())
                            .to_string(),
                        href: device.href.clone(),
                        label,
                    })
                }
                Slot::Gap(_) => None,
            })
            .collect();

        RackBox {
            x_offset,
            units,
            body,
            name,
            devices,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::parse_rackml;

    fn layout_of(input: &str) -> Layout {
        let set = parse_rackml(input).expect("valid markup");
        let config = LayoutConfig::default();
        let palette = Palette::default();
        LayoutEngine::new(&config, &palette).layout(&set)
    }

    #[test]
    fn test_parse_units() {
        assert_eq!(parse_units(Some("3")), Some(3));
        assert_eq!(parse_units(Some(" 7 ")), Some(7));
        assert_eq!(parse_units(Some("0")), None);
        assert_eq!(parse_units(Some("-2")), None);
        assert_eq!(parse_units(Some("two")), None);
        assert_eq!(parse_units(Some("")), None);
        assert_eq!(parse_units(None), None);
    }

    #[test]
    fn test_place_slots_cursor_fold() {
        let set = parse_rackml(
            r#"<racks><rack>
                <server/>
                <gap height="3"/>
                <switch at="10" height="2"/>
                <ups height="2"/>
            </rack></racks>"#,
        )
        .unwrap();

        let placements = place_slots(&set.racks[0].slots);
        assert_eq!(
            placements,
            vec![
                Placement { index: 3, at: 0, height: 2 },
                Placement { index: 2, at: 9, height: 2 },
                Placement { index: 1, at: 11, height: 3 },
                Placement { index: 0, at: 14, height: 1 },
            ]
        );
    }

    #[test]
    fn test_malformed_slot_attributes_use_defaults() {
        let set = parse_rackml(
            r#"<racks><rack><server at="x" height="big"/><server height="0"/></rack></racks>"#,
        )
        .unwrap();
        let placements = place_slots(&set.racks[0].slots);
        assert_eq!(placements[0], Placement { index: 1, at: 0, height: 1 });
        assert_eq!(placements[1], Placement { index: 0, at: 1, height: 1 });
    }

    #[test]
    fn test_canvas_size() {
        let layout = layout_of(
            r#"<racks><rack height="10"/><rack height="20"/><rack height="oops"/></racks>"#,
        );
        assert_eq!(layout.max_rack_units, 42);
        assert_eq!(layout.width, 50.0 + 3.0 * 300.0 + 2.0 * 25.0);
        assert_eq!(layout.height, 50.0 + 42.0 * 25.0);

        let offsets: Vec<f32> = layout.racks.iter().map(|r| r.x_offset).collect();
        assert_eq!(offsets, vec![25.0, 350.0, 675.0]);
    }

    #[test]
    fn test_empty_rack_set() {
        let layout = layout_of("<racks/>");
        assert_eq!(layout.width, 50.0);
        assert_eq!(layout.height, 50.0);
        assert!(layout.racks.is_empty());
    }

    #[test]
    fn test_shorter_racks_share_top_margin() {
        let layout = layout_of(r#"<racks><rack height="4"/><rack height="8"/></racks>"#);
        assert_eq!(layout.racks[0].body, BBox::new(0.0, 25.0, 300.0, 100.0));
        assert_eq!(layout.racks[1].body, BBox::new(0.0, 25.0, 300.0, 200.0));
    }

    #[test]
    fn test_explicit_at_geometry() {
        let layout =
            layout_of(r#"<racks><rack height="10"><server at="5" height="2"/></rack></racks>"#);
        let rack = &layout.racks[0];
        let device = &rack.devices[0];
        assert_eq!(device.rect.y, rack.body.bottom() - 6.0 * 25.0);
        assert_eq!(device.rect.height, 50.0);
        assert_eq!(device.rect.x, 0.0);
        assert_eq!(device.rect.width, 300.0);
        assert_eq!(device.unit, 5);
    }

    #[test]
    fn test_labels_are_centered() {
        let layout = layout_of(
            r#"<racks><rack name="A" height="2"><server height="2">web</server></rack></racks>"#,
        );
        let rack = &layout.racks[0];
        let name = rack.name.as_ref().unwrap();
        assert_eq!((name.x, name.y), (150.0, 12.5));

        let label = rack.devices[0].label.as_ref().unwrap();
        assert_eq!((label.x, label.y), (150.0, 50.0));
        assert_eq!(label.text, "web");
    }

    #[test]
    fn test_gaps_emit_nothing_and_empty_labels_are_dropped() {
        let layout = layout_of(r#"<racks><rack><gap/><blank/></rack></racks>"#);
        let rack = &layout.racks[0];
        assert_eq!(rack.devices.len(), 1);
        assert_eq!(rack.devices[0].kind, "blank");
        assert!(rack.devices[0].label.is_none());
        assert!(rack.name.is_none());
    }

    #[test]
    fn test_slot_above_topmost_unit_saturates() {
        let layout = layout_of(
            r#"<racks><rack>
                <server>top</server>
                <server at="4294967295">pinned</server>
            </rack></racks>"#,
        );
        let devices = &layout.racks[0].devices;
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].unit, u32::MAX);
        assert_eq!(devices[1].unit, u32::MAX);
        assert_eq!(devices[1].label.as_ref().map(|l| l.text.as_str()), Some("top"));
        assert!(devices.iter().all(|d| d.rect.y.is_finite()));
    }

    #[test]
    fn test_overlaps_are_kept_in_processing_order() {
        let layout = layout_of(
            r#"<racks><rack height="4"><server at="1">top</server><san>bottom</san></rack></racks>"#,
        );
        let devices = &layout.racks[0].devices;
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].kind, "san");
        assert_eq!(devices[1].kind, "server");
        assert_eq!(devices[0].rect, devices[1].rect);
    }
}
