use serde::{Deserialize, Serialize};

use crate::markup::DeviceKind;

const UPS: &str = "#66bb6a";
const PDU: &str = "#9ccc65";
const FIREWALL: &str = "#e53935";
const SWITCH: &str = "#ec407a";
const BLANK: &str = "#d3d3d3";
const PATCH: &str = "#ffee58";
const CABLES: &str = "#ffa726";
const SERVER: &str = "#42a5f5";
const SAN: &str = "#26a69a";
const FALLBACK: &str = "white";

/// Default fill per device kind. An explicit `color` attribute on a device
/// always wins over this table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    #[serde(default = "default_ups")]
    pub ups: String,
    #[serde(default = "default_pdu")]
    pub pdu: String,
    #[serde(default = "default_firewall")]
    pub firewall: String,
    #[serde(default = "default_switch")]
    pub switch: String,
    #[serde(default = "default_blank")]
    pub blank: String,
    #[serde(default = "default_patch")]
    pub patch: String,
    #[serde(default = "default_cables")]
    pub cables: String,
    #[serde(default = "default_server")]
    pub server: String,
    #[serde(default = "default_san")]
    pub san: String,
    #[serde(default = "default_fallback")]
    pub fallback: String,
}

fn default_ups() -> String {
    UPS.to_string()
}
fn default_pdu() -> String {
    PDU.to_string()
}
fn default_firewall() -> String {
    FIREWALL.to_string()
}
fn default_switch() -> String {
    SWITCH.to_string()
}
fn default_blank() -> String {
    BLANK.to_string()
}
fn default_patch() -> String {
    PATCH.to_string()
}
fn default_cables() -> String {
    CABLES.to_string()
}
fn default_server() -> String {
    SERVER.to_string()
}
fn default_san() -> String {
    SAN.to_string()
}
fn default_fallback() -> String {
    FALLBACK.to_string()
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            ups: default_ups(),
            pdu: default_pdu(),
            firewall: default_firewall(),
            switch: default_switch(),
            blank: default_blank(),
            patch: default_patch(),
            cables: default_cables(),
            server: default_server(),
            san: default_san(),
            fallback: default_fallback(),
        }
    }
}

impl Palette {
    pub fn color_for(&self, kind: &DeviceKind) -> &str {
        match kind {
            DeviceKind::Ups => &self.ups,
            DeviceKind::Pdu => &self.pdu,
            DeviceKind::Firewall => &self.firewall,
            DeviceKind::Switch => &self.switch,
            DeviceKind::Blank => &self.blank,
            DeviceKind::Patch => &self.patch,
            DeviceKind::Cables => &self.cables,
            DeviceKind::Server => &self.server,
            DeviceKind::San => &self.san,
            DeviceKind::Other(_) => &self.fallback,
        }
    }

    /// Explicit colour, then the kind default, then the fallback.
    pub fn resolve<'a>(&'a self, kind: &DeviceKind, explicit: Option<&'a str>) -> &'a str {
        explicit
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| self.color_for(kind))
    }
}

#[cfg(test)]
mod tests {
    use super::Palette;
    use crate::markup::DeviceKind;

    #[test]
    fn explicit_color_wins() {
        let palette = Palette::default();
        assert_eq!(
            palette.resolve(&DeviceKind::Server, Some("#000000")),
            "#000000"
        );
        assert_eq!(palette.resolve(&DeviceKind::Server, None), palette.server);
    }

    #[test]
    fn unknown_kind_falls_back_to_white() {
        let palette = Palette::default();
        let kind = DeviceKind::from_tag("widget");
        assert_eq!(palette.resolve(&kind, None), "white");
    }

    #[test]
    fn blank_color_attribute_is_ignored() {
        let palette = Palette::default();
        assert_eq!(palette.resolve(&DeviceKind::San, Some("  ")), palette.san);
    }
}
