/// Display colors for scene nodes that carry no color of their own.
use crate::schema::world::{PropKind, ZoneKind};

pub const BACKGROUND: &str = "#1a1a2e";
pub const ROOM_FLOOR: &str = "#4a4a6a";
pub const LABEL: &str = "#ffffff";
pub const NPC: &str = "#f1c40f";

pub fn zone_color(kind: ZoneKind) -> &'static str {
    match kind {
        ZoneKind::Indoor => "#2a2a40",
        ZoneKind::Outdoor => "#253529",
    }
}

pub fn prop_color(kind: PropKind) -> &'static str {
    match kind {
        PropKind::Furniture => "#8b5a2b",
        PropKind::Decoration => "#c0a080",
        PropKind::Obstacle => "#505050",
    }
}
