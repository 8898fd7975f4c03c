/// The validated world document: zones, rooms, props, clues and spawn points.
///
/// Every type here is closed and fully defaulted. Raw generator output never
/// reaches these types directly; it goes through `core::validator` first.
use serde::{Deserialize, Serialize};

/// A point in grid space. `x` runs along the zone packing axis, `y` is the
/// depth axis of the floor plane and `z` is elevation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };
    pub const ONE: Vec3 = Vec3 {
        x: 1.0,
        y: 1.0,
        z: 1.0,
    };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn splat(v: f64) -> Self {
        Self { x: v, y: v, z: v }
    }
}

/// Footprint of a region or object, in world units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub depth: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, depth: f64, height: f64) -> Self {
        Self {
            width,
            depth,
            height,
        }
    }

    /// A flat footprint with unit height.
    pub fn flat(width: f64, depth: f64) -> Self {
        Self::new(width, depth, 1.0)
    }
}

impl Default for Size {
    fn default() -> Self {
        Self::new(1.0, 1.0, 1.0)
    }
}

/// Placement of an object relative to its owning room.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    /// Rotation about the vertical axis, in radians.
    pub rotation: f64,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: 0.0,
            scale: Vec3::ONE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneKind {
    #[default]
    Indoor,
    Outdoor,
}

impl ZoneKind {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "indoor" => Some(Self::Indoor),
            "outdoor" => Some(Self::Outdoor),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Indoor => "indoor",
            Self::Outdoor => "outdoor",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropKind {
    Furniture,
    #[default]
    Decoration,
    Obstacle,
}

impl PropKind {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "furniture" => Some(Self::Furniture),
            "decoration" => Some(Self::Decoration),
            "obstacle" => Some(Self::Obstacle),
            _ => None,
        }
    }
}

/// The narrative category of a clue. Its tag doubles as the asset lookup key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClueKind {
    Fingerprint,
    Weapon,
    Note,
    Blood,
    Footprint,
    #[default]
    Generic,
}

impl ClueKind {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "fingerprint" => Some(Self::Fingerprint),
            "weapon" => Some(Self::Weapon),
            "note" => Some(Self::Note),
            "blood" => Some(Self::Blood),
            "footprint" => Some(Self::Footprint),
            "generic" => Some(Self::Generic),
            _ => None,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Self::Fingerprint => "fingerprint",
            Self::Weapon => "weapon",
            Self::Note => "note",
            Self::Blood => "blood",
            Self::Footprint => "footprint",
            Self::Generic => "generic",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relevance {
    High,
    #[default]
    Medium,
    Low,
}

impl Relevance {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathKind {
    #[default]
    Hallway,
    Road,
    Door,
}

impl PathKind {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "hallway" => Some(Self::Hallway),
            "road" => Some(Self::Road),
            "door" => Some(Self::Door),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Dark,
    Spooky,
    Neutral,
    Warm,
}

impl Tone {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "dark" => Some(Self::Dark),
            "spooky" => Some(Self::Spooky),
            "neutral" => Some(Self::Neutral),
            "warm" => Some(Self::Warm),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weather {
    Clear,
    Rain,
    #[default]
    Fog,
}

impl Weather {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "clear" => Some(Self::Clear),
            "rain" => Some(Self::Rain),
            "fog" => Some(Self::Fog),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    Day,
    #[default]
    Night,
    Sunset,
}

impl TimeOfDay {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "day" => Some(Self::Day),
            "night" => Some(Self::Night),
            "sunset" => Some(Self::Sunset),
            _ => None,
        }
    }
}

/// Mood settings carried alongside the layout. Not used for placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldMetadata {
    pub theme: String,
    pub tone: Tone,
    pub weather: Weather,
    pub time_of_day: TimeOfDay,
}

impl Default for WorldMetadata {
    fn default() -> Self {
        Self {
            theme: "noir".to_string(),
            tone: Tone::default(),
            weather: Weather::default(),
            time_of_day: TimeOfDay::default(),
        }
    }
}

/// A non-narrative object placed inside a room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prop {
    pub id: String,
    /// Free-form semantic label, e.g. "antique round table". Used for asset lookup.
    pub name: String,
    pub kind: PropKind,
    pub transform: Transform,
    pub color: String,
    pub collider: bool,
}

/// A narrative object placed inside a room. Never blocks movement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clue {
    pub id: String,
    pub name: String,
    pub kind: ClueKind,
    pub description: String,
    pub relevance: Relevance,
    pub transform: Transform,
    pub color: String,
}

/// A room is owned by exactly one zone. Its position is relative to that zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: String,
    pub name: String,
    pub size: Size,
    pub position: Vec3,
    pub props: Vec<Prop>,
    pub clues: Vec<Clue>,
}

impl Room {
    /// A copy of the room without its props and clues.
    pub fn header(&self) -> Room {
        Room {
            props: Vec::new(),
            clues: Vec::new(),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub id: String,
    pub name: String,
    pub kind: ZoneKind,
    pub biome: String,
    /// Declared global position. Layout ignores it and packs zones sequentially.
    pub position: Vec3,
    pub size: Size,
    pub rooms: Vec<Room>,
}

impl Zone {
    /// A copy of the zone without its rooms.
    pub fn header(&self) -> Zone {
        Zone {
            id: self.id.clone(),
            name: self.name.clone(),
            kind: self.kind,
            biome: self.biome.clone(),
            position: self.position,
            size: self.size,
            rooms: Vec::new(),
        }
    }
}

/// An advisory zone-to-zone connector. Endpoints are not checked for reachability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZonePath {
    pub from_zone_id: String,
    pub to_zone_id: String,
    pub kind: PathKind,
    pub width: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NpcSpawn {
    pub id: String,
    pub name: Option<String>,
    pub position: Vec3,
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SpawnPoints {
    pub player: Vec3,
    pub npcs: Vec<NpcSpawn>,
}

/// Root document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct World {
    pub metadata: WorldMetadata,
    pub size: Size,
    pub zones: Vec<Zone>,
    pub paths: Vec<ZonePath>,
    pub spawn_points: SpawnPoints,
}

/// Entity totals for a world, used for logging and sanity checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EntityCounts {
    pub zones: usize,
    pub rooms: usize,
    pub props: usize,
    pub clues: usize,
}

impl World {
    pub fn entity_counts(&self) -> EntityCounts {
        let mut counts = EntityCounts {
            zones: self.zones.len(),
            ..EntityCounts::default()
        };
        for room in self.zones.iter().flat_map(|z| &z.rooms) {
            counts.rooms += 1;
            counts.props += room.props.len();
            counts.clues += room.clues.len();
        }
        counts
    }

    /// Iterate every clue in the world with the ids of its zone and room.
    pub fn clues(&self) -> impl Iterator<Item = (&str, &str, &Clue)> {
        self.zones.iter().flat_map(|zone| {
            zone.rooms.iter().flat_map(move |room| {
                room.clues
                    .iter()
                    .map(move |clue| (zone.id.as_str(), room.id.as_str(), clue))
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_room(props: usize, clues: usize) -> Room {
        Room {
            id: "study".to_string(),
            name: "Study".to_string(),
            size: Size::flat(8.0, 8.0),
            position: Vec3::ZERO,
            props: (0..props)
                .map(|i| Prop {
                    id: format!("p{}", i),
                    name: "chair".to_string(),
                    kind: PropKind::Furniture,
                    transform: Transform::default(),
                    color: "#7f8c8d".to_string(),
                    collider: true,
                })
                .collect(),
            clues: (0..clues)
                .map(|i| Clue {
                    id: format!("c{}", i),
                    name: "Letter".to_string(),
                    kind: ClueKind::Note,
                    description: "A torn letter".to_string(),
                    relevance: Relevance::High,
                    transform: Transform::default(),
                    color: "#e74c3c".to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn enum_labels_are_case_insensitive() {
        assert_eq!(ZoneKind::from_label(" Outdoor "), Some(ZoneKind::Outdoor));
        assert_eq!(ClueKind::from_label("NOTE"), Some(ClueKind::Note));
        assert_eq!(PropKind::from_label("sofa"), None);
        assert_eq!(Relevance::from_label("low"), Some(Relevance::Low));
    }

    #[test]
    fn defaults_match_documented_values() {
        assert_eq!(ZoneKind::default(), ZoneKind::Indoor);
        assert_eq!(PropKind::default(), PropKind::Decoration);
        assert_eq!(ClueKind::default(), ClueKind::Generic);
        assert_eq!(Relevance::default(), Relevance::Medium);
        assert_eq!(Transform::default().scale, Vec3::ONE);
        assert_eq!(WorldMetadata::default().theme, "noir");
    }

    #[test]
    fn room_header_drops_contents() {
        let room = make_room(3, 2);
        let header = room.header();
        assert_eq!(header.id, "study");
        assert!(header.props.is_empty());
        assert!(header.clues.is_empty());
    }

    #[test]
    fn entity_counts_and_clue_iteration() {
        let world = World {
            metadata: WorldMetadata::default(),
            size: Size::flat(20.0, 20.0),
            zones: vec![Zone {
                id: "manor".to_string(),
                name: "Manor".to_string(),
                kind: ZoneKind::Indoor,
                biome: "manor".to_string(),
                position: Vec3::ZERO,
                size: Size::flat(10.0, 10.0),
                rooms: vec![make_room(2, 1), make_room(0, 3)],
            }],
            paths: Vec::new(),
            spawn_points: SpawnPoints::default(),
        };
        let counts = world.entity_counts();
        assert_eq!(counts.zones, 1);
        assert_eq!(counts.rooms, 2);
        assert_eq!(counts.props, 2);
        assert_eq!(counts.clues, 4);
        assert!(world.clues().all(|(zone, room, _)| zone == "manor" && room == "study"));
    }

    #[test]
    fn serializes_enums_lowercase() {
        let json = serde_json::to_string(&ClueKind::Footprint).unwrap();
        assert_eq!(json, "\"footprint\"");
    }
}
