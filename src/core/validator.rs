/// Structural repair of untrusted world documents.
///
/// Takes an open `serde_json::Value` and produces a closed, fully defaulted
/// [`World`]. Missing or wrong-typed fields fall back to documented defaults
/// one by one; nothing here fails except a document with no `world` root.
/// Every repair worth knowing about is recorded as a [`ValidationWarning`].
///
/// Two input dialects are accepted. The nested form uses `position`,
/// `size`, `props`, `transform` and `clueType`. The flat form, which is what
/// generators tend to emit, puts `x`, `z`, `width` and `depth` directly on
/// the entity, lists props under `furniture` and tags clues with `type`. In
/// a point without a `y` key, `z` is read as the depth axis.
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashSet;
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

use super::config::PipelineConfig;
use super::shape::ShapeReport;
use crate::schema::scene::BACKGROUND_ID;
use crate::schema::world::{
    Clue, ClueKind, NpcSpawn, PathKind, Prop, PropKind, Relevance, Room, Size, SpawnPoints,
    TimeOfDay, Tone, Transform, Vec3, Weather, World, WorldMetadata, Zone, ZoneKind, ZonePath,
};

pub const DEFAULT_PROP_COLOR: &str = "#7f8c8d";
pub const DEFAULT_CLUE_COLOR: &str = "#e74c3c";
pub const DEFAULT_CLUE_SCALE: f64 = 0.5;
pub const DEFAULT_CLUE_DESCRIPTION: &str = "A mysterious object.";

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("document root is not an object")]
    NotAnObject,
    #[error("document has no 'world' object")]
    MissingWorld,
    #[error("document failed shape check: {0}")]
    Shape(ShapeReport),
}

/// A non-fatal repair made while validating.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationWarning {
    /// A list exceeded its configured limit and was cut to the first `kept`.
    Truncated {
        path: String,
        found: usize,
        kept: usize,
    },
    /// A field was present but unusable and was replaced by its default.
    Defaulted { path: String },
    /// A number was outside its allowed range.
    Clamped { path: String, from: f64, to: f64 },
    /// An entity had no id and one was generated.
    GeneratedId { path: String, id: String },
    /// An id was already taken and the entity was renamed.
    DuplicateId { path: String, original: String, renamed: String },
    /// An entry was unusable as a whole and was left out.
    Dropped { path: String, reason: &'static str },
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Truncated { path, found, kept } => {
                write!(f, "{}: {} entries exceed the limit, kept {}", path, found, kept)
            }
            Self::Defaulted { path } => write!(f, "{}: unusable value replaced by default", path),
            Self::Clamped { path, from, to } => write!(f, "{}: {} clamped to {}", path, from, to),
            Self::GeneratedId { path, id } => write!(f, "{}: missing id, generated '{}'", path, id),
            Self::DuplicateId {
                path,
                original,
                renamed,
            } => write!(f, "{}: duplicate id '{}' renamed to '{}'", path, original, renamed),
            Self::Dropped { path, reason } => write!(f, "{}: dropped, {}", path, reason),
        }
    }
}

/// A repaired value plus everything that had to be repaired to get it.
#[derive(Debug, Clone)]
pub struct Validated<T> {
    pub value: T,
    pub warnings: Vec<ValidationWarning>,
}

impl<T> Validated<T> {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Validated<U> {
        Validated {
            value: f(self.value),
            warnings: self.warnings,
        }
    }
}

/// Validate a whole document of the form `{ "world": { ... } }`.
pub fn validate_document(
    doc: &Value,
    config: &PipelineConfig,
) -> Result<Validated<World>, IngestError> {
    let root = doc.as_object().ok_or(IngestError::NotAnObject)?;
    let world = root.get("world").ok_or(IngestError::MissingWorld)?;
    if !world.is_object() {
        return Err(IngestError::MissingWorld);
    }
    Ok(validate_world(world, config))
}

/// Repair the body of a `world` object. Total: any value, even a non-object,
/// yields a valid world.
pub fn validate_world(raw: &Value, config: &PipelineConfig) -> Validated<World> {
    let empty = Map::new();
    let mut repairer = Repairer::new(config);
    let obj = match raw.as_object() {
        Some(obj) => obj,
        None => {
            repairer.defaulted("world");
            &empty
        }
    };
    let world = repairer.world(obj);
    log::debug!(
        "validated world: {} zones, {} warnings",
        world.zones.len(),
        repairer.warnings.len()
    );
    Validated {
        value: world,
        warnings: repairer.warnings,
    }
}

struct Repairer<'a> {
    config: &'a PipelineConfig,
    rng: StdRng,
    seen_ids: FxHashSet<String>,
    warnings: Vec<ValidationWarning>,
}

impl<'a> Repairer<'a> {
    fn new(config: &'a PipelineConfig) -> Self {
        let mut seen_ids = FxHashSet::default();
        seen_ids.insert(BACKGROUND_ID.to_string());
        Self {
            config,
            rng: StdRng::seed_from_u64(config.seed),
            seen_ids,
            warnings: Vec::new(),
        }
    }

    fn warn(&mut self, warning: ValidationWarning) {
        match &warning {
            ValidationWarning::Truncated { .. } => log::warn!("{}", warning),
            _ => log::debug!("{}", warning),
        }
        self.warnings.push(warning);
    }

    fn defaulted(&mut self, path: &str) {
        self.warn(ValidationWarning::Defaulted {
            path: path.to_string(),
        });
    }

    // ---------------------------------------------------------------------
    // Document structure
    // ---------------------------------------------------------------------

    fn world(&mut self, obj: &Map<String, Value>) -> World {
        let metadata = self.metadata(obj.get("metadata"));
        let size = self.entity_size("world", obj, self.config.defaults.world_size);

        let raw_zones = self.list("world.zones", obj.get("zones"), self.config.limits.max_zones);
        let zones = raw_zones
            .iter()
            .enumerate()
            .map(|(i, z)| self.zone(&format!("world.zones[{}]", i), z))
            .collect();

        let raw_paths = self.list("world.paths", obj.get("paths"), usize::MAX);
        let paths = raw_paths
            .iter()
            .enumerate()
            .filter_map(|(i, p)| self.zone_path(&format!("world.paths[{}]", i), p))
            .collect();

        let spawn_points = self.spawn_points(
            obj.get("spawnPoints")
                .or_else(|| obj.get("spawn_points")),
        );

        World {
            metadata,
            size,
            zones,
            paths,
            spawn_points,
        }
    }

    fn metadata(&mut self, raw: Option<&Value>) -> WorldMetadata {
        let mut metadata = WorldMetadata::default();
        let Some(obj) = self.object("world.metadata", raw) else {
            return metadata;
        };
        if let Some(theme) = label(obj.get("theme")) {
            metadata.theme = theme;
        }
        metadata.tone = self.choice("world.metadata.tone", obj.get("tone"), Tone::from_label);
        metadata.weather =
            self.choice("world.metadata.weather", obj.get("weather"), Weather::from_label);
        metadata.time_of_day = self.choice(
            "world.metadata.timeOfDay",
            obj.get("timeOfDay").or_else(|| obj.get("time_of_day")),
            TimeOfDay::from_label,
        );
        metadata
    }

    fn zone(&mut self, path: &str, raw: &Value) -> Zone {
        let empty = Map::new();
        let obj = match raw.as_object() {
            Some(obj) => obj,
            None => {
                self.defaulted(path);
                &empty
            }
        };

        let id = self.id(path, "zone", obj.get("id"));
        let name = label(obj.get("name")).unwrap_or_else(|| "Unknown Zone".to_string());
        let kind = self.choice(
            &format!("{}.type", path),
            obj.get("type").or_else(|| obj.get("kind")),
            ZoneKind::from_label,
        );
        let biome = label(obj.get("biome")).unwrap_or_else(|| "generic".to_string());
        let position = self.placement(path, obj);
        let size = self.entity_size(path, obj, self.config.defaults.zone_size);

        let raw_rooms = self.list(
            &format!("{}.rooms", path),
            obj.get("rooms"),
            self.config.limits.max_rooms_per_zone,
        );
        let rooms = raw_rooms
            .iter()
            .enumerate()
            .map(|(i, r)| self.room(&format!("{}.rooms[{}]", path, i), r))
            .collect();

        Zone {
            id,
            name,
            kind,
            biome,
            position,
            size,
            rooms,
        }
    }

    fn room(&mut self, path: &str, raw: &Value) -> Room {
        let empty = Map::new();
        let obj = match raw.as_object() {
            Some(obj) => obj,
            None => {
                self.defaulted(path);
                &empty
            }
        };

        let id = self.id(path, "room", obj.get("id"));
        let name = label(obj.get("name")).unwrap_or_else(|| "Unknown Room".to_string());
        let size = self.entity_size(path, obj, self.config.defaults.room_size);
        let position = self.placement(path, obj);

        let (props_key, raw_props) = match obj.get("props") {
            Some(props) => ("props", Some(props)),
            None => ("furniture", obj.get("furniture")),
        };
        let raw_props = self.list(
            &format!("{}.{}", path, props_key),
            raw_props,
            self.config.limits.max_props_per_room,
        );
        let props = raw_props
            .iter()
            .enumerate()
            .map(|(i, p)| self.prop(&format!("{}.{}[{}]", path, props_key, i), p))
            .collect();

        let raw_clues = self.list(
            &format!("{}.clues", path),
            obj.get("clues"),
            self.config.limits.max_clues_per_room,
        );
        let clues = raw_clues
            .iter()
            .enumerate()
            .map(|(i, c)| self.clue(&format!("{}.clues[{}]", path, i), c))
            .collect();

        Room {
            id,
            name,
            size,
            position,
            props,
            clues,
        }
    }

    fn prop(&mut self, path: &str, raw: &Value) -> Prop {
        let empty = Map::new();
        let obj = match raw.as_object() {
            Some(obj) => obj,
            None => {
                self.defaulted(path);
                &empty
            }
        };

        let id = self.id(path, "prop", obj.get("id"));
        let name = label(obj.get("name")).unwrap_or_else(|| "Unknown Prop".to_string());
        // Generators often put the semantic label in `type`; only the three
        // known kinds are read from it.
        let kind = obj
            .get("kind")
            .or_else(|| obj.get("type"))
            .and_then(Value::as_str)
            .and_then(PropKind::from_label)
            .unwrap_or_default();
        let transform = self.transform(path, obj, Vec3::ONE);
        let color = self.color(&format!("{}.color", path), obj.get("color"), DEFAULT_PROP_COLOR);
        let collider = match obj.get("collider") {
            None | Some(Value::Null) => true,
            Some(Value::Bool(b)) => *b,
            Some(_) => {
                self.defaulted(&format!("{}.collider", path));
                true
            }
        };

        Prop {
            id,
            name,
            kind,
            transform,
            color,
            collider,
        }
    }

    fn clue(&mut self, path: &str, raw: &Value) -> Clue {
        let empty = Map::new();
        let obj = match raw.as_object() {
            Some(obj) => obj,
            None => {
                self.defaulted(path);
                &empty
            }
        };

        let id = self.id(path, "clue", obj.get("id"));
        let name = label(obj.get("name")).unwrap_or_else(|| "Unknown Clue".to_string());
        let kind = self.choice(
            &format!("{}.clueType", path),
            obj.get("clueType")
                .or_else(|| obj.get("clue_type"))
                .or_else(|| obj.get("type")),
            ClueKind::from_label,
        );
        let description =
            label(obj.get("description")).unwrap_or_else(|| DEFAULT_CLUE_DESCRIPTION.to_string());
        let relevance = match obj.get("relevance") {
            // Older generators emit `relevant: true|false`.
            None => match obj.get("relevant") {
                Some(Value::Bool(true)) => Relevance::High,
                Some(Value::Bool(false)) => Relevance::Low,
                _ => Relevance::default(),
            },
            raw => self.choice(&format!("{}.relevance", path), raw, Relevance::from_label),
        };
        let transform = self.transform(path, obj, Vec3::splat(DEFAULT_CLUE_SCALE));
        let color = self.color(&format!("{}.color", path), obj.get("color"), DEFAULT_CLUE_COLOR);

        Clue {
            id,
            name,
            kind,
            description,
            relevance,
            transform,
            color,
        }
    }

    fn zone_path(&mut self, path: &str, raw: &Value) -> Option<ZonePath> {
        let Some(obj) = raw.as_object() else {
            self.warn(ValidationWarning::Dropped {
                path: path.to_string(),
                reason: "not an object",
            });
            return None;
        };
        let from = label(obj.get("fromZoneId").or_else(|| obj.get("from")));
        let to = label(obj.get("toZoneId").or_else(|| obj.get("to")));
        let (Some(from_zone_id), Some(to_zone_id)) = (from, to) else {
            self.warn(ValidationWarning::Dropped {
                path: path.to_string(),
                reason: "missing endpoint",
            });
            return None;
        };
        let kind = self.choice(&format!("{}.type", path), obj.get("type"), PathKind::from_label);
        let width = number(obj.get("width")).filter(|w| *w > 0.0);
        Some(ZonePath {
            from_zone_id,
            to_zone_id,
            kind,
            width,
        })
    }

    fn spawn_points(&mut self, raw: Option<&Value>) -> SpawnPoints {
        let mut spawns = SpawnPoints::default();
        let Some(obj) = self.object("world.spawnPoints", raw) else {
            return spawns;
        };

        if let Some(player) = self.object("world.spawnPoints.player", obj.get("player")) {
            spawns.player = self.point("world.spawnPoints.player", player, Vec3::ZERO);
        }

        let limit = self.config.limits.max_npcs;
        match obj.get("npcs") {
            None | Some(Value::Null) => {}
            // id -> position mapping
            Some(Value::Object(map)) => {
                let entries: Vec<(&String, &Value)> = map.iter().collect();
                let entries = self.truncate("world.spawnPoints.npcs", entries, limit);
                for (id, pos) in entries {
                    let path = format!("world.spawnPoints.npcs.{}", id);
                    let npc = self.npc(&path, Some(id.as_str()), pos);
                    spawns.npcs.extend(npc);
                }
            }
            Some(Value::Array(list)) => {
                let list: Vec<&Value> = list.iter().collect();
                let list = self.truncate("world.spawnPoints.npcs", list, limit);
                for (i, raw) in list.into_iter().enumerate() {
                    let path = format!("world.spawnPoints.npcs[{}]", i);
                    let npc = self.npc(&path, None, raw);
                    spawns.npcs.extend(npc);
                }
            }
            Some(_) => self.defaulted("world.spawnPoints.npcs"),
        }
        spawns
    }

    fn npc(&mut self, path: &str, key: Option<&str>, raw: &Value) -> Option<NpcSpawn> {
        let Some(obj) = raw.as_object() else {
            self.warn(ValidationWarning::Dropped {
                path: path.to_string(),
                reason: "not an object",
            });
            return None;
        };
        let raw_id = key.map(|k| Value::String(k.to_string()));
        let id = self.id(path, "npc", raw_id.as_ref().or_else(|| obj.get("id")));
        let position = match obj.get("position").and_then(Value::as_object) {
            Some(pos) => self.point(&format!("{}.position", path), pos, Vec3::ZERO),
            None => self.point(path, obj, Vec3::ZERO),
        };
        let color = match obj.get("color") {
            None | Some(Value::Null) => None,
            raw => Some(self.color(&format!("{}.color", path), raw, "#f1c40f")),
        };
        Some(NpcSpawn {
            id,
            name: label(obj.get("name")),
            position,
            color,
        })
    }

    // ---------------------------------------------------------------------
    // Field helpers
    // ---------------------------------------------------------------------

    /// Read an optional list and cut it to `limit`. Non-arrays count as empty.
    fn list<'v>(&mut self, path: &str, raw: Option<&'v Value>, limit: usize) -> Vec<&'v Value> {
        match raw {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => self.truncate(path, items.iter().collect(), limit),
            Some(_) => {
                self.defaulted(path);
                Vec::new()
            }
        }
    }

    fn truncate<T>(&mut self, path: &str, mut items: Vec<T>, limit: usize) -> Vec<T> {
        if items.len() > limit {
            self.warn(ValidationWarning::Truncated {
                path: path.to_string(),
                found: items.len(),
                kept: limit,
            });
            items.truncate(limit);
        }
        items
    }

    fn object<'v>(&mut self, path: &str, raw: Option<&'v Value>) -> Option<&'v Map<String, Value>> {
        match raw {
            None | Some(Value::Null) => None,
            Some(Value::Object(obj)) => Some(obj),
            Some(_) => {
                self.defaulted(path);
                None
            }
        }
    }

    /// Parse an enum label, defaulting silently when absent and with a
    /// warning when present but unknown.
    fn choice<T: Default>(
        &mut self,
        path: &str,
        raw: Option<&Value>,
        parse: impl Fn(&str) -> Option<T>,
    ) -> T {
        match raw {
            None | Some(Value::Null) => T::default(),
            Some(Value::String(s)) if s.trim().is_empty() => T::default(),
            Some(Value::String(s)) => match parse(s.as_str()) {
                Some(v) => v,
                None => {
                    self.defaulted(path);
                    T::default()
                }
            },
            Some(_) => {
                self.defaulted(path);
                T::default()
            }
        }
    }

    fn id(&mut self, path: &str, kind: &str, raw: Option<&Value>) -> String {
        let base = match label(raw) {
            Some(id) => id,
            None => {
                let id = format!("{}_{}", kind, self.random_suffix());
                self.warn(ValidationWarning::GeneratedId {
                    path: path.to_string(),
                    id: id.clone(),
                });
                id
            }
        };
        if self.seen_ids.insert(base.clone()) {
            return base;
        }
        let mut n = 2;
        let renamed = loop {
            let candidate = format!("{}_{}", base, n);
            if self.seen_ids.insert(candidate.clone()) {
                break candidate;
            }
            n += 1;
        };
        self.warn(ValidationWarning::DuplicateId {
            path: path.to_string(),
            original: base,
            renamed: renamed.clone(),
        });
        renamed
    }

    fn random_suffix(&mut self) -> String {
        const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
        (0..9)
            .map(|_| ALPHABET[self.rng.gen_range(0..ALPHABET.len())] as char)
            .collect()
    }

    /// Size from a nested `size` object, or from flat fields on `obj`.
    fn entity_size(&mut self, path: &str, obj: &Map<String, Value>, default: Size) -> Size {
        match obj.get("size") {
            Some(Value::Object(size)) => self.size(&format!("{}.size", path), size, default),
            Some(Value::Null) | None => self.size(path, obj, default),
            Some(_) => {
                self.defaulted(&format!("{}.size", path));
                self.size(path, obj, default)
            }
        }
    }

    fn size(&mut self, path: &str, obj: &Map<String, Value>, default: Size) -> Size {
        Size {
            width: self.dimension(&format!("{}.width", path), obj.get("width"), default.width),
            depth: self.dimension(&format!("{}.depth", path), obj.get("depth"), default.depth),
            height: self.dimension(&format!("{}.height", path), obj.get("height"), default.height),
        }
    }

    /// A size component: missing or zero takes the default, anything else is
    /// clamped to `[1, max_world_size]`.
    fn dimension(&mut self, path: &str, raw: Option<&Value>, default: f64) -> f64 {
        match (raw, number(raw)) {
            (_, Some(v)) if v != 0.0 => {
                let clamped = v.clamp(1.0, self.config.limits.max_world_size);
                if clamped != v {
                    self.warn(ValidationWarning::Clamped {
                        path: path.to_string(),
                        from: v,
                        to: clamped,
                    });
                }
                clamped
            }
            (_, Some(_)) | (None, None) | (Some(Value::Null), None) => default,
            (Some(_), None) => {
                self.defaulted(path);
                default
            }
        }
    }

    /// A coordinate, clamped to `±max_world_size`.
    fn coordinate(&mut self, path: &str, raw: Option<&Value>, default: f64) -> f64 {
        match (raw, number(raw)) {
            (_, Some(v)) => {
                let bound = self.config.limits.max_world_size;
                let clamped = v.clamp(-bound, bound);
                if clamped != v {
                    self.warn(ValidationWarning::Clamped {
                        path: path.to_string(),
                        from: v,
                        to: clamped,
                    });
                }
                clamped
            }
            (None, None) | (Some(Value::Null), None) => default,
            (Some(_), None) => {
                self.defaulted(path);
                default
            }
        }
    }

    /// A point object. With a `y` key it is read as `{x, y, z}`; without,
    /// as the flat `{x, z}` form where `z` is depth.
    fn point(&mut self, path: &str, obj: &Map<String, Value>, default: Vec3) -> Vec3 {
        let x = self.coordinate(&format!("{}.x", path), obj.get("x"), default.x);
        if obj.contains_key("y") {
            Vec3 {
                x,
                y: self.coordinate(&format!("{}.y", path), obj.get("y"), default.y),
                z: self.coordinate(&format!("{}.z", path), obj.get("z"), default.z),
            }
        } else {
            Vec3 {
                x,
                y: self.coordinate(&format!("{}.z", path), obj.get("z"), default.y),
                z: default.z,
            }
        }
    }

    /// Position of a zone or room: a nested `position` point or flat `x`/`z`.
    fn placement(&mut self, path: &str, obj: &Map<String, Value>) -> Vec3 {
        match obj.get("position") {
            Some(Value::Object(pos)) => self.point(&format!("{}.position", path), pos, Vec3::ZERO),
            Some(Value::Null) | None => self.point(path, obj, Vec3::ZERO),
            Some(_) => {
                self.defaulted(&format!("{}.position", path));
                self.point(path, obj, Vec3::ZERO)
            }
        }
    }

    fn transform(&mut self, path: &str, obj: &Map<String, Value>, default_scale: Vec3) -> Transform {
        let (base, base_path) = match obj.get("transform") {
            Some(Value::Object(t)) => (t, format!("{}.transform", path)),
            Some(Value::Null) | None => (obj, path.to_string()),
            Some(_) => {
                self.defaulted(&format!("{}.transform", path));
                (obj, path.to_string())
            }
        };

        let position = match base.get("position") {
            Some(Value::Object(pos)) => {
                self.point(&format!("{}.position", base_path), pos, Vec3::ZERO)
            }
            _ => self.point(&base_path, base, Vec3::ZERO),
        };
        let rotation = number(base.get("rotation")).unwrap_or(0.0);
        let scale = match base.get("scale") {
            Some(Value::Object(s)) => Vec3 {
                x: number(s.get("x")).unwrap_or(default_scale.x),
                y: number(s.get("y")).unwrap_or(default_scale.y),
                z: number(s.get("z")).unwrap_or(default_scale.z),
            },
            raw => number(raw).map(Vec3::splat).unwrap_or(default_scale),
        };

        Transform {
            position,
            rotation,
            scale,
        }
    }

    fn color(&mut self, path: &str, raw: Option<&Value>, default: &str) -> String {
        match raw {
            None | Some(Value::Null) => default.to_string(),
            Some(Value::String(s)) if is_hex_color(s.trim()) => s.trim().to_string(),
            Some(_) => {
                self.defaulted(path);
                default.to_string()
            }
        }
    }
}

/// A finite number, or a string that parses as one.
fn number(raw: Option<&Value>) -> Option<f64> {
    let value = match raw? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    value.filter(|v| v.is_finite())
}

/// A non-empty string, or a number rendered as one.
fn label(raw: Option<&Value>) -> Option<String> {
    match raw? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn is_hex_color(s: &str) -> bool {
    let Some(hex) = s.strip_prefix('#') else {
        return false;
    };
    matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit())
}
