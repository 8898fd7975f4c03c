/// Strict shape check. Advisory, never mutates.
///
/// Answers one question: is this document close enough to the expected
/// shape to be worth repairing, or should the caller discard it and use the
/// canned fallback world? Reports every missing or wrong-typed required
/// field, up to a cap.
use serde_json::{Map, Value};
use std::fmt;

/// Stop collecting after this many violations.
const MAX_VIOLATIONS: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Problem {
    Missing,
    WrongType(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeViolation {
    pub path: String,
    pub problem: Problem,
}

impl fmt::Display for ShapeViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.problem {
            Problem::Missing => write!(f, "{}: missing", self.path),
            Problem::WrongType(expected) => write!(f, "{}: expected {}", self.path, expected),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShapeReport {
    pub violations: Vec<ShapeViolation>,
    /// Violations found past the cap and not recorded.
    pub omitted: usize,
}

impl ShapeReport {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// Human-readable reasons, one per violation.
    pub fn reasons(&self) -> Vec<String> {
        self.violations.iter().map(ToString::to_string).collect()
    }

    fn push(&mut self, path: impl Into<String>, problem: Problem) {
        if self.violations.len() < MAX_VIOLATIONS {
            self.violations.push(ShapeViolation {
                path: path.into(),
                problem,
            });
        } else {
            self.omitted += 1;
        }
    }
}

impl fmt::Display for ShapeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reasons = self.reasons();
        write!(f, "{}", reasons.join("; "))?;
        if self.omitted > 0 {
            write!(f, " (and {} more)", self.omitted)?;
        }
        Ok(())
    }
}

/// Check `doc` against the expected `{ world: { ... } }` shape.
///
/// Either input dialect passes: flat `x`/`z`/`width`/`depth` fields or the
/// nested `position`/`size` objects.
pub fn check_shape(doc: &Value) -> ShapeReport {
    let mut report = ShapeReport::default();
    let Some(root) = doc.as_object() else {
        report.push("$", Problem::WrongType("object"));
        return report;
    };
    let world = match root.get("world") {
        None => {
            report.push("world", Problem::Missing);
            return report;
        }
        Some(Value::Object(world)) => world,
        Some(_) => {
            report.push("world", Problem::WrongType("object"));
            return report;
        }
    };

    match world.get("size") {
        Some(Value::Object(size)) => dimensions(&mut report, "world.size", size),
        _ => dimensions(&mut report, "world", world),
    }

    match world.get("zones") {
        None => report.push("world.zones", Problem::Missing),
        Some(Value::Array(zones)) => {
            for (i, zone) in zones.iter().enumerate() {
                check_zone(&mut report, &format!("world.zones[{}]", i), zone);
            }
        }
        Some(_) => report.push("world.zones", Problem::WrongType("array")),
    }

    if let Some(paths) = optional_array(&mut report, "world.paths", world.get("paths")) {
        for (i, path) in paths.iter().enumerate() {
            let at = format!("world.paths[{}]", i);
            let Some(obj) = expect_object(&mut report, &at, path) else {
                continue;
            };
            either_string(&mut report, &at, obj, "from", "fromZoneId");
            either_string(&mut report, &at, obj, "to", "toZoneId");
            string(&mut report, &at, obj, "type");
        }
    }

    match world.get("spawnPoints") {
        None => report.push("world.spawnPoints", Problem::Missing),
        Some(Value::Object(spawns)) => check_spawns(&mut report, spawns),
        Some(_) => report.push("world.spawnPoints", Problem::WrongType("object")),
    }

    report
}

fn check_zone(report: &mut ShapeReport, at: &str, zone: &Value) {
    let Some(obj) = expect_object(report, at, zone) else {
        return;
    };
    string(report, at, obj, "id");
    string(report, at, obj, "name");
    string(report, at, obj, "type");
    position(report, at, obj);
    footprint(report, at, obj);

    if let Some(rooms) = optional_array(report, &format!("{}.rooms", at), obj.get("rooms")) {
        for (i, room) in rooms.iter().enumerate() {
            check_room(report, &format!("{}.rooms[{}]", at, i), room);
        }
    }
}

fn check_room(report: &mut ShapeReport, at: &str, room: &Value) {
    let Some(obj) = expect_object(report, at, room) else {
        return;
    };
    string(report, at, obj, "id");
    string(report, at, obj, "name");
    footprint(report, at, obj);
    optional_number(report, at, obj, "x");
    optional_number(report, at, obj, "z");

    let (key, props) = match obj.get("props") {
        Some(props) => ("props", Some(props)),
        None => ("furniture", obj.get("furniture")),
    };
    let props_at = format!("{}.{}", at, key);
    if let Some(props) = optional_array(report, &props_at, props) {
        for (i, prop) in props.iter().enumerate() {
            let at = format!("{}[{}]", props_at, i);
            let Some(prop) = expect_object(report, &at, prop) else {
                continue;
            };
            optional_string(report, &at, prop, "id");
            string(report, &at, prop, "name");
            placed(report, &at, prop);
            optional_number(report, &at, prop, "rotation");
        }
    }

    let clues_at = format!("{}.clues", at);
    if let Some(clues) = optional_array(report, &clues_at, obj.get("clues")) {
        for (i, clue) in clues.iter().enumerate() {
            let at = format!("{}[{}]", clues_at, i);
            let Some(clue) = expect_object(report, &at, clue) else {
                continue;
            };
            string(report, &at, clue, "id");
            either_string(report, &at, clue, "type", "clueType");
            optional_string(report, &at, clue, "description");
            placed(report, &at, clue);
        }
    }
}

fn check_spawns(report: &mut ShapeReport, spawns: &Map<String, Value>) {
    match spawns.get("player") {
        None => report.push("world.spawnPoints.player", Problem::Missing),
        Some(Value::Object(player)) => {
            number(report, "world.spawnPoints.player", player, "x");
            number(report, "world.spawnPoints.player", player, "z");
        }
        Some(_) => report.push("world.spawnPoints.player", Problem::WrongType("object")),
    }
    if let Some(npcs) = optional_array(report, "world.spawnPoints.npcs", spawns.get("npcs")) {
        for (i, npc) in npcs.iter().enumerate() {
            let at = format!("world.spawnPoints.npcs[{}]", i);
            let Some(npc) = expect_object(report, &at, npc) else {
                continue;
            };
            string(report, &at, npc, "id");
            number(report, &at, npc, "x");
            number(report, &at, npc, "z");
        }
    }
}

fn expect_object<'v>(
    report: &mut ShapeReport,
    at: &str,
    value: &'v Value,
) -> Option<&'v Map<String, Value>> {
    let obj = value.as_object();
    if obj.is_none() {
        report.push(at, Problem::WrongType("object"));
    }
    obj
}

fn optional_array<'v>(
    report: &mut ShapeReport,
    at: &str,
    value: Option<&'v Value>,
) -> Option<&'v Vec<Value>> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::Array(items)) => Some(items),
        Some(_) => {
            report.push(at, Problem::WrongType("array"));
            None
        }
    }
}

fn string(report: &mut ShapeReport, at: &str, obj: &Map<String, Value>, key: &str) {
    match obj.get(key) {
        None => report.push(format!("{}.{}", at, key), Problem::Missing),
        Some(Value::String(_)) => {}
        Some(_) => report.push(format!("{}.{}", at, key), Problem::WrongType("string")),
    }
}

fn optional_string(report: &mut ShapeReport, at: &str, obj: &Map<String, Value>, key: &str) {
    if obj.contains_key(key) {
        string(report, at, obj, key);
    }
}

fn either_string(report: &mut ShapeReport, at: &str, obj: &Map<String, Value>, a: &str, b: &str) {
    if obj.contains_key(b) && !obj.contains_key(a) {
        string(report, at, obj, b);
    } else {
        string(report, at, obj, a);
    }
}

fn number(report: &mut ShapeReport, at: &str, obj: &Map<String, Value>, key: &str) {
    match obj.get(key) {
        None => report.push(format!("{}.{}", at, key), Problem::Missing),
        Some(Value::Number(_)) => {}
        Some(_) => report.push(format!("{}.{}", at, key), Problem::WrongType("number")),
    }
}

fn optional_number(report: &mut ShapeReport, at: &str, obj: &Map<String, Value>, key: &str) {
    if obj.contains_key(key) {
        number(report, at, obj, key);
    }
}

/// `width` and `depth` numbers.
fn dimensions(report: &mut ShapeReport, at: &str, obj: &Map<String, Value>) {
    number(report, at, obj, "width");
    number(report, at, obj, "depth");
}

/// A nested `size` object or flat `width`/`depth`.
fn footprint(report: &mut ShapeReport, at: &str, obj: &Map<String, Value>) {
    match obj.get("size") {
        Some(Value::Object(size)) => dimensions(report, &format!("{}.size", at), size),
        _ => dimensions(report, at, obj),
    }
}

/// A nested `position` object or flat `x`/`z`.
fn position(report: &mut ShapeReport, at: &str, obj: &Map<String, Value>) {
    match obj.get("position") {
        Some(Value::Object(pos)) => {
            number(report, &format!("{}.position", at), pos, "x");
        }
        _ => {
            number(report, at, obj, "x");
            number(report, at, obj, "z");
        }
    }
}

/// Flat `x`/`z`, or a `transform.position` object.
fn placed(report: &mut ShapeReport, at: &str, obj: &Map<String, Value>) {
    let nested = obj
        .get("transform")
        .and_then(|t| t.get("position"))
        .and_then(Value::as_object);
    match nested {
        Some(pos) => number(report, &format!("{}.transform.position", at), pos, "x"),
        None => {
            number(report, at, obj, "x");
            number(report, at, obj, "z");
        }
    }
}
