/// The canned world substituted when a generated document is rejected.
///
/// Written in the flat dialect a generator emits so it exercises the same
/// repair path as real input.
use serde_json::{json, Value};

use super::config::PipelineConfig;
use super::validator::{validate_world, Validated};
use crate::schema::world::World;

/// A small, known-good manor study with one clue and two NPCs.
pub fn fallback_document() -> Value {
    json!({
        "world": {
            "width": 20,
            "depth": 20,
            "zones": [{
                "id": "zone_main",
                "type": "indoor",
                "name": "Manor Hall",
                "x": 0, "z": 0,
                "width": 10, "depth": 10,
                "rooms": [{
                    "id": "room_study",
                    "name": "Study",
                    "width": 10, "depth": 10,
                    "x": 0, "z": 0,
                    "furniture": [
                        {"id": "desk", "name": "victorian_desk", "type": "furniture", "x": 2, "z": 2, "rotation": 0},
                        {"id": "shelf", "name": "bookshelf", "type": "furniture", "x": 8, "z": 2, "rotation": 1.57}
                    ],
                    "clues": [
                        {"id": "c1", "type": "note", "name": "Torn Letter", "description": "A torn letter", "x": 2.5, "z": 2.2}
                    ]
                }]
            }],
            "paths": [],
            "spawnPoints": {
                "player": {"x": 5, "z": 5},
                "npcs": [
                    {"id": "s1", "x": 3, "z": 3},
                    {"id": "s2", "x": 7, "z": 7}
                ]
            }
        }
    })
}

pub fn fallback_world(config: &PipelineConfig) -> Validated<World> {
    validate_world(&fallback_document()["world"], config)
}
