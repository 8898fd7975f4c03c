/// Flattening a scene graph into the placed objects the grid index stores.
use serde::{Deserialize, Serialize};

use super::grid::Occupant;
use crate::schema::asset::Asset;
use crate::schema::scene::{NodeKind, SceneGraph, SceneNode, SourceEntity};
use crate::schema::world::{Size, Vec3};

/// An object standing on the floor plane at its final grid position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedEntity {
    pub id: String,
    pub kind: NodeKind,
    pub name: String,
    pub position: Vec3,
    pub size: Size,
    pub rotation: f64,
    pub collider: bool,
    pub asset: Option<Asset>,
    /// Room the entity stands in, if any.
    pub room_id: Option<String>,
}

impl Occupant for PlacedEntity {
    fn origin(&self) -> Vec3 {
        self.position
    }

    fn collider(&self) -> bool {
        self.collider
    }
}

/// Collect every prop, clue and NPC node, in draw-layer order.
///
/// Zones, rooms, labels and the background are regions, not occupants, and
/// are skipped.
pub fn flatten(graph: &SceneGraph) -> Vec<PlacedEntity> {
    graph.iter_nodes().filter_map(placed).collect()
}

fn placed(node: &SceneNode) -> Option<PlacedEntity> {
    let (collider, rotation) = match (&node.kind, &node.source) {
        // A prop blocks only when both the document and its asset say so.
        (NodeKind::Prop, Some(SourceEntity::Prop(prop))) => (
            prop.collider && node.asset.as_ref().map_or(true, |a| a.collider),
            prop.transform.rotation,
        ),
        (NodeKind::Prop, _) => (node.asset.as_ref().is_some_and(|a| a.collider), 0.0),
        (NodeKind::Clue, Some(SourceEntity::Clue(clue))) => (false, clue.transform.rotation),
        (NodeKind::Clue, _) | (NodeKind::Npc, _) => (false, 0.0),
        (NodeKind::Background, _)
        | (NodeKind::Zone, _)
        | (NodeKind::Room, _)
        | (NodeKind::Label, _) => return None,
    };
    Some(PlacedEntity {
        id: node.id.clone(),
        kind: node.kind,
        name: node.name.clone(),
        position: node.grid_position,
        size: node.grid_size,
        rotation,
        collider,
        asset: node.asset.clone(),
        room_id: match node.kind {
            NodeKind::Npc => None,
            _ => node.parent_id.clone(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::assets::AssetRegistry;
    use crate::core::builder::WorldBuilder;
    use crate::core::config::PipelineConfig;
    use crate::core::validator::validate_document;
    use serde_json::json;

    fn entities(doc: serde_json::Value) -> Vec<PlacedEntity> {
        let config = PipelineConfig::default();
        let world = validate_document(&doc, &config).unwrap().value;
        let builder = WorldBuilder::new(&config, AssetRegistry::builtin());
        let mut graph = builder.build(&world);
        builder.place_npcs(&mut graph, &world.spawn_points);
        flatten(&graph)
    }

    #[test]
    fn only_occupants_are_flattened() {
        let placed = entities(json!({"world": {
            "zones": [{"id": "z", "rooms": [{"id": "r",
                "furniture": [{"id": "desk1", "name": "desk", "x": 1, "z": 1}],
                "clues": [{"id": "c1", "type": "note", "x": 2, "z": 2}]
            }]}],
            "spawnPoints": {"player": {"x": 0, "z": 0}, "npcs": [{"id": "maid", "x": 3, "z": 3}]}
        }}));
        let ids: Vec<&str> = placed.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["desk1", "c1", "maid"]);
        assert_eq!(placed[0].room_id.as_deref(), Some("r"));
        assert_eq!(placed[1].room_id.as_deref(), Some("r"));
        assert_eq!(placed[2].room_id, None);
    }

    #[test]
    fn colliders_follow_document_and_asset() {
        let placed = entities(json!({"world": {"zones": [{"rooms": [{
            "furniture": [
                {"id": "solid", "name": "bookshelf", "x": 1, "z": 1},
                {"id": "open", "name": "bookshelf", "x": 2, "z": 1, "collider": false},
                {"id": "rug", "name": "rug", "x": 3, "z": 1}
            ],
            "clues": [{"id": "knife", "type": "weapon", "x": 1, "z": 2}]
        }]}]}}));
        let collider = |id: &str| placed.iter().find(|e| e.id == id).unwrap().collider;
        assert!(collider("solid"));
        assert!(!collider("open"));
        assert!(!collider("rug"));
        assert!(!collider("knife"));
    }
}
