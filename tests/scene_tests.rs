/// Scene integration tests: validator, resolver, projection and builder used
/// together the way a renderer would drive them.
use scene_assembly::core::assets::AssetRegistry;
use scene_assembly::core::builder::WorldBuilder;
use scene_assembly::core::config::PipelineConfig;
use scene_assembly::core::projection::{from_projected, to_projected};
use scene_assembly::core::validator::{validate_document, validate_world};
use scene_assembly::schema::asset::AssetCategory;
use scene_assembly::schema::scene::{Layer, NodeKind, SceneGraph, BACKGROUND_ID};
use scene_assembly::schema::world::World;
use serde_json::{json, Value};

fn validate(doc: &Value) -> World {
    validate_document(doc, &PipelineConfig::default())
        .unwrap()
        .value
}

fn build(world: &World) -> SceneGraph {
    WorldBuilder::new(&PipelineConfig::default(), AssetRegistry::builtin()).build(world)
}

#[test]
fn single_room_study() {
    let world = validate(&json!({"world": {
        "width": 20, "depth": 20,
        "zones": [{
            "id": "zone_1", "name": "House", "type": "indoor",
            "size": {"width": 10, "depth": 10},
            "rooms": [{
                "id": "room_1", "name": "Study",
                "size": {"width": 8, "depth": 8},
                "props": [{
                    "id": "prop_1", "name": "bookshelf",
                    "transform": {"position": {"x": 1, "y": 1, "z": 0}}
                }],
                "clues": [{
                    "id": "clue_1", "clueType": "note",
                    "transform": {"position": {"x": 5, "y": 5, "z": 0}}
                }]
            }]
        }],
        "spawnPoints": {"player": {"x": 0, "z": 0}}
    }}));
    let graph = build(&world);

    assert_eq!(graph.layer(Layer::Background).nodes.len(), 1);
    assert_eq!(graph.layer(Layer::Terrain).nodes.len(), 1);
    assert_eq!(graph.layer(Layer::Structure).nodes.len(), 1);
    assert_eq!(graph.layer(Layer::Objects).nodes.len(), 1);
    assert_eq!(graph.layer(Layer::Objects).nodes[0].id, "clue_1");

    let room = graph.get("room_1").unwrap();
    assert_eq!(room.children.len(), 1);
    let prop = &room.children[0];
    assert_eq!(prop.id, "prop_1");
    assert_eq!(prop.kind, NodeKind::Prop);
    assert_eq!(prop.parent_id.as_deref(), Some("room_1"));
    assert_eq!(prop.asset.as_ref().unwrap().category, AssetCategory::Furniture);

    let clue = graph.get("clue_1").unwrap();
    assert_eq!(clue.grid_position.x - room.grid_position.x, 5.0);
    assert_eq!(clue.grid_position.y - room.grid_position.y, 5.0);
    assert_eq!(graph.node_count(), 5);
}

#[test]
fn empty_world_is_just_background() {
    let world = validate(&json!({"world": {"width": 0, "depth": 0, "zones": []}}));
    assert!(world.size.width >= 1.0);
    assert!(world.size.depth >= 1.0);

    let graph = build(&world);
    assert_eq!(graph.node_count(), 1);
    assert!(graph.contains(BACKGROUND_ID));
    for layer in [Layer::Terrain, Layer::Structure, Layer::Objects, Layer::Text] {
        assert!(graph.layer(layer).nodes.is_empty());
    }
}

#[test]
fn node_count_matches_entities() {
    let doc = json!({"world": {"zones": [
        {"rooms": [
            {"furniture": [{"name": "desk"}, {"name": "lamp"}], "clues": [{}, {}]},
            {"furniture": [{"name": "sofa"}]}
        ]},
        {"rooms": [{"clues": [{"type": "weapon"}]}]},
        {}
    ]}});
    let world = validate_world(&doc["world"], &PipelineConfig::default()).value;
    let counts = world.entity_counts();
    let graph = build(&world);

    assert_eq!(graph.layer(Layer::Terrain).nodes.len(), counts.zones);
    assert_eq!(
        graph.node_count(),
        1 + counts.zones + counts.rooms + counts.props + counts.clues
    );
    assert!(graph.is_index_consistent());
}

#[test]
fn zones_never_overlap_on_packing_axis() {
    let zones: Vec<Value> = (0..10)
        .map(|i| json!({"id": format!("z{}", i), "width": 1 + i * 7, "depth": 3}))
        .collect();
    let world = validate(&json!({"world": {"zones": zones}}));
    let graph = build(&world);
    let placed = &graph.layer(Layer::Terrain).nodes;
    assert_eq!(placed.len(), 10);
    for (i, a) in placed.iter().enumerate() {
        for b in &placed[i + 1..] {
            assert!(b.grid_position.x >= a.grid_position.x + a.grid_size.width);
        }
    }
}

#[test]
fn zone_children_are_found_across_layers() {
    let world = validate(&json!({"world": {"zones": [
        {"id": "z", "rooms": [{"id": "a", "clues": [{"id": "c"}]}, {"id": "b"}]}
    ]}}));
    let graph = build(&world);
    let rooms: Vec<&str> = graph.children_of("z").iter().map(|n| n.id.as_str()).collect();
    assert_eq!(rooms, vec!["a", "b"]);
    let in_a: Vec<&str> = graph.children_of("a").iter().map(|n| n.id.as_str()).collect();
    assert_eq!(in_a, vec!["c"]);
}

#[test]
fn resolver_defaults_and_aliases() {
    let registry = AssetRegistry::builtin();
    let default = registry.default_asset();
    assert_eq!(registry.resolve(""), default);
    assert_eq!(registry.resolve_optional(None), default);
    assert_eq!(registry.resolve("completely_unknown_xyz"), default);
    assert_eq!(registry.resolve("Round Tables"), registry.resolve("table"));
    assert_eq!(registry.resolve("antique round table"), registry.resolve("table"));
}

#[test]
fn projected_nodes_round_trip_on_the_floor() {
    let world = validate(&json!({"world": {"zones": [{"rooms": [{"id": "r"}]}]}}));
    let graph = build(&world);
    let zone = graph.layer(Layer::Terrain).nodes[0].clone();
    let p = zone.projected;
    let (x, y) = from_projected(p.x, p.y);
    assert!((x - zone.grid_position.x).abs() < 1e-9);
    assert!((y - zone.grid_position.y).abs() < 1e-9);

    // Rooms sit above the floor, so the inverse misses them.
    let room = graph.get("r").unwrap();
    let (rx, ry) = from_projected(room.projected.x, room.projected.y);
    assert!((rx - room.grid_position.x).abs() > 0.1 || (ry - room.grid_position.y).abs() > 0.1);

    let q = to_projected(3.25, -1.5, 0.0);
    let (qx, qy) = from_projected(q.x, q.y);
    assert!((qx - 3.25).abs() < 1e-9 && (qy + 1.5).abs() < 1e-9);
}
