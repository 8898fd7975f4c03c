/// Pipeline integration tests: fixture documents through to scene, index and
/// walkability.
use scene_assembly::core::config::PipelineConfig;
use scene_assembly::core::pipeline::{SceneBundle, ScenePipeline};
use scene_assembly::core::validator::ValidationWarning;
use scene_assembly::schema::asset::AssetCategory;
use scene_assembly::schema::scene::{Layer, NodeKind};
use scene_assembly::schema::world::{Tone, Vec3, Weather};
use serde_json::{json, Value};
use std::path::Path;

fn manor() -> Value {
    let text = std::fs::read_to_string("world_data/manor.json").unwrap();
    serde_json::from_str(&text).unwrap()
}

fn manor_bundle() -> SceneBundle {
    let pipeline = ScenePipeline::builder()
        .config_file("world_data/pipeline.ron")
        .build()
        .unwrap();
    pipeline.run(&manor())
}

#[test]
fn fixture_config_loads() {
    let config = PipelineConfig::load_from_ron(Path::new("world_data/pipeline.ron")).unwrap();
    assert_eq!(config.limits.max_zones, 4);
    assert_eq!(config.limits.max_clues_per_room, 50);
    assert_eq!(config.spacing.zone_padding, 2);
    assert_eq!(config.spacing.room_padding, 2);
    assert_eq!(config.seed, 7);
    assert!(config.zone_labels);
}

#[test]
fn manor_is_accepted_and_fully_built() {
    let bundle = manor_bundle();
    assert!(!bundle.used_fallback, "{:?}", bundle.rejection);

    let world = &bundle.world;
    assert_eq!(world.metadata.theme, "gothic");
    assert_eq!(world.metadata.tone, Tone::Spooky);
    assert_eq!(world.metadata.weather, Weather::Rain);
    assert_eq!(world.zones.len(), 2);
    assert_eq!(world.paths.len(), 1);

    let graph = &bundle.graph;
    assert_eq!(graph.layer(Layer::Background).nodes.len(), 1);
    assert_eq!(graph.layer(Layer::Terrain).nodes.len(), 2);
    assert_eq!(graph.layer(Layer::Structure).nodes.len(), 3);
    // 3 clues + 2 NPCs; props hang under their rooms.
    assert_eq!(graph.layer(Layer::Objects).nodes.len(), 5);
    assert_eq!(graph.layer(Layer::Text).nodes.len(), 2);
    assert_eq!(graph.nodes_of_kind(NodeKind::Prop).len(), 7);

    assert_eq!(graph.node_count(), graph.iter_nodes().count());
    assert!(graph.is_index_consistent());
    assert!(graph.width > 0.0 && graph.height > 0.0);
}

#[test]
fn manor_layout_packs_rooms_in_rows() {
    let bundle = manor_bundle();
    let pos = |id: &str| bundle.graph.get(id).unwrap().grid_position;

    assert_eq!(pos("zone_house"), Vec3::new(0.0, 0.0, 0.0));
    assert_eq!(pos("zone_garden"), Vec3::new(26.0, 0.0, 0.0));
    assert_eq!(pos("room_library"), Vec3::new(2.0, 2.0, 1.0));
    assert_eq!(pos("room_kitchen"), Vec3::new(12.0, 2.0, 1.0));
    // Kitchen is the deepest room in the first row (8).
    assert_eq!(pos("room_cellar"), Vec3::new(2.0, 12.0, 1.0));

    assert_eq!(pos("shelf_1"), Vec3::new(3.0, 3.0, 1.0));
    assert_eq!(pos("chair_1"), Vec3::new(13.0, 3.0, 1.0));
    assert_eq!(pos("chair_2"), Vec3::new(15.0, 3.0, 1.0));
    assert_eq!(pos("clue_knife"), Vec3::new(14.0, 8.0, 1.0));
}

#[test]
fn manor_assets_resolve_from_free_text() {
    let bundle = manor_bundle();
    let asset = |id: &str| bundle.graph.get(id).unwrap().asset.clone().unwrap();

    assert_eq!(asset("shelf_1").sprite, "bookshelf_v1");
    assert_eq!(asset("shelf_2").sprite, "bookshelf_v1");
    assert_eq!(asset("table_1").sprite, "table_v1");
    assert_eq!(asset("rug_1").sprite, "rug_v1");
    assert_eq!(asset("barrel_1").category, AssetCategory::Unknown);
    assert_eq!(asset("clue_stain").sprite, "stain_decal");
    assert_eq!(asset("npc_butler").category, AssetCategory::Character);
    assert_eq!(bundle.graph.get("npc_butler").unwrap().name, "Mr. Hale");
    assert_eq!(bundle.graph.get("npc_widow").unwrap().name, "npc_widow");
}

#[test]
fn manor_grid_matches_colliders() {
    let bundle = manor_bundle();
    let index = &bundle.index;
    assert_eq!((index.width(), index.depth()), (40, 30));
    assert_eq!(index.len(), bundle.entities.len());
    assert_eq!(bundle.entities.len(), 7 + 3 + 2);

    // Bookshelf and the rug share a cell; the bookshelf blocks it.
    assert_eq!(index.entities_at(3, 3).len(), 2);
    assert!(index.is_blocked(3, 3));
    // Unknown barrel falls back to a solid placeholder.
    assert!(index.is_blocked(4, 14));
    // Clues and NPCs never block.
    assert!(!index.is_blocked(14, 8));
    assert!(!index.is_blocked(6, 3));

    let walk = &bundle.walkability;
    assert!(!walk.is_walkable(3, 3));
    assert!(walk.is_walkable(0, 0));
    assert!(walk.find_path((0, 0), (3, 3)).is_empty());
    assert_eq!(walk.find_path((0, 0), (6, 3)), vec![(0, 0), (6, 3)]);
}

#[test]
fn every_clue_is_exposed_with_its_room() {
    let bundle = manor_bundle();
    let from_world: Vec<(&str, &str)> = bundle
        .world
        .clues()
        .map(|(_, room, clue)| (room, clue.id.as_str()))
        .collect();
    let from_graph: Vec<(&str, &str)> = bundle
        .graph
        .nodes_of_kind(NodeKind::Clue)
        .into_iter()
        .map(|n| (n.parent_id.as_deref().unwrap(), n.id.as_str()))
        .collect();
    assert_eq!(from_world, from_graph);
}

#[test]
fn rejected_document_uses_fallback_world() {
    let pipeline = ScenePipeline::builder().build().unwrap();
    let bundle = pipeline.run(&json!({"world": {"zones": [{"id": 5}]}}));
    assert!(bundle.used_fallback);
    assert!(bundle.rejection.is_some());
    assert_eq!(bundle.world.zones[0].name, "Manor Hall");
    assert_eq!(bundle.graph.get("desk").unwrap().asset.as_ref().unwrap().sprite, "desk_v1");
    assert!(bundle.graph.contains("s2"));
}

#[test]
fn text_input_runs_end_to_end() {
    let pipeline = ScenePipeline::builder().build().unwrap();
    let text = std::fs::read_to_string("world_data/manor.json").unwrap();
    let bundle = pipeline.run_str(&text).unwrap();
    assert!(!bundle.used_fallback);
    assert!(pipeline.run_str("world: nope").is_err());
}

#[test]
fn repeated_runs_are_identical() {
    let pipeline = ScenePipeline::builder().seed(99).build().unwrap();
    let doc = json!({"world": {"zones": [{"rooms": [{"furniture": [{"name": "desk"}], "clues": [{}]}]}]}});
    let lenient = PipelineConfig {
        use_fallback_on_shape_error: false,
        seed: 99,
        ..PipelineConfig::default()
    };
    let lenient = ScenePipeline::builder().config(lenient).build().unwrap();

    let a = lenient.run(&doc);
    let b = lenient.run(&doc);
    assert!(!a.used_fallback);
    assert_eq!(a.graph, b.graph);
    assert_eq!(a.entities, b.entities);
    assert!(a
        .warnings
        .iter()
        .any(|w| matches!(w, ValidationWarning::GeneratedId { .. })));

    // The strict pipeline rejects the same document.
    assert!(pipeline.run(&doc).used_fallback);
}

#[test]
fn scene_serializes_for_the_renderer() {
    let bundle = manor_bundle();
    let text = serde_json::to_string(&bundle.graph).unwrap();
    let value: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["layers"][0]["id"], "layer_bg");
    assert_eq!(value["layers"][3]["nodes"][0]["kind"], "clue");
}
