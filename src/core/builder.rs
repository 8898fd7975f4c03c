/// World builder: lays a validated world out on the grid and emits the
/// layered scene graph.
///
/// Layout is deterministic and deliberately simple:
/// - zones run left to right along x, each offset by the previous zone's
///   width plus `zone_padding`; no 2D bin-packing, so many small zones waste
///   space rather than wrapping;
/// - rooms are shelf-packed inside their zone: left to right, wrapping to a
///   new row (below the deepest room of the current row) when the next room
///   would cross the zone's right edge. Rooms are not re-packed and are not
///   checked to fit inside the zone's depth;
/// - props with no explicit position are scattered column-then-row; clues
///   always use their explicit position.
use super::assets::{AssetRegistry, CachedResolver};
use super::config::PipelineConfig;
use super::palette;
use super::projection::{to_cells, to_projected, TILE_SIZE};
use crate::schema::scene::{
    DrawOrder, Layer, NodeKind, SceneGraph, SceneNode, SourceEntity, BACKGROUND_ID,
};
use crate::schema::world::{Clue, Prop, Room, Size, SpawnPoints, Vec3, World, Zone};

/// Side length of the background canvas, in grid cells.
const BACKGROUND_EXTENT: f64 = 1000.0;
/// Elevation of room floors above their zone.
const ROOM_ELEVATION: f64 = 1.0;

pub struct WorldBuilder<'a> {
    config: &'a PipelineConfig,
    registry: &'a AssetRegistry,
}

/// Far corner of everything placed so far, in grid units.
#[derive(Debug, Default, Clone, Copy)]
struct Extent {
    x: f64,
    y: f64,
}

impl Extent {
    fn include(&mut self, position: Vec3, size: Size) {
        self.x = self.x.max(position.x + size.width);
        self.y = self.y.max(position.y + size.depth);
    }
}

impl<'a> WorldBuilder<'a> {
    pub fn new(config: &'a PipelineConfig, registry: &'a AssetRegistry) -> Self {
        Self { config, registry }
    }

    /// Build the scene graph for `world`. Never fails for a validated world.
    pub fn build(&self, world: &World) -> SceneGraph {
        let mut graph = SceneGraph::new();
        let mut assets = CachedResolver::new(self.registry, self.config.asset_cache_capacity);
        let mut extent = Extent::default();

        graph.insert_root(background_node());

        let mut cursor_x = 0.0;
        for zone in &world.zones {
            let width = self.place_zone(&mut graph, &mut assets, &mut extent, zone, cursor_x);
            cursor_x += width + f64::from(self.config.spacing.zone_padding);
        }

        if self.config.zone_labels {
            for zone in &world.zones {
                if let Some(label) = label_node(&graph, world, zone) {
                    graph.insert_root(label);
                }
            }
        }

        // Bounding box of the laid-out floor plane, projected.
        graph.width = (extent.x + extent.y) * TILE_SIZE;
        graph.height = (extent.x + extent.y) * TILE_SIZE * 0.5;

        let (hits, misses) = assets.stats();
        log::debug!(
            "built scene: {} nodes, {} asset lookups ({} cached)",
            graph.node_count(),
            hits + misses,
            hits
        );
        graph
    }

    /// Add an objects-layer node for every NPC spawn point.
    pub fn place_npcs(&self, graph: &mut SceneGraph, spawns: &SpawnPoints) {
        let character = self.registry.resolve("character");
        for npc in &spawns.npcs {
            let grid_position = Vec3::new(npc.position.x, npc.position.y, 0.0);
            let node = SceneNode {
                id: npc.id.clone(),
                kind: NodeKind::Npc,
                name: npc.name.clone().unwrap_or_else(|| npc.id.clone()),
                grid_position,
                grid_size: Size::new(1.0, 1.0, 2.0),
                projected: project(grid_position),
                draw_order: DrawOrder::at(Layer::Objects, grid_position),
                color: npc.color.clone().unwrap_or_else(|| palette::NPC.to_string()),
                visible: true,
                children: Vec::new(),
                parent_id: None,
                asset: Some(character.clone()),
                source: Some(SourceEntity::Npc(npc.clone())),
            };
            graph.insert_root(node);
        }
    }

    /// Place one zone and its contents with its left edge at `start_x`.
    /// Returns the zone's width in grid units.
    fn place_zone(
        &self,
        graph: &mut SceneGraph,
        assets: &mut CachedResolver<'_>,
        extent: &mut Extent,
        zone: &Zone,
        start_x: f64,
    ) -> f64 {
        let size = Size::flat(grid_units(zone.size.width), grid_units(zone.size.depth));
        let position = Vec3::new(start_x, 0.0, 0.0);
        extent.include(position, size);

        let node = SceneNode {
            id: zone.id.clone(),
            kind: NodeKind::Zone,
            name: zone.name.clone(),
            grid_position: position,
            grid_size: size,
            projected: project(position),
            draw_order: DrawOrder::flat(Layer::Terrain),
            color: palette::zone_color(zone.kind).to_string(),
            visible: true,
            children: Vec::new(),
            parent_id: None,
            asset: None,
            source: Some(SourceEntity::Zone(zone.header())),
        };
        graph.insert_root(node);

        let padding = f64::from(self.config.spacing.room_padding);
        let row_start = position.x + padding;
        let right_edge = position.x + size.width;
        let mut cursor_x = row_start;
        let mut cursor_y = position.y + padding;
        let mut row_depth: f64 = 0.0;

        for room in &zone.rooms {
            let room_size = Size::flat(grid_units(room.size.width), grid_units(room.size.depth));
            if cursor_x > row_start && cursor_x + room_size.width > right_edge {
                cursor_x = row_start;
                cursor_y += row_depth + padding;
                row_depth = 0.0;
            }

            let room_position = Vec3::new(cursor_x, cursor_y, ROOM_ELEVATION);
            extent.include(room_position, room_size);
            self.place_room(graph, assets, zone, room, room_position, room_size);

            row_depth = row_depth.max(room_size.depth);
            cursor_x += room_size.width + padding;
        }

        size.width
    }

    fn place_room(
        &self,
        graph: &mut SceneGraph,
        assets: &mut CachedResolver<'_>,
        zone: &Zone,
        room: &Room,
        position: Vec3,
        size: Size,
    ) {
        let node = SceneNode {
            id: room.id.clone(),
            kind: NodeKind::Room,
            name: room.name.clone(),
            grid_position: position,
            grid_size: size,
            projected: project(position),
            draw_order: DrawOrder::flat(Layer::Structure),
            color: palette::ROOM_FLOOR.to_string(),
            visible: true,
            children: Vec::new(),
            parent_id: Some(zone.id.clone()),
            asset: None,
            source: Some(SourceEntity::Room(room.header())),
        };
        if graph.insert_root(node).is_none() {
            return;
        }

        let step = f64::from(self.config.spacing.prop_step);
        let mut offset_x = 1.0;
        let mut offset_y = 1.0;
        for prop in &room.props {
            let explicit = prop.transform.position;
            let (rel_x, rel_y) = if explicit.x == 0.0 && explicit.y == 0.0 {
                let slot = (offset_x, offset_y);
                offset_x += step;
                if offset_x >= size.width - 1.0 {
                    offset_x = 1.0;
                    offset_y += step;
                }
                slot
            } else {
                (explicit.x, explicit.y)
            };
            let grid_position = Vec3::new(position.x + rel_x, position.y + rel_y, position.z);
            graph.insert_child(&room.id, prop_node(assets, prop, grid_position));
        }

        for clue in &room.clues {
            let rel = clue.transform.position;
            let grid_position = Vec3::new(position.x + rel.x, position.y + rel.y, position.z);
            let mut node = clue_node(assets, clue, grid_position);
            node.parent_id = Some(room.id.clone());
            graph.insert_root(node);
        }
    }
}

fn grid_units(value: f64) -> f64 {
    f64::from(to_cells(value).max(1))
}

fn project(position: Vec3) -> crate::schema::scene::Point2 {
    to_projected(position.x, position.y, position.z)
}

fn scaled(scale: Vec3) -> Size {
    Size::new(scale.x.abs(), scale.y.abs(), scale.z.abs())
}

fn background_node() -> SceneNode {
    let position = Vec3::new(0.0, 0.0, -1.0);
    SceneNode {
        id: BACKGROUND_ID.to_string(),
        kind: NodeKind::Background,
        name: "World Background".to_string(),
        grid_position: position,
        grid_size: Size::new(BACKGROUND_EXTENT, BACKGROUND_EXTENT, 0.0),
        projected: Default::default(),
        draw_order: DrawOrder::flat(Layer::Background),
        color: palette::BACKGROUND.to_string(),
        visible: true,
        children: Vec::new(),
        parent_id: None,
        asset: None,
        source: None,
    }
}

fn prop_node(assets: &mut CachedResolver<'_>, prop: &Prop, grid_position: Vec3) -> SceneNode {
    SceneNode {
        id: prop.id.clone(),
        kind: NodeKind::Prop,
        name: prop.name.clone(),
        grid_position,
        grid_size: scaled(prop.transform.scale),
        projected: project(grid_position),
        draw_order: DrawOrder::at(Layer::Objects, grid_position),
        color: palette::prop_color(prop.kind).to_string(),
        visible: true,
        children: Vec::new(),
        parent_id: None,
        asset: Some(assets.resolve(&prop.name)),
        source: Some(SourceEntity::Prop(prop.clone())),
    }
}

fn clue_node(assets: &mut CachedResolver<'_>, clue: &Clue, grid_position: Vec3) -> SceneNode {
    SceneNode {
        id: clue.id.clone(),
        kind: NodeKind::Clue,
        name: clue.name.clone(),
        grid_position,
        grid_size: scaled(clue.transform.scale),
        projected: project(grid_position),
        draw_order: DrawOrder::at(Layer::Objects, grid_position),
        color: clue.color.clone(),
        visible: true,
        children: Vec::new(),
        parent_id: None,
        asset: Some(assets.resolve(clue.kind.tag())),
        source: Some(SourceEntity::Clue(clue.clone())),
    }
}

/// A text-layer label floating above a placed zone.
fn label_node(graph: &SceneGraph, world: &World, zone: &Zone) -> Option<SceneNode> {
    let placed = graph.get(&zone.id)?;
    let position = Vec3::new(placed.grid_position.x, placed.grid_position.y, 2.0);
    Some(SceneNode {
        id: label_id(graph, world, &zone.id),
        kind: NodeKind::Label,
        name: zone.name.clone(),
        grid_position: position,
        grid_size: Size::new(placed.grid_size.width, 1.0, 0.0),
        projected: project(position),
        draw_order: DrawOrder::flat(Layer::Text),
        color: palette::LABEL.to_string(),
        visible: true,
        children: Vec::new(),
        parent_id: Some(zone.id.clone()),
        asset: None,
        source: None,
    })
}

/// `label_<zone>`, suffixed until it clashes with no placed node and no NPC
/// still to be placed.
fn label_id(graph: &SceneGraph, world: &World, zone_id: &str) -> String {
    let base = format!("label_{}", zone_id);
    let taken = |id: &str| graph.contains(id) || world.spawn_points.npcs.iter().any(|n| n.id == id);
    if !taken(&base) {
        return base;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{}_{}", base, n);
        if !taken(&candidate) {
            log::debug!("label id '{}' is taken, using '{}'", base, candidate);
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::validator::validate_document;
    use crate::schema::asset::AssetCategory;
    use serde_json::json;

    fn build(doc: serde_json::Value) -> SceneGraph {
        let config = PipelineConfig::default();
        let world = validate_document(&doc, &config).unwrap().value;
        WorldBuilder::new(&config, AssetRegistry::builtin()).build(&world)
    }

    #[test]
    fn empty_world_has_only_background() {
        let graph = build(json!({"world": {"width": 0, "depth": 0, "zones": []}}));
        assert_eq!(graph.layer(Layer::Background).nodes.len(), 1);
        assert!(graph.layer(Layer::Terrain).nodes.is_empty());
        assert!(graph.layer(Layer::Structure).nodes.is_empty());
        assert!(graph.layer(Layer::Objects).nodes.is_empty());
        assert!(graph.layer(Layer::Text).nodes.is_empty());
        assert_eq!(graph.node_count(), 1);
        assert!(graph.contains(BACKGROUND_ID));
    }

    #[test]
    fn zones_pack_left_to_right_without_overlap() {
        let graph = build(json!({"world": {"zones": [
            {"id": "a", "width": 12, "depth": 5},
            {"id": "b", "width": 3.5, "depth": 5},
            {"id": "c", "width": 40, "depth": 5}
        ]}}));
        let zones = &graph.layer(Layer::Terrain).nodes;
        assert_eq!(zones.len(), 3);
        assert_eq!(zones[0].grid_position.x, 0.0);
        assert_eq!(zones[1].grid_position.x, 16.0);
        assert_eq!(zones[1].grid_size.width, 4.0);
        assert_eq!(zones[2].grid_position.x, 24.0);
        for pair in zones.windows(2) {
            assert!(pair[1].grid_position.x >= pair[0].grid_position.x + pair[0].grid_size.width);
        }
    }

    #[test]
    fn rooms_wrap_below_deepest_room_of_row() {
        let graph = build(json!({"world": {"zones": [{"id": "z", "width": 20, "depth": 40, "rooms": [
            {"id": "r1", "width": 6, "depth": 3},
            {"id": "r2", "width": 6, "depth": 7},
            {"id": "r3", "width": 6, "depth": 2}
        ]}]}}));
        let r1 = graph.get("r1").unwrap().grid_position;
        let r2 = graph.get("r2").unwrap().grid_position;
        let r3 = graph.get("r3").unwrap().grid_position;
        assert_eq!((r1.x, r1.y), (2.0, 2.0));
        assert_eq!((r2.x, r2.y), (10.0, 2.0));
        // 18 + 6 > 20, so r3 starts a new row below r2 (depth 7) plus padding.
        assert_eq!((r3.x, r3.y), (2.0, 11.0));
        assert_eq!(r1.z, ROOM_ELEVATION);
    }

    #[test]
    fn oversized_first_room_does_not_open_an_empty_row() {
        let graph = build(json!({"world": {"zones": [{"id": "z", "width": 10, "rooms": [
            {"id": "big", "width": 30, "depth": 4}
        ]}]}}));
        let big = graph.get("big").unwrap().grid_position;
        assert_eq!((big.x, big.y), (2.0, 2.0));
    }

    #[test]
    fn props_scatter_unless_positioned() {
        let graph = build(json!({"world": {"zones": [{"id": "z", "width": 30, "rooms": [
            {"id": "r", "width": 6, "depth": 6, "furniture": [
                {"id": "a", "name": "chair"},
                {"id": "b", "name": "chair"},
                {"id": "c", "name": "chair"},
                {"id": "d", "name": "lamp", "x": 4, "z": 1}
            ]}
        ]}]}}));
        let room = graph.get("r").unwrap();
        let origin = room.grid_position;
        let rel = |id: &str| {
            let p = graph.get(id).unwrap().grid_position;
            (p.x - origin.x, p.y - origin.y)
        };
        assert_eq!(rel("a"), (1.0, 1.0));
        // offset 5 >= width - 1, so the third scattered prop wraps
        assert_eq!(rel("b"), (3.0, 1.0));
        assert_eq!(rel("c"), (1.0, 3.0));
        assert_eq!(rel("d"), (4.0, 1.0));
        assert_eq!(room.children.len(), 4);
    }

    #[test]
    fn clues_draw_in_objects_layer_with_room_parent() {
        let graph = build(json!({"world": {"zones": [{"id": "z", "rooms": [
            {"id": "r", "clues": [{"id": "c", "type": "weapon", "x": 2, "z": 3}]}
        ]}]}}));
        let clue = graph.get("c").unwrap();
        assert_eq!(clue.kind, NodeKind::Clue);
        assert_eq!(clue.parent_id.as_deref(), Some("r"));
        assert_eq!(graph.path_of("c").unwrap().layer, Layer::Objects);
        assert_eq!(clue.asset.as_ref().unwrap().category, AssetCategory::Clue);
        assert_eq!(clue.grid_size, Size::new(0.5, 0.5, 0.5));
        assert!(graph.is_index_consistent());
    }

    #[test]
    fn objects_sort_back_to_front() {
        let graph = build(json!({"world": {"zones": [{"id": "z", "width": 30, "rooms": [
            {"id": "r", "width": 10, "depth": 10, "clues": [
                {"id": "front", "x": 6, "z": 6},
                {"id": "back", "x": 1, "z": 1}
            ]}
        ]}]}}));
        let front = graph.get("front").unwrap().draw_order;
        let back = graph.get("back").unwrap().draw_order;
        let room = graph.get("r").unwrap().draw_order;
        assert!(back < front);
        assert!(room < back);
    }

    #[test]
    fn projected_position_matches_transform() {
        let graph = build(json!({"world": {"zones": [{"id": "z", "rooms": [{"id": "r"}]}]}}));
        let room = graph.get("r").unwrap();
        let p = room.grid_position;
        assert_eq!(room.projected, to_projected(p.x, p.y, p.z));
    }

    #[test]
    fn labels_and_npcs_are_opt_in_steps() {
        let config = PipelineConfig {
            zone_labels: true,
            ..PipelineConfig::default()
        };
        let doc = json!({"world": {
            "zones": [{"id": "z", "name": "Garden"}],
            "spawnPoints": {"player": {"x": 0, "z": 0}, "npcs": [{"id": "butler", "x": 2, "z": 3}]}
        }});
        let world = validate_document(&doc, &config).unwrap().value;
        let builder = WorldBuilder::new(&config, AssetRegistry::builtin());
        let mut graph = builder.build(&world);
        assert_eq!(graph.layer(Layer::Text).nodes[0].name, "Garden");
        assert!(graph.get("butler").is_none());

        builder.place_npcs(&mut graph, &world.spawn_points);
        let npc = graph.get("butler").unwrap();
        assert_eq!(npc.kind, NodeKind::Npc);
        assert_eq!(npc.asset.as_ref().unwrap().category, AssetCategory::Character);
        assert_eq!(npc.grid_position, Vec3::new(2.0, 3.0, 0.0));
        assert!(graph.is_index_consistent());
    }

    #[test]
    fn labels_never_take_an_entity_id() {
        let config = PipelineConfig {
            zone_labels: true,
            ..PipelineConfig::default()
        };
        let doc = json!({"world": {
            "zones": [{"id": "hall", "name": "Hall", "rooms": [{"id": "label_hall_2"}]}],
            "spawnPoints": {"player": {"x": 0, "z": 0}, "npcs": [{"id": "label_hall", "x": 1, "z": 1}]}
        }});
        let world = validate_document(&doc, &config).unwrap().value;
        let builder = WorldBuilder::new(&config, AssetRegistry::builtin());
        let mut graph = builder.build(&world);
        builder.place_npcs(&mut graph, &world.spawn_points);

        assert_eq!(graph.get("label_hall").unwrap().kind, NodeKind::Npc);
        assert_eq!(graph.get("label_hall_2").unwrap().kind, NodeKind::Room);
        let label = graph.get("label_hall_3").unwrap();
        assert_eq!(label.kind, NodeKind::Label);
        assert_eq!(label.name, "Hall");
        assert!(graph.is_index_consistent());
    }

    #[test]
    fn build_is_deterministic() {
        let doc = json!({"world": {"zones": [{"rooms": [{"props": [{"name": "desk"}], "clues": [{}]}]}]}});
        let a = build(doc.clone());
        let b = build(doc);
        assert_eq!(a, b);
    }
}
