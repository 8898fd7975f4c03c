/// Renderer-facing scene graph: five fixed layers of placed nodes plus a flat
/// id lookup.
///
/// Nodes are owned by the tree (a layer list or a parent's `children`). The
/// lookup map therefore stores a [`NodePath`] rather than a second copy of
/// the node; [`SceneGraph::get`] follows it.
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::asset::Asset;
use super::world::{Clue, NpcSpawn, Prop, Room, Size, Vec3, Zone};

/// Id of the single background node. Reserved: entity ids never take it.
pub const BACKGROUND_ID: &str = "world_bg";

/// A projected 2D display coordinate, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

/// The fixed render layers, in draw order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    Background,
    Terrain,
    Structure,
    Objects,
    Text,
}

impl Layer {
    pub const ALL: [Layer; 5] = [
        Layer::Background,
        Layer::Terrain,
        Layer::Structure,
        Layer::Objects,
        Layer::Text,
    ];

    pub fn index(&self) -> usize {
        match self {
            Self::Background => 0,
            Self::Terrain => 1,
            Self::Structure => 2,
            Self::Objects => 3,
            Self::Text => 4,
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            Self::Background => "layer_bg",
            Self::Terrain => "layer_terrain",
            Self::Structure => "layer_struct",
            Self::Objects => "layer_obj",
            Self::Text => "layer_text",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Background => "Background",
            Self::Terrain => "Terrain",
            Self::Structure => "Structure",
            Self::Objects => "Objects",
            Self::Text => "Text",
        }
    }

    fn draw_order(&self) -> i32 {
        match self {
            Self::Background => 0,
            Self::Terrain => 10,
            Self::Structure => 20,
            Self::Objects => 30,
            Self::Text => 100,
        }
    }
}

/// What a node represents. Every render or query site matches on this
/// exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Background,
    Zone,
    Room,
    Prop,
    Clue,
    Npc,
    Label,
}

impl NodeKind {
    /// The layer a node of this kind is drawn in.
    pub fn layer(&self) -> Layer {
        match self {
            Self::Background => Layer::Background,
            Self::Zone => Layer::Terrain,
            Self::Room => Layer::Structure,
            Self::Prop | Self::Clue | Self::Npc => Layer::Objects,
            Self::Label => Layer::Text,
        }
    }
}

/// Sort key for drawing. Compares by layer first, then by depth within the
/// layer; nodes further back have a smaller depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DrawOrder {
    pub layer: Layer,
    pub depth: i64,
}

/// Depth is stored in hundredths of a grid cell so fractional positions
/// still sort.
const DEPTH_PRECISION: f64 = 100.0;

impl DrawOrder {
    pub fn flat(layer: Layer) -> Self {
        Self { layer, depth: 0 }
    }

    /// Draw order for a node at `grid`. Only the objects layer is depth-sorted.
    pub fn at(layer: Layer, grid: Vec3) -> Self {
        let depth = match layer {
            Layer::Objects => ((grid.x + grid.y) * DEPTH_PRECISION).round() as i64,
            Layer::Background | Layer::Terrain | Layer::Structure | Layer::Text => 0,
        };
        Self { layer, depth }
    }
}

/// The source entity a node was built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "entity", rename_all = "lowercase")]
pub enum SourceEntity {
    /// Zone header, rooms stripped.
    Zone(Zone),
    /// Room header, props and clues stripped.
    Room(Room),
    Prop(Prop),
    Clue(Clue),
    Npc(NpcSpawn),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneNode {
    pub id: String,
    pub kind: NodeKind,
    pub name: String,
    pub grid_position: Vec3,
    pub grid_size: Size,
    pub projected: Point2,
    pub draw_order: DrawOrder,
    pub color: String,
    pub visible: bool,
    pub children: Vec<SceneNode>,
    /// Non-owning back reference, resolved through the graph's lookup map.
    pub parent_id: Option<String>,
    pub asset: Option<Asset>,
    pub source: Option<SourceEntity>,
}

impl SceneNode {
    /// Count this node and all of its descendants.
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(SceneNode::subtree_len).sum::<usize>()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneLayer {
    pub id: String,
    pub name: String,
    pub nodes: Vec<SceneNode>,
    pub draw_order: i32,
    pub visible: bool,
}

impl SceneLayer {
    fn new(layer: Layer) -> Self {
        Self {
            id: layer.id().to_string(),
            name: layer.name().to_string(),
            nodes: Vec::new(),
            draw_order: layer.draw_order(),
            visible: true,
        }
    }
}

/// Location of a node inside the graph: its layer, its index in that
/// layer's list, then one index per level of `children`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodePath {
    pub layer: Layer,
    pub indices: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneGraph {
    /// Approximate projected extent in pixels.
    pub width: f64,
    pub height: f64,
    layers: [SceneLayer; 5],
    node_map: FxHashMap<String, NodePath>,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    pub fn new() -> Self {
        Self {
            width: 0.0,
            height: 0.0,
            layers: Layer::ALL.map(SceneLayer::new),
            node_map: FxHashMap::default(),
        }
    }

    pub fn layer(&self, layer: Layer) -> &SceneLayer {
        &self.layers[layer.index()]
    }

    /// Layers in draw order.
    pub fn layers(&self) -> impl Iterator<Item = &SceneLayer> {
        self.layers.iter()
    }

    pub fn set_layer_visible(&mut self, layer: Layer, visible: bool) {
        self.layers[layer.index()].visible = visible;
    }

    /// Number of nodes in the lookup map.
    pub fn node_count(&self) -> usize {
        self.node_map.len()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.node_map.contains_key(id)
    }

    pub fn path_of(&self, id: &str) -> Option<&NodePath> {
        self.node_map.get(id)
    }

    pub fn get(&self, id: &str) -> Option<&SceneNode> {
        let path = self.node_map.get(id)?;
        let (first, rest) = path.indices.split_first()?;
        let mut node = self.layers[path.layer.index()].nodes.get(*first)?;
        for &i in rest {
            node = node.children.get(i)?;
        }
        Some(node)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut SceneNode> {
        let path = self.node_map.get(id)?;
        let (first, rest) = path.indices.split_first()?;
        let mut node = self.layers[path.layer.index()].nodes.get_mut(*first)?;
        for &i in rest {
            node = node.children.get_mut(i)?;
        }
        Some(node)
    }

    /// Append a top-level node to the layer its kind belongs to.
    ///
    /// Returns `None` and leaves the graph untouched if the id is taken.
    pub fn insert_root(&mut self, node: SceneNode) -> Option<NodePath> {
        if self.node_map.contains_key(&node.id) {
            log::warn!("scene already contains node '{}', skipping", node.id);
            return None;
        }
        let layer = node.kind.layer();
        let nodes = &mut self.layers[layer.index()].nodes;
        let path = NodePath {
            layer,
            indices: vec![nodes.len()],
        };
        self.node_map.insert(node.id.clone(), path.clone());
        nodes.push(node);
        Some(path)
    }

    /// Append `node` under the node with id `parent_id` and set its back
    /// reference. Returns `None` if the parent is missing or the id is taken.
    pub fn insert_child(&mut self, parent_id: &str, mut node: SceneNode) -> Option<NodePath> {
        if self.node_map.contains_key(&node.id) {
            log::warn!("scene already contains node '{}', skipping", node.id);
            return None;
        }
        let mut path = self.node_map.get(parent_id)?.clone();
        node.parent_id = Some(parent_id.to_string());
        let id = node.id.clone();
        let parent = self.get_mut(parent_id)?;
        path.indices.push(parent.children.len());
        parent.children.push(node);
        self.node_map.insert(id, path.clone());
        Some(path)
    }

    /// Every node in the graph, depth-first, layers in draw order.
    pub fn iter_nodes(&self) -> impl Iterator<Item = &SceneNode> {
        let mut out = Vec::new();
        for layer in &self.layers {
            for node in &layer.nodes {
                collect_depth_first(node, &mut out);
            }
        }
        out.into_iter()
    }

    /// All nodes whose parent is `id`, whether nested under it or placed in
    /// a different layer.
    pub fn children_of(&self, id: &str) -> Vec<&SceneNode> {
        self.iter_nodes()
            .filter(|n| n.parent_id.as_deref() == Some(id))
            .collect()
    }

    pub fn nodes_of_kind(&self, kind: NodeKind) -> Vec<&SceneNode> {
        self.iter_nodes().filter(|n| n.kind == kind).collect()
    }

    /// True when the lookup map and the tree describe exactly the same nodes.
    pub fn is_index_consistent(&self) -> bool {
        let mut seen = 0usize;
        for node in self.iter_nodes() {
            match self.get(&node.id) {
                Some(found) if std::ptr::eq(found, node) => seen += 1,
                _ => return false,
            }
        }
        seen == self.node_map.len()
    }
}

fn collect_depth_first<'a>(node: &'a SceneNode, out: &mut Vec<&'a SceneNode>) {
    out.push(node);
    for child in &node.children {
        collect_depth_first(child, out);
    }
}
