/// The scene pipeline: raw document → validated world → scene graph →
/// grid index, in one pass.
///
/// Rendering and spatial queries are both fed from the same built graph so
/// the two views cannot drift apart.
use serde_json::Value;
use std::path::Path;

use crate::core::assembler::{flatten, PlacedEntity};
use crate::core::assets::AssetRegistry;
use crate::core::builder::WorldBuilder;
use crate::core::config::{ConfigError, PipelineConfig};
use crate::core::fallback::fallback_world;
use crate::core::grid::{Cell, GridIndex};
use crate::core::nav::WalkabilityGrid;
use crate::core::shape::check_shape;
use crate::core::validator::{validate_document, IngestError, Validated, ValidationWarning};
use crate::schema::scene::{NodeKind, SceneGraph};
use crate::schema::world::World;

/// Everything produced from one document.
#[derive(Debug)]
pub struct SceneBundle {
    pub world: World,
    pub graph: SceneGraph,
    pub entities: Vec<PlacedEntity>,
    pub index: GridIndex<PlacedEntity>,
    pub walkability: WalkabilityGrid,
    pub warnings: Vec<ValidationWarning>,
    /// Set when the input was rejected and the canned world was built instead.
    pub used_fallback: bool,
    /// Why the input was rejected, if it was.
    pub rejection: Option<IngestError>,
}

impl SceneBundle {
    /// Path between two cells, empty when the destination is blocked.
    ///
    /// Checks the index as well as the dense grid, so a blocker placed at a
    /// negative cell still answers "no path".
    pub fn find_path(&self, from: Cell, to: Cell) -> Vec<Cell> {
        if self.index.is_blocked(to.0, to.1) {
            return Vec::new();
        }
        self.walkability.find_path(from, to)
    }
}

/// Built via `ScenePipeline::builder()`.
#[derive(Debug, Clone)]
pub struct ScenePipeline {
    config: PipelineConfig,
    registry: AssetRegistry,
}

pub struct ScenePipelineBuilder {
    config: Option<PipelineConfig>,
    config_path: Option<String>,
    registry: Option<AssetRegistry>,
    seed: Option<u64>,
}

impl ScenePipeline {
    pub fn builder() -> ScenePipelineBuilder {
        ScenePipelineBuilder {
            config: None,
            config_path: None,
            registry: None,
            seed: None,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn registry(&self) -> &AssetRegistry {
        &self.registry
    }

    /// Build a scene from `doc`, or from the canned world if `doc` is
    /// rejected. Never fails.
    pub fn run(&self, doc: &Value) -> SceneBundle {
        match self.try_run(doc) {
            Ok(bundle) => bundle,
            Err(err) => {
                log::warn!("world document rejected, using fallback: {}", err);
                let mut bundle = self.assemble(fallback_world(&self.config));
                bundle.used_fallback = true;
                bundle.rejection = Some(err);
                bundle
            }
        }
    }

    /// Parse `input` as JSON and [`run`](Self::run) it. Fails only when the
    /// input is not JSON at all.
    pub fn run_str(&self, input: &str) -> Result<SceneBundle, IngestError> {
        let doc: Value = serde_json::from_str(input)?;
        Ok(self.run(&doc))
    }

    /// Build a scene from `doc` without substituting the fallback.
    ///
    /// A document failing the shape check is rejected only when
    /// `use_fallback_on_shape_error` is set; otherwise it is repaired field by
    /// field like any other.
    pub fn try_run(&self, doc: &Value) -> Result<SceneBundle, IngestError> {
        let report = check_shape(doc);
        if !report.is_valid() {
            if self.config.use_fallback_on_shape_error {
                return Err(IngestError::Shape(report));
            }
            log::debug!("shape check failed, repairing anyway: {}", report);
        }
        let validated = validate_document(doc, &self.config)?;
        Ok(self.assemble(validated))
    }

    fn assemble(&self, validated: Validated<World>) -> SceneBundle {
        let Validated {
            value: world,
            warnings,
        } = validated;

        let builder = WorldBuilder::new(&self.config, &self.registry);
        let mut graph = builder.build(&world);
        builder.place_npcs(&mut graph, &world.spawn_points);

        let entities = flatten(&graph);
        let (width, depth) = self.index_bounds(&world, &graph);
        let mut index = GridIndex::new(width, depth, self.config.grid_cell_size);
        for entity in &entities {
            index.add_entity(entity.clone());
        }
        let walkability = index.build_walkability_grid();

        log::debug!(
            "assembled scene: {} nodes, {} entities, {}x{} cells ({} blocked)",
            graph.node_count(),
            entities.len(),
            width,
            depth,
            walkability.blocked_count()
        );

        SceneBundle {
            world,
            graph,
            entities,
            index,
            walkability,
            warnings,
            used_fallback: false,
            rejection: None,
        }
    }

    /// Index bounds in cells: the declared world size, grown to cover
    /// every placed node. Rooms may overhang their zone and props their room.
    fn index_bounds(&self, world: &World, graph: &SceneGraph) -> (usize, usize) {
        let (mut width, mut depth) = (world.size.width, world.size.depth);
        for node in graph.iter_nodes() {
            if matches!(node.kind, NodeKind::Background | NodeKind::Label) {
                continue;
            }
            width = width.max(node.grid_position.x + node.grid_size.width);
            depth = depth.max(node.grid_position.y + node.grid_size.depth);
        }
        let cells = |units: f64| (units / self.config.grid_cell_size).ceil().max(0.0) as usize;
        (cells(width), cells(depth))
    }
}

impl ScenePipelineBuilder {
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Load the config from a RON file at build time. Ignored when a config
    /// is provided directly.
    pub fn config_file(mut self, path: &str) -> Self {
        self.config_path = Some(path.to_string());
        self
    }

    pub fn registry(mut self, registry: AssetRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Seed for generated ids. Overrides the config's seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn build(self) -> Result<ScenePipeline, ConfigError> {
        let mut config = match (self.config, self.config_path) {
            (Some(config), _) => config,
            (None, Some(path)) => PipelineConfig::load_from_ron(Path::new(&path))?,
            (None, None) => PipelineConfig::default(),
        };
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        config.check()?;

        Ok(ScenePipeline {
            config,
            registry: self
                .registry
                .unwrap_or_else(|| AssetRegistry::builtin().clone()),
        })
    }
}
