//! WASM bindings for scene-assembly, feeding the browser renderer.

use wasm_bindgen::prelude::*;

use scene_assembly::core::config::PipelineConfig;
use scene_assembly::core::fallback::fallback_document;
use scene_assembly::core::pipeline::{SceneBundle, ScenePipeline};
use scene_assembly::core::shape::check_shape;
use scene_assembly::schema::scene::SceneGraph;

// ---------------------------------------------------------------------------
// Embedded demo data, compiled into the WASM binary
// ---------------------------------------------------------------------------
mod data {
    pub const MANOR_WORLD: &str = include_str!("../../world_data/manor.json");
    pub const PIPELINE_CONFIG: &str = include_str!("../../world_data/pipeline.ron");
}

// ---------------------------------------------------------------------------
// JSON helper types for communication across the WASM boundary
// ---------------------------------------------------------------------------
#[derive(serde::Serialize)]
struct SceneOutput<'a> {
    graph: &'a SceneGraph,
    used_fallback: bool,
    rejection: Option<String>,
    warnings: Vec<String>,
    player: [f64; 2],
}

#[derive(serde::Serialize)]
struct LintOutput {
    valid: bool,
    reasons: Vec<String>,
}

// ---------------------------------------------------------------------------
// SceneDemo, the main exported struct
// ---------------------------------------------------------------------------
#[wasm_bindgen]
pub struct SceneDemo {
    pipeline: ScenePipeline,
    last: Option<SceneBundle>,
}

#[wasm_bindgen]
impl SceneDemo {
    /// Create a pipeline with the bundled demo config and the given seed.
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u64) -> Result<SceneDemo, JsError> {
        let config = PipelineConfig::parse_ron(data::PIPELINE_CONFIG)
            .map_err(|e| JsError::new(&format!("Config parse error: {e}")))?;
        let pipeline = ScenePipeline::builder()
            .config(config)
            .seed(seed)
            .build()
            .map_err(|e| JsError::new(&format!("Pipeline build error: {e}")))?;
        Ok(SceneDemo {
            pipeline,
            last: None,
        })
    }

    /// Build a scene from a world document given as a JSON string.
    ///
    /// Returns `{ graph, used_fallback, rejection, warnings, player }`. Only
    /// input that is not JSON at all is an error; anything else yields a
    /// scene, the canned one if the document was rejected.
    pub fn build_scene(&mut self, world_json: &str) -> Result<String, JsError> {
        let bundle = self
            .pipeline
            .run_str(world_json)
            .map_err(|e| JsError::new(&format!("Invalid world JSON: {e}")))?;
        let output = scene_output(&bundle)?;
        self.last = Some(bundle);
        Ok(output)
    }

    /// Build the bundled demo world.
    pub fn build_demo(&mut self) -> Result<String, JsError> {
        self.build_scene(data::MANOR_WORLD)
    }

    /// The canned fallback document, as JSON.
    pub fn fallback_world() -> String {
        fallback_document().to_string()
    }

    /// Shape-check a document without building it.
    pub fn lint(world_json: &str) -> Result<String, JsError> {
        let doc: serde_json::Value = serde_json::from_str(world_json)
            .map_err(|e| JsError::new(&format!("Invalid world JSON: {e}")))?;
        let report = check_shape(&doc);
        let output = LintOutput {
            valid: report.is_valid(),
            reasons: report.reasons(),
        };
        serde_json::to_string(&output)
            .map_err(|e| JsError::new(&format!("Serialization error: {e}")))
    }

    /// Whether a cell of the last built scene can be walked on.
    pub fn is_walkable(&self, cell_x: i64, cell_z: i64) -> bool {
        self.last
            .as_ref()
            .is_some_and(|b| b.walkability.is_walkable(cell_x, cell_z))
    }

    /// Path between two cells of the last built scene, as a JSON array of
    /// `[x, z]` pairs. Empty when there is no path or nothing was built.
    pub fn find_path(&self, from_x: i64, from_z: i64, to_x: i64, to_z: i64) -> String {
        let path = self
            .last
            .as_ref()
            .map(|b| b.find_path((from_x, from_z), (to_x, to_z)))
            .unwrap_or_default();
        serde_json::to_string(&path).unwrap_or_else(|_| "[]".to_string())
    }

    /// Ids of the nodes standing in a cell of the last built scene.
    pub fn entities_at(&self, cell_x: i64, cell_z: i64) -> String {
        let ids: Vec<&str> = self
            .last
            .as_ref()
            .map(|b| {
                b.index
                    .entities_at(cell_x, cell_z)
                    .iter()
                    .map(|e| e.id.as_str())
                    .collect()
            })
            .unwrap_or_default();
        serde_json::to_string(&ids).unwrap_or_else(|_| "[]".to_string())
    }
}

fn scene_output(bundle: &SceneBundle) -> Result<String, JsError> {
    let player = bundle.world.spawn_points.player;
    let output = SceneOutput {
        graph: &bundle.graph,
        used_fallback: bundle.used_fallback,
        rejection: bundle.rejection.as_ref().map(ToString::to_string),
        warnings: bundle.warnings.iter().map(ToString::to_string).collect(),
        player: [player.x, player.y],
    };
    serde_json::to_string(&output).map_err(|e| JsError::new(&format!("Serialization error: {e}")))
}
