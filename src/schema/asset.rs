/// Renderable asset definitions, looked up by normalized name.
use serde::{Deserialize, Serialize};

use super::world::Size;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetCategory {
    Furniture,
    Clue,
    Character,
    /// Only the registry's default entry carries this category.
    Unknown,
}

impl AssetCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Furniture => "furniture",
            Self::Clue => "clue",
            Self::Character => "character",
            Self::Unknown => "unknown",
        }
    }
}

/// A static visual/physical definition. Never mutated once registered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub category: AssetCategory,
    pub sprite: String,
    pub model_path: Option<String>,
    pub size: Size,
    pub collider: bool,
    /// Fallback color used when the renderer has no sprite or model.
    pub color: String,
}

impl Asset {
    pub fn new(
        category: AssetCategory,
        sprite: &str,
        model_path: Option<&str>,
        size: Size,
        collider: bool,
        color: &str,
    ) -> Self {
        Self {
            category,
            sprite: sprite.to_string(),
            model_path: model_path.map(str::to_string),
            size,
            collider,
            color: color.to_string(),
        }
    }
}
