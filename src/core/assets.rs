/// Asset registry. Maps free-form generated labels to renderable definitions.
///
/// Resolution is a heuristic: normalize, try the alias table, retry with the
/// last word, look up the registry, fall back to the default entry. A wrong
/// but plausible match is accepted; a miss is never an error.
use rustc_hash::FxHashMap;
use std::sync::OnceLock;

use super::cache::BoundedCache;
use crate::schema::asset::{Asset, AssetCategory};
use crate::schema::world::Size;

/// Registry of asset definitions plus an alias table of synonyms and plurals.
#[derive(Debug, Clone)]
pub struct AssetRegistry {
    assets: FxHashMap<String, Asset>,
    aliases: FxHashMap<String, String>,
    default: Asset,
}

impl AssetRegistry {
    /// An empty registry that resolves everything to `default`.
    pub fn new(default: Asset) -> Self {
        Self {
            assets: FxHashMap::default(),
            aliases: FxHashMap::default(),
            default,
        }
    }

    /// The built-in registry, initialised once and shared read-only.
    pub fn builtin() -> &'static AssetRegistry {
        static BUILTIN: OnceLock<AssetRegistry> = OnceLock::new();
        BUILTIN.get_or_init(build_builtin)
    }

    /// Register an asset under a canonical key. The normalized key is also
    /// added as an alias of itself.
    pub fn register(&mut self, key: &str, asset: Asset) {
        self.aliases.insert(normalize(key), key.to_string());
        self.assets.insert(key.to_string(), asset);
    }

    /// Map a normalized phrase to a canonical key.
    pub fn alias(&mut self, phrase: &str, key: &str) {
        self.aliases.insert(normalize(phrase), key.to_string());
    }

    pub fn get(&self, key: &str) -> Option<&Asset> {
        self.assets.get(key)
    }

    pub fn default_asset(&self) -> &Asset {
        &self.default
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// The canonical key an alias lookup produces for `label`, if any.
    pub fn canonical_key(&self, label: &str) -> Option<&str> {
        let normalized = normalize(label);
        self.alias_for(&normalized)
    }

    fn alias_for(&self, normalized: &str) -> Option<&str> {
        if let Some(key) = self.aliases.get(normalized) {
            return Some(key.as_str());
        }
        let last = normalized.split_whitespace().last()?;
        self.aliases.get(last).map(String::as_str)
    }

    /// Resolve a label to an asset. Total: unknown or empty labels yield the
    /// default asset.
    pub fn resolve(&self, label: &str) -> &Asset {
        let normalized = normalize(label);
        if normalized.is_empty() {
            return &self.default;
        }
        let key = self.alias_for(&normalized).unwrap_or(normalized.as_str());
        self.assets.get(key).unwrap_or(&self.default)
    }

    pub fn resolve_optional(&self, label: Option<&str>) -> &Asset {
        label.map_or(&self.default, |l| self.resolve(l))
    }
}

/// Lowercase, treat `_` and `-` as word breaks, strip other punctuation,
/// collapse runs of whitespace and trim.
pub fn normalize(label: &str) -> String {
    let cleaned: String = label
        .to_lowercase()
        .chars()
        .filter_map(|c| match c {
            '_' | '-' => Some(' '),
            c if c.is_alphanumeric() || c.is_whitespace() => Some(c),
            _ => None,
        })
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Per-session memo of label resolutions, bounded by capacity.
pub struct CachedResolver<'a> {
    registry: &'a AssetRegistry,
    cache: BoundedCache<String, Asset>,
}

impl<'a> CachedResolver<'a> {
    pub fn new(registry: &'a AssetRegistry, capacity: usize) -> Self {
        Self {
            registry,
            cache: BoundedCache::new(capacity),
        }
    }

    pub fn resolve(&mut self, label: &str) -> Asset {
        let registry = self.registry;
        self.cache
            .get_or_insert_with(label.to_string(), || registry.resolve(label).clone())
            .clone()
    }

    pub fn stats(&self) -> (u64, u64) {
        self.cache.stats()
    }
}

fn build_builtin() -> AssetRegistry {
    use AssetCategory::{Character, Clue, Furniture, Unknown};

    let mut registry = AssetRegistry::new(Asset::new(
        Unknown,
        "error_cube",
        None,
        Size::new(1.0, 1.0, 1.0),
        true,
        "#FF00FF",
    ));

    let entries = [
        ("desk", Furniture, "desk_v1", Some("/models/tabledesk.glb"), Size::new(2.0, 1.0, 1.0), true, "#8B4513"),
        ("tabledesk", Furniture, "table_v1", Some("/models/tabledesk.glb"), Size::new(2.0, 2.0, 1.0), true, "#8B4513"),
        ("chair", Furniture, "chair_v1", Some("/models/chair.glb"), Size::new(1.0, 1.0, 1.0), true, "#5D4037"),
        ("bookshelf", Furniture, "bookshelf_v1", Some("/models/bookshelf.glb"), Size::new(1.0, 0.5, 2.0), true, "#5D4037"),
        ("cabinet", Furniture, "cabinet_v1", Some("/models/cabinet.glb"), Size::new(1.0, 1.0, 2.0), true, "#4A3B2C"),
        ("bed", Furniture, "bed_v1", Some("/models/bed.glb"), Size::new(2.0, 2.0, 1.0), true, "#333333"),
        ("lamp", Furniture, "lamp_v1", Some("/models/lamp.glb"), Size::new(0.5, 0.5, 1.5), true, "#FFD700"),
        ("sofa", Furniture, "sofa_v1", Some("/models/lounge_sofa.glb"), Size::new(2.0, 1.0, 1.0), true, "#550000"),
        ("rug", Furniture, "rug_v1", Some("/models/rug.glb"), Size::new(2.0, 2.0, 0.1), false, "#660000"),
        ("magnifying_glass", Clue, "magnifying_glass", Some("/models/magnifying_glass.glb"), Size::new(0.5, 0.5, 0.1), false, "#C0C0C0"),
        ("bottle", Clue, "bottle", Some("/models/old_bottle.glb"), Size::new(0.3, 0.3, 0.5), false, "#00FF00"),
        ("weapon", Clue, "weapon", Some("/models/revolver.glb"), Size::new(0.5, 0.5, 0.2), false, "#333333"),
        ("note", Clue, "note_paper", None, Size::new(0.4, 0.3, 0.05), false, "#F5F5DC"),
        ("stain", Clue, "stain_decal", None, Size::new(0.6, 0.6, 0.01), false, "#7A0000"),
        ("character", Character, "character_v1", None, Size::new(0.8, 0.8, 1.8), true, "#F1C40F"),
    ];
    for (key, category, sprite, model, size, collider, color) in entries {
        registry.register(key, Asset::new(category, sprite, model, size, collider, color));
    }

    let aliases = [
        ("table", "tabledesk"),
        ("tables", "tabledesk"),
        ("desks", "desk"),
        ("market table", "desk"),
        ("bar counter", "desk"),
        ("bar", "desk"),
        ("counter", "desk"),
        ("workbench", "desk"),
        ("chairs", "chair"),
        ("stool", "chair"),
        ("armchair", "chair"),
        ("sofas", "sofa"),
        ("couch", "sofa"),
        ("settee", "sofa"),
        ("bookshelves", "bookshelf"),
        ("bookcase", "bookshelf"),
        ("shelf", "bookshelf"),
        ("shelves", "bookshelf"),
        ("cabinets", "cabinet"),
        ("cupboard", "cabinet"),
        ("wardrobe", "cabinet"),
        ("beds", "bed"),
        ("lamps", "lamp"),
        ("lantern", "lamp"),
        ("rugs", "rug"),
        ("carpet", "rug"),
        ("magnifier", "magnifying_glass"),
        ("fingerprint", "magnifying_glass"),
        ("fingerprints", "magnifying_glass"),
        ("bottles", "bottle"),
        ("vial", "bottle"),
        ("flask", "bottle"),
        ("revolver", "weapon"),
        ("pistol", "weapon"),
        ("gun", "weapon"),
        ("knife", "weapon"),
        ("dagger", "weapon"),
        ("notes", "note"),
        ("letter", "note"),
        ("diary", "note"),
        ("paper", "note"),
        ("blood", "stain"),
        ("footprint", "stain"),
        ("footprints", "stain"),
        ("npc", "character"),
        ("person", "character"),
        ("suspect", "character"),
    ];
    for (phrase, key) in aliases {
        registry.alias(phrase, key);
    }

    registry
}
