pub mod asset;
pub mod scene;
pub mod world;
