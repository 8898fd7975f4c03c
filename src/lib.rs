//! Scene Assembly: turns untrusted, generated world documents into
//! renderable scenes.
//!
//! Raw JSON is repaired into a closed [`schema::world::World`], laid out into
//! a layered [`schema::scene::SceneGraph`] with projected coordinates and
//! resolved assets, and indexed on a uniform grid for occupancy queries.

pub mod core;
pub mod schema;
