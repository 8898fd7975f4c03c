/// Grid ↔ screen coordinate transforms for a fixed 2:1 isometric projection.
///
/// All functions are pure. The inverse drops elevation: a projected point
/// alone cannot say how high it was.
use crate::schema::scene::Point2;

/// Width of one tile on screen, in pixels.
pub const TILE_SIZE: f64 = 32.0;
pub const ISO_SCALE: f64 = 1.0;
/// World units per grid cell. Layout sizes zones and rooms with this.
pub const GRID_UNIT: f64 = 1.0;

/// Project a grid position onto the screen. `z` lifts the point straight up.
pub fn to_projected(x: f64, y: f64, z: f64) -> Point2 {
    Point2 {
        x: (x - y) * TILE_SIZE * ISO_SCALE,
        y: (x + y) * TILE_SIZE * 0.5 * ISO_SCALE - z * TILE_SIZE,
    }
}

/// Recover the floor-plane grid position of a projected point, assuming
/// zero elevation.
pub fn from_projected(px: f64, py: f64) -> (f64, f64) {
    let half = py / (0.5 * TILE_SIZE * ISO_SCALE);
    let full = px / (TILE_SIZE * ISO_SCALE);
    ((half + full) / 2.0, (half - full) / 2.0)
}

/// Round `value` to the nearest multiple of `cell_size`.
pub fn snap_to_grid(value: f64, cell_size: f64) -> f64 {
    if cell_size <= 0.0 || !cell_size.is_finite() {
        return value;
    }
    (value / cell_size).round() * cell_size
}

/// Number of whole tiles needed to cover `world_value` pixels.
pub fn to_grid_units(world_value: f64) -> u32 {
    whole_cells(world_value / TILE_SIZE)
}

/// Number of whole grid cells needed to cover `world_value` world units.
pub fn to_cells(world_value: f64) -> u32 {
    whole_cells(world_value / GRID_UNIT)
}

fn whole_cells(ratio: f64) -> u32 {
    let cells = ratio.ceil();
    if cells.is_finite() && cells > 0.0 {
        cells.min(u32::MAX as f64) as u32
    } else {
        0
    }
}
