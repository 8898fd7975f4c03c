/// Walkability grid and the path query built on it.
///
/// `find_path` is unfinished: it answers "no path" for a blocked destination
/// and otherwise returns a single hop to the destination, without searching
/// around obstacles. Callers must not treat a non-empty result as proof of
/// reachability.
use serde::{Deserialize, Serialize};

use super::grid::Cell;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkabilityGrid {
    width: usize,
    depth: usize,
    /// Row-major by depth: index `z * width + x`.
    walkable: Vec<bool>,
}

impl WalkabilityGrid {
    /// Build from a row-major cell list. Missing cells are walkable, extra
    /// cells are dropped.
    pub fn new(width: usize, depth: usize, mut walkable: Vec<bool>) -> Self {
        walkable.resize(width * depth, true);
        Self {
            width,
            depth,
            walkable,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn in_bounds(&self, x: i64, z: i64) -> bool {
        x >= 0 && z >= 0 && (x as usize) < self.width && (z as usize) < self.depth
    }

    /// Cells outside the grid are not walkable.
    pub fn is_walkable(&self, x: i64, z: i64) -> bool {
        self.in_bounds(x, z) && self.walkable[z as usize * self.width + x as usize]
    }

    pub fn blocked_count(&self) -> usize {
        self.walkable.iter().filter(|w| !**w).count()
    }

    /// Path from `from` to `to`, empty when there is none.
    ///
    /// Only the destination is checked. A destination outside the grid has
    /// no walkability data and is treated as open; `SceneBundle::find_path`
    /// also consults the index.
    pub fn find_path(&self, from: Cell, to: Cell) -> Vec<Cell> {
        if self.in_bounds(to.0, to.1) && !self.is_walkable(to.0, to.1) {
            return Vec::new();
        }
        if from == to {
            return vec![to];
        }
        vec![from, to]
    }

    /// One character per cell, `.` walkable and `#` blocked, one row per line.
    pub fn render_ascii(&self) -> String {
        let mut out = String::with_capacity((self.width + 1) * self.depth);
        for row in self.walkable.chunks(self.width.max(1)) {
            out.extend(row.iter().map(|w| if *w { '.' } else { '#' }));
            out.push('\n');
        }
        out
    }
}
