/// Uniform-grid spatial index over placed entities.
///
/// Entities are bucketed by the cell their origin falls in; nothing tracks
/// footprints spanning several cells. A cell is blocked when any entity in
/// it has a collider.
use rustc_hash::FxHashMap;

use super::nav::WalkabilityGrid;
use crate::schema::world::Vec3;

/// Anything that can be stored in a [`GridIndex`].
pub trait Occupant {
    /// Origin on the floor plane: `x` and `y` (depth) are used, `z` is ignored.
    fn origin(&self) -> Vec3;
    fn collider(&self) -> bool;
}

/// Integer cell coordinate `(x, z)`; `z` is the depth axis of the floor.
pub type Cell = (i64, i64);

#[derive(Debug, Clone)]
pub struct GridIndex<T> {
    width: usize,
    depth: usize,
    cell_size: f64,
    cells: FxHashMap<Cell, Vec<T>>,
    len: usize,
}

impl<T: Occupant> GridIndex<T> {
    /// An empty index declaring `width` × `depth` cells of side `cell_size`.
    /// Non-positive or non-finite cell sizes fall back to one world unit.
    pub fn new(width: usize, depth: usize, cell_size: f64) -> Self {
        let cell_size = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size
        } else {
            1.0
        };
        Self {
            width,
            depth,
            cell_size,
            cells: FxHashMap::default(),
            len: 0,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Number of recorded entities.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The cell containing a world-space point.
    pub fn to_cell(&self, x: f64, z: f64) -> Cell {
        (
            (x / self.cell_size).floor() as i64,
            (z / self.cell_size).floor() as i64,
        )
    }

    /// World-space center of a cell.
    pub fn cell_center(&self, cell: Cell) -> (f64, f64) {
        (
            (cell.0 as f64 + 0.5) * self.cell_size,
            (cell.1 as f64 + 0.5) * self.cell_size,
        )
    }

    /// Record `entity` under the cell of its origin. Entities outside the
    /// declared bounds are still recorded and queryable.
    pub fn add_entity(&mut self, entity: T) -> Cell {
        let origin = entity.origin();
        let cell = self.to_cell(origin.x, origin.y);
        self.cells.entry(cell).or_default().push(entity);
        self.len += 1;
        cell
    }

    pub fn is_blocked(&self, cell_x: i64, cell_z: i64) -> bool {
        self.cells
            .get(&(cell_x, cell_z))
            .is_some_and(|entities| entities.iter().any(Occupant::collider))
    }

    pub fn entities_at(&self, cell_x: i64, cell_z: i64) -> &[T] {
        self.cells
            .get(&(cell_x, cell_z))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Dense walkability over the declared bounds, one `is_blocked` query
    /// per cell.
    pub fn build_walkability_grid(&self) -> WalkabilityGrid {
        let mut walkable = vec![true; self.width * self.depth];
        for z in 0..self.depth {
            for x in 0..self.width {
                walkable[z * self.width + x] = !self.is_blocked(x as i64, z as i64);
            }
        }
        WalkabilityGrid::new(self.width, self.depth, walkable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Block {
        at: Vec3,
        solid: bool,
    }

    impl Occupant for Block {
        fn origin(&self) -> Vec3 {
            self.at
        }

        fn collider(&self) -> bool {
            self.solid
        }
    }

    fn block(x: f64, y: f64, solid: bool) -> Block {
        Block {
            at: Vec3::new(x, y, 0.0),
            solid,
        }
    }

    #[test]
    fn cells_floor_divide_by_cell_size() {
        let index: GridIndex<Block> = GridIndex::new(10, 10, 2.0);
        assert_eq!(index.to_cell(0.0, 0.0), (0, 0));
        assert_eq!(index.to_cell(3.9, 4.0), (1, 2));
        assert_eq!(index.to_cell(-0.5, 1.0), (-1, 0));
        assert_eq!(index.cell_center((1, 2)), (3.0, 5.0));
    }

    #[test]
    fn bad_cell_size_falls_back_to_one() {
        let index: GridIndex<Block> = GridIndex::new(4, 4, 0.0);
        assert_eq!(index.cell_size(), 1.0);
        let index: GridIndex<Block> = GridIndex::new(4, 4, f64::NAN);
        assert_eq!(index.cell_size(), 1.0);
    }

    #[test]
    fn blocked_iff_some_entity_in_cell_collides() {
        let mut index = GridIndex::new(10, 10, 1.0);
        index.add_entity(block(2.2, 3.7, false));
        assert!(!index.is_blocked(2, 3));
        assert_eq!(index.entities_at(2, 3).len(), 1);

        index.add_entity(block(2.9, 3.1, true));
        assert!(index.is_blocked(2, 3));
        assert_eq!(index.entities_at(2, 3).len(), 2);

        assert!(!index.is_blocked(3, 3));
        assert!(index.entities_at(3, 3).is_empty());
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn walkability_covers_declared_bounds() {
        let mut index = GridIndex::new(3, 2, 1.0);
        index.add_entity(block(1.0, 1.0, true));
        index.add_entity(block(50.0, 50.0, true));
        let grid = index.build_walkability_grid();
        assert_eq!((grid.width(), grid.depth()), (3, 2));
        assert!(!grid.is_walkable(1, 1));
        assert!(grid.is_walkable(0, 0));
        assert!(grid.is_walkable(2, 1));
        assert!(index.is_blocked(50, 50));
    }
}
