//! Frame-coherent spatial grid for proximity queries (§4.2).

use crate::types::EntityId;
use std::collections::HashMap;

/// Packs a signed cell coordinate pair into a single hashable key.
///
/// Coordinates are offset by a large constant before packing so that
/// negative cell indices (entities with negative world coordinates)
/// still produce distinct, non-overlapping keys.
fn cell_key(cx: i64, cy: i64) -> i64 {
    const OFFSET: i64 = 1 << 20;
    (cx + OFFSET) * (1 << 21) + (cy + OFFSET)
}

fn cell_of(x: f64, y: f64, cell_size: f64) -> (i64, i64) {
    ((x / cell_size).floor() as i64, (y / cell_size).floor() as i64)
}

/// Instrumentation counters, observable but semantically inert.
#[derive(Debug, Clone, Copy, Default)]
pub struct GridStats {
    /// Total `insert` calls.
    pub total_inserts: u64,
    /// `update` calls that skipped a rebuild due to frame coherence.
    pub skipped_inserts: u64,
    /// `update` calls that moved an entity between cells.
    pub rebuilds: u64,
}

/// A fixed-cell-size spatial index over entity positions.
///
/// Every live entity appears in exactly one cell. `update` exploits
/// frame-to-frame coherence: if an entity's displacement is small and it
/// hasn't crossed a cell boundary, no bookkeeping is touched.
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    cell_size: f64,
    cells: HashMap<i64, Vec<EntityId>>,
    entity_cell: HashMap<EntityId, i64>,
    stats: GridStats,
}

impl SpatialGrid {
    /// Creates an empty grid with the given cell size.
    #[must_use]
    pub fn new(cell_size: f64) -> Self {
        SpatialGrid {
            cell_size: cell_size.max(1.0),
            cells: HashMap::new(),
            entity_cell: HashMap::new(),
            stats: GridStats::default(),
        }
    }

    /// Current instrumentation counters.
    #[must_use]
    pub fn stats(&self) -> GridStats {
        self.stats
    }

    /// Inserts an entity at `(x, y)` for the first time.
    pub fn insert(&mut self, entity: EntityId, x: f64, y: f64) {
        let (cx, cy) = cell_of(x, y, self.cell_size);
        let key = cell_key(cx, cy);
        self.cells.entry(key).or_default().push(entity);
        self.entity_cell.insert(entity, key);
        self.stats.total_inserts += 1;
    }

    /// Removes an entity entirely.
    pub fn remove(&mut self, entity: EntityId) {
        if let Some(key) = self.entity_cell.remove(&entity) {
            if let Some(bucket) = self.cells.get_mut(&key) {
                if let Some(pos) = bucket.iter().position(|e| *e == entity) {
                    bucket.swap_remove(pos);
                }
            }
        }
    }

    /// Updates an entity's position, given where it was last frame.
    ///
    /// If the new cell matches the old cell and the squared displacement
    /// is below `(cell_size / 2)^2`, nothing is touched (frame coherence).
    pub fn update(&mut self, entity: EntityId, old_x: f64, old_y: f64, new_x: f64, new_y: f64) {
        let (old_cx, old_cy) = cell_of(old_x, old_y, self.cell_size);
        let (new_cx, new_cy) = cell_of(new_x, new_y, self.cell_size);
        let dx = new_x - old_x;
        let dy = new_y - old_y;
        let displacement_sq = dx * dx + dy * dy;
        let half_cell_sq = (self.cell_size / 2.0).powi(2);

        if old_cx == new_cx && old_cy == new_cy && displacement_sq < half_cell_sq {
            self.stats.skipped_inserts += 1;
            return;
        }

        self.remove(entity);
        self.insert(entity, new_x, new_y);
        self.stats.rebuilds += 1;
    }

    /// Returns every entity within `r` of `(x, y)`, excluding `exclude` if given.
    #[must_use]
    pub fn query(
        &self,
        x: f64,
        y: f64,
        r: f64,
        positions: &HashMap<EntityId, (f64, f64)>,
        exclude: Option<EntityId>,
    ) -> Vec<EntityId> {
        let (min_cx, min_cy) = cell_of(x - r, y - r, self.cell_size);
        let (max_cx, max_cy) = cell_of(x + r, y + r, self.cell_size);
        let r_sq = r * r;
        let mut found = Vec::new();

        for cx in min_cx..=max_cx {
            for cy in min_cy..=max_cy {
                let key = cell_key(cx, cy);
                let Some(bucket) = self.cells.get(&key) else {
                    continue;
                };
                for &entity in bucket {
                    if Some(entity) == exclude {
                        continue;
                    }
                    let Some(&(ex, ey)) = positions.get(&entity) else {
                        continue;
                    };
                    let dx = ex - x;
                    let dy = ey - y;
                    if dx * dx + dy * dy <= r_sq {
                        found.push(entity);
                    }
                }
            }
        }
        found
    }

    /// True iff `entity` is currently indexed at all.
    #[must_use]
    pub fn contains(&self, entity: EntityId) -> bool {
        self.entity_cell.contains_key(&entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_then_query_finds_self() {
        let mut grid = SpatialGrid::new(160.0);
        let e = EntityId::new();
        grid.insert(e, 100.0, 100.0);
        let mut positions = HashMap::new();
        positions.insert(e, (100.0, 100.0));
        let found = grid.query(100.0, 100.0, 0.0, &positions, None);
        assert!(found.contains(&e));
    }

    #[test]
    fn update_skips_insert_for_small_intra_cell_displacement() {
        let mut grid = SpatialGrid::new(160.0);
        let e = EntityId::new();
        grid.insert(e, 10.0, 10.0);
        grid.update(e, 10.0, 10.0, 11.0, 10.0);
        assert_eq!(grid.stats().skipped_inserts, 1);
        assert_eq!(grid.stats().rebuilds, 0);
    }

    #[test]
    fn update_rebuilds_on_cell_crossing() {
        let mut grid = SpatialGrid::new(160.0);
        let e = EntityId::new();
        grid.insert(e, 10.0, 10.0);
        grid.update(e, 10.0, 10.0, 200.0, 10.0);
        assert_eq!(grid.stats().rebuilds, 1);
        assert!(grid.contains(e));
    }

    #[test]
    fn query_excludes_requested_entity() {
        let mut grid = SpatialGrid::new(160.0);
        let a = EntityId::new();
        let b = EntityId::new();
        grid.insert(a, 0.0, 0.0);
        grid.insert(b, 1.0, 1.0);
        let mut positions = HashMap::new();
        positions.insert(a, (0.0, 0.0));
        positions.insert(b, (1.0, 1.0));
        let found = grid.query(0.0, 0.0, 10.0, &positions, Some(a));
        assert!(!found.contains(&a));
        assert!(found.contains(&b));
    }

    #[test]
    fn negative_coordinates_are_indexed_correctly() {
        let mut grid = SpatialGrid::new(160.0);
        let e = EntityId::new();
        grid.insert(e, -500.0, -500.0);
        let mut positions = HashMap::new();
        positions.insert(e, (-500.0, -500.0));
        let found = grid.query(-500.0, -500.0, 1.0, &positions, None);
        assert!(found.contains(&e));
    }

    #[test]
    fn remove_clears_membership() {
        let mut grid = SpatialGrid::new(160.0);
        let e = EntityId::new();
        grid.insert(e, 0.0, 0.0);
        grid.remove(e);
        assert!(!grid.contains(e));
    }
}
