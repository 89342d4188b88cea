//! Bucketed grid spatial index for effect-vs-actor overlap queries.

use std::collections::BTreeMap;

use crate::geometry::{Aabb, Vec2};
use crate::ids::EffectId;

type CellKey = (i32, i32);

/// A uniform grid over world space, bucketing effect AABBs by cell.
///
/// Capacity-guarded: once a cell holds `max_per_cell` entries, further
/// inserts into that cell are refused rather than growing unbounded — this
/// is the spec's "capacity-guarded inserts", surfaced to callers as a
/// capacity error rather than silently dropped.
pub struct SpatialIndex {
    cell_size: f32,
    max_per_cell: usize,
    cells: BTreeMap<CellKey, Vec<EffectId>>,
    bounds: BTreeMap<EffectId, Aabb>,
}

impl SpatialIndex {
    pub fn new(cell_size: f32, max_per_cell: usize) -> Self {
        Self {
            cell_size: cell_size.max(1.0),
            max_per_cell,
            cells: BTreeMap::new(),
            bounds: BTreeMap::new(),
        }
    }

    fn cell_of(&self, point: Vec2) -> CellKey {
        ((point.x / self.cell_size).floor() as i32, (point.y / self.cell_size).floor() as i32)
    }

    fn cells_for(&self, aabb: &Aabb) -> impl Iterator<Item = CellKey> + use<> {
        let min = self.cell_of(aabb.min());
        let max = self.cell_of(aabb.max());
        (min.0..=max.0).flat_map(move |x| (min.1..=max.1).map(move |y| (x, y)))
    }

    /// Registers `id` at `aabb`. Returns `false` (refusing the insert) if any
    /// covered cell is already at capacity.
    pub fn insert(&mut self, id: EffectId, aabb: Aabb) -> bool {
        let keys: Vec<CellKey> = self.cells_for(&aabb).collect();
        if keys.iter().any(|k| self.cells.get(k).map(|v| v.len()) >= Some(self.max_per_cell)) {
            return false;
        }
        for key in &keys {
            self.cells.entry(*key).or_default().push(id);
        }
        self.bounds.insert(id, aabb);
        true
    }

    /// Removes `id` from the index. Idempotent: removing an absent id is a
    /// no-op, matching "deregistered exactly once" (a second call is a no-op,
    /// not a double-free).
    pub fn remove(&mut self, id: EffectId) {
        let Some(aabb) = self.bounds.remove(&id) else { return };
        for key in self.cells_for(&aabb) {
            if let Some(bucket) = self.cells.get_mut(&key) {
                bucket.retain(|&existing| existing != id);
                if bucket.is_empty() {
                    self.cells.remove(&key);
                }
            }
        }
    }

    /// Re-registers `id` at a new position, used every tick an effect moves
    /// (e.g. a projectile advancing).
    pub fn update(&mut self, id: EffectId, new_aabb: Aabb) -> bool {
        self.remove(id);
        self.insert(id, new_aabb)
    }

    pub fn contains(&self, id: EffectId) -> bool {
        self.bounds.contains_key(&id)
    }

    /// Returns every distinct effect id whose cell(s) overlap `query`,
    /// without re-checking precise overlap (callers do the precise test).
    pub fn query(&self, query: &Aabb) -> Vec<EffectId> {
        let mut found: Vec<EffectId> = self
            .cells_for(query)
            .filter_map(|key| self.cells.get(&key))
            .flatten()
            .copied()
            .collect();
        found.sort_unstable();
        found.dedup();
        found
    }

    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_query_round_trip() {
        let mut index = SpatialIndex::new(32.0, 8);
        let id = EffectId::new(1);
        let aabb = Aabb::square(Vec2::new(10.0, 10.0), 4.0);
        assert!(index.insert(id, aabb));
        let found = index.query(&Aabb::square(Vec2::new(10.0, 10.0), 4.0));
        assert_eq!(found, vec![id]);
    }

    #[test]
    fn remove_is_idempotent() {
        let mut index = SpatialIndex::new(32.0, 8);
        let id = EffectId::new(1);
        index.insert(id, Aabb::square(Vec2::ZERO, 4.0));
        index.remove(id);
        index.remove(id);
        assert!(!index.contains(id));
    }

    #[test]
    fn capacity_guard_refuses_insert() {
        let mut index = SpatialIndex::new(32.0, 1);
        assert!(index.insert(EffectId::new(1), Aabb::square(Vec2::ZERO, 1.0)));
        assert!(!index.insert(EffectId::new(2), Aabb::square(Vec2::ZERO, 1.0)));
    }
}
