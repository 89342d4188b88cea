//! Tile-bucketed ground items: scatter placement, fungibility merging,
//! quantity mutation.

use std::collections::BTreeMap;

use crate::geometry::{scatter_point, Vec2};
use crate::ids::{GroundItemId, IdAllocator};
use crate::item::{FungibilityKey, ItemStack};
use crate::journal::{Journal, PatchEntity, PatchKind};
use crate::rng::{mix_seed, WorldRng};

pub type TileKey = (i32, i32);

#[derive(Clone, Debug)]
pub struct GroundItem {
    pub id: GroundItemId,
    pub item_type: String,
    pub fungibility_key: FungibilityKey,
    pub position: Vec2,
    pub quantity: u32,
    pub tile: TileKey,
}

/// Tile-bucketed store of ground item records.
pub struct GroundItemLayer {
    tile_size: f32,
    scatter_min_dist: f32,
    scatter_max_dist: f32,
    scatter_padding: f32,
    items: BTreeMap<GroundItemId, GroundItem>,
    by_tile: BTreeMap<TileKey, Vec<GroundItemId>>,
    allocator: IdAllocator,
}

impl GroundItemLayer {
    pub fn new(tile_size: f32, scatter_min_dist: f32, scatter_max_dist: f32, scatter_padding: f32) -> Self {
        Self {
            tile_size,
            scatter_min_dist,
            scatter_max_dist,
            scatter_padding,
            items: BTreeMap::new(),
            by_tile: BTreeMap::new(),
            allocator: IdAllocator::new(),
        }
    }

    pub fn tile_of(&self, position: Vec2) -> TileKey {
        ((position.x / self.tile_size).floor() as i32, (position.y / self.tile_size).floor() as i32)
    }

    fn tile_bounds(&self, tile: TileKey) -> (Vec2, Vec2) {
        let min = Vec2::new(tile.0 as f32 * self.tile_size, tile.1 as f32 * self.tile_size);
        let max = min.add(Vec2::new(self.tile_size, self.tile_size));
        (min, max)
    }

    fn tile_center(&self, tile: TileKey) -> Vec2 {
        let (min, max) = self.tile_bounds(tile);
        min.add(max).scale(0.5)
    }

    fn clamp_to_tile(&self, tile: TileKey, point: Vec2) -> Vec2 {
        let (min, max) = self.tile_bounds(tile);
        Vec2::new(
            point.x.clamp(min.x + self.scatter_padding, max.x - self.scatter_padding),
            point.y.clamp(min.y + self.scatter_padding, max.y - self.scatter_padding),
        )
    }

    /// Inserts or merges `stack` near `actor_position`: merges into an
    /// existing record sharing `(item_type, fungibility_key)` in the same
    /// tile, or scatter-places a new record and journals its creation.
    pub fn upsert(
        &mut self,
        rng: &mut WorldRng,
        seed: u64,
        actor_position: Vec2,
        stack: ItemStack,
        reason: &str,
        journal: &mut Journal,
    ) -> GroundItemId {
        let _ = reason;
        let tile = self.tile_of(actor_position);

        if let Some(existing_id) = self.by_tile.get(&tile).and_then(|ids| {
            ids.iter().copied().find(|id| {
                self.items
                    .get(id)
                    .is_some_and(|item| item.item_type == stack.item_type && item.fungibility_key == stack.fungibility_key)
            })
        }) {
            let item = self.items.get_mut(&existing_id).expect("indexed id must exist");
            item.quantity += stack.quantity;
            journal.push(PatchEntity::GroundItem(existing_id), PatchKind::GroundItemQty(item.quantity));
            return existing_id;
        }

        let id = GroundItemId::new(self.allocator.allocate());
        let center = self.tile_center(tile);
        let seeded = mix_seed(seed, id.value() as u64, 0, 0xA17);
        let point = scatter_point(&rng.oracle(), seeded, center, self.scatter_min_dist, self.scatter_max_dist);
        let position = self.clamp_to_tile(tile, point);

        let item = GroundItem {
            id,
            item_type: stack.item_type,
            fungibility_key: stack.fungibility_key,
            position,
            quantity: stack.quantity,
            tile,
        };
        self.by_tile.entry(tile).or_default().push(id);
        journal.push(PatchEntity::GroundItem(id), PatchKind::GroundItemPos(position));
        journal.push(PatchEntity::GroundItem(id), PatchKind::GroundItemQty(item.quantity));
        self.items.insert(id, item);
        id
    }

    /// Deletes a record and journals a `GroundItemQty=0` patch so diff
    /// subscribers learn of the disappearance without a full snapshot.
    pub fn remove(&mut self, id: GroundItemId, journal: &mut Journal) {
        let Some(item) = self.items.remove(&id) else { return };
        if let Some(bucket) = self.by_tile.get_mut(&item.tile) {
            bucket.retain(|&existing| existing != id);
        }
        journal.push(PatchEntity::GroundItem(id), PatchKind::GroundItemQty(0));
    }

    /// Euclidean-closest live stack of `item_type` to `from`, for pickup
    /// radius checks. Not used by the tick hot path.
    pub fn nearest_of_type(&self, from: Vec2, item_type: &str) -> Option<&GroundItem> {
        self.items
            .values()
            .filter(|item| item.item_type == item_type)
            .min_by(|a, b| {
                a.position
                    .distance(from)
                    .partial_cmp(&b.position.distance(from))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = &GroundItem> {
        self.items.values()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_twice_doubles_quantity_on_same_record() {
        let mut layer = GroundItemLayer::new(64.0, 4.0, 16.0, 2.0);
        let mut rng = WorldRng::new(7);
        let mut journal = Journal::new();
        let key = FungibilityKey::derive("ore", 1, &[]);
        let id1 = layer.upsert(&mut rng, 7, Vec2::new(10.0, 10.0), ItemStack::new("ore", key.clone(), 3), "test", &mut journal);
        let id2 = layer.upsert(&mut rng, 7, Vec2::new(12.0, 12.0), ItemStack::new("ore", key.clone(), 3), "test", &mut journal);
        assert_eq!(id1, id2);
        assert_eq!(layer.len(), 1);
        let item = layer.iter().next().unwrap();
        assert_eq!(item.quantity, 6);
    }

    #[test]
    fn remove_emits_zero_qty_patch() {
        let mut layer = GroundItemLayer::new(64.0, 4.0, 16.0, 2.0);
        let mut rng = WorldRng::new(1);
        let mut journal = Journal::new();
        let key = FungibilityKey::derive("ore", 1, &[]);
        let id = layer.upsert(&mut rng, 1, Vec2::ZERO, ItemStack::new("ore", key, 1), "test", &mut journal);
        journal.drain();
        layer.remove(id, &mut journal);
        let patches = journal.drain();
        assert!(patches.iter().any(|p| matches!(p.kind, PatchKind::GroundItemQty(0))));
    }
}
