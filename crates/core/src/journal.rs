//! The per-tick journal: an append-only list of typed patches, drained into
//! the next outbound frame.
//!
//! Unlike a before/after diff, subsystems push a [`Patch`] directly at the
//! moment they mutate state, so ordering always mirrors the tick pipeline
//! (movement before effects before cleanup) without a separate diffing pass.

use crate::geometry::{Facing, Vec2};
use crate::ids::{ActorId, EffectId, GroundItemId};
use crate::item::{EquipSlot, ItemStack};

/// The field a patch describes. Named per-entity-kind rather than generically
/// ("Pos", "Health", ...) so a diff consumer can route straight to a typed
/// client-side field without a secondary entity-kind tag.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PatchKind {
    PlayerPos(Vec2),
    PlayerFacing(Facing),
    PlayerIntent(Vec2),
    PlayerHealth(f32),
    PlayerInventory(Vec<ItemStack>),
    PlayerEquipment(Vec<(EquipSlot, ItemStack)>),
    NpcPos(Vec2),
    NpcFacing(Facing),
    NpcHealth(f32),
    NpcInventory(Vec<ItemStack>),
    NpcEquipment(Vec<(EquipSlot, ItemStack)>),
    EffectPos(Vec2),
    EffectParams(Vec<(String, f32)>),
    GroundItemPos(Vec2),
    GroundItemQty(u32),
}

/// Entity a patch is scoped to. Effects and ground items use their own id
/// spaces; actors (players/NPCs) reuse [`ActorId`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PatchEntity {
    Actor(ActorId),
    Effect(EffectId),
    GroundItem(GroundItemId),
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Patch {
    pub entity: PatchEntity,
    pub kind: PatchKind,
}

impl Patch {
    pub fn new(entity: PatchEntity, kind: PatchKind) -> Self {
        Self { entity, kind }
    }
}

/// Append-only buffer of patches for the in-progress tick. Drained into the
/// outbound diff frame at the end of the tick loop's step 7.
#[derive(Clone, Debug, Default)]
pub struct Journal {
    pending: Vec<Patch>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entity: PatchEntity, kind: PatchKind) {
        self.pending.push(Patch::new(entity, kind));
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Takes every pending patch, leaving the journal empty for the next tick.
    pub fn drain(&mut self) -> Vec<Patch> {
        std::mem::take(&mut self.pending)
    }

    /// Discards all pending patches without returning them, used on world
    /// reset to guarantee the next frame starts from a clean slate.
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_empties_and_preserves_order() {
        let mut journal = Journal::new();
        journal.push(PatchEntity::Actor(ActorId::new(1)), PatchKind::PlayerHealth(10.0));
        journal.push(PatchEntity::Actor(ActorId::new(1)), PatchKind::PlayerPos(Vec2::ZERO));
        let drained = journal.drain();
        assert_eq!(drained.len(), 2);
        assert!(matches!(drained[0].kind, PatchKind::PlayerHealth(_)));
        assert!(journal.is_empty());
    }
}
