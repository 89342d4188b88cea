//! Item stacks, fungibility keys, and inventory/equipment containers.

use crate::ids::ItemId;

/// Fixed equip slots. Deliberately a closed enum: new slots require a code
/// change, not a config change, since the combat dispatcher reasons about
/// specific slots (e.g. MainHand for melee reach).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EquipSlot {
    MainHand,
    OffHand,
    Head,
    Body,
    Gloves,
    Boots,
    Accessory,
}

/// Opaque string identity used to decide whether two stacks may merge.
///
/// Derived from `(item type, tier, quality tags)`. Kept as an owned `String`
/// rather than an interned id: inventories are small and the cost of
/// deriving/comparing these keys never shows up in the tick budget.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FungibilityKey(pub String);

impl FungibilityKey {
    pub fn derive(item_type: &str, tier: u8, quality_tags: &[&str]) -> Self {
        let mut key = format!("{item_type}:{tier}");
        let mut tags: Vec<&str> = quality_tags.to_vec();
        tags.sort_unstable();
        for tag in tags {
            key.push(':');
            key.push_str(tag);
        }
        Self(key)
    }
}

/// A single stack of an item, as held in an inventory slot or on the ground.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemStack {
    pub item_type: String,
    pub fungibility_key: FungibilityKey,
    pub quantity: u32,
}

impl ItemStack {
    pub fn new(item_type: impl Into<String>, fungibility_key: FungibilityKey, quantity: u32) -> Self {
        Self {
            item_type: item_type.into(),
            fungibility_key,
            quantity,
        }
    }

    /// Whether this stack is eligible for removal from its container.
    pub fn is_empty(&self) -> bool {
        self.quantity == 0
    }
}

/// Slot-indexed list of stacks with merge-on-insert semantics.
///
/// Slots are not fixed-size: inserting grows the vector, and empty stacks are
/// compacted out after every mutation so that `slots()` never yields a
/// zero-quantity entry, matching the spec's "quantity=0 implies eligible for
/// removal" invariant.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Inventory {
    slots: Vec<ItemStack>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slots(&self) -> &[ItemStack] {
        &self.slots
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Adds `quantity` of an item, merging into an existing stack that shares
    /// `(item_type, fungibility_key)` or appending a new slot otherwise.
    pub fn add(&mut self, item_type: &str, key: FungibilityKey, quantity: u32) {
        if quantity == 0 {
            return;
        }
        if let Some(stack) = self
            .slots
            .iter_mut()
            .find(|s| s.item_type == item_type && s.fungibility_key == key)
        {
            stack.quantity += quantity;
        } else {
            self.slots.push(ItemStack::new(item_type, key, quantity));
        }
    }

    /// Removes up to `quantity` from the matching stack, returning how much
    /// was actually removed. Empty stacks are compacted out immediately.
    pub fn remove(&mut self, item_type: &str, key: &FungibilityKey, quantity: u32) -> u32 {
        let mut removed = 0;
        if let Some(stack) = self
            .slots
            .iter_mut()
            .find(|s| s.item_type == item_type && &s.fungibility_key == key)
        {
            removed = quantity.min(stack.quantity);
            stack.quantity -= removed;
        }
        self.compact();
        removed
    }

    /// Drains every stack, returning them for hand-off (e.g. to ground-item
    /// scatter on defeat). The inventory is empty afterward.
    pub fn drain_all(&mut self) -> Vec<ItemStack> {
        std::mem::take(&mut self.slots)
    }

    fn compact(&mut self) {
        self.slots.retain(|s| !s.is_empty());
    }
}

/// One stack per equip slot.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Equipment {
    slots: std::collections::BTreeMap<EquipSlot, ItemStack>,
}

impl Equipment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, slot: EquipSlot) -> Option<&ItemStack> {
        self.slots.get(&slot)
    }

    pub fn equip(&mut self, slot: EquipSlot, stack: ItemStack) -> Option<ItemStack> {
        self.slots.insert(slot, stack)
    }

    pub fn unequip(&mut self, slot: EquipSlot) -> Option<ItemStack> {
        self.slots.remove(&slot)
    }

    /// Iterates slots in a stable, sorted order for patch/snapshot building.
    pub fn iter(&self) -> impl Iterator<Item = (EquipSlot, &ItemStack)> {
        self.slots.iter().map(|(k, v)| (*k, v))
    }

    pub fn drain_all(&mut self) -> Vec<(EquipSlot, ItemStack)> {
        std::mem::take(&mut self.slots).into_iter().collect()
    }
}

/// Placeholder backref for items that track the allocator they came from
/// (ground items reuse `ItemId` for record identity, not stack identity).
pub type StackOrigin = Option<ItemId>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merges_stacks_with_same_key() {
        let mut inv = Inventory::new();
        let key = FungibilityKey::derive("ore", 1, &["gold"]);
        inv.add("ore", key.clone(), 3);
        inv.add("ore", key.clone(), 4);
        assert_eq!(inv.slots().len(), 1);
        assert_eq!(inv.slots()[0].quantity, 7);
    }

    #[test]
    fn remove_compacts_empty_slots() {
        let mut inv = Inventory::new();
        let key = FungibilityKey::derive("ore", 1, &[]);
        inv.add("ore", key.clone(), 2);
        let removed = inv.remove("ore", &key, 2);
        assert_eq!(removed, 2);
        assert!(inv.is_empty());
    }

    #[test]
    fn distinct_keys_do_not_merge() {
        let mut inv = Inventory::new();
        inv.add("ore", FungibilityKey::derive("ore", 1, &[]), 1);
        inv.add("ore", FungibilityKey::derive("ore", 2, &[]), 1);
        assert_eq!(inv.slots().len(), 2);
    }

    #[test]
    fn every_equip_slot_round_trips() {
        use strum::IntoEnumIterator;

        let mut equipment = Equipment::new();
        for slot in EquipSlot::iter() {
            let stack = ItemStack { item_type: "placeholder".into(), fungibility_key: FungibilityKey::derive("placeholder", 0, &[]), quantity: 1 };
            assert!(equipment.equip(slot, stack).is_none());
            assert!(equipment.get(slot).is_some());
        }
        assert_eq!(equipment.iter().count(), EquipSlot::iter().count());
    }
}
