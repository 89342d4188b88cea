//! Newtype identifiers for entities tracked by the simulation.
//!
//! Mirrors the teacher's entity-id convention: a thin `u32` wrapper with
//! reserved sentinel values and a human-readable `Display` impl, rather than
//! a bare integer passed around the codebase.

use std::fmt;

macro_rules! define_id {
    ($name:ident, $prefix:literal) => {
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        pub struct $name(pub u32);

        impl $name {
            /// Sentinel used for system-originated effects that have no owning actor.
            pub const NONE: Self = Self(0);

            pub const fn new(value: u32) -> Self {
                Self(value)
            }

            pub const fn value(self) -> u32 {
                self.0
            }

            pub const fn is_none(self) -> bool {
                self.0 == 0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }

        impl From<u32> for $name {
            fn from(value: u32) -> Self {
                Self(value)
            }
        }
    };
}

define_id!(ActorId, "actor#");
define_id!(EffectId, "effect#");
define_id!(ProjectileId, "projectile#");
define_id!(ItemId, "item#");
define_id!(GroundItemId, "ground-item#");

/// Monotonically increasing id allocator, used for effects/projectiles/ground
/// items whose identity must stay stable for the lifetime of a single world.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IdAllocator {
    next: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn allocate(&mut self) -> u32 {
        let id = self.next;
        self.next = self.next.wrapping_add(1).max(1);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocator_never_issues_zero() {
        let mut alloc = IdAllocator::new();
        for _ in 0..4 {
            assert_ne!(alloc.allocate(), 0);
        }
    }

    #[test]
    fn display_uses_prefix() {
        assert_eq!(ActorId::new(7).to_string(), "actor#7");
    }
}
