//! Status-effect definitions, per-actor instances, and the tick-driven
//! apply/tick/expire lifecycle.
//!
//! Hooks are represented as plain function pointers keyed by status type in
//! a [`StatusRegistry`] built once per world, rather than per-instance
//! closures — the hot per-tick loop never allocates.

use crate::ids::{ActorId, EffectId};
use crate::world::World;

/// Runtime record for one `(actor, status type)` pair. The spec guarantees
/// at most one live instance per pair; [`StatusRegistry::apply`] enforces it.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusInstance {
    pub status_type: String,
    pub source: ActorId,
    pub applied_at: f64,
    pub expires_at: f64,
    pub next_tick: f64,
    pub last_tick: f64,
    pub visual_effect: Option<EffectId>,
}

/// Immutable description of a status type's timing.
#[derive(Clone, Debug)]
pub struct StatusDefinition {
    pub status_type: String,
    pub duration_secs: f64,
    pub tick_interval_secs: f64,
    /// Whether the first tick fires immediately on apply, instead of after
    /// one `tick_interval_secs`.
    pub initial_tick: bool,
}

/// Function-pointer hook table for one status type. `on_tick` is required;
/// status types with no apply/expire side effect (only the registry's
/// bookkeeping) leave those `None`.
#[derive(Clone, Copy)]
pub struct StatusHooks {
    pub on_apply: Option<fn(&mut World, ActorId, f64)>,
    pub on_tick: fn(&mut World, ActorId, f64),
    pub on_expire: Option<fn(&mut World, ActorId, f64)>,
}

/// World-scoped table of status definitions and their hooks, built once at
/// world construction and consulted (never mutated) on every apply/tick.
#[derive(Clone, Default)]
pub struct StatusRegistry {
    entries: std::collections::BTreeMap<String, (StatusDefinition, StatusHooks)>,
}

impl StatusRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, definition: StatusDefinition, hooks: StatusHooks) {
        self.entries.insert(definition.status_type.clone(), (definition, hooks));
    }

    pub fn get(&self, status_type: &str) -> Option<&(StatusDefinition, StatusHooks)> {
        self.entries.get(status_type)
    }
}

/// Applies `status_type` to `target`, idempotently. Returns `false` (a no-op)
/// if the status type is unregistered.
///
/// Reapplying an active instance extends `expires_at` to `max(current, new)`
/// without resetting `next_tick`, matching the "does not stack counts" rule.
pub fn apply(world: &mut World, target: ActorId, status_type: &str, source: ActorId, now: f64) -> bool {
    let Some((definition, hooks)) = world.status_registry.get(status_type).cloned() else {
        return false;
    };
    let new_expiry = now + definition.duration_secs;

    let already_live = world
        .actor(target)
        .and_then(|a| a.find_status_ref(status_type))
        .is_some();

    if already_live {
        if let Some(actor) = world.actor_mut(target) {
            if let Some(instance) = actor.find_status_mut(status_type) {
                instance.expires_at = instance.expires_at.max(new_expiry);
            }
        }
        return true;
    }

    let next_tick = if definition.initial_tick { now } else { now + definition.tick_interval_secs };
    let instance = StatusInstance {
        status_type: status_type.to_string(),
        source,
        applied_at: now,
        expires_at: new_expiry,
        next_tick,
        last_tick: now,
        visual_effect: None,
    };
    if let Some(actor) = world.actor_mut(target) {
        actor.statuses.push(instance);
    } else {
        return false;
    }

    if let Some(on_apply) = hooks.on_apply {
        on_apply(world, target, now);
    }
    world.telemetry.status_applied(target, status_type, new_expiry);
    true
}

/// Advances every live status instance on `target`, firing `onTick` for each
/// elapsed interval and `onExpire` once `now >= expires_at`.
pub fn advance(world: &mut World, target: ActorId, now: f64) {
    let Some(actor) = world.actor(target) else { return };
    let snapshot: Vec<(String, f64, f64)> = actor
        .statuses
        .iter()
        .map(|s| (s.status_type.clone(), s.next_tick, s.expires_at))
        .collect();

    for (status_type, mut next_tick, expires_at) in snapshot {
        let Some((definition, hooks)) = world.status_registry.get(&status_type).cloned() else { continue };

        while next_tick <= now && next_tick <= expires_at {
            (hooks.on_tick)(world, target, now);
            if let Some(actor) = world.actor_mut(target) {
                if let Some(instance) = actor.find_status_mut(&status_type) {
                    instance.last_tick = next_tick;
                    instance.next_tick += definition.tick_interval_secs;
                }
            }
            next_tick += definition.tick_interval_secs;
            if definition.tick_interval_secs <= 0.0 {
                break;
            }
        }

        if now >= expires_at {
            if let Some(on_expire) = hooks.on_expire {
                on_expire(world, target, now);
            }
            if let Some(actor) = world.actor_mut(target) {
                actor.statuses.retain(|s| s.status_type != status_type);
            }
            world.telemetry.status_expired(target, &status_type);
        }
    }
}

impl crate::actor::Actor {
    pub fn find_status_ref(&self, status_type: &str) -> Option<&StatusInstance> {
        self.statuses.iter().find(|s| s.status_type == status_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn definition_extends_duration_on_reapply() {
        let def = StatusDefinition {
            status_type: "burning".into(),
            duration_secs: 3.0,
            tick_interval_secs: 1.0,
            initial_tick: false,
        };
        assert_eq!(def.duration_secs, 3.0);
    }
}
