//! Structured telemetry events the simulation emits against a `Publisher`.
//!
//! The core never observes publish failures: publishing is fire-and-forget,
//! matching the "telemetry sink errors are invisible to the core" policy.

use crate::ids::{ActorId, EffectId};
use crate::projectile::StopReason;

#[derive(Clone, Debug, PartialEq)]
pub enum TelemetryEvent {
    EffectHit { effect: EffectId, target: ActorId, applied_delta: f32 },
    Damage { target: ActorId, ability: String, amount: f32 },
    Defeat { target: ActorId, killer: ActorId },
    StatusApplied { target: ActorId, status_type: String, expires_at: f64 },
    StatusExpired { target: ActorId, status_type: String },
    AttackOverlap { effect: EffectId, hits: Vec<ActorId> },
    EffectEnd { effect: EffectId, reason: StopReason },
    SpawnRefused { reason: &'static str },
}

/// Fire-and-forget sink for simulation telemetry. Implementations must not
/// block or panic; the core does not retry or observe the outcome.
pub trait Publisher: Send + Sync {
    fn publish(&self, event: TelemetryEvent);
}

/// A `Publisher` that discards every event, used by tests and headless
/// tools that don't care about telemetry.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullPublisher;

impl Publisher for NullPublisher {
    fn publish(&self, _event: TelemetryEvent) {}
}

/// Thin convenience wrapper the world holds, forwarding to a boxed
/// `Publisher` so call sites read as `world.telemetry.damage(...)` instead of
/// constructing `TelemetryEvent` variants inline everywhere.
pub struct TelemetrySink {
    publisher: Box<dyn Publisher>,
}

impl TelemetrySink {
    pub fn new(publisher: Box<dyn Publisher>) -> Self {
        Self { publisher }
    }

    pub fn effect_hit(&self, effect: EffectId, target: ActorId, applied_delta: f32) {
        self.publisher.publish(TelemetryEvent::EffectHit { effect, target, applied_delta });
    }

    pub fn damage(&self, target: ActorId, ability: &str, amount: f32) {
        self.publisher.publish(TelemetryEvent::Damage { target, ability: ability.to_string(), amount });
    }

    pub fn defeat(&self, target: ActorId, killer: ActorId) {
        self.publisher.publish(TelemetryEvent::Defeat { target, killer });
    }

    pub fn status_applied(&self, target: ActorId, status_type: &str, expires_at: f64) {
        self.publisher
            .publish(TelemetryEvent::StatusApplied { target, status_type: status_type.to_string(), expires_at });
    }

    pub fn status_expired(&self, target: ActorId, status_type: &str) {
        self.publisher
            .publish(TelemetryEvent::StatusExpired { target, status_type: status_type.to_string() });
    }

    pub fn attack_overlap(&self, effect: EffectId, hits: &[ActorId]) {
        if hits.is_empty() {
            return;
        }
        self.publisher.publish(TelemetryEvent::AttackOverlap { effect, hits: hits.to_vec() });
    }

    pub fn effect_end(&self, effect: EffectId, reason: StopReason) {
        self.publisher.publish(TelemetryEvent::EffectEnd { effect, reason });
    }

    pub fn spawn_refused(&self, reason: &'static str) {
        self.publisher.publish(TelemetryEvent::SpawnRefused { reason });
    }
}

impl Default for TelemetrySink {
    fn default() -> Self {
        Self::new(Box::new(NullPublisher))
    }
}
