//! Runtime-level errors: transport-adjacent failures the simulation core
//! itself never needs to know about.

use arena_core::ActorId;

#[derive(Debug, Clone, thiserror::Error)]
pub enum RuntimeError {
    #[error("player {0} is not subscribed")]
    UnknownSubscription(ActorId),
    #[error("subscription outbox for player {0} is closed")]
    SubscriptionClosed(ActorId),
    #[error("scheduler command channel is closed")]
    SchedulerClosed,
}

pub type Result<T> = std::result::Result<T, RuntimeError>;
