//! Adapter layer around the deterministic arena simulation core.
//!
//! The core (`arena-core`) only sees [`arena_core::CommandPayload`] values in
//! and [`arena_core::StepOutput`] values out; everything here turns those
//! into a wire protocol and a fixed-rate, connection-oriented service:
//!
//! - [`protocol`] defines the client/server message envelopes and the view
//!   DTOs a state frame carries.
//! - [`hub`] owns the world and the set of live subscriptions: join,
//!   subscribe, disconnect, snapshot-vs-diff selection, keyframe recovery.
//! - [`scheduler`] drives the hub at a fixed rate from its own task and
//!   exposes a cloneable handle for connection tasks to talk to it.
//! - [`events`] is a side-channel topic bus for telemetry and connection
//!   lifecycle events, independent of the per-client subscription fan-out.

pub mod error;
pub mod events;
pub mod hub;
pub mod protocol;
pub mod scheduler;

pub use error::{Result, RuntimeError};
pub use events::{ConnectionEvent, Event, EventBus, Topic};
pub use hub::Hub;
pub use protocol::{ClientMessage, EffectView, GroundItemView, NpcView, ObstacleView, PlayerView, RejectReasonWire, ServerMessage, StateFrame};
pub use scheduler::{Scheduler, SchedulerCommand, SchedulerHandle};
