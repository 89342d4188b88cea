//! Deterministic arena simulation core.
//!
//! This crate holds the authoritative world step: command staging, AI
//! evaluation, movement and collision, effect/status/projectile lifecycles,
//! combat resolution, ground items, and the patch journal. It has no
//! knowledge of transport, persistence, or telemetry sinks — callers drive
//! it through [`World::step`], feed it commands via [`World::submit_command`],
//! and read results from the returned [`world::StepOutput`] and a
//! [`telemetry::Publisher`] implementation of their choosing.

pub mod ability;
pub mod actor;
pub mod ai;
pub mod combat;
pub mod command;
pub mod config;
pub mod effect;
pub mod error;
pub mod geometry;
pub mod ground_item;
pub mod ids;
pub mod item;
pub mod journal;
pub mod projectile;
pub mod rng;
pub mod spatial;
pub mod status;
pub mod telemetry;
pub mod world;

pub use actor::{Actor, ActorKind};
pub use command::{Command, CommandPayload, RejectReason, StageResult};
pub use config::WorldConfig;
pub use error::{ErrorContext, ErrorSeverity, SimError};
pub use geometry::{Aabb, Facing, Vec2};
pub use ids::{ActorId, EffectId, GroundItemId, ItemId, ProjectileId};
pub use journal::{Patch, PatchEntity, PatchKind};
pub use telemetry::{NullPublisher, Publisher, TelemetryEvent};
pub use world::{Obstacle, StepOutput, World};
