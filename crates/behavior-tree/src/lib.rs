//! Lightweight, deterministic behavior tree library for cadence-gated NPC
//! decisions.
//!
//! Every node resolves immediately: there is no `Running` status, so a
//! decision evaluated on an NPC's cadence tick always completes within that
//! tick. Nodes are generic over a context type, so the caller decides what
//! a tree can read and mutate (world snapshots, blackboard state).
//!
//! - **No delta time**: evaluation is instantaneous, driven by the caller's cadence
//! - **No Running state**: nodes either succeed or fail
//! - **Zero dependencies**: pure Rust, no external crates
//!
//! # Architecture
//!
//! - [`Behavior`]: Core trait for all nodes
//! - [`Status`]: Success or Failure (no Running state)
//! - Composite nodes: [`Sequence`], [`Selector`]
//! - Decorator nodes: [`Inverter`], [`AlwaysSucceed`]

pub mod behavior;
pub mod builder;
pub mod composite;
pub mod decorator;
pub mod status;

// Re-export core types for ergonomic API
pub use behavior::Behavior;
pub use builder::{always_succeed, inverter, selector, sequence};
pub use composite::{Selector, Sequence};
pub use decorator::{AlwaysSucceed, Inverter};
pub use status::Status;
