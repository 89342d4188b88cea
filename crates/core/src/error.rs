//! Common error infrastructure for arena-core.
//!
//! Domain-specific errors (movement, combat, inventory) are defined in their
//! respective modules alongside the code that raises them. This module only
//! provides the shared classification callers use to decide how to log or
//! surface a failure.
//!
//! # Design Principles
//!
//! - Every error the simulation can raise is local to a single subsystem and
//!   never unwinds a tick: callers clamp or no-op instead of propagating.
//! - Severity is about recoverability, not impact: a capacity error during
//!   effect spawn is routine; an internal error means an invariant broke.

use crate::ids::ActorId;
use crate::geometry::Vec2;

/// Severity level of an error, used for categorization and recovery strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Invalid input that should be rejected without retry (bad command, unknown actor).
    Validation,
    /// A capacity limit was hit; the caller should back off or drop the request.
    Capacity,
    /// Unexpected state inconsistency. Indicates a bug; the tick continues regardless.
    Internal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Capacity => "capacity",
            Self::Internal => "internal",
        }
    }
}

/// Contextual information attached to an error for logging and diagnostics.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ErrorContext {
    pub actor: Option<ActorId>,
    pub position: Option<Vec2>,
    pub tick: u64,
    pub message: Option<&'static str>,
}

impl ErrorContext {
    pub const fn new(tick: u64) -> Self {
        Self {
            actor: None,
            position: None,
            tick,
            message: None,
        }
    }

    #[must_use]
    pub fn with_actor(mut self, actor: ActorId) -> Self {
        self.actor = Some(actor);
        self
    }

    #[must_use]
    pub fn with_position(mut self, position: Vec2) -> Self {
        self.position = Some(position);
        self
    }

    #[must_use]
    pub const fn with_message(mut self, message: &'static str) -> Self {
        self.message = Some(message);
        self
    }
}

/// Common trait implemented by every error type raised inside the simulation.
pub trait SimError: std::fmt::Display + std::fmt::Debug {
    fn severity(&self) -> ErrorSeverity;

    fn context(&self) -> Option<&ErrorContext> {
        None
    }

    fn error_code(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
