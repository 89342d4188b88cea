//! Ordered per-client command staging with sequence-number dedup and reject
//! reasons.

use std::collections::{BTreeMap, VecDeque};
use std::fmt;

use crate::error::{ErrorSeverity, SimError};
use crate::geometry::{Facing, Vec2};
use crate::ids::ActorId;

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CommandPayload {
    Input { dx: f32, dy: f32, facing: Option<Facing> },
    Path { destination: Vec2 },
    CancelPath,
    Action { action: String },
    Heartbeat { sent_at_secs: f64 },
    Console { cmd: String, qty: u32 },
    KeyframeRequest { keyframe_seq: u64 },
    KeyframeCadence { keyframe_interval: u64 },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Command {
    pub player: ActorId,
    pub origin_tick: u64,
    pub sequence: u64,
    pub payload: CommandPayload,
}

/// Why a command was rejected at staging time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RejectReason {
    QueueLimit,
    UnknownActor,
    InvalidAction,
}

impl RejectReason {
    pub fn retry(self) -> bool {
        matches!(self, RejectReason::QueueLimit)
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RejectReason::QueueLimit => "queueLimit",
            RejectReason::UnknownActor => "unknownActor",
            RejectReason::InvalidAction => "invalidAction",
        };
        f.write_str(s)
    }
}

impl SimError for RejectReason {
    fn severity(&self) -> ErrorSeverity {
        match self {
            RejectReason::QueueLimit => ErrorSeverity::Capacity,
            RejectReason::UnknownActor | RejectReason::InvalidAction => ErrorSeverity::Validation,
        }
    }
}

pub enum StageResult {
    Accepted { sequence: u64, origin_tick: u64 },
    Rejected { sequence: u64, reason: RejectReason },
}

/// Per-player bounded command queue. Staging a command beyond the bound
/// yields `queueLimit`; the queue never silently drops an accepted command.
pub struct CommandQueue {
    capacity: usize,
    queues: BTreeMap<ActorId, VecDeque<Command>>,
    known_actors: std::collections::BTreeSet<ActorId>,
}

impl CommandQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            queues: BTreeMap::new(),
            known_actors: std::collections::BTreeSet::new(),
        }
    }

    pub fn register_actor(&mut self, player: ActorId) {
        self.known_actors.insert(player);
        self.queues.entry(player).or_default();
    }

    pub fn unregister_actor(&mut self, player: ActorId) {
        self.known_actors.remove(&player);
        self.queues.remove(&player);
    }

    /// Stages a command if it passes validation and the queue has room.
    /// Does not check sequence dedup — that happens at drain time against
    /// `last_processed_seq`, since staging must still ack duplicates.
    pub fn stage(&mut self, player: ActorId, origin_tick: u64, sequence: u64, payload: Option<CommandPayload>) -> StageResult {
        if !self.known_actors.contains(&player) {
            return StageResult::Rejected { sequence, reason: RejectReason::UnknownActor };
        }
        let Some(payload) = payload else {
            return StageResult::Rejected { sequence, reason: RejectReason::InvalidAction };
        };
        let queue = self.queues.entry(player).or_default();
        if queue.len() >= self.capacity {
            return StageResult::Rejected { sequence, reason: RejectReason::QueueLimit };
        }
        queue.push_back(Command { player, origin_tick, sequence, payload });
        StageResult::Accepted { sequence, origin_tick }
    }

    /// Drains every staged command, keyed by player, in FIFO arrival order.
    /// Iteration over players is by sorted `ActorId` for deterministic
    /// cross-player processing order.
    pub fn drain(&mut self) -> Vec<(ActorId, Vec<Command>)> {
        self.queues
            .iter_mut()
            .map(|(player, queue)| (*player, queue.drain(..).collect()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_actor_is_rejected() {
        let mut queue = CommandQueue::new(4);
        let result = queue.stage(ActorId::new(1), 0, 1, Some(CommandPayload::CancelPath));
        assert!(matches!(result, StageResult::Rejected { reason: RejectReason::UnknownActor, .. }));
    }

    #[test]
    fn queue_limit_is_enforced() {
        let mut queue = CommandQueue::new(1);
        let player = ActorId::new(1);
        queue.register_actor(player);
        assert!(matches!(queue.stage(player, 0, 1, Some(CommandPayload::CancelPath)), StageResult::Accepted { .. }));
        let result = queue.stage(player, 0, 2, Some(CommandPayload::CancelPath));
        assert!(matches!(result, StageResult::Rejected { reason: RejectReason::QueueLimit, .. }));
    }

    #[test]
    fn queue_limit_reason_is_retryable() {
        assert!(RejectReason::QueueLimit.retry());
        assert!(!RejectReason::UnknownActor.retry());
    }

    #[test]
    fn reject_reason_classifies_severity_and_renders_wire_name() {
        assert_eq!(RejectReason::QueueLimit.severity(), ErrorSeverity::Capacity);
        assert_eq!(RejectReason::UnknownActor.severity(), ErrorSeverity::Validation);
        assert_eq!(RejectReason::InvalidAction.to_string(), "invalidAction");
    }
}
