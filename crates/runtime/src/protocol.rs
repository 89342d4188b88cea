//! Wire message envelopes for the subscription duplex channel.
//!
//! The simulation core never sees these types: it only exchanges
//! [`arena_core::CommandPayload`] and [`arena_core::Patch`] values with its
//! caller. Everything here is the adapter layer that turns those into
//! serializable records and back, matching the core's "the simulation only
//! sees `Command` values in and `Frame` values out" boundary.

use arena_core::effect::{Effect, EffectKind};
use arena_core::ground_item::GroundItem;
use arena_core::item::{EquipSlot, FungibilityKey, ItemStack};
use arena_core::{Aabb, Actor, ActorId, ActorKind, CommandPayload, EffectId, Facing, GroundItemId, Obstacle, Patch, RejectReason, Vec2, WorldConfig};
use serde::{Deserialize, Serialize};

/// Inbound message, one per duplex-channel frame from a client.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    Input { dx: f32, dy: f32, facing: Option<Facing>, seq: Option<u64> },
    Path { x: f32, y: f32, seq: Option<u64> },
    CancelPath { seq: Option<u64> },
    Action { action: String, seq: Option<u64> },
    Heartbeat { sent_at: f64 },
    Console { cmd: String, qty: u32 },
    KeyframeRequest { keyframe_seq: u64 },
    KeyframeCadence { keyframe_interval: u64 },
}

impl ClientMessage {
    /// Sequence number to ack/reject, for the message types that carry one.
    pub fn sequence(&self) -> Option<u64> {
        match self {
            ClientMessage::Input { seq, .. }
            | ClientMessage::Path { seq, .. }
            | ClientMessage::CancelPath { seq, .. }
            | ClientMessage::Action { seq, .. } => *seq,
            _ => None,
        }
    }

    /// Converts the subset of messages that stage into the world tick loop's
    /// sequence-numbered command queue. `heartbeat`, `console`,
    /// `keyframeRequest`, and `keyframeCadence` carry no wire sequence number
    /// and are handled by the hub directly instead.
    pub fn into_command_payload(self) -> Option<CommandPayload> {
        match self {
            ClientMessage::Input { dx, dy, facing, .. } => Some(CommandPayload::Input { dx, dy, facing }),
            ClientMessage::Path { x, y, .. } => Some(CommandPayload::Path { destination: Vec2::new(x, y) }),
            ClientMessage::CancelPath { .. } => Some(CommandPayload::CancelPath),
            ClientMessage::Action { action, .. } => Some(CommandPayload::Action { action }),
            ClientMessage::Heartbeat { .. }
            | ClientMessage::Console { .. }
            | ClientMessage::KeyframeRequest { .. }
            | ClientMessage::KeyframeCadence { .. } => None,
        }
    }
}

/// Outbound message, one per duplex-channel frame to a client.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    State(StateFrame),
    CommandAck { seq: u64, tick: Option<u64> },
    CommandReject { seq: u64, reason: RejectReasonWire, retry: bool },
    Heartbeat { server_time: f64, client_time: f64, rtt: f64 },
    KeyframeNack { requested_seq: u64, earliest_available_seq: u64 },
}

/// Wire copy of [`arena_core::RejectReason`]. Kept separate so the core's
/// reject enum doesn't need a serde dependency of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RejectReasonWire {
    QueueLimit,
    UnknownActor,
    InvalidAction,
}

impl From<RejectReason> for RejectReasonWire {
    fn from(reason: RejectReason) -> Self {
        match reason {
            RejectReason::QueueLimit => RejectReasonWire::QueueLimit,
            RejectReason::UnknownActor => RejectReasonWire::UnknownActor,
            RejectReason::InvalidAction => RejectReasonWire::InvalidAction,
        }
    }
}

/// A full snapshot or a diff frame. Diff frames leave the collection fields
/// `None`; snapshots (on subscribe, on reset, on keyframe recovery, or on
/// cadence) populate all of them and set `resync`.
#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StateFrame {
    pub tick: u64,
    pub sequence: u64,
    pub resync: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub players: Option<Vec<PlayerView>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub npcs: Option<Vec<NpcView>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub obstacles: Option<Vec<ObstacleView>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effects: Option<Vec<EffectView>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ground_items: Option<Vec<GroundItemView>>,
    pub patches: Vec<Patch>,
    pub server_time: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<WorldConfig>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    pub id: ActorId,
    pub position: Vec2,
    pub facing: Facing,
    pub health: f32,
    pub max_health: f32,
    pub inventory: Vec<ItemStack>,
    pub equipment: Vec<(EquipSlot, ItemStack)>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NpcView {
    pub id: ActorId,
    pub archetype: String,
    pub position: Vec2,
    pub facing: Facing,
    pub health: f32,
    pub max_health: f32,
    pub inventory: Vec<ItemStack>,
    pub equipment: Vec<(EquipSlot, ItemStack)>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObstacleView {
    pub aabb: Aabb,
    pub obstacle_type: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectView {
    pub id: EffectId,
    pub kind: EffectKind,
    pub owner: ActorId,
    pub aabb: Aabb,
    pub expires_at: f64,
    pub params: Vec<(String, f32)>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundItemView {
    pub id: GroundItemId,
    pub item_type: String,
    pub fungibility_key: FungibilityKey,
    pub position: Vec2,
    pub quantity: u32,
}

impl PlayerView {
    /// Builds a wire view from a live player actor. `generic_baseline` is
    /// `config.generic_max_health`, used when the actor declares no explicit
    /// max health.
    pub fn from_actor(actor: &Actor, generic_baseline: f32) -> Self {
        PlayerView {
            id: actor.id,
            position: actor.position,
            facing: actor.facing,
            health: actor.health,
            max_health: actor.effective_max_health(generic_baseline),
            inventory: actor.inventory.slots().to_vec(),
            equipment: actor.equipment.iter().map(|(slot, stack)| (slot, stack.clone())).collect(),
        }
    }
}

impl NpcView {
    pub fn from_actor(actor: &Actor, generic_baseline: f32) -> Self {
        let archetype = match &actor.kind {
            ActorKind::Npc { archetype } => archetype.clone(),
            _ => String::new(),
        };
        NpcView {
            id: actor.id,
            archetype,
            position: actor.position,
            facing: actor.facing,
            health: actor.health,
            max_health: actor.effective_max_health(generic_baseline),
            inventory: actor.inventory.slots().to_vec(),
            equipment: actor.equipment.iter().map(|(slot, stack)| (slot, stack.clone())).collect(),
        }
    }
}

impl ObstacleView {
    pub fn from_obstacle(obstacle: &Obstacle) -> Self {
        ObstacleView { aabb: obstacle.aabb, obstacle_type: obstacle.obstacle_type.clone() }
    }
}

impl EffectView {
    pub fn from_effect(effect: &Effect) -> Self {
        EffectView {
            id: effect.id,
            kind: effect.kind,
            owner: effect.owner,
            aabb: effect.aabb,
            expires_at: effect.expires_at,
            params: effect.params.iter().map(|(k, v)| (k.clone(), *v)).collect(),
        }
    }
}

impl GroundItemView {
    pub fn from_ground_item(item: &GroundItem) -> Self {
        GroundItemView {
            id: item.id,
            item_type: item.item_type.clone(),
            fungibility_key: item.fungibility_key.clone(),
            position: item.position,
            quantity: item.quantity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_message_round_trips_sequence() {
        let msg = ClientMessage::Input { dx: 1.0, dy: 0.0, facing: None, seq: Some(7) };
        assert_eq!(msg.sequence(), Some(7));
        let payload = msg.into_command_payload().unwrap();
        assert!(matches!(payload, CommandPayload::Input { .. }));
    }

    #[test]
    fn console_has_no_command_payload() {
        let msg = ClientMessage::Console { cmd: "seedItem".into(), qty: 1 };
        assert!(msg.into_command_payload().is_none());
    }

    #[test]
    fn heartbeat_has_no_command_payload() {
        let msg = ClientMessage::Heartbeat { sent_at: 1.0 };
        assert!(msg.into_command_payload().is_none());
    }

    #[test]
    fn player_view_carries_effective_max_health() {
        let actor = Actor::new_player(ActorId::new(1), Vec2::new(3.0, 4.0), 80.0);
        let view = PlayerView::from_actor(&actor, 100.0);
        assert_eq!(view.max_health, 80.0);
        assert_eq!(view.position, Vec2::new(3.0, 4.0));
        assert!(view.inventory.is_empty());
    }

    #[test]
    fn reject_reason_maps_to_wire_enum() {
        assert_eq!(RejectReasonWire::from(RejectReason::QueueLimit), RejectReasonWire::QueueLimit);
    }
}
