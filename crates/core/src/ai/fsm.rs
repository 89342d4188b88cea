//! Compiled FSM tables: states, transitions, and actions, evaluated per NPC
//! per decision cadence.
//!
//! Transitions and actions are [`Behavior`] nodes from the sibling
//! `behavior-tree` crate rather than ad-hoc closures: composite conditions
//! (e.g. "nearest non-rat within aggro range AND line of sight") compose
//! with [`behavior_tree::Sequence`]/[`behavior_tree::Selector`] instead of
//! growing a bespoke condition language.

use behavior_tree::{always_succeed, selector, sequence, Behavior, Inverter, Status};

use crate::ai::blackboard::Blackboard;
use crate::geometry::Vec2;
use crate::ids::ActorId;

/// Read-only snapshot of one nearby actor, gathered before FSM evaluation so
/// condition/action nodes never borrow the world directly.
#[derive(Clone, Debug)]
pub struct NearbyActor {
    pub id: ActorId,
    pub position: Vec2,
    pub tag: String,
}

/// Commands an AI action may enqueue. Mirrors the inbound command surface
/// (§4.7: "actions may only enqueue standard commands").
#[derive(Clone, Debug, PartialEq)]
pub enum AiCommand {
    Move { dx: f32, dy: f32 },
    Face(crate::geometry::Facing),
    Action(String),
}

/// Owned, 'static evaluation context for one NPC's FSM tick. Built from a
/// world snapshot, mutated during evaluation, and applied back afterward.
pub struct AiContext {
    pub actor: ActorId,
    pub position: Vec2,
    pub now: f64,
    pub nearby: Vec<NearbyActor>,
    pub blackboard: Blackboard,
    pub random_unit: f32,
    pub commands: Vec<AiCommand>,
}

impl AiContext {
    pub fn nearest_with_tag_not(&self, excluded_tag: &str, within: f32) -> Option<&NearbyActor> {
        self.nearby
            .iter()
            .filter(|a| a.tag != excluded_tag && a.position.distance(self.position) <= within)
            .min_by(|a, b| {
                a.position
                    .distance(self.position)
                    .partial_cmp(&b.position.distance(self.position))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    }
}

/// Condition: succeeds when no actor other than `excluded_tag` is within
/// `radius` of the NPC. Named for the spec's "nonRatWithin" predicate.
pub struct NonTagWithin {
    pub excluded_tag: &'static str,
    pub radius: f32,
}

impl Behavior<AiContext> for NonTagWithin {
    fn tick(&self, ctx: &mut AiContext) -> Status {
        if ctx.nearest_with_tag_not(self.excluded_tag, self.radius).is_some() {
            Status::Success
        } else {
            Status::Failure
        }
    }
}

/// Condition that always succeeds, used as the default fallback transition.
pub struct AlwaysTrue;

impl Behavior<AiContext> for AlwaysTrue {
    fn tick(&self, _ctx: &mut AiContext) -> Status {
        Status::Success
    }
}

/// Action: advances the blackboard's waypoint cursor and enqueues movement
/// toward the new waypoint.
pub struct PatrolStep;

impl Behavior<AiContext> for PatrolStep {
    fn tick(&self, ctx: &mut AiContext) -> Status {
        ctx.blackboard.advance_waypoint();
        let Some(target) = ctx.blackboard.current_waypoint() else {
            return Status::Failure;
        };
        let delta = target.sub(ctx.position).normalized();
        ctx.commands.push(AiCommand::Move { dx: delta.x, dy: delta.y });
        ctx.commands.push(AiCommand::Face(delta.to_facing()));
        Status::Success
    }
}

/// Condition: the nearest non-excluded-tag actor within `search_radius` is
/// also within `attack_range`.
pub struct TargetInAttackRange {
    pub excluded_tag: &'static str,
    pub search_radius: f32,
    pub attack_range: f32,
}

impl Behavior<AiContext> for TargetInAttackRange {
    fn tick(&self, ctx: &mut AiContext) -> Status {
        match ctx.nearest_with_tag_not(self.excluded_tag, self.search_radius) {
            Some(target) if target.position.distance(ctx.position) <= self.attack_range => Status::Success,
            _ => Status::Failure,
        }
    }
}

/// Action: triggers the `attack` ability. Always succeeds; whether the
/// ability actually fires is the cooldown gate's call.
pub struct Attack;

impl Behavior<AiContext> for Attack {
    fn tick(&self, ctx: &mut AiContext) -> Status {
        ctx.commands.push(AiCommand::Action("attack".to_string()));
        Status::Success
    }
}

/// Action: moves and faces toward the nearest non-excluded-tag actor within
/// `search_radius`. Fails if none is in range.
pub struct ChaseTarget {
    pub excluded_tag: &'static str,
    pub search_radius: f32,
}

impl Behavior<AiContext> for ChaseTarget {
    fn tick(&self, ctx: &mut AiContext) -> Status {
        let Some(target) = ctx.nearest_with_tag_not(self.excluded_tag, self.search_radius).cloned() else {
            return Status::Failure;
        };
        let unit = target.position.sub(ctx.position).normalized();
        ctx.commands.push(AiCommand::Move { dx: unit.x, dy: unit.y });
        ctx.commands.push(AiCommand::Face(unit.to_facing()));
        Status::Success
    }
}

/// Builds the chase state's action: attack if in range, otherwise close the
/// distance. Composed from [`behavior_tree::Sequence`]/[`behavior_tree::Selector`]
/// rather than a single monolithic node, wrapped in
/// [`behavior_tree::AlwaysSucceed`] since the state machine doesn't branch
/// on an action's result.
fn chase_and_attack(excluded_tag: &'static str, aggro_radius: f32, attack_range: f32) -> Box<dyn Behavior<AiContext>> {
    let search_radius = aggro_radius * 1.5;
    always_succeed(selector(vec![
        sequence(vec![
            Box::new(TargetInAttackRange { excluded_tag, search_radius, attack_range }),
            Box::new(Attack),
        ]),
        Box::new(ChaseTarget { excluded_tag, search_radius }),
    ]))
}

/// One compiled FSM state: ordered transitions (first matching condition
/// wins) plus the actions run when this state is active.
pub struct AiState {
    pub name: &'static str,
    pub transitions: Vec<(Box<dyn Behavior<AiContext>>, u32)>,
    pub actions: Vec<Box<dyn Behavior<AiContext>>>,
}

/// An index-keyed, ahead-of-time compiled state machine. No string lookups
/// occur during [`AiFsm::evaluate`]: state ids are array indices.
pub struct AiFsm {
    pub states: Vec<AiState>,
    pub cadence_ticks: u64,
}

impl AiFsm {
    /// Evaluates transitions of `ctx.blackboard.active_state` in order,
    /// switches to the first whose condition holds, then runs that state's
    /// actions. Falls back to staying in the current state if none match
    /// (should not happen given a well-formed table with a catch-all).
    pub fn evaluate(&self, ctx: &mut AiContext) {
        let current = ctx.blackboard.active_state as usize;
        if let Some(state) = self.states.get(current) {
            for (condition, target) in &state.transitions {
                if condition.tick(ctx).is_success() {
                    ctx.blackboard.active_state = *target;
                    break;
                }
            }
        }
        let active = ctx.blackboard.active_state as usize;
        if let Some(state) = self.states.get(active) {
            for action in &state.actions {
                action.tick(ctx);
            }
        }
    }
}

/// Builds the goblin patrol/chase FSM used by the default archetype
/// registry: Patrol while no player-tagged actor is within aggro range,
/// Chase/Attack once one enters it.
pub fn goblin_fsm(aggro_radius: f32, attack_range: f32) -> AiFsm {
    const PATROL: u32 = 0;
    const CHASE: u32 = 1;

    AiFsm {
        cadence_ticks: 6,
        states: vec![
            AiState {
                name: "patrol",
                transitions: vec![
                    (Box::new(NonTagWithin { excluded_tag: "rat", radius: aggro_radius }), CHASE),
                    (Box::new(AlwaysTrue), PATROL),
                ],
                actions: vec![Box::new(PatrolStep)],
            },
            AiState {
                name: "chase",
                transitions: vec![
                    (Box::new(Inverter::new(Box::new(NonTagWithin { excluded_tag: "rat", radius: aggro_radius * 1.5 }))), PATROL),
                    (Box::new(AlwaysTrue), CHASE),
                ],
                actions: vec![chase_and_attack("rat", aggro_radius, attack_range)],
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(position: Vec2, nearby: Vec<NearbyActor>) -> AiContext {
        AiContext {
            actor: ActorId::new(1),
            position,
            now: 0.0,
            nearby,
            blackboard: Blackboard { waypoints: vec![Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0)], ..Default::default() },
            random_unit: 0.0,
            commands: Vec::new(),
        }
    }

    #[test]
    fn stays_in_patrol_without_targets() {
        let fsm = goblin_fsm(50.0, 5.0);
        let mut ctx = context(Vec2::ZERO, vec![]);
        fsm.evaluate(&mut ctx);
        assert_eq!(ctx.blackboard.active_state, 0);
        assert!(!ctx.commands.is_empty());
    }

    #[test]
    fn switches_to_chase_when_target_in_range() {
        let fsm = goblin_fsm(50.0, 5.0);
        let nearby = vec![NearbyActor { id: ActorId::new(2), position: Vec2::new(10.0, 0.0), tag: "player".to_string() }];
        let mut ctx = context(Vec2::ZERO, nearby);
        fsm.evaluate(&mut ctx);
        assert_eq!(ctx.blackboard.active_state, 1);
    }

    #[test]
    fn patrol_toggles_waypoint_deterministically() {
        let fsm = goblin_fsm(50.0, 5.0);
        let mut ctx = context(Vec2::ZERO, vec![]);
        fsm.evaluate(&mut ctx);
        let first = ctx.blackboard.waypoint_index;
        ctx.commands.clear();
        fsm.evaluate(&mut ctx);
        let second = ctx.blackboard.waypoint_index;
        assert_ne!(first, second);
    }
}
