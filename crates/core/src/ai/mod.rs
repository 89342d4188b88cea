//! Deterministic AI executor: cadence-gated FSM evaluation per NPC.

pub mod blackboard;
pub mod fsm;

pub use blackboard::Blackboard;
pub use fsm::{goblin_fsm, AiCommand, AiContext, AiFsm, NearbyActor};

use crate::ids::ActorId;
use crate::world::World;

/// Runs the AI executor step (§4.7): NPCs due for a decision this tick
/// evaluate their compiled FSM and enqueue commands, which are staged into
/// the command queue exactly as a player's commands would be.
pub fn run(world: &mut World, now: f64) {
    let due: Vec<ActorId> = world.npc_ids_due_for_decision();
    for npc_id in due {
        let Some(archetype) = world.npc_archetype(npc_id) else { continue };
        let Some(fsm) = world.ai_registry.get(&archetype).cloned() else { continue };

        let Some(mut ctx) = world.build_ai_context(npc_id, now) else { continue };
        fsm.evaluate(&mut ctx);

        let commands = std::mem::take(&mut ctx.commands);
        let blackboard = ctx.blackboard.clone();
        world.apply_ai_result(npc_id, blackboard, commands, fsm.cadence_ticks);
    }
}
