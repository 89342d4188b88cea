//! Per-NPC scratch state read and written by FSM conditions/actions.

use std::collections::BTreeMap;

use crate::geometry::Vec2;

/// Mutable state private to one NPC's AI evaluation: timers, waypoint
/// cursors, stuck counters. Deliberately a flat bag of named fields rather
/// than a generic map for the common cases, with an escape hatch map for
/// archetype-specific extras.
#[derive(Clone, Debug, Default)]
pub struct Blackboard {
    pub active_state: u32,
    pub waypoint_index: u32,
    pub waypoints: Vec<Vec2>,
    pub stuck_ticks: u32,
    pub last_position: Option<Vec2>,
    pub timer_secs: f64,
    pub extras: BTreeMap<String, f32>,
}

impl Blackboard {
    pub fn current_waypoint(&self) -> Option<Vec2> {
        self.waypoints.get(self.waypoint_index as usize).copied()
    }

    pub fn advance_waypoint(&mut self) {
        if self.waypoints.is_empty() {
            return;
        }
        self.waypoint_index = (self.waypoint_index + 1) % self.waypoints.len() as u32;
    }
}
