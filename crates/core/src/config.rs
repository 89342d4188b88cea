//! World configuration: tick rate, world bounds, and tunable capacities.

/// Simulation-wide configuration, built once at world construction.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldConfig {
    /// Fixed simulation rate in Hz. The tick loop advances by `1.0 / tick_rate_hz` seconds.
    pub tick_rate_hz: f32,
    /// Width and height of the playable arena, in world units.
    pub world_width: f32,
    pub world_height: f32,
    /// Seed driving the world-local RNG (obstacle layout, scatter placement).
    pub seed: u64,
    /// Player/NPC half-extent used for collision and world clamping.
    pub actor_half_extent: f32,
    /// Movement speed applied to a normalized movement intent, in world units per second.
    pub actor_speed: f32,
    /// Minimum separation iterations per tick before giving up on overlap resolution.
    pub collision_iterations: u32,
    /// Missed heartbeats before a subscription is disconnected.
    pub heartbeat_timeout_intervals: u32,
    /// Interval between heartbeats, in seconds (used with the timeout above).
    pub heartbeat_interval_secs: f32,
    /// Default cadence (in ticks) for forced keyframes, overridable per subscription.
    pub default_keyframe_cadence: u64,
    /// Epsilon below which a health delta is treated as a no-op.
    pub health_epsilon: f32,
    /// Baseline max health used for generic actors that don't declare one.
    pub generic_max_health: f32,
}

impl WorldConfig {
    pub const DEFAULT_TICK_RATE_HZ: f32 = 15.0;
    pub const DEFAULT_COLLISION_ITERATIONS: u32 = 4;
    pub const DEFAULT_HEARTBEAT_TIMEOUT_INTERVALS: u32 = 3;
    pub const DEFAULT_HEARTBEAT_INTERVAL_SECS: f32 = 2.0;
    pub const DEFAULT_KEYFRAME_CADENCE: u64 = 150; // ~10s at 15Hz
    pub const DEFAULT_HEALTH_EPSILON: f32 = 1e-3;
    pub const DEFAULT_GENERIC_MAX_HEALTH: f32 = 100.0;
    pub const DEFAULT_ACTOR_SPEED: f32 = 400.0;

    pub fn new(seed: u64, world_width: f32, world_height: f32) -> Self {
        Self {
            tick_rate_hz: Self::DEFAULT_TICK_RATE_HZ,
            world_width,
            world_height,
            seed,
            actor_half_extent: 16.0,
            actor_speed: Self::DEFAULT_ACTOR_SPEED,
            collision_iterations: Self::DEFAULT_COLLISION_ITERATIONS,
            heartbeat_timeout_intervals: Self::DEFAULT_HEARTBEAT_TIMEOUT_INTERVALS,
            heartbeat_interval_secs: Self::DEFAULT_HEARTBEAT_INTERVAL_SECS,
            default_keyframe_cadence: Self::DEFAULT_KEYFRAME_CADENCE,
            health_epsilon: Self::DEFAULT_HEALTH_EPSILON,
            generic_max_health: Self::DEFAULT_GENERIC_MAX_HEALTH,
        }
    }

    /// Fixed delta time for a single tick, in seconds.
    pub fn dt(&self) -> f32 {
        1.0 / self.tick_rate_hz
    }

    /// Seconds of silence tolerated before a subscription is treated as dead.
    pub fn heartbeat_timeout_secs(&self) -> f32 {
        self.heartbeat_interval_secs * self.heartbeat_timeout_intervals as f32
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self::new(0, 2000.0, 2000.0)
    }
}
