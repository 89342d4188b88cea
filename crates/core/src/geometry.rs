//! Axis-aligned rectangles, circle/rect overlap, and the facing enum.
//!
//! Everything here is a pure function of its inputs: no access to world
//! state, no RNG. Subsystems compose these primitives for collision and
//! overlap queries.

use std::f32::consts::TAU;

/// A 2D vector / point in world units.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f32 {
        self.length_sq().sqrt()
    }

    pub fn length_sq(self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    /// Returns the unit vector in the same direction, or `Vec2::ZERO` if this
    /// vector is degenerate (zero length or non-finite).
    pub fn normalized(self) -> Self {
        if !self.x.is_finite() || !self.y.is_finite() {
            return Self::ZERO;
        }
        let len = self.length();
        if len <= f32::EPSILON {
            Self::ZERO
        } else {
            Self::new(self.x / len, self.y / len)
        }
    }

    pub fn scale(self, s: f32) -> Self {
        Self::new(self.x * s, self.y * s)
    }

    pub fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }

    pub fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }

    pub fn distance(self, other: Self) -> f32 {
        self.sub(other).length()
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Derives a cardinal facing from this vector's dominant axis.
    ///
    /// Ties (equal magnitude on both axes, or the zero vector) resolve to
    /// the vertical axis, matching the spec's "vertical tie-break" rule.
    pub fn to_facing(self) -> Facing {
        if self.x.abs() > self.y.abs() {
            if self.x >= 0.0 { Facing::Right } else { Facing::Left }
        } else if self.y >= 0.0 {
            Facing::Down
        } else {
            Facing::Up
        }
    }
}

/// Cardinal facing direction. `Down`/`Up` follow screen-space convention
/// (positive y is down).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Facing {
    Up,
    Down,
    Left,
    Right,
}

impl Facing {
    pub fn unit_vector(self) -> Vec2 {
        match self {
            Facing::Up => Vec2::new(0.0, -1.0),
            Facing::Down => Vec2::new(0.0, 1.0),
            Facing::Left => Vec2::new(-1.0, 0.0),
            Facing::Right => Vec2::new(1.0, 0.0),
        }
    }
}

impl Default for Facing {
    fn default() -> Self {
        Facing::Down
    }
}

/// Axis-aligned bounding box, stored as center + half-extent.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Aabb {
    pub center: Vec2,
    pub half_extent: Vec2,
}

impl Aabb {
    pub fn new(center: Vec2, half_extent: Vec2) -> Self {
        Self { center, half_extent }
    }

    pub fn square(center: Vec2, half_extent: f32) -> Self {
        Self::new(center, Vec2::new(half_extent, half_extent))
    }

    pub fn min(&self) -> Vec2 {
        self.center.sub(self.half_extent)
    }

    pub fn max(&self) -> Vec2 {
        self.center.add(self.half_extent)
    }

    pub fn overlaps(&self, other: &Aabb) -> bool {
        let a_min = self.min();
        let a_max = self.max();
        let b_min = other.min();
        let b_max = other.max();
        a_min.x <= b_max.x && a_max.x >= b_min.x && a_min.y <= b_max.y && a_max.y >= b_min.y
    }

    pub fn contains_point(&self, p: Vec2) -> bool {
        let min = self.min();
        let max = self.max();
        p.x >= min.x && p.x <= max.x && p.y >= min.y && p.y <= max.y
    }
}

/// Circle-vs-rectangle overlap test (closest-point method).
pub fn circle_rect_overlap(circle_center: Vec2, radius: f32, rect: &Aabb) -> bool {
    let min = rect.min();
    let max = rect.max();
    let closest_x = circle_center.x.clamp(min.x, max.x);
    let closest_y = circle_center.y.clamp(min.y, max.y);
    let dx = circle_center.x - closest_x;
    let dy = circle_center.y - closest_y;
    dx * dx + dy * dy <= radius * radius
}

/// Draws a uniformly random point in an angular annulus `[min_dist, max_dist]`
/// around `center`, used by ground-item scatter placement.
pub fn scatter_point(rng: &impl crate::rng::RngOracle, seed: u64, center: Vec2, min_dist: f32, max_dist: f32) -> Vec2 {
    let angle = rng.unit_f32(seed) * TAU;
    let dist = min_dist + rng.unit_f32(seed ^ 0x9E37_79B9_7F4A_7C15) * (max_dist - min_dist).max(0.0);
    Vec2::new(center.x + angle.cos() * dist, center.y + angle.sin() * dist)
}
