//! The particle record.
//!
//! Plain data, owned by the engine's pool and reused in place. Records are
//! allocated once at engine construction; `reset` reinitializes a slot for
//! the next particle without touching the heap (the trail buffer keeps its
//! capacity across reuses).

use crate::color::Rgba;
use glam::Vec2;

/// A single simulated point-entity.
///
/// Behavior-specific scratch lives directly on the record: `angle`,
/// `angular_speed` and `orbit_speed` drive the swarm behavior, `trail` holds
/// the bounded position history for trail particles. Unused fields cost a
/// few bytes per slot and keep the pool homogeneous.
#[derive(Clone, Debug)]
pub struct Particle {
    /// Position in simulation space.
    pub pos: Vec2,
    /// Velocity in units per tick.
    pub vel: Vec2,
    /// Base drawn size. Audio and behavior multipliers apply at render time.
    pub size: f32,
    /// Ticks remaining. `life <= 0` means the slot is due for recycling.
    pub life: f32,
    /// Initial life, used to compute progress.
    pub max_life: f32,
    /// Color from the color model. Gradient mode rewrites this every tick.
    pub color: Rgba,
    /// Behavior-driven opacity, multiplied into `color.a` at render time.
    pub alpha: f32,
    /// Swarm: current heading in radians.
    pub angle: f32,
    /// Swarm: heading change per tick.
    pub angular_speed: f32,
    /// Swarm: orbit speed, captured from the spawn velocity.
    pub orbit_speed: f32,
    /// Trail: bounded position history, oldest first.
    pub trail: Vec<Vec2>,
    /// Admission order, for oldest-first eviction.
    pub(crate) seq: u64,
    /// Dead slots are skipped by every loop and sit on the free list.
    pub(crate) alive: bool,
}

impl Particle {
    /// A dead pool slot with trail capacity reserved up front.
    pub(crate) fn dead(trail_capacity: usize) -> Self {
        Self {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            size: 0.0,
            life: 0.0,
            max_life: 1.0,
            color: Rgba::WHITE,
            alpha: 1.0,
            angle: 0.0,
            angular_speed: 0.0,
            orbit_speed: 0.0,
            trail: Vec::with_capacity(trail_capacity),
            seq: 0,
            alive: false,
        }
    }

    /// Reinitialize this slot for a freshly admitted particle.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn reset(
        &mut self,
        pos: Vec2,
        vel: Vec2,
        size: f32,
        life: f32,
        color: Rgba,
        angular_speed: f32,
        seq: u64,
    ) {
        self.pos = pos;
        self.vel = vel;
        self.size = size;
        self.life = life;
        self.max_life = life;
        self.color = color;
        self.alpha = 1.0;
        self.angle = vel.y.atan2(vel.x);
        self.angular_speed = angular_speed;
        self.orbit_speed = vel.length();
        self.trail.clear();
        self.seq = seq;
        self.alive = true;
    }

    /// Normalized age: `1 - life / max_life`, in 0-1.
    #[inline]
    pub fn progress(&self) -> f32 {
        if self.max_life > 0.0 {
            (1.0 - self.life / self.max_life).clamp(0.0, 1.0)
        } else {
            1.0
        }
    }

    /// Whether this slot currently holds a live particle.
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.alive
    }
}
