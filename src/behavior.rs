//! Particle behavior strategies.
//!
//! A behavior governs how a particle's velocity, opacity, and drawn shape
//! evolve over its life. Behaviors are a closed enum with one exhaustive
//! match in the tick step, so adding one is a compile-time-checked change
//! rather than an open-ended dispatch.
//!
//! # Behavior Kinds
//!
//! | Kind | Per-tick rule |
//! |------|---------------|
//! | [`BehaviorKind::Standard`] | Quadratic fade: `alpha = 1 - progress²` |
//! | [`BehaviorKind::Swarm`] | Circular steering; linear fade over the last 20% of life |
//! | [`BehaviorKind::Trail`] | Bounded position history; `alpha = min(1, 2(1 - progress))` |
//! | [`BehaviorKind::Explosion`] | Velocity damps to rest by mid-life; drawn size shrinks quadratically |
//!
//! # Example
//!
//! ```ignore
//! engine.set_behavior(BehaviorKind::Swarm, BehaviorOptions {
//!     angular_speed: RangeF::new(-2.0, 2.0),
//!     ..BehaviorOptions::default()
//! });
//! ```

use crate::config::RangeF;
use crate::particle::Particle;
use serde::{Deserialize, Serialize};

/// The available behavior strategies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BehaviorKind {
    /// Free-flying particle with a quadratic fade-out.
    #[default]
    Standard,

    /// Particles orbit on per-particle circles, giving a buzzing cloud.
    ///
    /// The heading advances by the particle's angular speed each tick and the
    /// velocity is re-aimed along it at the particle's orbit speed. Opacity
    /// stays full until the last 20% of life, then fades linearly.
    Swarm,

    /// Particle drags a bounded history of its past positions.
    ///
    /// Painters draw the history as a polyline. Opacity fades out over the
    /// second half of life.
    Trail,

    /// Debris flung from a burst: velocity decays to rest by mid-life while
    /// the drawn size shrinks quadratically.
    Explosion,
}

/// Tuning knobs for the behavior strategies.
///
/// One options struct covers all kinds; each kind reads only the fields it
/// cares about, which keeps [`set_behavior`](crate::engine::ParticleEngine::set_behavior)
/// a single call.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BehaviorOptions {
    /// Trail: maximum retained history points.
    pub trail_length: usize,
    /// Swarm: per-particle angular speed is sampled from this range at spawn.
    pub angular_speed: RangeF,
}

impl Default for BehaviorOptions {
    fn default() -> Self {
        Self {
            trail_length: 10,
            angular_speed: RangeF::new(-2.0, 2.0),
        }
    }
}

impl BehaviorKind {
    /// Advance one particle by one behavior tick.
    ///
    /// Runs after the gradient recolor and before global forces; mutates
    /// velocity, opacity, and the trail history only.
    pub(crate) fn step(
        &self,
        p: &mut Particle,
        progress: f32,
        dt: f32,
        options: &BehaviorOptions,
    ) {
        match self {
            BehaviorKind::Standard => {
                p.alpha = 1.0 - progress * progress;
            }
            BehaviorKind::Swarm => {
                p.angle += p.angular_speed * dt;
                p.vel.x = p.angle.cos() * p.orbit_speed;
                p.vel.y = p.angle.sin() * p.orbit_speed;
                p.alpha = if progress > 0.8 {
                    ((1.0 - progress) * 5.0).clamp(0.0, 1.0)
                } else {
                    1.0
                };
            }
            BehaviorKind::Trail => {
                if options.trail_length > 0 {
                    if p.trail.len() >= options.trail_length {
                        p.trail.remove(0);
                    }
                    p.trail.push(p.pos);
                } else {
                    p.trail.clear();
                }
                p.alpha = (2.0 * (1.0 - progress)).min(1.0);
            }
            BehaviorKind::Explosion => {
                let damp = 1.0 - (progress * 2.0).clamp(0.0, 1.0) * dt;
                p.vel *= damp.max(0.0);
                p.alpha = 1.0 - progress;
            }
        }
    }

    /// Render-time size multiplier for this behavior at the given progress.
    ///
    /// Only the explosion behavior shrinks its drawn size; the multiplier is
    /// applied by the render pass, never baked into the particle's `size`.
    #[inline]
    pub fn size_multiplier(&self, progress: f32) -> f32 {
        match self {
            BehaviorKind::Explosion => 1.0 - progress * progress,
            _ => 1.0,
        }
    }

    /// Whether painters should receive the particle's position history.
    #[inline]
    pub fn wants_trail(&self) -> bool {
        matches!(self, BehaviorKind::Trail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba;
    use glam::Vec2;

    fn live_particle(vel: Vec2, life: f32) -> Particle {
        let mut p = Particle::dead(16);
        p.reset(Vec2::ZERO, vel, 2.0, life, Rgba::WHITE, 1.0, 1);
        p
    }

    #[test]
    fn standard_fades_quadratically() {
        let opts = BehaviorOptions::default();
        let mut p = live_particle(Vec2::X, 10.0);
        BehaviorKind::Standard.step(&mut p, 0.5, 1.0, &opts);
        assert!((p.alpha - 0.75).abs() < 1e-6);

        BehaviorKind::Standard.step(&mut p, 1.0, 1.0, &opts);
        assert_eq!(p.alpha, 0.0);
    }

    #[test]
    fn swarm_advances_heading_and_keeps_orbit_speed() {
        let opts = BehaviorOptions::default();
        let mut p = live_particle(Vec2::new(3.0, 0.0), 10.0);
        let angle0 = p.angle;
        BehaviorKind::Swarm.step(&mut p, 0.1, 1.0, &opts);

        assert!((p.angle - (angle0 + 1.0)).abs() < 1e-6);
        assert!((p.vel.length() - 3.0).abs() < 1e-5);
    }

    #[test]
    fn swarm_fades_only_in_last_fifth_of_life() {
        let opts = BehaviorOptions::default();
        let mut p = live_particle(Vec2::X, 10.0);

        BehaviorKind::Swarm.step(&mut p, 0.79, 1.0, &opts);
        assert_eq!(p.alpha, 1.0);

        BehaviorKind::Swarm.step(&mut p, 0.9, 1.0, &opts);
        assert!((p.alpha - 0.5).abs() < 1e-5);

        BehaviorKind::Swarm.step(&mut p, 1.0, 1.0, &opts);
        assert!(p.alpha.abs() < 1e-5);
    }

    #[test]
    fn trail_history_is_bounded_and_ordered() {
        let opts = BehaviorOptions { trail_length: 3, ..Default::default() };
        let mut p = live_particle(Vec2::X, 100.0);
        for i in 0..6 {
            p.pos = Vec2::new(i as f32, 0.0);
            BehaviorKind::Trail.step(&mut p, 0.1, 1.0, &opts);
        }

        assert_eq!(p.trail.len(), 3);
        // Oldest dropped first: 3, 4, 5 remain.
        assert_eq!(p.trail[0].x, 3.0);
        assert_eq!(p.trail[2].x, 5.0);
    }

    #[test]
    fn trail_alpha_fades_over_second_half() {
        let opts = BehaviorOptions::default();
        let mut p = live_particle(Vec2::X, 10.0);

        BehaviorKind::Trail.step(&mut p, 0.25, 1.0, &opts);
        assert_eq!(p.alpha, 1.0);

        BehaviorKind::Trail.step(&mut p, 0.75, 1.0, &opts);
        assert!((p.alpha - 0.5).abs() < 1e-6);
    }

    #[test]
    fn explosion_velocity_decays_monotonically() {
        let opts = BehaviorOptions::default();
        let mut p = live_particle(Vec2::new(4.0, 0.0), 10.0);
        let mut prev = p.vel.length();
        for i in 1..=10 {
            let progress = i as f32 / 10.0;
            BehaviorKind::Explosion.step(&mut p, progress, 1.0, &opts);
            let mag = p.vel.length();
            assert!(mag <= prev + 1e-6, "velocity grew at progress {progress}");
            prev = mag;
        }
        // Fully damped by mid-life and beyond.
        assert!(p.vel.length() < 1e-4);
    }

    #[test]
    fn explosion_size_multiplier_shrinks_quadratically() {
        assert_eq!(BehaviorKind::Explosion.size_multiplier(0.0), 1.0);
        assert!((BehaviorKind::Explosion.size_multiplier(0.5) - 0.75).abs() < 1e-6);
        assert_eq!(BehaviorKind::Explosion.size_multiplier(1.0), 0.0);
        assert_eq!(BehaviorKind::Standard.size_multiplier(0.5), 1.0);
    }
}
