//! The particle engine.
//!
//! Owns the pooled particle records, schedules emission, integrates physics
//! each tick, and delegates color, behavior, and boundary handling to the
//! respective modules. One engine per visual effect; engines share nothing.
//!
//! # Pooling
//!
//! All records are allocated once at construction. Retired particles go on a
//! free-index list and are reinitialized in place on the next admission; when
//! the pool is full, the oldest live particle is evicted and its record
//! reused. After warm-up a running engine performs no allocation.
//!
//! # Tick order
//!
//! For every live particle, `update` runs, in this exact order: life
//! decrement (and retirement at `life <= 0`), progress computation, gradient
//! recolor, behavior step, global forces (wind and gravity, then friction,
//! then turbulence), position integration, boundary policy. Emission of new
//! particles happens after the per-particle pass.
//!
//! # Example
//!
//! ```ignore
//! let mut engine = ParticleEngine::new(ParticleSystemConfig::embers());
//! let mut mapper = AudioReactivityMapper::new();
//!
//! // once per render tick:
//! mapper.apply(&mut engine, audio.latest_frame());
//! engine.update(1.0, Bounds::new(width, height));
//! engine.render(&mut painter);
//! ```

use crate::bounds::{Bounds, Rect};
use crate::behavior::{BehaviorKind, BehaviorOptions};
use crate::color::Rgba;
use crate::config::ParticleSystemConfig;
use crate::particle::Particle;
use crate::render::{ParticleShape, RenderAdapter, RenderParticle};
use crate::spawn::SpawnRng;
use glam::Vec2;
use log::warn;

/// Live simulation parameters, seeded from the config and rewritten every
/// tick by the audio mapper.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LiveParams {
    /// Particles emitted per tick (fractional rates emit stochastically).
    pub emission_rate: f32,
    /// Render-time size multiplier; never baked into particle sizes.
    pub size_multiplier: f32,
    /// Gravity acceleration per tick².
    pub gravity: Vec2,
    /// Wind acceleration per tick².
    pub wind: Vec2,
}

impl LiveParams {
    fn from_config(config: &ParticleSystemConfig) -> Self {
        Self {
            emission_rate: config.emission_rate,
            size_multiplier: 1.0,
            gravity: config.gravity,
            wind: config.wind,
        }
    }
}

/// Optional per-field overrides for [`ParticleEngine::add_particle`].
///
/// Unset fields fall back to config defaults: a random position in the
/// emission area, a random velocity in the unit square, size and lifespan
/// sampled from the configured ranges, and the color model at progress 0.
#[derive(Clone, Copy, Debug, Default)]
pub struct ParticleOverrides {
    /// Spawn position.
    pub pos: Option<Vec2>,
    /// Spawn velocity.
    pub vel: Option<Vec2>,
    /// Base size.
    pub size: Option<f32>,
    /// Lifespan in ticks.
    pub lifespan: Option<f32>,
    /// Initial color.
    pub color: Option<Rgba>,
}

/// A pooled, audio-reactive 2D particle simulation.
pub struct ParticleEngine {
    config: ParticleSystemConfig,
    params: LiveParams,
    particles: Vec<Particle>,
    free: Vec<usize>,
    rng: SpawnRng,
    next_seq: u64,
}

impl ParticleEngine {
    /// Create an engine seeded from OS entropy.
    pub fn new(config: ParticleSystemConfig) -> Self {
        Self::build(config, SpawnRng::from_entropy())
    }

    /// Create an engine with a fixed RNG seed.
    ///
    /// Emission, turbulence, and random colors become exact, replayable
    /// sequences; property tests rely on this.
    pub fn seeded(config: ParticleSystemConfig, seed: u64) -> Self {
        Self::build(config, SpawnRng::seeded(seed))
    }

    fn build(mut config: ParticleSystemConfig, rng: SpawnRng) -> Self {
        config.sanitize();
        let capacity = config.max_particles;
        let trail_capacity = config.behavior_options.trail_length;
        let particles = (0..capacity)
            .map(|_| Particle::dead(trail_capacity))
            .collect();
        // Low indices pop first.
        let free = (0..capacity).rev().collect();

        Self {
            params: LiveParams::from_config(&config),
            config,
            particles,
            free,
            rng,
            next_seq: 0,
        }
    }

    // =========================================================================
    // ADMISSION
    // =========================================================================

    /// Admit one particle, applying `overrides` over config defaults.
    ///
    /// Never fails: at capacity the oldest live particle is evicted and its
    /// record reused in place. Returns the pool slot index.
    pub fn add_particle(&mut self, overrides: ParticleOverrides) -> usize {
        let idx = match self.free.pop() {
            Some(idx) => idx,
            None => self.evict_oldest(),
        };

        let pos = overrides
            .pos
            .unwrap_or_else(|| self.rng.point_in_rect(&self.config.emission_area));
        let vel = overrides
            .vel
            .unwrap_or_else(|| self.rng.unit_square_velocity());
        let size = overrides
            .size
            .unwrap_or_else(|| self.config.size.sample(&mut self.rng));
        let life = overrides
            .lifespan
            .unwrap_or_else(|| self.config.lifespan.sample(&mut self.rng));
        let color = overrides
            .color
            .unwrap_or_else(|| self.config.color_mode.resolve(0.0, &mut self.rng));
        let angular_speed = self.config.behavior_options.angular_speed.sample(&mut self.rng);

        let seq = self.next_seq;
        self.next_seq += 1;
        self.particles[idx].reset(pos, vel, size, life, color, angular_speed, seq);
        idx
    }

    /// Slot of the oldest live particle (smallest admission sequence).
    fn evict_oldest(&mut self) -> usize {
        let mut oldest = 0;
        let mut oldest_seq = u64::MAX;
        for (i, p) in self.particles.iter().enumerate() {
            if p.is_alive() && p.seq < oldest_seq {
                oldest_seq = p.seq;
                oldest = i;
            }
        }
        oldest
    }

    /// Spawn a radial burst: `count` particles flung from `center` with
    /// per-particle speed uniform in `[0, speed)`.
    ///
    /// Independent of continuous emission; used for beat and collision
    /// reactions.
    pub fn create_explosion(
        &mut self,
        center: Vec2,
        count: u32,
        speed: f32,
        size: f32,
        lifespan: f32,
        color: Rgba,
    ) {
        let speed = if speed.is_finite() { speed.max(0.0) } else { 0.0 };
        for _ in 0..count {
            let dir = self.rng.radial_direction();
            let spd = self.rng.range(0.0, speed);
            self.add_particle(ParticleOverrides {
                pos: Some(center),
                vel: Some(dir * spd),
                size: Some(size),
                lifespan: Some(lifespan),
                color: Some(color),
            });
        }
    }

    /// Radial burst from the emission area center with config-sampled size,
    /// lifespan, and color. Called by the audio mapper on beat edges.
    pub(crate) fn spawn_beat_burst(&mut self, count: u32, speed: f32) {
        let center = self.config.emission_area.center();
        let speed = if speed.is_finite() { speed.max(0.0) } else { 0.0 };
        for _ in 0..count {
            let dir = self.rng.radial_direction();
            let spd = self.rng.range(0.0, speed);
            self.add_particle(ParticleOverrides {
                pos: Some(center),
                vel: Some(dir * spd),
                ..Default::default()
            });
        }
    }

    // =========================================================================
    // SIMULATION
    // =========================================================================

    /// Advance the simulation by `dt` ticks and emit new particles.
    ///
    /// Called once per render tick. Never blocks and, after warm-up, never
    /// allocates.
    pub fn update(&mut self, dt: f32, bounds: Bounds) {
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }

        let behavior = self.config.behavior;
        for i in 0..self.particles.len() {
            let p = &mut self.particles[i];
            if !p.alive {
                continue;
            }

            p.life -= dt;
            if p.life <= 0.0 {
                p.alive = false;
                self.free.push(i);
                continue;
            }
            let progress = p.progress();

            if self.config.color_mode.is_progress_driven() {
                p.color = self.config.color_mode.resolve(progress, &mut self.rng);
            }

            behavior.step(p, progress, dt, &self.config.behavior_options);

            p.vel += (self.params.gravity + self.params.wind) * dt;
            p.vel *= self.config.friction;
            if self.config.turbulence > 0.0 {
                p.vel.x += self.rng.signed() * self.config.turbulence * dt;
                p.vel.y += self.rng.signed() * self.config.turbulence * dt;
            }

            p.pos += p.vel;

            self.config.boundary.apply(&mut p.pos, &mut p.vel, bounds);
        }

        self.emit();
    }

    /// Continuous emission with stochastic rounding: `floor(rate)` particles
    /// unconditionally plus one more with probability `fract(rate)`, so the
    /// average tracks fractional rates exactly.
    fn emit(&mut self) {
        let rate = self.params.emission_rate.max(0.0);
        // More than a pool's worth per tick only churns the pool.
        let whole = rate.floor().min(self.particles.len() as f32) as usize;
        for _ in 0..whole {
            self.add_particle(ParticleOverrides::default());
        }
        let frac = rate - rate.floor();
        if self.rng.chance(frac) {
            self.add_particle(ParticleOverrides::default());
        }
    }

    /// Draw every live particle through the adapter.
    ///
    /// The engine holds no render state; size and opacity multipliers are
    /// folded into the view handed to the painter.
    pub fn render(&self, adapter: &mut dyn RenderAdapter) {
        adapter.begin(self.config.blend_mode);
        for p in self.particles.iter().filter(|p| p.alive) {
            let progress = p.progress();
            let size =
                p.size * self.params.size_multiplier * self.config.behavior.size_multiplier(progress);
            let particle = RenderParticle {
                pos: p.pos,
                size,
                color: p.color.with_alpha_scaled(p.alpha),
                behavior: self.config.behavior,
                shape: ParticleShape::for_behavior(self.config.behavior),
                trail: self.config.behavior.wants_trail().then(|| p.trail.as_slice()),
            };
            adapter.draw_particle(&particle);
        }
    }

    // =========================================================================
    // RECONFIGURATION
    // =========================================================================

    /// Move the emission area. Takes effect on the next `update`.
    ///
    /// A non-finite or negative-size rectangle is ignored with a warning.
    pub fn set_emission_area(&mut self, rect: Rect) {
        let finite =
            rect.x.is_finite() && rect.y.is_finite() && rect.w.is_finite() && rect.h.is_finite();
        if !finite || rect.w < 0.0 || rect.h < 0.0 {
            warn!("ignoring invalid emission area {rect:?}");
            return;
        }
        self.config.emission_area = rect;
    }

    /// Swap the behavior strategy. Takes effect on the next `update`;
    /// existing particles keep their scratch state.
    pub fn set_behavior(&mut self, kind: BehaviorKind, options: BehaviorOptions) {
        self.config.behavior = kind;
        self.config.behavior_options = options;
    }

    /// Set the live emission rate (particles per tick).
    pub fn set_emission_rate(&mut self, rate: f32) {
        if rate.is_finite() {
            self.params.emission_rate = rate.max(0.0);
        }
    }

    /// Set the render-time size multiplier.
    pub fn set_size_multiplier(&mut self, multiplier: f32) {
        if multiplier.is_finite() {
            self.params.size_multiplier = multiplier.max(0.0);
        }
    }

    /// Set the vertical gravity component.
    pub fn set_gravity_y(&mut self, gravity_y: f32) {
        if gravity_y.is_finite() {
            self.params.gravity.y = gravity_y;
        }
    }

    /// Set the horizontal wind component.
    pub fn set_wind_x(&mut self, wind_x: f32) {
        if wind_x.is_finite() {
            self.params.wind.x = wind_x;
        }
    }

    /// Retire every live particle.
    pub fn clear(&mut self) {
        for (i, p) in self.particles.iter_mut().enumerate() {
            if p.alive {
                p.alive = false;
                self.free.push(i);
            }
        }
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    /// Number of live particles.
    pub fn live_count(&self) -> usize {
        self.particles.iter().filter(|p| p.alive).count()
    }

    /// Pool capacity (`max_particles`).
    pub fn capacity(&self) -> usize {
        self.particles.len()
    }

    /// Iterate the live particles.
    pub fn particles(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter().filter(|p| p.alive)
    }

    /// The particle record in a pool slot, live or not.
    pub fn slot(&self, idx: usize) -> Option<&Particle> {
        self.particles.get(idx)
    }

    /// The sanitized configuration.
    pub fn config(&self) -> &ParticleSystemConfig {
        &self.config
    }

    /// The current audio-mapped live parameters.
    pub fn params(&self) -> &LiveParams {
        &self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounds::BoundaryPolicy;
    use crate::render::BlendMode;

    fn bounds() -> Bounds {
        Bounds::new(800.0, 600.0)
    }

    fn quiet_config() -> ParticleSystemConfig {
        ParticleSystemConfig::default()
            .with_emission_rate(0.0)
            .with_lifespan(100.0, 100.0)
    }

    struct CountingAdapter {
        draws: usize,
        last_size: f32,
        blend: Option<BlendMode>,
    }

    impl CountingAdapter {
        fn new() -> Self {
            Self { draws: 0, last_size: 0.0, blend: None }
        }
    }

    impl RenderAdapter for CountingAdapter {
        fn begin(&mut self, blend: BlendMode) {
            self.blend = Some(blend);
        }
        fn draw_particle(&mut self, p: &RenderParticle<'_>) {
            self.draws += 1;
            self.last_size = p.size;
        }
    }

    #[test]
    fn live_count_never_exceeds_capacity() {
        let config = quiet_config().with_max_particles(5).with_emission_rate(3.0);
        let mut engine = ParticleEngine::seeded(config, 1);
        for _ in 0..50 {
            engine.update(1.0, bounds());
            assert!(engine.live_count() <= engine.capacity());
        }
        assert_eq!(engine.live_count(), 5);
    }

    #[test]
    fn full_pool_evicts_oldest_and_reuses_slot() {
        let config = quiet_config().with_max_particles(1).with_emission_rate(1.0);
        let mut engine = ParticleEngine::seeded(config, 1);

        engine.update(1.0, bounds());
        assert_eq!(engine.live_count(), 1);
        let first_seq = engine.slot(0).unwrap().seq;

        let idx = engine.add_particle(ParticleOverrides {
            pos: Some(Vec2::new(7.0, 7.0)),
            ..Default::default()
        });
        // Same backing record, new occupant.
        assert_eq!(idx, 0);
        assert_eq!(engine.live_count(), 1);
        let p = engine.slot(0).unwrap();
        assert_eq!(p.pos, Vec2::new(7.0, 7.0));
        assert!(p.seq > first_seq);
    }

    #[test]
    fn integer_rate_emits_exactly_per_tick() {
        let config = quiet_config().with_max_particles(100).with_emission_rate(3.0);
        let mut engine = ParticleEngine::seeded(config, 1);
        engine.update(1.0, bounds());
        assert_eq!(engine.live_count(), 3);
        engine.update(1.0, bounds());
        assert_eq!(engine.live_count(), 6);
    }

    #[test]
    fn particle_retires_exactly_once() {
        let config = quiet_config().with_max_particles(10).with_lifespan(3.0, 3.0);
        let mut engine = ParticleEngine::seeded(config, 1);
        engine.add_particle(ParticleOverrides::default());

        engine.update(1.0, bounds());
        engine.update(1.0, bounds());
        assert_eq!(engine.live_count(), 1);
        // life hits 0 on the third tick.
        engine.update(1.0, bounds());
        assert_eq!(engine.live_count(), 0);
        engine.update(1.0, bounds());
        assert_eq!(engine.live_count(), 0);
    }

    #[test]
    fn gravity_wind_and_friction_shape_velocity() {
        let config = quiet_config()
            .with_max_particles(4)
            .with_gravity(Vec2::new(0.0, 0.5))
            .with_wind(Vec2::new(0.25, 0.0))
            .with_friction(0.5);
        let mut engine = ParticleEngine::seeded(config, 1);
        let idx = engine.add_particle(ParticleOverrides {
            pos: Some(Vec2::new(400.0, 300.0)),
            vel: Some(Vec2::ZERO),
            ..Default::default()
        });

        engine.update(1.0, bounds());
        let p = engine.slot(idx).unwrap();
        // (0 + wind) * friction, (0 + gravity) * friction
        assert!((p.vel.x - 0.125).abs() < 1e-6);
        assert!((p.vel.y - 0.25).abs() < 1e-6);
        assert_eq!(p.pos, Vec2::new(400.125, 300.25));
    }

    #[test]
    fn wrap_policy_keeps_particles_in_bounds() {
        let config = quiet_config()
            .with_max_particles(4)
            .with_boundary(BoundaryPolicy::Wrap);
        let mut engine = ParticleEngine::seeded(config, 1);
        engine.add_particle(ParticleOverrides {
            pos: Some(Vec2::new(799.5, 0.5)),
            vel: Some(Vec2::new(3.0, -2.0)),
            ..Default::default()
        });

        for _ in 0..20 {
            engine.update(1.0, bounds());
            for p in engine.particles() {
                assert!((0.0..800.0).contains(&p.pos.x));
                assert!((0.0..600.0).contains(&p.pos.y));
            }
        }
    }

    #[test]
    fn explosion_spawns_count_radial_particles() {
        let config = quiet_config().with_max_particles(64);
        let mut engine = ParticleEngine::seeded(config, 1);
        engine.create_explosion(Vec2::new(10.0, 10.0), 16, 4.0, 2.0, 30.0, Rgba::WHITE);

        assert_eq!(engine.live_count(), 16);
        for p in engine.particles() {
            assert_eq!(p.pos, Vec2::new(10.0, 10.0));
            assert!(p.vel.length() < 4.0);
            assert_eq!(p.max_life, 30.0);
        }
    }

    #[test]
    fn render_folds_size_multipliers_and_skips_dead() {
        let config = quiet_config().with_max_particles(8);
        let mut engine = ParticleEngine::seeded(config, 1);
        let idx = engine.add_particle(ParticleOverrides {
            size: Some(4.0),
            lifespan: Some(100.0),
            ..Default::default()
        });
        engine.set_size_multiplier(2.0);

        let mut adapter = CountingAdapter::new();
        engine.render(&mut adapter);
        assert_eq!(adapter.draws, 1);
        assert_eq!(adapter.blend, Some(BlendMode::Alpha));
        assert!((adapter.last_size - 8.0).abs() < 1e-5);

        // Standard behavior leaves the size multiplier at 1 regardless of age.
        assert_eq!(engine.slot(idx).unwrap().size, 4.0);

        engine.clear();
        let mut adapter = CountingAdapter::new();
        engine.render(&mut adapter);
        assert_eq!(adapter.draws, 0);
    }

    #[test]
    fn invalid_emission_area_is_ignored() {
        let config = quiet_config();
        let mut engine = ParticleEngine::seeded(config, 1);
        let before = engine.config().emission_area;

        engine.set_emission_area(Rect::new(f32::NAN, 0.0, 10.0, 10.0));
        assert_eq!(engine.config().emission_area, before);

        engine.set_emission_area(Rect::new(5.0, 5.0, 20.0, 20.0));
        assert_eq!(engine.config().emission_area, Rect::new(5.0, 5.0, 20.0, 20.0));
    }

    #[test]
    fn non_finite_dt_is_a_no_op() {
        let config = quiet_config().with_max_particles(4);
        let mut engine = ParticleEngine::seeded(config, 1);
        engine.add_particle(ParticleOverrides {
            pos: Some(Vec2::new(1.0, 1.0)),
            vel: Some(Vec2::X),
            ..Default::default()
        });

        engine.update(f32::NAN, bounds());
        engine.update(-1.0, bounds());
        let p = engine.particles().next().unwrap();
        assert_eq!(p.pos, Vec2::new(1.0, 1.0));
    }
}
