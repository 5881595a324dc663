//! Engine configuration.
//!
//! [`ParticleSystemConfig`] collects every knob the engine reads: pool size,
//! spawn ranges, global forces, color model, behavior, boundary policy, and
//! the audio bindings. Construct one with the builder-style `with_*` setters
//! or start from a preset:
//!
//! ```ignore
//! let config = ParticleSystemConfig::default()
//!     .with_max_particles(400)
//!     .with_emission_rate(2.5)
//!     .with_behavior(BehaviorKind::Swarm)
//!     .with_binding(AudioBinding::new(Band::Bass, AudioTarget::EmissionRate, 0.5, 8.0));
//!
//! let fiery = ParticleSystemConfig::sparks();
//! ```
//!
//! A malformed config never crashes the render loop:
//! [`sanitize`](ParticleSystemConfig::sanitize) runs once at engine
//! construction, substitutes documented defaults for non-finite or negative
//! values, and logs one warning per repaired field.

use crate::audio::{AudioBinding, BeatBurst};
use crate::behavior::{BehaviorKind, BehaviorOptions};
use crate::bounds::{BoundaryPolicy, Rect};
use crate::color::{ColorMode, GradientStop, Rgba};
use crate::render::BlendMode;
use crate::spawn::SpawnRng;
use glam::Vec2;
use log::warn;
use serde::{Deserialize, Serialize};

/// Inclusive min/max pair for uniform sampling.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RangeF {
    /// Lower bound.
    pub min: f32,
    /// Upper bound.
    pub max: f32,
}

impl RangeF {
    /// Create a range. `min` and `max` may be equal for a fixed value.
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Uniform sample from the range.
    #[inline]
    pub fn sample(&self, rng: &mut SpawnRng) -> f32 {
        rng.range(self.min, self.max)
    }

    fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }
}

/// Full configuration for one [`ParticleEngine`](crate::engine::ParticleEngine).
///
/// Immutable per engine instance except where noted: the emission area and
/// the behavior can be swapped at runtime through the engine, and the
/// audio-mapped parameters (emission rate, gravity, wind, size multiplier)
/// are live values seeded from this struct.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParticleSystemConfig {
    /// Pool capacity. The live count never exceeds this.
    pub max_particles: usize,
    /// Spawn size range.
    pub size: RangeF,
    /// Spawn lifespan range, in ticks.
    pub lifespan: RangeF,
    /// Base emission rate in particles per tick; fractional rates emit
    /// stochastically so the average tracks the rate exactly.
    pub emission_rate: f32,
    /// Where continuous emission places new particles. Mutable at runtime.
    pub emission_area: Rect,
    /// Global gravity acceleration, units per tick².
    pub gravity: Vec2,
    /// Global wind acceleration, units per tick².
    pub wind: Vec2,
    /// Velocity retained per tick (1.0 = frictionless).
    pub friction: f32,
    /// Magnitude of the uniform random velocity perturbation per tick.
    pub turbulence: f32,
    /// How particle colors are resolved.
    pub color_mode: ColorMode,
    /// Active behavior strategy. Mutable at runtime.
    pub behavior: BehaviorKind,
    /// Behavior tuning. Mutable at runtime.
    pub behavior_options: BehaviorOptions,
    /// What happens at the simulation edge.
    pub boundary: BoundaryPolicy,
    /// Blend mode hint handed to the render adapter.
    pub blend_mode: BlendMode,
    /// Continuous band-to-parameter mappings.
    pub audio_bindings: Vec<AudioBinding>,
    /// One-shot radial burst on each beat edge.
    pub beat_burst: Option<BeatBurst>,
}

impl Default for ParticleSystemConfig {
    fn default() -> Self {
        Self {
            max_particles: 300,
            size: RangeF::new(2.0, 6.0),
            lifespan: RangeF::new(60.0, 180.0),
            emission_rate: 1.0,
            emission_area: Rect::default(),
            gravity: Vec2::ZERO,
            wind: Vec2::ZERO,
            friction: 1.0,
            turbulence: 0.0,
            color_mode: ColorMode::default(),
            behavior: BehaviorKind::Standard,
            behavior_options: BehaviorOptions::default(),
            boundary: BoundaryPolicy::Wrap,
            blend_mode: BlendMode::Alpha,
            audio_bindings: Vec::new(),
            beat_burst: None,
        }
    }
}

impl ParticleSystemConfig {
    // =========================================================================
    // PRESETS
    // =========================================================================

    /// Sparks preset: short-lived additive embers bursting off beats.
    pub fn sparks() -> Self {
        Self {
            max_particles: 400,
            size: RangeF::new(1.0, 3.0),
            lifespan: RangeF::new(20.0, 50.0),
            emission_rate: 0.5,
            friction: 0.96,
            gravity: Vec2::new(0.0, 0.12),
            color_mode: ColorMode::Gradient(vec![
                GradientStop::new(0.0, Rgba::rgb(255.0, 240.0, 180.0)),
                GradientStop::new(0.6, Rgba::rgb(255.0, 140.0, 40.0)),
                GradientStop::new(1.0, Rgba::rgb(120.0, 20.0, 0.0)),
            ]),
            behavior: BehaviorKind::Explosion,
            blend_mode: BlendMode::Additive,
            beat_burst: Some(BeatBurst::new(24, 6.0)),
            ..Self::default()
        }
    }

    /// Embers preset: slow drifting glow with bass-driven emission.
    pub fn embers() -> Self {
        use crate::audio::{AudioTarget, Band};
        Self {
            max_particles: 250,
            size: RangeF::new(2.0, 5.0),
            lifespan: RangeF::new(120.0, 300.0),
            emission_rate: 0.8,
            friction: 0.99,
            wind: Vec2::new(0.02, 0.0),
            turbulence: 0.05,
            color_mode: ColorMode::Gradient(vec![
                GradientStop::new(0.0, Rgba::rgb(255.0, 180.0, 60.0)),
                GradientStop::new(1.0, Rgba::rgb(80.0, 30.0, 10.0)),
            ]),
            blend_mode: BlendMode::Additive,
            audio_bindings: vec![
                AudioBinding::new(Band::Bass, AudioTarget::EmissionRate, 0.2, 4.0),
                AudioBinding::new(Band::High, AudioTarget::SizeMultiplier, 0.8, 1.6),
            ],
            ..Self::default()
        }
    }

    /// Starfield preset: dense random-colored swarm wrapping the area.
    pub fn starfield() -> Self {
        Self {
            max_particles: 600,
            size: RangeF::new(0.5, 2.0),
            lifespan: RangeF::new(300.0, 900.0),
            emission_rate: 2.0,
            color_mode: ColorMode::Random { alpha: 0.9 },
            behavior: BehaviorKind::Swarm,
            ..Self::default()
        }
    }

    // =========================================================================
    // BUILDER SETTERS
    // =========================================================================

    /// Set the pool capacity.
    pub fn with_max_particles(mut self, max: usize) -> Self {
        self.max_particles = max;
        self
    }

    /// Set the spawn size range.
    pub fn with_size(mut self, min: f32, max: f32) -> Self {
        self.size = RangeF::new(min, max);
        self
    }

    /// Set the spawn lifespan range, in ticks.
    pub fn with_lifespan(mut self, min: f32, max: f32) -> Self {
        self.lifespan = RangeF::new(min, max);
        self
    }

    /// Set the base emission rate in particles per tick.
    pub fn with_emission_rate(mut self, rate: f32) -> Self {
        self.emission_rate = rate;
        self
    }

    /// Set the emission area.
    pub fn with_emission_area(mut self, area: Rect) -> Self {
        self.emission_area = area;
        self
    }

    /// Set the gravity vector.
    pub fn with_gravity(mut self, gravity: Vec2) -> Self {
        self.gravity = gravity;
        self
    }

    /// Set the wind vector.
    pub fn with_wind(mut self, wind: Vec2) -> Self {
        self.wind = wind;
        self
    }

    /// Set the per-tick velocity retention factor.
    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    /// Set the turbulence magnitude.
    pub fn with_turbulence(mut self, turbulence: f32) -> Self {
        self.turbulence = turbulence;
        self
    }

    /// Set the color mode.
    pub fn with_color_mode(mut self, mode: ColorMode) -> Self {
        self.color_mode = mode;
        self
    }

    /// Set the behavior kind.
    pub fn with_behavior(mut self, behavior: BehaviorKind) -> Self {
        self.behavior = behavior;
        self
    }

    /// Set the behavior options.
    pub fn with_behavior_options(mut self, options: BehaviorOptions) -> Self {
        self.behavior_options = options;
        self
    }

    /// Set the boundary policy.
    pub fn with_boundary(mut self, boundary: BoundaryPolicy) -> Self {
        self.boundary = boundary;
        self
    }

    /// Set the blend mode hint.
    pub fn with_blend_mode(mut self, blend: BlendMode) -> Self {
        self.blend_mode = blend;
        self
    }

    /// Add a continuous audio binding.
    pub fn with_binding(mut self, binding: AudioBinding) -> Self {
        self.audio_bindings.push(binding);
        self
    }

    /// Set the beat burst reaction.
    pub fn with_beat_burst(mut self, burst: BeatBurst) -> Self {
        self.beat_burst = Some(burst);
        self
    }

    // =========================================================================
    // VALIDATION
    // =========================================================================

    /// Repair invalid numeric fields in place, warning once per repair.
    ///
    /// Runs at engine construction. A malformed config degrades visual
    /// quality, never the frame loop: NaN/infinite/negative values are
    /// replaced by the documented defaults, a gradient with fewer than two
    /// stops collapses to a static color, and gradient stops are sorted and
    /// clamped into 0-1.
    pub fn sanitize(&mut self) {
        let defaults = Self::default();

        if self.max_particles == 0 {
            warn!("max_particles of 0 is useless; using 1");
            self.max_particles = 1;
        }
        if !self.size.is_valid() || self.size.min < 0.0 {
            warn!("invalid particle size range {:?}; using default", self.size);
            self.size = defaults.size;
        }
        if !self.lifespan.is_valid() || self.lifespan.min <= 0.0 {
            warn!("invalid lifespan range {:?}; using default", self.lifespan);
            self.lifespan = defaults.lifespan;
        }
        if !self.emission_rate.is_finite() || self.emission_rate < 0.0 {
            warn!("invalid emission rate {}; using 0", self.emission_rate);
            self.emission_rate = 0.0;
        }
        if !(self.emission_area.x.is_finite()
            && self.emission_area.y.is_finite()
            && self.emission_area.w.is_finite()
            && self.emission_area.h.is_finite())
            || self.emission_area.w < 0.0
            || self.emission_area.h < 0.0
        {
            warn!("invalid emission area {:?}; using default", self.emission_area);
            self.emission_area = defaults.emission_area;
        }
        if !self.gravity.is_finite() {
            warn!("non-finite gravity; using zero");
            self.gravity = Vec2::ZERO;
        }
        if !self.wind.is_finite() {
            warn!("non-finite wind; using zero");
            self.wind = Vec2::ZERO;
        }
        if !self.friction.is_finite() || !(0.0..=1.0).contains(&self.friction) {
            warn!("friction {} outside 0-1; using {}", self.friction, defaults.friction);
            self.friction = defaults.friction;
        }
        if !self.turbulence.is_finite() || self.turbulence < 0.0 {
            warn!("invalid turbulence {}; using 0", self.turbulence);
            self.turbulence = 0.0;
        }

        self.sanitize_gradient();

        for binding in &mut self.audio_bindings {
            binding.sanitize();
        }
        if let Some(burst) = &mut self.beat_burst {
            burst.sanitize();
        }
    }

    fn sanitize_gradient(&mut self) {
        let fallback = match &mut self.color_mode {
            ColorMode::Gradient(stops) if stops.is_empty() => {
                warn!("empty gradient; using static white");
                ColorMode::Static(Rgba::WHITE)
            }
            ColorMode::Gradient(stops) if stops.len() == 1 => {
                warn!("single-stop gradient; using its color statically");
                ColorMode::Static(stops[0].color)
            }
            ColorMode::Gradient(stops) => {
                for stop in stops.iter_mut() {
                    if !stop.pos.is_finite() {
                        warn!("non-finite gradient stop position; clamping to 0");
                        stop.pos = 0.0;
                    }
                    stop.pos = stop.pos.clamp(0.0, 1.0);
                }
                stops.sort_by(|a, b| a.pos.total_cmp(&b.pos));
                return;
            }
            _ => return,
        };
        self.color_mode = fallback;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{AudioTarget, Band};

    #[test]
    fn default_config_survives_sanitize_unchanged() {
        let mut config = ParticleSystemConfig::default();
        let before = config.clone();
        config.sanitize();
        assert_eq!(config, before);
    }

    #[test]
    fn nan_fields_are_repaired() {
        let mut config = ParticleSystemConfig::default()
            .with_size(f32::NAN, 4.0)
            .with_emission_rate(f32::INFINITY)
            .with_friction(-2.0)
            .with_turbulence(f32::NAN)
            .with_gravity(Vec2::new(0.0, f32::NAN));
        config.sanitize();

        assert!(config.size.is_valid());
        assert_eq!(config.emission_rate, 0.0);
        assert_eq!(config.friction, 1.0);
        assert_eq!(config.turbulence, 0.0);
        assert_eq!(config.gravity, Vec2::ZERO);
    }

    #[test]
    fn short_gradient_falls_back_to_static() {
        let mut config = ParticleSystemConfig::default()
            .with_color_mode(ColorMode::Gradient(vec![GradientStop::new(
                0.0,
                Rgba::rgb(1.0, 2.0, 3.0),
            )]));
        config.sanitize();
        assert_eq!(config.color_mode, ColorMode::Static(Rgba::rgb(1.0, 2.0, 3.0)));

        let mut empty = ParticleSystemConfig::default()
            .with_color_mode(ColorMode::Gradient(Vec::new()));
        empty.sanitize();
        assert_eq!(empty.color_mode, ColorMode::Static(Rgba::WHITE));
    }

    #[test]
    fn gradient_stops_are_sorted_and_clamped() {
        let mut config = ParticleSystemConfig::default().with_color_mode(ColorMode::Gradient(vec![
            GradientStop::new(1.5, Rgba::rgb(3.0, 0.0, 0.0)),
            GradientStop::new(0.5, Rgba::rgb(2.0, 0.0, 0.0)),
            GradientStop::new(-0.5, Rgba::rgb(1.0, 0.0, 0.0)),
        ]));
        config.sanitize();

        let ColorMode::Gradient(stops) = &config.color_mode else {
            panic!("gradient should survive with three stops");
        };
        assert_eq!(stops[0].pos, 0.0);
        assert_eq!(stops[1].pos, 0.5);
        assert_eq!(stops[2].pos, 1.0);
        assert_eq!(stops[0].color.r, 1.0);
    }

    #[test]
    fn zero_capacity_is_bumped_to_one() {
        let mut config = ParticleSystemConfig::default().with_max_particles(0);
        config.sanitize();
        assert_eq!(config.max_particles, 1);
    }

    #[test]
    fn builder_chain_collects_bindings() {
        let config = ParticleSystemConfig::default()
            .with_binding(AudioBinding::new(Band::Bass, AudioTarget::EmissionRate, 0.0, 5.0))
            .with_binding(AudioBinding::new(Band::High, AudioTarget::WindX, -1.0, 1.0))
            .with_beat_burst(BeatBurst::new(10, 4.0));

        assert_eq!(config.audio_bindings.len(), 2);
        assert!(config.beat_burst.is_some());
    }

    #[test]
    fn presets_are_sane() {
        for mut preset in [
            ParticleSystemConfig::sparks(),
            ParticleSystemConfig::embers(),
            ParticleSystemConfig::starfield(),
        ] {
            let before = preset.clone();
            preset.sanitize();
            assert_eq!(preset, before, "preset should not need repairs");
        }
    }
}
