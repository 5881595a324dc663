//! # ARPE - Audio Reactive Particle Engine
//!
//! Audio-driven 2D particle simulations with a simple, declarative API.
//!
//! ARPE is the simulation kernel shared by themed music visualizations: a
//! pooled particle engine, pluggable behavior strategies, and a
//! deterministic mapping from audio features (band energies, beat pulses)
//! onto live simulation parameters. Rendering, audio capture, and the GUI
//! shell are external collaborators — the engine only hands a painter its
//! live particles and only reads the audio frames it is given.
//!
//! ## Quick Start
//!
//! ```ignore
//! use arpe::prelude::*;
//!
//! let config = ParticleSystemConfig::default()
//!     .with_max_particles(400)
//!     .with_emission_rate(1.5)
//!     .with_behavior(BehaviorKind::Trail)
//!     .with_binding(AudioBinding::new(Band::Bass, AudioTarget::EmissionRate, 0.5, 8.0))
//!     .with_beat_burst(BeatBurst::new(24, 6.0));
//!
//! let mut engine = ParticleEngine::new(config);
//! let mut mapper = AudioReactivityMapper::new();
//!
//! // once per render tick:
//! mapper.apply(&mut engine, audio.latest_frame());
//! engine.update(1.0, Bounds::new(width, height));
//! engine.render(&mut painter);
//! ```
//!
//! ## Core Concepts
//!
//! ### Particles
//!
//! Plain records in a fixed-capacity pool. Retired particles return to a
//! free list and are reused in place; at capacity the oldest live particle
//! is evicted. A running engine allocates nothing after warm-up.
//!
//! ### Behaviors
//!
//! A closed enum of motion/fade strategies, matched exhaustively in the
//! tick step:
//!
//! | Kind | Character |
//! |------|-----------|
//! | [`BehaviorKind::Standard`] | Free flight, quadratic fade |
//! | [`BehaviorKind::Swarm`] | Per-particle circular orbits |
//! | [`BehaviorKind::Trail`] | Polyline history behind each particle |
//! | [`BehaviorKind::Explosion`] | Radial debris, damping to rest |
//!
//! ### Audio Reactivity
//!
//! [`AudioBinding`]s map band energies linearly onto emission rate, size,
//! gravity, or wind, every tick, with no smoothing. A [`BeatBurst`] fires a
//! radial burst exactly once per beat edge.
//!
//! ## Determinism
//!
//! Every random draw goes through one seedable source
//! ([`SpawnRng`](spawn::SpawnRng)); [`ParticleEngine::seeded`] makes a whole
//! session replayable, which is how the property tests pin exact sequences.

pub mod audio;
pub mod behavior;
pub mod bounds;
pub mod color;
pub mod config;
pub mod engine;
pub mod particle;
pub mod render;
pub mod spawn;

pub use audio::{
    AudioBinding, AudioFrame, AudioReactivityMapper, AudioTarget, Band, BandEnergies, BeatBurst,
};
pub use behavior::{BehaviorKind, BehaviorOptions};
pub use bounds::{BoundaryPolicy, Bounds, Rect, RESTITUTION};
pub use color::{ColorMode, GradientStop, Rgba};
pub use config::{ParticleSystemConfig, RangeF};
pub use engine::{LiveParams, ParticleEngine, ParticleOverrides};
pub use glam::Vec2;
pub use particle::Particle;
pub use render::{BlendMode, ParticleShape, RenderAdapter, RenderParticle};

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use arpe::prelude::*;
/// ```
pub mod prelude {
    pub use crate::audio::{
        AudioBinding, AudioFrame, AudioReactivityMapper, AudioTarget, Band, BandEnergies,
        BeatBurst,
    };
    pub use crate::behavior::{BehaviorKind, BehaviorOptions};
    pub use crate::bounds::{BoundaryPolicy, Bounds, Rect};
    pub use crate::color::{ColorMode, GradientStop, Rgba};
    pub use crate::config::{ParticleSystemConfig, RangeF};
    pub use crate::engine::{ParticleEngine, ParticleOverrides};
    pub use crate::render::{BlendMode, ParticleShape, RenderAdapter, RenderParticle};
    pub use crate::spawn::SpawnRng;
    pub use crate::Vec2;
}
