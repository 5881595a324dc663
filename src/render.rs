//! Render adapter interface.
//!
//! The engine owns no drawing state. Each theme's painter implements
//! [`RenderAdapter`]; [`ParticleEngine::render`](crate::engine::ParticleEngine::render)
//! walks the live particles and hands the adapter one [`RenderParticle`]
//! view per particle, with the audio size multiplier and behavior opacity
//! already folded in.
//!
//! Painters pick their primitive from the behavior kind — a filled circle
//! for most particles, a stroked polyline over `trail` for trail particles —
//! and their compositing from the configured [`BlendMode`].

use crate::behavior::BehaviorKind;
use crate::color::Rgba;
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// How overlapping particles composite.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlendMode {
    /// Standard alpha blending.
    #[default]
    Alpha,

    /// Colors add together; overlap glows. The usual pick for sparks,
    /// embers, and anything energetic.
    Additive,

    /// Colors multiply, darkening the result. Smoke and shadow effects.
    Multiply,
}

/// Drawn-shape hint for the painter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticleShape {
    /// Soft filled circle.
    #[default]
    Circle,

    /// Circle with a wide soft halo.
    Glow,

    /// Thin elongated streak along the velocity.
    Spark,
}

impl ParticleShape {
    /// The shape that reads best for a behavior; painters may override.
    pub fn for_behavior(kind: BehaviorKind) -> Self {
        match kind {
            BehaviorKind::Standard | BehaviorKind::Trail => ParticleShape::Circle,
            BehaviorKind::Swarm => ParticleShape::Glow,
            BehaviorKind::Explosion => ParticleShape::Spark,
        }
    }
}

/// One particle, ready to draw.
///
/// `size` and `color` are the effective values: base size times the audio
/// and behavior multipliers, base color with the behavior opacity folded
/// into `a`.
#[derive(Clone, Copy, Debug)]
pub struct RenderParticle<'a> {
    /// Position in simulation space.
    pub pos: Vec2,
    /// Effective drawn size.
    pub size: f32,
    /// Effective color.
    pub color: Rgba,
    /// Behavior kind, for primitive selection.
    pub behavior: BehaviorKind,
    /// Suggested drawn shape for this behavior.
    pub shape: ParticleShape,
    /// Bounded position history, oldest first; present for trail particles.
    pub trail: Option<&'a [Vec2]>,
}

/// Sink for draw calls, implemented by each theme's painter.
pub trait RenderAdapter {
    /// Called once per frame before any particles, with the configured
    /// blend mode.
    fn begin(&mut self, _blend: BlendMode) {}

    /// Draw one particle.
    fn draw_particle(&mut self, particle: &RenderParticle<'_>);
}
