//! Particle color resolution.
//!
//! A [`ColorMode`] decides the color of a particle: a fixed color, a fresh
//! random color per particle, or an N-stop gradient sampled by the
//! particle's life progress.
//!
//! # Color Modes
//!
//! | Mode | Description |
//! |------|-------------|
//! | [`ColorMode::Static`] | Every particle gets the configured RGBA |
//! | [`ColorMode::Random`] | RGB channels independently uniform 0-255, fixed alpha |
//! | [`ColorMode::Gradient`] | Linear interpolation between sorted stops by progress |
//!
//! # Example
//!
//! ```ignore
//! // White at birth fading to deep blue at death.
//! ColorMode::Gradient(vec![
//!     GradientStop::new(0.0, Rgba::rgb(255.0, 255.0, 255.0)),
//!     GradientStop::new(1.0, Rgba::rgb(30.0, 40.0, 200.0)),
//! ])
//! ```
//!
//! Degenerate gradients never panic: fewer than two stops falls back to the
//! first stop's color (or white when the list is empty), and a zero-width
//! segment resolves to its left stop.

use crate::spawn::SpawnRng;
use serde::{Deserialize, Serialize};

/// RGBA color.
///
/// Channels `r`, `g`, `b` are on the 0-255 scale the audio collaborator and
/// painters use; `a` is a 0-1 opacity.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    /// Red, 0.0..=255.0.
    pub r: f32,
    /// Green, 0.0..=255.0.
    pub g: f32,
    /// Blue, 0.0..=255.0.
    pub b: f32,
    /// Opacity, 0.0..=1.0.
    pub a: f32,
}

impl Rgba {
    /// Opaque white.
    pub const WHITE: Rgba = Rgba::rgb(255.0, 255.0, 255.0);

    /// Create a color with explicit opacity.
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque color.
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Linear interpolation between two colors, channel-wise.
    pub fn lerp(self, other: Rgba, t: f32) -> Rgba {
        Rgba {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
            a: self.a + (other.a - self.a) * t,
        }
    }

    /// The same color with opacity scaled by `alpha`.
    pub fn with_alpha_scaled(self, alpha: f32) -> Rgba {
        Rgba { a: self.a * alpha, ..self }
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Rgba::WHITE
    }
}

/// One stop of a color gradient.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    /// Position along the gradient, 0.0..=1.0.
    pub pos: f32,
    /// Color at this stop.
    pub color: Rgba,
}

impl GradientStop {
    /// Create a stop at `pos` with `color`.
    pub const fn new(pos: f32, color: Rgba) -> Self {
        Self { pos, color }
    }
}

/// How particle colors are resolved.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ColorMode {
    /// Every particle gets this exact color.
    Static(Rgba),

    /// RGB channels independently uniform in 0-255; opacity fixed.
    Random {
        /// Opacity applied to every random color.
        alpha: f32,
    },

    /// Interpolate between stops by life progress.
    ///
    /// Stops must be sorted ascending by `pos`;
    /// [`ParticleSystemConfig::sanitize`](crate::config::ParticleSystemConfig::sanitize)
    /// enforces this.
    Gradient(Vec<GradientStop>),
}

impl Default for ColorMode {
    fn default() -> Self {
        ColorMode::Static(Rgba::WHITE)
    }
}

impl ColorMode {
    /// Resolve the color for a particle at the given life progress.
    ///
    /// `progress` is clamped to 0-1. Progress exactly 0 or 1 returns the
    /// first/last stop's exact color with no interpolation drift.
    pub fn resolve(&self, progress: f32, rng: &mut SpawnRng) -> Rgba {
        match self {
            ColorMode::Static(color) => *color,
            ColorMode::Random { alpha } => {
                let mut c = rng.random_color();
                c.a = *alpha;
                c
            }
            ColorMode::Gradient(stops) => sample_gradient(stops, progress),
        }
    }

    /// Whether this mode must be re-resolved every tick.
    ///
    /// Static and random colors are fixed at spawn; gradients track progress.
    #[inline]
    pub fn is_progress_driven(&self) -> bool {
        matches!(self, ColorMode::Gradient(_))
    }
}

/// Sample a sorted stop list at `progress`.
fn sample_gradient(stops: &[GradientStop], progress: f32) -> Rgba {
    let (first, rest) = match stops.split_first() {
        Some(split) => split,
        None => return Rgba::WHITE,
    };
    if rest.is_empty() {
        return first.color;
    }
    let progress = progress.clamp(0.0, 1.0);
    let last = stops[stops.len() - 1];
    if progress <= first.pos {
        return first.color;
    }
    if progress >= last.pos {
        return last.color;
    }

    // Find the bracketing pair. Stop lists are short (typically 2-5 entries),
    // so a linear scan beats a binary search here.
    let mut lo = *first;
    for hi in stops.iter().skip(1) {
        if progress <= hi.pos {
            let span = hi.pos - lo.pos;
            // Coincident stops: treat segment progress as 0.
            let t = if span > 0.0 { (progress - lo.pos) / span } else { 0.0 };
            return lo.color.lerp(hi.color, t);
        }
        lo = *hi;
    }
    last.color
}
