//! Audio reactivity.
//!
//! The audio collaborator delivers one [`AudioFrame`] per tick (band
//! energies on a 0-255 scale plus a beat flag). The
//! [`AudioReactivityMapper`] maps those features onto the engine's live
//! simulation parameters, deterministically and without smoothing — callers
//! that want smoothing low-pass the frame upstream.
//!
//! # Bindings
//!
//! Each [`AudioBinding`] maps one band onto one parameter:
//!
//! ```text
//! value = min + (energy / 255) * (max - min)
//! ```
//!
//! recomputed every tick from the latest frame. Supported targets:
//!
//! | Target | Effect |
//! |--------|--------|
//! | [`AudioTarget::EmissionRate`] | Particles emitted per tick |
//! | [`AudioTarget::SizeMultiplier`] | Render-time size scale (never baked into `size`) |
//! | [`AudioTarget::GravityY`] | Vertical gravity component |
//! | [`AudioTarget::WindX`] | Horizontal wind component |
//!
//! A [`BeatBurst`] additionally fires a radial burst exactly once per
//! false→true transition of the beat flag, and arms a flash countdown the
//! host can read through [`AudioReactivityMapper::beat_flash`].
//!
//! # Example
//!
//! ```ignore
//! let mut mapper = AudioReactivityMapper::new();
//! // per tick:
//! mapper.apply(&mut engine, audio.latest_frame());
//! engine.update(1.0, bounds);
//! ```
//!
//! A dropped frame (`None`) leaves the previously mapped parameters in
//! place so visuals don't flatten for a single missed tick.

use crate::engine::ParticleEngine;
use log::debug;
use serde::{Deserialize, Serialize};

/// Per-band energies on the 0-255 scale.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BandEnergies {
    /// Low frequencies.
    pub bass: f32,
    /// Mid frequencies.
    pub mid: f32,
    /// High frequencies.
    pub high: f32,
}

impl BandEnergies {
    /// Create band energies from raw 0-255 values.
    pub const fn new(bass: f32, mid: f32, high: f32) -> Self {
        Self { bass, mid, high }
    }
}

/// One sampled snapshot of audio features for the current tick.
///
/// The engine and mapper only ever read this.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AudioFrame {
    /// Band energies, 0-255.
    pub bands: BandEnergies,
    /// Optional full frequency-bin array, 0-255 per bin.
    pub frequency_bins: Option<Vec<f32>>,
    /// Whether a beat landed on this tick.
    pub is_beat: bool,
    /// Monotonic timestamp in milliseconds.
    pub timestamp_ms: u64,
}

impl AudioFrame {
    /// A frame with the given band energies and no beat.
    pub fn from_bands(bass: f32, mid: f32, high: f32) -> Self {
        Self { bands: BandEnergies::new(bass, mid, high), ..Self::default() }
    }

    /// The same frame with the beat flag set.
    pub fn with_beat(mut self) -> Self {
        self.is_beat = true;
        self
    }
}

/// Which band energy a binding reads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Band {
    /// Low frequencies.
    Bass,
    /// Mid frequencies.
    Mid,
    /// High frequencies.
    High,
}

impl Band {
    /// The raw 0-255 energy for this band, clamped into range.
    #[inline]
    pub fn energy(&self, bands: &BandEnergies) -> f32 {
        let raw = match self {
            Band::Bass => bands.bass,
            Band::Mid => bands.mid,
            Band::High => bands.high,
        };
        if raw.is_finite() { raw.clamp(0.0, 255.0) } else { 0.0 }
    }
}

/// Which live parameter a binding drives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioTarget {
    /// Particles emitted per tick.
    EmissionRate,
    /// Render-time particle size multiplier.
    SizeMultiplier,
    /// Vertical gravity component.
    GravityY,
    /// Horizontal wind component.
    WindX,
}

/// A band-to-parameter mapping with an output range.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AudioBinding {
    /// Band energy to read.
    pub band: Band,
    /// Parameter to drive.
    pub target: AudioTarget,
    /// Output at zero energy.
    pub min: f32,
    /// Output at full energy.
    pub max: f32,
}

impl AudioBinding {
    /// Create a binding mapping `band` onto `target` over `min..max`.
    pub const fn new(band: Band, target: AudioTarget, min: f32, max: f32) -> Self {
        Self { band, target, min, max }
    }

    /// The mapped value for the given band energies.
    #[inline]
    pub fn map(&self, bands: &BandEnergies) -> f32 {
        self.min + (self.band.energy(bands) / 255.0) * (self.max - self.min)
    }

    pub(crate) fn sanitize(&mut self) {
        if !self.min.is_finite() {
            log::warn!("non-finite binding min; using 0");
            self.min = 0.0;
        }
        if !self.max.is_finite() {
            log::warn!("non-finite binding max; using min");
            self.max = self.min;
        }
    }
}

/// One-shot radial burst fired on each beat edge.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BeatBurst {
    /// Particles per burst.
    pub count: u32,
    /// Per-particle speed is uniform in `[0, speed)`.
    pub speed: f32,
    /// Ticks the beat flash takes to fade back to zero.
    pub flash_ticks: f32,
}

impl BeatBurst {
    /// Create a burst with the default 12-tick flash.
    pub const fn new(count: u32, speed: f32) -> Self {
        Self { count, speed, flash_ticks: 12.0 }
    }

    pub(crate) fn sanitize(&mut self) {
        if !self.speed.is_finite() || self.speed < 0.0 {
            log::warn!("invalid beat burst speed {}; using 0", self.speed);
            self.speed = 0.0;
        }
        if !self.flash_ticks.is_finite() || self.flash_ticks < 1.0 {
            log::warn!("invalid beat flash duration {}; using 1", self.flash_ticks);
            self.flash_ticks = 1.0;
        }
    }
}

/// Maps audio frames onto an engine's live parameters.
///
/// Holds only cross-tick state: the previous beat flag (so a burst fires on
/// the edge, not on every tick of a sustained beat) and the flash countdown.
/// The bindings themselves live in the engine's config.
#[derive(Clone, Debug, Default)]
pub struct AudioReactivityMapper {
    last_beat: bool,
    flash: f32,
}

impl AudioReactivityMapper {
    /// Create a mapper with no beat history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one tick of audio data to the engine.
    ///
    /// `None` means the frame was dropped: previously mapped parameters stay
    /// as they are (no reset to defaults), only the flash countdown advances.
    pub fn apply(&mut self, engine: &mut ParticleEngine, frame: Option<&AudioFrame>) {
        // The flash is an explicit per-tick countdown, not a wall-clock timer.
        if self.flash > 0.0 {
            let ticks = engine
                .config()
                .beat_burst
                .map(|b| b.flash_ticks)
                .unwrap_or(1.0);
            self.flash = (self.flash - 1.0 / ticks).max(0.0);
        }

        let Some(frame) = frame else {
            return;
        };

        for i in 0..engine.config().audio_bindings.len() {
            let binding = engine.config().audio_bindings[i];
            let value = binding.map(&frame.bands);
            match binding.target {
                AudioTarget::EmissionRate => engine.set_emission_rate(value),
                AudioTarget::SizeMultiplier => engine.set_size_multiplier(value),
                AudioTarget::GravityY => engine.set_gravity_y(value),
                AudioTarget::WindX => engine.set_wind_x(value),
            }
        }

        if frame.is_beat && !self.last_beat {
            if let Some(burst) = engine.config().beat_burst {
                debug!("beat edge at {}ms: bursting {} particles", frame.timestamp_ms, burst.count);
                engine.spawn_beat_burst(burst.count, burst.speed);
                self.flash = 1.0;
            }
        }
        self.last_beat = frame.is_beat;
    }

    /// Current beat flash, 1.0 on the beat edge decaying linearly to 0.
    #[inline]
    pub fn beat_flash(&self) -> f32 {
        self.flash
    }
}
