//! Effect parameters and their validation.
//!
//! The service accepts a JSON parameter record alongside the uploaded video.
//! Wire field names follow the service schema; the Rust-side names are
//! semantic. Values the service can pick on its own are modeled as
//! [`Tunable`] instead of nullable sentinels.

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Frame-rate domain accepted by the service (explicit values).
pub const FRAME_RATE_MIN: u32 = 15;
pub const FRAME_RATE_MAX: u32 = 120;

/// Effect lifetime domain, in frames.
pub const EFFECT_LIFETIME_MIN: u32 = 30;
pub const EFFECT_LIFETIME_MAX: u32 = 300;

/// Emission points per detected beat.
pub const POINTS_PER_BEAT_MIN: u32 = 1;
pub const POINTS_PER_BEAT_MAX: u32 = 16;

/// Default effect lifetime in frames
pub const DEFAULT_EFFECT_LIFETIME_FRAMES: u32 = 120;
/// Default emission points per beat
pub const DEFAULT_POINTS_PER_BEAT: u32 = 4;
/// Default ambient emission rate (points per second)
pub const DEFAULT_AMBIENT_EMISSION_RATE: f64 = 5.0;
/// Default position jitter in pixels
pub const DEFAULT_POSITION_JITTER_PX: f64 = 0.5;
/// Default minimum rendered shape size
pub const DEFAULT_MIN_SHAPE_SIZE: u32 = 15;
/// Default maximum rendered shape size
pub const DEFAULT_MAX_SHAPE_SIZE: u32 = 40;
/// Default number of neighbor links drawn per point
pub const DEFAULT_NEIGHBOR_LINK_COUNT: u32 = 3;
/// Default corner-detection threshold
pub const DEFAULT_FEATURE_THRESHOLD: u32 = 20;
/// Default bell-curve width for size falloff
pub const DEFAULT_BELL_CURVE_WIDTH: f64 = 4.0;

/// A knob the service can pick automatically or the caller can pin.
///
/// Serializes as the pinned value; `Auto` becomes JSON `null`, which the
/// service reads as "choose automatically".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tunable<T> {
    /// Let the service choose.
    #[default]
    Auto,
    /// Pin the value.
    Explicit(T),
}

impl<T> Tunable<T> {
    /// Whether the service picks this value.
    pub fn is_auto(&self) -> bool {
        matches!(self, Tunable::Auto)
    }

    /// The pinned value, if any.
    pub fn explicit(&self) -> Option<&T> {
        match self {
            Tunable::Auto => None,
            Tunable::Explicit(v) => Some(v),
        }
    }

    /// Convert into an `Option`, discarding the auto marker.
    pub fn into_option(self) -> Option<T> {
        match self {
            Tunable::Auto => None,
            Tunable::Explicit(v) => Some(v),
        }
    }
}

impl<T> From<Option<T>> for Tunable<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Tunable::Explicit(v),
            None => Tunable::Auto,
        }
    }
}

impl<T: Serialize> Serialize for Tunable<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Tunable::Auto => serializer.serialize_none(),
            Tunable::Explicit(v) => serializer.serialize_some(v),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Tunable<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Option::<T>::deserialize(deserializer)?.into())
    }
}

/// Validation failure for a [`ParameterSet`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamsError {
    /// Value outside its documented domain.
    #[error("{field} must be {expected}, got {actual}")]
    OutOfRange {
        field: &'static str,
        expected: &'static str,
        actual: String,
    },

    /// Shape-size ordering violated.
    #[error("min_shape_size ({min}) must be strictly less than max_shape_size ({max})")]
    ShapeSizeOrder { min: u32, max: u32 },

    /// Floating-point field is NaN or infinite.
    #[error("{field} must be a finite number")]
    NonFinite { field: &'static str },
}

impl ParamsError {
    fn out_of_range(
        field: &'static str,
        expected: &'static str,
        actual: impl ToString,
    ) -> Self {
        Self::OutOfRange {
            field,
            expected,
            actual: actual.to_string(),
        }
    }
}

/// The full parameter record for one submission.
///
/// Immutable per submission: the orchestrator serializes a snapshot of this
/// record into the upload and never mutates it afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSet {
    /// Output frame rate; `Auto` lets the service keep the source rate
    #[serde(rename = "fps", default)]
    pub frame_rate: Tunable<u32>,

    /// How many frames an emitted effect stays alive
    #[serde(rename = "life_frame", default = "default_effect_lifetime_frames")]
    pub effect_lifetime_frames: u32,

    /// Emission points spawned per detected beat
    #[serde(rename = "pts_per_beat", default = "default_points_per_beat")]
    pub points_per_beat: u32,

    /// Baseline emission rate between beats (points per second)
    #[serde(rename = "ambient_rate", default = "default_ambient_emission_rate")]
    pub ambient_emission_rate: f64,

    /// Random positional jitter applied to each point, in pixels
    #[serde(rename = "jitter_px", default = "default_position_jitter_px")]
    pub position_jitter_px: f64,

    /// Smallest rendered shape size
    #[serde(rename = "min_size", default = "default_min_shape_size")]
    pub min_shape_size: u32,

    /// Largest rendered shape size
    #[serde(rename = "max_size", default = "default_max_shape_size")]
    pub max_shape_size: u32,

    /// Neighbor links drawn from each point
    #[serde(rename = "neighbor_links", default = "default_neighbor_link_count")]
    pub neighbor_link_count: u32,

    /// FAST corner-detection threshold used by the service
    #[serde(rename = "orb_fast_threshold", default = "default_feature_threshold")]
    pub feature_threshold: u32,

    /// Width of the bell curve shaping size falloff over a shape's life
    #[serde(rename = "bell_width", default = "default_bell_curve_width")]
    pub bell_curve_width: f64,

    /// Seed for the service's RNG; `Auto` means non-deterministic
    #[serde(rename = "seed", default)]
    pub random_seed: Tunable<i64>,
}

fn default_effect_lifetime_frames() -> u32 {
    DEFAULT_EFFECT_LIFETIME_FRAMES
}
fn default_points_per_beat() -> u32 {
    DEFAULT_POINTS_PER_BEAT
}
fn default_ambient_emission_rate() -> f64 {
    DEFAULT_AMBIENT_EMISSION_RATE
}
fn default_position_jitter_px() -> f64 {
    DEFAULT_POSITION_JITTER_PX
}
fn default_min_shape_size() -> u32 {
    DEFAULT_MIN_SHAPE_SIZE
}
fn default_max_shape_size() -> u32 {
    DEFAULT_MAX_SHAPE_SIZE
}
fn default_neighbor_link_count() -> u32 {
    DEFAULT_NEIGHBOR_LINK_COUNT
}
fn default_feature_threshold() -> u32 {
    DEFAULT_FEATURE_THRESHOLD
}
fn default_bell_curve_width() -> f64 {
    DEFAULT_BELL_CURVE_WIDTH
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self {
            frame_rate: Tunable::Auto,
            effect_lifetime_frames: DEFAULT_EFFECT_LIFETIME_FRAMES,
            points_per_beat: DEFAULT_POINTS_PER_BEAT,
            ambient_emission_rate: DEFAULT_AMBIENT_EMISSION_RATE,
            position_jitter_px: DEFAULT_POSITION_JITTER_PX,
            min_shape_size: DEFAULT_MIN_SHAPE_SIZE,
            max_shape_size: DEFAULT_MAX_SHAPE_SIZE,
            neighbor_link_count: DEFAULT_NEIGHBOR_LINK_COUNT,
            feature_threshold: DEFAULT_FEATURE_THRESHOLD,
            bell_curve_width: DEFAULT_BELL_CURVE_WIDTH,
            random_seed: Tunable::Auto,
        }
    }
}

impl ParameterSet {
    /// Create a parameter set with the documented defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a new set with the frame rate pinned.
    pub fn with_frame_rate(mut self, fps: u32) -> Self {
        self.frame_rate = Tunable::Explicit(fps);
        self
    }

    /// Returns a new set with the shape-size range replaced.
    pub fn with_shape_sizes(mut self, min: u32, max: u32) -> Self {
        self.min_shape_size = min;
        self.max_shape_size = max;
        self
    }

    /// Returns a new set with the RNG seed pinned.
    pub fn with_seed(mut self, seed: i64) -> Self {
        self.random_seed = Tunable::Explicit(seed);
        self
    }

    /// Check every field against its documented domain.
    ///
    /// Checks run in field-declaration order and stop at the first failure,
    /// so the error always names the first offending field.
    pub fn validate(&self) -> Result<(), ParamsError> {
        if let Tunable::Explicit(fps) = self.frame_rate {
            if !(FRAME_RATE_MIN..=FRAME_RATE_MAX).contains(&fps) {
                return Err(ParamsError::out_of_range(
                    "frame_rate",
                    "between 15 and 120, or auto",
                    fps,
                ));
            }
        }

        if !(EFFECT_LIFETIME_MIN..=EFFECT_LIFETIME_MAX).contains(&self.effect_lifetime_frames) {
            return Err(ParamsError::out_of_range(
                "effect_lifetime_frames",
                "between 30 and 300",
                self.effect_lifetime_frames,
            ));
        }

        if !(POINTS_PER_BEAT_MIN..=POINTS_PER_BEAT_MAX).contains(&self.points_per_beat) {
            return Err(ParamsError::out_of_range(
                "points_per_beat",
                "between 1 and 16",
                self.points_per_beat,
            ));
        }

        if !self.ambient_emission_rate.is_finite() {
            return Err(ParamsError::NonFinite {
                field: "ambient_emission_rate",
            });
        }
        if self.ambient_emission_rate < 0.0 {
            return Err(ParamsError::out_of_range(
                "ambient_emission_rate",
                "zero or greater",
                self.ambient_emission_rate,
            ));
        }

        if !self.position_jitter_px.is_finite() {
            return Err(ParamsError::NonFinite {
                field: "position_jitter_px",
            });
        }
        if self.position_jitter_px < 0.0 {
            return Err(ParamsError::out_of_range(
                "position_jitter_px",
                "zero or greater",
                self.position_jitter_px,
            ));
        }

        if self.min_shape_size >= self.max_shape_size {
            return Err(ParamsError::ShapeSizeOrder {
                min: self.min_shape_size,
                max: self.max_shape_size,
            });
        }

        if !self.bell_curve_width.is_finite() {
            return Err(ParamsError::NonFinite {
                field: "bell_curve_width",
            });
        }
        if self.bell_curve_width <= 0.0 {
            return Err(ParamsError::out_of_range(
                "bell_curve_width",
                "greater than zero",
                self.bell_curve_width,
            ));
        }

        Ok(())
    }

    /// Serialize to the canonical JSON payload the service expects.
    ///
    /// Callers validate first; this performs no domain checks of its own.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
