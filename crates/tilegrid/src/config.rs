#![forbid(unsafe_code)]

//! Grid configuration.
//!
//! [`GridConfig`] collects every tunable of the reorder engine. Only
//! `num_columns` is required; everything else defaults to the behavior of a
//! stock draggable grid (square tiles, 20px trigger bands, 25ms auto-scroll
//! ticks ramping from 9px to 18px per tick after 120 ticks).
//!
//! # Loading
//!
//! ```toml
//! num_columns = 4
//! scroll_area_size = 32.0
//!
//! [scroll_step.ramp]
//! slow = 6.0
//! fast = 14.0
//! ramp_after = 80
//! ```
//!
//! ```rust,ignore
//! let config = GridConfig::from_toml_str(text)?;
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tilegrid_core::geometry::Point;

/// Default trigger-band height in px.
pub const DEFAULT_SCROLL_AREA_SIZE: f32 = 20.0;
/// Default auto-scroll tick interval.
pub const DEFAULT_SCROLL_INTERVAL_MS: u64 = 25;
/// Default settle animation length.
pub const DEFAULT_SETTLE_DURATION_MS: u64 = 200;
/// Default drag-start lift animation length.
pub const DEFAULT_EMPHASIS_DURATION_MS: u64 = 100;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from building or loading a [`GridConfig`].
#[derive(Debug, thiserror::Error)]
pub enum GridConfigError {
    #[error("invalid grid configuration: {}", .0.join("; "))]
    Validation(Vec<String>),
    #[cfg(feature = "config-files")]
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[cfg(feature = "config-files")]
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Scroll step
// ---------------------------------------------------------------------------

/// A step function evaluated per auto-scroll tick.
#[derive(Clone)]
pub struct StepFn(Arc<dyn Fn(u32) -> f32 + Send + Sync>);

impl StepFn {
    pub fn new(f: impl Fn(u32) -> f32 + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }
}

impl fmt::Debug for StepFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StepFn(..)")
    }
}

/// Pixels advanced per auto-scroll tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollStep {
    /// `slow` px for the first `ramp_after` ticks, `fast` px afterwards.
    Ramp { slow: f32, fast: f32, ramp_after: u32 },
    /// The same step on every tick.
    Fixed { step: f32 },
    /// Runtime-only step function of the tick index.
    #[serde(skip)]
    Custom(StepFn),
}

impl Default for ScrollStep {
    fn default() -> Self {
        Self::Ramp {
            slow: 9.0,
            fast: 18.0,
            ramp_after: 120,
        }
    }
}

impl ScrollStep {
    /// Step for the zero-based `tick` of a sustained auto-scroll.
    ///
    /// Never negative; non-finite custom results collapse to zero.
    pub fn step(&self, tick: u32) -> f32 {
        let raw = match self {
            Self::Ramp {
                slow,
                fast,
                ramp_after,
            } => {
                if tick < *ramp_after {
                    *slow
                } else {
                    *fast
                }
            }
            Self::Fixed { step } => *step,
            Self::Custom(f) => (f.0)(tick),
        };
        if raw.is_finite() { raw.max(0.0) } else { 0.0 }
    }
}

// ---------------------------------------------------------------------------
// Drag emphasis
// ---------------------------------------------------------------------------

/// Visual lift applied to the tile being dragged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DragEmphasis {
    pub scale: f32,
    pub shadow_opacity: f32,
    pub shadow_radius: f32,
    pub shadow_offset: Point,
}

impl Default for DragEmphasis {
    fn default() -> Self {
        Self {
            scale: 1.1,
            shadow_opacity: 0.2,
            shadow_radius: 6.0,
            shadow_offset: Point::new(1.0, 1.0),
        }
    }
}

// ---------------------------------------------------------------------------
// GridConfig
// ---------------------------------------------------------------------------

/// Configuration for a [`TileGrid`](crate::TileGrid).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    /// Grid width in tiles.
    pub num_columns: usize,
    /// Explicit tile height; square tiles when absent.
    #[serde(default)]
    pub item_height: Option<f32>,
    /// Height of the top/bottom trigger bands that start auto-scroll.
    #[serde(default = "default_scroll_area_size")]
    pub scroll_area_size: f32,
    #[serde(default = "default_scroll_interval_ms")]
    pub scroll_interval_ms: u64,
    #[serde(default)]
    pub scroll_step: ScrollStep,
    /// Correction added to the measured viewport origin.
    #[serde(default)]
    pub layout_offset: Point,
    /// Static override for the animated default lift.
    #[serde(default)]
    pub drag_emphasis: Option<DragEmphasis>,
    #[serde(default = "default_settle_duration_ms")]
    pub settle_duration_ms: u64,
    #[serde(default = "default_emphasis_duration_ms")]
    pub emphasis_duration_ms: u64,
}

fn default_scroll_area_size() -> f32 {
    DEFAULT_SCROLL_AREA_SIZE
}

fn default_scroll_interval_ms() -> u64 {
    DEFAULT_SCROLL_INTERVAL_MS
}

fn default_settle_duration_ms() -> u64 {
    DEFAULT_SETTLE_DURATION_MS
}

fn default_emphasis_duration_ms() -> u64 {
    DEFAULT_EMPHASIS_DURATION_MS
}

impl GridConfig {
    /// Defaults for a grid `num_columns` tiles wide.
    #[must_use]
    pub fn new(num_columns: usize) -> Self {
        Self {
            num_columns,
            item_height: None,
            scroll_area_size: DEFAULT_SCROLL_AREA_SIZE,
            scroll_interval_ms: DEFAULT_SCROLL_INTERVAL_MS,
            scroll_step: ScrollStep::default(),
            layout_offset: Point::ZERO,
            drag_emphasis: None,
            settle_duration_ms: DEFAULT_SETTLE_DURATION_MS,
            emphasis_duration_ms: DEFAULT_EMPHASIS_DURATION_MS,
        }
    }

    #[must_use]
    pub fn item_height(mut self, height: f32) -> Self {
        self.item_height = Some(height);
        self
    }

    #[must_use]
    pub fn scroll_area_size(mut self, size: f32) -> Self {
        self.scroll_area_size = size;
        self
    }

    #[must_use]
    pub fn scroll_interval(mut self, interval: Duration) -> Self {
        self.scroll_interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        self
    }

    #[must_use]
    pub fn scroll_step(mut self, step: ScrollStep) -> Self {
        self.scroll_step = step;
        self
    }

    #[must_use]
    pub fn layout_offset(mut self, offset: Point) -> Self {
        self.layout_offset = offset;
        self
    }

    #[must_use]
    pub fn drag_emphasis(mut self, emphasis: DragEmphasis) -> Self {
        self.drag_emphasis = Some(emphasis);
        self
    }

    #[must_use]
    pub fn settle_duration(mut self, duration: Duration) -> Self {
        self.settle_duration_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        self
    }

    #[inline]
    pub fn scroll_interval_duration(&self) -> Duration {
        Duration::from_millis(self.scroll_interval_ms)
    }

    #[inline]
    pub fn settle_duration_value(&self) -> Duration {
        Duration::from_millis(self.settle_duration_ms)
    }

    #[inline]
    pub fn emphasis_duration(&self) -> Duration {
        Duration::from_millis(self.emphasis_duration_ms)
    }

    /// List every violated constraint. Empty means the config is usable.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.num_columns == 0 {
            errors.push("num_columns must be >= 1".into());
        }

        if let Some(h) = self.item_height
            && !(h.is_finite() && h > 0.0)
        {
            errors.push(format!("item_height must be finite and > 0, got {h}"));
        }

        if !(self.scroll_area_size.is_finite() && self.scroll_area_size >= 0.0) {
            errors.push(format!(
                "scroll_area_size must be finite and >= 0, got {}",
                self.scroll_area_size
            ));
        }

        if self.scroll_interval_ms == 0 {
            errors.push("scroll_interval_ms must be > 0".into());
        }

        match &self.scroll_step {
            ScrollStep::Ramp { slow, fast, .. } => {
                for (name, v) in [("slow", slow), ("fast", fast)] {
                    if !(v.is_finite() && *v >= 0.0) {
                        errors.push(format!(
                            "scroll_step.ramp.{name} must be finite and >= 0, got {v}"
                        ));
                    }
                }
            }
            ScrollStep::Fixed { step } => {
                if !(step.is_finite() && *step >= 0.0) {
                    errors.push(format!(
                        "scroll_step.fixed.step must be finite and >= 0, got {step}"
                    ));
                }
            }
            ScrollStep::Custom(_) => {}
        }

        if !(self.layout_offset.x.is_finite() && self.layout_offset.y.is_finite()) {
            errors.push("layout_offset must be finite".into());
        }

        errors
    }

    /// [`validate`](Self::validate) as a `Result`.
    pub fn check(&self) -> Result<(), GridConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(GridConfigError::Validation(errors))
        }
    }

    /// Load and validate from a TOML string.
    #[cfg(feature = "config-files")]
    pub fn from_toml_str(s: &str) -> Result<Self, GridConfigError> {
        let config: Self = toml::from_str(s)?;
        config.check()?;
        Ok(config)
    }

    /// Load and validate from a JSON string.
    #[cfg(feature = "config-files")]
    pub fn from_json_str(s: &str) -> Result<Self, GridConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.check()?;
        Ok(config)
    }
}
