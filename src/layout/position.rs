//! Randomised on-screen placement for the negative control.
//!
//! Placement is an injected dependency: the state machine only sees the
//! [`PositionSource`] trait, so tests swap the seeded RNG for
//! [`ScriptedPositions`].

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// A point in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal offset from the left edge.
    pub x: f64,
    /// Vertical offset from the top edge.
    pub y: f64,
}

impl Position {
    /// Top-left corner of the viewport.
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    /// Creates a new position.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Viewport dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Viewport width.
    pub width: f64,
    /// Viewport height.
    pub height: f64,
}

impl Viewport {
    /// Creates a new viewport.
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}

/// Inclusive range `[lo, hi]` of admissible values along one axis.
///
/// `None` means the axis is degenerate (the padded range is inverted or an
/// input is not finite) and the caller must use [`axis_fallback`].
#[must_use]
pub fn axis_range(extent: f64, padding: f64) -> Option<(f64, f64)> {
    if !extent.is_finite() || !padding.is_finite() {
        return None;
    }
    let padding = padding.max(0.0);
    let lo = padding;
    let hi = extent - padding;
    (hi >= lo).then_some((lo, hi))
}

/// Fixed point used on a degenerate axis: the middle of the extent,
/// with negative or non-finite extents treated as zero.
#[must_use]
pub fn axis_fallback(extent: f64) -> f64 {
    if extent.is_finite() {
        extent.max(0.0) / 2.0
    } else {
        0.0
    }
}

/// Clamps `value` into the padded range of one axis.
fn clamp_axis(value: f64, extent: f64, padding: f64) -> f64 {
    match axis_range(extent, padding) {
        Some((lo, hi)) if value.is_finite() => value.clamp(lo, hi),
        Some((lo, _)) => lo,
        None => axis_fallback(extent),
    }
}

/// Produces positions for the negative-response controls.
pub trait PositionSource: Send {
    /// Returns a point inside `[padding, width - padding] × [padding, height - padding]`.
    ///
    /// Must never panic. On a degenerate axis the point falls back to the
    /// middle of that axis.
    fn next(&mut self, width: f64, height: f64, padding: f64) -> Position;
}

/// Uniformly random positions from a seeded [`StdRng`].
#[derive(Debug)]
pub struct RandomPositions {
    rng: StdRng,
}

impl RandomPositions {
    /// Creates a source seeded from OS entropy.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Creates a reproducible source from a fixed seed.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Creates a source from an optional seed, falling back to entropy.
    #[must_use]
    pub fn from_seed_option(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::seeded)
    }

    fn sample_axis(&mut self, extent: f64, padding: f64) -> f64 {
        match axis_range(extent, padding) {
            Some((lo, hi)) if hi > lo => self.rng.random_range(lo..=hi),
            Some((lo, _)) => lo,
            None => axis_fallback(extent),
        }
    }
}

impl PositionSource for RandomPositions {
    fn next(&mut self, width: f64, height: f64, padding: f64) -> Position {
        let x = self.sample_axis(width, padding);
        let y = self.sample_axis(height, padding);
        Position { x, y }
    }
}

/// Deterministic positions cycling through a fixed list.
///
/// Each point is clamped into the requested bounds, so a script written
/// for a large viewport stays valid on a small one.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPositions {
    points: Vec<Position>,
    cursor: usize,
}

impl ScriptedPositions {
    /// Creates a source that yields `points` in order, wrapping around.
    #[must_use]
    pub const fn new(points: Vec<Position>) -> Self {
        Self { points, cursor: 0 }
    }

    /// Number of positions handed out so far.
    #[must_use]
    pub const fn calls(&self) -> usize {
        self.cursor
    }
}

impl PositionSource for ScriptedPositions {
    fn next(&mut self, width: f64, height: f64, padding: f64) -> Position {
        let raw = if self.points.is_empty() {
            Position::ORIGIN
        } else {
            self.points[self.cursor % self.points.len()]
        };
        self.cursor = self.cursor.saturating_add(1);
        Position {
            x: clamp_axis(raw.x, width, padding),
            y: clamp_axis(raw.y, height, padding),
        }
    }
}
