//! Configuration module
//!
//! Loads and validates the YAML file that tunes a widget instance:
//! viewport, padding, decoy layout, effect timings and confetti shape.

pub mod loader;
pub mod schema;

pub use loader::{LoadResult, load, load_str, validate};
pub use schema::{ConfettiConfig, DecoyConfig, EffectTimings, WidgetConfig};
