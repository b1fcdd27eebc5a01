//! Negative-control layout: placement and the decoy button set.

pub mod buttons;
pub mod position;

pub use buttons::{ButtonId, ButtonInstance, ButtonSet, SCALE_NOMINAL, SCALE_SHRUNK};
pub use position::{Position, PositionSource, RandomPositions, ScriptedPositions, Viewport};
