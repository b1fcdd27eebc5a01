//! Confession state machine
//!
//! Stage definitions, the routed events the machine reacts to, and the
//! transition engine.

pub mod engine;
pub mod event;
pub mod stage;

pub use engine::{ConfessionMachine, LABEL_LAST_CHANCE, LABEL_NO, LABEL_REALLY};
pub use event::{AmbientChange, Event, Transition};
pub use stage::{CharacterImage, Stage, StageView};
