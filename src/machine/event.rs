//! Events the state machine understands, and the record of a transition.

use crate::effects::EffectRequest;
use crate::layout::ButtonId;

use super::stage::Stage;

/// A routed interaction, already resolved against the current button set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Pointer entered, or touch started on, the authoritative control.
    HoverOrTouchAuthoritative,
    /// The authoritative control was clicked.
    ClickAuthoritative,
    /// A decoy was clicked.
    ClickDecoy(ButtonId),
    /// The "Yes" control was clicked.
    ClickAffirmative,
}

impl Event {
    /// Short name for logs and the event stream.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::HoverOrTouchAuthoritative => "hover_or_touch_authoritative",
            Self::ClickAuthoritative => "click_authoritative",
            Self::ClickDecoy(_) => "click_decoy",
            Self::ClickAffirmative => "click_affirmative",
        }
    }
}

/// Change to the document-level visual modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AmbientChange {
    /// Leave both modes as they are.
    #[default]
    Unchanged,
    /// Switch tilt and corrupted-cursor on.
    Enable,
    /// Switch tilt and corrupted-cursor off.
    Disable,
}

/// Record of a processed event, for the controller and the event stream.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// Stage before the event.
    pub from: Stage,
    /// Stage after the event (equal to `from` on a decoy removal).
    pub to: Stage,
    /// Human-readable reason the event was accepted.
    pub reason: String,
    /// Effects to fire now.
    pub effects: Vec<EffectRequest>,
    /// Ambient mode update.
    pub ambient: AmbientChange,
    /// Decoy removed by this event, if any.
    pub removed_decoy: Option<ButtonId>,
}

impl Transition {
    /// Whether the stage actually changed.
    #[must_use]
    pub fn changed_stage(&self) -> bool {
        self.from != self.to
    }
}
