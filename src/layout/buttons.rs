//! The set of negative-response controls.
//!
//! Exactly one entry may be authoritative (the button that actually
//! advances the state machine); every other entry is a decoy that
//! vanishes when clicked. The whole set is rebuilt on every stage
//! transition; decoys are removed one at a time in between.

use serde::{Deserialize, Serialize};

use super::position::{Position, PositionSource, Viewport};

/// Scale of a full-size control.
pub const SCALE_NOMINAL: f64 = 1.0;

/// Scale of a shrunk control.
pub const SCALE_SHRUNK: f64 = 0.5;

/// Newtype wrapper for button identifiers.
///
/// `"main"` names the authoritative control, `"decoy-<n>"` the distractors.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ButtonId(pub String);

impl ButtonId {
    /// Creates a new `ButtonId` from a string.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// The authoritative control's id.
    #[must_use]
    pub fn main() -> Self {
        Self::new("main")
    }

    /// The id of the decoy at scatter slot `index`.
    #[must_use]
    pub fn decoy(index: usize) -> Self {
        Self(format!("decoy-{index}"))
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ButtonId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ButtonId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// One rendered negative-response control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ButtonInstance {
    /// Stable identifier.
    pub id: ButtonId,
    /// Placement in viewport pixels.
    pub position: Position,
    /// Size multiplier.
    pub scale: f64,
    /// Display text.
    pub label: String,
    /// Whether clicking this button advances the stage.
    pub is_authoritative: bool,
}

impl ButtonInstance {
    /// Style class for the binding: shrunk controls render small.
    #[must_use]
    pub fn style_class(&self) -> &'static str {
        if self.scale < SCALE_NOMINAL {
            "btn-no-small"
        } else {
            "btn-no"
        }
    }
}

/// Ordered collection of negative-response controls.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct ButtonSet {
    buttons: Vec<ButtonInstance>,
}

impl ButtonSet {
    /// A set with no controls.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            buttons: Vec::new(),
        }
    }

    /// A set holding only the authoritative control.
    #[must_use]
    pub fn single_authoritative(position: Position, scale: f64, label: &str) -> Self {
        Self {
            buttons: vec![ButtonInstance {
                id: ButtonId::main(),
                position,
                scale,
                label: label.to_string(),
                is_authoritative: true,
            }],
        }
    }

    /// `count` controls at independent positions; only the one at
    /// `authoritative_index` is real.
    ///
    /// An index past the end is clamped to the last slot so the set always
    /// keeps exactly one authoritative entry.
    #[must_use]
    pub fn scatter_with_decoys(
        authoritative_index: usize,
        count: usize,
        scale: f64,
        label: &str,
        positions: &mut dyn PositionSource,
        viewport: Viewport,
        padding: f64,
    ) -> Self {
        if count == 0 {
            return Self::empty();
        }
        let authoritative_index = authoritative_index.min(count - 1);

        let buttons = (0..count)
            .map(|i| {
                let position = positions.next(viewport.width, viewport.height, padding);
                let is_authoritative = i == authoritative_index;
                ButtonInstance {
                    id: if is_authoritative {
                        ButtonId::main()
                    } else {
                        ButtonId::decoy(i)
                    },
                    position,
                    scale,
                    label: label.to_string(),
                    is_authoritative,
                }
            })
            .collect();

        Self { buttons }
    }

    /// Removes the decoy with the given id.
    ///
    /// Returns `false` without touching the set when the id is unknown or
    /// names the authoritative control.
    pub fn remove_decoy(&mut self, id: &ButtonId) -> bool {
        let Some(index) = self
            .buttons
            .iter()
            .position(|b| &b.id == id && !b.is_authoritative)
        else {
            return false;
        };
        self.buttons.remove(index);
        true
    }

    /// The authoritative control, if present.
    #[must_use]
    pub fn authoritative(&self) -> Option<&ButtonInstance> {
        self.buttons.iter().find(|b| b.is_authoritative)
    }

    /// Looks up a control by id.
    #[must_use]
    pub fn get(&self, id: &ButtonId) -> Option<&ButtonInstance> {
        self.buttons.iter().find(|b| &b.id == id)
    }

    /// Number of authoritative entries (0 or 1 for any set built here).
    #[must_use]
    pub fn authoritative_count(&self) -> usize {
        self.buttons.iter().filter(|b| b.is_authoritative).count()
    }

    /// Number of controls.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buttons.len()
    }

    /// Whether the set holds no controls.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buttons.is_empty()
    }

    /// Iterates controls in render order.
    pub fn iter(&self) -> std::slice::Iter<'_, ButtonInstance> {
        self.buttons.iter()
    }

    /// Returns the controls as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[ButtonInstance] {
        &self.buttons
    }
}

impl<'a> IntoIterator for &'a ButtonSet {
    type Item = &'a ButtonInstance;
    type IntoIter = std::slice::Iter<'a, ButtonInstance>;

    fn into_iter(self) -> Self::IntoIter {
        self.buttons.iter()
    }
}
