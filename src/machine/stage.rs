//! Stages and their derived, stateless presentation.

use serde::{Deserialize, Serialize};

/// One discrete phase of the confession.
///
/// Stages only move forward; the sole self-loop is a decoy click during
/// [`Stage::Declined2`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Question asked, "No" sits next to "Yes".
    #[default]
    Initial,
    /// "No" has started running away from the pointer.
    Chase,
    /// First decline: "No" shrinks.
    Declined1,
    /// Second decline: "No" multiplies into decoys.
    Declined2,
    /// Third decline: last chance, the viewport tilts.
    Declined3,
    /// The user insisted; the negative control is gone.
    Corrupted,
    /// The user said yes.
    Accepted,
}

impl Stage {
    /// All stages in order.
    pub const ALL: [Self; 7] = [
        Self::Initial,
        Self::Chase,
        Self::Declined1,
        Self::Declined2,
        Self::Declined3,
        Self::Corrupted,
        Self::Accepted,
    ];

    /// Stable `snake_case` name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Initial => "initial",
            Self::Chase => "chase",
            Self::Declined1 => "declined1",
            Self::Declined2 => "declined2",
            Self::Declined3 => "declined3",
            Self::Corrupted => "corrupted",
            Self::Accepted => "accepted",
        }
    }

    /// Whether the negative control can no longer advance anything.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Corrupted | Self::Accepted)
    }

    /// Presentation of this stage.
    #[must_use]
    pub const fn view(self) -> StageView {
        let image = match self {
            Self::Initial | Self::Chase | Self::Declined1 => CharacterImage::Hopeful,
            Self::Declined2 | Self::Declined3 | Self::Corrupted => CharacterImage::Sad,
            Self::Accepted => CharacterImage::Happy,
        };

        match self {
            Self::Corrupted => StageView {
                heading: "You shouldn't have done that.",
                image,
                image_class: None,
                heading_class: "heading-corrupted",
                background_class: "background-corrupted",
                affirmative_label: "YES! 💖",
                affirmative_class: "btn-yes-final",
            },
            Self::Accepted => StageView {
                heading: "Yay! I love you too!",
                image,
                image_class: Some("pulse-heart"),
                heading_class: "heading-sweet",
                background_class: "background-sweet",
                affirmative_label: "Yes! 💖",
                affirmative_class: "btn-yes animate-pulse scale-110",
            },
            Self::Initial | Self::Chase | Self::Declined1 | Self::Declined2 | Self::Declined3 => {
                StageView {
                    heading: "Do you love me?",
                    image,
                    image_class: None,
                    heading_class: "heading-sweet",
                    background_class: "background-sweet",
                    affirmative_label: "Yes! 💖",
                    affirmative_class: "btn-yes",
                }
            }
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Character artwork shown under the heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CharacterImage {
    /// Hopeful, waiting for an answer.
    Hopeful,
    /// Hurt by the refusals.
    Sad,
    /// Celebrating.
    Happy,
    /// Winking overlay shown during the wink effect.
    Wink,
}

impl CharacterImage {
    /// Asset key the binding resolves to an image file.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Hopeful => "hopeful",
            Self::Sad => "sad",
            Self::Happy => "happy",
            Self::Wink => "wink",
        }
    }
}

/// Heading, artwork and classes for one stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StageView {
    /// Heading text.
    pub heading: &'static str,
    /// Character artwork.
    pub image: CharacterImage,
    /// Extra class on the artwork.
    pub image_class: Option<&'static str>,
    /// Base heading class (the glitch class is added by the render state).
    pub heading_class: &'static str,
    /// Page background class.
    pub background_class: &'static str,
    /// Text on the affirmative control.
    pub affirmative_label: &'static str,
    /// Classes on the affirmative control.
    pub affirmative_class: &'static str,
}
