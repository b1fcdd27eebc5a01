//! Single owner of the widget state.
//!
//! The `Controller` routes raw input from the presentation binding to the
//! state machine, fires the effects each transition asks for, applies due
//! effect clears, and assembles the pull-based [`RenderState`] the binding
//! draws from.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::WidgetConfig;
use crate::effects::{ConfettiParticle, EffectFlag, EffectScheduler, PendingClear};
use crate::layout::{ButtonId, ButtonInstance, PositionSource, Viewport};
use crate::machine::{CharacterImage, ConfessionMachine, Event, Stage, Transition};

/// Background colour shown while the flash effect is active.
pub const FLASH_BACKGROUND: &str = "hsl(280, 65%, 25%)";

/// Class appended to the heading while the glitch effect is active.
pub const GLITCH_CLASS: &str = "glitch";

/// Raw input forwarded by the presentation binding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    /// Pointer entered the authoritative control.
    PointerEnterAuthoritative,
    /// Touch started on the authoritative control.
    TouchStartAuthoritative,
    /// Any negative control was clicked.
    ClickButton {
        /// Id of the clicked control.
        id: ButtonId,
    },
    /// The "Yes" control was clicked.
    ClickAffirmative,
    /// The viewport changed size.
    Resize {
        /// New width in pixels.
        width: f64,
        /// New height in pixels.
        height: f64,
    },
}

impl std::fmt::Display for InputEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PointerEnterAuthoritative => f.write_str("hover"),
            Self::TouchStartAuthoritative => f.write_str("touch"),
            Self::ClickButton { id } => write!(f, "click {id}"),
            Self::ClickAffirmative => f.write_str("yes"),
            Self::Resize { width, height } => write!(f, "resize {width} {height}"),
        }
    }
}

/// What a single input did.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Outcome {
    /// The routed machine event, if the input mapped to one.
    pub routed: Option<Event>,
    /// The resulting transition, if the machine accepted the event.
    pub transition: Option<Transition>,
    /// Clears to deliver back through [`Controller::expire`] once due.
    pub clears: Vec<PendingClear>,
}

/// A negative control as the binding draws it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ButtonView {
    /// The control.
    #[serde(flatten)]
    pub button: ButtonInstance,
    /// Style class derived from its scale.
    pub style_class: &'static str,
}

impl From<&ButtonInstance> for ButtonView {
    fn from(button: &ButtonInstance) -> Self {
        Self {
            button: button.clone(),
            style_class: button.style_class(),
        }
    }
}

/// Everything the binding needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderState {
    /// Current stage.
    pub stage: Stage,
    /// Heading text.
    pub heading: &'static str,
    /// Heading classes, including the glitch class while glitching.
    pub heading_class: String,
    /// Character artwork.
    pub image: CharacterImage,
    /// Extra artwork class.
    pub image_class: Option<&'static str>,
    /// Page background class.
    pub background_class: &'static str,
    /// Text on the affirmative control.
    pub affirmative_label: &'static str,
    /// Classes on the affirmative control.
    pub affirmative_class: &'static str,
    /// Whether the winking overlay is shown.
    pub wink_visible: bool,
    /// Overlay artwork drawn over the character, if any.
    pub overlay: Option<CharacterImage>,
    /// Background override while flashing.
    pub flash_background: Option<&'static str>,
    /// Negative controls in render order.
    pub buttons: Vec<ButtonView>,
    /// Whether the negative control sits inline next to "Yes".
    pub negative_inline: bool,
    /// Raised effect flags.
    pub effects: Vec<EffectFlag>,
    /// Whether a confetti batch is live.
    pub confetti_active: bool,
    /// Live confetti particles.
    pub confetti: Vec<ConfettiParticle>,
    /// Document-level tilt.
    pub tilt_mode: bool,
    /// Document-level corrupted cursor.
    pub corrupted_cursor_mode: bool,
    /// Current viewport.
    pub viewport: Viewport,
}

/// Owns the state machine and the effect scheduler.
#[derive(Debug)]
pub struct Controller {
    machine: ConfessionMachine,
    effects: EffectScheduler,
}

impl Controller {
    /// Creates a controller with random placement seeded from `config.seed`.
    #[must_use]
    pub fn new(config: Arc<WidgetConfig>) -> Self {
        let effects = Self::scheduler_for(&config);
        Self {
            machine: ConfessionMachine::with_random_positions(config),
            effects,
        }
    }

    /// Creates a controller with an injected placement source.
    #[must_use]
    pub fn with_positions(config: Arc<WidgetConfig>, positions: Box<dyn PositionSource>) -> Self {
        let effects = Self::scheduler_for(&config);
        Self {
            machine: ConfessionMachine::new(config, positions),
            effects,
        }
    }

    fn scheduler_for(config: &WidgetConfig) -> EffectScheduler {
        // Offset the seed so confetti does not replay the placement stream.
        let seed = config.seed.map(|s| s.wrapping_add(1));
        EffectScheduler::new(config.confetti.max_delay, seed)
    }

    /// The state machine.
    #[must_use]
    pub const fn machine(&self) -> &ConfessionMachine {
        &self.machine
    }

    /// The effect scheduler.
    #[must_use]
    pub const fn effects(&self) -> &EffectScheduler {
        &self.effects
    }

    /// Current stage.
    #[must_use]
    pub const fn stage(&self) -> Stage {
        self.machine.stage()
    }

    /// Maps raw input to a machine event against the current button set.
    ///
    /// Clicks on ids not present in the set, and pointer input while no
    /// authoritative control exists, map to nothing.
    #[must_use]
    pub fn route(&self, input: &InputEvent) -> Option<Event> {
        let buttons = self.machine.buttons();
        match input {
            InputEvent::PointerEnterAuthoritative | InputEvent::TouchStartAuthoritative => buttons
                .authoritative()
                .map(|_| Event::HoverOrTouchAuthoritative),
            InputEvent::ClickButton { id } => buttons.get(id).map(|button| {
                if button.is_authoritative {
                    Event::ClickAuthoritative
                } else {
                    Event::ClickDecoy(id.clone())
                }
            }),
            InputEvent::ClickAffirmative => Some(Event::ClickAffirmative),
            InputEvent::Resize { .. } => None,
        }
    }

    /// Processes one input to completion.
    pub fn handle(&mut self, input: &InputEvent) -> Outcome {
        if let InputEvent::Resize { width, height } = *input {
            self.machine.set_viewport(Viewport::new(width, height));
            return Outcome::default();
        }

        let Some(event) = self.route(input) else {
            debug!(?input, stage = %self.stage(), "input did not map to an event");
            return Outcome::default();
        };

        let transition = self.machine.transition(&event);
        let width = self.machine.viewport().width;
        let clears = transition
            .as_ref()
            .map(|t| {
                t.effects
                    .iter()
                    .map(|request| self.effects.apply(*request, width))
                    .collect()
            })
            .unwrap_or_default();

        Outcome {
            routed: Some(event),
            transition,
            clears,
        }
    }

    /// Applies a due effect clear; stale clears are ignored.
    pub fn expire(&mut self, pending: &PendingClear) -> bool {
        self.effects.expire(pending)
    }

    /// Builds the outbound render state.
    #[must_use]
    pub fn snapshot(&self) -> RenderState {
        let stage = self.machine.stage();
        let view = stage.view();
        let glitching = self.effects.is_active(EffectFlag::Glitching);
        let winking = self.effects.is_active(EffectFlag::Winking);
        let heading_class = if glitching {
            format!("{} {GLITCH_CLASS}", view.heading_class)
        } else {
            view.heading_class.to_string()
        };

        RenderState {
            stage,
            heading: view.heading,
            heading_class,
            image: view.image,
            image_class: view.image_class,
            background_class: view.background_class,
            affirmative_label: view.affirmative_label,
            affirmative_class: view.affirmative_class,
            wink_visible: winking,
            overlay: winking.then_some(CharacterImage::Wink),
            flash_background: self
                .effects
                .is_active(EffectFlag::Flashing)
                .then_some(FLASH_BACKGROUND),
            buttons: self.machine.buttons().iter().map(ButtonView::from).collect(),
            negative_inline: stage == Stage::Initial,
            effects: self.effects.active_flags(),
            confetti_active: self.effects.confetti_active(),
            confetti: self.effects.confetti().to_vec(),
            tilt_mode: self.machine.tilt_mode(),
            corrupted_cursor_mode: self.machine.corrupted_cursor_mode(),
            viewport: self.machine.viewport(),
        }
    }
}
