//! Confession state machine
//!
//! The `ConfessionMachine` maps (current stage, routed event) to the next
//! stage, the button layout for that stage, the effects to fire and the
//! ambient-mode change. It owns no timers: effect requests are handed back
//! in the [`Transition`] for the controller to schedule.

use std::sync::Arc;

use tracing::{debug, info};

use crate::config::WidgetConfig;
use crate::effects::{EffectFlag, EffectRequest};
use crate::layout::{
    ButtonId, ButtonSet, Position, PositionSource, RandomPositions, SCALE_NOMINAL, SCALE_SHRUNK,
    Viewport,
};

use super::event::{AmbientChange, Event, Transition};
use super::stage::Stage;

/// Label of the negative control before any decline.
pub const LABEL_NO: &str = "No";

/// Label after the first decline and on every decoy.
pub const LABEL_REALLY: &str = "Really?";

/// Label of the last negative control.
pub const LABEL_LAST_CHANCE: &str = "Last chance...";

/// Stage machine with its current button layout and ambient modes.
pub struct ConfessionMachine {
    stage: Stage,
    buttons: ButtonSet,
    tilt_mode: bool,
    corrupted_cursor_mode: bool,
    viewport: Viewport,
    config: Arc<WidgetConfig>,
    positions: Box<dyn PositionSource>,
}

impl ConfessionMachine {
    /// Creates a machine in [`Stage::Initial`] placing controls with
    /// `positions`.
    #[must_use]
    pub fn new(config: Arc<WidgetConfig>, positions: Box<dyn PositionSource>) -> Self {
        Self {
            stage: Stage::Initial,
            buttons: Self::initial_buttons(),
            tilt_mode: false,
            corrupted_cursor_mode: false,
            viewport: config.viewport,
            config,
            positions,
        }
    }

    /// Creates a machine with seeded (or entropy) random placement, as
    /// configured by `config.seed`.
    #[must_use]
    pub fn with_random_positions(config: Arc<WidgetConfig>) -> Self {
        let positions = RandomPositions::from_seed_option(config.seed);
        Self::new(config, Box::new(positions))
    }

    /// The inline "No" shown next to "Yes" before the chase begins.
    fn initial_buttons() -> ButtonSet {
        ButtonSet::single_authoritative(Position::ORIGIN, SCALE_NOMINAL, LABEL_NO)
    }

    /// Current stage.
    #[must_use]
    pub const fn stage(&self) -> Stage {
        self.stage
    }

    /// Current negative controls.
    #[must_use]
    pub const fn buttons(&self) -> &ButtonSet {
        &self.buttons
    }

    /// Whether the viewport is tilted.
    #[must_use]
    pub const fn tilt_mode(&self) -> bool {
        self.tilt_mode
    }

    /// Whether the corrupted cursor is shown.
    #[must_use]
    pub const fn corrupted_cursor_mode(&self) -> bool {
        self.corrupted_cursor_mode
    }

    /// Current viewport.
    #[must_use]
    pub const fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    /// Updates the viewport used for future placements.
    ///
    /// Controls already on screen keep their positions.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        debug!(width = viewport.width, height = viewport.height, "viewport resized");
        self.viewport = viewport;
    }

    fn next_position(&mut self) -> Position {
        self.positions
            .next(self.viewport.width, self.viewport.height, self.config.padding)
    }

    /// Processes one routed event.
    ///
    /// Returns `Some(Transition)` when the event changed anything, `None`
    /// when it was ignored (unknown for this stage, stale decoy id, or no
    /// authoritative control to act on).
    pub fn transition(&mut self, event: &Event) -> Option<Transition> {
        if self.stage == Stage::Accepted {
            debug!(event = event.name(), "accepted is final; event ignored");
            return None;
        }

        let needs_authoritative = matches!(
            event,
            Event::HoverOrTouchAuthoritative | Event::ClickAuthoritative
        );
        if needs_authoritative && self.buttons.authoritative().is_none() {
            debug!(stage = %self.stage, event = event.name(), "no authoritative control; event dropped");
            return None;
        }

        match (self.stage, event) {
            (_, Event::ClickAffirmative) => Some(self.enter(
                Stage::Accepted,
                ButtonSet::empty(),
                vec![EffectRequest::Confetti {
                    count: self.config.confetti.count,
                    lifetime: self.config.confetti.lifetime,
                }],
                AmbientChange::Disable,
                "affirmative clicked",
            )),

            (Stage::Initial, Event::HoverOrTouchAuthoritative) => {
                let position = self.next_position();
                Some(self.enter(
                    Stage::Chase,
                    ButtonSet::single_authoritative(position, SCALE_NOMINAL, LABEL_NO),
                    vec![],
                    AmbientChange::Unchanged,
                    "pointer reached the negative control",
                ))
            }

            (Stage::Initial | Stage::Chase, Event::ClickAuthoritative) => {
                let position = self
                    .buttons
                    .authoritative()
                    .map_or(Position::ORIGIN, |b| b.position);
                let effects = &self.config.effects;
                let requests = vec![
                    EffectRequest::Flag {
                        flag: EffectFlag::Winking,
                        duration: effects.wink,
                    },
                    EffectRequest::Flag {
                        flag: EffectFlag::Glitching,
                        duration: effects.glitch,
                    },
                ];
                Some(self.enter(
                    Stage::Declined1,
                    ButtonSet::single_authoritative(position, SCALE_SHRUNK, LABEL_REALLY),
                    requests,
                    AmbientChange::Unchanged,
                    "first decline",
                ))
            }

            (Stage::Declined1, Event::ClickAuthoritative) => {
                let decoys = self.config.decoys;
                let viewport = self.viewport;
                let padding = self.config.padding;
                let buttons = ButtonSet::scatter_with_decoys(
                    decoys.authoritative_index,
                    decoys.count,
                    SCALE_SHRUNK,
                    LABEL_REALLY,
                    self.positions.as_mut(),
                    viewport,
                    padding,
                );
                Some(self.enter(
                    Stage::Declined2,
                    buttons,
                    vec![],
                    AmbientChange::Unchanged,
                    "second decline",
                ))
            }

            (Stage::Declined2, Event::ClickAuthoritative) => {
                let position = self.next_position();
                Some(self.enter(
                    Stage::Declined3,
                    ButtonSet::single_authoritative(position, SCALE_SHRUNK, LABEL_LAST_CHANCE),
                    vec![EffectRequest::Flag {
                        flag: EffectFlag::Flashing,
                        duration: self.config.effects.flash,
                    }],
                    AmbientChange::Enable,
                    "third decline",
                ))
            }

            (Stage::Declined2, Event::ClickDecoy(id)) => self.remove_decoy(id),

            (Stage::Declined3, Event::ClickAuthoritative) => Some(self.enter(
                Stage::Corrupted,
                ButtonSet::empty(),
                vec![],
                AmbientChange::Disable,
                "final decline",
            )),

            (stage, event) => {
                debug!(%stage, event = event.name(), "event not handled in this stage");
                None
            }
        }
    }

    fn remove_decoy(&mut self, id: &ButtonId) -> Option<Transition> {
        if !self.buttons.remove_decoy(id) {
            debug!(button_id = %id, "decoy already gone; click ignored");
            return None;
        }
        debug!(button_id = %id, remaining = self.buttons.len(), "decoy removed");
        Some(Transition {
            from: self.stage,
            to: self.stage,
            reason: format!("decoy '{id}' clicked"),
            effects: vec![],
            ambient: AmbientChange::Unchanged,
            removed_decoy: Some(id.clone()),
        })
    }

    /// Replaces stage, button set and ambient modes in one step.
    fn enter(
        &mut self,
        to: Stage,
        buttons: ButtonSet,
        effects: Vec<EffectRequest>,
        ambient: AmbientChange,
        reason: &str,
    ) -> Transition {
        let from = self.stage;
        debug_assert!(buttons.authoritative_count() <= 1);

        self.stage = to;
        self.buttons = buttons;
        match ambient {
            AmbientChange::Unchanged => {}
            AmbientChange::Enable => {
                self.tilt_mode = true;
                self.corrupted_cursor_mode = true;
            }
            AmbientChange::Disable => {
                self.tilt_mode = false;
                self.corrupted_cursor_mode = false;
            }
        }

        info!(%from, %to, reason, buttons = self.buttons.len(), "stage transition");

        Transition {
            from,
            to,
            reason: reason.to_string(),
            effects,
            ambient,
            removed_decoy: None,
        }
    }
}

impl std::fmt::Debug for ConfessionMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfessionMachine")
            .field("stage", &self.stage)
            .field("buttons", &self.buttons.len())
            .field("tilt_mode", &self.tilt_mode)
            .field("corrupted_cursor_mode", &self.corrupted_cursor_mode)
            .finish_non_exhaustive()
    }
}
