//! Self-expiring effect flags and the confetti batch.
//!
//! Every activation bumps a monotonic token and hands back a
//! [`PendingClear`] carrying it. Whoever owns the timer delivers that value
//! back through [`EffectScheduler::expire`] once the duration elapses; the
//! clear only lands if no newer activation has replaced the token in the
//! meantime. The scheduler itself never sleeps, so it stays usable from
//! both the tokio session loop and plain unit tests.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A boolean, self-expiring visual indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectFlag {
    /// Heading glitch pulse.
    Glitching,
    /// Winking character overlay.
    Winking,
    /// Background colour flash.
    Flashing,
}

impl EffectFlag {
    /// All flags in a stable order.
    pub const ALL: [Self; 3] = [Self::Glitching, Self::Winking, Self::Flashing];

    const fn index(self) -> usize {
        match self {
            Self::Glitching => 0,
            Self::Winking => 1,
            Self::Flashing => 2,
        }
    }

    /// Stable lowercase name used in logs and the event stream.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Glitching => "glitching",
            Self::Winking => "winking",
            Self::Flashing => "flashing",
        }
    }
}

impl std::fmt::Display for EffectFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a pending clear will reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectTarget {
    /// A single effect flag.
    Flag(EffectFlag),
    /// The whole confetti batch.
    Confetti,
}

impl std::fmt::Display for EffectTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Flag(flag) => flag.fmt(f),
            Self::Confetti => f.write_str("confetti"),
        }
    }
}

/// Effect activation requested by a stage transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectRequest {
    /// Raise `flag` for `duration`.
    Flag {
        /// Flag to raise.
        flag: EffectFlag,
        /// Time until it auto-clears.
        duration: Duration,
    },
    /// Replace the confetti batch with `count` particles living `lifetime`.
    Confetti {
        /// Particles in the batch.
        count: usize,
        /// Time until the batch is cleared.
        lifetime: Duration,
    },
}

/// A scheduled reset, valid only while its token is current.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingClear {
    /// What to reset.
    pub target: EffectTarget,
    /// Activation token the reset belongs to.
    pub token: u64,
    /// Delay from activation until the reset is due.
    pub after: Duration,
}

/// Symbol carried by a confetti particle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfettiPayload {
    /// 💖
    Heart,
    /// 💀
    Skull,
}

impl ConfettiPayload {
    /// Glyph the binding draws.
    #[must_use]
    pub const fn glyph(self) -> &'static str {
        match self {
            Self::Heart => "💖",
            Self::Skull => "💀",
        }
    }
}

/// One ephemeral confetti piece.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfettiParticle {
    /// Index within its batch.
    pub id: usize,
    /// Horizontal position in viewport pixels, within `[0, width)`.
    pub x: f64,
    /// Animation start delay in seconds, within `[0, max_delay)`.
    pub delay_secs: f64,
    /// Symbol to draw.
    pub payload: ConfettiPayload,
}

#[derive(Debug, Clone, Copy, Default)]
struct Slot {
    active: bool,
    token: u64,
}

/// Owner of every effect flag and the confetti batch.
#[derive(Debug)]
pub struct EffectScheduler {
    slots: [Slot; 3],
    confetti: Vec<ConfettiParticle>,
    confetti_slot: Slot,
    next_token: u64,
    max_delay: Duration,
    rng: StdRng,
}

impl EffectScheduler {
    /// Default upper bound for confetti stagger delays.
    pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(2);

    /// Creates a scheduler with all flags clear.
    ///
    /// `seed` makes confetti placement reproducible; `None` seeds from OS
    /// entropy.
    #[must_use]
    pub fn new(max_delay: Duration, seed: Option<u64>) -> Self {
        let rng = seed.map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
        Self {
            slots: [Slot::default(); 3],
            confetti: Vec::new(),
            confetti_slot: Slot::default(),
            next_token: 0,
            max_delay,
            rng,
        }
    }

    fn bump(&mut self) -> u64 {
        self.next_token = self.next_token.wrapping_add(1);
        self.next_token
    }

    /// Raises `flag` now and returns the clear due after `duration`.
    ///
    /// Re-firing an active flag keeps it raised and restarts its window;
    /// the earlier pending clear becomes stale.
    pub fn fire(&mut self, flag: EffectFlag, duration: Duration) -> PendingClear {
        let token = self.bump();
        self.slots[flag.index()] = Slot {
            active: true,
            token,
        };
        debug!(%flag, token, duration_ms = duration.as_millis(), "effect fired");
        PendingClear {
            target: EffectTarget::Flag(flag),
            token,
            after: duration,
        }
    }

    /// Replaces the confetti batch with `count` fresh particles spread over
    /// `[0, viewport_width)`, and returns the clear due after `lifetime`.
    pub fn fire_confetti_burst(
        &mut self,
        count: usize,
        lifetime: Duration,
        viewport_width: f64,
    ) -> PendingClear {
        let token = self.bump();
        let width = if viewport_width.is_finite() {
            viewport_width.max(0.0)
        } else {
            0.0
        };
        let max_delay = self.max_delay.as_secs_f64();

        let particles = (0..count)
            .map(|id| ConfettiParticle {
                id,
                x: if width > 0.0 {
                    self.rng.random_range(0.0..width)
                } else {
                    0.0
                },
                delay_secs: if max_delay > 0.0 {
                    self.rng.random_range(0.0..max_delay)
                } else {
                    0.0
                },
                payload: if self.rng.random_bool(0.5) {
                    ConfettiPayload::Heart
                } else {
                    ConfettiPayload::Skull
                },
            })
            .collect();

        self.confetti = particles;
        self.confetti_slot = Slot {
            active: true,
            token,
        };
        debug!(count, token, lifetime_ms = lifetime.as_millis(), "confetti burst");
        PendingClear {
            target: EffectTarget::Confetti,
            token,
            after: lifetime,
        }
    }

    /// Executes a transition's effect request.
    pub fn apply(&mut self, request: EffectRequest, viewport_width: f64) -> PendingClear {
        match request {
            EffectRequest::Flag { flag, duration } => self.fire(flag, duration),
            EffectRequest::Confetti { count, lifetime } => {
                self.fire_confetti_burst(count, lifetime, viewport_width)
            }
        }
    }

    /// Applies a due clear. Returns `true` if something was reset.
    ///
    /// A clear whose token has been superseded by a newer activation is
    /// ignored.
    pub fn expire(&mut self, pending: &PendingClear) -> bool {
        match pending.target {
            EffectTarget::Flag(flag) => {
                let slot = &mut self.slots[flag.index()];
                if slot.token != pending.token {
                    debug!(%flag, stale = pending.token, current = slot.token, "stale clear ignored");
                    return false;
                }
                let was_active = slot.active;
                slot.active = false;
                was_active
            }
            EffectTarget::Confetti => {
                if self.confetti_slot.token != pending.token {
                    debug!(
                        stale = pending.token,
                        current = self.confetti_slot.token,
                        "stale confetti clear ignored"
                    );
                    return false;
                }
                let was_active = self.confetti_slot.active;
                self.confetti_slot.active = false;
                self.confetti.clear();
                was_active
            }
        }
    }

    /// Whether `flag` is currently raised.
    #[must_use]
    pub const fn is_active(&self, flag: EffectFlag) -> bool {
        self.slots[flag.index()].active
    }

    /// Raised flags in stable order.
    #[must_use]
    pub fn active_flags(&self) -> Vec<EffectFlag> {
        EffectFlag::ALL
            .into_iter()
            .filter(|flag| self.is_active(*flag))
            .collect()
    }

    /// The live confetti batch (empty when none).
    #[must_use]
    pub fn confetti(&self) -> &[ConfettiParticle] {
        &self.confetti
    }

    /// Whether a confetti burst is live, even one with no particles.
    #[must_use]
    pub const fn confetti_active(&self) -> bool {
        self.confetti_slot.active
    }
}

impl Default for EffectScheduler {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_DELAY, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scheduler() -> EffectScheduler {
        EffectScheduler::new(EffectScheduler::DEFAULT_MAX_DELAY, Some(9))
    }

    #[test]
    fn test_fire_sets_flag_and_expire_clears() {
        let mut s = scheduler();
        let pending = s.fire(EffectFlag::Glitching, Duration::from_millis(500));
        assert!(s.is_active(EffectFlag::Glitching));
        assert_eq!(pending.after, Duration::from_millis(500));
        assert!(s.expire(&pending));
        assert!(!s.is_active(EffectFlag::Glitching));
    }

    #[test]
    fn test_refire_invalidates_earlier_clear() {
        let mut s = scheduler();
        let first = s.fire(EffectFlag::Winking, Duration::from_millis(1500));
        let second = s.fire(EffectFlag::Winking, Duration::from_millis(800));
        assert!(second.token > first.token);
        assert_eq!(second.after, Duration::from_millis(800));

        // The first timer fires: stale, flag stays up.
        assert!(!s.expire(&first));
        assert!(s.is_active(EffectFlag::Winking));

        assert!(s.expire(&second));
        assert!(!s.is_active(EffectFlag::Winking));
    }

    #[test]
    fn test_flags_independent() {
        let mut s = scheduler();
        let wink = s.fire(EffectFlag::Winking, Duration::from_millis(1500));
        let glitch = s.fire(EffectFlag::Glitching, Duration::from_millis(500));
        assert_eq!(s.active_flags(), vec![EffectFlag::Glitching, EffectFlag::Winking]);

        assert!(s.expire(&glitch));
        assert!(s.is_active(EffectFlag::Winking));
        assert!(s.expire(&wink));
        assert!(s.active_flags().is_empty());
    }

    #[test]
    fn test_double_expire_is_harmless() {
        let mut s = scheduler();
        let pending = s.fire(EffectFlag::Flashing, Duration::from_millis(100));
        assert!(s.expire(&pending));
        assert!(!s.expire(&pending));
        assert!(!s.is_active(EffectFlag::Flashing));
    }

    #[test]
    fn test_confetti_burst_shape() {
        let mut s = scheduler();
        s.fire_confetti_burst(50, Duration::from_secs(3), 1280.0);
        let batch = s.confetti();
        assert_eq!(batch.len(), 50);
        for (i, particle) in batch.iter().enumerate() {
            assert_eq!(particle.id, i);
            assert!((0.0..1280.0).contains(&particle.x));
            assert!((0.0..2.0).contains(&particle.delay_secs));
        }
        assert!(s.confetti_active());
    }

    #[test]
    fn test_empty_burst_is_still_active_until_cleared() {
        let mut s = scheduler();
        let pending = s.fire_confetti_burst(0, Duration::from_secs(3), 800.0);
        assert!(s.confetti().is_empty());
        assert!(s.confetti_active());
        assert!(s.expire(&pending));
        assert!(!s.confetti_active());
        assert!(!s.expire(&pending));
    }

    #[test]
    fn test_confetti_clear_and_stale_clear() {
        let mut s = scheduler();
        let first = s.fire_confetti_burst(50, Duration::from_secs(3), 800.0);
        let second = s.fire_confetti_burst(10, Duration::from_secs(3), 800.0);
        assert!(!s.expire(&first));
        assert_eq!(s.confetti().len(), 10);
        assert!(s.expire(&second));
        assert!(s.confetti().is_empty());
    }

    #[test]
    fn test_confetti_on_zero_width_viewport() {
        let mut s = scheduler();
        s.fire_confetti_burst(5, Duration::from_secs(1), 0.0);
        assert!(s.confetti().iter().all(|p| p.x == 0.0));
    }

    #[test]
    fn test_confetti_uses_both_payloads() {
        let mut s = scheduler();
        s.fire_confetti_burst(200, Duration::from_secs(3), 500.0);
        let hearts = s
            .confetti()
            .iter()
            .filter(|p| p.payload == ConfettiPayload::Heart)
            .count();
        assert!(hearts > 0 && hearts < 200);
    }

    #[test]
    fn test_flag_token_does_not_affect_confetti() {
        let mut s = scheduler();
        let burst = s.fire_confetti_burst(3, Duration::from_secs(3), 500.0);
        s.fire(EffectFlag::Glitching, Duration::from_millis(500));
        assert!(s.expire(&burst));
    }

    #[test]
    fn test_apply_dispatches() {
        let mut s = scheduler();
        let pending = s.apply(
            EffectRequest::Flag {
                flag: EffectFlag::Flashing,
                duration: Duration::from_millis(100),
            },
            1280.0,
        );
        assert_eq!(pending.target, EffectTarget::Flag(EffectFlag::Flashing));
        let pending = s.apply(
            EffectRequest::Confetti {
                count: 4,
                lifetime: Duration::from_secs(3),
            },
            1280.0,
        );
        assert_eq!(pending.target, EffectTarget::Confetti);
        assert_eq!(s.confetti().len(), 4);
    }

    #[test]
    fn test_glyphs() {
        assert_eq!(ConfettiPayload::Heart.glyph(), "💖");
        assert_eq!(ConfettiPayload::Skull.glyph(), "💀");
    }
}
