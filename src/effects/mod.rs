//! Timed visual effects.

pub mod scheduler;

pub use scheduler::{
    ConfettiParticle, ConfettiPayload, EffectFlag, EffectRequest, EffectScheduler, EffectTarget,
    PendingClear,
};
