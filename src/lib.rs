//! `confession` - headless core of a decline-avoidance confession widget
//!
//! A question with a "Yes" and a "No" control, where "No" runs away,
//! shrinks, multiplies into decoys and finally vanishes. This crate holds
//! the interaction state machine, decoy management, self-expiring visual
//! effects and the render state a presentation layer draws from.

pub mod cli;
pub mod config;
pub mod controller;
pub mod effects;
pub mod error;
pub mod layout;
pub mod machine;
pub mod observability;
pub mod session;
