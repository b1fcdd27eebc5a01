//! Command-line interface: argument definitions, the text command
//! language, and command handlers.

pub mod args;
pub mod commands;
pub mod script;
