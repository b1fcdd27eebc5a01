//! Text command language shared by `play` and `replay`.
//!
//! One command per line:
//!
//! ```text
//! hover                 pointer enters the authoritative control
//! touch                 touch starts on the authoritative control
//! click <id>            click a negative control (main, decoy-0, ...)
//! yes                   click the affirmative control
//! resize <w> <h>        viewport resize
//! wait <duration>       let time pass (humantime, e.g. 600ms)
//! state                 print the current render state
//! quit                  stop
//! ```
//!
//! Blank lines and lines starting with `#` are skipped.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::controller::InputEvent;
use crate::error::{ConfessionError, ScriptError};

/// One parsed command.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptCommand {
    /// Forward an input to the session.
    Input(InputEvent),
    /// Let time pass.
    Wait(Duration),
    /// Print the current render state.
    State,
    /// Stop.
    Quit,
}

/// Parses one command line. Returns `Ok(None)` for blank and comment lines.
///
/// # Errors
///
/// Returns a [`ScriptError`] for unknown commands or bad arguments.
pub fn parse_command(line: &str) -> Result<Option<ScriptCommand>, ScriptError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();

    let parsed = match command {
        "hover" => {
            no_args(command, &args)?;
            ScriptCommand::Input(InputEvent::PointerEnterAuthoritative)
        }
        "touch" => {
            no_args(command, &args)?;
            ScriptCommand::Input(InputEvent::TouchStartAuthoritative)
        }
        "yes" => {
            no_args(command, &args)?;
            ScriptCommand::Input(InputEvent::ClickAffirmative)
        }
        "state" => {
            no_args(command, &args)?;
            ScriptCommand::State
        }
        "quit" | "exit" => {
            no_args(command, &args)?;
            ScriptCommand::Quit
        }
        "click" => match args.as_slice() {
            [id] => ScriptCommand::Input(InputEvent::ClickButton { id: (*id).into() }),
            _ => return Err(invalid(command, "expected exactly one button id")),
        },
        "resize" => match args.as_slice() {
            [w, h] => {
                let width = parse_extent(command, w)?;
                let height = parse_extent(command, h)?;
                ScriptCommand::Input(InputEvent::Resize { width, height })
            }
            _ => return Err(invalid(command, "expected <width> <height>")),
        },
        "wait" => {
            let value = args.join(" ");
            if value.is_empty() {
                return Err(invalid(command, "expected a duration"));
            }
            let duration =
                humantime::parse_duration(&value).map_err(|e| ScriptError::InvalidWait {
                    value: value.clone(),
                    message: e.to_string(),
                })?;
            ScriptCommand::Wait(duration)
        }
        other => return Err(ScriptError::UnknownCommand(other.to_string())),
    };

    Ok(Some(parsed))
}

fn no_args(command: &str, args: &[&str]) -> Result<(), ScriptError> {
    if args.is_empty() {
        Ok(())
    } else {
        Err(invalid(command, "takes no arguments"))
    }
}

fn parse_extent(command: &str, raw: &str) -> Result<f64, ScriptError> {
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
        _ => Err(invalid(command, &format!("'{raw}' is not a valid size"))),
    }
}

fn invalid(command: &str, message: &str) -> ScriptError {
    ScriptError::InvalidArguments {
        command: command.to_string(),
        message: message.to_string(),
    }
}

// ============================================================================
// Replay scripts
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawScript {
    #[serde(default)]
    name: Option<String>,
    steps: Vec<String>,
}

/// A parsed replay script.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayScript {
    /// Optional script name, for logs.
    pub name: Option<String>,
    /// Commands in order.
    pub steps: Vec<ScriptCommand>,
}

impl ReplayScript {
    /// Parses a YAML replay script.
    ///
    /// # Errors
    ///
    /// Returns a YAML error for malformed documents, or a
    /// [`ScriptError::Step`] naming the first bad step.
    pub fn from_yaml(raw: &str) -> Result<Self, ConfessionError> {
        let script: RawScript = serde_yaml::from_str(raw)?;
        let mut steps = Vec::with_capacity(script.steps.len());
        for (step, line) in script.steps.iter().enumerate() {
            let parsed = parse_command(line).map_err(|source| ScriptError::Step {
                step,
                source: Box::new(source),
            })?;
            steps.extend(parsed);
        }
        Ok(Self {
            name: script.name,
            steps,
        })
    }

    /// Reads and parses a replay script file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read, or any error from
    /// [`from_yaml`](Self::from_yaml).
    pub fn load(path: &Path) -> Result<Self, ConfessionError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_yaml(&raw)
    }
}
