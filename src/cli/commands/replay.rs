//! `replay` command: run a scripted interaction.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use super::{build_controller, finish, print_state};
use crate::cli::args::ReplayArgs;
use crate::cli::script::{ReplayScript, ScriptCommand};
use crate::error::ConfessionError;
use crate::observability::EventEmitter;
use crate::session::Session;

/// Runs every step of the script, then prints the final render state.
///
/// With `--trace` the state is printed after every step that changed it
/// instead. `state` steps always print.
///
/// # Errors
///
/// Returns an error if the script or configuration cannot be loaded, or
/// the session stops unexpectedly.
pub async fn run(
    args: &ReplayArgs,
    emitter: Arc<EventEmitter>,
    cancel: CancellationToken,
) -> Result<(), ConfessionError> {
    let script = ReplayScript::load(&args.script)?;
    info!(
        script = %args.script.display(),
        name = script.name.as_deref().unwrap_or("<unnamed>"),
        steps = script.steps.len(),
        "replaying script"
    );

    let controller = build_controller(&args.session)?;
    let (handle, join) = Session::spawn(controller, emitter, cancel.child_token());

    let mut last = handle.snapshot().await?;
    if args.trace {
        print_state(&last)?;
    }

    for step in script.steps {
        match step {
            ScriptCommand::Input(input) => {
                handle.dispatch(input).await?;
            }
            ScriptCommand::Wait(duration) => {
                tokio::select! {
                    () = cancel.cancelled() => break,
                    () = tokio::time::sleep(duration) => {}
                }
            }
            ScriptCommand::State => print_state(&handle.snapshot().await?)?,
            ScriptCommand::Quit => break,
        }

        if cancel.is_cancelled() {
            break;
        }

        let state = handle.snapshot().await?;
        if args.trace && state != last {
            print_state(&state)?;
        }
        last = state;
    }

    if !args.trace {
        print_state(&last)?;
    }

    drop(handle);
    finish(join).await?;
    Ok(())
}
