//! Interactive `play` command.
//!
//! Reads text commands from stdin and prints the render state as a JSON
//! line whenever it changes, including changes made by effect timers.

use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::{build_controller, finish, print_state};
use crate::cli::args::PlayArgs;
use crate::cli::script::{ScriptCommand, parse_command};
use crate::controller::RenderState;
use crate::error::ConfessionError;
use crate::observability::EventEmitter;
use crate::session::{Session, SessionHandle};

/// Runs an interactive session until `quit`, end of input or cancellation.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded, stdin cannot be
/// read, or the session stops unexpectedly. Bad command lines are reported
/// on stderr and skipped.
pub async fn run(
    args: &PlayArgs,
    emitter: Arc<EventEmitter>,
    cancel: CancellationToken,
) -> Result<(), ConfessionError> {
    let controller = build_controller(&args.session)?;
    let (handle, join) = Session::spawn(controller, emitter, cancel.child_token());
    info!(session_id = handle.session_id(), "interactive session ready");

    let input = BufReader::new(tokio::io::stdin());
    let result = drive(&handle, input, &cancel).await;

    handle.shutdown();
    drop(handle);
    finish(join).await?;
    result
}

/// Feeds command lines from `input` into the session until `quit`, end of
/// input or cancellation, printing every state change.
async fn drive<R>(
    handle: &SessionHandle,
    input: R,
    cancel: &CancellationToken,
) -> Result<(), ConfessionError>
where
    R: AsyncBufRead + Unpin,
{
    let mut updates = handle.subscribe();
    let mut last = updates.borrow_and_update().clone();
    print_state(&last)?;

    let mut lines = input.lines();

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = updates.borrow_and_update().clone();
                print_if_changed(&mut last, state)?;
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                match parse_command(&line) {
                    Ok(None) => {}
                    Ok(Some(ScriptCommand::Quit)) => break,
                    Ok(Some(ScriptCommand::State)) => print_state(&handle.snapshot().await?)?,
                    Ok(Some(ScriptCommand::Input(input))) => {
                        let state = handle.dispatch(input).await?;
                        print_if_changed(&mut last, state)?;
                    }
                    Ok(Some(ScriptCommand::Wait(duration))) => {
                        tokio::select! {
                            () = cancel.cancelled() => break,
                            () = tokio::time::sleep(duration) => {}
                        }
                    }
                    Err(e) => {
                        warn!(line = %line, error = %e, "bad command");
                        eprintln!("error: {e}");
                    }
                }
            }
        }
    }

    Ok(())
}

fn print_if_changed(last: &mut RenderState, state: RenderState) -> Result<(), ConfessionError> {
    if *last != state {
        print_state(&state)?;
        *last = state;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::WidgetConfig;
    use crate::controller::Controller;
    use crate::machine::Stage;

    fn session(cancel: &CancellationToken) -> SessionHandle {
        let controller = Controller::new(Arc::new(WidgetConfig::default()));
        let (handle, _join) =
            Session::spawn(controller, Arc::new(EventEmitter::noop()), cancel.child_token());
        handle
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_interrupts_wait() {
        let cancel = CancellationToken::new();
        let handle = session(&cancel);

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            trigger.cancel();
        });

        let started = tokio::time::Instant::now();
        drive(&handle, &b"wait 1h\nhover\n"[..], &cancel)
            .await
            .unwrap();
        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(handle.latest().stage, Stage::Initial);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_then_continue() {
        let cancel = CancellationToken::new();
        let handle = session(&cancel);

        drive(&handle, &b"wait 2s\nhover\nquit\nyes\n"[..], &cancel)
            .await
            .unwrap();
        assert_eq!(handle.snapshot().await.unwrap().stage, Stage::Chase);
    }
}
