//! CLI command dispatch and handlers
//!
//! Routes parsed CLI arguments to the appropriate command handler.

pub mod config;
pub mod play;
pub mod replay;
pub mod version;

use std::path::Path;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::cli::args::{Cli, Commands, ConfigSubcommand, SessionArgs};
use crate::config::WidgetConfig;
use crate::controller::{Controller, RenderState};
use crate::error::{ConfessionError, SessionError};
use crate::observability::{EventEmitter, StopReason};

/// Dispatch a parsed CLI invocation to the appropriate command handler.
///
/// # Errors
///
/// Returns an error if the dispatched command handler fails.
pub async fn dispatch(cli: Cli, cancel: CancellationToken) -> Result<(), ConfessionError> {
    match cli.command {
        Commands::Play(args) => {
            let emitter = build_emitter(cli.events_file.as_deref(), cli.verbose, cli.quiet)?;
            play::run(&args, emitter, cancel).await
        }
        Commands::Replay(args) => {
            let emitter = build_emitter(cli.events_file.as_deref(), cli.verbose, cli.quiet)?;
            replay::run(&args, emitter, cancel).await
        }
        Commands::Config(cmd) => match cmd.subcommand {
            ConfigSubcommand::Check(args) => config::check(&args),
        },
        Commands::Version(args) => {
            version::run(&args);
            Ok(())
        }
    }
}

/// Event stream destination: the named file, else stderr when verbose,
/// else nowhere.
fn build_emitter(
    events_file: Option<&Path>,
    verbose: u8,
    quiet: bool,
) -> Result<Arc<EventEmitter>, ConfessionError> {
    let emitter = match events_file {
        Some(path) => EventEmitter::from_file(path)?,
        None if verbose > 0 && !quiet => EventEmitter::stderr(),
        None => EventEmitter::noop(),
    };
    Ok(Arc::new(emitter))
}

/// Loads the configured (or default) widget config and applies `--seed`.
fn load_config(args: &SessionArgs) -> Result<WidgetConfig, ConfessionError> {
    let mut config = match &args.config {
        Some(path) => {
            tracing::info!(config = %path.display(), "loading configuration");
            let result = crate::config::load(path)?;
            for warning in &result.warnings {
                tracing::warn!(path = %warning.path, "{}", warning.message);
            }
            WidgetConfig::clone(&result.config)
        }
        None => WidgetConfig::default(),
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    Ok(config)
}

fn build_controller(args: &SessionArgs) -> Result<Controller, ConfessionError> {
    let config = load_config(args)?;
    Ok(Controller::new(Arc::new(config)))
}

/// Prints one render state as a JSON line on stdout.
fn print_state(state: &RenderState) -> Result<(), ConfessionError> {
    let line = serde_json::to_string(state)?;
    println!("{line}");
    Ok(())
}

/// Waits for a session task to wind down.
async fn finish(join: JoinHandle<StopReason>) -> Result<StopReason, ConfessionError> {
    let reason = join
        .await
        .map_err(|e| SessionError::TaskFailed(e.to_string()))?;
    tracing::debug!(%reason, "session finished");
    Ok(reason)
}
