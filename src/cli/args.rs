//! CLI argument definitions
//!
//! All Clap derive structs for `confession` command-line parsing.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

// ============================================================================
// Root CLI
// ============================================================================

/// Headless decline-avoidance confession widget.
#[derive(Parser, Debug)]
#[command(name = "confession", author, version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-error output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output control.
    #[arg(long, default_value = "auto", global = true, env = "CONFESSION_COLOR")]
    pub color: ColorChoice,

    /// Write the JSONL event stream to this file.
    #[arg(long, global = true, env = "CONFESSION_EVENTS_FILE")]
    pub events_file: Option<PathBuf>,
}

// ============================================================================
// Top-Level Commands
// ============================================================================

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Drive the widget interactively from stdin.
    Play(PlayArgs),

    /// Run a scripted interaction and print the resulting state.
    Replay(ReplayArgs),

    /// Configuration file tools.
    Config(ConfigCommand),

    /// Display version information.
    Version(VersionArgs),
}

/// Options shared by every command that runs a session.
#[derive(Args, Debug, Clone, Default)]
pub struct SessionArgs {
    /// Path to YAML widget configuration.
    #[arg(short, long, env = "CONFESSION_CONFIG")]
    pub config: Option<PathBuf>,

    /// Seed for button placement and confetti (overrides the config).
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Arguments for `play`.
#[derive(Args, Debug)]
pub struct PlayArgs {
    /// Session options.
    #[command(flatten)]
    pub session: SessionArgs,
}

/// Arguments for `replay`.
#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// YAML script with a `steps` list of commands.
    pub script: PathBuf,

    /// Session options.
    #[command(flatten)]
    pub session: SessionArgs,

    /// Print every state change, not only the final state.
    #[arg(long)]
    pub trace: bool,
}

// ============================================================================
// Config Command
// ============================================================================

/// Configuration file tools.
#[derive(Args, Debug)]
pub struct ConfigCommand {
    /// Config subcommand.
    #[command(subcommand)]
    pub subcommand: ConfigSubcommand,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigSubcommand {
    /// Validate a configuration file.
    Check(ConfigCheckArgs),
}

/// Arguments for `config check`.
#[derive(Args, Debug)]
pub struct ConfigCheckArgs {
    /// Configuration file to validate.
    pub path: PathBuf,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,

    /// Treat warnings as errors.
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for `version`.
#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

// ============================================================================
// CLI-Local Enums
// ============================================================================

/// Color output choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorChoice {
    /// Auto-detect terminal support.
    #[default]
    Auto,
    /// Always use color.
    Always,
    /// Never use color.
    Never,
}

/// Output format for reporting commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Human,
    /// Machine-readable JSON.
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_play_with_config_and_seed() {
        let cli =
            Cli::try_parse_from(["confession", "play", "--config", "w.yaml", "--seed", "7"]).unwrap();
        let Commands::Play(args) = cli.command else {
            panic!("expected play");
        };
        assert_eq!(args.session.config, Some(PathBuf::from("w.yaml")));
        assert_eq!(args.session.seed, Some(7));
    }

    #[test]
    fn test_replay_requires_script() {
        assert!(Cli::try_parse_from(["confession", "replay"]).is_err());
        let cli = Cli::try_parse_from(["confession", "replay", "s.yaml", "--trace"]).unwrap();
        let Commands::Replay(args) = cli.command else {
            panic!("expected replay");
        };
        assert_eq!(args.script, PathBuf::from("s.yaml"));
        assert!(args.trace);
    }

    #[test]
    fn test_config_check() {
        let cli = Cli::try_parse_from([
            "confession",
            "config",
            "check",
            "w.yaml",
            "--format",
            "json",
            "--strict",
        ])
        .unwrap();
        let Commands::Config(cmd) = cli.command else {
            panic!("expected config");
        };
        let ConfigSubcommand::Check(args) = cmd.subcommand;
        assert_eq!(args.format, OutputFormat::Json);
        assert!(args.strict);
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::try_parse_from([
            "confession",
            "-vv",
            "--color",
            "never",
            "version",
            "--events-file",
            "out.jsonl",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.color, ColorChoice::Never);
        assert_eq!(cli.events_file, Some(PathBuf::from("out.jsonl")));
    }

    #[test]
    fn test_help_output() {
        let err = Cli::try_parse_from(["confession", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_unknown_subcommand() {
        assert!(Cli::try_parse_from(["confession", "serve"]).is_err());
    }
}
