//! `config check` command.

use serde_json::json;

use crate::cli::args::{ConfigCheckArgs, OutputFormat};
use crate::error::{ConfessionError, ConfigError};

/// Validates a configuration file and reports warnings.
///
/// # Errors
///
/// Returns the loader's [`ConfigError`] when the file is missing, too
/// large, malformed or invalid; with `--strict`, warnings are errors too.
pub fn check(args: &ConfigCheckArgs) -> Result<(), ConfessionError> {
    let path = args.path.display().to_string();
    tracing::info!(file = %path, "validating configuration");

    let result = crate::config::load(&args.path)?;
    for warning in &result.warnings {
        tracing::warn!(path = %warning.path, "{}", warning.message);
    }

    if args.strict && !result.warnings.is_empty() {
        return Err(ConfigError::ValidationError {
            path,
            errors: result.warnings,
        }
        .into());
    }

    match args.format {
        OutputFormat::Human => {
            for warning in &result.warnings {
                println!("{warning}");
            }
            println!("{path}: ok");
        }
        OutputFormat::Json => {
            let warnings: Vec<_> = result
                .warnings
                .iter()
                .map(|w| json!({ "path": w.path, "message": w.message }))
                .collect();
            let report = json!({
                "file": path,
                "valid": true,
                "warnings": warnings,
                "config": &*result.config,
            });
            println!("{report}");
        }
    }

    Ok(())
}
