//! Configuration loader
//!
//! Pipeline: size check, YAML parse, validation, freeze with `Arc`.
//! Validation collects every issue instead of stopping at the first one.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::config::schema::WidgetConfig;
use crate::error::{ConfigError, Severity, ValidationIssue};
use crate::layout::Viewport;

/// Largest accepted configuration file.
pub const MAX_CONFIG_SIZE: u64 = 64 * 1024;

/// Largest accepted confetti batch.
pub const MAX_CONFETTI: usize = 10_000;

/// Longest accepted effect duration or confetti delay.
pub const MAX_DURATION: Duration = Duration::from_secs(24 * 60 * 60);

/// Largest accepted decoy scatter.
pub const MAX_DECOYS: usize = 1_000;

/// Result of loading a configuration file.
#[derive(Debug)]
pub struct LoadResult {
    /// The loaded and validated configuration.
    pub config: Arc<WidgetConfig>,

    /// Warnings encountered during loading.
    pub warnings: Vec<ValidationIssue>,
}

/// Loads and validates a configuration file.
///
/// # Errors
///
/// Returns [`ConfigError::MissingFile`] if `path` does not exist,
/// [`ConfigError::TooLarge`] above [`MAX_CONFIG_SIZE`],
/// [`ConfigError::ParseError`] for malformed YAML, and
/// [`ConfigError::ValidationError`] listing every validation failure.
pub fn load(path: &Path) -> Result<LoadResult, ConfigError> {
    let metadata = std::fs::metadata(path).map_err(|_| ConfigError::MissingFile {
        path: path.to_path_buf(),
    })?;
    if metadata.len() > MAX_CONFIG_SIZE {
        return Err(ConfigError::TooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
            limit: MAX_CONFIG_SIZE,
        });
    }

    let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        line: None,
        message: e.to_string(),
    })?;

    let result = load_str(&raw, &path.display().to_string())?;
    tracing::debug!(config = %path.display(), "configuration loaded");
    Ok(result)
}

/// Parses and validates configuration text.
///
/// `origin` names the source in error messages.
///
/// # Errors
///
/// Returns [`ConfigError::ParseError`] for malformed YAML and
/// [`ConfigError::ValidationError`] listing every validation failure.
pub fn load_str(raw: &str, origin: &str) -> Result<LoadResult, ConfigError> {
    // An empty document means "all defaults".
    let config: WidgetConfig = if raw.trim().is_empty() {
        WidgetConfig::default()
    } else {
        serde_yaml::from_str(raw).map_err(|e| ConfigError::ParseError {
            path: origin.into(),
            line: e.location().map(|l| l.line()),
            message: e.to_string(),
        })?
    };

    let (errors, warnings): (Vec<_>, Vec<_>) = validate(&config)
        .into_iter()
        .partition(|issue| issue.severity == Severity::Error);

    if !errors.is_empty() {
        return Err(ConfigError::ValidationError {
            path: origin.to_string(),
            errors,
        });
    }

    Ok(LoadResult {
        config: Arc::new(config),
        warnings,
    })
}

/// Checks a configuration and returns every issue found.
#[must_use]
pub fn validate(config: &WidgetConfig) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let mut error = |path: &str, message: String| {
        issues.push(ValidationIssue {
            path: path.to_string(),
            message,
            severity: Severity::Error,
        });
    };

    let Viewport { width, height } = config.viewport;
    if !(width.is_finite() && width > 0.0) {
        error("viewport.width", format!("must be a positive number, got {width}"));
    }
    if !(height.is_finite() && height > 0.0) {
        error("viewport.height", format!("must be a positive number, got {height}"));
    }
    if !(config.padding.is_finite() && config.padding >= 0.0) {
        error(
            "padding",
            format!("must be a non-negative number, got {}", config.padding),
        );
    }

    if config.decoys.count == 0 {
        error("decoys.count", "must be at least 1".to_string());
    } else if config.decoys.count > MAX_DECOYS {
        error(
            "decoys.count",
            format!("{} exceeds the limit of {MAX_DECOYS}", config.decoys.count),
        );
    }
    if config.decoys.count > 0 && config.decoys.authoritative_index >= config.decoys.count {
        error(
            "decoys.authoritative_index",
            format!(
                "index {} is out of range for {} buttons",
                config.decoys.authoritative_index, config.decoys.count
            ),
        );
    }

    for (path, value) in [
        ("effects.wink", config.effects.wink),
        ("effects.glitch", config.effects.glitch),
        ("effects.flash", config.effects.flash),
        ("confetti.lifetime", config.confetti.lifetime),
        ("confetti.max_delay", config.confetti.max_delay),
    ] {
        if value.is_zero() {
            error(path, "duration must be greater than zero".to_string());
        } else if value > MAX_DURATION {
            error(
                path,
                format!(
                    "{} exceeds the limit of {}",
                    humantime::format_duration(value),
                    humantime::format_duration(MAX_DURATION)
                ),
            );
        }
    }

    if config.confetti.count == 0 {
        error("confetti.count", "must be at least 1".to_string());
    } else if config.confetti.count > MAX_CONFETTI {
        error(
            "confetti.count",
            format!("{} exceeds the limit of {MAX_CONFETTI}", config.confetti.count),
        );
    }

    if width.is_finite()
        && height.is_finite()
        && config.padding.is_finite()
        && (width < 2.0 * config.padding || height < 2.0 * config.padding)
    {
        issues.push(ValidationIssue {
            path: "padding".to_string(),
            message: format!(
                "viewport {width}x{height} is smaller than twice the padding; \
                 controls will sit at the viewport centre"
            ),
            severity: Severity::Warning,
        });
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&WidgetConfig::default()).is_empty());
    }

    #[test]
    fn test_empty_document_is_default() {
        let result = load_str("", "inline").unwrap();
        assert_eq!(*result.config, WidgetConfig::default());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_collects_all_errors() {
        let yaml = r"
padding: -5
decoys:
  count: 3
  authoritative_index: 3
effects:
  glitch: 0s
";
        let err = load_str(yaml, "widget.yaml").unwrap_err();
        let ConfigError::ValidationError { path, errors } = err else {
            panic!("expected validation error");
        };
        assert_eq!(path, "widget.yaml");
        let paths: Vec<&str> = errors.iter().map(|e| e.path.as_str()).collect();
        assert!(paths.contains(&"padding"));
        assert!(paths.contains(&"decoys.authoritative_index"));
        assert!(paths.contains(&"effects.glitch"));
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_zero_decoys_rejected() {
        let config = WidgetConfig {
            decoys: crate::config::schema::DecoyConfig {
                count: 0,
                authoritative_index: 0,
            },
            ..WidgetConfig::default()
        };
        let issues = validate(&config);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].path, "decoys.count");
    }

    #[test]
    fn test_small_viewport_is_warning() {
        let yaml = "viewport: { width: 150, height: 150 }\n";
        let result = load_str(yaml, "inline").unwrap();
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].severity, Severity::Warning);
    }

    #[test]
    fn test_oversized_confetti_rejected() {
        let config = WidgetConfig {
            confetti: crate::config::schema::ConfettiConfig {
                count: MAX_CONFETTI + 1,
                lifetime: Duration::from_secs(3),
                max_delay: Duration::from_secs(2),
            },
            ..WidgetConfig::default()
        };
        assert_eq!(validate(&config)[0].path, "confetti.count");
    }

    #[test]
    fn test_empty_confetti_rejected() {
        let err = load_str("confetti:\n  count: 0\n", "inline").unwrap_err();
        let ConfigError::ValidationError { errors, .. } = err else {
            panic!("expected validation error");
        };
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path, "confetti.count");
    }

    #[test]
    fn test_oversized_durations_rejected() {
        let raw = "effects:\n  wink: 400000000000years\nconfetti:\n  max_delay: 2days\n";
        let err = load_str(raw, "inline").unwrap_err();
        let ConfigError::ValidationError { errors, .. } = err else {
            panic!("expected validation error");
        };
        let paths: Vec<&str> = errors.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["effects.wink", "confetti.max_delay"]);
        assert!(errors[0].message.contains("exceeds the limit of 1day"));

        let at_limit = "effects:\n  wink: 24h\n";
        assert!(load_str(at_limit, "inline").is_ok());
    }

    #[test]
    fn test_parse_error_reports_origin() {
        let err = load_str("padding: [", "broken.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
        assert!(err.to_string().contains("broken.yaml"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "seed: 11\nconfetti:\n  count: 20").unwrap();
        let result = load(file.path()).unwrap();
        assert_eq!(result.config.seed, Some(11));
        assert_eq!(result.config.confetti.count, 20);
    }

    #[test]
    fn test_missing_file() {
        let err = load(Path::new("/nonexistent/widget.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::MissingFile { .. }));
    }

    #[test]
    fn test_too_large_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let filler = "#".repeat(usize::try_from(MAX_CONFIG_SIZE).unwrap() + 1);
        write!(file, "{filler}").unwrap();
        let err = load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge { .. }));
    }
}
