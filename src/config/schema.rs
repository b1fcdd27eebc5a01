//! Widget configuration types
//!
//! Every field is optional in YAML; omitted fields take the values the
//! widget ships with (1280×720 viewport, 100 px padding, five scattered
//! buttons with the real one in slot 2, 1500/500/100 ms wink/glitch/flash,
//! fifty confetti pieces for three seconds).

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::layout::Viewport;

/// Root configuration for one widget instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WidgetConfig {
    /// Initial viewport size (updated at runtime by resize input).
    pub viewport: Viewport,

    /// Distance kept between a placed control and the viewport edge.
    pub padding: f64,

    /// Seed for placement and confetti randomness; entropy when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Decoy-stage layout.
    pub decoys: DecoyConfig,

    /// Flag durations.
    pub effects: EffectTimings,

    /// Confetti burst shape.
    pub confetti: ConfettiConfig,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            padding: 100.0,
            seed: None,
            decoys: DecoyConfig::default(),
            effects: EffectTimings::default(),
            confetti: ConfettiConfig::default(),
        }
    }
}

/// Layout of the decoy stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DecoyConfig {
    /// Total buttons in the scatter, real one included.
    pub count: usize,
    /// Slot holding the real button.
    pub authoritative_index: usize,
}

impl Default for DecoyConfig {
    fn default() -> Self {
        Self {
            count: 5,
            authoritative_index: 2,
        }
    }
}

/// How long each effect flag stays raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EffectTimings {
    /// Winking overlay after the first decline.
    #[serde(with = "duration_str")]
    pub wink: Duration,
    /// Heading glitch after the first decline.
    #[serde(with = "duration_str")]
    pub glitch: Duration,
    /// Background flash when the last chance begins.
    #[serde(with = "duration_str")]
    pub flash: Duration,
}

impl Default for EffectTimings {
    fn default() -> Self {
        Self {
            wink: Duration::from_millis(1500),
            glitch: Duration::from_millis(500),
            flash: Duration::from_millis(100),
        }
    }
}

/// Confetti burst fired on acceptance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfettiConfig {
    /// Particles per burst.
    pub count: usize,
    /// Time until the batch is cleared.
    #[serde(with = "duration_str")]
    pub lifetime: Duration,
    /// Exclusive upper bound of the per-particle stagger delay.
    #[serde(with = "duration_str")]
    pub max_delay: Duration,
}

impl Default for ConfettiConfig {
    fn default() -> Self {
        Self {
            count: 50,
            lifetime: Duration::from_secs(3),
            max_delay: Duration::from_secs(2),
        }
    }
}

/// Human-readable durations (`"1500ms"`, `"3s"`) via `humantime`.
pub mod duration_str {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    /// Serializes a duration as e.g. `"1s 500ms"`.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&humantime::format_duration(*value).to_string())
    }

    /// Parses a duration string.
    ///
    /// # Errors
    ///
    /// Returns a deserializer error when the string is not a valid duration.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(raw.trim())
            .map_err(|e| serde::de::Error::custom(format!("invalid duration '{raw}': {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_widget_constants() {
        let config = WidgetConfig::default();
        assert_eq!(config.viewport, Viewport::new(1280.0, 720.0));
        assert!((config.padding - 100.0).abs() < f64::EPSILON);
        assert_eq!(config.decoys.count, 5);
        assert_eq!(config.decoys.authoritative_index, 2);
        assert_eq!(config.effects.wink, Duration::from_millis(1500));
        assert_eq!(config.effects.glitch, Duration::from_millis(500));
        assert_eq!(config.effects.flash, Duration::from_millis(100));
        assert_eq!(config.confetti.count, 50);
        assert_eq!(config.confetti.lifetime, Duration::from_secs(3));
        assert_eq!(config.confetti.max_delay, Duration::from_secs(2));
        assert!(config.seed.is_none());
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let config: WidgetConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, WidgetConfig::default());
    }

    #[test]
    fn test_partial_yaml_overrides() {
        let yaml = r"
padding: 40
seed: 7
effects:
  wink: 2s
confetti:
  count: 10
";
        let config: WidgetConfig = serde_yaml::from_str(yaml).unwrap();
        assert!((config.padding - 40.0).abs() < f64::EPSILON);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.effects.wink, Duration::from_secs(2));
        assert_eq!(config.effects.glitch, Duration::from_millis(500));
        assert_eq!(config.confetti.count, 10);
        assert_eq!(config.confetti.lifetime, Duration::from_secs(3));
    }

    #[test]
    fn test_bad_duration_rejected() {
        let err = serde_yaml::from_str::<WidgetConfig>("effects:\n  flash: soon\n").unwrap_err();
        assert!(err.to_string().contains("invalid duration"));
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(serde_yaml::from_str::<WidgetConfig>("paddding: 10\n").is_err());
    }

    #[test]
    fn test_round_trip_through_yaml() {
        let config = WidgetConfig {
            seed: Some(3),
            ..WidgetConfig::default()
        };
        let yaml = serde_yaml::to_string(&config).unwrap();
        let back: WidgetConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, config);
    }
}
