use crate::model::enums::FlagFormat;
use crate::value::FlagValue;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Error describing a flag document that could not be deserialized.
#[derive(Error, Debug)]
pub enum ParseError {
    /// The document's content is malformed for its declared format.
    #[error("flag deserialization failed. ({0})")]
    Malformed(String),
    /// The document is not valid UTF-8 (TOML documents must be text).
    #[error("flag document is not valid UTF-8. ({0})")]
    Encoding(String),
}

/// A feature flag definition. Immutable once part of a published snapshot;
/// updates replace the whole snapshot.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct Flag {
    /// Hard kill-switch; a disabled flag always serves the caller's default value.
    #[serde(default)]
    pub disable: bool,
    /// Boolean predicate over user attributes; absence means "always matches".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,
    /// Rollout threshold in `[0,100]` for the `true` value when the rule matches.
    #[serde(default)]
    pub percentage: f64,
    /// Value served when the rule matches and the user is bucketed under the percentage.
    #[serde(rename = "true", default, skip_serializing_if = "Option::is_none")]
    pub true_value: Option<FlagValue>,
    /// Value served when the rule matches and the user is bucketed over the percentage.
    #[serde(rename = "false", default, skip_serializing_if = "Option::is_none")]
    pub false_value: Option<FlagValue>,
    /// Value served when the rule does not match.
    #[serde(rename = "default", default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<FlagValue>,
    /// Whether evaluations of this flag are exported as events.
    #[serde(rename = "trackEvents", default = "track_events_default")]
    pub track_events: bool,
    /// Optional time-windowed transition of the rollout percentage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rollout: Option<Rollout>,
}

fn track_events_default() -> bool {
    true
}

impl Flag {
    /// The rollout percentage in effect at `now`: the schedule-derived value
    /// when a progressive rollout with ramp bounds is configured, the flat
    /// `percentage` otherwise.
    pub(crate) fn effective_percentage(&self, now: DateTime<Utc>) -> f64 {
        let Some(progressive) = self.rollout.as_ref().and_then(|r| r.progressive.as_ref()) else {
            return self.percentage;
        };
        let (Some(start), Some(end)) = (progressive.release_ramp.start, progressive.release_ramp.end)
        else {
            return self.percentage;
        };
        let initial = progressive.percentage.initial;
        let target = if progressive.percentage.end == 0.0 {
            100.0
        } else {
            progressive.percentage.end
        };
        if now < start {
            return initial;
        }
        if now >= end {
            return target;
        }
        let ramp = (end - start).num_milliseconds() as f64;
        let elapsed = (now - start).num_milliseconds() as f64;
        initial + (target - initial) * (elapsed / ramp)
    }
}

/// Schedule that transitions a flag's rollout percentage over time.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct Rollout {
    /// Linear transition of the percentage over a release ramp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progressive: Option<Progressive>,
}

/// Linear transition of the rollout percentage between two points in time.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct Progressive {
    /// The percentage bounds of the transition.
    #[serde(default)]
    pub percentage: ProgressivePercentage,
    /// The time window of the transition. The schedule only applies when both
    /// bounds are present.
    #[serde(rename = "releaseRamp", default)]
    pub release_ramp: ReleaseRamp,
}

/// Percentage bounds of a progressive rollout.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct ProgressivePercentage {
    /// Percentage in effect before the ramp starts.
    #[serde(default)]
    pub initial: f64,
    /// Percentage in effect after the ramp ends. `0` means `100`.
    #[serde(default)]
    pub end: f64,
}

/// Time window of a progressive rollout.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct ReleaseRamp {
    /// When the transition starts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<Utc>>,
    /// When the transition ends.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
}

/// Deserializes one flag document into a candidate snapshot.
pub(crate) fn flags_from_bytes(
    bytes: &[u8],
    format: FlagFormat,
) -> Result<HashMap<String, Flag>, ParseError> {
    match format {
        FlagFormat::Yaml => {
            serde_yaml::from_slice(bytes).map_err(|err| ParseError::Malformed(err.to_string()))
        }
        FlagFormat::Json => {
            serde_json::from_slice(bytes).map_err(|err| ParseError::Malformed(err.to_string()))
        }
        FlagFormat::Toml => {
            let text = std::str::from_utf8(bytes)
                .map_err(|err| ParseError::Encoding(err.to_string()))?;
            toml::from_str(text).map_err(|err| ParseError::Malformed(err.to_string()))
        }
    }
}

#[cfg(test)]
mod flag_tests {
    use crate::model::enums::FlagFormat;
    use crate::model::flag::{flags_from_bytes, Flag};
    use crate::value::FlagValue;
    use chrono::{Duration, Utc};

    const YAML_DOC: &str = r#"test-flag:
  rule: key eq "random-key"
  percentage: 100
  true: true
  false: false
  default: false
  trackEvents: false
"#;

    const JSON_DOC: &str = r#"{
  "test-flag": {
    "rule": "key eq \"random-key\"",
    "percentage": 100,
    "true": true,
    "false": false,
    "default": false,
    "trackEvents": false
  }
}"#;

    const TOML_DOC: &str = r#"[test-flag]
rule = 'key eq "random-key"'
percentage = 100.0
true = true
false = false
default = false
trackEvents = false
"#;

    fn expected() -> Flag {
        Flag {
            disable: false,
            rule: Some("key eq \"random-key\"".to_owned()),
            percentage: 100.0,
            true_value: Some(FlagValue::Bool(true)),
            false_value: Some(FlagValue::Bool(false)),
            default_value: Some(FlagValue::Bool(false)),
            track_events: false,
            rollout: None,
        }
    }

    #[test]
    fn parse_yaml() {
        let flags = flags_from_bytes(YAML_DOC.as_bytes(), FlagFormat::Yaml).unwrap();
        assert_eq!(flags["test-flag"], expected());
    }

    #[test]
    fn parse_json() {
        let flags = flags_from_bytes(JSON_DOC.as_bytes(), FlagFormat::Json).unwrap();
        assert_eq!(flags["test-flag"], expected());
    }

    #[test]
    fn parse_toml() {
        let flags = flags_from_bytes(TOML_DOC.as_bytes(), FlagFormat::Toml).unwrap();
        assert_eq!(flags["test-flag"], expected());
    }

    #[test]
    fn parse_invalid() {
        let invalid_yaml = b"test-flag:\n  percentage: \"toot\"\n";
        assert!(flags_from_bytes(invalid_yaml, FlagFormat::Yaml).is_err());
        assert!(flags_from_bytes(b"{\"a\": 12}", FlagFormat::Json).is_err());
        assert!(flags_from_bytes(b"not toml at all [", FlagFormat::Toml).is_err());
        assert!(flags_from_bytes(&[0xff, 0xfe], FlagFormat::Toml).is_err());
    }

    #[test]
    fn field_defaults() {
        let flags = flags_from_bytes(b"empty-flag: {}", FlagFormat::Yaml).unwrap();
        let flag = &flags["empty-flag"];
        assert!(!flag.disable);
        assert!(flag.rule.is_none());
        assert_eq!(flag.percentage, 0.0);
        assert!(flag.true_value.is_none());
        assert!(flag.track_events);
        assert!(flag.rollout.is_none());
    }

    #[test]
    fn typed_values() {
        let doc = br#"number-flag:
  percentage: 10
  default: 119
  true: 120.12
  false: "off"
json-flag:
  true: [1, 2]
  false:
    size: 120
"#;
        let flags = flags_from_bytes(doc, FlagFormat::Yaml).unwrap();
        assert_eq!(flags["number-flag"].default_value, Some(FlagValue::Int(119)));
        assert_eq!(flags["number-flag"].true_value, Some(FlagValue::Float(120.12)));
        assert_eq!(
            flags["number-flag"].false_value,
            Some(FlagValue::String("off".to_owned()))
        );
        assert!(matches!(flags["json-flag"].true_value, Some(FlagValue::Array(_))));
        assert!(matches!(flags["json-flag"].false_value, Some(FlagValue::Object(_))));
    }

    #[test]
    fn progressive_rollout_percentage() {
        let doc = br#"progressive-flag:
  percentage: 5
  rollout:
    progressive:
      percentage:
        initial: 0
        end: 80
      releaseRamp:
        start: 2024-01-01T00:00:00Z
        end: 2024-01-02T00:00:00Z
"#;
        let flags = flags_from_bytes(doc, FlagFormat::Yaml).unwrap();
        let flag = &flags["progressive-flag"];
        let start: chrono::DateTime<Utc> = "2024-01-01T00:00:00Z".parse().unwrap();

        assert_eq!(flag.effective_percentage(start - Duration::hours(1)), 0.0);
        assert_eq!(flag.effective_percentage(start + Duration::hours(12)), 40.0);
        assert_eq!(flag.effective_percentage(start + Duration::days(2)), 80.0);
    }

    #[test]
    fn progressive_rollout_end_zero_means_full() {
        let doc = br#"progressive-flag:
  rollout:
    progressive:
      releaseRamp:
        start: 2024-01-01T00:00:00Z
        end: 2024-01-02T00:00:00Z
"#;
        let flags = flags_from_bytes(doc, FlagFormat::Yaml).unwrap();
        let end: chrono::DateTime<Utc> = "2024-01-02T00:00:00Z".parse().unwrap();
        assert_eq!(flags["progressive-flag"].effective_percentage(end), 100.0);
    }

    #[test]
    fn rollout_without_ramp_uses_flat_percentage() {
        let doc = br#"progressive-flag:
  percentage: 42
  rollout:
    progressive:
      percentage:
        initial: 0
        end: 80
"#;
        let flags = flags_from_bytes(doc, FlagFormat::Yaml).unwrap();
        assert_eq!(flags["progressive-flag"].effective_percentage(Utc::now()), 42.0);
    }
}
