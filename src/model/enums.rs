use serde::Serialize;
use std::fmt::{Display, Formatter};

/// Supported formats of a retrieved flag definition document.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum FlagFormat {
    /// The document is a YAML mapping of flag keys to flag definitions.
    #[default]
    Yaml,
    /// The document is a JSON object of flag keys to flag definitions.
    Json,
    /// The document is a TOML table of flag keys to flag definitions.
    Toml,
}

impl Display for FlagFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FlagFormat::Yaml => f.write_str("yaml"),
            FlagFormat::Json => f.write_str("json"),
            FlagFormat::Toml => f.write_str("toml"),
        }
    }
}

/// Identifies which of a flag's three candidate values an evaluation resolved to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Default)]
pub enum VariationKind {
    /// The flag's `true` value was served (rule matched and the user fell
    /// under the rollout percentage).
    True,
    /// The flag's `false` value was served (rule matched but the user fell
    /// outside the rollout percentage).
    False,
    /// The flag's own `default` value was served (the rule did not match).
    Default,
    /// The default value supplied by the caller was served because the flag
    /// could not be evaluated.
    #[default]
    SdkDefault,
}

impl Display for VariationKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            VariationKind::True => f.write_str("True"),
            VariationKind::False => f.write_str("False"),
            VariationKind::Default => f.write_str("Default"),
            VariationKind::SdkDefault => f.write_str("SdkDefault"),
        }
    }
}
