use crate::eval::bucketing::bucket;
use crate::eval::rule::{self, RuleError};
use crate::model::enums::VariationKind;
use crate::model::flag::Flag;
use crate::user::User;
use crate::value::FlagValue;
use chrono::{DateTime, Utc};

pub(crate) struct EvalResult {
    /// The flag value the decision procedure selected. [`None`] when the flag
    /// definition omits the selected candidate value.
    pub value: Option<FlagValue>,
    pub variation: VariationKind,
    /// Set when the rule could not be evaluated and was treated as non-matching.
    pub rule_error: Option<RuleError>,
}

/// The decision procedure for an enabled flag: rule outcome first, percentage
/// bucketing second. An absent rule is treated as matched; an unevaluable rule
/// as non-matching.
pub(crate) fn eval(flag: &Flag, flag_key: &str, user: &User, now: DateTime<Utc>) -> EvalResult {
    let mut rule_error = None;
    if let Some(rule) = flag.rule.as_ref() {
        match rule::evaluate(rule, user) {
            Ok(true) => {}
            Ok(false) => {
                return EvalResult {
                    value: flag.default_value.clone(),
                    variation: VariationKind::Default,
                    rule_error: None,
                }
            }
            Err(err) => {
                rule_error = Some(err);
                return EvalResult {
                    value: flag.default_value.clone(),
                    variation: VariationKind::Default,
                    rule_error,
                };
            }
        }
    }
    if bucket(flag_key, user.key()) < flag.effective_percentage(now) {
        EvalResult {
            value: flag.true_value.clone(),
            variation: VariationKind::True,
            rule_error,
        }
    } else {
        EvalResult {
            value: flag.false_value.clone(),
            variation: VariationKind::False,
            rule_error,
        }
    }
}
