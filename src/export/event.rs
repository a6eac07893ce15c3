use crate::model::enums::VariationKind;
use crate::user::User;
use crate::value::FlagValue;
use chrono::Utc;
use serde::Serialize;

/// An evaluation event recording which variation a user was assigned.
///
/// Created on every tracked evaluation, owned by the export scheduler until
/// flushed, and immutable thereafter.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FeatureEvent {
    /// The event kind, always `"feature"`.
    pub kind: String,
    /// `"user"` or `"anonymousUser"`, depending on the evaluated user.
    pub context_kind: String,
    /// Key of the evaluated user.
    pub user_key: String,
    /// Unix seconds at which the evaluation happened.
    pub creation_date: i64,
    /// Key of the evaluated flag.
    pub key: String,
    /// Which of the flag's candidate values was served.
    pub variation: VariationKind,
    /// The served value.
    pub value: FlagValue,
    /// Whether the caller's default value was served.
    pub default: bool,
    /// Where the evaluation ran, always `"SERVER"`.
    pub source: String,
}

impl FeatureEvent {
    pub(crate) fn new(
        user: &User,
        flag_key: &str,
        value: FlagValue,
        variation: VariationKind,
        default: bool,
    ) -> Self {
        Self {
            kind: "feature".to_owned(),
            context_kind: if user.anonymous() { "anonymousUser" } else { "user" }.to_owned(),
            user_key: user.key().to_owned(),
            creation_date: Utc::now().timestamp(),
            key: flag_key.to_owned(),
            variation,
            value,
            default,
            source: "SERVER".to_owned(),
        }
    }
}
