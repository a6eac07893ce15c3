use crate::model::enums::VariationKind;
use crate::ClientError;

/// Details of a flag evaluation's result.
#[derive(Debug)]
pub struct EvaluationDetails<T> {
    /// The resolved value. Always usable, even when an error is signaled.
    pub value: T,
    /// Key of the evaluated feature flag.
    pub key: String,
    /// Which of the flag's candidate values the evaluation resolved to.
    pub variation: VariationKind,
    /// Indicates whether the default value passed to the evaluation method is
    /// used as the result of the evaluation.
    pub is_default_value: bool,
    /// Advisory error in case the evaluation could not fully succeed.
    pub error: Option<ClientError>,
}

impl<T> EvaluationDetails<T> {
    pub(crate) fn from_err(value: T, key: &str, error: ClientError) -> Self {
        Self {
            value,
            key: key.to_owned(),
            variation: VariationKind::SdkDefault,
            is_default_value: true,
            error: Some(error),
        }
    }
}
