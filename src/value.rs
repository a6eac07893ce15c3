use std::fmt::{Display, Formatter};

/// Represents the value of a feature flag variation.
///
/// # Examples
///
/// ```rust
/// use vexil::FlagValue;
///
/// let bool_val = FlagValue::Bool(true);
/// let int_val = FlagValue::Int(42);
/// ```
#[derive(serde::Serialize, serde::Deserialize, PartialEq, Debug, Clone)]
#[serde(untagged)]
pub enum FlagValue {
    /// A bool variation value.
    Bool(bool),
    /// A whole number variation value.
    Int(i64),
    /// A decimal number variation value.
    Float(f64),
    /// A text variation value.
    String(String),
    /// A JSON array variation value.
    Array(Vec<serde_json::Value>),
    /// A JSON object variation value.
    Object(serde_json::Map<String, serde_json::Value>),
}

impl FlagValue {
    /// Reads the value as `bool`. Returns [`None`] if it's not a [`FlagValue::Bool`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use vexil::FlagValue;
    ///
    /// let value = FlagValue::Bool(true);
    /// assert!(value.as_bool().unwrap());
    /// ```
    pub fn as_bool(&self) -> Option<bool> {
        if let FlagValue::Bool(val) = self {
            return Some(*val);
        }
        None
    }

    /// Reads the value as `i64`. Decimal numbers are truncated toward zero.
    /// Returns [`None`] if it's not a [`FlagValue::Int`] or [`FlagValue::Float`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use vexil::FlagValue;
    ///
    /// let value = FlagValue::Int(42);
    /// assert_eq!(value.as_int().unwrap(), 42);
    ///
    /// let value = FlagValue::Float(42.9);
    /// assert_eq!(value.as_int().unwrap(), 42);
    /// ```
    pub fn as_int(&self) -> Option<i64> {
        match self {
            FlagValue::Int(val) => Some(*val),
            FlagValue::Float(val) => Some(*val as i64),
            _ => None,
        }
    }

    /// Reads the value as `f64`. Whole numbers are widened.
    /// Returns [`None`] if it's not a [`FlagValue::Float`] or [`FlagValue::Int`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use vexil::FlagValue;
    ///
    /// let value = FlagValue::Float(3.14);
    /// assert_eq!(value.as_float().unwrap(), 3.14);
    /// ```
    pub fn as_float(&self) -> Option<f64> {
        match self {
            FlagValue::Float(val) => Some(*val),
            FlagValue::Int(val) => Some(*val as f64),
            _ => None,
        }
    }

    /// Reads the value as [`String`]. Returns [`None`] if it's not a [`FlagValue::String`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use vexil::FlagValue;
    ///
    /// let value = FlagValue::String("foo".to_owned());
    /// assert_eq!(value.as_str().unwrap(), "foo".to_owned());
    /// ```
    pub fn as_str(&self) -> Option<String> {
        if let FlagValue::String(val) = self {
            return Some(val.clone());
        }
        None
    }

    /// Reads the value as a JSON array. Returns [`None`] if it's not a [`FlagValue::Array`].
    pub fn as_array(&self) -> Option<Vec<serde_json::Value>> {
        if let FlagValue::Array(val) = self {
            return Some(val.clone());
        }
        None
    }

    /// Reads the value as a JSON object. Returns [`None`] if it's not a [`FlagValue::Object`].
    pub fn as_object(&self) -> Option<serde_json::Map<String, serde_json::Value>> {
        if let FlagValue::Object(val) = self {
            return Some(val.clone());
        }
        None
    }

    pub(crate) fn type_name(&self) -> &'static str {
        match self {
            FlagValue::Bool(_) => "bool",
            FlagValue::Int(_) => "int",
            FlagValue::Float(_) => "float",
            FlagValue::String(_) => "string",
            FlagValue::Array(_) => "array",
            FlagValue::Object(_) => "object",
        }
    }
}

impl Display for FlagValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FlagValue::Bool(val) => write!(f, "{val}"),
            FlagValue::Int(val) => write!(f, "{val}"),
            FlagValue::Float(val) => write!(f, "{val}"),
            FlagValue::String(val) => f.write_str(val),
            FlagValue::Array(val) => match serde_json::to_string(val) {
                Ok(txt) => f.write_str(txt.as_str()),
                Err(_) => f.write_str("<invalid value>"),
            },
            FlagValue::Object(val) => match serde_json::to_string(val) {
                Ok(txt) => f.write_str(txt.as_str()),
                Err(_) => f.write_str("<invalid value>"),
            },
        }
    }
}

pub(crate) trait OptionalValueDisplay {
    fn to_str(&self) -> String;
}

impl OptionalValueDisplay for Option<FlagValue> {
    fn to_str(&self) -> String {
        match self {
            None => "none".to_owned(),
            Some(value) => format!("{value}"),
        }
    }
}

/// Represents a type a flag variation can be requested as.
pub trait VariationValue: Into<FlagValue> {
    /// Reads the typed value from a [`FlagValue`]. Returns [`None`] when the
    /// flag's value doesn't fit the requested type.
    fn from_value(value: &FlagValue) -> Option<Self>;
}

macro_rules! variation_impl {
    ($variant:ident, $as_method:ident, $t:ty) => {
        impl From<$t> for FlagValue {
            fn from(value: $t) -> Self {
                FlagValue::$variant(value)
            }
        }

        impl VariationValue for $t {
            fn from_value(value: &FlagValue) -> Option<Self> {
                value.$as_method()
            }
        }
    };
}

variation_impl!(String, as_str, String);
variation_impl!(Float, as_float, f64);
variation_impl!(Int, as_int, i64);
variation_impl!(Bool, as_bool, bool);
variation_impl!(Array, as_array, Vec<serde_json::Value>);
variation_impl!(Object, as_object, serde_json::Map<String, serde_json::Value>);

impl From<&str> for FlagValue {
    fn from(value: &str) -> Self {
        FlagValue::String(value.to_owned())
    }
}
