use std::collections::HashMap;
use std::fmt::{Display, Formatter};

/// Supported user attribute value types.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    /// String user attribute value.
    String(String),
    /// Bool user attribute value.
    Bool(bool),
    /// Whole number user attribute value.
    Int(i64),
    /// Decimal number user attribute value.
    Float(f64),
}

impl Display for AttributeValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AttributeValue::String(val) => f.write_str(val),
            AttributeValue::Bool(val) => write!(f, "{val}"),
            AttributeValue::Int(val) => write!(f, "{val}"),
            AttributeValue::Float(val) => write!(f, "{val}"),
        }
    }
}

/// Describes a user evaluation context. Contains the attributes targeting
/// rules and percentage bucketing work with.
///
/// The `key` and `anonymous` standard fields are addressable from rules by
/// those names; everything else is a custom attribute.
///
/// # Examples
///
/// ```rust
/// use vexil::User;
///
/// let user = User::new("user-126")
///     .custom("company", "vexil")
///     .custom("rating", 4.5);
///
/// let anonymous = User::new_anonymous("session-56e2");
/// ```
#[derive(Debug, Clone)]
pub struct User {
    key: String,
    anonymous: bool,
    custom: HashMap<String, AttributeValue>,
}

impl User {
    /// Standard field name that addresses the user's key in rules.
    pub const KEY: &'static str = "key";
    /// Standard field name that addresses the user's anonymity in rules.
    pub const ANONYMOUS: &'static str = "anonymous";

    /// Initializes a new identified [`User`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use vexil::User;
    ///
    /// let user = User::new("user-126");
    /// ```
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_owned(),
            anonymous: false,
            custom: HashMap::default(),
        }
    }

    /// Initializes a new anonymous [`User`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use vexil::User;
    ///
    /// let user = User::new_anonymous("session-56e2");
    /// ```
    pub fn new_anonymous(key: &str) -> Self {
        Self {
            key: key.to_owned(),
            anonymous: true,
            custom: HashMap::default(),
        }
    }

    /// Custom attribute of the user for rule definitions (e.g. user role,
    /// subscription type, etc.)
    ///
    /// The `key` and `anonymous` standard field names are reserved and cannot
    /// be overwritten by custom attributes.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use vexil::User;
    ///
    /// let user = User::new("user-126")
    ///     .custom("company", "vexil")
    ///     .custom("beta", true);
    /// ```
    pub fn custom<T: Into<AttributeValue>>(mut self, name: &str, value: T) -> Self {
        if name == Self::KEY || name == Self::ANONYMOUS {
            return self;
        }
        self.custom.insert(name.to_owned(), value.into());
        self
    }

    /// The user's unique identifier.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Whether the user is anonymous.
    pub fn anonymous(&self) -> bool {
        self.anonymous
    }

    pub(crate) fn attribute(&self, name: &str) -> Option<AttributeValue> {
        match name {
            Self::KEY => Some(AttributeValue::String(self.key.clone())),
            Self::ANONYMOUS => Some(AttributeValue::Bool(self.anonymous)),
            _ => self.custom.get(name).cloned(),
        }
    }
}

macro_rules! attribute_from {
    ($variant:ident $($t:ty)*) => {$(
        impl From<$t> for AttributeValue {
            fn from(value: $t) -> Self {
                AttributeValue::$variant(value.into())
            }
        }
    )*};
}

attribute_from!(String String &str);
attribute_from!(Bool bool);
attribute_from!(Int i8 i16 i32 i64 u8 u16 u32);
attribute_from!(Float f32 f64);

#[cfg(test)]
mod user_tests {
    use crate::user::{AttributeValue, User};

    #[test]
    fn standard_fields_resolve() {
        let user = User::new_anonymous("user-126");
        assert_eq!(
            user.attribute("key").unwrap(),
            AttributeValue::String("user-126".to_owned())
        );
        assert_eq!(user.attribute("anonymous").unwrap(), AttributeValue::Bool(true));
        assert!(user.attribute("missing").is_none());
    }

    #[test]
    fn custom_attributes_resolve() {
        let user = User::new("user-126").custom("rating", 4.5).custom("role", "admin");
        assert_eq!(user.attribute("rating").unwrap(), AttributeValue::Float(4.5));
        assert_eq!(
            user.attribute("role").unwrap(),
            AttributeValue::String("admin".to_owned())
        );
    }

    #[test]
    fn standard_fields_are_reserved() {
        let user = User::new("user-126").custom("key", "other").custom("anonymous", true);
        assert_eq!(
            user.attribute("key").unwrap(),
            AttributeValue::String("user-126".to_owned())
        );
        assert_eq!(user.attribute("anonymous").unwrap(), AttributeValue::Bool(false));
    }
}
