use crate::user::{AttributeValue, User};
use std::cmp::Ordering;
use thiserror::Error;

/// Error describing a predicate that could not be evaluated. The predicate is
/// treated as non-matching in that case.
#[derive(Error, Debug, PartialEq)]
pub enum RuleError {
    /// The predicate does not have the `<attribute> <operator> <literal>` shape.
    #[error("malformed rule '{0}'")]
    Malformed(String),
    /// The operator token is not part of the predicate language.
    #[error("unknown operator '{0}'")]
    UnknownOperator(String),
    /// The literal is not a quoted string, bool, or number.
    #[error("invalid literal '{0}'")]
    InvalidLiteral(String),
    /// The referenced attribute is not present on the user.
    #[error("the user attribute '{0}' is missing")]
    MissingAttribute(String),
    /// The attribute's type and the literal's type cannot be compared.
    #[error("cannot compare {0} attribute '{1}' with {2} literal")]
    IncomparableTypes(&'static str, String, &'static str),
    /// The operator does not apply to the compared types.
    #[error("operator '{0}' does not apply to {1} values")]
    UnsupportedOperator(&'static str, &'static str),
}

#[derive(Debug, Copy, Clone, PartialEq)]
enum Operator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Contains,
    StartsWith,
    EndsWith,
}

impl Operator {
    fn parse(token: &str) -> Result<Self, RuleError> {
        match token {
            "eq" | "==" => Ok(Operator::Eq),
            "ne" | "!=" => Ok(Operator::Ne),
            "lt" | "<" => Ok(Operator::Lt),
            "le" | "<=" => Ok(Operator::Le),
            "gt" | ">" => Ok(Operator::Gt),
            "ge" | ">=" => Ok(Operator::Ge),
            "co" => Ok(Operator::Contains),
            "sw" => Ok(Operator::StartsWith),
            "ew" => Ok(Operator::EndsWith),
            _ => Err(RuleError::UnknownOperator(token.to_owned())),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Ne => "ne",
            Operator::Lt => "lt",
            Operator::Le => "le",
            Operator::Gt => "gt",
            Operator::Ge => "ge",
            Operator::Contains => "co",
            Operator::StartsWith => "sw",
            Operator::EndsWith => "ew",
        }
    }

    fn from_ordering(&self, ord: Ordering) -> Option<bool> {
        match self {
            Operator::Eq => Some(ord == Ordering::Equal),
            Operator::Ne => Some(ord != Ordering::Equal),
            Operator::Lt => Some(ord == Ordering::Less),
            Operator::Le => Some(ord != Ordering::Greater),
            Operator::Gt => Some(ord == Ordering::Greater),
            Operator::Ge => Some(ord != Ordering::Less),
            _ => None,
        }
    }
}

/// Evaluates a `<attribute> <operator> <literal>` predicate against the user.
///
/// String comparison is exact and case-sensitive, bool comparison is exact,
/// and numbers are compared numerically after literal parsing.
pub(crate) fn evaluate(rule: &str, user: &User) -> Result<bool, RuleError> {
    let (attribute, operator, literal) = split(rule)?;
    let attr_value = user
        .attribute(attribute)
        .ok_or_else(|| RuleError::MissingAttribute(attribute.to_owned()))?;
    compare(operator, attribute, &attr_value, &literal)
}

fn split(rule: &str) -> Result<(&str, Operator, AttributeValue), RuleError> {
    let malformed = || RuleError::Malformed(rule.to_owned());
    let trimmed = rule.trim();
    let (attribute, rest) = trimmed.split_once(char::is_whitespace).ok_or_else(malformed)?;
    let (op_token, literal) = rest
        .trim_start()
        .split_once(char::is_whitespace)
        .ok_or_else(malformed)?;
    let literal = literal.trim();
    if attribute.is_empty() || literal.is_empty() {
        return Err(malformed());
    }
    Ok((attribute, Operator::parse(op_token)?, parse_literal(literal)?))
}

fn parse_literal(literal: &str) -> Result<AttributeValue, RuleError> {
    if literal.len() >= 2 && literal.starts_with('"') && literal.ends_with('"') {
        return Ok(AttributeValue::String(literal[1..literal.len() - 1].to_owned()));
    }
    match literal {
        "true" => return Ok(AttributeValue::Bool(true)),
        "false" => return Ok(AttributeValue::Bool(false)),
        _ => {}
    }
    if let Ok(int) = literal.parse::<i64>() {
        return Ok(AttributeValue::Int(int));
    }
    if let Ok(float) = literal.parse::<f64>() {
        return Ok(AttributeValue::Float(float));
    }
    Err(RuleError::InvalidLiteral(literal.to_owned()))
}

fn compare(
    operator: Operator,
    attribute: &str,
    attr_value: &AttributeValue,
    literal: &AttributeValue,
) -> Result<bool, RuleError> {
    match (attr_value, literal) {
        (AttributeValue::String(attr), AttributeValue::String(lit)) => match operator {
            Operator::Contains => Ok(attr.contains(lit.as_str())),
            Operator::StartsWith => Ok(attr.starts_with(lit.as_str())),
            Operator::EndsWith => Ok(attr.ends_with(lit.as_str())),
            _ => match operator.from_ordering(attr.as_str().cmp(lit.as_str())) {
                Some(matched) => Ok(matched),
                None => Err(RuleError::UnsupportedOperator(operator.name(), "string")),
            },
        },
        (AttributeValue::Bool(attr), AttributeValue::Bool(lit)) => match operator {
            Operator::Eq => Ok(attr == lit),
            Operator::Ne => Ok(attr != lit),
            _ => Err(RuleError::UnsupportedOperator(operator.name(), "bool")),
        },
        (attr, lit) => {
            let (Some(attr_num), Some(lit_num)) = (as_number(attr), as_number(lit)) else {
                return Err(RuleError::IncomparableTypes(
                    type_name(attr_value),
                    attribute.to_owned(),
                    type_name(literal),
                ));
            };
            match attr_num
                .partial_cmp(&lit_num)
                .and_then(|ord| operator.from_ordering(ord))
            {
                Some(matched) => Ok(matched),
                None => Err(RuleError::UnsupportedOperator(operator.name(), "number")),
            }
        }
    }
}

fn as_number(value: &AttributeValue) -> Option<f64> {
    match value {
        AttributeValue::Int(val) => Some(*val as f64),
        AttributeValue::Float(val) => Some(*val),
        _ => None,
    }
}

fn type_name(value: &AttributeValue) -> &'static str {
    match value {
        AttributeValue::String(_) => "string",
        AttributeValue::Bool(_) => "bool",
        AttributeValue::Int(_) => "int",
        AttributeValue::Float(_) => "float",
    }
}
