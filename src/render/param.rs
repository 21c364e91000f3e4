use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::foundation::error::{TesseraError, TesseraResult};

/// A render parameter value.
///
/// Floats compare and hash by bit pattern so every value is hashable.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Cow<'static, str>),
}

impl ParamValue {
    /// `const` constructor for string defaults in static declarations.
    pub const fn str(s: &'static str) -> Self {
        Self::Str(Cow::Borrowed(s))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "str",
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(v) => Some(v),
            _ => None,
        }
    }
}

impl PartialEq for ParamValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::None, Self::None) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            (Self::Str(a), Self::Str(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for ParamValue {}

impl Hash for ParamValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::None => {}
            Self::Bool(v) => v.hash(state),
            Self::Int(v) => v.hash(state),
            Self::Float(v) => v.to_bits().hash(state),
            Self::Str(v) => v.hash(state),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("none"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Str(v) => write!(f, "{v:?}"),
        }
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&'static str> for ParamValue {
    fn from(value: &'static str) -> Self {
        Self::str(value)
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Str(Cow::Owned(value))
    }
}

impl From<char> for ParamValue {
    fn from(value: char) -> Self {
        Self::Str(Cow::Owned(value.to_string()))
    }
}

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::None, Into::into)
    }
}

fn mismatch(expected: &str, got: &ParamValue) -> TesseraError {
    TesseraError::param(format!(
        "expected {expected}, got {} ({got})",
        got.type_name()
    ))
}

impl TryFrom<&ParamValue> for bool {
    type Error = TesseraError;

    fn try_from(value: &ParamValue) -> TesseraResult<Self> {
        value.as_bool().ok_or_else(|| mismatch("bool", value))
    }
}

impl TryFrom<&ParamValue> for i64 {
    type Error = TesseraError;

    fn try_from(value: &ParamValue) -> TesseraResult<Self> {
        value.as_int().ok_or_else(|| mismatch("int", value))
    }
}

impl TryFrom<&ParamValue> for u32 {
    type Error = TesseraError;

    fn try_from(value: &ParamValue) -> TesseraResult<Self> {
        let v = value.as_int().ok_or_else(|| mismatch("int", value))?;
        u32::try_from(v).map_err(|_| TesseraError::param(format!("{v} does not fit in u32")))
    }
}

impl TryFrom<&ParamValue> for f64 {
    type Error = TesseraError;

    fn try_from(value: &ParamValue) -> TesseraResult<Self> {
        value.as_float().ok_or_else(|| mismatch("float", value))
    }
}

impl TryFrom<&ParamValue> for String {
    type Error = TesseraError;

    fn try_from(value: &ParamValue) -> TesseraResult<Self> {
        value
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| mismatch("str", value))
    }
}

impl TryFrom<&ParamValue> for char {
    type Error = TesseraError;

    fn try_from(value: &ParamValue) -> TesseraResult<Self> {
        let s = value.as_str().ok_or_else(|| mismatch("str", value))?;
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(TesseraError::param(format!(
                "expected a single character, got {s:?}"
            ))),
        }
    }
}

/// Predicate over a parameter value.
pub type ParamCheck = fn(&ParamValue) -> bool;

/// Declaration of one render parameter: default plus optional checks.
///
/// Declared in `static` render-class descriptors, hence the `const` constructors.
#[derive(Clone, Debug)]
pub struct RenderParam {
    pub name: &'static str,
    pub default: ParamValue,
    type_check: Option<(ParamCheck, &'static str)>,
    value_check: Option<(ParamCheck, &'static str)>,
}

impl RenderParam {
    /// Unchecked parameter.
    pub const fn new(name: &'static str, default: ParamValue) -> Self {
        Self {
            name,
            default,
            type_check: None,
            value_check: None,
        }
    }

    /// Parameter with a type check and/or a value check, each with its failure message.
    pub const fn checked(
        name: &'static str,
        default: ParamValue,
        type_check: Option<(ParamCheck, &'static str)>,
        value_check: Option<(ParamCheck, &'static str)>,
    ) -> Self {
        Self {
            name,
            default,
            type_check,
            value_check,
        }
    }

    /// Run the type check then the value check. `owner` names the declaring class.
    pub fn check(&self, owner: &str, value: &ParamValue) -> TesseraResult<()> {
        if let Some((check, msg)) = self.type_check {
            if !check(value) {
                return Err(TesseraError::param(format!(
                    "{owner}.{}: {msg} (got {} {value})",
                    self.name,
                    value.type_name()
                )));
            }
        }
        if let Some((check, msg)) = self.value_check {
            if !check(value) {
                return Err(TesseraError::param(format!(
                    "{owner}.{}: {msg} (got {value})",
                    self.name
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/param.rs"]
mod tests;
