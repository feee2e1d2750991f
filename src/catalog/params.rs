use std::collections::BTreeMap;
use std::fmt;
use std::fmt::{Display, Formatter};

use tracing::warn;

use crate::types::error::SpecError;

/// A concrete parameter value supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    String(String),
    Integer(i64),
    Boolean(bool),
    List(Vec<String>),
}

impl ParamValue {
    fn type_name(&self) -> &'static str {
        match self {
            ParamValue::String(_) => "string",
            ParamValue::Integer(_) => "integer",
            ParamValue::Boolean(_) => "boolean",
            ParamValue::List(_) => "list",
        }
    }
}

impl Display for ParamValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::String(s) => write!(f, "{s}"),
            ParamValue::Integer(i) => write!(f, "{i}"),
            ParamValue::Boolean(b) => write!(f, "{b}"),
            ParamValue::List(items) => write!(f, "{}", items.join(",")),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::String(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::String(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Integer(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        ParamValue::Integer(value as i64)
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        ParamValue::Integer(value as i64)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Boolean(value)
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(value: Vec<String>) -> Self {
        ParamValue::List(value)
    }
}

impl From<Vec<&str>> for ParamValue {
    fn from(value: Vec<&str>) -> Self {
        ParamValue::List(value.into_iter().map(String::from).collect())
    }
}

/// Semantic type of a declared parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    String,
    Integer,
    Boolean,
    /// One of a fixed set of values, matched case-insensitively.
    Enum(&'static [&'static str]),
    StringList,
}

impl Display for ParamKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ParamKind::String => write!(f, "string"),
            ParamKind::Integer => write!(f, "integer"),
            ParamKind::Boolean => write!(f, "boolean"),
            ParamKind::Enum(values) => write!(f, "one of {}", values.join("|")),
            ParamKind::StringList => write!(f, "comma separated list"),
        }
    }
}

/// A parameter declared by an [`OperationSpec`](super::OperationSpec).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub required: bool,
    pub description: &'static str,
}

impl ParamSpec {
    pub const fn required(name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            required: true,
            description,
        }
    }

    pub const fn optional(name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            required: false,
            description,
        }
    }
}

/// A caller-supplied instance of a named operation.
///
/// # Example
///
/// ```
/// use s3conf_rs::OperationRequest;
///
/// let request = OperationRequest::new("access-logging")
///     .with_param("target-bucket", "my-log-bucket")
///     .with_param("prefix", "access/");
/// assert_eq!(request.operation, "access-logging");
/// assert_eq!(request.params.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationRequest {
    pub operation: String,
    pub params: BTreeMap<String, ParamValue>,
}

impl OperationRequest {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            params: BTreeMap::new(),
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn param(&self, name: &str) -> Option<&ParamValue> {
        self.params.get(name)
    }
}

/// Parameters of a request after they were checked against the declared
/// [`ParamSpec`]s. Values are normalised to their declared kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    values: BTreeMap<String, ParamValue>,
}

impl Params {
    /// Check `request` against `specs`.
    ///
    /// Required parameters are checked first, in declaration order, so the
    /// first missing one is reported. Undeclared parameters are dropped.
    pub fn validate(specs: &[ParamSpec], request: &OperationRequest) -> Result<Self, SpecError> {
        if let Some(missing) = specs
            .iter()
            .find(|spec| spec.required && !request.params.contains_key(spec.name))
        {
            return Err(SpecError::MissingParameter(missing.name.to_string()));
        }

        let mut values = BTreeMap::new();
        for (name, value) in &request.params {
            let Some(spec) = specs.iter().find(|spec| spec.name == name) else {
                warn!(
                    operation = request.operation,
                    parameter = name,
                    "ignoring undeclared parameter."
                );
                continue;
            };
            values.insert(name.clone(), normalize(spec, value)?);
        }

        Ok(Self { values })
    }

    /// Like [`Params::validate`], restricted to the parameters in `names`.
    /// Other parameters of `request` are left unchecked.
    pub fn validate_only(
        specs: &[ParamSpec],
        request: &OperationRequest,
        names: &[&str],
    ) -> Result<Self, SpecError> {
        let mut values = BTreeMap::new();
        for spec in specs.iter().filter(|spec| names.contains(&spec.name)) {
            match request.params.get(spec.name) {
                Some(value) => {
                    values.insert(spec.name.to_string(), normalize(spec, value)?);
                }
                None if spec.required => {
                    return Err(SpecError::MissingParameter(spec.name.to_string()));
                }
                None => {}
            }
        }

        Ok(Self { values })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn str(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(ParamValue::String(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn str_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.str(name).unwrap_or(default)
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        match self.values.get(name) {
            Some(ParamValue::Integer(i)) => Some(*i),
            _ => None,
        }
    }

    pub fn bool_or(&self, name: &str, default: bool) -> bool {
        match self.values.get(name) {
            Some(ParamValue::Boolean(b)) => *b,
            _ => default,
        }
    }

    pub fn list_or(&self, name: &str, default: &[&str]) -> Vec<String> {
        match self.values.get(name) {
            Some(ParamValue::List(items)) => items.clone(),
            _ => default.iter().map(|s| s.to_string()).collect(),
        }
    }
}

fn normalize(spec: &ParamSpec, value: &ParamValue) -> Result<ParamValue, SpecError> {
    let invalid = |reason: String| SpecError::InvalidParameter {
        field: spec.name.to_string(),
        reason,
    };

    match (spec.kind, value) {
        (ParamKind::String, ParamValue::String(s)) => {
            if spec.required && s.trim().is_empty() {
                return Err(invalid("must not be empty".to_string()));
            }
            Ok(value.clone())
        }
        (ParamKind::Integer, ParamValue::Integer(_)) => Ok(value.clone()),
        (ParamKind::Integer, ParamValue::String(s)) => s
            .trim()
            .parse::<i64>()
            .map(ParamValue::Integer)
            .map_err(|_| invalid(format!("expected an integer, got '{s}'"))),
        (ParamKind::Boolean, ParamValue::Boolean(_)) => Ok(value.clone()),
        (ParamKind::Boolean, ParamValue::String(s)) => parse_bool(s)
            .map(ParamValue::Boolean)
            .ok_or_else(|| invalid(format!("expected a boolean, got '{s}'"))),
        (ParamKind::Enum(allowed), ParamValue::String(s)) => allowed
            .iter()
            .find(|candidate| candidate.eq_ignore_ascii_case(s.trim()))
            .map(|canonical| ParamValue::String(canonical.to_string()))
            .ok_or_else(|| invalid(format!("'{s}' is not {}", spec.kind))),
        (ParamKind::StringList, ParamValue::List(items)) => {
            if items.is_empty() {
                return Err(invalid("must contain at least one value".to_string()));
            }
            Ok(value.clone())
        }
        (ParamKind::StringList, ParamValue::String(s)) => {
            let items: Vec<String> = s
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(String::from)
                .collect();
            if items.is_empty() {
                return Err(invalid("must contain at least one value".to_string()));
            }
            Ok(ParamValue::List(items))
        }
        (kind, other) => Err(invalid(format!(
            "expected {kind}, got {}",
            other.type_name()
        ))),
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "on" | "1" => Some(true),
        "false" | "no" | "n" | "off" | "0" => Some(false),
        _ => None,
    }
}
