// Built-in constraints

use crate::{FieldContext, Value};
use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::sync::Arc;

// Common regex patterns
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$").unwrap()
});

static URL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.-]*://[^\s/$.?#][^\s]*$").unwrap());

static UUID_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .unwrap()
});

static ALPHA_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z]+$").unwrap());

static ALPHANUMERIC_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9]+$").unwrap());

static NUMERIC_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-+]?[0-9]+(?:\.[0-9]+)?$").unwrap());

/// Signature of a custom constraint.
pub type ConstraintFn = Arc<dyn Fn(&FieldContext<'_>) -> bool + Send + Sync>;

/// Built-in constraint kinds, before their parameter is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Builtin {
    Required,
    Len,
    Min,
    Max,
    Gt,
    Gte,
    Lt,
    Lte,
    Eq,
    Ne,
    OneOf,
    Email,
    Url,
    Uuid,
    Alpha,
    Alphanum,
    Numeric,
    Lowercase,
    Uppercase,
    Ascii,
    Ip,
    Ipv4,
    Ipv6,
    Contains,
    Excludes,
    StartsWith,
    EndsWith,
}

impl Builtin {
    const ALL: [(&'static str, Builtin); 27] = [
        ("required", Builtin::Required),
        ("len", Builtin::Len),
        ("min", Builtin::Min),
        ("max", Builtin::Max),
        ("gt", Builtin::Gt),
        ("gte", Builtin::Gte),
        ("lt", Builtin::Lt),
        ("lte", Builtin::Lte),
        ("eq", Builtin::Eq),
        ("ne", Builtin::Ne),
        ("oneof", Builtin::OneOf),
        ("email", Builtin::Email),
        ("url", Builtin::Url),
        ("uuid", Builtin::Uuid),
        ("alpha", Builtin::Alpha),
        ("alphanum", Builtin::Alphanum),
        ("numeric", Builtin::Numeric),
        ("lowercase", Builtin::Lowercase),
        ("uppercase", Builtin::Uppercase),
        ("ascii", Builtin::Ascii),
        ("ip", Builtin::Ip),
        ("ipv4", Builtin::Ipv4),
        ("ipv6", Builtin::Ipv6),
        ("contains", Builtin::Contains),
        ("excludes", Builtin::Excludes),
        ("startswith", Builtin::StartsWith),
        ("endswith", Builtin::EndsWith),
    ];

    fn compile(self, param: Option<&str>) -> Result<Check, ParamError> {
        use Builtin::*;

        match self {
            Required | Email | Url | Uuid | Alpha | Alphanum | Numeric | Lowercase
            | Uppercase | Ascii | Ip | Ipv4 | Ipv6 => match param {
                Some(_) => Err(ParamError::Unexpected),
                None => Ok(Check::Format(self)),
            },
            Len | Min | Max | Gt | Gte | Lt | Lte => {
                let raw = param.ok_or(ParamError::Missing)?;
                let bound = parse_bound(raw)?;
                let op = match self {
                    Len => SizeOp::Len,
                    Min | Gte => SizeOp::AtLeast,
                    Max | Lte => SizeOp::AtMost,
                    Gt => SizeOp::Above,
                    _ => SizeOp::Below,
                };
                Ok(Check::Size(op, bound))
            }
            Eq | Ne => {
                let raw = param.ok_or(ParamError::Missing)?;
                Ok(Check::Equals {
                    expected: raw.to_string(),
                    negate: self == Ne,
                })
            }
            OneOf => {
                let raw = param.ok_or(ParamError::Missing)?;
                let options: Vec<String> = raw.split_whitespace().map(str::to_string).collect();
                if options.is_empty() {
                    return Err(ParamError::Invalid("no options given".to_string()));
                }
                Ok(Check::OneOf(options))
            }
            Contains | Excludes | StartsWith | EndsWith => {
                let raw = param.ok_or(ParamError::Missing)?;
                Ok(Check::Text(self, raw.to_string()))
            }
        }
    }
}

fn parse_bound(raw: &str) -> Result<Number, ParamError> {
    Number::parse(raw).map_err(ParamError::Invalid)
}

/// A numeric operand that keeps integers exact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Number {
    Int(i64),
    Uint(u64),
    Float(f64),
}

impl Number {
    /// Parse a parameter, preferring `i64`, then `u64`, then a finite `f64`.
    fn parse(raw: &str) -> Result<Self, String> {
        let raw = raw.trim();
        if let Ok(n) = raw.parse::<i64>() {
            return Ok(Number::Int(n));
        }
        if let Ok(n) = raw.parse::<u64>() {
            return Ok(Number::Uint(n));
        }
        match raw.parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(Number::Float(n)),
            Ok(_) => Err("must be a finite number".to_string()),
            Err(e) => Err(e.to_string()),
        }
    }

    fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Int(i) => Some(Number::Int(*i)),
            Value::Uint(u) => Some(Number::Uint(*u)),
            Value::Float(f) => Some(Number::Float(*f)),
            _ => None,
        }
    }

    /// The value itself for numbers, its length for strings and collections.
    fn size_of(value: &Value) -> Option<Self> {
        Self::of(value).or_else(|| value.length().map(|len| Number::Uint(len as u64)))
    }

    fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Uint(u) => u as f64,
            Number::Float(f) => f,
        }
    }

    /// Integers compare exactly; floats on either side compare as `f64`.
    fn compare(self, other: Number) -> Option<Ordering> {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => Some(a.cmp(&b)),
            (Number::Uint(a), Number::Uint(b)) => Some(a.cmp(&b)),
            (Number::Int(a), Number::Uint(b)) => Some(match u64::try_from(a) {
                Ok(a) => a.cmp(&b),
                Err(_) => Ordering::Less,
            }),
            (Number::Uint(_), Number::Int(_)) => other.compare(self).map(Ordering::reverse),
            _ => self.as_f64().partial_cmp(&other.as_f64()),
        }
    }
}

/// Why a constraint parameter was rejected at compile time.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ParamError {
    Missing,
    Unexpected,
    Invalid(String),
}

/// Why a compiled check could not evaluate a value.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum EvalError {
    /// The value kind is not supported by the constraint
    Unsupported,
    /// The parameter does not make sense for this value kind
    BadParam(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum SizeOp {
    Len,
    AtLeast,
    AtMost,
    Above,
    Below,
}

impl SizeOp {
    fn holds(self, actual: Number, bound: Number) -> bool {
        let Some(ordering) = actual.compare(bound) else {
            return false;
        };
        match self {
            SizeOp::Len => ordering.is_eq(),
            SizeOp::AtLeast => ordering.is_ge(),
            SizeOp::AtMost => ordering.is_le(),
            SizeOp::Above => ordering.is_gt(),
            SizeOp::Below => ordering.is_lt(),
        }
    }
}

/// A constraint with its parameter resolved, ready to evaluate.
#[derive(Clone)]
pub(crate) enum Check {
    /// Parameterless constraints
    Format(Builtin),
    Size(SizeOp, Number),
    Equals { expected: String, negate: bool },
    OneOf(Vec<String>),
    Text(Builtin, String),
    Custom {
        func: ConstraintFn,
        param: Option<String>,
    },
}

impl Check {
    pub(crate) fn evaluate(&self, field: &str, value: &Value) -> Result<bool, EvalError> {
        match self {
            Check::Custom { func, param } => {
                let ctx = FieldContext {
                    field,
                    value,
                    param: param.as_deref(),
                };
                Ok(func(&ctx))
            }
            _ if value.is_null() => Ok(false),
            Check::Format(Builtin::Required) => Ok(!value.is_zero()),
            Check::Format(kind) => {
                let text = value.as_str().ok_or(EvalError::Unsupported)?;
                Ok(check_format(*kind, text))
            }
            Check::Size(op, bound) => {
                let actual = Number::size_of(value).ok_or(EvalError::Unsupported)?;
                Ok(op.holds(actual, *bound))
            }
            Check::Equals { expected, negate } => {
                equals(value, expected).map(|equal| equal != *negate)
            }
            Check::OneOf(options) => one_of(value, options),
            Check::Text(kind, needle) => {
                let text = value.as_str().ok_or(EvalError::Unsupported)?;
                Ok(match kind {
                    Builtin::Contains => text.contains(needle.as_str()),
                    Builtin::Excludes => !text.contains(needle.as_str()),
                    Builtin::StartsWith => text.starts_with(needle.as_str()),
                    _ => text.ends_with(needle.as_str()),
                })
            }
        }
    }
}

fn check_format(kind: Builtin, text: &str) -> bool {
    match kind {
        Builtin::Email => EMAIL_REGEX.is_match(text),
        Builtin::Url => URL_REGEX.is_match(text),
        Builtin::Uuid => UUID_REGEX.is_match(text),
        Builtin::Alpha => ALPHA_REGEX.is_match(text),
        Builtin::Alphanum => ALPHANUMERIC_REGEX.is_match(text),
        Builtin::Numeric => NUMERIC_REGEX.is_match(text),
        Builtin::Lowercase => text == text.to_lowercase(),
        Builtin::Uppercase => text == text.to_uppercase(),
        Builtin::Ascii => text.is_ascii(),
        Builtin::Ip => text.parse::<IpAddr>().is_ok(),
        Builtin::Ipv4 => text.parse::<Ipv4Addr>().is_ok(),
        Builtin::Ipv6 => text.parse::<Ipv6Addr>().is_ok(),
        _ => false,
    }
}

fn equals(value: &Value, expected: &str) -> Result<bool, EvalError> {
    match value {
        Value::String(s) => Ok(s == expected),
        Value::Bool(b) => match expected.trim() {
            "true" => Ok(*b),
            "false" => Ok(!*b),
            other => Err(EvalError::BadParam(format!("'{}' is not a bool", other))),
        },
        Value::List(_) | Value::Map(_) | Value::Int(_) | Value::Uint(_) | Value::Float(_) => {
            let expected = Number::parse(expected)
                .map_err(|_| EvalError::BadParam(format!("'{}' is not a number", expected)))?;
            let actual = Number::size_of(value).ok_or(EvalError::Unsupported)?;
            Ok(actual.compare(expected).is_some_and(Ordering::is_eq))
        }
        Value::Null => Ok(false),
    }
}

fn one_of(value: &Value, options: &[String]) -> Result<bool, EvalError> {
    if let Some(text) = value.as_str() {
        return Ok(options.iter().any(|option| option == text));
    }

    let actual = Number::of(value).ok_or(EvalError::Unsupported)?;
    for option in options {
        let candidate = Number::parse(option)
            .map_err(|_| EvalError::BadParam(format!("'{}' is not a number", option)))?;
        if actual.compare(candidate).is_some_and(Ordering::is_eq) {
            return Ok(true);
        }
    }
    Ok(false)
}

/// A registered constraint, before compilation against a parameter.
#[derive(Clone)]
pub(crate) enum Constraint {
    Builtin(Builtin),
    Custom(ConstraintFn),
}

impl Constraint {
    pub(crate) fn compile(&self, param: Option<&str>) -> Result<Check, ParamError> {
        match self {
            Constraint::Builtin(builtin) => builtin.compile(param),
            Constraint::Custom(func) => Ok(Check::Custom {
                func: Arc::clone(func),
                param: param.map(str::to_string),
            }),
        }
    }
}

/// Tag → constraint lookup shared by every compilation.
#[derive(Clone)]
pub(crate) struct Registry {
    constraints: HashMap<String, Constraint>,
}

impl Registry {
    /// Registry holding only the built-in constraints
    pub(crate) fn builtin() -> Self {
        let constraints = Builtin::ALL
            .iter()
            .map(|(tag, builtin)| (tag.to_string(), Constraint::Builtin(*builtin)))
            .collect();
        Self { constraints }
    }

    /// Insert a custom constraint, returning whether it replaced one.
    pub(crate) fn insert(&mut self, tag: String, func: ConstraintFn) -> bool {
        self.constraints
            .insert(tag, Constraint::Custom(func))
            .is_some()
    }

    pub(crate) fn get(&self, tag: &str) -> Option<&Constraint> {
        self.constraints.get(tag)
    }

    pub(crate) fn len(&self) -> usize {
        self.constraints.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(tag: &str, param: Option<&str>, value: Value) -> Result<bool, EvalError> {
        let registry = Registry::builtin();
        let constraint = registry.get(tag).expect("builtin tag");
        let check = constraint.compile(param).expect("valid param");
        check.evaluate("field", &value)
    }

    #[test]
    fn test_required() {
        assert_eq!(check("required", None, Value::from("x")), Ok(true));
        assert_eq!(check("required", None, Value::from("")), Ok(false));
        assert_eq!(check("required", None, Value::Uint(0)), Ok(false));
        assert_eq!(check("required", None, Value::Bool(true)), Ok(true));
        assert_eq!(check("required", None, Value::Null), Ok(false));
        assert_eq!(check("required", None, Value::List(vec![])), Ok(false));
    }

    #[test]
    fn test_size_on_strings_counts_chars() {
        assert_eq!(check("min", Some("3"), Value::from("abc")), Ok(true));
        assert_eq!(check("min", Some("3"), Value::from("ab")), Ok(false));
        assert_eq!(check("max", Some("3"), Value::from("héé")), Ok(true));
        assert_eq!(check("len", Some("2"), Value::from("ab")), Ok(true));
        assert_eq!(check("gt", Some("2"), Value::from("ab")), Ok(false));
    }

    #[test]
    fn test_size_on_numbers_compares_value() {
        assert_eq!(check("gte", Some("18"), Value::Uint(18)), Ok(true));
        assert_eq!(check("gte", Some("18"), Value::Uint(17)), Ok(false));
        assert_eq!(check("lt", Some("0"), Value::Int(-1)), Ok(true));
        assert_eq!(check("lte", Some("1.5"), Value::Float(1.5)), Ok(true));
    }

    #[test]
    fn test_large_integers_compare_exactly() {
        let max = u64::MAX.to_string();
        assert_eq!(check("lt", Some(max.as_str()), Value::Uint(u64::MAX - 1)), Ok(true));
        assert_eq!(check("lt", Some(max.as_str()), Value::Uint(u64::MAX)), Ok(false));
        assert_eq!(check("lte", Some(max.as_str()), Value::Uint(u64::MAX)), Ok(true));

        // 2^53 + 1 is not representable as f64
        let limit = "9007199254740992";
        assert_eq!(check("max", Some(limit), Value::Int(9_007_199_254_740_993)), Ok(false));
        assert_eq!(check("max", Some(limit), Value::Int(9_007_199_254_740_992)), Ok(true));
        assert_eq!(check("eq", Some(limit), Value::Int(9_007_199_254_740_993)), Ok(false));
        assert_eq!(
            check("oneof", Some("9007199254740992 1"), Value::Uint(9_007_199_254_740_993)),
            Ok(false)
        );
    }

    #[test]
    fn test_signed_and_unsigned_compare_across_sign() {
        assert_eq!(check("gt", Some("-1"), Value::Uint(0)), Ok(true));
        assert_eq!(check("lt", Some(u64::MAX.to_string().as_str()), Value::Int(-5)), Ok(true));
        assert_eq!(check("gte", Some("0"), Value::Int(i64::MIN)), Ok(false));
        assert_eq!(check("lt", Some("2.5"), Value::Uint(2)), Ok(true));
    }

    #[test]
    fn test_size_on_bool_is_unsupported() {
        assert_eq!(
            check("min", Some("1"), Value::Bool(true)),
            Err(EvalError::Unsupported)
        );
    }

    #[test]
    fn test_null_fails_everything() {
        assert_eq!(check("email", None, Value::Null), Ok(false));
        assert_eq!(check("min", Some("0"), Value::Null), Ok(false));
    }

    #[test]
    fn test_email() {
        assert_eq!(check("email", None, Value::from("user@example.com")), Ok(true));
        assert_eq!(check("email", None, Value::from("invalid-email")), Ok(false));
        assert_eq!(check("email", None, Value::from("@example.com")), Ok(false));
        assert_eq!(check("email", None, Value::Int(3)), Err(EvalError::Unsupported));
    }

    #[test]
    fn test_string_formats() {
        assert_eq!(check("url", None, Value::from("https://example.com")), Ok(true));
        assert_eq!(check("url", None, Value::from("not-a-url")), Ok(false));
        assert_eq!(
            check("uuid", None, Value::from("550E8400-e29b-41d4-a716-446655440000")),
            Ok(true)
        );
        assert_eq!(check("alpha", None, Value::from("abc1")), Ok(false));
        assert_eq!(check("alphanum", None, Value::from("abc1")), Ok(true));
        assert_eq!(check("numeric", None, Value::from("-12.5")), Ok(true));
        assert_eq!(check("lowercase", None, Value::from("abc")), Ok(true));
        assert_eq!(check("uppercase", None, Value::from("aBC")), Ok(false));
        assert_eq!(check("ipv4", None, Value::from("10.0.0.1")), Ok(true));
        assert_eq!(check("ipv6", None, Value::from("10.0.0.1")), Ok(false));
        assert_eq!(check("ip", None, Value::from("::1")), Ok(true));
    }

    #[test]
    fn test_equals() {
        assert_eq!(check("eq", Some("admin"), Value::from("admin")), Ok(true));
        assert_eq!(check("ne", Some("admin"), Value::from("admin")), Ok(false));
        assert_eq!(check("eq", Some("3"), Value::Int(3)), Ok(true));
        assert_eq!(check("eq", Some("true"), Value::Bool(false)), Ok(false));
        assert!(matches!(
            check("eq", Some("yes"), Value::Bool(true)),
            Err(EvalError::BadParam(_))
        ));
    }

    #[test]
    fn test_one_of() {
        assert_eq!(check("oneof", Some("red green"), Value::from("green")), Ok(true));
        assert_eq!(check("oneof", Some("red green"), Value::from("blue")), Ok(false));
        assert_eq!(check("oneof", Some("1 2 3"), Value::Uint(2)), Ok(true));
    }

    #[test]
    fn test_text() {
        assert_eq!(check("contains", Some("@"), Value::from("a@b")), Ok(true));
        assert_eq!(check("excludes", Some("@"), Value::from("a@b")), Ok(false));
        assert_eq!(check("startswith", Some("ab"), Value::from("abc")), Ok(true));
        assert_eq!(check("endswith", Some("ab"), Value::from("abc")), Ok(false));
    }

    #[test]
    fn test_param_errors() {
        let registry = Registry::builtin();
        let min = registry.get("min").unwrap();
        assert!(matches!(min.compile(None), Err(ParamError::Missing)));
        assert!(matches!(min.compile(Some("abc")), Err(ParamError::Invalid(_))));

        let email = registry.get("email").unwrap();
        assert!(matches!(email.compile(Some("x")), Err(ParamError::Unexpected)));

        let oneof = registry.get("oneof").unwrap();
        assert!(matches!(oneof.compile(Some("  ")), Err(ParamError::Invalid(_))));
    }

    #[test]
    fn test_custom_constraint_receives_context() {
        let mut registry = Registry::builtin();
        let func: ConstraintFn = Arc::new(|ctx: &FieldContext<'_>| {
            ctx.value.as_str().map(|s| s.len()) == ctx.param_f64().map(|n| n as usize)
        });
        assert!(!registry.insert("strlen".to_string(), func));

        let check = registry.get("strlen").unwrap().compile(Some("3")).unwrap();
        assert_eq!(check.evaluate("code", &Value::from("abc")), Ok(true));
        assert_eq!(check.evaluate("code", &Value::from("ab")), Ok(false));
    }
}
