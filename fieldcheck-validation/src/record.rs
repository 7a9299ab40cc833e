// Record contract

use crate::{FieldErrors, Result, Value};

/// Declared constraints for one field of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Field identifier as reported in failures (before lowercasing)
    pub name: &'static str,

    /// Rule string, e.g. `"required,min=3,max=32"`
    pub rules: &'static str,
}

impl FieldDescriptor {
    pub const fn new(name: &'static str, rules: &'static str) -> Self {
        Self { name, rules }
    }
}

/// A type whose fields carry declarative constraints.
///
/// Usually implemented with `#[derive(Record)]`:
///
/// ```
/// use fieldcheck_validation::Record;
///
/// #[derive(Record)]
/// struct Signup {
///     #[validate("required,email")]
///     email: String,
///     #[validate("required,gte=18")]
///     age: u32,
/// }
///
/// assert_eq!(Signup::fields().len(), 2);
/// ```
///
/// `field_values` must return exactly one value per descriptor, in the
/// same order.
pub trait Record: 'static {
    /// Annotated fields in declaration order.
    fn fields() -> &'static [FieldDescriptor];

    /// Current values of the annotated fields.
    fn field_values(&self) -> Vec<Value>;
}

/// Extension for validating a record with the shared engine.
pub trait Validate {
    /// Validate against the process-wide [`Validator`](crate::Validator).
    fn validate(&self) -> Result<FieldErrors>;
}

impl<T: Record> Validate for T {
    fn validate(&self) -> Result<FieldErrors> {
        crate::validate(self)
    }
}

/// What a custom constraint sees when it is evaluated.
#[derive(Debug, Clone, Copy)]
pub struct FieldContext<'a> {
    /// Field identifier as declared
    pub field: &'a str,

    /// Field value
    pub value: &'a Value,

    /// Raw parameter from `tag=param`, if any
    pub param: Option<&'a str>,
}

impl<'a> FieldContext<'a> {
    /// Parameter parsed as a number
    pub fn param_f64(&self) -> Option<f64> {
        self.param.and_then(|p| p.trim().parse().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Manual {
        code: String,
    }

    impl Record for Manual {
        fn fields() -> &'static [FieldDescriptor] {
            const FIELDS: &[FieldDescriptor] = &[FieldDescriptor::new("Code", "required,len=4")];
            FIELDS
        }

        fn field_values(&self) -> Vec<Value> {
            vec![Value::from(self.code.as_str())]
        }
    }

    #[test]
    fn test_manual_record_with_extension_trait() {
        let ok = Manual {
            code: "ABCD".to_string(),
        };
        assert!(ok.validate().unwrap().is_empty());

        let bad = Manual {
            code: "ABC".to_string(),
        };
        let errors = bad.validate().unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field(), "code");
        assert_eq!(errors[0].tag(), "len");
    }

    #[test]
    fn test_context_param() {
        let value = Value::Int(3);
        let ctx = FieldContext {
            field: "n",
            value: &value,
            param: Some(" 2.5 "),
        };
        assert_eq!(ctx.param_f64(), Some(2.5));
    }
}
