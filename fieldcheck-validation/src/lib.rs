//! Declarative struct validation
//!
//! Records declare constraints on their fields; a [`Validator`] evaluates
//! them and returns a normalized list of [`FieldError`]s ready to be sent
//! back to an API caller.
//!
//! # Examples
//!
//! ## Deriving a record
//!
//! ```
//! use fieldcheck_validation::{Record, Validate};
//!
//! #[derive(Record)]
//! struct User {
//!     #[validate("required,min=3,max=32")]
//!     name: String,
//!     #[validate("required,email")]
//!     email: String,
//!     #[validate("required,gte=18")]
//!     age: u32,
//!     #[validate("required,min=6")]
//!     password: String,
//! }
//!
//! let user = User {
//!     name: "Alice".to_string(),
//!     email: "invalid-email".to_string(),
//!     age: 22,
//!     password: "short".to_string(),
//! };
//!
//! let errors = user.validate().unwrap();
//! assert_eq!(errors.len(), 2);
//! assert_eq!(errors[0].field(), "email");
//! assert_eq!(errors[1].tag(), "min");
//! ```
//!
//! ## Dedicated validator with custom constraints
//!
//! ```
//! use fieldcheck_validation::{Record, Validator, ValidatorConfig};
//!
//! #[derive(Record)]
//! struct Coupon {
//!     #[validate("required,upper_code")]
//!     code: String,
//! }
//!
//! let validator = Validator::builder()
//!     .config(ValidatorConfig::default())
//!     .register("upper_code", |ctx| {
//!         ctx.value.as_str().is_some_and(|s| s.chars().all(|c| c.is_ascii_uppercase()))
//!     })
//!     .build()
//!     .unwrap();
//!
//! assert!(validator.validate(&Coupon { code: "SAVE".into() }).unwrap().is_empty());
//! ```
//!
//! ## Broken declarations are errors, not failures
//!
//! ```
//! use fieldcheck_validation::{Record, Validator, ValidatorError};
//!
//! #[derive(Record)]
//! struct Broken {
//!     #[validate("required,sparkly")]
//!     name: String,
//! }
//!
//! let result = Validator::new().validate(&Broken { name: "x".into() });
//! assert!(matches!(result, Err(ValidatorError::UnknownConstraint { .. })));
//! ```

extern crate self as fieldcheck_validation;

mod config;
mod engine;
mod errors;
mod record;
mod rules;
mod validators;
mod value;

pub use config::*;
pub use engine::*;
pub use errors::*;
pub use record::*;
pub use rules::{RuleSpec, parse_rules};
pub use validators::ConstraintFn;
pub use value::*;

/// Derive [`Record`] from `#[validate("...")]` field attributes.
pub use fieldcheck_macro::Record;
