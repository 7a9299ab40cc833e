//! Declarative struct validation for API handlers.
//!
//! # Deriving through this crate
//!
//! `#[derive(Record)]` expands to paths under `::fieldcheck_validation` by
//! default. A crate that depends only on `fieldcheck` must add
//! `#[record(crate = "fieldcheck")]` to every record, or the generated
//! impl will not resolve:
//!
//! ```
//! use fieldcheck::prelude::*;
//!
//! #[derive(Record)]
//! #[record(crate = "fieldcheck")]
//! struct Signup {
//!     #[validate("required,min=3")]
//!     name: String,
//! }
//!
//! let errors = Signup { name: "Al".into() }.validate().unwrap();
//! assert_eq!(errors[0].field(), "name");
//! assert_eq!(errors[0].tag(), "min");
//! ```
//!
//! Crates that depend on `fieldcheck-validation` directly can leave the
//! attribute off.

// Re-export the engine and the derive macro
pub use fieldcheck_validation::*;

/// Everything needed to declare and validate records.
///
/// Records deriving through this crate point the derive at it:
///
/// ```
/// use fieldcheck::prelude::*;
///
/// #[derive(Record)]
/// #[record(crate = "fieldcheck")]
/// struct Contact {
///     #[validate("required,email")]
///     email: String,
/// }
///
/// let errors = Contact { email: String::new() }.validate().unwrap();
/// assert_eq!(errors[0].tag(), "required");
/// ```
pub mod prelude {
    pub use fieldcheck_validation::{
        FieldError, FieldErrors, Record, Validate, Validator, ValidatorConfig, ValidatorError,
        Value, validate,
    };
}
