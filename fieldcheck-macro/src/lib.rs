// Procedural macros for fieldcheck
// `#[derive(Record)]` turns field attributes into a static constraint table

use proc_macro::TokenStream;

mod record;

/// Derive `fieldcheck_validation::Record` for a struct with named fields.
///
/// Each field that should be validated carries a `#[validate]` attribute
/// holding its rule string. Fields without one are not validated.
/// `#[record(crate = "path")]` on the struct changes the path used to
/// reach the runtime crate (default `::fieldcheck_validation`). Records
/// declared in crates that only depend on the `fieldcheck` facade need
/// `#[record(crate = "fieldcheck")]`.
///
/// ```ignore
/// #[derive(Record)]
/// struct User {
///     #[validate("required,min=3,max=32")]
///     name: String,
///     #[validate(rules = "required,email", name = "EmailAddress")]
///     email: String,
///     #[validate("omitempty,url")]
///     homepage: Option<String>,
///     internal_id: u64,
/// }
/// ```
#[proc_macro_derive(Record, attributes(validate, record))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    record::derive_record_impl(input)
}
