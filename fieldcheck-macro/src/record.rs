use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use syn::{
    Data, DeriveInput, Error, Fields, GenericParam, LitStr, Path, parse_macro_input, parse_quote,
};

/// Field annotation collected from `#[validate(...)]`
struct FieldRules {
    ident: syn::Ident,
    name: String,
    rules: String,
}

pub fn derive_record_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match expand(input) {
        Ok(tokens) => TokenStream::from(tokens),
        Err(err) => TokenStream::from(err.to_compile_error()),
    }
}

fn expand(mut input: DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = input.ident.clone();
    let krate = crate_path(&input)?;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(Error::new(
                    Span::call_site(),
                    "#[derive(Record)] requires a struct with named fields",
                ));
            }
        },
        _ => {
            return Err(Error::new(
                Span::call_site(),
                "#[derive(Record)] can only be used on structs",
            ));
        }
    };

    let mut annotated = Vec::new();
    for field in fields {
        if let Some(rules) = parse_field(field)? {
            annotated.push(rules);
        }
    }

    // Record: 'static
    for param in input.generics.params.iter_mut() {
        if let GenericParam::Type(ty) = param {
            ty.bounds.push(parse_quote!('static));
        }
    }
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let descriptors = annotated.iter().map(|field| {
        let name = &field.name;
        let rules = &field.rules;
        quote! {
            #krate::FieldDescriptor::new(#name, #rules)
        }
    });

    let values = annotated.iter().map(|field| {
        let ident = &field.ident;
        quote! {
            #krate::ToValue::to_value(&self.#ident)
        }
    });

    Ok(quote! {
        impl #impl_generics #krate::Record for #name #ty_generics #where_clause {
            fn fields() -> &'static [#krate::FieldDescriptor] {
                const FIELDS: &[#krate::FieldDescriptor] = &[
                    #(#descriptors),*
                ];
                FIELDS
            }

            fn field_values(&self) -> ::std::vec::Vec<#krate::Value> {
                ::std::vec![#(#values),*]
            }
        }
    })
}

/// Path of the crate that defines `Record`.
///
/// Defaults to `::fieldcheck_validation`; `#[record(crate = "fieldcheck")]`
/// points it at a re-exporting crate.
fn crate_path(input: &DeriveInput) -> syn::Result<Path> {
    let mut path: Path = parse_quote!(::fieldcheck_validation);

    for attr in input.attrs.iter().filter(|a| a.path().is_ident("record")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("crate") {
                let lit: LitStr = meta.value()?.parse()?;
                path = lit.parse()?;
                Ok(())
            } else {
                Err(meta.error("expected `crate = \"...\"`"))
            }
        })?;
    }

    Ok(path)
}

/// Parse the `#[validate]` attribute of a field, if present.
///
/// Accepted forms:
/// - `#[validate("required,min=3")]`
/// - `#[validate(rules = "required,min=3", name = "FirstName")]`
fn parse_field(field: &syn::Field) -> syn::Result<Option<FieldRules>> {
    let Some(ident) = field.ident.clone() else {
        return Ok(None);
    };

    let mut rules: Option<LitStr> = None;
    let mut name: Option<LitStr> = None;

    for attr in field.attrs.iter().filter(|a| a.path().is_ident("validate")) {
        if rules.is_some() {
            return Err(Error::new_spanned(
                attr,
                "duplicate #[validate] attribute\n\
                 hint: combine constraints into one rule string, e.g. \"required,min=3\"",
            ));
        }

        if let Ok(lit) = attr.parse_args::<LitStr>() {
            rules = Some(lit);
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rules") {
                rules = Some(meta.value()?.parse()?);
                Ok(())
            } else if meta.path.is_ident("name") {
                name = Some(meta.value()?.parse()?);
                Ok(())
            } else {
                Err(meta.error("expected `rules = \"...\"` or `name = \"...\"`"))
            }
        })?;

        if rules.is_none() {
            return Err(Error::new_spanned(
                attr,
                "#[validate] is missing its rules\n\
                 hint: #[validate(\"required\")] or #[validate(rules = \"required\")]",
            ));
        }
    }

    let Some(rules) = rules else {
        return Ok(None);
    };
    check_rule_syntax(&rules)?;

    let name = match name {
        Some(lit) => {
            let value = lit.value();
            if value.is_empty() {
                return Err(Error::new(lit.span(), "field name must not be empty"));
            }
            value
        }
        None => ident.to_string().trim_start_matches("r#").to_string(),
    };

    Ok(Some(FieldRules {
        ident,
        name,
        rules: rules.value(),
    }))
}

/// Catch rule strings that can never compile.
///
/// Constraint names are resolved at runtime because custom constraints
/// are registered on the validator, so only the shape is checked here.
fn check_rule_syntax(lit: &LitStr) -> syn::Result<()> {
    let rules = lit.value();
    let trimmed = rules.trim();
    if trimmed.is_empty() || trimmed == "-" {
        return Ok(());
    }

    for item in trimmed.split(',') {
        if item.trim().is_empty() {
            return Err(Error::new(
                lit.span(),
                format!(
                    "empty rule item in \"{}\"\n\
                     hint: remove the extra ','",
                    rules
                ),
            ));
        }

        for alternative in item.split('|') {
            let tag = alternative.split('=').next().unwrap_or_default().trim();
            if tag.is_empty() {
                return Err(Error::new(
                    lit.span(),
                    format!("missing constraint name in \"{}\"", item.trim()),
                ));
            }
        }
    }

    Ok(())
}
