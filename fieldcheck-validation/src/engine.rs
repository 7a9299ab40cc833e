// Validation engine

use crate::rules::{CompiledRecord, Step};
use crate::validators::{ConstraintFn, Registry};
use crate::{FieldContext, FieldError, FieldErrors, Record, Result, ValidatorConfig, ValidatorError};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::any::{TypeId, type_name};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace, warn};

static GLOBAL: Lazy<Validator> = Lazy::new(|| Validator::with_config(ValidatorConfig::from_env()));

/// The process-wide validator used by [`validate`] and [`Validate`](crate::Validate).
///
/// Built once on first use from [`ValidatorConfig::from_env`].
pub fn global() -> &'static Validator {
    &GLOBAL
}

/// Validate a record with the process-wide validator.
///
/// ```
/// use fieldcheck_validation::{Record, validate};
///
/// #[derive(Record)]
/// struct Login {
///     #[validate("required,email")]
///     email: String,
/// }
///
/// let errors = validate(&Login { email: "nope".into() }).unwrap();
/// assert_eq!(errors.len(), 1);
/// assert_eq!(errors[0].tag(), "email");
/// ```
pub fn validate<T: Record>(record: &T) -> Result<FieldErrors> {
    global().validate(record)
}

/// Evaluates declared field constraints and reports violations.
///
/// A `Validator` owns its constraint registry and a cache of compiled
/// record schemas. Build it once and share it; it is `Send + Sync` and
/// every call only takes the cache's read lock once a record type has
/// been seen. Custom constraint functions must themselves be safe to call
/// concurrently.
pub struct Validator {
    registry: Registry,
    config: ValidatorConfig,
    schemas: RwLock<HashMap<TypeId, Arc<CompiledRecord>>>,
}

impl Validator {
    /// Validator with the built-in constraints and default config
    pub fn new() -> Self {
        Self::with_config(ValidatorConfig::default())
    }

    /// Validator with the built-in constraints
    pub fn with_config(config: ValidatorConfig) -> Self {
        Self::from_parts(Registry::builtin(), config)
    }

    /// Start building a validator with custom constraints
    pub fn builder() -> ValidatorBuilder {
        ValidatorBuilder::new()
    }

    fn from_parts(registry: Registry, config: ValidatorConfig) -> Self {
        debug!(
            constraints = registry.len(),
            fail_fast = config.fail_fast,
            "Initialized validator"
        );
        Self {
            registry,
            config,
            schemas: RwLock::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Validate every declared constraint of `record`.
    ///
    /// Returns an empty collection when all constraints hold. Failures are
    /// reported in field declaration order with lowercased field names.
    /// An `Err` means the constraints could not be evaluated at all.
    pub fn validate<T: Record>(&self, record: &T) -> Result<FieldErrors> {
        let schema = self.schema::<T>()?;
        let values = record.field_values();

        if values.len() != schema.declared {
            let err = ValidatorError::FieldCountMismatch {
                record: schema.name,
                declared: schema.declared,
                produced: values.len(),
            };
            warn!(error = %err, "Validation could not run");
            return Err(err);
        }

        let mut errors = Vec::new();
        for field in &schema.fields {
            let value = &values[field.index];

            for step in &field.steps {
                let rule = match step {
                    Step::OmitEmpty if value.is_zero() => break,
                    Step::OmitEmpty => continue,
                    Step::Rule(rule) => rule,
                };

                let passed = rule
                    .passes(schema.name, field.name, value)
                    .inspect_err(|err| warn!(error = %err, "Validation could not run"))?;

                if !passed {
                    errors.push(FieldError::new(field.name, rule.tag.as_str(), value.clone()));
                    if self.config.fail_fast {
                        break;
                    }
                }
            }
        }

        trace!(record = schema.name, violations = errors.len(), "Validated record");
        Ok(FieldErrors::new(errors))
    }

    /// Compile and cache the constraints of `T` ahead of the first call.
    ///
    /// Surfaces malformed declarations at startup instead of on first use.
    pub fn prepare<T: Record>(&self) -> Result<()> {
        self.schema::<T>().map(|_| ())
    }

    fn schema<T: Record>(&self) -> Result<Arc<CompiledRecord>> {
        let id = TypeId::of::<T>();
        if let Some(schema) = self.schemas.read().get(&id) {
            return Ok(Arc::clone(schema));
        }

        let name = type_name::<T>();
        let compiled = CompiledRecord::compile(name, T::fields(), &self.registry)
            .inspect_err(|err| warn!(record = name, error = %err, "Invalid record constraints"))?;
        debug!(
            record = name,
            fields = compiled.fields.len(),
            "Compiled record constraints"
        );

        let mut schemas = self.schemas.write();
        let schema = schemas.entry(id).or_insert_with(|| Arc::new(compiled));
        Ok(Arc::clone(schema))
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validator")
            .field("constraints", &self.registry.len())
            .field("config", &self.config)
            .field("schemas", &self.schemas.read().len())
            .finish()
    }
}

/// Builder for a [`Validator`] with custom constraints.
///
/// ```
/// use fieldcheck_validation::{Record, Validator};
///
/// #[derive(Record)]
/// struct Order {
///     #[validate("required,even")]
///     quantity: u32,
/// }
///
/// let validator = Validator::builder()
///     .register("even", |ctx| ctx.value.as_f64().is_some_and(|n| n % 2.0 == 0.0))
///     .build()
///     .unwrap();
///
/// let errors = validator.validate(&Order { quantity: 3 }).unwrap();
/// assert_eq!(errors[0].tag(), "even");
/// ```
pub struct ValidatorBuilder {
    registry: Registry,
    config: ValidatorConfig,
    error: Option<ValidatorError>,
}

impl ValidatorBuilder {
    pub fn new() -> Self {
        Self {
            registry: Registry::builtin(),
            config: ValidatorConfig::default(),
            error: None,
        }
    }

    /// Set the configuration
    pub fn config(mut self, config: ValidatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Register a custom constraint under `tag`.
    ///
    /// Registering a built-in tag replaces it. Invalid tag names are
    /// reported by [`build`](Self::build).
    pub fn register<F>(mut self, tag: impl Into<String>, constraint: F) -> Self
    where
        F: Fn(&FieldContext<'_>) -> bool + Send + Sync + 'static,
    {
        if self.error.is_some() {
            return self;
        }

        let tag = tag.into();
        if let Err(reason) = check_tag_name(&tag) {
            self.error = Some(ValidatorError::Registration(format!(
                "invalid constraint tag '{}': {}",
                tag, reason
            )));
            return self;
        }

        let func: ConstraintFn = Arc::new(constraint);
        if self.registry.insert(tag.clone(), func) {
            debug!(tag = %tag, "Replaced constraint");
        }
        self
    }

    /// Finish building
    pub fn build(self) -> Result<Validator> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(Validator::from_parts(self.registry, self.config)),
        }
    }
}

impl Default for ValidatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn check_tag_name(tag: &str) -> std::result::Result<(), &'static str> {
    if tag.is_empty() {
        return Err("tag is empty");
    }
    if tag == "omitempty" {
        return Err("tag is reserved");
    }
    if !tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err("tag may only contain ASCII letters, digits and '_'");
    }
    Ok(())
}
