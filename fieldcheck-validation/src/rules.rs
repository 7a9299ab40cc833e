// Rule parsing and per-record compilation

use crate::validators::{Check, EvalError, ParamError, Registry};
use crate::{FieldDescriptor, Result, ValidatorError, Value};

const OMIT_EMPTY: &str = "omitempty";
const SKIP_FIELD: &str = "-";

/// One `tag` or `tag=param` term of a rule string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSpec<'a> {
    pub tag: &'a str,
    pub param: Option<&'a str>,
}

impl<'a> RuleSpec<'a> {
    fn parse(term: &'a str) -> Self {
        match term.split_once('=') {
            Some((tag, param)) => Self {
                tag: tag.trim(),
                param: Some(param),
            },
            None => Self {
                tag: term.trim(),
                param: None,
            },
        }
    }
}

/// Split a rule string into items, each a list of `|` alternatives.
///
/// ```
/// use fieldcheck_validation::parse_rules;
///
/// let items = parse_rules("required,min=3,rgb|rgba");
/// assert_eq!(items.len(), 3);
/// assert_eq!(items[1].1[0].param, Some("3"));
/// assert_eq!(items[2].0, "rgb|rgba");
/// ```
pub fn parse_rules(rules: &str) -> Vec<(&str, Vec<RuleSpec<'_>>)> {
    rules
        .split(',')
        .map(|item| {
            let item = item.trim();
            let alternatives = item.split('|').map(RuleSpec::parse).collect();
            (item, alternatives)
        })
        .collect()
}

/// A compiled rule item; passes when any alternative passes.
#[derive(Clone)]
pub(crate) struct CompiledRule {
    /// Reported failure tag: the item's constraint names joined by `|`
    pub tag: String,
    alternatives: Vec<Alternative>,
}

#[derive(Clone)]
struct Alternative {
    tag: String,
    param: Option<String>,
    check: Check,
}

impl CompiledRule {
    pub(crate) fn passes(
        &self,
        record: &'static str,
        field: &'static str,
        value: &Value,
    ) -> Result<bool> {
        for alternative in &self.alternatives {
            let passed = alternative
                .check
                .evaluate(field, value)
                .map_err(|e| match e {
                    EvalError::Unsupported => ValidatorError::UnsupportedKind {
                        record,
                        field,
                        tag: alternative.tag.clone(),
                        kind: value.kind(),
                    },
                    EvalError::BadParam(reason) => ValidatorError::InvalidParameter {
                        record,
                        field,
                        tag: alternative.tag.clone(),
                        param: alternative.param.clone().unwrap_or_default(),
                        reason,
                    },
                })?;
            if passed {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

#[derive(Clone)]
pub(crate) enum Step {
    /// Stop evaluating the field if its value is the zero value
    OmitEmpty,
    Rule(CompiledRule),
}

#[derive(Clone)]
pub(crate) struct CompiledField {
    pub name: &'static str,
    /// Position in `Record::field_values`
    pub index: usize,
    pub steps: Vec<Step>,
}

/// Every annotated field of one record type, ready to evaluate.
#[derive(Clone)]
pub(crate) struct CompiledRecord {
    pub name: &'static str,
    pub declared: usize,
    pub fields: Vec<CompiledField>,
}

impl CompiledRecord {
    pub(crate) fn compile(
        name: &'static str,
        descriptors: &'static [FieldDescriptor],
        registry: &Registry,
    ) -> Result<Self> {
        let mut fields = Vec::with_capacity(descriptors.len());

        for (index, descriptor) in descriptors.iter().enumerate() {
            let rules = descriptor.rules.trim();
            if rules.is_empty() || rules == SKIP_FIELD {
                continue;
            }

            let steps = compile_field(name, descriptor, registry)?;
            fields.push(CompiledField {
                name: descriptor.name,
                index,
                steps,
            });
        }

        Ok(Self {
            name,
            declared: descriptors.len(),
            fields,
        })
    }
}

fn compile_field(
    record: &'static str,
    descriptor: &FieldDescriptor,
    registry: &Registry,
) -> Result<Vec<Step>> {
    let field = descriptor.name;
    let invalid_rule = |reason: &str| ValidatorError::InvalidRule {
        record,
        field,
        rule: descriptor.rules.to_string(),
        reason: reason.to_string(),
    };

    let mut steps = Vec::new();
    for (item, alternatives) in parse_rules(descriptor.rules) {
        if item.is_empty() {
            return Err(invalid_rule("empty rule item"));
        }

        if item == OMIT_EMPTY {
            steps.push(Step::OmitEmpty);
            continue;
        }

        let mut compiled = Vec::with_capacity(alternatives.len());
        for spec in alternatives {
            if spec.tag.is_empty() {
                return Err(invalid_rule("empty constraint name"));
            }
            if spec.tag == OMIT_EMPTY || spec.tag == SKIP_FIELD {
                return Err(invalid_rule("control tag in an invalid position"));
            }

            let constraint =
                registry
                    .get(spec.tag)
                    .ok_or_else(|| ValidatorError::UnknownConstraint {
                        record,
                        field,
                        tag: spec.tag.to_string(),
                    })?;

            let check = constraint.compile(spec.param).map_err(|e| match e {
                ParamError::Missing => ValidatorError::MissingParameter {
                    record,
                    field,
                    tag: spec.tag.to_string(),
                },
                ParamError::Unexpected => ValidatorError::UnexpectedParameter {
                    record,
                    field,
                    tag: spec.tag.to_string(),
                },
                ParamError::Invalid(reason) => ValidatorError::InvalidParameter {
                    record,
                    field,
                    tag: spec.tag.to_string(),
                    param: spec.param.unwrap_or_default().to_string(),
                    reason,
                },
            })?;

            compiled.push(Alternative {
                tag: spec.tag.to_string(),
                param: spec.param.map(str::to_string),
                check,
            });
        }

        let tag = compiled
            .iter()
            .map(|alternative| alternative.tag.as_str())
            .collect::<Vec<_>>()
            .join("|");
        steps.push(Step::Rule(CompiledRule {
            tag,
            alternatives: compiled,
        }));
    }

    Ok(steps)
}
