//! Binding plans: how each handler argument is taken from a match.
//!
//! Captures are handed out in a fixed order: path pattern criteria left to
//! right, then query pattern criteria, each criterion group by group (a
//! pattern without groups hands out its whole value). Handler value
//! parameters claim them in declaration order; context parameters claim
//! nothing.

use crate::{
    matching::{Capture, Captures},
    pattern::{CompiledCriteria, PathKind, QueryKind},
};
use switchyard_core::{ContextKind, ParamKind, QueryParams, RouteConfigError, Value};

/// Where one handler argument comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    /// Injected from the request context.
    Context(ContextKind),
    /// A path criterion's capture; `group: None` is the whole segment.
    Path {
        /// Index into the path criteria.
        criterion: usize,
        /// 1-based capture group.
        group: Option<usize>,
    },
    /// A query criterion's capture.
    Query {
        /// Index into the query criteria.
        criterion: usize,
        /// 1-based capture group.
        group: Option<usize>,
        /// Bind every value of the parameter instead of the matching one.
        multi: bool,
    },
}

/// The ordered bindings for one handler, built once at registration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindingPlan {
    bindings: Vec<Binding>,
}

#[derive(Clone, Copy)]
enum Slot {
    Path(usize, Option<usize>),
    Query(usize, Option<usize>),
}

fn groups(count: usize) -> Vec<Option<usize>> {
    if count == 0 {
        vec![None]
    } else {
        (1..=count).map(Some).collect()
    }
}

impl BindingPlan {
    /// Build the plan for a handler with `params` against `criteria`.
    pub fn build(criteria: &CompiledCriteria, params: &[ParamKind]) -> Result<Self, RouteConfigError> {
        let template = criteria.template();

        let mut slots = Vec::new();
        for (index, criterion) in criteria.path().iter().enumerate() {
            if matches!(criterion.kind, PathKind::Pattern(_)) {
                slots.extend(groups(criterion.group_count()).into_iter().map(|g| Slot::Path(index, g)));
            }
        }
        for (index, criterion) in criteria.query().iter().enumerate() {
            if matches!(criterion.kind, QueryKind::Pattern(_)) {
                slots.extend(groups(criterion.group_count()).into_iter().map(|g| Slot::Query(index, g)));
            }
        }
        let mut slots = slots.into_iter();

        let mut bindings = Vec::with_capacity(params.len());
        for (index, param) in params.iter().enumerate() {
            if let ParamKind::Context(kind) = param {
                bindings.push(Binding::Context(*kind));
                continue;
            }
            let slot = slots.next().ok_or_else(|| RouteConfigError::UnmappedParameter {
                template: template.to_string(),
                index,
            })?;
            bindings.push(match slot {
                Slot::Path(criterion, group) => {
                    if param.is_list() {
                        return Err(RouteConfigError::ListBoundToPath {
                            template: template.to_string(),
                            index,
                            segment: criteria.path()[criterion].segment,
                        });
                    }
                    Binding::Path { criterion, group }
                }
                Slot::Query(criterion, group) => {
                    let query = &criteria.query()[criterion];
                    if !query.presence_required && !param.is_nullable() {
                        return Err(RouteConfigError::OptionalRequiresNullable {
                            template: template.to_string(),
                            index,
                            name: query.name.clone(),
                        });
                    }
                    Binding::Query {
                        criterion,
                        group,
                        multi: param.is_list(),
                    }
                }
            });
        }

        Ok(Self { bindings })
    }

    /// Bindings in handler parameter order.
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// Produce the raw argument values for one match.
    pub fn execute(&self, criteria: &CompiledCriteria, captures: &Captures, query: &QueryParams) -> Vec<Value> {
        self.bindings
            .iter()
            .map(|binding| match binding {
                Binding::Context(_) => Value::Context,
                Binding::Path { criterion, group } => single(captures.path.get(*criterion), *group),
                Binding::Query {
                    criterion,
                    group,
                    multi: false,
                } => single(captures.query.get(*criterion), *group),
                Binding::Query {
                    criterion,
                    group,
                    multi: true,
                } => multi(criteria, *criterion, *group, query),
            })
            .collect()
    }
}

fn single(capture: Option<&Option<Capture>>, group: Option<usize>) -> Value {
    capture
        .and_then(Option::as_ref)
        .and_then(|c| c.get(group))
        .map_or(Value::Absent, |v| Value::Single(v.to_string()))
}

/// Every value of the query parameter, or of one group of each matching value.
fn multi(criteria: &CompiledCriteria, criterion: usize, group: Option<usize>, query: &QueryParams) -> Value {
    let Some(criterion) = criteria.query().get(criterion) else {
        return Value::Absent;
    };
    let mut values = query.values(&criterion.name);
    if values.is_empty() {
        values = criteria.defaults(&criterion.name);
    }
    let collected = match (&criterion.kind, group) {
        (QueryKind::Pattern(pattern), Some(g)) => values
            .iter()
            .filter_map(|v| pattern.captures(v)?.get(g).map(|m| m.as_str().to_string()))
            .collect(),
        _ => values.to_vec(),
    };
    Value::Multi(collected)
}
