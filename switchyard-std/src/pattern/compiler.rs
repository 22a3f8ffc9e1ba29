//! Turns a parsed template and a handler signature into matchable criteria.

use super::{CompiledPattern, SymbolTable, WILDCARD};
use crate::template::{ParsedTemplate, Term};
use regex::Regex;
use std::collections::HashMap;
use switchyard_core::{MediaType, MethodSet, ParamKind, RouteConfigError};

/// What one path criterion matches.
#[derive(Debug, Clone)]
pub enum PathKind {
    /// A literal segment.
    Fixed(String),
    /// One segment matching a pattern.
    Pattern(CompiledPattern),
    /// Zero or more segments.
    Multi,
}

/// A compiled path segment criterion.
#[derive(Debug, Clone)]
pub struct PathCriterion {
    /// Template segment position.
    pub segment: usize,
    /// What it matches.
    pub kind: PathKind,
}

impl PathCriterion {
    /// Capture groups of the pattern, zero for fixed and multi criteria.
    pub fn group_count(&self) -> usize {
        match &self.kind {
            PathKind::Pattern(pattern) => pattern.group_count(),
            PathKind::Fixed(_) | PathKind::Multi => 0,
        }
    }
}

/// What one query criterion matches.
#[derive(Debug, Clone)]
pub enum QueryKind {
    /// At least one value equals the literal.
    Fixed(String),
    /// At least one value matches the pattern.
    Pattern(CompiledPattern),
}

/// A compiled query criterion.
#[derive(Debug, Clone)]
pub struct QueryCriterion {
    /// Query parameter name.
    pub name: String,
    /// What its values must match.
    pub kind: QueryKind,
    /// Whether absence fails the match.
    pub presence_required: bool,
}

impl QueryCriterion {
    /// Capture groups of the pattern, zero for fixed criteria.
    pub fn group_count(&self) -> usize {
        match &self.kind {
            QueryKind::Pattern(pattern) => pattern.group_count(),
            QueryKind::Fixed(_) => 0,
        }
    }
}

/// Everything a request must satisfy to match one route.
///
/// Immutable once compiled; the derived flags are computed once here.
#[derive(Debug, Clone)]
pub struct CompiledCriteria {
    template: String,
    methods: MethodSet,
    accept: Vec<Regex>,
    path: Vec<PathCriterion>,
    query: Vec<QueryCriterion>,
    defaults: HashMap<String, Vec<String>>,
    has_pattern: bool,
    has_multi: bool,
}

impl CompiledCriteria {
    /// Compile `parsed` against the handler's parameter kinds.
    ///
    /// `{}` placeholders take the kind of the next handler value parameter
    /// not yet claimed by an earlier capturing criterion. Path criteria are
    /// resolved before query criteria.
    pub fn compile(
        parsed: &ParsedTemplate,
        params: &[ParamKind],
        symbols: &SymbolTable,
    ) -> Result<Self, RouteConfigError> {
        let template = parsed.template();
        let mut cursor = ParamCursor::new(params);

        let multis = parsed
            .path()
            .iter()
            .filter(|t| t.term == Term::MultiWildcard)
            .count();
        if multis > 1 {
            return Err(RouteConfigError::DuplicateMultiWildcard(template.to_string()));
        }

        let mut path = Vec::with_capacity(parsed.path().len());
        for terminal in parsed.path() {
            let kind = match &terminal.term {
                Term::Exact(literal) => PathKind::Fixed(literal.clone()),
                Term::MultiWildcard => PathKind::Multi,
                term => PathKind::Pattern(resolve(template, term, &mut cursor, symbols)?),
            };
            if let PathKind::Pattern(pattern) = &kind {
                cursor.claim(pattern.group_count());
            }
            path.push(PathCriterion {
                segment: terminal.segment,
                kind,
            });
        }

        let mut query = Vec::with_capacity(parsed.query().len());
        for terminal in parsed.query() {
            let kind = match &terminal.term {
                Term::Exact(literal) => QueryKind::Fixed(literal.clone()),
                term => QueryKind::Pattern(resolve(template, term, &mut cursor, symbols)?),
            };
            if let QueryKind::Pattern(pattern) = &kind {
                cursor.claim(pattern.group_count());
            }
            query.push(QueryCriterion {
                name: terminal.name.clone(),
                kind,
                presence_required: !terminal.optional,
            });
        }

        let has_pattern = path.iter().any(|c| matches!(c.kind, PathKind::Pattern(_)));
        let has_multi = path.iter().any(|c| matches!(c.kind, PathKind::Multi));

        Ok(Self {
            template: template.to_string(),
            methods: MethodSet::default(),
            accept: Vec::new(),
            path,
            query,
            defaults: HashMap::new(),
            has_pattern,
            has_multi,
        })
    }

    /// Restrict the route to `methods`.
    pub fn with_methods(mut self, methods: MethodSet) -> Self {
        self.methods = methods;
        self
    }

    /// Restrict the route to requests whose media type fully matches one of
    /// `patterns`. No patterns accepts every media type.
    pub fn with_accept<I, S>(mut self, patterns: I) -> Result<Self, RouteConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for pattern in patterns {
            let pattern = pattern.as_ref();
            let regex = Regex::new(&format!("^(?:{pattern})$")).map_err(|_| {
                RouteConfigError::InvalidAcceptPattern {
                    template: self.template.clone(),
                    pattern: pattern.to_string(),
                }
            })?;
            self.accept.push(regex);
        }
        Ok(self)
    }

    /// Values substituted for absent query parameters.
    pub fn with_defaults(mut self, defaults: HashMap<String, Vec<String>>) -> Self {
        self.defaults = defaults;
        self
    }

    /// The template this was compiled from.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Allowed methods.
    pub fn methods(&self) -> MethodSet {
        self.methods
    }

    /// Whether `media_type` passes the accept gate.
    pub fn accepts(&self, media_type: &MediaType) -> bool {
        self.accept.is_empty() || self.accept.iter().any(|r| r.is_match(media_type.as_str()))
    }

    /// Path criteria in segment order.
    pub fn path(&self) -> &[PathCriterion] {
        &self.path
    }

    /// Query criteria in declaration order.
    pub fn query(&self) -> &[QueryCriterion] {
        &self.query
    }

    /// Default values for query parameter `name`.
    pub fn defaults(&self, name: &str) -> &[String] {
        self.defaults.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether any path criterion is a pattern.
    pub fn has_pattern(&self) -> bool {
        self.has_pattern
    }

    /// Whether the template contains `**`.
    pub fn has_multi_segment(&self) -> bool {
        self.has_multi
    }

    /// Whether every path criterion is a literal.
    pub fn all_fixed(&self) -> bool {
        !self.has_pattern && !self.has_multi
    }
}

/// Walks the handler's value parameters in declaration order.
struct ParamCursor<'a> {
    values: Vec<&'a ParamKind>,
    next: usize,
}

impl<'a> ParamCursor<'a> {
    fn new(params: &'a [ParamKind]) -> Self {
        Self {
            values: params.iter().filter(|p| !p.is_context()).collect(),
            next: 0,
        }
    }

    fn peek(&self) -> Option<&'a ParamKind> {
        self.values.get(self.next).copied()
    }

    /// Skip the parameters a pattern with `groups` capture groups binds.
    fn claim(&mut self, groups: usize) {
        self.next += groups.max(1);
    }
}

fn resolve(
    template: &str,
    term: &Term,
    cursor: &mut ParamCursor<'_>,
    symbols: &SymbolTable,
) -> Result<CompiledPattern, RouteConfigError> {
    match term {
        Term::Pattern(source) => compile_source(template, source),
        Term::Wildcard | Term::MultiWildcard => compile_source(template, WILDCARD),
        Term::Exact(literal) => compile_source(template, &regex::escape(literal)),
        Term::Symbol(name) => {
            symbols
                .get(name)
                .cloned()
                .ok_or_else(|| RouteConfigError::UnknownSymbol {
                    template: template.to_string(),
                    symbol: name.clone(),
                })
        }
        Term::HandlerTyped => {
            let param = cursor
                .peek()
                .ok_or_else(|| RouteConfigError::UnresolvedPlaceholder {
                    template: template.to_string(),
                    position: cursor.next,
                })?;
            param
                .scalar()
                .and_then(CompiledPattern::for_scalar)
                .ok_or_else(|| RouteConfigError::UnmappableType {
                    template: template.to_string(),
                    kind: param.to_string(),
                })
        }
    }
}

fn compile_source(template: &str, source: &str) -> Result<CompiledPattern, RouteConfigError> {
    CompiledPattern::new(source).map_err(|e| RouteConfigError::InvalidRegex {
        template: template.to_string(),
        pattern: source.to_string(),
        reason: e.to_string(),
    })
}
