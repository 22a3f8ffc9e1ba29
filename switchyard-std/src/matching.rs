//! Matching a request against compiled criteria.
//!
//! [`matches`] is a pure function: it reads the criteria and the request and
//! returns owned captures, touching no shared state.

use crate::pattern::{CompiledCriteria, CompiledPattern, PathCriterion, PathKind, QueryKind};
use switchyard_core::{MediaType, Method, QueryParams, RequestPath};

/// The text one pattern criterion matched, with its capture groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    /// The whole matched value.
    pub value: String,
    /// Groups `1..`, `None` where a group did not participate.
    pub groups: Vec<Option<String>>,
}

impl Capture {
    fn new(pattern: &CompiledPattern, value: &str) -> Option<Self> {
        let captures = pattern.captures(value)?;
        Some(Self {
            value: value.to_string(),
            groups: captures
                .iter()
                .skip(1)
                .map(|g| g.map(|m| m.as_str().to_string()))
                .collect(),
        })
    }

    /// Group `group` (1-based), or the whole value for `None`.
    pub fn get(&self, group: Option<usize>) -> Option<&str> {
        match group {
            None => Some(&self.value),
            Some(g) => self.groups.get(g.checked_sub(1)?)?.as_deref(),
        }
    }
}

/// Captures of a successful match, one slot per criterion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Captures {
    /// Per path criterion; `None` for fixed and multi criteria.
    pub path: Vec<Option<Capture>>,
    /// Per query criterion; `None` for fixed or absent optional criteria.
    pub query: Vec<Option<Capture>>,
}

/// Match a request against `criteria`.
///
/// The method and media type gates run first, then the segment walk, then
/// the query criteria.
pub fn matches(
    criteria: &CompiledCriteria,
    method: Method,
    media_type: &MediaType,
    path: &RequestPath,
    query: &QueryParams,
    case_insensitive: bool,
) -> Option<Captures> {
    if !criteria.methods().allows(method) || !criteria.accepts(media_type) {
        return None;
    }

    let segments = path.segments();
    let path_criteria = criteria.path();
    if !criteria.has_multi_segment() && segments.len() != path_criteria.len() {
        return None;
    }

    let mut captures = Captures {
        path: vec![None; path_criteria.len()],
        query: vec![None; criteria.query().len()],
    };
    if !match_segments(segments, 0, path_criteria, 0, case_insensitive, &mut captures.path) {
        return None;
    }

    for (index, criterion) in criteria.query().iter().enumerate() {
        let mut values = query.values(&criterion.name);
        if values.is_empty() {
            values = criteria.defaults(&criterion.name);
        }
        if values.is_empty() {
            if criterion.presence_required {
                return None;
            }
            continue;
        }
        match &criterion.kind {
            QueryKind::Fixed(literal) => {
                if !values.iter().any(|v| literal_eq(v, literal, case_insensitive)) {
                    return None;
                }
            }
            QueryKind::Pattern(pattern) => {
                captures.query[index] = Some(values.iter().find_map(|v| Capture::new(pattern, v))?);
            }
        }
    }

    Some(captures)
}

fn match_segments(
    segments: &[String],
    segment: usize,
    criteria: &[PathCriterion],
    criterion: usize,
    case_insensitive: bool,
    captures: &mut [Option<Capture>],
) -> bool {
    if segment >= segments.len() {
        return criteria[criterion..]
            .iter()
            .all(|c| matches!(c.kind, PathKind::Multi));
    }
    let Some(current) = criteria.get(criterion) else {
        return false;
    };

    match &current.kind {
        PathKind::Fixed(literal) => {
            literal_eq(&segments[segment], literal, case_insensitive)
                && match_segments(segments, segment + 1, criteria, criterion + 1, case_insensitive, captures)
        }
        PathKind::Pattern(pattern) => match Capture::new(pattern, &segments[segment]) {
            Some(capture) => {
                captures[criterion] = Some(capture);
                match_segments(segments, segment + 1, criteria, criterion + 1, case_insensitive, captures)
            }
            None => false,
        },
        PathKind::Multi => {
            if criterion + 1 == criteria.len() {
                return true;
            }
            (segment..=segments.len()).any(|next| {
                match_segments(segments, next, criteria, criterion + 1, case_insensitive, captures)
            })
        }
    }
}

fn literal_eq(value: &str, literal: &str, case_insensitive: bool) -> bool {
    if case_insensitive {
        value
            .chars()
            .flat_map(char::to_lowercase)
            .eq(literal.chars().flat_map(char::to_lowercase))
    } else {
        value == literal
    }
}
