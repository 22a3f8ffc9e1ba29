//! Compiled patterns, the symbol table and the criteria compiler.

mod canonical;
mod compiler;
mod symbols;

pub use canonical::{WILDCARD, canonical_pattern};
pub use compiler::{CompiledCriteria, PathCriterion, PathKind, QueryCriterion, QueryKind};
pub use symbols::SymbolTable;

use regex::{Captures, Regex};
use switchyard_core::{ScalarArg, ScalarKind};

/// A regex compiled for full-value matching.
///
/// Patterns are anchored at both ends and run with `.` matching newlines, so
/// query values may carry structured text. Patterns derived from a handler
/// type also carry a range guard: a value is only accepted when it parses to
/// that type.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    source: String,
    regex: Regex,
    guard: Option<ScalarKind>,
}

impl CompiledPattern {
    /// Compile `source` for full-value matching.
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(&format!("^(?s:{source})$"))?;
        Ok(Self {
            source: source.to_string(),
            regex,
            guard: None,
        })
    }

    /// The canonical pattern for `scalar`, if it has one.
    pub fn for_scalar(scalar: ScalarKind) -> Option<Self> {
        let source = canonical_pattern(scalar)?;
        let mut pattern = Self::new(source).ok()?;
        pattern.guard = Some(scalar);
        Some(pattern)
    }

    /// The pattern as written.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Number of capture groups, not counting the whole match.
    pub fn group_count(&self) -> usize {
        self.regex.captures_len() - 1
    }

    /// Match the whole of `value`, returning its captures.
    pub fn captures<'t>(&self, value: &'t str) -> Option<Captures<'t>> {
        let captures = self.regex.captures(value)?;
        match self.guard {
            Some(scalar) if !fits(scalar, value) => None,
            _ => Some(captures),
        }
    }

    /// Whether the whole of `value` matches.
    pub fn is_match(&self, value: &str) -> bool {
        self.captures(value).is_some()
    }
}

fn fits(scalar: ScalarKind, value: &str) -> bool {
    match scalar {
        ScalarKind::Byte => i8::parse_scalar(value).is_some(),
        ScalarKind::Short => i16::parse_scalar(value).is_some(),
        ScalarKind::Int => i32::parse_scalar(value).is_some(),
        ScalarKind::Long => i64::parse_scalar(value).is_some(),
        ScalarKind::Float => f32::parse_scalar(value).is_some(),
        ScalarKind::Double => f64::parse_scalar(value).is_some(),
        ScalarKind::Bool => bool::parse_scalar(value).is_some(),
        ScalarKind::Char => char::parse_scalar(value).is_some(),
        ScalarKind::String => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_match_only() {
        let pattern = CompiledPattern::new("\\d+").unwrap();
        assert!(pattern.is_match("123"));
        assert!(!pattern.is_match("a123"));
        assert!(!pattern.is_match("123a"));
    }

    #[test]
    fn test_alternation_is_anchored_as_a_whole() {
        let pattern = CompiledPattern::new("a|b").unwrap();
        assert!(pattern.is_match("a"));
        assert!(!pattern.is_match("ab"));
    }

    #[test]
    fn test_dot_matches_newline() {
        let pattern = CompiledPattern::new("(.*)").unwrap();
        assert!(pattern.is_match("line one\nline two"));
        assert_eq!(pattern.group_count(), 1);
    }

    #[test]
    fn test_typed_pattern_rejects_out_of_range() {
        let pattern = CompiledPattern::for_scalar(ScalarKind::Byte).unwrap();
        assert!(pattern.is_match("127"));
        assert!(pattern.is_match("-128"));
        assert!(!pattern.is_match("999"));
        assert_eq!(pattern.group_count(), 0);
    }
}
