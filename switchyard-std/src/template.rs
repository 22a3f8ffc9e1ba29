//! Route template parsing.
//!
//! A template is a path part and an optional query part separated by the
//! first `?` outside braces:
//!
//! ```text
//! /users/{}/files/**/:slug?format=json&(page={\d+})?
//! ```
//!
//! Path segments and query values are classified into [`Term`]s. Parsing
//! knows nothing about handlers; placeholders are resolved by the compiler.

use switchyard_core::TemplateSyntaxError;

/// One classified token of a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    /// A literal.
    Exact(String),
    /// `{regex}`
    Pattern(String),
    /// `*`, one whole segment or value.
    Wildcard,
    /// `**`, zero or more segments. Path only.
    MultiWildcard,
    /// `:name`, a pattern from the symbol table.
    Symbol(String),
    /// `{}`, a pattern derived from the next handler parameter.
    HandlerTyped,
}

impl Term {
    /// Classify a path segment.
    fn path(segment: &str) -> Option<Term> {
        if segment == "**" {
            Some(Term::MultiWildcard)
        } else {
            Term::value(segment)
        }
    }

    /// Classify a query value. `**` is a literal here.
    fn value(text: &str) -> Option<Term> {
        if text == "{}" {
            return Some(Term::HandlerTyped);
        }
        if let Some(inner) = text.strip_prefix('{').and_then(|t| t.strip_suffix('}')) {
            return Some(Term::Pattern(inner.to_string()));
        }
        if text == "*" {
            return Some(Term::Wildcard);
        }
        if let Some(name) = text.strip_prefix(':') {
            if !name.is_empty() && !name.contains(' ') {
                return Some(Term::Symbol(name.to_string()));
            }
        }
        if text.contains(['{', '}']) {
            return None;
        }
        Some(Term::Exact(text.to_string()))
    }

    /// Whether the term captures part of the request.
    pub fn is_capturing(&self) -> bool {
        !matches!(self, Term::Exact(_) | Term::MultiWildcard)
    }
}

/// A classified path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTerminal {
    /// Position among the template's non-empty segments.
    pub segment: usize,
    /// What the segment matches.
    pub term: Term,
}

/// A classified `name=value` query pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTerminal {
    /// Query parameter name.
    pub name: String,
    /// What the value matches.
    pub term: Term,
    /// `(name=value)?`: absence does not fail the match.
    pub optional: bool,
}

/// A parsed route template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTemplate {
    template: String,
    path: Vec<PathTerminal>,
    query: Vec<QueryTerminal>,
}

impl ParsedTemplate {
    /// Parse `template`.
    pub fn parse(template: &str) -> Result<Self, TemplateSyntaxError> {
        let err = |reason: String| TemplateSyntaxError::new(template, reason);

        let (path_part, query_part) = split_query(template).map_err(err)?;

        let path_part = path_part.strip_prefix('/').unwrap_or(path_part);
        let path_part = path_part.strip_suffix('/').unwrap_or(path_part);

        let mut path = Vec::new();
        for segment in split_top_level(path_part, '/') {
            if segment.is_empty() {
                continue;
            }
            let term = Term::path(segment)
                .ok_or_else(|| err(format!("cannot classify path segment `{segment}`")))?;
            path.push(PathTerminal {
                segment: path.len(),
                term,
            });
        }

        let mut query = Vec::new();
        for pair in split_top_level(query_part.unwrap_or(""), '&') {
            if pair.is_empty() {
                continue;
            }
            let (pair, optional) = match pair.strip_prefix('(').and_then(|p| p.strip_suffix(")?")) {
                Some(inner) => (inner, true),
                None => (pair, false),
            };
            let (name, value) = pair
                .split_once('=')
                .ok_or_else(|| err(format!("query pair `{pair}` has no `=`")))?;
            if name.is_empty() {
                return Err(err(format!("query pair `{pair}` has an empty name")));
            }
            let term = Term::value(value)
                .ok_or_else(|| err(format!("cannot classify query value `{value}`")))?;
            query.push(QueryTerminal {
                name: name.to_string(),
                term,
                optional,
            });
        }

        Ok(Self {
            template: template.to_string(),
            path,
            query,
        })
    }

    /// The template text.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Path terminals in segment order.
    pub fn path(&self) -> &[PathTerminal] {
        &self.path
    }

    /// Query terminals in declaration order.
    pub fn query(&self) -> &[QueryTerminal] {
        &self.query
    }
}

/// Split at the first `?` outside braces, checking that every brace closes.
fn split_query(template: &str) -> Result<(&str, Option<&str>), String> {
    let mut depth = 0usize;
    let mut boundary = None;
    for (i, c) in template.char_indices() {
        match c {
            '?' if depth == 0 && boundary.is_none() => boundary = Some(i),
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    if depth > 0 {
        return Err("unterminated `{`".to_string());
    }
    Ok(match boundary {
        Some(i) => {
            let query = &template[i + 1..];
            (&template[..i], (!query.is_empty()).then_some(query))
        }
        None => (template, None),
    })
}

/// Split on `sep` where it appears outside braces.
fn split_top_level(text: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            c if c == sep && depth == 0 => {
                parts.push(&text[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}
