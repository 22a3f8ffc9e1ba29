use super::CompiledPattern;
use std::collections::HashMap;
use switchyard_core::{InvalidPatternError, ScalarArg};

/// Named patterns referenced from templates as `:name`.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    symbols: HashMap<String, CompiledPattern>,
}

impl SymbolTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Define `name` as the regex `pattern`, replacing any earlier definition.
    pub fn define(&mut self, name: &str, pattern: &str) -> Result<(), InvalidPatternError> {
        let compiled = CompiledPattern::new(pattern).map_err(|e| InvalidPatternError {
            symbol: name.to_string(),
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        self.symbols.insert(name.to_string(), compiled);
        Ok(())
    }

    /// Define `name` as the canonical pattern of `T`.
    pub fn define_for<T: ScalarArg>(&mut self, name: &str) -> Result<(), InvalidPatternError> {
        let compiled = CompiledPattern::for_scalar(T::SCALAR).ok_or_else(|| InvalidPatternError {
            symbol: name.to_string(),
            pattern: String::new(),
            reason: format!("`{}` has no canonical pattern", T::SCALAR.type_name()),
        })?;
        self.symbols.insert(name.to_string(), compiled);
        Ok(())
    }

    /// Look up `name`.
    pub fn get(&self, name: &str) -> Option<&CompiledPattern> {
        self.symbols.get(name)
    }

    /// Number of defined symbols.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Whether no symbol is defined.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}
