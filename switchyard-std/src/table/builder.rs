use super::RoutingTable;
use crate::{
    config::RoutesConfig,
    descriptor::{HookDescriptor, RouteDescriptor, RouteDescriptorProvider},
    pattern::SymbolTable,
};
use arc_swap::ArcSwapOption;
use parking_lot::Mutex;
use std::sync::atomic::AtomicU64;
use switchyard_core::{InvalidPatternError, ScalarArg};

/// Builder for constructing a [`RoutingTable`].
///
/// Routes registered directly with [`route`](Self::route) come before those
/// of any provider in registration order.
#[derive(Default)]
pub struct RoutingTableBuilder {
    config: RoutesConfig,
    symbols: SymbolTable,
    routes: Vec<RouteDescriptor>,
    providers: Vec<Box<dyn RouteDescriptorProvider>>,
    before: Vec<HookDescriptor>,
    after: Vec<HookDescriptor>,
}

impl RoutingTableBuilder {
    /// Create a new empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `config` for the table.
    pub fn config(mut self, config: RoutesConfig) -> Self {
        self.config = config;
        self
    }

    /// Define the symbol `:name` as the regex `pattern`.
    pub fn define_symbol(mut self, name: &str, pattern: &str) -> Result<Self, InvalidPatternError> {
        self.symbols.define(name, pattern)?;
        Ok(self)
    }

    /// Define the symbol `:name` as the canonical pattern of `T`.
    pub fn define_symbol_for<T: ScalarArg>(mut self, name: &str) -> Result<Self, InvalidPatternError> {
        self.symbols.define_for::<T>(name)?;
        Ok(self)
    }

    /// Register one route.
    pub fn route(mut self, route: RouteDescriptor) -> Self {
        self.routes.push(route);
        self
    }

    /// Register a source of routes, queried on every build.
    pub fn provider<P: RouteDescriptorProvider + 'static>(mut self, provider: P) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    /// Add a before-hook for every route its tag filters accept.
    pub fn before(mut self, hook: HookDescriptor) -> Self {
        self.before.push(hook);
        self
    }

    /// Add an after-hook for every route its tag filters accept.
    pub fn after(mut self, hook: HookDescriptor) -> Self {
        self.after.push(hook);
        self
    }

    /// Finish configuration. The table itself is compiled on first use.
    pub fn build(self) -> RoutingTable {
        let mut providers = self.providers;
        if !self.routes.is_empty() {
            providers.insert(0, Box::new(self.routes));
        }
        RoutingTable {
            config: self.config,
            symbols: self.symbols,
            providers,
            before: self.before,
            after: self.after,
            table: ArcSwapOption::empty(),
            build_lock: Mutex::new(()),
            generation: AtomicU64::new(0),
        }
    }
}
