//! Route tables.
//!
//! [`RouteTable`] is an immutable list of compiled routes sorted by
//! specificity; [`RoutingTable`] owns the registrations, builds the table
//! once on first use and can swap in a rebuilt one.

mod builder;
mod cache;
mod entry;

pub use builder::RoutingTableBuilder;
pub use cache::{MatchCache, SimpleMatchCache};
pub use entry::RouteEntry;

use crate::{
    config::RoutesConfig,
    descriptor::{HookDescriptor, RouteDescriptor, RouteDescriptorProvider},
    matching::{Captures, matches},
    pattern::SymbolTable,
};
use arc_swap::ArcSwapOption;
use parking_lot::Mutex;
use std::{
    cmp::Reverse,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Instant,
};
use switchyard_core::{Request, RouteConfigError};

/// A matched route and what the request captured.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    entry: Arc<RouteEntry>,
    captures: Captures,
    generation: u64,
}

impl RouteMatch {
    /// The matched route.
    pub fn entry(&self) -> &Arc<RouteEntry> {
        &self.entry
    }

    /// The captures of the match.
    pub fn captures(&self) -> &Captures {
        &self.captures
    }

    /// Generation of the table that produced this match.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Compiled routes in match order.
#[derive(Debug)]
pub struct RouteTable {
    entries: Vec<Arc<RouteEntry>>,
    uses_query: bool,
    case_insensitive: bool,
    generation: u64,
}

impl RouteTable {
    /// Compile every descriptor and sort by specificity.
    ///
    /// Routes whose path criteria are all literals come first. Among the
    /// others, routes with more query criteria come first. Remaining ties
    /// keep registration order.
    pub fn build(
        descriptors: Vec<RouteDescriptor>,
        symbols: &SymbolTable,
        before: &[HookDescriptor],
        after: &[HookDescriptor],
        config: &RoutesConfig,
        generation: u64,
    ) -> Result<Self, RouteConfigError> {
        let mut entries = descriptors
            .into_iter()
            .enumerate()
            .map(|(index, descriptor)| {
                RouteEntry::compile(index, descriptor, symbols, before, after).map(Arc::new)
            })
            .collect::<Result<Vec<_>, _>>()?;

        entries.sort_by_key(|e| {
            let criteria = e.criteria();
            if criteria.all_fixed() {
                (false, Reverse(0))
            } else {
                (true, Reverse(criteria.query().len()))
            }
        });

        let uses_query = entries.iter().any(|e| !e.criteria().query().is_empty());
        Ok(Self {
            entries,
            uses_query,
            case_insensitive: config.case_insensitive,
            generation,
        })
    }

    /// The first route matching `request`, in specificity order.
    ///
    /// The request path must already be relative to the root path.
    pub fn find(&self, request: &Request) -> Option<RouteMatch> {
        self.entries.iter().find_map(|entry| {
            let captures = matches(
                entry.criteria(),
                request.method(),
                request.media_type(),
                request.path(),
                request.query(),
                self.case_insensitive,
            )?;
            Some(RouteMatch {
                entry: Arc::clone(entry),
                captures,
                generation: self.generation,
            })
        })
    }

    /// Entries in match order.
    pub fn entries(&self) -> &[Arc<RouteEntry>] {
        &self.entries
    }

    /// Number of routes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no routes.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether any route has query criteria.
    pub fn uses_query(&self) -> bool {
        self.uses_query
    }

    /// Build counter of the owning [`RoutingTable`].
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Owns route registrations and the table built from them.
///
/// The table is built on first use, exactly once even under concurrent
/// first requests. [`RoutingTable::rebuild`] replaces it atomically; readers
/// keep the table they loaded.
pub struct RoutingTable {
    config: RoutesConfig,
    symbols: SymbolTable,
    providers: Vec<Box<dyn RouteDescriptorProvider>>,
    before: Vec<HookDescriptor>,
    after: Vec<HookDescriptor>,
    table: ArcSwapOption<RouteTable>,
    build_lock: Mutex<()>,
    generation: AtomicU64,
}

impl RoutingTable {
    /// Start configuring a table.
    pub fn builder() -> RoutingTableBuilder {
        RoutingTableBuilder::new()
    }

    /// Table-wide settings.
    pub fn config(&self) -> &RoutesConfig {
        &self.config
    }

    /// Whether the table has been built.
    pub fn is_built(&self) -> bool {
        self.table.load().is_some()
    }

    /// The built table, building it first if needed.
    pub fn table(&self) -> Result<Arc<RouteTable>, RouteConfigError> {
        if let Some(table) = self.table.load_full() {
            return Ok(table);
        }
        let _guard = self.build_lock.lock();
        if let Some(table) = self.table.load_full() {
            return Ok(table);
        }
        let table = Arc::new(self.compile()?);
        self.table.store(Some(Arc::clone(&table)));
        Ok(table)
    }

    /// Build the table if it has not been built yet.
    pub fn build(&self) -> Result<(), RouteConfigError> {
        self.table().map(|_| ())
    }

    /// Compile a fresh table from the providers and swap it in.
    ///
    /// On error the current table stays in place.
    pub fn rebuild(&self) -> Result<Arc<RouteTable>, RouteConfigError> {
        let _guard = self.build_lock.lock();
        let table = Arc::new(self.compile()?);
        self.table.store(Some(Arc::clone(&table)));
        Ok(table)
    }

    /// The first route matching `request`, building the table if needed.
    pub fn find(&self, request: &Request) -> Result<Option<RouteMatch>, RouteConfigError> {
        Ok(self.table()?.find(request))
    }

    fn compile(&self) -> Result<RouteTable, RouteConfigError> {
        let started = Instant::now();
        let descriptors: Vec<_> = self.providers.iter().flat_map(|p| p.descriptors()).collect();
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        let table = RouteTable::build(
            descriptors,
            &self.symbols,
            &self.before,
            &self.after,
            &self.config,
            generation,
        )
        .inspect_err(|e| tracing::error!(error = %e, "route table build failed"))?;

        for entry in table.entries() {
            tracing::debug!(
                index = entry.index(),
                template = %entry.template(),
                all_fixed = entry.criteria().all_fixed(),
                "route"
            );
        }
        tracing::info!(
            routes = table.len(),
            generation,
            elapsed = ?started.elapsed(),
            "route table built"
        );
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn noop() -> impl Fn() -> std::future::Ready<()> + Send + Sync + 'static {
        || std::future::ready(())
    }

    fn template_of(table: &RoutingTable, target: &str) -> Option<String> {
        table
            .find(&Request::get(target))
            .unwrap()
            .map(|m| m.entry().template().to_string())
    }

    #[test]
    fn test_fixed_route_wins_in_either_order() {
        for routes in [["/a/b/c", "/a/{[a-z]+}/c"], ["/a/{[a-z]+}/c", "/a/b/c"]] {
            let mut builder = RoutingTable::builder();
            for r in routes {
                builder = builder.route(RouteDescriptor::new(r, noop()));
            }
            let table = builder.build();
            assert_eq!(template_of(&table, "/a/b/c").as_deref(), Some("/a/b/c"));
            assert_eq!(template_of(&table, "/a/z/c").as_deref(), Some("/a/{[a-z]+}/c"));
        }
    }

    #[test]
    fn test_more_query_criteria_first_then_registration_order() {
        let table = RoutingTable::builder()
            .route(RouteDescriptor::new("/s/*", noop()))
            .route(RouteDescriptor::new("/s/{.*}", noop()))
            .route(RouteDescriptor::new("/s/{[0-9]+}?a={.*}", noop()))
            .build();
        assert_eq!(template_of(&table, "/s/1?a=1").as_deref(), Some("/s/{[0-9]+}?a={.*}"));
        assert_eq!(template_of(&table, "/s/1").as_deref(), Some("/s/*"));
    }

    #[test]
    fn test_fixed_routes_tie_by_registration_order() {
        let table = RoutingTable::builder()
            .route(RouteDescriptor::new("/a", noop()))
            .route(RouteDescriptor::new("/a?x=1", noop()))
            .build();
        assert_eq!(template_of(&table, "/a?x=1").as_deref(), Some("/a"));

        let table = RoutingTable::builder()
            .route(RouteDescriptor::new("/a?x=1", noop()))
            .route(RouteDescriptor::new("/a", noop()))
            .build();
        assert_eq!(template_of(&table, "/a?x=1").as_deref(), Some("/a?x=1"));
        assert_eq!(template_of(&table, "/a").as_deref(), Some("/a"));
    }

    #[test]
    fn test_no_match() {
        let table = RoutingTable::builder()
            .route(RouteDescriptor::new("/a", noop()))
            .build();
        assert!(template_of(&table, "/b").is_none());
    }

    #[test]
    fn test_build_is_lazy_and_idempotent() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let table = RoutingTable::builder()
            .provider(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                vec![RouteDescriptor::new("/a", noop())]
            })
            .build();
        assert!(!table.is_built());
        table.build().unwrap();
        table.build().unwrap();
        template_of(&table, "/a");
        assert!(table.is_built());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_concurrent_first_access_builds_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let table = Arc::new(
            RoutingTable::builder()
                .provider(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                    vec![RouteDescriptor::new("/a", noop())]
                })
                .build(),
        );
        let threads: Vec<_> = (0..8)
            .map(|_| {
                let table = Arc::clone(&table);
                std::thread::spawn(move || table.find(&Request::get("/a")).unwrap().is_some())
            })
            .collect();
        for t in threads {
            assert!(t.join().unwrap());
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_rebuild_swaps_table() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let table = RoutingTable::builder()
            .provider(move || {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                let template = if n == 0 { "/old" } else { "/new" };
                vec![RouteDescriptor::new(template, noop())]
            })
            .build();
        let first = table.table().unwrap();
        assert_eq!(template_of(&table, "/old").as_deref(), Some("/old"));
        let second = table.rebuild().unwrap();
        assert!(second.generation() > first.generation());
        assert!(template_of(&table, "/old").is_none());
        assert_eq!(template_of(&table, "/new").as_deref(), Some("/new"));
        assert_eq!(first.len(), 1);
    }

    #[test]
    fn test_config_error_aborts_build() {
        let table = RoutingTable::builder()
            .route(RouteDescriptor::new("/a", noop()))
            .route(RouteDescriptor::new("/user/{}", noop()))
            .build();
        assert!(matches!(
            table.build(),
            Err(RouteConfigError::UnresolvedPlaceholder { .. })
        ));
        assert!(!table.is_built());
    }

    #[test]
    fn test_case_insensitive_table() {
        let table = RoutingTable::builder()
            .config(RoutesConfig::new().case_insensitive(true))
            .route(RouteDescriptor::new("/Users", noop()))
            .build();
        assert!(template_of(&table, "/users").is_some());
    }
}
