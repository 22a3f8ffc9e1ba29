//! Request processing.
//!
//! [`Engine`] ties a [`RoutingTable`], an optional [`MatchCache`] and the
//! [`DispatchPipeline`] together. A transport hands it a request and a
//! response sink; the engine reports whether any route took the request.

use crate::{
    dispatch::{DispatchPipeline, Outcome},
    table::{MatchCache, RouteMatch, RouteTable, RoutingTable, SimpleMatchCache},
};
use std::sync::Arc;
use switchyard_core::{EngineError, Request, Response};

/// The request-processing entry point.
pub struct Engine {
    table: RoutingTable,
    pipeline: DispatchPipeline,
    cache: Option<Arc<dyn MatchCache>>,
}

impl Engine {
    /// An engine over `table`, with the cache its configuration asks for.
    pub fn new(table: RoutingTable) -> Self {
        let config = table.config();
        let pipeline =
            DispatchPipeline::new().with_default_content_type(config.default_content_type.clone());
        let cache = config
            .cache
            .as_ref()
            .map(|c| Arc::new(SimpleMatchCache::new(c)) as Arc<dyn MatchCache>);
        Self {
            table,
            pipeline,
            cache,
        }
    }

    /// Replace the match cache.
    pub fn with_cache(mut self, cache: Arc<dyn MatchCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Disable match caching.
    pub fn without_cache(mut self) -> Self {
        self.cache = None;
        self
    }

    /// The routing table.
    pub fn table(&self) -> &RoutingTable {
        &self.table
    }

    /// The match cache, if any.
    pub fn cache(&self) -> Option<&Arc<dyn MatchCache>> {
        self.cache.as_ref()
    }

    /// Rebuild the table and drop cached matches.
    pub fn rebuild(&self) -> Result<(), EngineError> {
        self.table.rebuild()?;
        if let Some(cache) = &self.cache {
            cache.clear();
        }
        Ok(())
    }

    /// Route `request` and run the matched route's pipeline.
    ///
    /// Returns `Ok(false)` when the request lies outside the root path or no
    /// route matches; the response is left untouched then.
    pub async fn process(&self, request: Request, response: Response) -> Result<bool, EngineError> {
        Ok(self.dispatch(request, response).await?.is_some())
    }

    /// Like [`process`](Self::process), but reports how the pipeline ended.
    pub async fn dispatch(
        &self,
        request: Request,
        response: Response,
    ) -> Result<Option<Outcome>, EngineError> {
        let table = self.table.table()?;

        let request = match self.table.config().root() {
            Some(root) => match request.path().strip_root(&root) {
                Some(path) => request.with_path(path),
                None => {
                    tracing::trace!(path = %request.path(), "outside root path");
                    return Ok(None);
                }
            },
            None => request,
        };

        let Some(matched) = self.lookup(&table, &request) else {
            tracing::trace!(method = %request.method(), path = %request.path(), "no route");
            return Ok(None);
        };
        tracing::trace!(
            method = %request.method(),
            path = %request.path(),
            template = %matched.entry().template(),
            "matched route"
        );

        let outcome = self.pipeline.invoke(&matched, request, response).await?;
        Ok(Some(outcome))
    }

    fn lookup(&self, table: &RouteTable, request: &Request) -> Option<RouteMatch> {
        let query = table.uses_query().then(|| request.query());
        let Some(cache) = &self.cache else {
            return table.find(request);
        };

        let cached = cache
            .get(request.method(), request.media_type(), request.path(), query)
            .filter(|m| m.generation() == table.generation());
        if cached.is_some() {
            return cached;
        }

        let matched = table.find(request)?;
        cache.put(
            matched.clone(),
            request.method(),
            request.media_type(),
            request.path(),
            query,
        );
        Some(matched)
    }
}
