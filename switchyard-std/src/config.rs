//! Routing configuration.
//!
//! With the `serde` feature, [`RoutesConfig`] deserializes from any serde
//! format; missing fields take their defaults.

use std::time::Duration;
use switchyard_core::RequestPath;

/// Table-wide routing settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RoutesConfig {
    /// Compare fixed path segments and fixed query values ignoring case.
    pub case_insensitive: bool,

    /// Leading path stripped from every request before matching.
    pub root_path: Option<String>,

    /// Content type set on responses of routes that declare none.
    pub default_content_type: Option<String>,

    /// Enables the built-in match cache.
    pub cache: Option<CacheConfig>,
}

impl RoutesConfig {
    /// Default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set case-insensitive literal matching.
    pub fn case_insensitive(mut self, enabled: bool) -> Self {
        self.case_insensitive = enabled;
        self
    }

    /// Serve routes under `root`.
    pub fn root_path(mut self, root: impl Into<String>) -> Self {
        self.root_path = Some(root.into());
        self
    }

    /// Set the fallback response content type.
    pub fn default_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.default_content_type = Some(content_type.into());
        self
    }

    /// Enable the built-in match cache.
    pub fn cache(mut self, cache: CacheConfig) -> Self {
        self.cache = Some(cache);
        self
    }

    /// The root path as segments, `None` when unset or `/`.
    pub fn root(&self) -> Option<RequestPath> {
        self.root_path
            .as_deref()
            .map(RequestPath::parse)
            .filter(|root| !root.is_empty())
    }
}

/// Bounds of the built-in match cache.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CacheConfig {
    /// Entries kept after a purge.
    pub max_entries: usize,

    /// Minimum time between purges, in milliseconds.
    pub min_purge_interval_ms: u64,
}

impl CacheConfig {
    /// Minimum time between purges.
    pub fn min_purge_interval(&self) -> Duration {
        Duration::from_millis(self.min_purge_interval_ms)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 10_000,
            min_purge_interval_ms: 60_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = RoutesConfig::new()
            .case_insensitive(true)
            .root_path("/app/")
            .cache(CacheConfig::default());
        assert!(config.case_insensitive);
        assert_eq!(config.root().unwrap().segments(), ["app"]);
        assert_eq!(config.cache.unwrap().min_purge_interval(), Duration::from_secs(60));
    }

    #[test]
    fn test_slash_root_is_no_root() {
        assert!(RoutesConfig::new().root_path("/").root().is_none());
        assert!(RoutesConfig::new().root().is_none());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_from_toml() {
        let config: RoutesConfig = toml::from_str(
            r#"
            case_insensitive = true
            root_path = "/api"

            [cache]
            max_entries = 100
            "#,
        )
        .unwrap();
        assert!(config.case_insensitive);
        assert_eq!(config.root_path.as_deref(), Some("/api"));
        let cache = config.cache.unwrap();
        assert_eq!(cache.max_entries, 100);
        assert_eq!(cache.min_purge_interval_ms, 60_000);
    }
}
