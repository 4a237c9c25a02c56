use serde::Deserialize;

use crate::error::EngineError;

/// How an engine node treats definitions it has resolved from the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheMode {
    /// Keep resolved definitions in this process and serve repeat lookups
    /// from memory. Suited to a single node working against its own registry.
    #[default]
    Local,
    /// Never retain definitions locally; every resolution goes back to the
    /// registry so that peers always observe the registry's view.
    Clustered,
}

fn default_request_timeout_secs() -> u64 {
    5
}

/// Engine settings, normally loaded from an embedded TOML resource and then
/// pointed at the node's actual registry address.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EngineConfig {
    /// Base URL of the shared definition registry.
    pub registry_url: String,
    #[serde(default)]
    pub cache_mode: CacheMode,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl EngineConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, EngineError> {
        toml::from_str(raw).map_err(|err| EngineError::Config(err.to_string()))
    }

    pub fn with_registry_url(mut self, url: impl Into<String>) -> Self {
        self.registry_url = url.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_clustered_configuration() {
        let config = EngineConfig::from_toml_str(
            r#"
            registry_url = "http://127.0.0.1:7315"
            cache_mode = "clustered"
            request_timeout_secs = 10
            "#,
        )
        .unwrap();
        assert_eq!(config.cache_mode, CacheMode::Clustered);
        assert_eq!(config.request_timeout_secs, 10);
    }

    #[test]
    fn cache_mode_and_timeout_default_when_omitted() {
        let config =
            EngineConfig::from_toml_str(r#"registry_url = "http://localhost:7315""#).unwrap();
        assert_eq!(config.cache_mode, CacheMode::Local);
        assert_eq!(config.request_timeout_secs, 5);
    }

    #[test]
    fn missing_registry_url_is_a_config_error() {
        let err = EngineConfig::from_toml_str(r#"cache_mode = "local""#).unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }

    #[test]
    fn registry_url_override_replaces_the_resource_value() {
        let config = EngineConfig::from_toml_str(r#"registry_url = "http://example:1""#)
            .unwrap()
            .with_registry_url("http://127.0.0.1:9999");
        assert_eq!(config.registry_url, "http://127.0.0.1:9999");
    }
}
