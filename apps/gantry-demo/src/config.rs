use std::net::SocketAddr;
use std::path::PathBuf;

use gantry_engine::EngineConfig;

use crate::cli::Cli;
use crate::errors::DemoError;
use crate::mode::EngineMode;

const ENGINE_DEFAULT_TOML: &str = include_str!("../resources/engine.default.toml");
const ENGINE_DISTRIBUTED_TOML: &str = include_str!("../resources/engine.distributed.toml");

/// Validated run settings for one demo node.
#[derive(Debug, Clone)]
pub struct DemoConfig {
    pub mode: EngineMode,
    pub registry_addr: SocketAddr,
    /// Definitions to seed when the registry is empty; prompted for if unset.
    pub definitions: Option<u32>,
    /// Instances to launch; prompted for if unset.
    pub instances: Option<u32>,
    pub template_path: Option<PathBuf>,
}

impl TryFrom<Cli> for DemoConfig {
    type Error = DemoError;

    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        let mode = EngineMode::select(&cli.mode)?;
        let registry_addr =
            cli.registry_addr
                .parse()
                .map_err(|source| DemoError::InvalidRegistryAddr {
                    addr: cli.registry_addr.clone(),
                    source,
                })?;
        Ok(Self {
            mode,
            registry_addr,
            definitions: cli.definitions,
            instances: cli.instances,
            template_path: cli.template,
        })
    }
}

/// Loads the embedded engine resource for `mode` and points it at the
/// registry this node actually coordinates on.
pub fn engine_config(mode: EngineMode, registry_addr: SocketAddr) -> Result<EngineConfig, DemoError> {
    let raw = match mode {
        EngineMode::CoLocated => ENGINE_DEFAULT_TOML,
        EngineMode::Distributed => ENGINE_DISTRIBUTED_TOML,
    };
    let config = EngineConfig::from_toml_str(raw)
        .map_err(DemoError::EngineConstruction)?
        .with_registry_url(format!("http://{registry_addr}"));
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use gantry_engine::CacheMode;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from([&["gantry-demo"], args].concat())
    }

    #[test]
    fn config_validates_mode_and_registry_address() {
        let config = DemoConfig::try_from(cli(&["Default", "--registry-addr", "127.0.0.1:7777"]))
            .unwrap();
        assert_eq!(config.mode, EngineMode::CoLocated);
        assert_eq!(config.registry_addr, "127.0.0.1:7777".parse().unwrap());
    }

    #[test]
    fn bad_mode_token_is_rejected() {
        let err = DemoConfig::try_from(cli(&["standalone"])).unwrap_err();
        assert!(matches!(err, DemoError::InvalidMode(_)));
    }

    #[test]
    fn bad_registry_address_is_rejected() {
        let err =
            DemoConfig::try_from(cli(&["default", "--registry-addr", "nowhere"])).unwrap_err();
        assert!(matches!(err, DemoError::InvalidRegistryAddr { .. }));
    }

    #[test]
    fn engine_resources_carry_the_expected_cache_modes() {
        let addr: SocketAddr = "127.0.0.1:7315".parse().unwrap();
        let co_located = engine_config(EngineMode::CoLocated, addr).unwrap();
        assert_eq!(co_located.cache_mode, CacheMode::Local);
        assert_eq!(co_located.registry_url, "http://127.0.0.1:7315");

        let distributed = engine_config(EngineMode::Distributed, addr).unwrap();
        assert_eq!(distributed.cache_mode, CacheMode::Clustered);
    }
}
