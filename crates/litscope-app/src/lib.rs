//! Start-up shared by the litscope binaries.

use litscope_config::{Config, ConfigError, API_KEYS_ENV};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Default log filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "litscope=debug,info";

/// Load `.env`, then initialise structured logging.
pub fn init() {
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    if let Ok(path) = dotenv {
        info!(path = %path.display(), "Loaded environment file");
    }
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
}

/// Load litscope.toml, falling back to defaults when no file exists.
pub fn load_config() -> anyhow::Result<Config> {
    match Config::load() {
        Ok(config) => {
            info!(
                n_keys = config.scopus.api_keys.len(),
                view = %config.scopus.view,
                "Configuration loaded"
            );
            Ok(config)
        }
        Err(ConfigError::NotFound(path)) => {
            warn!("Could not find {}; using built-in defaults", path.display());
            warn!("Copy litscope.example.toml to litscope.toml and edit it.");
            let mut config = Config::default();
            config.apply_key_override(std::env::var(API_KEYS_ENV).ok().as_deref());
            Ok(config)
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_parses() {
        assert!(EnvFilter::try_new(DEFAULT_LOG_FILTER).is_ok());
    }
}
