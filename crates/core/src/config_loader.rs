use crate::config::AppConfig;
use anyhow::Result;
use figment::{
    providers::{Env, Format, Json, Serialized, Toml},
    Figment,
};

pub struct ConfigLoader;

impl ConfigLoader {
    fn base(toml_path: &str) -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default())).merge(Toml::file(toml_path))
    }

    fn finish(figment: Figment) -> Result<AppConfig> {
        let config: AppConfig = figment
            .merge(Env::prefixed("FLAREWATCH_").split("__"))
            .join(Json::file("config/Config.json"))
            .extract()?;

        tracing::debug!(
            symbol = %config.market.symbol,
            providers = config.market.providers.len(),
            "configuration loaded"
        );
        Ok(config)
    }

    /// Loads application configuration by merging defaults, TOML, environment variables, and JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration files cannot be read or parsed.
    pub fn load() -> Result<AppConfig> {
        Self::load_from("config/Config.toml")
    }

    /// Loads configuration from a specific TOML file instead of `config/Config.toml`.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration files cannot be read or parsed.
    pub fn load_from(toml_path: &str) -> Result<AppConfig> {
        Self::finish(Self::base(toml_path))
    }

    /// Loads application configuration with a specific profile.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration files cannot be read or parsed.
    pub fn load_with_profile(profile: &str) -> Result<AppConfig> {
        Self::finish(
            Self::base("config/Config.toml")
                .merge(Toml::file(format!("config/Config.{profile}.toml"))),
        )
    }
}
