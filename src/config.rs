use crate::model::PresentationOptions;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    /// Base presentation options; view variables override them per request
    pub view: PresentationOptions,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, an optional `config` file and
    /// `JSONAPI_`-prefixed environment variables (`JSONAPI_VIEW__URL_PREFIX`)
    pub fn load() -> anyhow::Result<Self> {
        let mut config = config::Config::builder();

        config = config.add_source(config::Config::try_from(&AppConfig::default())?);

        config = config.add_source(config::File::with_name("config").required(false));

        config = config.add_source(
            config::Environment::with_prefix("JSONAPI")
                .separator("__")
                .prefix_separator("_"),
        );

        let config = config.build()?;
        let app_config: AppConfig = config.try_deserialize()?;

        Ok(app_config)
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Environment, Inflection};

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server_address(), "127.0.0.1:3001");
        assert_eq!(config.view.inflect, Inflection::Dasherize);
        assert_eq!(config.view.environment, Environment::Debug);
        assert!(config.view.debug_pretty_print);
    }

    #[test]
    fn test_view_options_deserialize_from_partial_config() {
        let view: PresentationOptions = serde_json::from_value(serde_json::json!({
            "url_prefix": "/api",
            "environment": "production",
            "inflect": "underscore"
        }))
        .unwrap();
        assert_eq!(view.url_prefix.as_deref(), Some("/api"));
        assert_eq!(view.environment, Environment::Production);
        assert_eq!(view.inflect, Inflection::Underscore);
        assert_eq!(view.full_base_url, "http://localhost");
    }
}
