use config::{Config, Environment};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use toolbox::config::{GlmConfig, PollinationsConfig, QwenConfig, ToolboxConfig};

const ENV_PREFIX: &str = "TOOLBOX";

/// Keys holding allow-lists; their environment overrides are comma separated.
const LIST_KEYS: [&str; 5] = [
    "glm.supported_models",
    "glm.supported_qualities",
    "glm.supported_sizes",
    "qwen.supported_text_models",
    "qwen.supported_multimodal_models",
];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {env_var}")]
    MissingEnvVar { env_var: String },

    #[error("Invalid value for {env_var}: {message}")]
    InvalidValue { env_var: String, message: String },

    #[error("Configuration error: {0}")]
    Other(#[from] config::ConfigError),
}

/// `glm.chat_url` -> `TOOLBOX_GLM__CHAT_URL`
pub fn to_env_var(field: &str) -> String {
    format!("{}_{}", ENV_PREFIX, field.replace('.', "__").to_uppercase())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogSettings {
    /// Filter used when `RUST_LOG` is unset.
    pub level: String,
    /// Directory holding `mcpserver.log`.
    pub directory: PathBuf,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: PathBuf::from("."),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub log: LogSettings,
    pub glm: GlmConfig,
    pub pollinations: PollinationsConfig,
    pub qwen: QwenConfig,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::load_and_validate()
    }

    fn load_and_validate() -> Result<Self, ConfigError> {
        let environment = LIST_KEYS.iter().fold(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .try_parsing(true),
            |environment, key| environment.with_list_parse_key(key),
        );

        // Built-in tables first, environment on top
        let config = Config::builder()
            .add_source(Config::try_from(&Settings::default())?)
            .add_source(environment)
            .build()?;

        config.try_deserialize().map_err(|err| {
            tracing::debug!("Configuration error: {:?}", &err);
            match err {
                config::ConfigError::NotFound(field) => ConfigError::MissingEnvVar {
                    env_var: to_env_var(&field),
                },
                config::ConfigError::Type { key: Some(ref key), .. } => ConfigError::InvalidValue {
                    env_var: to_env_var(key),
                    message: err.to_string(),
                },
                other => ConfigError::Other(other),
            }
        })
    }

    pub fn into_config(self) -> ToolboxConfig {
        ToolboxConfig {
            glm: self.glm,
            pollinations: self.pollinations,
            qwen: self.qwen,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    fn clean_env() {
        for (key, _) in env::vars() {
            if key.starts_with("TOOLBOX_") {
                env::remove_var(&key);
            }
        }
    }

    #[test]
    #[serial]
    fn test_default_settings() {
        clean_env();

        let settings = Settings::new().unwrap();
        assert_eq!(settings.log, LogSettings::default());
        assert_eq!(settings.into_config(), ToolboxConfig::default());
    }

    #[test]
    #[serial]
    fn test_environment_override() {
        clean_env();
        env::set_var("TOOLBOX_GLM__CHAT_URL", "http://localhost:9000/chat");
        env::set_var("TOOLBOX_GLM__TEMPERATURE", "0.5");
        env::set_var("TOOLBOX_POLLINATIONS__VISION_MAX_TOKENS", "500");
        env::set_var("TOOLBOX_LOG__LEVEL", "debug");
        env::set_var("TOOLBOX_LOG__DIRECTORY", "/var/log/toolbox");

        let settings = Settings::new().unwrap();
        assert_eq!(settings.log.level, "debug");
        assert_eq!(settings.log.directory, PathBuf::from("/var/log/toolbox"));

        let config = settings.into_config();
        assert_eq!(config.glm.chat_url, "http://localhost:9000/chat");
        assert_eq!(config.glm.temperature, 0.5);
        assert_eq!(config.glm.top_p, 0.6);
        assert_eq!(config.pollinations.vision_max_tokens, 500);
        assert_eq!(config.qwen, QwenConfig::default());

        clean_env();
    }

    #[test]
    #[serial]
    fn test_list_override() {
        clean_env();
        env::set_var("TOOLBOX_QWEN__SUPPORTED_TEXT_MODELS", "qwen-max,qwen-long");

        let config = Settings::new().unwrap().into_config();
        assert_eq!(config.qwen.supported_text_models, vec!["qwen-max", "qwen-long"]);

        clean_env();
    }

    #[test]
    #[serial]
    fn test_invalid_value_names_variable() {
        clean_env();
        env::set_var("TOOLBOX_POLLINATIONS__VISION_MAX_TOKENS", "lots");

        let err = Settings::new().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { .. } | ConfigError::Other(_)
        ));
        assert!(
            err.to_string().to_lowercase().contains("vision_max_tokens"),
            "{}",
            err
        );

        clean_env();
    }

    #[test]
    fn test_to_env_var() {
        assert_eq!(to_env_var("glm.chat_url"), "TOOLBOX_GLM__CHAT_URL");
        assert_eq!(to_env_var("log"), "TOOLBOX_LOG");
    }
}
