use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

const DEFAULT_CONFIG: &str = include_str!("../ecoctl.yaml");

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
pub struct CliConfig {
    pub logging: LoggingConfig,
    #[serde(default)]
    pub play: PlayConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive; `RUST_LOG` wins when set.
    pub level: String,
    #[serde(default)]
    pub json: bool,
    #[serde(default)]
    pub show_time: bool,
    #[serde(default)]
    pub show_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            json: false,
            show_time: false,
            show_target: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PlayConfig {
    #[serde(default = "true_default")]
    pub show_lesson: bool,
    #[serde(default)]
    pub default_module: Option<String>,
}

impl Default for PlayConfig {
    fn default() -> Self {
        Self {
            show_lesson: true,
            default_module: None,
        }
    }
}

fn true_default() -> bool {
    true
}

static CONFIG: OnceLock<CliConfig> = OnceLock::new();

pub fn get_config() -> &'static CliConfig {
    CONFIG.get_or_init(|| {
        load_config().unwrap_or_else(|e| {
            // Logging is configured from this, so it is not up yet.
            eprintln!("warning: failed to load configuration, using defaults: {}", e);
            CliConfig::default()
        })
    })
}

fn load_config() -> Result<CliConfig, ConfigError> {
    let builder = Config::builder()
        // Bundled defaults
        .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Yaml))
        // Project and local overrides
        .add_source(File::with_name("ecoctl.yaml").required(false))
        .add_source(File::with_name(".ecoctl.yaml").required(false))
        // Nested env vars like ECO__LOGGING__LEVEL=debug
        .add_source(Environment::with_prefix("ECO").separator("__"));

    builder.build()?.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    struct EnvGuard(&'static str);
    impl EnvGuard {
        fn new(key: &'static str, val: &str) -> Self {
            env::set_var(key, val);
            Self(key)
        }
    }
    impl Drop for EnvGuard {
        fn drop(&mut self) {
            env::remove_var(self.0);
        }
    }

    #[test]
    #[serial]
    fn test_load_config() {
        let config = load_config();
        assert!(config.is_ok(), "Failed to load config: {:?}", config.err());
        assert_eq!(config.unwrap(), CliConfig::default());
    }

    #[test]
    fn test_bundled_defaults_parse() {
        let config: CliConfig = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Yaml))
            .build()
            .and_then(|c| c.try_deserialize())
            .expect("bundled config should parse");
        assert_eq!(config.logging.level, "warn");
        assert!(config.play.show_lesson);
        assert_eq!(config.play.default_module, None);
    }

    #[test]
    #[serial]
    fn test_env_var_override_precedence() {
        let _guard = EnvGuard::new("ECO__LOGGING__LEVEL", "debug");
        let config = load_config().expect("Should load config");
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    #[serial]
    fn test_type_coercion_boolean() {
        {
            let _guard = EnvGuard::new("ECO__LOGGING__JSON", "true");
            let config = load_config().expect("Should load config");
            assert!(config.logging.json);
        }
        {
            let _guard = EnvGuard::new("ECO__PLAY__SHOW_LESSON", "false");
            let config = load_config().expect("Should load config");
            assert!(!config.play.show_lesson);
        }
    }

    #[test]
    #[serial]
    fn test_default_module_override() {
        let _guard = EnvGuard::new("ECO__PLAY__DEFAULT_MODULE", "wind");
        let config = load_config().expect("Should load config");
        assert_eq!(config.play.default_module.as_deref(), Some("wind"));
    }
}
