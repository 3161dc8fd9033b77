use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;

use crate::error::{Result, SymptomCheckerError};

/// Main configuration structure for the symptom checker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub gemini: GeminiConfig,
    pub client: ClientConfig,
}

/// Relay HTTP listener
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Upstream endpoint selection. Sampling parameters are fixed, see
/// [`crate::models::GenerationConfig::FIXED`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

/// Intake front-end settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub api_url: String,
}

/// Load the first `.env` file found in `paths`, returning its path
fn load_dotenv<'a>(paths: &[&'a str]) -> Option<&'a str> {
    for path in paths {
        if dotenvy::from_path(path).is_ok() {
            tracing::info!("Loaded .env from: {}", path);
            return Some(*path);
        }
    }
    None
}

impl Config {
    /// Load configuration from file with environment variable overrides
    /// ALWAYS returns a valid config - never fails
    pub fn load() -> Self {
        // Current directory first, then parent
        if load_dotenv(&[".env", "../.env"]).is_none() {
            tracing::warn!("No .env file found - continuing with env vars only");
        }

        let config_path =
            env::var("SYMPTOM_CONFIG_PATH").unwrap_or_else(|_| "config.yaml".to_string());

        let mut config = if Path::new(&config_path).exists() {
            match fs::read_to_string(&config_path) {
                Ok(contents) => Self::from_yaml(&contents).unwrap_or_else(|e| {
                    tracing::error!(
                        "Failed to parse config file {}: {} - using defaults",
                        config_path,
                        e
                    );
                    Self::default()
                }),
                Err(e) => {
                    tracing::error!(
                        "Failed to read config file {}: {} - using defaults",
                        config_path,
                        e
                    );
                    Self::default()
                }
            }
        } else {
            tracing::debug!("Config file not found at {} - using defaults", config_path);
            Self::default()
        };

        config.apply_env_overrides();

        if let Err(e) = config.validate() {
            tracing::warn!("Config validation warnings: {} - continuing anyway", e);
        }

        config
    }

    pub fn from_yaml(contents: &str) -> std::result::Result<Self, serde_yaml::Error> {
        let config = serde_yaml::from_str::<Config>(contents)?;
        tracing::info!("Loaded configuration from YAML");
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server overrides
        if let Some(host) = lookup("SYMPTOM_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            if let Ok(port_num) = port.parse() {
                self.server.port = port_num;
            }
        }

        // Gemini overrides
        if let Some(api_key) = lookup("GEMINI_API_KEY") {
            self.gemini.api_key = api_key;
        }
        if let Some(base_url) = lookup("GEMINI_BASE_URL") {
            self.gemini.base_url = base_url;
        }
        if let Some(model) = lookup("GEMINI_MODEL") {
            self.gemini.model = model;
        }

        // Client overrides; REACT_APP_API_URL kept for existing deployments
        if let Some(api_url) = lookup("SYMPTOM_API_URL").or_else(|| lookup("REACT_APP_API_URL")) {
            self.client.api_url = api_url;
        }
    }

    /// Validate configuration
    fn validate(&self) -> std::result::Result<(), Box<dyn std::error::Error>> {
        if self.server.port == 0 {
            return Err("Server port cannot be 0".into());
        }

        if self.gemini.api_key.is_empty() {
            return Err("GEMINI_API_KEY environment variable must be set".into());
        }

        if self.gemini.model.trim().is_empty() {
            return Err("gemini.model cannot be empty".into());
        }

        Ok(())
    }

    /// Socket address string the relay binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Parsed listener address; an unparseable host is a configuration error
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let address = self.bind_address();
        address.parse().map_err(|e| {
            SymptomCheckerError::Config(format!("invalid bind address {address}: {e}"))
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
            },
            gemini: GeminiConfig {
                api_key: String::new(),
                base_url: "https://generativelanguage.googleapis.com".to_string(),
                model: "gemini-2.5-flash".to_string(),
            },
            client: ClientConfig {
                api_url: "http://localhost:5000".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.bind_address(), "0.0.0.0:5000");
        assert_eq!(cfg.socket_addr().unwrap().port(), 5000);
        assert_eq!(cfg.gemini.model, "gemini-2.5-flash");
        assert_eq!(cfg.client.api_url, "http://localhost:5000");
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("PORT", "8080"),
            ("GEMINI_API_KEY", "test-key"),
            ("GEMINI_MODEL", "gemini-test"),
            ("REACT_APP_API_URL", "http://relay.local:8080"),
            ("SYMPTOM_HOST", "127.0.0.1"),
        ]);
        let mut cfg = Config::default();
        cfg.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.gemini.api_key, "test-key");
        assert_eq!(cfg.gemini.model, "gemini-test");
        assert_eq!(cfg.client.api_url, "http://relay.local:8080");
        assert_eq!(cfg.bind_address(), "127.0.0.1:8080");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_unparseable_port_keeps_default() {
        let mut cfg = Config::default();
        cfg.apply_overrides(|key| (key == "PORT").then(|| "not-a-number".to_string()));
        assert_eq!(cfg.server.port, 5000);
    }

    #[test]
    fn test_invalid_host_is_config_error() {
        let mut cfg = Config::default();
        cfg.server.host = "not a host".to_string();
        let err = cfg.socket_addr().unwrap_err();
        assert!(matches!(err, SymptomCheckerError::Config(_)));
        assert!(err.to_string().contains("not a host:5000"));
    }

    #[test]
    fn test_from_yaml_ignores_sampling_keys() {
        // Older config files may still carry sampling parameters; they have no effect
        let yaml = r#"
server:
  host: 127.0.0.1
  port: 5050
gemini:
  api_key: from-file
  base_url: http://localhost:9999
  model: gemini-2.5-flash
  temperature: 0.2
  top_k: 1
client:
  api_url: http://127.0.0.1:5050
  timeout_seconds: 0
"#;
        let cfg = Config::from_yaml(yaml).expect("valid yaml");
        assert_eq!(cfg.bind_address(), "127.0.0.1:5050");
        assert_eq!(cfg.gemini.base_url, "http://localhost:9999");
        assert_eq!(cfg.client.api_url, "http://127.0.0.1:5050");
    }

    #[test]
    fn test_first_dotenv_found_wins() {
        let dir = env::temp_dir().join(format!("symptom-dotenv-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let local = dir.join("local.env");
        let parent = dir.join("parent.env");
        fs::write(&local, "SYMPTOM_DOTENV_TEST_LOCAL=1\n").unwrap();
        fs::write(&parent, "SYMPTOM_DOTENV_TEST_PARENT=1\n").unwrap();
        let missing = dir.join("missing.env");

        let paths = [
            missing.to_str().unwrap(),
            local.to_str().unwrap(),
            parent.to_str().unwrap(),
        ];
        assert_eq!(load_dotenv(&paths), Some(paths[1]));
        assert_eq!(env::var("SYMPTOM_DOTENV_TEST_LOCAL").as_deref(), Ok("1"));
        assert!(env::var("SYMPTOM_DOTENV_TEST_PARENT").is_err());

        fs::remove_dir_all(&dir).unwrap();
    }
}
