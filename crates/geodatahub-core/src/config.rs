use crate::error::{GeodatahubError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3";
pub const DEFAULT_GROQ_MODEL: &str = "llama-3.1-8b-instant";
pub const DEFAULT_OPENROUTER_MODEL: &str = "meta-llama/llama-3.1-8b-instruct:free";
pub const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_DOWNLOAD_DIR: &str = "./downloads";
pub const DEFAULT_API_PORT: u16 = 8000;

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConfigSource::Default => "default",
            ConfigSource::File => "file",
            ConfigSource::Environment => "env",
            ConfigSource::Cli => "cli",
        };
        f.write_str(name)
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Which LLM backend the parser should use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmBackendKind {
    /// First available of Groq, Ollama, OpenRouter
    #[default]
    Auto,
    Groq,
    Ollama,
    OpenRouter,
    /// No LLM, regex extraction only
    Regex,
}

impl LlmBackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LlmBackendKind::Auto => "auto",
            LlmBackendKind::Groq => "groq",
            LlmBackendKind::Ollama => "ollama",
            LlmBackendKind::OpenRouter => "openrouter",
            LlmBackendKind::Regex => "regex",
        }
    }
}

impl fmt::Display for LlmBackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LlmBackendKind {
    type Err = GeodatahubError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(LlmBackendKind::Auto),
            "groq" => Ok(LlmBackendKind::Groq),
            "ollama" => Ok(LlmBackendKind::Ollama),
            "openrouter" | "open_router" => Ok(LlmBackendKind::OpenRouter),
            "regex" | "none" => Ok(LlmBackendKind::Regex),
            _ => Err(GeodatahubError::ConfigInvalid {
                key: "llm_backend".to_string(),
                reason: format!(
                    "Invalid LLM backend: {}. Use auto, groq, ollama, openrouter, or regex",
                    s
                ),
            }),
        }
    }
}

/// API keys for hosted LLM backends, read once at startup
#[derive(Clone, Default)]
pub struct LlmCredentials {
    pub groq_api_key: Option<String>,
    pub openrouter_api_key: Option<String>,
}

impl LlmCredentials {
    /// Read `GROQ_API_KEY` and `OPENROUTER_API_KEY`; empty values count as unset
    pub fn from_env() -> Self {
        Self {
            groq_api_key: non_empty_var("GROQ_API_KEY"),
            openrouter_api_key: non_empty_var("OPENROUTER_API_KEY"),
        }
    }
}

impl fmt::Debug for LlmCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmCredentials")
            .field("groq_api_key", &self.groq_api_key.as_ref().map(|_| "***"))
            .field("openrouter_api_key", &self.openrouter_api_key.as_ref().map(|_| "***"))
            .finish()
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Default location of the user config file
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("geodatahub").join("config.toml"))
}

/// Layered configuration for GeoDataHub
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    pub llm_backend: ConfigValue<LlmBackendKind>,
    pub llm_timeout_secs: ConfigValue<u64>,
    pub ollama_url: ConfigValue<String>,
    pub ollama_model: ConfigValue<String>,
    pub groq_model: ConfigValue<String>,
    pub openrouter_model: ConfigValue<String>,
    pub geocoder_url: ConfigValue<String>,
    pub providers_file: ConfigValue<Option<PathBuf>>,
    pub download_dir: ConfigValue<PathBuf>,
    pub api_port: ConfigValue<u16>,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        Self {
            llm_backend: ConfigValue::new(LlmBackendKind::Auto, ConfigSource::Default),
            llm_timeout_secs: ConfigValue::new(DEFAULT_LLM_TIMEOUT_SECS, ConfigSource::Default),
            ollama_url: ConfigValue::new(DEFAULT_OLLAMA_URL.to_string(), ConfigSource::Default),
            ollama_model: ConfigValue::new(DEFAULT_OLLAMA_MODEL.to_string(), ConfigSource::Default),
            groq_model: ConfigValue::new(DEFAULT_GROQ_MODEL.to_string(), ConfigSource::Default),
            openrouter_model: ConfigValue::new(
                DEFAULT_OPENROUTER_MODEL.to_string(),
                ConfigSource::Default,
            ),
            geocoder_url: ConfigValue::new(DEFAULT_GEOCODER_URL.to_string(), ConfigSource::Default),
            providers_file: ConfigValue::new(None, ConfigSource::Default),
            download_dir: ConfigValue::new(PathBuf::from(DEFAULT_DOWNLOAD_DIR), ConfigSource::Default),
            api_port: ConfigValue::new(DEFAULT_API_PORT, ConfigSource::Default),
        }
    }

    /// Defaults, then the config file, then the environment
    ///
    /// An explicit `config_file` must exist. Without one the default user
    /// config is read when present.
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let config = Self::with_defaults();
        let config = match config_file {
            Some(path) => config.load_from_file(path)?,
            None => match default_config_path() {
                Some(path) if path.is_file() => config.load_from_file(path)?,
                _ => config,
            },
        };
        Ok(config.load_from_env())
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| GeodatahubError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file {}: {}", path.as_ref().display(), e),
            })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| GeodatahubError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        if let Some(backend) = file_config.llm_backend {
            self.llm_backend.update(backend, ConfigSource::File);
        }
        if let Some(timeout) = file_config.llm_timeout_secs {
            self.llm_timeout_secs.update(timeout, ConfigSource::File);
        }
        if let Some(url) = file_config.ollama_url {
            self.ollama_url.update(url, ConfigSource::File);
        }
        if let Some(model) = file_config.ollama_model {
            self.ollama_model.update(model, ConfigSource::File);
        }
        if let Some(model) = file_config.groq_model {
            self.groq_model.update(model, ConfigSource::File);
        }
        if let Some(model) = file_config.openrouter_model {
            self.openrouter_model.update(model, ConfigSource::File);
        }
        if let Some(url) = file_config.geocoder_url {
            self.geocoder_url.update(url, ConfigSource::File);
        }
        if let Some(file) = file_config.providers_file {
            self.providers_file.update(Some(file), ConfigSource::File);
        }
        if let Some(dir) = file_config.download_dir {
            self.download_dir.update(dir, ConfigSource::File);
        }
        if let Some(port) = file_config.api_port {
            self.api_port.update(port, ConfigSource::File);
        }

        Ok(self)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        if let Ok(backend_str) = env::var("GEODATAHUB_LLM_BACKEND") {
            match backend_str.parse::<LlmBackendKind>() {
                Ok(backend) => self.llm_backend.update(backend, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid GEODATAHUB_LLM_BACKEND value '{}': expected auto, groq, ollama, openrouter, or regex",
                    backend_str
                ),
            }
        }

        if let Ok(timeout_str) = env::var("GEODATAHUB_LLM_TIMEOUT") {
            match timeout_str.parse::<u64>() {
                Ok(timeout) if timeout > 0 => {
                    self.llm_timeout_secs.update(timeout, ConfigSource::Environment)
                }
                _ => tracing::warn!(
                    "Invalid GEODATAHUB_LLM_TIMEOUT value '{}': expected positive seconds",
                    timeout_str
                ),
            }
        }

        if let Ok(url) = env::var("GEODATAHUB_OLLAMA_URL") {
            self.ollama_url.update(url, ConfigSource::Environment);
        }
        if let Ok(model) = env::var("GEODATAHUB_OLLAMA_MODEL") {
            self.ollama_model.update(model, ConfigSource::Environment);
        }
        if let Ok(model) = env::var("GEODATAHUB_GROQ_MODEL") {
            self.groq_model.update(model, ConfigSource::Environment);
        }
        if let Ok(model) = env::var("GEODATAHUB_OPENROUTER_MODEL") {
            self.openrouter_model.update(model, ConfigSource::Environment);
        }
        if let Ok(url) = env::var("GEODATAHUB_GEOCODER_URL") {
            self.geocoder_url.update(url, ConfigSource::Environment);
        }
        if let Ok(file) = env::var("GEODATAHUB_PROVIDERS_FILE") {
            self.providers_file.update(Some(PathBuf::from(file)), ConfigSource::Environment);
        }
        if let Ok(dir) = env::var("GEODATAHUB_DOWNLOAD_DIR") {
            self.download_dir.update(PathBuf::from(dir), ConfigSource::Environment);
        }

        if let Ok(port_str) = env::var("GEODATAHUB_PORT") {
            match port_str.parse::<u16>() {
                Ok(port) => self.api_port.update(port, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid GEODATAHUB_PORT value '{}': expected a port number",
                    port_str
                ),
            }
        }

        self
    }

    /// Update configuration from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) {
        if let Some(backend) = overrides.llm_backend {
            self.llm_backend.update(backend, ConfigSource::Cli);
        }
        if let Some(dir) = overrides.download_dir {
            self.download_dir.update(dir, ConfigSource::Cli);
        }
        if let Some(port) = overrides.api_port {
            self.api_port.update(port, ConfigSource::Cli);
        }
    }

    pub fn llm_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.llm_timeout_secs.value)
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> HashMap<String, (String, ConfigSource)> {
        let mut map = HashMap::new();

        map.insert(
            "llm_backend".to_string(),
            (self.llm_backend.value.to_string(), self.llm_backend.source),
        );
        map.insert(
            "llm_timeout_secs".to_string(),
            (format!("{}s", self.llm_timeout_secs.value), self.llm_timeout_secs.source),
        );
        map.insert("ollama_url".to_string(), (self.ollama_url.value.clone(), self.ollama_url.source));
        map.insert(
            "ollama_model".to_string(),
            (self.ollama_model.value.clone(), self.ollama_model.source),
        );
        map.insert("groq_model".to_string(), (self.groq_model.value.clone(), self.groq_model.source));
        map.insert(
            "openrouter_model".to_string(),
            (self.openrouter_model.value.clone(), self.openrouter_model.source),
        );
        map.insert(
            "geocoder_url".to_string(),
            (self.geocoder_url.value.clone(), self.geocoder_url.source),
        );
        map.insert(
            "providers_file".to_string(),
            (
                self.providers_file
                    .value
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(built-in)".to_string()),
                self.providers_file.source,
            ),
        );
        map.insert(
            "download_dir".to_string(),
            (self.download_dir.value.display().to_string(), self.download_dir.source),
        );
        map.insert("api_port".to_string(), (self.api_port.value.to_string(), self.api_port.source));

        map
    }
}

impl Default for LayeredConfig {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
struct FileConfig {
    llm_backend: Option<LlmBackendKind>,
    llm_timeout_secs: Option<u64>,
    ollama_url: Option<String>,
    ollama_model: Option<String>,
    groq_model: Option<String>,
    openrouter_model: Option<String>,
    geocoder_url: Option<String>,
    providers_file: Option<PathBuf>,
    download_dir: Option<PathBuf>,
    api_port: Option<u16>,
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub llm_backend: Option<LlmBackendKind>,
    pub download_dir: Option<PathBuf>,
    pub api_port: Option<u16>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = LayeredConfig::with_defaults();
        assert_eq!(config.llm_backend.value, LlmBackendKind::Auto);
        assert_eq!(config.llm_backend.source, ConfigSource::Default);
        assert_eq!(config.llm_timeout_secs.value, 30);
        assert_eq!(config.ollama_url.value, "http://localhost:11434");
        assert_eq!(config.groq_model.value, "llama-3.1-8b-instant");
        assert_eq!(config.api_port.value, 8000);
        assert!(config.providers_file.value.is_none());
    }

    #[test]
    fn test_config_precedence() {
        let mut value = ConfigValue::new(100, ConfigSource::Default);

        value.update(200, ConfigSource::File);
        assert_eq!(value.value, 200);
        assert_eq!(value.source, ConfigSource::File);

        value.update(300, ConfigSource::Environment);
        assert_eq!(value.value, 300);

        value.update(400, ConfigSource::Cli);
        assert_eq!(value.value, 400);
        assert_eq!(value.source, ConfigSource::Cli);

        // Lower precedence should not override
        value.update(500, ConfigSource::File);
        assert_eq!(value.value, 400);
        assert_eq!(value.source, ConfigSource::Cli);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
llm_backend = "ollama"
llm_timeout_secs = 12
ollama_model = "mistral"
providers_file = "/etc/geodatahub/providers.toml"
api_port = 9000
"#
        )
        .unwrap();

        let config = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap();

        assert_eq!(config.llm_backend.value, LlmBackendKind::Ollama);
        assert_eq!(config.llm_backend.source, ConfigSource::File);
        assert_eq!(config.llm_timeout_secs.value, 12);
        assert_eq!(config.ollama_model.value, "mistral");
        assert_eq!(
            config.providers_file.value,
            Some(PathBuf::from("/etc/geodatahub/providers.toml"))
        );
        assert_eq!(config.api_port.value, 9000);
        assert_eq!(config.groq_model.source, ConfigSource::Default);
    }

    #[test]
    fn test_load_from_invalid_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "llm_backend = \"gpt\"").unwrap();

        let result = LayeredConfig::with_defaults().load_from_file(file.path());
        assert!(matches!(result, Err(GeodatahubError::ConfigInvalid { .. })));
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = LayeredConfig::with_defaults();

        config.update_from_cli(CliConfigOverrides {
            llm_backend: Some(LlmBackendKind::Regex),
            download_dir: None,
            api_port: Some(8080),
        });

        assert_eq!(config.llm_backend.value, LlmBackendKind::Regex);
        assert_eq!(config.llm_backend.source, ConfigSource::Cli);
        assert_eq!(config.api_port.value, 8080);
        assert_eq!(config.download_dir.source, ConfigSource::Default);
    }

    #[test]
    fn test_parse_backend_kind() {
        assert_eq!("groq".parse::<LlmBackendKind>().unwrap(), LlmBackendKind::Groq);
        assert_eq!("OpenRouter".parse::<LlmBackendKind>().unwrap(), LlmBackendKind::OpenRouter);
        assert_eq!("none".parse::<LlmBackendKind>().unwrap(), LlmBackendKind::Regex);
        assert!("gpt4".parse::<LlmBackendKind>().is_err());
    }

    #[test]
    fn test_credentials_debug_redacts_keys() {
        let credentials = LlmCredentials {
            groq_api_key: Some("gsk_secret".to_string()),
            openrouter_api_key: None,
        };
        let debug = format!("{:?}", credentials);
        assert!(!debug.contains("gsk_secret"));
        assert!(debug.contains("***"));
    }

    #[test]
    fn test_inspection_map() {
        let config = LayeredConfig::with_defaults();
        let map = config.to_inspection_map();

        assert_eq!(map.len(), 10);
        let (backend, source) = &map["llm_backend"];
        assert_eq!(backend, "auto");
        assert_eq!(*source, ConfigSource::Default);
        assert_eq!(map["providers_file"].0, "(built-in)");
    }
}
