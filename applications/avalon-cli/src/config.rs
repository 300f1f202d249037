/// CLI configuration
use crate::error::{CliError, Result};
use avalon_client::{ClientConfig, Instance, DEFAULT_ITEMS_PER_PAGE, DEFAULT_TIMEOUT_SECS};
use avalon_export::{DEFAULT_INSTITUTION, DEFAULT_LANGUAGE};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "avalon.toml";

/// Prefix of environment overrides, e.g. `AVALON_CLI__HTTP__TIMEOUT_SECS=120`.
pub const ENV_PREFIX: &str = "AVALON_CLI";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CliConfig {
    #[serde(default = "default_instances")]
    pub instances: InstanceTable,

    #[serde(default = "default_http")]
    pub http: HttpSettings,

    #[serde(default = "default_paging")]
    pub paging: PagingSettings,

    #[serde(default = "default_tools")]
    pub tools: ToolSettings,

    #[serde(default = "default_export")]
    pub export: ExportSettings,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct InstanceTable {
    #[serde(default)]
    pub prod: InstanceSettings,

    #[serde(default)]
    pub pre: InstanceSettings,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct InstanceSettings {
    /// Falls back to the instance's public URL when unset
    #[serde(default)]
    pub url: Option<String>,

    /// Falls back to `AVALON_PROD` / `AVALON_PRE` when unset
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpSettings {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PagingSettings {
    #[serde(default = "default_items_per_page")]
    pub items_per_page: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ToolSettings {
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,

    #[serde(default = "default_weasyprint_path")]
    pub weasyprint_path: PathBuf,

    #[serde(default)]
    pub weasyprint_args: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExportSettings {
    #[serde(default = "default_institution")]
    pub institution: String,

    #[serde(default)]
    pub logo: Option<PathBuf>,

    #[serde(default = "default_language")]
    pub language: String,
}

impl CliConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist; otherwise `avalon.toml` in the working
    /// directory is used when present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let config_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if config_path.exists() {
                    settings = settings.add_source(config::File::from(config_path));
                }
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .map_err(|e| CliError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| CliError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.paging.items_per_page == 0 {
            return Err(CliError::Config(
                "paging.items_per_page must be at least 1".to_string(),
            ));
        }

        if self.http.timeout_secs == 0 {
            return Err(CliError::Config(
                "http.timeout_secs must be at least 1".to_string(),
            ));
        }

        for instance in [Instance::Prod, Instance::Pre] {
            let url = self.url(instance);
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(CliError::Config(format!(
                    "instances.{}.url must start with http:// or https://",
                    instance
                )));
            }
        }

        Ok(())
    }

    pub fn instance(&self, instance: Instance) -> &InstanceSettings {
        match instance {
            Instance::Prod => &self.instances.prod,
            Instance::Pre => &self.instances.pre,
        }
    }

    /// Base URL for an instance: config first, then the built-in default.
    pub fn url(&self, instance: Instance) -> &str {
        self.instance(instance)
            .url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| instance.default_url())
    }

    /// API key for an instance: config first, then the instance's environment variable.
    pub fn api_key(&self, instance: Instance) -> Option<String> {
        self.instance(instance)
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| {
                std::env::var(instance.api_key_env())
                    .ok()
                    .filter(|key| !key.trim().is_empty())
            })
    }

    /// Client settings for an instance.
    pub fn client_config(&self, instance: Instance) -> Result<ClientConfig> {
        let api_key = self.api_key(instance).ok_or_else(|| {
            CliError::Config(format!(
                "No API key for instance '{}' (set {} or instances.{}.api_key)",
                instance,
                instance.api_key_env(),
                instance
            ))
        })?;

        Ok(
            ClientConfig::new(self.url(instance), api_key)
                .with_timeout(self.http.timeout_secs),
        )
    }
}

// Default values
fn default_instances() -> InstanceTable {
    InstanceTable::default()
}

fn default_http() -> HttpSettings {
    HttpSettings {
        timeout_secs: default_timeout_secs(),
    }
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_paging() -> PagingSettings {
    PagingSettings {
        items_per_page: default_items_per_page(),
    }
}

fn default_items_per_page() -> u64 {
    DEFAULT_ITEMS_PER_PAGE
}

fn default_tools() -> ToolSettings {
    ToolSettings {
        ffmpeg_path: default_ffmpeg_path(),
        weasyprint_path: default_weasyprint_path(),
        weasyprint_args: Vec::new(),
    }
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_weasyprint_path() -> PathBuf {
    PathBuf::from("weasyprint")
}

fn default_export() -> ExportSettings {
    ExportSettings {
        institution: default_institution(),
        logo: None,
        language: default_language(),
    }
}

fn default_institution() -> String {
    DEFAULT_INSTITUTION.to_string()
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            instances: default_instances(),
            http: default_http(),
            paging: default_paging(),
            tools: default_tools(),
            export: default_export(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_validate() {
        let config = CliConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.paging.items_per_page, 10);
        assert_eq!(config.url(Instance::Prod), "https://avalon.library.tamu.edu");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[instances.pre]
url = "http://localhost:3000"
api_key = "from-file"

[paging]
items_per_page = 25

[tools]
ffmpeg_path = "/opt/ffmpeg/bin/ffmpeg"
"#
        )
        .unwrap();

        let config = CliConfig::load(Some(file.path())).unwrap();

        assert_eq!(config.url(Instance::Pre), "http://localhost:3000");
        assert_eq!(config.api_key(Instance::Pre).as_deref(), Some("from-file"));
        assert_eq!(config.paging.items_per_page, 25);
        assert_eq!(config.tools.ffmpeg_path, PathBuf::from("/opt/ffmpeg/bin/ffmpeg"));
        // Untouched sections keep their defaults
        assert_eq!(config.url(Instance::Prod), "https://avalon.library.tamu.edu");
        assert_eq!(config.tools.weasyprint_path, PathBuf::from("weasyprint"));

        let client = config.client_config(Instance::Pre).unwrap();
        assert_eq!(client.api_key, "from-file");
        assert_eq!(client.url, "http://localhost:3000");
    }

    #[test]
    fn test_key_only_instance_table() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[instances.prod]\napi_key = \"k\"").unwrap();

        let config = CliConfig::load(Some(file.path())).unwrap();

        assert!(config.validate().is_ok());
        let client = config.client_config(Instance::Prod).unwrap();
        assert_eq!(client.url, "https://avalon.library.tamu.edu");
        assert_eq!(client.api_key, "k");
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let result = CliConfig::load(Some(Path::new("/nonexistent/avalon.toml")));
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let mut config = CliConfig::default();
        config.paging.items_per_page = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_instance_url_rejected() {
        let mut config = CliConfig::default();
        config.instances.prod.url = Some("avalon.example.edu".to_string());
        assert!(config.validate().is_err());
    }
}
