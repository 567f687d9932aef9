use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use dirs::home_dir;
use serde::Deserialize;

use crate::error::Result;
use crate::error::TestgenErr;
use crate::flags::OLLAMA_BASE_URL;
use crate::flags::TESTGEN_MODEL;
use crate::flags::TESTGEN_PULL_TIMEOUT_MS;
use crate::flags::TESTGEN_REQUEST_TIMEOUT_MS;

/// Contents of `$TESTGEN_HOME/config.toml`. Every key is optional.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigToml {
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub request_timeout_ms: Option<u64>,
    pub pull_timeout_ms: Option<u64>,
    /// Check for (and offer to download) the model before generating.
    pub manage_model: Option<bool>,
}

/// Optional overrides for user configuration (e.g., from CLI flags).
#[derive(Default, Debug, Clone)]
pub struct ConfigOverrides {
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub manage_model: Option<bool>,
}

/// Effective settings for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Ollama model identifier, e.g. `codellama` or `llama3:8b`.
    pub model: String,
    pub base_url: String,
    pub request_timeout: Duration,
    pub pull_timeout: Duration,
    pub manage_model: bool,
}

impl Config {
    /// Load `config.toml` from the testgen home directory and apply
    /// `overrides` (highest precedence). Environment flags supply the
    /// defaults for anything the file leaves unset.
    pub fn load_with_overrides(overrides: ConfigOverrides) -> Result<Self> {
        let cfg = load_config_as_toml(&testgen_home()?)?;
        Ok(Self::load_from_base_config_with_overrides(cfg, overrides))
    }

    pub fn load_from_base_config_with_overrides(
        cfg: ConfigToml,
        overrides: ConfigOverrides,
    ) -> Self {
        // Destructure ConfigOverrides fully to ensure all overrides are applied.
        let ConfigOverrides {
            model,
            base_url,
            manage_model,
        } = overrides;

        Self {
            model: model
                .or(cfg.model)
                .unwrap_or_else(|| TESTGEN_MODEL.to_string()),
            base_url: base_url
                .or(cfg.base_url)
                .unwrap_or_else(|| OLLAMA_BASE_URL.to_string()),
            request_timeout: cfg
                .request_timeout_ms
                .map(Duration::from_millis)
                .unwrap_or_else(|| *TESTGEN_REQUEST_TIMEOUT_MS),
            pull_timeout: cfg
                .pull_timeout_ms
                .map(Duration::from_millis)
                .unwrap_or_else(|| *TESTGEN_PULL_TIMEOUT_MS),
            manage_model: manage_model.or(cfg.manage_model).unwrap_or(true),
        }
    }
}

/// Read `config.toml` from `testgen_home`. A missing file yields the empty
/// config; an unreadable or unparsable one is an error.
pub fn load_config_as_toml(testgen_home: &Path) -> Result<ConfigToml> {
    let config_toml_path = testgen_home.join("config.toml");
    match std::fs::read_to_string(&config_toml_path) {
        Ok(contents) => toml::from_str::<ConfigToml>(&contents).map_err(|e| {
            tracing::error!("Failed to parse config.toml: {e}");
            TestgenErr::Config(format!("{}: {e}", config_toml_path.display()))
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!("config.toml not found, using defaults");
            Ok(ConfigToml::default())
        }
        Err(e) => {
            tracing::error!("Failed to read config.toml: {e}");
            Err(e.into())
        }
    }
}

/// Returns the testgen configuration directory: `$TESTGEN_HOME` when set,
/// otherwise `~/.testgen`. Does not verify that the directory exists.
pub fn testgen_home() -> Result<PathBuf> {
    if let Ok(val) = std::env::var("TESTGEN_HOME")
        && !val.is_empty()
    {
        return Ok(PathBuf::from(val));
    }

    let mut p = home_dir().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not find home directory",
        )
    })?;
    p.push(".testgen");
    Ok(p)
}
