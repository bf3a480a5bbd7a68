use jig_api::{AlertChannel, ApiClient, API_URL_ENV, DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS};
use jig_core::{AdequateWording, LaunchMode};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("timeout_secs must be greater than zero")]
    ZeroTimeout,
}

/// Contents of `config.toml`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub api_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub launch_mode: Option<LaunchMode>,
    pub adequate_wording: Option<AdequateWording>,
    pub alert_channel: Option<AlertChannel>,
}

impl FileConfig {
    /// Missing file means defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Values given on the command line; these win over env and file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub api_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Effective settings after layering file, environment and flags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_url: String,
    pub timeout: Duration,
    pub launch_mode: LaunchMode,
    pub adequate_wording: AdequateWording,
    pub alert_channel: AlertChannel,
}

impl Settings {
    pub fn resolve(
        file: FileConfig,
        env_api_url: Option<String>,
        overrides: &Overrides,
    ) -> Result<Self, ConfigError> {
        // Blank values fall through to the next layer
        let api_url = [overrides.api_url.clone(), env_api_url, file.api_url]
            .into_iter()
            .flatten()
            .find(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let timeout_secs = overrides
            .timeout_secs
            .or(file.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }

        Ok(Self {
            api_url,
            timeout: Duration::from_secs(timeout_secs),
            launch_mode: file.launch_mode.unwrap_or_default(),
            adequate_wording: file.adequate_wording.unwrap_or_default(),
            alert_channel: file.alert_channel.unwrap_or_default(),
        })
    }

    /// Read `config_path` and the environment, then apply `overrides`
    pub fn load(config_path: &Path, overrides: &Overrides) -> Result<Self, ConfigError> {
        let file = FileConfig::load(config_path)?;
        let env_api_url = std::env::var(API_URL_ENV).ok();
        let settings = Self::resolve(file, env_api_url, overrides)?;
        log::debug!("Using backend {}", settings.api_url);
        Ok(settings)
    }

    pub fn client(&self) -> jig_api::Result<ApiClient> {
        ApiClient::new(self.api_url.clone(), self.timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings =
            Settings::resolve(FileConfig::default(), None, &Overrides::default()).unwrap();
        assert_eq!(settings.api_url, DEFAULT_API_URL);
        assert_eq!(settings.timeout, Duration::from_secs(30));
        assert_eq!(settings.launch_mode, LaunchMode::Auto);
        assert_eq!(settings.adequate_wording, AdequateWording::Nill);
        assert_eq!(settings.alert_channel, AlertChannel::Telegram);
    }

    #[test]
    fn test_layering_order() {
        let file: FileConfig = toml::from_str(
            r#"
            api_url = "http://file:1"
            timeout_secs = 5
            launch_mode = "manual"
            adequate_wording = "adequate"
            alert_channel = "whatsapp"
            "#,
        )
        .unwrap();

        let from_env =
            Settings::resolve(file.clone(), Some("http://env:2".into()), &Overrides::default())
                .unwrap();
        assert_eq!(from_env.api_url, "http://env:2");
        assert_eq!(from_env.timeout, Duration::from_secs(5));
        assert_eq!(from_env.launch_mode, LaunchMode::Manual);
        assert_eq!(from_env.adequate_wording, AdequateWording::Adequate);
        assert_eq!(from_env.alert_channel, AlertChannel::Whatsapp);

        let overrides = Overrides {
            api_url: Some("http://flag:3".into()),
            timeout_secs: Some(9),
        };
        let from_flags = Settings::resolve(file, Some("http://env:2".into()), &overrides).unwrap();
        assert_eq!(from_flags.api_url, "http://flag:3");
        assert_eq!(from_flags.timeout, Duration::from_secs(9));
    }

    #[test]
    fn test_blank_urls_fall_through() {
        let file = FileConfig {
            api_url: Some("http://file:1".into()),
            ..Default::default()
        };
        let blank_flag = Overrides {
            api_url: Some(String::new()),
            ..Default::default()
        };
        let blank_env = Settings::resolve(file, Some("  ".into()), &blank_flag).unwrap();
        assert_eq!(blank_env.api_url, "http://file:1");

        let unset = Settings::resolve(FileConfig::default(), None, &Overrides::default()).unwrap();
        assert_eq!(unset.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn test_rejects_zero_timeout_and_unknown_keys() {
        let overrides = Overrides {
            timeout_secs: Some(0),
            ..Default::default()
        };
        assert!(matches!(
            Settings::resolve(FileConfig::default(), None, &overrides),
            Err(ConfigError::ZeroTimeout)
        ));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "api_ur = \"typo\"\n").unwrap();
        assert!(matches!(
            FileConfig::load(&path),
            Err(ConfigError::Parse { .. })
        ));
        assert_eq!(
            FileConfig::load(&dir.path().join("missing.toml")).unwrap(),
            FileConfig::default()
        );
    }
}
