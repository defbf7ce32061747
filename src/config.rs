//! Runtime configuration (`mps-sender.toml`).

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::client::{
    ClientConfig, DEFAULT_MESSAGEBIRD_BASE_URL, DEFAULT_TWILIO_BASE_URL, DEFAULT_VONAGE_BASE_URL,
    DEFAULT_VONAGE_SENDER,
};
use crate::domain::Provider;

pub const CONFIG_FILE_NAME: &str = "mps-sender.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Root of the credential, message and target files.
    pub data_dir: PathBuf,
    /// Whole-request HTTP timeout; unset means the transport default.
    pub timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
    /// Sender id for Vonage, whose credentials carry none.
    pub vonage_sender: String,
    pub twilio_base_url: String,
    pub vonage_base_url: String,
    pub messagebird_base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            timeout_secs: None,
            user_agent: None,
            vonage_sender: DEFAULT_VONAGE_SENDER.to_owned(),
            twilio_base_url: DEFAULT_TWILIO_BASE_URL.to_owned(),
            vonage_base_url: DEFAULT_VONAGE_BASE_URL.to_owned(),
            messagebird_base_url: DEFAULT_MESSAGEBIRD_BASE_URL.to_owned(),
        }
    }
}

impl Config {
    pub fn from_toml(path: &Path, raw: &str) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(path, &raw)
    }

    /// Resolve the effective configuration.
    ///
    /// An explicit path must exist. Otherwise `<data_dir>/mps-sender.toml` is used when
    /// present, and defaults apply when it is not. A `data_dir` given on the command line
    /// always wins over the file.
    pub fn resolve(explicit: Option<&Path>, data_dir: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match explicit {
            Some(path) => Self::load_from_file(path)?,
            None => {
                let base = data_dir.unwrap_or_else(|| Path::new("."));
                let candidate = base.join(CONFIG_FILE_NAME);
                if candidate.exists() {
                    Self::load_from_file(&candidate)?
                } else {
                    debug!(path = %candidate.display(), "no config file, using defaults");
                    Self::default()
                }
            }
        };

        if let Some(dir) = data_dir {
            config.data_dir = dir.to_path_buf();
        }
        Ok(config)
    }

    pub fn client_config(&self) -> ClientConfig {
        let mut client = ClientConfig::default()
            .base_url(Provider::Twilio, self.twilio_base_url.clone())
            .base_url(Provider::Vonage, self.vonage_base_url.clone())
            .base_url(Provider::MessageBird, self.messagebird_base_url.clone())
            .vonage_sender(self.vonage_sender.clone());
        if let Some(secs) = self.timeout_secs {
            client = client.timeout(Duration::from_secs(secs));
        }
        if let Some(user_agent) = self.user_agent.as_ref() {
            client = client.user_agent(user_agent.clone());
        }
        client
    }
}
