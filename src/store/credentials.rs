use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::domain::{Credentials, Provider, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
/// Why a credential file was rejected.
pub enum MalformedCredentials {
    #[error("expected {expected} lines, found {actual}")]
    WrongFieldCount { expected: usize, actual: usize },

    #[error("line {line} has no '=' separator")]
    MissingSeparator { line: usize },

    #[error("unexpected key {key}")]
    UnexpectedKey { key: String },

    #[error("duplicate key {key}")]
    DuplicateKey { key: String },

    #[error("{0}")]
    Invalid(#[from] ValidationError),
}

/// Parse a `KEY=value` credential record for `provider`.
///
/// Surrounding whitespace of the whole record is ignored; the line count must match the
/// provider exactly and every required key must appear once with a non-empty value.
pub fn parse_credentials(
    provider: Provider,
    content: &str,
) -> Result<Credentials, MalformedCredentials> {
    let lines = content.trim().lines().collect::<Vec<_>>();
    if lines.len() != provider.field_count() {
        return Err(MalformedCredentials::WrongFieldCount {
            expected: provider.field_count(),
            actual: lines.len(),
        });
    }

    let known = provider.credential_keys();
    let mut fields = BTreeMap::<String, String>::new();
    for (idx, line) in lines.iter().enumerate() {
        let (key, value) = line
            .split_once('=')
            .ok_or(MalformedCredentials::MissingSeparator { line: idx + 1 })?;
        let key = key.trim();
        if !known.iter().any(|known_key| *known_key == key) {
            return Err(MalformedCredentials::UnexpectedKey {
                key: key.to_owned(),
            });
        }
        if fields.insert(key.to_owned(), value.to_owned()).is_some() {
            return Err(MalformedCredentials::DuplicateKey {
                key: key.to_owned(),
            });
        }
    }

    Ok(Credentials::from_fields(provider, &fields)?)
}

fn render_credentials(credentials: &Credentials) -> String {
    credentials
        .fields()
        .into_iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// File-based credential storage, one file per provider.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    dir: PathBuf,
}

impl CredentialStore {
    /// Store rooted at `<data_dir>/api_credentials`.
    pub fn new(data_dir: &Path) -> Self {
        Self {
            dir: data_dir.join("api_credentials"),
        }
    }

    /// Create a store at a specific directory (useful for testing).
    pub fn with_dir(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn path(&self, provider: Provider) -> PathBuf {
        self.dir
            .join(format!("{}_credentials.txt", provider.storage_name()))
    }

    /// Load credentials for `provider`.
    ///
    /// A missing, unreadable or malformed file yields `None`; partial records are never
    /// returned.
    pub fn load(&self, provider: Provider) -> Option<Credentials> {
        let path = self.path(provider);
        let path_display = path.display().to_string();
        let name = provider.storage_name();

        let data = match std::fs::read_to_string(&path) {
            Ok(d) => d,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path_display, provider = name, "credential file not found");
                return None;
            }
            Err(e) => {
                warn!(
                    path = %path_display,
                    provider = name,
                    error = %e,
                    "credential file read failed"
                );
                return None;
            }
        };

        match parse_credentials(provider, &data) {
            Ok(credentials) => {
                debug!(path = %path_display, provider = name, "credentials loaded");
                Some(credentials)
            }
            Err(e) => {
                warn!(
                    path = %path_display,
                    provider = name,
                    error = %e,
                    "invalid credential file"
                );
                None
            }
        }
    }

    /// Write `credentials` as `KEY=value` lines, replacing any previous file.
    pub fn save(&self, credentials: &Credentials) -> std::io::Result<()> {
        let path = self.path(credentials.provider());
        let path_display = path.display().to_string();
        let name = credentials.provider().storage_name();
        info!(path = %path_display, provider = name, "saving credentials");

        super::write_file(&path, &render_credentials(credentials))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }
}
