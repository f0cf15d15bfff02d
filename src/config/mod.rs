//! Credential configuration — validation, encrypted persistence, `.env` import.
//!
//! The store never fails a `load()`: a missing or unreadable blob degrades
//! to the `.env` file, then to empty credentials, and the workflow reports
//! "not configured" instead of erroring.

mod vault;

pub use vault::{KeyringBackend, SystemKeyring, Vault, VaultError};

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::LazyLock;

pub const ENV_PRIVATE_KEY: &str = "PRIVATE_KEY";
pub const ENV_PUBLIC_KEY: &str = "PUBLIC_KEY";
pub const ENV_URL_ENDPOINT: &str = "URL_ENDPOINT";

const CREDENTIALS_FILE: &str = "credentials.dat";

static ENDPOINT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://\S+$").expect("endpoint regex"));

/// The Private Key / Public Key / URL Endpoint triple the image host
/// authenticates with. Passed explicitly into uploads, never ambient.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub private_key: String,
    pub public_key: String,
    pub url_endpoint: String,
}

impl Credentials {
    pub fn new(
        private_key: impl Into<String>,
        public_key: impl Into<String>,
        url_endpoint: impl Into<String>,
    ) -> Self {
        Self {
            private_key: private_key.into(),
            public_key: public_key.into(),
            url_endpoint: url_endpoint.into(),
        }
    }

    /// All three fields present. The workflow refuses to start without this.
    pub fn is_complete(&self) -> bool {
        !self.private_key.is_empty() && !self.public_key.is_empty() && !self.url_endpoint.is_empty()
    }

    /// Full validation, as required before `save()`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.private_key.is_empty() {
            return Err(ConfigError::Validation("private key"));
        }
        if self.public_key.is_empty() {
            return Err(ConfigError::Validation("public key"));
        }
        if self.url_endpoint.is_empty() {
            return Err(ConfigError::Validation("URL endpoint"));
        }
        if !ENDPOINT_RE.is_match(&self.url_endpoint) {
            return Err(ConfigError::InvalidEndpoint(self.url_endpoint.clone()));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("credential field `{0}` must not be empty")]
    Validation(&'static str),

    #[error("URL endpoint `{0}` is not an http(s) URL")]
    InvalidEndpoint(String),

    #[error("missing environment variable `{0}`")]
    MissingEnvVar(&'static str),

    #[error(transparent)]
    Vault(#[from] VaultError),

    #[error("credential encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("credential file I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Encrypted credential storage plus `.env` import.
pub struct CredentialStore<B: KeyringBackend = SystemKeyring> {
    path: PathBuf,
    env_path: PathBuf,
    vault: Vault<B>,
}

impl CredentialStore<SystemKeyring> {
    /// Store under the platform config directory:
    ///   macOS:   ~/Library/Application Support/snapkit/credentials.dat
    ///   Linux:   ~/.config/snapkit/credentials.dat
    ///   Windows: %APPDATA%/snapkit/credentials.dat
    pub fn new() -> Result<Self, ConfigError> {
        let path = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("snapkit")
            .join(CREDENTIALS_FILE);
        Ok(Self {
            path,
            env_path: PathBuf::from(".env"),
            vault: Vault::new()?,
        })
    }
}

impl<B: KeyringBackend> CredentialStore<B> {
    /// Store at an explicit location with a custom vault.
    pub fn at_path(path: impl Into<PathBuf>, vault: Vault<B>) -> Self {
        Self {
            path: path.into(),
            env_path: PathBuf::from(".env"),
            vault,
        }
    }

    /// Override where `.env` is looked for.
    pub fn with_env_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.env_path = path.into();
        self
    }

    /// Load credentials: encrypted store first, `.env` second, empty last.
    ///
    /// Never fails the caller; storage problems are logged and the next
    /// source is tried.
    pub fn load(&self) -> Credentials {
        match self.load_sealed() {
            Ok(Some(credentials)) => {
                log::info!("[CONFIG] Credentials loaded from encrypted store");
                return credentials;
            }
            Ok(None) => {}
            Err(e) => log::warn!("[CONFIG] Encrypted store unreadable: {e}"),
        }

        match self.import_from_env() {
            Ok(credentials) => {
                log::info!("[CONFIG] Credentials loaded from .env");
                credentials
            }
            Err(e) => {
                log::info!("[CONFIG] No credentials configured ({e})");
                Credentials::default()
            }
        }
    }

    /// Validate and persist credentials, sealed at rest.
    pub fn save(&self, credentials: &Credentials) -> Result<(), ConfigError> {
        credentials.validate()?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let payload = serde_json::to_vec(credentials)?;
        let blob = self.vault.seal(&payload)?;
        std::fs::write(&self.path, blob)?;

        log::info!("[CONFIG] Credentials saved to {}", self.path.display());
        Ok(())
    }

    /// Read the credential triple from `.env` (process environment as a
    /// fallback source). Names the first absent key.
    pub fn import_from_env(&self) -> Result<Credentials, ConfigError> {
        let mut file_vars: HashMap<String, String> = HashMap::new();
        if self.env_path.exists() {
            match dotenvy::from_path_iter(&self.env_path) {
                Ok(iter) => {
                    for (key, value) in iter.flatten() {
                        file_vars.insert(key, value);
                    }
                }
                Err(e) => log::warn!(
                    "[CONFIG] Could not parse {}: {e}",
                    self.env_path.display()
                ),
            }
        }

        let fetch = |key: &'static str| -> Result<String, ConfigError> {
            file_vars
                .get(key)
                .cloned()
                .or_else(|| std::env::var(key).ok())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::MissingEnvVar(key))
        };

        Ok(Credentials {
            private_key: fetch(ENV_PRIVATE_KEY)?,
            public_key: fetch(ENV_PUBLIC_KEY)?,
            url_endpoint: fetch(ENV_URL_ENDPOINT)?,
        })
    }

    /// Remove the stored credential file and sealing key. Idempotent.
    pub fn clear(&self) -> Result<(), ConfigError> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
            log::debug!("[CONFIG] Credential file removed");
        }
        self.vault.discard_key()?;
        Ok(())
    }

    fn load_sealed(&self) -> Result<Option<Credentials>, ConfigError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let blob = std::fs::read_to_string(&self.path)?;
        if blob.is_empty() {
            return Ok(None);
        }
        let payload = self.vault.open(&blob)?;
        let credentials = serde_json::from_slice(&payload)?;
        Ok(Some(credentials))
    }
}

/// Anything the workflow can pull credentials from at the start of a run.
pub trait CredentialSource {
    /// Must not fail; unconfigured sources return empty credentials.
    fn load(&self) -> Credentials;
}

impl<B: KeyringBackend> CredentialSource for CredentialStore<B> {
    fn load(&self) -> Credentials {
        CredentialStore::load(self)
    }
}
