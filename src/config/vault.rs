//! Sealed-blob storage for credentials at rest.
//!
//! A random 256-bit key lives in the OS keyring (created on first save);
//! the credential payload is sealed with XChaCha20-Poly1305 and written to
//! disk as a small versioned JSON blob. The keyring sits behind a backend
//! trait so tests run against an in-memory store.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chacha20poly1305::aead::Aead;
use chacha20poly1305::{KeyInit, XChaCha20Poly1305, XNonce};
use rand::RngCore;
use serde::{Deserialize, Serialize};

const SERVICE_NAME: &str = "snapkit";
const KEY_NAME: &str = "credentials-key";
const KEY_LEN: usize = 32;
const NONCE_LEN: usize = 24;
const BLOB_VERSION: u8 = 1;

#[derive(Debug, thiserror::Error)]
pub enum VaultError {
    #[error("keyring access failed: {0}")]
    Keyring(String),

    #[error("keyring holds invalid key material")]
    InvalidKey,

    #[error("sealing credentials failed")]
    Seal,

    #[error("credential blob is corrupted or sealed with a different key")]
    Open,

    #[error("credential blob format unreadable: {0}")]
    Format(String),
}

/// On-disk shape of the sealed payload. Fields are base64.
#[derive(Serialize, Deserialize)]
struct SealedBlob {
    version: u8,
    nonce: String,
    ciphertext: String,
}

/// Minimal slice of the keyring API the vault needs.
pub trait KeyringBackend {
    fn get_secret(&self) -> Result<Vec<u8>, keyring::Error>;
    fn set_secret(&self, secret: &[u8]) -> Result<(), keyring::Error>;
    fn delete_secret(&self) -> Result<(), keyring::Error>;
}

/// The real OS keyring entry for this application.
pub struct SystemKeyring {
    entry: keyring::Entry,
}

impl SystemKeyring {
    pub fn new() -> Result<Self, VaultError> {
        let entry = keyring::Entry::new(SERVICE_NAME, KEY_NAME)
            .map_err(|e| VaultError::Keyring(e.to_string()))?;
        Ok(Self { entry })
    }
}

impl KeyringBackend for SystemKeyring {
    fn get_secret(&self) -> Result<Vec<u8>, keyring::Error> {
        self.entry.get_secret()
    }

    fn set_secret(&self, secret: &[u8]) -> Result<(), keyring::Error> {
        self.entry.set_secret(secret)
    }

    fn delete_secret(&self) -> Result<(), keyring::Error> {
        self.entry.delete_credential()
    }
}

/// Seals and opens credential payloads with a keyring-held key.
pub struct Vault<B: KeyringBackend = SystemKeyring> {
    backend: B,
}

impl Vault<SystemKeyring> {
    pub fn new() -> Result<Self, VaultError> {
        Ok(Self {
            backend: SystemKeyring::new()?,
        })
    }
}

impl<B: KeyringBackend> Vault<B> {
    pub fn with_backend(backend: B) -> Self {
        Self { backend }
    }

    /// Fetch the sealing key, creating and storing a fresh one if the
    /// keyring has no entry yet.
    fn load_or_create_key(&self) -> Result<[u8; KEY_LEN], VaultError> {
        match self.backend.get_secret() {
            Ok(secret) => secret.try_into().map_err(|_| VaultError::InvalidKey),
            Err(keyring::Error::NoEntry) => {
                let mut key = [0u8; KEY_LEN];
                rand::thread_rng().fill_bytes(&mut key);
                self.backend
                    .set_secret(&key)
                    .map_err(|e| VaultError::Keyring(e.to_string()))?;
                log::info!("[CONFIG] Created new credential sealing key in OS keyring");
                Ok(key)
            }
            Err(e) => Err(VaultError::Keyring(e.to_string())),
        }
    }

    /// Fetch the sealing key without creating one. `Ok(None)` when the
    /// keyring has no entry; nothing was ever saved.
    fn load_key(&self) -> Result<Option<[u8; KEY_LEN]>, VaultError> {
        match self.backend.get_secret() {
            Ok(secret) => secret
                .try_into()
                .map(Some)
                .map_err(|_| VaultError::InvalidKey),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(VaultError::Keyring(e.to_string())),
        }
    }

    /// Seal a payload and return the JSON blob to write to disk.
    pub fn seal(&self, plaintext: &[u8]) -> Result<String, VaultError> {
        let key = self.load_or_create_key()?;
        let cipher = XChaCha20Poly1305::new_from_slice(&key).map_err(|_| VaultError::InvalidKey)?;

        let mut nonce = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce);

        let ciphertext = cipher
            .encrypt(XNonce::from_slice(&nonce), plaintext)
            .map_err(|_| VaultError::Seal)?;

        let blob = SealedBlob {
            version: BLOB_VERSION,
            nonce: BASE64.encode(nonce),
            ciphertext: BASE64.encode(ciphertext),
        };
        serde_json::to_string(&blob).map_err(|e| VaultError::Format(e.to_string()))
    }

    /// Open a JSON blob produced by [`Vault::seal`].
    pub fn open(&self, blob: &str) -> Result<Vec<u8>, VaultError> {
        let blob: SealedBlob =
            serde_json::from_str(blob).map_err(|e| VaultError::Format(e.to_string()))?;
        if blob.version != BLOB_VERSION {
            return Err(VaultError::Format(format!(
                "unsupported blob version {}",
                blob.version
            )));
        }

        let nonce = BASE64
            .decode(&blob.nonce)
            .map_err(|e| VaultError::Format(e.to_string()))?;
        if nonce.len() != NONCE_LEN {
            return Err(VaultError::Format(format!(
                "nonce length {} (expected {})",
                nonce.len(),
                NONCE_LEN
            )));
        }
        let ciphertext = BASE64
            .decode(&blob.ciphertext)
            .map_err(|e| VaultError::Format(e.to_string()))?;

        let key = self.load_key()?.ok_or(VaultError::Open)?;
        let cipher = XChaCha20Poly1305::new_from_slice(&key).map_err(|_| VaultError::InvalidKey)?;
        cipher
            .decrypt(XNonce::from_slice(&nonce), ciphertext.as_ref())
            .map_err(|_| VaultError::Open)
    }

    /// Remove the sealing key from the keyring. Idempotent.
    pub fn discard_key(&self) -> Result<(), VaultError> {
        match self.backend.delete_secret() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(VaultError::Keyring(e.to_string())),
        }
    }
}
