//! Image upload domain — public API.
//!
//! The workflow talks to the [`Uploader`] port; [`imagekit::ImageKitUploader`]
//! is the production implementation. One attempt per user action; retry is
//! a user decision, never automatic.

mod imagekit;

pub use imagekit::ImageKitUploader;

use crate::capture::CapturedImage;
use crate::config::Credentials;
use async_trait::async_trait;
use serde::Deserialize;

/// A successful upload: the public URL plus what the service stored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadResult {
    pub url: String,
    #[serde(rename = "fileId", default)]
    pub file_id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("credentials rejected by the image host: {0}")]
    Auth(String),

    #[error("network failure talking to the image host: {0}")]
    Network(String),

    #[error("image host returned {status}: {message}")]
    Service { status: u16, message: String },

    #[error("image host response had no URL")]
    InvalidResponse,
}

/// Port sending image bytes to the hosting service.
#[async_trait]
pub trait Uploader {
    /// Upload the image under the given filename using the supplied
    /// credentials. A single attempt; the caller owns retry policy.
    async fn upload(
        &self,
        image: &CapturedImage,
        file_name: &str,
        credentials: &Credentials,
    ) -> Result<UploadResult, UploadError>;
}
