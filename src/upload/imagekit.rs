//! ImageKit server-side upload over `reqwest` multipart.
//!
//! Authentication is HTTP Basic with the private key as username and an
//! empty password, exactly what the upload API expects. The API base is
//! injectable so tests never touch the network.

use super::{UploadError, UploadResult, Uploader};
use crate::capture::CapturedImage;
use crate::config::Credentials;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use reqwest::multipart;
use serde::Deserialize;

const UPLOAD_API_BASE: &str = "https://upload.imagekit.io";
const UPLOAD_PATH: &str = "/api/v1/files/upload";
const UPLOAD_FOLDER: &str = "/screenshots";
const UPLOAD_TAGS: &str = "screenshot";
const RESPONSE_FIELDS: &str = "isPrivateFile,tags";

/// Error body ImageKit sends on non-2xx responses.
#[derive(Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
}

pub struct ImageKitUploader {
    client: reqwest::Client,
    api_base: String,
}

impl Default for ImageKitUploader {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageKitUploader {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: UPLOAD_API_BASE.to_string(),
        }
    }

    /// Point the uploader at a different API base (test servers).
    pub fn with_api_base(api_base: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: api_base.into(),
        }
    }

    fn upload_url(&self) -> String {
        format!("{}{}", self.api_base, UPLOAD_PATH)
    }
}

/// `Basic base64(private_key + ":")` — the upload API's auth scheme.
fn basic_auth_header(private_key: &str) -> String {
    format!("Basic {}", BASE64.encode(format!("{private_key}:")))
}

/// Map a non-2xx status plus body to the upload error taxonomy.
fn error_for_status(status: u16, body: &str) -> UploadError {
    let message = serde_json::from_str::<ApiError>(body)
        .map(|e| e.message)
        .ok()
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.trim().to_string());

    match status {
        401 | 403 => UploadError::Auth(message),
        _ => UploadError::Service { status, message },
    }
}

/// Parse a 2xx body into an [`UploadResult`]; a body without a URL is a
/// service bug we surface as `InvalidResponse`.
fn parse_success(body: &str) -> Result<UploadResult, UploadError> {
    let result: UploadResult =
        serde_json::from_str(body).map_err(|_| UploadError::InvalidResponse)?;
    if result.url.is_empty() {
        return Err(UploadError::InvalidResponse);
    }
    Ok(result)
}

#[async_trait]
impl Uploader for ImageKitUploader {
    async fn upload(
        &self,
        image: &CapturedImage,
        file_name: &str,
        credentials: &Credentials,
    ) -> Result<UploadResult, UploadError> {
        let start = std::time::Instant::now();
        log::info!(
            "[UPLOAD] Uploading {} ({} bytes) to {}",
            file_name,
            image.byte_len(),
            self.api_base
        );

        let part = multipart::Part::bytes(image.png_bytes().to_vec())
            .file_name(file_name.to_string())
            .mime_str("image/png")
            .map_err(|e| UploadError::Network(e.to_string()))?;

        let form = multipart::Form::new()
            .part("file", part)
            .text("fileName", file_name.to_string())
            .text("folder", UPLOAD_FOLDER)
            .text("tags", UPLOAD_TAGS)
            .text("responseFields", RESPONSE_FIELDS);

        let response = self
            .client
            .post(self.upload_url())
            .header(reqwest::header::AUTHORIZATION, basic_auth_header(&credentials.private_key))
            .multipart(form)
            .send()
            .await
            .map_err(|e| UploadError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| UploadError::Network(e.to_string()))?;

        if !status.is_success() {
            log::error!("[UPLOAD] API returned {status}: {body}");
            return Err(error_for_status(status.as_u16(), &body));
        }

        let result = parse_success(&body)?;
        log::info!(
            "[UPLOAD] Done in {}ms — {}",
            start.elapsed().as_millis(),
            result.url
        );
        Ok(result)
    }
}
