//! Upload filename generation.
//!
//! Every capture gets a timestamped default name. When AI naming is on and
//! a `GEMINI_API_KEY` is configured, a short description of the screenshot
//! replaces the timestamp, mirroring the analyse/rename stage of the
//! original tool. Naming is best-effort: any failure falls back to the
//! default and never fails the workflow.

use crate::capture::CapturedImage;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::Local;
use regex::Regex;
use std::sync::LazyLock;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";
const GEMINI_MODEL: &str = "gemini-1.5-flash";
const GEMINI_API_KEY_VAR: &str = "GEMINI_API_KEY";
const DESCRIBE_PROMPT: &str =
    "Describe this screenshot in a few words that would make a good filename";
const MAX_SLUG_LEN: usize = 60;

static NON_SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("slug regex"));

/// The default upload name: `screenshot_YYYYMMDD_HHMMSS.png`.
pub fn timestamp_name() -> String {
    format!("screenshot_{}.png", Local::now().format("%Y%m%d_%H%M%S"))
}

/// Turn a free-form description into a safe `.png` filename, or `None`
/// when nothing usable remains.
pub fn slug_name(description: &str) -> Option<String> {
    let mut slug = NON_SLUG_RE
        .replace_all(&description.to_lowercase(), "_")
        .trim_matches('_')
        .to_string();
    if slug.is_empty() {
        return None;
    }
    if slug.len() > MAX_SLUG_LEN {
        slug.truncate(MAX_SLUG_LEN);
        let trimmed = slug.trim_end_matches('_').len();
        slug.truncate(trimmed);
    }
    Some(format!("{slug}.png"))
}

/// Port suggesting a descriptive filename for a capture.
///
/// `None` means "no suggestion"; the caller keeps the timestamped name.
#[async_trait]
pub trait Namer {
    async fn suggest_name(&self, image: &CapturedImage) -> Option<String>;
}

/// Gemini-vision namer. Constructed only when an API key is configured.
pub struct GeminiNamer {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
}

impl GeminiNamer {
    /// Build from `GEMINI_API_KEY`; `None` when the key is absent so the
    /// workflow skips the analysis stage entirely.
    pub fn from_env() -> Option<Self> {
        match std::env::var(GEMINI_API_KEY_VAR) {
            Ok(key) if !key.is_empty() => Some(Self::with_api_key(key)),
            _ => None,
        }
    }

    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: GEMINI_API_BASE.to_string(),
            api_key: api_key.into(),
        }
    }

    /// Point the namer at a different API base (test servers).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    async fn describe(&self, image: &CapturedImage) -> Option<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.api_base, GEMINI_MODEL, self.api_key
        );

        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({
                "contents": [{
                    "parts": [
                        {"text": DESCRIBE_PROMPT},
                        {"inline_data": {
                            "mime_type": "image/png",
                            "data": BASE64.encode(image.png_bytes()),
                        }},
                    ]
                }],
                "generationConfig": {
                    "temperature": 0.1,
                    "maxOutputTokens": 50,
                }
            }))
            .send()
            .await;

        let response = match response {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                log::warn!("[NAMING] Gemini returned {}", r.status());
                return None;
            }
            Err(e) => {
                log::warn!("[NAMING] Gemini request failed: {e}");
                return None;
            }
        };

        let body: serde_json::Value = response.json().await.ok()?;
        let text = body["candidates"][0]["content"]["parts"][0]["text"].as_str()?;
        let text = text.trim();
        if text.is_empty() {
            log::warn!("[NAMING] Gemini returned an empty description");
            return None;
        }
        Some(text.to_string())
    }
}

#[async_trait]
impl Namer for GeminiNamer {
    async fn suggest_name(&self, image: &CapturedImage) -> Option<String> {
        let description = self.describe(image).await?;
        let name = slug_name(&description);
        match &name {
            Some(name) => log::info!("[NAMING] Suggested filename: {name}"),
            None => log::warn!("[NAMING] Description produced no usable slug"),
        }
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_name_has_expected_shape() {
        let name = timestamp_name();
        assert!(name.starts_with("screenshot_"));
        assert!(name.ends_with(".png"));
        // screenshot_ + 8 date digits + _ + 6 time digits + .png
        assert_eq!(name.len(), "screenshot_".len() + 15 + ".png".len());
    }

    #[test]
    fn slug_name_sanitizes_description() {
        assert_eq!(
            slug_name("Login page, dark mode!").as_deref(),
            Some("login_page_dark_mode.png")
        );
        assert_eq!(
            slug_name("  Invoice #42 (March)  ").as_deref(),
            Some("invoice_42_march.png")
        );
    }

    #[test]
    fn slug_name_rejects_unusable_descriptions() {
        assert_eq!(slug_name(""), None);
        assert_eq!(slug_name("!!! ???"), None);
    }

    #[test]
    fn slug_name_truncates_long_descriptions() {
        let long = "word ".repeat(40);
        let name = slug_name(&long).unwrap();
        assert!(name.len() <= MAX_SLUG_LEN + ".png".len());
        assert!(!name.contains("_.png"));
    }
}
