use std::time::Duration;

use tracing::{debug, warn};

const DEFAULT_BASE_URL: &str = "https://translate.googleapis.com/translate_a/single";

/// Internal to this module: translation failures never escape `translate`,
/// which degrades to returning the untranslated input.
#[derive(Debug, thiserror::Error)]
enum TranslationError {
    #[error("translation request failed: {0}")]
    Request(String),

    #[error("unexpected translation response: {0}")]
    Parse(String),
}

pub struct Translator {
    client: reqwest::Client,
    base_url: String,
}

impl Translator {
    pub fn new(request_timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("failed to create HTTP client: {}", e))?;

        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Translate `text` into `target`. Never fails: English targets and
    /// empty input short-circuit without a network call, and on service
    /// failure (after one retry with an explicit English source) the
    /// original text is returned unchanged.
    pub async fn translate(&self, text: &str, target: &str) -> String {
        if text.is_empty() {
            return text.to_string();
        }
        let target = target.trim().to_lowercase();
        if matches!(target.as_str(), "" | "en" | "eng" | "english") {
            return text.to_string();
        }

        match self.request(text, "auto", &target).await {
            Ok(translated) => translated,
            Err(e) => {
                warn!(target, error = %e, "translation with auto source failed, retrying with en");
                match self.request(text, "en", &target).await {
                    Ok(translated) => translated,
                    Err(e) => {
                        warn!(target, error = %e, "translation failed, returning original text");
                        text.to_string()
                    }
                }
            }
        }
    }

    async fn request(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, TranslationError> {
        let resp = self
            .client
            .get(&self.base_url)
            .query(&[
                ("client", "gtx"),
                ("sl", source),
                ("tl", target),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await
            .map_err(|e| TranslationError::Request(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(TranslationError::Request(format!(
                "service returned {}",
                status
            )));
        }

        let json: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| TranslationError::Parse(e.to_string()))?;

        let translated = collect_segments(&json)?;
        debug!(source, target, len = translated.len(), "translation complete");
        Ok(translated)
    }
}

/// The gtx endpoint answers with nested arrays; the translation is the
/// concatenation of segment[0] over response[0].
fn collect_segments(json: &serde_json::Value) -> Result<String, TranslationError> {
    let segments = json
        .get(0)
        .and_then(|v| v.as_array())
        .ok_or_else(|| TranslationError::Parse("missing segment array".to_string()))?;

    let mut out = String::new();
    for seg in segments {
        if let Some(piece) = seg.get(0).and_then(|v| v.as_str()) {
            out.push_str(piece);
        }
    }

    if out.is_empty() {
        return Err(TranslationError::Parse("empty translation".to_string()));
    }
    Ok(out)
}
