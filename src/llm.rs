use std::time::Duration;

use tracing::{debug, warn};

use crate::config::Config;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// Service-unavailable class failure (503, UNAVAILABLE, timeout) —
    /// eligible for retry on the primary model.
    #[error("generation service unavailable: {0}")]
    Unavailable(String),

    #[error("generation request failed: {0}")]
    Request(String),

    #[error("model {0} returned an empty completion")]
    EmptyCompletion(String),
}

impl GenerationError {
    pub fn is_transient(&self) -> bool {
        matches!(self, GenerationError::Unavailable(_))
    }
}

pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    primary_model: String,
    backup_model: String,
    retries: u32,
    backoff: Duration,
}

impl GeminiClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("failed to create HTTP client: {}", e))?;

        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: config.api_key.clone(),
            primary_model: config.primary_model.clone(),
            backup_model: config.backup_model.clone(),
            retries: config.gen_retries,
            backoff: config.gen_backoff,
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            model
        )
    }

    /// Answer a query via the primary model, retrying on transient failures
    /// up to the configured budget, then falling back to one attempt on the
    /// backup model.
    pub async fn generate(&self, query: &str) -> Result<String, GenerationError> {
        let prompt = build_prompt(query);

        let mut attempt = 0;
        let primary_err = loop {
            match self.call_model(&self.primary_model, &prompt).await {
                Ok(text) => return Ok(text),
                Err(e) if e.is_transient() && attempt + 1 < self.retries => {
                    attempt += 1;
                    warn!(
                        model = %self.primary_model,
                        attempt,
                        error = %e,
                        "transient generation failure, backing off"
                    );
                    tokio::time::sleep(self.backoff).await;
                }
                Err(e) => break e,
            }
        };

        warn!(
            error = %primary_err,
            backup = %self.backup_model,
            "primary model exhausted, trying backup"
        );
        self.call_model(&self.backup_model, &prompt).await
    }

    async fn call_model(&self, model: &str, prompt: &str) -> Result<String, GenerationError> {
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
        });

        let resp = self
            .client
            .post(self.endpoint(model))
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GenerationError::Unavailable(format!("{} timed out", model))
                } else {
                    GenerationError::Request(e.to_string())
                }
            })?;

        let status = resp.status().as_u16();
        let text = resp
            .text()
            .await
            .map_err(|e| GenerationError::Request(e.to_string()))?;

        if !(200..300).contains(&status) {
            return Err(classify_status(model, status, &text));
        }

        let json: serde_json::Value = serde_json::from_str(&text)
            .map_err(|e| GenerationError::Request(format!("invalid JSON from {}: {}", model, e)))?;

        // Extract candidates[0].content.parts[0].text (handle null)
        let answer = json["candidates"]
            .get(0)
            .and_then(|c| c["content"]["parts"].get(0))
            .and_then(|p| p["text"].as_str())
            .unwrap_or("")
            .trim()
            .to_string();

        if answer.is_empty() {
            return Err(GenerationError::EmptyCompletion(model.to_string()));
        }

        debug!(model, answer_len = answer.len(), "generation complete");
        Ok(answer)
    }
}

/// Fixed instruction template embedding the raw query.
fn build_prompt(query: &str) -> String {
    format!(
        "You are a concise accurate health assistant. The user asked: {}\n\n\
         Provide reliable, high-level information about causes, prevention, and remedies\n\
         (if disease-related), in clear English. If the question is not health-related,\n\
         politely say so.",
        query
    )
}

fn classify_status(model: &str, status: u16, body: &str) -> GenerationError {
    if status == 503 || body.contains("UNAVAILABLE") {
        GenerationError::Unavailable(format!("{} returned {}", model, status))
    } else {
        let snippet: String = body.chars().take(200).collect();
        GenerationError::Request(format!("{} returned {}: {}", model, status, snippet))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::testutil::spawn_stub;

    fn client_for(base_url: &str, retries: u32) -> GeminiClient {
        GeminiClient {
            client: reqwest::Client::new(),
            base_url: base_url.to_string(),
            api_key: "test-key".to_string(),
            primary_model: "primary-model".to_string(),
            backup_model: "backup-model".to_string(),
            retries,
            backoff: Duration::from_millis(5),
        }
    }

    /// Model name from a recorded request path like
    /// "/models/primary-model:generateContent?key=test-key".
    fn model_of(path: &str) -> String {
        path.rsplit('/')
            .next()
            .and_then(|s| s.split(':').next())
            .unwrap_or("")
            .to_string()
    }

    const COMPLETION_JSON: &str =
        r#"{"candidates":[{"content":{"parts":[{"text":"backup answer"}]}}]}"#;

    #[tokio::test]
    async fn test_transient_failure_retries_primary_then_backup_once() {
        // Every call answers 503: with a retry budget of 2 the client makes
        // two primary attempts, then exactly one backup attempt.
        let (base, paths) = spawn_stub(vec![
            (503, "overloaded".to_string()),
            (503, "overloaded".to_string()),
            (503, "overloaded".to_string()),
        ])
        .await;
        let client = client_for(&base, 2);

        let err = client.generate("how to treat a cold").await.unwrap_err();

        assert!(err.is_transient());
        let models: Vec<String> = paths.lock().unwrap().iter().map(|p| model_of(p)).collect();
        assert_eq!(models, vec!["primary-model", "primary-model", "backup-model"]);
    }

    #[tokio::test]
    async fn test_backup_answer_recovers_exhausted_primary() {
        let (base, paths) = spawn_stub(vec![
            (503, "overloaded".to_string()),
            (503, "overloaded".to_string()),
            (200, COMPLETION_JSON.to_string()),
        ])
        .await;
        let client = client_for(&base, 2);

        let answer = client.generate("how to treat a cold").await.unwrap();

        assert_eq!(answer, "backup answer");
        let models: Vec<String> = paths.lock().unwrap().iter().map(|p| model_of(p)).collect();
        assert_eq!(models, vec!["primary-model", "primary-model", "backup-model"]);
    }

    #[tokio::test]
    async fn test_permanent_failure_skips_retries() {
        // A non-transient error spends no retry budget: one primary call,
        // straight to the single backup attempt.
        let (base, paths) = spawn_stub(vec![
            (400, "bad request".to_string()),
            (400, "bad request".to_string()),
        ])
        .await;
        let client = client_for(&base, 3);

        let err = client.generate("how to treat a cold").await.unwrap_err();

        assert!(!err.is_transient());
        let models: Vec<String> = paths.lock().unwrap().iter().map(|p| model_of(p)).collect();
        assert_eq!(models, vec!["primary-model", "backup-model"]);
    }

    #[test]
    fn test_prompt_embeds_raw_query() {
        let prompt = build_prompt("what causes diabetes");
        assert!(prompt.contains("what causes diabetes"));
        assert!(prompt.contains("health assistant"));
    }

    #[test]
    fn test_classify_503_is_transient() {
        let err = classify_status("gemini-2.5-flash", 503, "overloaded");
        assert!(err.is_transient());
    }

    #[test]
    fn test_classify_unavailable_body_is_transient() {
        let err = classify_status("gemini-2.5-flash", 429, r#"{"status":"UNAVAILABLE"}"#);
        assert!(err.is_transient());
    }

    #[test]
    fn test_classify_other_status_is_permanent() {
        let err = classify_status("gemini-2.5-flash", 400, "bad request");
        assert!(!err.is_transient());
    }

    #[test]
    fn test_empty_completion_is_permanent() {
        let err = GenerationError::EmptyCompletion("gemini-2.5-flash".to_string());
        assert!(!err.is_transient());
    }
}
