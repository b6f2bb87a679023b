use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::kb::KnowledgeBase;
use crate::lang;
use crate::llm::{GeminiClient, GenerationError};
use crate::transcript::{ChatTurn, Role, Transcript};
use crate::translate::Translator;

/// Fixed user-visible fallback when both models fail. Never a raw error.
pub const APOLOGY: &str = "Sorry, I cannot fetch this right now.";

/// Generation service boundary.
#[async_trait]
pub trait Generate: Send + Sync {
    async fn generate(&self, query: &str) -> Result<String, GenerationError>;
}

#[async_trait]
impl Generate for GeminiClient {
    async fn generate(&self, query: &str) -> Result<String, GenerationError> {
        GeminiClient::generate(self, query).await
    }
}

/// Translation service boundary. Infallible by contract: implementations
/// return the input unchanged when translation is impossible.
#[async_trait]
pub trait TranslateText: Send + Sync {
    async fn translate(&self, text: &str, target: &str) -> String;
}

#[async_trait]
impl TranslateText for Translator {
    async fn translate(&self, text: &str, target: &str) -> String {
        Translator::translate(self, text, target).await
    }
}

/// Provenance of a resolved answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerSource {
    KnowledgeBase,
    LanguageModel,
    ErrorFallback,
}

#[derive(Debug, Clone)]
pub struct ResolvedAnswer {
    pub english_text: String,
    pub localized_text: String,
    pub speech_locale: &'static str,
    pub source: AnswerSource,
}

/// The answer-resolution orchestrator: detect → resolve → localize →
/// compose speech locale → record. Stateless across queries; all state
/// lives in the injected services and the session transcript.
pub struct HealthPipeline {
    kb: Arc<KnowledgeBase>,
    generator: Arc<dyn Generate>,
    translator: Arc<dyn TranslateText>,
}

impl HealthPipeline {
    pub fn new(
        kb: Arc<KnowledgeBase>,
        generator: Arc<dyn Generate>,
        translator: Arc<dyn TranslateText>,
    ) -> Self {
        Self {
            kb,
            generator,
            translator,
        }
    }

    /// Resolve one query and append the user/bot turn pair to the
    /// transcript. Generation and translation failures degrade to textual
    /// fallbacks; nothing here returns an error.
    pub async fn respond(&self, query: &str, transcript: &Transcript) -> ResolvedAnswer {
        let detected = lang::detect(query);

        let (english_text, source) = match self.kb.lookup(query) {
            Some(info) => (info.to_string(), AnswerSource::KnowledgeBase),
            None => match self.generator.generate(query).await {
                Ok(text) => (text, AnswerSource::LanguageModel),
                Err(e) => {
                    warn!(error = %e, "generation failed, answering with apology");
                    (APOLOGY.to_string(), AnswerSource::ErrorFallback)
                }
            },
        };

        let localized_text = if detected == "en" {
            english_text.clone()
        } else {
            self.translator.translate(&english_text, detected).await
        };

        let speech_locale = lang::speech_locale(detected);

        info!(
            lang = detected,
            source = ?source,
            answer_len = localized_text.len(),
            "query resolved"
        );

        transcript
            .append_pair(
                ChatTurn::new(Role::User, query),
                ChatTurn::new(Role::Bot, localized_text.clone()),
            )
            .await;

        ResolvedAnswer {
            english_text,
            localized_text,
            speech_locale,
            source,
        }
    }
}
