use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::config::Config;
use crate::kb::KnowledgeBase;
use crate::llm::GeminiClient;
use crate::pipeline::HealthPipeline;
use crate::transcript::Transcript;
use crate::translate::Translator;

/// Service context, constructed once at startup and read-only thereafter
/// (the transcript is the only mutable session state).
pub struct AppState {
    pub pipeline: Arc<HealthPipeline>,
    pub transcript: Arc<Transcript>,
}

impl AppState {
    pub fn new(config: &Config) -> Result<Self> {
        let kb = Arc::new(KnowledgeBase::load(&config.kb_path)?);
        info!(entries = kb.len(), path = %config.kb_path, "knowledge base ready");

        let gemini = Arc::new(GeminiClient::new(config)?);
        let translator = Arc::new(Translator::new(config.request_timeout)?);

        let pipeline = Arc::new(HealthPipeline::new(kb, gemini, translator));

        Ok(Self {
            pipeline,
            transcript: Arc::new(Transcript::new()),
        })
    }
}
