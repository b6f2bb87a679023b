use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, warn};

/// One normalized topic in the knowledge base.
#[derive(Debug, Clone)]
pub struct KnowledgeEntry {
    pub topic: String,
    pub keywords: Vec<String>,
    pub info: String,
}

/// Raw on-disk shape: a topic may map to a bare answer string or to a full
/// keywords/info object. Normalized into `KnowledgeEntry` at load time.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawEntry {
    Full {
        #[serde(default)]
        keywords: Vec<String>,
        info: String,
    },
    Bare(String),
}

pub struct KnowledgeBase {
    entries: Vec<KnowledgeEntry>,
}

impl KnowledgeBase {
    /// Load the knowledge file once. A missing file degrades to an empty
    /// knowledge base (every lookup misses) rather than failing startup.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            warn!(path = %path.display(), "knowledge base file missing, lookups will always miss");
            return Ok(Self { entries: vec![] });
        }

        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read knowledge base {}", path.display()))?;
        // preserve_order keeps file order; lookup order is file order.
        let map: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&raw)
            .with_context(|| format!("invalid knowledge base JSON in {}", path.display()))?;

        let mut entries = Vec::with_capacity(map.len());
        for (topic, value) in map {
            match serde_json::from_value::<RawEntry>(value) {
                Ok(RawEntry::Full { keywords, info }) => {
                    entries.push(KnowledgeEntry {
                        topic,
                        keywords: keywords.into_iter().map(|k| k.to_lowercase()).collect(),
                        info,
                    });
                }
                // A bare string carries no keywords, so it can never match;
                // kept only so the topic remains visible for curation.
                Ok(RawEntry::Bare(info)) => {
                    entries.push(KnowledgeEntry {
                        topic,
                        keywords: vec![],
                        info,
                    });
                }
                Err(e) => {
                    warn!(topic, error = %e, "skipping malformed knowledge entry");
                }
            }
        }

        debug!(count = entries.len(), "knowledge base loaded");
        Ok(Self { entries })
    }

    pub fn from_entries(entries: Vec<KnowledgeEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Substring keyword match against the lowercased query. Entries are
    /// scanned in file order and the first keyword hit wins, so an earlier
    /// topic shadows any later topic sharing a keyword.
    pub fn lookup(&self, query: &str) -> Option<&str> {
        let q = query.to_lowercase();
        for entry in &self.entries {
            for kw in &entry.keywords {
                if !kw.is_empty() && q.contains(kw.as_str()) {
                    debug!(topic = %entry.topic, keyword = %kw, "knowledge base hit");
                    return Some(entry.info.as_str());
                }
            }
        }
        None
    }
}
