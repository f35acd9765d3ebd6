use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Server-issued identity of an authenticated worker.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkerId(pub String);

impl WorkerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for WorkerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Session facts fetched once after authentication.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionStatus {
    pub worker_id: WorkerId,
    pub active: bool,
    pub started_at: DateTime<Utc>,
    pub glossary_modified_at: DateTime<Utc>,
    pub audio_url: String,
    #[serde(default)]
    pub attachments: Vec<serde_json::Value>,
}
