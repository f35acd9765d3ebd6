use serde::{Deserialize, Serialize};

use crate::session::domain::glossary::{Glossary, GlossaryTerm, TermFields};
use crate::session::domain::session_status::WorkerId;
use crate::shared::range::TimeRange;
use crate::transcript::domain::task::{Task, TaskId, TaskText, TaskType};
use crate::transcript::domain::word::{Segment, Word};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WordJson {
    pub word: String,
    pub start: f64,
    pub end: f64,
    #[serde(default)]
    pub speaker: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SegmentJson {
    pub start: f64,
    pub end: f64,
    pub words: Vec<WordJson>,
}

/// `body` is the editable segment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SegmentsJson {
    pub before: SegmentJson,
    pub after: SegmentJson,
    pub body: SegmentJson,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TaskJson {
    pub id: TaskId,
    #[serde(rename = "type")]
    pub task_type: TaskType,
    pub start: f64,
    pub end: f64,
    pub segments: SegmentsJson,
}

impl From<WordJson> for Word {
    fn from(json: WordJson) -> Self {
        Word {
            text: json.word,
            timing: TimeRange::new(json.start, json.end),
            speaker: json.speaker,
        }
    }
}

impl From<SegmentJson> for Segment {
    fn from(json: SegmentJson) -> Self {
        Segment::new(
            json.words.into_iter().map(Word::from).collect(),
            TimeRange::new(json.start, json.end),
        )
    }
}

impl From<TaskJson> for Task {
    fn from(json: TaskJson) -> Self {
        Task {
            id: json.id,
            task_type: json.task_type,
            text: TaskText {
                before: json.segments.before.into(),
                editable: json.segments.body.into(),
                after: json.segments.after.into(),
            },
            timing: TimeRange::new(json.start, json.end),
        }
    }
}

pub fn decode_task(body: &str) -> Result<Task, serde_json::Error> {
    serde_json::from_str::<TaskJson>(body).map(Task::from)
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PublishBody {
    pub start: f64,
    pub end: f64,
    pub words: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PublishSegments {
    pub body: PublishBody,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PublishPayload {
    pub task_id: TaskId,
    pub worker_id: WorkerId,
    pub segments: PublishSegments,
}

impl PublishPayload {
    pub fn new(task: &Task, words: &[String], worker_id: &WorkerId) -> Self {
        let timing = task.text.editable.timing;
        Self {
            task_id: task.id,
            worker_id: worker_id.clone(),
            segments: PublishSegments {
                body: PublishBody {
                    start: timing.start,
                    end: timing.end,
                    words: words.to_vec(),
                },
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuthRequest {
    pub task_types: Vec<TaskType>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub id: WorkerId,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewTaskRequest {
    pub worker_id: WorkerId,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GlossaryTermJson {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GlossaryJson {
    pub gloss: Vec<GlossaryTermJson>,
}

impl From<GlossaryTermJson> for GlossaryTerm {
    fn from(json: GlossaryTermJson) -> Self {
        GlossaryTerm {
            id: json.id,
            text: json.text,
            fields: TermFields {
                comment: json.comment,
                url: json.url,
            },
        }
    }
}

impl From<GlossaryJson> for Glossary {
    fn from(json: GlossaryJson) -> Self {
        Glossary::new(json.gloss.into_iter().map(GlossaryTerm::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use serde_json::json;

    const TASK: &str = r#"{
        "id": "3f0b4c1e-8a55-4d0b-9a43-0c6a1f6b2d11",
        "type": "edit",
        "start": 10.0,
        "end": 14.0,
        "segments": {
            "before": {"start": 10.0, "end": 11.0, "words": [
                {"word": "so", "start": 10.0, "end": 11.0, "speaker": "A"}
            ]},
            "body": {"start": 11.0, "end": 13.0, "words": [
                {"word": "the", "start": 11.0, "end": 12.0, "speaker": "B"},
                {"word": "cat", "start": 12.0, "end": 13.0, "speaker": null}
            ]},
            "after": {"start": 13.0, "end": 14.0, "words": []}
        }
    }"#;

    #[test]
    fn test_decode_task_maps_body_to_editable() {
        let task = decode_task(TASK).unwrap();
        assert_eq!(task.task_type, TaskType::Edit);
        assert_eq!(task.text.editable.words.len(), 2);
        assert_eq!(task.text.editable.words[0].text, "the");
        assert_eq!(task.text.editable.words[0].speaker.as_deref(), Some("B"));
        assert_eq!(task.text.editable.words[1].speaker, None);
        assert_relative_eq!(task.text.editable.timing.start, 11.0);
        assert_eq!(task.text.before.words[0].text, "so");
        assert!(task.text.after.is_empty());
        assert_relative_eq!(task.timing.end, 14.0);
    }

    #[test]
    fn test_decode_task_missing_field_fails() {
        let broken = TASK.replace("\"segments\"", "\"segs\"");
        assert!(decode_task(&broken).is_err());
    }

    #[test]
    fn test_decode_task_unknown_type_fails() {
        let broken = TASK.replace("\"edit\"", "\"transcribe\"");
        assert!(decode_task(&broken).is_err());
    }

    #[test]
    fn test_publish_payload_shape() {
        let task = decode_task(TASK).unwrap();
        let words = vec!["the".to_string(), "cats".to_string()];
        let payload = PublishPayload::new(&task, &words, &WorkerId::new("w-1"));
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "task_id": "3f0b4c1e-8a55-4d0b-9a43-0c6a1f6b2d11",
                "worker_id": "w-1",
                "segments": {"body": {"start": 11.0, "end": 13.0, "words": ["the", "cats"]}}
            })
        );
    }

    #[test]
    fn test_glossary_json_to_domain() {
        let json: GlossaryJson = serde_json::from_value(json!({
            "gloss": [
                {"id": "1", "text": "Rust", "comment": "language"},
                {"id": "2", "text": "Tokio", "url": "https://tokio.rs"}
            ]
        }))
        .unwrap();
        let glossary = Glossary::from(json);
        assert_eq!(glossary.len(), 2);
        assert_eq!(glossary.terms[0].fields.comment.as_deref(), Some("language"));
        assert_eq!(glossary.terms[1].fields.url.as_deref(), Some("https://tokio.rs"));
    }

    #[test]
    fn test_auth_request_uses_lowercase_types() {
        let body = AuthRequest {
            task_types: vec![TaskType::Edit, TaskType::Review],
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"task_types": ["edit", "review"]})
        );
    }
}
