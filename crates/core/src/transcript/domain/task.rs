use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::range::TimeRange;

use super::word::Segment;

pub type TaskId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    Edit,
    Review,
}

impl std::fmt::Display for TaskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskType::Edit => write!(f, "edit"),
            TaskType::Review => write!(f, "review"),
        }
    }
}

/// Read-only context around the editable span.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TaskText {
    pub before: Segment,
    pub editable: Segment,
    pub after: Segment,
}

/// One unit of work handed to a worker.
#[derive(Clone, Debug, PartialEq)]
pub struct Task {
    pub id: TaskId,
    pub task_type: TaskType,
    pub text: TaskText,
    pub timing: TimeRange,
}

impl Task {
    /// Audio span covering every word of the task, context included.
    ///
    /// Falls back to the task timing when there are no words at all.
    pub fn audio_span(&self) -> TimeRange {
        let segments = [&self.text.before, &self.text.editable, &self.text.after];
        let first = segments.iter().find_map(|s| s.words.first());
        let last = segments.iter().rev().find_map(|s| s.words.last());
        match (first, last) {
            (Some(first), Some(last)) => TimeRange::new(first.timing.start, last.timing.end),
            _ => self.timing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::domain::word::Word;
    use approx::assert_relative_eq;

    fn task(before: Vec<Word>, editable: Vec<Word>, after: Vec<Word>) -> Task {
        Task {
            id: Uuid::new_v4(),
            task_type: TaskType::Edit,
            text: TaskText {
                before: Segment::from_words(before),
                editable: Segment::from_words(editable),
                after: Segment::from_words(after),
            },
            timing: TimeRange::new(0.0, 100.0),
        }
    }

    #[test]
    fn test_audio_span_includes_context() {
        let t = task(
            vec![Word::new("a", 1.0, 2.0)],
            vec![Word::new("b", 2.0, 3.0)],
            vec![Word::new("c", 3.0, 4.5)],
        );
        let span = t.audio_span();
        assert_relative_eq!(span.start, 1.0);
        assert_relative_eq!(span.end, 4.5);
    }

    #[test]
    fn test_audio_span_without_context() {
        let t = task(vec![], vec![Word::new("b", 2.0, 3.0)], vec![]);
        let span = t.audio_span();
        assert_relative_eq!(span.start, 2.0);
        assert_relative_eq!(span.end, 3.0);
    }

    #[test]
    fn test_audio_span_falls_back_to_task_timing() {
        let t = task(vec![], vec![], vec![]);
        assert_eq!(t.audio_span(), TimeRange::new(0.0, 100.0));
    }

    #[test]
    fn test_task_type_display() {
        assert_eq!(TaskType::Edit.to_string(), "edit");
        assert_eq!(TaskType::Review.to_string(), "review");
    }
}
