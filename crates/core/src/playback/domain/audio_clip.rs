use crate::shared::constants::TASK_START_NUDGE;
use crate::shared::range::TimeRange;
use crate::transcript::domain::task::Task;

/// The slice of a session's audio relevant to one task.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioClip {
    pub url: String,
    pub timing: TimeRange,
}

impl AudioClip {
    pub fn new(url: impl Into<String>, timing: TimeRange) -> Self {
        Self {
            url: url.into(),
            timing,
        }
    }

    /// Clip covering every word of `task`, context included.
    pub fn for_task(url: impl Into<String>, task: &Task) -> Self {
        Self::new(url, task.audio_span())
    }

    /// Media-fragment URL restricting playback to the clip.
    pub fn fragment_url(&self) -> String {
        format!("{}#t={},{}", self.url, self.timing.start, self.timing.end)
    }

    pub fn clamp(&self, time: f64) -> f64 {
        time.clamp(self.timing.start, self.timing.end.max(self.timing.start))
    }

    /// Where playback starts for `task`: just inside its editable segment.
    pub fn start_position(&self, task: &Task) -> f64 {
        self.clamp(task.text.editable.timing.start + TASK_START_NUDGE)
    }
}
