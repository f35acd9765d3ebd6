/// Added to a word's start time on click-to-seek so the closed-interval
/// lookup does not land on the previous word sharing the boundary.
pub const SEEK_EPSILON: f64 = 0.01;

/// Nudge past the editable segment start when a new task is loaded.
pub const TASK_START_NUDGE: f64 = 0.0001;

/// One display frame at 60 Hz.
pub const DEFAULT_FRAME_INTERVAL_MS: u64 = 16;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
