use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::playback::domain::playback_clock::PlaybackClock;

/// A clock moved only by explicit calls. Used to replay sessions from the
/// terminal and to drive the sampling loop in tests.
#[derive(Debug, Default)]
pub struct ManualClock {
    time: Mutex<f64>,
    playing: AtomicBool,
}

impl ManualClock {
    pub fn new(time: f64) -> Self {
        Self {
            time: Mutex::new(time),
            playing: AtomicBool::new(false),
        }
    }

    pub fn set_time(&self, time: f64) {
        if let Ok(mut current) = self.time.lock() {
            *current = time;
        }
    }

    pub fn advance(&self, seconds: f64) {
        if let Ok(mut current) = self.time.lock() {
            *current += seconds;
        }
    }

    pub fn play(&self) {
        self.playing.store(true, Ordering::Relaxed);
    }

    pub fn pause(&self) {
        self.playing.store(false, Ordering::Relaxed);
    }
}

impl PlaybackClock for ManualClock {
    fn current_time(&self) -> f64 {
        self.time.lock().map_or(0.0, |t| *t)
    }

    fn is_playing(&self) -> bool {
        self.playing.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_manual_clock_moves_on_request() {
        let clock = ManualClock::new(1.0);
        assert!(!clock.is_playing());
        clock.advance(0.5);
        assert_relative_eq!(clock.current_time(), 1.5);
        clock.set_time(4.0);
        clock.play();
        assert!(clock.is_playing());
        assert_relative_eq!(clock.current_time(), 4.0);
        clock.pause();
        assert!(!clock.is_playing());
    }
}
