use std::sync::Mutex;
use std::time::Instant;

use crate::playback::domain::playback_clock::PlaybackClock;

#[derive(Debug)]
struct ClockState {
    /// Playhead at the moment `resumed_at` was taken.
    origin: f64,
    resumed_at: Option<Instant>,
}

/// Wall-clock playhead standing in for an audio element: it advances in
/// real time while playing and stops at `end`.
#[derive(Debug)]
pub struct SystemClock {
    state: Mutex<ClockState>,
    end: f64,
}

impl SystemClock {
    pub fn new(start: f64, end: f64) -> Self {
        Self {
            state: Mutex::new(ClockState {
                origin: start,
                resumed_at: None,
            }),
            end,
        }
    }

    pub fn play(&self) {
        if let Ok(mut state) = self.state.lock() {
            if state.resumed_at.is_none() {
                state.resumed_at = Some(Instant::now());
            }
        }
    }

    pub fn pause(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.origin = self.position(&state);
            state.resumed_at = None;
        }
    }

    pub fn seek(&self, time: f64) {
        if let Ok(mut state) = self.state.lock() {
            state.origin = time.min(self.end);
            if state.resumed_at.is_some() {
                state.resumed_at = Some(Instant::now());
            }
        }
    }

    fn position(&self, state: &ClockState) -> f64 {
        let elapsed = state
            .resumed_at
            .map_or(0.0, |at| at.elapsed().as_secs_f64());
        (state.origin + elapsed).min(self.end)
    }
}

impl PlaybackClock for SystemClock {
    fn current_time(&self) -> f64 {
        self.state.lock().map_or(self.end, |state| self.position(&state))
    }

    fn is_playing(&self) -> bool {
        self.state
            .lock()
            .is_ok_and(|state| state.resumed_at.is_some() && self.position(&state) < self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_paused_clock_holds_position() {
        let clock = SystemClock::new(2.0, 10.0);
        assert!(!clock.is_playing());
        thread::sleep(Duration::from_millis(5));
        assert_relative_eq!(clock.current_time(), 2.0);
    }

    #[test]
    fn test_playing_clock_advances() {
        let clock = SystemClock::new(2.0, 10.0);
        clock.play();
        thread::sleep(Duration::from_millis(20));
        assert!(clock.is_playing());
        assert!(clock.current_time() > 2.0);
        clock.pause();
        let paused_at = clock.current_time();
        thread::sleep(Duration::from_millis(5));
        assert_relative_eq!(clock.current_time(), paused_at);
    }

    #[test]
    fn test_stops_at_end() {
        let clock = SystemClock::new(0.0, 0.01);
        clock.play();
        thread::sleep(Duration::from_millis(30));
        assert!(!clock.is_playing());
        assert_relative_eq!(clock.current_time(), 0.01);
    }

    #[test]
    fn test_seek_is_capped_at_end() {
        let clock = SystemClock::new(0.0, 5.0);
        clock.seek(3.0);
        assert_relative_eq!(clock.current_time(), 3.0);
        clock.seek(9.0);
        assert_relative_eq!(clock.current_time(), 5.0);
    }
}
