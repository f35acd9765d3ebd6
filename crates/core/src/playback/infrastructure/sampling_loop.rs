use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};

use crate::playback::domain::playback_clock::PlaybackClock;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PlaybackMessage {
    /// Playhead sampled at one frame.
    Tick(f64),
    /// Playback paused or the loop was cancelled; no more ticks follow.
    Stopped,
}

/// Per-frame playhead sampler running on its own thread.
///
/// Only time values cross the channel; the receiving thread owns the
/// document and applies each tick to it.
pub struct SamplingLoop {
    receiver: Receiver<PlaybackMessage>,
    cancelled: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl SamplingLoop {
    pub fn spawn(clock: Arc<dyn PlaybackClock>, frame_interval: Duration) -> Self {
        let (tx, rx) = crossbeam_channel::unbounded::<PlaybackMessage>();
        let cancelled = Arc::new(AtomicBool::new(false));
        let cancelled_clone = cancelled.clone();

        let handle = thread::spawn(move || {
            run_sampling(&tx, &cancelled_clone, clock.as_ref(), frame_interval);
            let _ = tx.send(PlaybackMessage::Stopped);
        });

        Self {
            receiver: rx,
            cancelled,
            handle: Some(handle),
        }
    }

    pub fn receiver(&self) -> &Receiver<PlaybackMessage> {
        &self.receiver
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

impl Drop for SamplingLoop {
    fn drop(&mut self) {
        self.cancel();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Playback sampling thread panicked");
            }
        }
    }
}

fn run_sampling(
    tx: &Sender<PlaybackMessage>,
    cancelled: &AtomicBool,
    clock: &dyn PlaybackClock,
    frame_interval: Duration,
) {
    let mut frames = 0u64;
    while !cancelled.load(Ordering::Relaxed) && clock.is_playing() {
        if tx.send(PlaybackMessage::Tick(clock.current_time())).is_err() {
            break;
        }
        frames += 1;
        thread::sleep(frame_interval);
    }
    log::debug!("Playback sampling stopped after {frames} frames");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::infrastructure::manual_clock::ManualClock;
    use approx::assert_relative_eq;

    const FRAME: Duration = Duration::from_millis(1);
    const WAIT: Duration = Duration::from_secs(5);

    fn drain_until_stopped(sampler: &SamplingLoop) -> Vec<f64> {
        let mut ticks = Vec::new();
        loop {
            match sampler.receiver().recv_timeout(WAIT) {
                Ok(PlaybackMessage::Tick(t)) => ticks.push(t),
                Ok(PlaybackMessage::Stopped) => return ticks,
                Err(e) => panic!("sampler never stopped: {e}"),
            }
        }
    }

    #[test]
    fn test_ticks_carry_clock_time() {
        let clock = Arc::new(ManualClock::new(2.5));
        clock.play();
        let sampler = SamplingLoop::spawn(clock.clone(), FRAME);
        match sampler.receiver().recv_timeout(WAIT) {
            Ok(PlaybackMessage::Tick(t)) => assert_relative_eq!(t, 2.5),
            other => panic!("expected a tick, got {other:?}"),
        }
        clock.pause();
        drain_until_stopped(&sampler);
    }

    #[test]
    fn test_paused_clock_stops_immediately() {
        let clock = Arc::new(ManualClock::new(0.0));
        let sampler = SamplingLoop::spawn(clock, FRAME);
        assert!(drain_until_stopped(&sampler).is_empty());
    }

    #[test]
    fn test_cancel_stops_ticks() {
        let clock = Arc::new(ManualClock::new(0.0));
        clock.play();
        let sampler = SamplingLoop::spawn(clock, FRAME);
        sampler.cancel();
        assert!(sampler.is_cancelled());
        drain_until_stopped(&sampler);
        assert!(sampler
            .receiver()
            .recv_timeout(Duration::from_millis(20))
            .is_err());
    }

    #[test]
    fn test_drop_joins_running_loop() {
        let clock = Arc::new(ManualClock::new(0.0));
        clock.play();
        let sampler = SamplingLoop::spawn(clock.clone(), FRAME);
        drop(sampler);
        assert!(clock.is_playing());
    }
}
