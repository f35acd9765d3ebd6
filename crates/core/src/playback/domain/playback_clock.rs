/// Domain interface for reading the audio element's playhead.
///
/// Shared between the owner and the sampling thread, hence `Send + Sync`.
pub trait PlaybackClock: Send + Sync {
    /// Playhead position in seconds.
    fn current_time(&self) -> f64;
    fn is_playing(&self) -> bool;
}
