//! Errors surfaced by playback.

#[derive(Debug, thiserror::Error)]
pub enum PlaybackError {
    #[error("audio output device unavailable: {0}")]
    DeviceUnavailable(String),
    #[error("audio device rejected event: {0}")]
    Submit(String),
    #[error("audio device thread has shut down")]
    DeviceClosed,
}
