//! Two-state play/stop front end for the UI layer.

use std::sync::Arc;

use log::debug;

use crate::audio::device::OutputDevice;
use crate::audio::scheduler::{PlaybackScheduler, SessionId, SessionInfo};
use crate::error::PlaybackError;
use crate::pattern::Melody;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Playing,
}

/// What a `play()` call did.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayOutcome {
    Started(SessionInfo),
    /// A session was already playing; nothing changed.
    AlreadyPlaying,
}

/// Owns one scheduler; the device is released on every exit path,
/// including dropping the controller.
pub struct PlaybackController {
    scheduler: PlaybackScheduler,
}

impl PlaybackController {
    pub fn new(device: Arc<dyn OutputDevice>) -> Self {
        Self {
            scheduler: PlaybackScheduler::new(device),
        }
    }

    /// Like [`PlaybackController::new`], calling `hook` when a melody runs to its end.
    pub fn with_finished_hook<F>(device: Arc<dyn OutputDevice>, hook: F) -> Self
    where
        F: Fn(SessionId) + Send + Sync + 'static,
    {
        Self {
            scheduler: PlaybackScheduler::new(device).on_finished(hook),
        }
    }

    /// Idle → Playing with the melody for `text`. No-op while Playing.
    /// On error the controller stays Idle.
    pub fn play(&self, text: &str) -> Result<PlayOutcome, PlaybackError> {
        if self.is_playing() {
            debug!("play ignored: already playing");
            return Ok(PlayOutcome::AlreadyPlaying);
        }
        let melody = Melody::from_text(text);
        match self.scheduler.schedule(&melody.pattern)? {
            Some(info) => Ok(PlayOutcome::Started(info)),
            None => Ok(PlayOutcome::AlreadyPlaying),
        }
    }

    /// Playing → Idle. No-op while Idle.
    pub fn stop(&self) {
        self.scheduler.stop();
    }

    pub fn is_playing(&self) -> bool {
        self.scheduler.is_playing()
    }

    pub fn state(&self) -> PlaybackState {
        if self.is_playing() {
            PlaybackState::Playing
        } else {
            PlaybackState::Idle
        }
    }
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        self.stop();
    }
}
