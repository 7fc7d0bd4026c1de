//! Session lifecycle: open a device, submit every event of a pattern up front,
//! and tear everything down on `stop()` or when the auto-stop timer fires.
//!
//! At most one session exists per scheduler. All state lives behind one
//! mutex so `stop()` and a later `schedule()` can never interleave.

use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use log::{debug, info, warn};

use crate::error::PlaybackError;
use crate::pattern::Pattern;

use super::device::{AudioOutput, OutputDevice};
use super::synth::{synthesize, SoundEvent};
use super::timer::AutoStopTimer;

/// Grace period after the last note before the session is torn down.
pub const AUTO_STOP_MARGIN_SECONDS: f64 = 0.2;

pub type SessionId = u64;

type FinishedHook = Arc<dyn Fn(SessionId) + Send + Sync>;

/// What a caller learns about a freshly scheduled session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionInfo {
    pub id: SessionId,
    pub seed: u32,
    /// Device clock time of the first note.
    pub start_time: f64,
    /// Onsets relative to `start_time`, one per note.
    pub note_offsets: Vec<f64>,
    pub total_duration: f64,
    pub auto_stop_after: Duration,
    pub event_count: usize,
}

/// The live, resource-owning side of one playback.
struct PlaybackSession {
    id: SessionId,
    output: Box<dyn AudioOutput>,
    events: Vec<SoundEvent>,
    timer: Option<AutoStopTimer>,
}

impl PlaybackSession {
    // Timer first so it cannot fire into a half-released session.
    fn release(mut self) {
        if let Some(mut timer) = self.timer.take() {
            timer.cancel();
        }
        self.events.clear();
        drop(self.output);
    }
}

#[derive(Default)]
struct SchedulerState {
    session: Option<PlaybackSession>,
    next_id: SessionId,
}

pub struct PlaybackScheduler {
    device: Arc<dyn OutputDevice>,
    state: Arc<Mutex<SchedulerState>>,
    on_finished: Option<FinishedHook>,
}

impl PlaybackScheduler {
    pub fn new(device: Arc<dyn OutputDevice>) -> Self {
        Self {
            device,
            state: Arc::new(Mutex::new(SchedulerState::default())),
            on_finished: None,
        }
    }

    /// Call `hook` with the session id whenever a session ends by running out.
    pub fn on_finished<F>(mut self, hook: F) -> Self
    where
        F: Fn(SessionId) + Send + Sync + 'static,
    {
        self.on_finished = Some(Arc::new(hook));
        self
    }

    pub fn is_playing(&self) -> bool {
        lock(&self.state).session.is_some()
    }

    pub fn active_session(&self) -> Option<SessionId> {
        lock(&self.state).session.as_ref().map(|s| s.id)
    }

    /// Events held by the active session, in submission order.
    #[cfg(test)]
    pub(crate) fn scheduled_events(&self) -> Vec<SoundEvent> {
        lock(&self.state)
            .session
            .as_ref()
            .map(|s| s.events.clone())
            .unwrap_or_default()
    }

    /// Start playing `pattern`. Returns `Ok(None)` without side effects when a
    /// session is already active. On error nothing is left behind.
    pub fn schedule(&self, pattern: &Pattern) -> Result<Option<SessionInfo>, PlaybackError> {
        let mut state = lock(&self.state);
        if let Some(active) = &state.session {
            debug!("session {} already playing; ignoring schedule", active.id);
            return Ok(None);
        }

        let mut output = self.device.open()?;
        let start_time = output.now();
        let offsets = pattern.start_offsets();

        let mut events = Vec::with_capacity(pattern.len() * 2);
        for (note, offset) in pattern.notes().iter().zip(offsets.iter()) {
            events.extend(synthesize(note, start_time + offset).into_array());
        }
        // `output` is dropped on the error path, releasing the device
        for event in &events {
            output.submit(event)?;
        }

        let id = state.next_id;
        state.next_id += 1;

        let total_duration = pattern.total_duration();
        let auto_stop_after = Duration::from_secs_f64(total_duration + AUTO_STOP_MARGIN_SECONDS);
        let timer = self.arm_auto_stop(id, auto_stop_after)?;

        debug!("submitted {} events for session {id}", events.len());
        info!(
            "session {id} playing seed {} for {total_duration:.2}s",
            pattern.seed()
        );

        let info = SessionInfo {
            id,
            seed: pattern.seed(),
            start_time,
            note_offsets: offsets.to_vec(),
            total_duration,
            auto_stop_after,
            event_count: events.len(),
        };
        state.session = Some(PlaybackSession {
            id,
            output,
            events,
            timer: Some(timer),
        });
        Ok(Some(info))
    }

    /// End the active session, if any. Returns whether one was stopped.
    pub fn stop(&self) -> bool {
        let mut state = lock(&self.state);
        match state.session.take() {
            Some(session) => {
                let id = session.id;
                // released while still holding the lock
                session.release();
                info!("session {id} stopped");
                true
            }
            None => {
                debug!("stop with no active session");
                false
            }
        }
    }

    fn arm_auto_stop(&self, id: SessionId, delay: Duration) -> Result<AutoStopTimer, PlaybackError> {
        let state: Weak<Mutex<SchedulerState>> = Arc::downgrade(&self.state);
        let hook = self.on_finished.clone();
        AutoStopTimer::arm(delay, move || {
            let Some(state) = state.upgrade() else {
                return;
            };
            // a stale timer must not end a newer session
            let finished = {
                let mut guard = lock(&state);
                if guard.session.as_ref().map(|s| s.id) == Some(id) {
                    if let Some(session) = guard.session.take() {
                        session.release();
                    }
                    true
                } else {
                    false
                }
            };
            if finished {
                info!("session {id} finished");
                if let Some(hook) = hook {
                    hook(id);
                }
            }
        })
        .map_err(|err| {
            warn!("could not arm auto-stop timer: {err}");
            PlaybackError::DeviceUnavailable(err.to_string())
        })
    }
}

impl Drop for PlaybackScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

fn lock(state: &Mutex<SchedulerState>) -> MutexGuard<'_, SchedulerState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
