//! Audio output devices.
//!
//! The scheduler only needs three things from a device: a way to open it, a
//! clock, and a way to hand it timed events. Dropping an opened output
//! releases the device before the drop returns.

use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use log::{debug, info, warn};
use rodio::{OutputStream, OutputStreamHandle, Source};

use crate::config::{sanitize_sample_rate, sanitize_volume};
use crate::error::PlaybackError;

use super::synth::{EventKind, SoundEvent};
use super::voices::{shimmer_source, TonalVoice};

/// Something that can be opened for playback.
pub trait OutputDevice: Send + Sync {
    fn open(&self) -> Result<Box<dyn AudioOutput>, PlaybackError>;
}

/// An opened device. Owned by exactly one playback session.
pub trait AudioOutput: Send {
    /// Current time on the device clock, in seconds.
    fn now(&self) -> f64;

    /// Queue `event` to sound at its start time on the device clock.
    fn submit(&mut self, event: &SoundEvent) -> Result<(), PlaybackError>;
}

/// The system default output, played through rodio.
#[derive(Debug, Clone)]
pub struct RodioDevice {
    sample_rate: u32,
    master_volume: f32,
}

impl RodioDevice {
    pub fn new(sample_rate: u32, master_volume: f32) -> Self {
        Self {
            sample_rate: sanitize_sample_rate(sample_rate),
            master_volume: sanitize_volume(master_volume),
        }
    }
}

enum DeviceCommand {
    /// Start `event` after `delay`; the outcome goes back on `reply`.
    Play {
        event: SoundEvent,
        delay: Duration,
        reply: Sender<Result<(), String>>,
    },
}

/// A thread owning a non-`Send` output stream, driven over a command channel.
/// Dropping it disconnects the channel and joins the thread, so the stream
/// is closed by the time the drop returns.
struct AudioThread {
    commands: Option<Sender<DeviceCommand>>,
    worker: Option<JoinHandle<()>>,
}

impl AudioThread {
    /// Spawn `body` and wait for it to report whether its stream opened.
    fn spawn<F>(body: F) -> Result<Self, PlaybackError>
    where
        F: FnOnce(Sender<Result<(), String>>, Receiver<DeviceCommand>) + Send + 'static,
    {
        let (ready_tx, ready_rx) = bounded::<Result<(), String>>(1);
        let (cmd_tx, cmd_rx) = unbounded::<DeviceCommand>();

        let worker = thread::Builder::new()
            .name("moodtune-audio".into())
            .spawn(move || body(ready_tx, cmd_rx))
            .map_err(|err| PlaybackError::DeviceUnavailable(err.to_string()))?;

        let audio = Self {
            commands: Some(cmd_tx),
            worker: Some(worker),
        };
        // on the error paths `audio` drops here and joins the finished worker
        match ready_rx.recv() {
            Ok(Ok(())) => Ok(audio),
            Ok(Err(msg)) => Err(PlaybackError::DeviceUnavailable(msg)),
            Err(_) => Err(PlaybackError::DeviceClosed),
        }
    }

    fn play(&self, event: SoundEvent, delay: Duration) -> Result<(), PlaybackError> {
        let commands = self.commands.as_ref().ok_or(PlaybackError::DeviceClosed)?;
        let (reply_tx, reply_rx) = bounded(1);
        commands
            .send(DeviceCommand::Play {
                event,
                delay,
                reply: reply_tx,
            })
            .map_err(|_| PlaybackError::DeviceClosed)?;
        match reply_rx.recv() {
            Ok(Ok(())) => Ok(()),
            Ok(Err(msg)) => Err(PlaybackError::Submit(msg)),
            Err(_) => Err(PlaybackError::DeviceClosed),
        }
    }
}

impl Drop for AudioThread {
    fn drop(&mut self) {
        drop(self.commands.take());
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("audio thread panicked while closing");
            }
        }
    }
}

impl OutputDevice for RodioDevice {
    fn open(&self) -> Result<Box<dyn AudioOutput>, PlaybackError> {
        let sample_rate = self.sample_rate;
        let volume = self.master_volume;

        let thread = AudioThread::spawn(move |ready, commands| {
            let (_stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(err) => {
                    let _ = ready.send(Err(err.to_string()));
                    return;
                }
            };
            let _ = ready.send(Ok(()));

            for cmd in commands.iter() {
                match cmd {
                    DeviceCommand::Play { event, delay, reply } => {
                        let result = play_event(&handle, event, delay, sample_rate, volume)
                            .map_err(|err| err.to_string());
                        let _ = reply.send(result);
                    }
                }
            }
            debug!("audio thread released output stream");
        })?;

        info!("audio output opened ({sample_rate} Hz, volume {volume:.2})");
        Ok(Box::new(RodioOutput {
            thread,
            opened_at: Instant::now(),
        }))
    }
}

fn play_event(
    handle: &OutputStreamHandle,
    event: SoundEvent,
    delay: Duration,
    sample_rate: u32,
    volume: f32,
) -> Result<(), rodio::PlayError> {
    match event.kind() {
        EventKind::Tonal => {
            let voice = TonalVoice::new(event, sample_rate).amplify(volume).delay(delay);
            handle.play_raw(voice.convert_samples())
        }
        EventKind::Shimmer => {
            let noise = shimmer_source(&event, sample_rate).amplify(volume).delay(delay);
            handle.play_raw(noise.convert_samples())
        }
    }
}

struct RodioOutput {
    thread: AudioThread,
    opened_at: Instant,
}

impl AudioOutput for RodioOutput {
    fn now(&self) -> f64 {
        self.opened_at.elapsed().as_secs_f64()
    }

    fn submit(&mut self, event: &SoundEvent) -> Result<(), PlaybackError> {
        let delay = Duration::from_secs_f64((event.start_time - self.now()).max(0.0));
        self.thread.play(event.clone(), delay)
    }
}
