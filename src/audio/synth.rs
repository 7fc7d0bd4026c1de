//! Note → timed sound events.
//!
//! Every note becomes two layers that share its time window: a triangle
//! pluck carrying the melody and a quiet white-noise shimmer underneath it.

use crate::pattern::Note;

use super::envelope::Envelope;

/// Attack time of the pluck, seconds.
pub const ATTACK_SECONDS: f64 = 0.01;
/// Level the pluck decays to by the end of the note.
pub const DECAY_FLOOR: f64 = 0.0001;
/// Extra time the oscillator keeps running after the note ends.
pub const RELEASE_TAIL_SECONDS: f64 = 0.02;
/// Fixed gain stage of the shimmer layer.
pub const SHIMMER_GAIN: f64 = 0.08;
/// Peak amplitude of each shimmer noise sample before the gain stage.
pub const SHIMMER_AMPLITUDE: f64 = 0.03;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Tonal,
    Shimmer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Triangle,
}

/// What actually produces the samples of an event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventSource {
    Oscillator { waveform: Waveform, frequency_hz: f64 },
    /// Uniform noise in `[-amplitude, amplitude]`, drawn from a generator seeded with `noise_seed`.
    Noise { amplitude: f64, noise_seed: u64 },
}

/// One scheduled sound on the device clock.
#[derive(Debug, Clone, PartialEq)]
pub struct SoundEvent {
    pub start_time: f64,
    pub stop_time: f64,
    /// Constant gain stage applied on top of the envelope.
    pub gain: f64,
    pub envelope: Envelope,
    pub source: EventSource,
}

impl SoundEvent {
    pub fn kind(&self) -> EventKind {
        match self.source {
            EventSource::Oscillator { .. } => EventKind::Tonal,
            EventSource::Noise { .. } => EventKind::Shimmer,
        }
    }

    pub fn duration(&self) -> f64 {
        self.stop_time - self.start_time
    }

    /// Overall amplitude at time `t`, excluding the source waveform itself.
    pub fn amplitude_at(&self, t: f64) -> f64 {
        if t < self.start_time || t >= self.stop_time {
            return 0.0;
        }
        self.gain * self.envelope.gain_at(t)
    }
}

/// The two layers of one note.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteEvents {
    pub tonal: SoundEvent,
    pub shimmer: SoundEvent,
}

impl NoteEvents {
    pub fn into_array(self) -> [SoundEvent; 2] {
        [self.tonal, self.shimmer]
    }
}

/// Build the pluck and shimmer for `note` starting at `start` on the device clock.
pub fn synthesize(note: &Note, start: f64) -> NoteEvents {
    let end = start + note.duration_seconds;

    let tonal = SoundEvent {
        start_time: start,
        stop_time: end + RELEASE_TAIL_SECONDS,
        gain: 1.0,
        envelope: Envelope::new()
            .set(start, 0.0)
            .linear_to(start + ATTACK_SECONDS, note.velocity)
            .exponential_to(end, DECAY_FLOOR),
        source: EventSource::Oscillator {
            waveform: Waveform::Triangle,
            frequency_hz: note.frequency_hz,
        },
    };

    let shimmer = SoundEvent {
        start_time: start,
        stop_time: end,
        gain: SHIMMER_GAIN,
        envelope: Envelope::new().set(start, 1.0),
        source: EventSource::Noise {
            amplitude: SHIMMER_AMPLITUDE,
            noise_seed: noise_seed(note, start),
        },
    };

    NoteEvents { tonal, shimmer }
}

// Same note at the same time always gets the same noise.
fn noise_seed(note: &Note, start: f64) -> u64 {
    note.frequency_hz.to_bits()
        ^ note.duration_seconds.to_bits().rotate_left(21)
        ^ start.to_bits().rotate_left(42)
}
