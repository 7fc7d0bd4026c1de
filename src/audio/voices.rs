//! Sample-level rendering of sound events as rodio sources.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rodio::buffer::SamplesBuffer;
use rodio::Source;

use super::synth::{EventSource, SoundEvent, Waveform};

/// Triangle oscillator shaped by an event's envelope, sample by sample.
pub struct TonalVoice {
    event: SoundEvent,
    frequency: f64,
    sample_rate: u32,
    samples_generated: usize,
    total_samples: usize,
    phase: f64,
}

impl TonalVoice {
    pub fn new(event: SoundEvent, sample_rate: u32) -> Self {
        let frequency = match event.source {
            EventSource::Oscillator { frequency_hz, .. } => frequency_hz,
            EventSource::Noise { .. } => 0.0,
        };
        let total_samples = (event.duration().max(0.0) * f64::from(sample_rate)).round() as usize;
        Self {
            event,
            frequency,
            sample_rate,
            samples_generated: 0,
            total_samples,
            phase: 0.0,
        }
    }
}

/// Unit triangle for a phase in `[0, 1)`, starting at 0 and rising.
pub fn triangle(phase: f64) -> f64 {
    let p = phase.fract();
    if p < 0.25 {
        4.0 * p
    } else if p < 0.75 {
        2.0 - 4.0 * p
    } else {
        4.0 * p - 4.0
    }
}

impl Iterator for TonalVoice {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        if self.samples_generated >= self.total_samples {
            return None;
        }

        let t = self.event.start_time + self.samples_generated as f64 / f64::from(self.sample_rate);
        let wave = match self.event.source {
            EventSource::Oscillator { waveform: Waveform::Triangle, .. } => triangle(self.phase),
            EventSource::Noise { .. } => 0.0,
        };
        let sample = wave * self.event.amplitude_at(t);

        self.phase += self.frequency / f64::from(self.sample_rate);
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }

        self.samples_generated += 1;
        Some(sample as f32)
    }
}

impl Source for TonalVoice {
    fn current_frame_len(&self) -> Option<usize> {
        Some(self.total_samples - self.samples_generated)
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn total_duration(&self) -> Option<Duration> {
        Some(Duration::from_secs_f64(
            self.total_samples as f64 / f64::from(self.sample_rate),
        ))
    }
}

/// Noise burst for a shimmer event: `sample_rate * duration` samples,
/// each uniform in `[-amplitude, amplitude]`, with the gain stage applied.
pub fn render_shimmer(event: &SoundEvent, sample_rate: u32) -> Vec<f32> {
    let (amplitude, noise_seed) = match event.source {
        EventSource::Noise { amplitude, noise_seed } => (amplitude, noise_seed),
        EventSource::Oscillator { .. } => return Vec::new(),
    };
    let len = (event.duration().max(0.0) * f64::from(sample_rate)).round() as usize;
    let mut rng = StdRng::seed_from_u64(noise_seed);
    (0..len)
        .map(|i| {
            let t = event.start_time + i as f64 / f64::from(sample_rate);
            let noise = rng.gen_range(-1.0..=1.0) * amplitude;
            (noise * event.amplitude_at(t)) as f32
        })
        .collect()
}

pub fn shimmer_source(event: &SoundEvent, sample_rate: u32) -> SamplesBuffer<f32> {
    SamplesBuffer::new(1, sample_rate, render_shimmer(event, sample_rate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::synth::{synthesize, DECAY_FLOOR, SHIMMER_AMPLITUDE, SHIMMER_GAIN};
    use crate::pattern::Note;

    const SR: u32 = 8000;

    fn note() -> Note {
        Note {
            frequency_hz: 220.0,
            duration_seconds: 0.2,
            velocity: 0.8,
        }
    }

    #[test]
    fn triangle_shape() {
        assert_eq!(triangle(0.0), 0.0);
        assert_eq!(triangle(0.25), 1.0);
        assert_eq!(triangle(0.5), 0.0);
        assert_eq!(triangle(0.75), -1.0);
        assert!((triangle(0.125) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn tonal_voice_covers_release_tail() {
        let ev = synthesize(&note(), 1.0).tonal;
        let voice = TonalVoice::new(ev, SR);
        let samples: Vec<f32> = voice.collect();
        assert_eq!(samples.len(), 1760);
        assert_eq!(samples[0], 0.0);

        let peak = samples.iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert!(peak <= 0.8 + 1e-6);
        assert!(peak > 0.5);

        // past the note end only the decay floor is left
        let tail = &samples[1601..];
        assert!(tail.iter().all(|s| s.abs() as f64 <= DECAY_FLOOR + 1e-7));
    }

    #[test]
    fn tonal_voice_reports_duration() {
        let voice = TonalVoice::new(synthesize(&note(), 0.0).tonal, SR);
        assert_eq!(voice.channels(), 1);
        assert_eq!(voice.sample_rate(), SR);
        assert_eq!(voice.current_frame_len(), Some(1760));
    }

    #[test]
    fn shimmer_length_and_level() {
        let ev = synthesize(&note(), 0.0).shimmer;
        let samples = render_shimmer(&ev, SR);
        assert_eq!(samples.len(), 1600);
        let limit = (SHIMMER_AMPLITUDE * SHIMMER_GAIN) as f32 + 1e-6;
        assert!(samples.iter().all(|s| s.abs() <= limit));
        assert!(samples.iter().any(|s| *s != 0.0));
    }

    #[test]
    fn shimmer_is_reproducible() {
        let ev = synthesize(&note(), 0.3).shimmer;
        assert_eq!(render_shimmer(&ev, SR), render_shimmer(&ev, SR));
    }

    #[test]
    fn shimmer_ignores_tonal_events() {
        let ev = synthesize(&note(), 0.0).tonal;
        assert!(render_shimmer(&ev, SR).is_empty());
    }
}
