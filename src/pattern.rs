//! Seed → 16-step melody.
//!
//! Each step is a closed-form function of the seed and its index, so steps
//! can be computed independently and in any order.

use std::fmt;

use crate::audio::scales::{root_frequency, transpose, DURATIONS, SCALE_SEMITONES};
use crate::seed::derive_seed;

/// Number of notes in every pattern.
pub const PATTERN_LEN: usize = 16;

/// Spacing factor between note onsets; 10% of each note's length is left as gap.
pub const GAP_FACTOR: f64 = 1.1;

/// Upper bound for note velocity.
pub const MAX_VELOCITY: f64 = 0.9;

/// One note of a generated melody.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Note {
    pub frequency_hz: f64,
    pub duration_seconds: f64,
    /// Peak amplitude, always in `[0, 0.9]`.
    pub velocity: f64,
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:>8.2} Hz  {:.2} s  vel {:.2}",
            self.frequency_hz, self.duration_seconds, self.velocity
        )
    }
}

/// An immutable 16-note melody and the seed it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    seed: u32,
    notes: [Note; PATTERN_LEN],
}

impl Pattern {
    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn notes(&self) -> &[Note; PATTERN_LEN] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Onset of each note relative to the start of playback: the prefix sum
    /// of `duration * 1.1` over the preceding notes.
    pub fn start_offsets(&self) -> [f64; PATTERN_LEN] {
        let mut offsets = [0.0; PATTERN_LEN];
        let mut t = 0.0;
        for (offset, note) in offsets.iter_mut().zip(self.notes.iter()) {
            *offset = t;
            t += note.duration_seconds * GAP_FACTOR;
        }
        offsets
    }

    /// Sum of `duration * 1.1` over all notes.
    pub fn total_duration(&self) -> f64 {
        self.notes
            .iter()
            .map(|n| n.duration_seconds * GAP_FACTOR)
            .sum()
    }
}

/// Generate the melody for `seed`.
pub fn generate_pattern(seed: u32) -> Pattern {
    let notes = std::array::from_fn(|i| note_at(seed, i));
    Pattern { seed, notes }
}

/// Step `i` of the pattern for `seed`.
pub fn note_at(seed: u32, i: usize) -> Note {
    let seed_wide = u64::from(seed);
    let step = i as u64;

    let degree = ((seed_wide + step * 7) % SCALE_SEMITONES.len() as u64) as usize;
    let frequency_hz = transpose(root_frequency(seed), SCALE_SEMITONES[degree]);

    let duration_seconds = DURATIONS[((seed_wide + step) % DURATIONS.len() as u64) as usize];

    let level = (seed >> (i % 8)) % 5;
    let velocity = (0.2 + f64::from(level) * 0.15).clamp(0.0, MAX_VELOCITY);

    Note {
        frequency_hz,
        duration_seconds,
        velocity,
    }
}

/// Seed and pattern for one mood phrase. Cheap to rebuild whenever the text changes.
#[derive(Debug, Clone, PartialEq)]
pub struct Melody {
    pub text: String,
    pub seed: u32,
    pub pattern: Pattern,
}

impl Melody {
    pub fn from_text(text: &str) -> Self {
        let seed = derive_seed(text);
        Self {
            text: text.to_owned(),
            seed,
            pattern: generate_pattern(seed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_bounds(p: &Pattern) {
        assert_eq!(p.len(), PATTERN_LEN);
        for n in p.notes() {
            assert!((0.0..=MAX_VELOCITY).contains(&n.velocity), "velocity {}", n.velocity);
            assert!(DURATIONS.contains(&n.duration_seconds));
            assert!(n.frequency_hz > 0.0);
        }
    }

    #[test]
    fn empty_text_starts_on_root() {
        let m = Melody::from_text("");
        assert_eq!(m.seed, 0);
        let first = m.pattern.notes()[0];
        assert_eq!(first.frequency_hz, 220.0);
        assert_eq!(first.duration_seconds, 0.15);
        assert!((first.velocity - 0.2).abs() < 1e-12);
    }

    #[test]
    fn seed_zero_walks_the_scale_by_sevens() {
        let p = generate_pattern(0);
        // (0 + i*7) mod 6 == i mod 6
        for (i, n) in p.notes().iter().enumerate() {
            let expected = transpose(220.0, SCALE_SEMITONES[i % 6]);
            assert_eq!(n.frequency_hz, expected);
            assert_eq!(n.duration_seconds, DURATIONS[i % 4]);
        }
    }

    #[test]
    fn extreme_seeds_stay_in_bounds() {
        for seed in [0, 1, 5, 6, 0x7fff_ffff, 0x8000_0000, u32::MAX - 1, u32::MAX] {
            assert_bounds(&generate_pattern(seed));
        }
    }

    #[test]
    fn velocity_uses_shifted_seed() {
        // seed 0b1011 = 11: i=0 -> 11%5=1, i=1 -> 5%5=0, i=2 -> 2, i=3 -> 1
        let p = generate_pattern(11);
        let v: Vec<f64> = p.notes()[..4].iter().map(|n| n.velocity).collect();
        let expected = [0.35, 0.2, 0.5, 0.35];
        for (got, want) in v.iter().zip(expected) {
            assert!((got - want).abs() < 1e-12, "{got} != {want}");
        }
    }

    #[test]
    fn happy_reproduces_exactly() {
        let a = Melody::from_text("happy");
        let b = Melody::from_text("happy");
        assert_eq!(a.seed, 99_047_136);
        assert_eq!(a, b);
        for (x, y) in a.pattern.notes().iter().zip(b.pattern.notes()) {
            assert_eq!(x.frequency_hz.to_bits(), y.frequency_hz.to_bits());
            assert_eq!(x.velocity.to_bits(), y.velocity.to_bits());
        }
        // 99_047_136 mod 6 == 0, so the root is 220 Hz
        assert_eq!(a.pattern.notes()[0].frequency_hz, 220.0);
        assert_bounds(&a.pattern);
    }

    #[test]
    fn steps_are_order_independent() {
        let seed = 0xdead_beef;
        let p = generate_pattern(seed);
        for i in (0..PATTERN_LEN).rev() {
            assert_eq!(note_at(seed, i), p.notes()[i]);
        }
    }

    #[test]
    fn offsets_are_prefix_sums() {
        let p = generate_pattern(42);
        let offsets = p.start_offsets();
        assert_eq!(offsets[0], 0.0);
        let mut acc = 0.0;
        for (i, n) in p.notes().iter().enumerate() {
            assert_eq!(offsets[i], acc);
            acc += n.duration_seconds * GAP_FACTOR;
        }
        for w in offsets.windows(2) {
            assert!(w[1] >= w[0]);
        }
        assert!((p.total_duration() - acc).abs() < 1e-12);
    }

    #[test]
    fn every_pattern_lasts_the_same() {
        // durations cycle through all four lengths four times
        let expected = 4.0 * (0.15 + 0.20 + 0.25 + 0.30) * GAP_FACTOR;
        for seed in [0, 3, 99_047_136, u32::MAX] {
            assert!((generate_pattern(seed).total_duration() - expected).abs() < 1e-9);
        }
    }
}
