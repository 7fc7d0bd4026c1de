//! Fixed musical tables for seed-driven melodies.
//! Every pattern shares one six-degree minor scale and four note lengths;
//! only the root and the walk through them depend on the seed.

/// Semitone offsets of the scale degrees (minor pentatonic plus the octave).
pub const SCALE_SEMITONES: [u32; 6] = [0, 3, 5, 7, 10, 12];

/// Allowed note lengths in seconds.
pub const DURATIONS: [f64; 4] = [0.15, 0.20, 0.25, 0.30];

/// Lowest root frequency in Hz.
pub const BASE_ROOT_HZ: f64 = 220.0;

/// Root step between neighbouring seeds, in Hz.
pub const ROOT_STEP_HZ: f64 = 20.0;

/// Root frequency for a seed: `220 + (seed mod 6) * 20` Hz.
pub fn root_frequency(seed: u32) -> f64 {
    BASE_ROOT_HZ + f64::from(seed % SCALE_SEMITONES.len() as u32) * ROOT_STEP_HZ
}

/// Frequency of `semitones` above `root`, equal temperament.
pub fn transpose(root: f64, semitones: u32) -> f64 {
    root * 2.0_f64.powf(f64::from(semitones) / 12.0)
}
