//! moodtune — deterministic melodies from mood phrases.
//!
//! A phrase is hashed to a 32-bit seed, the seed is expanded into a
//! 16-note pattern on a fixed scale, and each note is rendered as a
//! triangle pluck plus a faint noise shimmer scheduled on an audio device.
//! The first three steps are pure; only the scheduler and controller hold
//! state, and at most one playback session is alive per controller.
//!
//! # Example
//! ```
//! use moodtune::{derive_seed, generate_pattern};
//! let seed = derive_seed("happy");
//! let pattern = generate_pattern(seed);
//! assert_eq!(pattern.len(), 16);
//! assert_eq!(pattern, generate_pattern(derive_seed("happy")));
//! ```

pub mod audio;
pub mod config;
pub mod controller;
pub mod error;
pub mod pattern;
pub mod seed;

pub use config::Config;
pub use controller::{PlayOutcome, PlaybackController, PlaybackState};
pub use error::PlaybackError;
pub use pattern::{generate_pattern, Melody, Note, Pattern, PATTERN_LEN};
pub use seed::derive_seed;
