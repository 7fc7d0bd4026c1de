//! Configuration loader for moodtune.
//!
//! * Looks for `moodtune.toml` in the cwd unless overridden by `--config`.
//! * Provides defaults so the file is optional.
//!
//! Musical constants are fixed and deliberately absent here.

use log::warn;
use serde::Deserialize;
use std::fs;

use crate::audio::device::RodioDevice;

pub const DEFAULT_CONFIG_PATH: &str = "moodtune.toml";

/// Render rates outside this range fall back to the default.
pub const SAMPLE_RATE_RANGE: std::ops::RangeInclusive<u32> = 8_000..=192_000;

const DEFAULT_VOLUME: f32 = 0.7;
const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// Clamp a volume to `[0, 1]`; NaN and infinities become the default.
pub fn sanitize_volume(volume: f32) -> f32 {
    if volume.is_finite() {
        volume.clamp(0.0, 1.0)
    } else {
        DEFAULT_VOLUME
    }
}

/// Rates outside [`SAMPLE_RATE_RANGE`] become the default.
pub fn sanitize_sample_rate(rate: u32) -> u32 {
    if SAMPLE_RATE_RANGE.contains(&rate) {
        rate
    } else {
        warn!("sample rate {rate} out of range; using {DEFAULT_SAMPLE_RATE}");
        DEFAULT_SAMPLE_RATE
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Output gain (0.0 to 1.0), applied by the device.
    pub master_volume: f32,
    /// Render rate for oscillator and noise buffers.
    pub sample_rate: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            master_volume: DEFAULT_VOLUME,
            sample_rate: DEFAULT_SAMPLE_RATE,
        }
    }
}

impl Config {
    /// Load from a TOML file; fall back to defaults on any error.
    pub fn load(path: Option<&str>) -> Self {
        let p = path.unwrap_or(DEFAULT_CONFIG_PATH);
        match fs::read_to_string(p) {
            Ok(text) => Self::from_toml(&text).unwrap_or_else(|err| {
                warn!("ignoring {p}: {err}");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<Self>(text).map(Self::sanitized)
    }

    fn sanitized(mut self) -> Self {
        self.master_volume = sanitize_volume(self.master_volume);
        self.sample_rate = sanitize_sample_rate(self.sample_rate);
        self
    }

    pub fn device(&self) -> RodioDevice {
        RodioDevice::new(self.sample_rate, self.master_volume)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_default() {
        assert_eq!(Config::from_toml("").unwrap(), Config::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let cfg = Config::from_toml("master_volume = 0.25").unwrap();
        assert_eq!(cfg.master_volume, 0.25);
        assert_eq!(cfg.sample_rate, 44_100);
    }

    #[test]
    fn out_of_range_values_are_sanitized() {
        let cfg = Config::from_toml("master_volume = 3.0\nsample_rate = 0").unwrap();
        assert_eq!(cfg.master_volume, 1.0);
        assert_eq!(cfg.sample_rate, 44_100);
    }

    #[test]
    fn huge_sample_rate_falls_back() {
        let cfg = Config::from_toml("sample_rate = 4000000000").unwrap();
        assert_eq!(cfg.sample_rate, 44_100);
        let cfg = Config::from_toml("sample_rate = 4000").unwrap();
        assert_eq!(cfg.sample_rate, 44_100);
        let cfg = Config::from_toml("sample_rate = 192000").unwrap();
        assert_eq!(cfg.sample_rate, 192_000);
    }

    #[test]
    fn non_finite_volume_falls_back() {
        let cfg = Config::from_toml("master_volume = nan\nsample_rate = 4000000000").unwrap();
        assert_eq!(cfg.master_volume, 0.7);
        assert_eq!(cfg.sample_rate, 44_100);
        let cfg = Config::from_toml("master_volume = inf").unwrap();
        assert_eq!(cfg.master_volume, 0.7);
        assert_eq!(sanitize_volume(f32::NAN), 0.7);
        assert_eq!(sanitize_volume(-0.5), 0.0);
    }

    #[test]
    fn bad_toml_is_an_error_but_load_falls_back() {
        assert!(Config::from_toml("master_volume = \"loud\"").is_err());
        assert_eq!(Config::load(Some("/nonexistent/moodtune.toml")), Config::default());
    }
}
