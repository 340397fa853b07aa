#![forbid(unsafe_code)]

//! Timing and threshold configuration.
//!
//! [`OverlayConfig::default`] carries the stock durations. With the
//! `policy-config` feature a config can also be read from TOML, where every
//! duration is written in milliseconds and missing keys keep their defaults:
//!
//! ```toml
//! camera_open_duration_ms = 240
//! camera_drop_threshold = 0.8
//! max_night_lux = 3.0
//! ```
//!
//! # Failure Modes
//!
//! - Unreadable file: [`ConfigError::Io`].
//! - Malformed TOML or unknown key: [`ConfigError::Parse`].
//! - Out-of-range value: [`ConfigError::Invalid`], reported by
//!   [`OverlayConfig::validate`] (also run by the loaders).

use std::time::Duration;

/// Error produced while loading or validating an [`OverlayConfig`].
#[derive(Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    Io(std::io::Error),
    /// The config text is not valid.
    Parse(String),
    /// A field holds a value outside its allowed range.
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read overlay config: {err}"),
            Self::Parse(msg) => write!(f, "invalid overlay config: {msg}"),
            Self::Invalid { field, reason } => write!(f, "invalid `{field}`: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

/// Durations and thresholds used by the orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayConfig {
    /// Tap-to-open (and programmatic close) camera animation.
    pub camera_open_duration: Duration,
    /// Remaining camera animation after a fling release.
    pub camera_fling_duration: Duration,
    /// Remaining camera animation after a slow drag release.
    pub camera_drop_duration: Duration,
    /// Drag factor at or above which a release opens the camera.
    pub camera_drop_threshold: f32,
    /// Wait between hiding the keyboard and opening the camera.
    pub keyboard_dismiss_delay: Duration,
    pub passcode_fade_duration: Duration,
    /// Delay before navigation regains focus after the lock hides.
    pub focus_restore_delay: Duration,
    pub night_mode_confirm_delay: Duration,
    /// Lux at or below which the environment counts as dark.
    pub max_night_lux: f32,
    pub progress_duration: Duration,
    /// Default modal reveal animation, for windows that do not pick their own.
    pub window_reveal_duration: Duration,
    pub sensor_latency_regular: Duration,
    /// Sensor latency while lux listeners are registered.
    pub sensor_latency_fast: Duration,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            camera_open_duration: Duration::from_millis(240),
            camera_fling_duration: Duration::from_millis(140),
            camera_drop_duration: Duration::from_millis(200),
            camera_drop_threshold: 0.8,
            keyboard_dismiss_delay: Duration::from_millis(100),
            passcode_fade_duration: Duration::from_millis(100),
            focus_restore_delay: Duration::from_millis(100),
            night_mode_confirm_delay: Duration::from_millis(1500),
            max_night_lux: 3.0,
            progress_duration: Duration::from_millis(220),
            window_reveal_duration: Duration::from_millis(250),
            sensor_latency_regular: Duration::from_millis(700),
            sensor_latency_fast: Duration::from_millis(90),
        }
    }
}

impl OverlayConfig {
    #[must_use]
    pub fn with_camera_open_duration(mut self, d: Duration) -> Self {
        self.camera_open_duration = d;
        self
    }

    #[must_use]
    pub fn with_camera_fling_duration(mut self, d: Duration) -> Self {
        self.camera_fling_duration = d;
        self
    }

    #[must_use]
    pub fn with_camera_drop_duration(mut self, d: Duration) -> Self {
        self.camera_drop_duration = d;
        self
    }

    #[must_use]
    pub fn with_camera_drop_threshold(mut self, threshold: f32) -> Self {
        self.camera_drop_threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_keyboard_dismiss_delay(mut self, d: Duration) -> Self {
        self.keyboard_dismiss_delay = d;
        self
    }

    #[must_use]
    pub fn with_passcode_fade_duration(mut self, d: Duration) -> Self {
        self.passcode_fade_duration = d;
        self
    }

    #[must_use]
    pub fn with_focus_restore_delay(mut self, d: Duration) -> Self {
        self.focus_restore_delay = d;
        self
    }

    #[must_use]
    pub fn with_night_mode_confirm_delay(mut self, d: Duration) -> Self {
        self.night_mode_confirm_delay = d;
        self
    }

    #[must_use]
    pub fn with_max_night_lux(mut self, lux: f32) -> Self {
        self.max_night_lux = lux;
        self
    }

    #[must_use]
    pub fn with_progress_duration(mut self, d: Duration) -> Self {
        self.progress_duration = d;
        self
    }

    #[must_use]
    pub fn with_window_reveal_duration(mut self, d: Duration) -> Self {
        self.window_reveal_duration = d;
        self
    }

    #[must_use]
    pub fn with_sensor_latency(mut self, regular: Duration, fast: Duration) -> Self {
        self.sensor_latency_regular = regular;
        self.sensor_latency_fast = fast;
        self
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.camera_drop_threshold) {
            return Err(ConfigError::Invalid {
                field: "camera_drop_threshold",
                reason: "must be within [0, 1]",
            });
        }
        if !self.max_night_lux.is_finite() || self.max_night_lux < 0.0 {
            return Err(ConfigError::Invalid {
                field: "max_night_lux",
                reason: "must be a non-negative number",
            });
        }
        Ok(())
    }
}

#[cfg(feature = "policy-config")]
mod file {
    use super::{ConfigError, OverlayConfig};
    use serde::Deserialize;
    use std::path::Path;
    use std::time::Duration;

    #[derive(Debug, Default, Deserialize)]
    #[serde(default, deny_unknown_fields)]
    struct OverlayConfigFile {
        camera_open_duration_ms: Option<u64>,
        camera_fling_duration_ms: Option<u64>,
        camera_drop_duration_ms: Option<u64>,
        camera_drop_threshold: Option<f32>,
        keyboard_dismiss_delay_ms: Option<u64>,
        passcode_fade_duration_ms: Option<u64>,
        focus_restore_delay_ms: Option<u64>,
        night_mode_confirm_delay_ms: Option<u64>,
        max_night_lux: Option<f32>,
        progress_duration_ms: Option<u64>,
        window_reveal_duration_ms: Option<u64>,
        sensor_latency_regular_ms: Option<u64>,
        sensor_latency_fast_ms: Option<u64>,
    }

    fn ms(slot: &mut Duration, value: Option<u64>) {
        if let Some(v) = value {
            *slot = Duration::from_millis(v);
        }
    }

    impl OverlayConfigFile {
        fn into_config(self) -> OverlayConfig {
            let mut c = OverlayConfig::default();
            ms(&mut c.camera_open_duration, self.camera_open_duration_ms);
            ms(&mut c.camera_fling_duration, self.camera_fling_duration_ms);
            ms(&mut c.camera_drop_duration, self.camera_drop_duration_ms);
            ms(&mut c.keyboard_dismiss_delay, self.keyboard_dismiss_delay_ms);
            ms(&mut c.passcode_fade_duration, self.passcode_fade_duration_ms);
            ms(&mut c.focus_restore_delay, self.focus_restore_delay_ms);
            ms(&mut c.night_mode_confirm_delay, self.night_mode_confirm_delay_ms);
            ms(&mut c.progress_duration, self.progress_duration_ms);
            ms(&mut c.window_reveal_duration, self.window_reveal_duration_ms);
            ms(&mut c.sensor_latency_regular, self.sensor_latency_regular_ms);
            ms(&mut c.sensor_latency_fast, self.sensor_latency_fast_ms);
            if let Some(v) = self.camera_drop_threshold {
                c.camera_drop_threshold = v;
            }
            if let Some(v) = self.max_night_lux {
                c.max_night_lux = v;
            }
            c
        }
    }

    impl OverlayConfig {
        /// Parse a TOML document. Missing keys keep their defaults.
        pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
            let file: OverlayConfigFile =
                toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
            let config = file.into_config();
            config.validate()?;
            Ok(config)
        }

        /// Read and parse a TOML file.
        pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
            let text = std::fs::read_to_string(path)?;
            Self::from_toml_str(&text)
        }
    }
}
