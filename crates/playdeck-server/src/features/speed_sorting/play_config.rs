//! Play configuration resolver
//!
//! Validates the runtime settings a client picks before playing. The
//! dataset itself is never touched here.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_COUNT_DOWN_SECS: u32 = 60;
pub const MAX_TIMER_DURATION_SECS: i64 = 3600;
pub const MIN_SPEED: i64 = 100;
pub const MAX_SPEED: i64 = 1000;
pub const MIN_LIVES: i64 = 0;
pub const MAX_LIVES: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimerMode {
    None,
    CountUp,
    CountDown,
}

/// Play request body as received.
///
/// Numbers stay wide and optional so that range and presence problems are
/// reported by [`resolve_play_config`] with the field name, instead of as a
/// generic JSON error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPlayConfig {
    #[serde(default)]
    pub timer_mode: Option<TimerMode>,
    #[serde(default)]
    pub timer_duration: Option<i64>,
    #[serde(default)]
    pub speed: Option<i64>,
    #[serde(default)]
    pub lives: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayConfig {
    pub timer_mode: TimerMode,
    /// Always present in responses; `null` unless counting down.
    pub timer_duration: Option<u32>,
    pub speed: u32,
    pub lives: u32,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlayConfigError {
    #[error("{field} is required")]
    Missing { field: &'static str },

    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
    },

    #[error("timer_duration is only allowed with timer_mode COUNT_DOWN")]
    DurationNotAllowed,
}

impl PlayConfigError {
    pub fn field(&self) -> &'static str {
        match self {
            PlayConfigError::Missing { field } | PlayConfigError::OutOfRange { field, .. } => {
                *field
            },
            PlayConfigError::DurationNotAllowed => "timer_duration",
        }
    }
}

fn in_range(field: &'static str, value: i64, min: i64, max: i64) -> Result<u32, PlayConfigError> {
    if value < min || value > max {
        return Err(PlayConfigError::OutOfRange { field, min, max });
    }
    u32::try_from(value).map_err(|_| PlayConfigError::OutOfRange { field, min, max })
}

pub fn resolve_play_config(raw: &RawPlayConfig) -> Result<PlayConfig, PlayConfigError> {
    let timer_mode = raw.timer_mode.ok_or(PlayConfigError::Missing {
        field: "timer_mode",
    })?;

    let timer_duration = match (timer_mode, raw.timer_duration) {
        (TimerMode::CountDown, None) => Some(DEFAULT_COUNT_DOWN_SECS),
        (TimerMode::CountDown, Some(secs)) => {
            Some(in_range("timer_duration", secs, 1, MAX_TIMER_DURATION_SECS)?)
        },
        (_, None) => None,
        (_, Some(_)) => return Err(PlayConfigError::DurationNotAllowed),
    };

    let speed = raw.speed.ok_or(PlayConfigError::Missing { field: "speed" })?;
    let speed = in_range("speed", speed, MIN_SPEED, MAX_SPEED)?;

    let lives = raw.lives.ok_or(PlayConfigError::Missing { field: "lives" })?;
    let lives = in_range("lives", lives, MIN_LIVES, MAX_LIVES)?;

    Ok(PlayConfig {
        timer_mode,
        timer_duration,
        speed,
        lives,
    })
}
