//! Request parameter parsing
//!
//! Query strings arrive as loose text. They are turned into a [`Command`]
//! here, so the timer only ever sees typed, range-checked input.

use serde::Deserialize;

use crate::state::{Command, DEFAULT_ADJUST_SECONDS};

/// `?seconds=N` or `?time=H:MM:SS`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimeParams {
    pub seconds: Option<String>,
    pub time: Option<String>,
}

/// `?count=N`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CountParams {
    pub count: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("Provide seconds or time query param")]
    MissingTime,

    #[error("Provide count=N")]
    MissingCount,

    #[error("invalid number: {0:?}")]
    InvalidNumber(String),

    #[error("Invalid time format: {0:?}")]
    InvalidTime(String),

    #[error("seconds must be >= 0")]
    Negative,
}

impl TimeParams {
    /// Seconds from `seconds` if given, otherwise from `time`
    fn value(&self) -> Result<Option<i64>, CommandError> {
        match (&self.seconds, &self.time) {
            (Some(seconds), _) => parse_seconds(seconds).map(Some),
            (None, Some(time)) => parse_hms(time).map(Some),
            (None, None) => Ok(None),
        }
    }

    fn required(&self) -> Result<i64, CommandError> {
        self.value()?.ok_or(CommandError::MissingTime)
    }
}

fn non_negative(value: i64) -> Result<u64, CommandError> {
    u64::try_from(value).map_err(|_| CommandError::Negative)
}

/// Parse a plain seconds value. Decimals are truncated to whole seconds.
pub fn parse_seconds(raw: &str) -> Result<i64, CommandError> {
    let raw = raw.trim();
    if let Ok(value) = raw.parse::<i64>() {
        return Ok(value);
    }
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() && value.abs() < i64::MAX as f64 => {
            Ok(value.trunc() as i64)
        }
        _ => Err(CommandError::InvalidNumber(raw.to_string())),
    }
}

/// Parse `S`, `M:SS` or `H:MM:SS` into seconds
pub fn parse_hms(raw: &str) -> Result<i64, CommandError> {
    let invalid = || CommandError::InvalidTime(raw.trim().to_string());

    let parts = raw
        .trim()
        .split(':')
        .map(|part| part.trim().parse::<i64>().map_err(|_| invalid()))
        .collect::<Result<Vec<_>, _>>()?;

    let seconds = match parts.as_slice() {
        [s] => Some(*s),
        [m, s] => m.checked_mul(60).and_then(|m| m.checked_add(*s)),
        [h, m, s] => h
            .checked_mul(3600)
            .and_then(|h| h.checked_add(m.checked_mul(60)?))
            .and_then(|hm| hm.checked_add(*s)),
        _ => None,
    };
    seconds.ok_or_else(invalid)
}

/// `add_time` / `subtract_time`, one minute unless told otherwise
pub fn adjust_command(params: &TimeParams, add: bool) -> Result<Command, CommandError> {
    let seconds = match params.value()? {
        Some(value) => non_negative(value)?,
        None => DEFAULT_ADJUST_SECONDS,
    };
    Ok(if add {
        Command::AddTime(seconds)
    } else {
        Command::SubtractTime(seconds)
    })
}

pub fn set_remaining_command(params: &TimeParams) -> Result<Command, CommandError> {
    Ok(Command::SetRemaining(non_negative(params.required()?)?))
}

/// Range checks for the total happen in the timer itself.
pub fn set_total_command(params: &TimeParams) -> Result<Command, CommandError> {
    Ok(Command::SetTotal(params.required()?))
}

pub fn set_ends_command(params: &CountParams) -> Result<Command, CommandError> {
    let raw = params
        .count
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or(CommandError::MissingCount)?;
    let count = raw
        .parse::<i64>()
        .map_err(|_| CommandError::InvalidNumber(raw.to_string()))?;
    Ok(Command::SetNumSegments(count))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seconds(s: &str) -> TimeParams {
        TimeParams {
            seconds: Some(s.into()),
            time: None,
        }
    }

    fn time(t: &str) -> TimeParams {
        TimeParams {
            seconds: None,
            time: Some(t.into()),
        }
    }

    #[test]
    fn hms_forms() {
        assert_eq!(parse_hms("45"), Ok(45));
        assert_eq!(parse_hms("1:30"), Ok(90));
        assert_eq!(parse_hms("2:00:00"), Ok(7200));
        assert_eq!(parse_hms(" 0:05:07 "), Ok(307));
        assert!(matches!(parse_hms("1:2:3:4"), Err(CommandError::InvalidTime(_))));
        assert!(matches!(parse_hms("ab:cd"), Err(CommandError::InvalidTime(_))));
        assert!(matches!(parse_hms(""), Err(CommandError::InvalidTime(_))));
    }

    #[test]
    fn seconds_accept_decimals() {
        assert_eq!(parse_seconds("90"), Ok(90));
        assert_eq!(parse_seconds("90.9"), Ok(90));
        assert_eq!(parse_seconds("-3"), Ok(-3));
        assert!(matches!(parse_seconds("soon"), Err(CommandError::InvalidNumber(_))));
        assert!(matches!(parse_seconds("inf"), Err(CommandError::InvalidNumber(_))));
    }

    #[test]
    fn adjust_defaults_to_a_minute() {
        let none = TimeParams::default();
        assert_eq!(adjust_command(&none, true), Ok(Command::AddTime(60)));
        assert_eq!(adjust_command(&none, false), Ok(Command::SubtractTime(60)));
        assert_eq!(adjust_command(&seconds("15"), true), Ok(Command::AddTime(15)));
        assert_eq!(adjust_command(&time("1:00"), false), Ok(Command::SubtractTime(60)));
        assert_eq!(adjust_command(&seconds("-1"), true), Err(CommandError::Negative));
    }

    #[test]
    fn seconds_param_wins_over_time() {
        let both = TimeParams {
            seconds: Some("10".into()),
            time: Some("1:00:00".into()),
        };
        assert_eq!(set_remaining_command(&both), Ok(Command::SetRemaining(10)));
    }

    #[test]
    fn set_remaining_needs_a_value() {
        assert_eq!(
            set_remaining_command(&TimeParams::default()),
            Err(CommandError::MissingTime)
        );
        assert_eq!(set_remaining_command(&seconds("-5")), Err(CommandError::Negative));
        assert_eq!(
            set_remaining_command(&time("15:00")),
            Ok(Command::SetRemaining(900))
        );
    }

    #[test]
    fn set_total_passes_sign_through() {
        assert_eq!(set_total_command(&seconds("0")), Ok(Command::SetTotal(0)));
        assert_eq!(set_total_command(&time("1:30:00")), Ok(Command::SetTotal(5400)));
    }

    #[test]
    fn set_ends_parsing() {
        let count = |c: &str| CountParams {
            count: Some(c.into()),
        };
        assert_eq!(set_ends_command(&count("6")), Ok(Command::SetNumSegments(6)));
        assert_eq!(set_ends_command(&count("0")), Ok(Command::SetNumSegments(0)));
        assert_eq!(
            set_ends_command(&CountParams::default()),
            Err(CommandError::MissingCount)
        );
        assert_eq!(set_ends_command(&count("")), Err(CommandError::MissingCount));
        assert!(matches!(
            set_ends_command(&count("six")),
            Err(CommandError::InvalidNumber(_))
        ));
    }
}
