use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::error::{FormatError, Result};

/// `DD/Mon/YYYY:HH:mm:ss ±HHMM`, e.g. `10/Oct/2023:13:55:36 +0000`.
pub const INPUT_PATTERN: &str = "%d/%b/%Y:%H:%M:%S %z";

/// `YYYY-MM-DD HH:mm:ss AM/PM`. The hour stays on the 24-hour clock.
pub const DISPLAY_PATTERN: &str = "%Y-%m-%d %H:%M:%S %p";

/// Placeholder shown in place of an unparseable timestamp.
pub const INVALID_DATE: &str = "Invalid date";

/// Parse a link timestamp, keeping its offset.
///
/// Surrounding whitespace is ignored.
pub fn parse_timestamp(input: &str) -> Result<DateTime<FixedOffset>> {
    DateTime::parse_from_str(input.trim(), INPUT_PATTERN).map_err(|e| {
        FormatError::InvalidTimestamp {
            input: input.to_string(),
            reason: e.to_string(),
        }
    })
}

/// Parse a UTC offset written as `+HHMM`, `-HHMM`, `+HH:MM`, `Z`, or `UTC`.
pub fn parse_offset(input: &str) -> Result<FixedOffset> {
    let invalid = || FormatError::InvalidOffset(input.to_string());
    let s = input.trim();
    if s.eq_ignore_ascii_case("z") || s.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0).ok_or_else(invalid);
    }

    let (sign, rest) = match s.as_bytes().first() {
        Some(b'+') => (1, &s[1..]),
        Some(b'-') => (-1, &s[1..]),
        _ => return Err(invalid()),
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let hours: i32 = digits[..2].parse().map_err(|_| invalid())?;
    let minutes: i32 = digits[2..].parse().map_err(|_| invalid())?;
    if minutes >= 60 {
        return Err(invalid());
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}

/// Format a link timestamp for display in its own offset.
pub fn format_date(input: &str) -> Result<String> {
    Ok(parse_timestamp(input)?.format(DISPLAY_PATTERN).to_string())
}

/// Format a link timestamp for display in `offset`.
pub fn format_date_in(input: &str, offset: FixedOffset) -> Result<String> {
    Ok(parse_timestamp(input)?
        .with_timezone(&offset)
        .format(DISPLAY_PATTERN)
        .to_string())
}

/// Like [`format_date`], but yields [`INVALID_DATE`] instead of an error.
pub fn format_date_or_invalid(input: &str) -> String {
    format_date(input).unwrap_or_else(|_| INVALID_DATE.to_string())
}

/// Display settings for timestamp rendering.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Offset to render in, e.g. `"+0200"`. `None` keeps each timestamp's
    /// own offset.
    pub offset: Option<String>,
}

/// A timestamp formatter configured once and shared by views.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DateFormatter {
    offset: Option<FixedOffset>,
}

impl DateFormatter {
    /// A formatter that keeps each timestamp's own offset.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_offset(offset: FixedOffset) -> Self {
        Self {
            offset: Some(offset),
        }
    }

    pub fn from_config(config: &DisplayConfig) -> Result<Self> {
        match &config.offset {
            Some(raw) => Ok(Self::with_offset(parse_offset(raw)?)),
            None => Ok(Self::new()),
        }
    }

    pub fn offset(&self) -> Option<FixedOffset> {
        self.offset
    }

    pub fn format(&self, input: &str) -> Result<String> {
        match self.offset {
            Some(offset) => format_date_in(input, offset),
            None => format_date(input),
        }
    }

    pub fn format_or_invalid(&self, input: &str) -> String {
        self.format(input)
            .unwrap_or_else(|_| INVALID_DATE.to_string())
    }
}
