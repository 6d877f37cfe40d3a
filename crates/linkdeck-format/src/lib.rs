//! Timestamp display formatting for linkdeck.
//!
//! Link records carry access-log style timestamps such as
//! `10/Oct/2023:13:55:36 +0000`. Views render them as
//! `2023-10-10 13:55:36 PM`. This crate owns that conversion so every place
//! that renders a link shows the same thing.
//!
//! - [`format_date`] renders in the offset carried by the input
//! - [`format_date_in`] renders in an explicit display offset
//! - [`format_date_or_invalid`] never fails and yields [`INVALID_DATE`]
//! - [`DateFormatter`] bundles a [`DisplayConfig`] for reuse

pub mod date;
pub mod error;

pub use date::{
    format_date, format_date_in, format_date_or_invalid, parse_offset, parse_timestamp,
    DateFormatter, DisplayConfig, DISPLAY_PATTERN, INPUT_PATTERN, INVALID_DATE,
};
pub use error::{FormatError, Result};
