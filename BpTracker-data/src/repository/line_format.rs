//! Line format of the readings file.
//!
//! One reading per line:
//!
//! ```text
//! <systolic> <diastolic> <pulse> <YYYYMMDD.HHMM|0.0>
//! ```
//!
//! Blank lines and lines starting with `#` carry no data. Any other line
//! that does not match the format is collected as an [`InvalidLine`]
//! rather than failing the whole load.

use chrono::NaiveDateTime;
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use crate::models::blood_pressure::{BloodPressureReading, NO_TIMESTAMP};

/// Prefix marking a comment line
pub const COMMENT_PREFIX: char = '#';

/// chrono layout of a reading timestamp
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d.%H%M";

/// Why a data line was rejected
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum LineError {
    /// Wrong number of whitespace separated fields
    #[error("expected 4 fields, found {0}")]
    FieldCount(usize),

    /// One of the first three fields is not an unsigned integer
    #[error("{field} is not an integer: {value:?}")]
    NotAnInteger { field: &'static str, value: String },

    /// Fourth field is neither `0.0` nor `YYYYMMDD.HHMM`
    #[error("bad timestamp: {0:?}")]
    BadTimestamp(String),

    /// Line bytes are not valid UTF-8
    #[error("line is not valid UTF-8")]
    NotUtf8,
}

/// A rejected line of the data file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvalidLine {
    /// 1-based line number in the file
    pub line_number: usize,
    /// The line as it appears in the file, without the newline
    pub content: String,
    /// Why the line was rejected
    pub reason: LineError,
}

/// Result of loading a data file: the readings in file order plus any
/// lines that had to be skipped
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedReadings {
    pub readings: Vec<BloodPressureReading>,
    pub invalid: Vec<InvalidLine>,
}

/// Whether a line holds data at all
pub fn is_useful_line(line: &str) -> bool {
    let line = line.trim();
    !line.is_empty() && !line.starts_with(COMMENT_PREFIX)
}

/// Whether `value` is a fixed-width `YYYYMMDD.HHMM` naming a real minute
pub fn is_valid_timestamp(value: &str) -> bool {
    let bytes = value.as_bytes();
    let shaped = bytes.len() == 13
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| if i == 8 { *b == b'.' } else { b.is_ascii_digit() });

    shaped && NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT).is_ok()
}

fn parse_field(field: &'static str, value: &str) -> Result<u16, LineError> {
    value.parse::<u16>().map_err(|_| LineError::NotAnInteger {
        field,
        value: value.to_string(),
    })
}

/// Parse one data line into a reading
pub fn parse_line(line: &str) -> Result<BloodPressureReading, LineError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != 4 {
        return Err(LineError::FieldCount(fields.len()));
    }

    let systolic = parse_field("systolic", fields[0])?;
    let diastolic = parse_field("diastolic", fields[1])?;
    let pulse = parse_field("pulse", fields[2])?;

    let timestamp = fields[3];
    if timestamp != NO_TIMESTAMP && !is_valid_timestamp(timestamp) {
        return Err(LineError::BadTimestamp(timestamp.to_string()));
    }

    Ok(BloodPressureReading {
        systolic,
        diastolic,
        pulse,
        timestamp: timestamp.to_string(),
    })
}

/// Render a reading as a data line, newline included
pub fn format_line(reading: &BloodPressureReading) -> String {
    format!(
        "{} {} {} {}\n",
        reading.systolic, reading.diastolic, reading.pulse, reading.timestamp
    )
}

fn reject(loaded: &mut LoadedReadings, line_number: usize, content: String, reason: LineError) {
    warn!("Skipping line {}: {} ({})", line_number, content.trim(), reason);
    loaded.invalid.push(InvalidLine {
        line_number,
        content,
        reason,
    });
}

/// Parse the raw bytes of a data file. Lines are decoded one at a time so
/// an undecodable line is reported without losing the rest of the file.
pub fn parse_bytes(content: &[u8]) -> LoadedReadings {
    let mut loaded = LoadedReadings::default();

    for (index, raw) in content.split(|b| *b == b'\n').enumerate() {
        let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
        let line = match std::str::from_utf8(raw) {
            Ok(line) => line,
            Err(_) => {
                let content = String::from_utf8_lossy(raw).into_owned();
                reject(&mut loaded, index + 1, content, LineError::NotUtf8);
                continue;
            }
        };

        if !is_useful_line(line) {
            continue;
        }

        match parse_line(line) {
            Ok(reading) => loaded.readings.push(reading),
            Err(reason) => reject(&mut loaded, index + 1, line.to_string(), reason),
        }
    }

    loaded
}
