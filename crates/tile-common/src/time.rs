//! Capture-time parsing and output key formatting.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

use crate::error::{Result, TilerError};

/// Parse a capture timestamp from image metadata.
///
/// Accepts RFC 3339 (with fractional seconds and any offset), or a naive
/// `YYYY-MM-DDTHH:MM:SS[.f]` which is taken as UTC.
pub fn parse_capture_time(s: &str) -> Result<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(Utc.from_utc_datetime(&ndt));
        }
    }

    Err(TilerError::Data(format!("Invalid capture time: {}", s)))
}

/// Capture time as used in output keys: `%Y%m%d%H%M%S` in UTC.
pub fn format_capture_time(time: &DateTime<Utc>) -> String {
    time.format("%Y%m%d%H%M%S").to_string()
}

/// Key shared by the three artifacts of one tile: `{index:03}_{capture time}`.
pub fn tile_key(index: usize, capture_time: &DateTime<Utc>) -> String {
    format!("{:03}_{}", index, format_capture_time(capture_time))
}
