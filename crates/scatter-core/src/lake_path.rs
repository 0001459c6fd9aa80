//! Data-lake partition paths: `zone/domain/year=YYYY/month=MM/day=DD`.

use std::fmt;

use jiff::civil::Date;
use serde::Serialize;

use crate::error::CoreError;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PartitionPath(String);

impl PartitionPath {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PartitionPath {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parse `iso_date` and build the partition path for it.
pub fn build_path(zone: &str, domain: &str, iso_date: &str) -> Result<PartitionPath, CoreError> {
    let date = parse_iso_date(iso_date)?;
    build_path_for(zone, domain, date)
}

pub fn build_path_for(zone: &str, domain: &str, date: Date) -> Result<PartitionPath, CoreError> {
    validate_segment("zone", zone)?;
    validate_segment("domain", domain)?;
    Ok(PartitionPath(format!(
        "{zone}/{domain}/year={:04}/month={:02}/day={:02}",
        date.year(),
        date.month(),
        date.day()
    )))
}

/// Strict `YYYY-MM-DD`. Anything else, including datetimes and dates that
/// do not exist on the calendar, is rejected.
pub fn parse_iso_date(input: &str) -> Result<Date, CoreError> {
    let err = |reason: &str| CoreError::InvalidDate {
        input: input.to_string(),
        reason: reason.to_string(),
    };

    let bytes = input.as_bytes();
    let shape_ok = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
    if !shape_ok {
        return Err(err("expected YYYY-MM-DD"));
    }

    // Shape is checked, so these are all ASCII digit runs.
    let year: i16 = input[0..4].parse().map_err(|_| err("bad year"))?;
    let month: i8 = input[5..7].parse().map_err(|_| err("bad month"))?;
    let day: i8 = input[8..10].parse().map_err(|_| err("bad day"))?;

    Date::new(year, month, day).map_err(|e| err(&e.to_string()))
}

fn validate_segment(field: &'static str, value: &str) -> Result<(), CoreError> {
    if value.is_empty() || value.contains('/') || value == "." || value == ".." {
        return Err(CoreError::InvalidConfig(format!(
            "{field} must be a single non-empty path segment, got {value:?}"
        )));
    }
    Ok(())
}
