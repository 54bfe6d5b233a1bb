//! Decoding of CF/COARDS time coordinates (`<unit> since <epoch>`).
//!
//! GrADS Data Servers publish the time axis as `days since 1-1-1 00:00:0.0` in the
//! standard calendar, where dates before 1582-10-15 are Julian. The epoch is
//! therefore converted from the Julian calendar when it predates the Gregorian
//! reform, which puts `1-1-1` two days before proleptic-Gregorian 0001-01-01.

use crate::dataset::error::DatasetError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};

/// First day of the Gregorian calendar in the standard calendar.
const GREGORIAN_REFORM: (i32, u32, u32) = (1582, 10, 15);

/// Julian Day Number of proleptic-Gregorian 0000-12-31, i.e. day 0 of chrono's
/// "days from CE" count.
const JDN_CE_OFFSET: i64 = 1_721_425;

/// Largest magnitude (in seconds) accepted for a decoded offset.
const MAX_OFFSET_SECONDS: f64 = 1.0e15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeStep {
    Days,
    Hours,
    Minutes,
    Seconds,
}

impl TimeStep {
    fn seconds(&self) -> f64 {
        match self {
            TimeStep::Days => 86_400.0,
            TimeStep::Hours => 3_600.0,
            TimeStep::Minutes => 60.0,
            TimeStep::Seconds => 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeUnits {
    step: TimeStep,
    epoch: NaiveDateTime,
    raw: String,
}

impl TimeUnits {
    /// Parses a units string such as `days since 1-1-1 00:00:0.0` or
    /// `hours since 2024-02-01T00:00:00Z`.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::InvalidTimeUnits`] for any other form.
    pub fn parse(units: &str) -> Result<Self, DatasetError> {
        let invalid = || DatasetError::InvalidTimeUnits(units.to_string());
        let lowered = units.trim().to_ascii_lowercase();
        let (step, reference) = lowered.split_once(" since ").ok_or_else(invalid)?;

        let step = match step.trim() {
            "days" | "day" | "d" => TimeStep::Days,
            "hours" | "hour" | "hrs" | "hr" | "h" => TimeStep::Hours,
            "minutes" | "minute" | "mins" | "min" => TimeStep::Minutes,
            "seconds" | "second" | "secs" | "sec" | "s" => TimeStep::Seconds,
            _ => return Err(invalid()),
        };

        let reference = reference
            .trim()
            .trim_end_matches("utc")
            .trim_end_matches('z')
            .trim();
        let (date_part, time_part) = match reference.split_once([' ', 't']) {
            Some((date, time)) => (date, Some(time.trim())),
            None => (reference, None),
        };

        let date = parse_epoch_date(date_part).ok_or_else(invalid)?;
        let time = match time_part {
            Some(time) if !time.is_empty() => parse_epoch_time(time).ok_or_else(invalid)?,
            _ => NaiveTime::MIN,
        };

        Ok(Self {
            step,
            epoch: date.and_time(time),
            raw: units.to_string(),
        })
    }

    pub fn step(&self) -> TimeStep {
        self.step
    }

    /// The epoch as a proleptic-Gregorian instant.
    pub fn epoch(&self) -> NaiveDateTime {
        self.epoch
    }

    /// Converts one coordinate value to a UTC instant, rounded to the nearest second.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::TimeOutOfRange`] for non-finite values or offsets
    /// chrono cannot represent.
    pub fn decode(&self, value: f64) -> Result<DateTime<Utc>, DatasetError> {
        let out_of_range = || DatasetError::TimeOutOfRange {
            value,
            units: self.raw.clone(),
        };
        let seconds = value * self.step.seconds();
        if !seconds.is_finite() || seconds.abs() > MAX_OFFSET_SECONDS {
            return Err(out_of_range());
        }
        let offset = TimeDelta::try_seconds(seconds.round() as i64).ok_or_else(out_of_range)?;
        self.epoch
            .checked_add_signed(offset)
            .map(|dt| dt.and_utc())
            .ok_or_else(out_of_range)
    }

    pub fn decode_all(&self, values: &[f64]) -> Result<Vec<DateTime<Utc>>, DatasetError> {
        values.iter().map(|v| self.decode(*v)).collect()
    }
}

/// Parses `1-1-1` or `2024-02-01`, interpreting dates before the Gregorian reform
/// as Julian calendar dates.
fn parse_epoch_date(text: &str) -> Option<NaiveDate> {
    let mut parts = text.trim().splitn(3, '-');
    let year: i32 = parts.next()?.trim().parse().ok()?;
    let month: u32 = parts.next()?.trim().parse().ok()?;
    let day: u32 = parts.next()?.trim().parse().ok()?;
    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return None;
    }
    if (year, month, day) < GREGORIAN_REFORM {
        julian_to_gregorian(year, month, day)
    } else {
        NaiveDate::from_ymd_opt(year, month, day)
    }
}

/// Parses `00:00:0.0`, `12:30` or `06:00:00`.
fn parse_epoch_time(text: &str) -> Option<NaiveTime> {
    let mut parts = text.split(':');
    let hour: u32 = parts.next()?.trim().parse().ok()?;
    let minute: u32 = parts.next().map(|m| m.trim().parse()).unwrap_or(Ok(0)).ok()?;
    let second: f64 = parts.next().map(|s| s.trim().parse()).unwrap_or(Ok(0.0)).ok()?;
    if parts.next().is_some() || !(0.0..60.0).contains(&second) {
        return None;
    }
    let whole = second.trunc() as u32;
    let millis = ((second - second.trunc()) * 1000.0).round() as u32;
    NaiveTime::from_hms_milli_opt(hour, minute, whole, millis.min(999))
}

/// Converts a Julian calendar date to the equivalent proleptic-Gregorian date
/// through its Julian Day Number.
fn julian_to_gregorian(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    let a = (14 - month as i64) / 12;
    let y = year as i64 + 4800 - a;
    let m = month as i64 + 12 * a - 3;
    let jdn = day as i64 + (153 * m + 2) / 5 + 365 * y + y / 4 - 32_083;
    NaiveDate::from_num_days_from_ce_opt(i32::try_from(jdn - JDN_CE_OFFSET).ok()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_grads_epoch_is_julian() {
        let units = TimeUnits::parse("days since 1-1-1 00:00:0.0").unwrap();
        assert_eq!(
            units.epoch(),
            NaiveDate::from_ymd_opt(0, 12, 30)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        );
    }

    #[test]
    fn test_decode_grads_hourly_axis() {
        let units = TimeUnits::parse("days since 1-1-1 00:00:0.0").unwrap();
        let decoded = units
            .decode_all(&[738918.0, 738918.0416666667, 738918.0833333333, 738919.0])
            .unwrap();
        assert_eq!(
            decoded,
            vec![
                Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2024, 2, 1, 1, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2024, 2, 1, 2, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2024, 2, 2, 0, 0, 0).unwrap(),
            ]
        );
    }

    #[test]
    fn test_decode_gregorian_epochs() {
        let units = TimeUnits::parse("hours since 2024-02-01T00:00:00Z").unwrap();
        assert_eq!(units.step(), TimeStep::Hours);
        assert_eq!(
            units.decode(6.0).unwrap(),
            Utc.with_ymd_and_hms(2024, 2, 1, 6, 0, 0).unwrap()
        );

        let units = TimeUnits::parse("seconds since 1970-01-01 00:00:00 UTC").unwrap();
        assert_eq!(
            units.decode(86_400.0).unwrap(),
            Utc.with_ymd_and_hms(1970, 1, 2, 0, 0, 0).unwrap()
        );

        let units = TimeUnits::parse("minutes since 2000-1-1").unwrap();
        assert_eq!(
            units.decode(-90.0).unwrap(),
            Utc.with_ymd_and_hms(1999, 12, 31, 22, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_rejects_unsupported_units() {
        for units in ["days", "fortnights since 2000-01-01", "days since yesterday", "hours since 2000-13-01"] {
            assert!(
                matches!(TimeUnits::parse(units), Err(DatasetError::InvalidTimeUnits(_))),
                "expected '{units}' to be rejected"
            );
        }
    }

    #[test]
    fn test_decode_rejects_non_finite_values() {
        let units = TimeUnits::parse("days since 1-1-1 00:00:0.0").unwrap();
        assert!(matches!(
            units.decode(f64::NAN),
            Err(DatasetError::TimeOutOfRange { .. })
        ));
        assert!(units.decode(1.0e300).is_err());
    }
}
