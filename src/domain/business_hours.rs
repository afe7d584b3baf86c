//! Business hours gating
//!
//! Decides whether the office is open at a given instant. The rule is a fixed
//! weekly calendar (days of week plus an opening window in whole hours)
//! evaluated in one configured time zone, never the caller's.

use super::shared::{DomainError, Result};
use chrono::{DateTime, Datelike, TimeZone, Timelike, Utc, Weekday};
use chrono_tz::Tz;

/// Weekly opening hours in a fixed local time zone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusinessHours {
    /// Zone the calendar is evaluated in
    pub time_zone: Tz,
    /// First open hour (inclusive)
    pub open_hour: u32,
    /// Closing hour (exclusive)
    pub close_hour: u32,
    /// Open days
    pub days: Vec<Weekday>,
}

impl BusinessHours {
    pub fn new(time_zone: Tz, open_hour: u32, close_hour: u32) -> Result<Self> {
        if open_hour >= close_hour || close_hour > 24 {
            return Err(DomainError::ConfigurationError(format!(
                "invalid business hours window {}:00-{}:00",
                open_hour, close_hour
            )));
        }

        Ok(Self {
            time_zone,
            open_hour,
            close_hour,
            days: vec![
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
            ],
        })
    }

    /// Parse an IANA zone name such as `America/New_York`
    pub fn parse_time_zone(name: &str) -> Result<Tz> {
        name.trim()
            .parse::<Tz>()
            .map_err(|_| DomainError::ConfigurationError(format!("unknown time zone '{}'", name)))
    }

    pub fn with_days(mut self, days: Vec<Weekday>) -> Self {
        self.days = days;
        self
    }

    /// Check whether the office is open at `now`
    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        let local = self.time_zone.from_utc_datetime(&now.naive_utc());
        if !self.days.contains(&local.weekday()) {
            return false;
        }

        let hour = local.hour();
        hour >= self.open_hour && hour < self.close_hour
    }

    /// Human-readable hours, e.g. "Monday through Friday, 8 AM to 5 PM Eastern Time"
    pub fn describe(&self) -> String {
        let days = match (self.days.first(), self.days.last()) {
            (Some(first), Some(last)) if first != last => {
                format!("{} through {}", weekday_name(*first), weekday_name(*last))
            }
            (Some(only), _) => weekday_name(*only).to_string(),
            _ => "no days".to_string(),
        };

        format!(
            "{}, {} to {} {}",
            days,
            hour_label(self.open_hour),
            hour_label(self.close_hour),
            zone_label(self.time_zone)
        )
    }
}

impl Default for BusinessHours {
    fn default() -> Self {
        Self {
            time_zone: chrono_tz::America::New_York,
            open_hour: 8,
            close_hour: 17,
            days: vec![
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
            ],
        }
    }
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

fn zone_label(tz: Tz) -> String {
    match tz.name() {
        "America/New_York" | "US/Eastern" => "Eastern Time".to_string(),
        "America/Chicago" | "US/Central" => "Central Time".to_string(),
        "America/Denver" | "US/Mountain" => "Mountain Time".to_string(),
        "America/Phoenix" | "US/Arizona" => "Arizona Time".to_string(),
        "America/Los_Angeles" | "US/Pacific" => "Pacific Time".to_string(),
        other => format!("{} time", other),
    }
}

fn hour_label(hour: u32) -> String {
    match hour {
        0 | 24 => "midnight".to_string(),
        12 => "noon".to_string(),
        h if h < 12 => format!("{} AM", h),
        h => format!("{} PM", h - 12),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    /// Build a UTC instant from a New York wall-clock time
    fn new_york(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        let naive = NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap();
        chrono_tz::America::New_York
            .from_local_datetime(&naive)
            .single()
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_open_during_weekday_hours() {
        let hours = BusinessHours::default();
        // 2024-03-12 is a Tuesday
        assert!(hours.is_open(new_york(2024, 3, 12, 10, 30)));
        assert!(hours.is_open(new_york(2024, 3, 12, 16, 59)));
    }

    #[test]
    fn test_boundaries() {
        let hours = BusinessHours::default();
        assert!(hours.is_open(new_york(2024, 3, 12, 8, 0)));
        assert!(!hours.is_open(new_york(2024, 3, 12, 7, 59)));
        assert!(!hours.is_open(new_york(2024, 3, 12, 17, 0)));
    }

    #[test]
    fn test_closed_on_weekend() {
        let hours = BusinessHours::default();
        // 2024-03-16 is a Saturday, 2024-03-17 a Sunday
        assert!(!hours.is_open(new_york(2024, 3, 16, 10, 0)));
        assert!(!hours.is_open(new_york(2024, 3, 17, 12, 0)));
    }

    #[test]
    fn test_every_hour_of_a_week() {
        let hours = BusinessHours::default();
        // 2024-03-11 is a Monday
        for day in 0..7u32 {
            for hour in 0..24u32 {
                let at = new_york(2024, 3, 11 + day, hour, 15);
                let expected = day < 5 && (8..17).contains(&hour);
                assert_eq!(hours.is_open(at), expected, "day {} hour {}", day, hour);
            }
        }
    }

    #[test]
    fn test_uses_configured_zone_not_utc() {
        let hours = BusinessHours::default();
        // 14:00 UTC on a Tuesday in winter is 09:00 in New York
        let utc = Utc.with_ymd_and_hms(2024, 1, 9, 14, 0, 0).unwrap();
        assert!(hours.is_open(utc));
        // 23:00 UTC on a Friday is 18:00 in New York
        let utc = Utc.with_ymd_and_hms(2024, 1, 12, 23, 0, 0).unwrap();
        assert!(!hours.is_open(utc));
        // 02:00 UTC Saturday is still Friday 21:00 in New York: closed by hour
        let utc = Utc.with_ymd_and_hms(2024, 1, 13, 2, 0, 0).unwrap();
        assert!(!hours.is_open(utc));
    }

    #[test]
    fn test_rejects_invalid_window() {
        assert!(BusinessHours::new(chrono_tz::UTC, 17, 8).is_err());
        assert!(BusinessHours::new(chrono_tz::UTC, 8, 8).is_err());
        assert!(BusinessHours::new(chrono_tz::UTC, 8, 25).is_err());
    }

    #[test]
    fn test_parse_time_zone() {
        assert_eq!(
            BusinessHours::parse_time_zone("America/New_York").unwrap(),
            chrono_tz::America::New_York
        );
        assert!(BusinessHours::parse_time_zone("Mars/Olympus_Mons").is_err());
    }

    #[test]
    fn test_describe() {
        let hours = BusinessHours::default();
        assert_eq!(
            hours.describe(),
            "Monday through Friday, 8 AM to 5 PM Eastern Time"
        );

        let utc = BusinessHours::new(chrono_tz::UTC, 9, 12).unwrap();
        assert_eq!(utc.describe(), "Monday through Friday, 9 AM to noon UTC time");
    }
}
