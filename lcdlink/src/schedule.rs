//! Clock-window auto-connect policy.
//!
//! Optional: when disabled (the default) the link is always wanted. When
//! enabled, weekends keep the display on all day and weekdays only within
//! the configured hour window — the display sits next to a desk that is
//! unattended during working hours.

use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};
use serde::Deserialize;

/// Auto-connect window configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleConfig {
    /// Whether the policy is applied at all.
    #[serde(default)]
    pub enabled: bool,
    /// First weekday hour (inclusive) the link is wanted.
    #[serde(default = "default_start_hour")]
    pub weekday_start_hour: u32,
    /// Last weekday hour (exclusive) the link is wanted, up to 24.
    #[serde(default = "default_end_hour")]
    pub weekday_end_hour: u32,
    /// Keep the link up all day on Saturday and Sunday.
    #[serde(default = "default_weekend_on")]
    pub weekend_always_on: bool,
}

fn default_start_hour() -> u32 {
    18
}

fn default_end_hour() -> u32 {
    24
}

fn default_weekend_on() -> bool {
    true
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            weekday_start_hour: default_start_hour(),
            weekday_end_hour: default_end_hour(),
            weekend_always_on: default_weekend_on(),
        }
    }
}

impl ScheduleConfig {
    /// Validate hour bounds.
    pub fn validate(&self) -> Result<(), String> {
        if self.weekday_start_hour > 23 {
            return Err(format!(
                "schedule: weekday_start_hour {} out of range [0, 23]",
                self.weekday_start_hour
            ));
        }
        if self.weekday_end_hour > 24 {
            return Err(format!(
                "schedule: weekday_end_hour {} out of range [0, 24]",
                self.weekday_end_hour
            ));
        }
        if self.weekday_start_hour >= self.weekday_end_hour {
            return Err(format!(
                "schedule: empty weekday window [{}, {})",
                self.weekday_start_hour, self.weekday_end_hour
            ));
        }
        Ok(())
    }

    /// Whether the link should be up at the given instant.
    pub fn should_connect(&self, now: NaiveDateTime) -> bool {
        if !self.enabled {
            return true;
        }

        if matches!(now.weekday(), Weekday::Sat | Weekday::Sun) && self.weekend_always_on {
            return true;
        }

        let hour = now.hour();
        self.weekday_start_hour <= hour && hour < self.weekday_end_hour
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(year: i32, month: u32, day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(hour, 30, 0)
            .unwrap()
    }

    #[test]
    fn disabled_schedule_always_connects() {
        let cfg = ScheduleConfig::default();
        assert!(cfg.should_connect(at(2024, 3, 11, 3))); // Monday, 03:30
    }

    #[test]
    fn weekend_is_always_on() {
        let cfg = ScheduleConfig {
            enabled: true,
            ..Default::default()
        };
        assert!(cfg.should_connect(at(2024, 3, 9, 3))); // Saturday
        assert!(cfg.should_connect(at(2024, 3, 10, 3))); // Sunday
    }

    #[test]
    fn weekday_window_applies() {
        let cfg = ScheduleConfig {
            enabled: true,
            ..Default::default()
        };
        // Monday: off until 18:00, on after.
        assert!(!cfg.should_connect(at(2024, 3, 11, 17)));
        assert!(cfg.should_connect(at(2024, 3, 11, 18)));
        assert!(cfg.should_connect(at(2024, 3, 11, 23)));
        assert!(!cfg.should_connect(at(2024, 3, 11, 0)));
    }

    #[test]
    fn weekend_flag_off_uses_window_everywhere() {
        let cfg = ScheduleConfig {
            enabled: true,
            weekend_always_on: false,
            ..Default::default()
        };
        assert!(!cfg.should_connect(at(2024, 3, 9, 3))); // Saturday 03:30
        assert!(cfg.should_connect(at(2024, 3, 9, 19))); // Saturday 19:30
    }

    #[test]
    fn validation_bounds() {
        let mut cfg = ScheduleConfig::default();
        assert!(cfg.validate().is_ok());

        cfg.weekday_start_hour = 24;
        assert!(cfg.validate().is_err());

        cfg.weekday_start_hour = 20;
        cfg.weekday_end_hour = 20;
        assert!(cfg.validate().is_err());

        cfg.weekday_end_hour = 25;
        assert!(cfg.validate().is_err());
    }
}
