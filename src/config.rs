use anyhow::Context;
use chrono::NaiveTime;

use crate::error::ConfigError;
use crate::models::AttendanceStatus;

pub const CUTOFF_ENV: &str = "ATTENDANCE_CUTOFF";
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

/// Settings that shape how a roster derives attendance status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RosterConfig {
    /// Check-ins strictly after this time of day are marked late.
    pub cutoff: NaiveTime,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            cutoff: NaiveTime::from_hms_opt(8, 30, 0).unwrap_or_default(),
        }
    }
}

impl RosterConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(value) = lookup(CUTOFF_ENV).filter(|v| !v.trim().is_empty()) {
            config.cutoff = parse_cutoff(&value)?;
        }
        Ok(config)
    }

    pub fn with_cutoff(mut self, cutoff: NaiveTime) -> Self {
        self.cutoff = cutoff;
        self
    }

    pub fn status_at(&self, time: NaiveTime) -> AttendanceStatus {
        if time > self.cutoff {
            AttendanceStatus::Late
        } else {
            AttendanceStatus::Present
        }
    }
}

pub fn parse_cutoff(value: &str) -> Result<NaiveTime, ConfigError> {
    let trimmed = value.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
        .map_err(|_| ConfigError::InvalidCutoff {
            value: value.to_string(),
        })
}

pub fn database_url() -> anyhow::Result<String> {
    std::env::var(DATABASE_URL_ENV)
        .context("DATABASE_URL must be set to read the school directory from Postgres")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    #[test]
    fn default_cutoff_is_half_past_eight() {
        assert_eq!(RosterConfig::default().cutoff, time(8, 30, 0));
    }

    #[test]
    fn status_flips_strictly_after_cutoff() {
        let config = RosterConfig::default();
        assert_eq!(config.status_at(time(8, 0, 0)), AttendanceStatus::Present);
        assert_eq!(config.status_at(time(8, 30, 0)), AttendanceStatus::Present);
        assert_eq!(config.status_at(time(8, 30, 1)), AttendanceStatus::Late);
    }

    #[test]
    fn parses_cutoff_with_or_without_seconds() {
        assert_eq!(parse_cutoff("09:15").unwrap(), time(9, 15, 0));
        assert_eq!(parse_cutoff(" 07:45:30 ").unwrap(), time(7, 45, 30));
        assert!(parse_cutoff("quarter past").is_err());
        assert!(parse_cutoff("25:00").is_err());
    }

    #[test]
    fn env_lookup_overrides_default() {
        let config = RosterConfig::from_lookup(|key| {
            (key == CUTOFF_ENV).then(|| "09:00".to_string())
        })
        .unwrap();
        assert_eq!(config.cutoff, time(9, 0, 0));

        let config = RosterConfig::from_lookup(|_| Some("   ".to_string())).unwrap();
        assert_eq!(config, RosterConfig::default());

        let err = RosterConfig::from_lookup(|_| Some("noon".to_string())).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidCutoff { .. }));
    }
}
