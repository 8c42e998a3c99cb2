use crate::errors::{BookingError, BookingResult};

/// Default scanning granularity for capacity checks.
pub const DEFAULT_SCAN_INTERVAL_MINUTES: u32 = 15;

/// Default number of days the next-available search walks forward.
pub const DEFAULT_SEARCH_HORIZON_DAYS: u32 = 30;

/// Tunables for the availability pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulingConfig {
    pub scan_interval_minutes: u32,
    pub search_horizon_days: u32,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            scan_interval_minutes: DEFAULT_SCAN_INTERVAL_MINUTES,
            search_horizon_days: DEFAULT_SEARCH_HORIZON_DAYS,
        }
    }
}

impl SchedulingConfig {
    pub fn validate(&self) -> BookingResult<()> {
        if self.scan_interval_minutes == 0 {
            return Err(BookingError::Validation(
                "scan interval must be at least one minute".to_string(),
            ));
        }
        if self.search_horizon_days == 0 {
            return Err(BookingError::Validation(
                "search horizon must be at least one day".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SchedulingConfig::default();
        assert_eq!(config.scan_interval_minutes, 15);
        assert_eq!(config.search_horizon_days, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_interval_is_rejected() {
        let config = SchedulingConfig {
            scan_interval_minutes: 0,
            ..SchedulingConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(BookingError::Validation(_))
        ));
    }
}
