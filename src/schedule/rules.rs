use serde::{Deserialize, Serialize};

use super::time_grid::{hhmm, Window};
use super::types::Role;
use crate::error::{Result, ScheduleError};

/// Minimum headcount per mandatory role for one slot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    pub reservations: u32,
    pub dispatch: u32,
}

impl Requirement {
    pub fn new(reservations: u32, dispatch: u32) -> Self {
        Self { reservations, dispatch }
    }

    pub fn for_role(&self, role: Role) -> u32 {
        match role {
            Role::Reservations => self.reservations,
            Role::Dispatch => self.dispatch,
        }
    }
}

/// A requirement that applies from `start` until the next band begins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffingBand {
    #[serde(with = "hhmm")]
    pub start: u32,
    #[serde(flatten)]
    pub requirement: Requirement,
}

/// Time-of-day staffing table used by both the allocator and the validator.
///
/// Slots before the first band require nobody.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaffingRules {
    pub bands: Vec<StaffingBand>,
}

impl Default for StaffingRules {
    fn default() -> Self {
        Self::with_evening(2, 1)
    }
}

impl StaffingRules {
    /// Daytime 08:00-17:00 needs 3 Reservations and 1 Dispatch; the evening
    /// band from 17:00 uses the given minimums.
    pub fn with_evening(reservations: u32, dispatch: u32) -> Self {
        Self {
            bands: vec![
                StaffingBand {
                    start: 8 * 60,
                    requirement: Requirement::new(3, 1),
                },
                StaffingBand {
                    start: 17 * 60,
                    requirement: Requirement::new(reservations, dispatch),
                },
            ],
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.bands.windows(2).any(|w| w[0].start >= w[1].start) {
            return Err(ScheduleError::InvalidConfig(
                "staffing bands must be listed in ascending start order".to_string(),
            ));
        }
        Ok(())
    }

    /// Requirement for a slot starting at `minute`
    pub fn requirement_at(&self, minute: u32) -> Requirement {
        self.bands
            .iter()
            .take_while(|band| band.start <= minute)
            .last()
            .map(|band| band.requirement)
            .unwrap_or_default()
    }
}

/// Lunch candidate catalog and scoring constants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LunchConfig {
    /// Generic windows, tried after the employee's own lunch window
    pub catalog: Vec<Window>,
    /// Added per slot where the remaining coverage would fall below the floor
    pub shortfall_penalty: i64,
    pub min_reservations: u32,
    pub min_dispatch: u32,
}

impl Default for LunchConfig {
    fn default() -> Self {
        Self {
            catalog: vec![
                Window::new(11 * 60, 12 * 60),
                Window::new(12 * 60, 13 * 60),
                Window::new(13 * 60, 14 * 60),
            ],
            shortfall_penalty: -100,
            min_reservations: 3,
            min_dispatch: 1,
        }
    }
}

impl LunchConfig {
    pub fn validate(&self) -> Result<()> {
        if let Some(window) = self.catalog.iter().find(|w| w.is_empty()) {
            return Err(ScheduleError::InvalidConfig(format!(
                "lunch window {} is empty",
                window
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::time_grid::to_minutes;

    fn at(time: &str) -> u32 {
        to_minutes(time).unwrap()
    }

    #[test]
    fn test_default_bands() {
        let rules = StaffingRules::default();
        assert_eq!(rules.requirement_at(at("07:30")), Requirement::new(0, 0));
        assert_eq!(rules.requirement_at(at("08:00")), Requirement::new(3, 1));
        assert_eq!(rules.requirement_at(at("16:30")), Requirement::new(3, 1));
        assert_eq!(rules.requirement_at(at("17:00")), Requirement::new(2, 1));
        assert_eq!(rules.requirement_at(at("21:30")), Requirement::new(2, 1));
    }

    #[test]
    fn test_evening_minimum_is_configurable() {
        for evening in [1, 2] {
            let rules = StaffingRules::with_evening(evening, 1);
            assert_eq!(rules.requirement_at(at("18:00")).reservations, evening);
            assert_eq!(rules.requirement_at(at("12:00")).reservations, 3);
        }
    }

    #[test]
    fn test_rules_from_json() {
        let json = r#"{"bands":[{"start":"09:00","reservations":1,"dispatch":0}]}"#;
        let rules: StaffingRules = serde_json::from_str(json).unwrap();
        assert!(rules.validate().is_ok());
        assert_eq!(rules.requirement_at(at("08:30")), Requirement::new(0, 0));
        assert_eq!(rules.requirement_at(at("20:00")), Requirement::new(1, 0));
    }

    #[test]
    fn test_unsorted_bands_rejected() {
        let mut rules = StaffingRules::default();
        rules.bands.reverse();
        assert!(rules.validate().is_err());
    }

    #[test]
    fn test_default_lunch_catalog() {
        let lunch = LunchConfig::default();
        assert_eq!(lunch.catalog.len(), 3);
        assert_eq!(lunch.catalog[0].to_string(), "11:00-12:00");
        assert!(lunch.validate().is_ok());
    }
}
