use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::schedule::{LunchConfig, StaffingRules, TimeGrid};

/// Environment variable naming a JSON config file
pub const CONFIG_ENV: &str = "WEEKLY_ROSTER_CONFIG";

/// Everything tunable about an allocation run.
///
/// Any field left out of the JSON file keeps its default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub time_grid: TimeGrid,
    pub staffing: StaffingRules,
    pub lunch: LunchConfig,
}

impl SchedulerConfig {
    pub fn validate(&self) -> Result<()> {
        self.time_grid.validate()?;
        self.staffing.validate()?;
        self.lunch.validate()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    /// Loads from `path`, else from the file named by `WEEKLY_ROSTER_CONFIG`,
    /// else falls back to the defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));
        match path {
            Some(path) => {
                tracing::info!(path = %path.display(), "loading scheduler config");
                Self::from_file(path)
            }
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::Requirement;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = SchedulerConfig::from_json(
            r#"{"staffing":{"bands":[
                {"start":"08:00","reservations":3,"dispatch":1},
                {"start":"17:00","reservations":1,"dispatch":1}
            ]}}"#,
        )
        .unwrap();
        assert_eq!(config.time_grid, TimeGrid::default());
        assert_eq!(config.lunch, LunchConfig::default());
        assert_eq!(config.staffing.requirement_at(18 * 60), Requirement::new(1, 1));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let err = SchedulerConfig::from_json(r#"{"time_grid":{"slot_minutes":0}}"#);
        assert!(err.is_err());
        let err = SchedulerConfig::from_json(r#"{"lunch":{"catalog":[{"start":"13:00","end":"12:00"}]}}"#);
        assert!(err.is_err());
    }

    #[test]
    fn test_default_round_trips_through_json() {
        let json = serde_json::to_string(&SchedulerConfig::default()).unwrap();
        assert_eq!(SchedulerConfig::from_json(&json).unwrap(), SchedulerConfig::default());
    }
}
