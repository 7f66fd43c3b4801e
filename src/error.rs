use chrono::Weekday;
use thiserror::Error;

/// Errors and warnings raised while preparing input for the scheduler.
///
/// None of these abort a weekly build. Roster and calendar problems are
/// collected per record; override problems travel with the day they belong to.
#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("invalid employee '{name}': {reason}")]
    InvalidEmployee { name: String, reason: String },

    #[error("invalid time of day '{0}' (expected HH:MM)")]
    InvalidTimeFormat(String),

    #[error("override for '{employee}' on {day} ({start}-{end}) covers no time slots")]
    OverrideRangeEmpty {
        employee: String,
        day: Weekday,
        start: String,
        end: String,
    },

    #[error("override for '{employee}' falls on {day}, which is not a business day")]
    OverrideNotBusinessDay { employee: String, day: Weekday },

    #[error("calendar entry for '{0}' does not match anyone on the roster")]
    UnresolvedPtoSubject(String),

    #[error("no employee named '{0}'")]
    UnknownEmployee(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScheduleError {
    pub(crate) fn invalid_employee(name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidEmployee {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
