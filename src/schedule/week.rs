use chrono::{Datelike, Duration, NaiveDate};

use super::engine::allocate_day;
use super::overrides::apply_overrides;
use super::roster::Roster;
use super::time_grid::is_business_day;
use super::types::{DaySchedule, Override, WeekSchedule};
use super::validator::validate;
use crate::config::SchedulerConfig;

/// The seven dates of the Sunday-based week containing `date`
pub fn week_dates(date: NaiveDate) -> Vec<NaiveDate> {
    let sunday = date - Duration::days(date.weekday().num_days_from_sunday() as i64);
    (0..7).map(|offset| sunday + Duration::days(offset)).collect()
}

/// Monday through Friday of the week containing `date`
pub fn business_days(date: NaiveDate) -> Vec<NaiveDate> {
    week_dates(date)
        .into_iter()
        .filter(|d| is_business_day(*d))
        .collect()
}

/// Allocates, applies overrides and validates a single date
pub fn build_day(
    config: &SchedulerConfig,
    roster: &Roster,
    overrides: &[Override],
    date: NaiveDate,
) -> DaySchedule {
    let grid = allocate_day(config, roster, date);
    let (grid, warnings) = apply_overrides(grid, date.weekday(), overrides, &config.time_grid);
    let violations = validate(date, &grid, &config.staffing, &config.time_grid);

    tracing::debug!(
        %date,
        violations = violations.len(),
        warnings = warnings.len(),
        "built day"
    );

    DaySchedule {
        weekday: date.weekday(),
        grid,
        violations,
        warnings: warnings.iter().map(ToString::to_string).collect(),
    }
}

/// Builds every business day of the week containing `week_start`.
///
/// Each day is computed on its own from the full roster; nothing carries
/// over from one day to the next.
pub fn build_week(
    config: &SchedulerConfig,
    roster: &Roster,
    overrides: &[Override],
    week_start: NaiveDate,
) -> WeekSchedule {
    business_days(week_start)
        .into_iter()
        .map(|date| (date, build_day(config, roster, overrides, date)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_week_starts_on_sunday() {
        let dates = week_dates(date("2024-06-05"));
        assert_eq!(dates.first(), Some(&date("2024-06-02")));
        assert_eq!(dates.last(), Some(&date("2024-06-08")));
        assert_eq!(week_dates(date("2024-06-02")), dates);
        assert_eq!(week_dates(date("2024-06-08")), dates);
    }

    #[test]
    fn test_business_days_only() {
        let days = business_days(date("2024-06-02"));
        assert_eq!(days.len(), 5);
        assert_eq!(days[0].weekday(), Weekday::Mon);
        assert_eq!(days[4], date("2024-06-07"));
    }

    #[test]
    fn test_empty_roster_builds_five_days() {
        let week = build_week(&SchedulerConfig::default(), &Roster::default(), &[], date("2024-06-02"));
        assert_eq!(week.len(), 5);
        assert!(week.values().all(|d| d.grid.rows.is_empty()));
        // Nobody to staff anything: every required slot is short
        assert!(week.values().all(|d| d.violations.iter().all(|v| v.is_shortfall())));
    }
}
