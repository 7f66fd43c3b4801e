use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError};
use crate::schedule::{apply_override, check_override_day, Override, Roster, Window};

/// Changes an edit request may make to one employee
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeChanges {
    /// New specialist task; an empty string clears it
    #[serde(default)]
    pub specialist_task: Option<String>,
    /// Dates to add to the employee's PTO
    #[serde(default)]
    pub pto_days: Vec<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeUpdate {
    pub employee_name: String,
    pub updates: EmployeeChanges,
}

/// A structured edit produced by whatever front end interprets the user.
///
/// ```json
/// {"action": "create_shift", "employeeName": "Ann", "day": "Monday",
///  "task": "Badges/Projects", "startTime": "12:00", "endTime": "12:30"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Directive {
    UpdateEmployeeData(EmployeeUpdate),
    CreateShift(Override),
}

impl Directive {
    /// Applies the directive to the caller-owned roster and override list.
    ///
    /// Nothing is changed when an error is returned.
    pub fn apply(self, roster: &mut Roster, overrides: Vec<Override>) -> Result<Vec<Override>> {
        match self {
            Directive::UpdateEmployeeData(update) => {
                let employee = roster
                    .get_mut(&update.employee_name)
                    .ok_or_else(|| ScheduleError::UnknownEmployee(update.employee_name.clone()))?;
                if let Some(task) = update.updates.specialist_task {
                    employee.set_specialist_task(Some(task))?;
                }
                employee.pto.extend(update.updates.pto_days);
                tracing::info!(employee = %employee.name, "employee data updated");
                Ok(overrides)
            }
            Directive::CreateShift(o) => {
                if roster.get(&o.employee_name).is_none() {
                    return Err(ScheduleError::UnknownEmployee(o.employee_name));
                }
                check_override_day(&o)?;
                Window::parse(&o.start_time, &o.end_time)?;
                tracing::info!(employee = %o.employee_name, day = %o.day, task = %o.task, "shift override added");
                Ok(apply_override(overrides, o))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{normalize_roster, RawEmployee, RawWindow, TaskLabel};
    use chrono::Weekday;

    fn roster() -> Roster {
        let (roster, _) = normalize_roster(vec![RawEmployee {
            name: "Ann".to_string(),
            shift: Some(RawWindow::new("08:00", "17:00")),
            abilities: vec!["Reservations".to_string()],
            specialist_task: Some("Sales".to_string()),
            ..Default::default()
        }]);
        roster
    }

    #[test]
    fn test_create_shift_appends_override() {
        let json = r#"{"action":"create_shift","employeeName":"Ann","day":"Monday",
            "task":"Badges/Projects","startTime":"12:00","endTime":"12:30"}"#;
        let directive: Directive = serde_json::from_str(json).unwrap();
        let mut roster = roster();
        let overrides = directive.apply(&mut roster, Vec::new()).unwrap();
        assert_eq!(overrides.len(), 1);
        assert_eq!(overrides[0].day, Weekday::Mon);
        assert_eq!(overrides[0].task, TaskLabel::Specialist("Badges/Projects".to_string()));
    }

    #[test]
    fn test_update_employee_data() {
        let json = r#"{"action":"update_employee_data","employeeName":"ann",
            "updates":{"specialistTask":"Network","ptoDays":["2024-06-03","2024-06-04"]}}"#;
        let directive: Directive = serde_json::from_str(json).unwrap();
        let mut roster = roster();
        directive.apply(&mut roster, Vec::new()).unwrap();
        let ann = roster.get("Ann").unwrap();
        assert_eq!(ann.specialist_task.as_deref(), Some("Network"));
        assert_eq!(ann.pto.len(), 2);
    }

    #[test]
    fn test_empty_specialist_task_clears() {
        let directive = Directive::UpdateEmployeeData(EmployeeUpdate {
            employee_name: "Ann".to_string(),
            updates: EmployeeChanges {
                specialist_task: Some(String::new()),
                pto_days: Vec::new(),
            },
        });
        let mut roster = roster();
        directive.apply(&mut roster, Vec::new()).unwrap();
        assert_eq!(roster.get("Ann").unwrap().specialist_task, None);
    }

    #[test]
    fn test_unknown_employee_rejected() {
        let directive = Directive::CreateShift(Override {
            employee_name: "Ghost".to_string(),
            day: Weekday::Mon,
            task: TaskLabel::Lunch,
            start_time: "12:00".to_string(),
            end_time: "12:30".to_string(),
        });
        let mut roster = roster();
        assert!(matches!(
            directive.apply(&mut roster, Vec::new()),
            Err(ScheduleError::UnknownEmployee(_))
        ));
    }

    #[test]
    fn test_weekend_shift_rejected() {
        let directive = Directive::CreateShift(Override {
            employee_name: "Ann".to_string(),
            day: Weekday::Sat,
            task: TaskLabel::Lunch,
            start_time: "12:00".to_string(),
            end_time: "12:30".to_string(),
        });
        let mut roster = roster();
        assert!(matches!(
            directive.apply(&mut roster, Vec::new()),
            Err(ScheduleError::OverrideNotBusinessDay { .. })
        ));
    }

    #[test]
    fn test_bad_times_rejected() {
        let directive = Directive::CreateShift(Override {
            employee_name: "Ann".to_string(),
            day: Weekday::Mon,
            task: TaskLabel::Lunch,
            start_time: "noon".to_string(),
            end_time: "12:30".to_string(),
        });
        let mut roster = roster();
        assert!(directive.apply(&mut roster, Vec::new()).is_err());
    }
}
