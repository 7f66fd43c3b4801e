use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::time_grid::Window;
use super::types::{Role, TaskLabel};
use crate::error::{Result, ScheduleError};

/// Start/end pair as supplied by the caller, not yet parsed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawWindow {
    pub start: String,
    pub end: String,
}

impl RawWindow {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }
}

/// Employee record exactly as it arrives from a roster file or editor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEmployee {
    pub name: String,
    #[serde(default)]
    pub shift: Option<RawWindow>,
    #[serde(default)]
    pub lunch: Option<RawWindow>,
    #[serde(default)]
    pub abilities: Vec<String>,
    #[serde(default)]
    pub specialist_task: Option<String>,
    /// Contracted weekly hours; informational only
    #[serde(default)]
    pub hours: Option<f32>,
}

/// A meeting that blocks ordinary assignment for part of one date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meeting {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub window: Window,
}

/// A validated employee
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub name: String,
    pub shift: Option<Window>,
    pub lunch: Option<Window>,
    pub abilities: BTreeSet<String>,
    pub specialist_task: Option<String>,
    pub pto: BTreeSet<NaiveDate>,
    pub meetings: Vec<Meeting>,
    pub hours: Option<f32>,
}

impl Employee {
    /// Validates and normalizes one raw record
    pub fn from_raw(raw: RawEmployee) -> Result<Self> {
        let name = raw.name.trim().to_string();
        if name.is_empty() {
            return Err(ScheduleError::invalid_employee("", "name is empty"));
        }

        let shift = match &raw.shift {
            Some(w) => {
                let shift = Window::parse(&w.start, &w.end)?;
                if shift.is_empty() {
                    return Err(ScheduleError::invalid_employee(
                        &name,
                        format!("shift {} ends before it starts", shift),
                    ));
                }
                Some(shift)
            }
            None => None,
        };

        let lunch = match &raw.lunch {
            Some(w) => {
                let lunch = Window::parse(&w.start, &w.end)?;
                match shift {
                    _ if lunch.is_empty() => {
                        return Err(ScheduleError::invalid_employee(
                            &name,
                            format!("lunch {} ends before it starts", lunch),
                        ))
                    }
                    Some(shift) if shift.encloses(&lunch) => Some(lunch),
                    Some(shift) => {
                        return Err(ScheduleError::invalid_employee(
                            &name,
                            format!("lunch {} falls outside shift {}", lunch, shift),
                        ))
                    }
                    None => {
                        return Err(ScheduleError::invalid_employee(
                            &name,
                            "lunch configured without a shift",
                        ))
                    }
                }
            }
            None => None,
        };

        let specialist_task = normalize_specialist_task(&name, raw.specialist_task)?;

        let abilities = raw
            .abilities
            .iter()
            .map(|a| a.trim())
            .filter(|a| !a.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Self {
            name,
            shift,
            lunch,
            abilities,
            specialist_task,
            pto: BTreeSet::new(),
            meetings: Vec::new(),
            hours: raw.hours,
        })
    }

    pub fn can_cover(&self, role: Role) -> bool {
        self.abilities
            .iter()
            .any(|a| a.eq_ignore_ascii_case(role.as_str()))
    }

    pub fn has_pto(&self, date: NaiveDate) -> bool {
        self.pto.contains(&date)
    }

    pub fn meetings_on(&self, date: NaiveDate) -> impl Iterator<Item = Window> + '_ {
        self.meetings
            .iter()
            .filter(move |m| m.date == date)
            .map(|m| m.window)
    }

    pub fn specialist_label(&self) -> Option<TaskLabel> {
        self.specialist_task.as_deref().map(TaskLabel::parse)
    }

    /// Replaces the specialist task; an empty string clears it
    pub fn set_specialist_task(&mut self, task: Option<String>) -> Result<()> {
        self.specialist_task = normalize_specialist_task(&self.name, task)?;
        Ok(())
    }
}

fn normalize_specialist_task(name: &str, task: Option<String>) -> Result<Option<String>> {
    let task = task
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());
    if let Some(task) = &task {
        let label = TaskLabel::parse(task);
        if label.is_reserved_absence() || label.role().is_some() {
            return Err(ScheduleError::invalid_employee(
                name,
                format!("'{}' cannot be used as a specialist task", task),
            ));
        }
    }
    Ok(task)
}

/// PTO or meeting information supplied by a calendar source.
///
/// An entry without start and end times is a full day of PTO.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEntry {
    pub name: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
}

/// The validated employees of one allocation run, in stable name order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Roster {
    employees: Vec<Employee>,
}

impl Roster {
    pub fn new(mut employees: Vec<Employee>) -> Self {
        employees.sort_by(|a, b| a.name.cmp(&b.name));
        Self { employees }
    }

    pub fn employees(&self) -> &[Employee] {
        &self.employees
    }

    pub fn len(&self) -> usize {
        self.employees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.employees.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Employee> {
        self.employees.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.employees.iter().map(|e| e.name.as_str())
    }

    /// Position of an employee, matching the name without regard to case
    pub fn position(&self, name: &str) -> Option<usize> {
        let wanted = name.trim();
        self.employees
            .iter()
            .position(|e| e.name == wanted)
            .or_else(|| {
                self.employees
                    .iter()
                    .position(|e| e.name.eq_ignore_ascii_case(wanted))
            })
    }

    pub fn get(&self, name: &str) -> Option<&Employee> {
        let index = self.position(name)?;
        Some(&self.employees[index])
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Employee> {
        let index = self.position(name)?;
        Some(&mut self.employees[index])
    }

    /// Adds `employee` in place of the record called `name`, or as a new record
    /// when nobody has that name. PTO days and meetings already attached to the
    /// replaced record are kept. Returns whether a record was replaced.
    pub fn upsert(&mut self, name: &str, mut employee: Employee) -> Result<bool> {
        let existing = self.position(name);
        if let Some(clash) = self.position(&employee.name) {
            if Some(clash) != existing {
                return Err(ScheduleError::invalid_employee(
                    &employee.name,
                    "duplicate name on roster",
                ));
            }
        }

        let replaced = match existing {
            Some(index) => {
                let old = self.employees.remove(index);
                employee.pto = old.pto;
                employee.meetings = old.meetings;
                true
            }
            None => false,
        };
        self.employees.push(employee);
        self.employees.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(replaced)
    }

    pub fn remove(&mut self, name: &str) -> Option<Employee> {
        let index = self.position(name)?;
        Some(self.employees.remove(index))
    }

    /// Attaches PTO days and meetings to the matching employees.
    ///
    /// Entries that match nobody, or carry unusable times, are returned so the
    /// caller can report them; they never stop the rest from being applied.
    pub fn resolve_calendar(&mut self, entries: &[CalendarEntry]) -> Vec<ScheduleError> {
        let mut issues = Vec::new();
        for entry in entries {
            let Some(employee) = self.get_mut(&entry.name) else {
                issues.push(ScheduleError::UnresolvedPtoSubject(entry.name.clone()));
                continue;
            };

            let start = entry.start.as_deref().map(str::trim).filter(|s| !s.is_empty());
            let end = entry.end.as_deref().map(str::trim).filter(|s| !s.is_empty());
            match (start, end) {
                (None, None) => {
                    employee.pto.insert(entry.date);
                }
                (Some(start), Some(end)) => match Window::parse(start, end) {
                    Ok(window) if !window.is_empty() => {
                        let meeting = Meeting {
                            date: entry.date,
                            window,
                        };
                        if !employee.meetings.contains(&meeting) {
                            employee.meetings.push(meeting);
                        }
                    }
                    Ok(window) => issues.push(ScheduleError::invalid_employee(
                        &employee.name,
                        format!("meeting {} on {} ends before it starts", window, entry.date),
                    )),
                    Err(e) => issues.push(e),
                },
                (Some(time), None) | (None, Some(time)) => {
                    issues.push(ScheduleError::InvalidTimeFormat(format!(
                        "{} (meeting needs both start and end)",
                        time
                    )));
                }
            }
        }
        issues
    }
}

/// Validates a batch of raw records.
///
/// Each bad record is reported and skipped; a repeated name keeps the first
/// record and reports the rest.
pub fn normalize_roster(raws: Vec<RawEmployee>) -> (Roster, Vec<ScheduleError>) {
    let mut employees: Vec<Employee> = Vec::new();
    let mut issues = Vec::new();

    for raw in raws {
        match Employee::from_raw(raw) {
            Ok(employee) => {
                if employees
                    .iter()
                    .any(|e| e.name.eq_ignore_ascii_case(&employee.name))
                {
                    issues.push(ScheduleError::invalid_employee(
                        &employee.name,
                        "duplicate name on roster",
                    ));
                } else {
                    employees.push(employee);
                }
            }
            Err(e) => issues.push(e),
        }
    }

    (Roster::new(employees), issues)
}
