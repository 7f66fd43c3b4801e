use std::collections::BTreeMap;
use std::fmt;

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// The two roles with mandatory minimum staffing
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Role {
    Reservations,
    Dispatch,
}

impl Role {
    /// Order in which coverage is filled; Dispatch has the smaller pool.
    pub const FILL_ORDER: [Role; 2] = [Role::Dispatch, Role::Reservations];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Reservations => "Reservations",
            Role::Dispatch => "Dispatch",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an employee is doing during one slot.
///
/// Serialized as its plain label ("Reservations", "PTO", "OFF", "Network", ...).
/// Anything that is not one of the fixed labels is a specialist task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum TaskLabel {
    Role(Role),
    Lunch,
    Pto,
    Meeting,
    Off,
    Specialist(String),
}

impl TaskLabel {
    pub fn parse(label: &str) -> Self {
        let label = label.trim();
        let fixed = [
            ("Reservations", TaskLabel::Role(Role::Reservations)),
            ("Dispatch", TaskLabel::Role(Role::Dispatch)),
            ("Lunch", TaskLabel::Lunch),
            ("PTO", TaskLabel::Pto),
            ("Meeting", TaskLabel::Meeting),
            ("OFF", TaskLabel::Off),
        ];
        fixed
            .into_iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(label))
            .map(|(_, task)| task)
            .unwrap_or_else(|| TaskLabel::Specialist(label.to_string()))
    }

    pub fn as_str(&self) -> &str {
        match self {
            TaskLabel::Role(role) => role.as_str(),
            TaskLabel::Lunch => "Lunch",
            TaskLabel::Pto => "PTO",
            TaskLabel::Meeting => "Meeting",
            TaskLabel::Off => "OFF",
            TaskLabel::Specialist(name) => name,
        }
    }

    pub fn role(&self) -> Option<Role> {
        match self {
            TaskLabel::Role(role) => Some(*role),
            _ => None,
        }
    }

    /// Labels that describe absence rather than work
    pub fn is_reserved_absence(&self) -> bool {
        matches!(
            self,
            TaskLabel::Lunch | TaskLabel::Pto | TaskLabel::Meeting | TaskLabel::Off
        )
    }
}

impl fmt::Display for TaskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for TaskLabel {
    fn from(label: String) -> Self {
        TaskLabel::parse(&label)
    }
}

impl From<TaskLabel> for String {
    fn from(task: TaskLabel) -> Self {
        task.as_str().to_string()
    }
}

/// A manual assignment forced onto one employee for a range of one weekday
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Override {
    #[serde(alias = "name")]
    pub employee_name: String,
    pub day: Weekday,
    pub task: TaskLabel,
    #[serde(alias = "start")]
    pub start_time: String,
    #[serde(alias = "end")]
    pub end_time: String,
}

/// One day's assignments: employee name -> one label per time slot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DayGrid {
    pub rows: BTreeMap<String, Vec<TaskLabel>>,
}

impl DayGrid {
    /// A grid where everyone is OFF for every slot
    pub fn all_off<'a>(names: impl IntoIterator<Item = &'a str>, slot_count: usize) -> Self {
        Self {
            rows: names
                .into_iter()
                .map(|name| (name.to_string(), vec![TaskLabel::Off; slot_count]))
                .collect(),
        }
    }

    pub fn row(&self, name: &str) -> Option<&[TaskLabel]> {
        self.rows.get(name).map(Vec::as_slice)
    }

    /// Finds the stored row key for a name, ignoring case and surrounding whitespace
    pub fn resolve_name(&self, name: &str) -> Option<&str> {
        let wanted = name.trim();
        self.rows
            .keys()
            .find(|k| k.as_str() == wanted)
            .or_else(|| self.rows.keys().find(|k| k.eq_ignore_ascii_case(wanted)))
            .map(String::as_str)
    }

    /// Number of employees holding `role` in slot `slot`
    pub fn coverage(&self, slot: usize, role: Role) -> u32 {
        self.rows
            .values()
            .filter(|row| row.get(slot).and_then(TaskLabel::role) == Some(role))
            .count() as u32
    }
}

/// A slot where a mandatory role is not staffed at its required level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub date: NaiveDate,
    pub slot: usize,
    pub time: String,
    pub role: Role,
    pub required: u32,
    pub actual: u32,
}

impl Violation {
    pub fn is_shortfall(&self) -> bool {
        self.actual < self.required
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_shortfall() { "short" } else { "over" };
        write!(
            f,
            "{} {} {}: {} (required {}, assigned {})",
            self.date, self.time, self.role, kind, self.required, self.actual
        )
    }
}

/// Schedule for a single business day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaySchedule {
    pub weekday: Weekday,
    pub grid: DayGrid,
    pub violations: Vec<Violation>,
    /// Override problems that were skipped rather than applied
    pub warnings: Vec<String>,
}

/// Business day date -> that day's schedule
pub type WeekSchedule = BTreeMap<NaiveDate, DaySchedule>;
