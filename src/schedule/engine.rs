use chrono::NaiveDate;

use super::coverage::cover_mandatory_roles;
use super::lunch::place_lunches;
use super::roster::Roster;
use super::time_grid::{is_business_day, TimeGrid};
use super::types::{DayGrid, Role, TaskLabel};
use crate::config::SchedulerConfig;

/// State of one cell while the passes run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    /// Inside the shift and not yet given anything to do
    Available,
    Assigned(TaskLabel),
}

/// Working grid for one day: one row per roster entry, one cell per slot.
///
/// Rows follow roster order, so row `i` belongs to `roster.employees()[i]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkGrid {
    rows: Vec<Vec<Cell>>,
}

impl WorkGrid {
    pub fn new(employee_count: usize, slot_count: usize) -> Self {
        Self {
            rows: vec![vec![Cell::Assigned(TaskLabel::Off); slot_count]; employee_count],
        }
    }

    pub fn slot_count(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    pub fn cell(&self, employee: usize, slot: usize) -> &Cell {
        &self.rows[employee][slot]
    }

    pub fn is_available(&self, employee: usize, slot: usize) -> bool {
        self.rows[employee][slot] == Cell::Available
    }

    pub fn set(&mut self, employee: usize, slot: usize, cell: Cell) {
        self.rows[employee][slot] = cell;
    }

    pub fn assign(&mut self, employee: usize, slot: usize, task: TaskLabel) {
        self.set(employee, slot, Cell::Assigned(task));
    }

    /// Employees currently holding `role` in `slot`
    pub fn role_count(&self, slot: usize, role: Role) -> u32 {
        self.rows
            .iter()
            .filter(|row| matches!(&row[slot], Cell::Assigned(TaskLabel::Role(r)) if *r == role))
            .count() as u32
    }

    /// Available employees able to cover `role` in `slot`, in roster order
    pub fn available_for(&self, roster: &Roster, slot: usize, role: Role) -> Vec<usize> {
        roster
            .iter()
            .enumerate()
            .filter(|(i, e)| self.is_available(*i, slot) && e.can_cover(role))
            .map(|(i, _)| i)
            .collect()
    }

    /// Converts into the finished grid; leftover Available cells become OFF
    pub fn finish(self, roster: &Roster) -> DayGrid {
        let rows = roster
            .names()
            .zip(self.rows)
            .map(|(name, row)| {
                let labels = row
                    .into_iter()
                    .map(|cell| match cell {
                        Cell::Available => TaskLabel::Off,
                        Cell::Assigned(task) => task,
                    })
                    .collect();
                (name.to_string(), labels)
            })
            .collect();
        DayGrid { rows }
    }
}

/// Pass 0: PTO, meetings, shift boundaries
pub fn baseline(roster: &Roster, date: NaiveDate, time_grid: &TimeGrid) -> WorkGrid {
    let mut grid = WorkGrid::new(roster.len(), time_grid.len());

    for (i, employee) in roster.iter().enumerate() {
        if employee.has_pto(date) {
            for slot in 0..time_grid.len() {
                grid.assign(i, slot, TaskLabel::Pto);
            }
            continue;
        }

        let Some(shift) = employee.shift else {
            continue;
        };

        for slot in time_grid.slots_for_day() {
            if employee
                .meetings_on(date)
                .any(|m| m.overlaps(slot.start, slot.end))
            {
                grid.assign(i, slot.index, TaskLabel::Meeting);
            } else if shift.contains(slot.start) {
                grid.set(i, slot.index, Cell::Available);
            }
        }
    }

    grid
}

/// Pass 3: specialists return to their specialty whenever nothing else claimed them
pub fn fill_specialist_tasks(mut grid: WorkGrid, roster: &Roster) -> WorkGrid {
    for (i, employee) in roster.iter().enumerate() {
        let Some(task) = employee.specialist_label() else {
            continue;
        };
        for slot in 0..grid.slot_count() {
            if grid.is_available(i, slot) {
                grid.assign(i, slot, task.clone());
            }
        }
    }
    grid
}

/// Runs passes 0-3 for one date and returns the finished grid.
///
/// Weekend dates are not processed and come back all OFF.
pub fn allocate_day(config: &SchedulerConfig, roster: &Roster, date: NaiveDate) -> DayGrid {
    let time_grid = &config.time_grid;
    if !is_business_day(date) {
        return DayGrid::all_off(roster.names(), time_grid.len());
    }

    let grid = baseline(roster, date, time_grid);
    let grid = place_lunches(grid, roster, time_grid, &config.lunch);
    let grid = cover_mandatory_roles(grid, roster, time_grid, &config.staffing);
    let grid = fill_specialist_tasks(grid, roster);

    tracing::debug!(%date, employees = roster.len(), "allocated day");
    grid.finish(roster)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::roster::{normalize_roster, CalendarEntry, RawEmployee, RawWindow};

    fn employee(name: &str, shift: (&str, &str), abilities: &[&str]) -> RawEmployee {
        RawEmployee {
            name: name.to_string(),
            shift: Some(RawWindow::new(shift.0, shift.1)),
            abilities: abilities.iter().map(|a| a.to_string()).collect(),
            ..Default::default()
        }
    }

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
    }

    #[test]
    fn test_baseline_marks_shift_meeting_and_pto() {
        let (mut roster, _) = normalize_roster(vec![
            employee("Ann", ("08:00", "10:00"), &[]),
            employee("Bob", ("08:00", "10:00"), &[]),
        ]);
        roster.resolve_calendar(&[
            CalendarEntry {
                name: "Ann".to_string(),
                date: monday(),
                start: Some("09:00".to_string()),
                end: Some("09:30".to_string()),
            },
            CalendarEntry {
                name: "Bob".to_string(),
                date: monday(),
                start: None,
                end: None,
            },
        ]);

        let grid = baseline(&roster, monday(), &TimeGrid::default());
        // 07:00 is before Ann's shift
        assert_eq!(grid.cell(0, 0), &Cell::Assigned(TaskLabel::Off));
        assert!(grid.is_available(0, 2));
        assert_eq!(grid.cell(0, 4), &Cell::Assigned(TaskLabel::Meeting));
        assert!(grid.is_available(0, 5));
        assert_eq!(grid.cell(0, 6), &Cell::Assigned(TaskLabel::Off));
        assert!((0..30).all(|s| grid.cell(1, s) == &Cell::Assigned(TaskLabel::Pto)));
    }

    #[test]
    fn test_meeting_blocks_every_slot_it_touches() {
        let (mut roster, _) = normalize_roster(vec![employee("Ann", ("08:00", "12:00"), &["Dispatch"])]);
        roster.resolve_calendar(&[
            CalendarEntry {
                name: "Ann".to_string(),
                date: monday(),
                start: Some("09:10".to_string()),
                end: Some("09:25".to_string()),
            },
            CalendarEntry {
                name: "Ann".to_string(),
                date: monday(),
                start: Some("10:15".to_string()),
                end: Some("11:00".to_string()),
            },
        ]);

        let grid = baseline(&roster, monday(), &TimeGrid::default());
        assert!(grid.is_available(0, 3));
        assert_eq!(grid.cell(0, 4), &Cell::Assigned(TaskLabel::Meeting));
        assert!(grid.is_available(0, 5));
        assert_eq!(grid.cell(0, 6), &Cell::Assigned(TaskLabel::Meeting));
        assert_eq!(grid.cell(0, 7), &Cell::Assigned(TaskLabel::Meeting));
        assert!(grid.is_available(0, 8));

        let day = allocate_day(&SchedulerConfig::default(), &roster, monday());
        assert_eq!(day.row("Ann").unwrap()[4], TaskLabel::Meeting);
    }

    #[test]
    fn test_no_shift_is_all_off() {
        let mut raw = employee("Ann", ("08:00", "17:00"), &["Reservations"]);
        raw.shift = None;
        let (roster, _) = normalize_roster(vec![raw]);
        let grid = allocate_day(&SchedulerConfig::default(), &roster, monday());
        assert!(grid.row("Ann").unwrap().iter().all(|t| *t == TaskLabel::Off));
    }

    #[test]
    fn test_weekend_is_all_off() {
        let (roster, _) = normalize_roster(vec![employee("Ann", ("08:00", "17:00"), &["Dispatch"])]);
        let saturday = NaiveDate::from_ymd_opt(2024, 6, 8).unwrap();
        let grid = allocate_day(&SchedulerConfig::default(), &roster, saturday);
        assert!(grid.row("Ann").unwrap().iter().all(|t| *t == TaskLabel::Off));
    }

    #[test]
    fn test_specialist_fill_only_touches_available() {
        let mut raw = employee("Ann", ("08:00", "09:00"), &["Network"]);
        raw.specialist_task = Some("Network".to_string());
        let (roster, _) = normalize_roster(vec![raw]);

        let mut grid = baseline(&roster, monday(), &TimeGrid::default());
        grid.assign(0, 2, TaskLabel::Lunch);
        let grid = fill_specialist_tasks(grid, &roster);

        assert_eq!(grid.cell(0, 1), &Cell::Assigned(TaskLabel::Off));
        assert_eq!(grid.cell(0, 2), &Cell::Assigned(TaskLabel::Lunch));
        assert_eq!(
            grid.cell(0, 3),
            &Cell::Assigned(TaskLabel::Specialist("Network".to_string()))
        );
    }

    #[test]
    fn test_finish_never_exposes_available() {
        let (roster, _) = normalize_roster(vec![employee("Ann", ("07:00", "22:00"), &[])]);
        let grid = baseline(&roster, monday(), &TimeGrid::default()).finish(&roster);
        assert_eq!(grid.row("Ann").unwrap(), vec![TaskLabel::Off; 30].as_slice());
    }
}
