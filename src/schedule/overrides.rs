use chrono::Weekday;

use super::time_grid::{TimeGrid, Window};
use super::types::{DayGrid, Override};
use crate::error::{Result, ScheduleError};

/// Appends one override to the caller's list
pub fn apply_override(mut overrides: Vec<Override>, new: Override) -> Vec<Override> {
    overrides.push(new);
    overrides
}

/// An empty override list
pub fn clear_overrides() -> Vec<Override> {
    Vec::new()
}

/// Rejects overrides for Saturday or Sunday; no weekend day is ever built
pub fn check_override_day(o: &Override) -> Result<()> {
    if matches!(o.day, Weekday::Sat | Weekday::Sun) {
        return Err(ScheduleError::OverrideNotBusinessDay {
            employee: o.employee_name.clone(),
            day: o.day,
        });
    }
    Ok(())
}

/// Slot indices an override would cover
pub fn override_slots(o: &Override, time_grid: &TimeGrid) -> Result<std::ops::Range<usize>> {
    let window = Window::parse(&o.start_time, &o.end_time)?;
    let slots = time_grid.slot_range(window);
    if slots.is_empty() {
        return Err(ScheduleError::OverrideRangeEmpty {
            employee: o.employee_name.clone(),
            day: o.day,
            start: o.start_time.clone(),
            end: o.end_time.clone(),
        });
    }
    Ok(slots)
}

/// Pass 4: writes every override for `weekday` onto the grid, in list order.
///
/// Overrides win over everything, including PTO and lunch. Later overrides
/// win over earlier ones on the same slot. Overrides that cannot be applied
/// are skipped and returned as warnings.
pub fn apply_overrides(
    mut grid: DayGrid,
    weekday: Weekday,
    overrides: &[Override],
    time_grid: &TimeGrid,
) -> (DayGrid, Vec<ScheduleError>) {
    let mut warnings = Vec::new();

    for o in overrides.iter().filter(|o| o.day == weekday) {
        let Some(name) = grid.resolve_name(&o.employee_name).map(str::to_string) else {
            warnings.push(ScheduleError::UnknownEmployee(o.employee_name.clone()));
            continue;
        };
        let slots = match override_slots(o, time_grid) {
            Ok(slots) => slots,
            Err(e) => {
                warnings.push(e);
                continue;
            }
        };
        if let Some(row) = grid.rows.get_mut(&name) {
            for slot in slots {
                row[slot] = o.task.clone();
            }
        }
    }

    (grid, warnings)
}
