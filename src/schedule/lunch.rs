use std::ops::Range;

use super::engine::WorkGrid;
use super::rules::LunchConfig;
use super::roster::{Employee, Roster};
use super::time_grid::{TimeGrid, Window};
use super::types::{Role, TaskLabel};

/// A viable lunch window and the score it earned
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LunchChoice {
    pub window: Window,
    pub slots: Range<usize>,
    pub score: i64,
}

/// Candidate windows in evaluation order: the employee's own lunch window,
/// then the generic catalog. Duplicates are dropped so the earlier copy keeps
/// its tie-break position.
pub fn candidate_windows(employee: &Employee, config: &LunchConfig) -> Vec<Window> {
    let mut candidates: Vec<Window> = Vec::new();
    for window in employee.lunch.iter().chain(config.catalog.iter()) {
        if !candidates.contains(window) {
            candidates.push(*window);
        }
    }
    candidates
}

/// Scores sending `employee` to lunch over `slots`.
///
/// For each slot, counts the Reservations- and Dispatch-capable employees
/// that would still be available. A slot that would drop under either floor
/// costs the shortfall penalty; otherwise it earns the remaining headcount.
pub fn score_window(
    grid: &WorkGrid,
    roster: &Roster,
    employee: usize,
    slots: Range<usize>,
    config: &LunchConfig,
) -> i64 {
    slots
        .map(|slot| {
            let remaining = |role: Role| {
                grid.available_for(roster, slot, role)
                    .into_iter()
                    .filter(|&other| other != employee)
                    .count() as u32
            };
            let reservations = remaining(Role::Reservations);
            let dispatch = remaining(Role::Dispatch);
            if reservations < config.min_reservations || dispatch < config.min_dispatch {
                config.shortfall_penalty
            } else {
                (reservations + dispatch) as i64
            }
        })
        .sum()
}

/// Picks the best viable lunch window for one employee, if any.
///
/// A window is viable when it covers at least one slot and every covered slot
/// is still Available. The strictly highest score wins; ties keep the earlier
/// candidate.
pub fn best_lunch_window(
    grid: &WorkGrid,
    roster: &Roster,
    employee: usize,
    time_grid: &TimeGrid,
    config: &LunchConfig,
) -> Option<LunchChoice> {
    let mut best: Option<LunchChoice> = None;

    for window in candidate_windows(&roster.employees()[employee], config) {
        let slots = time_grid.slot_range(window);
        if slots.is_empty() || !slots.clone().all(|s| grid.is_available(employee, s)) {
            continue;
        }

        let score = score_window(grid, roster, employee, slots.clone(), config);
        if best.as_ref().map_or(true, |b| score > b.score) {
            best = Some(LunchChoice {
                window,
                slots,
                score,
            });
        }
    }

    best
}

/// Pass 1: lunch for every employee with a configured lunch window
pub fn place_lunches(
    mut grid: WorkGrid,
    roster: &Roster,
    time_grid: &TimeGrid,
    config: &LunchConfig,
) -> WorkGrid {
    for (i, employee) in roster.iter().enumerate() {
        if employee.lunch.is_none() {
            continue;
        }
        match best_lunch_window(&grid, roster, i, time_grid, config) {
            Some(choice) => {
                tracing::trace!(employee = %employee.name, window = %choice.window, score = choice.score, "lunch placed");
                for slot in choice.slots {
                    grid.assign(i, slot, TaskLabel::Lunch);
                }
            }
            None => tracing::trace!(employee = %employee.name, "no viable lunch window"),
        }
    }
    grid
}
