use chrono::NaiveDate;

use super::rules::StaffingRules;
use super::time_grid::{is_business_day, TimeGrid};
use super::types::{DayGrid, Role, Violation};

/// Checks one day's grid against the staffing table.
///
/// Every slot and mandatory role where the assigned headcount differs from
/// the requirement is reported, whether short or over. Weekend dates carry
/// no requirements.
pub fn validate(
    date: NaiveDate,
    grid: &DayGrid,
    rules: &StaffingRules,
    time_grid: &TimeGrid,
) -> Vec<Violation> {
    if !is_business_day(date) {
        return Vec::new();
    }

    let mut violations = Vec::new();
    for slot in time_grid.slots_for_day() {
        let requirement = rules.requirement_at(slot.start);
        for role in [Role::Reservations, Role::Dispatch] {
            let required = requirement.for_role(role);
            let actual = grid.coverage(slot.index, role);
            if actual != required {
                violations.push(Violation {
                    date,
                    slot: slot.index,
                    time: slot.to_string(),
                    role,
                    required,
                    actual,
                });
            }
        }
    }
    violations
}
