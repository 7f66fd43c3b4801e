use super::engine::WorkGrid;
use super::roster::Roster;
use super::rules::StaffingRules;
use super::time_grid::TimeGrid;
use super::types::{Role, TaskLabel};

/// Chooses who to place in a role for one slot.
///
/// Takes candidates in the order given until `target` is reached, counting
/// the `already_assigned` holders. Never unassigns anyone.
pub fn fill_role(candidates: &[usize], target: u32, already_assigned: u32) -> Vec<usize> {
    let needed = target.saturating_sub(already_assigned) as usize;
    candidates.iter().copied().take(needed).collect()
}

/// Pass 2: fill Dispatch and then Reservations up to the slot's requirement
pub fn cover_mandatory_roles(
    mut grid: WorkGrid,
    roster: &Roster,
    time_grid: &TimeGrid,
    rules: &StaffingRules,
) -> WorkGrid {
    for slot in time_grid.slots_for_day() {
        let requirement = rules.requirement_at(slot.start);
        for role in Role::FILL_ORDER {
            let candidates = grid.available_for(roster, slot.index, role);
            let chosen = fill_role(
                &candidates,
                requirement.for_role(role),
                grid.role_count(slot.index, role),
            );
            for employee in chosen {
                grid.assign(employee, slot.index, TaskLabel::Role(role));
            }
        }
    }
    grid
}
