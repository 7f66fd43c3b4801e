pub mod types;
pub mod time_grid;
pub mod rules;
pub mod roster;
pub mod engine;
pub mod lunch;
pub mod coverage;
pub mod overrides;
pub mod validator;
pub mod week;

pub use types::{DayGrid, DaySchedule, Override, Role, TaskLabel, Violation, WeekSchedule};
pub use time_grid::{TimeGrid, TimeSlot, Window};
pub use rules::{LunchConfig, Requirement, StaffingRules};
pub use roster::{normalize_roster, CalendarEntry, Employee, RawEmployee, RawWindow, Roster};
pub use engine::allocate_day;
pub use overrides::{apply_override, apply_overrides, check_override_day, clear_overrides};
pub use validator::validate;
pub use week::{build_day, build_week, business_days};
