use crate::schedule::time_grid::minutes_to_time_string;
use crate::schedule::{DaySchedule, TaskLabel, TimeGrid, WeekSchedule};

/// Collapses a row into runs of the same task, e.g. "08:00-12:00 Reservations"
pub fn format_task_runs(row: &[TaskLabel], time_grid: &TimeGrid) -> Vec<String> {
    let mut runs = Vec::new();
    let mut start = 0;
    for i in 1..=row.len() {
        if i == row.len() || row[i] != row[start] {
            runs.push(format!(
                "{}-{} {}",
                minutes_to_time_string(time_grid.slot_start(start)),
                minutes_to_time_string(time_grid.slot_start(i)),
                row[start]
            ));
            start = i;
        }
    }
    runs
}

/// Prints a day schedule in a readable format
pub fn print_day_schedule(day: &DaySchedule, date: chrono::NaiveDate, time_grid: &TimeGrid) {
    println!("\n=== {} {} ===", day.weekday, date);

    for (name, row) in &day.grid.rows {
        println!("  {}", name);
        for run in format_task_runs(row, time_grid) {
            println!("    {}", run);
        }
    }

    if day.violations.is_empty() {
        println!("  Coverage: all slots staffed as required");
    } else {
        println!("  Coverage issues ({}):", day.violations.len());
        for violation in &day.violations {
            println!("    - {}", violation);
        }
    }

    for warning in &day.warnings {
        println!("  Warning: {}", warning);
    }
}

pub fn print_week(week: &WeekSchedule, time_grid: &TimeGrid) {
    for (date, day) in week {
        print_day_schedule(day, *date, time_grid);
    }
}
