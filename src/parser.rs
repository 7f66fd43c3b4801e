use csv::{Reader, ReaderBuilder, StringRecord};
use std::io::Read;
use std::path::Path;

use crate::error::Result;
use crate::schedule::{CalendarEntry, Override, RawEmployee, RawWindow};

/// Lowercases a header and folds `_`/`-` into spaces so "Shift_Start",
/// "shift-start" and "Shift start" all match the same way
fn normalize_header(header: &str) -> String {
    header
        .trim()
        .to_lowercase()
        .replace(['_', '-'], " ")
}

fn find_column(headers: &[String], matches: impl Fn(&str) -> bool) -> Option<usize> {
    headers.iter().position(|h| matches(h))
}

/// Splits an abilities cell such as "Reservations; Dispatch | Network"
fn parse_abilities(value: &str) -> Vec<String> {
    value
        .split(|c| c == ';' || c == '|')
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(str::to_string)
        .collect()
}

/// Builds a window from two cells; both empty means no window.
/// A half-filled pair is kept so that validation reports it.
fn parse_window(start: &str, end: &str) -> Option<RawWindow> {
    let (start, end) = (start.trim(), end.trim());
    if start.is_empty() && end.is_empty() {
        None
    } else {
        Some(RawWindow::new(start, end))
    }
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Reads a roster CSV.
///
/// Columns are located by header name and fall back to the order
/// `name, shift start, shift end, lunch start, lunch end, abilities,
/// specialist task, hours`. Rows without a name are skipped.
pub fn read_roster_csv<R: Read>(input: R) -> Result<Vec<RawEmployee>> {
    let mut reader = ReaderBuilder::new().flexible(true).from_reader(input);
    let headers: Vec<String> = reader.headers()?.iter().map(normalize_header).collect();

    // Find column indices
    let name_col = find_column(&headers, |h| h == "name" || h.contains("employee")).unwrap_or(0);
    let shift_start_col = find_column(&headers, |h| h.contains("shift") && h.contains("start")).unwrap_or(1);
    let shift_end_col = find_column(&headers, |h| h.contains("shift") && h.contains("end")).unwrap_or(2);
    let lunch_start_col = find_column(&headers, |h| h.contains("lunch") && h.contains("start")).unwrap_or(3);
    let lunch_end_col = find_column(&headers, |h| h.contains("lunch") && h.contains("end")).unwrap_or(4);
    let abilities_col = find_column(&headers, |h| h.contains("abilit")).unwrap_or(5);
    let specialist_col = find_column(&headers, |h| h.contains("specialist")).unwrap_or(6);
    let hours_col = find_column(&headers, |h| h.contains("hour")).unwrap_or(7);

    let mut employees = Vec::new();
    let mut record = StringRecord::new();
    while reader.read_record(&mut record)? {
        let cell = |col: usize| record.get(col).unwrap_or("");

        let name = cell(name_col).trim().to_string();
        if name.is_empty() {
            continue;
        }

        employees.push(RawEmployee {
            name,
            shift: parse_window(cell(shift_start_col), cell(shift_end_col)),
            lunch: parse_window(cell(lunch_start_col), cell(lunch_end_col)),
            abilities: parse_abilities(cell(abilities_col)),
            specialist_task: optional(cell(specialist_col)),
            hours: cell(hours_col).trim().parse().ok(),
        });
    }

    Ok(employees)
}

/// Reads a JSON array of employee records
pub fn read_roster_json<R: Read>(input: R) -> Result<Vec<RawEmployee>> {
    Ok(serde_json::from_reader(input)?)
}

/// Loads a roster file, choosing JSON or CSV by extension
pub fn load_roster<P: AsRef<Path>>(path: P) -> Result<Vec<RawEmployee>> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)?;
    let is_json = path
        .extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        read_roster_json(file)
    } else {
        read_roster_csv(file)
    }
}

/// Reads `name,date,start,end` rows; empty start and end mean a PTO day
pub fn read_calendar_csv<R: Read>(input: R) -> Result<Vec<CalendarEntry>> {
    let mut reader = Reader::from_reader(input);
    let mut entries = Vec::new();
    for result in reader.deserialize() {
        entries.push(result?);
    }
    Ok(entries)
}

pub fn load_calendar<P: AsRef<Path>>(path: P) -> Result<Vec<CalendarEntry>> {
    read_calendar_csv(std::fs::File::open(path)?)
}

/// Reads `name,day,task,start,end` override rows, keeping file order
pub fn read_overrides_csv<R: Read>(input: R) -> Result<Vec<Override>> {
    let mut reader = Reader::from_reader(input);
    let mut overrides = Vec::new();
    for result in reader.deserialize() {
        overrides.push(result?);
    }
    Ok(overrides)
}

pub fn load_overrides<P: AsRef<Path>>(path: P) -> Result<Vec<Override>> {
    read_overrides_csv(std::fs::File::open(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::TaskLabel;
    use chrono::{NaiveDate, Weekday};

    #[test]
    fn test_roster_csv_by_header() {
        let csv = "\
Employee Name,Abilities,Shift_Start,Shift_End,Lunch Start,Lunch End,Specialist Task,Hours
Ann,Reservations;Dispatch,08:00,17:00,12:00,13:00,,40
Bob,Reservations | Dispatch | Network,07:30,17:00,,,Network,
,Reservations,08:00,17:00,,,,
";
        let employees = read_roster_csv(csv.as_bytes()).unwrap();
        assert_eq!(employees.len(), 2);

        let ann = &employees[0];
        assert_eq!(ann.name, "Ann");
        assert_eq!(ann.shift, Some(RawWindow::new("08:00", "17:00")));
        assert_eq!(ann.lunch, Some(RawWindow::new("12:00", "13:00")));
        assert_eq!(ann.abilities, vec!["Reservations", "Dispatch"]);
        assert_eq!(ann.specialist_task, None);
        assert_eq!(ann.hours, Some(40.0));

        let bob = &employees[1];
        assert_eq!(bob.lunch, None);
        assert_eq!(bob.abilities.len(), 3);
        assert_eq!(bob.specialist_task.as_deref(), Some("Network"));
    }

    #[test]
    fn test_half_filled_window_is_kept_for_validation() {
        let csv = "name,shift start,shift end\nAnn,08:00,\n";
        let employees = read_roster_csv(csv.as_bytes()).unwrap();
        assert_eq!(employees[0].shift, Some(RawWindow::new("08:00", "")));
    }

    #[test]
    fn test_roster_json() {
        let json = r#"[{"name":"Ann","shift":{"start":"08:00","end":"17:00"},"abilities":["Dispatch"]}]"#;
        let employees = read_roster_json(json.as_bytes()).unwrap();
        assert_eq!(employees[0].abilities, vec!["Dispatch"]);
    }

    #[test]
    fn test_calendar_csv() {
        let csv = "name,date,start,end\nAnn,2024-06-03,,\nBob,2024-06-04,10:00,11:00\n";
        let entries = read_calendar_csv(csv.as_bytes()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].date, NaiveDate::from_ymd_opt(2024, 6, 3).unwrap());
        assert_eq!(entries[0].start, None);
        assert_eq!(entries[1].start.as_deref(), Some("10:00"));
    }

    #[test]
    fn test_overrides_csv() {
        let csv = "name,day,task,start,end\nAnn,Monday,Badges/Projects,12:00,12:30\nBob,fri,Dispatch,09:00,10:00\n";
        let overrides = read_overrides_csv(csv.as_bytes()).unwrap();
        assert_eq!(overrides.len(), 2);
        assert_eq!(overrides[0].day, Weekday::Mon);
        assert_eq!(overrides[0].task, TaskLabel::Specialist("Badges/Projects".to_string()));
        assert_eq!(overrides[1].day, Weekday::Fri);
        assert_eq!(overrides[1].start_time, "09:00");
    }

    #[test]
    fn test_bad_calendar_date_is_an_error() {
        let csv = "name,date,start,end\nAnn,next tuesday,,\n";
        assert!(read_calendar_csv(csv.as_bytes()).is_err());
    }
}
