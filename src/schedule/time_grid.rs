use std::fmt;
use std::ops::Range;

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError};

const MINUTES_PER_DAY: u32 = 24 * 60;

/// Parses a time string (HH:MM) to minutes since midnight
pub fn to_minutes(time_str: &str) -> Result<u32> {
    let time = NaiveTime::parse_from_str(time_str.trim(), "%H:%M")
        .map_err(|_| ScheduleError::InvalidTimeFormat(time_str.to_string()))?;
    Ok(time.hour() * 60 + time.minute())
}

/// Formats minutes since midnight to time string (HH:MM)
pub fn minutes_to_time_string(minutes: u32) -> String {
    format!("{:02}:{:02}", (minutes / 60) % 24, minutes % 60)
}

/// Business days are Monday through Friday
pub fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Serde adapter storing minutes since midnight as "HH:MM"
pub(crate) mod hhmm {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(minutes: &u32, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::minutes_to_time_string(*minutes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::to_minutes(&raw).map_err(de::Error::custom)
    }
}

/// A half-open interval of the day, `[start, end)`, in minutes since midnight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Window {
    #[serde(with = "hhmm")]
    pub start: u32,
    #[serde(with = "hhmm")]
    pub end: u32,
}

impl Window {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Parses both ends of a window; ordering is not checked here
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Ok(Self::new(to_minutes(start)?, to_minutes(end)?))
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn contains(&self, minute: u32) -> bool {
        self.start <= minute && minute < self.end
    }

    /// True when the two half-open intervals share at least one minute
    pub fn overlaps(&self, start: u32, end: u32) -> bool {
        self.start < end && start < self.end
    }

    pub fn encloses(&self, other: &Window) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}",
            minutes_to_time_string(self.start),
            minutes_to_time_string(self.end)
        )
    }
}

/// One half-open slot of the scheduling day, identified by its index
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct TimeSlot {
    pub index: usize,
    pub start: u32,
    pub end: u32,
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&minutes_to_time_string(self.start))
    }
}

/// The fixed slot layout shared by every business day.
///
/// Slot `i` starts at `first_slot + i * slot_minutes`. The default grid runs
/// from 07:00 to 22:00 in 30 half-hour slots (last slot starts at 21:30).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeGrid {
    #[serde(with = "hhmm")]
    pub first_slot: u32,
    pub slot_minutes: u32,
    pub slot_count: usize,
}

impl Default for TimeGrid {
    fn default() -> Self {
        Self {
            first_slot: 7 * 60,
            slot_minutes: 30,
            slot_count: 30,
        }
    }
}

impl TimeGrid {
    pub fn validate(&self) -> Result<()> {
        if self.slot_minutes == 0 || self.slot_count == 0 {
            return Err(ScheduleError::InvalidConfig(
                "time grid needs a positive slot length and slot count".to_string(),
            ));
        }
        let day_end = self.first_slot as u64 + self.slot_minutes as u64 * self.slot_count as u64;
        if day_end > MINUTES_PER_DAY as u64 {
            return Err(ScheduleError::InvalidConfig(
                "time grid runs past midnight".to_string(),
            ));
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.slot_count
    }

    pub fn is_empty(&self) -> bool {
        self.slot_count == 0
    }

    /// Start of slot `index` in minutes since midnight
    pub fn slot_start(&self, index: usize) -> u32 {
        self.first_slot + index as u32 * self.slot_minutes
    }

    pub fn slot(&self, index: usize) -> TimeSlot {
        let start = self.slot_start(index);
        TimeSlot {
            index,
            start,
            end: start + self.slot_minutes,
        }
    }

    /// All slots of a business day, in order
    pub fn slots_for_day(&self) -> Vec<TimeSlot> {
        (0..self.slot_count).map(|i| self.slot(i)).collect()
    }

    /// Index of the slot starting exactly at `minutes`, if any
    pub fn slot_index(&self, minutes: u32) -> Option<usize> {
        if minutes < self.first_slot || (minutes - self.first_slot) % self.slot_minutes != 0 {
            return None;
        }
        let index = ((minutes - self.first_slot) / self.slot_minutes) as usize;
        (index < self.slot_count).then_some(index)
    }

    /// Indices of every slot whose start falls in `[start, end)`, clamped to the grid
    pub fn slot_range(&self, window: Window) -> Range<usize> {
        let lo = (0..self.slot_count)
            .find(|&i| self.slot_start(i) >= window.start)
            .unwrap_or(self.slot_count);
        let hi = (lo..self.slot_count)
            .find(|&i| self.slot_start(i) >= window.end)
            .unwrap_or(self.slot_count);
        lo..hi.max(lo)
    }
}
