//! Weekly staff scheduling for a reservations/dispatch desk.
//!
//! Employees are assigned to half-hour slots for each business day in four
//! passes (baseline, lunch, mandatory coverage, specialist fill), manual
//! overrides are applied on top, and the result is checked against the
//! staffing table.

pub mod config;
pub mod directive;
pub mod display;
pub mod error;
pub mod parser;
pub mod schedule;
pub mod web;

pub use error::{Result, ScheduleError};
