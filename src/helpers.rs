//! Display formatting and field validation shared by every view.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use lazy_regex::regex_is_match;
use ratatui::style::Color;

use crate::task::TaskStatus;

pub const DEFAULT_PRIORITY: i32 = 5;
pub const MIN_PRIORITY: i32 = 1;
pub const MAX_PRIORITY: i32 = 10;

const UNKNOWN: &str = "Unknown";
const INVALID_DATE: &str = "Invalid date";
const NO_DUE_DATE: &str = "No due date";

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Parses the timestamp shapes the API emits: RFC 3339, naive ISO
/// date-times (seconds and fractions optional) and bare dates.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Local).naive_local());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(dt);
        }
    }
    parse_date(value).and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Calendar day of a date or date-time value.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Ok(d) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(d);
    }
    let head = value.split(['T', ' ']).next()?;
    if head.len() != value.len() {
        return NaiveDate::parse_from_str(head, "%Y-%m-%d").ok();
    }
    None
}

/// `"Jan 5, 2024, 03:07 PM"`.
pub fn format_date_time(value: Option<&str>) -> String {
    let Some(value) = present(value) else {
        return UNKNOWN.to_string();
    };
    match parse_timestamp(value) {
        Some(dt) => dt.format("%b %-d, %Y, %I:%M %p").to_string(),
        None => {
            tracing::debug!(value, "unparsable timestamp");
            INVALID_DATE.to_string()
        }
    }
}

/// `"Friday, January 5, 2024"`.
pub fn format_date_long(value: Option<&str>) -> String {
    let Some(value) = present(value) else {
        return NO_DUE_DATE.to_string();
    };
    match parse_date(value) {
        Some(d) => d.format("%A, %B %-d, %Y").to_string(),
        None => {
            tracing::debug!(value, "unparsable date");
            INVALID_DATE.to_string()
        }
    }
}

pub fn is_overdue(due_date: Option<&str>, status: TaskStatus) -> bool {
    is_overdue_on(due_date, status, Local::now().date_naive())
}

/// Overdue means the due day is strictly before `today`; completed tasks
/// never are.
pub fn is_overdue_on(due_date: Option<&str>, status: TaskStatus, today: NaiveDate) -> bool {
    if status == TaskStatus::Completed {
        return false;
    }
    present(due_date)
        .and_then(parse_date)
        .is_some_and(|due| due < today)
}

pub fn normalize_priority(priority: Option<i32>) -> i32 {
    match priority {
        None | Some(0) => DEFAULT_PRIORITY,
        Some(p) => p,
    }
}

pub fn priority_level_text(priority: Option<i32>) -> &'static str {
    match normalize_priority(priority) {
        p if p >= 9 => "Very High",
        p if p >= 7 => "High",
        p if p >= 5 => "Medium",
        p if p >= 3 => "Low",
        _ => "Very Low",
    }
}

pub fn is_valid_priority(priority: i32) -> bool {
    (MIN_PRIORITY..=MAX_PRIORITY).contains(&priority)
}

pub fn parse_priority(input: &str) -> Option<i32> {
    input.trim().parse().ok()
}

pub fn is_valid_email(email: &str) -> bool {
    regex_is_match!(r"^[^\s@]+@[^\s@]+\.[^\s@]+$", email)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusColor {
    Green,
    Blue,
    Amber,
    Slate,
}

impl StatusColor {
    pub fn hex(self) -> &'static str {
        match self {
            StatusColor::Green => "#10b981",
            StatusColor::Blue => "#3b82f6",
            StatusColor::Amber => "#f59e0b",
            StatusColor::Slate => "#64748b",
        }
    }

    pub fn color(self) -> Color {
        match self {
            StatusColor::Green => Color::Rgb(0x10, 0xb9, 0x81),
            StatusColor::Blue => Color::Rgb(0x3b, 0x82, 0xf6),
            StatusColor::Amber => Color::Rgb(0xf5, 0x9e, 0x0b),
            StatusColor::Slate => Color::Rgb(0x64, 0x74, 0x8b),
        }
    }
}

pub fn status_color(status: Option<&str>) -> StatusColor {
    match status.map(str::to_ascii_lowercase).as_deref() {
        Some("completed") => StatusColor::Green,
        Some("in-progress") => StatusColor::Blue,
        Some("pending") => StatusColor::Amber,
        _ => StatusColor::Slate,
    }
}
