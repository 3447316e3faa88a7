//! Month calendar projection.
//!
//! # Invariants
//! - A scheduled task appears in exactly one day cell of the month its
//!   due date falls in, and never in `unscheduled`.
//! - An unscheduled task appears only in `unscheduled`.
//! - `leading_pad` equals the weekday index of the 1st (0 = Sunday).

use crate::model::task::Task;
use chrono::{Datelike, Months, NaiveDate};
use std::fmt::{Display, Formatter};

const CHIP_LABEL_MAX_CHARS: usize = 22;
const CHIP_LABEL_KEEP_CHARS: usize = 19;

/// Displayed month, navigation-local state of the calendar view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarMonth {
    year: i32,
    month: u32,
}

impl CalendarMonth {
    /// `month` is 1-based; returns `None` outside 1..=12.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|_| Self { year, month })
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(self) -> i32 {
        self.year
    }

    pub fn month(self) -> u32 {
        self.month
    }

    pub fn previous(self) -> Self {
        self.shifted(-1)
    }

    pub fn next(self) -> Self {
        self.shifted(1)
    }

    fn shifted(self, delta: i32) -> Self {
        let first = self.first_day();
        let moved = if delta < 0 {
            first.checked_sub_months(Months::new(delta.unsigned_abs()))
        } else {
            first.checked_add_months(Months::new(delta.unsigned_abs()))
        };
        moved.map(Self::containing).unwrap_or(self)
    }

    pub fn first_day(self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn days_in_month(self) -> u32 {
        let first = self.first_day();
        first
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .map_or(31, |last| last.day())
    }

    /// Header text such as `March 2024`.
    pub fn title(self) -> String {
        self.first_day().format("%B %Y").to_string()
    }
}

impl Display for CalendarMonth {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// One calendar day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayCell {
    pub day: u32,
    /// `YYYY-MM-DD` key compared against task due dates.
    pub date_key: String,
    /// Visible tasks, at most the display limit.
    pub tasks: Vec<Task>,
    /// Tasks due this day beyond the display limit.
    pub overflow: usize,
    pub is_today: bool,
}

impl DayCell {
    pub fn total(&self) -> usize {
        self.tasks.len() + self.overflow
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarProjection {
    pub month: CalendarMonth,
    pub title: String,
    /// Empty cells before the 1st.
    pub leading_pad: u32,
    pub days: Vec<DayCell>,
    pub unscheduled: Vec<Task>,
}

impl CalendarProjection {
    pub fn derive(tasks: &[Task], month: CalendarMonth, today: NaiveDate, day_cell_limit: usize) -> Self {
        let first = month.first_day();
        let days = (1..=month.days_in_month())
            .map(|day| {
                let date_key = format!("{:04}-{:02}-{:02}", month.year(), month.month(), day);
                let mut due = tasks.iter().filter(|task| task.is_due_on(&date_key));
                let visible = due.by_ref().take(day_cell_limit).cloned().collect();
                let overflow = due.count();
                DayCell {
                    day,
                    is_today: today.year() == month.year()
                        && today.month() == month.month()
                        && today.day() == day,
                    date_key,
                    tasks: visible,
                    overflow,
                }
            })
            .collect();

        Self {
            month,
            title: month.title(),
            leading_pad: first.weekday().num_days_from_sunday(),
            days,
            unscheduled: tasks
                .iter()
                .filter(|task| !task.is_scheduled())
                .cloned()
                .collect(),
        }
    }

    pub fn cell(&self, day: u32) -> Option<&DayCell> {
        self.days.iter().find(|cell| cell.day == day)
    }

    /// Days whose visible list contains `id`.
    pub fn days_showing(&self, id: i64) -> Vec<u32> {
        self.days
            .iter()
            .filter(|cell| cell.tasks.iter().any(|task| task.id == id))
            .map(|cell| cell.day)
            .collect()
    }
}

/// Short label used for calendar chips.
pub fn chip_label(title: &str) -> String {
    if title.chars().count() > CHIP_LABEL_MAX_CHARS {
        let mut label: String = title.chars().take(CHIP_LABEL_KEEP_CHARS).collect();
        label.push_str("...");
        label
    } else {
        title.to_string()
    }
}
