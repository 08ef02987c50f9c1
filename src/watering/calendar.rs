//! Calendar-day helpers for due dates

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::models::WateringSchedule;
use crate::error::WateringError;

/// Plants due for watering on one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub plant_ids: Vec<String>,
}

/// Calendar date of `at` as seen at `offset`.
pub fn local_date(at: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    at.with_timezone(&offset).date_naive()
}

/// Every day of the given month.
pub fn month_days(year: i32, month: u32) -> Result<Vec<NaiveDate>, WateringError> {
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
        WateringError::validation(format!("invalid calendar month {}-{:02}", year, month))
    })?;
    Ok(first
        .iter_days()
        .take_while(|d| d.month() == month)
        .collect())
}

/// Lay the active schedules' due dates out over a month.
pub fn month_view<'a>(
    schedules: impl IntoIterator<Item = &'a WateringSchedule>,
    year: i32,
    month: u32,
    offset: FixedOffset,
) -> Result<Vec<CalendarDay>, WateringError> {
    let mut days: Vec<CalendarDay> = month_days(year, month)?
        .into_iter()
        .map(|date| CalendarDay {
            date,
            plant_ids: Vec::new(),
        })
        .collect();

    for schedule in schedules.into_iter().filter(|s| s.active) {
        let due = local_date(schedule.next_due_at, offset);
        if due.year() != year || due.month() != month {
            continue;
        }
        if let Some(day) = days.get_mut(due.day0() as usize) {
            day.plant_ids.push(schedule.plant_id.clone());
        }
    }

    for day in &mut days {
        day.plant_ids.sort();
    }
    Ok(days)
}
