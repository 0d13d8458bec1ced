use chrono::{Datelike, Duration, NaiveDate, NaiveTime};

use crate::error::TherapistError;
use crate::models::{Availability, AvailabilityWindow, DaySlots};

pub const DEFAULT_HORIZON_DAYS: u32 = 14;
pub const MAX_HORIZON_DAYS: u32 = 60;

fn parse_time(value: &str) -> Result<NaiveTime, TherapistError> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|_| TherapistError::InvalidWindow(value.to_string()))
}

/// Checks a submitted template window: weekday 0-6 (Sunday = 0) and `HH:MM`
/// bounds with `start_time < end_time`.
pub fn validate_window(window: &AvailabilityWindow) -> Result<(), TherapistError> {
    if window.day_of_week > 6 {
        return Err(TherapistError::Validation(format!(
            "day_of_week must be between 0 and 6, got {}",
            window.day_of_week
        )));
    }

    let bounds = parse_time(&window.start_time).and_then(|start| Ok((start, parse_time(&window.end_time)?)));
    match bounds {
        Ok((start, end)) if start < end => Ok(()),
        Ok(_) => Err(TherapistError::Validation(format!(
            "start_time {} must be before end_time {}",
            window.start_time, window.end_time
        ))),
        Err(_) => Err(TherapistError::Validation(format!(
            "times must be HH:MM, got {}-{}",
            window.start_time, window.end_time
        ))),
    }
}

/// Hourly slot labels (`HH:MM`) for every date in `[from, from + days)` whose
/// weekday has an active template window. Both window ends are offered.
///
/// Existing bookings are not consulted, so a returned slot may already be taken.
pub fn candidate_slots(
    template: &[Availability],
    from: NaiveDate,
    days: u32,
) -> Result<Vec<DaySlots>, TherapistError> {
    let mut result = Vec::new();

    for offset in 0..days.min(MAX_HORIZON_DAYS) {
        let date = from + Duration::days(i64::from(offset));
        let weekday = date.weekday().num_days_from_sunday() as u8;

        let mut slots = Vec::new();
        for window in template.iter().filter(|w| w.is_active && w.day_of_week == weekday) {
            let start = parse_time(&window.start_time)?;
            let end = parse_time(&window.end_time)?;

            let mut slot = start;
            while slot <= end {
                slots.push(slot.format("%H:%M").to_string());
                let (next, wrapped) = slot.overflowing_add_signed(Duration::hours(1));
                if wrapped != 0 {
                    break;
                }
                slot = next;
            }
        }

        slots.sort();
        slots.dedup();

        if !slots.is_empty() {
            result.push(DaySlots { date, slots });
        }
    }

    Ok(result)
}
