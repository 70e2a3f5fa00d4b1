//! crates/liturgy_core/src/cycles.rs
//!
//! Derives the liturgical year and the Sunday (A/B/C) and weekday (I/II) reading
//! cycles for a date.

use crate::calendar::first_sunday_of_advent;
use crate::classifier::LiturgicalCalendar;
use crate::domain::{
    CalendarDate, CycleApplicability, CycleInfo, LiturgicalDayInfo, SundayCycle, WeekdayCycle,
};
use crate::ports::PortResult;

/// The liturgical year a date belongs to. A liturgical year starts on the first
/// Sunday of Advent of the preceding calendar year and is named after the year
/// in which it ends.
pub fn liturgical_year(date: CalendarDate) -> i32 {
    let year = date.year();

    // Every date of `year` is on or after the previous year's Advent, so the
    // only boundary that matters is the current one.
    if date >= first_sunday_of_advent(year) {
        year + 1
    } else {
        year
    }
}

pub fn sunday_cycle(liturgical_year: i32) -> SundayCycle {
    match liturgical_year.rem_euclid(3) {
        1 => SundayCycle::A,
        2 => SundayCycle::B,
        _ => SundayCycle::C,
    }
}

/// Combines a classified day with the cycle rules.
///
/// The weekday cycle follows the calendar year, not the liturgical year.
pub fn derive_cycles(date: CalendarDate, day_info: LiturgicalDayInfo) -> CycleInfo {
    let is_major = day_info.day_type.is_major();
    let liturgical_year = liturgical_year(date);

    let (cycle_applicability, weekday_cycle) = if is_major {
        (CycleApplicability::SundayOrMajor, WeekdayCycle::NotApplicable)
    } else if date.year().rem_euclid(2) == 1 {
        (CycleApplicability::Weekday, WeekdayCycle::I)
    } else {
        (CycleApplicability::Weekday, WeekdayCycle::II)
    };

    CycleInfo {
        sunday_cycle: sunday_cycle(liturgical_year),
        weekday_cycle,
        cycle_applicability,
        liturgical_year,
        day_info,
    }
}

impl LiturgicalCalendar {
    /// Classifies the date and resolves its reading cycles. Lookup failures propagate.
    pub async fn resolve_cycles(&self, date: CalendarDate) -> PortResult<CycleInfo> {
        let day_info = self.classify(date).await?;
        Ok(derive_cycles(date, day_info))
    }
}
