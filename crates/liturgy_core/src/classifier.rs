//! crates/liturgy_core/src/classifier.rs
//!
//! Turns the raw celebration list of a day into a classified `LiturgicalDayInfo`,
//! and scans forward for the next Sunday, solemnity or feast.

use crate::domain::{
    CalendarDate, CelebrationRecord, DayType, LiturgicalDayInfo, RawLiturgicalDay, SpecialDay,
};
use crate::ports::{LiturgicalDayLookup, PortResult};
use std::sync::Arc;
use tracing::{debug, warn};

/// Default window of the forward scan, in days.
pub const DEFAULT_SCAN_DAYS: u32 = 30;

//=========================================================================================
// Pure Classification
//=========================================================================================

/// Classifies a day from the provider's raw payload.
///
/// Celebrations are ordered by `rank_num` descending; the sort is stable so that
/// equally ranked celebrations keep the provider's order.
pub fn classify_day(date: CalendarDate, raw: RawLiturgicalDay) -> LiturgicalDayInfo {
    let mut celebrations = raw.celebrations;
    celebrations.sort_by(|a, b| b.rank_num.total_cmp(&a.rank_num));

    let season = raw
        .season
        .unwrap_or_else(|| "ordinary".to_string())
        .to_lowercase();
    let weekday = raw
        .weekday
        .unwrap_or_else(|| date.weekday_name().to_string())
        .to_lowercase();

    let primary = celebrations.first();
    let day_type = classify_rank(date, primary, &season);
    let title = primary
        .map(|c| c.title.clone())
        .unwrap_or_else(|| "Unknown".to_string());

    LiturgicalDayInfo {
        title,
        season,
        season_week: raw.season_week.unwrap_or(0),
        weekday,
        celebrations,
        day_type,
    }
}

/// Applies the rank precedence rules to the primary celebration. First match wins.
fn classify_rank(date: CalendarDate, primary: Option<&CelebrationRecord>, season: &str) -> DayType {
    let rank = primary.map(|c| c.rank.to_lowercase()).unwrap_or_default();
    let title = primary.map(|c| c.title.to_lowercase()).unwrap_or_default();

    if rank.contains("solemnity") {
        DayType::Solemnity
    } else if rank.contains("feast") && title.contains("of the lord") {
        DayType::FeastOfTheLord
    } else if rank.contains("feast") {
        DayType::Feast
    } else if rank.contains("sunday") || date.is_sunday() {
        sunday_of(season)
    } else if rank == "memorial" {
        DayType::Memorial
    } else if rank == "optional memorial" {
        DayType::OptionalMemorial
    } else if let Some(primary) = primary {
        DayType::Other(title_case(&primary.rank.replace('_', " ")))
    } else {
        DayType::Weekday
    }
}

fn sunday_of(season: &str) -> DayType {
    if season.is_empty() {
        DayType::Sunday { season: None }
    } else {
        DayType::Sunday {
            season: Some(capitalize(season)),
        }
    }
}

/// Upper-cases the first character and lower-cases the rest.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Upper-cases every letter that follows a non-letter and lower-cases the others.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut previous_is_letter = false;
    for c in s.chars() {
        if previous_is_letter {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
        previous_is_letter = c.is_alphabetic();
    }
    out
}

//=========================================================================================
// The Calendar Service
//=========================================================================================

/// Classifies dates by querying the liturgical-day provider.
///
/// Holds no state besides the lookup port, so it is cheap to clone and share.
#[derive(Clone)]
pub struct LiturgicalCalendar {
    lookup: Arc<dyn LiturgicalDayLookup>,
}

impl LiturgicalCalendar {
    pub fn new(lookup: Arc<dyn LiturgicalDayLookup>) -> Self {
        Self { lookup }
    }

    /// Looks up and classifies a single date. Lookup failures propagate.
    pub async fn classify(&self, date: CalendarDate) -> PortResult<LiturgicalDayInfo> {
        let raw = self.lookup.lookup_day(date).await?;
        let info = classify_day(date, raw);
        debug!(%date, day_type = %info.day_type, "classified liturgical day");
        Ok(info)
    }

    /// Scans the `max_days` days after `start` for the first special day.
    ///
    /// A failed lookup is logged and treated as "not special"; the scan goes on.
    pub async fn find_next_special_day(
        &self,
        start: CalendarDate,
        max_days: u32,
    ) -> Option<SpecialDay> {
        for offset in 1..=u64::from(max_days) {
            let Some(check_date) = start.checked_add_days(offset) else {
                break;
            };

            match self.classify(check_date).await {
                Ok(info) if info.day_type.is_special() => {
                    return Some(SpecialDay {
                        date: check_date,
                        name: info.title,
                        day_type: info.day_type,
                    });
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(
                        date = %check_date,
                        error = %e,
                        "Could not classify day while searching for next special day"
                    );
                }
            }
        }
        None
    }
}
