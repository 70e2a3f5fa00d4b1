//! crates/liturgy_core/src/domain.rs
//!
//! Defines the core data structures for the application: validated calendar
//! dates, celebration records, classified liturgical days, cycle information,
//! readings and the normalized chat-completion contract.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

//=========================================================================================
// Calendar Date
//=========================================================================================

/// A validated Gregorian calendar date. Immutable once constructed.
///
/// Serializes as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDate(NaiveDate);

impl CalendarDate {
    /// Builds a date from its parts, returning `None` for impossible dates.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    pub fn year(self) -> i32 {
        self.0.year()
    }

    pub fn month(self) -> u32 {
        self.0.month()
    }

    pub fn day(self) -> u32 {
        self.0.day()
    }

    pub fn weekday(self) -> Weekday {
        self.0.weekday()
    }

    pub fn is_sunday(self) -> bool {
        self.weekday() == Weekday::Sun
    }

    /// Full English weekday name, e.g. `"Sunday"`.
    pub fn weekday_name(self) -> &'static str {
        match self.weekday() {
            Weekday::Mon => "Monday",
            Weekday::Tue => "Tuesday",
            Weekday::Wed => "Wednesday",
            Weekday::Thu => "Thursday",
            Weekday::Fri => "Friday",
            Weekday::Sat => "Saturday",
            Weekday::Sun => "Sunday",
        }
    }

    pub fn checked_add_days(self, days: u64) -> Option<Self> {
        self.0.checked_add_days(Days::new(days)).map(Self)
    }

    pub fn checked_sub_days(self, days: u64) -> Option<Self> {
        self.0.checked_sub_days(Days::new(days)).map(Self)
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl Serialize for CalendarDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

//=========================================================================================
// Celebrations and Liturgical Days
//=========================================================================================

/// A single observance assigned to a date by the calendar-data provider.
///
/// Missing fields take the documented defaults when deserialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CelebrationRecord {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_unknown")]
    pub colour: String,
    #[serde(default = "default_unknown")]
    pub rank: String,
    #[serde(default)]
    pub rank_num: f64,
}

fn default_title() -> String {
    "Unknown Celebration".to_string()
}

fn default_unknown() -> String {
    "unknown".to_string()
}

/// The unprocessed payload returned by the calendar-data provider for one day.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawLiturgicalDay {
    #[serde(default)]
    pub celebrations: Vec<CelebrationRecord>,
    #[serde(default)]
    pub season: Option<String>,
    #[serde(default)]
    pub season_week: Option<u32>,
    #[serde(default)]
    pub weekday: Option<String>,
}

/// The classification of a liturgical day.
///
/// Serializes as its display label (`"Solemnity"`, `"Sunday of Advent"`, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DayType {
    Solemnity,
    FeastOfTheLord,
    Feast,
    /// A Sunday, labelled with its capitalized season when one is known.
    Sunday { season: Option<String> },
    Memorial,
    OptionalMemorial,
    /// Any other rank reported by the provider, title-cased.
    Other(String),
    Weekday,
}

impl DayType {
    pub fn is_sunday(&self) -> bool {
        matches!(self, DayType::Sunday { .. })
    }

    /// Sundays, solemnities and feasts of the Lord follow the Sunday cycle.
    pub fn is_major(&self) -> bool {
        matches!(
            self,
            DayType::Sunday { .. } | DayType::Solemnity | DayType::FeastOfTheLord
        )
    }

    /// Days the forward scan stops at.
    pub fn is_special(&self) -> bool {
        self.is_major() || *self == DayType::Feast
    }
}

impl fmt::Display for DayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayType::Solemnity => f.write_str("Solemnity"),
            DayType::FeastOfTheLord => f.write_str("Feast of the Lord"),
            DayType::Feast => f.write_str("Feast"),
            DayType::Sunday { season: Some(season) } => write!(f, "Sunday of {}", season),
            DayType::Sunday { season: None } => f.write_str("Sunday"),
            DayType::Memorial => f.write_str("Memorial"),
            DayType::OptionalMemorial => f.write_str("Optional Memorial"),
            DayType::Other(label) => f.write_str(label),
            DayType::Weekday => f.write_str("Weekday"),
        }
    }
}

impl Serialize for DayType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A classified liturgical day. Computed fresh per request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiturgicalDayInfo {
    pub title: String,
    pub season: String,
    pub season_week: u32,
    pub weekday: String,
    pub celebrations: Vec<CelebrationRecord>,
    #[serde(rename = "type")]
    pub day_type: DayType,
}

/// The next Sunday, solemnity or feast found by the forward scan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpecialDay {
    pub date: CalendarDate,
    pub name: String,
    #[serde(rename = "type")]
    pub day_type: DayType,
}

//=========================================================================================
// Cycles
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SundayCycle {
    A,
    B,
    C,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WeekdayCycle {
    I,
    II,
    #[serde(rename = "N/A")]
    NotApplicable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CycleApplicability {
    #[serde(rename = "Sunday/Major")]
    SundayOrMajor,
    Weekday,
}

impl fmt::Display for SundayCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SundayCycle::A => "A",
            SundayCycle::B => "B",
            SundayCycle::C => "C",
        };
        f.write_str(label)
    }
}

impl fmt::Display for WeekdayCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            WeekdayCycle::I => "I",
            WeekdayCycle::II => "II",
            WeekdayCycle::NotApplicable => "N/A",
        };
        f.write_str(label)
    }
}

impl fmt::Display for CycleApplicability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CycleApplicability::SundayOrMajor => "Sunday/Major",
            CycleApplicability::Weekday => "Weekday",
        };
        f.write_str(label)
    }
}

/// Reading cycles in force on a date, together with the day they were derived from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleInfo {
    pub sunday_cycle: SundayCycle,
    pub weekday_cycle: WeekdayCycle,
    pub cycle_applicability: CycleApplicability,
    pub liturgical_year: i32,
    pub day_info: LiturgicalDayInfo,
}

//=========================================================================================
// Readings
//=========================================================================================

/// A reading given by scripture reference only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reading {
    pub title: String,
    pub reference: String,
}

impl Reading {
    pub fn new(title: &str, reference: &str) -> Self {
        Self {
            title: title.to_string(),
            reference: reference.to_string(),
        }
    }
}

/// A reading with its full text, as returned by the summarization path.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LiturgicalReading {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub citation: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

/// The two-part explanation of a passage produced by the text-generation service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ReadingSummary {
    Structured {
        summary: String,
        #[serde(rename = "detailedExplanation")]
        detailed_explanation: String,
    },
    /// The model's answer could not be parsed; the raw text is passed through.
    Text(String),
}

//=========================================================================================
// Chat Completion Contract
//=========================================================================================

/// A single chat message, used both for outbound requests and normalized responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
    pub finish_reason: String,
}

/// The fixed shape every chat-style response is coerced into before leaving the system.
///
/// `choices` is never empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedChatResponse {
    pub choices: Vec<ChatChoice>,
    pub citations: Vec<Value>,
    pub related_questions: Vec<Value>,
}

impl NormalizedChatResponse {
    /// Builds an envelope carrying a single assistant message with finish reason `error`.
    pub fn error(content: impl Into<String>) -> Self {
        Self {
            choices: vec![ChatChoice {
                message: ChatMessage::new("assistant", content),
                finish_reason: "error".to_string(),
            }],
            citations: Vec::new(),
            related_questions: Vec::new(),
        }
    }

    /// Content of the first choice.
    pub fn first_content(&self) -> Option<&str> {
        self.choices.first().map(|c| c.message.content.as_str())
    }
}
