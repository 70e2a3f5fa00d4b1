pub mod calendar;
pub mod classifier;
pub mod cycles;
pub mod domain;
pub mod normalize;
pub mod ports;
pub mod readings;

pub use calendar::{compute_easter, first_sunday_of_advent, validate_date};
pub use classifier::{classify_day, LiturgicalCalendar, DEFAULT_SCAN_DAYS};
pub use cycles::{derive_cycles, liturgical_year};
pub use domain::{
    CalendarDate, CelebrationRecord, ChatChoice, ChatMessage, CycleApplicability, CycleInfo,
    DayType, LiturgicalDayInfo, LiturgicalReading, NormalizedChatResponse, RawLiturgicalDay,
    Reading, ReadingSummary, SpecialDay, SundayCycle, WeekdayCycle,
};
pub use normalize::{
    extract_balanced_json, extract_summary_field, normalize_chat_response,
    parse_reading_references, parse_reading_summary, SUMMARY_UNAVAILABLE,
};
pub use ports::{
    ChatCompletionService, GenerationOptions, LiturgicalDayLookup, PortError, PortResult,
    TextGenerationService,
};
pub use readings::easter_vigil_readings;
