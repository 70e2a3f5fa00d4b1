//! services/api/src/web/readings_task.rs
//!
//! The "worker" functions behind the Gemini-backed endpoints: looking up the Mass
//! reading references for a date and writing a two-part summary of a passage.

use liturgy_core::{
    domain::{CalendarDate, Reading, ReadingSummary},
    normalize::{parse_reading_references, parse_reading_summary},
    ports::{GenerationOptions, PortResult, TextGenerationService},
    readings::fixed_readings_for,
};
use std::time::Instant;
use tracing::info;

const READINGS_PROMPT: &str = r#"As a Catholic liturgical expert, provide the scripture references for the Mass readings on {date}.
Return ONLY a JSON array of objects with 'title' and 'reference' properties.
Example: [
  {"title": "First Reading", "reference": "Acts 2:14, 22-33"},
  {"title": "Responsorial Psalm", "reference": "Psalm 16:1-2, 5, 7-11"},
  {"title": "Second Reading", "reference": "1 Peter 1:17-21"},
  {"title": "Gospel", "reference": "Luke 24:13-35"}
]
Do not include any explanatory text, only the JSON array."#;

const SUMMARY_PROMPT: &str = r#"Generate TWO different summaries for the Bible passage {title}: {citation} that explain its importance to Catholics:

1. CONCISE SUMMARY: A bullet-point list (5-6 points) of key theological themes and significance, followed by a concluding sentence. Format exactly like this:

For Catholics, {citation} is significant because it:

• [First key point about theological significance]
• [Second key point]
• [Third key point]
• [Fourth key point]
• [Fifth key point]
• [Optional sixth point if needed]

[One concluding sentence that ties the points together]

2. DETAILED EXPLANATION: A longer, structured explanation with headings and bullet points explaining the passage's context, theological themes, and Catholic interpretation. Use Markdown formatting with bold headings and bullet points.

Return BOTH summaries in a JSON object with these exact keys:
{"conciseSummary": "...", "detailedExplanation": "..."}"#;

/// Low temperature keeps the references close to the lectionary.
const READINGS_TEMPERATURE: f32 = 0.1;

/// Returns the reading references for `date`.
///
/// Holy Saturday is answered from the fixed Easter Vigil table without calling the
/// generator.
pub async fn fetch_daily_readings(
    generator: &dyn TextGenerationService,
    date: CalendarDate,
) -> PortResult<Vec<Reading>> {
    if let Some(readings) = fixed_readings_for(date) {
        info!(%date, "Easter Vigil detected, using the fixed readings");
        return Ok(readings);
    }

    let start_time = Instant::now();
    let prompt = READINGS_PROMPT.replace("{date}", &date.to_string());
    let options = GenerationOptions {
        temperature: READINGS_TEMPERATURE,
        json_response: true,
    };
    let raw = generator.generate_text(&prompt, options).await?;
    let readings = parse_reading_references(&raw)?;

    info!(
        %date,
        count = readings.len(),
        "⏱️ Fetched readings in {:?}",
        start_time.elapsed()
    );
    Ok(readings)
}

/// Asks the generator for a concise and a detailed summary of one passage.
pub async fn summarize_passage(
    generator: &dyn TextGenerationService,
    title: &str,
    citation: &str,
) -> PortResult<ReadingSummary> {
    let prompt = SUMMARY_PROMPT
        .replace("{title}", title)
        .replace("{citation}", citation);
    let raw = generator
        .generate_text(&prompt, GenerationOptions::default())
        .await?;
    info!(title, citation, "Generated passage summary");
    Ok(parse_reading_summary(&raw))
}
