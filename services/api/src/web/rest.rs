//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::{
    chat_task::{proxy_conversation, summarize_reading},
    protocol::{
        ApiJson, ApiResponse, DailyReadingsRequest, Envelope, EnvelopeStatus, MagisteriumRequest,
        MagisteriumSummaryRequest, NextSpecialParams, ReadingSummaryRequest, ResponseType,
    },
    readings_task::{fetch_daily_readings, summarize_passage},
    state::AppState,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
};
use liturgy_core::{
    calendar::validate_date,
    classifier::DEFAULT_SCAN_DAYS,
    domain::{CalendarDate, ChatMessage, ReadingSummary},
    ports::PortError,
    readings::easter_vigil_readings,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info};
use utoipa::OpenApi;

/// Upper bound for the forward scan. The route is public and every day scanned is an
/// upstream lookup.
pub const MAX_SCAN_DAYS: u32 = 60;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        daily_readings_handler,
        reading_summary_handler,
        magisterium_handler,
        magisterium_summary_handler,
        liturgical_day_handler,
        liturgical_cycles_handler,
        next_special_day_handler,
        easter_vigil_handler,
    ),
    components(
        schemas(
            Envelope,
            EnvelopeStatus,
            ResponseType,
            DailyReadingsRequest,
            ReadingSummaryRequest,
            MagisteriumRequest,
            MagisteriumSummaryRequest,
        )
    ),
    tags(
        (name = "Liturgy Proxy API", description = "Liturgical calendar facts and proxied reading and chat endpoints.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Helpers
//=========================================================================================

fn parse_date(raw: &str) -> Result<CalendarDate, ApiResponse> {
    validate_date(raw).ok_or_else(|| {
        info!(date = raw, "Rejected invalid date");
        ApiResponse::from_port_error(&PortError::InvalidDateFormat(raw.to_string()))
    })
}

fn scan_window(max_days: Option<u32>) -> Result<u32, ApiResponse> {
    let max_days = max_days.unwrap_or(DEFAULT_SCAN_DAYS);
    if max_days == 0 || max_days > MAX_SCAN_DAYS {
        info!(max_days, "Rejected scan window");
        return Err(ApiResponse::bad_request(format!(
            "max_days must be between 1 and {}",
            MAX_SCAN_DAYS
        )));
    }
    Ok(max_days)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

//=========================================================================================
// Gemini-backed Handlers
//=========================================================================================

/// Get the Mass reading references for a date.
///
/// Holy Saturday returns the fixed Easter Vigil readings.
#[utoipa::path(
    post,
    path = "/daily-readings",
    request_body = DailyReadingsRequest,
    responses(
        (status = 200, description = "Readings as `[{title, reference}]`", body = Envelope),
        (status = 400, description = "Missing or invalid date", body = Envelope),
        (status = 502, description = "The text-generation service failed", body = Envelope)
    )
)]
pub async fn daily_readings_handler(
    State(app_state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<DailyReadingsRequest>,
) -> Result<ApiResponse, ApiResponse> {
    let raw_date = non_empty(request.date).ok_or_else(|| {
        ApiResponse::bad_request("Invalid request: Missing 'date' in YYYY-MM-DD format")
    })?;
    let date = parse_date(&raw_date)?;

    let readings = fetch_daily_readings(app_state.text_generator.as_ref(), date).await?;
    Ok(ApiResponse::json(&readings))
}

/// Generate a concise and a detailed explanation of a Bible passage.
#[utoipa::path(
    post,
    path = "/reading-summary",
    request_body = ReadingSummaryRequest,
    responses(
        (status = 200, description = "`{summary, detailedExplanation}` or plain text", body = Envelope),
        (status = 400, description = "Missing title or citation", body = Envelope),
        (status = 502, description = "The text-generation service failed", body = Envelope)
    )
)]
pub async fn reading_summary_handler(
    State(app_state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<ReadingSummaryRequest>,
) -> Result<ApiResponse, ApiResponse> {
    let (Some(title), Some(citation)) = (non_empty(request.title), non_empty(request.citation))
    else {
        return Err(ApiResponse::bad_request(
            "Invalid request: Missing 'title' or 'citation'",
        ));
    };

    let summary = summarize_passage(app_state.text_generator.as_ref(), &title, &citation).await?;
    Ok(match summary {
        ReadingSummary::Text(text) => ApiResponse::text(text),
        structured => ApiResponse::json(&structured),
    })
}

//=========================================================================================
// Magisterium-backed Handlers
//=========================================================================================

/// Proxy a conversation to the Magisterium API.
///
/// Upstream failures are reported inside the chat contract as an apology message with
/// finish reason `error`, not as an HTTP error.
#[utoipa::path(
    post,
    path = "/magisterium",
    request_body = MagisteriumRequest,
    responses(
        (status = 200, description = "A normalized `{choices, citations, related_questions}` response", body = Envelope),
        (status = 400, description = "Missing or invalid messages array", body = Envelope)
    )
)]
pub async fn magisterium_handler(
    State(app_state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<MagisteriumRequest>,
) -> Result<ApiResponse, ApiResponse> {
    let invalid = || ApiResponse::bad_request("Invalid request: Missing or invalid 'messages' array");

    let messages = match request.messages {
        Some(value @ Value::Array(_)) => {
            serde_json::from_value::<Vec<ChatMessage>>(value).map_err(|e| {
                info!(error = %e, "Rejected malformed chat messages");
                invalid()
            })?
        }
        _ => return Err(invalid()),
    };
    if messages.is_empty() {
        return Err(invalid());
    }

    let (response, upstream_ok) = proxy_conversation(
        app_state.chat_service.as_ref(),
        &messages,
        request.return_related_questions,
    )
    .await;

    let mut reply = ApiResponse::json(&response);
    if !upstream_ok && reply.status_code == StatusCode::OK {
        reply.envelope.status = EnvelopeStatus::Error;
    }
    Ok(reply)
}

/// Summarize a single reading through the Magisterium API.
#[utoipa::path(
    post,
    path = "/magisterium/summary",
    request_body = MagisteriumSummaryRequest,
    responses(
        (status = 200, description = "The summary text, or a fixed fallback message", body = Envelope),
        (status = 400, description = "Missing reading", body = Envelope)
    )
)]
pub async fn magisterium_summary_handler(
    State(app_state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<MagisteriumSummaryRequest>,
) -> Result<ApiResponse, ApiResponse> {
    let reading = non_empty(request.reading)
        .ok_or_else(|| ApiResponse::bad_request("Invalid request: Missing 'reading'"))?;
    let summary = summarize_reading(app_state.chat_service.as_ref(), &reading).await;
    Ok(ApiResponse::text(summary))
}

//=========================================================================================
// Liturgical Calendar Handlers
//=========================================================================================

/// Classify a single date.
#[utoipa::path(
    get,
    path = "/liturgical/{date}",
    params(("date" = String, Path, description = "The date in YYYY-MM-DD format")),
    responses(
        (status = 200, description = "The liturgical day info", body = Envelope),
        (status = 400, description = "Invalid date", body = Envelope),
        (status = 502, description = "The calendar lookup failed", body = Envelope)
    )
)]
pub async fn liturgical_day_handler(
    State(app_state): State<Arc<AppState>>,
    Path(raw_date): Path<String>,
) -> Result<ApiResponse, ApiResponse> {
    let date = parse_date(&raw_date)?;
    let info = app_state.calendar.classify(date).await?;
    Ok(ApiResponse::json(&info))
}

/// Resolve the Sunday and weekday lectionary cycles for a date.
#[utoipa::path(
    get,
    path = "/liturgical/{date}/cycles",
    params(("date" = String, Path, description = "The date in YYYY-MM-DD format")),
    responses(
        (status = 200, description = "The cycle info", body = Envelope),
        (status = 400, description = "Invalid date", body = Envelope),
        (status = 502, description = "The calendar lookup failed", body = Envelope)
    )
)]
pub async fn liturgical_cycles_handler(
    State(app_state): State<Arc<AppState>>,
    Path(raw_date): Path<String>,
) -> Result<ApiResponse, ApiResponse> {
    let date = parse_date(&raw_date)?;
    let cycles = app_state.calendar.resolve_cycles(date).await.map_err(|e| {
        error!(%date, error = %e, "Failed to resolve liturgical cycles");
        ApiResponse::from(e)
    })?;
    Ok(ApiResponse::json(&cycles))
}

/// Find the next Sunday, feast or solemnity after a date.
#[utoipa::path(
    get,
    path = "/liturgical/{date}/next-special",
    params(
        ("date" = String, Path, description = "The date in YYYY-MM-DD format"),
        NextSpecialParams
    ),
    responses(
        (status = 200, description = "`{date, name, type}`, or null when none is found", body = Envelope),
        (status = 400, description = "Invalid date or scan window", body = Envelope)
    )
)]
pub async fn next_special_day_handler(
    State(app_state): State<Arc<AppState>>,
    Path(raw_date): Path<String>,
    Query(params): Query<NextSpecialParams>,
) -> Result<ApiResponse, ApiResponse> {
    let date = parse_date(&raw_date)?;
    let max_days = scan_window(params.max_days)?;
    let special = app_state.calendar.find_next_special_day(date, max_days).await;
    Ok(ApiResponse::json(&special))
}

/// The fixed Easter Vigil readings.
#[utoipa::path(
    get,
    path = "/easter-vigil",
    responses(
        (status = 200, description = "The 16 Easter Vigil readings in order", body = Envelope)
    )
)]
pub async fn easter_vigil_handler() -> ApiResponse {
    ApiResponse::json(&easter_vigil_readings())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_rejects_bad_input() {
        assert!(parse_date("2024-02-05").is_ok());
        let err = parse_date("2024-2-5").unwrap_err();
        assert_eq!(err.status_code, StatusCode::BAD_REQUEST);
        assert_eq!(
            err.envelope.data,
            "Invalid date format: '2024-2-5'. Please use YYYY-MM-DD"
        );
    }

    #[test]
    fn test_scan_window_is_bounded() {
        assert_eq!(scan_window(None).unwrap(), DEFAULT_SCAN_DAYS);
        assert_eq!(scan_window(Some(1)).unwrap(), 1);
        assert_eq!(scan_window(Some(60)).unwrap(), 60);
        for rejected in [0, 61, 366] {
            let err = scan_window(Some(rejected)).unwrap_err();
            assert_eq!(err.status_code, StatusCode::BAD_REQUEST);
            assert_eq!(err.envelope.data, "max_days must be between 1 and 60");
        }
    }

    #[test]
    fn test_non_empty_drops_blank_values() {
        assert_eq!(non_empty(Some("  ".to_string())), None);
        assert_eq!(non_empty(None), None);
        assert_eq!(non_empty(Some("Gospel".to_string())).as_deref(), Some("Gospel"));
    }

    #[tokio::test]
    async fn test_easter_vigil_handler_lists_sixteen_readings() {
        let response = easter_vigil_handler().await;
        assert_eq!(response.status_code, StatusCode::OK);
        assert_eq!(response.envelope.data.as_array().map(Vec::len), Some(16));
    }

    #[test]
    fn test_openapi_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/daily-readings",
            "/reading-summary",
            "/magisterium",
            "/magisterium/summary",
            "/liturgical/{date}",
            "/liturgical/{date}/cycles",
            "/liturgical/{date}/next-special",
            "/easter-vigil",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
