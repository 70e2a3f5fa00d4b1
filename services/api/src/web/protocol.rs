//! services/api/src/web/protocol.rs
//!
//! Defines the JSON contract between clients and the proxy: the request bodies each
//! endpoint accepts and the `{status, responseType, data}` envelope every response
//! is wrapped in.

use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use liturgy_core::ports::PortError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::error;
use utoipa::{IntoParams, ToSchema};

//=========================================================================================
// Request Bodies
//=========================================================================================
// Fields are optional so that a missing value produces an error envelope instead of the
// framework's plain-text rejection. Bodies that fail to parse at all are caught by `ApiJson`.
//=========================================================================================

/// A JSON body extractor whose rejections are sent as error envelopes.
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiResponse;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(ApiResponse::error(rejection.status(), rejection.body_text())),
        }
    }
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct DailyReadingsRequest {
    /// The date in `YYYY-MM-DD` format.
    pub date: Option<String>,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct ReadingSummaryRequest {
    pub title: Option<String>,
    pub citation: Option<String>,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct MagisteriumRequest {
    /// An array of `{role, content}` chat messages.
    #[schema(value_type = Vec<Object>)]
    pub messages: Option<Value>,
    #[serde(default)]
    pub return_related_questions: bool,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct MagisteriumSummaryRequest {
    /// The reading text to summarize.
    pub reading: Option<String>,
}

#[derive(Deserialize, Debug, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NextSpecialParams {
    /// How many days ahead to scan. Defaults to 30.
    pub max_days: Option<u32>,
}

//=========================================================================================
// Response Envelope
//=========================================================================================

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeStatus {
    Success,
    Error,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    Json,
    Text,
    Error,
}

/// The body of every response sent by the proxy.
#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub status: EnvelopeStatus,
    pub response_type: ResponseType,
    #[schema(value_type = Object)]
    pub data: Value,
}

/// An envelope paired with the HTTP status it is sent with.
#[derive(Debug)]
pub struct ApiResponse {
    pub status_code: StatusCode,
    pub envelope: Envelope,
}

impl ApiResponse {
    pub fn new(
        status_code: StatusCode,
        status: EnvelopeStatus,
        response_type: ResponseType,
        data: Value,
    ) -> Self {
        Self {
            status_code,
            envelope: Envelope {
                status,
                response_type,
                data,
            },
        }
    }

    /// A `200 OK` success envelope with a JSON payload.
    ///
    /// Degrades to a `500` error envelope if the payload cannot be serialized.
    pub fn json<T: Serialize>(data: &T) -> Self {
        match serde_json::to_value(data) {
            Ok(value) => Self::new(
                StatusCode::OK,
                EnvelopeStatus::Success,
                ResponseType::Json,
                value,
            ),
            Err(e) => Self::from_port_error(&PortError::SerializationFailure(e.to_string())),
        }
    }

    pub fn text(data: impl Into<String>) -> Self {
        Self::new(
            StatusCode::OK,
            EnvelopeStatus::Success,
            ResponseType::Text,
            Value::String(data.into()),
        )
    }

    pub fn error(status_code: StatusCode, message: impl Into<String>) -> Self {
        Self::new(
            status_code,
            EnvelopeStatus::Error,
            ResponseType::Error,
            Value::String(message.into()),
        )
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::error(StatusCode::BAD_REQUEST, message)
    }

    /// Maps a port failure to its HTTP status and an error envelope carrying its message.
    pub fn from_port_error(err: &PortError) -> Self {
        let status_code = status_for(err);
        if status_code.is_server_error() {
            error!(error = %err, "Request failed");
        }
        Self::error(status_code, err.to_string())
    }
}

pub fn status_for(err: &PortError) -> StatusCode {
    match err {
        PortError::InvalidDateFormat(_) => StatusCode::BAD_REQUEST,
        PortError::UpstreamLookupFailure(_)
        | PortError::UpstreamServiceFailure(_)
        | PortError::MalformedUpstreamPayload(_)
        | PortError::MissingField(_) => StatusCode::BAD_GATEWAY,
        PortError::SerializationFailure(_) | PortError::Unexpected(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        (self.status_code, Json(self.envelope)).into_response()
    }
}

impl From<PortError> for ApiResponse {
    fn from(err: PortError) -> Self {
        Self::from_port_error(&err)
    }
}
