//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{CalapiAdapter, GeminiTextAdapter, MagisteriumChatAdapter},
    config::Config,
    error::ApiError,
    web::{
        daily_readings_handler, easter_vigil_handler, liturgical_cycles_handler,
        liturgical_day_handler, magisterium_handler, magisterium_summary_handler,
        middleware::require_auth, next_special_day_handler, reading_summary_handler,
        rest::ApiDoc, state::AppState,
    },
};
use axum::http::{
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    HeaderValue, Method,
};
use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use liturgy_core::classifier::LiturgicalCalendar;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Initialize Service Adapters ---
    let calendar_adapter = Arc::new(CalapiAdapter::new(config.calendar_api_url.clone())?);
    let calendar = LiturgicalCalendar::new(calendar_adapter);

    let gemini_client =
        GeminiTextAdapter::client_for(&config.gemini_api_base, &config.google_api_key);
    let text_generator = Arc::new(GeminiTextAdapter::new(
        gemini_client,
        config.gemini_model.clone(),
    ));

    let chat_service = Arc::new(MagisteriumChatAdapter::new(
        config.magisterium_api_url.clone(),
        config.magisterium_api_key.clone(),
        config.magisterium_model.clone(),
    )?);

    // --- 3. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        config: config.clone(),
        calendar,
        text_generator,
        chat_service,
    });

    let allowed_origin = config.allowed_origin.parse::<HeaderValue>().map_err(|e| {
        ApiError::Internal(format!(
            "Invalid ALLOWED_ORIGIN '{}': {}",
            config.allowed_origin, e
        ))
    })?;
    let cors = CorsLayer::new()
        .allow_origin(allowed_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    // --- 4. Create the Web Router ---
    // Calendar facts are computed locally and from a public API.
    let public_routes = Router::new()
        .route("/liturgical/{date}", get(liturgical_day_handler))
        .route("/liturgical/{date}/cycles", get(liturgical_cycles_handler))
        .route(
            "/liturgical/{date}/next-special",
            get(next_special_day_handler),
        )
        .route("/easter-vigil", get(easter_vigil_handler));

    // Routes that spend the upstream API keys.
    let protected_routes = Router::new()
        .route("/daily-readings", post(daily_readings_handler))
        .route("/reading-summary", post(reading_summary_handler))
        .route("/magisterium", post(magisterium_handler))
        .route("/magisterium/summary", post(magisterium_summary_handler))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    let api_router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    if config.proxy_api_token.is_none() {
        info!("PROXY_API_TOKEN is not set; proxy routes are open");
    }
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
