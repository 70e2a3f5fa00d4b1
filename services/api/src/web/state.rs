//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use liturgy_core::{
    classifier::LiturgicalCalendar,
    ports::{ChatCompletionService, TextGenerationService},
};
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub calendar: LiturgicalCalendar,
    pub text_generator: Arc<dyn TextGenerationService>,
    pub chat_service: Arc<dyn ChatCompletionService>,
}
