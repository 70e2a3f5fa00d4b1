pub mod chat_task;
pub mod middleware;
pub mod protocol;
pub mod readings_task;
pub mod rest;
pub mod state;

pub use middleware::require_auth;
pub use rest::{
    daily_readings_handler, easter_vigil_handler, liturgical_cycles_handler,
    liturgical_day_handler, magisterium_handler, magisterium_summary_handler,
    next_special_day_handler, reading_summary_handler,
};
