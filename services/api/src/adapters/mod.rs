pub mod calapi;
pub mod gemini;
pub mod magisterium;
pub mod retry;

pub use calapi::CalapiAdapter;
pub use gemini::GeminiTextAdapter;
pub use magisterium::MagisteriumChatAdapter;
pub use retry::RetryPolicy;
