pub mod auth;
pub mod config;
pub mod errors;
pub mod llm;
pub mod logging;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod state_builder;
pub mod text_processing;

// Re-export AppState for convenience
pub use state::AppState;

// Mock services and router helpers shared by the integration tests and the
// CLI. Compiled unconditionally, like the rest of the library.
pub mod test_helpers;
