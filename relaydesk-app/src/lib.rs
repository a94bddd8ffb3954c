pub mod api_error;
pub mod assistant;
pub mod config;
pub mod routes;
pub mod state;

pub use api_error::ApiError;
pub use config::Config;
pub use routes::router;
pub use state::AppState;
