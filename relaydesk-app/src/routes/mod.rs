use crate::state::AppState;
use axum::http::Method;
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod assistant;
pub mod collections;
pub mod settings;
pub mod tools;

use relaydesk_store::{ExpenseFields, PersonFields};

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/", get(settings::index))
        .route("/system", get(settings::system_get).post(settings::system_post))
        .route("/api/settings", get(settings::api_get).post(settings::api_post))
        .route("/tools", get(tools::list))
        .route("/tools/get/:id", get(tools::get_one))
        .route("/tools/add", post(tools::add))
        .route("/tools/edit/:id", post(tools::edit))
        .route("/tools/delete/:id", post(tools::delete))
        .route("/tools/toggle/:id", post(tools::toggle))
        .route("/tools/edit_system/:id", post(tools::edit_system))
        .route("/tools/parse_curl", post(tools::parse_curl))
        .route("/api/tools", get(tools::active))
        .route("/api/execute_tool", post(tools::execute))
        .route("/api/session", get(assistant::session))
        .route("/api/chat", post(assistant::chat))
        .route(
            "/api/personas",
            get(collections::list::<PersonFields>).post(collections::create::<PersonFields>),
        )
        .route(
            "/api/personas/:id",
            put(collections::update::<PersonFields>).delete(collections::remove::<PersonFields>),
        )
        .route(
            "/api/gastos",
            get(collections::list::<ExpenseFields>).post(collections::create::<ExpenseFields>),
        )
        .route(
            "/api/gastos/:id",
            put(collections::update::<ExpenseFields>).delete(collections::remove::<ExpenseFields>),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
