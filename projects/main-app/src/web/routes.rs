use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::services::ServeDir;

use crate::{app_state::AppState, camera::traits::CameraProvider};

use super::handlers;

pub fn build_router<P: CameraProvider + 'static>(state: Arc<AppState<P>>) -> Router {
    let full_routes = Router::new()
        .route("/", get(handlers::full_page::<P>))
        .route("/widget", get(handlers::full_widget::<P>))
        .route("/status", get(handlers::full_status::<P>))
        .route("/preview", get(handlers::full_preview::<P>))
        .route("/start", post(handlers::start::<P>))
        .route("/stop", post(handlers::stop::<P>))
        .route("/torch", post(handlers::torch::<P>))
        .route("/capture", post(handlers::capture::<P>))
        .route("/reset", post(handlers::reset::<P>));

    let simple_routes = Router::new()
        .route("/", get(handlers::simple_page::<P>))
        .route("/preview", get(handlers::simple_preview::<P>))
        .route("/capture", post(handlers::simple_capture::<P>));

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .nest("/full", full_routes)
        .nest("/simple", simple_routes)
        .nest_service("/static", ServeDir::new("static"))
        .with_state(state)
}
