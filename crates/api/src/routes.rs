use crate::{handlers::*, AppState};
use axum::{
    routing::{get, post},
    Router,
};

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/get_geo_data", get(get_geo_data))
        .route("/predict", post(predict))
        .route("/healthz", get(health_check))
}

pub fn build_router(state: AppState) -> Router {
    create_router().with_state(state)
}
