use crate::handlers;
use crate::state::AppState;
use crate::store::SnapshotStore;
use axum::{routing::{get, post}, Router};

pub fn router<S: SnapshotStore>(state: AppState<S>) -> Router {
    Router::new()
        .route("/", get(handlers::index::<S>))
        .route("/api/products", get(handlers::get_products::<S>))
        .route("/api/dashboard", get(handlers::get_dashboard::<S>))
        .route("/api/select", post(handlers::select::<S>))
        .route("/api/series", get(handlers::get_series::<S>))
        .with_state(state)
}
