use crate::errors::AppError;
use crate::models::{
    DashboardView, ProductsResponse, SelectRequest, SeriesQuery, SeriesResponse,
};
use crate::shaper::{shape_series, summarize_latest};
use crate::state::AppState;
use crate::store::SnapshotStore;
use crate::ui::render_index;
use axum::{
    extract::{Query, State},
    response::Html,
    Json,
};

pub async fn index<S: SnapshotStore>(State(state): State<AppState<S>>) -> Html<String> {
    let view = state.session.view().await;
    Html(render_index(&view))
}

pub async fn get_products<S: SnapshotStore>(
    State(state): State<AppState<S>>,
) -> Json<ProductsResponse> {
    let snapshot = state.session.snapshot().await;
    Json(ProductsResponse {
        products: snapshot.available_products,
        selected: snapshot.selected_product,
    })
}

pub async fn get_dashboard<S: SnapshotStore>(
    State(state): State<AppState<S>>,
) -> Json<DashboardView> {
    Json(state.session.view().await)
}

pub async fn select<S: SnapshotStore>(
    State(state): State<AppState<S>>,
    Json(payload): Json<SelectRequest>,
) -> Result<Json<DashboardView>, AppError> {
    // Store names are matched exactly; only blank input is rejected.
    let name = payload.name.as_str();
    if name.trim().is_empty() {
        return Err(AppError::bad_request("name must not be empty"));
    }

    state.session.select(name).await;
    Ok(Json(state.session.view().await))
}

/// Shapes any product's series without touching the current selection.
pub async fn get_series<S: SnapshotStore>(
    State(state): State<AppState<S>>,
    Query(query): Query<SeriesQuery>,
) -> Result<Json<SeriesResponse>, AppError> {
    let name = query.name.as_str();
    if name.trim().is_empty() {
        return Err(AppError::bad_request("name must not be empty"));
    }

    let session = &state.session;
    let snapshots = session.store().snapshots_for(name).await?;
    let shaped = shape_series(snapshots, session.labels());

    Ok(Json(SeriesResponse {
        name: name.to_string(),
        latest: shaped
            .latest
            .as_ref()
            .map(|latest| summarize_latest(latest, session.labels())),
        series: shaped.points,
    }))
}
