use crate::models::{ChartPoint, DashboardView, LatestSummary, Snapshot};
use crate::shaper::{shape_series, summarize_latest, TimeLabels};
use crate::stats::build_stat_cards;
use crate::store::SnapshotStore;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    pub available_products: Vec<String>,
    pub selected_product: Option<String>,
    pub current_series: Vec<ChartPoint>,
    pub latest_snapshot: Option<Snapshot>,
    pub loading: bool,
    pub generation: u64,
    pub last_error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    /// The fetched series replaced the current one.
    Applied { points: usize },
    /// A newer selection started while this one was fetching.
    Stale,
    /// The store failed; the previous series is still shown.
    Failed,
}

/// Owns the dashboard's selection state and re-queries the store whenever
/// the selection changes.
pub struct Session<S> {
    store: Arc<S>,
    labels: TimeLabels,
    state: Mutex<SelectionState>,
}

impl<S: SnapshotStore> Session<S> {
    pub fn new(store: Arc<S>, labels: TimeLabels) -> Self {
        Self {
            store,
            labels,
            state: Mutex::new(SelectionState::default()),
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn labels(&self) -> &TimeLabels {
        &self.labels
    }

    /// Loads the product list once and selects the first product.
    pub async fn initialize(&self) -> Option<SelectOutcome> {
        let first = match self.store.product_names().await {
            Ok(products) => {
                info!(products = products.len(), "loaded product list");
                let mut state = self.state.lock().await;
                let first = products.first().cloned();
                state.available_products = products;
                state.last_error = None;
                first
            }
            Err(err) => {
                error!("failed to fetch products: {err}");
                self.state.lock().await.last_error = Some(err.to_string());
                None
            }
        };

        match first {
            Some(name) => Some(self.select(&name).await),
            None => None,
        }
    }

    /// Switches the selection to `name` and replaces the series with a
    /// fresh fetch. Results that arrive after a newer selection are dropped.
    pub async fn select(&self, name: &str) -> SelectOutcome {
        let generation = {
            let mut state = self.state.lock().await;
            state.generation = state.generation.wrapping_add(1);
            state.selected_product = Some(name.to_string());
            state.loading = true;
            state.generation
        };

        let fetched = self.store.snapshots_for(name).await;

        let mut state = self.state.lock().await;
        if state.generation != generation {
            debug!(
                product = name,
                generation,
                current = state.generation,
                "discarding stale series"
            );
            return SelectOutcome::Stale;
        }
        state.loading = false;

        match fetched {
            Ok(snapshots) => {
                let shaped = shape_series(snapshots, &self.labels);
                let points = shaped.points.len();
                info!(product = name, points, "series loaded");
                state.current_series = shaped.points;
                state.latest_snapshot = shaped.latest;
                state.last_error = None;
                SelectOutcome::Applied { points }
            }
            Err(err) => {
                error!(product = name, "failed to fetch product data: {err}");
                state.last_error = Some(err.to_string());
                SelectOutcome::Failed
            }
        }
    }

    pub async fn snapshot(&self) -> SelectionState {
        self.state.lock().await.clone()
    }

    pub async fn view(&self) -> DashboardView {
        let state = self.state.lock().await;
        build_view(&state, &self.labels)
    }
}

pub fn build_view(state: &SelectionState, labels: &TimeLabels) -> DashboardView {
    let latest: Option<LatestSummary> = state
        .latest_snapshot
        .as_ref()
        .map(|snapshot| summarize_latest(snapshot, labels));

    DashboardView {
        products: state.available_products.clone(),
        selected: state.selected_product.clone(),
        loading: state.loading,
        series: state.current_series.clone(),
        latest,
        stats: build_stat_cards(&state.current_series),
        error: state.last_error.clone(),
    }
}
