pub mod app;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod session;
pub mod shaper;
pub mod state;
pub mod stats;
pub mod store;
pub mod trend;
pub mod ui;

pub use app::router;
pub use config::{DashboardConfig, StoreConfig, StoreSource};
pub use session::{SelectOutcome, SelectionState, Session};
pub use shaper::{normalize_rating, shape_series, ShapedSeries, TimeLabels};
pub use state::AppState;
pub use store::{InMemorySnapshotStore, RestSnapshotStore, SnapshotStore};
pub use trend::{evaluate, TrendReading};
