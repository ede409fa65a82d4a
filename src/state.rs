use crate::session::Session;
use crate::shaper::TimeLabels;
use crate::store::SnapshotStore;
use std::sync::Arc;

pub struct AppState<S> {
    pub session: Arc<Session<S>>,
}

impl<S: SnapshotStore> AppState<S> {
    pub fn new(store: S, labels: TimeLabels) -> Self {
        Self {
            session: Arc::new(Session::new(Arc::new(store), labels)),
        }
    }
}

// Derived Clone would require `S: Clone`.
impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            session: Arc::clone(&self.session),
        }
    }
}
