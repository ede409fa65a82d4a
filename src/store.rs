use crate::config::StoreConfig;
use crate::errors::StoreError;
use crate::models::Snapshot;
use crate::shaper::distinct_product_names;
use chrono::{Duration, Utc};
use reqwest::{header::ACCEPT, Client};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use std::{
    future::Future,
    sync::{Arc, PoisonError, RwLock},
};
use tracing::debug;

const ERROR_BODY_LIMIT: usize = 512;

/// Read-only query contract of the snapshot store.
pub trait SnapshotStore: Send + Sync + 'static {
    /// Distinct product names, lexicographically ordered.
    fn product_names(&self) -> impl Future<Output = Result<Vec<String>, StoreError>> + Send;

    /// Every snapshot recorded for `name`, oldest first.
    fn snapshots_for(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Vec<Snapshot>, StoreError>> + Send;
}

/// Client for a PostgREST endpoint such as the one Supabase exposes at
/// `{project}/rest/v1/{table}`.
#[derive(Clone)]
pub struct RestSnapshotStore {
    client: Client,
    endpoint: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct NameRow {
    name: String,
}

impl RestSnapshotStore {
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/rest/v1/{}", config.base_url, config.table),
            api_key: config.api_key.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn fetch_rows<T: DeserializeOwned>(
        &self,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, StoreError> {
        let mut request = self
            .client
            .get(&self.endpoint)
            .query(query)
            .header(ACCEPT, "application/json");
        if !self.api_key.is_empty() {
            request = request
                .header("apikey", &self.api_key)
                .bearer_auth(&self.api_key);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(StoreError::Status {
                status: status.as_u16(),
                body: truncate(body, ERROR_BODY_LIMIT),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

impl SnapshotStore for RestSnapshotStore {
    async fn product_names(&self) -> Result<Vec<String>, StoreError> {
        let rows: Vec<NameRow> = self
            .fetch_rows(&[
                ("select", "name".to_string()),
                ("order", "name.asc".to_string()),
            ])
            .await?;
        debug!(rows = rows.len(), "fetched product name rows");
        Ok(distinct_product_names(rows.into_iter().map(|row| row.name)))
    }

    async fn snapshots_for(&self, name: &str) -> Result<Vec<Snapshot>, StoreError> {
        let snapshots: Vec<Snapshot> = self
            .fetch_rows(&[
                ("select", "*".to_string()),
                ("name", format!("eq.{name}")),
                ("order", "scraped_at.asc".to_string()),
            ])
            .await?;
        debug!(product = name, rows = snapshots.len(), "fetched snapshots");
        Ok(snapshots)
    }
}

/// Snapshot store held in process memory. Backs demo mode and tests.
#[derive(Clone, Default)]
pub struct InMemorySnapshotStore {
    inner: Arc<RwLock<Vec<Snapshot>>>,
}

impl InMemorySnapshotStore {
    pub fn new(snapshots: Vec<Snapshot>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(snapshots)),
        }
    }

    pub fn demo() -> Self {
        Self::new(demo_snapshots())
    }

    pub fn replace_snapshots(&self, snapshots: Vec<Snapshot>) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        *guard = snapshots;
    }

    fn read(&self) -> Vec<Snapshot> {
        // Writers only swap the whole vector, so a poisoned lock still holds
        // a complete snapshot list.
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl SnapshotStore for InMemorySnapshotStore {
    async fn product_names(&self) -> Result<Vec<String>, StoreError> {
        Ok(distinct_product_names(
            self.read().into_iter().map(|snapshot| snapshot.name),
        ))
    }

    async fn snapshots_for(&self, name: &str) -> Result<Vec<Snapshot>, StoreError> {
        let mut snapshots: Vec<Snapshot> = self
            .read()
            .into_iter()
            .filter(|snapshot| snapshot.name == name)
            .collect();
        snapshots.sort_by_key(|snapshot| snapshot.scraped_at);
        Ok(snapshots)
    }
}

/// Two weeks of twice-daily observations for a handful of products.
pub fn demo_snapshots() -> Vec<Snapshot> {
    const POINTS: i64 = 28;
    let products: [(&str, &str, f64, u64, u64); 3] = [
        ("Omega-3 Fish Oil 120 Softgels", "rakuten", 1980.0, 412, 14),
        ("Vitamin D3 5000IU 180 Tablets", "amazon", 1280.0, 2310, 3),
        ("Zinc Picolinate 50mg", "yahoo", 860.0, 95, 41),
    ];
    let now = Utc::now();

    let mut snapshots = Vec::with_capacity(products.len() * POINTS as usize);
    for (product_idx, (name, platform, base_price, base_reviews, base_rank)) in
        products.into_iter().enumerate()
    {
        for step in 0..POINTS {
            let wave = ((step + product_idx as i64 * 3) % 7) as f64 - 3.0;
            let rating = 4.0 + (((step + product_idx as i64) % 5) as f64) / 10.0;
            snapshots.push(Snapshot {
                id: format!("demo-{product_idx}-{step}"),
                name: name.to_string(),
                price: base_price + wave * 20.0,
                review_count: base_reviews + (step as u64) * (product_idx as u64 + 2),
                // a few legacy rows carry the rating as text
                rating_value: Some(if step % 6 == 0 {
                    Value::String(format!("{rating:.1}"))
                } else {
                    serde_json::json!(rating)
                }),
                rank: base_rank.saturating_add_signed(wave as i64).max(1),
                scraped_at: now - Duration::hours(12 * (POINTS - 1 - step)),
                platform: platform.to_string(),
                url: Some(format!("https://example.com/{platform}/item/{product_idx}")),
            });
        }
    }
    snapshots
}

fn truncate(mut body: String, limit: usize) -> String {
    if body.len() > limit {
        let mut cut = limit;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
    }
    body
}
