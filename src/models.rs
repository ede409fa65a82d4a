use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One observation of one product, as returned by the snapshot store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub price: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub review_count: u64,
    #[serde(default)]
    pub rating_value: Option<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rank: u64,
    #[serde(deserialize_with = "flexible_timestamp")]
    pub scraped_at: DateTime<Utc>,
    pub platform: String,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub date: String,
    pub price: f64,
    pub review_count: u64,
    pub rating_value: f64,
    pub rank: u64,
}

/// Non-chart fields of the most recent snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatestSummary {
    pub name: String,
    pub platform: String,
    pub url: Option<String>,
    pub last_updated: String,
    pub scraped_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Up,
    Down,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Price,
    ReviewCount,
    Rating,
    Rank,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatCard {
    pub metric: Metric,
    pub title: String,
    pub value: String,
    pub change: String,
    pub trend: Trend,
}

#[derive(Debug, Deserialize)]
pub struct SelectRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct SeriesQuery {
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProductsResponse {
    pub products: Vec<String>,
    pub selected: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SeriesResponse {
    pub name: String,
    pub series: Vec<ChartPoint>,
    pub latest: Option<LatestSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardView {
    pub products: Vec<String>,
    pub selected: Option<String>,
    pub loading: bool,
    pub series: Vec<ChartPoint>,
    pub latest: Option<LatestSummary>,
    pub stats: Option<Vec<StatCard>>,
    pub error: Option<String>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(text) => Ok(text),
        Value::Number(number) => Ok(number.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}

// A scrape can miss a field; the row still charts with zero in that slot.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// PostgREST returns timestamptz as RFC 3339 and plain timestamp columns without
// an offset. The latter are read as UTC.
fn flexible_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
}

pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.with_timezone(&Utc));
    }
    // Postgres renders offsets as "+00" without minutes.
    if let Ok(parsed) = DateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%.f%#z") {
        return Some(parsed.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn snapshot_accepts_numeric_id_and_missing_optionals() {
        let snapshot: Snapshot = serde_json::from_value(serde_json::json!({
            "id": 42,
            "name": "Vitamin D3",
            "price": 1280.0,
            "review_count": 311,
            "rank": 7,
            "scraped_at": "2025-03-01T09:30:00+00:00",
            "platform": "rakuten"
        }))
        .unwrap();

        assert_eq!(snapshot.id, "42");
        assert_eq!(snapshot.rating_value, None);
        assert_eq!(snapshot.url, None);
        assert_eq!(
            snapshot.scraped_at,
            Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap()
        );
    }

    #[test]
    fn null_or_missing_numbers_read_as_zero() {
        let snapshot: Snapshot = serde_json::from_value(serde_json::json!({
            "id": "p-1",
            "name": "Omega 3",
            "price": null,
            "rank": null,
            "scraped_at": "2025-03-01T09:30:00Z",
            "platform": "amazon"
        }))
        .unwrap();

        assert_eq!(snapshot.price, 0.0);
        assert_eq!(snapshot.review_count, 0);
        assert_eq!(snapshot.rank, 0);

        let bad = serde_json::from_value::<Snapshot>(serde_json::json!({
            "id": "p-2",
            "name": "Omega 3",
            "price": "cheap",
            "review_count": 1,
            "rank": 1,
            "scraped_at": "2025-03-01T09:30:00Z",
            "platform": "amazon"
        }));
        assert!(bad.is_err());
    }

    #[test]
    fn naive_timestamps_are_read_as_utc() {
        let parsed = parse_timestamp("2025-03-01T09:30:00.123456").unwrap();
        assert_eq!(parsed.timestamp(), 1_740_821_400);

        let spaced = parse_timestamp("2025-03-01 09:30:00").unwrap();
        assert_eq!(spaced.timestamp(), 1_740_821_400);
    }

    #[test]
    fn postgres_short_offsets_are_accepted() {
        let parsed = parse_timestamp("2025-03-01 18:30:00+09").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap());
    }

    #[test]
    fn garbage_timestamp_is_rejected() {
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn trend_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Trend::Neutral).unwrap(), "\"neutral\"");
        assert_eq!(
            serde_json::to_string(&Metric::ReviewCount).unwrap(),
            "\"review_count\""
        );
    }
}
