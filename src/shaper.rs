use crate::models::{ChartPoint, LatestSummary, Snapshot};
use chrono::{DateTime, FixedOffset, Utc};
use serde_json::Value;
use std::collections::BTreeSet;

const SHORT_LABEL: &str = "%m/%d %H:%M";
const LONG_LABEL: &str = "%Y-%m-%d %H:%M";

/// Ordered chart points for one product plus the most recent raw snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapedSeries {
    pub points: Vec<ChartPoint>,
    pub latest: Option<Snapshot>,
}

/// Renders instants for the dashboard in a fixed display offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeLabels {
    offset: FixedOffset,
}

impl TimeLabels {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Axis label, e.g. `03/01 18:30`.
    pub fn short(&self, at: DateTime<Utc>) -> String {
        at.with_timezone(&self.offset).format(SHORT_LABEL).to_string()
    }

    /// "Last updated" label, e.g. `2025-03-01 18:30`.
    pub fn long(&self, at: DateTime<Utc>) -> String {
        at.with_timezone(&self.offset).format(LONG_LABEL).to_string()
    }
}

impl Default for TimeLabels {
    fn default() -> Self {
        Self::new(FixedOffset::east_opt(9 * 3600).expect("+09:00 is a valid offset"))
    }
}

/// Sorts snapshots by capture time and maps each one to a chart point.
///
/// The sort is stable, so snapshots sharing a timestamp keep their input
/// order. Nothing is filtered or merged.
pub fn shape_series(mut snapshots: Vec<Snapshot>, labels: &TimeLabels) -> ShapedSeries {
    snapshots.sort_by_key(|snapshot| snapshot.scraped_at);

    let points = snapshots
        .iter()
        .map(|snapshot| to_chart_point(snapshot, labels))
        .collect();

    ShapedSeries {
        points,
        latest: snapshots.pop(),
    }
}

pub fn to_chart_point(snapshot: &Snapshot, labels: &TimeLabels) -> ChartPoint {
    ChartPoint {
        date: labels.short(snapshot.scraped_at),
        price: snapshot.price,
        review_count: snapshot.review_count,
        rating_value: normalize_rating(snapshot.rating_value.as_ref()),
        rank: snapshot.rank,
    }
}

pub fn summarize_latest(snapshot: &Snapshot, labels: &TimeLabels) -> LatestSummary {
    LatestSummary {
        name: snapshot.name.clone(),
        platform: snapshot.platform.clone(),
        url: snapshot.url.clone().filter(|url| !url.trim().is_empty()),
        last_updated: labels.long(snapshot.scraped_at),
        scraped_at: snapshot.scraped_at,
    }
}

/// Reads a rating that may be stored as a number, a numeric string, or
/// nothing at all. Anything unusable becomes `0.0`.
pub fn normalize_rating(raw: Option<&Value>) -> f64 {
    let parsed = match raw {
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) => text.trim().parse::<f64>().ok(),
        _ => None,
    };

    parsed.filter(|value| value.is_finite()).unwrap_or(0.0)
}

/// Collapses the name column of the product-list query into sorted,
/// unique product names.
pub fn distinct_product_names<I>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    names
        .into_iter()
        .filter(|name| !name.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}


#[cfg(test)]
mod tests {
    use super::fixtures::snapshot;
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn output_is_one_to_one_and_time_ordered() {
        let input = vec![
            snapshot("omega", 5, 1500.0, 12, Some(json!(4.1)), 9),
            snapshot("omega", 1, 1400.0, 10, Some(json!(4.0)), 11),
            snapshot("omega", 3, 1450.0, 11, None, 10),
        ];

        let shaped = shape_series(input, &TimeLabels::default());

        assert_eq!(shaped.points.len(), 3);
        let prices: Vec<f64> = shaped.points.iter().map(|p| p.price).collect();
        assert_eq!(prices, vec![1400.0, 1450.0, 1500.0]);
        assert_eq!(shaped.points[1].rating_value, 0.0);
        assert_eq!(shaped.latest.unwrap().id, "omega-5");
    }

    #[test]
    fn equal_timestamps_keep_input_order() {
        let input = vec![
            snapshot("zinc", 2, 100.0, 1, None, 3),
            snapshot("zinc", 2, 200.0, 1, None, 3),
        ];

        let shaped = shape_series(input, &TimeLabels::default());
        assert_eq!(shaped.points[0].price, 100.0);
        assert_eq!(shaped.points[1].price, 200.0);
        assert_eq!(shaped.latest.unwrap().price, 200.0);
    }

    #[test]
    fn empty_input_has_no_latest() {
        let shaped = shape_series(Vec::new(), &TimeLabels::default());
        assert!(shaped.points.is_empty());
        assert!(shaped.latest.is_none());
    }

    #[test]
    fn rating_normalization_is_total() {
        assert_eq!(normalize_rating(None), 0.0);
        assert_eq!(normalize_rating(Some(&Value::Null)), 0.0);
        assert_eq!(normalize_rating(Some(&json!("n/a"))), 0.0);
        assert_eq!(normalize_rating(Some(&json!("NaN"))), 0.0);
        assert_eq!(normalize_rating(Some(&json!(true))), 0.0);
        assert_eq!(normalize_rating(Some(&json!("4.5"))), 4.5);
        assert_eq!(normalize_rating(Some(&json!(" 3.25 "))), 3.25);
        assert_eq!(normalize_rating(Some(&json!(4))), 4.0);
    }

    #[test]
    fn labels_render_in_display_offset() {
        let labels = TimeLabels::default();
        let at = Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap();
        assert_eq!(labels.short(at), "03/01 18:30");
        assert_eq!(labels.long(at), "2025-03-01 18:30");

        let utc = TimeLabels::new(FixedOffset::east_opt(0).unwrap());
        assert_eq!(utc.short(at), "03/01 09:30");
    }

    #[test]
    fn latest_summary_drops_blank_url() {
        let mut latest = snapshot("iron", 4, 900.0, 2, None, 1);
        latest.url = Some("  ".to_string());
        let summary = summarize_latest(&latest, &TimeLabels::default());
        assert_eq!(summary.url, None);
        assert_eq!(summary.last_updated, "2025-03-01 13:00");
        assert_eq!(summary.platform, "rakuten");
    }

    #[test]
    fn product_names_are_unique_and_sorted() {
        let names = distinct_product_names(
            ["b", "a", "b", "", "c", "a"].into_iter().map(String::from),
        );
        assert_eq!(names, vec!["a", "b", "c"]);
    }
}
