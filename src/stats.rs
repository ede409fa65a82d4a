use crate::models::{ChartPoint, Metric, StatCard};
use crate::trend::evaluate;

pub const CARD_METRICS: [Metric; 4] = [
    Metric::Price,
    Metric::ReviewCount,
    Metric::Rating,
    Metric::Rank,
];

impl Metric {
    pub fn title(self) -> &'static str {
        match self {
            Metric::Price => "Price",
            Metric::ReviewCount => "Reviews",
            Metric::Rating => "Rating",
            Metric::Rank => "Rank",
        }
    }

    /// Lower is better for rank, higher is better for everything else.
    pub fn is_rank_like(self) -> bool {
        matches!(self, Metric::Rank)
    }

    pub fn value_of(self, point: &ChartPoint) -> f64 {
        match self {
            Metric::Price => point.price,
            Metric::ReviewCount => point.review_count as f64,
            Metric::Rating => point.rating_value,
            Metric::Rank => point.rank as f64,
        }
    }

    pub fn format_value(self, point: &ChartPoint) -> String {
        match self {
            Metric::Price => format!("¥{}", format_number(point.price)),
            Metric::ReviewCount => group_thousands(&point.review_count.to_string()),
            Metric::Rating => format!("{:.2}", point.rating_value),
            Metric::Rank => format!("#{}", point.rank),
        }
    }
}

/// Builds the stat-card section from the last two points of a series.
///
/// Returns `None` for series shorter than two points; there is nothing to
/// compare against.
pub fn build_stat_cards(series: &[ChartPoint]) -> Option<Vec<StatCard>> {
    let [.., previous, latest] = series else {
        return None;
    };

    let cards = CARD_METRICS
        .iter()
        .map(|&metric| {
            let reading = evaluate(
                metric.value_of(latest),
                metric.value_of(previous),
                metric.is_rank_like(),
            );
            StatCard {
                metric,
                title: metric.title().to_string(),
                value: metric.format_value(latest),
                change: format!("{:.1}", reading.display_change()),
                trend: reading.trend,
            }
        })
        .collect();

    Some(cards)
}

/// Formats with at most two decimals, dropping trailing zeros, and groups
/// the integer part with commas.
pub fn format_number(value: f64) -> String {
    let fixed = format!("{value:.2}");
    let trimmed = if fixed.contains('.') {
        fixed.trim_end_matches('0').trim_end_matches('.')
    } else {
        fixed.as_str()
    };

    let (sign, unsigned) = match trimmed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", trimmed),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (unsigned, None),
    };

    let grouped = group_thousands(int_part);
    match frac_part {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None if grouped == "0" => grouped,
        None => format!("{sign}{grouped}"),
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
