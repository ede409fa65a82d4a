use crate::models::Trend;

/// Outcome of comparing the two most recent values of one metric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendReading {
    /// Signed percentage change, rounded to one decimal place.
    pub change_pct: f64,
    pub trend: Trend,
    rank_like: bool,
}

impl TrendReading {
    /// Change as shown on a stat card. Rank cards show the magnitude only,
    /// leaving direction to the trend.
    pub fn display_change(&self) -> f64 {
        if self.rank_like {
            self.change_pct.abs()
        } else {
            self.change_pct
        }
    }
}

/// Compares `current` against `previous`.
///
/// A zero `previous` is reported as a 0% change while the trend still
/// follows the raw comparison, so `evaluate(100.0, 0.0, false)` is `Up`
/// with a change of `0.0`. For rank-like metrics a lower value is an
/// improvement and classifies as `Up`.
pub fn evaluate(current: f64, previous: f64, rank_like: bool) -> TrendReading {
    TrendReading {
        change_pct: percent_change(current, previous),
        trend: classify(current, previous, rank_like),
        rank_like,
    }
}

pub fn percent_change(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        return 0.0;
    }
    round_to_tenth((current - previous) / previous * 100.0)
}

pub fn classify(current: f64, previous: f64, rank_like: bool) -> Trend {
    let (better, worse) = if rank_like {
        (current < previous, current > previous)
    } else {
        (current > previous, current < previous)
    };

    if better {
        Trend::Up
    } else if worse {
        Trend::Down
    } else {
        Trend::Neutral
    }
}

fn round_to_tenth(value: f64) -> f64 {
    let rounded = (value * 10.0).round() / 10.0;
    // keep "-0.0" out of the UI
    if rounded == 0.0 { 0.0 } else { rounded }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn increase_is_up() {
        let reading = evaluate(110.0, 100.0, false);
        assert_eq!(reading.change_pct, 10.0);
        assert_eq!(reading.trend, Trend::Up);
    }

    #[test]
    fn decrease_is_down() {
        let reading = evaluate(90.0, 100.0, false);
        assert_eq!(reading.change_pct, -10.0);
        assert_eq!(reading.trend, Trend::Down);
        assert_eq!(reading.display_change(), -10.0);
    }

    #[test]
    fn zero_previous_reports_no_change_but_keeps_direction() {
        let reading = evaluate(100.0, 0.0, false);
        assert_eq!(reading.change_pct, 0.0);
        assert_eq!(reading.trend, Trend::Up);
    }

    #[test]
    fn lower_rank_is_an_improvement() {
        let reading = evaluate(3.0, 5.0, true);
        assert_eq!(reading.trend, Trend::Up);
        assert_eq!(reading.change_pct, -40.0);
        assert_eq!(reading.display_change(), 40.0);

        assert_eq!(evaluate(5.0, 3.0, true).trend, Trend::Down);
    }

    #[test]
    fn equal_values_are_neutral() {
        assert_eq!(evaluate(4.5, 4.5, false).trend, Trend::Neutral);
        assert_eq!(evaluate(12.0, 12.0, true).trend, Trend::Neutral);
        assert_eq!(evaluate(12.0, 12.0, true).change_pct, 0.0);
    }

    #[test]
    fn change_rounds_to_one_decimal() {
        assert_eq!(percent_change(4.3, 4.2), 2.4);
        assert_eq!(percent_change(1.0, 3.0), -66.7);
        assert_eq!(percent_change(100.0, 100.04), 0.0);
        assert!(percent_change(100.0, 100.04).is_sign_positive());
    }
}
