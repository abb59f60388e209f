//! Descriptive statistics over sentiment time series.

use chrono::{DateTime, Utc};
use statrs::statistics::Statistics;

use crate::config::TREND_EPSILON;
use crate::domain::{SentimentSummary, Trend};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Least-squares slope of `ys` over `xs`.
///
/// Zero for fewer than two points, mismatched lengths or no spread in `xs`.
pub fn linear_slope(xs: &[f64], ys: &[f64]) -> f64 {
    if xs.len() < 2 || xs.len() != ys.len() {
        return 0.0;
    }

    let x_mean = xs.mean();
    let y_mean = ys.mean();

    let (covariance, x_spread) = xs
        .iter()
        .zip(ys)
        .fold((0.0, 0.0), |(cov, spread), (x, y)| {
            let dx = x - x_mean;
            (cov + dx * (y - y_mean), spread + dx * dx)
        });

    if x_spread.abs() < f64::EPSILON {
        0.0
    } else {
        covariance / x_spread
    }
}

pub fn classify_trend(count: usize, slope: f64) -> Trend {
    if count < 2 {
        Trend::Insufficient
    } else if slope > TREND_EPSILON {
        Trend::Improving
    } else if slope < -TREND_EPSILON {
        Trend::Declining
    } else {
        Trend::Stable
    }
}

/// Summary of `(recorded_at, score)` observations, in any order.
pub fn summarize(points: &[(DateTime<Utc>, f64)]) -> Option<SentimentSummary> {
    let mut sorted = points.to_vec();
    sorted.sort_by_key(|(at, _)| *at);

    let (first_at, _) = *sorted.first()?;
    let (last_at, latest) = *sorted.last()?;

    let scores: Vec<f64> = sorted.iter().map(|(_, score)| *score).collect();
    let days: Vec<f64> = sorted
        .iter()
        .map(|(at, _)| (*at - first_at).num_seconds() as f64 / SECONDS_PER_DAY)
        .collect();

    let count = scores.len();
    let (variance, std_dev) = if count > 1 {
        (scores.iter().variance(), scores.iter().std_dev())
    } else {
        (0.0, 0.0)
    };
    let slope_per_day = linear_slope(&days, &scores);

    Some(SentimentSummary {
        count,
        average: scores.iter().mean(),
        latest,
        min: scores.iter().copied().fold(f64::INFINITY, f64::min),
        max: scores.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        variance,
        std_dev,
        slope_per_day,
        trend: classify_trend(count, slope_per_day),
        first_recorded_at: first_at,
        last_recorded_at: last_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_linear_slope() {
        assert!(close(linear_slope(&[0.0, 1.0, 2.0], &[1.0, 3.0, 5.0]), 2.0));
        assert_eq!(linear_slope(&[1.0], &[1.0]), 0.0);
        assert_eq!(linear_slope(&[2.0, 2.0], &[1.0, 5.0]), 0.0);
        assert_eq!(linear_slope(&[0.0, 1.0], &[1.0]), 0.0);
    }

    #[test]
    fn test_summarize_empty() {
        assert!(summarize(&[]).is_none());
    }

    #[test]
    fn test_summarize_single_point() {
        let now = Utc::now();
        let summary = summarize(&[(now, 0.4)]).unwrap();
        assert_eq!(summary.count, 1);
        assert!(close(summary.average, 0.4));
        assert_eq!(summary.variance, 0.0);
        assert_eq!(summary.std_dev, 0.0);
        assert_eq!(summary.trend, Trend::Insufficient);
        assert_eq!(summary.first_recorded_at, summary.last_recorded_at);
    }

    #[test]
    fn test_summarize_sorts_and_detects_improvement() {
        let start = Utc::now() - Duration::days(10);
        let points = vec![
            (start + Duration::days(2), 0.2),
            (start, 0.0),
            (start + Duration::days(4), 0.4),
        ];
        let summary = summarize(&points).unwrap();

        assert_eq!(summary.count, 3);
        assert!(close(summary.latest, 0.4));
        assert!(close(summary.min, 0.0));
        assert!(close(summary.max, 0.4));
        assert!(close(summary.average, 0.2));
        assert!(close(summary.variance, 0.04));
        assert!(close(summary.std_dev, 0.2));
        assert!(close(summary.slope_per_day, 0.1));
        assert_eq!(summary.trend, Trend::Improving);
        assert_eq!(summary.first_recorded_at, start);
    }

    #[test]
    fn test_trend_thresholds() {
        assert_eq!(classify_trend(5, -0.5), Trend::Declining);
        assert_eq!(classify_trend(5, TREND_EPSILON / 2.0), Trend::Stable);
        assert_eq!(classify_trend(1, 3.0), Trend::Insufficient);
    }
}
