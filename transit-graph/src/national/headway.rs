//! Headway estimation.
//!
//! The headway of a line at a station is the smallest gap observed between
//! consecutive departures, including the gap from the last departure of the
//! day round to the first one of the next. It models the best-case
//! frequency, not the average.

use std::collections::BTreeMap;

use crate::domain::{LineToken, MINUTES_PER_DAY, StationId};

use super::builder::DepartureLog;

/// Headway in minutes per station and line.
pub type Headways = BTreeMap<(StationId, LineToken), f64>;

#[derive(Debug, Clone, Copy)]
pub struct HeadwayEstimator {
    fallback_mins: f64,
}

impl HeadwayEstimator {
    pub fn new(fallback_mins: f64) -> Self {
        Self { fallback_mins }
    }

    /// Estimate the headway from departure times of day.
    ///
    /// Fewer than two departures, or no positive gap at all, gives the
    /// fallback.
    ///
    /// ```
    /// use transit_graph::national::HeadwayEstimator;
    ///
    /// let estimator = HeadwayEstimator::new(30.0);
    /// assert_eq!(estimator.estimate(&[100.0, 130.0, 160.0]), 30.0);
    /// assert_eq!(estimator.estimate(&[100.0]), 30.0);
    /// ```
    pub fn estimate(&self, departures: &[f64]) -> f64 {
        if departures.len() < 2 {
            return self.fallback_mins;
        }

        let mut sorted = departures.to_vec();
        sorted.sort_by(f64::total_cmp);

        let gaps = sorted.windows(2).map(|w| w[1] - w[0]);
        let wrap = std::iter::once(sorted[0] + MINUTES_PER_DAY - sorted[sorted.len() - 1]);

        gaps.chain(wrap)
            .filter(|gap| *gap > 0.0)
            .min_by(f64::total_cmp)
            .unwrap_or(self.fallback_mins)
    }

    pub fn estimate_all(&self, departures: &DepartureLog) -> Headways {
        departures
            .iter()
            .map(|(key, times)| (key.clone(), self.estimate(times)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn estimator() -> HeadwayEstimator {
        HeadwayEstimator::new(30.0)
    }

    #[test]
    fn minimum_of_gaps() {
        assert_eq!(estimator().estimate(&[100.0, 130.0, 160.0]), 30.0);
        assert_eq!(estimator().estimate(&[600.0, 605.0, 640.0]), 5.0);
    }

    #[test]
    fn order_does_not_matter() {
        assert_eq!(estimator().estimate(&[160.0, 100.0, 130.0]), 30.0);
    }

    #[test]
    fn wrap_around_gap_counts() {
        // Last at 23:50, first at 00:05: the overnight gap is the smallest.
        assert_eq!(estimator().estimate(&[5.0, 720.0, 1430.0]), 15.0);
    }

    #[test]
    fn insufficient_samples_fall_back() {
        assert_eq!(estimator().estimate(&[]), 30.0);
        assert_eq!(estimator().estimate(&[500.0]), 30.0);
    }

    #[test]
    fn duplicate_departures_ignored() {
        assert_eq!(estimator().estimate(&[600.0, 600.0, 660.0]), 60.0);
    }

    #[test]
    fn estimate_all_keys_preserved() {
        let mut log = DepartureLog::new();
        let key = (
            StationId::parse("910GAAA").unwrap(),
            LineToken::parse("gw-slow").unwrap(),
        );
        log.insert(key.clone(), vec![100.0, 130.0]);

        let headways = estimator().estimate_all(&log);
        assert_eq!(headways[&key], 30.0);
    }
}
