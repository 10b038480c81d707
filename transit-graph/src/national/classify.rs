//! Service classification.
//!
//! Decides whether a schedule is a passenger service worth modelling and, if
//! so, whether it belongs to the operator's slow or express family.

use crate::domain::SpeedClass;

/// Train categories that never carry rail passengers: replacement bus, bus
/// service, and empty/dead running.
pub const NON_PASSENGER_CATEGORIES: [&str; 3] = ["BR", "BS", "DD"];

/// Outcome of classifying one schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Drop the whole schedule from the graph.
    Reject,
    /// Keep it as a slow or express service.
    Passenger(SpeedClass),
}

/// Classifies schedules by category code and stop ratio.
#[derive(Debug, Clone, Copy)]
pub struct ServiceClassifier {
    min_ratio_for_slow: f64,
}

impl ServiceClassifier {
    pub fn new(min_ratio_for_slow: f64) -> Self {
        Self { min_ratio_for_slow }
    }

    /// Classify a schedule.
    ///
    /// Non-passenger categories are rejected regardless of ratio. Otherwise a
    /// ratio at or above the threshold is slow, anything below is express.
    ///
    /// ```
    /// use transit_graph::domain::SpeedClass;
    /// use transit_graph::national::{Classification, ServiceClassifier};
    ///
    /// let classifier = ServiceClassifier::new(0.7);
    /// assert_eq!(classifier.classify("OO", 0.7), Classification::Passenger(SpeedClass::Slow));
    /// assert_eq!(classifier.classify("XX", 0.3), Classification::Passenger(SpeedClass::Express));
    /// assert_eq!(classifier.classify("BR", 1.0), Classification::Reject);
    /// ```
    pub fn classify(&self, category: &str, stop_ratio: f64) -> Classification {
        let category = category.trim().to_ascii_uppercase();
        if NON_PASSENGER_CATEGORIES.contains(&category.as_str()) {
            return Classification::Reject;
        }

        if stop_ratio >= self.min_ratio_for_slow {
            Classification::Passenger(SpeedClass::Slow)
        } else {
            Classification::Passenger(SpeedClass::Express)
        }
    }
}
