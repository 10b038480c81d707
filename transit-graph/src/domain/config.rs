//! Graph build configuration.

use chrono::Duration;

/// Parameters for turning timetable data into weighted edges.
#[derive(Debug, Clone)]
pub struct GraphConfig {
    /// Public stops ÷ timing points at or above which a service is "slow".
    pub min_ratio_for_slow: f64,

    /// Cost of moving between the street and a station hub (minutes).
    pub ground_to_hub_mins: u32,

    /// Cost of walking from a platform to the station hub (minutes).
    pub platform_to_hub_mins: u32,

    /// Cap on the modelled wait for the next departure (minutes).
    pub max_wait_mins: f64,

    /// Hops shorter than this are treated as data errors (minutes).
    pub min_travel_mins: f64,

    /// Headway assumed when a line has fewer than two departures at a station.
    pub fallback_headway_mins: f64,

    /// Stop after this many accepted schedules. Development aid.
    pub schedule_limit: Option<usize>,
}

impl GraphConfig {
    /// Set a schedule limit.
    pub fn with_schedule_limit(mut self, limit: Option<usize>) -> Self {
        self.schedule_limit = limit;
        self
    }

    /// Returns the ground-to-hub cost as a Duration.
    pub fn ground_to_hub(&self) -> Duration {
        Duration::minutes(i64::from(self.ground_to_hub_mins))
    }

    /// Returns the platform-to-hub cost as a Duration.
    pub fn platform_to_hub(&self) -> Duration {
        Duration::minutes(i64::from(self.platform_to_hub_mins))
    }

    /// Returns the wait cap as a Duration, truncated to whole seconds.
    pub fn max_wait(&self) -> Duration {
        Duration::seconds((self.max_wait_mins * 60.0) as i64)
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            min_ratio_for_slow: 0.7,
            ground_to_hub_mins: 2,
            platform_to_hub_mins: 2,
            max_wait_mins: 25.0,
            min_travel_mins: 0.5,
            fallback_headway_mins: 30.0,
            schedule_limit: None,
        }
    }
}
