//! Metro pass configuration.

use chrono::Duration;

/// Configuration for the metro pass.
#[derive(Debug, Clone)]
pub struct MetroConfig {
    /// Maximum collaborator requests in flight at once.
    pub batch_size: usize,

    /// Cost of every line↔hub and hub↔ground connector (minutes).
    pub connector_mins: u32,
}

impl MetroConfig {
    /// Set the batch size. Zero is treated as one.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Set the connector cost.
    pub fn with_connector_mins(mut self, mins: u32) -> Self {
        self.connector_mins = mins;
        self
    }

    /// Returns the connector cost as a Duration.
    pub fn connector(&self) -> Duration {
        Duration::minutes(i64::from(self.connector_mins))
    }
}

impl Default for MetroConfig {
    fn default() -> Self {
        Self {
            batch_size: 8,
            connector_mins: 2,
        }
    }
}
