//! Dashboard settings passed explicitly to each component.

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Job sort key name; unset keeps scheduler order
    pub sort_by: Option<String>,

    /// Job script sort key name
    pub script_sort_by: Option<String>,

    /// Seconds between queue refreshes
    pub refresh_interval_secs: Option<u64>,

    /// Seconds between elapsed-time extrapolations
    pub extrapolation_interval_secs: Option<u64>,

    pub show_job_info: bool,
    pub prompt_before_cancel: bool,
    pub prompt_before_cancel_all: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            sort_by: None,
            script_sort_by: None,
            refresh_interval_secs: None,
            extrapolation_interval_secs: None,
            show_job_info: false,
            prompt_before_cancel: true,
            prompt_before_cancel_all: true,
        }
    }
}

fn interval(secs: Option<u64>) -> Option<Duration> {
    secs.filter(|&s| s > 0).map(Duration::from_secs)
}

impl DashboardConfig {
    /// Queue refresh cadence; `None` disables refreshing.
    pub fn refresh_interval(&self) -> Option<Duration> {
        interval(self.refresh_interval_secs)
    }

    /// Extrapolation cadence; `None` disables extrapolation.
    pub fn extrapolation_interval(&self) -> Option<Duration> {
        interval(self.extrapolation_interval_secs)
    }
}
