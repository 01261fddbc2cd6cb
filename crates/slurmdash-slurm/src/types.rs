//! SLURM job types.

use serde::{Deserialize, Serialize};
use slurmdash_parsers::WallTime;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// SLURM job state.
///
/// States the dashboard does not know about are kept verbatim in
/// [`JobStatus::Other`] rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobStatus {
    Running,
    Pending,
    Completed,
    Completing,
    Cancelled,
    Failed,
    Timeout,
    Other(String),
}

impl JobStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Running => "RUNNING",
            Self::Pending => "PENDING",
            Self::Completed => "COMPLETED",
            Self::Completing => "COMPLETING",
            Self::Cancelled => "CANCELLED",
            Self::Failed => "FAILED",
            Self::Timeout => "TIMEOUT",
            Self::Other(raw) => raw,
        }
    }
}

impl FromStr for JobStatus {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // squeue can print "CANCELLED by 1234"
        let base = s.split_whitespace().next().unwrap_or("");
        Ok(match base.to_uppercase().as_str() {
            "RUNNING" | "R" => Self::Running,
            "PENDING" | "PD" => Self::Pending,
            "COMPLETED" | "CD" => Self::Completed,
            "COMPLETING" | "CG" => Self::Completing,
            "CANCELLED" | "CA" => Self::Cancelled,
            "FAILED" | "F" => Self::Failed,
            "TIMEOUT" | "TO" => Self::Timeout,
            _ => Self::Other(s.trim().to_string()),
        })
    }
}

impl From<String> for JobStatus {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(status) => status,
            Err(never) => match never {},
        }
    }
}

impl From<JobStatus> for String {
    fn from(status: JobStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the scheduler queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    /// SLURM job ID
    pub id: String,

    /// Job name
    pub name: String,

    /// Job state
    pub status: JobStatus,

    /// Partition
    pub queue: Option<String>,

    /// Submitted batch script
    pub batch_file: Option<String>,

    /// Standard output path
    pub output_file: Option<String>,

    /// Time limit
    pub max_time: Option<WallTime>,

    /// Elapsed time at the last poll
    pub cur_time: Option<WallTime>,

    /// ID of the array root this job belongs to
    pub array_id: Option<String>,
}

impl Job {
    pub fn new(id: impl Into<String>, name: impl Into<String>, status: JobStatus) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            status,
            queue: None,
            batch_file: None,
            output_file: None,
            max_time: None,
            cur_time: None,
            array_id: None,
        }
    }

    /// Set the time limit and elapsed time.
    pub fn with_times(mut self, max_time: WallTime, cur_time: WallTime) -> Self {
        self.max_time = Some(max_time);
        self.cur_time = Some(cur_time);
        self
    }

    pub fn with_array_id(mut self, array_id: impl Into<String>) -> Self {
        self.array_id = Some(array_id.into());
        self
    }

    /// Remaining time, `|max_time - cur_time|`, when both are known.
    pub fn time_left(&self) -> Option<WallTime> {
        match (&self.max_time, &self.cur_time) {
            (Some(max), Some(cur)) => Some(WallTime::from_secs(max.abs_diff_seconds(cur))),
            _ => None,
        }
    }

    /// Whether at least `fraction` of the time limit has been used.
    ///
    /// A zero time limit counts as finished.
    pub fn is_percent_finished(&self, fraction: f64) -> Option<bool> {
        self.is_percent_finished_at(self.cur_time?, fraction)
    }

    /// [`Self::is_percent_finished`] with `cur` standing in for the polled
    /// elapsed time.
    pub fn is_percent_finished_at(&self, cur: WallTime, fraction: f64) -> Option<bool> {
        let max = self.max_time?.to_seconds();
        let cur = cur.to_seconds();
        if max == 0 {
            return Some(true);
        }
        Some(cur as f64 / max as f64 >= fraction)
    }

    pub fn is_in_job_array(&self) -> bool {
        self.array_id.is_some()
    }

    pub fn is_job_array_root(&self) -> bool {
        self.array_id.as_deref() == Some(self.id.as_str())
    }

    /// `"<cur> / <max>"` when both durations are known, empty otherwise.
    pub fn progress_label(&self) -> String {
        match (&self.cur_time, &self.max_time) {
            (Some(cur), Some(max)) => format!("{} / {}", cur, max),
            _ => String::new(),
        }
    }

    /// Labelled job metadata, in display order.
    pub fn info_items(&self) -> Vec<(&'static str, String)> {
        let mut items = vec![
            ("id", self.id.clone()),
            ("name", self.name.clone()),
            ("status", self.status.to_string()),
        ];
        if let Some(queue) = &self.queue {
            items.push(("queue", queue.clone()));
        }
        if let Some(batch_file) = &self.batch_file {
            items.push(("batch file", batch_file.clone()));
        }
        if let Some(max_time) = &self.max_time {
            items.push(("max time", max_time.to_string()));
        }
        if let Some(cur_time) = &self.cur_time {
            items.push(("cur time", cur_time.to_string()));
        }
        items
    }
}
