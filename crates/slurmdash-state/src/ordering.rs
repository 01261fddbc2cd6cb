//! Sort orders for the job queue.

use slurmdash_slurm::Job;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderingError {
    #[error("Invalid sort key {key:?}, expected one of: {expected}")]
    InvalidSortKey { key: String, expected: &'static str },
}

/// Keys the job queue can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    Id,
    Name,
    TimeLeft,
    Status,
}

impl SortKey {
    pub const ALL: [SortKey; 4] = [Self::Id, Self::Name, Self::TimeLeft, Self::Status];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::TimeLeft => "time left",
            Self::Status => "status",
        }
    }
}

impl FromStr for SortKey {
    type Err = OrderingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| OrderingError::InvalidSortKey {
                key: s.to_string(),
                expected: "id, name, time left, status",
            })
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive string order. Strings differing only in case put the
/// lowercase form first.
pub(crate) fn collate(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

/// Order present values before missing ones; missing values tie.
pub(crate) fn present_first<T: Ord>(a: Option<T>, b: Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub fn compare_jobs(a: &Job, b: &Job, key: SortKey) -> Ordering {
    match key {
        SortKey::Id => collate(&a.id, &b.id),
        SortKey::Name => collate(&a.name, &b.name),
        SortKey::Status => collate(a.status.as_str(), b.status.as_str()),
        SortKey::TimeLeft => present_first(a.time_left(), b.time_left()),
    }
}

/// Stable sort of `jobs` by `key`.
pub fn sort_jobs_by(jobs: &mut [Job], key: SortKey) {
    jobs.sort_by(|a, b| compare_jobs(a, b, key));
}

/// Sort `jobs` by a configured key name.
///
/// `None` leaves the order untouched. An unknown key also leaves the order
/// untouched and is returned so the caller can report it.
pub fn sort_jobs(jobs: &mut [Job], key: Option<&str>) -> Result<(), OrderingError> {
    let Some(key) = key else {
        return Ok(());
    };

    match key.parse::<SortKey>() {
        Ok(key) => {
            sort_jobs_by(jobs, key);
            Ok(())
        }
        Err(e) => {
            tracing::warn!("Not sorting jobs: {}", e);
            Err(e)
        }
    }
}
