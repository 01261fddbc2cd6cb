//! Queue state held between polls.

use crate::arrays::{array_child_indices, array_children, root_indices, root_jobs};
use crate::extrapolate::Extrapolator;
use crate::ordering::{OrderingError, SortKey, compare_jobs, sort_jobs};
use slurmdash_parsers::WallTime;
use slurmdash_slurm::{Job, JobStatus};
use std::time::Instant;

/// The last fetched queue plus the elapsed times currently on display.
#[derive(Debug, Clone)]
pub struct QueueSnapshot {
    jobs: Vec<Job>,
    displayed: Vec<Option<WallTime>>,
    extrapolator: Extrapolator,
}

impl QueueSnapshot {
    pub fn new(jobs: Vec<Job>) -> Self {
        Self::taken_at(jobs, Instant::now())
    }

    /// A snapshot whose elapsed times were accurate at `since`.
    pub fn taken_at(jobs: Vec<Job>, since: Instant) -> Self {
        let displayed = jobs.iter().map(|j| j.cur_time).collect();
        Self {
            jobs,
            displayed,
            extrapolator: Extrapolator::starting_at(since),
        }
    }

    /// Build a snapshot ordered by the configured sort key.
    ///
    /// An unknown key keeps scheduler order.
    pub fn sorted(mut jobs: Vec<Job>, sort_by: Option<&str>) -> Self {
        let _ = sort_jobs(&mut jobs, sort_by);
        Self::new(jobs)
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Elapsed time to display for the job at `index`.
    pub fn displayed_time(&self, index: usize) -> Option<WallTime> {
        self.displayed.get(index).copied().flatten()
    }

    /// Re-sort in place, keeping each job's displayed time with it.
    ///
    /// `None` or an unknown key leaves the order untouched.
    pub fn sort(&mut self, sort_by: Option<&str>) -> Result<(), OrderingError> {
        let Some(key) = sort_by else {
            return Ok(());
        };
        let key = key.parse::<SortKey>().inspect_err(|e| {
            tracing::warn!("Not sorting jobs: {}", e);
        })?;

        let mut paired: Vec<_> = std::mem::take(&mut self.jobs)
            .into_iter()
            .zip(std::mem::take(&mut self.displayed))
            .collect();
        paired.sort_by(|(a, _), (b, _)| compare_jobs(a, b, key));
        let (jobs, displayed): (Vec<Job>, Vec<Option<WallTime>>) = paired.into_iter().unzip();
        self.jobs = jobs;
        self.displayed = displayed;
        Ok(())
    }

    /// Apply extrapolated times as of `now`, returning the indices whose
    /// display changed.
    pub fn extrapolate_at(&mut self, now: Instant) -> Vec<usize> {
        let mut changed = Vec::new();
        for (index, time) in self.extrapolator.tick_at(&self.jobs, now) {
            if self.displayed[index] != Some(time) {
                self.displayed[index] = Some(time);
                changed.push(index);
            }
        }
        changed
    }

    pub fn extrapolate(&mut self) -> Vec<usize> {
        self.extrapolate_at(Instant::now())
    }

    pub fn roots(&self) -> Vec<&Job> {
        root_jobs(&self.jobs)
    }

    pub fn children(&self, root: &Job) -> Vec<&Job> {
        array_children(root, &self.jobs)
    }

    /// Indices of the top-level jobs, for pairing with [`Self::displayed_time`].
    pub fn root_indices(&self) -> Vec<usize> {
        root_indices(&self.jobs)
    }

    pub fn child_indices(&self, root: usize) -> Vec<usize> {
        array_child_indices(root, &self.jobs)
    }

    pub fn job_counts(&self) -> JobCounts {
        let mut counts = JobCounts::default();
        for job in &self.jobs {
            match job.status {
                JobStatus::Pending => counts.pending += 1,
                JobStatus::Running | JobStatus::Completing => counts.running += 1,
                JobStatus::Completed => counts.completed += 1,
                JobStatus::Failed | JobStatus::Timeout => counts.failed += 1,
                JobStatus::Cancelled => counts.cancelled += 1,
                JobStatus::Other(_) => counts.other += 1,
            }
        }
        counts.total = self.jobs.len();
        counts
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobCounts {
    pub total: usize,
    pub pending: usize,
    pub running: usize,
    pub completed: usize,
    pub failed: usize,
    pub cancelled: usize,
    pub other: usize,
}
