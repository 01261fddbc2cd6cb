//! Local estimation of running jobs' elapsed time between polls.

use slurmdash_parsers::WallTime;
use slurmdash_slurm::{Job, JobStatus};
use std::time::Instant;

/// Estimate `job`'s elapsed time at `now`, given that its `cur_time` was
/// accurate at `since`.
///
/// Returns `None` when the job is not running, lacks either duration, or
/// the estimate would pass its time limit.
pub fn extrapolate_time(job: &Job, since: Instant, now: Instant) -> Option<WallTime> {
    if job.status != JobStatus::Running {
        return None;
    }
    let (cur, max) = (job.cur_time?, job.max_time?);

    let millis = now.saturating_duration_since(since).as_millis();
    let elapsed = u64::try_from((millis + 500) / 1000).unwrap_or(u64::MAX);
    let display = cur.add_seconds(elapsed);

    (display <= max).then_some(display)
}

/// Extrapolates from the moment the last queue snapshot was taken.
#[derive(Debug, Clone, Copy)]
pub struct Extrapolator {
    since: Instant,
}

impl Extrapolator {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(since: Instant) -> Self {
        Self { since }
    }

    pub fn since(&self) -> Instant {
        self.since
    }

    pub fn tick(&self, jobs: &[Job]) -> Vec<(usize, WallTime)> {
        self.tick_at(jobs, Instant::now())
    }

    /// Estimates, as `(index, time)` pairs, for every job whose estimate
    /// can be applied at `now`.
    ///
    /// Stateless: an unchanged estimate is reported again on each call.
    /// [`crate::QueueSnapshot::extrapolate_at`] narrows this to the jobs
    /// whose displayed time changed.
    pub fn tick_at(&self, jobs: &[Job], now: Instant) -> Vec<(usize, WallTime)> {
        let updates: Vec<_> = jobs
            .iter()
            .enumerate()
            .filter_map(|(i, job)| extrapolate_time(job, self.since, now).map(|t| (i, t)))
            .collect();
        tracing::trace!("Extrapolated {} of {} jobs", updates.len(), jobs.len());
        updates
    }
}

impl Default for Extrapolator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn running(cur: &str, max: &str) -> Job {
        Job::new("1", "job", JobStatus::Running)
            .with_times(max.parse().unwrap(), cur.parse().unwrap())
    }

    #[test]
    fn test_extrapolate_within_limit() {
        let job = running("15:30", "30:00");
        let since = Instant::now();
        let now = since + Duration::from_secs(10);
        assert_eq!(
            extrapolate_time(&job, since, now),
            Some("15:40".parse().unwrap())
        );
    }

    #[test]
    fn test_extrapolate_past_limit_is_suppressed() {
        let job = running("29:50", "30:00");
        let since = Instant::now();
        let now = since + Duration::from_secs(100);
        assert_eq!(extrapolate_time(&job, since, now), None);
    }

    #[test]
    fn test_extrapolate_exactly_at_limit() {
        let job = running("29:50", "30:00");
        let since = Instant::now();
        let now = since + Duration::from_secs(10);
        assert_eq!(
            extrapolate_time(&job, since, now),
            Some("30:00".parse().unwrap())
        );
    }

    #[test]
    fn test_extrapolate_rounds_to_nearest_second() {
        let job = running("0", "1:00");
        let since = Instant::now();
        assert_eq!(
            extrapolate_time(&job, since, since + Duration::from_millis(1499)),
            Some(WallTime::from_secs(1))
        );
        assert_eq!(
            extrapolate_time(&job, since, since + Duration::from_millis(1500)),
            Some(WallTime::from_secs(2))
        );
    }

    #[test]
    fn test_extrapolate_never_goes_backwards() {
        let job = running("15:30", "30:00");
        let now = Instant::now();
        let since = now + Duration::from_secs(5);
        assert_eq!(
            extrapolate_time(&job, since, now),
            Some("15:30".parse().unwrap())
        );
    }

    #[test]
    fn test_extrapolate_requires_running_with_times() {
        let since = Instant::now();
        let now = since + Duration::from_secs(10);

        let mut pending = running("0", "30:00");
        pending.status = JobStatus::Pending;
        assert_eq!(extrapolate_time(&pending, since, now), None);

        let mut no_max = running("15:30", "30:00");
        no_max.max_time = None;
        assert_eq!(extrapolate_time(&no_max, since, now), None);

        let mut no_cur = running("15:30", "30:00");
        no_cur.cur_time = None;
        assert_eq!(extrapolate_time(&no_cur, since, now), None);
    }

    #[test]
    fn test_tick_reports_indices() {
        let since = Instant::now();
        let extrapolator = Extrapolator::starting_at(since);
        let jobs = vec![
            running("15:30", "30:00"),
            Job::new("2", "queued", JobStatus::Pending),
            running("29:50", "30:00"),
            running("1:00", "1:00:00"),
        ];

        let updates = extrapolator.tick_at(&jobs, since + Duration::from_secs(20));
        assert_eq!(
            updates,
            vec![
                (0, "15:50".parse().unwrap()),
                (3, "1:20".parse().unwrap()),
            ]
        );
    }

    #[test]
    fn test_tick_repeats_unchanged_estimates() {
        let since = Instant::now();
        let extrapolator = Extrapolator::starting_at(since);
        let jobs = vec![running("15:30", "30:00")];

        let now = since + Duration::from_secs(5);
        let first = extrapolator.tick_at(&jobs, now);
        let second = extrapolator.tick_at(&jobs, now);
        assert_eq!(first, vec![(0, "15:35".parse().unwrap())]);
        assert_eq!(first, second);
    }
}
