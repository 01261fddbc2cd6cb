//! Job array grouping.

use slurmdash_slurm::Job;

fn is_root(job: &Job) -> bool {
    !job.is_in_job_array() || job.is_job_array_root()
}

/// Positions of the jobs shown at the top level.
pub fn root_indices(jobs: &[Job]) -> Vec<usize> {
    jobs.iter()
        .enumerate()
        .filter(|(_, j)| is_root(j))
        .map(|(i, _)| i)
        .collect()
}

/// Positions of the members of the array rooted at `jobs[root]`.
pub fn array_child_indices(root: usize, jobs: &[Job]) -> Vec<usize> {
    let Some(root_job) = jobs.get(root).filter(|j| j.is_job_array_root()) else {
        return Vec::new();
    };
    jobs.iter()
        .enumerate()
        .filter(|(i, j)| {
            *i != root
                && j.array_id.as_deref() == Some(root_job.id.as_str())
                && j.id != root_job.id
        })
        .map(|(i, _)| i)
        .collect()
}

/// Jobs shown at the top level: standalone jobs and array roots.
pub fn root_jobs(jobs: &[Job]) -> Vec<&Job> {
    jobs.iter().filter(|j| is_root(j)).collect()
}

/// Members of `root`'s job array, excluding the root itself.
pub fn array_children<'a>(root: &Job, jobs: &'a [Job]) -> Vec<&'a Job> {
    if !root.is_job_array_root() {
        return Vec::new();
    }
    jobs.iter()
        .filter(|j| j.array_id.as_deref() == Some(root.id.as_str()) && j.id != root.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use slurmdash_slurm::JobStatus;

    fn jobs() -> Vec<Job> {
        vec![
            Job::new("10", "solo", JobStatus::Running),
            Job::new("20", "array", JobStatus::Running).with_array_id("20"),
            Job::new("20_1", "array", JobStatus::Running).with_array_id("20"),
            Job::new("20_2", "array", JobStatus::Pending).with_array_id("20"),
            Job::new("30_1", "orphan", JobStatus::Running).with_array_id("30"),
        ]
    }

    #[test]
    fn test_root_jobs() {
        let jobs = jobs();
        let ids: Vec<_> = root_jobs(&jobs).iter().map(|j| j.id.as_str()).collect();
        assert_eq!(ids, vec!["10", "20"]);
    }

    #[test]
    fn test_array_children() {
        let jobs = jobs();
        let children: Vec<_> = array_children(&jobs[1], &jobs)
            .iter()
            .map(|j| j.id.as_str())
            .collect();
        assert_eq!(children, vec!["20_1", "20_2"]);

        assert!(array_children(&jobs[0], &jobs).is_empty());
        assert!(array_children(&jobs[2], &jobs).is_empty());
    }

    #[test]
    fn test_indices_match_jobs() {
        let jobs = jobs();
        assert_eq!(root_indices(&jobs), vec![0, 1]);
        assert_eq!(array_child_indices(1, &jobs), vec![2, 3]);
        assert!(array_child_indices(0, &jobs).is_empty());
        assert!(array_child_indices(2, &jobs).is_empty());
        assert!(array_child_indices(99, &jobs).is_empty());
    }

    #[test]
    fn test_indices_keep_duplicate_ids_apart() {
        let jobs = vec![
            Job::new("5", "first", JobStatus::Running),
            Job::new("5", "second", JobStatus::Running),
        ];
        assert_eq!(root_indices(&jobs), vec![0, 1]);
    }
}
