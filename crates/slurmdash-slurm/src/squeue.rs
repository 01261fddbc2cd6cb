//! Query the active SLURM queue via squeue.

use crate::columns::{
    ARRAY_JOB_ID, COMMAND, JOB_ID, NAME, PARTITION, STATE, STDOUT, SchedulerDataColumn,
    TIME_LIMIT, TIME_USED, format_columns,
};
use crate::types::{Job, JobStatus};
use slurmdash_parsers::{
    CommandError, non_empty_string, parse_wall_time_field, run_command, split_columns,
};
use std::collections::HashMap;
use tokio::process::Command;

/// Arguments for `squeue` that list the current user's jobs in `columns`.
pub fn squeue_args(columns: &[SchedulerDataColumn]) -> Vec<String> {
    vec![
        "--me".to_string(),
        "--noheader".to_string(),
        "-O".to_string(),
        format_columns(columns),
    ]
}

/// Parse a single line of squeue output.
///
/// Tokens are matched to `columns` by position. Missing trailing tokens
/// leave their fields unset and surplus tokens are ignored, so a column
/// value containing whitespace shifts every column after it.
fn parse_squeue_line(line: &str, columns: &[SchedulerDataColumn]) -> Option<Job> {
    let fields: HashMap<&str, &str> = columns
        .iter()
        .map(SchedulerDataColumn::name)
        .zip(split_columns(line))
        .collect();

    let field = |name: &str| fields.get(name).copied();

    let Some(id) = field(JOB_ID) else {
        tracing::warn!("Skipping squeue line without a {} column: {}", JOB_ID, line);
        return None;
    };

    let mut job = Job::new(
        id,
        field(NAME).unwrap_or_default(),
        field(STATE)
            .map(|s| JobStatus::from(s.to_string()))
            .unwrap_or(JobStatus::Other(String::new())),
    );
    job.queue = field(PARTITION).and_then(non_empty_string);
    job.batch_file = field(COMMAND).and_then(non_empty_string);
    job.output_file = field(STDOUT).and_then(non_empty_string);
    job.max_time = field(TIME_LIMIT).and_then(parse_wall_time_field);
    job.cur_time = field(TIME_USED).and_then(parse_wall_time_field);
    job.array_id = field(ARRAY_JOB_ID).and_then(non_empty_string);

    Some(job)
}

/// Turn raw squeue output into jobs, in output order.
///
/// Blank lines are skipped.
pub fn parse_queue_output(output: &str, columns: &[SchedulerDataColumn]) -> Vec<Job> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| parse_squeue_line(line, columns))
        .collect()
}

/// Query the current user's jobs with squeue.
pub async fn query_squeue(columns: &[SchedulerDataColumn]) -> Result<Vec<Job>, CommandError> {
    let mut cmd = Command::new("squeue");
    cmd.args(squeue_args(columns));

    let stdout = run_command(&mut cmd, "squeue").await?;
    let jobs = parse_queue_output(&stdout, columns);
    tracing::debug!("squeue returned {} jobs", jobs.len());

    Ok(jobs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::{default_columns, parse_columns};
    use slurmdash_parsers::WallTime;

    #[test]
    fn test_squeue_args() {
        let columns = parse_columns("JobID:15,Name").unwrap();
        assert_eq!(
            squeue_args(&columns),
            vec!["--me", "--noheader", "-O", "JobID:15,Name"]
        );
    }

    #[test]
    fn test_parse_squeue_line() {
        let line = "123457   job2   RUNNING   batch   normal   job2.out   job2.sbatch   6:00:00   14:39";
        let job = parse_squeue_line(line, &default_columns()).unwrap();
        assert_eq!(job.id, "123457");
        assert_eq!(job.name, "job2");
        assert_eq!(job.status, JobStatus::Running);
        assert_eq!(job.queue.as_deref(), Some("batch"));
        assert_eq!(job.output_file.as_deref(), Some("job2.out"));
        assert_eq!(job.batch_file.as_deref(), Some("job2.sbatch"));
        assert_eq!(job.max_time, Some(WallTime::new(0, 6, 0, 0).unwrap()));
        assert_eq!(job.cur_time, Some(WallTime::new(0, 0, 14, 39).unwrap()));
        assert!(job.array_id.is_none());
    }

    #[test]
    fn test_short_line_leaves_trailing_fields_unset() {
        let job = parse_squeue_line("42 short PENDING", &default_columns()).unwrap();
        assert_eq!(job.id, "42");
        assert_eq!(job.status, JobStatus::Pending);
        assert!(job.queue.is_none());
        assert!(job.batch_file.is_none());
        assert!(job.max_time.is_none());
        assert!(job.cur_time.is_none());
    }

    #[test]
    fn test_bad_duration_only_drops_that_field() {
        let line = "7 sim RUNNING batch normal sim.out sim.sbatch UNLIMITED 1:2:3:4";
        let job = parse_squeue_line(line, &default_columns()).unwrap();
        assert_eq!(job.name, "sim");
        assert!(job.max_time.is_none());
        assert!(job.cur_time.is_none());
        assert_eq!(job.batch_file.as_deref(), Some("sim.sbatch"));
    }

    #[test]
    fn test_unknown_state_is_kept() {
        let job = parse_squeue_line("9 x PREEMPTED", &default_columns()).unwrap();
        assert_eq!(job.status, JobStatus::Other("PREEMPTED".to_string()));
    }

    #[test]
    fn test_extra_tokens_are_ignored() {
        let columns = parse_columns("JobID,Name,Command,TimeUsed").unwrap();
        let job = parse_squeue_line("5 run ./run.sh --fast 10:00", &columns).unwrap();
        // The argument lands in TimeUsed and the real value is dropped
        assert_eq!(job.batch_file.as_deref(), Some("./run.sh"));
        assert!(job.cur_time.is_none());
    }

    #[test]
    fn test_array_job_id_column() {
        let columns = parse_columns("JobID,Name,State,ArrayJobID").unwrap();
        let output = "100 a RUNNING 100\n100_1 a RUNNING 100\n7 b PENDING N/A\n";
        let jobs = parse_queue_output(output, &columns);
        assert_eq!(jobs[0].array_id.as_deref(), Some("100"));
        assert!(jobs[0].is_job_array_root());
        assert!(jobs[1].is_in_job_array() && !jobs[1].is_job_array_root());
        assert!(jobs[2].array_id.is_none());
    }

    #[test]
    fn test_parse_queue_output_skips_blank_lines_and_keeps_order() {
        let output = "\n3 c PENDING\n\n   \n1 a RUNNING\n2 b COMPLETED\n";
        let jobs = parse_queue_output(output, &default_columns());
        let ids: Vec<_> = jobs.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(ids, vec!["3", "1", "2"]);
    }

    #[test]
    fn test_parse_queue_output_empty() {
        assert!(parse_queue_output("", &default_columns()).is_empty());
    }
}
