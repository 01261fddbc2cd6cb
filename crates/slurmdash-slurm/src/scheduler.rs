//! The scheduler capability the dashboard is written against.
//!
//! [`SlurmScheduler`] shells out to the SLURM command-line tools;
//! [`FixtureScheduler`] serves a fixed queue from memory.

use crate::columns::{SchedulerDataColumn, default_columns, parse_columns};
use crate::scontrol::query_output_path;
use crate::squeue::{parse_queue_output, query_squeue};
use crate::types::{Job, JobStatus};
use async_trait::async_trait;
use camino::Utf8Path;
use once_cell::sync::Lazy;
use regex::Regex;
use slurmdash_parsers::{CommandError, WallTime, run_command};
use thiserror::Error;
use tokio::process::Command;
use tokio::sync::Mutex;

#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error("Job not found: {0}")]
    NotFound(String),
    #[error("Invalid job script {0}")]
    InvalidScript(String),
}

/// Operations the dashboard needs from a batch scheduler.
#[async_trait]
pub trait Scheduler: Send + Sync {
    /// Jobs currently in the queue, in scheduler order.
    async fn get_queue(&self) -> Result<Vec<Job>, SchedulerError>;

    async fn cancel_job(&self, job: &Job) -> Result<(), SchedulerError>;

    /// Submit a batch script and return the new job's ID.
    async fn submit_job(&self, script: &Utf8Path) -> Result<String, SchedulerError>;

    /// Where the job writes its standard output, if anywhere.
    async fn get_job_output_path(&self, job: &Job) -> Result<Option<String>, SchedulerError>;
}

static SUBMITTED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Submitted batch job (\S+)").expect("valid regex"));

/// Extract the job ID from sbatch's acknowledgement, falling back to the
/// trimmed output for `--parsable` style replies.
fn parse_sbatch_output(output: &str) -> String {
    SUBMITTED_RE
        .captures(output)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| output.trim().to_string())
}

/// Live SLURM backend.
#[derive(Debug, Clone)]
pub struct SlurmScheduler {
    columns: Vec<SchedulerDataColumn>,
}

impl SlurmScheduler {
    pub fn new(columns: Vec<SchedulerDataColumn>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[SchedulerDataColumn] {
        &self.columns
    }
}

impl Default for SlurmScheduler {
    fn default() -> Self {
        Self::new(default_columns())
    }
}

#[async_trait]
impl Scheduler for SlurmScheduler {
    async fn get_queue(&self) -> Result<Vec<Job>, SchedulerError> {
        Ok(query_squeue(&self.columns).await?)
    }

    async fn cancel_job(&self, job: &Job) -> Result<(), SchedulerError> {
        let mut cmd = Command::new("scancel");
        cmd.arg(&job.id);
        run_command(&mut cmd, "scancel").await?;
        tracing::info!("Cancelled job {}", job.id);
        Ok(())
    }

    async fn submit_job(&self, script: &Utf8Path) -> Result<String, SchedulerError> {
        let file_name = script
            .file_name()
            .ok_or_else(|| SchedulerError::InvalidScript(script.to_string()))?;

        // Run from the script's directory so relative paths inside it resolve
        let mut cmd = Command::new("sbatch");
        cmd.arg(file_name);
        if let Some(dir) = script.parent().filter(|d| !d.as_str().is_empty()) {
            cmd.current_dir(dir);
        }

        let stdout = run_command(&mut cmd, "sbatch").await?;
        let job_id = parse_sbatch_output(&stdout);
        tracing::info!("Submitted {} as job {}", script, job_id);
        Ok(job_id)
    }

    async fn get_job_output_path(&self, job: &Job) -> Result<Option<String>, SchedulerError> {
        if let Some(path) = &job.output_file {
            return Ok(Some(path.clone()));
        }
        Ok(query_output_path(&job.id).await?)
    }
}

/// Columns of [`FIXTURE_QUEUE`].
pub const FIXTURE_COLUMNS: &str =
    "JobID:15,Name:35,State:25,Partition:25,QOS:25,STDOUT:255,Command:255,TimeLimit:15,TimeUsed:15,ArrayJobID:15";

/// A small queue covering every state and one job array.
pub const FIXTURE_QUEUE: &str = "\
1001     job1   RUNNING      batch   normal   job1.out     job1.sbatch       1:00:00      30:00        N/A
1002     job2   RUNNING      batch   normal   job2.out     job2.sbatch       30:00        27:45        N/A
1003     job3   PENDING      batch   normal   job3.out     more/job3.job     15:00        00           N/A
1004     job4   COMPLETED    debug   normal   job4.out     job4.slurm        1-00:00:00   1:37:16      N/A
1005     job5   TIMEOUT      batch   normal   job5.out     job5.slurm        10:00        10:00        N/A
1006     job6   CANCELLED    batch   normal   job6.out     job6.sbatch       2:00:00      03:12        N/A
1007     job7   RUNNING      gpu     normal   job7.out     array.sbatch      6:00:00      14:39        1007
1007_1   job8   RUNNING      gpu     normal   job8.out     array.sbatch      6:00:00      14:39        1007
1007_2   job9   PENDING      gpu     normal   job9.out     array.sbatch      6:00:00      00           1007
";

/// In-memory backend serving a fixed queue.
///
/// Cancelling removes the job (and an array root's members) and submitting
/// appends a pending one, so a dashboard can be exercised without a cluster.
#[derive(Debug)]
pub struct FixtureScheduler {
    jobs: Mutex<Vec<Job>>,
}

impl FixtureScheduler {
    pub fn new(jobs: Vec<Job>) -> Self {
        Self {
            jobs: Mutex::new(jobs),
        }
    }

    /// Build the queue from captured squeue output.
    pub fn from_output(output: &str, columns: &[SchedulerDataColumn]) -> Self {
        Self::new(parse_queue_output(output, columns))
    }
}

impl Default for FixtureScheduler {
    fn default() -> Self {
        let columns = parse_columns(FIXTURE_COLUMNS).unwrap_or_else(|_| default_columns());
        Self::from_output(FIXTURE_QUEUE, &columns)
    }
}

#[async_trait]
impl Scheduler for FixtureScheduler {
    async fn get_queue(&self) -> Result<Vec<Job>, SchedulerError> {
        Ok(self.jobs.lock().await.clone())
    }

    async fn cancel_job(&self, job: &Job) -> Result<(), SchedulerError> {
        let mut jobs = self.jobs.lock().await;
        let before = jobs.len();
        // Cancelling an array root takes its members with it
        let root = job.is_job_array_root().then_some(job.id.as_str());
        jobs.retain(|j| j.id != job.id && (root.is_none() || j.array_id.as_deref() != root));
        if jobs.len() == before {
            return Err(SchedulerError::NotFound(job.id.clone()));
        }
        Ok(())
    }

    async fn submit_job(&self, script: &Utf8Path) -> Result<String, SchedulerError> {
        let stem = script
            .file_stem()
            .ok_or_else(|| SchedulerError::InvalidScript(script.to_string()))?;

        let mut jobs = self.jobs.lock().await;
        let next_id = jobs
            .iter()
            .filter_map(|j| j.id.split('_').next()?.parse::<u64>().ok())
            .max()
            .map_or(1, |max| max + 1)
            .to_string();

        let mut job = Job::new(next_id.clone(), stem, JobStatus::Pending)
            .with_times(WallTime::ZERO, WallTime::ZERO);
        job.queue = Some("batch".to_string());
        job.batch_file = Some(script.to_string());
        job.output_file = Some(format!("{}-{}.out", stem, next_id));
        jobs.push(job);

        Ok(next_id)
    }

    async fn get_job_output_path(&self, job: &Job) -> Result<Option<String>, SchedulerError> {
        Ok(job.output_file.clone())
    }
}
