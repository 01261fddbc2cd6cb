//! Job and script actions built on the scheduler capability.

use camino::{Utf8Path, Utf8PathBuf};
use slurmdash_slurm::{Job, Scheduler, SchedulerError};
use slurmdash_state::{JobScript, resolve_path_relative_to_workspace};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ActionError {
    #[error("Job {0} has no associated batch file")]
    NoBatchFile(String),
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
}

/// The job's batch script resolved against `workspace`.
pub fn batch_file_path(job: &Job, workspace: &Utf8Path) -> Result<Utf8PathBuf, ActionError> {
    job.batch_file
        .as_deref()
        .map(|file| resolve_path_relative_to_workspace(file, workspace))
        .ok_or_else(|| ActionError::NoBatchFile(job.id.clone()))
}

/// Cancel `job` and submit its batch script again, returning the new ID.
///
/// Nothing is cancelled when the job has no batch script.
pub async fn cancel_and_resubmit(
    scheduler: &dyn Scheduler,
    job: &Job,
    workspace: &Utf8Path,
) -> Result<String, ActionError> {
    let script = batch_file_path(job, workspace)?;
    scheduler.cancel_job(job).await?;
    let id = scheduler.submit_job(&script).await?;
    tracing::info!("Resubmitted job {} as {}", job.id, id);
    Ok(id)
}

/// Submit every script, returning each script's result in order.
///
/// A failed submission does not stop the rest.
pub async fn submit_all<'a>(
    scheduler: &dyn Scheduler,
    scripts: &'a [JobScript],
) -> Vec<(&'a JobScript, Result<String, SchedulerError>)> {
    let mut results = Vec::with_capacity(scripts.len());
    for script in scripts {
        let result = scheduler.submit_job(&script.path).await;
        if let Err(e) = &result {
            tracing::warn!("Error submitting {}: {}", script.relative_path, e);
        }
        results.push((script, result));
    }
    results
}
