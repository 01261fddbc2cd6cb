//! slurmdash - a dashboard for your SLURM jobs.

mod actions;
mod polling;
mod render;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use miette::{IntoDiagnostic, Result, miette};
use polling::PollingService;
use slurmdash_cli::{Args, Command};
use slurmdash_slurm::{FixtureScheduler, Job, Scheduler, SlurmScheduler};
use slurmdash_state::{
    DashboardConfig, QueueSnapshot, discover_job_scripts, resolve_path_relative_to_workspace,
    sort_job_scripts,
};
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let scheduler: Arc<dyn Scheduler> = if args.fixture {
        Arc::new(FixtureScheduler::default())
    } else {
        Arc::new(SlurmScheduler::default())
    };
    let config = args.to_config();

    match args.command() {
        Command::Queue { watch: false } => show_queue(scheduler, &config, args.json).await,
        Command::Queue { watch: true } => {
            let show_job_info = config.show_job_info;
            let json = args.json;
            PollingService::new(scheduler, config)
                .run(|snapshot| print_queue(snapshot, show_job_info, json))
                .await;
            Ok(())
        }
        Command::Scripts { dir } => show_scripts(&dir, &config, args.json),
        Command::Cancel { job_id } => {
            let job = find_job(scheduler.as_ref(), &job_id).await?;
            if config.prompt_before_cancel
                && !confirm(&format!("Cancel job {} ({})?", job.id, job.name)).await?
            {
                return Ok(());
            }
            scheduler.cancel_job(&job).await.into_diagnostic()?;
            println!("Cancelled job {}", job.id);
            Ok(())
        }
        Command::CancelAll => cancel_all(scheduler.as_ref(), &config).await,
        Command::Resubmit { job_id } => {
            let job = find_job(scheduler.as_ref(), &job_id).await?;
            // Checked before prompting so a job without a script is never cancelled
            actions::batch_file_path(&job, &workspace()?).into_diagnostic()?;
            if config.prompt_before_cancel
                && !confirm(&format!("Cancel job {} and resubmit?", job.id)).await?
            {
                return Ok(());
            }
            let id = actions::cancel_and_resubmit(scheduler.as_ref(), &job, &workspace()?)
                .await
                .into_diagnostic()?;
            println!("Cancelled job {} and submitted batch job {}", job.id, id);
            Ok(())
        }
        Command::Source { job_id } => {
            let job = find_job(scheduler.as_ref(), &job_id).await?;
            let path = actions::batch_file_path(&job, &workspace()?).into_diagnostic()?;
            println!("{}", path);
            Ok(())
        }
        Command::SubmitAll { dir } => submit_all(scheduler.as_ref(), &dir, &config).await,
        Command::Submit { script } => {
            let script = resolve_path_relative_to_workspace(script.as_str(), &workspace()?);
            let id = scheduler.submit_job(&script).await.into_diagnostic()?;
            println!("Submitted batch job {}", id);
            Ok(())
        }
        Command::Output { job_id } => {
            let job = find_job(scheduler.as_ref(), &job_id).await?;
            match scheduler.get_job_output_path(&job).await.into_diagnostic()? {
                Some(path) => println!("{}", path),
                None => return Err(miette!("No output file known for job {}", job.id)),
            }
            Ok(())
        }
    }
}

fn print_queue(snapshot: &QueueSnapshot, show_job_info: bool, json: bool) {
    if json {
        match render::queue_json(snapshot) {
            Ok(json) => println!("{}", json),
            Err(e) => tracing::error!("Error serializing queue: {}", e),
        }
    } else {
        print!("{}", render::render_queue(snapshot, show_job_info));
    }
}

async fn fetch_snapshot(scheduler: &dyn Scheduler, config: &DashboardConfig) -> Result<QueueSnapshot> {
    let jobs = scheduler.get_queue().await.into_diagnostic()?;
    Ok(QueueSnapshot::sorted(jobs, config.sort_by.as_deref()))
}

async fn show_queue(scheduler: Arc<dyn Scheduler>, config: &DashboardConfig, json: bool) -> Result<()> {
    let snapshot = fetch_snapshot(scheduler.as_ref(), config).await?;
    print_queue(&snapshot, config.show_job_info, json);
    Ok(())
}

fn show_scripts(dir: &Utf8Path, config: &DashboardConfig, json: bool) -> Result<()> {
    let mut scripts = discover_job_scripts(dir).into_diagnostic()?;
    // An unknown key is logged and the discovery order kept
    let _ = sort_job_scripts(&mut scripts, config.script_sort_by.as_deref());

    if json {
        println!("{}", serde_json::to_string_pretty(&scripts).into_diagnostic()?);
    } else {
        print!("{}", render::render_scripts(&scripts));
    }
    Ok(())
}

/// The current directory, which relative job paths resolve against.
fn workspace() -> Result<Utf8PathBuf> {
    let cwd = std::env::current_dir().into_diagnostic()?;
    Utf8PathBuf::try_from(cwd).into_diagnostic()
}

async fn submit_all(scheduler: &dyn Scheduler, dir: &Utf8Path, config: &DashboardConfig) -> Result<()> {
    let mut scripts = discover_job_scripts(dir).into_diagnostic()?;
    let _ = sort_job_scripts(&mut scripts, config.script_sort_by.as_deref());
    if scripts.is_empty() {
        println!("No job scripts under {}", dir);
        return Ok(());
    }

    let results = actions::submit_all(scheduler, &scripts).await;
    let failed = results.iter().filter(|(_, r)| r.is_err()).count();
    for (script, result) in &results {
        if let Ok(id) = result {
            println!("Submitted {} as batch job {}", script.relative_path, id);
        }
    }
    if failed > 0 {
        return Err(miette!("{} of {} scripts failed to submit", failed, results.len()));
    }
    Ok(())
}

async fn find_job(scheduler: &dyn Scheduler, job_id: &str) -> Result<Job> {
    scheduler
        .get_queue()
        .await
        .into_diagnostic()?
        .into_iter()
        .find(|j| j.id == job_id)
        .ok_or_else(|| miette!("Job {} is not in the queue", job_id))
}

/// Cancel every top-level job; array members go with their root.
async fn cancel_all(scheduler: &dyn Scheduler, config: &DashboardConfig) -> Result<()> {
    let snapshot = fetch_snapshot(scheduler, config).await?;
    let roots = snapshot.roots();
    if roots.is_empty() {
        println!("No jobs to cancel");
        return Ok(());
    }
    if config.prompt_before_cancel_all
        && !confirm(&format!("Cancel all {} jobs?", roots.len())).await?
    {
        return Ok(());
    }

    for job in roots {
        match scheduler.cancel_job(job).await {
            Ok(()) => println!("Cancelled job {}", job.id),
            Err(e) => tracing::warn!("Error cancelling job {}: {}", job.id, e),
        }
    }
    Ok(())
}

async fn confirm(question: &str) -> Result<bool> {
    print!("{} [y/N] ", question);
    std::io::stdout().flush().into_diagnostic()?;

    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await
        .into_diagnostic()?;
    Ok(matches!(line.trim().to_lowercase().as_str(), "y" | "yes"))
}
