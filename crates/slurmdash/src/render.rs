//! Text and JSON views of the queue and job scripts.

use serde::Serialize;
use slurmdash_parsers::WallTime;
use slurmdash_slurm::{Job, JobStatus};
use slurmdash_state::{JobScript, QueueSnapshot};
use std::fmt::Write;

/// Fraction of the time limit past which a running job is flagged.
const NEAR_LIMIT: f64 = 0.9;

#[derive(Debug, Serialize)]
struct JobView<'a> {
    #[serde(flatten)]
    job: &'a Job,
    displayed_time: Option<WallTime>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<JobView<'a>>,
}

/// Whether a running job has used most of its limit, judged by the time on
/// display so extrapolated progress counts.
fn near_limit(job: &Job, displayed: Option<WallTime>) -> bool {
    job.status == JobStatus::Running
        && displayed.and_then(|cur| job.is_percent_finished_at(cur, NEAR_LIMIT)) == Some(true)
}

fn progress(job: &Job, displayed: Option<WallTime>) -> String {
    match (displayed, job.max_time) {
        (Some(cur), Some(max)) => format!("{} / {}", cur, max),
        _ => String::new(),
    }
}

fn write_job(out: &mut String, job: &Job, displayed: Option<WallTime>, indent: usize, info: bool) {
    let marker = if near_limit(job, displayed) { "!" } else { " " };
    let _ = writeln!(
        out,
        "{marker}{:indent$}{:<12} {:<20} {:<11} {}",
        "",
        job.id,
        job.name,
        job.status.as_str(),
        progress(job, displayed),
    );
    if info {
        for (label, value) in job.info_items() {
            let _ = writeln!(out, " {:indent$}    {}: {}", "", label, value);
        }
    }
}

/// Root jobs in queue order with array members indented beneath them.
pub fn render_queue(snapshot: &QueueSnapshot, show_job_info: bool) -> String {
    let counts = snapshot.job_counts();
    let mut out = format!(
        "{} jobs: {} running, {} pending, {} completed, {} failed, {} cancelled\n",
        counts.total, counts.running, counts.pending, counts.completed, counts.failed,
        counts.cancelled
    );

    let jobs = snapshot.jobs();
    for root in snapshot.root_indices() {
        write_job(&mut out, &jobs[root], snapshot.displayed_time(root), 0, show_job_info);
        for child in snapshot.child_indices(root) {
            write_job(&mut out, &jobs[child], snapshot.displayed_time(child), 2, show_job_info);
        }
    }
    out
}

fn job_view<'a>(snapshot: &'a QueueSnapshot, index: usize, children: Vec<JobView<'a>>) -> JobView<'a> {
    JobView {
        job: &snapshot.jobs()[index],
        displayed_time: snapshot.displayed_time(index),
        children,
    }
}

pub fn queue_json(snapshot: &QueueSnapshot) -> serde_json::Result<String> {
    let jobs: Vec<JobView> = snapshot
        .root_indices()
        .into_iter()
        .map(|root| {
            let children = snapshot
                .child_indices(root)
                .into_iter()
                .map(|child| job_view(snapshot, child, Vec::new()))
                .collect();
            job_view(snapshot, root, children)
        })
        .collect();
    serde_json::to_string_pretty(&jobs)
}

pub fn render_scripts(scripts: &[JobScript]) -> String {
    let mut out = String::new();
    for script in scripts {
        let modified = script
            .modified
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        let _ = writeln!(out, "{:<40} {}", script.relative_path, modified);
    }
    out
}
