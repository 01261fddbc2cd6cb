//! CLI argument parsing for slurmdash.

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use slurmdash_state::DashboardConfig;

#[derive(Parser, Debug)]
#[command(name = "slurmdash")]
#[command(about = "Watch and manage your SLURM jobs")]
pub struct Args {
    /// Serve a built-in job queue instead of calling SLURM
    #[arg(long, global = true)]
    pub fixture: bool,

    /// Sort jobs by: id, name, "time left" or status
    #[arg(long, global = true)]
    pub sort_by: Option<String>,

    /// Sort job scripts by: filename, "rel path", "last modified", newest or oldest
    #[arg(long, global = true)]
    pub script_sort_by: Option<String>,

    /// Queue refresh interval in seconds (0 disables)
    #[arg(long, global = true, default_value = "5")]
    pub refresh_interval: u64,

    /// Elapsed-time extrapolation interval in seconds (0 disables)
    #[arg(long, global = true, default_value = "1")]
    pub extrapolation_interval: u64,

    /// Show job metadata beneath each job
    #[arg(long, global = true)]
    pub show_job_info: bool,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show the job queue
    Queue {
        /// Keep refreshing until interrupted
        #[arg(long)]
        watch: bool,
    },

    /// List job scripts under a directory
    Scripts {
        #[arg(default_value = ".")]
        dir: Utf8PathBuf,
    },

    /// Cancel a job
    Cancel { job_id: String },

    /// Cancel every job in the queue
    CancelAll,

    /// Cancel a job and submit its batch script again
    Resubmit { job_id: String },

    /// Print the path of a job's batch script
    Source { job_id: String },

    /// Submit a job script with sbatch
    Submit { script: Utf8PathBuf },

    /// Submit every job script under a directory
    SubmitAll {
        #[arg(default_value = ".")]
        dir: Utf8PathBuf,
    },

    /// Print the path of a job's output file
    Output { job_id: String },
}

impl Args {
    /// The subcommand to run, `queue` when none was given.
    pub fn command(&self) -> Command {
        self.command
            .clone()
            .unwrap_or(Command::Queue { watch: false })
    }

    pub fn to_config(&self) -> DashboardConfig {
        DashboardConfig {
            sort_by: self.sort_by.clone(),
            script_sort_by: self.script_sort_by.clone(),
            refresh_interval_secs: Some(self.refresh_interval),
            extrapolation_interval_secs: Some(self.extrapolation_interval),
            show_job_info: self.show_job_info,
            prompt_before_cancel: !self.yes,
            prompt_before_cancel_all: !self.yes,
        }
    }
}
