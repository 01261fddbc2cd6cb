//! Queue state, ordering and extrapolation for slurmdash.
//!
//! Everything here is synchronous and operates on caller-owned data.

pub mod arrays;
pub mod config;
pub mod extrapolate;
pub mod ordering;
pub mod scripts;
pub mod types;

pub use arrays::{array_child_indices, array_children, root_indices, root_jobs};
pub use config::DashboardConfig;
pub use extrapolate::{Extrapolator, extrapolate_time};
pub use ordering::{OrderingError, SortKey, compare_jobs, sort_jobs, sort_jobs_by};
pub use scripts::{
    JOB_SCRIPT_EXTENSIONS, JobScript, ScriptError, ScriptSortKey, compare_scripts,
    discover_job_scripts, is_job_script, parent_directory, resolve_path_relative_to_workspace,
    sort_job_scripts,
};
pub use types::{JobCounts, QueueSnapshot};
