//! SLURM integration for slurmdash.
//!
//! Builds `squeue -O` queries, parses their output into [`Job`]s and
//! exposes the [`Scheduler`] capability with live and fixture backends.

pub mod columns;
pub mod scheduler;
pub mod scontrol;
pub mod squeue;
pub mod types;

pub use columns::{ColumnError, SchedulerDataColumn, default_columns, parse_columns};
pub use scheduler::{FixtureScheduler, Scheduler, SchedulerError, SlurmScheduler};
pub use squeue::{parse_queue_output, query_squeue, squeue_args};
pub use types::{Job, JobStatus};
