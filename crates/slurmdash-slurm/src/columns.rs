//! Column schema for `squeue -O` queries.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const JOB_ID: &str = "JobID";
pub const NAME: &str = "Name";
pub const STATE: &str = "State";
pub const PARTITION: &str = "Partition";
pub const QOS: &str = "QOS";
pub const STDOUT: &str = "STDOUT";
pub const COMMAND: &str = "Command";
pub const TIME_LIMIT: &str = "TimeLimit";
pub const TIME_USED: &str = "TimeUsed";
pub const ARRAY_JOB_ID: &str = "ArrayJobID";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ColumnError {
    #[error("Invalid width {width:?} for column {name}: must be a positive integer")]
    InvalidColumnWidth { name: String, width: String },
    #[error("Empty column name")]
    EmptyName,
}

/// A named squeue field with an optional character width.
///
/// The width only shapes the query; output is split on whitespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerDataColumn {
    name: String,
    width: Option<u32>,
}

impl SchedulerDataColumn {
    pub fn new(name: impl Into<String>, width: Option<u32>) -> Result<Self, ColumnError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ColumnError::EmptyName);
        }
        if width == Some(0) {
            return Err(ColumnError::InvalidColumnWidth {
                name,
                width: "0".to_string(),
            });
        }
        Ok(Self { name, width })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> Option<u32> {
        self.width
    }
}

impl fmt::Display for SchedulerDataColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.width {
            Some(width) => write!(f, "{}:{}", self.name, width),
            None => f.write_str(&self.name),
        }
    }
}

impl FromStr for SchedulerDataColumn {
    type Err = ColumnError;

    /// Parse `Name` or `Name:width`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().split_once(':') {
            Some((name, width)) => {
                let parsed = width
                    .trim()
                    .parse::<u32>()
                    .map_err(|_| ColumnError::InvalidColumnWidth {
                        name: name.to_string(),
                        width: width.to_string(),
                    })?;
                Self::new(name.trim(), Some(parsed))
            }
            None => Self::new(s.trim(), None),
        }
    }
}

/// Parse a comma-separated column list such as `JobID:15,Name,State:25`.
pub fn parse_columns(list: &str) -> Result<Vec<SchedulerDataColumn>, ColumnError> {
    list.split(',')
        .map(|c| c.parse::<SchedulerDataColumn>())
        .collect()
}

/// The schema the dashboard queries by default.
pub fn default_columns() -> Vec<SchedulerDataColumn> {
    [
        (JOB_ID, 15),
        (NAME, 35),
        (STATE, 25),
        (PARTITION, 25),
        (QOS, 25),
        (STDOUT, 255),
        (COMMAND, 255),
        (TIME_LIMIT, 15),
        (TIME_USED, 15),
    ]
    .into_iter()
    .map(|(name, width)| SchedulerDataColumn {
        name: name.to_string(),
        width: Some(width),
    })
    .collect()
}

/// Render a schema as the argument to `squeue -O`.
pub fn format_columns(columns: &[SchedulerDataColumn]) -> String {
    columns
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
