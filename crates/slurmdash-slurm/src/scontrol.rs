//! Job detail lookups via `scontrol show job`.

use once_cell::sync::Lazy;
use regex::Regex;
use slurmdash_parsers::{CommandError, non_empty_string, run_command_allow_failure};
use tokio::process::Command;

static STDOUT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|\s)StdOut=(\S+)").expect("valid regex"));

/// Extract the `StdOut=` path from `scontrol show job` output.
pub fn parse_stdout_path(output: &str) -> Option<String> {
    STDOUT_RE
        .captures(output)
        .and_then(|caps| caps.get(1))
        .and_then(|m| non_empty_string(m.as_str()))
}

/// Ask the controller where a job writes its standard output.
///
/// Returns None once the job is no longer known to the controller.
pub async fn query_output_path(job_id: &str) -> Result<Option<String>, CommandError> {
    let mut cmd = Command::new("scontrol");
    cmd.args(["show", "job", job_id]);

    let stdout = run_command_allow_failure(&mut cmd, "scontrol").await?;
    Ok(parse_stdout_path(&stdout))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_stdout_path() {
        let output = "JobId=123457 JobName=job2\n   UserId=me(1000) GroupId=me(1000)\n   \
                      Command=/home/me/job2.sbatch\n   StdErr=/home/me/job2.err\n   \
                      StdIn=/dev/null\n   StdOut=/home/me/job2.out\n";
        assert_eq!(parse_stdout_path(output).as_deref(), Some("/home/me/job2.out"));
    }

    #[test]
    fn test_parse_stdout_path_missing() {
        assert_eq!(parse_stdout_path(""), None);
        assert_eq!(parse_stdout_path("JobId=1 StdErr=/tmp/x.err"), None);
        assert_eq!(parse_stdout_path("JobId=1 StdOut=(null)"), None);
    }
}
