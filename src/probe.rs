use crate::error::FetchError;
use crate::exec::Runner;
use crate::kubectl;
use anyhow::Result;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
/// Health of a pod as read from its describe output.
pub enum PodHealth {
    RunningHealthy,
    RunningUnhealthy,
    NotRunning,
    Unknown,
}

impl PodHealth {
    /// Only a running pod with zero restarts is safe to copy from directly.
    pub fn is_healthy(self) -> bool {
        self == PodHealth::RunningHealthy
    }
}

/// Queries pod health via describe. A failed query is fatal: without it
/// there is no basis to pick the direct or the standby path.
pub fn probe_pod(runner: &impl Runner, namespace: &str, pod: &str) -> Result<PodHealth> {
    let text = kubectl::run(runner, &kubectl::describe_pod_args(namespace, pod)).map_err(
        |source| FetchError::ProbeFailed {
            pod: pod.to_string(),
            source,
        },
    )?;
    Ok(classify(&text))
}

/// Classifies describe output by its Status and Restart Count markers.
pub fn classify(describe: &str) -> PodHealth {
    let status = labeled_line_value(describe, "Status:");
    let restarts_zero = describe
        .lines()
        .filter_map(|line| line.trim_start().strip_prefix("Restart Count:"))
        .any(|rest| rest.trim() == "0");

    match status {
        Some(value) if value.starts_with("Running") => {
            if restarts_zero {
                PodHealth::RunningHealthy
            } else {
                PodHealth::RunningUnhealthy
            }
        }
        Some(_) => PodHealth::NotRunning,
        None => PodHealth::Unknown,
    }
}

fn labeled_line_value<'a>(text: &'a str, label: &str) -> Option<&'a str> {
    text.lines()
        .filter_map(|line| line.trim_start().strip_prefix(label))
        .map(str::trim)
        .next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::FakeRunner;

    const HEALTHY: &str = "Name:  amko-0\nStatus:  Running\nContainers:\n  amko:\n    Restart Count:  0\n";
    const RESTARTING: &str = "Status:  Running\n    Restart Count:  7\n";
    const PENDING: &str = "Status:  Pending\n    Restart Count:  0\n";

    #[test]
    fn classify_states() {
        assert_eq!(classify(HEALTHY), PodHealth::RunningHealthy);
        assert_eq!(classify(RESTARTING), PodHealth::RunningUnhealthy);
        assert_eq!(classify(PENDING), PodHealth::NotRunning);
        assert_eq!(classify("no status markers here"), PodHealth::Unknown);
    }

    #[test]
    fn only_running_healthy_is_healthy() {
        assert!(PodHealth::RunningHealthy.is_healthy());
        assert!(!PodHealth::RunningUnhealthy.is_healthy());
        assert!(!PodHealth::NotRunning.is_healthy());
        assert!(!PodHealth::Unknown.is_healthy());
    }

    #[test]
    fn probe_failure_is_fatal() {
        let runner = FakeRunner::new();
        runner.push_err("connection refused");
        let err = probe_pod(&runner, "avi-system", "amko-0").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FetchError>(),
            Some(FetchError::ProbeFailed { .. })
        ));
    }

    #[test]
    fn probe_classifies_describe_output() {
        let runner = FakeRunner::new();
        runner.push_ok(HEALTHY);
        let health = probe_pod(&runner, "avi-system", "amko-0").unwrap();
        assert_eq!(health, PodHealth::RunningHealthy);
    }
}
