use crate::exec::Runner;
use anyhow::Result;
use std::path::Path;

/// Instance label set by helm on every pod of a release.
pub const INSTANCE_LABEL: &str = "app.kubernetes.io/instance";

/// Runs kubectl with the given argument list and captures stdout.
pub fn run(runner: &impl Runner, args: &[String]) -> Result<String> {
    let refs: Vec<&str> = args.iter().map(String::as_str).collect();
    runner.run_capture("kubectl", &refs)
}

/// Builds arguments listing the pods of a release by instance label.
pub fn list_pods_args(namespace: &str, release: &str) -> Vec<String> {
    vec![
        "get".into(),
        "pod".into(),
        "-n".into(),
        namespace.into(),
        "-l".into(),
        format!("{INSTANCE_LABEL}={release}"),
    ]
}

pub fn describe_pod_args(namespace: &str, pod: &str) -> Vec<String> {
    vec![
        "describe".into(),
        "pod".into(),
        pod.into(),
        "-n".into(),
        namespace.into(),
    ]
}

/// Builds arguments copying a file out of a pod into a local destination.
/// Parameters: `mount_path` (&str) in-pod mount directory, leading slash ok.
pub fn cp_args(
    namespace: &str,
    pod: &str,
    mount_path: &str,
    log_file: &str,
    dest: &Path,
) -> Vec<String> {
    // kubectl cp addresses the in-pod path relative to the container root.
    let mount = mount_path.trim_start_matches('/');
    vec![
        "cp".into(),
        format!("{namespace}/{pod}:{mount}/{log_file}"),
        dest.to_string_lossy().into_owned(),
    ]
}

/// Builds arguments streaming recent pod logs for a bounded window.
pub fn logs_args(namespace: &str, pod: &str, since: &str) -> Vec<String> {
    vec![
        "logs".into(),
        pod.into(),
        "-n".into(),
        namespace.into(),
        "--since".into(),
        since.into(),
    ]
}

/// Builds arguments exporting every instance of a resource kind as YAML.
pub fn get_yaml_args(namespace: &str, kind: &str) -> Vec<String> {
    vec![
        "get".into(),
        kind.into(),
        "-n".into(),
        namespace.into(),
        "-o".into(),
        "yaml".into(),
    ]
}

pub fn apply_args(manifest: &Path) -> Vec<String> {
    vec![
        "apply".into(),
        "-f".into(),
        manifest.to_string_lossy().into_owned(),
    ]
}

pub fn delete_pod_args(namespace: &str, pod: &str) -> Vec<String> {
    vec![
        "delete".into(),
        "pod".into(),
        pod.into(),
        "-n".into(),
        namespace.into(),
    ]
}
