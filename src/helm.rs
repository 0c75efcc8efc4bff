use crate::exec::Runner;
use anyhow::Result;
use tracing::info;

pub const DEFAULT_MOUNT_PATH: &str = "/log";
pub const DEFAULT_LOG_FILE: &str = "amko.log";

#[derive(Debug, Clone, PartialEq, Eq)]
/// Storage details extracted from the rendered release values.
pub struct VolumeBinding {
    /// None means the release runs without persistent storage.
    pub claim: Option<String>,
    pub mount_path: String,
    pub log_file: String,
}

/// Fetches the rendered values of a release via the helm CLI.
pub fn fetch_release_values(
    runner: &impl Runner,
    namespace: &str,
    release: &str,
) -> Result<String> {
    info!(%release, %namespace, "helm get all");
    runner.run_capture("helm", &["get", "all", release, "-n", namespace])
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Field {
    Missing,
    Empty,
    Value(String),
}

/// Extracts the value following `label` up to the end of the line.
// The helm output is human-readable text, not a parseable document; the
// contract with it is labeled-substring search only.
fn labeled_field(text: &str, label: &str) -> Field {
    let Some(start) = text.find(label) else {
        return Field::Missing;
    };
    let rest = &text[start + label.len()..];
    let line = rest.lines().next().unwrap_or("");
    let value = line.trim().trim_matches('"');
    if value.is_empty() {
        Field::Empty
    } else {
        Field::Value(value.to_string())
    }
}

/// Derives the volume binding from rendered release values.
/// Returns None when none of the expected labels is present, which marks the
/// metadata as malformed rather than merely sparse.
pub fn parse_binding(text: &str) -> Option<VolumeBinding> {
    let claim = labeled_field(text, "persistentVolumeClaim:");
    let mount = labeled_field(text, "mountPath:");
    let log_file = labeled_field(text, "logFile:");

    if claim == Field::Missing && mount == Field::Missing && log_file == Field::Missing {
        return None;
    }

    // An empty claim is a meaningful state: no persistent storage configured.
    let claim = match claim {
        Field::Value(v) => Some(v),
        Field::Empty | Field::Missing => None,
    };
    let mount_path = match mount {
        Field::Value(v) => v,
        Field::Empty | Field::Missing => DEFAULT_MOUNT_PATH.to_string(),
    };
    let log_file = match log_file {
        Field::Value(v) => v,
        Field::Empty | Field::Missing => DEFAULT_LOG_FILE.to_string(),
    };

    Some(VolumeBinding {
        claim,
        mount_path,
        log_file,
    })
}
