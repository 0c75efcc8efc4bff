use crate::exec::Runner;
use crate::helm::VolumeBinding;
use crate::kubectl;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Local name of the collected log, independent of its in-pod name.
pub const LOG_ARTIFACT: &str = "amko.log";
const GDP_ARTIFACT: &str = "gdp.yaml";
const GSLB_ARTIFACT: &str = "gslb.yaml";

/// Copies the log file out of a healthy pod into the staging directory.
/// A failed copy downgrades to a warning: a bundle without the log still
/// carries the auxiliary dumps.
pub fn copy_log(
    runner: &impl Runner,
    namespace: &str,
    pod: &str,
    binding: &VolumeBinding,
    staging: &Path,
) {
    let dest = staging.join(LOG_ARTIFACT);
    let args = kubectl::cp_args(namespace, pod, &binding.mount_path, &binding.log_file, &dest);
    match kubectl::run(runner, &args) {
        Ok(_) => info!(%pod, file = %binding.log_file, "copied log file"),
        Err(err) => warn!(%pod, error = %err, "failed to copy log file, continuing without it"),
    }
}

/// Fallback for releases without persistent storage: captures the pod's own
/// log stream for the bounded recent window.
pub fn stream_log(runner: &impl Runner, namespace: &str, pod: &str, since: &str, staging: &Path) {
    match kubectl::run(runner, &kubectl::logs_args(namespace, pod, since)) {
        Ok(logs) => {
            let dest = staging.join(LOG_ARTIFACT);
            if let Err(err) = fs::write(&dest, logs) {
                warn!(path = %dest.display(), error = %err, "failed to write log stream");
            } else {
                info!(%pod, %since, "captured log stream");
            }
        }
        Err(err) => warn!(%pod, error = %err, "failed to stream logs, continuing without them"),
    }
}

/// Dumps the gdp and gslbconfig custom resources next to the log.
/// Each dump is independently best-effort.
pub fn dump_auxiliary(runner: &impl Runner, namespace: &str, staging: &Path) {
    dump_resource(runner, namespace, "gdp", staging, GDP_ARTIFACT);
    dump_resource(runner, namespace, "gslbconfig", staging, GSLB_ARTIFACT);
}

fn dump_resource(runner: &impl Runner, namespace: &str, kind: &str, staging: &Path, artifact: &str) {
    let yaml = match kubectl::run(runner, &kubectl::get_yaml_args(namespace, kind)) {
        Ok(yaml) => yaml,
        Err(err) => {
            warn!(%kind, error = %err, "failed to dump resource, skipping");
            return;
        }
    };
    if yaml.is_empty() {
        warn!(%kind, "no instances in namespace, skipping");
        return;
    }

    let dest = staging.join(artifact);
    if let Err(err) = fs::write(&dest, yaml) {
        warn!(path = %dest.display(), error = %err, "failed to write resource dump");
    } else {
        info!(%kind, %artifact, "dumped resource");
    }
}
