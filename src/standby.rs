use crate::error::FetchError;
use crate::exec::Runner;
use crate::kubectl;
use crate::probe;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Name of the disposable pod mounting the release's claim.
pub const STANDBY_POD: &str = "custom-backup-pod";

const STANDBY_IMAGE: &str = "avinetworks/server-os";
const CONTAINER_NAME: &str = "myfrontend";
const VOLUME_NAME: &str = "mypd";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PodManifest {
    api_version: &'static str,
    kind: &'static str,
    metadata: Metadata,
    spec: PodSpec,
}

#[derive(Debug, Serialize)]
struct Metadata {
    name: &'static str,
    namespace: String,
}

#[derive(Debug, Serialize)]
struct PodSpec {
    containers: Vec<ContainerSpec>,
    volumes: Vec<VolumeSpec>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ContainerSpec {
    image: &'static str,
    name: &'static str,
    volume_mounts: Vec<VolumeMount>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VolumeMount {
    mount_path: String,
    name: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VolumeSpec {
    name: &'static str,
    persistent_volume_claim: ClaimRef,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ClaimRef {
    claim_name: String,
}

/// Builds the manifest of a single-container pod binding `claim` at `mount_path`.
pub fn build_manifest(namespace: &str, claim: &str, mount_path: &str) -> PodManifest {
    PodManifest {
        api_version: "v1",
        kind: "Pod",
        metadata: Metadata {
            name: STANDBY_POD,
            namespace: namespace.to_string(),
        },
        spec: PodSpec {
            containers: vec![ContainerSpec {
                image: STANDBY_IMAGE,
                name: CONTAINER_NAME,
                volume_mounts: vec![VolumeMount {
                    mount_path: mount_path.to_string(),
                    name: VOLUME_NAME,
                }],
            }],
            volumes: vec![VolumeSpec {
                name: VOLUME_NAME,
                persistent_volume_claim: ClaimRef {
                    claim_name: claim.to_string(),
                },
            }],
        },
    }
}

pub fn write_manifest(path: &Path, manifest: &PodManifest) -> Result<()> {
    let yaml = serde_yaml::to_string(manifest).context("failed to serialize pod manifest")?;
    fs::write(path, yaml).with_context(|| format!("failed to write {}", path.display()))
}

/// Submits the standby pod and polls until it is healthy or the deadline
/// passes. The deadline is checked before every sleep, so the loop runs at
/// most `deadline + interval` wall-clock time.
pub fn provision(
    runner: &impl Runner,
    namespace: &str,
    manifest: &Path,
    deadline: Duration,
    interval: Duration,
) -> Result<()> {
    info!(pod = STANDBY_POD, "creating backup pod");
    kubectl::run(runner, &kubectl::apply_args(manifest))?;

    let deadline_at = Instant::now() + deadline;
    loop {
        let health = probe::probe_pod(runner, namespace, STANDBY_POD)?;
        if health.is_healthy() {
            info!(pod = STANDBY_POD, "backup pod started");
            return Ok(());
        }
        if Instant::now() >= deadline_at {
            return Err(FetchError::ProvisionTimeout {
                pod: STANDBY_POD.to_string(),
                deadline_secs: deadline.as_secs(),
            }
            .into());
        }
        thread::sleep(interval);
    }
}

/// Deletes the standby pod and its manifest after a short grace delay.
/// Failures here are reported but never override an already-produced bundle.
pub fn teardown(runner: &impl Runner, namespace: &str, manifest: &Path, grace: Duration) {
    thread::sleep(grace);

    if let Err(err) = kubectl::run(runner, &kubectl::delete_pod_args(namespace, STANDBY_POD)) {
        warn!(pod = STANDBY_POD, error = %err, "failed to delete backup pod");
    }
    if let Err(err) = fs::remove_file(manifest) {
        warn!(path = %manifest.display(), error = %err, "failed to remove pod manifest");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::FakeRunner;

    const HEALTHY: &str = "Status: Running\n Restart Count: 0\n";
    const PENDING: &str = "Status: Pending\n Restart Count: 0\n";

    #[test]
    fn manifest_binds_claim_and_mount() {
        let manifest = build_manifest("avi-system", "data-pvc", "/var/log/app");
        let yaml = serde_yaml::to_string(&manifest).unwrap();
        assert!(yaml.contains("apiVersion: v1"));
        assert!(yaml.contains("kind: Pod"));
        assert!(yaml.contains("name: custom-backup-pod"));
        assert!(yaml.contains("namespace: avi-system"));
        assert!(yaml.contains("claimName: data-pvc"));
        assert!(yaml.contains("mountPath: /var/log/app"));
        assert!(yaml.contains("image: avinetworks/server-os"));
    }

    #[test]
    fn provision_ready_on_first_healthy_describe() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("pod.yaml");
        write_manifest(&manifest, &build_manifest("ns", "pvc", "/log")).unwrap();

        let runner = FakeRunner::new();
        runner.push_ok(""); // apply
        runner.push_ok(HEALTHY); // describe

        provision(&runner, "ns", &manifest, Duration::from_secs(30), Duration::ZERO).unwrap();

        let calls = runner.recorded();
        assert!(calls[0].has_arg("apply"));
        assert!(calls[1].has_arg("describe"));
        assert!(calls[1].has_arg(STANDBY_POD));
    }

    #[test]
    fn provision_times_out_with_zero_deadline() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("pod.yaml");
        write_manifest(&manifest, &build_manifest("ns", "pvc", "/log")).unwrap();

        let runner = FakeRunner::new();
        runner.push_ok(""); // apply
        runner.push_ok(PENDING); // single describe before deadline check

        let err = provision(&runner, "ns", &manifest, Duration::ZERO, Duration::ZERO).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FetchError>(),
            Some(FetchError::ProvisionTimeout { .. })
        ));
        // Exactly one poll happened: apply then describe.
        assert_eq!(runner.recorded().len(), 2);
    }

    #[test]
    fn teardown_deletes_pod_and_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("pod.yaml");
        write_manifest(&manifest, &build_manifest("ns", "pvc", "/log")).unwrap();

        let runner = FakeRunner::new();
        teardown(&runner, "ns", &manifest, Duration::ZERO);

        assert!(!manifest.exists());
        let calls = runner.recorded();
        assert!(calls[0].has_arg("delete"));
        assert!(calls[0].has_arg(STANDBY_POD));
    }

    #[test]
    fn teardown_survives_delete_failure() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("pod.yaml");

        let runner = FakeRunner::new();
        runner.push_err("pod already gone");
        // Manifest file absent too; both failures are warnings only.
        teardown(&runner, "ns", &manifest, Duration::ZERO);
    }
}
