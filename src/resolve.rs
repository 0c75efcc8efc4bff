use crate::error::FetchError;
use crate::exec::Runner;
use crate::helm::{self, VolumeBinding};
use crate::kubectl;
use anyhow::Result;
use tracing::info;

/// Substring identifying the workload pod among the release's pods.
pub const WORKLOAD: &str = "amko";

/// Finds the workload pod of a release.
/// Returns: Result<String> pod name, or NotFound when no pod matches.
pub fn find_release_pod(runner: &impl Runner, namespace: &str, release: &str) -> Result<String> {
    let listing = kubectl::run(runner, &kubectl::list_pods_args(namespace, release))?;
    match first_workload_pod(&listing) {
        Some(pod) => {
            info!(%pod, "resolved workload pod");
            Ok(pod)
        }
        None => Err(FetchError::NotFound {
            workload: WORKLOAD,
            release: release.to_string(),
            namespace: namespace.to_string(),
        }
        .into()),
    }
}

/// Picks the first pod name containing the workload substring.
// The listing is `kubectl get pod` tabular output: a header line, then one
// line per pod with the name in the first column.
fn first_workload_pod(listing: &str) -> Option<String> {
    listing
        .lines()
        .skip(1)
        .filter_map(|line| line.split_whitespace().next())
        .find(|name| name.contains(WORKLOAD))
        .map(str::to_string)
}

/// Derives the release's volume binding from its rendered values.
pub fn resolve_binding(runner: &impl Runner, namespace: &str, release: &str) -> Result<VolumeBinding> {
    let values = helm::fetch_release_values(runner, namespace, release)?;
    let binding = helm::parse_binding(&values).ok_or_else(|| FetchError::MalformedMetadata {
        release: release.to_string(),
    })?;
    info!(claim = ?binding.claim, mount = %binding.mount_path, file = %binding.log_file, "resolved volume binding");
    Ok(binding)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::FakeRunner;

    const LISTING: &str = "NAME                    READY   STATUS    RESTARTS   AGE\n\
                           other-helper-0          1/1     Running   0          4d\n\
                           amko-59b7f8d5c4-xv2mh   1/1     Running   0          4d\n";

    #[test]
    fn picks_first_amko_pod_after_header() {
        assert_eq!(
            first_workload_pod(LISTING).unwrap(),
            "amko-59b7f8d5c4-xv2mh"
        );
    }

    #[test]
    fn header_alone_matches_nothing() {
        // The header's NAME column must not be mistaken for a pod.
        assert_eq!(first_workload_pod("NAME READY STATUS\n"), None);
    }

    #[test]
    fn find_release_pod_not_found() {
        let runner = FakeRunner::new();
        runner.push_ok("NAME READY\nother-0 1/1\n");
        let err = find_release_pod(&runner, "avi-system", "amko").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FetchError>(),
            Some(FetchError::NotFound { .. })
        ));
    }

    #[test]
    fn resolve_binding_malformed_metadata() {
        let runner = FakeRunner::new();
        runner.push_ok("unrelated helm notes");
        let err = resolve_binding(&runner, "avi-system", "amko").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FetchError>(),
            Some(FetchError::MalformedMetadata { .. })
        ));
    }
}
