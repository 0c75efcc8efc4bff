pub mod archive;
pub mod cli;
pub mod collect;
pub mod error;
pub mod exec;
pub mod helm;
pub mod kubectl;
pub mod probe;
pub mod resolve;
pub mod standby;

use anyhow::Result;
use cli::Args;
use error::FetchError;
use exec::Runner;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

const POLL_INTERVAL: Duration = Duration::from_secs(2);
// Lets an in-flight copy flush before the standby pod goes away.
const TEARDOWN_GRACE: Duration = Duration::from_secs(2);

pub fn run(args: Args) -> Result<()> {
    let runner = exec::SystemRunner;
    run_with(&args, &runner, POLL_INTERVAL, TEARDOWN_GRACE)
}

/// One collection run: resolve the pod, probe it, pick a source, collect,
/// archive, clean up. Strictly sequential.
pub fn run_with(
    args: &Args,
    runner: &impl Runner,
    poll_interval: Duration,
    grace: Duration,
) -> Result<()> {
    let ns = &args.namespace;

    // Resolve the workload pod and its health before anything else; without
    // either there is no basis for choosing a collection path.
    let pod = resolve::find_release_pod(runner, ns, &args.release)?;
    let health = probe::probe_pod(runner, ns, &pod)?;
    let binding = resolve::resolve_binding(runner, ns, &args.release)?;

    let output_dir = Path::new(&args.output_dir);
    let name = archive::bundle_name(&args.release);
    let staging = archive::Staging::create(output_dir, &name)?;

    let mut standby_manifest: Option<PathBuf> = None;
    match &binding.claim {
        None => {
            // Degraded mode: no persistent storage ever existed, so the pod's
            // own log stream is the only log source.
            info!(%pod, "no persistent volume defined, reading logs directly from the pod");
            collect::stream_log(runner, ns, &pod, &args.since, staging.path());
        }
        Some(_) if health.is_healthy() => {
            collect::copy_log(runner, ns, &pod, &binding, staging.path());
        }
        Some(claim) => {
            warn!(%pod, ?health, "workload pod is not healthy, creating backup pod");
            let manifest = output_dir.join("pod.yaml");
            let spec = standby::build_manifest(ns, claim, &binding.mount_path);
            standby::write_manifest(&manifest, &spec)?;

            let deadline = Duration::from_secs(args.wait);
            if let Err(err) = standby::provision(runner, ns, &manifest, deadline, poll_interval) {
                // The pod and its manifest stay behind for inspection unless
                // the caller asked otherwise.
                if args.cleanup_on_timeout && is_timeout(&err) {
                    standby::teardown(runner, ns, &manifest, Duration::ZERO);
                }
                return Err(err);
            }

            collect::copy_log(runner, ns, standby::STANDBY_POD, &binding, staging.path());
            standby_manifest = Some(manifest);
        }
    }

    collect::dump_auxiliary(runner, ns, staging.path());

    let dest = output_dir.join(format!("{name}.zip"));
    let zipped = archive::zip_dir(staging.path(), &dest);

    // The standby pod is torn down even when archiving failed; it must not
    // outlive the invocation once it reached Ready.
    if let Some(manifest) = &standby_manifest {
        standby::teardown(runner, ns, manifest, grace);
    }
    zipped?;

    println!("Success, logs zipped into {}", dest.display());
    Ok(())
}

fn is_timeout(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<FetchError>(),
        Some(FetchError::ProvisionTimeout { .. })
    )
}
