use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "amkolog",
    version,
    about = "Collect a diagnostic log bundle from an AMKO release"
)]
pub struct Args {
    /// Namespace the release runs in.
    #[arg(short, long)]
    pub namespace: String,

    /// Helm release name of the AMKO deployment.
    #[arg(short, long)]
    pub release: String,

    /// Log-age window for pods without persistent storage, e.g. 2s, 4m, 24h.
    #[arg(short, long, default_value = "24h")]
    pub since: String,

    /// Seconds to wait for the backup pod to start running.
    #[arg(short, long, default_value_t = 30)]
    pub wait: u64,

    /// Directory receiving the staging folder and the final archive.
    #[arg(short, long, default_value = ".")]
    pub output_dir: String,

    // Leaving the pod behind keeps evidence when provisioning never succeeds.
    /// Delete the backup pod even when it never became healthy.
    #[arg(long, default_value_t = false)]
    pub cleanup_on_timeout: bool,
}
