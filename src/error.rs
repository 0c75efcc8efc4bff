use thiserror::Error;

/// Fatal outcomes of a collection run. Partial-collection and cleanup
/// problems are warnings, not variants here.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("no {workload} pod found for release {release} in namespace {namespace}")]
    NotFound {
        workload: &'static str,
        release: String,
        namespace: String,
    },

    #[error("release metadata for {release} has none of the expected fields")]
    MalformedMetadata { release: String },

    #[error("failed to query health of pod {pod}: {source}")]
    ProbeFailed {
        pod: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("backup pod {pod} did not become healthy within {deadline_secs}s")]
    ProvisionTimeout { pod: String, deadline_secs: u64 },
}
