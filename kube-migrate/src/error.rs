use std::io;

use thiserror::Error;

/// Errors produced by the migration pipelines.
///
/// Only `Transport` and `Config` abort a run; a `Patch` failure is recorded
/// against its resource and the remaining batch continues.
#[derive(Debug, Error)]
pub enum Error {
    /// Listing resources failed, so no candidate set could be established.
    #[error("listing resources from the cluster failed")]
    Transport(#[from] kube::Error),

    #[error("inferring cluster configuration failed")]
    Config(#[from] kube::config::InferConfigError),

    /// A single patch submission failed. Carries the resource identity so the
    /// caller can report it without further context.
    #[error("patching `{name}` in {} failed", .namespace.as_deref().unwrap_or("<cluster>"))]
    Patch {
        name: String,
        namespace: Option<String>,
        #[source]
        source: kube::Error,
    },

    /// More than one `-fullaccess` role exists in a namespace; the migration
    /// cannot pick one.
    #[error("namespace `{namespace}` has multiple fullaccess roles: {}", .names.join(", "))]
    AmbiguousRole {
        namespace: String,
        names: Vec<String>,
    },

    #[error("encoding patch document")]
    PatchEncoding(#[from] serde_json::Error),

    #[error("writing report output")]
    Io(#[from] io::Error),
}
