use std::io::Write;

use kube::ResourceExt;

use crate::client::Cluster;
use crate::error::Error;
use crate::migrate::Outcome;
use crate::patch::PatchOp;
use crate::{PERMITTED_ANNOTATION, predicate, transform};

/// Rewrites the permitted-annotation glob on every eligible namespace.
///
/// Match and patch reports go to `out`. A failed patch is recorded against
/// its namespace and the remaining batch is still attempted; only a listing
/// failure aborts the run.
#[tracing::instrument(skip_all)]
pub async fn run(cluster: &dyn Cluster, out: &mut dyn Write) -> Result<Vec<Outcome>, Error> {
    let eligible = predicate::namespace_migration();
    let namespaces = cluster.list_namespaces().await?;

    let mut outcomes = Vec::with_capacity(namespaces.len());
    let mut matched = Vec::new();
    for ns in namespaces {
        if eligible.matches(&ns) {
            // Matching namespaces always carry the annotation.
            let value = ns.annotations().get(PERMITTED_ANNOTATION).cloned().unwrap_or_default();
            writeln!(out, "{} - Annotation: {value}", ns.name_any())?;
            matched.push(ns);
        } else {
            outcomes.push(Outcome::Unmatched { name: ns.name_any() });
        }
    }

    for ns in matched {
        let name = ns.name_any();
        let desired = transform::migrate_namespace(&ns.metadata);
        let op = PatchOp::ReplaceAnnotations {
            annotations: desired.annotations.unwrap_or_default(),
        };

        match cluster.patch_namespace(&name, &op).await {
            Ok(()) => {
                writeln!(out, "Patched {name}")?;
                outcomes.push(Outcome::Patched {
                    name,
                    namespace: None,
                });
            }
            Err(err) => {
                tracing::error!(namespace = %name, error = %err, "patch failed, continuing");
                outcomes.push(Outcome::Failed {
                    name,
                    namespace: None,
                    reason: err.to_string(),
                });
            }
        }
    }

    Ok(outcomes)
}
