use std::io::Write;

use kube::ResourceExt;

use crate::client::Cluster;
use crate::error::Error;
use crate::migrate::Outcome;
use crate::patch::PatchOp;
use crate::{predicate, transform};

/// Appends the rbac administration rule to every fullaccess role that does
/// not already grant the group.
///
/// Each namespace's roles are fetched and evaluated in turn. A namespace
/// without a fullaccess role is skipped; one with several is reported as
/// failed and the run continues. Listing failures abort the run.
#[tracing::instrument(skip_all)]
pub async fn run(cluster: &dyn Cluster, out: &mut dyn Write) -> Result<Vec<Outcome>, Error> {
    let missing_grant = predicate::role_migration();
    let namespaces = cluster.list_namespaces().await?;

    let mut outcomes = Vec::new();
    let mut already_compliant = 0usize;
    for ns in namespaces {
        let ns_name = ns.name_any();
        let roles = cluster.list_roles(&ns_name).await?;

        let role = match predicate::select_fullaccess(roles, &ns_name) {
            Ok(Some(role)) => role,
            Ok(None) => continue,
            Err(err) => {
                tracing::warn!(namespace = %ns_name, error = %err, "skipping namespace");
                outcomes.push(Outcome::Failed {
                    name: ns_name.clone(),
                    namespace: Some(ns_name),
                    reason: err.to_string(),
                });
                continue;
            }
        };

        let name = role.name_any();
        if !missing_grant.matches(&role) {
            already_compliant += 1;
            outcomes.push(Outcome::Unmatched { name });
            continue;
        }

        let op = PatchOp::AppendRule {
            rule: transform::rbac_admin_rule(),
            create_list: role.rules.as_deref().unwrap_or_default().is_empty(),
        };

        match cluster.patch_role(&ns_name, &name, &op).await {
            Ok(()) => {
                writeln!(out, "Updated Policy on {name}")?;
                outcomes.push(Outcome::Patched {
                    name,
                    namespace: Some(ns_name),
                });
            }
            Err(err) => {
                tracing::error!(role = %name, namespace = %ns_name, error = %err, "patch failed, continuing");
                outcomes.push(Outcome::Failed {
                    name,
                    namespace: Some(ns_name),
                    reason: err.to_string(),
                });
            }
        }
    }

    tracing::debug!(already_compliant, "roles already granting the rbac group");
    Ok(outcomes)
}
