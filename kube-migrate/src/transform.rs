use k8s_openapi::api::rbac::v1::{PolicyRule, Role};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

use crate::{PERMITTED_ANNOTATION, RBAC_API_GROUP};

/// The rule appended to fullaccess roles so they can administer rbac objects.
pub fn rbac_admin_rule() -> PolicyRule {
    PolicyRule {
        api_groups: Some(vec![RBAC_API_GROUP.to_owned()]),
        resources: Some(vec!["rolebindings".to_owned(), "roles".to_owned()]),
        verbs: vec!["*".to_owned()],
        ..PolicyRule::default()
    }
}

/// Rewrites the trailing glob of a permitted-annotation value to its regex
/// equivalent. Only the first `/*` occurrence is replaced; this is a literal
/// substitution, not a regex rewrite.
pub fn rewrite_permitted(value: &str) -> String {
    value.replacen("/*", "/.*", 1)
}

/// Desired metadata for a matched namespace: identical to the input except
/// for the rewritten permitted annotation.
pub fn migrate_namespace(meta: &ObjectMeta) -> ObjectMeta {
    let mut meta = meta.clone();
    if let Some(value) = meta
        .annotations
        .as_mut()
        .and_then(|annotations| annotations.get_mut(PERMITTED_ANNOTATION))
    {
        *value = rewrite_permitted(value);
    }
    meta
}

/// Desired state for a matched role: the existing rules verbatim and in
/// order, with the rbac administration rule appended.
pub fn migrate_role(role: &Role) -> Role {
    let mut role = role.clone();
    role.rules.get_or_insert_with(Vec::new).push(rbac_admin_rule());
    role
}
