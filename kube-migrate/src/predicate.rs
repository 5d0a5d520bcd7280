use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::Namespace;
use k8s_openapi::api::rbac::v1::{PolicyRule, Role};
use kube::ResourceExt;

use crate::error::Error;
use crate::{FULLACCESS_SUFFIX, LEGACY_LABEL, PERMITTED_ANNOTATION, RBAC_API_GROUP};

/// Read-only view over a candidate resource so predicates stay agnostic of
/// the concrete kind.
///
/// Labels and annotations are `Option` on purpose: an absent map and a
/// present-but-empty map are different things to the presence predicates.
pub trait Candidate {
    fn labels(&self) -> Option<&BTreeMap<String, String>>;

    fn annotations(&self) -> Option<&BTreeMap<String, String>>;

    fn rules(&self) -> &[PolicyRule] {
        &[]
    }
}

impl Candidate for Namespace {
    fn labels(&self) -> Option<&BTreeMap<String, String>> {
        self.metadata.labels.as_ref()
    }

    fn annotations(&self) -> Option<&BTreeMap<String, String>> {
        self.metadata.annotations.as_ref()
    }
}

impl Candidate for Role {
    fn labels(&self) -> Option<&BTreeMap<String, String>> {
        self.metadata.labels.as_ref()
    }

    fn annotations(&self) -> Option<&BTreeMap<String, String>> {
        self.metadata.annotations.as_ref()
    }

    fn rules(&self) -> &[PolicyRule] {
        self.rules.as_deref().unwrap_or_default()
    }
}

/// A pure boolean selection function over a candidate. Chains compose with
/// `All`, evaluated in order with short-circuit on the first false.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// The resource has a label map at all; present-but-empty passes.
    HasLabels,
    /// The resource has an annotation map at all.
    HasAnnotations,
    /// No label with the given key, whatever its value.
    LabelAbsent(String),
    /// An annotation with the given key exists and its value ends with the
    /// suffix.
    AnnotationEndsWith(String, String),
    /// No rule grants the given API group. Vacuously true on an empty rule
    /// list.
    RuleGroupAbsent(String),
    All(Vec<Predicate>),
}

impl Predicate {
    pub fn matches(&self, candidate: &impl Candidate) -> bool {
        match self {
            Predicate::HasLabels => candidate.labels().is_some(),
            Predicate::HasAnnotations => candidate.annotations().is_some(),
            Predicate::LabelAbsent(key) => candidate
                .labels()
                .is_none_or(|labels| !labels.contains_key(key)),
            Predicate::AnnotationEndsWith(key, suffix) => candidate
                .annotations()
                .and_then(|annotations| annotations.get(key))
                .is_some_and(|value| value.ends_with(suffix.as_str())),
            Predicate::RuleGroupAbsent(group) => !candidate.rules().iter().any(|rule| {
                rule.api_groups
                    .as_deref()
                    .unwrap_or_default()
                    .iter()
                    .any(|g| g == group)
            }),
            Predicate::All(predicates) => predicates.iter().all(|p| p.matches(candidate)),
        }
    }
}

/// Namespaces eligible for the permitted-annotation rewrite: evaluable
/// metadata, not legacy-managed, and a permitted annotation still ending in
/// the glob suffix.
pub fn namespace_migration() -> Predicate {
    Predicate::All(vec![
        Predicate::HasLabels,
        Predicate::HasAnnotations,
        Predicate::LabelAbsent(LEGACY_LABEL.to_owned()),
        Predicate::AnnotationEndsWith(PERMITTED_ANNOTATION.to_owned(), "/*".to_owned()),
    ])
}

/// Fullaccess roles still missing the rbac administration grant.
pub fn role_migration() -> Predicate {
    Predicate::RuleGroupAbsent(RBAC_API_GROUP.to_owned())
}

/// Picks the single `-fullaccess` role of a namespace.
///
/// Zero candidates means the namespace is skipped, not an error. More than
/// one is ambiguous and reported against the namespace instead of picking
/// arbitrarily.
pub fn select_fullaccess(roles: Vec<Role>, namespace: &str) -> Result<Option<Role>, Error> {
    let mut candidates: Vec<Role> = roles
        .into_iter()
        .filter(|role| {
            role.metadata
                .name
                .as_deref()
                .is_some_and(|name| name.ends_with(FULLACCESS_SUFFIX))
        })
        .collect();

    match candidates.len() {
        0 => Ok(None),
        1 => Ok(candidates.pop()),
        _ => Err(Error::AmbiguousRole {
            namespace: namespace.to_owned(),
            names: candidates.iter().map(|role| role.name_any()).collect(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    use super::*;

    fn namespace(
        labels: Option<&[(&str, &str)]>,
        annotations: Option<&[(&str, &str)]>,
    ) -> Namespace {
        let pairs = |kvs: &[(&str, &str)]| {
            kvs.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<BTreeMap<_, _>>()
        };
        Namespace {
            metadata: ObjectMeta {
                name: Some("team-a".to_owned()),
                labels: labels.map(pairs),
                annotations: annotations.map(pairs),
                ..ObjectMeta::default()
            },
            ..Namespace::default()
        }
    }

    fn role_with_groups(name: &str, groups: &[&str]) -> Role {
        Role {
            metadata: ObjectMeta {
                name: Some(name.to_owned()),
                namespace: Some("team-a".to_owned()),
                ..ObjectMeta::default()
            },
            rules: Some(
                groups
                    .iter()
                    .map(|group| PolicyRule {
                        api_groups: Some(vec![group.to_string()]),
                        resources: Some(vec!["pods".to_owned()]),
                        verbs: vec!["get".to_owned()],
                        ..PolicyRule::default()
                    })
                    .collect(),
            ),
        }
    }

    #[test]
    fn absent_metadata_excludes() {
        let eligible = namespace_migration();
        let permitted = [(PERMITTED_ANNOTATION, "arn:aws:iam::123:role/app/*")];

        assert!(!eligible.matches(&namespace(None, Some(&permitted))));
        assert!(!eligible.matches(&namespace(Some(&[]), None)));
        assert!(!eligible.matches(&namespace(None, None)));
    }

    #[test]
    fn empty_label_map_passes_presence() {
        let eligible = namespace_migration();
        let permitted = [(PERMITTED_ANNOTATION, "arn:aws:iam::123:role/app/*")];

        assert!(eligible.matches(&namespace(Some(&[]), Some(&permitted))));
    }

    #[test]
    fn legacy_label_excludes() {
        let eligible = namespace_migration();
        let permitted = [(PERMITTED_ANNOTATION, "arn:aws:iam::123:role/app/*")];

        assert!(!eligible.matches(&namespace(Some(&[("legacy", "true")]), Some(&permitted))));
        assert!(eligible.matches(&namespace(Some(&[("team", "a")]), Some(&permitted))));
    }

    #[test]
    fn annotation_must_end_with_glob() {
        let eligible = namespace_migration();

        let exact = [(PERMITTED_ANNOTATION, "arn:aws:iam::123:role/app")];
        assert!(!eligible.matches(&namespace(Some(&[]), Some(&exact))));

        // Already migrated values no longer match, which is what makes a
        // re-run converge.
        let migrated = [(PERMITTED_ANNOTATION, "arn:aws:iam::123:role/app/.*")];
        assert!(!eligible.matches(&namespace(Some(&[]), Some(&migrated))));

        let other = [("other/annotation", "arn:aws:iam::123:role/app/*")];
        assert!(!eligible.matches(&namespace(Some(&[]), Some(&other))));
    }

    #[test]
    fn role_matches_only_without_rbac_group() {
        let missing_grant = role_migration();

        assert!(missing_grant.matches(&role_with_groups("team-a-fullaccess", &["apps"])));
        assert!(!missing_grant.matches(&role_with_groups(
            "team-a-fullaccess",
            &["apps", RBAC_API_GROUP],
        )));
    }

    #[test]
    fn role_without_rules_matches_vacuously() {
        let missing_grant = role_migration();
        let mut role = role_with_groups("team-a-fullaccess", &[]);
        role.rules = None;

        assert!(missing_grant.matches(&role));
    }

    #[test]
    fn fullaccess_selection() {
        let ns = "team-a";
        let viewer = role_with_groups("viewer", &["apps"]);
        let fullaccess = role_with_groups("team-a-fullaccess", &["apps"]);

        let picked = select_fullaccess(vec![viewer.clone(), fullaccess.clone()], ns).unwrap();
        assert_eq!(picked.unwrap().metadata.name.as_deref(), Some("team-a-fullaccess"));

        assert!(select_fullaccess(vec![viewer], ns).unwrap().is_none());

        let twin = role_with_groups("other-fullaccess", &["apps"]);
        let err = select_fullaccess(vec![fullaccess, twin], ns).unwrap_err();
        assert!(matches!(err, Error::AmbiguousRole { .. }));
    }
}
