pub mod client;
pub mod error;
pub mod migrate;
pub mod patch;
pub mod predicate;
pub mod transform;

pub use self::client::{Cluster, KubeCluster};
pub use self::error::Error;
pub use self::migrate::Outcome;

/// Annotation carrying the IAM role glob a namespace's workloads may assume.
pub const PERMITTED_ANNOTATION: &str = "iam.amazonaws.com/permitted";

/// Namespaces still carrying this label are owned by the old tooling and must
/// not be touched.
pub const LEGACY_LABEL: &str = "legacy";

/// Name suffix of the per-namespace role granting full access.
pub const FULLACCESS_SUFFIX: &str = "-fullaccess";

/// API group the migrated roles must be able to administer.
pub const RBAC_API_GROUP: &str = "rbac.authorization.k8s.io";
