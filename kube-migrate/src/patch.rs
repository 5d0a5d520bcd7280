use std::collections::BTreeMap;

use k8s_openapi::api::rbac::v1::PolicyRule;
use kube::api::Patch;
use serde_json::{Value, json};

use crate::error::Error;

/// Declarative delta submitted to the API server. Always a partial update
/// encoding only the changed field, never a full-resource overwrite.
#[derive(Debug, Clone, PartialEq)]
pub enum PatchOp {
    /// Merge-patch the annotation map under `metadata.annotations` with the
    /// transform's output. The transform preserves every unrelated key, so
    /// this is equivalent to a field replace without touching the rest of
    /// the metadata.
    ReplaceAnnotations {
        annotations: BTreeMap<String, String>,
    },
    /// JSON-Patch append of one rule to `/rules`. `create_list` covers the
    /// server-side list being null, which an `add` to `/rules/-` rejects.
    AppendRule { rule: PolicyRule, create_list: bool },
}

impl PatchOp {
    /// The raw patch document.
    pub fn document(&self) -> Value {
        match self {
            PatchOp::ReplaceAnnotations { annotations } => {
                json!({ "metadata": { "annotations": annotations } })
            }
            PatchOp::AppendRule {
                rule,
                create_list: false,
            } => json!([{ "op": "add", "path": "/rules/-", "value": rule }]),
            PatchOp::AppendRule {
                rule,
                create_list: true,
            } => json!([{ "op": "add", "path": "/rules", "value": [rule] }]),
        }
    }

    /// The typed patch handed to the client.
    pub fn to_patch(&self) -> Result<Patch<Value>, Error> {
        match self {
            PatchOp::ReplaceAnnotations { .. } => Ok(Patch::Merge(self.document())),
            PatchOp::AppendRule { .. } => {
                Ok(Patch::Json(serde_json::from_value(self.document())?))
            }
        }
    }
}
