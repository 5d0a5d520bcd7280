pub mod namespace;
pub mod role;

/// Per-resource outcome of a migration run.
///
/// The pipelines return one entry per considered resource, in snapshot
/// enumeration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Matched the predicate chain and the patch went through.
    Patched {
        name: String,
        namespace: Option<String>,
    },
    /// Matched (or should have been selectable) but the patch or selection
    /// failed; the run continued past it.
    Failed {
        name: String,
        namespace: Option<String>,
        reason: String,
    },
    /// Did not match; never touched.
    Unmatched { name: String },
}

impl Outcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed { .. })
    }

    pub fn is_patched(&self) -> bool {
        matches!(self, Outcome::Patched { .. })
    }
}
