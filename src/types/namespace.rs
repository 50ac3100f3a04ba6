//! Tenant → namespace derivation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Suffix the idler expects on every Jenkins namespace.
pub const NAMESPACE_SUFFIX: &str = "-jenkins";

/// Namespace of a tenant's Jenkins instance, as known to the idler.
///
/// Always ends with [`NAMESPACE_SUFFIX`], exactly once per derivation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Namespace(String);

impl Namespace {
    /// Derive the namespace for `tenant`, appending [`NAMESPACE_SUFFIX`]
    /// unless it is already present.
    #[must_use]
    pub fn for_tenant(tenant: &str) -> Self {
        if tenant.ends_with(NAMESPACE_SUFFIX) {
            return Self(tenant.to_owned());
        }

        let namespace = format!("{tenant}{NAMESPACE_SUFFIX}");
        #[cfg(feature = "tracing")]
        tracing::debug!(ns = tenant, "Adding namespace suffix - resulting namespace: {namespace}");
        Self(namespace)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Namespace {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
