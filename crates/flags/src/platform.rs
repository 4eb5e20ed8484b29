//! Platform collaborators consumed by the resolver.
//!
//! The resolver never talks to a real package manager or resource bundle. It goes through
//! these traits, so production code plugs in the platform bindings and tests plug in fakes.

use crate::error::FlagError;
use bitflags::bitflags;
use std::fmt;
use std::path::PathBuf;

bitflags! {
    /// Query flags forwarded to the [`PackageManager`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MatchFlags: u32 {
        /// Only return packages installed on the system image.
        const SYSTEM_ONLY = 0x0010_0000;
        /// Include APEX packages in package info lookups.
        const APEX = 0x4000_0000;
    }
}

/// Version metadata of an installed package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageInfo {
    pub package_name: String,
    pub long_version_code: i64,
}

/// One result of an intent-activity query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveInfo {
    pub package_name: String,
    /// Install location of the containing package (`/apex/<module>/...` for APEX content).
    pub source_dir: PathBuf,
}

/// Identifier of a value in a resource bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceId(pub u32);

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

impl From<u32> for ResourceId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// Package metadata and query service.
pub trait PackageManager: Send + Sync {
    /// Looks up an installed package.
    ///
    /// # Errors
    /// Returns [`FlagError::PackageNotFound`] if no such package is installed.
    fn package_info(&self, package_name: &str, flags: MatchFlags) -> Result<PackageInfo, FlagError>;

    /// Lists activities that handle `action`, in the platform's preference order.
    fn query_intent_activities(&self, action: &str, flags: MatchFlags) -> Vec<ResolveInfo>;
}

/// Read-only resource bundle.
pub trait Resources: Send + Sync {
    /// # Errors
    /// Returns [`FlagError::ResourceNotFound`] if the bundle has no boolean for `id`.
    fn boolean(&self, id: ResourceId) -> Result<bool, FlagError>;

    /// # Errors
    /// Returns [`FlagError::ResourceNotFound`] if the bundle has no integer for `id`.
    fn integer(&self, id: ResourceId) -> Result<i32, FlagError>;
}

/// The calling application: who it is and which platform services it can reach.
pub trait AppContext: Send + Sync {
    fn package_name(&self) -> &str;
    fn package_manager(&self) -> &dyn PackageManager;
    fn resources(&self) -> &dyn Resources;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_id_displays_as_hex() {
        assert_eq!(ResourceId(0x7f05_0001).to_string(), "0x7f050001");
        assert_eq!(ResourceId::from(1234).0, 1234);
    }

    #[test]
    fn match_flags_combine() {
        let flags = MatchFlags::SYSTEM_ONLY | MatchFlags::APEX;
        assert!(flags.contains(MatchFlags::SYSTEM_ONLY));
        assert!(!MatchFlags::default().contains(MatchFlags::APEX));
    }
}
