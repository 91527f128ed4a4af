//! Schema versioning for exported reports.

use crate::SCHEMA_VERSION;

/// Schema version embedded in every [`MetricsReport`](crate::MetricsReport).
///
/// A replay session refuses reports whose major version differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SchemaVersion {
    /// Breaking changes increment this.
    pub major: u32,

    /// Backwards-compatible additions increment this.
    pub minor: u32,
}

impl SchemaVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// The version written by this build.
    pub const fn current() -> Self {
        Self {
            major: SCHEMA_VERSION,
            minor: 0,
        }
    }

    /// True when the major version matches this build.
    pub fn is_compatible(&self) -> bool {
        self.major == SCHEMA_VERSION
    }
}

impl Default for SchemaVersion {
    fn default() -> Self {
        Self::current()
    }
}

impl std::fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_is_compatible() {
        assert!(SchemaVersion::current().is_compatible());
        assert_eq!(SchemaVersion::default(), SchemaVersion::current());
    }

    #[test]
    fn minor_bump_stays_compatible() {
        assert!(SchemaVersion::new(SCHEMA_VERSION, 7).is_compatible());
        assert!(!SchemaVersion::new(SCHEMA_VERSION + 1, 0).is_compatible());
    }

    #[test]
    fn displays_dotted() {
        assert_eq!(SchemaVersion::new(2, 3).to_string(), "2.3");
    }
}
