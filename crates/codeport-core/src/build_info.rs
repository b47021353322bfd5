//! Build-time metadata embedded by the build script.

use serde::Serialize;

/// The git commit hash at build time (short form).
pub const GIT_HASH: &str = env!("CODEPORT_GIT_HASH");

/// The build profile (`debug` or `release`).
pub const BUILD_PROFILE: &str = env!("CODEPORT_BUILD_PROFILE");

/// The crate version from Cargo.toml.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Payload printed by `--version --json`.
#[derive(Debug, Clone, Serialize)]
pub struct VersionInfo {
    pub codeport: &'static str,
    pub commit: &'static str,
    pub profile: &'static str,
}

/// Version and commit as printed by `--version`.
///
/// Example: `"0.1.0 abc1234"`
pub fn version_string() -> String {
    format!("{VERSION} {GIT_HASH}")
}

pub fn version_info() -> VersionInfo {
    VersionInfo {
        codeport: VERSION,
        commit: GIT_HASH,
        profile: BUILD_PROFILE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_string_not_empty() {
        let v = version_string();
        assert!(v.starts_with(VERSION));
        assert!(v.ends_with(GIT_HASH));
    }

    #[test]
    fn test_git_hash_not_empty() {
        assert!(!GIT_HASH.is_empty());
    }

    #[test]
    fn test_build_profile() {
        // In test mode, profile is "debug"
        assert_eq!(BUILD_PROFILE, "debug");
    }

    #[test]
    fn test_version_json_shape() {
        let json = serde_json::to_value(version_info()).unwrap();
        assert_eq!(json["codeport"], VERSION);
        assert_eq!(json["commit"], GIT_HASH);
        assert_eq!(json["profile"], BUILD_PROFILE);
    }
}
