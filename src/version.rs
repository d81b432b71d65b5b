use serde::Serialize;

/// Version and build metadata.
///
/// Build fields come from `WEBSEARCH_BUILD_TIME`, `WEBSEARCH_GIT_COMMIT` and
/// `WEBSEARCH_RUSTC_VERSION` at compile time and read `unknown` when unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionInfo {
    pub version: &'static str,
    pub build_time: &'static str,
    pub git_commit: &'static str,
    pub rustc_version: &'static str,
    pub os: &'static str,
    pub arch: &'static str,
}

impl VersionInfo {
    pub fn current() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            build_time: option_env!("WEBSEARCH_BUILD_TIME").unwrap_or("unknown"),
            git_commit: option_env!("WEBSEARCH_GIT_COMMIT").unwrap_or("unknown"),
            rustc_version: option_env!("WEBSEARCH_RUSTC_VERSION").unwrap_or("unknown"),
            os: std::env::consts::OS,
            arch: std::env::consts::ARCH,
        }
    }

    /// Multi-line summary printed by `--version`.
    pub fn render(&self) -> String {
        format!(
            "websearch-mcp version {}\n  Build Time: {}\n  Git Commit: {}\n  Rust Version: {}\n  OS/Arch: {}/{}\n",
            self.version, self.build_time, self.git_commit, self.rustc_version, self.os, self.arch
        )
    }
}
