//! Core library for gating npm lifecycle scripts: lockfile normalization,
//! script detection, and the allow/block policy they are checked against.

mod detect;
mod error;
mod lockfile;
mod models;
pub mod policy;

#[cfg(test)]
mod tests;

pub use detect::{detect_scripts, PACKAGE_JSON};
pub use error::{
    Result, ScriptinelError, EXIT_INTERNAL_FAILURE, EXIT_POLICY_VIOLATION, EXIT_SUCCESS,
};
pub use lockfile::{find_lockfile, parse_lockfile, parse_lockfile_str, LOCKFILE_NAMES};
pub use models::{
    Dependency, DetectedScript, LifecycleScript, MatchResult, PolicyViolation, ReportSummary,
};
pub use policy::{
    approve_package_scripts, find_policy_file, load_policy, match_scripts, scripts_for_package,
    validate_policy, write_policy, Policy, PolicyMetadata, POLICY_FILE_NAME, POLICY_VERSION,
};
