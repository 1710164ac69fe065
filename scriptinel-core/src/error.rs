use crate::models::PolicyViolation;
use std::path::PathBuf;
use thiserror::Error;

/// Common result type for core operations.
pub type Result<T> = std::result::Result<T, ScriptinelError>;

/// Exit code for a clean run.
pub const EXIT_SUCCESS: i32 = 0;
/// Exit code when unapproved scripts are found in gating mode.
pub const EXIT_POLICY_VIOLATION: i32 = 1;
/// Exit code for structural, I/O and execution failures.
pub const EXIT_INTERNAL_FAILURE: i32 = 2;

#[derive(Debug, Error)]
pub enum ScriptinelError {
    #[error("io error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse JSON file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("invalid policy: {0}")]
    InvalidPolicy(String),
    #[error("policy version {found} is not supported, expected version {expected}")]
    UnsupportedVersion { found: String, expected: u32 },
    #[error("invalid package name: {0}")]
    InvalidPackageName(String),
    #[error("invalid lifecycle script: {0}")]
    InvalidScript(String),
    #[error("no lockfile found in {}, run npm install first", .0.display())]
    LockfileNotFound(PathBuf),
    #[error("{script} failed for package {package} (exit code {code:?})")]
    ScriptFailed {
        package: String,
        script: String,
        code: Option<i32>,
    },
    #[error(
        "policy violation: {} unapproved script(s) detected in package(s): {}",
        .0.len(),
        violation_packages(.0)
    )]
    PolicyViolation(Vec<PolicyViolation>),
}

impl ScriptinelError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Parse {
            path: path.into(),
            source,
        }
    }

    /// Violations are a reportable outcome rather than a broken run.
    pub fn is_violation(&self) -> bool {
        matches!(self, Self::PolicyViolation(_))
    }

    pub fn exit_code(&self) -> i32 {
        if self.is_violation() {
            EXIT_POLICY_VIOLATION
        } else {
            EXIT_INTERNAL_FAILURE
        }
    }
}

fn violation_packages(violations: &[PolicyViolation]) -> String {
    violations
        .iter()
        .map(|v| v.package_name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
