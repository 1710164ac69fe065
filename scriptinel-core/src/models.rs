use crate::error::ScriptinelError;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Package-manager install hooks, declared in lifecycle order so that the
/// derived `Ord` sorts them the way npm runs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleScript {
    Preinstall,
    Install,
    Postinstall,
}

impl LifecycleScript {
    pub const ALL: [LifecycleScript; 3] = [
        LifecycleScript::Preinstall,
        LifecycleScript::Install,
        LifecycleScript::Postinstall,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleScript::Preinstall => "preinstall",
            LifecycleScript::Install => "install",
            LifecycleScript::Postinstall => "postinstall",
        }
    }
}

impl fmt::Display for LifecycleScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LifecycleScript {
    type Err = ScriptinelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "preinstall" => Ok(LifecycleScript::Preinstall),
            "install" => Ok(LifecycleScript::Install),
            "postinstall" => Ok(LifecycleScript::Postinstall),
            other => Err(ScriptinelError::InvalidScript(other.to_string())),
        }
    }
}

/// One installed copy of a package as recorded in the lockfile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub name: String,
    pub version: String,
    /// Install location relative to the project root, always under `node_modules/`.
    pub path: String,
}

/// A lifecycle hook declared by an installed dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedScript {
    pub package_name: String,
    pub script: LifecycleScript,
    pub version: String,
    pub path: String,
}

/// A detected script that the policy neither allows nor blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyViolation {
    pub package_name: String,
    pub script: LifecycleScript,
    pub version: String,
}

impl From<&DetectedScript> for PolicyViolation {
    fn from(detected: &DetectedScript) -> Self {
        Self {
            package_name: detected.package_name.clone(),
            script: detected.script,
            version: detected.version.clone(),
        }
    }
}

/// Classification of every detected script against a policy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchResult {
    pub approved: Vec<DetectedScript>,
    pub violations: Vec<PolicyViolation>,
    pub blocked: Vec<DetectedScript>,
}

impl MatchResult {
    pub fn summary(&self) -> ReportSummary {
        ReportSummary {
            total_detected: self.approved.len() + self.violations.len() + self.blocked.len(),
            total_approved: self.approved.len(),
            total_violations: self.violations.len(),
            total_blocked: self.blocked.len(),
        }
    }

    pub fn has_violations(&self) -> bool {
        !self.violations.is_empty()
    }
}

/// Counts shown at the end of every report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub total_detected: usize,
    pub total_approved: usize,
    pub total_violations: usize,
    pub total_blocked: usize,
}
