//! The persisted allow/block policy and the operations over it: loading and
//! validation, classification of detected scripts, and approval merges.

use crate::models::LifecycleScript;
use serde::Serialize;
use serde_with::skip_serializing_none;
use std::collections::BTreeMap;

mod matcher;
mod store;
mod update;
mod validate;

pub use matcher::match_scripts;
pub use store::{find_policy_file, load_policy, write_policy};
pub use update::{approve_package_scripts, scripts_for_package};
pub use validate::{is_valid_package_name, validate_policy};

/// The only schema version this build understands.
pub const POLICY_VERSION: u32 = 1;

/// Policy file name looked up in the project root.
pub const POLICY_FILE_NAME: &str = "install-scripts.policy.json";

/// `approvedBy` value for a policy nobody has approved anything in yet.
pub const DEFAULT_APPROVER: &str = "system";

/// Package name -> scripts, keyed in sorted order so the file diffs cleanly.
pub type ScriptMap = BTreeMap<String, Vec<LifecycleScript>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyMetadata {
    /// Day of the last change, `YYYY-MM-DD`.
    pub generated_at: String,
    pub approved_by: String,
}

/// Allow/block decisions for lifecycle scripts, persisted as JSON.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Policy {
    pub version: u32,
    pub allow: ScriptMap,
    pub blocked: Option<ScriptMap>,
    pub metadata: PolicyMetadata,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            version: POLICY_VERSION,
            allow: ScriptMap::new(),
            blocked: None,
            metadata: PolicyMetadata {
                generated_at: today(),
                approved_by: DEFAULT_APPROVER.to_string(),
            },
        }
    }
}

impl Policy {
    pub fn allows(&self, package_name: &str, script: LifecycleScript) -> bool {
        listed(Some(&self.allow), package_name, script)
    }

    pub fn blocks(&self, package_name: &str, script: LifecycleScript) -> bool {
        listed(self.blocked.as_ref(), package_name, script)
    }
}

fn listed(map: Option<&ScriptMap>, package_name: &str, script: LifecycleScript) -> bool {
    map.and_then(|m| m.get(package_name))
        .is_some_and(|scripts| scripts.contains(&script))
}

/// Current UTC date at day granularity.
pub(crate) fn today() -> String {
    chrono::Utc::now().format("%Y-%m-%d").to_string()
}
