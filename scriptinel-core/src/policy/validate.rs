use super::{Policy, ScriptMap};
use crate::error::{Result, ScriptinelError};

const MAX_PACKAGE_NAME_LEN: usize = 214;

/// Unscoped npm package name: 1-214 chars, alphanumeric first, then
/// `[A-Za-z0-9._-]`.
pub fn is_valid_package_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    // A leading '.' or '_' also fails the alphanumeric check.
    name.len() <= MAX_PACKAGE_NAME_LEN
        && first.is_ascii_alphanumeric()
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

/// Deep-validate both script maps. Script names are already constrained by
/// [`LifecycleScript`](crate::LifecycleScript), so only keys need checking.
pub fn validate_policy(policy: &Policy) -> Result<()> {
    check_keys(&policy.allow, "allow list")?;
    if let Some(blocked) = &policy.blocked {
        check_keys(blocked, "blocked list")?;
    }
    Ok(())
}

fn check_keys(map: &ScriptMap, list: &str) -> Result<()> {
    match map.keys().find(|name| !is_valid_package_name(name)) {
        Some(name) => Err(ScriptinelError::InvalidPackageName(format!(
            "{name} (in {list})"
        ))),
        None => Ok(()),
    }
}
