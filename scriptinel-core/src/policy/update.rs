use super::{today, validate_policy, Policy};
use crate::error::Result;
use crate::models::{DetectedScript, LifecycleScript};
use std::collections::BTreeSet;

/// Return a copy of `policy` with `scripts` added to the allow list of
/// `package_name`. The merged list is deduplicated and kept in lifecycle
/// order, so repeated approvals produce identical files.
pub fn approve_package_scripts(
    policy: &Policy,
    package_name: &str,
    scripts: &[LifecycleScript],
) -> Result<Policy> {
    let current = policy.allow.get(package_name).into_iter().flatten();
    let merged: BTreeSet<LifecycleScript> = current.chain(scripts).copied().collect();

    let mut updated = policy.clone();
    updated
        .allow
        .insert(package_name.to_string(), merged.into_iter().collect());
    updated.metadata.generated_at = today();

    validate_policy(&updated)?;
    Ok(updated)
}

/// Distinct scripts detected for one package, in lifecycle order.
pub fn scripts_for_package(package_name: &str, detected: &[DetectedScript]) -> Vec<LifecycleScript> {
    detected
        .iter()
        .filter(|s| s.package_name == package_name)
        .map(|s| s.script)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
