use super::Policy;
use crate::models::{DetectedScript, MatchResult, PolicyViolation};

/// Classify every detected script. Blocked beats allowed, so a stale allow
/// entry can never override an explicit deny; anything in neither list is
/// a violation.
pub fn match_scripts(detected: &[DetectedScript], policy: &Policy) -> MatchResult {
    let mut result = MatchResult::default();

    for script in detected {
        if policy.blocks(&script.package_name, script.script) {
            result.blocked.push(script.clone());
        } else if policy.allows(&script.package_name, script.script) {
            result.approved.push(script.clone());
        } else {
            result.violations.push(PolicyViolation::from(script));
        }
    }

    let by_identity = |a: &DetectedScript, b: &DetectedScript| {
        a.package_name
            .cmp(&b.package_name)
            .then(a.script.cmp(&b.script))
            .then_with(|| a.path.cmp(&b.path))
    };
    result.approved.sort_by(by_identity);
    result.blocked.sort_by(by_identity);
    result.violations.sort_by(|a, b| {
        a.package_name
            .cmp(&b.package_name)
            .then(a.script.cmp(&b.script))
            .then_with(|| a.version.cmp(&b.version))
    });
    result
}
