use super::report::{render, OutputFormat};
use crate::executor;
use scriptinel_core::{
    detect_scripts, find_lockfile, load_policy, match_scripts, parse_lockfile, MatchResult,
    Policy, ScriptinelError,
};
use std::path::Path;
use tracing::{info, instrument};

#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    /// Treat violations as a failure.
    pub ci: bool,
    /// Report only: no install, no script execution.
    pub audit: bool,
    pub output: OutputFormat,
}

/// Install with scripts disabled, classify every declared lifecycle script,
/// report, and then run the approved ones in report order.
#[instrument(skip_all, fields(root = %project_root.display()))]
pub async fn run_command(
    project_root: &Path,
    policy_path: &Path,
    options: RunOptions,
) -> anyhow::Result<()> {
    info!(policy = %policy_path.display(), "loading policy");
    let policy = load_policy(policy_path)?;

    if !options.audit {
        executor::npm_install(project_root).await?;
    }

    let result = audit(project_root, &policy)?;
    render(&result, options.output)?;

    if options.ci && result.has_violations() {
        return Err(ScriptinelError::PolicyViolation(result.violations).into());
    }

    if !options.audit && !result.approved.is_empty() {
        executor::run_approved_scripts(&result.approved, project_root).await?;
    }
    Ok(())
}

fn audit(project_root: &Path, policy: &Policy) -> anyhow::Result<MatchResult> {
    let lockfile = find_lockfile(project_root)?;
    info!(lockfile = %lockfile.display(), "parsing lockfile");
    let dependencies = parse_lockfile(&lockfile)?;

    let detected = detect_scripts(&dependencies, project_root)?;
    info!(
        dependencies = dependencies.len(),
        scripts = detected.len(),
        "detected lifecycle scripts"
    );
    Ok(match_scripts(&detected, policy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use scriptinel_core::EXIT_POLICY_VIOLATION;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn project() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::write(
            root.join("package-lock.json"),
            json!({
                "packages": {
                    "": { "name": "app" },
                    "node_modules/sharp": { "version": "0.32.0" }
                }
            })
            .to_string(),
        )
        .unwrap();
        let pkg = root.join("node_modules/sharp");
        fs::create_dir_all(&pkg).unwrap();
        fs::write(
            pkg.join("package.json"),
            json!({ "name": "sharp", "scripts": { "install": "node-gyp rebuild" } }).to_string(),
        )
        .unwrap();
        dir
    }

    fn audit_only(ci: bool) -> RunOptions {
        RunOptions {
            ci,
            audit: true,
            output: OutputFormat::Json,
        }
    }

    #[tokio::test]
    async fn ci_mode_fails_on_violations() {
        let dir = project();
        let policy = dir.path().join("install-scripts.policy.json");
        let err = run_command(dir.path(), &policy, audit_only(true))
            .await
            .unwrap_err();
        let err = err.downcast_ref::<ScriptinelError>().unwrap();
        assert!(err.is_violation());
        assert_eq!(err.exit_code(), EXIT_POLICY_VIOLATION);
    }

    #[tokio::test]
    async fn local_mode_reports_without_failing() {
        let dir = project();
        let policy = dir.path().join("install-scripts.policy.json");
        run_command(dir.path(), &policy, audit_only(false))
            .await
            .unwrap();
        assert!(!policy.exists());
    }

    #[tokio::test]
    async fn missing_lockfile_is_internal_failure() {
        let dir = TempDir::new().unwrap();
        let policy = dir.path().join("install-scripts.policy.json");
        let err = run_command(dir.path(), &policy, audit_only(true))
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ScriptinelError>(),
            Some(ScriptinelError::LockfileNotFound(_))
        ));
    }
}
