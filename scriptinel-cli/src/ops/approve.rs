use super::ui::{print_success, print_warning};
use scriptinel_core::{
    approve_package_scripts, detect_scripts, find_lockfile, load_policy, parse_lockfile,
    scripts_for_package, write_policy, LifecycleScript,
};
use std::path::Path;
use tracing::{info, instrument, warn};

/// Add `package`'s lifecycle scripts to the allow list and persist the
/// policy. With no `requested` scripts, everything currently detected for
/// the package is approved.
#[instrument(skip_all, fields(package = %package))]
pub fn approve_command(
    project_root: &Path,
    policy_path: &Path,
    package: &str,
    requested: &[LifecycleScript],
) -> anyhow::Result<()> {
    info!(policy = %policy_path.display(), "loading policy");
    let policy = load_policy(policy_path)?;

    let lockfile = find_lockfile(project_root)?;
    let dependencies = parse_lockfile(&lockfile)?;
    let detected = detect_scripts(&dependencies, project_root)?;
    let available = scripts_for_package(package, &detected);

    let scripts = if requested.is_empty() {
        available
    } else {
        for script in requested.iter().filter(|s| !available.contains(s)) {
            warn!(%script, "script is not currently detected, approving anyway");
        }
        requested.to_vec()
    };

    if scripts.is_empty() {
        print_warning(&format!(
            "No lifecycle scripts found for {package}. It may not be installed or may not declare any."
        ));
        return Ok(());
    }

    let names: Vec<&str> = scripts.iter().map(LifecycleScript::as_str).collect();
    info!(scripts = %names.join(", "), "approving");
    let updated = approve_package_scripts(&policy, package, &scripts)?;
    write_policy(policy_path, &updated)?;

    print_success(&format!(
        "Approved {} script(s) for {package}: {}",
        scripts.len(),
        names.join(", ")
    ));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scriptinel_core::{find_policy_file, ScriptinelError};
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn project() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::write(
            root.join("package-lock.json"),
            json!({
                "lockfileVersion": 1,
                "dependencies": {
                    "esbuild": { "version": "0.19.0" },
                    "plain": { "version": "1.0.0" }
                }
            })
            .to_string(),
        )
        .unwrap();
        for (name, scripts) in [
            ("esbuild", json!({ "postinstall": "node install.js", "preinstall": "x" })),
            ("plain", json!({})),
        ] {
            let pkg = root.join("node_modules").join(name);
            fs::create_dir_all(&pkg).unwrap();
            fs::write(
                pkg.join("package.json"),
                json!({ "name": name, "scripts": scripts }).to_string(),
            )
            .unwrap();
        }
        dir
    }

    #[test]
    fn approves_everything_detected() {
        let dir = project();
        let policy_path = find_policy_file(dir.path());
        approve_command(dir.path(), &policy_path, "esbuild", &[]).unwrap();

        let policy = load_policy(&policy_path).unwrap();
        assert_eq!(
            policy.allow["esbuild"],
            vec![LifecycleScript::Preinstall, LifecycleScript::Postinstall]
        );
    }

    #[test]
    fn explicit_scripts_limit_the_approval() {
        let dir = project();
        let policy_path = find_policy_file(dir.path());
        approve_command(
            dir.path(),
            &policy_path,
            "esbuild",
            &[LifecycleScript::Postinstall],
        )
        .unwrap();

        let policy = load_policy(&policy_path).unwrap();
        assert_eq!(policy.allow["esbuild"], vec![LifecycleScript::Postinstall]);
    }

    #[test]
    fn nothing_detected_leaves_policy_untouched() {
        let dir = project();
        let policy_path = find_policy_file(dir.path());
        approve_command(dir.path(), &policy_path, "plain", &[]).unwrap();
        assert!(!policy_path.exists());
    }

    #[test]
    fn invalid_package_name_is_rejected_before_writing() {
        let dir = project();
        let policy_path = find_policy_file(dir.path());
        let err = approve_command(
            dir.path(),
            &policy_path,
            "Not Valid",
            &[LifecycleScript::Install],
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ScriptinelError>(),
            Some(ScriptinelError::InvalidPackageName(_))
        ));
        assert!(!policy_path.exists());
    }
}
