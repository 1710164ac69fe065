//! npm child processes: the scripts-disabled install and the approved
//! lifecycle scripts that follow it.

use anyhow::{bail, Context};
use scriptinel_core::{DetectedScript, ScriptinelError};
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::info;

#[cfg(windows)]
const NPM: &str = "npm.cmd";
#[cfg(not(windows))]
const NPM: &str = "npm";

fn npm(project_root: &Path) -> Command {
    let mut cmd = Command::new(NPM);
    cmd.current_dir(project_root)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());
    cmd
}

/// `npm install --ignore-scripts` in the project root.
pub async fn npm_install(project_root: &Path) -> anyhow::Result<()> {
    info!("running npm install with --ignore-scripts");
    let status = npm(project_root)
        .args(["install", "--ignore-scripts"])
        .status()
        .await
        .context("failed to spawn npm install")?;

    if !status.success() {
        bail!("npm install failed with exit code {:?}", status.code());
    }
    Ok(())
}

/// Run each approved script with `npm run <script> --prefix <package dir>`,
/// one at a time. The first failure stops the run.
pub async fn run_approved_scripts(
    scripts: &[DetectedScript],
    project_root: &Path,
) -> anyhow::Result<()> {
    info!(count = scripts.len(), "executing approved scripts");

    for script in scripts {
        info!(
            package = %script.package_name,
            version = %script.version,
            script = %script.script,
            "running"
        );
        let package_dir = project_root.join(&script.path);
        let status = npm(project_root)
            .arg("run")
            .arg(script.script.as_str())
            .arg("--prefix")
            .arg(&package_dir)
            .status()
            .await
            .with_context(|| {
                format!(
                    "failed to execute {} for package {}",
                    script.script, script.package_name
                )
            })?;

        if !status.success() {
            return Err(ScriptinelError::ScriptFailed {
                package: script.package_name.clone(),
                script: script.script.to_string(),
                code: status.code(),
            }
            .into());
        }
    }

    info!("all approved scripts executed successfully");
    Ok(())
}
