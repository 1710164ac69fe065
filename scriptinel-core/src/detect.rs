use crate::error::{Result, ScriptinelError};
use crate::models::{Dependency, DetectedScript, LifecycleScript};
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Manifest file read from each installed dependency.
pub const PACKAGE_JSON: &str = "package.json";

/// The subset of `package.json` that matters here. `scripts` stays raw JSON
/// so that oddly shaped entries are ignored instead of rejected.
#[derive(Debug, Default, Deserialize)]
struct PackageManifest {
    #[serde(default)]
    scripts: Option<serde_json::Value>,
}

impl PackageManifest {
    fn declares(&self, script: LifecycleScript) -> bool {
        self.scripts
            .as_ref()
            .and_then(|scripts| scripts.get(script.as_str()))
            .and_then(serde_json::Value::as_str)
            .is_some_and(|body| !body.is_empty())
    }
}

/// Find declared lifecycle scripts for every dependency installed under
/// `project_root`. Sorted by package, then lifecycle order, then path.
pub fn detect_scripts(dependencies: &[Dependency], project_root: &Path) -> Result<Vec<DetectedScript>> {
    let mut detected = Vec::new();
    for dependency in dependencies {
        let Some(manifest) = read_manifest(project_root, dependency)? else {
            continue;
        };
        detected.extend(
            LifecycleScript::ALL
                .into_iter()
                .filter(|script| manifest.declares(*script))
                .map(|script| DetectedScript {
                    package_name: dependency.name.clone(),
                    script,
                    version: dependency.version.clone(),
                    path: dependency.path.clone(),
                }),
        );
    }

    detected.sort_by(|a, b| {
        a.package_name
            .cmp(&b.package_name)
            .then(a.script.cmp(&b.script))
            .then_with(|| a.path.cmp(&b.path))
    });
    Ok(detected)
}

/// Missing manifests are expected for pruned or platform-specific optional
/// dependencies and yield `None`.
fn read_manifest(project_root: &Path, dependency: &Dependency) -> Result<Option<PackageManifest>> {
    let path = project_root.join(&dependency.path).join(PACKAGE_JSON);
    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(ScriptinelError::io(path, e)),
    };
    let manifest = serde_json::from_str(&text).map_err(|e| ScriptinelError::parse(&path, e))?;
    Ok(Some(manifest))
}
