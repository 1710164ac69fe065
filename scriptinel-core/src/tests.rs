//! End-to-end checks over a project laid out on disk.

use super::*;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(path: &Path, doc: &Value) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, serde_json::to_string_pretty(doc).unwrap()).unwrap();
}

fn package(root: &Path, rel: &str, name: &str, scripts: Value) {
    write(
        &root.join(rel).join(PACKAGE_JSON),
        &json!({ "name": name, "version": "1.0.0", "scripts": scripts }),
    );
}

/// esbuild (postinstall), sharp (install), left-pad (postinstall), a nested
/// node-gyp copy (install), a plain package, and one pruned optional dep.
fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(
        &root.join("package-lock.json"),
        &json!({
            "name": "app",
            "lockfileVersion": 3,
            "packages": {
                "": { "name": "app", "version": "1.0.0" },
                "node_modules/esbuild": { "version": "0.19.0" },
                "node_modules/sharp": { "version": "0.32.0" },
                "node_modules/left-pad": { "version": "1.0.0" },
                "node_modules/sharp/node_modules/node-gyp": { "version": "9.0.0" },
                "node_modules/lodash": { "version": "4.17.21" },
                "node_modules/fsevents": { "version": "2.3.3", "optional": true }
            }
        }),
    );
    package(root, "node_modules/esbuild", "esbuild", json!({ "postinstall": "node install.js" }));
    package(root, "node_modules/sharp", "sharp", json!({ "install": "node-gyp rebuild" }));
    package(root, "node_modules/left-pad", "left-pad", json!({ "postinstall": "curl evil" }));
    package(
        root,
        "node_modules/sharp/node_modules/node-gyp",
        "node-gyp",
        json!({ "install": "echo gyp" }),
    );
    package(root, "node_modules/lodash", "lodash", json!({ "test": "mocha" }));
    dir
}

fn detect(root: &Path) -> Vec<DetectedScript> {
    let lockfile = find_lockfile(root).unwrap();
    let deps = parse_lockfile(&lockfile).unwrap();
    assert_eq!(deps.len(), 6);
    detect_scripts(&deps, root).unwrap()
}

#[test]
fn audit_then_approve_round_trip() {
    let dir = project();
    let root = dir.path();
    let policy_path = find_policy_file(root);

    let detected = detect(root);
    let names: Vec<_> = detected.iter().map(|d| d.package_name.as_str()).collect();
    assert_eq!(names, ["esbuild", "left-pad", "node-gyp", "sharp"]);

    let policy = load_policy(&policy_path).unwrap();
    let result = match_scripts(&detected, &policy);
    assert_eq!(result.violations.len(), 4);

    let mut policy = policy;
    for name in ["esbuild", "sharp"] {
        let scripts = scripts_for_package(name, &detected);
        policy = approve_package_scripts(&policy, name, &scripts).unwrap();
    }
    write_policy(&policy_path, &policy).unwrap();

    let reloaded = load_policy(&policy_path).unwrap();
    assert_eq!(reloaded, policy);
    let result = match_scripts(&detected, &reloaded);
    let approved: Vec<_> = result
        .approved
        .iter()
        .map(|s| (s.package_name.as_str(), s.script))
        .collect();
    assert_eq!(
        approved,
        [
            ("esbuild", LifecycleScript::Postinstall),
            ("sharp", LifecycleScript::Install)
        ]
    );
    assert_eq!(result.summary().total_violations, 2);
}

#[test]
fn blocked_entries_survive_approval_and_win() {
    let dir = project();
    let root = dir.path();
    let policy_path = find_policy_file(root);
    write(
        &policy_path,
        &json!({
            "version": 1,
            "allow": {},
            "blocked": { "left-pad": ["postinstall"] },
            "metadata": { "generatedAt": "2025-01-15", "approvedBy": "security" }
        }),
    );

    let detected = detect(root);
    let policy = load_policy(&policy_path).unwrap();
    let policy =
        approve_package_scripts(&policy, "left-pad", &[LifecycleScript::Postinstall]).unwrap();
    write_policy(&policy_path, &policy).unwrap();

    let result = match_scripts(&detected, &load_policy(&policy_path).unwrap());
    assert_eq!(result.blocked.len(), 1);
    assert_eq!(result.blocked[0].package_name, "left-pad");
    assert!(result.approved.is_empty());

    let written = fs::read_to_string(&policy_path).unwrap();
    assert!(written.contains("\"approvedBy\": \"security\""));
    assert!(written.ends_with("}\n") && !written.ends_with("\n\n"));
}

#[test]
fn future_policy_version_aborts_the_run() {
    let dir = project();
    let policy_path = find_policy_file(dir.path());
    write(
        &policy_path,
        &json!({
            "version": 2,
            "allow": {},
            "metadata": { "generatedAt": "2025-01-15", "approvedBy": "system" }
        }),
    );
    let err = load_policy(&policy_path).unwrap_err();
    assert_eq!(err.exit_code(), EXIT_INTERNAL_FAILURE);
    assert!(!err.is_violation());
}

#[test]
fn v1_lockfile_yields_same_detection() {
    let dir = project();
    let root = dir.path();
    write(
        &root.join("package-lock.json"),
        &json!({
            "lockfileVersion": 1,
            "dependencies": {
                "esbuild": { "version": "0.19.0" },
                "sharp": {
                    "version": "0.32.0",
                    "dependencies": { "node-gyp": { "version": "9.0.0" } }
                },
                "left-pad": { "version": "1.0.0" },
                "lodash": { "version": "4.17.21" },
                "fsevents": { "version": "2.3.3" }
            }
        }),
    );
    let detected = detect(root);
    assert_eq!(detected.len(), 4);
    let gyp = detected
        .iter()
        .find(|d| d.package_name == "node-gyp")
        .unwrap();
    assert_eq!(gyp.path, "node_modules/sharp/node_modules/node-gyp");
}
