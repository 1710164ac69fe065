//! Lockfile normalization: v1 nested trees and v2/v3 flat package maps both
//! become a sorted list of [`Dependency`] records.

use crate::error::{Result, ScriptinelError};
use crate::models::Dependency;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// Lockfile names searched in a project root, first match wins.
pub const LOCKFILE_NAMES: [&str; 2] = ["package-lock.json", "npm-shrinkwrap.json"];

const MARKER: &str = "node_modules/";

/// Locate the project's lockfile.
pub fn find_lockfile(project_root: &Path) -> Result<PathBuf> {
    LOCKFILE_NAMES
        .iter()
        .map(|name| project_root.join(name))
        .find(|path| path.is_file())
        .ok_or_else(|| ScriptinelError::LockfileNotFound(project_root.to_path_buf()))
}

/// Read and normalize a lockfile from disk.
pub fn parse_lockfile(path: &Path) -> Result<Vec<Dependency>> {
    let text = fs::read_to_string(path).map_err(|e| ScriptinelError::io(path, e))?;
    let doc: Value = serde_json::from_str(&text).map_err(|e| ScriptinelError::parse(path, e))?;
    Ok(dependencies_from_document(&doc))
}

/// Normalize an in-memory lockfile document.
pub fn parse_lockfile_str(text: &str) -> std::result::Result<Vec<Dependency>, serde_json::Error> {
    let doc: Value = serde_json::from_str(text)?;
    Ok(dependencies_from_document(&doc))
}

fn dependencies_from_document(doc: &Value) -> Vec<Dependency> {
    let mut deps = if let Some(packages) = doc.get("packages") {
        from_flat_map(packages)
    } else if let Some(tree) = doc.get("dependencies") {
        from_nested_tree(tree)
    } else {
        Vec::new()
    };
    deps.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.path.cmp(&b.path)));
    deps
}

/// v2/v3: `packages` keyed by install path.
fn from_flat_map(packages: &Value) -> Vec<Dependency> {
    let Some(entries) = packages.as_object() else {
        return Vec::new();
    };

    entries
        .iter()
        .filter(|(path, _)| !path.is_empty())
        .filter_map(|(path, entry)| {
            // Workspace links and unresolved placeholders carry no version.
            let version = resolved_version(entry)?;
            let name = package_name_from_path(path)?;
            let path = if path.starts_with(MARKER) {
                path.clone()
            } else {
                format!("{MARKER}{path}")
            };
            Some(Dependency {
                name: name.to_string(),
                version: version.to_string(),
                path,
            })
        })
        .collect()
}

/// v1: `dependencies` nested by install hierarchy. Walked with an explicit
/// stack so deep trees cannot exhaust the call stack.
fn from_nested_tree(tree: &Value) -> Vec<Dependency> {
    let Some(root) = tree.as_object() else {
        return Vec::new();
    };

    let mut deps = Vec::new();
    let mut stack: Vec<(&Map<String, Value>, Option<String>)> = vec![(root, None)];

    while let Some((children, parent)) = stack.pop() {
        for (name, node) in children {
            let Some(version) = resolved_version(node) else {
                continue;
            };
            let path = match &parent {
                Some(parent) => format!("{parent}/{MARKER}{name}"),
                None => format!("{MARKER}{name}"),
            };
            if let Some(nested) = node.get("dependencies").and_then(Value::as_object) {
                stack.push((nested, Some(path.clone())));
            }
            deps.push(Dependency {
                name: name.clone(),
                version: version.to_string(),
                path,
            });
        }
    }
    deps
}

fn resolved_version(entry: &Value) -> Option<&str> {
    entry
        .get("version")
        .and_then(Value::as_str)
        .filter(|v| !v.is_empty())
}

/// Name of the package installed at `path`: the segment after the last
/// `node_modules/`, or two segments for `@scope/name`.
fn package_name_from_path(path: &str) -> Option<&str> {
    let rest = match path.rfind(MARKER) {
        Some(idx) => &path[idx + MARKER.len()..],
        None => path,
    };
    let mut segments = rest.split('/');
    let first = segments.next().filter(|s| !s.is_empty())?;
    if first.starts_with('@') {
        let second = segments.next().filter(|s| !s.is_empty())?;
        Some(&rest[..first.len() + 1 + second.len()])
    } else {
        Some(first)
    }
}
