//! Policy persistence. A missing file means "no policy yet" and yields the
//! default; an existing file is never patched up, any defect is an error.

use super::{validate_policy, Policy, PolicyMetadata, ScriptMap, POLICY_FILE_NAME, POLICY_VERSION};
use crate::error::{Result, ScriptinelError};
use crate::models::LifecycleScript;
use serde_json::{Map, Value};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument};

/// Default policy location for a project.
pub fn find_policy_file(project_root: &Path) -> PathBuf {
    project_root.join(POLICY_FILE_NAME)
}

/// Load and validate the policy at `path`.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn load_policy(path: &Path) -> Result<Policy> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!("no policy file found, starting from an empty policy");
            return Ok(Policy::default());
        }
        Err(e) => return Err(ScriptinelError::io(path, e)),
    };

    let doc: Value = serde_json::from_str(&text).map_err(|e| ScriptinelError::parse(path, e))?;
    let policy = policy_from_document(&doc)?;
    validate_policy(&policy)?;
    debug!(
        allowed = policy.allow.len(),
        blocked = policy.blocked.as_ref().map_or(0, |b| b.len()),
        "policy loaded"
    );
    Ok(policy)
}

/// Persist `policy` as 2-space pretty JSON with one trailing newline. An
/// existing file is replaced through a sibling temp file renamed into place,
/// keeping its mode. A new file is created directly so it gets the umask's
/// default mode rather than the temp file's owner-only one.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn write_policy(path: &Path, policy: &Policy) -> Result<()> {
    validate_policy(policy)?;
    let mut content = serde_json::to_string_pretty(policy)?;
    content.push('\n');

    match fs::metadata(path) {
        Ok(meta) => replace_file(path, content.as_bytes(), meta.permissions())?,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            fs::write(path, &content).map_err(|e| ScriptinelError::io(path, e))?;
        }
        Err(e) => return Err(ScriptinelError::io(path, e)),
    }

    info!(allowed = policy.allow.len(), "policy written");
    Ok(())
}

fn replace_file(path: &Path, content: &[u8], permissions: fs::Permissions) -> Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| ScriptinelError::io(dir, e))?;
    tmp.write_all(content)
        .map_err(|e| ScriptinelError::io(tmp.path(), e))?;
    tmp.as_file()
        .set_permissions(permissions)
        .map_err(|e| ScriptinelError::io(tmp.path(), e))?;
    tmp.persist(path)
        .map_err(|e| ScriptinelError::io(path, e.error))?;
    Ok(())
}

fn invalid(msg: impl Into<String>) -> ScriptinelError {
    ScriptinelError::InvalidPolicy(msg.into())
}

fn policy_from_document(doc: &Value) -> Result<Policy> {
    let obj = doc
        .as_object()
        .ok_or_else(|| invalid("policy file must be a JSON object"))?;

    let version = match obj.get("version") {
        Some(Value::Number(n)) => n,
        _ => return Err(invalid("policy must have a numeric version field")),
    };
    if version.as_f64() != Some(f64::from(POLICY_VERSION)) {
        return Err(ScriptinelError::UnsupportedVersion {
            found: version.to_string(),
            expected: POLICY_VERSION,
        });
    }

    let allow = obj
        .get("allow")
        .and_then(Value::as_object)
        .ok_or_else(|| invalid("policy must have an allow field"))?;
    let allow = script_map(allow, "allow list")?;

    let blocked = match obj.get("blocked") {
        None | Some(Value::Null) => None,
        Some(Value::Object(map)) => Some(script_map(map, "blocked list")?),
        Some(_) => return Err(invalid("blocked field must be an object")),
    };

    let metadata = obj
        .get("metadata")
        .and_then(Value::as_object)
        .ok_or_else(|| invalid("policy must have a metadata field"))?;
    let generated_at = metadata
        .get("generatedAt")
        .and_then(Value::as_str)
        .ok_or_else(|| invalid("policy metadata must have a generatedAt field"))?;
    let approved_by = metadata
        .get("approvedBy")
        .and_then(Value::as_str)
        .ok_or_else(|| invalid("policy metadata must have an approvedBy field"))?;

    Ok(Policy {
        version: POLICY_VERSION,
        allow,
        blocked,
        metadata: PolicyMetadata {
            generated_at: generated_at.to_string(),
            approved_by: approved_by.to_string(),
        },
    })
}

fn script_map(raw: &Map<String, Value>, list: &str) -> Result<ScriptMap> {
    let mut map = ScriptMap::new();
    for (name, scripts) in raw {
        let scripts = scripts
            .as_array()
            .ok_or_else(|| invalid(format!("scripts for {name} in {list} must be an array")))?;
        let parsed = scripts
            .iter()
            .map(|script| match script.as_str() {
                Some(s) => s.parse::<LifecycleScript>().map_err(|_| {
                    ScriptinelError::InvalidScript(format!("\"{s}\" for {name} in {list}"))
                }),
                None => Err(ScriptinelError::InvalidScript(format!(
                    "{script} for {name} in {list}"
                ))),
            })
            .collect::<Result<Vec<_>>>()?;
        map.insert(name.clone(), parsed);
    }
    Ok(map)
}
