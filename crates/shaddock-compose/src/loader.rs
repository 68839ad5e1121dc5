//! Include-aware YAML document loading.
//!
//! A node tagged `!include <relative-path>` is replaced by the parsed content
//! of the referenced file. The path is resolved against the directory of the
//! file holding the directive, and included files may include further files.

use std::path::{Path, PathBuf};

use serde_yaml::Value;
use serde_yaml::value::TaggedValue;
use shaddock_common::constants::INCLUDE_TAG;
use shaddock_common::error::{LoadFailure, Result, ShaddockError};

/// Loads a YAML document and expands every `!include` directive in it.
///
/// # Errors
///
/// Returns [`ShaddockError::DocumentLoad`] if this file or any included file
/// cannot be read or parsed, and [`ShaddockError::CyclicInclude`] if an
/// include chain loops back on itself.
pub fn load_document(path: impl AsRef<Path>) -> Result<Value> {
    let path = path.as_ref();
    tracing::info!(path = %path.display(), "loading document");
    let mut in_progress = Vec::new();
    load_recursive(path, &mut in_progress)
}

fn load_recursive(path: &Path, in_progress: &mut Vec<PathBuf>) -> Result<Value> {
    let canonical = path
        .canonicalize()
        .map_err(|e| ShaddockError::load(path, e))?;

    if in_progress.contains(&canonical) {
        let mut chain = in_progress.clone();
        chain.push(canonical);
        return Err(ShaddockError::CyclicInclude { chain });
    }

    let content = std::fs::read_to_string(path).map_err(|e| ShaddockError::load(path, e))?;
    let value: Value = serde_yaml::from_str(&content).map_err(|e| ShaddockError::load(path, e))?;

    let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
    in_progress.push(canonical);
    let expanded = expand(value, path, base_dir, in_progress);
    let _ = in_progress.pop();
    expanded
}

fn expand(
    value: Value,
    path: &Path,
    base_dir: &Path,
    in_progress: &mut Vec<PathBuf>,
) -> Result<Value> {
    match value {
        Value::Tagged(tagged) if tagged.tag == INCLUDE_TAG => {
            let target = include_target(&tagged.value, path)?;
            let included = base_dir.join(target);
            tracing::debug!(
                from = %path.display(),
                include = %included.display(),
                "expanding include"
            );
            load_recursive(&included, in_progress)
        }
        Value::Tagged(tagged) => {
            let TaggedValue { tag, value } = *tagged;
            Ok(Value::Tagged(Box::new(TaggedValue {
                tag,
                value: expand(value, path, base_dir, in_progress)?,
            })))
        }
        Value::Sequence(items) => items
            .into_iter()
            .map(|item| expand(item, path, base_dir, in_progress))
            .collect::<Result<Vec<_>>>()
            .map(Value::Sequence),
        Value::Mapping(mapping) => {
            let mut expanded = serde_yaml::Mapping::with_capacity(mapping.len());
            for (key, item) in mapping {
                let _ = expanded.insert(key, expand(item, path, base_dir, in_progress)?);
            }
            Ok(Value::Mapping(expanded))
        }
        scalar => Ok(scalar),
    }
}

fn include_target<'a>(payload: &'a Value, path: &Path) -> Result<&'a str> {
    match payload {
        Value::String(target) if !target.trim().is_empty() => Ok(target.trim()),
        other => Err(ShaddockError::load(
            path,
            LoadFailure::Include {
                target: format!("{other:?}"),
                reason: "expected a relative file path".into(),
            },
        )),
    }
}
