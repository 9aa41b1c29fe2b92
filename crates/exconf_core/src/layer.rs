//! Variable layer loading.
//!
//! A layer is the merged content of every `*.yaml`/`*.yml` file directly
//! inside one directory. Directory scans report a missing directory as a
//! distinct outcome so callers decide whether absence is fatal.

use std::fs;
use std::path::{Path, PathBuf};

use serde_yaml::Value;
use tracing::debug;
use walkdir::WalkDir;

use exconf_templates::{key_name, VariableMap};

use crate::error::{CoreError, CoreResult};

/// Which directory entries a scan returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
}

/// Outcome of scanning one directory level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirListing {
    /// Matching entries, sorted by file name.
    Found(Vec<PathBuf>),
    /// The directory does not exist.
    Missing(PathBuf),
}

impl DirListing {
    /// List the direct children of `dir` of the given kind.
    pub fn scan(dir: &Path, kind: EntryKind) -> CoreResult<Self> {
        if !dir.is_dir() {
            return Ok(Self::Missing(dir.to_path_buf()));
        }

        let mut entries = Vec::new();
        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(std::io::Error::from)?;
            let path = entry.path();
            let matches = match kind {
                EntryKind::File => path.is_file(),
                EntryKind::Dir => path.is_dir(),
            };
            if matches {
                entries.push(path.to_path_buf());
            }
        }
        Ok(Self::Found(entries))
    }

    /// Treat a missing directory as empty.
    pub fn or_empty(self) -> Vec<PathBuf> {
        match self {
            Self::Found(entries) => entries,
            Self::Missing(path) => {
                debug!("Directory does not exist: {:?}", path);
                Vec::new()
            }
        }
    }

    /// Treat a missing directory as an error; `kind` names the directory role.
    pub fn required(self, kind: &'static str) -> CoreResult<Vec<PathBuf>> {
        match self {
            Self::Found(entries) => Ok(entries),
            Self::Missing(path) => Err(CoreError::DirectoryMissing { kind, path }),
        }
    }
}

/// Check whether a path names a YAML file.
///
/// Matches on the file name suffix, so a bare `.yaml` counts too.
pub fn is_yaml_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map_or(false, |name| name.ends_with(".yaml") || name.ends_with(".yml"))
}

/// List the variable files of a layer directory. A missing directory has none.
pub fn list_layer_files(dir: &Path) -> CoreResult<Vec<PathBuf>> {
    Ok(DirListing::scan(dir, EntryKind::File)?
        .or_empty()
        .into_iter()
        .filter(|path| is_yaml_file(path))
        .collect())
}

/// Load and merge every variable file of a layer directory.
///
/// Files are merged in name order; a later file overwrites earlier keys.
pub fn load_layer(dir: &Path) -> CoreResult<VariableMap> {
    debug!("Loading variables from directory: {:?}", dir);
    let mut variables = VariableMap::new();
    for path in list_layer_files(dir)? {
        variables.extend(read_variables_file(&path)?);
    }
    Ok(variables)
}

/// Read one YAML file as a flat variable mapping.
///
/// An empty file yields no variables.
pub fn read_variables_file(path: &Path) -> CoreResult<VariableMap> {
    debug!("Reading variables from {:?}", path);
    let content = fs::read_to_string(path)?;
    let document: Value = serde_yaml::from_str(&content).map_err(|e| CoreError::InvalidLayerFile {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    match document {
        Value::Null => Ok(VariableMap::new()),
        Value::Mapping(mapping) => {
            let mut variables = VariableMap::new();
            for (key, value) in mapping {
                let name = key_name(&key).ok_or_else(|| CoreError::InvalidLayerFile {
                    path: path.to_path_buf(),
                    message: format!("unsupported variable name: {:?}", key),
                })?;
                variables.insert(name, value);
            }
            Ok(variables)
        }
        _ => Err(CoreError::InvalidLayerFile {
            path: path.to_path_buf(),
            message: "expected a mapping of variable names to values".to_string(),
        }),
    }
}
