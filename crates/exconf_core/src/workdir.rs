//! Work directory preparation.
//!
//! Writes every located template, populated and renamed, into one directory.
//! The template named by the `execution_file` setting becomes the executable
//! entrypoint.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::error::{CoreError, CoreResult};
use crate::resolver::{ResolveRequest, Resolver};
use crate::session::{base_name, ResolutionSession};
use crate::settings::vars;

/// Mode of the created target directory.
pub const WORK_DIR_MODE: u32 = 0o770;
/// Mode of regular materialized files.
pub const FILE_MODE: u32 = 0o640;
/// Mode of the execution entrypoint.
pub const EXECUTABLE_FILE_MODE: u32 = 0o770;

/// A populated work directory.
#[derive(Debug, Clone)]
pub struct PreparedWorkDir {
    /// Absolute path of the directory.
    pub path: PathBuf,
    /// Written files, in template precedence order.
    pub files: Vec<PathBuf>,
    /// The written execution file, if a template matched it.
    pub entrypoint: Option<PathBuf>,
    /// The resolved `execution_command` setting.
    pub command: Option<String>,
}

impl PreparedWorkDir {
    /// The command to run inside this directory.
    pub fn execution_command(&self) -> CoreResult<&str> {
        self.command
            .as_deref()
            .ok_or(CoreError::MissingSetting(vars::EXECUTION_COMMAND))
    }

    /// Names of the written files.
    pub fn file_names(&self) -> Vec<String> {
        self.files.iter().map(|p| base_name(p)).collect()
    }
}

/// Resolve `request` and materialize its templates.
///
/// Without `target_dir` a fresh temporary directory is created and kept.
/// Files written before a failure stay on disk.
pub fn prepare_work_dir(
    resolver: &Resolver,
    request: &ResolveRequest,
    target_dir: Option<&Path>,
) -> CoreResult<PreparedWorkDir> {
    let target_dir = match target_dir {
        Some(dir) => {
            create_target_dir(dir)?;
            dir.canonicalize()?
        }
        None => tempfile::Builder::new()
            .prefix("exconf-")
            .tempdir()?
            .keep(),
    };
    info!(
        "Preparing execution dir for service '{}' in env '{}': {:?}",
        request.service, request.environment, target_dir
    );

    let session = resolver.resolve(request)?;
    write_templates(&session, &target_dir)
}

/// Write the templates of an already resolved session into `target_dir`.
pub fn write_templates(
    session: &ResolutionSession,
    target_dir: &Path,
) -> CoreResult<PreparedWorkDir> {
    if !target_dir.is_dir() {
        return Err(CoreError::DirectoryMissing {
            kind: "Target",
            path: target_dir.to_path_buf(),
        });
    }
    let exec_file_name = session.settings().execution_file()?.to_string();

    let mut prepared = PreparedWorkDir {
        path: target_dir.to_path_buf(),
        files: Vec::new(),
        entrypoint: None,
        command: session.settings().execution_command().ok().map(str::to_string),
    };

    for template_path in session.list_template_files()? {
        let is_entrypoint = base_name(&template_path) == exec_file_name;
        let mode = if is_entrypoint {
            EXECUTABLE_FILE_MODE
        } else {
            FILE_MODE
        };

        let written = populate_and_write(session, &template_path, target_dir, mode).map_err(|e| {
            error!("{}", e);
            error!(
                "Failed writing template file {:?} into target directory: {:?}",
                template_path, target_dir
            );
            e
        })?;

        if is_entrypoint {
            prepared.entrypoint = Some(written.clone());
        }
        prepared.files.push(written);
    }

    Ok(prepared)
}

fn populate_and_write(
    session: &ResolutionSession,
    template_path: &Path,
    target_dir: &Path,
    mode: u32,
) -> CoreResult<PathBuf> {
    let data = session.populate_template(template_path)?;
    let target_path = target_dir.join(session.target_file_name(template_path)?);

    info!("Writing template file: {:?}", target_path);
    fs::write(&target_path, data)?;
    set_mode(&target_path, mode)?;
    Ok(target_path)
}

#[cfg(unix)]
fn create_target_dir(dir: &Path) -> CoreResult<()> {
    use std::os::unix::fs::DirBuilderExt;

    if !dir.is_dir() {
        fs::DirBuilder::new()
            .recursive(true)
            .mode(WORK_DIR_MODE)
            .create(dir)?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn create_target_dir(dir: &Path) -> CoreResult<()> {
    fs::create_dir_all(dir)?;
    Ok(())
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> CoreResult<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(mode))?;
    Ok(())
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> CoreResult<()> {
    Ok(())
}
