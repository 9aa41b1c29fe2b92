//! Configuration root discovery and structural lookups.

use std::env;
use std::path::{Path, PathBuf};

use serde_yaml::Value;
use tracing::debug;

use exconf_templates::VariableMap;

use crate::error::{CoreError, CoreResult};
use crate::layer::{read_variables_file, DirListing, EntryKind};
use crate::settings::{vars, Settings, CONFIG_FILE_NAME, CONFIG_ROOT_ENV};

/// An opened exconf configuration root.
///
/// Holds the absolute root path and the descriptor variables from
/// `exconf.yaml`. The root never changes after construction.
#[derive(Debug, Clone)]
pub struct ConfigRoot {
    root_path: PathBuf,
    descriptor: VariableMap,
    settings: Settings,
}

impl ConfigRoot {
    /// Check if a configuration root exists at the given path.
    pub fn exists(path: impl AsRef<Path>) -> bool {
        path.as_ref().join(CONFIG_FILE_NAME).is_file()
    }

    /// Find the configuration root: explicit path, then `EXCONF_CONFIG_ROOT`,
    /// then the current directory if it holds a descriptor.
    pub fn discover(explicit: Option<&Path>) -> CoreResult<Self> {
        let from_env = env::var_os(CONFIG_ROOT_ENV).map(PathBuf::from);
        let current_dir = env::current_dir()?;
        let root = Self::locate(explicit, from_env.as_deref(), &current_dir)?;
        Self::open(root)
    }

    /// Pick the root path from the discovery candidates without opening it.
    pub fn locate(
        explicit: Option<&Path>,
        from_env: Option<&Path>,
        current_dir: &Path,
    ) -> CoreResult<PathBuf> {
        if let Some(path) = explicit.or(from_env) {
            return Ok(path.to_path_buf());
        }
        if Self::exists(current_dir) {
            return Ok(current_dir.to_path_buf());
        }
        Err(CoreError::ConfigurationNotFound(format!(
            "give the -c option, or define environment variable {}",
            CONFIG_ROOT_ENV
        )))
    }

    /// Open the configuration root at `path`.
    pub fn open(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        if !Self::exists(path) {
            return Err(CoreError::ConfigurationNotFound(format!(
                "no {} file found from configuration root: {}",
                CONFIG_FILE_NAME,
                path.display()
            )));
        }

        let root_path = path.canonicalize()?;
        let descriptor_path = root_path.join(CONFIG_FILE_NAME);
        debug!("Reading exconf configuration from: {:?}", descriptor_path);

        let mut descriptor = read_variables_file(&descriptor_path)?;
        descriptor.insert(
            vars::CONFIG_ROOT.to_string(),
            Value::String(root_path.to_string_lossy().into_owned()),
        );
        let settings = Settings::from_variables(&descriptor)?;

        Ok(Self {
            root_path,
            descriptor,
            settings,
        })
    }

    /// Absolute path of the configuration root.
    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    /// Variables from `exconf.yaml`, plus the configuration root path.
    pub fn descriptor(&self) -> &VariableMap {
        &self.descriptor
    }

    /// Settings from `exconf.yaml` alone, before any layer is applied.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Services root, validated to exist.
    pub fn services_dir(&self, settings: &Settings) -> CoreResult<PathBuf> {
        self.existing_dir("Services", &settings.services_dir_name)
    }

    /// Environments root, validated to exist.
    pub fn environments_dir(&self, settings: &Settings) -> CoreResult<PathBuf> {
        self.existing_dir("Environments", &settings.environments_dir_name)
    }

    /// Templates root, validated to exist.
    pub fn templates_dir(&self, settings: &Settings) -> CoreResult<PathBuf> {
        self.existing_dir("Templates", &settings.templates_dir_name)
    }

    /// Services root inside one environment. May not exist.
    pub fn services_dir_for_env(
        &self,
        settings: &Settings,
        environment: &str,
    ) -> CoreResult<PathBuf> {
        Ok(self
            .environments_dir(settings)?
            .join(environment)
            .join(&settings.services_dir_name))
    }

    fn existing_dir(&self, kind: &'static str, name: &str) -> CoreResult<PathBuf> {
        let dir = self.root_path.join(name);
        if !dir.is_dir() {
            return Err(CoreError::DirectoryMissing { kind, path: dir });
        }
        Ok(dir)
    }

    /// Names of all defined services.
    pub fn list_services(&self) -> CoreResult<Vec<String>> {
        Self::subdir_names(&self.services_dir(&self.settings)?, "Services")
    }

    /// Names of all defined environments.
    pub fn list_environments(&self) -> CoreResult<Vec<String>> {
        Self::subdir_names(&self.environments_dir(&self.settings)?, "Environments")
    }

    fn subdir_names(dir: &Path, kind: &'static str) -> CoreResult<Vec<String>> {
        Ok(DirListing::scan(dir, EntryKind::Dir)?
            .required(kind)?
            .iter()
            .filter_map(|p| p.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const DESCRIPTOR: &str = "\
services_dir_name: services
templates_dir_name: templates
environments_dir_name: environments
";

    #[test]
    fn test_open_requires_descriptor() {
        let temp = tempdir().unwrap();
        let err = ConfigRoot::open(temp.path()).unwrap_err();
        assert!(matches!(err, CoreError::ConfigurationNotFound(_)));
    }

    #[test]
    fn test_open_injects_root_path() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join(CONFIG_FILE_NAME), DESCRIPTOR).unwrap();

        let root = ConfigRoot::open(temp.path()).unwrap();
        let expected = temp.path().canonicalize().unwrap();
        assert_eq!(root.root_path(), expected);
        assert_eq!(
            root.descriptor()[vars::CONFIG_ROOT],
            Value::String(expected.to_string_lossy().into_owned())
        );
        assert_eq!(root.settings().services_dir_name, "services");
    }

    #[test]
    fn test_locate_precedence() {
        let temp = tempdir().unwrap();
        let explicit = Path::new("/explicit");
        let from_env = Path::new("/from-env");

        assert_eq!(
            ConfigRoot::locate(Some(explicit), Some(from_env), temp.path()).unwrap(),
            explicit
        );
        assert_eq!(
            ConfigRoot::locate(None, Some(from_env), temp.path()).unwrap(),
            from_env
        );
        assert!(matches!(
            ConfigRoot::locate(None, None, temp.path()),
            Err(CoreError::ConfigurationNotFound(_))
        ));

        fs::write(temp.path().join(CONFIG_FILE_NAME), DESCRIPTOR).unwrap();
        assert_eq!(
            ConfigRoot::locate(None, None, temp.path()).unwrap(),
            temp.path()
        );
    }

    #[test]
    fn test_list_services_requires_root_dir() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join(CONFIG_FILE_NAME), DESCRIPTOR).unwrap();
        let root = ConfigRoot::open(temp.path()).unwrap();

        let err = root.list_services().unwrap_err();
        assert!(matches!(err, CoreError::DirectoryMissing { kind: "Services", .. }));

        fs::create_dir_all(temp.path().join("services/web")).unwrap();
        fs::create_dir_all(temp.path().join("services/api")).unwrap();
        fs::write(temp.path().join("services/readme.yaml"), "a: 1").unwrap();
        assert_eq!(root.list_services().unwrap(), vec!["api", "web"]);
    }
}
