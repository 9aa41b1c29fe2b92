//! The result of one resolution pass and the operations that depend on it.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use exconf_templates::{lookup, FilenameTemplater, TemplateRenderer, VariableMap};

use crate::error::{CoreError, CoreResult};
use crate::layer::{DirListing, EntryKind};
use crate::resolver::ResolveRequest;
use crate::root::ConfigRoot;
use crate::settings::{vars, Settings};

/// Resolved variables for one (service, environment) request.
///
/// Every later step (template lookup, body and file name expansion) reads
/// from this value, so they all see the same inputs.
#[derive(Debug, Clone)]
pub struct ResolutionSession {
    root: ConfigRoot,
    request: ResolveRequest,
    variables: VariableMap,
    settings: Settings,
    renderer: TemplateRenderer,
    filename_templater: FilenameTemplater,
}

impl ResolutionSession {
    pub(crate) fn new(
        root: ConfigRoot,
        request: ResolveRequest,
        variables: VariableMap,
    ) -> CoreResult<Self> {
        let settings = Settings::from_variables(&variables)?;
        let renderer = settings.renderer(request.require_all_replaced)?;
        let filename_templater = settings.filename_templater()?;
        Ok(Self {
            root,
            request,
            variables,
            settings,
            renderer,
            filename_templater,
        })
    }

    /// Switch how template bodies treat placeholders without a value.
    ///
    /// The resolved variables are kept as they are.
    pub fn with_body_requirement(mut self, require_all_replaced: bool) -> CoreResult<Self> {
        self.renderer = self.settings.renderer(require_all_replaced)?;
        self.request.require_all_replaced = require_all_replaced;
        Ok(self)
    }

    pub fn request(&self) -> &ResolveRequest {
        &self.request
    }

    /// The resolved variables.
    pub fn variables(&self) -> &VariableMap {
        &self.variables
    }

    /// Settings as overridden by the resolved layers.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn into_variables(self) -> VariableMap {
        self.variables
    }

    /// List the template files for this service and environment.
    ///
    /// Candidate directories are searched from most to least specific and
    /// the first file with a given name wins:
    ///
    /// 1. `<templates>/<type>/<environments>/<environment>/<services>/<service>/`
    /// 2. `<templates>/<type>/<services>/<service>/`
    /// 3. `<templates>/<type>/<environments>/<environment>/`
    /// 4. `<templates>/<type>/`
    pub fn list_template_files(&self) -> CoreResult<Vec<PathBuf>> {
        let template_type = lookup(&self.variables, vars::TEMPLATE_TYPE)
            .ok_or(CoreError::TemplateTypeUndefined(vars::TEMPLATE_TYPE))?;

        let template_root = self.root.templates_dir(&self.settings)?.join(&template_type);
        if template_type.is_empty() || !template_root.is_dir() {
            return Err(CoreError::DirectoryMissing {
                kind: "Template type",
                path: template_root,
            });
        }

        let envs_dir = &self.settings.environments_dir_name;
        let services_dir = &self.settings.services_dir_name;
        let template_env_dir = template_root.join(envs_dir).join(&self.request.environment);
        let candidates = [
            template_env_dir.join(services_dir).join(&self.request.service),
            template_root.join(services_dir).join(&self.request.service),
            template_env_dir,
            template_root,
        ];

        let mut seen = HashSet::new();
        let mut templates = Vec::new();
        for dir in &candidates {
            debug!("Listing template files from: {:?}", dir);
            for path in DirListing::scan(dir, EntryKind::File)?.or_empty() {
                let Some(name) = path.file_name() else {
                    continue;
                };
                if seen.insert(name.to_os_string()) {
                    templates.push(path);
                }
            }
        }

        info!("Found {} template files in total", templates.len());
        Ok(templates)
    }

    /// Read a template file and substitute the resolved variables into it.
    pub fn populate_template(&self, template_path: &Path) -> CoreResult<String> {
        debug!("Populating template from file: {:?}", template_path);
        let content = fs::read_to_string(template_path)?;
        self.renderer
            .render(&content, &self.variables)
            .map_err(|source| CoreError::TemplateFile {
                path: template_path.to_path_buf(),
                source,
            })
    }

    /// The output file name for a template, with file name tokens expanded.
    pub fn target_file_name(&self, template_path: &Path) -> CoreResult<String> {
        let name = base_name(template_path);
        self.filename_templater
            .expand(&name, &self.variables)
            .map_err(|source| CoreError::TemplateFile {
                path: template_path.to_path_buf(),
                source,
            })
    }
}

pub(crate) fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
