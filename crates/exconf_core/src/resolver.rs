//! Layered variable resolution.
//!
//! Layers are applied in this order, each overriding the keys of the ones
//! before it:
//!
//! 1. `exconf.yaml` plus the injected `service` and `environment`
//! 2. `<environments>/*.yaml` (global)
//! 3. `<environments>/<environment>/*.yaml`
//! 4. `<services>/<service>/*.yaml`
//! 5. `<environments>/<environment>/<services>/<service>/*.yaml`
//! 6. extra variables from the caller

use serde_yaml::Value;
use tracing::{debug, info};

use exconf_templates::VariableMap;

use crate::error::{CoreError, CoreResult};
use crate::layer::load_layer;
use crate::root::ConfigRoot;
use crate::session::ResolutionSession;
use crate::settings::{vars, Settings};

/// What to resolve.
#[derive(Debug, Clone)]
pub struct ResolveRequest {
    pub service: String,
    pub environment: String,
    /// Highest-precedence variables, e.g. from `-x key=value`.
    pub extra_variables: VariableMap,
    /// Fail on placeholders without a value instead of leaving them in place.
    pub require_all_replaced: bool,
}

impl ResolveRequest {
    pub fn new(service: impl Into<String>, environment: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            environment: environment.into(),
            extra_variables: VariableMap::new(),
            require_all_replaced: true,
        }
    }

    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_variables
            .insert(name.into(), Value::String(value.into()));
        self
    }

    pub fn with_variables(mut self, vars: VariableMap) -> Self {
        self.extra_variables.extend(vars);
        self
    }

    pub fn require_all_replaced(mut self, require: bool) -> Self {
        self.require_all_replaced = require;
        self
    }
}

/// Parse `key=value` tokens. Each token must contain exactly one `=`.
pub fn parse_extra_vars<I, S>(tokens: I) -> CoreResult<VariableMap>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut extra = VariableMap::new();
    for token in tokens {
        let token = token.as_ref();
        match token.split_once('=') {
            Some((key, value)) if !value.contains('=') => {
                extra.insert(key.to_string(), Value::String(value.to_string()));
            }
            _ => return Err(CoreError::InvalidExtraVariable(token.to_string())),
        }
    }
    Ok(extra)
}

/// Resolves variables for services and environments of one configuration root.
#[derive(Debug, Clone)]
pub struct Resolver {
    root: ConfigRoot,
}

impl Resolver {
    pub fn new(root: ConfigRoot) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &ConfigRoot {
        &self.root
    }

    pub fn list_services(&self) -> CoreResult<Vec<String>> {
        self.root.list_services()
    }

    pub fn list_environments(&self) -> CoreResult<Vec<String>> {
        self.root.list_environments()
    }

    /// Variables common to all services in all environments.
    pub fn load_global_variables(&self) -> CoreResult<VariableMap> {
        load_layer(&self.root.environments_dir(self.settings())?)
    }

    /// Variables for all services in one environment.
    pub fn load_env_variables(&self, environment: &str) -> CoreResult<VariableMap> {
        load_layer(&self.root.environments_dir(self.settings())?.join(environment))
    }

    /// Variables for one service in all environments.
    pub fn load_service_variables(&self, service: &str) -> CoreResult<VariableMap> {
        load_layer(&self.root.services_dir(self.settings())?.join(service))
    }

    /// Variables for one service in one environment.
    pub fn load_service_variables_for_env(
        &self,
        service: &str,
        environment: &str,
    ) -> CoreResult<VariableMap> {
        load_layer(
            &self
                .root
                .services_dir_for_env(self.settings(), environment)?
                .join(service),
        )
    }

    /// Merge every layer for `request`, without expanding placeholders.
    pub fn load_all_variables(&self, request: &ResolveRequest) -> CoreResult<VariableMap> {
        let mut all_vars = self.root.descriptor().clone();
        all_vars.insert(
            vars::SERVICE.to_string(),
            Value::String(request.service.clone()),
        );
        all_vars.insert(
            vars::ENVIRONMENT.to_string(),
            Value::String(request.environment.clone()),
        );
        all_vars.extend(self.load_global_variables()?);
        all_vars.extend(self.load_env_variables(&request.environment)?);
        all_vars.extend(self.load_service_variables(&request.service)?);
        all_vars.extend(
            self.load_service_variables_for_env(&request.service, &request.environment)?,
        );
        all_vars.extend(request.extra_variables.clone());
        Ok(all_vars)
    }

    /// Merge every layer and expand the placeholders inside the values.
    pub fn resolve(&self, request: &ResolveRequest) -> CoreResult<ResolutionSession> {
        info!(
            "Resolving variables for service '{}' in environment '{}'",
            request.service, request.environment
        );
        let all_vars = self.load_all_variables(request)?;
        let renderer = Settings::from_variables(&all_vars)?.renderer(request.require_all_replaced)?;
        let resolved = renderer.render_variables(&all_vars)?;
        debug!("Resolved {} variables", resolved.len());
        ResolutionSession::new(self.root.clone(), request.clone(), resolved)
    }

    fn settings(&self) -> &Settings {
        self.root.settings()
    }
}
