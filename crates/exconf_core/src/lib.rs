//! # exconf_core
//!
//! Layered configuration resolution for exconf.
//!
//! A configuration root holds an `exconf.yaml` descriptor, a services
//! directory, an environments directory and a templates directory. This crate
//! merges the YAML variable layers for a (service, environment) pair, expands
//! placeholders inside the merged values, locates the templates that apply and
//! writes them out as a work directory.
//!
//! ## Example
//!
//! ```rust,no_run
//! use exconf_core::{prepare_work_dir, ConfigRoot, ResolveRequest, Resolver};
//!
//! let resolver = Resolver::new(ConfigRoot::discover(None).unwrap());
//! let request = ResolveRequest::new("billing", "staging").with_variable("tag", "v42");
//!
//! let session = resolver.resolve(&request).unwrap();
//! for template in session.list_template_files().unwrap() {
//!     println!("{}", session.populate_template(&template).unwrap());
//! }
//!
//! let work_dir = prepare_work_dir(&resolver, &request, None).unwrap();
//! println!("{:?}", work_dir.files);
//! ```

pub mod error;
pub mod layer;
pub mod resolver;
pub mod root;
pub mod session;
pub mod settings;
pub mod workdir;

pub use error::{CoreError, CoreResult};
pub use layer::{list_layer_files, load_layer, DirListing, EntryKind};
pub use resolver::{parse_extra_vars, ResolveRequest, Resolver};
pub use root::ConfigRoot;
pub use session::ResolutionSession;
pub use settings::{vars, Settings, CONFIG_FILE_NAME, CONFIG_ROOT_ENV};
pub use workdir::{prepare_work_dir, write_templates, PreparedWorkDir};
