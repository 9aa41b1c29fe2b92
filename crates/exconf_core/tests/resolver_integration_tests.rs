//! Integration tests for layered resolution and work directory preparation.

use std::fs;
use std::path::{Path, PathBuf};

use serde_yaml::Value;
use tempfile::{tempdir, TempDir};

use exconf_core::{
    prepare_work_dir, ConfigRoot, CoreError, ResolveRequest, Resolver, CONFIG_FILE_NAME,
};
use exconf_templates::{MissingVariable, TemplateError};

const DESCRIPTOR: &str = "\
services_dir_name: services
templates_dir_name: templates
environments_dir_name: environments
execution_command: ./run.sh
execution_file: run.sh
template_type: docker
k1: base
k2: base
k3: base
k4: base
k5: base
k6: base
ports: [1, 2, 3]
db:
  host: base-db
  port: 5432
";

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// A configuration root with every layer and a `docker` template family.
fn fixture() -> TempDir {
    let temp = tempdir().unwrap();
    let root = temp.path();

    write(root, CONFIG_FILE_NAME, DESCRIPTOR);
    write(
        root,
        "environments/global.yaml",
        "k2: global\nk3: global\nk4: global\nk5: global\nk6: global\n",
    );
    write(
        root,
        "environments/prod/env.yaml",
        "k3: env\nk4: env\nk5: env\nk6: env\nurl: \"http://{{service}}.{{environment}}\"\n",
    );
    write(
        root,
        "services/billing/a.yaml",
        "k4: service\nk5: service\nk6: service\nports: [9]\ndb:\n  host: billing-db\n",
    );
    write(root, "services/billing/b.yml", "k4: service-b\n");
    write(root, "environments/prod/services/billing/vars.yaml", "k5: svc-env\nk6: svc-env\n");
    fs::create_dir_all(root.join("services/api")).unwrap();

    write(root, "templates/docker/app.conf", "# default for {{nothing}}\nname={{service}}\n");
    write(root, "templates/docker/run.sh", "#!/bin/sh\necho {{service}} {{environment}}\n");
    write(
        root,
        "templates/docker/services/billing/app.conf",
        "# billing for {{nothing}}\nname={{service}}-special\n",
    );
    write(
        root,
        "templates/docker/environments/prod/___service___.env",
        "ENV={{environment}}\nURL={{url}}\n",
    );
    write(root, "templates/docker/environments/prod/services/billing/extra.txt", "k6={{k6}}\n");

    write(root, "templates/broken/a.conf", "ok {{service}}\n");
    write(root, "templates/broken/b.conf", "{{undefined}}\nline two {{also_missing}}\n");

    temp
}

fn resolver(temp: &TempDir) -> Resolver {
    Resolver::new(ConfigRoot::open(temp.path()).unwrap())
}

fn names(paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
        .collect()
}

#[test]
fn test_layer_precedence_chain() {
    let temp = fixture();
    let request = ResolveRequest::new("billing", "prod").with_variable("k6", "extra");

    let vars = resolver(&temp).load_all_variables(&request).unwrap();

    assert_eq!(vars["k1"], Value::from("base"));
    assert_eq!(vars["k2"], Value::from("global"));
    assert_eq!(vars["k3"], Value::from("env"));
    assert_eq!(vars["k4"], Value::from("service-b"));
    assert_eq!(vars["k5"], Value::from("svc-env"));
    assert_eq!(vars["k6"], Value::from("extra"));
    assert_eq!(vars["service"], Value::from("billing"));
    assert_eq!(vars["environment"], Value::from("prod"));
}

#[test]
fn test_structured_values_replaced_atomically() {
    let temp = fixture();
    let vars = resolver(&temp)
        .load_all_variables(&ResolveRequest::new("billing", "prod"))
        .unwrap();

    let ports: Value = serde_yaml::from_str("[9]").unwrap();
    let db: Value = serde_yaml::from_str("host: billing-db").unwrap();
    assert_eq!(vars["ports"], ports);
    assert_eq!(vars["db"], db);
}

#[test]
fn test_missing_leaf_directories_contribute_nothing() {
    let temp = fixture();
    let vars = resolver(&temp)
        .load_all_variables(&ResolveRequest::new("ghost", "staging"))
        .unwrap();

    assert_eq!(vars["k1"], Value::from("base"));
    assert_eq!(vars["k6"], Value::from("global"));
}

#[test]
fn test_missing_root_directory_is_fatal() {
    let temp = fixture();
    fs::remove_dir_all(temp.path().join("services")).unwrap();

    let err = resolver(&temp)
        .load_all_variables(&ResolveRequest::new("billing", "prod"))
        .unwrap_err();
    assert!(matches!(err, CoreError::DirectoryMissing { kind: "Services", .. }));
}

#[test]
fn test_list_services_and_environments() {
    let temp = fixture();
    let resolver = resolver(&temp);
    assert_eq!(resolver.list_services().unwrap(), vec!["api", "billing"]);
    assert_eq!(resolver.list_environments().unwrap(), vec!["prod"]);
}

#[test]
fn test_resolve_expands_values() {
    let temp = fixture();
    let session = resolver(&temp)
        .resolve(&ResolveRequest::new("billing", "prod"))
        .unwrap();
    assert_eq!(session.variables()["url"], Value::from("http://billing.prod"));
}

#[test]
fn test_resolve_self_reference_fails() {
    let temp = fixture();
    write(temp.path(), "services/billing/z.yaml", "a: \"{{a}}\"\n");

    let err = resolver(&temp)
        .resolve(&ResolveRequest::new("billing", "prod"))
        .unwrap_err();
    match err {
        CoreError::Template(TemplateError::Mapping { key, source }) => {
            assert_eq!(key, "a");
            assert!(matches!(*source, TemplateError::DidNotConverge { .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_resolve_leaves_missing_when_not_required() {
    let temp = fixture();
    write(temp.path(), "services/billing/z.yaml", "partial: \"{{unknown}}-x\"\n");

    let request = ResolveRequest::new("billing", "prod").require_all_replaced(false);
    let session = resolver(&temp).resolve(&request).unwrap();
    assert_eq!(session.variables()["partial"], Value::from("{{unknown}}-x"));

    let err = resolver(&temp)
        .resolve(&ResolveRequest::new("billing", "prod"))
        .unwrap_err();
    assert_eq!(
        err.template_error().unwrap().missing_variables(),
        &[MissingVariable::new(1, "unknown")]
    );
}

#[test]
fn test_body_requirement_after_lenient_resolve() {
    let temp = fixture();
    write(temp.path(), "services/api/z.yaml", "partial: \"{{unknown}}\"\n");

    let request = ResolveRequest::new("api", "prod")
        .with_variable("template_type", "broken")
        .require_all_replaced(false);
    let session = resolver(&temp)
        .resolve(&request)
        .unwrap()
        .with_body_requirement(true)
        .unwrap();
    assert_eq!(session.variables()["partial"], Value::from("{{unknown}}"));

    let files = session.list_template_files().unwrap();
    assert_eq!(session.populate_template(&files[0]).unwrap(), "ok api\n");
    let err = session.populate_template(&files[1]).unwrap_err();
    assert!(matches!(err, CoreError::TemplateFile { .. }));
}

#[test]
fn test_template_files_precedence() {
    let temp = fixture();
    let session = resolver(&temp)
        .resolve(&ResolveRequest::new("billing", "prod"))
        .unwrap();

    let files = session.list_template_files().unwrap();
    assert_eq!(
        names(&files),
        vec!["extra.txt", "app.conf", "___service___.env", "run.sh"]
    );

    let app_conf = files.iter().find(|p| p.ends_with("app.conf")).unwrap();
    let billing_dir = temp
        .path()
        .canonicalize()
        .unwrap()
        .join("templates/docker/services/billing");
    assert!(app_conf.starts_with(billing_dir));
}

#[test]
fn test_template_files_for_other_service_use_defaults() {
    let temp = fixture();
    let session = resolver(&temp)
        .resolve(&ResolveRequest::new("api", "prod"))
        .unwrap();

    let files = session.list_template_files().unwrap();
    assert_eq!(names(&files), vec!["___service___.env", "app.conf", "run.sh"]);
    assert_eq!(
        session.populate_template(&files[1]).unwrap(),
        "# default for {{nothing}}\nname=api\n"
    );
}

#[test]
fn test_unknown_template_type() {
    let temp = fixture();
    let session = resolver(&temp)
        .resolve(&ResolveRequest::new("billing", "prod").with_variable("template_type", "nope"))
        .unwrap();

    let err = session.list_template_files().unwrap_err();
    match err {
        CoreError::DirectoryMissing { path, .. } => assert!(path.ends_with("templates/nope")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_template_type_undefined() {
    let temp = tempdir().unwrap();
    write(
        temp.path(),
        CONFIG_FILE_NAME,
        "services_dir_name: services\n\
         templates_dir_name: templates\n\
         environments_dir_name: environments\n",
    );
    fs::create_dir_all(temp.path().join("services")).unwrap();
    fs::create_dir_all(temp.path().join("environments")).unwrap();
    fs::create_dir_all(temp.path().join("templates")).unwrap();

    let session = resolver(&temp)
        .resolve(&ResolveRequest::new("billing", "prod"))
        .unwrap();
    assert!(matches!(
        session.list_template_files(),
        Err(CoreError::TemplateTypeUndefined(_))
    ));
}

#[cfg(unix)]
#[test]
fn test_prepare_work_dir_modes_and_names() {
    use std::os::unix::fs::PermissionsExt;

    let temp = fixture();
    let out = tempdir().unwrap();
    let target = out.path().join("nested/work");

    let prepared = prepare_work_dir(
        &resolver(&temp),
        &ResolveRequest::new("billing", "prod"),
        Some(&target),
    )
    .unwrap();

    assert!(target.is_dir());
    assert_eq!(
        prepared.file_names(),
        vec!["extra.txt", "app.conf", "billing.env", "run.sh"]
    );
    assert_eq!(
        fs::read_to_string(target.join("billing.env")).unwrap(),
        "ENV=prod\nURL=http://billing.prod\n"
    );
    assert_eq!(
        fs::read_to_string(target.join("app.conf")).unwrap(),
        "# billing for {{nothing}}\nname=billing-special\n"
    );

    let run_mode = fs::metadata(target.join("run.sh")).unwrap().permissions().mode();
    let conf_mode = fs::metadata(target.join("app.conf")).unwrap().permissions().mode();
    assert_eq!(run_mode & 0o777, 0o770);
    assert_eq!(conf_mode & 0o777, 0o640);
    assert_ne!(run_mode & 0o100, 0);
    assert_eq!(conf_mode & 0o111, 0);
    assert_eq!(prepared.entrypoint, Some(prepared.path.join("run.sh")));
    assert_eq!(prepared.execution_command().unwrap(), "./run.sh");
}

#[test]
fn test_prepare_work_dir_in_temp_dir() {
    let temp = fixture();
    let prepared = prepare_work_dir(
        &resolver(&temp),
        &ResolveRequest::new("api", "prod"),
        None,
    )
    .unwrap();

    assert!(prepared.path.is_absolute());
    assert!(prepared.path.join("api.env").is_file());
    fs::remove_dir_all(&prepared.path).unwrap();
}

#[test]
fn test_prepare_work_dir_reports_all_missing_variables() {
    let temp = fixture();
    let out = tempdir().unwrap();
    let request = ResolveRequest::new("api", "prod").with_variable("template_type", "broken");

    let err = prepare_work_dir(&resolver(&temp), &request, Some(out.path())).unwrap_err();
    match &err {
        CoreError::TemplateFile { path, source } => {
            assert!(path.ends_with("b.conf"));
            assert_eq!(
                source.missing_variables(),
                &[
                    MissingVariable::new(1, "undefined"),
                    MissingVariable::new(2, "also_missing")
                ]
            );
        }
        other => panic!("unexpected error: {other}"),
    }

    // Files written before the failure remain.
    assert_eq!(fs::read_to_string(out.path().join("a.conf")).unwrap(), "ok api\n");
    assert!(!out.path().join("b.conf").exists());
}

#[test]
fn test_prepare_work_dir_ignoring_missing() {
    let temp = fixture();
    let out = tempdir().unwrap();
    let request = ResolveRequest::new("api", "prod")
        .with_variable("template_type", "broken")
        .require_all_replaced(false);

    prepare_work_dir(&resolver(&temp), &request, Some(out.path())).unwrap();
    assert_eq!(
        fs::read_to_string(out.path().join("b.conf")).unwrap(),
        "{{undefined}}\nline two {{also_missing}}\n"
    );
}
