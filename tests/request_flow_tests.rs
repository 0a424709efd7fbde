//! Request file → plan → rendered output directory
//!
//! Exercises the same path the `run` subcommand takes, in dry-run mode.

use std::fs;

use dcr_assistant::output::write_scripts;
use dcr_assistant::{resolve, DeploymentRequest, DirectoryCatalog, ScriptRenderer};

#[test]
fn test_packaged_add_template_request_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let templates = dir.path().join("templates");
    let out = dir.path().join("out");
    fs::create_dir_all(&templates).unwrap();
    fs::write(
        templates.join("provider_add_template.sql"),
        "!set variable_substitution=true;\n\
         call dcr_demo_app.admin.add_template('NEW_TEMPLATE_NAME', $$NEW_TEMPLATE_TEXT$$, NEW_TEMPLATE_DIMENSIONS); -- SNOWCAT2\n\
         grant usage on application dcr_demo_app to account SNOWCAT;\n",
    )
    .unwrap();

    let request_path = dir.path().join("request.json");
    let json = format!(
        r#"{{
            "kind": "add_template",
            "version": "6.0 Native App",
            "provider_account": "abc123.west-2",
            "consumer_account": "xyz789",
            "abbreviation": "acme",
            "template": {{ "name": "overlap", "text": "select count(*) from t" }},
            "templates_dir": {:?},
            "output_dir": {:?},
            "include_comments": false,
            "dry_run": true
        }}"#,
        templates, out
    );
    fs::write(&request_path, json).unwrap();

    let request = DeploymentRequest::load_from_file(&request_path).unwrap();
    request.validate().unwrap();

    let plan = resolve(&request.scenario, &DirectoryCatalog::new(&request.templates_dir)).unwrap();
    assert_eq!(plan.steps().len(), 1);

    let outcome = ScriptRenderer::new(&request.templates_dir).render(&plan);
    let scripts = outcome.ensure_success().unwrap();
    let written = write_scripts(&request.output_dir, scripts.select(request.include_comments)).unwrap();
    assert_eq!(written.len(), 1);

    let text = fs::read_to_string(out.join("provider_add_template.sql")).unwrap();
    assert_eq!(
        text,
        "call dcr_acme_app.admin.add_template('overlap', $$select count(*) from t$$, ''); \n\
         grant usage on application dcr_acme_app to account XYZ789;\n"
    );
}

#[test]
fn test_saved_request_round_trips_through_cli_shape() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("saved.json");

    let mut request = DeploymentRequest::default();
    request.scenario.provider_account = "abc123".to_string();
    request.scenario.consumer_account = "xyz789".to_string();
    request.dry_run = true;
    request.save_to_file(&path).unwrap();

    let loaded = DeploymentRequest::load_from_file(&path).unwrap();
    assert!(loaded.validate().is_ok());
    assert_eq!(loaded, request);
}
