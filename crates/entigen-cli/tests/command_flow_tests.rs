//! End-to-end command tests against a temporary project

use std::{fs, path::Path};

use entigen_cli::{
    commands::{Command, GenerateCommand, PlanCommand, TypesCommand, ValidateCommand},
    CliError, ProjectOptions,
};
use tempfile::TempDir;

const ORDER: &str = r#"
name: order
update_policy: both
fields:
  - name: Reference
    type: string
    required: true
    unique: true
  - name: Total
    type: decimal
    required: true
  - name: Tags
    type: "[]string"
  - name: CreatedAt
    type: timestamp
"#;

fn project(backend: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("entigen.toml"),
        format!(
            "module_root = \"github.com/acme/shop\"\nbackend = \"{}\"\noutput_dir = \"gen\"\n",
            backend
        ),
    )
    .unwrap();
    fs::write(dir.path().join("order.yaml"), ORDER).unwrap();
    dir
}

fn migrations(root: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(root.join("gen/migrations"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn test_generate_writes_every_artifact() {
    let dir = project("postgres");
    let command = GenerateCommand::new(dir.path().join("order.yaml"), ProjectOptions::new(dir.path()))
        .with_json(true);
    command.execute().await.unwrap();

    let gen = dir.path().join("gen");
    assert!(gen.join("internal/order/model.go").is_file());
    assert!(gen.join("internal/routes/order.go").is_file());
    assert!(gen.join("docs/order.md").is_file());
    assert_eq!(migrations(dir.path()).len(), 2);

    let leftovers: Vec<_> = fs::read_dir(&gen)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().starts_with(".entigen-staging-"))
        .collect();
    assert!(leftovers.is_empty());
}

#[tokio::test]
async fn test_dry_run_writes_nothing() {
    let dir = project("mongodb");
    let command = GenerateCommand::new(dir.path().join("order.yaml"), ProjectOptions::new(dir.path()))
        .with_dry_run(true)
        .with_json(true);
    command.execute().await.unwrap();
    assert!(!dir.path().join("gen").exists());
}

#[tokio::test]
async fn test_second_run_conflicts_without_force() {
    let dir = project("postgres");
    let entity = dir.path().join("order.yaml");
    GenerateCommand::new(&entity, ProjectOptions::new(dir.path()))
        .with_json(true)
        .execute()
        .await
        .unwrap();
    let model = dir.path().join("gen/internal/order/model.go");
    let before = fs::read_to_string(&model).unwrap();

    let err = GenerateCommand::new(&entity, ProjectOptions::new(dir.path()))
        .with_json(true)
        .execute()
        .await
        .unwrap_err();
    assert!(matches!(err, CliError::Conflict { .. }));
    assert_eq!(fs::read_to_string(&model).unwrap(), before);
}

#[tokio::test]
async fn test_forced_rerun_stamps_a_newer_migration() {
    let dir = project("postgres");
    let entity = dir.path().join("order.yaml");
    let forced = || ProjectOptions {
        force: true,
        ..ProjectOptions::new(dir.path())
    };

    GenerateCommand::new(&entity, forced())
        .with_json(true)
        .execute()
        .await
        .unwrap();
    GenerateCommand::new(&entity, forced())
        .with_json(true)
        .execute()
        .await
        .unwrap();

    let names = migrations(dir.path());
    assert_eq!(names.len(), 4);
    let first = &names[0][..14];
    let last = &names[3][..14];
    assert!(last > first, "{} should sort after {}", last, first);
}

#[tokio::test]
async fn test_mysql_native_lists_are_rejected_before_writing() {
    let dir = project("mysql");
    let err = GenerateCommand::new(dir.path().join("order.yaml"), ProjectOptions::new(dir.path()))
        .execute()
        .await
        .unwrap_err();
    assert!(matches!(err, CliError::Generation(_)));
    assert!(!dir.path().join("gen").exists());

    let comma_joined = ProjectOptions {
        list_encoding: Some("comma_joined".to_string()),
        ..ProjectOptions::new(dir.path())
    };
    let (spec, _) = ValidateCommand::new(dir.path().join("order.yaml"), comma_joined)
        .check()
        .unwrap();
    assert_eq!(spec.fields.len(), 4);
}

#[tokio::test]
async fn test_missing_module_root_is_config_error() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("order.yaml"), ORDER).unwrap();
    let err = PlanCommand::new(dir.path().join("order.yaml"), ProjectOptions::new(dir.path()))
        .execute()
        .await
        .unwrap_err();
    assert!(matches!(err, CliError::Config(_)));
}

#[test]
fn test_plan_matches_backend_layout() {
    let dir = project("mongodb");
    let plan = PlanCommand::new(dir.path().join("order.yaml"), ProjectOptions::new(dir.path()))
        .build_plan()
        .unwrap();
    assert_eq!(plan.len(), 8);
    assert!(plan.artifacts.iter().all(|a| !a.path.ends_with(".sql")));
    assert!(plan
        .artifacts
        .iter()
        .any(|a| a.path == "migrations/init_orders.js"));
}

#[test]
fn test_validate_warns_about_stray_templates() {
    let dir = project("postgres");
    let templates = dir.path().join("templates");
    fs::create_dir_all(&templates).unwrap();
    fs::write(templates.join("not-a-section.hbs"), "{{entity_name}}").unwrap();

    let options = ProjectOptions {
        templates_dir: Some(templates),
        ..ProjectOptions::new(dir.path())
    };
    let (_, warnings) = ValidateCommand::new(dir.path().join("order.yaml"), options)
        .check()
        .unwrap();
    assert!(warnings.iter().any(|w| w.contains("not-a-section.hbs")));
}

#[test]
fn test_types_follow_override() {
    let dir = project("postgres");
    let options = ProjectOptions {
        backend: Some("mysql".to_string()),
        ..ProjectOptions::new(dir.path())
    };
    let (table, _) = TypesCommand::new(options).table().unwrap();
    assert_eq!(table.backend().to_string(), "mysql");
}
