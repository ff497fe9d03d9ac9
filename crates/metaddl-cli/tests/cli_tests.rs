//! End-to-end tests for the metaddl CLI.
//!
//! Each test builds the full command registry, parses an argument vector the
//! way `main` does and executes it against files in a temporary directory.

use std::path::{Path, PathBuf};

use metaddl_cli::commands::check::check_files;
use metaddl_cli::{load_settings, register_builtin_commands, CommandRegistry};
use metaddl_core::MetaddlResult;
use metaddl_migrations::ChangeSet;

const SHOP_V1: &str = "
TABLE customer {
    COLUMN id BIGINT PRIMARY_KEY
    COLUMN name VARCHAR(50) MANDATORY
}
";

const SHOP_V2: &str = "
TABLE customer {
    COLUMN id BIGINT PRIMARY_KEY
    COLUMN name VARCHAR(50) MANDATORY
    COLUMN email VARCHAR(120)
}

TABLE purchase {
    COLUMN id BIGINT PRIMARY_KEY
    COLUMN customer_id BIGINT MANDATORY FOREIGN_KEY(customer)
}

VIEW v_customer FROM customer {
    COLUMN id = customer.id
    COLUMN email = customer.email
}
";

fn registry() -> CommandRegistry {
    let mut registry = CommandRegistry::new();
    register_builtin_commands(&mut registry);
    registry
}

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

async fn invoke(args: &[&str]) -> MetaddlResult<()> {
    let registry = registry();
    let matches = registry.build_cli().try_get_matches_from(args).unwrap();
    let settings = load_settings(&matches)?;
    registry.execute(&matches, &settings).await
}

fn s(path: &Path) -> &str {
    path.to_str().unwrap()
}

// ============================================================================
// 1. diff
// ============================================================================

#[tokio::test]
async fn test_diff_writes_postgres_script() {
    let dir = tempfile::tempdir().unwrap();
    let from = write(dir.path(), "v1.meta", SHOP_V1);
    let to = write(dir.path(), "v2.meta", SHOP_V2);
    let out = dir.path().join("002.sql");

    invoke(&[
        "metaddl",
        "diff",
        "--from",
        s(&from),
        "--to",
        s(&to),
        "--schema-version",
        "2",
        "-o",
        s(&out),
    ])
    .await
    .unwrap();

    let script = std::fs::read_to_string(&out).unwrap();
    assert!(script.contains("-- dialect: postgres"));
    assert!(script.contains("-- schema version: 2"));
    assert!(script.contains("ALTER TABLE customer ADD COLUMN email varchar(120);"));
    assert!(script.contains("CREATE TABLE purchase ("));
    assert!(script.contains("CREATE VIEW v_customer AS"));
    assert!(script.contains("UPDATE schema_version SET version = 2;"));
    assert!(script.trim_end().ends_with("COMMIT;"));
}

#[tokio::test]
async fn test_diff_initial_migration_mysql() {
    let dir = tempfile::tempdir().unwrap();
    let to = write(dir.path(), "v1.meta", SHOP_V1);
    let out = dir.path().join("001.sql");

    invoke(&[
        "metaddl",
        "diff",
        "--to",
        s(&to),
        "--dialect",
        "MySQL",
        "--schema-version",
        "1",
        "--output",
        s(&out),
    ])
    .await
    .unwrap();

    let script = std::fs::read_to_string(&out).unwrap();
    assert!(script.contains("-- dialect: mysql"));
    assert!(script.contains("CREATE TABLE `customer` ("));
    assert!(script.contains("START TRANSACTION;"));
}

#[tokio::test]
async fn test_diff_json_format() {
    let dir = tempfile::tempdir().unwrap();
    let from = write(dir.path(), "v1.meta", SHOP_V1);
    let to = write(dir.path(), "v2.meta", SHOP_V2);
    let out = dir.path().join("changes.json");

    invoke(&[
        "metaddl",
        "diff",
        "--from",
        s(&from),
        "--to",
        s(&to),
        "--format",
        "json",
        "-o",
        s(&out),
    ])
    .await
    .unwrap();

    let json = std::fs::read_to_string(&out).unwrap();
    let changes = ChangeSet::from_json(&json).unwrap();
    let names: Vec<&str> = changes.iter().map(|c| c.name()).collect();
    assert_eq!(names, vec!["customer", "purchase", "v_customer"]);
}

#[tokio::test]
async fn test_diff_without_version_is_configuration_error() {
    let dir = tempfile::tempdir().unwrap();
    let to = write(dir.path(), "v1.meta", SHOP_V1);

    let err = invoke(&["metaddl", "diff", "--to", s(&to)])
        .await
        .unwrap_err();
    assert_eq!(err.exit_code(), 78);
}

#[tokio::test]
async fn test_diff_parse_error_exit_code() {
    let dir = tempfile::tempdir().unwrap();
    let to = write(dir.path(), "broken.meta", "TABLE customer {\n    COLUMN id\n");

    let err = invoke(&["metaddl", "diff", "--to", s(&to), "--schema-version", "1"])
        .await
        .unwrap_err();
    assert_eq!(err.exit_code(), 65);
}

// ============================================================================
// 2. Settings files
// ============================================================================

#[tokio::test]
async fn test_config_file_supplies_version_table() {
    let dir = tempfile::tempdir().unwrap();
    let to = write(dir.path(), "v1.meta", SHOP_V1);
    let config = write(
        dir.path(),
        "metaddl.toml",
        "schema_version = 7\nversion_table = \"app_meta\"\nversion_column = \"rev\"\nensure_version_table = true\n",
    );
    let out = dir.path().join("out.sql");

    invoke(&[
        "metaddl",
        "--config",
        s(&config),
        "diff",
        "--to",
        s(&to),
        "-o",
        s(&out),
    ])
    .await
    .unwrap();

    let script = std::fs::read_to_string(&out).unwrap();
    assert!(script.contains("-- schema version: 7"));
    assert!(script.contains("CREATE TABLE IF NOT EXISTS app_meta (rev integer NOT NULL);"));
    assert!(script.contains("UPDATE app_meta SET rev = 7;"));
}

#[tokio::test]
async fn test_json_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let to = write(dir.path(), "v1.meta", SHOP_V1);
    let config = write(
        dir.path(),
        "metaddl.json",
        r#"{"dialect": "mysql", "transactional": false}"#,
    );
    let out = dir.path().join("out.sql");

    invoke(&[
        "metaddl",
        "--config",
        s(&config),
        "diff",
        "--to",
        s(&to),
        "--schema-version",
        "1",
        "-o",
        s(&out),
    ])
    .await
    .unwrap();

    let script = std::fs::read_to_string(&out).unwrap();
    assert!(script.contains("-- dialect: mysql"));
    assert!(!script.contains("START TRANSACTION"));
}

// ============================================================================
// 3. check and dialects
// ============================================================================

#[tokio::test]
async fn test_check_reports_counts() {
    let dir = tempfile::tempdir().unwrap();
    let v1 = write(dir.path(), "v1.meta", SHOP_V1);
    let v2 = write(dir.path(), "v2.meta", SHOP_V2);

    let reports = check_files(&[v1.clone(), v2]).await.unwrap();
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].path, v1);
    assert_eq!((reports[0].tables, reports[0].views), (1, 0));
    assert_eq!((reports[1].tables, reports[1].views), (2, 1));

    invoke(&["metaddl", "check", "--json", s(&v1)]).await.unwrap();
}

#[tokio::test]
async fn test_check_rejects_unresolved_reference() {
    let dir = tempfile::tempdir().unwrap();
    let bad = write(
        dir.path(),
        "bad.meta",
        "TABLE purchase {\n    COLUMN id BIGINT PRIMARY_KEY\n    COLUMN customer_id BIGINT FOREIGN_KEY(customer)\n}\n",
    );

    let err = invoke(&["metaddl", "check", s(&bad)]).await.unwrap_err();
    assert_eq!(err.exit_code(), 65);
}

#[tokio::test]
async fn test_dialects_command() {
    invoke(&["metaddl", "dialects"]).await.unwrap();
}

#[test]
fn test_unknown_subcommand_rejected() {
    let result = registry()
        .build_cli()
        .try_get_matches_from(["metaddl", "migrate"]);
    assert!(result.is_err());
}
