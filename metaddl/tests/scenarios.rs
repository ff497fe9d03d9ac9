//! Tests through the umbrella crate.
//!
//! These exercise the pipeline (parse, diff, render) the way a library user
//! reaches it via `metaddl::prelude` and the re-exported sub-crates:
//! - Version framing of a rendered script
//! - Reproducible output for the same inputs
//! - Parallel renders of one change set with per-thread generators

use metaddl::prelude::*;

const SINGLE: &str = "TABLE T { COLUMN id BIGINT PRIMARY_KEY }";

const NAMED_50: &str = "
TABLE T {
    COLUMN id BIGINT PRIMARY_KEY
    COLUMN name VARCHAR(50)
}
";

const NAMED_100: &str = "
TABLE T {
    COLUMN id BIGINT PRIMARY_KEY
    COLUMN name VARCHAR(100)
}
";

// ============================================================================
// 1. Re-exported paths
// ============================================================================

#[test]
fn test_sub_crates_reachable() {
    let model = metaddl::schema::parse(SINGLE).unwrap();
    let text = metaddl::schema::writer::to_meta(&model);
    assert_eq!(metaddl::schema::parse(&text).unwrap(), model);

    let settings = metaddl::core::Settings::default();
    assert_eq!(settings.dialect, "postgres");
}

#[cfg(feature = "cli")]
#[test]
fn test_cli_registry_reachable() {
    let mut registry = metaddl::cli::CommandRegistry::new();
    metaddl::cli::register_builtin_commands(&mut registry);
    assert!(registry.get("diff").is_some());
}

// ============================================================================
// 2. Version framing
// ============================================================================

#[test]
fn test_version_number_frames_script() {
    let changes = diff(&SchemaModel::new(), &parse(SINGLE).unwrap());
    let script = generate(&changes, &mut PostgresGenerator::new(), 2).unwrap();

    assert!(script.contains("-- schema version: 2\n"));
    let lines: Vec<&str> = script.lines().collect();
    let update = lines
        .iter()
        .rposition(|l| l.starts_with("UPDATE "))
        .unwrap();
    assert_eq!(lines[update], "UPDATE schema_version SET version = 2;");
    assert_eq!(lines[update + 1..], ["COMMIT;"]);
}

// ============================================================================
// 3. Reproducibility
// ============================================================================

#[test]
fn test_same_inputs_same_script() {
    let from = parse(NAMED_50).unwrap();
    let to = parse(NAMED_100).unwrap();
    let mut generator = PostgresGenerator::new();

    let first = generate(&diff(&from, &to), &mut generator, 4).unwrap();
    let second = generate(&diff(&from, &to), &mut generator, 4).unwrap();
    assert_eq!(first, second);
}

// ============================================================================
// 4. Parallel runs
// ============================================================================

#[test]
fn test_parallel_runs_with_own_generators() {
    let to = parse(
        "
TABLE a {
    COLUMN id BIGINT PRIMARY_KEY
    COLUMN code CHAR(3)
    KEY a_code_uq UNIQUE (code)
}

TABLE b {
    COLUMN id BIGINT PRIMARY_KEY
    COLUMN a_id BIGINT FOREIGN_KEY(a)
}
",
    )
    .unwrap();
    let changes = diff(&SchemaModel::new(), &to);
    let registry = DialectRegistry::builtin();
    let expected: Vec<String> = ["postgres", "mysql"]
        .iter()
        .map(|d| generate(&changes, registry.create(d).unwrap().as_mut(), 1).unwrap())
        .collect();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let (changes, registry) = (&changes, &registry);
                let dialect = if i % 2 == 0 { "postgres" } else { "mysql" };
                scope.spawn(move || {
                    let mut generator = registry.create(dialect).unwrap();
                    (i, generate(changes, generator.as_mut(), 1).unwrap())
                })
            })
            .collect();
        for handle in handles {
            let (i, script) = handle.join().unwrap();
            assert_eq!(script, expected[i % 2]);
        }
    });
}
