//! Runtime selection of script generators by dialect name.
//!
//! Dialects are registered as factory functions under one or more names.
//! Adding a dialect means writing a [`SchemaGenerator`] and registering its
//! factory; the classifier is unaffected.

use std::collections::HashMap;

use metaddl_core::{MetaddlError, MetaddlResult};

use crate::mysql::MySqlGenerator;
use crate::postgres::PostgresGenerator;
use crate::schema_editor::SchemaGenerator;

/// Creates a fresh generator for one run.
pub type GeneratorFactory = fn() -> Box<dyn SchemaGenerator>;

fn make_postgres() -> Box<dyn SchemaGenerator> {
    Box::new(PostgresGenerator::new())
}

fn make_mysql() -> Box<dyn SchemaGenerator> {
    Box::new(MySqlGenerator::new())
}

/// Maps dialect names to generator factories.
///
/// Names are case-insensitive and surrounding whitespace is ignored.
///
/// # Examples
///
/// ```
/// use metaddl_migrations::DialectRegistry;
///
/// let registry = DialectRegistry::builtin();
/// let generator = registry.create("PostgreSQL").unwrap();
/// assert_eq!(generator.name(), "postgres");
/// assert!(registry.create("oracle").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct DialectRegistry {
    factories: HashMap<String, GeneratorFactory>,
}

impl DialectRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Creates a registry holding the bundled dialects.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register("postgres", make_postgres);
        registry.register("postgresql", make_postgres);
        registry.register("metaddl.dialect.postgres", make_postgres);
        registry.register("mysql", make_mysql);
        registry.register("metaddl.dialect.mysql", make_mysql);
        registry
    }

    /// Registers a factory under `name`, replacing any previous one.
    pub fn register(&mut self, name: &str, factory: GeneratorFactory) {
        self.factories.insert(normalize(name), factory);
    }

    /// Returns `true` if `name` resolves to a dialect.
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(&normalize(name))
    }

    /// Creates a fresh generator for `name`.
    ///
    /// # Errors
    ///
    /// Returns [`MetaddlError::UnknownDialect`] if no factory is registered.
    pub fn create(&self, name: &str) -> MetaddlResult<Box<dyn SchemaGenerator>> {
        let factory = self
            .factories
            .get(&normalize(name))
            .ok_or_else(|| MetaddlError::UnknownDialect(name.to_string()))?;
        tracing::debug!(dialect = name, "resolved dialect");
        Ok(factory())
    }

    /// Returns the registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for DialectRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}
