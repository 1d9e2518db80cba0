//! Schema build configuration.
//!
//! Configuration can be specified in `typegraph.toml` under the `[schema]`
//! section, which deserializes into [`TypegraphConfig`].
//!
//! # Example Configuration
//!
//! ```toml
//! [schema]
//! query_root = "RootQuery"
//! mutation_root = "RootMutation"
//! placeholder_query = true
//! strict_argument_indices = false
//! max_depth = 15
//! max_complexity = 500
//! introspection = true
//! ```

use serde::{Deserialize, Serialize};

use crate::error::BuildError;

/// Top-level layout of a `typegraph.toml` file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypegraphConfig {
    /// The `[schema]` table. Defaults apply when the table is absent.
    #[serde(default)]
    pub schema: BuildConfig,
}

/// Options for [`SchemaBuilder`](crate::SchemaBuilder).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Name of the Query root object.
    /// Default: "RootQuery"
    #[serde(default = "default_query_root")]
    pub query_root: String,

    /// Name of the Mutation root object.
    /// Default: "RootMutation"
    #[serde(default = "default_mutation_root")]
    pub mutation_root: String,

    /// Substitute a placeholder field when no query field is declared.
    /// The engine rejects an empty Query root; when disabled, such a build
    /// fails with `NoQueryFieldsFound` instead.
    /// Default: true
    #[serde(default = "default_placeholder_query")]
    pub placeholder_query: bool,

    /// Reject argument lists with a missing index.
    /// A gap means a method parameter has no declared argument; it then
    /// receives null.
    /// Default: false
    #[serde(default)]
    pub strict_argument_indices: bool,

    /// Maximum query depth allowed.
    /// Default: 15
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Maximum query complexity allowed.
    /// Default: 500
    #[serde(default = "default_max_complexity")]
    pub max_complexity: usize,

    /// Enable introspection queries.
    /// Default: true
    #[serde(default = "default_introspection")]
    pub introspection: bool,
}

fn default_query_root() -> String {
    "RootQuery".to_string()
}

fn default_mutation_root() -> String {
    "RootMutation".to_string()
}

fn default_placeholder_query() -> bool {
    true
}

fn default_max_depth() -> usize {
    15
}

fn default_max_complexity() -> usize {
    500
}

fn default_introspection() -> bool {
    true
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            query_root: default_query_root(),
            mutation_root: default_mutation_root(),
            placeholder_query: default_placeholder_query(),
            strict_argument_indices: false,
            max_depth: default_max_depth(),
            max_complexity: default_max_complexity(),
            introspection: default_introspection(),
        }
    }
}

impl BuildConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Config`] if configuration values are invalid.
    pub fn validate(&self) -> Result<(), BuildError> {
        if self.query_root.is_empty() {
            return Err(BuildError::Config("schema.query_root must not be empty".into()));
        }
        if self.mutation_root.is_empty() {
            return Err(BuildError::Config("schema.mutation_root must not be empty".into()));
        }
        if self.query_root == self.mutation_root {
            return Err(BuildError::Config(
                "schema.query_root and schema.mutation_root must differ".into(),
            ));
        }
        if self.max_depth == 0 {
            return Err(BuildError::Config("schema.max_depth must be > 0".into()));
        }
        if self.max_complexity == 0 {
            return Err(BuildError::Config("schema.max_complexity must be > 0".into()));
        }
        Ok(())
    }
}
