//! # typegraph-graphql
//!
//! Compiles typegraph declarations into an executable GraphQL schema and
//! runs query documents against it.
//!
//! The schema is built at runtime with async-graphql's dynamic schema API
//! from the metadata collected in a [`MetadataRegistry`]. Resolver methods
//! back the Query and Mutation root fields; output types resolve their
//! fields from the values resolvers return.
//!
//! ## Usage
//!
//! ```ignore
//! let session = build_schema(&registry, &["UserResolver"], BuildConfig::default())?;
//! let data = session
//!     .execute("query { user(id: $id) { name } }", Some(&json!({"id": 1})))
//!     .await?;
//! ```
//!
//! ## Configuration
//!
//! Add to `typegraph.toml` and load it as a [`TypegraphConfig`]:
//!
//! ```toml
//! [schema]
//! query_root = "RootQuery"
//! mutation_root = "RootMutation"
//! max_depth = 15
//! max_complexity = 500
//! introspection = true
//! ```
//!
//! ## Modules
//!
//! - [`config`] - Build options
//! - [`schema`] - Schema compilation
//! - [`session`] - Query execution
//! - [`variables`] - Variable substitution
//! - [`error`] - Error types for building and execution
//!
//! [`MetadataRegistry`]: typegraph_core::MetadataRegistry

pub mod config;
pub mod error;
pub mod schema;
pub mod session;
pub mod variables;

mod value;

// Re-export main types
pub use config::{BuildConfig, TypegraphConfig};
pub use error::{BuildError, SessionError};
pub use schema::{CompiledSchema, PLACEHOLDER_FIELD, SchemaBuilder};
pub use session::{QuerySession, build_schema};
