//! Schema compilation.
//!
//! ## Components
//!
//! - [`SchemaBuilder`] - Compiles registry metadata for a set of resolvers
//! - [`CompiledSchema`] - The immutable result, shared by query sessions
//!
//! ## Build steps
//!
//! 1. Every query and mutation field of the named resolvers becomes a root
//!    field bound to the resolver instance
//! 2. Referenced output and input types are compiled once per build,
//!    enforcing their declared roles
//! 3. Named engine arguments are reordered into the method's positional order
//! 4. An empty Query root receives a placeholder field; an empty Mutation
//!    root is omitted

mod builder;
mod compiled;

pub use builder::{PLACEHOLDER_FIELD, SchemaBuilder};
pub use compiled::CompiledSchema;
