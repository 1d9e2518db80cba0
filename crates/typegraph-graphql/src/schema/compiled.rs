use std::fmt;

use async_graphql::dynamic::Schema;

/// An executable schema produced by one build.
///
/// Never mutated after construction. Cloning shares the underlying engine
/// schema, so a compiled schema can serve any number of sessions and
/// concurrent executions.
#[derive(Clone)]
pub struct CompiledSchema {
    schema: Schema,
    query_fields: Vec<String>,
    mutation_fields: Vec<String>,
    type_names: Vec<String>,
}

impl CompiledSchema {
    pub(crate) fn new(
        schema: Schema,
        query_fields: Vec<String>,
        mutation_fields: Vec<String>,
        type_names: Vec<String>,
    ) -> Self {
        Self {
            schema,
            query_fields,
            mutation_fields,
            type_names,
        }
    }

    /// The engine schema.
    pub fn engine(&self) -> &Schema {
        &self.schema
    }

    /// Schema definition language rendering.
    pub fn sdl(&self) -> String {
        self.schema.sdl()
    }

    /// Query root fields, excluding the placeholder.
    pub fn query_fields(&self) -> &[String] {
        &self.query_fields
    }

    pub fn mutation_fields(&self) -> &[String] {
        &self.mutation_fields
    }

    /// Compiled composite type names, outputs first.
    pub fn type_names(&self) -> &[String] {
        &self.type_names
    }
}

impl fmt::Debug for CompiledSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledSchema")
            .field("query_fields", &self.query_fields)
            .field("mutation_fields", &self.mutation_fields)
            .field("type_names", &self.type_names)
            .finish_non_exhaustive()
    }
}
