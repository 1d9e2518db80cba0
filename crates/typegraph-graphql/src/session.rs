//! Query sessions.

use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use typegraph_core::MetadataRegistry;

use crate::config::BuildConfig;
use crate::error::{BuildError, SessionError};
use crate::schema::{CompiledSchema, SchemaBuilder};
use crate::variables::substitute;

/// Runs query documents against a compiled schema.
///
/// Sessions are cheap to clone and share the compiled schema; a failed
/// execution leaves the session usable.
#[derive(Debug, Clone)]
pub struct QuerySession {
    schema: CompiledSchema,
}

impl QuerySession {
    pub fn new(schema: CompiledSchema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &CompiledSchema {
        &self.schema
    }

    /// Executes `document` after substituting `variables`.
    ///
    /// Returns the engine's data payload. When the engine reports any error
    /// the partial data is discarded and the messages are returned together.
    ///
    /// # Errors
    ///
    /// - [`SessionError::Variables`] if `variables` is not an object.
    /// - [`SessionError::Execution`] if the engine reports errors.
    /// - [`SessionError::Decode`] if the data cannot be represented as JSON.
    pub async fn execute(
        &self,
        document: &str,
        variables: Option<&serde_json::Value>,
    ) -> Result<serde_json::Value, SessionError> {
        let document = match variables {
            Some(variables) => substitute(document, variables)?,
            None => document.to_string(),
        };

        debug!(document = %document, "Executing query document");
        let response = self.schema.engine().execute(document.as_str()).await;

        if !response.errors.is_empty() {
            warn!(errors = response.errors.len(), "Query execution reported errors");
            return Err(SessionError::Execution {
                messages: response.errors.into_iter().map(|e| e.message).collect(),
            });
        }

        Ok(response.data.into_json()?)
    }

    /// Executes `document` and deserializes the data payload into `T`.
    ///
    /// # Errors
    ///
    /// As [`execute`](Self::execute), plus [`SessionError::Decode`] if the
    /// payload does not match `T`.
    pub async fn execute_as<T: DeserializeOwned>(
        &self,
        document: &str,
        variables: Option<&serde_json::Value>,
    ) -> Result<T, SessionError> {
        let data = self.execute(document, variables).await?;
        Ok(serde_json::from_value(data)?)
    }
}

/// Builds a schema for `resolvers` and wraps it in a session.
///
/// # Errors
///
/// See [`SchemaBuilder::build`].
pub fn build_schema(
    registry: &MetadataRegistry,
    resolvers: &[&str],
    config: BuildConfig,
) -> Result<QuerySession, BuildError> {
    let schema = SchemaBuilder::new(registry, config).build(resolvers)?;
    Ok(QuerySession::new(schema))
}
