//! Resolver services.
//!
//! A resolver is a constructed service whose methods implement the query and
//! mutation fields declared on it. The engine delivers named arguments; the
//! schema builder reorders them so methods receive them positionally.

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

/// Errors raised by resolver methods while a query executes.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Unknown resolver method '{0}'")]
    UnknownMethod(String),

    #[error("Invalid argument at position {index}: {source}")]
    InvalidArgument {
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize result: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("{0}")]
    Failed(String),
}

impl ResolveError {
    pub fn msg(message: impl ToString) -> Self {
        Self::Failed(message.to_string())
    }
}

/// Positional arguments passed to a resolver method.
///
/// Slots with no declared argument, or arguments the caller omitted, hold
/// `Value::Null`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments(Vec<Value>);

impl Arguments {
    pub fn new(values: Vec<Value>) -> Self {
        Self(values)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Raw value at `index`; `Null` when out of range.
    pub fn value(&self, index: usize) -> &Value {
        self.0.get(index).unwrap_or(&Value::Null)
    }

    /// Deserializes the argument at `index`.
    pub fn get<T: DeserializeOwned>(&self, index: usize) -> Result<T, ResolveError> {
        serde_json::from_value(self.value(index).clone())
            .map_err(|source| ResolveError::InvalidArgument { index, source })
    }

    pub fn into_inner(self) -> Vec<Value> {
        self.0
    }
}

/// A resolver service bound to a registry entry.
#[async_trait]
pub trait Resolver: Send + Sync + 'static {
    /// Invokes `method` with positional `args`.
    async fn call(&self, method: &str, args: Arguments) -> Result<Value, ResolveError>;
}

/// Serializes a method result.
pub fn to_value<T: Serialize>(value: &T) -> Result<Value, ResolveError> {
    serde_json::to_value(value).map_err(ResolveError::Serialize)
}
