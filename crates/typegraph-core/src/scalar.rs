//! Scalar catalog.
//!
//! Maps canonical primitive type names to scalars and scalars to the
//! execution engine's built-in scalar names. Anything that is not in the
//! catalog is a composite (custom) type.

use std::fmt;

use crate::error::{Error, Result};

/// Built-in primitive types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scalar {
    String,
    /// Generic number. Ambiguous between integer and float; compiled as `Float`.
    Number,
    Boolean,
    Int,
    Float,
    /// Absence of a value. Compiled as a nullable `Boolean`.
    Void,
    /// Identifier alias. Compiled as `String`.
    Id,
}

impl Scalar {
    /// Every scalar, in catalog order.
    pub const ALL: [Scalar; 7] = [
        Scalar::String,
        Scalar::Number,
        Scalar::Boolean,
        Scalar::Int,
        Scalar::Float,
        Scalar::Void,
        Scalar::Id,
    ];

    /// Looks a canonical type name up in the catalog.
    ///
    /// Returns `None` for custom types.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "String" => Some(Self::String),
            "Number" => Some(Self::Number),
            "Bool" | "Boolean" => Some(Self::Boolean),
            "Int" => Some(Self::Int),
            "Float" => Some(Self::Float),
            "Void" => Some(Self::Void),
            "ID" => Some(Self::Id),
            _ => None,
        }
    }

    /// Canonical name, as stored in field and argument metadata.
    pub fn name(&self) -> &'static str {
        match self {
            Self::String => "String",
            Self::Number => "Number",
            Self::Boolean => "Boolean",
            Self::Int => "Int",
            Self::Float => "Float",
            Self::Void => "Void",
            Self::Id => "ID",
        }
    }

    /// Name of the engine scalar this primitive compiles to.
    pub fn engine_name(&self) -> &'static str {
        match self {
            Self::String | Self::Id => "String",
            Self::Int => "Int",
            Self::Number | Self::Float => "Float",
            Self::Boolean | Self::Void => "Boolean",
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl AsRef<str> for Scalar {
    fn as_ref(&self) -> &str {
        self.name()
    }
}

/// Classifies a type name: the canonical scalar name for primitives,
/// `None` for custom types.
pub fn canonical_name(name: &str) -> Option<&'static str> {
    Scalar::from_name(name).map(|s| s.name())
}

/// Maps a canonical scalar name to the engine scalar name.
///
/// # Errors
///
/// Returns [`Error::UnhandledScalar`] when `name` is not a catalog entry.
/// Metadata produced by the annotation processor never triggers this.
pub fn to_scalar(name: &str) -> Result<&'static str> {
    Scalar::from_name(name)
        .map(|s| s.engine_name())
        .ok_or_else(|| Error::UnhandledScalar(name.to_string()))
}
