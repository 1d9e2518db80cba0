//! Metadata records collected at registration time.

use std::fmt;
use std::sync::Arc;

/// How a field participates in the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Member of an output or input type.
    Plain,
    /// Entry on the Query root, backed by a resolver method.
    Query,
    /// Entry on the Mutation root, backed by a resolver method.
    Mutation,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Plain => "field",
            Self::Query => "query",
            Self::Mutation => "mutation",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a member holds a value or computes one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    Property,
    Method,
}

impl MemberKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Property => "Property",
            Self::Method => "Method",
        }
    }
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Called with the finished metadata once a field is registered.
pub type RegisteredCallback = Arc<dyn Fn(&FieldMetadata) + Send + Sync>;

/// Optional per-field settings.
#[derive(Clone, Default)]
pub struct FieldOptions {
    pub nullable: Option<bool>,
    /// Exposed as the field description.
    pub comment: Option<String>,
    /// Default for input fields, as a JSON literal.
    pub default_value: Option<String>,
    pub complexity: Option<usize>,
    pub on_registered: Option<RegisteredCallback>,
}

impl FieldOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = Some(nullable);
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn with_complexity(mut self, complexity: usize) -> Self {
        self.complexity = Some(complexity);
        self
    }

    pub fn on_registered(
        mut self,
        callback: impl Fn(&FieldMetadata) + Send + Sync + 'static,
    ) -> Self {
        self.on_registered = Some(Arc::new(callback));
        self
    }

    /// Whether the compiled type drops its non-null wrapper.
    pub fn is_nullable(&self) -> bool {
        self.nullable.unwrap_or(false)
    }
}

impl fmt::Debug for FieldOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldOptions")
            .field("nullable", &self.nullable)
            .field("comment", &self.comment)
            .field("default_value", &self.default_value)
            .field("complexity", &self.complexity)
            .field("on_registered", &self.on_registered.is_some())
            .finish()
    }
}

/// A registered field of a type or resolver.
#[derive(Debug, Clone)]
pub struct FieldMetadata {
    /// Declaration name of the owning type.
    pub owner: String,
    pub name: String,
    /// Canonical scalar name, or the referenced type's declaration name.
    pub type_name: String,
    pub is_array: bool,
    pub is_method: bool,
    pub is_custom_type: bool,
    pub has_resolver_binding: bool,
    pub kind: FieldKind,
    pub options: FieldOptions,
}

impl FieldMetadata {
    /// Type as shown in diagnostics, e.g. `String[]`.
    pub fn display_type(&self) -> String {
        if self.is_array {
            format!("{}[]", self.type_name)
        } else {
            self.type_name.clone()
        }
    }
}

/// A named, positional argument of a resolver method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgMetadata {
    pub owner: String,
    pub method: String,
    pub name: String,
    pub type_name: String,
    pub is_custom_type: bool,
    pub index: usize,
}

/// Output or input role of a declared type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRole {
    pub name: String,
    pub is_input: bool,
}

impl TypeRole {
    pub fn output(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_input: false,
        }
    }

    pub fn input(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_input: true,
        }
    }
}

/// Type reference produced by an explicit type provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclaredType {
    Named(String),
    /// The list marker wrapped around an element type.
    List(String),
}

impl DeclaredType {
    pub fn named(name: impl AsRef<str>) -> Self {
        Self::Named(name.as_ref().to_string())
    }

    pub fn list_of(name: impl AsRef<str>) -> Self {
        Self::List(name.as_ref().to_string())
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }

    /// Element type name with the list marker removed.
    pub fn element(&self) -> &str {
        match self {
            Self::Named(name) | Self::List(name) => name,
        }
    }
}
