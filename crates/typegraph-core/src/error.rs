use thiserror::Error;

/// Contract violations raised while registering metadata, constructing
/// resolver services or compiling a schema.
///
/// None of these are recoverable locally: they describe a programming-time
/// mistake in the declarations and are meant to abort application startup.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid name for arg {index} at {owner} > {method}")]
    InvalidArgName {
        owner: String,
        method: String,
        index: usize,
    },

    #[error(
        "[{caller}]: Need to define a return type for primitive array; e.g. returns(|| DeclaredType::list_of(\"String\"))"
    )]
    ArrayNoReturnType { caller: String },

    #[error("[{caller}]: Opaque or unknown type is not allowed without an explicit field type")]
    ReturnIsUnknown { caller: String },

    #[error("[{caller}]: Need to define a return type for method")]
    MethodNoReturnType { caller: String },

    #[error("[{caller}]: No parameter type found for argument")]
    MethodNoArguments { caller: String },

    #[error("[{caller}]: {member_kind} can't be declared as {field_kind}. Must be 'method'")]
    ResolverFieldMustBeMethod {
        caller: String,
        member_kind: String,
        field_kind: String,
    },

    #[error(
        "[{caller}]: field and {member_kind} type mismatch. {member_kind} returns '{introspected}' but field returns '{declared}'"
    )]
    TypeMismatch {
        caller: String,
        member_kind: String,
        introspected: String,
        declared: String,
    },

    #[error("{name}: entry is already bound to a resolver")]
    TypeResolverConflict { name: String },

    #[error("{name}: entry is already declared as a type")]
    ResolverTypeConflict { name: String },

    #[error("{name}: type already declared")]
    TypeAlreadyDeclared { name: String },

    #[error("{name}: resolver already bound")]
    ResolverAlreadyBound { name: String },

    #[error("Input type '{name}' used as return")]
    InputAsOutput { name: String },

    #[error("Output type '{name}' used as input")]
    OutputAsInput { name: String },

    #[error("Unhandled scalar type - {0}")]
    UnhandledScalar(String),

    #[error("No query fields found")]
    NoQueryFieldsFound,

    #[error("[{name}]: does not declare any field; but is referenced by a resolver")]
    TypeNoFieldDecorator { name: String },

    #[error("No resolver bound to '{owner}' for {kind} '{field}'")]
    ResolverNoDecorator {
        owner: String,
        kind: String,
        field: String,
    },

    #[error("{owner} > {method}: no argument declared at index {index}")]
    ArgumentIndexGap {
        owner: String,
        method: String,
        index: usize,
    },

    #[error("Dependency cycle detected: {}", path.join(" -> "))]
    DependencyCycle { path: Vec<String> },

    #[error("No provider registered for {type_name}")]
    MissingProvider { type_name: String },

    #[error("Provider for {type_name} failed: {message}")]
    ProviderFailed { type_name: String, message: String },
}

impl Error {
    /// Builds the `owner > member` caller label used in error messages.
    pub fn caller(owner: &str, member: &str) -> String {
        format!("{owner} > {member}")
    }

    /// Create a new InputAsOutput error
    pub fn input_as_output(name: impl Into<String>) -> Self {
        Self::InputAsOutput { name: name.into() }
    }

    /// Create a new OutputAsInput error
    pub fn output_as_input(name: impl Into<String>) -> Self {
        Self::OutputAsInput { name: name.into() }
    }

    /// Create a new TypeNoFieldDecorator error
    pub fn type_no_field(name: impl Into<String>) -> Self {
        Self::TypeNoFieldDecorator { name: name.into() }
    }

    /// Create a new ProviderFailed error
    pub fn provider_failed(type_name: impl Into<String>, message: impl ToString) -> Self {
        Self::ProviderFailed {
            type_name: type_name.into(),
            message: message.to_string(),
        }
    }

    /// Internal-consistency violations: the scalar catalog and the builder
    /// disagree. Never caused by user declarations.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::UnhandledScalar(_))
    }

    /// Returns the stable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidArgName { .. } => "INVALID_ARG_NAME",
            Self::ArrayNoReturnType { .. } => "ARRAY_NO_RETURN_TYPE",
            Self::ReturnIsUnknown { .. } => "RETURN_IS_UNKNOWN",
            Self::MethodNoReturnType { .. } => "METHOD_NO_RETURN_TYPE",
            Self::MethodNoArguments { .. } => "METHOD_NO_ARGUMENTS",
            Self::ResolverFieldMustBeMethod { .. } => "RESOLVER_FIELD_MUST_BE_METHOD",
            Self::TypeMismatch { .. } => "TYPE_MISMATCH",
            Self::TypeResolverConflict { .. } => "TYPE_RESOLVER_CONFLICT",
            Self::ResolverTypeConflict { .. } => "RESOLVER_TYPE_CONFLICT",
            Self::TypeAlreadyDeclared { .. } => "TYPE_ALREADY_DECLARED",
            Self::ResolverAlreadyBound { .. } => "RESOLVER_ALREADY_BOUND",
            Self::InputAsOutput { .. } => "INPUT_AS_OUTPUT",
            Self::OutputAsInput { .. } => "OUTPUT_AS_INPUT",
            Self::UnhandledScalar(_) => "UNHANDLED_SCALAR",
            Self::NoQueryFieldsFound => "NO_QUERY_FIELDS_FOUND",
            Self::TypeNoFieldDecorator { .. } => "TYPE_NO_FIELD_DECORATOR",
            Self::ResolverNoDecorator { .. } => "RESOLVER_NO_DECORATOR",
            Self::ArgumentIndexGap { .. } => "ARGUMENT_INDEX_GAP",
            Self::DependencyCycle { .. } => "DEPENDENCY_CYCLE",
            Self::MissingProvider { .. } => "MISSING_PROVIDER",
            Self::ProviderFailed { .. } => "PROVIDER_FAILED",
        }
    }
}

/// Result type for registration, injection and build operations.
pub type Result<T> = std::result::Result<T, Error>;
