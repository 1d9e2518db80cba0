//! Registration surface.
//!
//! [`AnnotationProcessor`] validates and normalizes field, query, mutation
//! and argument declarations and writes the resulting metadata into a
//! [`MetadataRegistry`]. It is driven by an explicit startup routine that
//! enumerates the application's types and resolvers:
//!
//! ```ignore
//! let processor = AnnotationProcessor::new(introspector);
//! processor.declare_output_type(&mut registry, "User")?;
//! processor.declare_field(
//!     &mut registry,
//!     FieldDeclaration::property("User", "name").returns(|| DeclaredType::named("String")),
//! )?;
//! processor.declare_query(
//!     &mut registry,
//!     FieldDeclaration::method("Root", "getUser").returns(|| DeclaredType::named("User")),
//! )?;
//! processor.declare_arg(&mut registry, ArgDeclaration::new("Root", "getUser", 0).name("id"))?;
//! processor.declare_resolver::<Root>(&mut registry, &injector, "Root")?;
//! ```

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::injector::Injector;
use crate::introspect::{DeclarationSite, IntrospectedType, NoIntrospection, TypeIntrospector};
use crate::metadata::{
    ArgMetadata, DeclaredType, FieldKind, FieldMetadata, FieldOptions, MemberKind,
};
use crate::registry::MetadataRegistry;
use crate::resolver::Resolver;
use crate::scalar::{Scalar, canonical_name};

/// Zero-argument function yielding a field's declared type.
///
/// Evaluated during processing, so it may name types declared later.
#[derive(Clone)]
pub struct TypeProvider(Arc<dyn Fn() -> DeclaredType + Send + Sync>);

impl TypeProvider {
    pub fn new(provider: impl Fn() -> DeclaredType + Send + Sync + 'static) -> Self {
        Self(Arc::new(provider))
    }

    pub fn evaluate(&self) -> DeclaredType {
        (self.0)()
    }
}

impl fmt::Debug for TypeProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TypeProvider(..)")
    }
}

/// A field, query or mutation declaration awaiting processing.
///
/// `returns` and `options` are both optional, giving the four declaration
/// shapes: bare, type only, options only, type and options.
#[derive(Debug, Clone)]
pub struct FieldDeclaration {
    owner: String,
    member: String,
    member_kind: MemberKind,
    provider: Option<TypeProvider>,
    options: Option<FieldOptions>,
    introspected: Option<IntrospectedType>,
}

impl FieldDeclaration {
    fn new(owner: impl Into<String>, member: impl Into<String>, member_kind: MemberKind) -> Self {
        Self {
            owner: owner.into(),
            member: member.into(),
            member_kind,
            provider: None,
            options: None,
            introspected: None,
        }
    }

    /// A value-holding member.
    pub fn property(owner: impl Into<String>, member: impl Into<String>) -> Self {
        Self::new(owner, member, MemberKind::Property)
    }

    /// A method member.
    pub fn method(owner: impl Into<String>, member: impl Into<String>) -> Self {
        Self::new(owner, member, MemberKind::Method)
    }

    pub fn returns(mut self, provider: impl Fn() -> DeclaredType + Send + Sync + 'static) -> Self {
        self.provider = Some(TypeProvider::new(provider));
        self
    }

    pub fn options(mut self, options: FieldOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// Overrides what the processor's introspector reports for this member.
    pub fn introspected(mut self, ty: IntrospectedType) -> Self {
        self.introspected = Some(ty);
        self
    }

    fn caller(&self) -> String {
        Error::caller(&self.owner, &self.member)
    }
}

/// An argument declaration: a named parameter of a resolver method.
#[derive(Debug, Clone)]
pub struct ArgDeclaration {
    owner: String,
    method: String,
    index: usize,
    name: Option<String>,
    explicit_type: Option<String>,
}

impl ArgDeclaration {
    pub fn new(owner: impl Into<String>, method: impl Into<String>, index: usize) -> Self {
        Self {
            owner: owner.into(),
            method: method.into(),
            index,
            name: None,
            explicit_type: None,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Declares the parameter type instead of introspecting it.
    pub fn of_type(mut self, type_name: impl AsRef<str>) -> Self {
        self.explicit_type = Some(type_name.as_ref().to_string());
        self
    }
}

/// Validates declarations and records them in a registry.
#[derive(Clone)]
pub struct AnnotationProcessor {
    introspector: Arc<dyn TypeIntrospector>,
}

impl Default for AnnotationProcessor {
    fn default() -> Self {
        Self::new(Arc::new(NoIntrospection))
    }
}

impl fmt::Debug for AnnotationProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnnotationProcessor").finish_non_exhaustive()
    }
}

impl AnnotationProcessor {
    pub fn new(introspector: Arc<dyn TypeIntrospector>) -> Self {
        Self { introspector }
    }

    pub fn declare_output_type(&self, registry: &mut MetadataRegistry, name: &str) -> Result<()> {
        registry.declare_output_type(name)
    }

    pub fn declare_input_type(&self, registry: &mut MetadataRegistry, name: &str) -> Result<()> {
        registry.declare_input_type(name)
    }

    pub fn declare_field(
        &self,
        registry: &mut MetadataRegistry,
        decl: FieldDeclaration,
    ) -> Result<FieldMetadata> {
        self.register(registry, decl, FieldKind::Plain)
    }

    pub fn declare_query(
        &self,
        registry: &mut MetadataRegistry,
        decl: FieldDeclaration,
    ) -> Result<FieldMetadata> {
        self.register(registry, decl, FieldKind::Query)
    }

    pub fn declare_mutation(
        &self,
        registry: &mut MetadataRegistry,
        decl: FieldDeclaration,
    ) -> Result<FieldMetadata> {
        self.register(registry, decl, FieldKind::Mutation)
    }

    fn register(
        &self,
        registry: &mut MetadataRegistry,
        decl: FieldDeclaration,
        kind: FieldKind,
    ) -> Result<FieldMetadata> {
        let field = self.process_field(decl, kind)?;
        registry.add_field(field.clone());

        if let Some(callback) = &field.options.on_registered {
            callback(&field);
        }
        Ok(field)
    }

    /// Validates and normalizes one field declaration.
    ///
    /// # Errors
    ///
    /// - [`Error::ResolverFieldMustBeMethod`] for a query/mutation on a property.
    /// - [`Error::MethodNoReturnType`] for a method without a type provider.
    /// - [`Error::ArrayNoReturnType`] for a list member without a type provider.
    /// - [`Error::ReturnIsUnknown`] for an opaque member without a type provider.
    /// - [`Error::TypeMismatch`] when the provider disagrees with introspection.
    pub fn process_field(&self, decl: FieldDeclaration, kind: FieldKind) -> Result<FieldMetadata> {
        let caller = decl.caller();
        let is_method = decl.member_kind == MemberKind::Method;

        if kind != FieldKind::Plain && !is_method {
            return Err(Error::ResolverFieldMustBeMethod {
                caller,
                member_kind: decl.member_kind.to_string(),
                field_kind: kind.to_string(),
            });
        }

        let introspected = decl.introspected.clone().or_else(|| {
            self.introspector
                .introspect(&DeclarationSite::member(&decl.owner, &decl.member))
        });

        let declared = match &decl.provider {
            Some(provider) => provider.evaluate(),
            None if is_method => return Err(Error::MethodNoReturnType { caller }),
            None => match &introspected {
                Some(IntrospectedType::Named(name)) => DeclaredType::Named(name.clone()),
                Some(IntrospectedType::List) => return Err(Error::ArrayNoReturnType { caller }),
                Some(IntrospectedType::Opaque) | None => {
                    return Err(Error::ReturnIsUnknown { caller });
                }
            },
        };

        let is_array = declared.is_list();
        let element = declared.element();

        if Scalar::from_name(element) == Some(Scalar::Number) {
            info!(caller = %caller, "Found ambiguous type 'Number'. Assuming Float");
        }

        let (type_name, is_custom_type) = classify(element);

        if let Some(IntrospectedType::Named(reflected)) = &introspected
            && !matches!(reflected.as_str(), "Boolean" | "Number")
        {
            let reflected_scalar = if is_custom_type {
                Some(reflected.clone())
            } else {
                canonical_name(reflected).map(str::to_string)
            };
            if reflected_scalar.as_deref() != Some(type_name.as_str()) {
                return Err(Error::TypeMismatch {
                    caller,
                    member_kind: decl.member_kind.to_string(),
                    introspected: reflected.clone(),
                    declared: element.to_string(),
                });
            }
        }

        let mut options = decl.options.unwrap_or_default();
        if Scalar::from_name(element) == Some(Scalar::Void) {
            options.nullable = Some(true);
        }

        let field = FieldMetadata {
            owner: decl.owner,
            name: decl.member,
            type_name,
            is_array,
            is_method,
            is_custom_type,
            has_resolver_binding: kind != FieldKind::Plain,
            kind,
            options,
        };

        debug!(
            caller = %caller,
            kind = %kind,
            member_kind = %decl.member_kind,
            ty = %field.display_type(),
            "Registered field"
        );
        Ok(field)
    }

    /// Records a named argument of a resolver method.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgName`] for a missing or empty name.
    /// - [`Error::MethodNoArguments`] if the parameter type is unknown.
    /// - [`Error::ReturnIsUnknown`] if the parameter type is opaque or a bare list.
    pub fn declare_arg(
        &self,
        registry: &mut MetadataRegistry,
        decl: ArgDeclaration,
    ) -> Result<ArgMetadata> {
        let arg = self.process_arg(decl)?;
        registry.add_arg(arg.clone());
        Ok(arg)
    }

    pub fn process_arg(&self, decl: ArgDeclaration) -> Result<ArgMetadata> {
        let name = match decl.name {
            Some(name) if !name.is_empty() => name,
            _ => {
                return Err(Error::InvalidArgName {
                    owner: decl.owner,
                    method: decl.method,
                    index: decl.index,
                });
            }
        };

        let caller = format!("{} > {}({})", decl.owner, decl.method, name);
        let param_type = match decl.explicit_type {
            Some(explicit) => explicit,
            None => match self.introspector.introspect(&DeclarationSite::parameter(
                &decl.owner,
                &decl.method,
                decl.index,
            )) {
                Some(IntrospectedType::Named(ty)) => ty,
                Some(IntrospectedType::List | IntrospectedType::Opaque) => {
                    return Err(Error::ReturnIsUnknown { caller });
                }
                None => return Err(Error::MethodNoArguments { caller }),
            },
        };

        let (type_name, is_custom_type) = classify(&param_type);
        debug!(caller = %caller, index = decl.index, ty = %type_name, "Registered argument");

        Ok(ArgMetadata {
            owner: decl.owner,
            method: decl.method,
            name,
            type_name,
            is_custom_type,
            index: decl.index,
        })
    }

    /// Constructs resolver `R` through the injector and binds it to `name`.
    pub fn declare_resolver<R: Resolver>(
        &self,
        registry: &mut MetadataRegistry,
        injector: &Injector,
        name: &str,
    ) -> Result<()> {
        self.declare_resolver_with::<R>(registry, injector, name, |_| {})
    }

    /// Like [`declare_resolver`](Self::declare_resolver), handing the
    /// constructed instance to `on_constructed` before binding it.
    pub fn declare_resolver_with<R: Resolver>(
        &self,
        registry: &mut MetadataRegistry,
        injector: &Injector,
        name: &str,
        on_constructed: impl FnOnce(&R),
    ) -> Result<()> {
        let resolver: R = injector.construct()?;
        on_constructed(&resolver);
        registry.bind_resolver(name, Arc::new(resolver))?;
        debug!(name = %name, "Registered resolver");
        Ok(())
    }
}

/// Catalog scalar name or the custom type's own name.
fn classify(type_name: &str) -> (String, bool) {
    match canonical_name(type_name) {
        Some(scalar) => (scalar.to_string(), false),
        None => (type_name.to_string(), true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::introspect::StaticIntrospector;
    use crate::resolver::{Arguments, ResolveError};
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::Mutex;

    fn processor(introspector: StaticIntrospector) -> AnnotationProcessor {
        AnnotationProcessor::new(Arc::new(introspector))
    }

    #[test]
    fn test_primitive_property() {
        let processor = processor(
            StaticIntrospector::new()
                .with_member("Primitive", "prop", IntrospectedType::of::<String>()),
        );
        let mut registry = MetadataRegistry::new();

        let field = processor
            .declare_field(
                &mut registry,
                FieldDeclaration::property("Primitive", "prop")
                    .returns(|| DeclaredType::named(Scalar::String)),
            )
            .unwrap();

        assert_eq!(field.type_name, "String");
        assert!(!field.is_custom_type);
        assert!(!field.has_resolver_binding);
        assert_eq!(registry.get("Primitive").unwrap().fields().len(), 1);
    }

    #[test]
    fn test_introspected_property_without_provider() {
        let processor = processor(
            StaticIntrospector::new().with_member("User", "age", IntrospectedType::of::<i32>()),
        );
        let field = processor
            .process_field(FieldDeclaration::property("User", "age"), FieldKind::Plain)
            .unwrap();
        assert_eq!(field.type_name, "Int");
        assert!(!field.is_array);
    }

    #[test]
    fn test_opaque_property_requires_provider() {
        let processor = processor(
            StaticIntrospector::new().with_member("Illegal", "prop", IntrospectedType::Opaque),
        );

        let err = processor
            .process_field(FieldDeclaration::property("Illegal", "prop"), FieldKind::Plain)
            .unwrap_err();
        assert!(matches!(err, Error::ReturnIsUnknown { .. }));

        let field = processor
            .process_field(
                FieldDeclaration::property("Illegal", "prop")
                    .returns(|| DeclaredType::named("String")),
                FieldKind::Plain,
            )
            .unwrap();
        assert_eq!(field.type_name, "String");
    }

    #[test]
    fn test_list_property_requires_provider() {
        let processor = processor(
            StaticIntrospector::new()
                .with_member("ArrayNoType", "prop", IntrospectedType::of::<Vec<String>>()),
        );
        let err = processor
            .process_field(FieldDeclaration::property("ArrayNoType", "prop"), FieldKind::Plain)
            .unwrap_err();
        assert!(matches!(err, Error::ArrayNoReturnType { .. }));
    }

    #[test]
    fn test_list_of_scalar_provider() {
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        let processor = processor(
            StaticIntrospector::new().with_member("ArrayPrimitive", "prop", IntrospectedType::List),
        );
        let mut registry = MetadataRegistry::new();

        processor
            .declare_field(
                &mut registry,
                FieldDeclaration::property("ArrayPrimitive", "prop")
                    .returns(|| DeclaredType::list_of(Scalar::String))
                    .options(FieldOptions::new().on_registered(move |field| {
                        *sink.lock().unwrap() = Some(field.clone());
                    })),
            )
            .unwrap();

        let field = seen.lock().unwrap().take().expect("callback should run");
        assert!(field.is_array);
        assert!(!field.is_custom_type);
        assert_eq!(field.type_name, "String");
    }

    #[test]
    fn test_list_of_custom_type() {
        let field = AnnotationProcessor::default()
            .process_field(
                FieldDeclaration::property("ArrayCustom", "prop")
                    .returns(|| DeclaredType::list_of("Type")),
                FieldKind::Plain,
            )
            .unwrap();
        assert!(field.is_array);
        assert!(field.is_custom_type);
        assert_eq!(field.type_name, "Type");
    }

    #[test]
    fn test_method_requires_provider() {
        let err = AnnotationProcessor::default()
            .process_field(FieldDeclaration::method("Root", "get"), FieldKind::Plain)
            .unwrap_err();
        assert!(matches!(err, Error::MethodNoReturnType { .. }));

        let field = AnnotationProcessor::default()
            .process_field(
                FieldDeclaration::method("MethodArray", "method")
                    .returns(|| DeclaredType::list_of(Scalar::Float)),
                FieldKind::Plain,
            )
            .unwrap();
        assert!(field.is_method);
        assert_eq!(field.type_name, "Float");
    }

    #[test]
    fn test_query_must_be_method() {
        let err = AnnotationProcessor::default()
            .process_field(
                FieldDeclaration::property("Root", "value")
                    .returns(|| DeclaredType::named("String")),
                FieldKind::Query,
            )
            .unwrap_err();
        assert!(matches!(err, Error::ResolverFieldMustBeMethod { .. }));
    }

    #[test]
    fn test_query_and_mutation_have_resolver_binding() {
        let processor = AnnotationProcessor::default();
        let mut registry = MetadataRegistry::new();
        let query = processor
            .declare_query(
                &mut registry,
                FieldDeclaration::method("Root", "get").returns(|| DeclaredType::named("String")),
            )
            .unwrap();
        let mutation = processor
            .declare_mutation(
                &mut registry,
                FieldDeclaration::method("Root", "set")
                    .returns(|| DeclaredType::named(Scalar::Void)),
            )
            .unwrap();

        assert!(query.has_resolver_binding);
        assert_eq!(query.kind, FieldKind::Query);
        assert!(mutation.has_resolver_binding);
        assert_eq!(mutation.kind, FieldKind::Mutation);
    }

    #[test]
    fn test_void_is_always_nullable() {
        let field = AnnotationProcessor::default()
            .process_field(
                FieldDeclaration::method("Root", "set")
                    .returns(|| DeclaredType::named(Scalar::Void))
                    .options(FieldOptions::new().with_nullable(false)),
                FieldKind::Mutation,
            )
            .unwrap();
        assert_eq!(field.options.nullable, Some(true));
    }

    #[test]
    fn test_options_only_declaration() {
        let processor = processor(
            StaticIntrospector::new().with_member("User", "name", IntrospectedType::of::<String>()),
        );
        let field = processor
            .process_field(
                FieldDeclaration::property("User", "name")
                    .options(FieldOptions::new().with_comment("Display name")),
                FieldKind::Plain,
            )
            .unwrap();
        assert_eq!(field.options.comment.as_deref(), Some("Display name"));
    }

    #[test]
    fn test_type_mismatch() {
        let processor = processor(
            StaticIntrospector::new().with_member("User", "age", IntrospectedType::of::<String>()),
        );
        let err = processor
            .process_field(
                FieldDeclaration::property("User", "age")
                    .returns(|| DeclaredType::named(Scalar::Int)),
                FieldKind::Plain,
            )
            .unwrap_err();
        assert!(matches!(
            err,
            Error::TypeMismatch { ref introspected, .. } if introspected == "String"
        ));
    }

    #[test]
    fn test_generic_number_is_not_cross_checked() {
        let processor = processor(
            StaticIntrospector::new().with_member("User", "age", IntrospectedType::named("Number")),
        );
        let field = processor
            .process_field(
                FieldDeclaration::property("User", "age")
                    .returns(|| DeclaredType::named(Scalar::Int)),
                FieldKind::Plain,
            )
            .unwrap();
        assert_eq!(field.type_name, "Int");
    }

    #[test]
    fn test_custom_type_cross_check() {
        let processor = processor(
            StaticIntrospector::new()
                .with_member("Custom", "prop", IntrospectedType::named("Type"))
                .with_member("Custom", "other", IntrospectedType::named("Other")),
        );
        assert!(
            processor
                .process_field(
                    FieldDeclaration::property("Custom", "prop")
                        .returns(|| DeclaredType::named("Type")),
                    FieldKind::Plain,
                )
                .is_ok()
        );
        assert!(matches!(
            processor.process_field(
                FieldDeclaration::property("Custom", "other")
                    .returns(|| DeclaredType::named("Type")),
                FieldKind::Plain,
            ),
            Err(Error::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_arg_requires_name() {
        let processor = AnnotationProcessor::default();
        let err = processor
            .process_arg(ArgDeclaration::new("Root", "get", 0).of_type("String"))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgName { index: 0, .. }));

        let err = processor
            .process_arg(ArgDeclaration::new("Root", "get", 1).name("").of_type("String"))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgName { index: 1, .. }));
    }

    #[test]
    fn test_arg_classification() {
        let processor = processor(
            StaticIntrospector::new()
                .with_parameter("Root", "get", 0, IntrospectedType::named("Input"))
                .with_parameter("Root", "get", 1, IntrospectedType::of::<i64>()),
        );
        let mut registry = MetadataRegistry::new();

        let input = processor
            .declare_arg(&mut registry, ArgDeclaration::new("Root", "get", 0).name("input"))
            .unwrap();
        assert!(input.is_custom_type);
        assert_eq!(input.type_name, "Input");

        let id = processor
            .declare_arg(&mut registry, ArgDeclaration::new("Root", "get", 1).name("id"))
            .unwrap();
        assert!(!id.is_custom_type);
        assert_eq!(id.type_name, "Int");

        let slots = registry.get("Root").unwrap().args("get").unwrap();
        assert_eq!(slots.len(), 2);
    }

    #[test]
    fn test_arg_without_type() {
        let err = AnnotationProcessor::default()
            .process_arg(ArgDeclaration::new("Root", "get", 0).name("id"))
            .unwrap_err();
        assert!(matches!(err, Error::MethodNoArguments { .. }));
    }

    #[derive(Default)]
    struct Dependency;

    impl Dependency {
        fn works(&self) -> bool {
            true
        }
    }

    struct ResolverDependencyInject {
        inject: Dependency,
    }

    #[async_trait]
    impl Resolver for ResolverDependencyInject {
        async fn call(
            &self,
            method: &str,
            _args: Arguments,
        ) -> std::result::Result<Value, ResolveError> {
            Err(ResolveError::UnknownMethod(method.to_string()))
        }
    }

    #[test]
    fn test_resolver_dependency_inject() {
        let mut injector = Injector::new();
        injector.provide_default::<Dependency>();
        injector.provide(|scope| {
            Ok(ResolverDependencyInject {
                inject: scope.resolve()?,
            })
        });

        let mut registry = MetadataRegistry::new();
        let mut called = false;
        AnnotationProcessor::default()
            .declare_resolver_with::<ResolverDependencyInject>(
                &mut registry,
                &injector,
                "ResolverDependencyInject",
                |resolver| {
                    called = resolver.inject.works();
                },
            )
            .unwrap();

        assert!(called);
        assert!(registry.get("ResolverDependencyInject").unwrap().resolver().is_some());
    }

    #[test]
    fn test_resolver_on_declared_type_conflicts() {
        let mut injector = Injector::new();
        injector.provide_default::<Dependency>();
        injector.provide(|scope| {
            Ok(ResolverDependencyInject {
                inject: scope.resolve()?,
            })
        });

        let processor = AnnotationProcessor::default();
        let mut registry = MetadataRegistry::new();
        processor.declare_output_type(&mut registry, "Root").unwrap();
        let err = processor
            .declare_resolver::<ResolverDependencyInject>(&mut registry, &injector, "Root")
            .unwrap_err();
        assert!(matches!(err, Error::ResolverTypeConflict { .. }));
    }
}
