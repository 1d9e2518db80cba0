//! # typegraph-core
//!
//! Metadata collection for typegraph: declare output types, input types,
//! fields, queries, mutations and their arguments, and construct the
//! resolver services that implement them.
//!
//! ## Modules
//!
//! - [`scalar`] - Scalar catalog
//! - [`metadata`] - Field, argument and role records
//! - [`registry`] - Per-declaration metadata store
//! - [`introspect`] - Type introspection capability
//! - [`annotation`] - Registration surface and validation
//! - [`injector`] - Dependency construction for resolvers
//! - [`resolver`] - Resolver service trait
//! - [`error`] - Contract violation taxonomy

pub mod annotation;
pub mod error;
pub mod injector;
pub mod introspect;
pub mod metadata;
pub mod registry;
pub mod resolver;
pub mod scalar;

pub use annotation::{AnnotationProcessor, ArgDeclaration, FieldDeclaration, TypeProvider};
pub use error::{Error, Result};
pub use injector::{Injector, Scope};
pub use introspect::{
    DeclarationSite, IntrospectedType, NoIntrospection, Reflect, StaticIntrospector,
    TypeIntrospector,
};
pub use metadata::{
    ArgMetadata, DeclaredType, FieldKind, FieldMetadata, FieldOptions, MemberKind, TypeRole,
};
pub use registry::{MetadataRegistry, RegistryEntry};
pub use resolver::{Arguments, ResolveError, Resolver, to_value};
pub use scalar::Scalar;

pub use async_trait::async_trait;
