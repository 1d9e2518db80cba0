//! Metadata registry.
//!
//! One [`RegistryEntry`] per declaration name, holding the fields, argument
//! lists, type role and bound resolver collected at registration time.
//! Entries are created on first lookup. Registration is expected to run once,
//! single-threaded, at startup; the registry is then only read.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::trace;

use crate::error::{Error, Result};
use crate::metadata::{ArgMetadata, FieldMetadata, TypeRole};
use crate::resolver::Resolver;

/// Metadata for one declared type or resolver.
#[derive(Default)]
pub struct RegistryEntry {
    name: String,
    fields: Vec<FieldMetadata>,
    /// Argument slots per method, indexed by parameter position.
    args: IndexMap<String, Vec<Option<ArgMetadata>>>,
    role: Option<TypeRole>,
    resolver: Option<Arc<dyn Resolver>>,
}

impl RegistryEntry {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields in registration order.
    pub fn fields(&self) -> &[FieldMetadata] {
        &self.fields
    }

    /// Argument slots of `method`, ordered by index.
    pub fn args(&self, method: &str) -> Option<&[Option<ArgMetadata>]> {
        self.args.get(method).map(Vec::as_slice)
    }

    /// Argument slots of every method, in first-declaration order.
    pub fn arg_lists(&self) -> impl Iterator<Item = (&str, &[Option<ArgMetadata>])> {
        self.args
            .iter()
            .map(|(method, slots)| (method.as_str(), slots.as_slice()))
    }

    pub fn role(&self) -> Option<&TypeRole> {
        self.role.as_ref()
    }

    pub fn is_input(&self) -> bool {
        self.role.as_ref().is_some_and(|r| r.is_input)
    }

    pub fn resolver(&self) -> Option<&Arc<dyn Resolver>> {
        self.resolver.as_ref()
    }

    /// Appends a field. Validation happens in the annotation processor.
    pub fn add_field(&mut self, field: FieldMetadata) {
        self.fields.push(field);
    }

    /// Stores an argument at its index, growing the method's list as needed.
    pub fn add_arg(&mut self, arg: ArgMetadata) {
        let slots = self.args.entry(arg.method.clone()).or_default();
        if slots.len() <= arg.index {
            slots.resize(arg.index + 1, None);
        }
        let index = arg.index;
        slots[index] = Some(arg);
    }

    pub fn declare_output_type(&mut self) -> Result<()> {
        self.set_role(TypeRole::output(self.name.clone()))
    }

    pub fn declare_input_type(&mut self) -> Result<()> {
        self.set_role(TypeRole::input(self.name.clone()))
    }

    fn set_role(&mut self, role: TypeRole) -> Result<()> {
        if self.resolver.is_some() {
            return Err(Error::TypeResolverConflict {
                name: self.name.clone(),
            });
        }
        if self.role.is_some() {
            return Err(Error::TypeAlreadyDeclared {
                name: self.name.clone(),
            });
        }
        trace!(name = %self.name, input = role.is_input, "Declared type role");
        self.role = Some(role);
        Ok(())
    }

    /// Binds a constructed resolver instance to this entry.
    pub fn bind_resolver(&mut self, resolver: Arc<dyn Resolver>) -> Result<()> {
        if self.role.is_some() {
            return Err(Error::ResolverTypeConflict {
                name: self.name.clone(),
            });
        }
        if self.resolver.is_some() {
            return Err(Error::ResolverAlreadyBound {
                name: self.name.clone(),
            });
        }
        trace!(name = %self.name, "Bound resolver");
        self.resolver = Some(resolver);
        Ok(())
    }
}

impl fmt::Debug for RegistryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryEntry")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .field("args", &self.args)
            .field("role", &self.role)
            .field("resolver", &self.resolver.is_some())
            .finish()
    }
}

/// Registry of declared types and resolvers, keyed by declaration name.
#[derive(Debug, Default)]
pub struct MetadataRegistry {
    entries: IndexMap<String, RegistryEntry>,
}

impl MetadataRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the entry for `name`, creating it if absent.
    pub fn lookup(&mut self, name: &str) -> &mut RegistryEntry {
        self.entries
            .entry(name.to_string())
            .or_insert_with(|| RegistryEntry::new(name))
    }

    /// Read-only access; `None` if nothing was ever registered under `name`.
    pub fn get(&self, name: &str) -> Option<&RegistryEntry> {
        self.entries.get(name)
    }

    pub fn declare_output_type(&mut self, name: &str) -> Result<()> {
        self.lookup(name).declare_output_type()
    }

    pub fn declare_input_type(&mut self, name: &str) -> Result<()> {
        self.lookup(name).declare_input_type()
    }

    pub fn add_field(&mut self, field: FieldMetadata) {
        let owner = field.owner.clone();
        self.lookup(&owner).add_field(field);
    }

    pub fn add_arg(&mut self, arg: ArgMetadata) {
        let owner = arg.owner.clone();
        self.lookup(&owner).add_arg(arg);
    }

    pub fn bind_resolver(&mut self, name: &str, resolver: Arc<dyn Resolver>) -> Result<()> {
        self.lookup(name).bind_resolver(resolver)
    }

    /// Every entry, in creation order.
    pub fn all(&self) -> impl Iterator<Item = &RegistryEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every entry.
    pub fn reset(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{FieldKind, FieldOptions};
    use crate::resolver::{Arguments, ResolveError};
    use async_trait::async_trait;
    use serde_json::Value;

    struct Noop;

    #[async_trait]
    impl Resolver for Noop {
        async fn call(
            &self,
            _method: &str,
            _args: Arguments,
        ) -> std::result::Result<Value, ResolveError> {
            Ok(Value::Null)
        }
    }

    fn arg(index: usize, name: &str) -> ArgMetadata {
        ArgMetadata {
            owner: "Root".into(),
            method: "get".into(),
            name: name.into(),
            type_name: "String".into(),
            is_custom_type: false,
            index,
        }
    }

    #[test]
    fn test_lookup_creates_once() {
        let mut registry = MetadataRegistry::new();
        registry.lookup("User");
        registry.lookup("User");
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("User").unwrap().name(), "User");
        assert!(registry.get("Missing").is_none());
    }

    #[test]
    fn test_fields_keep_insertion_order() {
        let mut registry = MetadataRegistry::new();
        for name in ["b", "a", "c"] {
            registry.add_field(FieldMetadata {
                owner: "User".into(),
                name: name.into(),
                type_name: "String".into(),
                is_array: false,
                is_method: false,
                is_custom_type: false,
                has_resolver_binding: false,
                kind: FieldKind::Plain,
                options: FieldOptions::default(),
            });
        }
        let names: Vec<_> = registry
            .get("User")
            .unwrap()
            .fields()
            .iter()
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(names, ["b", "a", "c"]);
    }

    #[test]
    fn test_all_lists_entries_in_creation_order() {
        let mut registry = MetadataRegistry::new();
        registry.declare_output_type("User").unwrap();
        registry.bind_resolver("Root", Arc::new(Noop)).unwrap();
        registry.declare_input_type("UserInput").unwrap();

        let names: Vec<_> = registry.all().map(RegistryEntry::name).collect();
        assert_eq!(names, ["User", "Root", "UserInput"]);

        let bound: Vec<_> = registry
            .all()
            .filter(|entry| entry.resolver().is_some())
            .map(RegistryEntry::name)
            .collect();
        assert_eq!(bound, ["Root"]);

        registry.reset();
        assert!(registry.all().next().is_none());
    }

    #[test]
    fn test_arg_lists_cover_every_method() {
        let mut registry = MetadataRegistry::new();
        registry.add_arg(arg(0, "a"));
        registry.add_arg(ArgMetadata {
            method: "find".into(),
            ..arg(1, "b")
        });

        let lists: Vec<_> = registry
            .get("Root")
            .unwrap()
            .arg_lists()
            .map(|(method, slots)| (method, slots.len()))
            .collect();
        assert_eq!(lists, [("get", 1), ("find", 2)]);
    }

    #[test]
    fn test_args_are_placed_by_index() {
        let mut registry = MetadataRegistry::new();
        registry.add_arg(arg(2, "c"));
        registry.add_arg(arg(0, "a"));

        let slots = registry.get("Root").unwrap().args("get").unwrap();
        assert_eq!(slots.len(), 3);
        assert_eq!(slots[0].as_ref().unwrap().name, "a");
        assert!(slots[1].is_none());
        assert_eq!(slots[2].as_ref().unwrap().name, "c");
    }

    #[test]
    fn test_role_and_resolver_are_exclusive() {
        let mut registry = MetadataRegistry::new();
        registry.bind_resolver("Root", Arc::new(Noop)).unwrap();
        assert!(matches!(
            registry.declare_output_type("Root"),
            Err(Error::TypeResolverConflict { .. })
        ));
        assert!(matches!(
            registry.declare_input_type("Root"),
            Err(Error::TypeResolverConflict { .. })
        ));

        registry.declare_output_type("User").unwrap();
        assert!(matches!(
            registry.bind_resolver("User", Arc::new(Noop)),
            Err(Error::ResolverTypeConflict { .. })
        ));
    }

    #[test]
    fn test_role_is_set_once() {
        let mut registry = MetadataRegistry::new();
        registry.declare_input_type("Input").unwrap();
        assert!(registry.get("Input").unwrap().is_input());
        assert!(matches!(
            registry.declare_output_type("Input"),
            Err(Error::TypeAlreadyDeclared { .. })
        ));
    }

    #[test]
    fn test_reset_clears_entries() {
        let mut registry = MetadataRegistry::new();
        registry.declare_output_type("User").unwrap();
        registry.reset();
        assert!(registry.is_empty());
        registry.declare_input_type("User").unwrap();
    }
}
