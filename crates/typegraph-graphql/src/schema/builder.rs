//! Schema compilation.
//!
//! [`SchemaBuilder`] walks the registry entries of a named set of resolvers,
//! compiles every output and input type they reach, assembles the Query and
//! Mutation roots and hands the result to async-graphql's dynamic schema
//! API.

use std::collections::HashSet;
use std::sync::Arc;

use async_graphql::Value;
use async_graphql::dynamic::{
    Field, FieldFuture, InputObject, InputValue, Object, ResolverContext, Schema, TypeRef,
};
use indexmap::IndexMap;
use tracing::{debug, error, trace, warn};
use typegraph_core::scalar::to_scalar;
use typegraph_core::{
    ArgMetadata, Arguments, Error, FieldKind, FieldMetadata, MetadataRegistry, RegistryEntry,
    Resolver,
};

use crate::config::BuildConfig;
use crate::error::BuildError;
use crate::schema::compiled::CompiledSchema;
use crate::value::{extract_field, json_to_graphql_value, parse_default_value, to_field_value};

/// Name of the field substituted into an empty Query root.
pub const PLACEHOLDER_FIELD: &str = "_placeholder";

/// Per-build memo of compiled composite types.
///
/// A name enters `pending_*` when compilation starts and moves to the
/// compiled map when it finishes, so recursive references stop at the first
/// repeat.
#[derive(Default)]
struct BuildSession {
    outputs: IndexMap<String, Object>,
    inputs: IndexMap<String, InputObject>,
    pending_outputs: HashSet<String>,
    pending_inputs: HashSet<String>,
}

impl BuildSession {
    fn has_output(&self, name: &str) -> bool {
        self.outputs.contains_key(name) || self.pending_outputs.contains(name)
    }

    fn has_input(&self, name: &str) -> bool {
        self.inputs.contains_key(name) || self.pending_inputs.contains(name)
    }
}

/// A root field ready to be attached to the Query or Mutation object.
struct RootField {
    owner: String,
    field: Field,
}

/// Compiles registry metadata into an executable schema.
///
/// # Example
///
/// ```ignore
/// let schema = SchemaBuilder::new(&registry, BuildConfig::default())
///     .build(&["UserResolver", "PostResolver"])?;
/// println!("{}", schema.sdl());
/// ```
pub struct SchemaBuilder<'r> {
    registry: &'r MetadataRegistry,
    config: BuildConfig,
}

impl<'r> SchemaBuilder<'r> {
    #[must_use]
    pub fn new(registry: &'r MetadataRegistry, config: BuildConfig) -> Self {
        Self { registry, config }
    }

    /// Builds a schema exposing the query and mutation fields of `resolvers`.
    ///
    /// Every call starts from a fresh [`BuildSession`]; repeated builds over
    /// an unchanged registry produce equivalent schemas.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Metadata`] when the declarations violate a role
    /// or binding contract, [`BuildError::Config`] for an invalid
    /// configuration and [`BuildError::Engine`] when the engine rejects the
    /// assembled schema.
    pub fn build(&self, resolvers: &[&str]) -> Result<CompiledSchema, BuildError> {
        self.config.validate()?;
        debug!(resolvers = ?resolvers, "Starting schema build");

        let skipped: Vec<&str> = self
            .registry
            .all()
            .filter(|entry| entry.resolver().is_some() && !resolvers.contains(&entry.name()))
            .map(RegistryEntry::name)
            .collect();
        if !skipped.is_empty() {
            debug!(skipped = ?skipped, "Bound resolvers left out of this build");
        }

        let mut entries = Vec::with_capacity(resolvers.len());
        for &name in resolvers {
            let entry = self
                .registry
                .get(name)
                .filter(|entry| !entry.fields().is_empty())
                .ok_or_else(|| Error::type_no_field(name))?;
            entries.push(entry);
        }

        let mut session = BuildSession::default();
        for entry in &entries {
            self.build_referenced_types(&mut session, entry)?;
        }

        let mut queries: IndexMap<String, RootField> = IndexMap::new();
        let mut mutations: IndexMap<String, RootField> = IndexMap::new();

        for entry in entries {
            let name = entry.name();
            for field in entry.fields() {
                let roots = match field.kind {
                    FieldKind::Query => &mut queries,
                    FieldKind::Mutation => &mut mutations,
                    FieldKind::Plain => continue,
                };

                let resolver = entry.resolver().ok_or_else(|| Error::ResolverNoDecorator {
                    owner: name.to_string(),
                    kind: field.kind.to_string(),
                    field: field.name.clone(),
                })?;

                let args = entry.args(&field.name);
                let root_field = self.build_root_field(field, args, resolver)?;
                if let Some(previous) = roots.insert(field.name.clone(), root_field) {
                    warn!(
                        field = %field.name,
                        previous = %previous.owner,
                        owner = %name,
                        "Root field declared by more than one resolver; using the later one"
                    );
                }
            }
        }

        let query_fields: Vec<String> = queries.keys().cloned().collect();
        let mutation_fields: Vec<String> = mutations.keys().cloned().collect();

        let mut query = Object::new(&self.config.query_root);
        if queries.is_empty() {
            if !self.config.placeholder_query {
                return Err(Error::NoQueryFieldsFound.into());
            }
            debug!(root = %self.config.query_root, "No query fields declared; adding placeholder");
            query = query.field(
                Field::new(PLACEHOLDER_FIELD, TypeRef::named(TypeRef::STRING), |_| {
                    FieldFuture::new(async { Ok(None::<Value>) })
                })
                .description("Placeholder for a schema without queries"),
            );
        }
        for (_, root_field) in queries {
            query = query.field(root_field.field);
        }

        let mutation = if mutations.is_empty() {
            None
        } else {
            let mut mutation = Object::new(&self.config.mutation_root);
            for (_, root_field) in mutations {
                mutation = mutation.field(root_field.field);
            }
            Some(mutation)
        };

        let type_names: Vec<String> = session
            .outputs
            .keys()
            .chain(session.inputs.keys())
            .cloned()
            .collect();

        let mut schema_builder = Schema::build(
            &self.config.query_root,
            mutation.as_ref().map(|_| self.config.mutation_root.as_str()),
            None,
        )
        .register(query);

        if let Some(mutation) = mutation {
            schema_builder = schema_builder.register(mutation);
        }
        for (_, object) in session.outputs {
            schema_builder = schema_builder.register(object);
        }
        for (_, input) in session.inputs {
            schema_builder = schema_builder.register(input);
        }

        let mut schema_builder = schema_builder
            .limit_depth(self.config.max_depth)
            .limit_complexity(self.config.max_complexity);
        if !self.config.introspection {
            schema_builder = schema_builder.disable_introspection();
        }

        let schema = schema_builder
            .finish()
            .map_err(|e| BuildError::Engine(e.to_string()))?;

        debug!(
            queries = query_fields.len(),
            mutations = mutation_fields.len(),
            types = type_names.len(),
            "Schema build complete"
        );

        Ok(CompiledSchema::new(schema, query_fields, mutation_fields, type_names))
    }

    /// Compiles every type a resolver entry references, enforcing roles.
    ///
    /// Covers all fields of the entry, plain ones included, and the argument
    /// lists of all its methods.
    fn build_referenced_types(
        &self,
        session: &mut BuildSession,
        entry: &RegistryEntry,
    ) -> Result<(), BuildError> {
        for field in entry.fields().iter().filter(|field| field.is_custom_type) {
            self.build_output_type(session, &field.type_name)?;
        }
        for (_, slots) in entry.arg_lists() {
            for arg in slots.iter().flatten().filter(|arg| arg.is_custom_type) {
                self.build_input_type(session, &arg.type_name)?;
            }
        }
        Ok(())
    }

    /// Compiles one query or mutation field bound to `resolver`.
    ///
    /// Referenced types must already be in the session.
    fn build_root_field(
        &self,
        field: &FieldMetadata,
        args: Option<&[Option<ArgMetadata>]>,
        resolver: &Arc<dyn Resolver>,
    ) -> Result<RootField, BuildError> {
        let type_ref = self.type_ref(field)?;

        let slots = args.unwrap_or_default();
        let mut arg_names: Vec<Option<String>> = Vec::with_capacity(slots.len());
        let mut arguments = Vec::with_capacity(slots.len());

        for (index, slot) in slots.iter().enumerate() {
            match slot {
                Some(arg) => {
                    let base = self.base_name(&arg.type_name, arg.is_custom_type)?;
                    arguments.push(InputValue::new(&arg.name, TypeRef::named(base)));
                    arg_names.push(Some(arg.name.clone()));
                }
                None if self.config.strict_argument_indices => {
                    return Err(Error::ArgumentIndexGap {
                        owner: field.owner.clone(),
                        method: field.name.clone(),
                        index,
                    }
                    .into());
                }
                None => arg_names.push(None),
            }
        }

        let resolver = Arc::clone(resolver);
        let method = field.name.clone();
        let arg_names = Arc::new(arg_names);

        let mut root_field = Field::new(&field.name, type_ref, move |ctx| {
            let resolver = Arc::clone(&resolver);
            let method = method.clone();
            let arg_names = Arc::clone(&arg_names);
            FieldFuture::new(async move {
                let args = align_arguments(&ctx, &arg_names)?;
                let value = resolver.call(&method, args).await?;
                Ok(to_field_value(json_to_graphql_value(value)))
            })
        });
        for argument in arguments {
            root_field = root_field.argument(argument);
        }
        if let Some(comment) = &field.options.comment {
            root_field = root_field.description(comment);
        }

        trace!(
            owner = %field.owner,
            field = %field.name,
            kind = %field.kind,
            "Compiled root field"
        );
        Ok(RootField {
            owner: field.owner.clone(),
            field: root_field,
        })
    }

    /// Compiles the output type `name` into the session memo.
    fn build_output_type(&self, session: &mut BuildSession, name: &str) -> Result<(), BuildError> {
        if session.has_output(name) {
            return Ok(());
        }

        let entry = self
            .registry
            .get(name)
            .filter(|entry| !entry.fields().is_empty())
            .ok_or_else(|| Error::type_no_field(name))?;
        if entry.is_input() {
            return Err(Error::input_as_output(name).into());
        }

        session.pending_outputs.insert(name.to_string());

        let mut object = Object::new(name);
        for field in entry.fields() {
            if field.is_custom_type {
                self.build_output_type(session, &field.type_name)?;
            }
            let field_name = field.name.clone();
            let mut compiled = Field::new(&field.name, self.type_ref(field)?, move |ctx| {
                let field_name = field_name.clone();
                FieldFuture::new(async move {
                    Ok(extract_field(&ctx, &field_name).and_then(to_field_value))
                })
            });
            if let Some(comment) = &field.options.comment {
                compiled = compiled.description(comment);
            }
            object = object.field(compiled);
        }

        session.pending_outputs.remove(name);
        session.outputs.insert(name.to_string(), object);
        trace!(name = %name, "Compiled output type");
        Ok(())
    }

    /// Compiles the input type `name` into the session memo.
    fn build_input_type(&self, session: &mut BuildSession, name: &str) -> Result<(), BuildError> {
        if session.has_input(name) {
            return Ok(());
        }

        let entry = self
            .registry
            .get(name)
            .filter(|entry| !entry.fields().is_empty())
            .ok_or_else(|| Error::type_no_field(name))?;
        if !entry.is_input() {
            return Err(Error::output_as_input(name).into());
        }

        session.pending_inputs.insert(name.to_string());

        let mut input = InputObject::new(name);
        for field in entry.fields() {
            if field.is_custom_type {
                self.build_input_type(session, &field.type_name)?;
            }
            let mut value = InputValue::new(&field.name, self.type_ref(field)?);
            if let Some(comment) = &field.options.comment {
                value = value.description(comment);
            }
            if let Some(default) = &field.options.default_value {
                value = value.default_value(parse_default_value(default));
            }
            input = input.field(value);
        }

        session.pending_inputs.remove(name);
        session.inputs.insert(name.to_string(), input);
        trace!(name = %name, "Compiled input type");
        Ok(())
    }

    /// Engine type reference for a field: non-null unless nullable, then
    /// wrapped in a list for array fields.
    fn type_ref(&self, field: &FieldMetadata) -> Result<TypeRef, BuildError> {
        let base = self.base_name(&field.type_name, field.is_custom_type)?;
        let element = if field.options.is_nullable() {
            TypeRef::named(base)
        } else {
            TypeRef::named_nn(base)
        };
        Ok(if field.is_array {
            TypeRef::List(Box::new(element))
        } else {
            element
        })
    }

    fn base_name(&self, type_name: &str, is_custom_type: bool) -> Result<String, BuildError> {
        if is_custom_type {
            return Ok(type_name.to_string());
        }
        to_scalar(type_name).map(str::to_string).map_err(|err| {
            error!(type_name = %type_name, "Scalar catalog and builder disagree");
            BuildError::from(err)
        })
    }
}

/// Reorders the engine's named arguments into the method's positional
/// order. Slots without a declared argument, and omitted arguments, are
/// passed as null.
fn align_arguments(
    ctx: &ResolverContext<'_>,
    arg_names: &[Option<String>],
) -> async_graphql::Result<Arguments> {
    let submitted = ctx.args.as_index_map();
    let mut values = Vec::with_capacity(arg_names.len());
    for name in arg_names {
        let value = match name.as_deref().and_then(|name| submitted.get(name)) {
            Some(value) => value.clone().into_json()?,
            None => serde_json::Value::Null,
        };
        values.push(value);
    }
    Ok(Arguments::new(values))
}
