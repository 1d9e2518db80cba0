//! Dependency construction for resolver services.
//!
//! Each injectable type registers a factory. A factory receives a [`Scope`]
//! and pulls its own dependencies from it, so the dependency graph is walked
//! depth-first at construction time. Every resolution builds a fresh
//! instance; nothing is cached between calls.
//!
//! # Example
//!
//! ```ignore
//! let mut injector = Injector::new();
//! injector.provide_default::<Counter>();
//! injector.provide(|scope| Ok(Root { counter: scope.resolve::<Counter>()? }));
//!
//! let root: Root = injector.construct()?;
//! ```

use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::fmt;

use tracing::trace;

use crate::error::{Error, Result};

type Factory = Box<dyn Fn(&mut Scope<'_>) -> Result<Box<dyn Any + Send>> + Send + Sync>;

struct Provider {
    type_name: &'static str,
    factory: Factory,
}

/// Registry of factories keyed by the type they construct.
#[derive(Default)]
pub struct Injector {
    providers: HashMap<TypeId, Provider>,
}

impl Injector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the factory for `T`, replacing any previous one.
    pub fn provide<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: Send + 'static,
        F: Fn(&mut Scope<'_>) -> Result<T> + Send + Sync + 'static,
    {
        let factory: Factory = Box::new(move |scope| {
            let value = factory(scope)?;
            Ok(Box::new(value) as Box<dyn Any + Send>)
        });
        self.providers.insert(
            TypeId::of::<T>(),
            Provider {
                type_name: type_name::<T>(),
                factory,
            },
        );
        self
    }

    /// Registers `T::default` as the factory for `T`.
    pub fn provide_default<T>(&mut self) -> &mut Self
    where
        T: Default + Send + 'static,
    {
        self.provide(|_| Ok(T::default()))
    }

    pub fn contains<T: 'static>(&self) -> bool {
        self.providers.contains_key(&TypeId::of::<T>())
    }

    /// Constructs `T` and, recursively, everything it depends on.
    ///
    /// # Errors
    ///
    /// - [`Error::MissingProvider`] if `T` or a dependency has no factory.
    /// - [`Error::DependencyCycle`] if a type depends on itself.
    pub fn construct<T: Send + 'static>(&self) -> Result<T> {
        Scope {
            injector: self,
            stack: Vec::new(),
        }
        .resolve()
    }
}

impl fmt::Debug for Injector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.providers.values().map(|p| p.type_name).collect();
        names.sort_unstable();
        f.debug_struct("Injector").field("providers", &names).finish()
    }
}

/// Construction state for one [`Injector::construct`] call.
pub struct Scope<'a> {
    injector: &'a Injector,
    /// Types currently under construction, outermost first.
    stack: Vec<(TypeId, &'static str)>,
}

impl Scope<'_> {
    /// Constructs a fresh `T` within this scope.
    pub fn resolve<T: Send + 'static>(&mut self) -> Result<T> {
        let id = TypeId::of::<T>();
        let name = type_name::<T>();

        if self.stack.iter().any(|(seen, _)| *seen == id) {
            let mut path: Vec<String> = self.stack.iter().map(|(_, n)| n.to_string()).collect();
            path.push(name.to_string());
            return Err(Error::DependencyCycle { path });
        }

        let injector = self.injector;
        let provider = injector
            .providers
            .get(&id)
            .ok_or_else(|| Error::MissingProvider {
                type_name: name.to_string(),
            })?;

        trace!(type_name = name, depth = self.stack.len(), "Constructing dependency");
        self.stack.push((id, name));
        let built = (provider.factory)(self);
        self.stack.pop();

        built?
            .downcast::<T>()
            .map(|boxed| *boxed)
            .map_err(|_| Error::provider_failed(name, "factory produced a different type"))
    }

    /// Depth of the current construction stack.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}
