//! Type introspection capability.
//!
//! Reports the statically known type of a declaration site. Rust has no
//! runtime reflection over struct members, so the information is supplied
//! up front: either collected into a [`StaticIntrospector`] at startup, or
//! derived from Rust types through [`Reflect`].

use std::collections::HashMap;

/// A member or method parameter whose type is being asked about.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DeclarationSite {
    Member {
        owner: String,
        member: String,
    },
    Parameter {
        owner: String,
        method: String,
        index: usize,
    },
}

impl DeclarationSite {
    pub fn member(owner: impl Into<String>, member: impl Into<String>) -> Self {
        Self::Member {
            owner: owner.into(),
            member: member.into(),
        }
    }

    pub fn parameter(owner: impl Into<String>, method: impl Into<String>, index: usize) -> Self {
        Self::Parameter {
            owner: owner.into(),
            method: method.into(),
            index,
        }
    }
}

/// Statically known type of a declaration site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntrospectedType {
    /// A named type: a catalog scalar or a declared composite.
    Named(String),
    /// A list whose element type is not known.
    List,
    /// Unknown or opaque (`any`-like) type.
    Opaque,
}

impl IntrospectedType {
    pub fn named(name: impl AsRef<str>) -> Self {
        Self::Named(name.as_ref().to_string())
    }

    /// Introspection result for a Rust type.
    pub fn of<T: Reflect + ?Sized>() -> Self {
        T::reflect()
    }
}

/// Reports declared types.
pub trait TypeIntrospector: Send + Sync {
    /// `None` when the site's type cannot be known (e.g. method return types).
    fn introspect(&self, site: &DeclarationSite) -> Option<IntrospectedType>;
}

/// Knows nothing; every site must carry an explicit type.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoIntrospection;

impl TypeIntrospector for NoIntrospection {
    fn introspect(&self, _site: &DeclarationSite) -> Option<IntrospectedType> {
        None
    }
}

/// Map-backed introspector filled at startup.
#[derive(Debug, Clone, Default)]
pub struct StaticIntrospector {
    sites: HashMap<DeclarationSite, IntrospectedType>,
}

impl StaticIntrospector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_member(
        mut self,
        owner: impl Into<String>,
        member: impl Into<String>,
        ty: IntrospectedType,
    ) -> Self {
        self.sites.insert(DeclarationSite::member(owner, member), ty);
        self
    }

    pub fn with_parameter(
        mut self,
        owner: impl Into<String>,
        method: impl Into<String>,
        index: usize,
        ty: IntrospectedType,
    ) -> Self {
        self.sites
            .insert(DeclarationSite::parameter(owner, method, index), ty);
        self
    }

    pub fn insert(&mut self, site: DeclarationSite, ty: IntrospectedType) {
        self.sites.insert(site, ty);
    }
}

impl TypeIntrospector for StaticIntrospector {
    fn introspect(&self, site: &DeclarationSite) -> Option<IntrospectedType> {
        self.sites.get(site).cloned()
    }
}

/// Maps a Rust type to what an introspector reports for it.
///
/// Implement it for composite types with `IntrospectedType::named("User")`.
pub trait Reflect {
    fn reflect() -> IntrospectedType;
}

macro_rules! reflect_as {
    ($name:literal => $($ty:ty),+) => {
        $(
            impl Reflect for $ty {
                fn reflect() -> IntrospectedType {
                    IntrospectedType::Named($name.to_string())
                }
            }
        )+
    };
}

reflect_as!("String" => String, str);
reflect_as!("Int" => i8, i16, i32, i64, u8, u16, u32, u64, isize, usize);
reflect_as!("Float" => f32, f64);
reflect_as!("Boolean" => bool);
reflect_as!("Void" => ());

impl<T: Reflect + ?Sized> Reflect for &T {
    fn reflect() -> IntrospectedType {
        T::reflect()
    }
}

impl<T: Reflect> Reflect for Option<T> {
    fn reflect() -> IntrospectedType {
        T::reflect()
    }
}

impl<T> Reflect for Vec<T> {
    fn reflect() -> IntrospectedType {
        IntrospectedType::List
    }
}

impl<T> Reflect for [T] {
    fn reflect() -> IntrospectedType {
        IntrospectedType::List
    }
}

impl Reflect for serde_json::Value {
    fn reflect() -> IntrospectedType {
        IntrospectedType::Opaque
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct User;

    impl Reflect for User {
        fn reflect() -> IntrospectedType {
            IntrospectedType::named("User")
        }
    }

    #[test]
    fn test_reflect_primitives() {
        assert_eq!(IntrospectedType::of::<String>(), IntrospectedType::named("String"));
        assert_eq!(IntrospectedType::of::<&str>(), IntrospectedType::named("String"));
        assert_eq!(IntrospectedType::of::<i32>(), IntrospectedType::named("Int"));
        assert_eq!(IntrospectedType::of::<f64>(), IntrospectedType::named("Float"));
        assert_eq!(IntrospectedType::of::<Option<bool>>(), IntrospectedType::named("Boolean"));
        assert_eq!(IntrospectedType::of::<()>(), IntrospectedType::named("Void"));
    }

    #[test]
    fn test_reflect_lists_and_opaque() {
        assert_eq!(IntrospectedType::of::<Vec<String>>(), IntrospectedType::List);
        assert_eq!(IntrospectedType::of::<serde_json::Value>(), IntrospectedType::Opaque);
        assert_eq!(IntrospectedType::of::<User>(), IntrospectedType::named("User"));
    }

    #[test]
    fn test_static_introspector() {
        let introspector = StaticIntrospector::new()
            .with_member("User", "name", IntrospectedType::of::<String>())
            .with_parameter("Root", "get", 0, IntrospectedType::named("Input"));

        assert_eq!(
            introspector.introspect(&DeclarationSite::member("User", "name")),
            Some(IntrospectedType::named("String"))
        );
        assert_eq!(
            introspector.introspect(&DeclarationSite::parameter("Root", "get", 0)),
            Some(IntrospectedType::named("Input"))
        );
        assert_eq!(
            introspector.introspect(&DeclarationSite::member("User", "age")),
            None
        );
        assert_eq!(
            NoIntrospection.introspect(&DeclarationSite::member("User", "name")),
            None
        );
    }
}
