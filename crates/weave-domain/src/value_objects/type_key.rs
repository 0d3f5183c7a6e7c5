//! Type Key Value Objects
//!
//! A [`TypeKey`] identifies what a provider supplies and what a consumer asks
//! for: a root [`TypeDescriptor`] plus an ordered list of generic parameters.
//! Keys compare structurally; no inheritance or assignability is consulted.
//!
//! ## Compatibility
//!
//! A query key is compatible with a registered key when the roots are equal
//! and either the query carries no generics (raw lookup) or both generic
//! lists have the same length and every position is equal or a wildcard in
//! the query.
//!
//! ```rust
//! use weave_domain::value_objects::{TypeDescriptor, TypeKey};
//!
//! let registered = TypeKey::named("Repository").with_generic(TypeDescriptor::named("User"));
//! let raw = TypeKey::named("Repository");
//! let any = TypeKey::named("Repository").with_generic(TypeDescriptor::wildcard());
//!
//! assert!(raw.is_compatible_with(&registered));
//! assert!(any.is_compatible_with(&registered));
//! ```

use std::borrow::Cow;
use std::fmt;

use crate::constants::WILDCARD_DESCRIPTOR;

/// Value Object: a single named type
///
/// Descriptors built with [`TypeDescriptor::of`] use
/// [`std::any::type_name`], so two descriptors for the same Rust type are
/// always equal within one build.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeDescriptor(Cow<'static, str>);

impl TypeDescriptor {
    /// Descriptor for a Rust type (sized or not)
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self(Cow::Borrowed(std::any::type_name::<T>()))
    }

    /// Descriptor for a type known only by name
    pub fn named<S: Into<Cow<'static, str>>>(name: S) -> Self {
        Self(name.into())
    }

    /// Descriptor matching any descriptor at the same position of a query
    pub fn wildcard() -> Self {
        Self(Cow::Borrowed(WILDCARD_DESCRIPTOR))
    }

    /// The descriptor's name
    pub fn name(&self) -> &str {
        &self.0
    }

    /// True for the wildcard descriptor
    pub fn is_wildcard(&self) -> bool {
        self.0 == WILDCARD_DESCRIPTOR
    }

    /// Positional match where `self` belongs to the query side
    pub fn matches(&self, registered: &TypeDescriptor) -> bool {
        self.is_wildcard() || self == registered
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Value Object: generic-aware type identifier
///
/// Two keys are equal iff their roots are equal and their generic lists are
/// equal position by position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeKey {
    root: TypeDescriptor,
    generics: Vec<TypeDescriptor>,
}

impl TypeKey {
    /// Key with the given root and no generics
    pub fn new(root: TypeDescriptor) -> Self {
        Self {
            root,
            generics: Vec::new(),
        }
    }

    /// Key for a Rust type (sized or not, e.g. `dyn Trait`)
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::new(TypeDescriptor::of::<T>())
    }

    /// Key for a type known only by name
    pub fn named<S: Into<Cow<'static, str>>>(name: S) -> Self {
        Self::new(TypeDescriptor::named(name))
    }

    /// Append a generic parameter
    pub fn with_generic(mut self, generic: TypeDescriptor) -> Self {
        self.generics.push(generic);
        self
    }

    /// Replace all generic parameters
    pub fn with_generics<I: IntoIterator<Item = TypeDescriptor>>(mut self, generics: I) -> Self {
        self.generics = generics.into_iter().collect();
        self
    }

    /// Root type
    pub fn root(&self) -> &TypeDescriptor {
        &self.root
    }

    /// Generic parameters, in declaration order
    pub fn generics(&self) -> &[TypeDescriptor] {
        &self.generics
    }

    /// True when the key carries no generic parameters
    pub fn is_raw(&self) -> bool {
        self.generics.is_empty()
    }

    /// The same root without generic parameters
    pub fn raw(&self) -> TypeKey {
        Self::new(self.root.clone())
    }

    /// True when the query contains a wildcard generic
    pub fn has_wildcards(&self) -> bool {
        self.generics.iter().any(TypeDescriptor::is_wildcard)
    }

    /// Whether this key, used as a query, selects `registered`
    pub fn is_compatible_with(&self, registered: &TypeKey) -> bool {
        if self.root != registered.root {
            return false;
        }
        if self.generics.is_empty() {
            return true;
        }
        self.generics.len() == registered.generics.len()
            && self
                .generics
                .iter()
                .zip(&registered.generics)
                .all(|(query, entry)| query.matches(entry))
    }
}

impl From<TypeDescriptor> for TypeKey {
    fn from(root: TypeDescriptor) -> Self {
        Self::new(root)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root)?;
        if !self.generics.is_empty() {
            let generics: Vec<&str> = self.generics.iter().map(TypeDescriptor::name).collect();
            write!(f, "<{}>", generics.join(", "))?;
        }
        Ok(())
    }
}
