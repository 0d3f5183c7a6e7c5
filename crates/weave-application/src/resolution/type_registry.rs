//! Type Registries
//!
//! A [`TypeRegistry`] holds every provider registered under one root type.
//! Entries are append-only during loading and indexed by their exact generic
//! specialization so that fully specified lookups skip the linear scan.
//! [`Registries`] is the aggregate keyed by root type.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use weave_domain::error::{Error, Result};
use weave_domain::ports::{Candidate, ConflictResolver, Provider};
use weave_domain::value_objects::{TypeDescriptor, TypeKey};

/// Identity of a provider object, stable for the lifetime of its `Arc`
pub fn provider_identity(provider: &Arc<dyn Provider>) -> usize {
    Arc::as_ptr(provider).cast::<()>() as usize
}

fn by_order(candidates: &mut [Candidate]) {
    candidates.sort_by_key(|candidate| (candidate.order(), candidate.sequence));
}

/// Every provider registered for one root type
#[derive(Clone, Debug)]
pub struct TypeRegistry {
    root: TypeDescriptor,
    entries: Vec<Candidate>,
    specializations: HashMap<Vec<TypeDescriptor>, Vec<usize>>,
}

impl TypeRegistry {
    /// Empty registry for `root`
    pub fn new(root: TypeDescriptor) -> Self {
        Self {
            root,
            entries: Vec::new(),
            specializations: HashMap::new(),
        }
    }

    /// Root type served by this registry
    pub fn root(&self) -> &TypeDescriptor {
        &self.root
    }

    /// Whether `(key, provider)` is already registered
    pub fn contains_entry(&self, key: &TypeKey, provider: &Arc<dyn Provider>) -> bool {
        let identity = provider_identity(provider);
        self.entries
            .iter()
            .any(|entry| entry.key == *key && provider_identity(&entry.provider) == identity)
    }

    /// Append an entry.
    ///
    /// # Errors
    ///
    /// [`Error::DuplicateProvider`] when the same provider is already
    /// registered under the same key.
    pub fn register(
        &mut self,
        key: TypeKey,
        provider: Arc<dyn Provider>,
        sequence: usize,
    ) -> Result<()> {
        if self.contains_entry(&key, &provider) {
            return Err(Error::duplicate_provider(key, provider.name()));
        }
        self.specializations
            .entry(key.generics().to_vec())
            .or_default()
            .push(self.entries.len());
        self.entries.push(Candidate {
            key,
            provider,
            sequence,
        });
        Ok(())
    }

    /// Entries compatible with `query`, sorted by order then sequence
    pub fn candidates(&self, query: &TypeKey) -> Vec<Candidate> {
        let mut candidates: Vec<Candidate> = if query.is_raw() {
            self.entries.clone()
        } else if !query.has_wildcards() {
            self.specializations
                .get(query.generics())
                .map(|indexes| {
                    indexes
                        .iter()
                        .map(|&index| self.entries[index].clone())
                        .collect()
                })
                .unwrap_or_default()
        } else {
            self.entries
                .iter()
                .filter(|entry| query.is_compatible_with(&entry.key))
                .cloned()
                .collect()
        };
        by_order(&mut candidates);
        candidates
    }

    /// Whether any entry is compatible with `query`
    pub fn contains(&self, query: &TypeKey) -> bool {
        self.entries
            .iter()
            .any(|entry| query.is_compatible_with(&entry.key))
    }

    /// Reduce the compatible entries to one.
    ///
    /// A single candidate is returned as is; the policy is consulted only
    /// when several providers compete.
    pub fn resolve(&self, query: &TypeKey, policy: &dyn ConflictResolver) -> Result<Candidate> {
        let mut candidates = self.candidates(query);
        match candidates.len() {
            0 => Err(Error::no_provider(query.clone())),
            1 => Ok(candidates.remove(0)),
            _ => policy.select(query, &candidates),
        }
    }

    /// Every compatible entry, ordered
    pub fn resolve_all(&self, query: &TypeKey) -> Vec<Candidate> {
        self.candidates(query)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct keys registered here
    pub fn keys(&self) -> impl Iterator<Item = &TypeKey> {
        self.entries.iter().map(|entry| &entry.key)
    }
}

/// All type registries plus the providers that populated them
#[derive(Clone, Default)]
pub struct Registries {
    registries: HashMap<TypeDescriptor, TypeRegistry>,
    providers: Vec<(Arc<dyn Provider>, usize)>,
    next_sequence: usize,
}

impl Registries {
    /// Empty aggregate
    pub fn new() -> Self {
        Self::default()
    }

    fn keys_of(provider: &Arc<dyn Provider>) -> Vec<TypeKey> {
        let mut keys = vec![provider.type_key()];
        for key in provider.additional_types() {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        keys
    }

    /// Register a provider under its declared type and every additional type.
    ///
    /// Returns the registration sequence. A duplicate leaves the aggregate
    /// untouched.
    pub fn register(&mut self, provider: Arc<dyn Provider>) -> Result<usize> {
        let sequence = self.next_sequence;
        self.insert(provider, sequence)?;
        self.next_sequence += 1;
        Ok(sequence)
    }

    fn insert(&mut self, provider: Arc<dyn Provider>, sequence: usize) -> Result<()> {
        let keys = Self::keys_of(&provider);
        if let Some(key) = keys.iter().find(|key| {
            self.registries
                .get(key.root())
                .is_some_and(|registry| registry.contains_entry(key, &provider))
        }) {
            return Err(Error::duplicate_provider(key.clone(), provider.name()));
        }

        for key in keys {
            self.registries
                .entry(key.root().clone())
                .or_insert_with(|| TypeRegistry::new(key.root().clone()))
                .register(key, Arc::clone(&provider), sequence)?;
        }
        self.providers.push((provider, sequence));
        Ok(())
    }

    /// Sub-aggregate holding only the providers accepted by `keep`.
    ///
    /// Registration sequences are preserved so ordering stays comparable
    /// across the parts.
    ///
    /// # Errors
    ///
    /// [`Error::DuplicateProvider`] if the source aggregate holds the same
    /// entry twice.
    pub fn filter<F>(&self, mut keep: F) -> Result<Registries>
    where
        F: FnMut(&Arc<dyn Provider>) -> bool,
    {
        let mut filtered = Registries {
            next_sequence: self.next_sequence,
            ..Registries::default()
        };
        for (provider, sequence) in &self.providers {
            if keep(provider) {
                filtered.insert(Arc::clone(provider), *sequence)?;
            }
        }
        Ok(filtered)
    }

    /// Registry for a root type, if any provider declared it
    pub fn registry(&self, root: &TypeDescriptor) -> Option<&TypeRegistry> {
        self.registries.get(root)
    }

    /// Whether any provider answers `query`
    pub fn contains(&self, query: &TypeKey) -> bool {
        self.registries
            .get(query.root())
            .is_some_and(|registry| registry.contains(query))
    }

    /// Compatible candidates for `query`, ordered
    pub fn candidates(&self, query: &TypeKey) -> Vec<Candidate> {
        self.registries
            .get(query.root())
            .map(|registry| registry.candidates(query))
            .unwrap_or_default()
    }

    /// Pick one candidate for `query` using `policy`
    pub fn resolve(&self, query: &TypeKey, policy: &dyn ConflictResolver) -> Result<Candidate> {
        self.registries
            .get(query.root())
            .ok_or_else(|| Error::no_provider(query.clone()))?
            .resolve(query, policy)
    }

    /// Every candidate for `query`, ordered
    pub fn resolve_all(&self, query: &TypeKey) -> Vec<Candidate> {
        self.candidates(query)
    }

    /// Registered providers, in registration order
    pub fn providers(&self) -> impl Iterator<Item = &Arc<dyn Provider>> {
        self.providers.iter().map(|(provider, _)| provider)
    }

    /// Number of registered providers
    pub fn provider_count(&self) -> usize {
        self.providers.len()
    }

    /// Every key with at least one provider, sorted and deduplicated
    pub fn registered_types(&self) -> Vec<TypeKey> {
        self.registries
            .values()
            .flat_map(TypeRegistry::keys)
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

impl std::fmt::Debug for Registries {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registries")
            .field("providers", &self.providers.len())
            .field("types", &self.registries.len())
            .finish()
    }
}
