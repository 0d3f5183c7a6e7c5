//! Composite Scope
//!
//! Delegates to an ordered list of child scopes. Lookups merge the
//! candidates of every child that owns the key into one list ordered by
//! provider order, registration sequence and then child position. The
//! conflict policy picks from that merged list and the child holding the
//! winner builds the instance, so a conflict between providers living in
//! different children is reported like any other.

use std::fmt;
use std::sync::Arc;

use weave_domain::error::{Error, Result};
use weave_domain::ports::{Candidate, ConflictResolver, Instance, Provider, Resolver};
use weave_domain::value_objects::TypeKey;

use super::{Lifecycle, Scope, ScopeState};
use crate::resolution::{ConflictPolicy, provider_identity};

/// Scope composed of child scopes
pub struct CompositeScope {
    name: String,
    lifecycle: Lifecycle,
    children: Vec<Arc<dyn Scope>>,
    policy: ConflictPolicy,
}

impl CompositeScope {
    /// Compose `children`, highest precedence first
    pub fn new(children: Vec<Arc<dyn Scope>>) -> Self {
        Self {
            name: "composite".to_string(),
            lifecycle: Lifecycle::default(),
            children,
            policy: ConflictPolicy::default(),
        }
    }

    /// Rename the scope
    pub fn named<S: Into<String>>(mut self, name: S) -> Self {
        self.name = name.into();
        self
    }

    /// Policy used by [`Resolver::resolve`]
    pub fn with_policy(mut self, policy: ConflictPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Child scopes, in precedence order
    pub fn children(&self) -> &[Arc<dyn Scope>] {
        &self.children
    }

    fn owned_candidates(&self, key: &TypeKey) -> Result<Vec<(usize, Candidate)>> {
        let mut merged = Vec::new();
        for (index, child) in self.children.iter().enumerate() {
            if child.owns(key) {
                merged.extend(child.candidates(key)?.into_iter().map(|c| (index, c)));
            }
        }
        merged.sort_by_key(|(index, candidate)| (candidate.order(), candidate.sequence, *index));
        Ok(merged)
    }

    /// Winning candidate across all owning children, with the child holding it
    fn pick(&self, key: &TypeKey, policy: &dyn ConflictResolver) -> Result<(usize, Candidate)> {
        let mut merged = self.owned_candidates(key)?;
        match merged.len() {
            0 => Err(Error::missing_bean(key.clone(), self.name.clone())),
            1 => Ok(merged.remove(0)),
            _ => {
                let candidates: Vec<Candidate> =
                    merged.iter().map(|(_, candidate)| candidate.clone()).collect();
                let winner = policy.select(key, &candidates)?;
                let identity = provider_identity(&winner.provider);
                merged
                    .into_iter()
                    .find(|(_, candidate)| {
                        candidate.key == winner.key
                            && provider_identity(&candidate.provider) == identity
                    })
                    .ok_or_else(|| {
                        Error::internal(format!(
                            "policy '{}' selected a provider outside the candidates for {key}",
                            policy.name()
                        ))
                    })
            }
        }
    }
}

impl Scope for CompositeScope {
    fn name(&self) -> &str {
        &self.name
    }

    fn state(&self) -> ScopeState {
        self.lifecycle.state()
    }

    /// Start this scope and every child not yet started
    fn start(&self) -> Result<()> {
        self.lifecycle.start(&self.name)?;
        for child in &self.children {
            if child.state() == ScopeState::NotStarted {
                child.start()?;
            }
        }
        Ok(())
    }

    /// Register into the first child owning the provider's type, else the first child
    fn register(&self, provider: Arc<dyn Provider>) -> Result<()> {
        self.lifecycle.ensure_not_started(&self.name)?;
        let key = provider.type_key();
        let child = self
            .children
            .iter()
            .find(|child| child.owns(&key))
            .or_else(|| self.children.first())
            .ok_or_else(|| Error::internal(format!("scope '{}' has no children", self.name)))?;
        child.register(provider)
    }

    fn owns(&self, key: &TypeKey) -> bool {
        self.children.iter().any(|child| child.owns(key))
    }

    fn candidates(&self, key: &TypeKey) -> Result<Vec<Candidate>> {
        self.lifecycle.ensure_started(&self.name)?;
        Ok(self
            .owned_candidates(key)?
            .into_iter()
            .map(|(_, candidate)| candidate)
            .collect())
    }

    fn select(&self, key: &TypeKey, policy: &dyn ConflictResolver) -> Result<Candidate> {
        self.lifecycle.ensure_started(&self.name)?;
        self.pick(key, policy).map(|(_, candidate)| candidate)
    }

    fn instantiate(&self, candidate: &Candidate, origin: &dyn Resolver) -> Result<Instance> {
        let identity = provider_identity(&candidate.provider);
        for child in self.children.iter().filter(|child| child.owns(&candidate.key)) {
            let held = child.candidates(&candidate.key)?;
            if held
                .iter()
                .any(|entry| provider_identity(&entry.provider) == identity)
            {
                return child.instantiate(candidate, origin);
            }
        }
        Err(Error::missing_bean(candidate.key.clone(), self.name.clone()))
    }

    fn size(&self) -> usize {
        self.children.iter().map(|child| child.size()).sum()
    }

    /// The policy sees every owning child's candidates; the winner's child builds it
    fn instance_for(
        &self,
        key: &TypeKey,
        policy: &dyn ConflictResolver,
        origin: &dyn Resolver,
    ) -> Result<Instance> {
        self.lifecycle.ensure_started(&self.name)?;
        let (index, candidate) = self.pick(key, policy)?;
        self.children[index].instantiate(&candidate, origin)
    }

    fn instances_for(&self, key: &TypeKey, origin: &dyn Resolver) -> Result<Vec<Instance>> {
        self.lifecycle.ensure_started(&self.name)?;
        self.owned_candidates(key)?
            .iter()
            .map(|(index, candidate)| self.children[*index].instantiate(candidate, origin))
            .collect()
    }
}

impl Resolver for CompositeScope {
    fn resolve_with(&self, key: &TypeKey, policy: &dyn ConflictResolver) -> Result<Instance> {
        self.instance_for(key, policy, self)
    }

    fn resolve(&self, key: &TypeKey) -> Result<Instance> {
        self.resolve_with(key, &self.policy)
    }

    fn resolve_all(&self, key: &TypeKey) -> Result<Vec<Instance>> {
        self.instances_for(key, self)
    }

    fn contains(&self, key: &TypeKey) -> bool {
        self.owns(key)
    }
}

impl fmt::Debug for CompositeScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let children: Vec<&str> = self.children.iter().map(|child| child.name()).collect();
        f.debug_struct("CompositeScope")
            .field("name", &self.name)
            .field("state", &self.state())
            .field("children", &children)
            .finish()
    }
}
