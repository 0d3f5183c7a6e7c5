//! Resolution Engine
//!
//! Loads providers in rounds until a fixed point:
//!
//! ```text
//! announce ──► unconditional? ──yes──► Registries
//!                  │ no
//!                  ▼
//!               pending ──round──► eligible against round-start state ──► Registries
//!                  │                           │
//!                  │                  zero progress / cap reached
//!                  ▼                           ▼
//!               (next round)               dropped (logged)
//! ```
//!
//! Every pending provider is evaluated against the registry state as it was
//! at the start of the round, in stable announcement order, so the set
//! applied per round is reproducible.
//!
//! Registering the unconditional providers counts as the first round. Each
//! conditional round that applies at least one provider counts as one more;
//! the closing round that finds nothing to apply is not counted. A chain of
//! depth D therefore reports D + 1 rounds whether or not some provider is
//! left unsatisfied.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, error, info, warn};
use weave_domain::constants::DEFAULT_WARN_ROUNDS;
use weave_domain::error::Error;
use weave_domain::ports::{ConditionContext, Environment, Provider, ProviderSource};
use weave_domain::value_objects::TypeKey;

use crate::condition::ConditionEvaluators;
use crate::resolution::type_registry::Registries;

/// Summary of one load cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Rounds that registered something, the unconditional pass included
    pub rounds: usize,
    /// Conditional providers registered across all rounds
    pub applied_conditional: usize,
    /// Providers registered in total
    pub registered: usize,
    /// Registrations skipped as duplicates
    pub duplicates: usize,
    /// Names of providers whose condition never held
    pub dropped: Vec<String>,
    /// True when the round cap stopped the loop
    pub capped: bool,
}

impl fmt::Display for LoadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Applied {} conditional providers in {} rounds",
            self.applied_conditional, self.rounds
        )
    }
}

/// Result of a single round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundOutcome {
    /// 1-based round number, counted the same way as [`LoadReport::rounds`]
    pub round: usize,
    /// Providers registered this round
    pub applied: usize,
    /// Providers still pending afterwards
    pub pending: usize,
}

/// Read-only view handed to condition evaluators
struct LoadContext<'a> {
    registries: &'a Registries,
    environment: &'a dyn Environment,
}

impl ConditionContext for LoadContext<'_> {
    fn contains(&self, key: &TypeKey) -> bool {
        self.registries.contains(key)
    }

    fn environment(&self) -> &dyn Environment {
        self.environment
    }
}

/// Multi-round conditional loader
pub struct ResolutionEngine {
    registries: Registries,
    pending: Vec<Arc<dyn Provider>>,
    evaluators: ConditionEvaluators,
    environment: Arc<dyn Environment>,
    max_rounds: Option<usize>,
    warn_rounds: usize,
    unconditional: bool,
    conditional_rounds: usize,
    applied: usize,
    duplicates: usize,
    capped: bool,
    settled: bool,
    dropped: Vec<String>,
}

impl ResolutionEngine {
    /// Engine with no round cap
    pub fn new(evaluators: ConditionEvaluators, environment: Arc<dyn Environment>) -> Self {
        Self {
            registries: Registries::new(),
            pending: Vec::new(),
            evaluators,
            environment,
            max_rounds: None,
            warn_rounds: DEFAULT_WARN_ROUNDS,
            unconditional: false,
            conditional_rounds: 0,
            applied: 0,
            duplicates: 0,
            capped: false,
            settled: false,
            dropped: Vec::new(),
        }
    }

    /// Stop after `max_rounds` rounds (`None` = unlimited)
    pub fn with_max_rounds(mut self, max_rounds: Option<usize>) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    /// Warn when convergence takes more than `warn_rounds` rounds
    pub fn with_warn_rounds(mut self, warn_rounds: usize) -> Self {
        self.warn_rounds = warn_rounds;
        self
    }

    /// Announce every provider of a source
    pub fn add_source(&mut self, source: &dyn ProviderSource) {
        let providers = source.providers();
        debug!(source = source.name(), count = providers.len(), "Reading provider source");
        for provider in providers {
            self.announce(provider);
        }
    }

    /// Announce one provider.
    ///
    /// Unconditional providers are registered immediately, as part of the
    /// first round; conditional ones wait for the next round.
    pub fn announce(&mut self, provider: Arc<dyn Provider>) {
        self.settled = false;
        if provider.condition().is_some() {
            debug!(provider = %provider.name(), "Provider pending on condition");
            self.pending.push(provider);
        } else if self.register(provider) {
            self.unconditional = true;
        }
    }

    /// Rounds counted so far
    pub fn rounds(&self) -> usize {
        usize::from(self.unconditional) + self.conditional_rounds
    }

    fn register(&mut self, provider: Arc<dyn Provider>) -> bool {
        let name = provider.name();
        match self.registries.register(provider) {
            Ok(sequence) => {
                debug!(provider = %name, sequence, "Registered provider");
                true
            }
            Err(err @ Error::DuplicateProvider { .. }) => {
                warn!("Skipping duplicate registration: {}", err);
                self.duplicates += 1;
                false
            }
            Err(err) => {
                error!(provider = %name, "Registration failed: {}", err);
                false
            }
        }
    }

    fn is_eligible(&self, provider: &Arc<dyn Provider>, context: &LoadContext<'_>) -> bool {
        let Some(condition) = provider.condition() else {
            return true;
        };
        match self.evaluators.evaluate(&condition, context) {
            Ok(satisfied) => satisfied,
            Err(err) => {
                error!(provider = %provider.name(), condition = %condition, "{}", err);
                false
            }
        }
    }

    /// Run one round over the pending providers
    pub fn run_round(&mut self) -> RoundOutcome {
        let eligible: Vec<bool> = {
            let context = LoadContext {
                registries: &self.registries,
                environment: self.environment.as_ref(),
            };
            self.pending
                .iter()
                .map(|provider| self.is_eligible(provider, &context))
                .collect()
        };

        let mut applied = 0;
        let mut still_pending = Vec::with_capacity(self.pending.len());
        for (provider, ready) in std::mem::take(&mut self.pending).into_iter().zip(eligible) {
            if !ready {
                still_pending.push(provider);
            } else if self.register(provider) {
                applied += 1;
            }
        }
        self.pending = still_pending;
        self.applied += applied;
        if applied > 0 {
            self.conditional_rounds += 1;
        }

        let outcome = RoundOutcome {
            round: self.rounds() + usize::from(applied == 0),
            applied,
            pending: self.pending.len(),
        };
        debug!(
            round = outcome.round,
            applied = outcome.applied,
            pending = outcome.pending,
            "Conditional round finished"
        );
        outcome
    }

    /// Run rounds until no pending provider can be applied.
    ///
    /// Returns the number of conditional rounds executed by this call,
    /// including a closing round that applied nothing. Unsatisfied providers
    /// stay pending; calling again without new announcements executes no
    /// round at all.
    pub fn converge(&mut self) -> usize {
        let mut executed = 0;
        while !self.settled && !self.pending.is_empty() {
            if self.max_rounds.is_some_and(|max| self.rounds() >= max) {
                self.capped = true;
                warn!(
                    max_rounds = self.rounds(),
                    pending = self.pending.len(),
                    "Round cap reached before conditions converged; consider reordering provider conditions"
                );
                break;
            }
            executed += 1;
            if self.run_round().applied == 0 {
                self.settled = true;
            }
        }
        if executed > 0 && self.rounds() > self.warn_rounds {
            warn!(
                rounds = self.rounds(),
                threshold = self.warn_rounds,
                "Conditional loading needed many rounds; consider reordering provider conditions"
            );
        }
        executed
    }

    /// Converge, then drop whatever is still pending.
    pub fn load(&mut self) -> LoadReport {
        self.converge();
        for provider in std::mem::take(&mut self.pending) {
            let name = provider.name();
            warn!(
                provider = %name,
                condition = %provider.condition().map(|c| c.to_string()).unwrap_or_default(),
                "Dropping provider: condition never satisfied"
            );
            self.dropped.push(name);
        }

        let report = self.report();
        info!(
            registered = report.registered,
            dropped = report.dropped.len(),
            "{}",
            report
        );
        report
    }

    /// Snapshot of the counters so far
    pub fn report(&self) -> LoadReport {
        LoadReport {
            rounds: self.rounds(),
            applied_conditional: self.applied,
            registered: self.registries.provider_count(),
            duplicates: self.duplicates,
            dropped: self.dropped.clone(),
            capped: self.capped,
        }
    }

    /// Providers still waiting on their condition
    pub fn pending(&self) -> impl Iterator<Item = &Arc<dyn Provider>> {
        self.pending.iter()
    }

    /// Registered providers so far
    pub fn registries(&self) -> &Registries {
        &self.registries
    }

    /// Hand over the registries after loading
    pub fn into_registries(self) -> Registries {
        self.registries
    }
}

impl fmt::Debug for ResolutionEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolutionEngine")
            .field("registries", &self.registries)
            .field("pending", &self.pending.len())
            .field("rounds", &self.rounds())
            .field("max_rounds", &self.max_rounds)
            .field("settled", &self.settled)
            .finish()
    }
}
