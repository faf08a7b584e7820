//! Scenario execution pipeline.
//!
//! The [`Orchestrator`] runs one [`ScenarioDefinition`] against a live
//! [`Backend`]: stages execute strictly in order, every element set is
//! resolved fresh from the page, and each decision point goes through the
//! pure selectors in [`crate::selection`].

use crate::backend::{Backend, BackendError};
use crate::config::{CartpathConfig, SettleMode};
use crate::fixture::{Fixture, FixtureError, FixtureStore};
use crate::scenario::{ScenarioDefinition, ScenarioRegistry, Stage, Validatable, ValidationError};
use crate::selection::{SelectionError, pick, selectable};
use cartpath_common::protocol::{ElementHandle, Marker, Role};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Fixture(#[from] FixtureError),

    #[error("Scenario not found: {0}")]
    ScenarioNotFound(String),

    #[error("Invalid scenario: {0}")]
    InvalidScenario(#[from] ValidationError),

    #[error("Stage {stage}: no elements matched role '{role}' ({locator})")]
    EmptyCandidateSet {
        stage: usize,
        role: Role,
        locator: String,
    },

    #[error("Stage {stage}: role '{role}' did not appear within {waited_ms}ms")]
    StageTimeout {
        stage: usize,
        role: Role,
        waited_ms: u64,
    },

    #[error("Stage {stage}: cannot resolve URL '{url}': {reason}")]
    InvalidUrl {
        stage: usize,
        url: String,
        reason: String,
    },

    #[error("Failed to seed cookie '{name}': {source}")]
    Cookie {
        name: String,
        #[source]
        source: BackendError,
    },

    #[error("Stage {stage}: backend error: {source}")]
    Backend {
        stage: usize,
        #[source]
        source: BackendError,
    },
}

/// What one stage did.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StageOutcome {
    Navigated {
        url: String,
    },
    Waited {
        waited_ms: u64,
    },
    /// `index` is relative to the candidates the pick was made from, which
    /// for variant stages is the filtered set.
    Clicked {
        role: Role,
        index: usize,
        candidates: usize,
        element: ElementHandle,
    },
    /// Every option on the axis was already selected.
    Skipped {
        role: Role,
        candidates: usize,
    },
}

/// Summary of a completed run. The seed replays the same choices.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub scenario: String,
    pub seed: u64,
    pub outcomes: Vec<StageOutcome>,
}

impl RunReport {
    /// Outcomes of stages that clicked something.
    pub fn clicks(&self) -> impl Iterator<Item = &StageOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, StageOutcome::Clicked { .. }))
    }
}

/// Resolve the fixture and definition for `name` and check they fit
/// together, without touching a browser.
///
/// The fixture is looked up first, so a name known to neither side fails
/// with [`FixtureError::FixtureNotFound`].
pub fn prepare<'r>(
    registry: &'r ScenarioRegistry,
    fixtures: &'r FixtureStore,
    name: &str,
) -> Result<(&'r ScenarioDefinition, &'r Fixture), RunError> {
    let fixture = fixtures.resolve(name)?;
    let definition = registry
        .get(name)
        .ok_or_else(|| RunError::ScenarioNotFound(name.to_string()))?;
    definition.validate()?;
    for role in definition.required_roles() {
        if fixture.locator(role).is_none() {
            return Err(FixtureError::MissingLocator {
                fixture: name.to_string(),
                role,
            }
            .into());
        }
    }
    Ok((definition, fixture))
}

pub struct Orchestrator<'a, B: Backend + ?Sized> {
    backend: &'a mut B,
    registry: &'a ScenarioRegistry,
    fixtures: &'a FixtureStore,
    config: &'a CartpathConfig,
}

impl<'a, B: Backend + ?Sized> Orchestrator<'a, B> {
    pub fn new(
        backend: &'a mut B,
        registry: &'a ScenarioRegistry,
        fixtures: &'a FixtureStore,
        config: &'a CartpathConfig,
    ) -> Self {
        Self {
            backend,
            registry,
            fixtures,
            config,
        }
    }

    /// Run the scenario called `name` to its terminal click.
    ///
    /// Without a seed a fresh one is drawn; either way it is logged and
    /// returned in the report. Every failure aborts the run.
    pub async fn run(&mut self, name: &str, seed: Option<u64>) -> Result<RunReport, RunError> {
        let (definition, fixture) = prepare(self.registry, self.fixtures, name)?;

        let seed = seed.unwrap_or_else(rand::random);
        let mut rng = StdRng::seed_from_u64(seed);
        info!(scenario = name, seed, stages = definition.stages.len(), "Starting scenario run");

        let marker = fixture
            .selected_marker
            .clone()
            .unwrap_or_else(|| self.config.variants.selected_marker.clone());

        let mut cookies_pending = !self.config.session.cookies.is_empty();
        let mut outcomes = Vec::with_capacity(definition.stages.len());
        for (idx, stage) in definition.stages.iter().enumerate() {
            debug!(stage = idx, kind = stage.kind(), "Entering stage");
            let outcome = match stage {
                Stage::Navigate { url } => {
                    let outcome = self.navigate(idx, url).await?;
                    if cookies_pending {
                        cookies_pending = false;
                        if self.seed_cookies().await? > 0 {
                            // Reload so the storefront sees the session.
                            self.navigate(idx, url).await?;
                        }
                    }
                    outcome
                }
                Stage::Wait { delay_ms, role } => {
                    let waited = match (self.config.settle.mode, role) {
                        (SettleMode::Poll, Some(role)) => {
                            let timeout = self.config.settle.timeout();
                            self.await_role(idx, *role, fixture, timeout).await?
                        }
                        _ => {
                            let delay = Duration::from_millis(*delay_ms);
                            tokio::time::sleep(delay).await;
                            delay
                        }
                    };
                    StageOutcome::Waited {
                        waited_ms: waited.as_millis() as u64,
                    }
                }
                Stage::WaitFor { role, timeout_ms } => {
                    let timeout = timeout_ms
                        .map(Duration::from_millis)
                        .unwrap_or_else(|| self.config.settle.timeout());
                    let waited = self.await_role(idx, *role, fixture, timeout).await?;
                    StageOutcome::Waited {
                        waited_ms: waited.as_millis() as u64,
                    }
                }
                Stage::PickAndClick { role, within } => {
                    self.pick_and_click(idx, *role, *within, fixture, &mut rng)
                        .await?
                }
                Stage::PickVariant { role } => {
                    self.pick_variant(idx, *role, fixture, &marker, &mut rng)
                        .await?
                }
                Stage::Click { role } => self.click_first(idx, *role, fixture).await?,
            };
            outcomes.push(outcome);
        }

        info!(scenario = name, seed, "Scenario run complete");
        Ok(RunReport {
            scenario: name.to_string(),
            seed,
            outcomes,
        })
    }

    fn locator(fixture: &Fixture, role: Role) -> &str {
        // prepare() checked every required role
        fixture.locator(role).unwrap_or_default()
    }

    async fn navigate(&mut self, stage: usize, url: &str) -> Result<StageOutcome, RunError> {
        let target = url::Url::parse(&self.config.base_url)
            .and_then(|base| base.join(url))
            .map_err(|e| RunError::InvalidUrl {
                stage,
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        info!("Navigating to: {}", target);
        let result = self
            .backend
            .navigate(target.as_str())
            .await
            .map_err(|source| RunError::Backend { stage, source })?;
        Ok(StageOutcome::Navigated { url: result.url })
    }

    /// Returns how many cookies were handed to the browser.
    async fn seed_cookies(&mut self) -> Result<usize, RunError> {
        let mut seeded = 0;
        for spec in &self.config.session.cookies {
            let Some(cookie) = spec.resolve() else {
                warn!(cookie = %spec.name, "No value available for cookie, skipping");
                continue;
            };
            debug!(cookie = %cookie.name, "Seeding cookie");
            self.backend
                .set_cookie(cookie)
                .await
                .map_err(|source| RunError::Cookie {
                    name: spec.name.clone(),
                    source,
                })?;
            seeded += 1;
        }
        Ok(seeded)
    }

    /// Poll until `role` matches at least one element.
    async fn await_role(
        &mut self,
        stage: usize,
        role: Role,
        fixture: &Fixture,
        timeout: Duration,
    ) -> Result<Duration, RunError> {
        let locator = Self::locator(fixture, role);
        let interval = self.config.settle.poll_interval();
        let started = Instant::now();
        loop {
            let found = self.query(stage, locator).await?;
            if !found.is_empty() {
                debug!(%role, matched = found.len(), "Role settled");
                return Ok(started.elapsed());
            }
            let elapsed = started.elapsed();
            if elapsed >= timeout {
                return Err(RunError::StageTimeout {
                    stage,
                    role,
                    waited_ms: elapsed.as_millis() as u64,
                });
            }
            tokio::time::sleep(interval.min(timeout - elapsed)).await;
        }
    }

    async fn pick_and_click(
        &mut self,
        stage: usize,
        role: Role,
        within: Option<Role>,
        fixture: &Fixture,
        rng: &mut StdRng,
    ) -> Result<StageOutcome, RunError> {
        let locator = Self::locator(fixture, role);
        let candidates = match within {
            None => self.query(stage, locator).await?,
            Some(scope_role) => {
                let scope_locator = Self::locator(fixture, scope_role);
                let scopes = self.query(stage, scope_locator).await?;
                if scopes.is_empty() {
                    return Err(RunError::EmptyCandidateSet {
                        stage,
                        role: scope_role,
                        locator: scope_locator.to_string(),
                    });
                }
                let mut candidates = Vec::new();
                for scope in &scopes {
                    let found = self
                        .backend
                        .query_within(scope, locator)
                        .await
                        .map_err(|source| RunError::Backend { stage, source })?;
                    candidates.extend(found);
                }
                debug!(scopes = scopes.len(), candidates = candidates.len(), %role, "Resolved scoped candidates");
                candidates
            }
        };

        let index = pick(&candidates, rng).map_err(|SelectionError::EmptyCandidateSet| {
            RunError::EmptyCandidateSet {
                stage,
                role,
                locator: locator.to_string(),
            }
        })?;
        let element = candidates[index];
        info!(%role, index, of = candidates.len(), "Picked candidate");
        self.click(stage, &element).await?;

        Ok(StageOutcome::Clicked {
            role,
            index,
            candidates: candidates.len(),
            element,
        })
    }

    async fn pick_variant(
        &mut self,
        stage: usize,
        role: Role,
        fixture: &Fixture,
        marker: &Marker,
        rng: &mut StdRng,
    ) -> Result<StageOutcome, RunError> {
        let locator = Self::locator(fixture, role);
        let options = self.query(stage, locator).await?;
        if options.is_empty() {
            return Err(RunError::EmptyCandidateSet {
                stage,
                role,
                locator: locator.to_string(),
            });
        }

        let mut marked = Vec::with_capacity(options.len());
        for option in &options {
            let selected = self
                .backend
                .has_marker(option, marker)
                .await
                .map_err(|source| RunError::Backend { stage, source })?;
            marked.push((*option, selected));
        }

        let free = selectable(marked, |(_, selected)| *selected);
        if free.is_empty() {
            info!(%role, options = options.len(), "No selectable variant, skipping stage");
            return Ok(StageOutcome::Skipped {
                role,
                candidates: options.len(),
            });
        }

        let index = pick(&free, rng).map_err(|SelectionError::EmptyCandidateSet| {
            RunError::EmptyCandidateSet {
                stage,
                role,
                locator: locator.to_string(),
            }
        })?;
        let (element, _) = free[index];
        info!(%role, index, of = free.len(), "Picked variant");
        self.click(stage, &element).await?;

        Ok(StageOutcome::Clicked {
            role,
            index,
            candidates: free.len(),
            element,
        })
    }

    async fn click_first(
        &mut self,
        stage: usize,
        role: Role,
        fixture: &Fixture,
    ) -> Result<StageOutcome, RunError> {
        let locator = Self::locator(fixture, role);
        let found = self.query(stage, locator).await?;
        let Some(element) = found.first().copied() else {
            return Err(RunError::EmptyCandidateSet {
                stage,
                role,
                locator: locator.to_string(),
            });
        };
        if found.len() > 1 {
            debug!(%role, matched = found.len(), "Several matches, clicking the first");
        }
        info!(%role, "Clicking");
        self.click(stage, &element).await?;

        Ok(StageOutcome::Clicked {
            role,
            index: 0,
            candidates: found.len(),
            element,
        })
    }

    async fn query(&mut self, stage: usize, locator: &str) -> Result<Vec<ElementHandle>, RunError> {
        self.backend
            .query(locator)
            .await
            .map_err(|source| RunError::Backend { stage, source })
    }

    async fn click(&mut self, stage: usize, element: &ElementHandle) -> Result<(), RunError> {
        self.backend
            .click(element)
            .await
            .map_err(|source| RunError::Backend { stage, source })
    }
}
