//! Sync Engine - Orchestrates a release check over all starred repositories
//!
//! A run loads the baseline, lists the account's starred repositories, resolves
//! each one's latest release in listing order and saves the updated baseline.
//! The first error ends the run before anything is saved, so the previous
//! baseline survives untouched. Only the first page of the starred listing is
//! read, and entries for repositories that are no longer starred are kept.

use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::error::Result;
use crate::github::{starred_path, ApiQuery, StarredRepo};
use crate::release::{ReleaseOutcome, ReleaseResolver};
use crate::state::StateStore;

/// Outcome for one repository of the run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoReport {
    pub full_name: String,
    pub outcome: ReleaseOutcome,
}

/// Results from a complete sync run
#[derive(Debug, Clone)]
pub struct SyncSummary {
    pub account: String,
    /// Reports in listing order
    pub repositories: Vec<RepoReport>,
    pub duration: Duration,
}

impl SyncSummary {
    pub fn total(&self) -> usize {
        self.repositories.len()
    }

    pub fn changed(&self) -> impl Iterator<Item = &RepoReport> {
        self.repositories.iter().filter(|r| r.outcome.is_changed())
    }

    pub fn changed_count(&self) -> usize {
        self.changed().count()
    }

    pub fn unchanged_count(&self) -> usize {
        self.repositories
            .iter()
            .filter(|r| matches!(r.outcome, ReleaseOutcome::Unchanged { .. }))
            .count()
    }

    pub fn no_release_count(&self) -> usize {
        self.repositories
            .iter()
            .filter(|r| r.outcome == ReleaseOutcome::NoReleases)
            .count()
    }
}

/// The sync engine that drives a single run
pub struct SyncEngine<C> {
    client: C,
    store: StateStore,
}

impl<C: ApiQuery> SyncEngine<C> {
    pub fn new(client: C, store: StateStore) -> Self {
        Self { client, store }
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// Run a complete sync for `account`
    pub async fn run(&self, account: &str) -> Result<SyncSummary> {
        let start_time = Instant::now();

        let mut baseline = self.store.load()?;
        let starred = self.list_starred(account).await?;

        let resolver = ReleaseResolver::new(&self.client);
        let mut repositories = Vec::with_capacity(starred.len());

        for full_name in starred {
            let outcome = resolver
                .resolve(&full_name, baseline.previous_tag(&full_name))
                .await?;
            baseline.record(full_name.clone(), outcome.tag());
            repositories.push(RepoReport { full_name, outcome });
        }

        self.store.save(&baseline)?;

        let summary = SyncSummary {
            account: account.to_string(),
            repositories,
            duration: start_time.elapsed(),
        };

        info!(
            "Sync completed in {:.2}s: {} changed, {} unchanged, {} without releases",
            summary.duration.as_secs_f64(),
            summary.changed_count(),
            summary.unchanged_count(),
            summary.no_release_count()
        );

        Ok(summary)
    }

    /// Full names of the starred repositories, in listing order
    pub async fn list_starred(&self, account: &str) -> Result<Vec<String>> {
        info!("Get starred projects by {} ...", account);

        let response = self.client.query(&starred_path(account)).await?;
        debug!("Starred listing returned status {}", response.status);

        let starred: Vec<StarredRepo> =
            response.json(format!("starred repositories of {}", account))?;
        let names: Vec<String> = starred.into_iter().map(|r| r.full_name).collect();

        info!("found {} starred project", names.len());
        Ok(names)
    }
}
