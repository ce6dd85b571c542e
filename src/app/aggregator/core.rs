//! Bounded fan-out resolving dataset names to their latest version
//!
//! Each call builds its own admission gate (a semaphore sized to the worker
//! budget), cancellation signal and outcome channel. Every name becomes one
//! spawned unit that waits at the gate, fetches, and reports its outcome. The
//! coordinating task keeps the first error, drains every remaining outcome and
//! joins the units before returning.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, info};

use super::config::AggregatorConfig;
use super::selection::select_latest;
use super::signal::CancellationSignal;
use super::VersionFetcher;
use crate::errors::ConfigResult;

/// Result of one unit of work
struct Outcome<V, E> {
    name: String,
    result: Result<V, E>,
}

/// Fetch of a single dataset name, admitted through the shared gate
struct Unit<F: VersionFetcher> {
    name: String,
    fetcher: Arc<F>,
    gate: Arc<Semaphore>,
    cancel: CancellationSignal,
    outcomes: mpsc::Sender<Outcome<F::Version, F::Error>>,
}

impl<F> Unit<F>
where
    F: VersionFetcher + 'static,
{
    async fn run(self) {
        if self.cancel.is_cancelled() {
            debug!("Abandoning dataset {:?}: cancelled before start", self.name);
            return;
        }

        let permit = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                debug!("Abandoning dataset {:?}: cancelled while waiting", self.name);
                return;
            }
            permit = self.gate.acquire() => match permit {
                Ok(permit) => permit,
                Err(_) => return,
            },
        };

        if self.cancel.is_cancelled() {
            debug!("Abandoning dataset {:?}: cancelled", self.name);
            return;
        }

        debug!("Fetching latest version of dataset {:?}", self.name);
        let result = self
            .fetcher
            .fetch_versions(&self.name)
            .await
            .map(select_latest);

        // fire before releasing the slot so the next waiter sees it
        if result.is_err() {
            self.cancel.cancel();
        }
        drop(permit);

        let _ = self
            .outcomes
            .send(Outcome {
                name: self.name,
                result,
            })
            .await;
    }
}

/// Resolves many dataset names to their latest version with bounded concurrency
#[derive(Debug)]
pub struct LatestVersionAggregator<F> {
    fetcher: Arc<F>,
    config: AggregatorConfig,
}

impl<F> LatestVersionAggregator<F>
where
    F: VersionFetcher + 'static,
{
    /// Create an aggregator over the given fetcher
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the configuration does not validate
    pub fn new(fetcher: Arc<F>, config: AggregatorConfig) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self { fetcher, config })
    }

    /// Get aggregator configuration
    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// Resolve every name to the latest of its versions
    ///
    /// Returns one entry per distinct name; a name whose version list is empty
    /// maps to `F::Version::default()`. On failure no partial result is
    /// returned: the first error reported by a unit is handed back exactly as
    /// the fetcher produced it, and any further outcomes are discarded.
    ///
    /// # Panics
    ///
    /// A panic inside the fetcher is resumed on the calling task once every
    /// unit has stopped.
    pub async fn resolve_latest_versions<I, S>(
        &self,
        names: I,
    ) -> Result<HashMap<String, F::Version>, F::Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            debug!("No datasets to resolve");
            return Ok(HashMap::new());
        }

        let start = Instant::now();
        let total = names.len();

        let gate = Arc::new(Semaphore::new(self.config.worker_count));
        let cancel = CancellationSignal::new();
        // every name produces at most one outcome, so sends never wait
        let (outcome_tx, mut outcome_rx) = mpsc::channel(total);

        debug!(
            "Resolving {} datasets, at most {} at a time",
            total, self.config.worker_count
        );

        let handles: Vec<_> = names
            .into_iter()
            .map(|name| {
                let unit = Unit {
                    name,
                    fetcher: Arc::clone(&self.fetcher),
                    gate: Arc::clone(&gate),
                    cancel: cancel.clone(),
                    outcomes: outcome_tx.clone(),
                };
                tokio::spawn(unit.run())
            })
            .collect();
        drop(outcome_tx);

        let mut latest = HashMap::with_capacity(total);
        let mut first_error = None;

        // closes once every unit has exited
        while let Some(Outcome { name, result }) = outcome_rx.recv().await {
            match result {
                Ok(version) if first_error.is_none() => {
                    latest.insert(name, version);
                }
                Ok(_) => {
                    debug!("Discarding result for dataset {:?} after failure", name);
                }
                Err(e) => {
                    if first_error.is_none() {
                        debug!("Fetching versions of dataset {:?} failed, cancelling", name);
                        cancel.cancel();
                        first_error = Some(e);
                    } else {
                        debug!("Dropping additional error for dataset {:?}", name);
                    }
                }
            }
        }

        for joined in join_all(handles).await {
            if let Err(e) = joined {
                if e.is_panic() {
                    std::panic::resume_unwind(e.into_panic());
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => {
                info!(
                    "Resolved latest versions of {} datasets in {:?}",
                    latest.len(),
                    start.elapsed()
                );
                Ok(latest)
            }
        }
    }

    /// List dataset names with `lister`, then resolve them
    pub async fn resolve_all<L>(&self, lister: &L) -> Result<HashMap<String, F::Version>, F::Error>
    where
        L: super::DatasetNameLister<Error = F::Error> + ?Sized,
    {
        let names = lister.list_dataset_names().await?;
        self.resolve_latest_versions(names).await
    }
}
