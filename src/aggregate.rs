//! Fan-out/fan-in of the independent fetches behind one view.
//!
//! Each leg is declared with a [`Criticality`]. All legs run concurrently
//! and all are awaited, regardless of completion order. A failed `Required`
//! leg fails the aggregation; a failed `Optional` leg is recorded in
//! [`Aggregated::degraded`] and has no entry in `values`.
//!
//! Nothing is cancelled. Once a required leg has failed the other results
//! are dropped unread.

use std::collections::{BTreeMap, BTreeSet};

use futures::future::{join_all, BoxFuture};
use thiserror::Error;

use crate::error::{ApiError, ApiResult, ErrorKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Criticality {
    Required,
    Optional,
}

/// A required leg failed
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{leg}: {error}")]
pub struct LegFailure {
    pub leg: &'static str,
    #[source]
    pub error: ApiError,
}

impl From<LegFailure> for ApiError {
    fn from(f: LegFailure) -> Self {
        f.error
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Aggregated<T> {
    pub values: BTreeMap<&'static str, T>,
    pub degraded: BTreeSet<&'static str>,
}

impl<T> Aggregated<T> {
    pub fn take(&mut self, leg: &str) -> Option<T> {
        self.values.remove(leg)
    }

    pub fn is_degraded(&self, leg: &str) -> bool {
        self.degraded.contains(leg)
    }
}

struct Leg<'a, T> {
    name: &'static str,
    criticality: Criticality,
    fetch: BoxFuture<'a, ApiResult<T>>,
}

/// Declared set of legs for one view. `T` is usually a per-view enum that
/// wraps each leg's payload.
pub struct Aggregation<'a, T> {
    legs: Vec<Leg<'a, T>>,
}

impl<'a, T: Send + 'a> Default for Aggregation<'a, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T: Send + 'a> Aggregation<'a, T> {
    pub fn new() -> Self {
        Self { legs: Vec::new() }
    }

    pub fn leg<F>(mut self, name: &'static str, criticality: Criticality, fetch: F) -> Self
    where
        F: std::future::Future<Output = ApiResult<T>> + Send + 'a,
    {
        debug_assert!(
            self.legs.iter().all(|l| l.name != name),
            "duplicate aggregation leg {name}"
        );
        self.legs.push(Leg {
            name,
            criticality,
            fetch: Box::pin(fetch),
        });
        self
    }

    pub fn required<F>(self, name: &'static str, fetch: F) -> Self
    where
        F: std::future::Future<Output = ApiResult<T>> + Send + 'a,
    {
        self.leg(name, Criticality::Required, fetch)
    }

    pub fn optional<F>(self, name: &'static str, fetch: F) -> Self
    where
        F: std::future::Future<Output = ApiResult<T>> + Send + 'a,
    {
        self.leg(name, Criticality::Optional, fetch)
    }

    /// Run every leg and combine.
    ///
    /// When several required legs fail, the one declared first is reported,
    /// so the outcome depends only on which legs failed, not on timing.
    pub async fn run(self) -> Result<Aggregated<T>, LegFailure> {
        let (meta, fetches): (Vec<_>, Vec<_>) = self
            .legs
            .into_iter()
            .map(|l| ((l.name, l.criticality), l.fetch))
            .unzip();

        let outcomes = join_all(fetches).await;

        let mut values = BTreeMap::new();
        let mut degraded = BTreeSet::new();
        let mut failure: Option<LegFailure> = None;

        for ((name, criticality), outcome) in meta.into_iter().zip(outcomes) {
            match (outcome, criticality) {
                (Ok(v), _) => {
                    values.insert(name, v);
                }
                (Err(error), Criticality::Required) => {
                    log::warn!("[aggregate] required leg {name} failed: {error}");
                    if failure.is_none() {
                        failure = Some(LegFailure { leg: name, error });
                    }
                }
                (Err(error), Criticality::Optional) => {
                    if error.kind == ErrorKind::NotFound {
                        log::debug!("[aggregate] optional leg {name} absent: {error}");
                    } else {
                        log::warn!("[aggregate] optional leg {name} degraded: {error}");
                    }
                    degraded.insert(name);
                }
            }
        }

        match failure {
            Some(f) => Err(f),
            None => Ok(Aggregated { values, degraded }),
        }
    }
}
