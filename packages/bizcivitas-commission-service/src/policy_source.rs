//! Distribution policy source.
//!
//! Fetches the policy list from the backend, retries with exponential
//! backoff, and keeps the last good snapshot when a refresh fails.
//! Calculations only ever read a snapshot.

use crate::config::Config;
use crate::metrics::METRICS;
use crate::Error;
use bizcivitas_commission::DistributionPolicy;
use serde::Serialize;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Max retry attempts per refresh.
const MAX_RETRIES: u32 = 2;
/// Base delay for exponential backoff (ms).
const BASE_DELAY_MS: u64 = 200;

/// Where the current snapshot came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotOrigin {
    Empty,
    Seeded,
    Fetched,
}

/// Immutable policy list shared with handlers.
#[derive(Debug)]
pub struct PolicySnapshot {
    pub policies: Vec<DistributionPolicy>,
    pub origin: SnapshotOrigin,
    pub loaded_at: Instant,
}

impl PolicySnapshot {
    fn new(policies: Vec<DistributionPolicy>, origin: SnapshotOrigin) -> Self {
        Self {
            policies,
            origin,
            loaded_at: Instant::now(),
        }
    }

    pub fn active_count(&self) -> usize {
        self.policies.iter().filter(|p| p.is_active).count()
    }
}

/// Cached view of the backend's distribution policies.
pub struct PolicySource {
    client: reqwest::Client,
    url: Option<String>,
    token: Option<String>,
    snapshot: RwLock<Arc<PolicySnapshot>>,
    refresh_failures: AtomicU64,
}

impl PolicySource {
    pub fn new(config: &Config) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.policy_fetch_timeout_ms))
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {e}")))?;

        let seeded = keep_valid(config.policies.clone());
        let origin = if seeded.is_empty() {
            SnapshotOrigin::Empty
        } else {
            SnapshotOrigin::Seeded
        };

        info!(
            url = config.policy_source_url.as_deref().unwrap_or("none"),
            seeded = seeded.len(),
            "Policy source initialized"
        );

        Ok(Self {
            client,
            url: config.policy_source_url.clone(),
            token: config.policy_source_token.clone(),
            snapshot: RwLock::new(Arc::new(PolicySnapshot::new(seeded, origin))),
            refresh_failures: AtomicU64::new(0),
        })
    }

    /// Current snapshot. Cheap; never blocks on a fetch.
    pub fn snapshot(&self) -> Arc<PolicySnapshot> {
        let guard = self.snapshot.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }

    fn replace(&self, policies: Vec<DistributionPolicy>, origin: SnapshotOrigin) {
        let next = Arc::new(PolicySnapshot::new(policies, origin));
        let mut guard = self.snapshot.write().unwrap_or_else(|e| e.into_inner());
        *guard = next;
    }

    pub fn is_remote(&self) -> bool {
        self.url.is_some()
    }

    pub fn failure_count(&self) -> u64 {
        self.refresh_failures.load(Ordering::Relaxed)
    }

    /// Fetch and swap in a new snapshot. On failure the old one stays.
    pub async fn refresh(&self) -> Result<usize, Error> {
        let Some(url) = self.url.as_deref() else {
            return Ok(self.snapshot().policies.len());
        };
        METRICS.policy_refresh_total.fetch_add(1, Ordering::Relaxed);

        let mut last_err = None;
        for attempt in 0..=MAX_RETRIES {
            if attempt > 0 {
                let delay = retry_delay(attempt - 1);
                warn!(attempt, delay_ms = delay.as_millis() as u64, "Retrying policy fetch");
                tokio::time::sleep(delay).await;
            }

            match self.fetch(url).await {
                Ok(policies) => {
                    let count = policies.len();
                    self.replace(policies, SnapshotOrigin::Fetched);
                    info!(policies = count, "Policy snapshot refreshed");
                    return Ok(count);
                }
                Err(e) => last_err = Some(e),
            }
        }

        self.refresh_failures.fetch_add(1, Ordering::Relaxed);
        METRICS.policy_refresh_errors.fetch_add(1, Ordering::Relaxed);
        Err(last_err.unwrap_or_else(|| Error::PolicySource("no attempt made".into())))
    }

    async fn fetch(&self, url: &str) -> Result<Vec<DistributionPolicy>, Error> {
        let mut request = self.client.get(url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::PolicySource(format!("request failed: {e}")))?
            .error_for_status()
            .map_err(|e| Error::PolicySource(format!("bad status: {e}")))?;

        let body: Value = response
            .json()
            .await
            .map_err(|e| Error::PolicySource(format!("invalid JSON body: {e}")))?;

        parse_policies(body)
    }

    /// Refresh every `every` until cancelled.
    pub async fn run_refresher(&self, every: Duration, cancel: CancellationToken) {
        if !self.is_remote() {
            return;
        }
        let mut interval = tokio::time::interval(every);
        // First tick fires immediately; start-up already fetched once.
        interval.tick().await;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Policy refresher stopped");
                    return;
                }
                _ = interval.tick() => {
                    if let Err(e) = self.refresh().await {
                        let snapshot = self.snapshot();
                        warn!(
                            error = %e,
                            stale_secs = snapshot.loaded_at.elapsed().as_secs(),
                            "Policy refresh failed, keeping previous snapshot"
                        );
                    }
                }
            }
        }
    }
}

/// Decode a backend response: a bare array or `{"data": [...]}`.
/// Malformed or out-of-range records are dropped, not fatal.
pub fn parse_policies(body: Value) -> Result<Vec<DistributionPolicy>, Error> {
    let records = match body {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(Error::PolicySource(
                    "expected an array or an object with a 'data' array".into(),
                ))
            }
        },
        _ => {
            return Err(Error::PolicySource(
                "expected an array or an object with a 'data' array".into(),
            ))
        }
    };

    let mut policies = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        match serde_json::from_value::<DistributionPolicy>(record) {
            Ok(policy) => policies.push(policy),
            Err(e) => warn!(index, error = %e, "Skipping malformed policy record"),
        }
    }
    Ok(keep_valid(policies))
}

fn keep_valid(policies: Vec<DistributionPolicy>) -> Vec<DistributionPolicy> {
    policies
        .into_iter()
        .filter(|policy| match policy.validate() {
            Ok(()) => {
                if let Some(mismatch) = policy.share_mismatch() {
                    warn!(
                        plan = %policy.membership_plan_id,
                        shares_total = mismatch.shares_total,
                        pool = mismatch.total_pool_percentage,
                        "Policy shares do not sum to pool percentage"
                    );
                }
                true
            }
            Err(e) => {
                warn!(plan = %policy.membership_plan_id, error = %e, "Dropping invalid policy");
                false
            }
        })
        .collect()
}

/// Retry delay for attempt n (0-indexed).
fn retry_delay(attempt: u32) -> Duration {
    Duration::from_millis(BASE_DELAY_MS * 2u64.pow(attempt))
}
