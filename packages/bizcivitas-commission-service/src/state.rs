//! Application state shared across handlers.

use crate::config::Config;
use crate::policy_source::PolicySource;
use std::sync::atomic::AtomicU64;
use std::time::Instant;
use tracing::info;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub policies: PolicySource,
    pub start_time: Instant,
    pub request_count: AtomicU64,
}

impl AppState {
    /// Create application state from configuration.
    pub fn new(config: Config) -> Result<Self, crate::Error> {
        if config.plans.is_empty() {
            return Err(crate::Error::Config(
                "membership catalog is empty; configure at least one plan".into(),
            ));
        }

        let policies = PolicySource::new(&config)?;

        info!(plans = config.plans.len(), "Loaded membership catalog");

        Ok(Self {
            config,
            policies,
            start_time: Instant::now(),
            request_count: AtomicU64::new(0),
        })
    }
}
