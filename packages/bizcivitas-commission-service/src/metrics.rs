//! Prometheus metrics (lock-free atomics, zero allocation on hot path).

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

pub static METRICS: Metrics = Metrics::new();

pub struct Metrics {
    // --- Calculations ---
    pub breakdown_total: AtomicU64,
    pub breakdown_unavailable: AtomicU64,
    pub invalid_amount: AtomicU64,
    pub earnings_total: AtomicU64,

    // --- Latency (μs, updated via CAS) ---
    pub handler_duration_us_sum: AtomicU64,
    pub handler_duration_us_max: AtomicU64,

    // --- Policy source ---
    pub policy_refresh_total: AtomicU64,
    pub policy_refresh_errors: AtomicU64,
}

impl Metrics {
    const fn new() -> Self {
        Self {
            breakdown_total: AtomicU64::new(0),
            breakdown_unavailable: AtomicU64::new(0),
            invalid_amount: AtomicU64::new(0),
            earnings_total: AtomicU64::new(0),
            handler_duration_us_sum: AtomicU64::new(0),
            handler_duration_us_max: AtomicU64::new(0),
            policy_refresh_total: AtomicU64::new(0),
            policy_refresh_errors: AtomicU64::new(0),
        }
    }

    pub fn record_duration(&self, start: Instant) {
        let us = start.elapsed().as_micros() as u64;
        self.handler_duration_us_sum.fetch_add(us, Ordering::Relaxed);
        // CAS loop for max tracking
        let mut cur = self.handler_duration_us_max.load(Ordering::Relaxed);
        while us > cur {
            match self.handler_duration_us_max.compare_exchange_weak(
                cur,
                us,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(actual) => cur = actual,
            }
        }
    }

    /// Render in Prometheus text exposition format.
    pub fn render(&self, policies_loaded: usize, policies_active: usize) -> String {
        let breakdown_total = self.breakdown_total.load(Ordering::Relaxed);
        let breakdown_unavailable = self.breakdown_unavailable.load(Ordering::Relaxed);
        let invalid_amount = self.invalid_amount.load(Ordering::Relaxed);
        let earnings_total = self.earnings_total.load(Ordering::Relaxed);
        let dur_sum = self.handler_duration_us_sum.load(Ordering::Relaxed);
        let dur_max = self.handler_duration_us_max.swap(0, Ordering::Relaxed);
        let refresh_total = self.policy_refresh_total.load(Ordering::Relaxed);
        let refresh_errors = self.policy_refresh_errors.load(Ordering::Relaxed);

        // Convert μs to seconds for Prometheus conventions
        let dur_sum_s = dur_sum as f64 / 1_000_000.0;
        let dur_max_s = dur_max as f64 / 1_000_000.0;

        format!(
            "\
# HELP commission_breakdown_total Breakdown requests received.\n\
# TYPE commission_breakdown_total counter\n\
commission_breakdown_total {breakdown_total}\n\
# HELP commission_breakdown_unavailable_total Breakdowns with no active policy.\n\
# TYPE commission_breakdown_unavailable_total counter\n\
commission_breakdown_unavailable_total {breakdown_unavailable}\n\
# HELP commission_invalid_amount_total Requests rejected for an invalid base amount.\n\
# TYPE commission_invalid_amount_total counter\n\
commission_invalid_amount_total {invalid_amount}\n\
# HELP commission_earnings_total Earnings lookups.\n\
# TYPE commission_earnings_total counter\n\
commission_earnings_total {earnings_total}\n\
# HELP commission_handler_duration_seconds_sum Total handler time (seconds).\n\
# TYPE commission_handler_duration_seconds_sum counter\n\
commission_handler_duration_seconds_sum {dur_sum_s:.6}\n\
# HELP commission_handler_duration_seconds_max Max handler time since last scrape (seconds).\n\
# TYPE commission_handler_duration_seconds_max gauge\n\
commission_handler_duration_seconds_max {dur_max_s:.6}\n\
# HELP commission_policy_refresh_total Policy fetches attempted.\n\
# TYPE commission_policy_refresh_total counter\n\
commission_policy_refresh_total {refresh_total}\n\
# HELP commission_policy_refresh_errors_total Policy fetches that failed after retries.\n\
# TYPE commission_policy_refresh_errors_total counter\n\
commission_policy_refresh_errors_total {refresh_errors}\n\
# HELP commission_policies_loaded Policies in the current snapshot.\n\
# TYPE commission_policies_loaded gauge\n\
commission_policies_loaded {policies_loaded}\n\
# HELP commission_policies_active Active policies in the current snapshot.\n\
# TYPE commission_policies_active gauge\n\
commission_policies_active {policies_active}\n"
        )
    }
}
