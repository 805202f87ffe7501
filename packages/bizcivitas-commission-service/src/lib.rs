//! # BizCivitas Commission Service
//!
//! Serves the commission engine to the admin dashboard so pages stop
//! re-deriving the split themselves. Policies are fetched from the
//! backend in the background; calculations read the cached snapshot.
//!
//! ## Quick Start
//! ```bash
//! cargo run --bin commission-service
//! ```
//!
//! ## Endpoints
//! - `GET /health` - Health check with policy snapshot status
//! - `GET /ready` - Readiness check
//! - `GET /metrics` - Prometheus metrics
//! - `GET /v1/policies` - Current policy snapshot
//! - `GET /v1/plans` - Membership catalog
//! - `POST /v1/breakdown` - Commission breakdown for a plan and amount
//! - `POST /v1/earnings` - The viewer's line of a commission record

pub mod config;
mod error;
mod handlers;
pub mod metrics;
mod middleware;
pub mod policy_source;
mod response;
mod router;
mod state;

pub use config::Config;
pub use error::Error;
pub use router::create as create_router;
pub use state::AppState;
