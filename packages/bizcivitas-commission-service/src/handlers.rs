//! HTTP request handlers.

use crate::metrics::METRICS;
use crate::middleware::RequestId;
use crate::response::{
    BreakdownResponse, EarningsResponse, HealthResponse, PlanView, PlansResponse,
    PoliciesResponse, PolicyStats,
};
use crate::state::AppState;
use crate::Error;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use bizcivitas_commission::{
    calculate_with_warning, earnings_for_role, select_policy_for_plan, Calculation, Commission,
    MembershipPlan, Viewer,
};
use serde::Deserialize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

/// Readiness check. 200 once a non-empty policy snapshot is loaded.
pub async fn ready(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    if state.policies.snapshot().policies.is_empty() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    }
}

/// Prometheus metrics in text exposition format.
pub async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.policies.snapshot();
    let body = METRICS.render(snapshot.policies.len(), snapshot.active_count());
    (
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4",
        )],
        body,
    )
}

/// Health check with policy snapshot status.
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.policies.snapshot();
    let active = snapshot.active_count();

    Json(HealthResponse {
        status: if active > 0 { "ok" } else { "degraded" },
        uptime_secs: state.start_time.elapsed().as_secs(),
        requests: state.request_count.load(Ordering::Relaxed),
        policies: PolicyStats {
            total: snapshot.policies.len(),
            active,
            source: snapshot.origin,
            last_refresh_secs_ago: snapshot.loaded_at.elapsed().as_secs(),
            refresh_failures: state.policies.failure_count(),
        },
    })
}

/// Current policy snapshot. `GET /v1/policies`
pub async fn policies(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.policies.snapshot();
    Json(PoliciesResponse {
        success: true,
        origin: snapshot.origin,
        policies: snapshot.policies.clone(),
    })
}

/// Membership catalog. `GET /v1/plans`
pub async fn plans(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(PlansResponse {
        success: true,
        plans: state.config.plans.iter().map(PlanView::from).collect(),
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakdownRequest {
    pub membership_plan: String,
    /// Custom amount typed by the user; wins over the catalog price.
    #[serde(default)]
    pub base_amount: Option<f64>,
    #[serde(default)]
    pub payment_component: Option<String>,
}

/// Split a payment across the plan's recipients. `POST /v1/breakdown`
pub async fn breakdown(
    State(state): State<Arc<AppState>>,
    Extension(req_id): Extension<RequestId>,
    payload: Result<Json<BreakdownRequest>, JsonRejection>,
) -> Result<Json<BreakdownResponse>, Error> {
    let start = std::time::Instant::now();
    let Json(request) = payload.inspect_err(|e| reject_body(&req_id, e))?;
    METRICS.breakdown_total.fetch_add(1, Ordering::Relaxed);
    state.request_count.fetch_add(1, Ordering::Relaxed);

    let plan = MembershipPlan::find(&state.config.plans, &request.membership_plan);
    let base_amount = resolve_base_amount(plan, &request)?;

    let snapshot = state.policies.snapshot();
    let policy = select_policy_for_plan(&snapshot.policies, &request.membership_plan);

    let (calculation, mismatch) = calculate_with_warning(base_amount, policy).map_err(|e| {
        METRICS.invalid_amount.fetch_add(1, Ordering::Relaxed);
        warn!(req_id = %req_id.0, plan = %request.membership_plan, error = %e, "Rejected breakdown");
        Error::from(e)
    })?;

    let response = match calculation {
        Calculation::Breakdown(breakdown) => {
            if let Some(m) = &mismatch {
                warn!(
                    req_id = %req_id.0,
                    plan = %request.membership_plan,
                    difference = m.difference,
                    "Policy shares do not sum to pool percentage"
                );
            }
            info!(
                req_id = %req_id.0,
                plan = %request.membership_plan,
                base_amount,
                "Breakdown calculated"
            );
            BreakdownResponse::available(
                request.membership_plan,
                plan.map(MembershipPlan::final_recipient_label),
                breakdown,
                mismatch,
            )
        }
        Calculation::PolicyUnavailable => {
            METRICS.breakdown_unavailable.fetch_add(1, Ordering::Relaxed);
            info!(req_id = %req_id.0, plan = %request.membership_plan, "No active policy");
            BreakdownResponse::unavailable(request.membership_plan)
        }
    };

    METRICS.record_duration(start);
    Ok(Json(response))
}

/// Base amount precedence: explicit amount, then catalog price, then zero.
fn resolve_base_amount(
    plan: Option<&MembershipPlan>,
    request: &BreakdownRequest,
) -> Result<f64, Error> {
    if let Some(amount) = request.base_amount {
        return Ok(amount);
    }
    match &request.payment_component {
        Some(component) => plan
            .and_then(|p| p.component(component))
            .map(|c| c.base_amount)
            .ok_or_else(|| {
                Error::NotFound(format!(
                    "payment component '{component}' for plan '{}'",
                    request.membership_plan
                ))
            }),
        None => Ok(0.0),
    }
}

#[derive(Debug, Deserialize)]
pub struct EarningsRequest {
    pub commission: Commission,
    pub viewer: Viewer,
}

/// The viewer's own line of a commission record. `POST /v1/earnings`
pub async fn earnings(
    State(state): State<Arc<AppState>>,
    Extension(req_id): Extension<RequestId>,
    payload: Result<Json<EarningsRequest>, JsonRejection>,
) -> Result<Json<EarningsResponse>, Error> {
    let Json(request) = payload.inspect_err(|e| reject_body(&req_id, e))?;
    METRICS.earnings_total.fetch_add(1, Ordering::Relaxed);
    state.request_count.fetch_add(1, Ordering::Relaxed);

    let earning = earnings_for_role(&request.commission, &request.viewer);
    info!(
        req_id = %req_id.0,
        role = ?request.viewer.role,
        found = earning.is_some(),
        "Earnings lookup"
    );

    Ok(Json(EarningsResponse {
        success: true,
        earning,
    }))
}

fn reject_body(req_id: &RequestId, rejection: &JsonRejection) {
    warn!(req_id = %req_id.0, error = %rejection.body_text(), "Rejected request body");
}
