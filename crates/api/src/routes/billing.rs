//! Billing routes: quote previews and registration submission

use axum::{extract::State, http::StatusCode, Json};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use clinicloud_billing::{
    BillingQuote, BillingRequest, PlanQuote, PlanQuoteRequest, PricingConfig, RegistrationPayload,
};

use crate::{error::ApiError, state::AppState};

/// Response for a plan quote preview
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanQuoteResponse {
    #[serde(flatten)]
    pub quote: PlanQuote,
    /// Quote as it would be submitted, rounded to cents
    pub rounded: BillingQuote,
}

/// Request to register an account with its chosen plan
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Account fields forwarded untouched to the registration API
    #[serde(default)]
    pub account: Map<String, Value>,
    #[serde(flatten)]
    pub plan: PlanQuoteRequest,
}

/// Response after a registration has been forwarded
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub plan: Option<String>,
    pub total: Option<Decimal>,
    pub requires_quote: bool,
    pub registration: Value,
}

/// Price a request whose unit price the UI already knows
pub async fn quote(
    State(state): State<AppState>,
    Json(req): Json<BillingRequest>,
) -> Json<BillingQuote> {
    Json(state.quotes.quote(&req))
}

/// Choose the plan for a role and counts, then price it
pub async fn plan_quote(
    State(state): State<AppState>,
    Json(req): Json<PlanQuoteRequest>,
) -> Result<Json<PlanQuoteResponse>, ApiError> {
    let quote = state.quotes.quote_plan(&req)?;
    let rounded = quote.quote.rounded();
    Ok(Json(PlanQuoteResponse { quote, rounded }))
}

/// Pricing constants, so the UI can explain surcharges and discounts
pub async fn pricing(State(state): State<AppState>) -> Json<PricingConfig> {
    Json(state.quotes.calculator().config().clone())
}

/// Recompute the quote server-side and forward the registration
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let client = state.registration.as_ref().ok_or(ApiError::ServiceUnavailable)?;

    if req.account.is_empty() {
        return Err(ApiError::BadRequest("account details are required".to_string()));
    }

    let quote = state.quotes.quote_plan(&req.plan)?;
    let payload = RegistrationPayload::new(req.account, &quote);
    let receipt = client.submit(&payload).await?;

    tracing::info!(
        role = %payload.role,
        plan = ?payload.plan,
        requires_quote = payload.requires_quote,
        upstream_status = receipt.status,
        "Registration forwarded"
    );

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            plan: payload.plan,
            total: payload.total,
            requires_quote: payload.requires_quote,
            registration: receipt.body,
        }),
    ))
}
