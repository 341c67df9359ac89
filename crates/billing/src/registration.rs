//! Registration payload and submission
//!
//! The chosen plan and its quote are the only durable output of the
//! billing flow. They travel to the external registration API inside the
//! account payload, with every amount rounded to cents.

use std::time::Duration;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;

use clinicloud_shared::{BillingPeriod, Role};

use crate::calculator::BillingQuote;
use crate::error::{BillingError, BillingResult};
use crate::service::PlanQuote;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const RETRY_BASE_DELAY_MS: u64 = 2;
const RETRY_FACTOR: u64 = 50;
const RETRY_MAX_DELAY: Duration = Duration::from_secs(5);
const DEFAULT_MAX_RETRIES: usize = 3;

/// Payload keys computed here; account fields may not override them
const RESERVED_KEYS: [&str; 7] = [
    "role",
    "plan",
    "billingCycle",
    "total",
    "requiresQuote",
    "billing",
    "quotedAt",
];

/// Body posted to `/api/register`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationPayload {
    /// Account fields collected by the form (name, email, ...), passed through
    #[serde(flatten)]
    pub account: Map<String, Value>,
    pub role: Role,
    /// Plan slug, absent for custom quotes
    pub plan: Option<String>,
    pub billing_cycle: Option<BillingPeriod>,
    /// Cycle total rounded to cents, absent for custom quotes
    pub total: Option<Decimal>,
    pub requires_quote: bool,
    pub billing: BillingQuote,
    #[serde(with = "time::serde::rfc3339")]
    pub quoted_at: OffsetDateTime,
}

impl RegistrationPayload {
    pub fn new(mut account: Map<String, Value>, quote: &PlanQuote) -> Self {
        for key in RESERVED_KEYS {
            if account.remove(key).is_some() {
                tracing::warn!(key = key, "Dropping account field shadowed by the quote");
            }
        }

        let billing = quote.quote.rounded();
        Self {
            account,
            role: quote.role,
            plan: quote.plan.as_ref().map(|p| p.slug.clone()),
            billing_cycle: billing.billing_cycle(),
            total: billing.total(),
            requires_quote: billing.requires_quote(),
            billing,
            quoted_at: OffsetDateTime::now_utc(),
        }
    }
}

/// Acknowledgement returned by the registration API
#[derive(Debug, Clone, PartialEq)]
pub struct RegistrationReceipt {
    pub status: u16,
    pub body: Value,
}

/// HTTP client for the external registration API
#[derive(Debug, Clone)]
pub struct RegistrationClient {
    http: reqwest::Client,
    endpoint: String,
    max_retries: usize,
}

impl RegistrationClient {
    /// Client posting to `{base_url}/api/register`
    pub fn new(base_url: &str) -> BillingResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| BillingError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            endpoint: format!("{}/api/register", base_url.trim_end_matches('/')),
            max_retries: DEFAULT_MAX_RETRIES,
        })
    }

    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Submit a registration, retrying transport failures and 5xx responses
    /// with exponential backoff
    pub async fn submit(&self, payload: &RegistrationPayload) -> BillingResult<RegistrationReceipt> {
        use tokio_retry::strategy::{jitter, ExponentialBackoff};
        use tokio_retry::Retry;

        let retry_strategy = ExponentialBackoff::from_millis(RETRY_BASE_DELAY_MS)
            .factor(RETRY_FACTOR)
            .max_delay(RETRY_MAX_DELAY)
            .take(self.max_retries)
            .map(jitter);

        Retry::spawn(retry_strategy, || async move {
            let result = self.send(payload).await;
            match &result {
                Err(e) if e.is_transient() => {
                    tracing::warn!(endpoint = %self.endpoint, error = %e, "Registration failed - will retry");
                    Err(result)
                }
                _ => Ok(result),
            }
        })
        .await
        .unwrap_or_else(|e| e)
    }

    async fn send(&self, payload: &RegistrationPayload) -> BillingResult<RegistrationReceipt> {
        let response = self.http.post(&self.endpoint).json(payload).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(BillingError::Registration {
                status: status.as_u16(),
                message: text,
            });
        }

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text)?
        };

        tracing::info!(
            plan = ?payload.plan,
            total = ?payload.total,
            requires_quote = payload.requires_quote,
            "Registration submitted"
        );

        Ok(RegistrationReceipt {
            status: status.as_u16(),
            body,
        })
    }
}
