//! Clinicloud Billing
//!
//! Tiered pricing for clinics, independent practitioners and patients:
//! plan bracket selection, multi-site surcharges, billing-period discounts
//! and escalation to custom sales quotes.

pub mod calculator;
pub mod config;
pub mod error;
pub mod period;
pub mod plans;
pub mod registration;
pub mod service;
pub mod sites;

use rust_decimal::{Decimal, RoundingStrategy};

pub use calculator::{
    compute_billing, BillingCalculator, BillingQuote, BillingRequest, CustomQuote,
    IndividualQuote, QuoteBreakdown, QuoteKind, MAX_UNIT_PRICE,
};
pub use config::PricingConfig;
pub use error::{BillingError, BillingResult};
pub use period::PeriodCharge;
pub use plans::{requires_custom_quote, Plan, PlanAudience, PlanCatalog, PlanSelection};
pub use registration::{RegistrationClient, RegistrationPayload, RegistrationReceipt};
pub use service::{PlanQuote, PlanQuoteRequest, PlanRef, QuoteService};
pub use sites::{normalize_site_count, site_surcharge};

/// Round an amount to cents, half away from zero
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
