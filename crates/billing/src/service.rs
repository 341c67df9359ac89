//! Plan-aware quoting
//!
//! Glues the catalog to the calculator: the UI sends a role, counts and a
//! period, and gets back the chosen plan together with its quote.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use clinicloud_shared::{BillingPeriod, PatientPlan, Role, SiteCount};

use crate::calculator::{BillingCalculator, BillingQuote, BillingRequest};
use crate::error::BillingResult;
use crate::plans::{PlanCatalog, PlanSelection};

/// Quote inputs before a plan has been chosen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanQuoteRequest {
    pub role: Role,
    #[serde(default)]
    pub period: BillingPeriod,
    #[serde(default)]
    pub site_count: SiteCount,
    #[serde(
        default = "clinicloud_shared::default_count",
        deserialize_with = "clinicloud_shared::lenient_count"
    )]
    pub specialist_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_plan: Option<PatientPlan>,
}

/// Reference to the plan a quote was computed for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRef {
    pub slug: String,
    pub label: String,
}

/// A quote together with the plan it prices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanQuote {
    pub role: Role,
    /// `None` when the request was escalated to a custom quote
    pub plan: Option<PlanRef>,
    pub quote: BillingQuote,
}

/// Selects plans and prices them
#[derive(Debug, Clone)]
pub struct QuoteService {
    catalog: Arc<PlanCatalog>,
    calculator: Arc<BillingCalculator>,
}

impl QuoteService {
    pub fn new(catalog: Arc<PlanCatalog>, calculator: Arc<BillingCalculator>) -> Self {
        Self { catalog, calculator }
    }

    pub fn catalog(&self) -> &PlanCatalog {
        &self.catalog
    }

    pub fn calculator(&self) -> &BillingCalculator {
        &self.calculator
    }

    /// Price a raw request whose unit price is already known
    pub fn quote(&self, request: &BillingRequest) -> BillingQuote {
        self.calculator.compute(request)
    }

    /// Choose a plan for the request and price it
    pub fn quote_plan(&self, request: &PlanQuoteRequest) -> BillingResult<PlanQuote> {
        let selection = self.catalog.select(
            request.role,
            request.specialist_count,
            request.patient_plan,
            self.calculator.config(),
        )?;

        let plan = match selection {
            PlanSelection::Plan(plan) => plan,
            PlanSelection::CustomQuote => {
                return Ok(PlanQuote {
                    role: request.role,
                    plan: None,
                    quote: self
                        .calculator
                        .custom_quote(request.specialist_count, request.site_count),
                });
            }
        };

        let billing_request = BillingRequest {
            role: request.role,
            unit_price: plan.unit_price(),
            period: request.period,
            site_count: request.site_count,
            specialist_count: request.specialist_count,
            is_patient: request.role.is_patient(),
            patient_plan: request.patient_plan,
        };
        let quote = self.calculator.compute(&billing_request);

        tracing::debug!(
            role = %request.role,
            plan = %plan.slug,
            period = %request.period,
            total = ?quote.total(),
            "Computed plan quote"
        );

        // Site escalation happens inside the calculator; drop the plan then
        let plan = (!quote.requires_quote()).then(|| PlanRef {
            slug: plan.slug.clone(),
            label: plan.label.clone(),
        });

        Ok(PlanQuote {
            role: request.role,
            plan,
            quote,
        })
    }
}

impl Default for QuoteService {
    fn default() -> Self {
        Self::new(
            Arc::new(PlanCatalog::default()),
            Arc::new(BillingCalculator::default()),
        )
    }
}
