//! Tiered billing calculator
//!
//! Turns a [`BillingRequest`] into exactly one [`BillingQuote`]. Rules are
//! evaluated in a fixed order and the first match wins:
//!
//! 1. independent practitioner roles get a flat single-seat quote
//! 2. non-patients at or above the specialist or site thresholds get a
//!    custom quote, with no price computed
//! 3. patients are priced from their annual reference price
//! 4. everyone else pays `unit_price * specialists + site surcharge`,
//!    discounted by billing period
//!
//! Computation is pure and never fails. Malformed inputs are coerced (see
//! [`BillingRequest`]) because the quote is an advisory preview; the
//! authoritative charge is settled server-side.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use clinicloud_shared::{BillingPeriod, PatientPlan, Role, SiteCount};

use crate::config::PricingConfig;
use crate::period::{organization_charge, patient_charge, PeriodCharge};
use crate::plans::requires_custom_quote;
use crate::sites::{normalize_site_count, site_surcharge};
use crate::round_money;

/// Inputs to a quote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingRequest {
    #[serde(default)]
    pub role: Role,
    /// Price of the selected plan: the monthly seat price, or the annual
    /// reference price for patient plans
    #[serde(default)]
    pub unit_price: Decimal,
    #[serde(default)]
    pub period: BillingPeriod,
    #[serde(default)]
    pub site_count: SiteCount,
    #[serde(
        default = "clinicloud_shared::default_count",
        deserialize_with = "clinicloud_shared::lenient_count"
    )]
    pub specialist_count: u32,
    #[serde(default)]
    pub is_patient: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_plan: Option<PatientPlan>,
}

impl BillingRequest {
    /// Request for a role, deriving the patient flag from it
    pub fn new(role: Role, unit_price: Decimal, period: BillingPeriod) -> Self {
        Self {
            role,
            unit_price,
            period,
            site_count: SiteCount::default(),
            specialist_count: 1,
            is_patient: role.is_patient(),
            patient_plan: None,
        }
    }

    pub fn with_sites(mut self, site_count: impl Into<SiteCount>) -> Self {
        self.site_count = site_count.into();
        self
    }

    pub fn with_specialists(mut self, specialist_count: u32) -> Self {
        self.specialist_count = specialist_count;
        self
    }

    pub fn with_patient_plan(mut self, patient_plan: PatientPlan) -> Self {
        self.patient_plan = Some(patient_plan);
        self
    }
}

/// Discriminator of a [`BillingQuote`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteKind {
    Individual,
    Custom,
    Calculated,
}

/// The priced outcome of a [`BillingRequest`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BillingQuote {
    #[serde(rename = "INDIVIDUAL")]
    Individual(IndividualQuote),
    #[serde(rename = "CUSTOM")]
    Custom(CustomQuote),
    #[serde(rename = "CALCULATED")]
    Calculated(QuoteBreakdown),
}

/// Flat single-seat price for an independent practitioner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndividualQuote {
    pub months: u32,
    pub discount: Decimal,
    pub total: Decimal,
    pub monthly_equivalent: Decimal,
    pub label: String,
}

/// Escalation to a manual sales quote; carries the counts, never a price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomQuote {
    pub requires_quote: bool,
    pub specialist_count: u32,
    pub sede_count: u32,
}

impl CustomQuote {
    pub fn new(specialist_count: u32, sede_count: u32) -> Self {
        Self {
            requires_quote: true,
            specialist_count,
            sede_count,
        }
    }
}

/// Full breakdown of a self-service quote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteBreakdown {
    pub months: u32,
    /// Fraction discounted, e.g. `0.3`
    pub discount: Decimal,
    pub total: Decimal,
    /// Effective monthly price after discount (`total / months`)
    pub monthly_equivalent: Decimal,
    pub label: String,
    /// Unit price times specialist count, per month
    pub base_subtotal: Decimal,
    /// Multi-site surcharge, per month
    pub sedes_subtotal: Decimal,
    pub monthly_before_discount: Decimal,
    /// Discount as a percentage, e.g. `30`
    pub discount_percent: Decimal,
    pub total_charge: Decimal,
    pub billing_cycle: BillingPeriod,
    pub savings: Decimal,
    /// Monthly amount saved against buying an independent seat per
    /// specialist; display only
    pub vs_individual_savings: Decimal,
    pub specialist_count: u32,
    pub sede_count: u32,
    pub price_per_esp: Decimal,
}

impl BillingQuote {
    pub fn kind(&self) -> QuoteKind {
        match self {
            BillingQuote::Individual(_) => QuoteKind::Individual,
            BillingQuote::Custom(_) => QuoteKind::Custom,
            BillingQuote::Calculated(_) => QuoteKind::Calculated,
        }
    }

    /// Amount charged for the cycle, `None` for custom quotes
    pub fn total(&self) -> Option<Decimal> {
        match self {
            BillingQuote::Individual(q) => Some(q.total),
            BillingQuote::Custom(_) => None,
            BillingQuote::Calculated(q) => Some(q.total),
        }
    }

    pub fn requires_quote(&self) -> bool {
        matches!(self, BillingQuote::Custom(_))
    }

    /// Cadence the customer is billed at
    pub fn billing_cycle(&self) -> Option<BillingPeriod> {
        match self {
            BillingQuote::Individual(_) => Some(BillingPeriod::Monthly),
            BillingQuote::Custom(_) => None,
            BillingQuote::Calculated(q) => Some(q.billing_cycle),
        }
    }

    /// Copy with every monetary field rounded to cents
    pub fn rounded(&self) -> Self {
        match self {
            BillingQuote::Individual(q) => BillingQuote::Individual(IndividualQuote {
                total: round_money(q.total),
                monthly_equivalent: round_money(q.monthly_equivalent),
                ..q.clone()
            }),
            BillingQuote::Custom(q) => BillingQuote::Custom(q.clone()),
            BillingQuote::Calculated(q) => BillingQuote::Calculated(QuoteBreakdown {
                total: round_money(q.total),
                monthly_equivalent: round_money(q.monthly_equivalent),
                base_subtotal: round_money(q.base_subtotal),
                sedes_subtotal: round_money(q.sedes_subtotal),
                monthly_before_discount: round_money(q.monthly_before_discount),
                discount_percent: round_money(q.discount_percent),
                total_charge: round_money(q.total_charge),
                savings: round_money(q.savings),
                vs_individual_savings: round_money(q.vs_individual_savings),
                price_per_esp: round_money(q.price_per_esp),
                ..q.clone()
            }),
        }
    }
}

/// Largest unit price the engine prices as sent
pub const MAX_UNIT_PRICE: Decimal = dec!(1000000000000);

/// Quote engine bound to a set of pricing constants
#[derive(Debug, Clone, Default)]
pub struct BillingCalculator {
    config: PricingConfig,
}

impl BillingCalculator {
    pub fn new(config: PricingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    /// Normalized site count, shared by the threshold check, the surcharge
    /// and the displayed `sedeCount`
    pub fn normalize_sites(&self, site_count: SiteCount) -> u32 {
        normalize_site_count(site_count, &self.config)
    }

    pub fn site_surcharge(&self, site_count: SiteCount) -> Decimal {
        site_surcharge(self.normalize_sites(site_count), &self.config)
    }

    pub fn custom_quote(&self, specialist_count: u32, site_count: SiteCount) -> BillingQuote {
        BillingQuote::Custom(CustomQuote::new(
            specialist_count,
            self.normalize_sites(site_count),
        ))
    }

    /// Compute the quote for a request
    pub fn compute(&self, request: &BillingRequest) -> BillingQuote {
        let unit_price = if request.unit_price.is_sign_negative() && !request.unit_price.is_zero() {
            tracing::warn!(unit_price = %request.unit_price, "Negative unit price, clamping to zero");
            Decimal::ZERO
        } else if request.unit_price > MAX_UNIT_PRICE {
            tracing::warn!(unit_price = %request.unit_price, "Unit price out of range, clamping");
            MAX_UNIT_PRICE
        } else {
            request.unit_price
        };

        if request.role.is_independent_practitioner() {
            return BillingQuote::Individual(IndividualQuote {
                months: 1,
                discount: Decimal::ZERO,
                total: unit_price,
                monthly_equivalent: unit_price,
                label: "Plan individual".to_string(),
            });
        }

        let sites = self.normalize_sites(request.site_count);
        if requires_custom_quote(request.specialist_count, sites, request.is_patient, &self.config) {
            tracing::info!(
                role = %request.role,
                specialist_count = request.specialist_count,
                sede_count = sites,
                "Request escalated to custom quote"
            );
            return BillingQuote::Custom(CustomQuote::new(request.specialist_count, sites));
        }

        if request.is_patient {
            return BillingQuote::Calculated(self.patient_breakdown(unit_price, request.period));
        }

        BillingQuote::Calculated(self.organization_breakdown(
            unit_price,
            request.period,
            request.specialist_count,
            sites,
        ))
    }

    /// Patients see the amortized `annual / 12` rate as their monthly
    /// equivalent on every period, discounted or not
    fn patient_breakdown(&self, annual_price: Decimal, period: BillingPeriod) -> QuoteBreakdown {
        let charge = patient_charge(annual_price, period, &self.config);
        QuoteBreakdown {
            monthly_equivalent: charge.monthly_before_discount,
            ..breakdown(charge, charge.monthly_before_discount, Decimal::ZERO, Decimal::ZERO, 1, 1, annual_price)
        }
    }

    fn organization_breakdown(
        &self,
        unit_price: Decimal,
        period: BillingPeriod,
        specialist_count: u32,
        sites: u32,
    ) -> QuoteBreakdown {
        let specialists = if specialist_count == 0 {
            tracing::warn!("Specialist count of zero for organization quote, clamping to 1");
            1
        } else {
            specialist_count
        };

        let base_subtotal = unit_price.saturating_mul(Decimal::from(specialists));
        let sedes_subtotal = site_surcharge(sites, &self.config);
        let charge = organization_charge(
            base_subtotal.saturating_add(sedes_subtotal),
            period,
            &self.config,
        );

        let individual_cost =
            Decimal::from(specialists).saturating_mul(self.config.individual_seat_price);
        let vs_individual_savings = (individual_cost - charge.discounted_monthly).max(Decimal::ZERO);

        breakdown(
            charge,
            base_subtotal,
            sedes_subtotal,
            vs_individual_savings,
            specialists,
            sites,
            unit_price,
        )
    }
}

fn breakdown(
    charge: PeriodCharge,
    base_subtotal: Decimal,
    sedes_subtotal: Decimal,
    vs_individual_savings: Decimal,
    specialist_count: u32,
    sede_count: u32,
    price_per_esp: Decimal,
) -> QuoteBreakdown {
    QuoteBreakdown {
        months: charge.months,
        discount: charge.discount,
        total: charge.total,
        monthly_equivalent: charge.discounted_monthly,
        label: charge.period.label().to_string(),
        base_subtotal,
        sedes_subtotal,
        monthly_before_discount: charge.monthly_before_discount,
        discount_percent: charge.discount * Decimal::ONE_HUNDRED,
        total_charge: charge.total,
        billing_cycle: charge.period,
        savings: charge.savings,
        vs_individual_savings,
        specialist_count,
        sede_count,
        price_per_esp,
    }
}

/// Compute a quote with the default pricing constants
pub fn compute_billing(request: &BillingRequest) -> BillingQuote {
    BillingCalculator::default().compute(request)
}
