//! Billing period pricing
//!
//! Organizations pay a monthly total discounted by period length.
//! Patients only have an annual reference price; shorter periods amortize
//! it over twelve months.

use rust_decimal::Decimal;

use clinicloud_shared::BillingPeriod;

use crate::config::PricingConfig;

/// Result of applying a billing period to a monthly amount
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodCharge {
    pub period: BillingPeriod,
    pub months: u32,
    /// Fraction discounted, e.g. `0.30`
    pub discount: Decimal,
    /// Monthly amount before the period discount
    pub monthly_before_discount: Decimal,
    /// Monthly amount after the period discount
    pub discounted_monthly: Decimal,
    /// Amount charged for the whole cycle
    pub total: Decimal,
    /// Cycle amount saved against paying `monthly_before_discount` every month
    pub savings: Decimal,
}

impl PeriodCharge {
    fn discounted(period: BillingPeriod, monthly: Decimal, discount: Decimal) -> Self {
        let months = Decimal::from(period.months());
        let discounted_monthly = monthly * (Decimal::ONE - discount);
        let total = discounted_monthly.saturating_mul(months);
        Self {
            period,
            months: period.months(),
            discount,
            monthly_before_discount: monthly,
            discounted_monthly,
            total,
            savings: (monthly.saturating_mul(months) - total).max(Decimal::ZERO),
        }
    }
}

/// Apply the organization discount schedule to a monthly total
pub fn organization_charge(
    monthly_total: Decimal,
    period: BillingPeriod,
    config: &PricingConfig,
) -> PeriodCharge {
    let discount = match period {
        BillingPeriod::Monthly => Decimal::ZERO,
        BillingPeriod::Quarterly => config.organization_quarterly_discount,
        BillingPeriod::Annual => config.organization_annual_discount,
    };
    PeriodCharge::discounted(period, monthly_total, discount)
}

/// Price a patient plan from its annual reference price
///
/// The annual cycle charges the reference price as-is. Monthly and
/// quarterly cycles derive a monthly rate of `annual / 12`; quarterly
/// then takes the patient quarterly discount.
pub fn patient_charge(
    annual_price: Decimal,
    period: BillingPeriod,
    config: &PricingConfig,
) -> PeriodCharge {
    let monthly = annual_price / Decimal::from(12);
    match period {
        BillingPeriod::Annual => PeriodCharge {
            period,
            months: 12,
            discount: Decimal::ZERO,
            monthly_before_discount: monthly,
            discounted_monthly: monthly,
            total: annual_price,
            savings: Decimal::ZERO,
        },
        BillingPeriod::Quarterly => {
            PeriodCharge::discounted(period, monthly, config.patient_quarterly_discount)
        }
        BillingPeriod::Monthly => PeriodCharge::discounted(period, monthly, Decimal::ZERO),
    }
}
