//! Pricing configuration
//!
//! Every business constant of the quote engine lives here: escalation
//! thresholds, site surcharge rates, band representatives, the individual
//! seat price used for comparisons, and the period discounts.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{BillingError, BillingResult};

/// Business constants for quote computation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingConfig {
    /// Specialist count at which self-service pricing stops
    pub custom_quote_min_specialists: u32,
    /// Normalized site count at which self-service pricing stops
    pub custom_quote_min_sites: u32,
    /// Number of extra sites billed at the first-tier rate
    pub site_first_tier_size: u32,
    /// Monthly cost of each extra site in the first tier
    pub site_first_tier_rate: Decimal,
    /// Monthly cost of each extra site beyond the first tier
    pub site_additional_rate: Decimal,
    /// Representative value for a closed band such as `5-10`
    pub closed_band_sites: u32,
    /// Representative value for an open band such as `11+`
    pub open_ended_sites: u32,
    /// Flat per-seat price of the independent physician plan
    pub individual_seat_price: Decimal,
    pub patient_quarterly_discount: Decimal,
    pub organization_quarterly_discount: Decimal,
    pub organization_annual_discount: Decimal,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            custom_quote_min_specialists: 200,
            custom_quote_min_sites: 11,
            site_first_tier_size: 3,
            site_first_tier_rate: dec!(45),
            site_additional_rate: dec!(30),
            closed_band_sites: 7,
            open_ended_sites: 11,
            individual_seat_price: dec!(70),
            patient_quarterly_discount: dec!(0.05),
            organization_quarterly_discount: dec!(0.10),
            organization_annual_discount: dec!(0.30),
        }
    }
}

impl PricingConfig {
    /// Load constants from `PRICING_*` environment variables, falling back
    /// to the defaults for anything unset or unparseable
    pub fn from_env() -> BillingResult<Self> {
        let defaults = Self::default();
        let config = Self {
            custom_quote_min_specialists: env_or(
                "PRICING_CUSTOM_QUOTE_MIN_SPECIALISTS",
                defaults.custom_quote_min_specialists,
            ),
            custom_quote_min_sites: env_or(
                "PRICING_CUSTOM_QUOTE_MIN_SITES",
                defaults.custom_quote_min_sites,
            ),
            site_first_tier_size: env_or("PRICING_SITE_FIRST_TIER_SIZE", defaults.site_first_tier_size),
            site_first_tier_rate: env_or("PRICING_SITE_FIRST_TIER_RATE", defaults.site_first_tier_rate),
            site_additional_rate: env_or("PRICING_SITE_ADDITIONAL_RATE", defaults.site_additional_rate),
            closed_band_sites: env_or("PRICING_CLOSED_BAND_SITES", defaults.closed_band_sites),
            open_ended_sites: env_or("PRICING_OPEN_ENDED_SITES", defaults.open_ended_sites),
            individual_seat_price: env_or(
                "PRICING_INDIVIDUAL_SEAT_PRICE",
                defaults.individual_seat_price,
            ),
            patient_quarterly_discount: env_or(
                "PRICING_PATIENT_QUARTERLY_DISCOUNT",
                defaults.patient_quarterly_discount,
            ),
            organization_quarterly_discount: env_or(
                "PRICING_ORG_QUARTERLY_DISCOUNT",
                defaults.organization_quarterly_discount,
            ),
            organization_annual_discount: env_or(
                "PRICING_ORG_ANNUAL_DISCOUNT",
                defaults.organization_annual_discount,
            ),
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject constants that would produce negative or nonsensical quotes
    pub fn validate(&self) -> BillingResult<()> {
        if self.custom_quote_min_specialists == 0 || self.custom_quote_min_sites == 0 {
            return Err(BillingError::Config(
                "custom quote thresholds must be at least 1".to_string(),
            ));
        }

        let rates = [
            ("site_first_tier_rate", self.site_first_tier_rate),
            ("site_additional_rate", self.site_additional_rate),
            ("individual_seat_price", self.individual_seat_price),
        ];
        for (name, rate) in rates {
            if rate.is_sign_negative() {
                return Err(BillingError::Config(format!("{} must not be negative", name)));
            }
        }

        let discounts = [
            ("patient_quarterly_discount", self.patient_quarterly_discount),
            ("organization_quarterly_discount", self.organization_quarterly_discount),
            ("organization_annual_discount", self.organization_annual_discount),
        ];
        for (name, discount) in discounts {
            if discount < Decimal::ZERO || discount >= Decimal::ONE {
                return Err(BillingError::Config(format!(
                    "{} must be in [0, 1), got {}",
                    name, discount
                )));
            }
        }

        Ok(())
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
