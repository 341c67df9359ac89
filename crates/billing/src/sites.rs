//! Multi-site ("sede") surcharge
//!
//! The first site is included in the plan. Each extra site adds a monthly
//! surcharge: the first few extras at the first-tier rate, any beyond that
//! at the cheaper additional rate.

use rust_decimal::Decimal;

use clinicloud_shared::SiteCount;

use crate::config::PricingConfig;

/// Reduce a site count to the single integer used for thresholds,
/// surcharges and display
///
/// Closed bands map to the configured representative (7 for `5-10`) and
/// open bands to the open-ended representative (11 for `11+`), regardless
/// of their bounds. Exact counts pass through, so normalizing an already
/// normalized value is a no-op.
pub fn normalize_site_count(count: SiteCount, config: &PricingConfig) -> u32 {
    match count {
        SiteCount::Exact(n) => n,
        SiteCount::Band { .. } => config.closed_band_sites,
        SiteCount::OpenEnded { .. } => config.open_ended_sites,
    }
}

/// Monthly surcharge for a normalized site count
pub fn site_surcharge(normalized_sites: u32, config: &PricingConfig) -> Decimal {
    if normalized_sites <= 1 {
        return Decimal::ZERO;
    }

    let extra = normalized_sites - 1;
    let first_tier = extra.min(config.site_first_tier_size);
    let beyond = extra.saturating_sub(config.site_first_tier_size);

    Decimal::from(first_tier) * config.site_first_tier_rate
        + Decimal::from(beyond) * config.site_additional_rate
}

/// Normalize then price a raw site count
pub fn surcharge_for(count: SiteCount, config: &PricingConfig) -> Decimal {
    site_surcharge(normalize_site_count(count, config), config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_single_site_is_free() {
        let config = PricingConfig::default();
        assert_eq!(site_surcharge(0, &config), Decimal::ZERO);
        assert_eq!(site_surcharge(1, &config), Decimal::ZERO);
    }

    #[test]
    fn test_first_tier_sites() {
        let config = PricingConfig::default();
        assert_eq!(site_surcharge(2, &config), dec!(45));
        assert_eq!(site_surcharge(3, &config), dec!(90));
        assert_eq!(site_surcharge(4, &config), dec!(135));
    }

    #[test]
    fn test_sites_beyond_first_tier() {
        let config = PricingConfig::default();
        assert_eq!(site_surcharge(5, &config), dec!(165));
        assert_eq!(site_surcharge(7, &config), dec!(225));
        assert_eq!(site_surcharge(11, &config), dec!(345));
    }

    #[test]
    fn test_bands_normalize_to_representatives() {
        let config = PricingConfig::default();
        assert_eq!(
            normalize_site_count(SiteCount::Band { low: 5, high: 10 }, &config),
            7
        );
        assert_eq!(
            normalize_site_count(SiteCount::OpenEnded { min: 11 }, &config),
            11
        );
        assert_eq!(normalize_site_count(SiteCount::Exact(3), &config), 3);
    }

    #[test]
    fn test_band_surcharges() {
        let config = PricingConfig::default();
        assert_eq!(
            surcharge_for(SiteCount::Band { low: 5, high: 10 }, &config),
            dec!(225)
        );
        assert_eq!(
            surcharge_for(SiteCount::OpenEnded { min: 11 }, &config),
            dec!(345)
        );
    }

    #[test]
    fn test_surcharge_follows_configured_rates() {
        let config = PricingConfig {
            site_first_tier_size: 1,
            site_first_tier_rate: dec!(100),
            site_additional_rate: dec!(10),
            ..PricingConfig::default()
        };
        assert_eq!(site_surcharge(4, &config), dec!(120));
    }
}
