//! Shared application state

use std::sync::Arc;

use clinicloud_billing::{
    BillingCalculator, BillingResult, PlanCatalog, QuoteService, RegistrationClient,
};

use crate::config::Config;

/// State handed to every handler; cheap to clone
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub quotes: QuoteService,
    /// `None` when no registration API is configured
    pub registration: Option<RegistrationClient>,
}

impl AppState {
    /// Build state from configuration, loading the plan catalog from disk
    /// when a path is configured
    pub fn from_config(config: Config) -> BillingResult<Self> {
        let catalog = match &config.plan_catalog_path {
            Some(path) => PlanCatalog::from_path(path)?,
            None => {
                tracing::info!("No PLAN_CATALOG_PATH set, using built-in plan catalog");
                PlanCatalog::default()
            }
        };

        let registration = match &config.registration_api_url {
            Some(url) => Some(
                RegistrationClient::new(url)?.with_max_retries(config.registration_max_retries),
            ),
            None => {
                tracing::warn!("No REGISTRATION_API_URL set, registration submission disabled");
                None
            }
        };

        let calculator = BillingCalculator::new(config.pricing.clone());

        Ok(Self {
            quotes: QuoteService::new(Arc::new(catalog), Arc::new(calculator)),
            registration,
            config: Arc::new(config),
        })
    }
}
