//! Health check endpoints
//!
//! The quote engine has no backing store, so health is a question of
//! whether the loaded catalog can price every audience the registration
//! form offers.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use clinicloud_billing::{PlanAudience, PlanCatalog};

use crate::state::AppState;

const AUDIENCES: [PlanAudience; 3] = [
    PlanAudience::Individual,
    PlanAudience::Patient,
    PlanAudience::Organization,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    /// Quotes work for some audiences only
    Degraded,
    Unhealthy,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogHealth {
    pub plans: usize,
    pub missing_audiences: Vec<PlanAudience>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: &'static str,
    pub catalog: CatalogHealth,
    /// Registration endpoint, `None` when submission is disabled
    pub registration: Option<String>,
}

fn catalog_health(catalog: &PlanCatalog) -> (HealthStatus, CatalogHealth) {
    let missing_audiences: Vec<PlanAudience> = AUDIENCES
        .into_iter()
        .filter(|audience| !catalog.plans().iter().any(|p| p.audience == *audience))
        .collect();

    let status = match missing_audiences.len() {
        0 => HealthStatus::Healthy,
        n if n == AUDIENCES.len() => HealthStatus::Unhealthy,
        _ => HealthStatus::Degraded,
    };

    (
        status,
        CatalogHealth {
            plans: catalog.plans().len(),
            missing_audiences,
        },
    )
}

/// Catalog coverage and registration wiring
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let (status, catalog) = catalog_health(state.quotes.catalog());
    if status != HealthStatus::Healthy {
        tracing::warn!(missing = ?catalog.missing_audiences, "Plan catalog does not cover every audience");
    }

    let code = match status {
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
    };

    (
        code,
        Json(HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION"),
            catalog,
            registration: state.registration.as_ref().map(|c| c.endpoint().to_string()),
        }),
    )
}

pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_covers_every_audience() {
        let (status, catalog) = catalog_health(&PlanCatalog::default());
        assert_eq!(status, HealthStatus::Healthy);
        assert!(catalog.missing_audiences.is_empty());
    }

    #[test]
    fn test_partial_catalog_is_degraded() {
        let organizations: Vec<_> = PlanCatalog::default()
            .plans()
            .iter()
            .filter(|p| p.audience == PlanAudience::Organization)
            .cloned()
            .collect();
        let (status, catalog) = catalog_health(&PlanCatalog::new(organizations).unwrap());
        assert_eq!(status, HealthStatus::Degraded);
        assert_eq!(
            catalog.missing_audiences,
            vec![PlanAudience::Individual, PlanAudience::Patient]
        );
    }

    #[test]
    fn test_empty_catalog_is_unhealthy() {
        let (status, _) = catalog_health(&PlanCatalog::new(Vec::new()).unwrap());
        assert_eq!(status, HealthStatus::Unhealthy);
    }
}
