//! Plan catalog and plan selection
//!
//! Plans are reference data: the UI shows them, the selector picks one for
//! a role and specialist count, and the calculator consumes its unit price.
//! The catalog is either the built-in default or a JSON file of the form
//! `{ "plans": [ ... ] }`.

use std::collections::HashSet;
use std::path::Path;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use clinicloud_shared::{PatientPlan, Role};

use crate::config::PricingConfig;
use crate::error::{BillingError, BillingResult};

/// Who a plan is sold to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanAudience {
    /// Single independent practitioner seat
    Individual,
    Patient,
    /// Specialist-count bracket for clinics, pharmacies and labs
    Organization,
}

/// A pricing tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub slug: String,
    pub label: String,
    pub audience: PlanAudience,
    /// Roles this plan applies to; empty means every role of the audience
    #[serde(default)]
    pub roles: Vec<Role>,
    /// Patient plan variant, only meaningful for the patient audience
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_plan: Option<PatientPlan>,
    pub min_specialists: u32,
    /// Upper bound of the bracket, `None` when open ended
    #[serde(default)]
    pub max_specialists: Option<u32>,
    pub monthly_price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quarterly_price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annual_price: Option<Decimal>,
}

impl Plan {
    /// Price fed to the calculator
    ///
    /// Patient plans are priced off their annual reference price; every
    /// other audience off the monthly per-seat price.
    pub fn unit_price(&self) -> Decimal {
        match self.audience {
            PlanAudience::Patient => self
                .annual_price
                .unwrap_or(self.monthly_price * Decimal::from(12)),
            PlanAudience::Individual | PlanAudience::Organization => self.monthly_price,
        }
    }

    pub fn covers_specialists(&self, count: u32) -> bool {
        count >= self.min_specialists && self.max_specialists.map_or(true, |max| count <= max)
    }

    fn applies_to(&self, role: Role) -> bool {
        let audience_matches = match self.audience {
            PlanAudience::Individual => role.is_independent_practitioner(),
            PlanAudience::Patient => role.is_patient(),
            PlanAudience::Organization => role.is_organization(),
        };
        audience_matches && (self.roles.is_empty() || self.roles.contains(&role))
    }
}

/// Outcome of plan selection
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlanSelection<'a> {
    Plan(&'a Plan),
    /// No self-service plan applies; route to sales
    CustomQuote,
}

/// Whether a request must go to a manual sales quote
///
/// Patients are never escalated.
pub fn requires_custom_quote(
    specialist_count: u32,
    normalized_sites: u32,
    is_patient: bool,
    config: &PricingConfig,
) -> bool {
    !is_patient
        && (specialist_count >= config.custom_quote_min_specialists
            || normalized_sites >= config.custom_quote_min_sites)
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    plans: Vec<Plan>,
}

/// Immutable set of plans
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanCatalog {
    plans: Vec<Plan>,
}

impl PlanCatalog {
    pub fn new(plans: Vec<Plan>) -> BillingResult<Self> {
        let catalog = Self { plans };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Parse a catalog from its JSON representation
    pub fn from_json(json: &str) -> BillingResult<Self> {
        let file: CatalogFile =
            serde_json::from_str(json).map_err(|e| BillingError::Catalog(e.to_string()))?;
        Self::new(file.plans)
    }

    /// Load a catalog from a JSON file on disk
    pub fn from_path(path: impl AsRef<Path>) -> BillingResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| BillingError::Catalog(format!("{}: {}", path.display(), e)))?;
        let catalog = Self::from_json(&json)?;
        tracing::info!(
            path = %path.display(),
            plans = catalog.plans.len(),
            "Loaded plan catalog"
        );
        Ok(catalog)
    }

    pub fn plans(&self) -> &[Plan] {
        &self.plans
    }

    pub fn get(&self, slug: &str) -> Option<&Plan> {
        self.plans.iter().find(|p| p.slug == slug)
    }

    /// Pick the plan for a role and specialist count
    ///
    /// Independent practitioners get their seat plan and patients the plan
    /// matching `patient_plan` (individual when absent). Organization roles
    /// get the bracket containing the specialist count, clamped to at least
    /// one; counts at or above the escalation threshold, or outside every
    /// bracket, select a custom quote.
    pub fn select(
        &self,
        role: Role,
        specialist_count: u32,
        patient_plan: Option<PatientPlan>,
        config: &PricingConfig,
    ) -> BillingResult<PlanSelection<'_>> {
        if role.is_patient() {
            let wanted = patient_plan.unwrap_or_default();
            return self
                .plans
                .iter()
                .find(|p| p.applies_to(role) && p.patient_plan.unwrap_or_default() == wanted)
                .map(PlanSelection::Plan)
                .ok_or_else(|| {
                    BillingError::PlanNotFound(format!("patient plan {:?}", wanted))
                });
        }

        if role.is_independent_practitioner() {
            return self
                .plans
                .iter()
                .find(|p| p.applies_to(role))
                .map(PlanSelection::Plan)
                .ok_or_else(|| BillingError::PlanNotFound(format!("role {}", role)));
        }

        let count = specialist_count.max(1);
        if count >= config.custom_quote_min_specialists {
            tracing::info!(role = %role, specialist_count = count, "Specialist count requires custom quote");
            return Ok(PlanSelection::CustomQuote);
        }

        match self
            .plans
            .iter()
            .find(|p| p.applies_to(role) && p.covers_specialists(count))
        {
            Some(plan) => Ok(PlanSelection::Plan(plan)),
            None => {
                tracing::warn!(
                    role = %role,
                    specialist_count = count,
                    "No bracket covers specialist count, escalating to custom quote"
                );
                Ok(PlanSelection::CustomQuote)
            }
        }
    }

    fn validate(&self) -> BillingResult<()> {
        let mut slugs = HashSet::new();
        for plan in &self.plans {
            if plan.slug.trim().is_empty() {
                return Err(BillingError::Catalog("plan slug must not be empty".to_string()));
            }
            if !slugs.insert(plan.slug.as_str()) {
                return Err(BillingError::Catalog(format!("duplicate plan slug: {}", plan.slug)));
            }
            if let Some(max) = plan.max_specialists {
                if max < plan.min_specialists {
                    return Err(BillingError::Catalog(format!(
                        "plan {} has max_specialists {} below min_specialists {}",
                        plan.slug, max, plan.min_specialists
                    )));
                }
            }
            let prices = [Some(plan.monthly_price), plan.quarterly_price, plan.annual_price];
            if prices.iter().flatten().any(|p| p.is_sign_negative() && !p.is_zero()) {
                return Err(BillingError::Catalog(format!(
                    "plan {} has a negative price",
                    plan.slug
                )));
            }
        }
        Ok(())
    }
}

impl Default for PlanCatalog {
    /// Built-in catalog used when no catalog file is configured
    fn default() -> Self {
        let individual = |slug: &str, label: &str, role: Role, price: Decimal| Plan {
            slug: slug.to_string(),
            label: label.to_string(),
            audience: PlanAudience::Individual,
            roles: vec![role],
            patient_plan: None,
            min_specialists: 1,
            max_specialists: Some(1),
            monthly_price: price,
            quarterly_price: None,
            annual_price: None,
        };
        let patient = |slug: &str, label: &str, variant: PatientPlan, annual: Decimal| Plan {
            slug: slug.to_string(),
            label: label.to_string(),
            audience: PlanAudience::Patient,
            roles: Vec::new(),
            patient_plan: Some(variant),
            min_specialists: 0,
            max_specialists: None,
            monthly_price: annual / Decimal::from(12),
            quarterly_price: None,
            annual_price: Some(annual),
        };
        let bracket = |slug: &str, label: &str, min: u32, max: u32, price: Decimal| Plan {
            slug: slug.to_string(),
            label: label.to_string(),
            audience: PlanAudience::Organization,
            roles: Vec::new(),
            patient_plan: None,
            min_specialists: min,
            max_specialists: Some(max),
            monthly_price: price,
            quarterly_price: Some(price * Decimal::from(3) * dec!(0.90)),
            annual_price: Some(price * Decimal::from(12) * dec!(0.70)),
        };

        Self {
            plans: vec![
                individual("medico-individual", "Médico independiente", Role::IndependentPhysician, dec!(70)),
                individual("enfermero-individual", "Enfermería independiente", Role::IndependentNurse, dec!(35)),
                patient("paciente-gratis", "Paciente gratuito", PatientPlan::Free, Decimal::ZERO),
                patient("paciente-individual", "Paciente individual", PatientPlan::Individual, dec!(12.99)),
                patient("paciente-familiar", "Plan familiar", PatientPlan::Family, dec!(29.99)),
                bracket("clinica-esencial", "Clínica Esencial", 1, 10, dec!(56)),
                bracket("clinica-profesional", "Clínica Profesional", 11, 50, dec!(50)),
                bracket("clinica-avanzada", "Clínica Avanzada", 51, 199, dec!(45)),
            ],
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn select(role: Role, count: u32, patient_plan: Option<PatientPlan>) -> Option<String> {
        let catalog = PlanCatalog::default();
        match catalog
            .select(role, count, patient_plan, &PricingConfig::default())
            .unwrap()
        {
            PlanSelection::Plan(plan) => Some(plan.slug.clone()),
            PlanSelection::CustomQuote => None,
        }
    }

    #[test]
    fn test_default_catalog_is_valid() {
        let catalog = PlanCatalog::default();
        assert!(catalog.validate().is_ok());
        assert!(catalog.get("clinica-esencial").is_some());
    }

    #[test]
    fn test_independent_roles_get_seat_plans() {
        assert_eq!(select(Role::IndependentPhysician, 40, None).as_deref(), Some("medico-individual"));
        assert_eq!(select(Role::IndependentNurse, 1, None).as_deref(), Some("enfermero-individual"));
    }

    #[test]
    fn test_patient_plan_variants() {
        assert_eq!(select(Role::Patient, 0, None).as_deref(), Some("paciente-individual"));
        assert_eq!(
            select(Role::Patient, 0, Some(PatientPlan::Family)).as_deref(),
            Some("paciente-familiar")
        );
        assert_eq!(
            select(Role::Patient, 500, Some(PatientPlan::Free)).as_deref(),
            Some("paciente-gratis")
        );
    }

    #[test]
    fn test_organization_brackets() {
        assert_eq!(select(Role::OrganizationAdmin, 0, None).as_deref(), Some("clinica-esencial"));
        assert_eq!(select(Role::OrganizationAdmin, 10, None).as_deref(), Some("clinica-esencial"));
        assert_eq!(select(Role::Pharmacy, 11, None).as_deref(), Some("clinica-profesional"));
        assert_eq!(select(Role::Laboratory, 199, None).as_deref(), Some("clinica-avanzada"));
        assert_eq!(select(Role::OrganizationAdmin, 200, None), None);
    }

    #[test]
    fn test_gap_in_brackets_escalates() {
        let catalog = PlanCatalog::new(vec![Plan {
            slug: "small".to_string(),
            label: "Small".to_string(),
            audience: PlanAudience::Organization,
            roles: Vec::new(),
            patient_plan: None,
            min_specialists: 1,
            max_specialists: Some(5),
            monthly_price: dec!(60),
            quarterly_price: None,
            annual_price: None,
        }])
        .unwrap();
        let selection = catalog
            .select(Role::OrganizationAdmin, 6, None, &PricingConfig::default())
            .unwrap();
        assert_eq!(selection, PlanSelection::CustomQuote);
    }

    #[test]
    fn test_missing_patient_plan_is_an_error() {
        let catalog = PlanCatalog::new(Vec::new()).unwrap();
        let result = catalog.select(Role::Patient, 0, None, &PricingConfig::default());
        assert!(matches!(result, Err(BillingError::PlanNotFound(_))));
    }

    #[test]
    fn test_custom_quote_threshold() {
        let config = PricingConfig::default();
        assert!(!requires_custom_quote(199, 1, false, &config));
        assert!(requires_custom_quote(200, 1, false, &config));
        assert!(!requires_custom_quote(5, 10, false, &config));
        assert!(requires_custom_quote(5, 11, false, &config));
        assert!(!requires_custom_quote(200, 11, true, &config));
    }

    #[test]
    fn test_unit_price_by_audience() {
        let catalog = PlanCatalog::default();
        assert_eq!(catalog.get("paciente-individual").unwrap().unit_price(), dec!(12.99));
        assert_eq!(catalog.get("clinica-esencial").unwrap().unit_price(), dec!(56));
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "plans": [
                {
                    "slug": "clinica-unica",
                    "label": "Clínica",
                    "audience": "organization",
                    "minSpecialists": 1,
                    "maxSpecialists": null,
                    "monthlyPrice": 48.5
                }
            ]
        }"#;
        let catalog = PlanCatalog::from_json(json).unwrap();
        let plan = catalog.get("clinica-unica").unwrap();
        assert!(plan.covers_specialists(150));
        assert_eq!(plan.monthly_price, dec!(48.5));
    }

    #[test]
    fn test_from_json_rejects_duplicates_and_inverted_brackets() {
        let duplicate = r#"{"plans": [
            {"slug": "a", "label": "A", "audience": "organization", "minSpecialists": 1, "monthlyPrice": 1},
            {"slug": "a", "label": "A", "audience": "organization", "minSpecialists": 2, "monthlyPrice": 1}
        ]}"#;
        assert!(matches!(PlanCatalog::from_json(duplicate), Err(BillingError::Catalog(_))));

        let inverted = r#"{"plans": [
            {"slug": "b", "label": "B", "audience": "organization", "minSpecialists": 9, "maxSpecialists": 3, "monthlyPrice": 1}
        ]}"#;
        assert!(matches!(PlanCatalog::from_json(inverted), Err(BillingError::Catalog(_))));

        assert!(matches!(PlanCatalog::from_json("not json"), Err(BillingError::Catalog(_))));
    }
}
