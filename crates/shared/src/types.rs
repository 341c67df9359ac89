//! Common types used across Clinicloud

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ClinicError;

// =============================================================================
// Roles
// =============================================================================

/// Account role chosen at registration
///
/// Wire names follow the registration form (`MEDICO`, `PACIENTE`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Independent physician paying a single flat seat
    #[serde(rename = "MEDICO")]
    IndependentPhysician,
    /// Independent nurse paying a single flat seat
    #[serde(rename = "ENFERMERO", alias = "ENFERMERA")]
    IndependentNurse,
    #[serde(rename = "PACIENTE")]
    Patient,
    /// Clinic or practice group administrator
    #[serde(rename = "ORGANIZACION", alias = "ADMIN", alias = "CLINICA")]
    OrganizationAdmin,
    #[serde(rename = "FARMACIA")]
    Pharmacy,
    #[serde(rename = "LABORATORIO")]
    Laboratory,
}

impl Default for Role {
    fn default() -> Self {
        Self::OrganizationAdmin
    }
}

impl Role {
    pub const ALL: [Role; 6] = [
        Self::IndependentPhysician,
        Self::IndependentNurse,
        Self::Patient,
        Self::OrganizationAdmin,
        Self::Pharmacy,
        Self::Laboratory,
    ];

    /// Wire name as sent by the registration form
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IndependentPhysician => "MEDICO",
            Self::IndependentNurse => "ENFERMERO",
            Self::Patient => "PACIENTE",
            Self::OrganizationAdmin => "ORGANIZACION",
            Self::Pharmacy => "FARMACIA",
            Self::Laboratory => "LABORATORIO",
        }
    }

    /// Single practitioners billed per seat, never per site or bracket
    pub fn is_independent_practitioner(&self) -> bool {
        matches!(self, Self::IndependentPhysician | Self::IndependentNurse)
    }

    pub fn is_patient(&self) -> bool {
        matches!(self, Self::Patient)
    }

    /// Roles priced through the specialist-count brackets
    pub fn is_organization(&self) -> bool {
        matches!(self, Self::OrganizationAdmin | Self::Pharmacy | Self::Laboratory)
    }

    /// Parse a role from string (case insensitive)
    pub fn from_str_lossy(s: &str) -> Self {
        s.parse().unwrap_or_else(|_| {
            tracing::warn!(role = %s, "Unknown role, falling back to organization pricing");
            Self::OrganizationAdmin
        })
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = ClinicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "MEDICO" => Ok(Self::IndependentPhysician),
            "ENFERMERO" | "ENFERMERA" => Ok(Self::IndependentNurse),
            "PACIENTE" => Ok(Self::Patient),
            "ORGANIZACION" | "ADMIN" | "CLINICA" => Ok(Self::OrganizationAdmin),
            "FARMACIA" => Ok(Self::Pharmacy),
            "LABORATORIO" => Ok(Self::Laboratory),
            _ => Err(ClinicError::Validation(format!("Invalid role: {}", s))),
        }
    }
}

// =============================================================================
// Billing period
// =============================================================================

/// Payment cadence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingPeriod {
    #[serde(alias = "mensual")]
    Monthly,
    #[serde(alias = "trimestral")]
    Quarterly,
    #[serde(alias = "anual", alias = "yearly")]
    Annual,
}

impl Default for BillingPeriod {
    fn default() -> Self {
        Self::Monthly
    }
}

impl BillingPeriod {
    /// Number of months charged per cycle
    pub fn months(&self) -> u32 {
        match self {
            Self::Monthly => 1,
            Self::Quarterly => 3,
            Self::Annual => 12,
        }
    }

    /// Display label used in the plan summary
    pub fn label(&self) -> &'static str {
        match self {
            Self::Monthly => "Mensual",
            Self::Quarterly => "Trimestral",
            Self::Annual => "Anual",
        }
    }
}

impl std::fmt::Display for BillingPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Monthly => write!(f, "monthly"),
            Self::Quarterly => write!(f, "quarterly"),
            Self::Annual => write!(f, "annual"),
        }
    }
}

impl std::str::FromStr for BillingPeriod {
    type Err = ClinicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "monthly" | "mensual" => Ok(Self::Monthly),
            "quarterly" | "trimestral" => Ok(Self::Quarterly),
            "annual" | "anual" | "yearly" => Ok(Self::Annual),
            _ => Err(ClinicError::Validation(format!("Invalid billing period: {}", s))),
        }
    }
}

// =============================================================================
// Patient plan
// =============================================================================

/// Plan variant for the patient role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatientPlan {
    #[serde(alias = "individual")]
    Individual,
    #[serde(alias = "familiar")]
    Family,
    #[serde(alias = "gratis")]
    Free,
}

impl Default for PatientPlan {
    fn default() -> Self {
        Self::Individual
    }
}

// =============================================================================
// Counts
// =============================================================================

/// Default for count fields omitted from a request
pub fn default_count() -> u32 {
    1
}

/// Deserialize a head count from a number, a numeric string or `null`
///
/// Fractions are truncated. Negative, unparseable and `null` values become
/// zero.
pub fn lenient_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawCount {
        Int(i64),
        Float(f64),
        Text(String),
        Missing(Option<()>),
    }

    let value = match RawCount::deserialize(deserializer)? {
        RawCount::Int(n) => n,
        RawCount::Float(f) => f.trunc() as i64,
        RawCount::Text(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .or_else(|_| s.parse::<f64>().map(|f| f.trunc() as i64))
                .unwrap_or(0)
        }
        RawCount::Missing(_) => 0,
    };
    Ok(u32::try_from(value.max(0)).unwrap_or(u32::MAX))
}

// =============================================================================
// Site count
// =============================================================================

/// Number of sites ("sedes") an organization operates
///
/// The registration form offers exact counts for small organizations and
/// bands (`"5-10"`, `"11+"`) for larger ones. Bands are reduced to a single
/// representative integer before any arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawSiteCount", into = "RawSiteCount")]
pub enum SiteCount {
    Exact(u32),
    /// Closed band such as `5-10`
    Band { low: u32, high: u32 },
    /// Open-ended band such as `11+`
    OpenEnded { min: u32 },
}

impl Default for SiteCount {
    fn default() -> Self {
        Self::Exact(1)
    }
}

impl SiteCount {
    /// Parse the form's raw value
    ///
    /// Any text containing `+` is an open-ended band and any other text
    /// containing `-` is a closed band, whatever surrounds the marker.
    /// Anything else that is not a plain integer becomes a single site.
    pub fn from_str_lossy(s: &str) -> Self {
        if let Ok(count) = s.parse() {
            return count;
        }

        let mut numbers = s
            .split(|c: char| !c.is_ascii_digit())
            .filter_map(|part| part.parse::<u32>().ok());
        let first = numbers.next().unwrap_or(0);

        if s.contains('+') {
            tracing::debug!(raw = %s, "Loose open-ended site band");
            return Self::OpenEnded { min: first };
        }
        if s.contains('-') {
            tracing::debug!(raw = %s, "Loose closed site band");
            let second = numbers.next().unwrap_or(first);
            return Self::Band {
                low: first.min(second),
                high: first.max(second),
            };
        }

        tracing::warn!(raw = %s, "Malformed site count, assuming a single site");
        Self::Exact(1)
    }

    /// Coerce a raw numeric value; negative counts become zero
    pub fn from_number_lossy(n: i64) -> Self {
        if n < 0 {
            tracing::warn!(raw = n, "Negative site count, clamping to zero");
            return Self::Exact(0);
        }
        Self::Exact(u32::try_from(n).unwrap_or(u32::MAX))
    }
}

impl From<u32> for SiteCount {
    fn from(n: u32) -> Self {
        Self::Exact(n)
    }
}

impl std::fmt::Display for SiteCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact(n) => write!(f, "{}", n),
            Self::Band { low, high } => write!(f, "{}-{}", low, high),
            Self::OpenEnded { min } => write!(f, "{}+", min),
        }
    }
}

impl std::str::FromStr for SiteCount {
    type Err = ClinicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || ClinicError::Validation(format!("Invalid site count: {}", s));

        if let Some(min) = s.strip_suffix('+') {
            let min = min.trim().parse().map_err(|_| invalid())?;
            return Ok(Self::OpenEnded { min });
        }

        if let Some((low, high)) = s.split_once('-') {
            let low: u32 = low.trim().parse().map_err(|_| invalid())?;
            let high: u32 = high.trim().parse().map_err(|_| invalid())?;
            if low > high {
                return Err(invalid());
            }
            return Ok(Self::Band { low, high });
        }

        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        s.parse().map(Self::Exact).map_err(|_| invalid())
    }
}

/// Wire shape of a site count: a JSON number or a band string
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawSiteCount {
    Number(i64),
    Fractional(f64),
    Text(String),
}

impl From<RawSiteCount> for SiteCount {
    fn from(raw: RawSiteCount) -> Self {
        match raw {
            RawSiteCount::Number(n) => Self::from_number_lossy(n),
            RawSiteCount::Fractional(n) => Self::from_number_lossy(n.trunc() as i64),
            RawSiteCount::Text(s) => Self::from_str_lossy(&s),
        }
    }
}

impl From<SiteCount> for RawSiteCount {
    fn from(count: SiteCount) -> Self {
        match count {
            SiteCount::Exact(n) => RawSiteCount::Number(i64::from(n)),
            other => RawSiteCount::Text(other.to_string()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_role_wire_names_round_trip() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
            let json = serde_json::to_string(&role).unwrap();
            assert_eq!(json, format!("\"{}\"", role.as_str()));
        }
    }

    #[test]
    fn test_role_classification() {
        assert!(Role::IndependentPhysician.is_independent_practitioner());
        assert!(Role::IndependentNurse.is_independent_practitioner());
        assert!(Role::Patient.is_patient());
        assert!(Role::Pharmacy.is_organization());
        assert!(Role::Laboratory.is_organization());
        assert!(!Role::Patient.is_organization());
    }

    #[test]
    fn test_role_lossy_defaults_to_organization() {
        assert_eq!(Role::from_str_lossy("medico"), Role::IndependentPhysician);
        assert_eq!(Role::from_str_lossy("unknown"), Role::OrganizationAdmin);
    }

    #[test]
    fn test_billing_period_months_and_aliases() {
        assert_eq!(BillingPeriod::Monthly.months(), 1);
        assert_eq!(BillingPeriod::Quarterly.months(), 3);
        assert_eq!(BillingPeriod::Annual.months(), 12);
        assert_eq!("anual".parse::<BillingPeriod>().unwrap(), BillingPeriod::Annual);
        let period: BillingPeriod = serde_json::from_str("\"trimestral\"").unwrap();
        assert_eq!(period, BillingPeriod::Quarterly);
        assert!("weekly".parse::<BillingPeriod>().is_err());
    }

    #[test]
    fn test_site_count_parses_bands() {
        assert_eq!("3".parse::<SiteCount>().unwrap(), SiteCount::Exact(3));
        assert_eq!(
            "5-10".parse::<SiteCount>().unwrap(),
            SiteCount::Band { low: 5, high: 10 }
        );
        assert_eq!("11+".parse::<SiteCount>().unwrap(), SiteCount::OpenEnded { min: 11 });
        assert!("10-5".parse::<SiteCount>().is_err());
        assert!("many".parse::<SiteCount>().is_err());
    }

    #[test]
    fn test_site_count_deserializes_numbers_and_strings() {
        let exact: SiteCount = serde_json::from_str("4").unwrap();
        assert_eq!(exact, SiteCount::Exact(4));
        let band: SiteCount = serde_json::from_str("\"5-10\"").unwrap();
        assert_eq!(band, SiteCount::Band { low: 5, high: 10 });
        let open: SiteCount = serde_json::from_str("\"11+\"").unwrap();
        assert_eq!(open, SiteCount::OpenEnded { min: 11 });
    }

    #[test]
    fn test_site_count_coerces_malformed_input() {
        let negative: SiteCount = serde_json::from_str("-3").unwrap();
        assert_eq!(negative, SiteCount::Exact(0));
        let garbage: SiteCount = serde_json::from_str("\"lots\"").unwrap();
        assert_eq!(garbage, SiteCount::Exact(1));
        let fractional: SiteCount = serde_json::from_str("2.7").unwrap();
        assert_eq!(fractional, SiteCount::Exact(2));
    }

    #[test]
    fn test_site_count_band_markers_anywhere_in_text() {
        assert!("+10".parse::<SiteCount>().is_err());
        assert_eq!(SiteCount::from_str_lossy("+10"), SiteCount::OpenEnded { min: 10 });
        assert_eq!(
            SiteCount::from_str_lossy("10+ sedes"),
            SiteCount::OpenEnded { min: 10 }
        );
        assert_eq!(SiteCount::from_str_lossy("más de 10 +"), SiteCount::OpenEnded { min: 10 });
        assert_eq!(
            SiteCount::from_str_lossy("5-10 sedes"),
            SiteCount::Band { low: 5, high: 10 }
        );
        assert_eq!(SiteCount::from_str_lossy("10-5"), SiteCount::Band { low: 5, high: 10 });
        assert_eq!(SiteCount::from_str_lossy("-"), SiteCount::Band { low: 0, high: 0 });

        let open: SiteCount = serde_json::from_str("\"+10\"").unwrap();
        assert_eq!(open, SiteCount::OpenEnded { min: 10 });
    }

    #[derive(Debug, Deserialize)]
    struct Counted {
        #[serde(default = "default_count", deserialize_with = "lenient_count")]
        count: u32,
    }

    #[test]
    fn test_lenient_count_coerces_instead_of_failing() {
        let parse = |json: &str| serde_json::from_str::<Counted>(json).unwrap().count;
        assert_eq!(parse(r#"{"count": 12}"#), 12);
        assert_eq!(parse(r#"{"count": "12"}"#), 12);
        assert_eq!(parse(r#"{"count": 3.9}"#), 3);
        assert_eq!(parse(r#"{"count": "3.9"}"#), 3);
        assert_eq!(parse(r#"{"count": "-2"}"#), 0);
        assert_eq!(parse(r#"{"count": -2}"#), 0);
        assert_eq!(parse(r#"{"count": "lots"}"#), 0);
        assert_eq!(parse(r#"{"count": null}"#), 0);
        assert_eq!(parse(r#"{}"#), 1);
    }

    #[test]
    fn test_site_count_serializes_in_form_shape() {
        assert_eq!(serde_json::to_string(&SiteCount::Exact(2)).unwrap(), "2");
        assert_eq!(
            serde_json::to_string(&SiteCount::Band { low: 5, high: 10 }).unwrap(),
            "\"5-10\""
        );
        assert_eq!(
            serde_json::to_string(&SiteCount::OpenEnded { min: 11 }).unwrap(),
            "\"11+\""
        );
    }
}
