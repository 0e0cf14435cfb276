use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MembershipStatus {
    Active,
    #[default]
    NotActive,
}

impl MembershipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::NotActive => "Not Active",
        }
    }

    /// Anything other than an explicit active marker is treated as not active.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "active" | "member" => Self::Active,
            _ => Self::NotActive,
        }
    }
}

impl fmt::Display for MembershipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input bundle for a single fee calculation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationContext {
    pub solution_fee: Decimal,
    pub challenge_complexity: String,
    pub engagement_model: String,
    pub country: String,
    pub organization_type: String,
    pub entity_type: String,
    #[serde(default)]
    pub membership_status: MembershipStatus,
}

impl CalculationContext {
    pub fn new(
        solution_fee: Decimal,
        challenge_complexity: impl Into<String>,
        engagement_model: impl Into<String>,
        country: impl Into<String>,
        organization_type: impl Into<String>,
        entity_type: impl Into<String>,
    ) -> Self {
        Self {
            solution_fee,
            challenge_complexity: challenge_complexity.into(),
            engagement_model: engagement_model.into(),
            country: country.into(),
            organization_type: organization_type.into(),
            entity_type: entity_type.into(),
            membership_status: MembershipStatus::default(),
        }
    }

    pub fn with_membership(mut self, membership_status: MembershipStatus) -> Self {
        self.membership_status = membership_status;
        self
    }

    /// Names of required text fields that are empty after trimming.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("challenge_complexity", &self.challenge_complexity),
            ("engagement_model", &self.engagement_model),
            ("country", &self.country),
            ("organization_type", &self.organization_type),
            ("entity_type", &self.entity_type),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.trim().is_empty().then_some(name))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{CalculationContext, MembershipStatus};

    #[test]
    fn membership_defaults_to_not_active() {
        let context = CalculationContext::new(
            Decimal::new(50_000, 0),
            "Medium",
            "Aggregator",
            "United States",
            "Large Enterprise",
            "For Profit",
        );

        assert_eq!(context.membership_status, MembershipStatus::NotActive);
        assert_eq!(context.membership_status.to_string(), "Not Active");
    }

    #[test]
    fn missing_fields_reports_blank_values() {
        let context =
            CalculationContext::new(Decimal::ONE, "  ", "Aggregator", "", "Startup", "For Profit");

        assert_eq!(context.missing_fields(), vec!["challenge_complexity", "country"]);
    }

    #[test]
    fn membership_parse_is_lenient() {
        assert_eq!(MembershipStatus::parse("Active"), MembershipStatus::Active);
        assert_eq!(MembershipStatus::parse(" member "), MembershipStatus::Active);
        assert_eq!(MembershipStatus::parse("Not Active"), MembershipStatus::NotActive);
        assert_eq!(MembershipStatus::parse("lapsed"), MembershipStatus::NotActive);
    }
}
