use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeComponentType {
    PlatformUsageFee,
    ManagementFee,
    ConsultingFee,
    AdvancePayment,
}

impl FeeComponentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PlatformUsageFee => "platform_usage_fee",
            Self::ManagementFee => "management_fee",
            Self::ConsultingFee => "consulting_fee",
            Self::AdvancePayment => "advance_payment",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "platform_usage_fee" => Some(Self::PlatformUsageFee),
            "management_fee" => Some(Self::ManagementFee),
            "consulting_fee" => Some(Self::ConsultingFee),
            "advance_payment" => Some(Self::AdvancePayment),
            _ => None,
        }
    }
}

impl fmt::Display for FeeComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateType {
    Currency,
    Percentage,
}

impl RateType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Currency => "currency",
            Self::Percentage => "percentage",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "currency" => Some(Self::Currency),
            "percentage" => Some(Self::Percentage),
            _ => None,
        }
    }
}

/// A resolved fee-component rate, read-only inside the engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeParameter {
    pub id: String,
    pub component_type: FeeComponentType,
    pub name: String,
    pub amount: Decimal,
    pub rate_type: RateType,
    pub complexity_applicable: bool,
    pub currency_code: String,
    pub currency_symbol: String,
}

/// Flattened row as returned by a data source, before scope filtering.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeParameterRecord {
    pub parameter: FeeParameter,
    pub country: String,
    pub organization_type: String,
    pub entity_type: String,
    pub active: bool,
}

impl FeeParameterRecord {
    pub fn matches_scope(&self, country: &str, organization_type: &str, entity_type: &str) -> bool {
        self.country == country
            && self.organization_type == organization_type
            && self.entity_type == entity_type
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplexityMultiplier {
    pub name: String,
    pub management: Decimal,
    pub consulting: Decimal,
}

impl ComplexityMultiplier {
    pub fn new(name: impl Into<String>, management: Decimal, consulting: Decimal) -> Self {
        Self { name: name.into(), management, consulting }
    }

    pub fn neutral() -> Self {
        Self::new("Low", Decimal::ONE, Decimal::ONE)
    }

    pub fn is_valid(&self) -> bool {
        self.management > Decimal::ZERO && self.consulting > Decimal::ZERO
    }
}

impl Default for ComplexityMultiplier {
    fn default() -> Self {
        Self::neutral()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeComponentRequirement {
    pub component_type: FeeComponentType,
    pub is_required: bool,
    pub application_order: i32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngagementModelFeeMapping {
    pub engagement_model: String,
    pub components: Vec<FeeComponentRequirement>,
}

impl EngagementModelFeeMapping {
    /// Required component types in application order; duplicates collapse to the first.
    pub fn required_components(&self) -> Vec<FeeComponentType> {
        let mut required: Vec<&FeeComponentRequirement> =
            self.components.iter().filter(|component| component.is_required).collect();
        required.sort_by_key(|component| component.application_order);

        let mut ordered = Vec::with_capacity(required.len());
        for component in required {
            if !ordered.contains(&component.component_type) {
                ordered.push(component.component_type);
            }
        }
        ordered
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EngagementModel {
    Aggregator,
    MarketplaceGeneral,
    MarketplaceProgramManaged,
    PlatformAsAService,
    Unknown(String),
}

impl EngagementModel {
    /// Exact, case-sensitive match on catalog display names.
    pub fn from_name(name: &str) -> Self {
        match name {
            "Aggregator" => Self::Aggregator,
            "Marketplace General" | "Market Place" => Self::MarketplaceGeneral,
            "Marketplace Program Managed" | "Market Place & Aggregator" => {
                Self::MarketplaceProgramManaged
            }
            "Platform as a Service" => Self::PlatformAsAService,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn includes(&self, component_type: FeeComponentType) -> bool {
        use FeeComponentType::*;

        match (self, component_type) {
            (_, PlatformUsageFee) => true,
            (_, AdvancePayment) => false,
            (Self::Aggregator | Self::Unknown(_), _) => false,
            (Self::MarketplaceGeneral, ManagementFee) => true,
            (Self::MarketplaceGeneral, ConsultingFee) => false,
            (Self::MarketplaceProgramManaged, _) => true,
            (Self::PlatformAsAService, ManagementFee) => false,
            (Self::PlatformAsAService, ConsultingFee) => true,
        }
    }
}

impl fmt::Display for EngagementModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Aggregator => f.write_str("Aggregator"),
            Self::MarketplaceGeneral => f.write_str("Marketplace General"),
            Self::MarketplaceProgramManaged => f.write_str("Marketplace Program Managed"),
            Self::PlatformAsAService => f.write_str("Platform as a Service"),
            Self::Unknown(name) => f.write_str(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        EngagementModel, EngagementModelFeeMapping, FeeComponentRequirement, FeeComponentType,
    };

    #[test]
    fn engagement_model_accepts_legacy_display_names() {
        assert_eq!(EngagementModel::from_name("Market Place"), EngagementModel::MarketplaceGeneral);
        assert_eq!(
            EngagementModel::from_name("Market Place & Aggregator"),
            EngagementModel::MarketplaceProgramManaged
        );
        assert_eq!(
            EngagementModel::from_name("aggregator"),
            EngagementModel::Unknown("aggregator".to_string())
        );
    }

    #[test]
    fn required_components_follow_application_order() {
        let mapping = EngagementModelFeeMapping {
            engagement_model: "Marketplace Program Managed".to_string(),
            components: vec![
                FeeComponentRequirement {
                    component_type: FeeComponentType::ConsultingFee,
                    is_required: true,
                    application_order: 3,
                },
                FeeComponentRequirement {
                    component_type: FeeComponentType::AdvancePayment,
                    is_required: false,
                    application_order: 4,
                },
                FeeComponentRequirement {
                    component_type: FeeComponentType::PlatformUsageFee,
                    is_required: true,
                    application_order: 1,
                },
                FeeComponentRequirement {
                    component_type: FeeComponentType::PlatformUsageFee,
                    is_required: true,
                    application_order: 2,
                },
            ],
        };

        assert_eq!(
            mapping.required_components(),
            vec![FeeComponentType::PlatformUsageFee, FeeComponentType::ConsultingFee]
        );
    }

    #[test]
    fn component_type_round_trips_through_wire_name() {
        for component in [
            FeeComponentType::PlatformUsageFee,
            FeeComponentType::ManagementFee,
            FeeComponentType::ConsultingFee,
            FeeComponentType::AdvancePayment,
        ] {
            assert_eq!(FeeComponentType::parse(component.as_str()), Some(component));
        }
        assert_eq!(FeeComponentType::parse("tax"), None);
    }
}
