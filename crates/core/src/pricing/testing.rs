use std::collections::BTreeMap;

use async_trait::async_trait;
use rust_decimal::Decimal;

use super::source::FeeDataSource;
use crate::domain::context::CalculationContext;
use crate::domain::fee::{
    ComplexityMultiplier, EngagementModelFeeMapping, FeeComponentRequirement, FeeComponentType,
    FeeParameter, FeeParameterRecord, RateType,
};
use crate::errors::LookupError;

pub const COUNTRY: &str = "United States";
pub const ORGANIZATION_TYPE: &str = "Large Enterprise";
pub const ENTITY_TYPE: &str = "For Profit";

pub fn context(solution_fee: Decimal, engagement_model: &str) -> CalculationContext {
    CalculationContext::new(
        solution_fee,
        "Medium",
        engagement_model,
        COUNTRY,
        ORGANIZATION_TYPE,
        ENTITY_TYPE,
    )
}

pub fn parameter(
    id: &str,
    component_type: FeeComponentType,
    amount: Decimal,
    complexity_applicable: bool,
) -> FeeParameter {
    let rate_type = match component_type {
        FeeComponentType::PlatformUsageFee | FeeComponentType::AdvancePayment => {
            RateType::Percentage
        }
        _ => RateType::Currency,
    };
    FeeParameter {
        id: id.to_string(),
        component_type,
        name: component_type.as_str().replace('_', " "),
        amount,
        rate_type,
        complexity_applicable,
        currency_code: "USD".to_string(),
        currency_symbol: "$".to_string(),
    }
}

pub fn record(parameter: FeeParameter) -> FeeParameterRecord {
    FeeParameterRecord {
        parameter,
        country: COUNTRY.to_string(),
        organization_type: ORGANIZATION_TYPE.to_string(),
        entity_type: ENTITY_TYPE.to_string(),
        active: true,
    }
}

pub fn mapping(engagement_model: &str, components: &[FeeComponentType]) -> EngagementModelFeeMapping {
    EngagementModelFeeMapping {
        engagement_model: engagement_model.to_string(),
        components: components
            .iter()
            .enumerate()
            .map(|(index, component_type)| FeeComponentRequirement {
                component_type: *component_type,
                is_required: true,
                application_order: index as i32 + 1,
            })
            .collect(),
    }
}

#[derive(Clone, Debug, Default)]
pub struct StubFeeSource {
    pub records: Vec<FeeParameterRecord>,
    pub complexities: Vec<ComplexityMultiplier>,
    pub mappings: BTreeMap<String, EngagementModelFeeMapping>,
    pub fail_parameters: bool,
    pub fail_complexity: bool,
    pub fail_mapping: bool,
}

impl StubFeeSource {
    /// Platform 15%, management 5000 and consulting 3000 (both complexity
    /// scaled), Low/Medium/High tiers and the four standard models plus an
    /// unrecognized catalog entry.
    pub fn standard() -> Self {
        use FeeComponentType::*;

        let mut mappings = BTreeMap::new();
        for (model, components) in [
            ("Aggregator", vec![PlatformUsageFee]),
            ("Marketplace General", vec![PlatformUsageFee, ManagementFee]),
            ("Marketplace Program Managed", vec![PlatformUsageFee, ManagementFee, ConsultingFee]),
            ("Platform as a Service", vec![PlatformUsageFee, ConsultingFee]),
            ("Enterprise Direct", vec![PlatformUsageFee, ManagementFee]),
        ] {
            mappings.insert(model.to_string(), mapping(model, &components));
        }

        Self {
            records: vec![
                record(parameter("pf-1", PlatformUsageFee, Decimal::new(15, 0), false)),
                record(parameter("mf-1", ManagementFee, Decimal::new(5_000, 0), true)),
                record(parameter("cf-1", ConsultingFee, Decimal::new(3_000, 0), true)),
            ],
            complexities: vec![
                ComplexityMultiplier::new("Low", Decimal::ONE, Decimal::ONE),
                ComplexityMultiplier::new("Medium", Decimal::new(15, 1), Decimal::new(12, 1)),
                ComplexityMultiplier::new("High", Decimal::TWO, Decimal::new(15, 1)),
            ],
            mappings,
            ..Self::default()
        }
    }

    pub fn with_complexity(mut self, multiplier: ComplexityMultiplier) -> Self {
        self.complexities.retain(|existing| existing.name != multiplier.name);
        self.complexities.push(multiplier);
        self
    }
}

#[async_trait]
impl FeeDataSource for StubFeeSource {
    async fn fee_parameters(
        &self,
        _country: &str,
        _organization_type: &str,
        _entity_type: &str,
    ) -> Result<Vec<FeeParameterRecord>, LookupError> {
        if self.fail_parameters {
            return Err(LookupError::Unavailable("connection refused".to_string()));
        }
        Ok(self.records.clone())
    }

    async fn complexity_multiplier(
        &self,
        name: &str,
    ) -> Result<Option<ComplexityMultiplier>, LookupError> {
        if self.fail_complexity {
            return Err(LookupError::Unavailable("connection reset".to_string()));
        }
        Ok(self.complexities.iter().find(|multiplier| multiplier.name == name).cloned())
    }

    async fn engagement_model_fee_mapping(
        &self,
        engagement_model: &str,
    ) -> Result<EngagementModelFeeMapping, LookupError> {
        if self.fail_mapping {
            return Err(LookupError::Unavailable("mapping table locked".to_string()));
        }
        Ok(self.mappings.get(engagement_model).cloned().unwrap_or_else(|| {
            EngagementModelFeeMapping {
                engagement_model: engagement_model.to_string(),
                components: Vec::new(),
            }
        }))
    }

    async fn engagement_model_exists(&self, engagement_model: &str) -> Result<bool, LookupError> {
        Ok(self.mappings.contains_key(engagement_model))
    }
}
