use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::context::CalculationContext;
use super::fee::{ComplexityMultiplier, FeeComponentType, RateType};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposedFees {
    pub platform_usage_fee: Decimal,
    pub management_fee: Decimal,
    pub consulting_fee: Decimal,
}

impl ComposedFees {
    pub fn amount(&self, component_type: FeeComponentType) -> Decimal {
        match component_type {
            FeeComponentType::PlatformUsageFee => self.platform_usage_fee,
            FeeComponentType::ManagementFee => self.management_fee,
            FeeComponentType::ConsultingFee => self.consulting_fee,
            FeeComponentType::AdvancePayment => Decimal::ZERO,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentBreakdown {
    pub name: String,
    pub component_type: FeeComponentType,
    pub base_amount: Decimal,
    pub multiplier: Decimal,
    pub final_amount: Decimal,
    pub rate_type: RateType,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ComplexityFallback {
    NotFound,
    InvalidMultiplier,
    LookupFailed { reason: String },
}

/// Degraded-but-successful outcomes, kept apart from hard errors.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CalculationDiagnostic {
    ComplexityFallback { requested: String, reason: ComplexityFallback },
    UnknownEngagementModel { name: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationBreakdown {
    pub context: CalculationContext,
    pub complexity: ComplexityMultiplier,
    pub advance_payment_rate: Decimal,
    pub components: Vec<ComponentBreakdown>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationResult {
    pub fees: ComposedFees,
    pub advance_payment: Decimal,
    pub total_fee: Decimal,
    pub currency: String,
    pub breakdown: CalculationBreakdown,
    pub diagnostics: Vec<CalculationDiagnostic>,
}

impl CalculationResult {
    pub fn is_degraded(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    pub fn used_complexity_fallback(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diagnostic| matches!(diagnostic, CalculationDiagnostic::ComplexityFallback { .. }))
    }
}
