use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::parameters::find_parameter;
use crate::domain::context::CalculationContext;
use crate::domain::fee::{
    ComplexityMultiplier, EngagementModelFeeMapping, FeeComponentType, FeeParameter, RateType,
};
use crate::domain::result::ComposedFees;
use crate::errors::PricingError;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Converts a checked decimal operation into the overflow error.
pub(crate) fn overflow_checked(value: Option<Decimal>) -> Result<Decimal, PricingError> {
    value.ok_or_else(|| PricingError::invalid_input("fee amount overflow"))
}

/// One composed charge with the inputs that produced it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentCharge {
    pub component_type: FeeComponentType,
    pub name: String,
    pub base_amount: Decimal,
    pub multiplier: Decimal,
    pub final_amount: Decimal,
    pub rate_type: RateType,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Composition {
    pub fees: ComposedFees,
    pub charges: Vec<ComponentCharge>,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct FeeComposer;

impl FeeComposer {
    pub fn compose(
        &self,
        context: &CalculationContext,
        parameters: &[FeeParameter],
        multiplier: &ComplexityMultiplier,
        mapping: &EngagementModelFeeMapping,
    ) -> Result<Composition, PricingError> {
        compose_fees(context, parameters, multiplier, mapping)
    }
}

pub fn compose_fees(
    context: &CalculationContext,
    parameters: &[FeeParameter],
    multiplier: &ComplexityMultiplier,
    mapping: &EngagementModelFeeMapping,
) -> Result<Composition, PricingError> {
    let mut composition = Composition::default();

    for component_type in mapping.required_components() {
        let Some(parameter) = find_parameter(parameters, component_type) else {
            continue;
        };

        let charge = match component_type {
            // Always a percentage of the solution fee; the row's rate type is not consulted.
            FeeComponentType::PlatformUsageFee => ComponentCharge {
                component_type,
                name: parameter.name.clone(),
                base_amount: parameter.amount,
                multiplier: Decimal::ONE,
                final_amount: overflow_checked(
                    parameter
                        .amount
                        .checked_div(HUNDRED)
                        .and_then(|rate| context.solution_fee.checked_mul(rate)),
                )?,
                rate_type: RateType::Percentage,
            },
            FeeComponentType::ManagementFee => {
                scaled_charge(parameter, multiplier.management)?
            }
            FeeComponentType::ConsultingFee => {
                scaled_charge(parameter, multiplier.consulting)?
            }
            FeeComponentType::AdvancePayment => continue,
        };

        match component_type {
            FeeComponentType::PlatformUsageFee => {
                composition.fees.platform_usage_fee = charge.final_amount
            }
            FeeComponentType::ManagementFee => composition.fees.management_fee = charge.final_amount,
            FeeComponentType::ConsultingFee => composition.fees.consulting_fee = charge.final_amount,
            FeeComponentType::AdvancePayment => {}
        }
        composition.charges.push(charge);
    }

    Ok(composition)
}

fn scaled_charge(
    parameter: &FeeParameter,
    complexity_multiplier: Decimal,
) -> Result<ComponentCharge, PricingError> {
    let multiplier =
        if parameter.complexity_applicable { complexity_multiplier } else { Decimal::ONE };

    Ok(ComponentCharge {
        component_type: parameter.component_type,
        name: parameter.name.clone(),
        base_amount: parameter.amount,
        multiplier,
        final_amount: overflow_checked(parameter.amount.checked_mul(multiplier))?,
        rate_type: parameter.rate_type,
    })
}
