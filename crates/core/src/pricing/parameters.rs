use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::source::FeeDataSource;
use crate::domain::fee::{FeeComponentType, FeeParameter};
use crate::errors::PricingError;

pub struct FeeParameterResolver<'a, S: ?Sized> {
    source: &'a S,
}

impl<'a, S> FeeParameterResolver<'a, S>
where
    S: FeeDataSource + ?Sized,
{
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    /// Active parameters for the exact scope triple, in source order.
    ///
    /// An empty list means "no fees configured" and is not an error.
    pub async fn resolve(
        &self,
        country: &str,
        organization_type: &str,
        entity_type: &str,
    ) -> Result<Vec<FeeParameter>, PricingError> {
        let records = self
            .source
            .fee_parameters(country, organization_type, entity_type)
            .await
            .map_err(PricingError::ParameterResolution)?;

        let fetched = records.len();
        let parameters: Vec<FeeParameter> = records
            .into_iter()
            .filter(|record| {
                record.active && record.matches_scope(country, organization_type, entity_type)
            })
            .filter(|record| {
                if record.parameter.amount < Decimal::ZERO {
                    warn!(
                        event_name = "pricing.parameters.negative_amount",
                        parameter_id = %record.parameter.id,
                        component_type = %record.parameter.component_type,
                        amount = %record.parameter.amount,
                        "skipping fee parameter with negative amount"
                    );
                    return false;
                }
                true
            })
            .map(|record| record.parameter)
            .collect();

        debug!(
            event_name = "pricing.parameters.resolved",
            country,
            organization_type,
            entity_type,
            fetched,
            resolved = parameters.len(),
            "fee parameters resolved"
        );
        Ok(parameters)
    }
}

/// First parameter of the given component type.
pub fn find_parameter(
    parameters: &[FeeParameter],
    component_type: FeeComponentType,
) -> Option<&FeeParameter> {
    parameters.iter().find(|parameter| parameter.component_type == component_type)
}

/// Advance-payment percentage from the first `advance_payment` parameter.
pub fn advance_payment_rate(parameters: &[FeeParameter]) -> Option<Decimal> {
    find_parameter(parameters, FeeComponentType::AdvancePayment).map(|parameter| parameter.amount)
}

/// Currency of the first resolved parameter.
pub fn resolved_currency(parameters: &[FeeParameter]) -> Option<&str> {
    parameters
        .first()
        .map(|parameter| parameter.currency_code.as_str())
        .filter(|code| !code.trim().is_empty())
}
