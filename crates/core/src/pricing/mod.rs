pub mod aggregator;
pub mod composer;
pub mod formula;
pub mod multiplier;
pub mod parameters;
pub mod source;

#[cfg(test)]
pub(crate) mod testing;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use self::{
    aggregator::{FeeAggregator, DEFAULT_ADVANCE_PAYMENT_PCT},
    composer::FeeComposer,
    multiplier::ComplexityResolver,
    parameters::{advance_payment_rate, resolved_currency, FeeParameterResolver},
    source::FeeDataSource,
};
use crate::config::PricingConfig;
use crate::domain::context::CalculationContext;
use crate::domain::fee::EngagementModel;
use crate::domain::result::{
    CalculationBreakdown, CalculationDiagnostic, CalculationResult, ComponentBreakdown,
};
use crate::errors::PricingError;

pub const DEFAULT_CURRENCY: &str = "USD";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingSettings {
    pub default_advance_payment_pct: Decimal,
    pub default_currency: String,
}

impl Default for PricingSettings {
    fn default() -> Self {
        Self {
            default_advance_payment_pct: DEFAULT_ADVANCE_PAYMENT_PCT,
            default_currency: DEFAULT_CURRENCY.to_string(),
        }
    }
}

impl From<&PricingConfig> for PricingSettings {
    fn from(config: &PricingConfig) -> Self {
        Self {
            default_advance_payment_pct: config.default_advance_payment_pct,
            default_currency: config.default_currency.clone(),
        }
    }
}

/// Entry point for engagement-fee calculations.
///
/// Holds no per-call state: every call fetches fresh data from the source, so
/// identical inputs over an unchanged store give identical results.
pub struct PricingCalculator<S> {
    source: S,
    settings: PricingSettings,
    composer: FeeComposer,
    aggregator: FeeAggregator,
}

impl<S> PricingCalculator<S>
where
    S: FeeDataSource,
{
    pub fn new(source: S) -> Self {
        Self::with_settings(source, PricingSettings::default())
    }

    pub fn with_settings(source: S, settings: PricingSettings) -> Self {
        let aggregator = FeeAggregator::new(settings.default_advance_payment_pct);
        Self { source, settings, composer: FeeComposer, aggregator }
    }

    pub fn settings(&self) -> &PricingSettings {
        &self.settings
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Pre-flight check, usable on its own for live form validation.
    ///
    /// Stricter than [`Self::calculate_total_fees`]: an unknown complexity
    /// level is rejected here instead of falling back to neutral multipliers.
    pub async fn validate_calculation_inputs(
        &self,
        context: &CalculationContext,
    ) -> Result<bool, PricingError> {
        validate_required_fields(context)?;

        match self.source.complexity_multiplier(&context.challenge_complexity).await? {
            Some(multiplier) if multiplier.is_valid() => {}
            _ => return Err(PricingError::invalid_input("invalid complexity level")),
        }

        self.ensure_engagement_model(context).await?;
        Ok(true)
    }

    pub async fn calculate_total_fees(
        &self,
        context: &CalculationContext,
    ) -> Result<CalculationResult, PricingError> {
        info!(
            event_name = "pricing.calculation.start",
            engagement_model = %context.engagement_model,
            challenge_complexity = %context.challenge_complexity,
            country = %context.country,
            "starting fee calculation"
        );

        validate_required_fields(context)?;
        self.ensure_engagement_model(context).await?;

        let parameters = FeeParameterResolver::new(&self.source)
            .resolve(&context.country, &context.organization_type, &context.entity_type)
            .await?;
        let complexity =
            ComplexityResolver::new(&self.source).resolve(&context.challenge_complexity).await;
        let mapping = self.source.engagement_model_fee_mapping(&context.engagement_model).await?;

        let composition =
            self.composer.compose(context, &parameters, &complexity.multiplier, &mapping)?;
        let engagement_model = EngagementModel::from_name(&context.engagement_model);
        let totals = self.aggregator.aggregate(
            &composition.fees,
            &engagement_model,
            advance_payment_rate(&parameters),
        )?;

        let mut diagnostics = Vec::new();
        if let Some(reason) = complexity.fallback.clone() {
            diagnostics.push(CalculationDiagnostic::ComplexityFallback {
                requested: context.challenge_complexity.clone(),
                reason,
            });
        }
        if let EngagementModel::Unknown(name) = &engagement_model {
            diagnostics.push(CalculationDiagnostic::UnknownEngagementModel { name: name.clone() });
        }

        let components = composition
            .charges
            .iter()
            .filter(|charge| !charge.final_amount.is_zero())
            .map(|charge| ComponentBreakdown {
                name: charge.name.clone(),
                component_type: charge.component_type,
                base_amount: charge.base_amount,
                multiplier: charge.multiplier,
                final_amount: charge.final_amount,
                rate_type: charge.rate_type,
            })
            .collect();

        let currency = resolved_currency(&parameters)
            .unwrap_or(self.settings.default_currency.as_str())
            .to_string();

        let result = CalculationResult {
            fees: composition.fees,
            advance_payment: totals.advance_payment,
            total_fee: totals.total_fee,
            currency,
            breakdown: CalculationBreakdown {
                context: context.clone(),
                complexity: complexity.multiplier,
                advance_payment_rate: totals.advance_payment_rate,
                components,
            },
            diagnostics,
        };

        if result.is_degraded() {
            warn!(
                event_name = "pricing.calculation.degraded",
                engagement_model = %context.engagement_model,
                diagnostics = result.diagnostics.len(),
                total_fee = %result.total_fee,
                "fee calculation completed with fallbacks"
            );
        } else {
            info!(
                event_name = "pricing.calculation.completed",
                engagement_model = %context.engagement_model,
                total_fee = %result.total_fee,
                advance_payment = %result.advance_payment,
                currency = %result.currency,
                "fee calculation completed"
            );
        }

        Ok(result)
    }

    async fn ensure_engagement_model(
        &self,
        context: &CalculationContext,
    ) -> Result<(), PricingError> {
        if self.source.engagement_model_exists(&context.engagement_model).await? {
            Ok(())
        } else {
            Err(PricingError::invalid_input("invalid engagement model"))
        }
    }
}

fn validate_required_fields(context: &CalculationContext) -> Result<(), PricingError> {
    let missing = context.missing_fields();
    if !missing.is_empty() {
        return Err(PricingError::invalid_input(format!(
            "missing required fields: {}",
            missing.join(", ")
        )));
    }

    if context.solution_fee <= Decimal::ZERO {
        return Err(PricingError::invalid_input("solution fee must be positive"));
    }

    Ok(())
}
