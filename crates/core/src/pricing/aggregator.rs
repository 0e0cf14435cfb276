use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::composer::overflow_checked;
use crate::domain::fee::{EngagementModel, FeeComponentType};
use crate::domain::result::ComposedFees;
use crate::errors::PricingError;

pub const DEFAULT_ADVANCE_PAYMENT_PCT: Decimal = Decimal::from_parts(25, 0, 0, false, 0);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeTotals {
    pub total_fee: Decimal,
    pub advance_payment: Decimal,
    pub advance_payment_rate: Decimal,
    pub included: Vec<FeeComponentType>,
}

#[derive(Clone, Copy, Debug)]
pub struct FeeAggregator {
    default_advance_payment_pct: Decimal,
}

impl Default for FeeAggregator {
    fn default() -> Self {
        Self { default_advance_payment_pct: DEFAULT_ADVANCE_PAYMENT_PCT }
    }
}

impl FeeAggregator {
    pub fn new(default_advance_payment_pct: Decimal) -> Self {
        Self { default_advance_payment_pct }
    }

    /// Sums the fees the engagement model includes and derives the advance
    /// payment. `advance_payment_rate` falls back to the configured default.
    pub fn aggregate(
        &self,
        fees: &ComposedFees,
        engagement_model: &EngagementModel,
        advance_payment_rate: Option<Decimal>,
    ) -> Result<FeeTotals, PricingError> {
        if let EngagementModel::Unknown(name) = engagement_model {
            warn!(
                event_name = "pricing.aggregate.unknown_engagement_model",
                engagement_model = %name,
                "unrecognized engagement model; totalling platform usage fee only"
            );
        }

        let included: Vec<FeeComponentType> = [
            FeeComponentType::PlatformUsageFee,
            FeeComponentType::ManagementFee,
            FeeComponentType::ConsultingFee,
        ]
        .into_iter()
        .filter(|component| engagement_model.includes(*component))
        .collect();

        let total_fee = overflow_checked(
            included
                .iter()
                .try_fold(Decimal::ZERO, |sum, component| sum.checked_add(fees.amount(*component))),
        )?;
        let advance_payment_rate = advance_payment_rate.unwrap_or(self.default_advance_payment_pct);
        let advance_payment = overflow_checked(
            advance_payment_rate
                .checked_div(Decimal::ONE_HUNDRED)
                .and_then(|rate| total_fee.checked_mul(rate)),
        )?;

        Ok(FeeTotals { total_fee, advance_payment, advance_payment_rate, included })
    }
}
