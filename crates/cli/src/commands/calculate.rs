use std::str::FromStr;

use clap::Args;
use engagefee_core::config::AppConfig;
use engagefee_core::domain::context::{CalculationContext, MembershipStatus};
use engagefee_core::errors::{ApplicationError, PricingError};
use engagefee_core::pricing::{PricingCalculator, PricingSettings};
use engagefee_db::{connect, SqlFeeDataSource};
use rust_decimal::Decimal;

use crate::commands::{build_runtime, load_config, CommandResult, EXIT_DB_CONNECTIVITY};

/// Inputs shared by `calculate` and `validate`.
#[derive(Debug, Clone, Args)]
pub struct CalculationArgs {
    #[arg(long, help = "Solution fee the engagement fees are derived from")]
    pub solution_fee: String,
    #[arg(long, help = "Challenge complexity level name, e.g. Medium")]
    pub complexity: String,
    #[arg(long, help = "Engagement model name, e.g. \"Marketplace General\"")]
    pub engagement_model: String,
    #[arg(long)]
    pub country: String,
    #[arg(long)]
    pub organization_type: String,
    #[arg(long)]
    pub entity_type: String,
    #[arg(long, default_value = "Not Active", help = "Membership status (Active | Not Active)")]
    pub membership: String,
}

impl CalculationArgs {
    pub fn to_context(&self) -> Result<CalculationContext, ApplicationError> {
        let solution_fee = Decimal::from_str(self.solution_fee.trim()).map_err(|_| {
            PricingError::invalid_input(format!("solution fee `{}` is not a number", self.solution_fee))
        })?;

        Ok(CalculationContext::new(
            solution_fee,
            self.complexity.as_str(),
            self.engagement_model.as_str(),
            self.country.as_str(),
            self.organization_type.as_str(),
            self.entity_type.as_str(),
        )
        .with_membership(MembershipStatus::parse(&self.membership)))
    }
}

pub fn run(args: &CalculationArgs) -> CommandResult {
    let context = match args.to_context() {
        Ok(context) => context,
        Err(error) => return CommandResult::from_application_error("calculate", error),
    };
    let config = match load_config("calculate") {
        Ok(config) => config,
        Err(failure) => return failure,
    };
    let runtime = match build_runtime("calculate") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    runtime.block_on(async {
        let calculator = match open_calculator("calculate", &config).await {
            Ok(calculator) => calculator,
            Err(failure) => return failure,
        };

        let outcome = calculator.calculate_total_fees(&context).await;
        calculator.source().pool().close().await;

        match outcome {
            Ok(result) => {
                let message = format!(
                    "total fee {} {} with advance payment {}",
                    result.total_fee, result.currency, result.advance_payment
                );
                CommandResult::success_with_data("calculate", message, &result)
            }
            Err(error) => {
                CommandResult::from_application_error("calculate", ApplicationError::from(error))
            }
        }
    })
}

pub(crate) async fn open_calculator(
    command: &str,
    config: &AppConfig,
) -> Result<PricingCalculator<SqlFeeDataSource>, CommandResult> {
    let pool = connect(&config.database).await.map_err(|error| {
        CommandResult::failure(command, "db_connectivity", error.to_string(), EXIT_DB_CONNECTIVITY)
    })?;
    Ok(PricingCalculator::with_settings(
        SqlFeeDataSource::new(pool),
        PricingSettings::from(&config.pricing),
    ))
}
