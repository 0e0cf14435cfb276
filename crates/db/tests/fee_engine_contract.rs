use engagefee_core::domain::result::{CalculationDiagnostic, ComplexityFallback};
use engagefee_core::{CalculationContext, PricingCalculator, PricingError};
use engagefee_db::{connect_with_settings, migrations, FeeMasterSeed, SqlFeeDataSource};
use rust_decimal::Decimal;

type ContractResult<T = ()> = Result<T, String>;

macro_rules! require {
    ($cond:expr) => {
        if !$cond {
            return Err(format!("assertion failed: `{}`", stringify!($cond)));
        }
    };
    ($cond:expr, $($arg:tt)*) => {
        if !$cond {
            return Err(format!($($arg)*));
        }
    };
}

macro_rules! require_eq {
    ($left:expr, $right:expr) => {
        match (&$left, &$right) {
            (left, right) => {
                if *left != *right {
                    return Err(format!(
                        "assertion failed: `left == right` (`{:?}` != `{:?}`)",
                        left,
                        right
                    ));
                }
            }
        }
    };
}

async fn seeded_calculator() -> ContractResult<PricingCalculator<SqlFeeDataSource>> {
    let pool = connect_with_settings("sqlite::memory:", 1, 30)
        .await
        .map_err(|error| format!("connect failed: {error}"))?;
    migrations::run_pending(&pool).await.map_err(|error| format!("migrate failed: {error}"))?;
    FeeMasterSeed::load(&pool).await.map_err(|error| format!("seed failed: {error}"))?;
    Ok(PricingCalculator::new(SqlFeeDataSource::new(pool)))
}

fn us_context(solution_fee: i64, complexity: &str, model: &str) -> CalculationContext {
    CalculationContext::new(
        Decimal::new(solution_fee, 0),
        complexity,
        model,
        "United States",
        "Large Enterprise",
        "For Profit",
    )
}

fn money(value: i64) -> Decimal {
    Decimal::new(value, 0)
}

#[tokio::test]
async fn aggregator_charges_platform_fee_with_default_advance() -> ContractResult {
    let calculator = seeded_calculator().await?;
    let result = calculator
        .calculate_total_fees(&us_context(50_000, "Medium", "Aggregator"))
        .await
        .map_err(|error| error.to_string())?;

    require_eq!(result.fees.platform_usage_fee, money(7_500));
    require_eq!(result.total_fee, money(7_500));
    require_eq!(result.advance_payment, money(1_875));
    require_eq!(result.currency.as_str(), "USD");
    require!(result.diagnostics.is_empty(), "unexpected diagnostics: {:?}", result.diagnostics);
    Ok(())
}

#[tokio::test]
async fn marketplace_models_scale_by_complexity() -> ContractResult {
    let calculator = seeded_calculator().await?;

    let general = calculator
        .calculate_total_fees(&us_context(50_000, "Medium", "Marketplace General"))
        .await
        .map_err(|error| error.to_string())?;
    require_eq!(general.fees.management_fee, money(7_500));
    require_eq!(general.total_fee, money(15_000));

    let program = calculator
        .calculate_total_fees(&us_context(50_000, "Medium", "Marketplace Program Managed"))
        .await
        .map_err(|error| error.to_string())?;
    require_eq!(program.fees.consulting_fee, money(3_600));
    require_eq!(program.total_fee, money(18_600));
    require_eq!(program.advance_payment, money(4_650));
    require_eq!(program.breakdown.components.len(), 3);
    Ok(())
}

#[tokio::test]
async fn legacy_market_place_name_prices_like_marketplace_general() -> ContractResult {
    let calculator = seeded_calculator().await?;
    let result = calculator
        .calculate_total_fees(&us_context(50_000, "Medium", "Market Place"))
        .await
        .map_err(|error| error.to_string())?;

    require_eq!(result.total_fee, money(15_000));
    require!(result.diagnostics.is_empty());
    Ok(())
}

#[tokio::test]
async fn unknown_and_inactive_complexity_fall_back_to_neutral() -> ContractResult {
    let calculator = seeded_calculator().await?;

    for level in ["Extreme", "Legacy"] {
        let result = calculator
            .calculate_total_fees(&us_context(50_000, level, "Marketplace Program Managed"))
            .await
            .map_err(|error| error.to_string())?;
        require_eq!(result.fees.management_fee, money(5_000));
        require_eq!(result.fees.consulting_fee, money(3_000));
        require_eq!(
            result.diagnostics,
            vec![CalculationDiagnostic::ComplexityFallback {
                requested: level.to_string(),
                reason: ComplexityFallback::NotFound,
            }]
        );
    }
    Ok(())
}

#[tokio::test]
async fn scope_specific_advance_rate_and_currency_apply() -> ContractResult {
    let calculator = seeded_calculator().await?;
    let context = CalculationContext::new(
        Decimal::new(100_000, 0),
        "Medium",
        "Marketplace Program Managed",
        "India",
        "Startup",
        "For Profit",
    );
    let result = calculator.calculate_total_fees(&context).await.map_err(|error| error.to_string())?;

    require_eq!(result.fees.platform_usage_fee, money(10_000));
    require_eq!(result.fees.management_fee, money(3_000));
    require_eq!(result.fees.consulting_fee, money(1_000));
    require_eq!(result.total_fee, money(14_000));
    require_eq!(result.breakdown.advance_payment_rate, money(30));
    require_eq!(result.advance_payment, money(4_200));
    require_eq!(result.currency.as_str(), "INR");
    Ok(())
}

#[tokio::test]
async fn unconfigured_scope_yields_zero_fees_in_default_currency() -> ContractResult {
    let calculator = seeded_calculator().await?;
    let context = CalculationContext::new(
        Decimal::new(10_000, 0),
        "Low",
        "Platform as a Service",
        "Germany",
        "Startup",
        "Non Profit",
    );
    let result = calculator.calculate_total_fees(&context).await.map_err(|error| error.to_string())?;

    require_eq!(result.total_fee, Decimal::ZERO);
    require_eq!(result.advance_payment, Decimal::ZERO);
    require_eq!(result.currency.as_str(), "USD");
    Ok(())
}

#[tokio::test]
async fn retired_and_unknown_models_are_rejected() -> ContractResult {
    let calculator = seeded_calculator().await?;

    for model in ["Retired Model", "Barter"] {
        let outcome = calculator.calculate_total_fees(&us_context(50_000, "Low", model)).await;
        require_eq!(
            outcome.map(|result| result.total_fee),
            Err::<Decimal, PricingError>(PricingError::InvalidInput("invalid engagement model".to_string()))
        );
    }
    Ok(())
}

#[tokio::test]
async fn validation_is_strict_about_complexity() -> ContractResult {
    let calculator = seeded_calculator().await?;

    let valid = calculator
        .validate_calculation_inputs(&us_context(50_000, "High", "Aggregator"))
        .await
        .map_err(|error| error.to_string())?;
    require!(valid);

    let inactive =
        calculator.validate_calculation_inputs(&us_context(50_000, "Legacy", "Aggregator")).await;
    require_eq!(inactive, Err::<bool, PricingError>(PricingError::InvalidInput("invalid complexity level".to_string())));
    Ok(())
}

#[tokio::test]
async fn repeated_runs_over_unchanged_store_are_identical() -> ContractResult {
    let calculator = seeded_calculator().await?;
    let context = us_context(123_457, "High", "Platform as a Service");

    let first = calculator.calculate_total_fees(&context).await.map_err(|error| error.to_string())?;
    let second = calculator.calculate_total_fees(&context).await.map_err(|error| error.to_string())?;
    require_eq!(first, second);
    require_eq!(first.total_fee, first.fees.platform_usage_fee + first.fees.consulting_fee);
    Ok(())
}
