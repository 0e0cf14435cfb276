use engagefee_core::errors::ApplicationError;

use crate::commands::calculate::{open_calculator, CalculationArgs};
use crate::commands::{build_runtime, load_config, CommandResult};

pub fn run(args: &CalculationArgs) -> CommandResult {
    let context = match args.to_context() {
        Ok(context) => context,
        Err(error) => return CommandResult::from_application_error("validate", error),
    };
    let config = match load_config("validate") {
        Ok(config) => config,
        Err(failure) => return failure,
    };
    let runtime = match build_runtime("validate") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    runtime.block_on(async {
        let calculator = match open_calculator("validate", &config).await {
            Ok(calculator) => calculator,
            Err(failure) => return failure,
        };

        let outcome = calculator.validate_calculation_inputs(&context).await;
        calculator.source().pool().close().await;

        match outcome {
            Ok(_) => CommandResult::success("validate", "calculation inputs are valid"),
            Err(error) => {
                CommandResult::from_application_error("validate", ApplicationError::from(error))
            }
        }
    })
}
