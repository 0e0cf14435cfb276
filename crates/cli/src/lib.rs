pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

use commands::calculate::CalculationArgs;

#[derive(Debug, Parser)]
#[command(
    name = "engagefee",
    about = "Engagement fee calculator",
    long_about = "Calculate and validate engagement fees against fee master data, evaluate fee formulas, and manage the fee database.",
    after_help = "Examples:\n  engagefee seed\n  engagefee calculate --solution-fee 50000 --complexity Medium \\\n    --engagement-model \"Marketplace General\" --country \"United States\" \\\n    --organization-type \"Large Enterprise\" --entity-type \"For Profit\"\n  engagefee formula --expression \"solution_fee * 0.15\" --var solution_fee=50000"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Calculate engagement fees, totals, and advance payment")]
    Calculate(CalculationArgs),
    #[command(about = "Check calculation inputs without computing fees")]
    Validate(CalculationArgs),
    #[command(about = "Evaluate an arithmetic fee formula with variable substitution")]
    Formula {
        #[arg(long, help = "Expression using + - * / and parentheses")]
        expression: String,
        #[arg(long = "var", value_name = "NAME=VALUE", help = "Variable binding, repeatable")]
        vars: Vec<String>,
        #[arg(long, help = "Report evaluation errors inside a successful payload")]
        preview: bool,
    },
    #[command(about = "Apply pending fee schema migrations")]
    Migrate,
    #[command(about = "Load and verify deterministic fee master data")]
    Seed,
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::Calculate(_) => "calculate",
            Self::Validate(_) => "validate",
            Self::Formula { .. } => "formula",
            Self::Migrate => "migrate",
            Self::Seed => "seed",
            Self::Config => "config",
        }
    }
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let command_name = cli.command.name();
    let result = match cli.command {
        Command::Calculate(args) => commands::calculate::run(&args),
        Command::Validate(args) => commands::validate::run(&args),
        Command::Formula { expression, vars, preview } => {
            commands::formula::run(&expression, &vars, preview)
        }
        Command::Migrate => commands::migrate::run(),
        Command::Seed => commands::seed::run(),
        Command::Config => commands::config::run(),
    };

    tracing::debug!(
        event_name = "cli.command.finished",
        command = command_name,
        exit_code = result.exit_code,
        "command finished"
    );
    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
