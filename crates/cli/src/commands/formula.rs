use std::collections::BTreeMap;
use std::str::FromStr;

use anyhow::{bail, Context};
use engagefee_core::errors::{ApplicationError, FormulaError};
use engagefee_core::pricing::formula::FormulaEvaluator;
use rust_decimal::Decimal;

use crate::commands::CommandResult;

/// Evaluates a fee formula. With `preview`, evaluation failures are reported
/// inside the payload instead of as a command failure.
pub fn run(expression: &str, raw_variables: &[String], preview: bool) -> CommandResult {
    let variables = match parse_variables(raw_variables) {
        Ok(variables) => variables,
        Err(error) => {
            return CommandResult::from_application_error(
                "formula",
                ApplicationError::from(FormulaError::InvalidExpression(format!("{error:#}"))),
            );
        }
    };

    let evaluator = FormulaEvaluator;
    if preview {
        let outcome = evaluator.preview(expression, &variables);
        let message = match (&outcome.result, &outcome.error) {
            (Some(result), _) => format!("formula evaluates to {result}"),
            (None, Some(error)) => format!("formula preview failed: {error}"),
            (None, None) => "formula preview produced no result".to_string(),
        };
        return CommandResult::success_with_data("formula", message, &outcome);
    }

    match evaluator.evaluate(expression, &variables) {
        Ok(outcome) => CommandResult::success_with_data(
            "formula",
            format!("formula evaluates to {}", outcome.result),
            &outcome,
        ),
        Err(error) => {
            CommandResult::from_application_error("formula", ApplicationError::from(error))
        }
    }
}

/// Parses `name=value` pairs; later assignments to the same name win.
pub fn parse_variables(raw_variables: &[String]) -> anyhow::Result<BTreeMap<String, Decimal>> {
    let mut variables = BTreeMap::new();
    for raw in raw_variables {
        let (name, value) = parse_variable(raw)?;
        variables.insert(name, value);
    }
    Ok(variables)
}

fn parse_variable(raw: &str) -> anyhow::Result<(String, Decimal)> {
    let Some((name, value)) = raw.split_once('=') else {
        bail!("variable `{raw}` must be written as name=value");
    };
    let name = name.trim();
    let mut chars = name.chars();
    let valid_name = matches!(chars.next(), Some(first) if first.is_ascii_alphabetic() || first == '_')
        && chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_');
    if !valid_name {
        bail!("variable name `{name}` is not an identifier");
    }

    let value = Decimal::from_str(value.trim())
        .with_context(|| format!("variable `{name}` has a non-numeric value"))?;
    Ok((name.to_string(), value))
}
