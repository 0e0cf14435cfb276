//! Arithmetic evaluator for administrator-authored fee formulas.
//!
//! Variables are substituted by whole identifier, then the substituted text is
//! parsed with a small recursive-descent grammar:
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := ('+' | '-') unary | primary
//! primary := number | '(' expr ')'
//! ```
//!
//! Nothing outside that grammar is accepted.

use std::collections::BTreeMap;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::FormulaError;

const MAX_NESTING: usize = 64;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormulaOutcome {
    pub result: Decimal,
    pub breakdown: String,
}

/// Preview shape for interactive editing: failures are data, not errors.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormulaPreview {
    pub result: Option<Decimal>,
    pub breakdown: String,
    pub error: Option<String>,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct FormulaEvaluator;

impl FormulaEvaluator {
    pub fn evaluate(
        &self,
        expression: &str,
        variables: &BTreeMap<String, Decimal>,
    ) -> Result<FormulaOutcome, FormulaError> {
        evaluate_formula(expression, variables)
    }

    pub fn preview(&self, expression: &str, variables: &BTreeMap<String, Decimal>) -> FormulaPreview {
        let substitution = substitute_variables(expression, variables);
        match evaluate_substituted(&substitution.expression) {
            Ok(result) => FormulaPreview {
                result: Some(result),
                breakdown: substitution.render(Some(result)),
                error: None,
            },
            Err(error) => FormulaPreview {
                result: None,
                breakdown: substitution.render(None),
                error: Some(error.to_string()),
            },
        }
    }
}

pub fn evaluate_formula(
    expression: &str,
    variables: &BTreeMap<String, Decimal>,
) -> Result<FormulaOutcome, FormulaError> {
    let substitution = substitute_variables(expression, variables);
    let result = evaluate_substituted(&substitution.expression)?;
    Ok(FormulaOutcome { result, breakdown: substitution.render(Some(result)) })
}

struct Substitution {
    expression: String,
    applied: Vec<(String, Decimal)>,
}

impl Substitution {
    fn render(&self, result: Option<Decimal>) -> String {
        let mut lines = Vec::with_capacity(self.applied.len() + 3);
        if !self.applied.is_empty() {
            lines.push("Variables:".to_string());
            for (name, value) in &self.applied {
                lines.push(format!("  {name} = {}", value.normalize()));
            }
        }
        lines.push(format!("Expression: {}", self.expression));
        if let Some(result) = result {
            lines.push(format!("Result: {}", result.normalize()));
        }
        lines.join("\n")
    }
}

fn is_identifier_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

fn is_word_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

fn decimal_literal(value: Decimal) -> String {
    let literal = value.normalize().to_string();
    if value.is_sign_negative() && !value.is_zero() {
        format!("({literal})")
    } else {
        literal
    }
}

fn substitute_variables(expression: &str, variables: &BTreeMap<String, Decimal>) -> Substitution {
    let chars: Vec<char> = expression.chars().collect();
    let mut output = String::with_capacity(expression.len());
    let mut applied: Vec<(String, Decimal)> = Vec::new();
    let mut index = 0;

    while index < chars.len() {
        let ch = chars[index];

        // A run starting with a digit stays a literal so `2e5` never exposes `e5`.
        if ch.is_ascii_digit() || ch == '.' {
            while index < chars.len() && (is_word_char(chars[index]) || chars[index] == '.') {
                output.push(chars[index]);
                index += 1;
            }
            continue;
        }

        if is_identifier_start(ch) {
            let start = index;
            while index < chars.len() && is_word_char(chars[index]) {
                index += 1;
            }
            let word: String = chars[start..index].iter().collect();
            match variables.get(&word) {
                Some(value) => {
                    output.push_str(&decimal_literal(*value));
                    if !applied.iter().any(|(name, _)| name == &word) {
                        applied.push((word, *value));
                    }
                }
                None => output.push_str(&word),
            }
            continue;
        }

        output.push(ch);
        index += 1;
    }

    Substitution { expression: output, applied }
}

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Number(Decimal),
    Plus,
    Minus,
    Star,
    Slash,
    LeftParen,
    RightParen,
}

fn invalid(message: impl Into<String>) -> FormulaError {
    FormulaError::InvalidExpression(message.into())
}

fn tokenize(expression: &str) -> Result<Vec<Token>, FormulaError> {
    let chars: Vec<char> = expression.chars().collect();
    let mut tokens = Vec::new();
    let mut index = 0;

    while index < chars.len() {
        let ch = chars[index];
        match ch {
            c if c.is_whitespace() => index += 1,
            '+' => {
                tokens.push(Token::Plus);
                index += 1;
            }
            '-' => {
                tokens.push(Token::Minus);
                index += 1;
            }
            '*' => {
                tokens.push(Token::Star);
                index += 1;
            }
            '/' => {
                tokens.push(Token::Slash);
                index += 1;
            }
            '(' => {
                tokens.push(Token::LeftParen);
                index += 1;
            }
            ')' => {
                tokens.push(Token::RightParen);
                index += 1;
            }
            c if c.is_ascii_digit() || c == '.' => {
                let start = index;
                while index < chars.len() && (is_word_char(chars[index]) || chars[index] == '.') {
                    index += 1;
                }
                let literal: String = chars[start..index].iter().collect();
                let valid_shape = literal.chars().all(|c| c.is_ascii_digit() || c == '.')
                    && literal.matches('.').count() <= 1
                    && literal.chars().any(|c| c.is_ascii_digit());
                if !valid_shape {
                    return Err(invalid(format!("malformed number `{literal}`")));
                }
                let padded = match (literal.starts_with('.'), literal.ends_with('.')) {
                    (true, _) => format!("0{literal}"),
                    (_, true) => format!("{literal}0"),
                    _ => literal.clone(),
                };
                let value = Decimal::from_str(&padded)
                    .map_err(|_| invalid(format!("malformed number `{literal}`")))?;
                tokens.push(Token::Number(value));
            }
            c if is_identifier_start(c) => {
                let start = index;
                while index < chars.len() && is_word_char(chars[index]) {
                    index += 1;
                }
                let word: String = chars[start..index].iter().collect();
                return Err(invalid(format!("unknown identifier `{word}`")));
            }
            other => return Err(invalid(format!("unexpected character `{other}`"))),
        }
    }

    Ok(tokens)
}

fn evaluate_substituted(expression: &str) -> Result<Decimal, FormulaError> {
    let tokens = tokenize(expression)?;
    if tokens.is_empty() {
        return Err(invalid("expression is empty"));
    }

    let mut parser = Parser { tokens, position: 0, depth: 0 };
    let value = parser.expression()?;
    if parser.position < parser.tokens.len() {
        return Err(invalid("unexpected trailing input"));
    }
    Ok(value)
}

struct Parser {
    tokens: Vec<Token>,
    position: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    fn expression(&mut self) -> Result<Decimal, FormulaError> {
        let mut value = self.term()?;
        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.advance();
                    let rhs = self.term()?;
                    value = value.checked_add(rhs).ok_or_else(|| invalid("arithmetic overflow"))?;
                }
                Some(Token::Minus) => {
                    self.advance();
                    let rhs = self.term()?;
                    value = value.checked_sub(rhs).ok_or_else(|| invalid("arithmetic overflow"))?;
                }
                _ => return Ok(value),
            }
        }
    }

    fn term(&mut self) -> Result<Decimal, FormulaError> {
        let mut value = self.unary()?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.advance();
                    let rhs = self.unary()?;
                    value = value.checked_mul(rhs).ok_or_else(|| invalid("arithmetic overflow"))?;
                }
                Some(Token::Slash) => {
                    self.advance();
                    let rhs = self.unary()?;
                    if rhs.is_zero() {
                        return Err(invalid("division by zero"));
                    }
                    value = value.checked_div(rhs).ok_or_else(|| invalid("arithmetic overflow"))?;
                }
                _ => return Ok(value),
            }
        }
    }

    fn unary(&mut self) -> Result<Decimal, FormulaError> {
        match self.peek() {
            Some(Token::Plus) => {
                self.advance();
                self.nested(Self::unary)
            }
            Some(Token::Minus) => {
                self.advance();
                Ok(-self.nested(Self::unary)?)
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> Result<Decimal, FormulaError> {
        match self.advance() {
            Some(Token::Number(value)) => Ok(value),
            Some(Token::LeftParen) => {
                let value = self.nested(Self::expression)?;
                match self.advance() {
                    Some(Token::RightParen) => Ok(value),
                    _ => Err(invalid("missing closing parenthesis")),
                }
            }
            Some(Token::RightParen) => Err(invalid("unexpected `)`")),
            Some(_) => Err(invalid("operator is missing an operand")),
            None => Err(invalid("unexpected end of expression")),
        }
    }

    fn nested(
        &mut self,
        rule: fn(&mut Self) -> Result<Decimal, FormulaError>,
    ) -> Result<Decimal, FormulaError> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(invalid(format!("expression nests deeper than {MAX_NESTING} levels")));
        }
        let value = rule(self);
        self.depth -= 1;
        value
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use rust_decimal::Decimal;

    use super::{evaluate_formula, FormulaEvaluator};
    use crate::errors::FormulaError;

    fn vars(entries: &[(&str, Decimal)]) -> BTreeMap<String, Decimal> {
        entries.iter().map(|(name, value)| (name.to_string(), *value)).collect()
    }

    #[test]
    fn evaluates_base_value_formula() {
        let outcome =
            evaluate_formula("base_value * 2 + 100", &vars(&[("base_value", Decimal::new(50, 0))]))
                .expect("formula should evaluate");

        assert_eq!(outcome.result, Decimal::new(200, 0));
        assert!(outcome.breakdown.contains("base_value = 50"));
        assert!(outcome.breakdown.contains("Expression: 50 * 2 + 100"));
        assert!(outcome.breakdown.contains("Result: 200"));
    }

    #[test]
    fn substitution_matches_whole_identifiers_only() {
        let outcome = evaluate_formula(
            "base + base_value",
            &vars(&[("base", Decimal::new(1, 0)), ("base_value", Decimal::new(10, 0))]),
        )
        .expect("formula should evaluate");

        assert_eq!(outcome.result, Decimal::new(11, 0));
        assert!(outcome.breakdown.contains("Expression: 1 + 10"));
    }

    #[test]
    fn respects_precedence_parentheses_and_unary_minus() {
        let empty = BTreeMap::new();
        let cases = [
            ("2 + 3 * 4", Decimal::new(14, 0)),
            ("(2 + 3) * 4", Decimal::new(20, 0)),
            ("-(2 + 3) * 4", Decimal::new(-20, 0)),
            ("10 / 4", Decimal::new(25, 1)),
            ("10 - -2", Decimal::new(12, 0)),
            ("1.5 * .5", Decimal::new(75, 2)),
        ];

        for (expression, expected) in cases {
            let outcome = evaluate_formula(expression, &empty).expect(expression);
            assert_eq!(outcome.result, expected, "{expression}");
        }
    }

    #[test]
    fn negative_variables_stay_grouped() {
        let outcome = evaluate_formula("10 - rebate", &vars(&[("rebate", Decimal::new(-5, 0))]))
            .expect("formula should evaluate");

        assert_eq!(outcome.result, Decimal::new(15, 0));
        assert!(outcome.breakdown.contains("Expression: 10 - (-5)"));
    }

    #[test]
    fn rejects_non_arithmetic_content() {
        let empty = BTreeMap::new();
        for expression in [
            "process.exit(1)",
            "1; 2",
            "2 ** 3",
            "unknown * 2",
            "2e5",
            "1..2",
            "(1 + 2",
            "1 + 2)",
            "3 +",
            "",
            "4 4",
        ] {
            let error = evaluate_formula(expression, &empty).expect_err(expression);
            assert!(matches!(error, FormulaError::InvalidExpression(_)), "{expression}");
        }
    }

    #[test]
    fn division_by_zero_is_invalid() {
        let error = evaluate_formula("rate / (x - x)", &vars(&[("rate", Decimal::ONE), ("x", Decimal::TEN)]))
            .expect_err("division by zero must fail");

        assert_eq!(error, FormulaError::InvalidExpression("division by zero".to_string()));
    }

    #[test]
    fn overflow_is_invalid() {
        let error = evaluate_formula("big * big", &vars(&[("big", Decimal::MAX)]))
            .expect_err("overflow must fail");

        assert_eq!(error, FormulaError::InvalidExpression("arithmetic overflow".to_string()));
    }

    #[test]
    fn deep_nesting_is_rejected() {
        let expression = format!("{}1{}", "(".repeat(200), ")".repeat(200));
        let error = evaluate_formula(&expression, &BTreeMap::new()).expect_err("too deep");

        assert!(matches!(error, FormulaError::InvalidExpression(ref message) if message.contains("nests")));
    }

    #[test]
    fn preview_reports_error_as_field() {
        let preview = FormulaEvaluator.preview("base_value * ", &vars(&[("base_value", Decimal::TEN)]));

        assert_eq!(preview.result, None);
        assert!(preview.error.is_some());
        assert!(preview.breakdown.contains("Expression: 10 * "));
    }

    #[test]
    fn preview_matches_evaluate_on_success() {
        let variables = vars(&[("fee", Decimal::new(1200, 0))]);
        let preview = FormulaEvaluator.preview("fee * 0.15", &variables);
        let outcome = FormulaEvaluator.evaluate("fee * 0.15", &variables).expect("evaluates");

        assert_eq!(preview.result, Some(outcome.result));
        assert_eq!(preview.breakdown, outcome.breakdown);
        assert_eq!(preview.error, None);
    }
}
