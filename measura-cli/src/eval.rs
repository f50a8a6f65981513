//! Calculator line evaluation
//!
//! Each line is one of:
//! - `<quantity>`                e.g. `1500 V`
//! - `<quantity> <op> <quantity>` with op one of `+ - * /`
//! - `<quantity> -> <unit>`      conversion, e.g. `50 °C -> °F`

use measura_units::{Quantity, UnitError, REGISTRY};
use thiserror::Error;
use tracing::trace;

#[derive(Debug, Error, PartialEq)]
pub enum EvalError {
    #[error("syntax error: {0}")]
    Syntax(String),

    #[error(transparent)]
    Unit(#[from] UnitError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Add,
    Sub,
    Mul,
    Div,
}

impl Op {
    fn from_token(token: &str) -> Option<Op> {
        match token {
            "+" => Some(Op::Add),
            "-" => Some(Op::Sub),
            "*" => Some(Op::Mul),
            "/" => Some(Op::Div),
            _ => None,
        }
    }
}

/// Evaluate one calculator line
pub fn eval_line(line: &str) -> Result<Quantity, EvalError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(EvalError::Syntax("empty expression".to_string()));
    }

    if let Some((quantity, target)) = line.split_once("->") {
        let quantity = parse_quantity(quantity)?;
        let target = REGISTRY.unit(target.trim())?;
        trace!(from = quantity.unit().symbol(), to = target.symbol(), "converting");
        return Ok(quantity.convert(&target)?);
    }

    let tokens: Vec<&str> = line.split_whitespace().collect();
    // an operator is a standalone token; "-5" is a number
    let Some((at, op)) = tokens.iter().enumerate()
        .skip(1)
        .find_map(|(i, t)| Op::from_token(t).map(|op| (i, op)))
    else {
        return parse_quantity(line);
    };

    let lhs = parse_quantity(&tokens[..at].join(" "))?;
    let rhs = parse_quantity(&tokens[at + 1..].join(" "))?;
    trace!(?op, %lhs, %rhs, "evaluating");

    let result = match op {
        Op::Add => lhs.checked_add(&rhs)?,
        Op::Sub => lhs.checked_sub(&rhs)?,
        Op::Mul => &lhs * &rhs,
        Op::Div => &lhs / &rhs,
    };
    Ok(result)
}

fn parse_quantity(text: &str) -> Result<Quantity, EvalError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(EvalError::Syntax("missing operand".to_string()));
    }
    Ok(text.parse()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(line: &str) -> String {
        eval_line(line).unwrap().to_string()
    }

    #[test]
    fn test_single_quantity() {
        assert_eq!(eval("1500 V"), "1.5 kV");
        assert_eq!(eval("-5"), "-5.0");
        assert_eq!(eval("  0.05 A "), "50.0 mA");
    }

    #[test]
    fn test_binary_operations() {
        assert_eq!(eval("10 V * 100 A"), "1.0 kW");
        assert_eq!(eval("10 V / 100 A"), "100.0 m\u{2126}");
        assert_eq!(eval("1 kV + 500 V"), "1.5 kV");
        assert_eq!(eval("1 kV - 1500 V"), "-0.5 kV");
        assert_eq!(eval("3 - -2"), "5.0");
    }

    #[test]
    fn test_conversion() {
        assert_eq!(eval("50 °C -> °F"), "122.0 °F");
        assert_eq!(eval("12 inch -> foot"), "1.0 '");
    }

    #[test]
    fn test_errors() {
        assert!(matches!(eval_line(""), Err(EvalError::Syntax(_))));
        assert!(matches!(eval_line("5 V +"), Err(EvalError::Syntax(_))));
        assert!(matches!(
            eval_line("1 V + 1 A"),
            Err(EvalError::Unit(UnitError::IncompatibleUnits { op: "+", .. }))
        ));
        assert!(matches!(eval_line("1 V -> A"), Err(EvalError::Unit(UnitError::NoConversion { .. }))));
        assert!(matches!(eval_line("1 V -> nope"), Err(EvalError::Unit(UnitError::UnknownUnit(_)))));
        assert!(matches!(eval_line("x V"), Err(EvalError::Unit(UnitError::InvalidNumber(_)))));
    }
}
