//! Conversion chains: ordered arithmetic steps between two units

use serde::{Deserialize, Serialize};

/// Arithmetic operator of one conversion step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversionOp {
    Add,
    Sub,
    Mul,
    Div,
}

/// One `(operator, operand)` step, applied as `value <op> operand`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConversionStep {
    pub op: ConversionOp,
    pub operand: f64,
}

impl ConversionStep {
    pub const fn add(operand: f64) -> Self {
        ConversionStep { op: ConversionOp::Add, operand }
    }

    pub const fn sub(operand: f64) -> Self {
        ConversionStep { op: ConversionOp::Sub, operand }
    }

    pub const fn mul(operand: f64) -> Self {
        ConversionStep { op: ConversionOp::Mul, operand }
    }

    pub const fn div(operand: f64) -> Self {
        ConversionStep { op: ConversionOp::Div, operand }
    }

    pub fn apply(&self, value: f64) -> f64 {
        match self.op {
            ConversionOp::Add => value + self.operand,
            ConversionOp::Sub => value - self.operand,
            ConversionOp::Mul => value * self.operand,
            ConversionOp::Div => value / self.operand,
        }
    }
}

/// Apply every step left to right
pub fn apply_chain(steps: &[ConversionStep], value: f64) -> f64 {
    steps.iter().fold(value, |acc, step| step.apply(acc))
}
