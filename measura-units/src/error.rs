//! Errors raised by the registries, the unit algebra and quantity parsing

use thiserror::Error;

/// Error type for unit, prefix and quantity operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UnitError {
    /// Each power of ten may be registered once
    #[error("power 10^{power} is already registered as prefix '{existing}'")]
    DuplicatePower { power: i32, existing: String },

    #[error("prefix symbol '{0}' is already registered")]
    DuplicatePrefixSymbol(String),

    /// A different unit already owns this symbol or name
    #[error("unit key '{0}' is already registered to another unit")]
    DuplicateUnit(String),

    #[error("unknown unit: {0}")]
    UnknownUnit(String),

    #[error("unknown prefix: {0}")]
    UnknownPrefix(String),

    #[error("no conversion registered from '{from}' to '{to}'")]
    NoConversion { from: String, to: String },

    #[error("cannot apply '{op}' to '{left}' and '{right}': incompatible units")]
    IncompatibleUnits {
        op: &'static str,
        left: String,
        right: String,
    },

    #[error("invalid number: {0}")]
    InvalidNumber(String),
}
