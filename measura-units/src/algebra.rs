//! Unit algebra: multiplication, division, addition and conversion of units

use std::ops::{Add, Div, Mul, Sub};
use tracing::trace;
use crate::conversion::apply_chain;
use crate::registry::{Registry, REGISTRY};
use crate::unit::Unit;
use crate::UnitError;

impl Registry {
    /// Multiply two units.
    ///
    /// Dimensionless is the identity. Units sharing a base symbol add their
    /// exponents (Ω × Ω = Ω²). Otherwise a registered combined unit is used
    /// (A × V = W) or a temporary compound unit is synthesised.
    pub fn multiply(&self, a: &Unit, b: &Unit) -> Unit {
        if a.is_dimensionless() {
            return b.clone();
        }
        if b.is_dimensionless() {
            return a.clone();
        }
        if a.same_base(b) {
            return a.with_index(a.index() + b.index());
        }
        if let Some(unit) = self.combined(a, b) {
            return unit;
        }

        trace!(a = a.symbol(), b = b.symbol(), "synthesising product unit");
        Unit::build(
            &format!("{}{}", a.symbol(), b.symbol()),
            &format!("{}-{}", a.long_name(), b.long_name()),
            1,
        )
    }

    /// Divide two units.
    ///
    /// Dividing by dimensionless is the identity and a unit divided by
    /// itself is dimensionless. Units sharing a base symbol subtract their
    /// exponents, collapsing to the plain base unit at exponent 1. Otherwise
    /// a registered divided unit is used (V / A = Ω) or a temporary
    /// quotient unit is synthesised.
    pub fn divide(&self, a: &Unit, b: &Unit) -> Unit {
        if b.is_dimensionless() {
            return a.clone();
        }
        if a == b {
            return Unit::none();
        }
        if a.same_base(b) {
            match a.index() - b.index() {
                0 => return Unit::none(),
                1 => return self.base_unit(a),
                n if n > 1 => return a.with_index(n),
                // negative exponents fall through to a quotient unit
                _ => {}
            }
        } else if let Some(unit) = self.divided(a, b) {
            return unit;
        }

        trace!(a = a.symbol(), b = b.symbol(), "synthesising quotient unit");
        Unit::build(
            &format!("{}/{}", a.symbol(), b.symbol()),
            &format!("{} per {}", a.long_name(), b.long_name()),
            1,
        )
    }

    /// The exponent-1 unit for a base symbol, canonical when registered
    fn base_unit(&self, unit: &Unit) -> Unit {
        match self.unit(unit.base_symbol()) {
            Ok(base) if base.index() == 1 => base,
            _ => unit.with_index(1),
        }
    }

    /// Units are only additive with themselves
    pub fn add_units(&self, a: &Unit, b: &Unit) -> Result<Unit, UnitError> {
        same_unit("+", a, b)
    }

    pub fn subtract_units(&self, a: &Unit, b: &Unit) -> Result<Unit, UnitError> {
        same_unit("-", a, b)
    }

    /// Convert a value between two units via the registered chain
    pub fn convert(&self, from: &Unit, to: &Unit, value: f64) -> Result<f64, UnitError> {
        let steps = self.conversion(from, to).ok_or_else(|| UnitError::NoConversion {
            from: from.symbol().to_string(),
            to: to.symbol().to_string(),
        })?;
        Ok(apply_chain(&steps, value))
    }
}

fn same_unit(op: &'static str, a: &Unit, b: &Unit) -> Result<Unit, UnitError> {
    if a == b {
        Ok(a.clone())
    } else {
        Err(UnitError::IncompatibleUnits {
            op,
            left: a.symbol().to_string(),
            right: b.symbol().to_string(),
        })
    }
}

impl Unit {
    /// Convert a value from this unit to `to` using the process-wide registry
    pub fn convert(&self, to: &Unit, value: f64) -> Result<f64, UnitError> {
        REGISTRY.convert(self, to, value)
    }
}

// Operators on units use the process-wide registry. Adding or subtracting
// different units is a programming error and panics.

impl Mul for &Unit {
    type Output = Unit;
    fn mul(self, rhs: &Unit) -> Unit {
        REGISTRY.multiply(self, rhs)
    }
}

impl Div for &Unit {
    type Output = Unit;
    fn div(self, rhs: &Unit) -> Unit {
        REGISTRY.divide(self, rhs)
    }
}

impl Add for &Unit {
    type Output = Unit;
    fn add(self, rhs: &Unit) -> Unit {
        match REGISTRY.add_units(self, rhs) {
            Ok(unit) => unit,
            Err(e) => panic!("{}", e),
        }
    }
}

impl Sub for &Unit {
    type Output = Unit;
    fn sub(self, rhs: &Unit) -> Unit {
        match REGISTRY.subtract_units(self, rhs) {
            Ok(unit) => unit,
            Err(e) => panic!("{}", e),
        }
    }
}
