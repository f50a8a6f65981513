//! Quantity type - a normalised amount with a unit and a prefix

use std::cmp::Ordering;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Div, Mul, Neg, Sub};
use std::str::FromStr;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use crate::parse::split_quantity;
use crate::prefix::Prefix;
use crate::registry::REGISTRY;
use crate::unit::Unit;
use crate::UnitError;

/// How a quantity's unit is specified at construction
#[derive(Debug, Clone)]
pub enum UnitSpec<'a> {
    /// An existing unit, used as is
    Unit(Unit),
    /// A unit string with an optional prefix, e.g. "kV"
    Symbol(&'a str),
}

impl From<Unit> for UnitSpec<'_> {
    fn from(unit: Unit) -> Self {
        UnitSpec::Unit(unit)
    }
}

impl From<&Unit> for UnitSpec<'_> {
    fn from(unit: &Unit) -> Self {
        UnitSpec::Unit(unit.clone())
    }
}

impl<'a> From<&'a str> for UnitSpec<'a> {
    fn from(symbol: &'a str) -> Self {
        UnitSpec::Symbol(symbol)
    }
}

impl<'a> From<&'a String> for UnitSpec<'a> {
    fn from(symbol: &'a String) -> Self {
        UnitSpec::Symbol(symbol)
    }
}

/// Right-hand operand of quantity arithmetic and comparison
#[derive(Debug, Clone)]
pub enum Operand {
    Scalar(f64),
    Quantity(Quantity),
}

impl From<f64> for Operand {
    fn from(value: f64) -> Self {
        Operand::Scalar(value)
    }
}

impl From<i32> for Operand {
    fn from(value: i32) -> Self {
        Operand::Scalar(f64::from(value))
    }
}

impl From<i64> for Operand {
    fn from(value: i64) -> Self {
        Operand::Scalar(value as f64)
    }
}

impl From<Quantity> for Operand {
    fn from(q: Quantity) -> Self {
        Operand::Quantity(q)
    }
}

impl From<&Quantity> for Operand {
    fn from(q: &Quantity) -> Self {
        Operand::Quantity(q.clone())
    }
}

/// A physical quantity: an amount bound to a unit and a prefix.
///
/// The amount is always re-expressed against the closest registered prefix,
/// so `Quantity::new(1_000_000.0, "V")` displays as `1.0 MV`. Arithmetic
/// never mutates its operands and always produces a freshly normalised
/// quantity.
///
/// ```
/// use measura_units::Quantity;
///
/// let volts = Quantity::new(10.0, "V");
/// let amps = Quantity::new(100.0, "A");
/// assert_eq!((&volts * &amps).to_string(), "1.0 kW");
/// assert_eq!((&volts / &amps).to_string(), "100.0 m\u{2126}");
/// ```
#[derive(Debug, Clone)]
pub struct Quantity {
    amount: f64,
    unit: Unit,
    prefix: Prefix,
}

impl Quantity {
    /// Create a quantity from an unscaled amount
    pub fn new<'a>(amount: f64, unit: impl Into<UnitSpec<'a>>) -> Self {
        Self::with_prefix(amount, unit, &Prefix::none())
    }

    /// Create a quantity whose amount is expressed in `prefix`
    pub fn with_prefix<'a>(amount: f64, unit: impl Into<UnitSpec<'a>>, prefix: &Prefix) -> Self {
        let (unit, mut amount) = match unit.into() {
            UnitSpec::Unit(unit) => (unit, amount),
            UnitSpec::Symbol(symbol) => {
                let (unit, parsed) = REGISTRY.resolve_unit(symbol);
                (unit, parsed.apply(amount))
            }
        };
        amount = prefix.apply(amount);

        let (amount, prefix) = REGISTRY.closest_prefix(amount);
        Quantity { amount, unit, prefix }
    }

    /// Create a dimensionless quantity (pure number)
    pub fn dimensionless(amount: f64) -> Self {
        Self::new(amount, Unit::none())
    }

    /// The amount relative to the prefix
    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn unit(&self) -> &Unit {
        &self.unit
    }

    pub fn prefix(&self) -> &Prefix {
        &self.prefix
    }

    /// The true numeric value: amount × 10^prefix
    pub fn value(&self) -> f64 {
        self.prefix.apply(self.amount)
    }

    /// The value rounded half up (`floor(value + 0.5)`), still as `f64`
    pub fn rounded(&self) -> f64 {
        (self.value() + 0.5).floor()
    }

    /// The rounded value as an integer; `None` when it does not fit an `i64`
    pub fn to_integer(&self) -> Option<i64> {
        let rounded = self.rounded();
        // 2^63 is exact in f64; NaN fails both comparisons
        if rounded >= -9_223_372_036_854_775_808.0 && rounded < 9_223_372_036_854_775_808.0 {
            Some(rounded as i64)
        } else {
            None
        }
    }

    pub fn is_dimensionless(&self) -> bool {
        self.unit.is_dimensionless()
    }

    /// Express the quantity in another prefix, e.g. `to("mm")` on a
    /// kilometre quantity. A trailing unit symbol is optional. Returns
    /// `None` when the prefix is not registered.
    pub fn to(&self, target: &str) -> Option<f64> {
        let symbol = self.unit.symbol();
        let prefix = match target.strip_suffix(symbol) {
            Some(rest) if !symbol.is_empty() => rest,
            _ => target,
        };
        let prefix = REGISTRY.prefix(prefix).ok()?;
        Some(prefix.remove(self.rounded()))
    }

    /// Convert to another unit through a registered conversion chain
    pub fn convert(&self, target: &Unit) -> Result<Quantity, UnitError> {
        let value = REGISTRY.convert(&self.unit, target, self.value())?;
        Ok(Quantity::new(value, target))
    }

    // ========== Checked arithmetic ==========

    /// Add, failing on incompatible units instead of panicking
    pub fn checked_add(&self, rhs: impl Into<Operand>) -> Result<Quantity, UnitError> {
        match rhs.into() {
            Operand::Scalar(s) if s == 0.0 => Ok(self.clone()),
            Operand::Scalar(s) if self.is_dimensionless() => Ok(Quantity::dimensionless(self.value() + s)),
            Operand::Scalar(_) => Err(self.incompatible("+", &Unit::none())),
            Operand::Quantity(q) => {
                let unit = REGISTRY.add_units(&self.unit, &q.unit)?;
                Ok(Quantity::new(self.value() + q.value(), unit))
            }
        }
    }

    /// Subtract, failing on incompatible units instead of panicking
    pub fn checked_sub(&self, rhs: impl Into<Operand>) -> Result<Quantity, UnitError> {
        match rhs.into() {
            Operand::Scalar(s) if s == 0.0 => Ok(self.clone()),
            Operand::Scalar(s) if self.is_dimensionless() => Ok(Quantity::dimensionless(self.value() - s)),
            Operand::Scalar(_) => Err(self.incompatible("-", &Unit::none())),
            Operand::Quantity(q) => {
                let unit = REGISTRY.subtract_units(&self.unit, &q.unit)?;
                Ok(Quantity::new(self.value() - q.value(), unit))
            }
        }
    }

    /// Multiply; a scalar keeps this quantity's unit
    pub fn multiply(&self, rhs: impl Into<Operand>) -> Quantity {
        match rhs.into() {
            Operand::Scalar(s) => Quantity::new(self.value() * s, &self.unit),
            Operand::Quantity(q) => {
                let unit = REGISTRY.multiply(&self.unit, &q.unit);
                Quantity::new(self.value() * q.value(), unit)
            }
        }
    }

    /// Divide; a scalar keeps this quantity's unit
    pub fn divide(&self, rhs: impl Into<Operand>) -> Quantity {
        match rhs.into() {
            Operand::Scalar(s) => Quantity::new(self.value() / s, &self.unit),
            Operand::Quantity(q) => {
                let unit = REGISTRY.divide(&self.unit, &q.unit);
                Quantity::new(self.value() / q.value(), unit)
            }
        }
    }

    /// Order two quantities.
    ///
    /// Quantities must share unit and prefix; a dimensionless quantity also
    /// orders against a plain number by value.
    pub fn try_cmp(&self, rhs: impl Into<Operand>) -> Result<Option<Ordering>, UnitError> {
        match rhs.into() {
            Operand::Scalar(s) if self.is_dimensionless() => Ok(self.value().partial_cmp(&s)),
            Operand::Scalar(_) => Err(self.incompatible("cmp", &Unit::none())),
            Operand::Quantity(q) => {
                if q.unit != self.unit || q.prefix != self.prefix {
                    return Err(UnitError::IncompatibleUnits {
                        op: "cmp",
                        left: format!("{}{}", self.prefix, self.unit),
                        right: format!("{}{}", q.prefix, q.unit),
                    });
                }
                Ok(self.amount.partial_cmp(&q.amount))
            }
        }
    }

    fn incompatible(&self, op: &'static str, other: &Unit) -> UnitError {
        UnitError::IncompatibleUnits {
            op,
            left: self.unit.symbol().to_string(),
            right: other.symbol().to_string(),
        }
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Quantity::dimensionless(0.0)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let suffix = format!("{}{}", self.prefix.symbol(), self.unit.symbol());
        if suffix.is_empty() {
            write!(f, "{:?}", self.amount)
        } else {
            write!(f, "{:?} {}", self.amount, suffix)
        }
    }
}

impl Serialize for Quantity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Quantity", 4)?;
        state.serialize_field("amount", &self.amount)?;
        state.serialize_field("prefix", self.prefix.symbol())?;
        state.serialize_field("unit", self.unit.symbol())?;
        state.serialize_field("value", &self.value())?;
        state.end()
    }
}

/// Parse "value unit", e.g. "3 kV" or "-5"
impl FromStr for Quantity {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (value, unit) = split_quantity(s);
        let amount: f64 = value.parse()
            .map_err(|_| UnitError::InvalidNumber(value.to_string()))?;
        Ok(Quantity::new(amount, unit))
    }
}

// ========== Equality and ordering ==========

/// Exact match of amount, unit and prefix
impl PartialEq for Quantity {
    fn eq(&self, other: &Self) -> bool {
        self.amount == other.amount && self.unit == other.unit && self.prefix == other.prefix
    }
}

/// Only a dimensionless quantity equals a plain number
impl PartialEq<f64> for Quantity {
    fn eq(&self, other: &f64) -> bool {
        self.is_dimensionless() && self.value() == *other
    }
}

impl PartialEq<Quantity> for f64 {
    fn eq(&self, other: &Quantity) -> bool {
        other == self
    }
}

/// Panics when unit or prefix differ; see `try_cmp` for the checked form
impl PartialOrd for Quantity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match self.try_cmp(other) {
            Ok(ordering) => ordering,
            Err(e) => panic!("{}", e),
        }
    }
}

impl PartialOrd<f64> for Quantity {
    fn partial_cmp(&self, other: &f64) -> Option<Ordering> {
        match self.try_cmp(*other) {
            Ok(ordering) => ordering,
            Err(e) => panic!("{}", e),
        }
    }
}

// ========== Operators ==========

macro_rules! impl_quantity_ops {
    ($lhs:ty) => {
        impl<T: Into<Operand>> Add<T> for $lhs {
            type Output = Quantity;
            fn add(self, rhs: T) -> Quantity {
                match self.checked_add(rhs) {
                    Ok(q) => q,
                    Err(e) => panic!("{}", e),
                }
            }
        }

        impl<T: Into<Operand>> Sub<T> for $lhs {
            type Output = Quantity;
            fn sub(self, rhs: T) -> Quantity {
                match self.checked_sub(rhs) {
                    Ok(q) => q,
                    Err(e) => panic!("{}", e),
                }
            }
        }

        impl<T: Into<Operand>> Mul<T> for $lhs {
            type Output = Quantity;
            fn mul(self, rhs: T) -> Quantity {
                self.multiply(rhs)
            }
        }

        impl<T: Into<Operand>> Div<T> for $lhs {
            type Output = Quantity;
            fn div(self, rhs: T) -> Quantity {
                self.divide(rhs)
            }
        }

        impl Neg for $lhs {
            type Output = Quantity;
            fn neg(self) -> Quantity {
                Quantity::with_prefix(-self.amount, &self.unit, &self.prefix)
            }
        }
    };
}

impl_quantity_ops!(Quantity);
impl_quantity_ops!(&Quantity);

// scalar on the left: addition and multiplication commute
macro_rules! impl_scalar_lhs_ops {
    ($scalar:ty) => {
        impl Add<Quantity> for $scalar {
            type Output = Quantity;
            fn add(self, rhs: Quantity) -> Quantity {
                rhs + self
            }
        }

        impl Add<&Quantity> for $scalar {
            type Output = Quantity;
            fn add(self, rhs: &Quantity) -> Quantity {
                rhs + self
            }
        }

        impl Mul<Quantity> for $scalar {
            type Output = Quantity;
            fn mul(self, rhs: Quantity) -> Quantity {
                rhs * self
            }
        }

        impl Mul<&Quantity> for $scalar {
            type Output = Quantity;
            fn mul(self, rhs: &Quantity) -> Quantity {
                rhs * self
            }
        }
    };
}

impl_scalar_lhs_ops!(f64);
impl_scalar_lhs_ops!(i32);

/// Zero is the additive identity, so an empty sum is dimensionless zero
impl Sum for Quantity {
    fn sum<I: Iterator<Item = Quantity>>(iter: I) -> Self {
        iter.fold(None, |total: Option<Quantity>, q| match total {
            None => Some(q),
            Some(total) => Some(total + q),
        })
        .unwrap_or_default()
    }
}

impl<'a> Sum<&'a Quantity> for Quantity {
    fn sum<I: Iterator<Item = &'a Quantity>>(iter: I) -> Self {
        iter.cloned().sum()
    }
}
