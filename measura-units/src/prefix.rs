//! Power-of-ten prefixes (kilo, milli, ...) and their scaling arithmetic

use std::fmt;
use std::ops::{Div, Mul};
use std::sync::{Arc, LazyLock};
use serde::ser::{Serialize, SerializeStruct, Serializer};

/// Unicode superscript digits 0-9
pub(crate) const SUPERSCRIPTS: [char; 10] = [
    '\u{2070}', '\u{00B9}', '\u{00B2}', '\u{00B3}', '\u{2074}',
    '\u{2075}', '\u{2076}', '\u{2077}', '\u{2078}', '\u{2079}',
];

const SUPERSCRIPT_MINUS: char = '\u{207B}';

/// 10^-24 through 10^24, each the correctly rounded f64 literal
const POW10: [f64; 49] = [
    1e-24, 1e-23, 1e-22, 1e-21, 1e-20, 1e-19, 1e-18,
    1e-17, 1e-16, 1e-15, 1e-14, 1e-13, 1e-12, 1e-11,
    1e-10, 1e-9, 1e-8, 1e-7, 1e-6, 1e-5, 1e-4,
    1e-3, 1e-2, 1e-1, 1e0, 1e1, 1e2, 1e3,
    1e4, 1e5, 1e6, 1e7, 1e8, 1e9, 1e10,
    1e11, 1e12, 1e13, 1e14, 1e15, 1e16, 1e17,
    1e18, 1e19, 1e20, 1e21, 1e22, 1e23, 1e24,
];

const POW10_OFFSET: i32 = 24;

/// Correctly rounded 10^exp
pub(crate) fn pow10(exp: i32) -> f64 {
    let index = exp.checked_add(POW10_OFFSET).and_then(|i| usize::try_from(i).ok());
    match index.and_then(|i| POW10.get(i)) {
        Some(&p) => p,
        // decimal parsing rounds correctly; out-of-range exponents saturate
        None => format!("1e{}", exp).parse().unwrap_or(if exp > 0 { f64::INFINITY } else { 0.0 }),
    }
}

/// Superscript digits for a non-negative integer ("³", "¹²")
pub(crate) fn superscript(n: u32) -> String {
    n.to_string()
        .chars()
        .filter_map(|c| c.to_digit(10))
        .map(|d| SUPERSCRIPTS[d as usize])
        .collect()
}

#[derive(Debug)]
struct PrefixDef {
    symbol: String,
    name: String,
    power: i32,
    display: String,
}

/// An SI power-of-ten prefix.
///
/// A registry holds exactly one prefix per power, so two prefixes are equal
/// when their powers are equal. Cloning is cheap (shared definition).
#[derive(Clone)]
pub struct Prefix(Arc<PrefixDef>);

static NO_PREFIX: LazyLock<Prefix> = LazyLock::new(|| Prefix::build("", "", 0));

impl Prefix {
    /// Build an unregistered prefix value
    pub fn build(symbol: &str, name: &str, power: i32) -> Self {
        Prefix(Arc::new(PrefixDef {
            symbol: symbol.to_string(),
            name: name.to_string(),
            power,
            display: format_power(power),
        }))
    }

    /// The unscaled prefix (power 0)
    pub fn none() -> Self {
        NO_PREFIX.clone()
    }

    pub fn symbol(&self) -> &str {
        &self.0.symbol
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn power(&self) -> i32 {
        self.0.power
    }

    /// Power-of-ten notation, e.g. "10³" or "10⁻⁶"; empty for power 0
    pub fn display(&self) -> &str {
        &self.0.display
    }

    /// The scale factor 10^power
    pub fn scale(&self) -> f64 {
        pow10(self.0.power)
    }

    /// Multiply a scalar by this prefix: `kilo.apply(5.0) == 5000.0`
    pub fn apply(&self, value: f64) -> f64 {
        value * self.scale()
    }

    /// Divide a scalar by this prefix: `kilo.remove(5000.0) == 5.0`
    pub fn remove(&self, value: f64) -> f64 {
        value / self.scale()
    }

    pub fn is_none(&self) -> bool {
        self.0.power == 0
    }
}

/// Render a power of ten with superscript digits.
fn format_power(power: i32) -> String {
    if power == 0 {
        return String::new();
    }
    let sign = if power < 0 { SUPERSCRIPT_MINUS.to_string() } else { String::new() };
    let magnitude = power.unsigned_abs();
    if magnitude < 100 {
        format!("10{}{}", sign, superscript(magnitude))
    } else {
        format!("10^{}{}", sign, magnitude)
    }
}

impl PartialEq for Prefix {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0.power == other.0.power
    }
}

impl Eq for Prefix {}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.symbol)
    }
}

impl fmt::Debug for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            write!(f, "Prefix(none)")
        } else {
            write!(f, "Prefix({} {}, {})", self.0.symbol, self.0.name, self.0.display)
        }
    }
}

impl Serialize for Prefix {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Prefix", 3)?;
        state.serialize_field("symbol", &self.0.symbol)?;
        state.serialize_field("name", &self.0.name)?;
        state.serialize_field("power", &self.0.power)?;
        state.end()
    }
}

// prefix * scalar, scalar * prefix, scalar / prefix
macro_rules! impl_prefix_ops {
    ($prefix:ty) => {
        impl Mul<f64> for $prefix {
            type Output = f64;
            fn mul(self, rhs: f64) -> f64 {
                self.apply(rhs)
            }
        }

        impl Mul<$prefix> for f64 {
            type Output = f64;
            fn mul(self, rhs: $prefix) -> f64 {
                rhs.apply(self)
            }
        }

        impl Div<$prefix> for f64 {
            type Output = f64;
            fn div(self, rhs: $prefix) -> f64 {
                rhs.remove(self)
            }
        }
    };
}

impl_prefix_ops!(Prefix);
impl_prefix_ops!(&Prefix);

#[cfg(test)]
mod tests {
    use super::*;

    fn kilo() -> Prefix {
        Prefix::build("k", "kilo", 3)
    }

    #[test]
    fn test_scalar_mult() {
        assert_eq!(kilo() * 5.0, 5000.0);
        assert_eq!(5.0 * &kilo(), 5000.0);
    }

    #[test]
    fn test_scalar_div() {
        assert_eq!(5000.0 / kilo(), 5.0);
        let milli = Prefix::build("m", "milli", -3);
        assert_eq!(5.0 / &milli, 5000.0);
    }

    #[test]
    fn test_pow10_matches_literals() {
        for exp in -30..=30 {
            let literal: f64 = format!("1e{}", exp).parse().unwrap();
            assert_eq!(pow10(exp), literal, "10^{}", exp);
        }
        assert_eq!(pow10(400), f64::INFINITY);
        assert_eq!(pow10(-400), 0.0);
        assert_eq!(pow10(i32::MIN), 0.0);
    }

    #[test]
    fn test_remove_divides_by_exact_scale() {
        let zepto = Prefix::build("z", "zepto", -21);
        let yocto = Prefix::build("y", "yocto", -24);
        assert_eq!(zepto.remove(1e-21), 1.0);
        assert_eq!(yocto.remove(1e-24), 1.0);
        assert_eq!(zepto.apply(1.0), 1e-21);
        assert_eq!(Prefix::build("Y", "yotta", 24).scale(), 1e24);
        assert_eq!(Prefix::build("m", "milli", -3).remove(0.05), 50.0);
        assert_eq!(kilo().remove(7200.0), 7.2);
    }

    #[test]
    fn test_display_superscripts() {
        assert_eq!(kilo().display(), "10³");
        assert_eq!(Prefix::build("µ", "micro", -6).display(), "10⁻⁶");
        assert_eq!(Prefix::build("Y", "yotta", 24).display(), "10²⁴");
        assert_eq!(Prefix::build("X", "huge", 120).display(), "10^120");
        assert_eq!(Prefix::none().display(), "");
    }

    #[test]
    fn test_all_superscript_glyphs() {
        assert_eq!(superscript(1234567890), "¹²³⁴⁵⁶⁷⁸⁹⁰");
    }

    #[test]
    fn test_equality_by_power() {
        assert_eq!(kilo(), kilo());
        assert_ne!(kilo(), Prefix::none());
        assert!(Prefix::none().is_none());
    }
}
