//! Built-in prefixes, units, derivations and conversions
//!
//! Kilogramme is replaced with gramme: "kg" is still reachable through the
//! kilo prefix.
//!
//! Derivations only work on pairs and are applied left to right, so the
//! grouping of a product matters:
//! - `R * I * I` and `I * (I * R)` give watts
//! - `I * I * R` gives square ampere-ohms

use tracing::debug;
use crate::conversion::ConversionStep as Step;
use crate::registry::Registry;
use crate::UnitError;

/// Options for loading the built-in catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogOptions {
    /// Also register hecto, deca, deci and centi
    pub extended_prefixes: bool,
}

impl Default for CatalogOptions {
    fn default() -> Self {
        CatalogOptions {
            extended_prefixes: cfg!(feature = "extended-prefixes"),
        }
    }
}

/// SI prefixes as (symbol, name, power)
pub const PREFIXES: &[(&str, &str, i32)] = &[
    ("Y", "yotta", 24),
    ("Z", "zetta", 21),
    ("E", "exa", 18),
    ("P", "peta", 15),
    ("T", "tera", 12),
    ("G", "giga", 9),
    ("M", "mega", 6),
    ("k", "kilo", 3),
    ("m", "milli", -3),
    ("\u{00B5}", "micro", -6),
    ("n", "nano", -9),
    ("p", "pico", -12),
    ("f", "femto", -15),
    ("a", "atto", -18),
    ("z", "zepto", -21),
    ("y", "yocto", -24),
];

/// Prefixes that are awkward in practice (hecto is still common with
/// pascals, deci with litres, centi with metres)
pub const EXTENDED_PREFIXES: &[(&str, &str, i32)] = &[
    ("h", "hecto", 2),
    ("da", "deca", 1),
    ("d", "deci", -1),
    ("c", "centi", -2),
];

/// Extra lookup symbols for micro
const PREFIX_ALIASES: &[(&str, i32)] = &[("u", -6), ("\u{03BC}", -6)];

/// Units as (symbol, name)
pub const UNITS: &[(&str, &str)] = &[
    // SI base units
    ("m", "metre"),
    ("g", "gramme"),
    ("s", "second"),
    ("A", "ampere"),
    ("K", "kelvin"),
    ("\u{00B0}C", "celsius"),
    ("mol", "mole"),
    ("cd", "candela"),
    ("sr", "steradian"),
    ("rad", "radian"),
    ("\u{00B0}", "degree"),
    // SI derived units
    ("Hz", "hertz"),
    ("N", "newton"),
    ("Pa", "pascal"),
    ("W", "watt"),
    ("J", "joule"),
    ("V", "volt"),
    ("\u{2126}", "ohm"),
    ("S", "siemens"),
    ("C", "coulomb"),
    ("F", "farad"),
    ("Wb", "weber"),
    ("T", "tesla"),
    ("H", "henry"),
    ("lm", "lumen"),
    ("lx", "lux"),
    ("Bq", "becquerel"),
    ("Gy", "gray"),
    ("Sv", "sievert"),
    ("kat", "katal"),
    // data
    ("b", "bit"),
    ("B", "byte"),
    // imperial
    ("\u{00B0}F", "fahrenheit"),
    ("\"", "inch"),
    ("'", "foot"),
    ("mile", "mile"),
    ("lb", "pound"),
    ("oz", "ounce"),
    // time
    ("min", "minute"),
    ("hour", "hour"),
];

/// Extra keys as (alias, existing key)
const UNIT_ALIASES: &[(&str, &str)] = &[
    ("meter", "metre"),
    ("gram", "gramme"),
    ("\u{03A9}", "ohm"),
];

/// `a * b -> result`, commutative
pub const COMBINED: &[(&str, &str, &str)] = &[
    ("A", "V", "W"),
    ("\u{2126}", "A", "V"),
    ("s", "A", "C"),
    ("s", "W", "J"),
    ("C", "V", "J"),
    ("cd", "sr", "lm"),
    ("\u{2126}", "s", "H"),
];

/// `a / b -> result`, order matters
pub const DIVIDED: &[(&str, &str, &str)] = &[
    ("W", "A", "V"),
    ("J", "C", "V"),
    ("C", "V", "F"),
    ("s", "\u{2126}", "F"),
    ("V", "A", "\u{2126}"),
    ("W", "V", "\u{2126}"),
    ("V", "\u{2126}", "A"),
    ("A", "V", "S"),
    ("J", "A", "Wb"),
    ("Wb", "A", "H"),
    ("J", "m", "N"),
    ("J", "N", "m"),
    ("J", "s", "W"),
    ("J", "g", "Sv"),
    ("mol", "s", "kat"),
];

/// Conversion chains between units, applied left to right
pub const CONVERSIONS: &[(&str, &str, &[Step])] = &[
    ("\u{00B0}C", "K", &[Step::add(273.15)]),
    ("K", "\u{00B0}C", &[Step::sub(273.15)]),
    ("\u{00B0}C", "\u{00B0}F", &[Step::mul(9.0), Step::div(5.0), Step::add(32.0)]),
    ("\u{00B0}F", "\u{00B0}C", &[Step::sub(32.0), Step::mul(5.0), Step::div(9.0)]),
    ("s", "min", &[Step::div(60.0)]),
    ("min", "s", &[Step::mul(60.0)]),
    ("s", "hour", &[Step::div(3600.0)]),
    ("hour", "s", &[Step::mul(3600.0)]),
    ("min", "hour", &[Step::div(60.0)]),
    ("hour", "min", &[Step::mul(60.0)]),
    ("\"", "'", &[Step::div(12.0)]),
    ("'", "\"", &[Step::mul(12.0)]),
    ("\"", "m", &[Step::mul(0.0254)]),
    ("m", "\"", &[Step::div(0.0254)]),
    ("'", "m", &[Step::mul(0.3048)]),
    ("m", "'", &[Step::div(0.3048)]),
    ("mile", "'", &[Step::mul(5280.0)]),
    ("'", "mile", &[Step::div(5280.0)]),
    ("mile", "m", &[Step::mul(1609.344)]),
    ("m", "mile", &[Step::div(1609.344)]),
    ("lb", "g", &[Step::mul(453.59237)]),
    ("g", "lb", &[Step::div(453.59237)]),
    ("oz", "g", &[Step::mul(28.349523125)]),
    ("g", "oz", &[Step::div(28.349523125)]),
    ("oz", "lb", &[Step::div(16.0)]),
    ("lb", "oz", &[Step::mul(16.0)]),
    ("b", "B", &[Step::div(8.0)]),
    ("B", "b", &[Step::mul(8.0)]),
];

/// Register the built-in tables into `registry`
pub fn load(registry: &Registry, options: CatalogOptions) -> Result<(), UnitError> {
    for &(symbol, name, power) in PREFIXES {
        registry.register_prefix(symbol, name, power)?;
    }
    if options.extended_prefixes {
        for &(symbol, name, power) in EXTENDED_PREFIXES {
            registry.register_prefix(symbol, name, power)?;
        }
    }
    for &(symbol, power) in PREFIX_ALIASES {
        registry.alias_prefix(symbol, power)?;
    }

    for &(symbol, name) in UNITS {
        registry.define_unit(symbol, name)?;
    }
    for &(alias, key) in UNIT_ALIASES {
        registry.alias_unit(alias, key)?;
    }

    for &(a, b, result) in COMBINED {
        registry.register_combined(&registry.unit(a)?, &registry.unit(b)?, &registry.unit(result)?);
    }
    for &(a, b, result) in DIVIDED {
        registry.register_divided(&registry.unit(a)?, &registry.unit(b)?, &registry.unit(result)?);
    }
    for &(from, to, steps) in CONVERSIONS {
        registry.register_conversion(&registry.unit(from)?, &registry.unit(to)?, steps.to_vec());
    }

    debug!(
        prefixes = registry.prefixes().len(),
        units = UNITS.len(),
        extended = options.extended_prefixes,
        "loaded built-in catalog"
    );
    Ok(())
}
