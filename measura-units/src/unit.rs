//! Unit representation with exponent bookkeeping

use std::fmt;
use std::sync::{Arc, LazyLock};
use serde::ser::{Serialize, SerializeStruct, Serializer};
use crate::prefix::superscript;

/// Ordinal name fragments for exponents 0 through 4
const ORDINALS: [&str; 5] = ["", "", "square ", "cubic ", "quartic "];

#[derive(Debug)]
struct UnitDef {
    /// Symbol without exponent annotation (e.g. "m")
    base: String,
    /// Name without ordinal (e.g. "metre")
    name: String,
    /// Display symbol including exponent (e.g. "m²")
    symbol: String,
    /// Exponent, starting at 1
    index: i32,
    /// Ordinal name fragment (e.g. "square ")
    ordinal: String,
    /// Set once the unit is the canonical instance of a registry
    registered: bool,
}

/// A unit of measure.
///
/// Registered units are canonical: the registry hands out clones of a
/// single shared instance, and equality between them is identity.
/// Unregistered (temporary) units produced by multiplication or division
/// compare structurally by base symbol and exponent.
#[derive(Clone)]
pub struct Unit(Arc<UnitDef>);

static NO_UNIT: LazyLock<Unit> = LazyLock::new(|| {
    Unit(Arc::new(UnitDef {
        base: String::new(),
        name: String::new(),
        symbol: String::new(),
        index: 1,
        ordinal: String::new(),
        registered: true,
    }))
});

impl Unit {
    /// Build an unregistered unit with the given exponent.
    ///
    /// Pass the result to `Registry::register_unit` to make it canonical;
    /// skip that step for a temporary unit.
    pub fn build(symbol: &str, name: &str, index: i32) -> Self {
        Unit(Arc::new(UnitDef {
            base: symbol.to_string(),
            name: name.to_string(),
            symbol: exponent_symbol(symbol, index),
            index,
            ordinal: ordinal(index),
            registered: false,
        }))
    }

    /// The dimensionless unit
    pub fn none() -> Self {
        NO_UNIT.clone()
    }

    pub fn is_dimensionless(&self) -> bool {
        Arc::ptr_eq(&self.0, &NO_UNIT.0)
    }

    /// Display symbol, including any superscript exponent
    pub fn symbol(&self) -> &str {
        &self.0.symbol
    }

    /// Symbol without the exponent annotation
    pub fn base_symbol(&self) -> &str {
        &self.0.base
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn index(&self) -> i32 {
        self.0.index
    }

    /// Name with its ordinal, e.g. "square ohm" or "5th metre"
    pub fn long_name(&self) -> String {
        format!("{}{}", self.0.ordinal, self.0.name)
    }

    pub fn is_registered(&self) -> bool {
        self.0.registered
    }

    pub fn is_temporary(&self) -> bool {
        !self.0.registered
    }

    /// Same base symbol and name with another exponent (always temporary)
    pub fn with_index(&self, index: i32) -> Unit {
        Unit::build(&self.0.base, &self.0.name, index)
    }

    /// Whether two units share the same base symbol
    pub fn same_base(&self, other: &Unit) -> bool {
        self.0.base == other.0.base
    }

    /// Canonical copy of this unit; used by the registry on insertion
    pub(crate) fn into_registered(self) -> Unit {
        if self.0.registered {
            return self;
        }
        let def = &self.0;
        Unit(Arc::new(UnitDef {
            base: def.base.clone(),
            name: def.name.clone(),
            symbol: def.symbol.clone(),
            index: def.index,
            ordinal: def.ordinal.clone(),
            registered: true,
        }))
    }

    /// Same definition, ignoring registration state
    pub(crate) fn same_definition(&self, other: &Unit) -> bool {
        self.0.base == other.0.base && self.0.name == other.0.name && self.0.index == other.0.index
    }

    /// The keys a registry indexes this unit under
    pub(crate) fn keys(&self) -> [String; 2] {
        [self.0.symbol.clone(), self.long_name()]
    }
}

/// Symbol with a superscript exponent when the exponent exceeds 1
fn exponent_symbol(base: &str, index: i32) -> String {
    match index {
        i if i <= 1 => base.to_string(),
        i if i < 100 => format!("{}{}", base, superscript(i as u32)),
        i => format!("{}^{}", base, i),
    }
}

fn ordinal(index: i32) -> String {
    match usize::try_from(index) {
        Ok(i) if i < ORDINALS.len() => ORDINALS[i].to_string(),
        _ => format!("{}th ", index),
    }
}

impl PartialEq for Unit {
    fn eq(&self, other: &Self) -> bool {
        if Arc::ptr_eq(&self.0, &other.0) {
            return true;
        }
        !self.0.registered
            && !other.0.registered
            && self.0.base == other.0.base
            && self.0.index == other.0.index
    }
}

impl Eq for Unit {}

impl Default for Unit {
    fn default() -> Self {
        Unit::none()
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.symbol)
    }
}

impl fmt::Debug for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_dimensionless() {
            return write!(f, "Unit(none)");
        }
        let kind = if self.0.registered { "" } else { ", temp" };
        write!(f, "Unit({} {}{})", self.0.symbol, self.long_name(), kind)
    }
}

impl Serialize for Unit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Unit", 4)?;
        state.serialize_field("symbol", &self.0.symbol)?;
        state.serialize_field("name", &self.long_name())?;
        state.serialize_field("index", &self.0.index)?;
        state.serialize_field("temporary", &!self.0.registered)?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build() {
        let ohm = Unit::build("Ω", "ohm", 1);
        assert_eq!(ohm.symbol(), "Ω");
        assert_eq!(ohm.long_name(), "ohm");
        assert!(ohm.is_temporary());
    }

    #[test]
    fn test_exponent_display() {
        let m = Unit::build("m", "metre", 1);
        assert_eq!(m.with_index(2).symbol(), "m²");
        assert_eq!(m.with_index(2).long_name(), "square metre");
        assert_eq!(m.with_index(3).long_name(), "cubic metre");
        assert_eq!(m.with_index(4).long_name(), "quartic metre");
        assert_eq!(m.with_index(5).long_name(), "5th metre");
        assert_eq!(m.with_index(12).symbol(), "m¹²");
        assert_eq!(m.with_index(150).symbol(), "m^150");
    }

    #[test]
    fn test_superscripts_six_to_nine() {
        let s = Unit::build("s", "second", 1);
        assert_eq!(s.with_index(6).symbol(), "s⁶");
        assert_eq!(s.with_index(7).symbol(), "s⁷");
        assert_eq!(s.with_index(8).symbol(), "s⁸");
        assert_eq!(s.with_index(9).symbol(), "s⁹");
    }

    #[test]
    fn test_temporary_structural_equality() {
        let a = Unit::build("Ω", "ohm", 2);
        let b = Unit::build("Ω", "ohm", 2);
        assert_eq!(a, b);
        assert_ne!(a, Unit::build("Ω", "ohm", 3));
    }

    #[test]
    fn test_registered_identity() {
        let v = Unit::build("V", "volt", 1).into_registered();
        let copy = Unit::build("V", "volt", 1).into_registered();
        assert_eq!(v, v.clone());
        assert_ne!(v, copy);
        assert_ne!(v, Unit::build("V", "volt", 1));
    }

    #[test]
    fn test_dimensionless() {
        assert!(Unit::none().is_dimensionless());
        assert!(!Unit::build("", "", 1).is_dimensionless());
        assert_eq!(Unit::none(), Unit::default());
    }
}
