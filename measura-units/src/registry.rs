//! Prefix and unit registries, and nearest-prefix reduction
//!
//! A `Registry` owns every lookup table the algebra needs:
//! - prefixes by power and by symbol (one canonical prefix per power)
//! - units by symbol and by name (one canonical unit per key)
//! - combined units, keyed by unordered pair (multiplication commutes)
//! - divided units, keyed by ordered pair
//! - conversion chains, keyed by ordered pair
//!
//! Tables sit behind `RwLock`s: registration takes a write lock, every
//! other operation only reads.

use std::collections::{BTreeMap, HashMap};
use std::sync::{LazyLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;
use crate::catalog::{self, CatalogOptions};
use crate::conversion::ConversionStep;
use crate::prefix::{pow10, Prefix};
use crate::unit::Unit;
use crate::UnitError;

/// The process-wide registry, loaded with the built-in catalog on first use
pub static REGISTRY: LazyLock<Registry> = LazyLock::new(|| {
    let registry = Registry::new();
    if let Err(e) = catalog::load(&registry, CatalogOptions::default()) {
        // The built-in tables are static data; a clash here is a build defect.
        panic!("built-in unit catalog is inconsistent: {}", e);
    }
    registry
});

/// A pair of unit symbols
pub type PairKey = (String, String);

struct PrefixTable {
    by_power: BTreeMap<i32, Prefix>,
    by_symbol: HashMap<String, Prefix>,
}

#[derive(Default)]
struct UnitTable {
    by_key: HashMap<String, Unit>,
    combined: HashMap<PairKey, Unit>,
    divided: HashMap<PairKey, Unit>,
    conversions: HashMap<PairKey, Vec<ConversionStep>>,
}

/// Registry of prefixes, units, derivations and conversions
pub struct Registry {
    prefixes: RwLock<PrefixTable>,
    units: RwLock<UnitTable>,
}

/// Unordered key: both operand orders map to the same entry
fn combined_key(a: &Unit, b: &Unit) -> PairKey {
    let (a, b) = (a.symbol().to_string(), b.symbol().to_string());
    if a <= b { (a, b) } else { (b, a) }
}

fn ordered_key(a: &Unit, b: &Unit) -> PairKey {
    (a.symbol().to_string(), b.symbol().to_string())
}

impl Registry {
    /// An empty registry holding only the unscaled prefix (power 0)
    pub fn new() -> Self {
        let none = Prefix::none();
        let mut by_power = BTreeMap::new();
        let mut by_symbol = HashMap::new();
        by_power.insert(0, none.clone());
        by_symbol.insert(String::new(), none);

        Registry {
            prefixes: RwLock::new(PrefixTable { by_power, by_symbol }),
            units: RwLock::new(UnitTable::default()),
        }
    }

    /// A registry loaded with the built-in catalog
    pub fn with_catalog(options: CatalogOptions) -> Result<Self, UnitError> {
        let registry = Registry::new();
        catalog::load(&registry, options)?;
        Ok(registry)
    }

    /// The process-wide registry
    pub fn global() -> &'static Registry {
        &REGISTRY
    }

    fn read_prefixes(&self) -> RwLockReadGuard<'_, PrefixTable> {
        self.prefixes.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_prefixes(&self) -> RwLockWriteGuard<'_, PrefixTable> {
        self.prefixes.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_units(&self) -> RwLockReadGuard<'_, UnitTable> {
        self.units.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_units(&self) -> RwLockWriteGuard<'_, UnitTable> {
        self.units.write().unwrap_or_else(PoisonError::into_inner)
    }

    // ========== Prefixes ==========

    /// Create and index a prefix. Each power may only be registered once.
    pub fn register_prefix(&self, symbol: &str, name: &str, power: i32) -> Result<Prefix, UnitError> {
        let mut table = self.write_prefixes();
        if let Some(existing) = table.by_power.get(&power) {
            return Err(UnitError::DuplicatePower {
                power,
                existing: existing.name().to_string(),
            });
        }
        if table.by_symbol.contains_key(symbol) {
            return Err(UnitError::DuplicatePrefixSymbol(symbol.to_string()));
        }

        let prefix = Prefix::build(symbol, name, power);
        table.by_power.insert(power, prefix.clone());
        table.by_symbol.insert(symbol.to_string(), prefix.clone());
        debug!(symbol, name, power, "registered prefix");
        Ok(prefix)
    }

    /// Add another lookup symbol for an already registered power
    pub fn alias_prefix(&self, symbol: &str, power: i32) -> Result<Prefix, UnitError> {
        let mut table = self.write_prefixes();
        let prefix = table.by_power.get(&power).cloned()
            .ok_or_else(|| UnitError::UnknownPrefix(format!("10^{}", power)))?;
        if table.by_symbol.contains_key(symbol) {
            return Err(UnitError::DuplicatePrefixSymbol(symbol.to_string()));
        }
        table.by_symbol.insert(symbol.to_string(), prefix.clone());
        debug!(symbol, power, "registered prefix alias");
        Ok(prefix)
    }

    pub fn has_prefix(&self, symbol: &str) -> bool {
        self.read_prefixes().by_symbol.contains_key(symbol)
    }

    pub fn has_power(&self, power: i32) -> bool {
        self.read_prefixes().by_power.contains_key(&power)
    }

    /// Look up a prefix by symbol
    pub fn prefix(&self, symbol: &str) -> Result<Prefix, UnitError> {
        self.read_prefixes().by_symbol.get(symbol).cloned()
            .ok_or_else(|| UnitError::UnknownPrefix(symbol.to_string()))
    }

    /// Look up a prefix by power
    pub fn prefix_for_power(&self, power: i32) -> Result<Prefix, UnitError> {
        self.read_prefixes().by_power.get(&power).cloned()
            .ok_or_else(|| UnitError::UnknownPrefix(format!("10^{}", power)))
    }

    /// All canonical prefixes in ascending power
    pub fn prefixes(&self) -> Vec<Prefix> {
        self.read_prefixes().by_power.values().cloned().collect()
    }

    /// Reduce a magnitude to a coefficient and the closest registered prefix.
    ///
    /// The natural exponent is `floor(log10(|x|) + 0.5)`. When no prefix
    /// exists for it, the next registered power below is used instead and
    /// the coefficient grows to compensate: `0.05` becomes `(50, milli)`.
    /// Exponents beyond the registered range clamp to the extreme prefix.
    pub fn closest_prefix(&self, magnitude: f64) -> (f64, Prefix) {
        let table = self.read_prefixes();
        if magnitude == 0.0 || !magnitude.is_finite() {
            let coefficient = if magnitude == 0.0 { 0.0 } else { magnitude };
            return (coefficient, table.by_power[&0].clone());
        }

        let sign = if magnitude < 0.0 { -1.0 } else { 1.0 };
        let absolute = magnitude.abs();
        let exponent = (absolute.log10() + 0.5).floor() as i32;

        let power = match table.by_power.range(exponent..).next() {
            Some((&p, _)) if p == exponent => p,
            // step back to the coarser prefix below, or clamp to the lowest
            Some((&p, _)) => table.by_power.range(..exponent).next_back()
                .map(|(&below, _)| below)
                .unwrap_or(p),
            // above the highest registered power: clamp
            None => table.by_power.keys().next_back().copied().unwrap_or(0),
        };

        let coefficient = absolute / pow10(power);
        (sign * coefficient, table.by_power[&power].clone())
    }

    // ========== Units ==========

    /// Index a unit under its symbol and its name, returning the canonical
    /// instance. Registering an identical definition again returns the
    /// existing instance.
    pub fn register_unit(&self, unit: Unit) -> Result<Unit, UnitError> {
        let mut table = self.write_units();
        let keys = unit.keys();

        for key in &keys {
            if let Some(existing) = table.by_key.get(key) {
                if existing.same_definition(&unit) {
                    return Ok(existing.clone());
                }
                return Err(UnitError::DuplicateUnit(key.clone()));
            }
        }

        let unit = unit.into_registered();
        for key in keys {
            table.by_key.insert(key, unit.clone());
        }
        debug!(symbol = unit.symbol(), name = unit.name(), "registered unit");
        Ok(unit)
    }

    /// Shorthand for `register_unit(Unit::build(symbol, name, 1))`
    pub fn define_unit(&self, symbol: &str, name: &str) -> Result<Unit, UnitError> {
        self.register_unit(Unit::build(symbol, name, 1))
    }

    /// Make an existing unit reachable under another key
    pub fn alias_unit(&self, alias: &str, key: &str) -> Result<Unit, UnitError> {
        let mut table = self.write_units();
        let unit = table.by_key.get(key).cloned()
            .ok_or_else(|| UnitError::UnknownUnit(key.to_string()))?;
        match table.by_key.get(alias) {
            Some(existing) if *existing == unit => return Ok(unit),
            Some(_) => return Err(UnitError::DuplicateUnit(alias.to_string())),
            None => {}
        }
        table.by_key.insert(alias.to_string(), unit.clone());
        debug!(alias, key, "registered unit alias");
        Ok(unit)
    }

    pub fn has_unit(&self, key: &str) -> bool {
        self.read_units().by_key.contains_key(key)
    }

    /// Look up a registered unit by symbol or name
    pub fn unit(&self, key: &str) -> Result<Unit, UnitError> {
        self.read_units().by_key.get(key).cloned()
            .ok_or_else(|| UnitError::UnknownUnit(key.to_string()))
    }

    /// All registered unit keys (symbols, names and aliases), sorted
    pub fn units(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.read_units().by_key.keys().cloned().collect();
        keys.sort();
        keys
    }

    // ========== Derivations ==========

    /// Register `a * b -> result` (and therefore `b * a -> result`)
    pub fn register_combined(&self, a: &Unit, b: &Unit, result: &Unit) {
        self.write_units().combined.insert(combined_key(a, b), result.clone());
        debug!(a = a.symbol(), b = b.symbol(), result = result.symbol(), "registered combined unit");
    }

    /// Register `a / b -> result`; `b / a` is not implied
    pub fn register_divided(&self, a: &Unit, b: &Unit, result: &Unit) {
        self.write_units().divided.insert(ordered_key(a, b), result.clone());
        debug!(a = a.symbol(), b = b.symbol(), result = result.symbol(), "registered divided unit");
    }

    /// Register the conversion chain from one unit to another
    pub fn register_conversion(&self, from: &Unit, to: &Unit, steps: Vec<ConversionStep>) {
        debug!(from = from.symbol(), to = to.symbol(), steps = steps.len(), "registered conversion");
        self.write_units().conversions.insert(ordered_key(from, to), steps);
    }

    pub fn combined(&self, a: &Unit, b: &Unit) -> Option<Unit> {
        self.read_units().combined.get(&combined_key(a, b)).cloned()
    }

    pub fn divided(&self, a: &Unit, b: &Unit) -> Option<Unit> {
        self.read_units().divided.get(&ordered_key(a, b)).cloned()
    }

    pub fn has_conversion(&self, from: &Unit, to: &Unit) -> bool {
        self.read_units().conversions.contains_key(&ordered_key(from, to))
    }

    pub fn conversion(&self, from: &Unit, to: &Unit) -> Option<Vec<ConversionStep>> {
        self.read_units().conversions.get(&ordered_key(from, to)).cloned()
    }

    /// Snapshot of the combined-unit table as `((a, b), result)` symbols
    pub fn combined_units(&self) -> Vec<(PairKey, String)> {
        let mut entries: Vec<_> = self.read_units().combined.iter()
            .map(|(k, u)| (k.clone(), u.symbol().to_string()))
            .collect();
        entries.sort();
        entries
    }

    /// Snapshot of the divided-unit table as `((a, b), result)` symbols
    pub fn divided_units(&self) -> Vec<(PairKey, String)> {
        let mut entries: Vec<_> = self.read_units().divided.iter()
            .map(|(k, u)| (k.clone(), u.symbol().to_string()))
            .collect();
        entries.sort();
        entries
    }

    /// Snapshot of the conversion table
    pub fn conversions(&self) -> Vec<(PairKey, Vec<ConversionStep>)> {
        let mut entries: Vec<_> = self.read_units().conversions.iter()
            .map(|(k, steps)| (k.clone(), steps.clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn si_registry() -> Registry {
        Registry::with_catalog(CatalogOptions { extended_prefixes: false }).unwrap()
    }

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-12 * a.abs().max(b.abs())
    }

    #[test]
    fn test_simple_prefix() {
        let r = si_registry();
        let (c, p) = r.closest_prefix(1000.0);
        assert_eq!(c, 1.0);
        assert_eq!(p.symbol(), "k");
    }

    #[test]
    fn test_complex_prefix() {
        let (c, p) = si_registry().closest_prefix(1024.0);
        assert_eq!(c, 1.024);
        assert_eq!(p.name(), "kilo");
    }

    #[test]
    fn test_negative_prefix() {
        let (c, p) = si_registry().closest_prefix(-1000.0);
        assert_eq!(c, -1.0);
        assert_eq!(p.name(), "kilo");
    }

    #[test]
    fn test_small_prefix_steps_back() {
        let (c, p) = si_registry().closest_prefix(0.05);
        assert_eq!(c, 50.0);
        assert_eq!(p.name(), "milli");
    }

    #[test]
    fn test_zero() {
        let (c, p) = si_registry().closest_prefix(0.0);
        assert_eq!(c, 0.0);
        assert_eq!(p.power(), 0);
        let (c, _) = si_registry().closest_prefix(-0.0);
        assert_eq!(c, 0.0);
    }

    #[test]
    fn test_every_prefix_reduces_to_one() {
        for extended_prefixes in [false, true] {
            let r = Registry::with_catalog(CatalogOptions { extended_prefixes }).unwrap();
            for prefix in r.prefixes() {
                let literal: f64 = format!("1e{}", prefix.power()).parse().unwrap();
                for magnitude in [prefix.scale(), literal] {
                    let (c, p) = r.closest_prefix(magnitude);
                    assert_eq!(c, 1.0, "10^{} gave coefficient {}", prefix.power(), c);
                    assert_eq!(p, prefix);
                }
            }
        }
    }

    #[test]
    fn test_smallest_prefixes_are_exact() {
        let r = si_registry();
        assert_eq!(r.closest_prefix(1e-21), (1.0, r.prefix("z").unwrap()));
        assert_eq!(r.closest_prefix(1e-24), (1.0, r.prefix("y").unwrap()));
        assert_eq!(r.closest_prefix(-2e-23), (-20.0, r.prefix("y").unwrap()));
        assert_eq!(r.closest_prefix(3e24), (3.0, r.prefix("Y").unwrap()));
    }

    #[test]
    fn test_sign_symmetry() {
        let r = si_registry();
        for x in [0.05, 3.3, 47.0, 512.0, 1024.0, 7.5e7, 2.2e-9] {
            let (c, p) = r.closest_prefix(x);
            let (nc, np) = r.closest_prefix(-x);
            assert_eq!(nc, -c);
            assert_eq!(np, p);
        }
    }

    #[test]
    fn test_rounding_boundaries() {
        let r = si_registry();
        // log10(500) = 2.69 rounds up to 3
        let (c, p) = r.closest_prefix(500.0);
        assert_eq!((c, p.name()), (0.5, "kilo"));
        // log10(300) = 2.48 rounds down to 2, no prefix at 2: step back to 0
        let (c, p) = r.closest_prefix(300.0);
        assert_eq!((c, p.power()), (300.0, 0));
        // 10^3.5 rounds to 4 or 3; both reduce to kilo
        let midpoint = 10f64.powf(3.5);
        let (c, p) = r.closest_prefix(midpoint);
        assert_eq!(p.name(), "kilo");
        assert!(approx_eq(c * 1000.0, midpoint));
    }

    #[test]
    fn test_value_preserved() {
        let r = si_registry();
        for x in [0.3162, 3.162, 31.62, 316.2, 0.000123, 98765.4321, 1.5e20] {
            let (c, p) = r.closest_prefix(x);
            assert!(approx_eq(p.apply(c), x), "{} reduced to {} {:?}", x, c, p);
        }
    }

    #[test]
    fn test_clamp_out_of_range() {
        let r = si_registry();
        let (c, p) = r.closest_prefix(1e30);
        assert_eq!(p.name(), "yotta");
        assert!(approx_eq(c, 1e6));

        let (c, p) = r.closest_prefix(1e-30);
        assert_eq!(p.name(), "yocto");
        assert!(approx_eq(c, 1e-6));
    }

    #[test]
    fn test_non_finite() {
        let r = si_registry();
        let (c, p) = r.closest_prefix(f64::INFINITY);
        assert!(c.is_infinite());
        assert!(p.is_none());
        let (c, _) = r.closest_prefix(f64::NAN);
        assert!(c.is_nan());
    }

    #[test]
    fn test_extended_prefixes() {
        let r = Registry::with_catalog(CatalogOptions { extended_prefixes: true }).unwrap();
        let (c, p) = r.closest_prefix(0.05);
        assert_eq!(p.name(), "deci");
        assert!(approx_eq(c, 0.5));
        let (c, p) = r.closest_prefix(0.02);
        assert_eq!(p.name(), "centi");
        assert!(approx_eq(c, 2.0));
        assert_eq!(r.prefix("da").unwrap().power(), 1);
    }

    #[test]
    fn test_duplicate_power_rejected() {
        let r = Registry::new();
        r.register_prefix("k", "kilo", 3).unwrap();
        let err = r.register_prefix("K", "kilo2", 3).unwrap_err();
        assert_eq!(err, UnitError::DuplicatePower { power: 3, existing: "kilo".to_string() });
        assert!(r.register_prefix("x", "none", 0).is_err());
    }

    #[test]
    fn test_prefix_alias() {
        let r = si_registry();
        let micro = r.prefix("µ").unwrap();
        assert_eq!(r.prefix("u").unwrap(), micro);
        assert_eq!(r.prefix_for_power(-6).unwrap().symbol(), "µ");
        assert!(r.alias_prefix("q", 5).is_err());
    }

    #[test]
    fn test_prefix_lookup_failure() {
        let r = si_registry();
        assert!(!r.has_prefix("Q"));
        assert_eq!(r.prefix("Q").unwrap_err(), UnitError::UnknownPrefix("Q".to_string()));
        assert!(r.has_power(-24));
        assert!(!r.has_power(2));
    }

    #[test]
    fn test_register_unit() {
        let r = Registry::new();
        let temp = Unit::build("ZZZ", "TestUnit", 1);
        assert!(!r.has_unit("ZZZ"));

        let unit = r.register_unit(temp).unwrap();
        assert!(r.has_unit("ZZZ"));
        assert!(r.has_unit("TestUnit"));
        assert!(unit.is_registered());
        assert_eq!(r.unit("TestUnit").unwrap(), unit);
    }

    #[test]
    fn test_register_unit_idempotent() {
        let r = Registry::new();
        let first = r.define_unit("f", "frame").unwrap();
        let second = r.define_unit("f", "frame").unwrap();
        assert_eq!(first, second);
        assert!(matches!(r.define_unit("f", "farad"), Err(UnitError::DuplicateUnit(_))));
    }

    #[test]
    fn test_unit_alias() {
        let r = si_registry();
        assert_eq!(r.unit("meter").unwrap(), r.unit("m").unwrap());
        assert_eq!(r.unit("gram").unwrap(), r.unit("gramme").unwrap());
        assert!(r.alias_unit("x", "nope").is_err());
    }

    #[test]
    fn test_table_snapshots() {
        let r = si_registry();
        assert!(r.units().contains(&"volt".to_string()));
        assert!(r.combined_units().iter().any(|(_, result)| result == "W"));
        assert!(r.divided_units().contains(&(("V".to_string(), "A".to_string()), "\u{2126}".to_string())));
        assert!(!r.conversions().is_empty());
    }
}
