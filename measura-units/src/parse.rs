//! Unit string parsing - resolve strings like "kV" into a prefix and a unit
//!
//! Prefix and unit symbols overlap ("m" is both milli and metre, "T" is both
//! tera and tesla), so parsing is greedy and deterministic rather than
//! exhaustive:
//! 1. the whole string as a registered unit
//! 2. the longest registered suffix whose leftover is a registered prefix
//! 3. otherwise a temporary unit named after the whole string
//!
//! A matched suffix whose leftover is not a prefix is never used on its
//! own: "xys" becomes the temporary unit "xys", not seconds with "xy"
//! dropped. Discarding the leftover would silently lose part of the input.

use tracing::trace;
use crate::prefix::Prefix;
use crate::registry::Registry;
use crate::unit::Unit;

impl Registry {
    /// Resolve a unit string into `(unit, prefix)`.
    ///
    /// Never fails: unknown strings become temporary units, so arbitrary
    /// user units like "frame" work without registration.
    pub fn resolve_unit(&self, spec: &str) -> (Unit, Prefix) {
        let spec = spec.trim();
        if spec.is_empty() {
            return (Unit::none(), Prefix::none());
        }
        if let Ok(unit) = self.unit(spec) {
            return (unit, Prefix::none());
        }

        // longest suffix first; a leftover must be a registered prefix
        for (split, _) in spec.char_indices().skip(1) {
            let (leftover, suffix) = spec.split_at(split);
            let Ok(unit) = self.unit(suffix) else {
                continue;
            };
            match self.prefix(leftover) {
                Ok(prefix) => return (unit, prefix),
                Err(_) => trace!(spec, leftover, suffix, "unit suffix without a valid prefix"),
            }
        }

        trace!(spec, "synthesising temporary unit");
        (Unit::build(spec, spec, 1), Prefix::none())
    }
}

/// Split "value unit" on the first whitespace run.
///
/// Without whitespace the whole text is the value and the unit is empty
/// (dimensionless).
pub fn split_quantity(raw: &str) -> (&str, &str) {
    let raw = raw.trim();
    match raw.split_once(char::is_whitespace) {
        Some((value, unit)) => (value, unit.trim()),
        None => (raw, ""),
    }
}
