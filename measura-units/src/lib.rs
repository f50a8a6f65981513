//! Measura Units - Physical quantities with SI prefixes
//!
//! Provides quantities that carry a unit and a power-of-ten prefix, and keep
//! themselves normalised to the closest registered prefix.
//!
//! Pieces:
//! - `Prefix`: power-of-ten scale factor (kilo, milli, ...)
//! - `Unit`: named unit with an exponent (metre, square metre, ...)
//! - `Registry`: prefix, unit, derivation and conversion tables
//! - `Quantity`: amount + unit + prefix, with arithmetic and comparison
//!
//! The built-in catalog (SI base and derived units, a few imperial, data
//! and time units) is loaded into `REGISTRY` on first use.

mod error;
mod prefix;
mod unit;
mod conversion;
mod registry;
mod algebra;
mod parse;
mod quantity;
pub mod catalog;

pub use error::UnitError;
pub use prefix::Prefix;
pub use unit::Unit;
pub use conversion::{apply_chain, ConversionOp, ConversionStep};
pub use registry::{PairKey, Registry, REGISTRY};
pub use catalog::CatalogOptions;
pub use parse::split_quantity;
pub use quantity::{Operand, Quantity, UnitSpec};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{Prefix, Quantity, Unit, UnitError, REGISTRY};
}
