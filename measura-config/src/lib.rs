//! Measura Config - INI files whose values are quantities
//!
//! Values are written as `<number> [unit]`, e.g. `timeout = 50 ms`. The
//! typed accessors split the value on its first whitespace run, convert the
//! number, and build a normalised [`Quantity`]. A value without a unit is
//! dimensionless.
//!
//! ```
//! use measura_config::QuantityConfig;
//!
//! let config: QuantityConfig = "[Link]\nlatency = 50 ms\nmask = 0xFF".parse().unwrap();
//! assert_eq!(config.get_int("Link", "latency").unwrap().amount(), 50.0);
//! assert_eq!(config.get_hex("Link", "mask").unwrap(), 255.0);
//! ```

mod error;
mod parser;

pub use error::ConfigError;
pub use parser::{parse, Document, Section, DEFAULT_SECTION};

use std::fs;
use std::path::Path;
use std::str::FromStr;
use measura_units::{split_quantity, Quantity};
use tracing::debug;

/// A parsed configuration document with quantity accessors
#[derive(Debug, Clone, Default)]
pub struct QuantityConfig {
    doc: Document,
}

impl QuantityConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse configuration text
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let doc = parser::parse(text)?;
        debug!(sections = doc.sections.len(), defaults = doc.defaults.options.len(), "parsed configuration");
        Ok(QuantityConfig { doc })
    }

    /// Read and parse a configuration file
    pub fn read_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        debug!(path = %path.display(), "read configuration file");
        Self::parse(&text)
    }

    /// Section names in file order, without DEFAULT
    pub fn sections(&self) -> Vec<&str> {
        self.doc.sections.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn has_section(&self, section: &str) -> bool {
        self.section(section).is_ok()
    }

    /// Option names of a section, followed by inherited defaults
    pub fn options(&self, section: &str) -> Result<Vec<&str>, ConfigError> {
        let own = self.section(section)?;
        let mut names: Vec<&str> = own.options.iter().map(|(k, _)| k.as_str()).collect();
        for (key, _) in &self.doc.defaults.options {
            if own.get(key).is_none() {
                names.push(key);
            }
        }
        Ok(names)
    }

    pub fn has_option(&self, section: &str, option: &str) -> bool {
        self.get(section, option).is_ok()
    }

    /// The raw text of an option, falling back to DEFAULT
    pub fn get(&self, section: &str, option: &str) -> Result<&str, ConfigError> {
        self.section(section)?
            .get(option)
            .or_else(|| self.doc.defaults.get(option))
            .ok_or_else(|| ConfigError::MissingOption {
                section: section.to_string(),
                option: option.to_string(),
            })
    }

    /// Build a quantity, converting the number with `convert`
    pub fn get_as<F>(&self, section: &str, option: &str, convert: F) -> Result<Quantity, ConfigError>
    where
        F: FnOnce(&str) -> Option<f64>,
    {
        self.quantify(section, option, "number", convert)
    }

    /// Build a quantity from an integer value
    pub fn get_int(&self, section: &str, option: &str) -> Result<Quantity, ConfigError> {
        self.quantify(section, option, "integer", |v| v.parse::<i64>().ok().map(|n| n as f64))
    }

    /// Build a quantity from a hexadecimal value, with or without `0x`
    pub fn get_hex(&self, section: &str, option: &str) -> Result<Quantity, ConfigError> {
        self.quantify(section, option, "hexadecimal", |v| {
            let digits = v.strip_prefix("0x")
                .or_else(|| v.strip_prefix("0X"))
                .unwrap_or(v);
            i64::from_str_radix(digits, 16).ok().map(|n| n as f64)
        })
    }

    /// Build a quantity from a floating point value
    pub fn get_float(&self, section: &str, option: &str) -> Result<Quantity, ConfigError> {
        self.quantify(section, option, "float", |v| v.parse::<f64>().ok())
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    fn section(&self, name: &str) -> Result<&Section, ConfigError> {
        if name == DEFAULT_SECTION {
            return Ok(&self.doc.defaults);
        }
        self.doc.sections.iter()
            .find(|s| s.name == name)
            .ok_or_else(|| ConfigError::MissingSection(name.to_string()))
    }

    fn quantify<F>(&self, section: &str, option: &str, kind: &'static str, convert: F) -> Result<Quantity, ConfigError>
    where
        F: FnOnce(&str) -> Option<f64>,
    {
        let (value, unit) = split_quantity(self.get(section, option)?);
        let amount = convert(value).ok_or_else(|| ConfigError::InvalidNumber {
            value: value.to_string(),
            kind,
        })?;
        Ok(Quantity::new(amount, unit))
    }
}

impl FromStr for QuantityConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
[DEFAULT]
margin = 5 %

[Power]
supply = 12 V
Load: 250 mA
margin = 10
";

    #[test]
    fn test_sections_and_options() {
        let config = QuantityConfig::parse(SAMPLE).unwrap();
        assert_eq!(config.sections(), vec!["Power"]);
        assert_eq!(config.options("Power").unwrap(), vec!["supply", "load", "margin"]);
        assert!(config.has_section("Power"));
        assert!(!config.has_section("Ground"));
        assert!(config.has_option("Power", "LOAD"));
    }

    #[test]
    fn test_defaults_fallback() {
        let config = QuantityConfig::parse("[DEFAULT]\nmargin = 5 %\n[A]\nx = 1").unwrap();
        assert_eq!(config.get("A", "margin").unwrap(), "5 %");
        assert_eq!(config.options("A").unwrap(), vec!["x", "margin"]);
        // a section's own value wins
        let config = QuantityConfig::parse(SAMPLE).unwrap();
        assert_eq!(config.get("Power", "margin").unwrap(), "10");
    }

    #[test]
    fn test_missing() {
        let config = QuantityConfig::parse(SAMPLE).unwrap();
        assert!(matches!(config.get("Ground", "x"), Err(ConfigError::MissingSection(s)) if s == "Ground"));
        assert!(matches!(config.get("Power", "x"), Err(ConfigError::MissingOption { .. })));
    }

    #[test]
    fn test_get_as() {
        let config = QuantityConfig::parse(SAMPLE).unwrap();
        let load = config.get_as("Power", "load", |v| v.parse().ok()).unwrap();
        assert_eq!(load.to_string(), "250.0 mA");

        let err = config.get_as("Power", "supply", |_| None).unwrap_err();
        assert_eq!(err.to_string(), "invalid number value '12'");
    }

    #[test]
    fn test_invalid_numbers() {
        let config = QuantityConfig::parse("[A]\nx = 1.5 V\ny = zz").unwrap();
        assert!(matches!(
            config.get_int("A", "x"),
            Err(ConfigError::InvalidNumber { kind: "integer", .. })
        ));
        assert!(matches!(
            config.get_hex("A", "y"),
            Err(ConfigError::InvalidNumber { kind: "hexadecimal", .. })
        ));
        assert_eq!(config.get_float("A", "x").unwrap().amount(), 1.5);
    }
}
