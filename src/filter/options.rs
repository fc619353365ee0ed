//! Host-style filter option strings
//!
//! A filter argument string is a `:`-separated list. Leading entries may be
//! bare values, assigned to options in table order; once a `key=value` entry
//! appears, every following entry must be named. Options with named
//! constants accept those names in place of numbers.

use crate::error::{Error, Result};

/// Value type and accepted range of an option
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OptionKind {
    Int { min: i64, max: i64 },
    Double { min: f64, max: f64 },
}

/// A parsed option value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OptionValue {
    Int(i64),
    Double(f64),
}

impl OptionValue {
    pub fn as_i64(&self) -> i64 {
        match *self {
            OptionValue::Int(v) => v,
            OptionValue::Double(v) => v as i64,
        }
    }

    pub fn as_f64(&self) -> f64 {
        match *self {
            OptionValue::Int(v) => v as f64,
            OptionValue::Double(v) => v,
        }
    }
}

impl std::fmt::Display for OptionValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OptionValue::Int(v) => write!(f, "{}", v),
            OptionValue::Double(v) => write!(f, "{}", v),
        }
    }
}

/// One entry of a filter's option table
#[derive(Debug, Clone, Copy)]
pub struct OptionDef {
    pub name: &'static str,
    pub help: &'static str,
    pub kind: OptionKind,
    pub default: OptionValue,
    /// Named constants accepted for this option
    pub constants: &'static [(&'static str, i64)],
}

impl OptionDef {
    pub const fn int(name: &'static str, help: &'static str, default: i64, min: i64, max: i64) -> Self {
        Self {
            name,
            help,
            kind: OptionKind::Int { min, max },
            default: OptionValue::Int(default),
            constants: &[],
        }
    }

    pub const fn double(
        name: &'static str,
        help: &'static str,
        default: f64,
        min: f64,
        max: f64,
    ) -> Self {
        Self {
            name,
            help,
            kind: OptionKind::Double { min, max },
            default: OptionValue::Double(default),
            constants: &[],
        }
    }

    pub const fn with_constants(mut self, constants: &'static [(&'static str, i64)]) -> Self {
        self.constants = constants;
        self
    }

    /// Parse and range-check one value for this option
    pub fn parse_value(&self, raw: &str) -> Result<OptionValue> {
        let raw = raw.trim();
        if let Some(&(_, v)) = self.constants.iter().find(|(name, _)| *name == raw) {
            return Ok(OptionValue::Int(v));
        }

        let bad = || Error::InvalidOption(format!("'{}' is not a valid value for '{}'", raw, self.name));
        match self.kind {
            OptionKind::Int { min, max } => {
                let v: i64 = raw.parse().map_err(|_| bad())?;
                if v < min || v > max {
                    return Err(Error::InvalidOption(format!(
                        "value {} for '{}' out of range [{} - {}]",
                        v, self.name, min, max
                    )));
                }
                Ok(OptionValue::Int(v))
            }
            OptionKind::Double { min, max } => {
                let v: f64 = raw.parse().map_err(|_| bad())?;
                if !(min..=max).contains(&v) {
                    return Err(Error::InvalidOption(format!(
                        "value {} for '{}' out of range [{} - {}]",
                        v, self.name, min, max
                    )));
                }
                Ok(OptionValue::Double(v))
            }
        }
    }

    /// Name of the constant matching `value`, if any
    pub fn constant_name(&self, value: i64) -> Option<&'static str> {
        self.constants
            .iter()
            .find(|&&(_, v)| v == value)
            .map(|&(name, _)| name)
    }

    /// Default value as shown to users, by constant name when it has one
    pub fn default_text(&self) -> String {
        match self.default {
            OptionValue::Int(v) => self
                .constant_name(v)
                .map(str::to_string)
                .unwrap_or_else(|| v.to_string()),
            OptionValue::Double(_) => self.default.to_string(),
        }
    }
}

/// Option values of one filter instance, defaults filled in
#[derive(Debug, Clone)]
pub struct OptionValues {
    table: &'static [OptionDef],
    values: Vec<OptionValue>,
}

impl OptionValues {
    /// All options at their defaults
    pub fn defaults(table: &'static [OptionDef]) -> Self {
        Self {
            table,
            values: table.iter().map(|def| def.default).collect(),
        }
    }

    /// Parse an argument string against an option table
    pub fn parse(table: &'static [OptionDef], args: &str) -> Result<Self> {
        let mut values = Self::defaults(table);
        let mut position = 0usize;
        let mut named_seen = false;

        for entry in args.split(':').filter(|e| !e.trim().is_empty()) {
            match entry.split_once('=') {
                Some((key, raw)) => {
                    named_seen = true;
                    let key = key.trim();
                    let index = table
                        .iter()
                        .position(|def| def.name == key)
                        .ok_or_else(|| Error::InvalidOption(format!("unknown option '{}'", key)))?;
                    values.set(index, raw)?;
                }
                None => {
                    if named_seen {
                        return Err(Error::InvalidOption(format!(
                            "positional value '{}' after named options",
                            entry
                        )));
                    }
                    if position >= table.len() {
                        return Err(Error::InvalidOption(format!(
                            "too many positional values at '{}'",
                            entry
                        )));
                    }
                    values.set(position, entry)?;
                    position += 1;
                }
            }
        }

        Ok(values)
    }

    fn set(&mut self, index: usize, raw: &str) -> Result<()> {
        self.values[index] = self.table[index].parse_value(raw)?;
        Ok(())
    }

    fn index(&self, name: &str) -> Result<usize> {
        self.table
            .iter()
            .position(|def| def.name == name)
            .ok_or_else(|| Error::Internal(format!("option table has no '{}'", name)))
    }

    pub fn get(&self, name: &str) -> Result<OptionValue> {
        Ok(self.values[self.index(name)?])
    }

    pub fn get_i64(&self, name: &str) -> Result<i64> {
        self.get(name).map(|v| v.as_i64())
    }

    pub fn get_f64(&self, name: &str) -> Result<f64> {
        self.get(name).map(|v| v.as_f64())
    }

    /// Integer option narrowed to a byte
    pub fn get_u8(&self, name: &str) -> Result<u8> {
        let v = self.get_i64(name)?;
        u8::try_from(v).map_err(|_| Error::InvalidOption(format!("'{}' must fit in 0-255, got {}", name, v)))
    }

    pub fn get_bool(&self, name: &str) -> Result<bool> {
        self.get_i64(name).map(|v| v != 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODES: &[(&str, i64)] = &[("fast", 0), ("slow", 1), ("lazy", 1)];

    static TABLE: &[OptionDef] = &[
        OptionDef::int("mode", "select mode", 0, 0, 1).with_constants(MODES),
        OptionDef::int("lo", "low bound", 10, 0, 255),
        OptionDef::double("g", "gamma", 2.2, 0.2, 5.0),
    ];

    #[test]
    fn test_defaults() {
        let values = OptionValues::parse(TABLE, "").unwrap();
        assert_eq!(values.get_i64("mode").unwrap(), 0);
        assert_eq!(values.get_u8("lo").unwrap(), 10);
        assert_eq!(values.get_f64("g").unwrap(), 2.2);
    }

    #[test]
    fn test_positional_then_named() {
        let values = OptionValues::parse(TABLE, "slow:42:g=1.5").unwrap();
        assert_eq!(values.get_i64("mode").unwrap(), 1);
        assert_eq!(values.get_i64("lo").unwrap(), 42);
        assert_eq!(values.get_f64("g").unwrap(), 1.5);
    }

    #[test]
    fn test_constant_alias() {
        let values = OptionValues::parse(TABLE, "mode=lazy").unwrap();
        assert_eq!(values.get_i64("mode").unwrap(), 1);
        assert_eq!(TABLE[0].constant_name(1), Some("slow"));
        assert_eq!(TABLE[1].constant_name(10), None);
    }

    #[test]
    fn test_default_text() {
        assert_eq!(TABLE[0].default_text(), "fast");
        assert_eq!(TABLE[1].default_text(), "10");
        assert_eq!(TABLE[2].default_text(), "2.2");
        // the comic filter's default mode reads as a name
        let mode = &crate::filter::monocomic::OPTIONS[0];
        assert_eq!(mode.default_text(), "dot");
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(OptionValues::parse(TABLE, "lo=256").is_err());
        assert!(OptionValues::parse(TABLE, "g=0.1").is_err());
        assert!(OptionValues::parse(TABLE, "mode=warp").is_err());
        assert!(OptionValues::parse(TABLE, "nope=1").is_err());
        assert!(OptionValues::parse(TABLE, "lo=5:slow").is_err());
        assert!(OptionValues::parse(TABLE, "0:1:2:3").is_err());
        let err = OptionValues::parse(TABLE, "lo=x").unwrap_err();
        assert!(err.is_config_error());
    }
}
