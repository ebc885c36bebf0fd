//! Interpretation of a single parameter value.
//!
//! Values are stored as plain text; `ParamValue` adds the typed views on top
//! (booleans, decimal and hex integers, doubles) and splitting into fields on a
//! *set* of delimiter characters.
//!
//! ```
//! use blockpar::ParamValue;
//!
//! let v = ParamValue::from("count=5,7");
//! assert_eq!(v.field_count("=,"), 3);
//! assert_eq!(v.field(1, "=").unwrap().as_str(), "5,7");
//! assert_eq!(v.field(2, "=,").unwrap().as_int().unwrap(), 7);
//! ```

use crate::err::{BlockParError, Result};

use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;

#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct ParamValue(String);

pub(crate) static EMPTY_VALUE: ParamValue = ParamValue(String::new());

impl ParamValue {
    pub fn new(value: impl Into<String>) -> Self {
        ParamValue(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn as_bool(&self) -> Result<bool> {
        if self.0.eq_ignore_ascii_case("true") {
            Ok(true)
        } else if self.0.eq_ignore_ascii_case("false") {
            Ok(false)
        } else {
            Err(BlockParError::format(&self.0, "boolean"))
        }
    }

    pub fn as_int(&self) -> Result<i32> {
        if !self.is_integer_only() {
            return Err(BlockParError::format(&self.0, "integer"));
        }
        self.0
            .parse::<i32>()
            .map_err(|_| BlockParError::format(&self.0, "integer"))
    }

    pub fn as_unsigned(&self) -> Result<u32> {
        if !self.is_integer_only() || self.0.starts_with('-') {
            return Err(BlockParError::format(&self.0, "unsigned integer"));
        }
        self.0
            .parse::<u32>()
            .map_err(|_| BlockParError::format(&self.0, "unsigned integer"))
    }

    /// Parses a floating point literal. `inf`/`nan` spellings are rejected.
    pub fn as_double(&self) -> Result<f64> {
        let looks_numeric = self
            .0
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'));

        if !looks_numeric || !self.0.chars().any(|c| c.is_ascii_digit()) {
            return Err(BlockParError::format(&self.0, "double"));
        }
        self.0
            .parse::<f64>()
            .map_err(|_| BlockParError::format(&self.0, "double"))
    }

    /// Base-16 value, reinterpreted as a signed 32-bit pattern (`FFFFFFFF` is `-1`).
    pub fn as_hex(&self) -> Result<i32> {
        let (negative, digits) = match self.0.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, self.0.strip_prefix('+').unwrap_or(&self.0)),
        };

        let magnitude = parse_hex_digits(digits)
            .ok_or_else(|| BlockParError::format(&self.0, "hex number"))?;

        let value = magnitude as i32;
        Ok(if negative { value.wrapping_neg() } else { value })
    }

    pub fn as_hex_unsigned(&self) -> Result<u32> {
        let digits = self.0.strip_prefix('+').unwrap_or(&self.0);
        parse_hex_digits(digits).ok_or_else(|| BlockParError::format(&self.0, "unsigned hex number"))
    }

    /// True iff the whole text is an optionally signed run of decimal digits.
    pub fn is_integer_only(&self) -> bool {
        let digits = self
            .0
            .strip_prefix(['-', '+'])
            .unwrap_or(&self.0);

        !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
    }

    pub fn field_count(&self, delimiters: &str) -> usize {
        1 + self.0.chars().filter(|c| delimiters.contains(*c)).count()
    }

    pub fn field(&self, index: usize, delimiters: &str) -> Result<ParamValue> {
        self.field_range(index, index, delimiters)
    }

    /// Text from the start of field `start` to the end of field `end`, inclusive.
    /// Delimiters between the two are kept as they are.
    pub fn field_range(&self, start: usize, end: usize, delimiters: &str) -> Result<ParamValue> {
        let count = self.field_count(delimiters);
        if end >= count {
            return Err(BlockParError::range("field", end, count));
        }
        if start > end {
            return Err(BlockParError::range("field", start, end + 1));
        }

        let begin = self.field_start(start, delimiters);
        let finish = self.field_end(begin, end - start, delimiters);

        Ok(ParamValue(self.0[begin..finish].to_owned()))
    }

    /// Byte offset where the `index`-th field starts. `index` must be in range.
    fn field_start(&self, index: usize, delimiters: &str) -> usize {
        if index == 0 {
            return 0;
        }

        self.0
            .char_indices()
            .filter(|(_, c)| delimiters.contains(*c))
            .nth(index - 1)
            .map(|(pos, c)| pos + c.len_utf8())
            .unwrap_or(self.0.len())
    }

    /// Byte offset of the delimiter closing the field `extra` fields after the one at `begin`.
    fn field_end(&self, begin: usize, extra: usize, delimiters: &str) -> usize {
        self.0[begin..]
            .char_indices()
            .filter(|(_, c)| delimiters.contains(*c))
            .nth(extra)
            .map(|(pos, _)| begin + pos)
            .unwrap_or(self.0.len())
    }
}

fn parse_hex_digits(text: &str) -> Option<u32> {
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    u32::from_str_radix(digits, 16).ok()
}

impl Deref for ParamValue {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ParamValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ParamValue {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue(value.to_owned())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue(value)
    }
}

impl From<ParamValue> for String {
    fn from(value: ParamValue) -> Self {
        value.0
    }
}

impl PartialEq<str> for ParamValue {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ParamValue {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn v(s: &str) -> ParamValue {
        ParamValue::from(s)
    }

    #[test]
    fn test_bool_spellings() {
        assert!(v("true").as_bool().unwrap());
        assert!(v("TRUE").as_bool().unwrap());
        assert!(!v("False").as_bool().unwrap());
        assert!(matches!(
            v("yes").as_bool(),
            Err(BlockParError::Format { .. })
        ));
    }

    #[test]
    fn test_int_consumes_whole_text() {
        assert_eq!(v("42").as_int().unwrap(), 42);
        assert_eq!(v("-17").as_int().unwrap(), -17);
        assert_eq!(v("+3").as_int().unwrap(), 3);
        assert!(matches!(v("42x").as_int(), Err(BlockParError::Format { .. })));
        assert!(v("").as_int().is_err());
        assert!(v(" 1").as_int().is_err());
        assert!(v("99999999999").as_int().is_err());
    }

    #[test]
    fn test_is_integer_only() {
        assert!(v("42").is_integer_only());
        assert!(v("-0").is_integer_only());
        assert!(!v("42x").is_integer_only());
        assert!(!v("-").is_integer_only());
        assert!(!v("").is_integer_only());
        assert!(!v("1.5").is_integer_only());
    }

    #[test]
    fn test_unsigned() {
        assert_eq!(v("4294967295").as_unsigned().unwrap(), u32::MAX);
        assert!(v("-1").as_unsigned().is_err());
        assert!(v("4294967296").as_unsigned().is_err());
    }

    #[test]
    fn test_double() {
        assert_eq!(v("1.5").as_double().unwrap(), 1.5);
        assert_eq!(v("-2e3").as_double().unwrap(), -2000.0);
        assert_eq!(v("7").as_double().unwrap(), 7.0);
        assert!(v("1.5.2").as_double().is_err());
        assert!(v("inf").as_double().is_err());
        assert!(v("1.0f").as_double().is_err());
    }

    #[test]
    fn test_hex() {
        assert_eq!(v("ff").as_hex().unwrap(), 255);
        assert_eq!(v("0x10").as_hex().unwrap(), 16);
        assert_eq!(v("-A").as_hex().unwrap(), -10);
        assert_eq!(v("FFFFFFFF").as_hex().unwrap(), -1);
        assert_eq!(v("FFFFFFFF").as_hex_unsigned().unwrap(), u32::MAX);
        assert!(v("-1").as_hex_unsigned().is_err());
        assert!(v("0xG1").as_hex().is_err());
        assert!(v("0x").as_hex().is_err());
    }

    #[test]
    fn test_field_count() {
        assert_eq!(v("a,b,,c").field_count(","), 4);
        assert_eq!(v("").field_count(","), 1);
        assert_eq!(v("abc").field_count(","), 1);
        assert_eq!(v("count=5,7").field_count("=,"), 3);
    }

    #[test]
    fn test_field() {
        let value = v("a,b,,c");
        assert_eq!(value.field(0, ",").unwrap(), "a");
        assert_eq!(value.field(2, ",").unwrap(), "");
        assert_eq!(value.field(3, ",").unwrap(), "c");
        assert!(matches!(
            value.field(4, ","),
            Err(BlockParError::Range { index: 4, len: 4, .. })
        ));
        assert_eq!(v("").field(0, ",").unwrap(), "");
    }

    #[test]
    fn test_field_mixed_delimiters() {
        let value = v("count=5,7");
        assert_eq!(value.field(0, "=,").unwrap(), "count");
        assert_eq!(value.field(1, "=").unwrap(), "5,7");
        assert_eq!(value.field(2, "=,").unwrap().as_int().unwrap(), 7);
    }

    #[test]
    fn test_field_range_keeps_delimiters() {
        let value = v("a,b;c,d");
        assert_eq!(value.field_range(1, 2, ",;").unwrap(), "b;c");
        assert_eq!(value.field_range(0, 3, ",;").unwrap(), "a,b;c,d");
        assert_eq!(value.field_range(3, 3, ",;").unwrap(), "d");
        assert!(value.field_range(2, 1, ",;").is_err());
        assert!(value.field_range(0, 4, ",;").is_err());
    }

    #[test]
    fn test_field_with_multibyte_text() {
        let value = v("корабль,звезда");
        assert_eq!(value.field(1, ",").unwrap(), "звезда");
        assert_eq!(value.field(0, ",").unwrap(), "корабль");
    }
}
