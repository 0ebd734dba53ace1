//! # Validator codes.
//!
//! A [`Code`] identifies a validator. It is a positive integer rendered as a
//! fixed-width prefixed string: `AM` followed by four zero-padded digits.
//!
//! ```
//! use bundlevisor::Code;
//!
//! let code: Code = "AM0003".parse().unwrap();
//! assert_eq!(code.get(), 3);
//! assert_eq!(code.to_string(), "AM0003");
//! assert!("AM3".parse::<Code>().is_err());
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// Prefix shared by every rendered code.
pub const CODE_PREFIX: &str = "AM";

const DIGITS: usize = 4;
const MAX: u32 = 9999;

/// Unique validator identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Code(u32);

impl Code {
    /// Creates a code from its numeric value (`1..=9999`).
    pub fn new(value: u32) -> Result<Self, ParseError> {
        match value {
            0 => Err(ParseError::Code {
                input: value.to_string(),
                reason: "code must be positive",
            }),
            v if v > MAX => Err(ParseError::Code {
                input: value.to_string(),
                reason: "code must fit in four digits",
            }),
            v => Ok(Code(v)),
        }
    }

    /// Returns the numeric value.
    #[inline]
    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{CODE_PREFIX}{:0width$}", self.0, width = DIGITS)
    }
}

impl FromStr for Code {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = |reason| ParseError::Code {
            input: s.to_string(),
            reason,
        };

        let digits = s
            .strip_prefix(CODE_PREFIX)
            .ok_or_else(|| err("missing 'AM' prefix"))?;
        if digits.len() != DIGITS || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(err("expected exactly four digits"));
        }

        let value: u32 = digits.parse().map_err(|_| err("expected exactly four digits"))?;
        Code::new(value).map_err(|_| err("code must be positive"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_zero_padded() {
        assert_eq!(Code::new(1).unwrap().to_string(), "AM0001");
        assert_eq!(Code::new(15).unwrap().to_string(), "AM0015");
        assert_eq!(Code::new(9999).unwrap().to_string(), "AM9999");
    }

    #[test]
    fn parses_canonical_form() {
        assert_eq!("AM0015".parse::<Code>().unwrap(), Code::new(15).unwrap());
    }

    #[test]
    fn rejects_malformed_strings() {
        for bad in ["", "AM", "AM000", "AM00001", "am0001", "XX0001", "AM00a1", "AM0000", " AM0001"] {
            assert!(bad.parse::<Code>().is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert!(Code::new(0).is_err());
        assert!(Code::new(10_000).is_err());
    }

    #[test]
    fn orders_numerically() {
        let mut codes = vec![
            Code::new(12).unwrap(),
            Code::new(3).unwrap(),
            Code::new(7).unwrap(),
        ];
        codes.sort();
        assert_eq!(
            codes.iter().map(|c| c.get()).collect::<Vec<_>>(),
            vec![3, 7, 12]
        );
    }
}
