use std::{fmt::Display, str::FromStr};

use alloy::primitives::{Address, I256, U256};
use anyhow::{Result, anyhow, bail};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A signed integer wide enough to hold any `uint256` or `int256` value.
///
/// Values that come back from the chain are unsigned or two's complement 256-bit words, while the
/// values written in tests are small literals, decimal strings or hex strings. All of them convert
/// into this type so that they can be compared numerically regardless of how they were written.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct BigNumber {
    negative: bool,
    magnitude: U256,
}

impl BigNumber {
    pub const ZERO: Self = Self {
        negative: false,
        magnitude: U256::ZERO,
    };

    /// Creates a number from its sign and magnitude. Zero is never negative.
    pub fn new(negative: bool, magnitude: U256) -> Self {
        Self {
            negative: negative && !magnitude.is_zero(),
            magnitude,
        }
    }

    pub fn is_negative(&self) -> bool {
        self.negative
    }

    pub fn magnitude(&self) -> U256 {
        self.magnitude
    }

    /// Returns the value as an unsigned word, or [`None`] if it's negative.
    pub fn to_u256(&self) -> Option<U256> {
        (!self.negative).then_some(self.magnitude)
    }

    /// Formats the number as a `0x` prefixed hex string with an even number of digits, so zero is
    /// `0x00` and negative numbers are `-0x..`.
    pub fn to_hex_string(&self) -> String {
        let mut digits = format!("{:x}", self.magnitude);
        if digits.len() % 2 == 1 {
            digits.insert(0, '0');
        }
        match self.negative {
            true => format!("-0x{digits}"),
            false => format!("0x{digits}"),
        }
    }
}

impl Display for BigNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.negative {
            f.write_str("-")?;
        }
        Display::fmt(&self.magnitude, f)
    }
}

impl FromStr for BigNumber {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let (negative, unsigned) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        let (digits, radix) = match unsigned
            .strip_prefix("0x")
            .or_else(|| unsigned.strip_prefix("0X"))
        {
            Some(hex) => (hex, 16),
            None => (unsigned, 10),
        };
        if digits.is_empty() {
            bail!("invalid BigNumber value: {s:?}");
        }

        let magnitude = U256::from_str_radix(digits, radix)
            .map_err(|error| anyhow!("invalid BigNumber value {s:?}: {error}"))?;
        Ok(Self::new(negative, magnitude))
    }
}

impl Serialize for BigNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex_string())
    }
}

impl<'de> Deserialize<'de> for BigNumber {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer)?
            .parse()
            .map_err(serde::de::Error::custom)
    }
}

impl From<U256> for BigNumber {
    fn from(value: U256) -> Self {
        Self::new(false, value)
    }
}

impl From<I256> for BigNumber {
    fn from(value: I256) -> Self {
        Self::new(value.is_negative(), value.unsigned_abs())
    }
}

impl From<Address> for BigNumber {
    fn from(value: Address) -> Self {
        Self::new(false, U256::from_be_slice(value.as_slice()))
    }
}

impl From<i64> for BigNumber {
    fn from(value: i64) -> Self {
        Self::new(value < 0, U256::from(value.unsigned_abs()))
    }
}

impl From<i32> for BigNumber {
    fn from(value: i32) -> Self {
        Self::from(i64::from(value))
    }
}

impl From<u64> for BigNumber {
    fn from(value: u64) -> Self {
        Self::new(false, U256::from(value))
    }
}

impl From<u32> for BigNumber {
    fn from(value: u32) -> Self {
        Self::from(u64::from(value))
    }
}

impl From<u128> for BigNumber {
    fn from(value: u128) -> Self {
        Self::new(false, U256::from(value))
    }
}
