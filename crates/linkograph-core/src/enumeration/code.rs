//! Arbitrary-width link codes

use std::fmt;
use std::str::FromStr;

use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Error;

/// Unsigned integer of unbounded width, used as a bit set of links
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LinkCode(BigUint);

impl LinkCode {
    pub fn zero() -> Self {
        Self::default()
    }

    /// `2^exponent`
    pub fn power_of_two(exponent: usize) -> Self {
        let mut code = Self::zero();
        code.set_bit(exponent);
        code
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn bit(&self, index: usize) -> bool {
        self.0.bit(index as u64)
    }

    pub fn set_bit(&mut self, index: usize) {
        self.0.set_bit(index as u64, true);
    }

    /// Number of bits needed to write the value (0 for zero)
    pub fn bit_len(&self) -> usize {
        self.0.bits() as usize
    }

    /// Positions of the set bits, ascending
    pub fn ones(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.0.bits())
            .filter(move |&b| self.0.bit(b))
            .map(|b| b as usize)
    }

    pub fn to_u128(&self) -> Option<u128> {
        self.0.to_u128()
    }
}

impl From<u64> for LinkCode {
    fn from(value: u64) -> Self {
        Self(BigUint::from(value))
    }
}

impl From<u128> for LinkCode {
    fn from(value: u128) -> Self {
        Self(BigUint::from(value))
    }
}

impl fmt::Display for LinkCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for LinkCode {
    type Err = Error;

    /// Plain decimal digits only; signs and separators are rejected
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidNumber(s.to_string()));
        }
        s.parse::<BigUint>()
            .map(Self)
            .map_err(|_| Error::InvalidNumber(s.to_string()))
    }
}

// Decimal strings keep codes readable in JSON and safe for parsers limited to f64.
impl Serialize for LinkCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for LinkCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Number(u64),
            Text(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Number(value) => Ok(Self::from(value)),
            Repr::Text(text) => text.parse().map_err(serde::de::Error::custom),
        }
    }
}
