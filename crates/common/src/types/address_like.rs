use alloy::primitives::{Address, U256};

use crate::types::BigNumber;

/// Anything that can stand in for an address in an assertion.
///
/// Tests compare addresses that come from many places: contract handles, checksummed strings
/// returned by the node, numeric token identifiers, raw hex without a prefix. [`normalize_address`]
/// turns each of them into the same lowercase `0x` prefixed form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AddressLike {
    Address(Address),
    Number(BigNumber),
    Text(String),
}

impl From<Address> for AddressLike {
    fn from(value: Address) -> Self {
        Self::Address(value)
    }
}

impl From<&Address> for AddressLike {
    fn from(value: &Address) -> Self {
        Self::Address(*value)
    }
}

impl From<BigNumber> for AddressLike {
    fn from(value: BigNumber) -> Self {
        Self::Number(value)
    }
}

impl From<U256> for AddressLike {
    fn from(value: U256) -> Self {
        Self::Number(value.into())
    }
}

impl From<&str> for AddressLike {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for AddressLike {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Normalizes an address-like value into a lowercase, `0x` prefixed string.
///
/// Strings without a `0x` prefix are treated as bare hex digits and left-padded to 40 characters.
/// Numbers go through their hex digits, so a number equal to an address normalizes to that address
/// even when the address has leading zero bytes.
pub fn normalize_address(value: impl Into<AddressLike>) -> String {
    let text = match value.into() {
        AddressLike::Address(address) => address.to_string(),
        AddressLike::Number(number) if number.is_negative() => number.to_hex_string(),
        AddressLike::Number(number) => format!("{:x}", number.magnitude()),
        AddressLike::Text(text) => text,
    };

    let prefixed = if text.starts_with("0x") {
        text
    } else {
        format!("0x{text:0>40}")
    };
    prefixed.to_lowercase()
}
