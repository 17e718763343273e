//! Encodings specific to the metatoken contracts.
//!
//! A metatoken id packs the address of the metatoken contract into the upper 160 bits and the id
//! of the NFT it's attached to into the lower 96 bits.

use alloy::{
    dyn_abi::{DynSolType, DynSolValue},
    json_abi::JsonAbi,
    primitives::{Address, Bytes, FixedBytes, U256},
};
use anyhow::{Context as _, Result, bail};
use mtk_common::types::BigNumber;

use crate::abi::resolve_function;

pub const TOKEN_ADDRESS_SHIFT: usize = 96;

/// Flags of the status word of a registered metatoken.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum MetatokenStatus {
    Registered = 0x1,
    IsImplementation = 0x2,
    Enabled = 0x4,
}

impl MetatokenStatus {
    pub fn bits(self) -> u16 {
        self as u16
    }
}

/// Flags of the hooks a metatoken category implements.
pub mod hooks {
    pub const NFT_BURN: u64 = 0x01;
    pub const NFT_MINT: u64 = 0x04;
    pub const NFT_TRANSFER: u64 = 0x08;
    pub const META_BURN: u64 = 0x10;
    pub const META_MINT: u64 = 0x40;
    pub const META_TRANSFER: u64 = 0x80;
}

/// Options of a proxied metatoken call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProxiedCallOptions {
    /// Include the metatoken address and the original sender along with the data.
    pub include_sender: bool,

    /// Send the data raw instead of wrapping it in `bytes`.
    pub send_raw: bool,
}

impl ProxiedCallOptions {
    pub const INCLUDE_SENDER: u8 = 0x1;
    pub const SEND_RAW: u8 = 0x2;

    pub fn bits(&self) -> u8 {
        let mut bits = 0;
        if self.include_sender {
            bits |= Self::INCLUDE_SENDER;
        }
        if self.send_raw {
            bits |= Self::SEND_RAW;
        }
        bits
    }
}

/// The largest NFT id that fits next to the address in a metatoken id.
pub fn max_nft_id() -> U256 {
    U256::MAX >> (256 - TOKEN_ADDRESS_SHIFT)
}

/// Returns the metatoken id of the given metatoken contract and NFT.
pub fn metatoken_id(address: Address, nft: impl Into<BigNumber>) -> Result<U256> {
    let nft = nft.into();
    let Some(nft) = nft.to_u256() else {
        bail!("NFT ID must not be negative: {nft}");
    };
    if nft > max_nft_id() {
        bail!("NFT ID too large: {nft}");
    }

    let category = U256::from_be_slice(address.as_slice()) << TOKEN_ADDRESS_SHIFT;
    category.checked_add(nft).context("Metatoken ID overflow")
}

/// Checks whether the flag is set in a metatoken status word. The status must fit in a `uint16`.
pub fn metatoken_status_is(status: impl Into<BigNumber>, flag: MetatokenStatus) -> Result<bool> {
    let status = status.into();
    let status = match status.to_u256().map(u16::try_from) {
        Some(Ok(status)) => status,
        _ => bail!("Metatoken status not uint16: {}", status.to_hex_string()),
    };
    Ok(status & flag.bits() == flag.bits())
}

/// Encodes the values as the parameters of a proxied function call.
pub fn encode_function_calldata(types: &[DynSolType], values: &[DynSolValue]) -> Result<Bytes> {
    if types.len() != values.len() {
        bail!("Arrays must have same length.");
    }
    if let Some((ty, value)) = types
        .iter()
        .zip(values)
        .find(|(ty, value)| !ty.matches(value))
    {
        bail!("The value {value:?} is not of type {ty}");
    }

    Ok(DynSolValue::Tuple(values.to_vec()).abi_encode_params().into())
}

/// Decodes the result of a proxied call. Proxied calls return their results wrapped in `bytes`,
/// which is unwrapped before the values are decoded.
pub fn decode_proxied_call_result(types: &[DynSolType], data: &[u8]) -> Result<Vec<DynSolValue>> {
    let wrapped = DynSolType::Tuple(vec![DynSolType::Bytes])
        .abi_decode_params(data)
        .context("Failed to decode the bytes returned by the proxied call")?;
    let inner = match wrapped {
        DynSolValue::Tuple(mut values) if values.len() == 1 => match values.pop() {
            Some(DynSolValue::Bytes(bytes)) => bytes,
            _ => bail!("The proxied call did not return bytes"),
        },
        _ => bail!("The proxied call did not return bytes"),
    };

    match DynSolType::Tuple(types.to_vec())
        .abi_decode_params(&inner)
        .context("Failed to decode the values of the proxied call")?
    {
        DynSolValue::Tuple(values) => Ok(values),
        other => Ok(vec![other]),
    }
}

/// Returns the selector of a function of the ABI, selected by name or full signature.
pub fn function_selector(abi: &JsonAbi, name: &str) -> Result<FixedBytes<4>> {
    let function = match name.contains('(') {
        true => resolve_function(abi, name, 0)?,
        false => {
            let overloads = abi
                .function(name)
                .with_context(|| format!("No function named {name} in the ABI"))?;
            match overloads.as_slice() {
                [function] => function,
                _ => bail!("The function {name} is overloaded, use the full signature"),
            }
        }
    };
    Ok(function.selector())
}
