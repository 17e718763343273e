use alloy::{
    dyn_abi::DynSolValue,
    primitives::{Address, I256, U256},
};
use anyhow::{Result, bail};
use mtk_common::types::BigNumber;

use crate::events::EventArgValue;

/// A value that can be converted into a [`BigNumber`] for a numeric comparison.
pub trait ToBigNumber {
    fn to_big_number(&self) -> Result<BigNumber>;
}

/// Converts a number, a decimal or hex string, or a big integer into a [`BigNumber`].
pub fn bignumber_from(value: impl ToBigNumber) -> Result<BigNumber> {
    value.to_big_number()
}

impl<T: ToBigNumber + ?Sized> ToBigNumber for &T {
    fn to_big_number(&self) -> Result<BigNumber> {
        (**self).to_big_number()
    }
}

impl ToBigNumber for BigNumber {
    fn to_big_number(&self) -> Result<BigNumber> {
        Ok(*self)
    }
}

impl ToBigNumber for str {
    fn to_big_number(&self) -> Result<BigNumber> {
        self.parse()
    }
}

impl ToBigNumber for String {
    fn to_big_number(&self) -> Result<BigNumber> {
        self.parse()
    }
}

impl ToBigNumber for EventArgValue {
    fn to_big_number(&self) -> Result<BigNumber> {
        match self {
            Self::Number(value) => Ok((*value).into()),
            Self::BigInt(value) => Ok(*value),
            Self::String(value) => value.parse(),
            other => bail!("invalid BigNumber value: {other}"),
        }
    }
}

impl ToBigNumber for DynSolValue {
    fn to_big_number(&self) -> Result<BigNumber> {
        match self {
            Self::Uint(value, _) => Ok((*value).into()),
            Self::Int(value, _) => Ok((*value).into()),
            Self::Address(value) => Ok((*value).into()),
            Self::String(value) => value.parse(),
            other => bail!("invalid BigNumber value: {other:?}"),
        }
    }
}

macro_rules! impl_to_big_number {
    ($($ty: ty),* $(,)?) => {
        $(
            impl ToBigNumber for $ty {
                fn to_big_number(&self) -> Result<BigNumber> {
                    Ok(BigNumber::from(*self))
                }
            }
        )*
    };
}

impl_to_big_number!(i32, i64, u32, u64, u128, U256, I256, Address);
