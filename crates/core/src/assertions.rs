use alloy::dyn_abi::DynSolValue;
use anyhow::{Context as _, Result};

use mtk_common::types::{AddressLike, normalize_address};
use mtk_format::numbers::{ToBigNumber, bignumber_from};
use mtk_node_interaction::ContractInterface;

use crate::error::AssertionFailure;

/// Asserts that both values normalize to the same address.
pub fn address_is(
    a: impl Into<AddressLike>,
    b: impl Into<AddressLike>,
    message: Option<&str>,
) -> Result<()> {
    let a = normalize_address(a);
    let b = normalize_address(b);
    if a == b {
        return Ok(());
    }

    let message = match message {
        Some(message) => format!("{message}: expected {a} to equal {b}"),
        None => format!("expected {a} to equal {b}"),
    };
    Err(AssertionFailure::new(message).into())
}

/// Asserts that two numbers are equal, whatever their representation.
pub fn expect_bn_equal(
    value: impl ToBigNumber,
    expected: impl ToBigNumber,
    label: Option<&str>,
) -> Result<()> {
    let value = bignumber_from(value)?.to_string();
    let expected = bignumber_from(expected)?.to_string();
    if value == expected {
        return Ok(());
    }

    let message = match label {
        Some(label) => format!("{label}: expected {value} to equal {expected}"),
        None => format!("expected {value} to equal {expected}"),
    };
    Err(AssertionFailure::new(message).into())
}

/// Calls the view method and asserts that its first output equals the target.
///
/// Outputs that aren't numbers fail the assertion with the conversion error.
pub async fn number_is(
    instance: &dyn ContractInterface,
    target: impl ToBigNumber,
    message: &str,
    method: &str,
    args: Vec<DynSolValue>,
) -> Result<()> {
    let outputs = instance.view(method, args).await?;

    let comparison = bignumber_from(target).and_then(|target| {
        let value = outputs
            .first()
            .with_context(|| format!("{method} returned no values"))?;
        Ok((target, bignumber_from(value)?))
    });
    match comparison {
        Ok((target, value)) if target == value => Ok(()),
        Ok((target, value)) => {
            Err(AssertionFailure::new(format!("{message}: expected {value} to equal {target}")).into())
        }
        Err(error) => Err(AssertionFailure::new(format!("{error:#}")).into()),
    }
}
