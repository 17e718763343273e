//! Helpers around contract ABIs: interface identifiers and argument coercion.

use alloy::{
    dyn_abi::{DynSolType, DynSolValue, Specifier},
    json_abi::{Function, JsonAbi, Param},
    primitives::{Address, B256, FixedBytes, keccak256},
};
use anyhow::{Context as _, Result, bail};

pub const ZERO_ADDRESS: Address = Address::ZERO;

/// Computes the ERC-165 interface id of a set of function signatures, i.e. the XOR of their
/// selectors.
pub fn erc165_interface_id<S: AsRef<str>>(signatures: &[S]) -> FixedBytes<4> {
    let mut interface_id = [0u8; 4];
    for signature in signatures {
        let hash = keccak256(signature.as_ref());
        for (byte, selector_byte) in interface_id.iter_mut().zip(&hash[..4]) {
            *byte ^= selector_byte;
        }
    }
    FixedBytes::from(interface_id)
}

/// Computes the ERC-1820 interface hash of an interface name.
pub fn erc1820_interface_hash(name: &str) -> B256 {
    keccak256(name.as_bytes())
}

/// Coerces string arguments into ABI values according to the parameter types.
pub fn coerce_arguments<S: AsRef<str>>(params: &[Param], args: &[S]) -> Result<Vec<DynSolValue>> {
    if params.len() != args.len() {
        bail!(
            "Expected {} arguments but {} were provided",
            params.len(),
            args.len()
        );
    }

    params
        .iter()
        .zip(args)
        .map(|(param, arg)| {
            let ty: DynSolType = param
                .resolve()
                .with_context(|| format!("Failed to resolve the type of {}", param.name))?;
            ty.coerce_str(arg.as_ref()).with_context(|| {
                format!("Failed to coerce {:?} into {}", arg.as_ref(), param.ty)
            })
        })
        .collect()
}

/// Coerces string arguments for the constructor of the ABI. Contracts without a constructor take
/// no arguments.
pub fn coerce_constructor_args<S: AsRef<str>>(abi: &JsonAbi, args: &[S]) -> Result<Vec<DynSolValue>> {
    match abi.constructor() {
        Some(constructor) => coerce_arguments(&constructor.inputs, args),
        None => coerce_arguments(&[], args),
    }
}

/// Finds the function with the given name that takes the given number of arguments.
///
/// A full signature such as `transfer(address,uint256)` selects the overload directly.
pub fn resolve_function<'a>(abi: &'a JsonAbi, method: &str, arg_count: usize) -> Result<&'a Function> {
    if method.contains('(') {
        return abi
            .functions()
            .find(|function| function.signature() == method)
            .with_context(|| format!("No function with the signature {method} in the ABI"));
    }

    let overloads = abi
        .function(method)
        .with_context(|| format!("No function named {method} in the ABI"))?;
    let mut candidates = overloads
        .iter()
        .filter(|function| function.inputs.len() == arg_count);

    match (candidates.next(), candidates.next()) {
        (Some(function), None) => Ok(function),
        (Some(_), Some(_)) => bail!(
            "The call to {method} with {arg_count} arguments is ambiguous, use the full signature"
        ),
        (None, _) => bail!("No overload of {method} takes {arg_count} arguments"),
    }
}
