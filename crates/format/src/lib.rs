//! The data the harness passes around: contract handles, transaction results, decoded logs and
//! the ABI encodings used by the metatoken contracts.

pub mod abi;
pub mod contract;
pub mod events;
pub mod metatoken;
pub mod numbers;
pub mod transaction;
