use std::sync::Arc;

use alloy::{
    json_abi::JsonAbi,
    primitives::{Address, TxHash},
};
use mtk_common::types::{AddressLike, ArtifactName};

/// A contract instance that lives on the node.
///
/// Handles are produced by the deployment cache and shared read-only between everyone who asked
/// for the same artifact and address.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeployedContract {
    pub name: ArtifactName,
    pub address: Address,
    pub abi: Arc<JsonAbi>,

    /// The transaction that created the instance. Only known when it was deployed by this process.
    pub transaction_hash: Option<TxHash>,
}

impl DeployedContract {
    pub fn new(
        name: impl Into<ArtifactName>,
        address: Address,
        abi: Arc<JsonAbi>,
        transaction_hash: Option<TxHash>,
    ) -> Self {
        Self {
            name: name.into(),
            address,
            abi,
            transaction_hash,
        }
    }
}

impl From<&DeployedContract> for AddressLike {
    fn from(value: &DeployedContract) -> Self {
        Self::Address(value.address)
    }
}

impl From<DeployedContract> for AddressLike {
    fn from(value: DeployedContract) -> Self {
        Self::Address(value.address)
    }
}
