//! This crate defines all of the interfaces the harness uses to talk to a chain.

use std::pin::Pin;

use alloy::{
    dyn_abi::DynSolValue,
    primitives::{Address, Bytes, TxHash},
    rpc::types::{TransactionReceipt, TransactionRequest},
};
use anyhow::Result;
use mtk_common::types::ArtifactName;
use mtk_format::{contract::DeployedContract, transaction::CallResult};

mod lookup_error;

pub use lookup_error::*;

/// An interface for all interactions with Ethereum compatible nodes.
pub trait EthereumNode: Send + Sync {
    /// The account transactions are sent from when no other sender is given.
    fn default_account(&self) -> Address;

    /// All of the accounts this node can sign for.
    fn accounts(&self) -> &[Address];

    /// Execute the [`TransactionRequest`] and return its [`TransactionReceipt`]. Transactions that
    /// are mined but revert are errors.
    fn execute_transaction(
        &self,
        transaction: TransactionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<TransactionReceipt>> + Send + '_>>;

    /// Runs the [`TransactionRequest`] as a call against the latest state and returns its output.
    fn call(
        &self,
        transaction: TransactionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Bytes>> + Send + '_>>;

    /// Returns the receipt of an already mined transaction.
    fn transaction_receipt(
        &self,
        transaction_hash: TxHash,
    ) -> Pin<Box<dyn Future<Output = Result<TransactionReceipt>> + Send + '_>>;

    /// Returns the code deployed at the [`Address`], which is empty for accounts without code.
    fn code_at(&self, address: Address) -> Pin<Box<dyn Future<Output = Result<Bytes>> + Send + '_>>;
}

/// Resolves artifact names into contract instances on the chain.
pub trait ArtifactRegistry: Send + Sync {
    /// Returns a handle to an instance of the artifact at the given address.
    fn at(
        &self,
        name: ArtifactName,
        address: Address,
    ) -> Pin<Box<dyn Future<Output = Result<DeployedContract, LookupError>> + Send + '_>>;

    /// Returns the canonical deployed instance of the artifact.
    fn deployed(
        &self,
        name: ArtifactName,
    ) -> Pin<Box<dyn Future<Output = Result<DeployedContract, LookupError>> + Send + '_>>;

    /// Deploys a new instance of the artifact with the given constructor arguments.
    fn deploy(
        &self,
        name: ArtifactName,
        args: Vec<DynSolValue>,
    ) -> Pin<Box<dyn Future<Output = Result<DeployedContract>> + Send + '_>>;

    /// Makes the instance the canonical deployed instance of its artifact.
    fn set_as_deployed(&self, contract: &DeployedContract) -> Result<()>;
}

/// A deployed contract that methods can be invoked on.
pub trait ContractInterface: Send + Sync {
    fn contract(&self) -> &DeployedContract;

    /// Sends a transaction invoking the method from the caller.
    fn send<'a>(
        &'a self,
        caller: Address,
        method: &'a str,
        args: Vec<DynSolValue>,
    ) -> Pin<Box<dyn Future<Output = Result<CallResult>> + Send + 'a>>;

    /// Calls a view method and returns its decoded outputs.
    fn view<'a>(
        &'a self,
        method: &'a str,
        args: Vec<DynSolValue>,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<DynSolValue>>> + Send + 'a>>;
}
