use std::{pin::Pin, sync::Arc};

use alloy::{
    dyn_abi::{DynSolValue, FunctionExt, JsonAbiExt},
    primitives::{Address, Bytes},
    rpc::types::TransactionRequest,
};
use anyhow::{Context as _, Result};
use tracing::debug;

use mtk_format::{abi::resolve_function, contract::DeployedContract, transaction::CallResult};
use mtk_node_interaction::{ContractInterface, EthereumNode};

/// A [`DeployedContract`] bound to the node it lives on, so that its methods can be invoked by
/// name. Overloaded methods are resolved by the number of arguments or by their full signature.
#[derive(Clone)]
pub struct BoundContract {
    node: Arc<dyn EthereumNode>,
    contract: Arc<DeployedContract>,
}

impl BoundContract {
    pub fn new(node: Arc<dyn EthereumNode>, contract: Arc<DeployedContract>) -> Self {
        Self { node, contract }
    }

    fn encode_call(&self, method: &str, args: &[DynSolValue]) -> Result<Bytes> {
        let function = resolve_function(&self.contract.abi, method, args.len())
            .with_context(|| format!("Failed to resolve {method} on {}", self.contract.name))?;
        function
            .abi_encode_input(args)
            .map(Into::into)
            .with_context(|| format!("Failed to encode the arguments of {method}"))
    }
}

impl ContractInterface for BoundContract {
    fn contract(&self) -> &DeployedContract {
        &self.contract
    }

    fn send<'a>(
        &'a self,
        caller: Address,
        method: &'a str,
        args: Vec<DynSolValue>,
    ) -> Pin<Box<dyn Future<Output = Result<CallResult>> + Send + 'a>> {
        Box::pin(async move {
            let input = self.encode_call(method, &args)?;
            let transaction = TransactionRequest::default()
                .from(caller)
                .to(self.contract.address)
                .input(input.into());

            debug!(contract = %self.contract.name, method, %caller, "Sending the transaction");
            let receipt = self.node.execute_transaction(transaction).await?;
            CallResult::from_receipt(&self.contract.abi, receipt)
        })
    }

    fn view<'a>(
        &'a self,
        method: &'a str,
        args: Vec<DynSolValue>,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<DynSolValue>>> + Send + 'a>> {
        Box::pin(async move {
            let function = resolve_function(&self.contract.abi, method, args.len())?;
            let input = self.encode_call(method, &args)?;
            let transaction = TransactionRequest::default()
                .from(self.node.default_account())
                .to(self.contract.address)
                .input(input.into());

            let output = self.node.call(transaction).await?;
            function
                .abi_decode_output(&output)
                .with_context(|| format!("Failed to decode the output of {method}"))
        })
    }
}
