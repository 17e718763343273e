#![allow(dead_code)]

use std::{
    collections::{HashMap, VecDeque},
    pin::Pin,
    sync::{
        Mutex,
        atomic::{AtomicU8, AtomicUsize, Ordering},
    },
    time::Duration,
};

use alloy::{
    dyn_abi::DynSolValue,
    json_abi::JsonAbi,
    primitives::{Address, B256, Bytes, Log, TxHash, address},
    rpc::types::{TransactionReceipt, TransactionRequest},
};
use anyhow::{Result, anyhow, bail};
use serde_json::json;

use mtk_common::types::ArtifactName;
use mtk_format::{contract::DeployedContract, transaction::CallResult};
use mtk_node_interaction::{ArtifactRegistry, ContractInterface, EthereumNode, LookupError};

pub const DEPLOYER: Address = address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");

/// An address the registry reports as having no canonical instance.
pub const UNSET_ADDRESS: Address = Address::repeat_byte(0xee);

/// The name of an artifact the registry can't find.
pub const UNKNOWN_ARTIFACT: &str = "Unknown";

pub fn token_abi() -> JsonAbi {
    JsonAbi::parse([
        "event A(uint8 x, string y)",
        "event TransferSingle(address indexed operator, address indexed from, address indexed to, uint256 id, uint256 value)",
        "function totalSupply(uint256 id) view returns (uint256)",
        "function name() view returns (string)",
    ])
    .unwrap()
}

/// Builds a mined receipt carrying the logs.
pub fn receipt_with_logs(transaction_hash: TxHash, logs: &[Log]) -> TransactionReceipt {
    let logs = logs
        .iter()
        .enumerate()
        .map(|(index, log)| {
            json!({
                "address": log.address,
                "topics": log.data.topics(),
                "data": log.data.data,
                "blockHash": B256::ZERO,
                "blockNumber": "0x1",
                "transactionHash": transaction_hash,
                "transactionIndex": "0x0",
                "logIndex": format!("{index:#x}"),
                "removed": false,
            })
        })
        .collect::<Vec<_>>();

    serde_json::from_value(json!({
        "type": "0x2",
        "status": "0x1",
        "cumulativeGasUsed": "0x5208",
        "logs": logs,
        "logsBloom": format!("0x{}", "0".repeat(512)),
        "transactionHash": transaction_hash,
        "transactionIndex": "0x0",
        "blockHash": B256::ZERO,
        "blockNumber": "0x1",
        "gasUsed": "0x5208",
        "effectiveGasPrice": "0x1",
        "from": DEPLOYER,
        "to": Address::ZERO,
        "contractAddress": null,
    }))
    .unwrap()
}

/// Encodes an event log of the ABI. Indexed values become topics, the rest the data.
pub fn event_log(
    abi: &JsonAbi,
    address: Address,
    event_name: &str,
    indexed: &[B256],
    values: Vec<DynSolValue>,
) -> Log {
    let event = abi.event(event_name).unwrap().first().unwrap();
    let mut topics = vec![event.selector()];
    topics.extend_from_slice(indexed);
    let data = DynSolValue::Tuple(values).abi_encode_params();
    Log::new(address, topics, data.into()).unwrap()
}

/// A registry that deploys contracts at sequential addresses.
///
/// `at` succeeds for addresses the registry deployed to or was told about, fails with the missing
/// instance message for [`UNSET_ADDRESS`] and with a generic message for any other address.
/// Artifacts named [`UNKNOWN_ARTIFACT`] fail every operation without a message.
#[derive(Default)]
pub struct MockRegistry {
    pub lookups: AtomicUsize,
    pub deployments: AtomicU8,
    pub deploy_delay: Duration,
    deploy_delays: Mutex<VecDeque<Duration>>,
    known: Mutex<HashMap<Address, ArtifactName>>,
    canonical: Mutex<HashMap<ArtifactName, DeployedContract>>,
    pub deployed_args: Mutex<Vec<Vec<DynSolValue>>>,
}

impl MockRegistry {
    pub fn with_deploy_delay(deploy_delay: Duration) -> Self {
        Self {
            deploy_delay,
            ..Default::default()
        }
    }

    /// Delays the deployments in order, falling back to no delay once they run out.
    pub fn with_deploy_delays(delays: impl IntoIterator<Item = Duration>) -> Self {
        Self {
            deploy_delays: Mutex::new(delays.into_iter().collect()),
            ..Default::default()
        }
    }

    pub fn add_instance(&self, name: &str, address: Address) {
        self.known
            .lock()
            .unwrap()
            .insert(address, ArtifactName::from(name));
    }

    pub fn canonical(&self, name: &str) -> Option<DeployedContract> {
        self.canonical
            .lock()
            .unwrap()
            .get(&ArtifactName::from(name))
            .cloned()
    }

    pub fn deployment_count(&self) -> u8 {
        self.deployments.load(Ordering::SeqCst)
    }

    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    fn unknown(name: &ArtifactName) -> Option<LookupError> {
        (name.as_str() == UNKNOWN_ARTIFACT)
            .then(|| LookupError::Opaque(anyhow!("Could not find artifacts for {name}")))
    }
}

impl ArtifactRegistry for MockRegistry {
    fn at(
        &self,
        name: ArtifactName,
        address: Address,
    ) -> Pin<Box<dyn Future<Output = Result<DeployedContract, LookupError>> + Send + '_>> {
        Box::pin(async move {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            if let Some(error) = Self::unknown(&name) {
                return Err(error);
            }
            if address == UNSET_ADDRESS {
                return Err(LookupError::no_deployed_instance(&name));
            }
            match self.known.lock().unwrap().get(&address) {
                Some(known) if *known == name => Ok(DeployedContract::new(
                    name,
                    address,
                    Default::default(),
                    None,
                )),
                _ => Err(LookupError::Message(format!(
                    "Cannot create instance of {name}; no code at address {address}"
                ))),
            }
        })
    }

    fn deployed(
        &self,
        name: ArtifactName,
    ) -> Pin<Box<dyn Future<Output = Result<DeployedContract, LookupError>> + Send + '_>> {
        Box::pin(async move {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            if let Some(error) = Self::unknown(&name) {
                return Err(error);
            }
            self.canonical
                .lock()
                .unwrap()
                .get(&name)
                .cloned()
                .ok_or_else(|| LookupError::no_deployed_instance(&name))
        })
    }

    fn deploy(
        &self,
        name: ArtifactName,
        args: Vec<DynSolValue>,
    ) -> Pin<Box<dyn Future<Output = Result<DeployedContract>> + Send + '_>> {
        Box::pin(async move {
            if name.as_str() == UNKNOWN_ARTIFACT {
                bail!("Could not find artifacts for {name}");
            }
            let index = self.deployments.fetch_add(1, Ordering::SeqCst) + 1;
            let delay = self
                .deploy_delays
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(self.deploy_delay);
            tokio::time::sleep(delay).await;

            let address = Address::with_last_byte(index);
            self.known.lock().unwrap().insert(address, name.clone());
            self.deployed_args.lock().unwrap().push(args);
            Ok(DeployedContract::new(
                name,
                address,
                Default::default(),
                Some(TxHash::with_last_byte(index)),
            ))
        })
    }

    fn set_as_deployed(&self, contract: &DeployedContract) -> Result<()> {
        self.canonical
            .lock()
            .unwrap()
            .insert(contract.name.clone(), contract.clone());
        Ok(())
    }
}

/// A node that only knows the receipts it was given.
#[derive(Default)]
pub struct ReceiptNode {
    receipts: Mutex<HashMap<TxHash, TransactionReceipt>>,
}

impl ReceiptNode {
    pub fn add_receipt(&self, receipt: TransactionReceipt) {
        self.receipts
            .lock()
            .unwrap()
            .insert(receipt.transaction_hash, receipt);
    }
}

impl EthereumNode for ReceiptNode {
    fn default_account(&self) -> Address {
        DEPLOYER
    }

    fn accounts(&self) -> &[Address] {
        &[DEPLOYER]
    }

    fn execute_transaction(
        &self,
        _: TransactionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<TransactionReceipt>> + Send + '_>> {
        Box::pin(async move { bail!("The node is read only") })
    }

    fn call(
        &self,
        _: TransactionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Bytes>> + Send + '_>> {
        Box::pin(async move { bail!("The node is read only") })
    }

    fn transaction_receipt(
        &self,
        transaction_hash: TxHash,
    ) -> Pin<Box<dyn Future<Output = Result<TransactionReceipt>> + Send + '_>> {
        Box::pin(async move {
            match self.receipts.lock().unwrap().get(&transaction_hash) {
                Some(receipt) => Ok(receipt.clone()),
                None => bail!("No receipt found for transaction {transaction_hash}"),
            }
        })
    }

    fn code_at(&self, _: Address) -> Pin<Box<dyn Future<Output = Result<Bytes>> + Send + '_>> {
        Box::pin(async move { Ok(Bytes::new()) })
    }
}

/// A contract whose views return fixed outputs and whose transactions succeed with an empty
/// receipt.
pub struct StubContract {
    pub contract: DeployedContract,
    pub view_output: Vec<DynSolValue>,
}

impl StubContract {
    pub fn new(view_output: Vec<DynSolValue>) -> Self {
        Self {
            contract: DeployedContract::new(
                "ERC1155MMock",
                Address::with_last_byte(1),
                std::sync::Arc::new(token_abi()),
                None,
            ),
            view_output,
        }
    }
}

impl ContractInterface for StubContract {
    fn contract(&self) -> &DeployedContract {
        &self.contract
    }

    fn send<'a>(
        &'a self,
        _: Address,
        _: &'a str,
        _: Vec<DynSolValue>,
    ) -> Pin<Box<dyn Future<Output = Result<CallResult>> + Send + 'a>> {
        Box::pin(async move {
            CallResult::from_receipt(
                &self.contract.abi,
                receipt_with_logs(TxHash::with_last_byte(1), &[]),
            )
        })
    }

    fn view<'a>(
        &'a self,
        _: &'a str,
        _: Vec<DynSolValue>,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<DynSolValue>>> + Send + 'a>> {
        Box::pin(async move { Ok(self.view_output.clone()) })
    }
}
