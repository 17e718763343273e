#![allow(dead_code)]

use std::{
    collections::HashMap,
    pin::Pin,
    sync::{
        Mutex,
        atomic::{AtomicU8, Ordering},
    },
};

use alloy::{
    primitives::{Address, B256, Bytes, TxHash, address},
    rpc::types::{TransactionReceipt, TransactionRequest},
};
use anyhow::{Result, bail};
use serde_json::json;

use mtk_node_interaction::EthereumNode;

pub const DEPLOYER: Address = address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");

/// Builds a mined receipt without logs.
pub fn receipt(
    transaction_hash: TxHash,
    from: Address,
    to: Option<Address>,
    contract_address: Option<Address>,
) -> TransactionReceipt {
    serde_json::from_value(json!({
        "type": "0x2",
        "status": "0x1",
        "cumulativeGasUsed": "0x5208",
        "logs": [],
        "logsBloom": format!("0x{}", "0".repeat(512)),
        "transactionHash": transaction_hash,
        "transactionIndex": "0x0",
        "blockHash": B256::ZERO,
        "blockNumber": "0x1",
        "gasUsed": "0x5208",
        "effectiveGasPrice": "0x1",
        "from": from,
        "to": to,
        "contractAddress": contract_address,
    }))
    .unwrap()
}

/// An in-memory node. Every transaction creates a contract holding the transaction input as its
/// code, and calls return a fixed output.
#[derive(Default)]
pub struct MockNode {
    transactions: AtomicU8,
    code: Mutex<HashMap<Address, Bytes>>,
    pub sent: Mutex<Vec<TransactionRequest>>,
    pub call_output: Mutex<Bytes>,
}

impl MockNode {
    pub fn code(&self, address: Address) -> Option<Bytes> {
        self.code.lock().unwrap().get(&address).cloned()
    }
}

impl EthereumNode for MockNode {
    fn default_account(&self) -> Address {
        DEPLOYER
    }

    fn accounts(&self) -> &[Address] {
        &[DEPLOYER]
    }

    fn execute_transaction(
        &self,
        transaction: TransactionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<TransactionReceipt>> + Send + '_>> {
        Box::pin(async move {
            let index = self.transactions.fetch_add(1, Ordering::SeqCst) + 1;
            let transaction_hash = TxHash::with_last_byte(index);
            self.sent.lock().unwrap().push(transaction.clone());

            let Some(to) = transaction.to.and_then(|kind| kind.to().copied()) else {
                let address = Address::with_last_byte(index);
                let code = transaction.input.input().cloned().unwrap_or_default();
                self.code.lock().unwrap().insert(address, code);
                return Ok(receipt(transaction_hash, DEPLOYER, None, Some(address)));
            };
            Ok(receipt(transaction_hash, DEPLOYER, Some(to), None))
        })
    }

    fn call(
        &self,
        transaction: TransactionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Bytes>> + Send + '_>> {
        Box::pin(async move {
            self.sent.lock().unwrap().push(transaction);
            Ok(self.call_output.lock().unwrap().clone())
        })
    }

    fn transaction_receipt(
        &self,
        transaction_hash: TxHash,
    ) -> Pin<Box<dyn Future<Output = Result<TransactionReceipt>> + Send + '_>> {
        Box::pin(async move { bail!("No receipt found for transaction {transaction_hash}") })
    }

    fn code_at(&self, address: Address) -> Pin<Box<dyn Future<Output = Result<Bytes>> + Send + '_>> {
        Box::pin(async move { Ok(self.code(address).unwrap_or_default()) })
    }
}
