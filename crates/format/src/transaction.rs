use alloy::{
    json_abi::JsonAbi,
    primitives::TxHash,
    rpc::types::TransactionReceipt,
};
use anyhow::Result;

use crate::events::{LogEntry, decode_logs};

/// The outcome of a state changing contract call.
#[derive(Clone, Debug)]
pub struct CallResult {
    pub transaction_hash: TxHash,

    /// Holds the sender, recipient, gas metrics, status and block location of the transaction.
    pub receipt: TransactionReceipt,

    pub logs: Vec<LogEntry>,
}

impl CallResult {
    /// Builds the result of a transaction by decoding its logs against the ABI of the callee.
    pub fn from_receipt(abi: &JsonAbi, receipt: TransactionReceipt) -> Result<Self> {
        let logs = decode_logs(abi, &receipt)?;
        Ok(Self {
            transaction_hash: receipt.transaction_hash,
            receipt,
            logs,
        })
    }

    pub fn gas_used(&self) -> u64 {
        self.receipt.gas_used
    }
}

impl AsRef<[LogEntry]> for CallResult {
    fn as_ref(&self) -> &[LogEntry] {
        &self.logs
    }
}
