//! A node reached over JSON-RPC, e.g. the Hardhat network, anvil or geth in dev mode.

use std::pin::Pin;

use alloy::{
    network::{Ethereum, EthereumWallet},
    primitives::{Address, Bytes, TxHash},
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::{TransactionReceipt, TransactionRequest},
};
use anyhow::{Context as _, Result, bail};
use tokio::sync::OnceCell;
use tracing::{error, instrument};

use mtk_config::{RpcConfiguration, WalletConfiguration};
use mtk_node_interaction::EthereumNode;

/// An [`EthereumNode`] that signs transactions locally with the configured accounts and submits
/// them to a node over JSON-RPC.
pub struct RpcNode {
    rpc_url: String,
    wallet: EthereumWallet,
    accounts: Vec<Address>,
    provider: OnceCell<DynProvider<Ethereum>>,
}

impl RpcNode {
    pub fn new(context: impl AsRef<RpcConfiguration> + AsRef<WalletConfiguration>) -> Result<Self> {
        let rpc_configuration = AsRef::<RpcConfiguration>::as_ref(&context);
        let wallet_configuration = AsRef::<WalletConfiguration>::as_ref(&context);

        Ok(Self {
            rpc_url: rpc_configuration.rpc_url.clone(),
            wallet: wallet_configuration
                .wallet()
                .context("Failed to construct the wallet")?,
            accounts: wallet_configuration
                .addresses()
                .context("Failed to get the account addresses")?,
            provider: Default::default(),
        })
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    async fn provider(&self) -> Result<DynProvider<Ethereum>> {
        self.provider
            .get_or_try_init(|| async move {
                let provider = ProviderBuilder::new()
                    .wallet(self.wallet.clone())
                    .connect(self.rpc_url.as_str())
                    .await
                    .with_context(|| format!("Failed to connect to the node at {}", self.rpc_url))?;
                Ok::<_, anyhow::Error>(provider.erased())
            })
            .await
            .cloned()
    }
}

impl EthereumNode for RpcNode {
    fn default_account(&self) -> Address {
        self.accounts.first().copied().unwrap_or_default()
    }

    fn accounts(&self) -> &[Address] {
        &self.accounts
    }

    #[instrument(
        level = "info",
        skip_all,
        fields(rpc_url = self.rpc_url),
        err,
    )]
    fn execute_transaction(
        &self,
        transaction: TransactionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<TransactionReceipt>> + Send + '_>> {
        Box::pin(async move {
            let provider = self
                .provider()
                .await
                .context("Failed to create provider for transaction submission")?;

            let pending_transaction = provider
                .send_transaction(transaction)
                .await
                .inspect_err(
                    |err| error!(%err, "Encountered an error when submitting the transaction"),
                )
                .context("Failed to submit the transaction to the node")?;
            let transaction_hash = *pending_transaction.tx_hash();

            let receipt = pending_transaction
                .get_receipt()
                .await
                .with_context(|| format!("Failed to get the receipt of {transaction_hash}"))?;

            if !receipt.status() {
                error!(%transaction_hash, "The transaction was mined but reverted");
                bail!(
                    "Transaction reverted without a reason string (transaction {transaction_hash})"
                );
            }
            Ok(receipt)
        })
    }

    #[instrument(level = "info", skip_all, fields(rpc_url = self.rpc_url), err)]
    fn call(
        &self,
        transaction: TransactionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Bytes>> + Send + '_>> {
        Box::pin(async move {
            self.provider()
                .await
                .context("Failed to create provider for the call")?
                .call(transaction)
                .await
                .context("Failed to execute the call")
        })
    }

    #[instrument(level = "info", skip_all, fields(rpc_url = self.rpc_url), err)]
    fn transaction_receipt(
        &self,
        transaction_hash: TxHash,
    ) -> Pin<Box<dyn Future<Output = Result<TransactionReceipt>> + Send + '_>> {
        Box::pin(async move {
            self.provider()
                .await
                .context("Failed to create provider for getting the receipt")?
                .get_transaction_receipt(transaction_hash)
                .await
                .context("Failed to get the receipt of the transaction")?
                .with_context(|| format!("No receipt found for transaction {transaction_hash}"))
        })
    }

    #[instrument(level = "info", skip_all, fields(rpc_url = self.rpc_url, %address), err)]
    fn code_at(&self, address: Address) -> Pin<Box<dyn Future<Output = Result<Bytes>> + Send + '_>> {
        Box::pin(async move {
            self.provider()
                .await
                .context("Failed to create provider for getting the code")?
                .get_code_at(address)
                .await
                .map_err(Into::into)
        })
    }
}
