//! The configuration used across all of the metatoken test harness crates.

use std::{path::PathBuf, time::Duration};

use alloy::{network::EthereumWallet, primitives::Address, signers::local::PrivateKeySigner};
use anyhow::{Context as _, Result, bail};
use clap::Args;
use serde::{Deserialize, Serialize};

/// The JSON-RPC endpoint of the local development node (Hardhat network, anvil, geth `--dev`).
pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";

/// The first two accounts of the well-known development mnemonic used by Hardhat and anvil.
pub const DEFAULT_ACCOUNTS: [&str; 2] = [
    "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
    "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d",
];

pub const DEFAULT_ARTIFACTS_DIRECTORY: &str = "artifacts";

/// The full configuration of the harness, made out of the individual configuration groups.
#[derive(Clone, Debug, Default, Args, Serialize, Deserialize)]
pub struct HarnessConfiguration {
    #[command(flatten)]
    pub rpc: RpcConfiguration,

    #[command(flatten)]
    pub wallet: WalletConfiguration,

    #[command(flatten)]
    pub artifacts: ArtifactsConfiguration,

    #[command(flatten)]
    pub reporting: ReportingConfiguration,
}

impl AsRef<RpcConfiguration> for HarnessConfiguration {
    fn as_ref(&self) -> &RpcConfiguration {
        &self.rpc
    }
}

impl AsRef<WalletConfiguration> for HarnessConfiguration {
    fn as_ref(&self) -> &WalletConfiguration {
        &self.wallet
    }
}

impl AsRef<ArtifactsConfiguration> for HarnessConfiguration {
    fn as_ref(&self) -> &ArtifactsConfiguration {
        &self.artifacts
    }
}

impl AsRef<ReportingConfiguration> for HarnessConfiguration {
    fn as_ref(&self) -> &ReportingConfiguration {
        &self.reporting
    }
}

/// Where the harness finds the node it talks to.
#[derive(Clone, Debug, Args, Serialize, Deserialize)]
pub struct RpcConfiguration {
    /// The JSON-RPC URL of the node that the contracts are deployed on.
    #[arg(long = "rpc-url", default_value = DEFAULT_RPC_URL)]
    pub rpc_url: String,
}

impl Default for RpcConfiguration {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_owned(),
        }
    }
}

/// The accounts that the harness signs transactions with.
#[derive(Clone, Debug, Args, Serialize, Deserialize)]
pub struct WalletConfiguration {
    /// The private keys of the accounts to sign with. The first one is the default sender and
    /// deployer.
    #[arg(long = "account", default_values = DEFAULT_ACCOUNTS)]
    pub accounts: Vec<String>,
}

impl WalletConfiguration {
    /// Parses every configured private key into a signer.
    pub fn signers(&self) -> Result<Vec<PrivateKeySigner>> {
        if self.accounts.is_empty() {
            bail!("At least one account private key must be configured");
        }

        self.accounts
            .iter()
            .enumerate()
            .map(|(index, key)| {
                key.parse::<PrivateKeySigner>()
                    .with_context(|| format!("Failed to parse the private key of account #{index}"))
            })
            .collect()
    }

    /// Builds a wallet holding all of the configured signers with the first one as the default.
    pub fn wallet(&self) -> Result<EthereumWallet> {
        let mut signers = self.signers()?.into_iter();
        let Some(default_signer) = signers.next() else {
            bail!("At least one account private key must be configured");
        };

        let mut wallet = EthereumWallet::new(default_signer);
        for signer in signers {
            wallet.register_signer(signer);
        }
        Ok(wallet)
    }

    /// The addresses of the configured accounts in the order they were given.
    pub fn addresses(&self) -> Result<Vec<Address>> {
        Ok(self
            .signers()?
            .iter()
            .map(|signer| signer.address())
            .collect())
    }
}

impl Default for WalletConfiguration {
    fn default() -> Self {
        Self {
            accounts: DEFAULT_ACCOUNTS.iter().map(|key| key.to_string()).collect(),
        }
    }
}

/// Where the compiled contract artifacts live.
#[derive(Clone, Debug, Args, Serialize, Deserialize)]
pub struct ArtifactsConfiguration {
    /// The directory holding the Hardhat or Truffle artifact JSON files. It's searched
    /// recursively.
    #[arg(long = "artifacts", default_value = DEFAULT_ARTIFACTS_DIRECTORY)]
    pub artifacts_directory: PathBuf,
}

impl Default for ArtifactsConfiguration {
    fn default() -> Self {
        Self {
            artifacts_directory: PathBuf::from(DEFAULT_ARTIFACTS_DIRECTORY),
        }
    }
}

/// Thresholds and prices used when reporting deployment times and gas costs.
#[derive(Clone, Debug, Args, Serialize, Deserialize)]
pub struct ReportingConfiguration {
    /// Deployments faster than this many milliseconds are reported as fast.
    #[arg(long = "deploy-fast-ms", default_value_t = 2000)]
    pub deploy_fast_ms: u64,

    /// Deployments faster than this many milliseconds (but not fast) are reported as medium,
    /// everything slower as slow.
    #[arg(long = "deploy-medium-ms", default_value_t = 5000)]
    pub deploy_medium_ms: u64,

    /// The gas price in gwei used for the fiat estimate of gas costs.
    #[arg(long = "gas-price-gwei", default_value_t = 90)]
    pub gas_price_gwei: u64,

    /// The price of one ether in dollars used for the fiat estimate of gas costs.
    #[arg(long = "eth-price", default_value_t = 5000)]
    pub eth_price: u64,
}

impl ReportingConfiguration {
    pub fn fast_deployment_threshold(&self) -> Duration {
        Duration::from_millis(self.deploy_fast_ms)
    }

    pub fn medium_deployment_threshold(&self) -> Duration {
        Duration::from_millis(self.deploy_medium_ms)
    }
}

impl Default for ReportingConfiguration {
    fn default() -> Self {
        Self {
            deploy_fast_ms: 2000,
            deploy_medium_ms: 5000,
            gas_price_gwei: 90,
            eth_price: 5000,
        }
    }
}
