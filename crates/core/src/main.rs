use std::sync::Arc;

use alloy::primitives::{Address, TxHash};
use anyhow::{Context as _, Result, bail};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use mtk_common::types::{ArtifactName, BigNumber};
use mtk_config::HarnessConfiguration;
use mtk_core::{
    DeploymentArgs, DeploymentCache, expect_event,
    reporting::{DeploymentThresholds, GasPricing, log_gas},
};
use mtk_format::{
    abi::coerce_constructor_args,
    events::{EventArgValue, EventArgs, decode_logs},
};
use mtk_node::{ArtifactStore, RpcNode};
use mtk_node_interaction::EthereumNode;

/// Deploys metatoken contracts and inspects the events of their transactions.
#[derive(Debug, Parser)]
#[command(name = "mtk-harness")]
struct Cli {
    #[command(flatten)]
    configuration: HarnessConfiguration,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Gets the deployed instance of an artifact, deploying it when there is none.
    Deploy {
        /// The name of the artifact, e.g. `ERC1155MMock`.
        name: String,

        /// Use the instance at this address instead of the canonical one.
        #[arg(long)]
        address: Option<Address>,

        /// Deploy a new instance even if one exists.
        #[arg(long)]
        redeploy: bool,

        /// The constructor arguments, coerced through the artifact's ABI.
        args: Vec<String>,
    },
    /// Decodes the logs of a transaction against the ABI of an artifact.
    Events {
        /// The name of the artifact whose ABI decodes the logs.
        name: String,

        transaction_hash: TxHash,

        /// Assert that the transaction emitted this event.
        #[arg(long)]
        event: Option<String>,

        /// An argument the asserted event must have, as `key=value`.
        #[arg(long = "arg", value_name = "KEY=VALUE", requires = "event")]
        args: Vec<String>,
    },
}

fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set the tracing subscriber")?;

    let cli = Cli::parse();
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to build the runtime")?
        .block_on(run(cli))
}

async fn run(cli: Cli) -> Result<()> {
    let node = Arc::new(RpcNode::new(&cli.configuration)?);
    let store = Arc::new(ArtifactStore::new(
        node.clone(),
        &cli.configuration.artifacts.artifacts_directory,
    )?);

    match cli.command {
        Command::Deploy {
            name,
            address,
            redeploy,
            args,
        } => {
            let name = ArtifactName::from(name);
            let artifact = store.artifact(&name)?;
            let args = coerce_constructor_args(&artifact.abi, &args)?;

            let cache = DeploymentCache::with_thresholds(
                store.clone(),
                DeploymentThresholds::from(&cli.configuration.reporting),
            );
            let mut options = DeploymentArgs::new().with_args(args);
            if let Some(address) = address {
                options = options.with_address(address);
            }
            let contract = match redeploy {
                true => cache.redeploy_contract(name, options).await?,
                false => cache.get_deployed_contract(name, options).await?,
            };

            if let Some(transaction_hash) = contract.transaction_hash {
                let receipt = node.transaction_receipt(transaction_hash).await?;
                log_gas(
                    &contract.name,
                    receipt.gas_used,
                    GasPricing::from(&cli.configuration.reporting),
                );
            }
            println!("{}", contract.address);
        }
        Command::Events {
            name,
            transaction_hash,
            event,
            args,
        } => {
            let artifact = store.artifact(&ArtifactName::from(name))?;
            let receipt = node.transaction_receipt(transaction_hash).await?;
            let logs = decode_logs(&artifact.abi, &receipt)?;
            println!("{}", serde_json::to_string_pretty(&logs)?);

            if let Some(event) = event {
                let expected_args = args
                    .iter()
                    .map(String::as_str)
                    .map(parse_event_arg)
                    .collect::<Result<EventArgs>>()?;
                let expected_args = (!expected_args.is_empty()).then_some(&expected_args);
                expect_event(&logs, &event, expected_args)?;
                info!(%transaction_hash, %event, "The transaction emitted the event");
            }
        }
    }

    Ok(())
}

/// Parses `key=value`. Numbers compare numerically, `true` and `false` as booleans and everything
/// else as strings.
fn parse_event_arg(arg: &str) -> Result<(String, EventArgValue)> {
    let Some((key, value)) = arg.split_once('=') else {
        bail!("Expected an event argument of the form key=value but got {arg}");
    };
    let value = match value {
        "true" => EventArgValue::Bool(true),
        "false" => EventArgValue::Bool(false),
        value => match value.parse::<BigNumber>() {
            Ok(number) => EventArgValue::BigInt(number),
            Err(_) => EventArgValue::from(value),
        },
    };
    Ok((key.to_owned(), value))
}
