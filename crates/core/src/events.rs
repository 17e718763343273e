//! Assertions over the events emitted by transactions.

use alloy::{json_abi::JsonAbi, primitives::TxHash};
use anyhow::{Context as _, Result, bail};
use serde::Serialize;
use tracing::{info, warn};

use mtk_format::{
    contract::DeployedContract,
    events::{EventArgValue, EventArgs, LogEntry, decode_logs},
    numbers::bignumber_from,
};
use mtk_node_interaction::EthereumNode;

use crate::error::AssertionFailure;

/// Returns the entries emitted as `event_name` whose arguments match every expected argument.
///
/// Fails when an expected argument has no comparison, i.e. it's undefined or unsupported.
pub fn filter_events<'a>(
    logs: &'a [LogEntry],
    event_name: &str,
    expected_args: Option<&EventArgs>,
) -> Result<Vec<&'a LogEntry>> {
    let mut matching = Vec::new();
    for entry in logs {
        if entry.event.as_deref() != Some(event_name) {
            continue;
        }
        let Some(expected_args) = expected_args else {
            matching.push(entry);
            continue;
        };
        if args_match(entry, expected_args)? {
            matching.push(entry);
        }
    }
    Ok(matching)
}

fn args_match(entry: &LogEntry, expected_args: &EventArgs) -> Result<bool> {
    for (key, expected) in expected_args.iter() {
        let Some(actual) = entry.args.get(key) else {
            return Ok(false);
        };
        if !value_matches(expected, actual)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn value_matches(expected: &EventArgValue, actual: &EventArgValue) -> Result<bool> {
    match expected {
        EventArgValue::Number(_) | EventArgValue::Bool(_) | EventArgValue::String(_) => {
            Ok(expected == actual)
        }
        EventArgValue::BigInt(expected) => {
            let actual = bignumber_from(actual)
                .with_context(|| format!("Failed to compare {actual} with {expected}"))?;
            Ok(*expected == actual)
        }
        EventArgValue::Undefined => bail!("Cannot be function / symbol / undefined."),
        EventArgValue::Unsupported(description) => bail!("Unknown type for {description}"),
    }
}

/// Logs the entries of the same event alongside the expected arguments, to show why none of them
/// matched.
fn log_potential_matches(logs: &[LogEntry], event_name: &str, expected_args: &EventArgs) {
    let potentially_matching = logs
        .iter()
        .filter(|entry| entry.event.as_deref() == Some(event_name))
        .map(LogEntry::named_args_only)
        .collect::<Vec<_>>();
    if potentially_matching.is_empty() {
        return;
    }

    info!(
        "Potentially matching {event_name} events: {}",
        to_pretty_json(&potentially_matching)
    );
    info!("Your args: {}", to_pretty_json(expected_args));
}

/// Serializes a value for the logs, falling back to a placeholder.
fn to_pretty_json(value: &(impl Serialize + ?Sized)) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|error| {
        warn!(%error, "Failed to serialize the value for the logs");
        "<unserializable>".to_owned()
    })
}

/// Asserts that at least one `event_name` event with the expected arguments was emitted.
pub fn expect_event(
    logs: impl AsRef<[LogEntry]>,
    event_name: &str,
    expected_args: Option<&EventArgs>,
) -> Result<()> {
    let logs = logs.as_ref();
    if !filter_events(logs, event_name, expected_args)?.is_empty() {
        return Ok(());
    }

    if let Some(expected_args) = expected_args {
        log_potential_matches(logs, event_name, expected_args);
    }
    Err(AssertionFailure::new(format!("expected at least one {event_name} event")).into())
}

/// Asserts that no `event_name` event with the expected arguments was emitted.
pub fn expect_no_event(
    logs: impl AsRef<[LogEntry]>,
    event_name: &str,
    expected_args: Option<&EventArgs>,
) -> Result<()> {
    let logs = logs.as_ref();
    let matching = filter_events(logs, event_name, expected_args)?;
    if matching.is_empty() {
        return Ok(());
    }

    if let Some(expected_args) = expected_args {
        log_potential_matches(logs, event_name, expected_args);
    }
    Err(AssertionFailure::new(format!(
        "expected no {event_name} events but found {}",
        matching.len()
    ))
    .into())
}

async fn transaction_logs(
    node: &dyn EthereumNode,
    abi: &JsonAbi,
    transaction_hash: TxHash,
) -> Result<Vec<LogEntry>> {
    let receipt = node
        .transaction_receipt(transaction_hash)
        .await
        .with_context(|| format!("Failed to get the receipt of {transaction_hash}"))?;
    decode_logs(abi, &receipt)
        .with_context(|| format!("Failed to decode the logs of {transaction_hash}"))
}

fn construction_transaction(instance: &DeployedContract) -> Result<TxHash> {
    instance.transaction_hash.with_context(|| {
        format!(
            "The construction transaction of {} at {} is unknown, it wasn't deployed by this process",
            instance.name, instance.address
        )
    })
}

/// Asserts that the transaction emitted the event, decoding its logs against the ABI.
pub async fn expect_event_in_transaction(
    node: &dyn EthereumNode,
    abi: &JsonAbi,
    transaction_hash: TxHash,
    event_name: &str,
    expected_args: Option<&EventArgs>,
) -> Result<()> {
    let logs = transaction_logs(node, abi, transaction_hash).await?;
    expect_event(&logs, event_name, expected_args)
}

/// Asserts that the transaction didn't emit the event, decoding its logs against the ABI.
pub async fn expect_no_event_in_transaction(
    node: &dyn EthereumNode,
    abi: &JsonAbi,
    transaction_hash: TxHash,
    event_name: &str,
    expected_args: Option<&EventArgs>,
) -> Result<()> {
    let logs = transaction_logs(node, abi, transaction_hash).await?;
    expect_no_event(&logs, event_name, expected_args)
}

/// Asserts that the constructor of the instance emitted the event.
pub async fn expect_event_in_construction(
    node: &dyn EthereumNode,
    instance: &DeployedContract,
    event_name: &str,
    expected_args: Option<&EventArgs>,
) -> Result<()> {
    let transaction_hash = construction_transaction(instance)?;
    expect_event_in_transaction(node, &instance.abi, transaction_hash, event_name, expected_args).await
}

/// Asserts that the constructor of the instance didn't emit the event.
pub async fn expect_no_event_in_construction(
    node: &dyn EthereumNode,
    instance: &DeployedContract,
    event_name: &str,
    expected_args: Option<&EventArgs>,
) -> Result<()> {
    let transaction_hash = construction_transaction(instance)?;
    expect_no_event_in_transaction(node, &instance.abi, transaction_hash, event_name, expected_args)
        .await
}
