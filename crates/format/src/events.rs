use alloy::{
    dyn_abi::{DynSolValue, EventExt},
    hex,
    json_abi::{Event, JsonAbi},
    primitives::{Address, I256, U256},
    rpc::types::{Log, TransactionReceipt},
};
use anyhow::{Context as _, Result};
use indexmap::IndexMap;
use mtk_common::types::BigNumber;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Integers of at most this many bits are decoded as plain numbers, wider ones as big integers.
pub const MAX_NUMBER_BITS: usize = 48;

/// A single decoded event argument, or an expected value in an event predicate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventArgValue {
    Number(i64),
    Bool(bool),
    String(String),
    BigInt(BigNumber),
    /// A value the matcher has no comparison for, e.g. an array or a tuple. Carries a description
    /// of the value.
    Unsupported(String),
    Undefined,
}

impl EventArgValue {
    /// Converts a decoded ABI value into an event argument.
    pub fn from_sol_value(value: &DynSolValue) -> Self {
        match value {
            DynSolValue::Bool(value) => Self::Bool(*value),
            DynSolValue::Int(value, bits) => Self::from_int(*value, *bits),
            DynSolValue::Uint(value, bits) => Self::from_uint(*value, *bits),
            DynSolValue::Address(address) => Self::String(address.to_checksum(None)),
            DynSolValue::FixedBytes(word, size) => Self::String(hex::encode_prefixed(&word[..*size])),
            DynSolValue::Bytes(bytes) => Self::String(hex::encode_prefixed(bytes)),
            DynSolValue::Function(function) => Self::String(hex::encode_prefixed(function)),
            DynSolValue::String(value) => Self::String(value.clone()),
            other => Self::Unsupported(format!("{other:?}")),
        }
    }

    fn from_int(value: I256, bits: usize) -> Self {
        match i64::try_from(value) {
            Ok(number) if bits <= MAX_NUMBER_BITS => Self::Number(number),
            _ => Self::BigInt(value.into()),
        }
    }

    fn from_uint(value: U256, bits: usize) -> Self {
        match i64::try_from(value) {
            Ok(number) if bits <= MAX_NUMBER_BITS => Self::Number(number),
            _ => Self::BigInt(value.into()),
        }
    }
}

impl std::fmt::Display for EventArgValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Bool(value) => write!(f, "{value}"),
            Self::String(value) => write!(f, "{value}"),
            Self::BigInt(value) => write!(f, "{value}"),
            Self::Unsupported(description) => write!(f, "{description}"),
            Self::Undefined => write!(f, "undefined"),
        }
    }
}

impl From<i64> for EventArgValue {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for EventArgValue {
    fn from(value: i32) -> Self {
        Self::Number(value.into())
    }
}

impl From<u32> for EventArgValue {
    fn from(value: u32) -> Self {
        Self::Number(value.into())
    }
}

impl From<bool> for EventArgValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for EventArgValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for EventArgValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Address> for EventArgValue {
    fn from(value: Address) -> Self {
        Self::String(value.to_checksum(None))
    }
}

impl From<BigNumber> for EventArgValue {
    fn from(value: BigNumber) -> Self {
        Self::BigInt(value)
    }
}

impl From<U256> for EventArgValue {
    fn from(value: U256) -> Self {
        Self::BigInt(value.into())
    }
}

impl<T: Into<EventArgValue>> From<Option<T>> for EventArgValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Self::Undefined)
    }
}

/// A partial set of expected event arguments, keyed by argument name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventArgs(IndexMap<String, EventArgValue>);

impl EventArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<EventArgValue>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &EventArgValue)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<EventArgValue>> FromIterator<(K, V)> for EventArgs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

/// A log of a transaction decoded against an ABI.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// The contract that emitted the log.
    pub address: Address,

    /// The name of the event, or [`None`] when no event of the ABI matches the log.
    pub event: Option<String>,

    /// The decoded arguments in declaration order. Unnamed arguments are keyed by their position.
    pub args: IndexMap<String, EventArgValue>,
}

impl LogEntry {
    pub fn placeholder(address: Address) -> Self {
        Self {
            address,
            event: None,
            args: Default::default(),
        }
    }

    /// Returns a copy of the entry that only holds the arguments with a name.
    pub fn named_args_only(&self) -> Self {
        Self {
            address: self.address,
            event: self.event.clone(),
            args: self
                .args
                .iter()
                .filter(|(key, _)| !key.chars().all(|character| character.is_ascii_digit()))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        }
    }
}

/// Decodes all of the logs in the receipt against the ABI.
///
/// Logs that match no event of the ABI become placeholders with no event name, but a log that
/// matches an event and fails to decode is an error.
pub fn decode_logs(abi: &JsonAbi, receipt: &TransactionReceipt) -> Result<Vec<LogEntry>> {
    receipt
        .inner
        .logs()
        .iter()
        .map(|log| decode_log(abi, log))
        .collect()
}

pub fn decode_log(abi: &JsonAbi, log: &Log) -> Result<LogEntry> {
    let address = log.inner.address;
    let data = &log.inner.data;

    let Some(selector) = data.topics().first() else {
        return Ok(LogEntry::placeholder(address));
    };
    let Some(event) = abi
        .events()
        .find(|event| !event.anonymous && event.selector() == *selector)
    else {
        trace!(%address, %selector, "The log matches no event of the ABI");
        return Ok(LogEntry::placeholder(address));
    };

    let decoded = event
        .decode_log_parts(data.topics().iter().copied(), data.data.as_ref())
        .with_context(|| format!("Failed to decode the {} event", event.name))?;

    Ok(LogEntry {
        address,
        event: Some(event.name.clone()),
        args: assemble_args(event, decoded.indexed, decoded.body),
    })
}

/// Puts the indexed and non-indexed values back into the order the event declares them in.
fn assemble_args(
    event: &Event,
    indexed: Vec<DynSolValue>,
    body: Vec<DynSolValue>,
) -> IndexMap<String, EventArgValue> {
    let mut indexed = indexed.into_iter();
    let mut body = body.into_iter();

    event
        .inputs
        .iter()
        .enumerate()
        .filter_map(|(position, input)| {
            let value = match input.indexed {
                true => indexed.next(),
                false => body.next(),
            }?;
            let key = match input.name.is_empty() {
                true => position.to_string(),
                false => input.name.clone(),
            };
            Some((key, EventArgValue::from_sol_value(&value)))
        })
        .collect()
}
