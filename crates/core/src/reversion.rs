//! Expecting contract calls to revert.
//!
//! Nodes don't always report the reason a transaction reverted with: custom errors the node can't
//! decode and reverts without a reason string are reported with generic messages. Those count as
//! the expected reversion, with a warning that the reason couldn't be confirmed.

use alloy::{dyn_abi::DynSolValue, primitives::Address};
use anyhow::Result;
use tracing::{debug, warn};

use mtk_node_interaction::ContractInterface;

use crate::error::AssertionFailure;

/// The reason to expect when the caller expects an empty one.
pub const INVALID_OPCODE_REASON: &str = "invalid opcode";

/// Messages of nodes that reverted with a custom error they couldn't decode.
pub const UNRECOGNIZED_CUSTOM_ERROR_PATTERNS: [&str; 2] = [
    "revert with unrecognized return data or custom error",
    "reverted with an unrecognized custom error",
];

/// Message of nodes that reverted without returning any data.
pub const NO_REASON_STRING_PATTERN: &str = "reverted without a reason string";

/// What a revert message says about the reason of the reversion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevertMessage {
    UnrecognizedCustomError,
    NoReasonString,
    Other,
}

/// Why a reversion was accepted without confirming its reason.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnverifiableReason {
    UnrecognizedCustomError,
    NoReasonString,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReversionOutcome {
    /// The call reverted, with the expected reason when one was given.
    Reverted,
    /// The call reverted but the node didn't report the reason.
    Unverifiable(UnverifiableReason),
}

pub fn classify_revert_message(message: &str) -> RevertMessage {
    if UNRECOGNIZED_CUSTOM_ERROR_PATTERNS
        .iter()
        .any(|pattern| message.contains(pattern))
    {
        RevertMessage::UnrecognizedCustomError
    } else if message.contains(NO_REASON_STRING_PATTERN) {
        RevertMessage::NoReasonString
    } else {
        RevertMessage::Other
    }
}

/// Sends `method(args)` from the caller and asserts that it reverts.
///
/// With an expected reason the revert message must contain it, unless the node didn't report the
/// reason at all. An empty expected reason stands for [`INVALID_OPCODE_REASON`].
///
/// Any failure of the call counts, including ones raised before it reaches the node such as an
/// unknown method name. Pass an expected reason to tell those apart from a revert.
pub async fn expect_reversion(
    target: &dyn ContractInterface,
    expected_reason: Option<&str>,
    caller: Address,
    method: &str,
    args: Vec<DynSolValue>,
) -> Result<ReversionOutcome> {
    let expected_reason = expected_reason.map(|reason| match reason {
        "" => INVALID_OPCODE_REASON,
        reason => reason,
    });
    let argument_count = args.len();

    let error = match target.send(caller, method, args).await {
        Ok(result) => {
            debug!(transaction_hash = %result.transaction_hash, "The call succeeded");
            return Err(AssertionFailure::new(format!(
                "{method}(...[{argument_count}]) did not revert"
            ))
            .into());
        }
        Err(error) => error,
    };
    let message = format!("{error:#}");

    let unverifiable = match classify_revert_message(&message) {
        RevertMessage::UnrecognizedCustomError => UnverifiableReason::UnrecognizedCustomError,
        RevertMessage::NoReasonString => UnverifiableReason::NoReasonString,
        RevertMessage::Other => {
            return match expected_reason {
                Some(reason) if !message.contains(reason) => Err(AssertionFailure::new(format!(
                    "Expected revert reason \"{reason}\" but got \"{message}\""
                ))
                .into()),
                _ => Ok(ReversionOutcome::Reverted),
            };
        }
    };

    if let Some(reason) = expected_reason {
        match unverifiable {
            UnverifiableReason::UnrecognizedCustomError => {
                warn!(contract = %target.contract().name, method, "Got unrecognized custom error instead of: {reason}")
            }
            UnverifiableReason::NoReasonString => {
                warn!(contract = %target.contract().name, method, "Got no error reason instead of: {reason}")
            }
        }
    }
    Ok(ReversionOutcome::Unverifiable(unverifiable))
}

#[cfg(test)]
mod tests {
    use std::{pin::Pin, sync::Mutex};

    use alloy::dyn_abi::DynSolValue;
    use anyhow::bail;
    use mtk_format::{contract::DeployedContract, transaction::CallResult};

    use super::*;

    /// A contract whose methods all fail with the same message, or succeed when there is none.
    struct FailingContract {
        contract: DeployedContract,
        failure: Option<String>,
        calls: Mutex<Vec<(Address, String, usize)>>,
    }

    impl FailingContract {
        fn new(failure: Option<&str>) -> Self {
            Self {
                contract: DeployedContract::new(
                    "ERC1155MMock",
                    Address::with_last_byte(1),
                    Default::default(),
                    None,
                ),
                failure: failure.map(ToOwned::to_owned),
                calls: Default::default(),
            }
        }
    }

    impl ContractInterface for FailingContract {
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
                self.calls
                    .lock()
                    .unwrap()
                    .push((caller, method.to_owned(), args.len()));
                match &self.failure {
                    Some(failure) => bail!("{failure}"),
                    None => bail!("the mock can't produce receipts"),
                }
            })
        }

        fn view<'a>(
            &'a self,
            _: &'a str,
            _: Vec<DynSolValue>,
        ) -> Pin<Box<dyn Future<Output = Result<Vec<DynSolValue>>> + Send + 'a>> {
            Box::pin(async move { bail!("not a view") })
        }
    }

    fn args() -> Vec<DynSolValue> {
        vec![DynSolValue::Bool(true), DynSolValue::Bool(false)]
    }

    #[test]
    fn every_pattern_literal_is_classified() {
        assert_eq!(
            classify_revert_message(
                "Returned error: VM Exception while processing transaction: revert with unrecognized return data or custom error"
            ),
            RevertMessage::UnrecognizedCustomError
        );
        assert_eq!(
            classify_revert_message(
                "Error: VM Exception while processing transaction: reverted with an unrecognized custom error (return data: 0xbaf3f0f7)"
            ),
            RevertMessage::UnrecognizedCustomError
        );
        assert_eq!(
            classify_revert_message("Transaction reverted without a reason string"),
            RevertMessage::NoReasonString
        );
        assert_eq!(
            classify_revert_message("VM Exception: revert SomeOtherReason"),
            RevertMessage::Other
        );
    }

    #[tokio::test]
    async fn unrecognized_custom_errors_pass_unverified() {
        // Arrange
        let contract = FailingContract::new(Some(
            "Returned error: VM Exception while processing transaction: revert with unrecognized return data or custom error",
        ));

        // Act
        let outcome = expect_reversion(&contract, Some("Foo()"), Address::ZERO, "mint", args()).await;

        // Assert
        assert_eq!(
            outcome.unwrap(),
            ReversionOutcome::Unverifiable(UnverifiableReason::UnrecognizedCustomError)
        );
    }

    #[tokio::test]
    async fn missing_reason_strings_pass_unverified() {
        // Arrange
        let contract = FailingContract::new(Some("Transaction reverted without a reason string"));

        // Act
        let outcome = expect_reversion(&contract, None, Address::ZERO, "burn", args()).await;

        // Assert
        assert_eq!(
            outcome.unwrap(),
            ReversionOutcome::Unverifiable(UnverifiableReason::NoReasonString)
        );
    }

    #[tokio::test]
    async fn other_reasons_must_contain_the_expected_one() {
        // Arrange
        let contract = FailingContract::new(Some("VM Exception: revert SomeOtherReason"));

        // Act
        let mismatch =
            expect_reversion(&contract, Some("ExpectedReason()"), Address::ZERO, "mint", args())
                .await
                .unwrap_err();
        let matching =
            expect_reversion(&contract, Some("SomeOtherReason"), Address::ZERO, "mint", args())
                .await
                .unwrap();
        let any_reason = expect_reversion(&contract, None, Address::ZERO, "mint", args())
            .await
            .unwrap();

        // Assert
        let failure = mismatch.downcast_ref::<AssertionFailure>().unwrap();
        assert!(failure.message().contains("ExpectedReason()"));
        assert!(failure.message().contains("SomeOtherReason"));
        assert_eq!(matching, ReversionOutcome::Reverted);
        assert_eq!(any_reason, ReversionOutcome::Reverted);
    }

    #[tokio::test]
    async fn empty_reasons_expect_an_invalid_opcode() {
        // Arrange
        let invalid_opcode = FailingContract::new(Some("VM Exception: invalid opcode"));
        let other = FailingContract::new(Some("VM Exception: revert Nope"));

        // Act
        let invalid_opcode =
            expect_reversion(&invalid_opcode, Some(""), Address::ZERO, "mint", args()).await;
        let other = expect_reversion(&other, Some(""), Address::ZERO, "mint", args()).await;

        // Assert
        assert_eq!(invalid_opcode.unwrap(), ReversionOutcome::Reverted);
        assert!(other.is_err());
    }

    #[tokio::test]
    async fn the_call_is_sent_from_the_caller() {
        // Arrange
        let contract = FailingContract::new(Some("revert"));
        let caller = Address::with_last_byte(7);

        // Act
        expect_reversion(&contract, None, caller, "safeTransferFrom", args())
            .await
            .unwrap();

        // Assert
        assert_eq!(
            *contract.calls.lock().unwrap(),
            vec![(caller, "safeTransferFrom".to_owned(), 2)]
        );
    }

    #[tokio::test]
    async fn calls_failing_before_the_node_count_as_reverted() {
        // Arrange
        let contract = FailingContract::new(Some("Failed to resolve mnit on ERC1155MMock"));

        // Act
        let any_reason = expect_reversion(&contract, None, Address::ZERO, "mnit", args()).await;
        let with_reason =
            expect_reversion(&contract, Some("Paused()"), Address::ZERO, "mnit", args()).await;

        // Assert
        assert_eq!(any_reason.unwrap(), ReversionOutcome::Reverted);
        assert!(
            with_reason
                .unwrap_err()
                .downcast_ref::<AssertionFailure>()
                .is_some()
        );
    }
}
