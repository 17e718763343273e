//! The metatoken test harness core library.
//!
//! This crate caches deployed contract instances and provides the assertions tests make about
//! them: emitted events, reversions, addresses and numbers.

pub mod artifacts;
pub mod assertions;
pub mod error;
pub mod events;
pub mod reporting;
pub mod reversion;

pub use artifacts::{AddressKey, DeploymentArgs, DeploymentCache};
pub use assertions::{address_is, expect_bn_equal, number_is};
pub use error::{AssertionFailure, DeploymentError};
pub use events::{
    expect_event, expect_event_in_construction, expect_event_in_transaction, expect_no_event,
    expect_no_event_in_construction, expect_no_event_in_transaction, filter_events,
};
pub use mtk_format::numbers::bignumber_from;
pub use reversion::{ReversionOutcome, UnverifiableReason, expect_reversion};
