// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use iou_ledger::{SignatureError, StateRef, ValidationError};
use thiserror::Error;

/// Specialisation of `std::Result`.
pub type Result<T, E = FlowError> = std::result::Result<T, E>;

/// Flow errors.
///
/// Validation and signature variants are fatal for the current transaction;
/// the caller may construct a corrected transaction and start a fresh flow.
/// `Conflict` means another transaction consumed one of our inputs first and
/// is likewise only retriable with fresh inputs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlowError {
    /// A transition rule was violated.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),
    /// A signature could not be collected or did not verify.
    #[error("Signature error: {0}")]
    Signature(#[from] SignatureError),
    /// The counterparty declined the proposal, carrying its reason.
    #[error("Counterparty rejected the proposal: {reason}")]
    Rejected { reason: String },
    /// The referenced record is not in our store, or differs from what we committed.
    #[error("Referenced record {0:?} does not match our store")]
    RecordMismatch(StateRef),
    /// We are not a participant of the record this transaction affects.
    #[error("We are not a participant of this record")]
    NotAParticipant,
    /// No response from the counterparty in time; treated like a rejection.
    #[error("Counterparty did not respond")]
    CounterpartyUnresponsive,
    /// The finality service saw one of our inputs consumed by another transaction.
    #[error("Input {0:?} was already consumed by a concurrent transaction")]
    Conflict(StateRef),
    /// Transport failure or protocol violation on the wire.
    #[error("Transport error: {0}")]
    Transport(String),
}
