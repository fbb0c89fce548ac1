// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::PartyId;
use thiserror::Error;

/// Specialisation of `std::Result`.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Reasons the transition validator rejects a candidate transaction.
///
/// Checks run in a fixed order and the first violated rule is reported,
/// so callers can branch on the exact variant.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationError {
    /// The transaction shape cannot be interpreted for the command it carries.
    #[error("The transaction is malformed for its command.")]
    MalformedTransaction,
    /// No inputs should be consumed when issuing an IOU.
    #[error("No inputs should be consumed when issuing an IOU.")]
    UnexpectedInputs,
    /// Only one output record should be created.
    #[error("Only one output record should be created.")]
    WrongOutputCount,
    /// The lender and the borrower cannot be the same entity.
    #[error("The lender and the borrower cannot be the same entity.")]
    SelfDealing,
    /// All of the participants must be signers.
    #[error("All of the participants must be signers.")]
    MissingSignature,
    /// The IOU's value must be positive.
    #[error("The IOU's value must be positive.")]
    InvalidValue,
    /// Only one input record should be consumed when destroying an IOU.
    #[error("Only one input record should be consumed when destroying an IOU.")]
    WrongInputCount,
    /// There should be no outputs when destroying an IOU.
    #[error("There should be no outputs when destroying an IOU.")]
    UnexpectedOutputs,
    /// Defensive default for a command this validator does not know.
    #[error("Unrecognised command.")]
    UnrecognizedCommand,
}

/// Errors raised while collecting or verifying signatures over a transaction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignatureError {
    /// The signature does not verify over the canonical transaction payload.
    #[error("Signature from {0:?} does not verify over the transaction payload")]
    InvalidSignature(PartyId),
    /// A required signer has not produced a signature yet.
    #[error("Required signer {0:?} has not signed")]
    MissingSignature(PartyId),
    /// A signature was offered by a party that is not a required signer.
    #[error("{0:?} is not a required signer of this transaction")]
    UnexpectedSigner(PartyId),
    /// A required signer could not be reached.
    #[error("Required signer {0:?} could not be reached")]
    SignerUnavailable(PartyId),
    /// A required signer declined to sign after running its own validation.
    #[error("{party:?} declined to sign: {reason}")]
    SignatureRejected { party: PartyId, reason: String },
}

/// Ledger errors.
#[derive(Error, Debug)]
pub enum Error {
    /// Validation error
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),
    /// Signature error
    #[error("Signature error: {0}")]
    Signature(#[from] SignatureError),
    /// Failed to decode a hex string
    #[error("Could not deserialize hex: {0}")]
    HexDeserializationFailed(String),
    /// Failed to encode to hex
    #[error("Could not serialize to hex: {0}")]
    HexSerializationFailed(String),
    /// Bls error
    #[error("Bls error: {0}")]
    Blsttc(#[from] bls::error::Error),
}
