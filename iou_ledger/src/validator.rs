// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

//! The transition validator: a pure rule check deciding whether a candidate
//! transaction legally creates or destroys an IOU record.
//!
//! For a new record to be issued onto the ledger, a transaction is required
//! which takes:
//! - Zero inputs.
//! - One output: the new record.
//! - A Create command with both the lender and the borrower as required signers.
//!
//! For a record to be retired, a transaction is required which takes:
//! - One input: the record being retired.
//! - Zero outputs.
//! - A Destroy command with both participants of the record as required signers.
//!
//! Rules are evaluated in a fixed order and the first violated rule is
//! reported. The order is part of the contract: callers branch on the
//! returned variant.

use crate::{Command, IouRecord, Transaction, ValidationError};

type Result<T> = std::result::Result<T, ValidationError>;

/// Validate a candidate transaction against the transition rules for its command.
///
/// Pure and deterministic: no I/O, no side effects; validating the same
/// transaction twice yields the same verdict.
///
/// For Destroy this covers only the structural rules. The participant
/// signature rule needs the consumed record, which a transaction carries
/// only by reference; resolve it from a store and call
/// [`validate_destroy_against`] for the full check.
pub fn validate(tx: &Transaction) -> Result<()> {
    let verdict = match tx.command {
        Command::Create => validate_create(tx),
        Command::Destroy => validate_destroy(tx),
        // Command is non_exhaustive: a transaction decoded from a newer
        // peer may carry a command this validator does not know.
        #[allow(unreachable_patterns)]
        _ => Err(ValidationError::UnrecognizedCommand),
    };
    if let Err(reason) = &verdict {
        debug!("Rejecting {:?} {tx:?}: {reason}", tx.command);
    }
    verdict
}

fn validate_create(tx: &Transaction) -> Result<()> {
    if !tx.inputs.is_empty() {
        return Err(ValidationError::UnexpectedInputs);
    }
    let out = match tx.outputs.as_slice() {
        [out] => out,
        _ => return Err(ValidationError::WrongOutputCount),
    };
    if out.lender == out.borrower {
        return Err(ValidationError::SelfDealing);
    }
    if !out
        .participants()
        .iter()
        .all(|p| tx.required_signers.contains(p))
    {
        return Err(ValidationError::MissingSignature);
    }
    if !out.value.is_positive() {
        return Err(ValidationError::InvalidValue);
    }
    Ok(())
}

fn validate_destroy(tx: &Transaction) -> Result<()> {
    if tx.inputs.len() != 1 {
        return Err(ValidationError::WrongInputCount);
    }
    if !tx.outputs.is_empty() {
        return Err(ValidationError::UnexpectedOutputs);
    }
    Ok(())
}

/// Validate a Destroy transaction against the record it claims to consume.
///
/// Runs the structural rules first, then requires every participant of the
/// consumed record among the required signers. Value positivity and
/// self-dealing are NOT re-checked here: they were established when the
/// record was created and the record is immutable.
pub fn validate_destroy_against(tx: &Transaction, consumed: &IouRecord) -> Result<()> {
    if tx.command != Command::Destroy {
        return Err(ValidationError::MalformedTransaction);
    }
    validate(tx)?;
    if !consumed
        .participants()
        .iter()
        .all(|p| tx.required_signers.contains(p))
    {
        return Err(ValidationError::MissingSignature);
    }
    Ok(())
}
