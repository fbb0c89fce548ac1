// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

#[macro_use]
extern crate tracing;

mod error;
mod hash;
mod keys;
mod record;
mod signing;
mod transaction;
mod validator;

/// Types used in the public API
pub use crate::{
    error::{Error, Result, SignatureError, ValidationError},
    hash::TxHash,
    keys::{PartyId, PartyKeys},
    record::{Amount, IouRecord},
    signing::{collect_signatures, sign_transaction, LocalSigner, PartySigner, SignedTransaction},
    transaction::{Command, StateRef, Transaction},
    validator::{validate, validate_destroy_against},
};

// re-export crates used in our public API
pub use bls::{self, Signature};
