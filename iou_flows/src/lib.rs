// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

//! The agreement protocol: the message exchange by which the counterparties
//! of an IOU record jointly produce, sign and finalize a ledger transaction.
//!
//! Every rule the transition validator enforces is checked independently by
//! every participant; a record can only be created or retired with both
//! counterparties' consent plus a confirmation from the finality service,
//! which is the sole arbiter of double spends.

#[macro_use]
extern crate tracing;

mod error;
mod messages;
pub mod mock;
mod node;
mod notary;
mod state;
mod store;
mod transport;

/// Types used in the public API
pub use crate::{
    error::{FlowError, Result},
    messages::{FlowId, FlowMessage},
    node::LedgerNode,
    notary::{FinalityOutcome, FinalityService},
    state::{AcceptorState, InitiatorState},
    store::{InMemoryStore, RecordStore},
    transport::FlowTransport,
};
