// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use iou_ledger::{PartyId, SignedTransaction, Signature, Transaction};

use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Correlates the messages of one flow instance. Transport guarantees
/// in-order delivery within a flow, nothing across flows.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FlowId(u64);

impl FlowId {
    /// A fresh random flow id.
    pub fn random(rng: &mut impl RngCore) -> Self {
        Self(rng.next_u64())
    }
}

impl fmt::Debug for FlowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FlowId({:08x})", self.0)
    }
}

/// The messages exchanged by one agreement flow instance.
#[allow(clippy::large_enum_variant)]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowMessage {
    /// Initiator -> counterparty: a candidate transaction, already validated
    /// and signed on the initiator's side.
    Proposal {
        flow: FlowId,
        tx: Transaction,
        initiator: PartyId,
        initiator_sig: Signature,
    },
    /// Counterparty -> initiator: the counterparty re-validated the
    /// transaction independently and consents.
    Approval {
        flow: FlowId,
        party: PartyId,
        sig: Signature,
    },
    /// Counterparty -> initiator: validation failed on the counterparty's
    /// side; carries the specific reason so the initiator can distinguish
    /// a rule disagreement from a transport failure.
    Rejection { flow: FlowId, reason: String },
    /// Initiator -> counterparty: the fully signed transaction was confirmed
    /// by the finality service; safe to commit.
    Finalized { flow: FlowId, tx: SignedTransaction },
}

impl FlowMessage {
    /// The flow instance this message belongs to.
    pub fn flow(&self) -> FlowId {
        match self {
            FlowMessage::Proposal { flow, .. }
            | FlowMessage::Approval { flow, .. }
            | FlowMessage::Rejection { flow, .. }
            | FlowMessage::Finalized { flow, .. } => *flow,
        }
    }
}
