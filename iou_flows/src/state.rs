// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use serde::{Deserialize, Serialize};

/// The states an initiating flow instance moves through.
///
/// Suspension points are exactly `AwaitingCounterpartySignature` and
/// `AwaitingFinality`. In-flight instances are not persisted across a
/// process restart; a crashed exchange is re-initiated by the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InitiatorState {
    /// Building and locally validating the candidate transaction.
    Building,
    /// Proposal sent; waiting for the counterparty's signature or rejection.
    AwaitingCounterpartySignature,
    /// Fully signed; waiting for the finality service's verdict.
    AwaitingFinality,
    /// Confirmed and committed to the local store.
    Committed,
    /// Local validation failed before any message was sent.
    Aborted,
    /// The counterparty rejected the proposal.
    Rejected,
    /// The finality service saw an input consumed by another transaction.
    Conflict,
}

impl InitiatorState {
    /// Whether the flow instance has finished; no further transitions occur.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Committed | Self::Aborted | Self::Rejected | Self::Conflict
        )
    }
}

/// The states an accepting flow instance moves through.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AcceptorState {
    /// Waiting for a proposal to arrive.
    AwaitingProposal,
    /// Independently re-running the transition validator.
    Validating,
    /// Validation passed; producing our signature.
    SigningOrRejecting,
    /// Signature sent; waiting for the finality confirmation.
    AwaitingFinality,
    /// Confirmed and committed to the local store.
    Committed,
    /// We rejected the proposal, or never saw it finalized.
    Rejected,
}

impl AcceptorState {
    /// Whether the flow instance has finished; no further transitions occur.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Committed | Self::Rejected)
    }
}
