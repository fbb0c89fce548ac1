// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::{FlowId, FlowMessage, Result};
use iou_ledger::PartyId;

use async_trait::async_trait;
use std::time::Duration;

/// Reliable, authenticated point-to-point delivery of flow messages,
/// keyed by party. Delivery is in order within one flow instance;
/// nothing is guaranteed across instances.
///
/// Timeout policy lives here, not in the protocol: a `recv_on` deadline
/// expiring surfaces as `FlowError::CounterpartyUnresponsive`, which the
/// flow treats exactly like an explicit rejection.
#[async_trait]
pub trait FlowTransport: Send + Sync {
    /// The party this endpoint sends and receives as.
    fn local_party(&self) -> PartyId;

    /// Deliver a message to the given party.
    async fn send(&self, to: PartyId, msg: FlowMessage) -> Result<()>;

    /// Wait for the next non-proposal message of the given flow.
    async fn recv_on(&self, flow: FlowId, timeout: Duration) -> Result<FlowMessage>;

    /// Wait for the next incoming proposal, of any flow. Returns `None`
    /// once no further proposals can arrive.
    async fn next_proposal(&self) -> Option<FlowMessage>;
}
