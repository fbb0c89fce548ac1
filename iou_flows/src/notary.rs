// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::Result;
use iou_ledger::{SignedTransaction, StateRef, TxHash};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// The verdict of the finality service on a fully signed transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinalityOutcome {
    /// The transaction is durable; participants may commit.
    Confirmed,
    /// The given input was already consumed by a concurrent transaction.
    /// Terminal for this flow instance; a retry needs fresh inputs.
    Conflict(StateRef),
}

/// The external arbiter preventing two transactions from consuming the
/// same record. All concurrently submitted transactions referencing the
/// same `StateRef` are serialized here and exactly one wins.
#[async_trait]
pub trait FinalityService: Send + Sync {
    /// Submit a fully signed transaction and block until a verdict.
    async fn submit(&self, tx: &SignedTransaction) -> Result<FinalityOutcome>;

    /// Whether a transaction has been confirmed. Participants that were not
    /// the submitter check this before committing on their side.
    async fn is_confirmed(&self, txid: &TxHash) -> bool;
}
