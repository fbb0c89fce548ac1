// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::{FinalityOutcome, FinalityService, Result};
use iou_ledger::{validate, SignedTransaction, StateRef, TxHash};

use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct NotaryInner {
    /// Which transaction consumed each reference. First entry wins.
    spent: BTreeMap<StateRef, TxHash>,
    confirmed: BTreeSet<TxHash>,
}

/// A mock finality service used for test cases. A proper implementation
/// will be distributed, persistent, and auditable.
///
/// It refuses transactions that are not structurally valid or not fully
/// signed, and serializes all submissions behind one lock so that exactly
/// one of any set of racing submissions wins each `StateRef`: every later
/// submission touching a consumed reference gets `Conflict`, whatever
/// transaction it carries. Flows never resubmit, so no idempotence is
/// offered for inputs.
#[derive(Debug, Default)]
pub struct MockNotary {
    inner: Mutex<NotaryInner>,
}

impl MockNotary {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FinalityService for MockNotary {
    async fn submit(&self, tx: &SignedTransaction) -> Result<FinalityOutcome> {
        // Do not permit an unsigned or malformed tx to be logged.
        tx.verify()?;
        validate(&tx.tx)?;

        let txid = tx.tx.hash();
        let mut inner = self.inner.lock().await;

        for input in tx.tx.inputs.iter() {
            if let Some(winner) = inner.spent.get(input) {
                info!("Conflict on {input:?}: already consumed by {winner:?}");
                return Ok(FinalityOutcome::Conflict(*input));
            }
        }

        for input in tx.tx.inputs.iter() {
            let _ = inner.spent.insert(*input, txid);
        }
        let _ = inner.confirmed.insert(txid);
        debug!("Confirmed {txid:?}");
        Ok(FinalityOutcome::Confirmed)
    }

    async fn is_confirmed(&self, txid: &TxHash) -> bool {
        self.inner.lock().await.confirmed.contains(txid)
    }
}
