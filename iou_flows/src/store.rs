// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use iou_ledger::{IouRecord, StateRef, TxHash};

use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use tokio::sync::Mutex;

/// A party's local store of committed records.
///
/// The flow mutates the store exactly once per transaction, at commit.
/// A proper implementation would be persistent and indexed; this trait is
/// the seam it plugs into.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Resolve a reference to a live (unconsumed) record.
    async fn lookup(&self, reference: &StateRef) -> Option<IouRecord>;

    /// Commit the outputs of a confirmed transaction.
    async fn insert(&self, txid: TxHash, outputs: &[IouRecord]);

    /// Mark a record as consumed. Idempotent.
    async fn mark_consumed(&self, reference: &StateRef);

    /// All records this party holds that have not been consumed.
    async fn unconsumed(&self) -> Vec<(StateRef, IouRecord)>;
}

#[derive(Debug, Default)]
struct StoreInner {
    records: BTreeMap<StateRef, IouRecord>,
    consumed: BTreeSet<StateRef>,
}

/// An in-memory `RecordStore`.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: Mutex<StoreInner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn lookup(&self, reference: &StateRef) -> Option<IouRecord> {
        let inner = self.inner.lock().await;
        if inner.consumed.contains(reference) {
            return None;
        }
        inner.records.get(reference).cloned()
    }

    async fn insert(&self, txid: TxHash, outputs: &[IouRecord]) {
        let mut inner = self.inner.lock().await;
        for (index, record) in outputs.iter().enumerate() {
            let reference = StateRef::new(txid, index as u32);
            let _ = inner.records.insert(reference, record.clone());
        }
    }

    async fn mark_consumed(&self, reference: &StateRef) {
        let mut inner = self.inner.lock().await;
        let _ = inner.consumed.insert(*reference);
    }

    async fn unconsumed(&self) -> Vec<(StateRef, IouRecord)> {
        let inner = self.inner.lock().await;
        inner
            .records
            .iter()
            .filter(|(reference, _)| !inner.consumed.contains(reference))
            .map(|(reference, record)| (*reference, record.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iou_ledger::{Amount, PartyKeys};

    fn record(value: i64) -> IouRecord {
        IouRecord::new(
            Amount::from(value),
            PartyKeys::random().party_id(),
            PartyKeys::random().party_id(),
        )
    }

    #[tokio::test]
    async fn insert_then_lookup_by_output_index() {
        let store = InMemoryStore::new();
        let txid = TxHash::digest(b"tx");
        let first = record(1);
        let second = record(2);
        store.insert(txid, &[first.clone(), second.clone()]).await;

        assert_eq!(store.lookup(&StateRef::new(txid, 0)).await, Some(first));
        assert_eq!(store.lookup(&StateRef::new(txid, 1)).await, Some(second));
        assert_eq!(store.lookup(&StateRef::new(txid, 2)).await, None);
        assert_eq!(store.unconsumed().await.len(), 2);
    }

    #[tokio::test]
    async fn consumed_records_are_gone_from_lookup_and_query() {
        let store = InMemoryStore::new();
        let txid = TxHash::digest(b"tx");
        store.insert(txid, &[record(1)]).await;

        let reference = StateRef::new(txid, 0);
        store.mark_consumed(&reference).await;
        store.mark_consumed(&reference).await;

        assert_eq!(store.lookup(&reference).await, None);
        assert!(store.unconsumed().await.is_empty());
    }
}
