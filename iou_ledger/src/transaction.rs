// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::{Error, IouRecord, PartyId, Result, TxHash};

use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, collections::BTreeSet, fmt};

/// A pointer to the output of a previously committed transaction.
///
/// This is how a Destroy transaction selects the record it consumes.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StateRef {
    /// Identifier of the transaction that produced the record.
    pub txid: TxHash,
    /// Position of the record among that transaction's outputs.
    pub index: u32,
}

impl StateRef {
    pub fn new(txid: TxHash, index: u32) -> Self {
        Self { txid, index }
    }

    /// Represent this reference as bytes, for the canonical signing payload.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut v: Vec<u8> = Default::default();
        v.extend(self.txid.as_ref());
        v.extend(self.index.to_be_bytes());
        v
    }
}

impl fmt::Debug for StateRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StateRef({}..:{})", &self.txid.to_hex()[0..8], self.index)
    }
}

/// The command a transaction carries. Its meaning is interpreted by the
/// transition validator against the transaction's inputs and outputs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Command {
    /// Issue a new IOU record onto the ledger.
    Create,
    /// Retire an existing IOU record from the ledger.
    Destroy,
}

impl Command {
    /// Domain label mixed into the canonical signing payload.
    pub fn label(&self) -> &'static [u8] {
        match self {
            Command::Create => b"create",
            Command::Destroy => b"destroy",
        }
    }
}

/// A candidate atomic state change: consume the referenced inputs,
/// produce the listed outputs.
///
/// A `Transaction` is only a proposal. It becomes durable after it passes
/// validation on every participant, carries a signature from every required
/// signer, and is confirmed by the finality service.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// References to the records this transaction consumes.
    pub inputs: Vec<StateRef>,
    /// The records this transaction produces.
    pub outputs: Vec<IouRecord>,
    /// What this transaction claims to do.
    pub command: Command,
    /// The parties whose signatures are required for this transaction to be valid.
    pub required_signers: BTreeSet<PartyId>,
}

impl Transaction {
    /// Represent this transaction as bytes for signing.
    ///
    /// The encoding is deterministic so that every signer signs
    /// byte-identical content. There is no from_bytes; the wire form
    /// is rmp-serde via `to_hex`/`from_hex`.
    pub fn to_bytes_for_signing(&self) -> Vec<u8> {
        let mut bytes: Vec<u8> = Default::default();
        bytes.extend(b"inputs");
        for input in self.inputs.iter() {
            bytes.extend(&input.to_bytes());
        }
        bytes.extend(b"outputs");
        for output in self.outputs.iter() {
            bytes.extend(&output.to_bytes());
        }
        bytes.extend(b"command");
        bytes.extend(self.command.label());
        bytes.extend(b"signers");
        for signer in self.required_signers.iter() {
            bytes.extend(signer.to_bytes());
        }
        bytes.extend(b"end");
        bytes
    }

    /// The durable identifier of this transaction.
    pub fn hash(&self) -> TxHash {
        TxHash::digest(&self.to_bytes_for_signing())
    }

    /// Return the hex representation of this transaction.
    pub fn to_hex(&self) -> Result<String> {
        Ok(hex::encode(rmp_serde::to_vec(self).map_err(|e| {
            Error::HexSerializationFailed(format!("Failed to serialize: {e}"))
        })?))
    }

    /// Reconstruct a transaction from its hex representation.
    pub fn from_hex(hex: &str) -> Result<Self> {
        let decoded = hex::decode(hex)
            .map_err(|e| Error::HexDeserializationFailed(format!("Hex decode failed: {e}")))?;
        let tx = rmp_serde::from_slice(&decoded)
            .map_err(|e| Error::HexDeserializationFailed(format!("Failed to deserialize: {e}")))?;
        Ok(tx)
    }
}

/// Debug prints counts and the hash rather than the full content.
impl fmt::Debug for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transaction")
            .field("command", &self.command)
            .field("inputs", &self.inputs.len())
            .field("outputs", &self.outputs.len())
            .field("signers", &self.required_signers.len())
            .field("hash", &self.hash())
            .finish()
    }
}

impl PartialOrd for Transaction {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Transaction {
    fn cmp(&self, other: &Self) -> Ordering {
        self.hash().cmp(&other.hash())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Amount, PartyKeys};

    fn create_tx() -> Transaction {
        let lender = PartyKeys::random().party_id();
        let borrower = PartyKeys::random().party_id();
        Transaction {
            inputs: vec![],
            outputs: vec![IouRecord::new(Amount::from(7), lender, borrower)],
            command: Command::Create,
            required_signers: BTreeSet::from_iter([lender, borrower]),
        }
    }

    #[test]
    fn hash_is_stable_over_signing_payload() {
        let tx = create_tx();
        assert_eq!(tx.hash(), tx.hash());
        assert_eq!(tx.to_bytes_for_signing(), tx.to_bytes_for_signing());
    }

    #[test]
    fn hash_changes_with_command() {
        let tx = create_tx();
        let mut destroy = tx.clone();
        destroy.command = Command::Destroy;
        assert_ne!(tx.hash(), destroy.hash());
    }

    #[test]
    fn hex_round_trip() -> eyre::Result<()> {
        let tx = create_tx();
        let hex = tx.to_hex()?;
        let tx2 = Transaction::from_hex(&hex)?;
        assert_eq!(tx, tx2);
        assert_eq!(tx.hash(), tx2.hash());
        Ok(())
    }

    #[test]
    fn from_hex_rejects_garbage() {
        assert!(Transaction::from_hex("not hex at all").is_err());
        assert!(Transaction::from_hex("abcdef").is_err());
    }
}
