// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::{PartyId, PartyKeys, SignatureError, Transaction};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

type Result<T> = std::result::Result<T, SignatureError>;

/// An opaque signing capability scoped to one party.
///
/// A local implementation signs with the party's own keys; a remote one
/// asks the party over the transport and may be unavailable or decline.
#[async_trait]
pub trait PartySigner: Send + Sync {
    /// The party this capability signs as.
    fn party_id(&self) -> PartyId;

    /// Produce this party's signature over the given payload.
    async fn sign(&self, payload: &[u8]) -> Result<bls::Signature>;
}

/// Signs directly with the keys it holds. Never unavailable, never declines.
pub struct LocalSigner {
    keys: PartyKeys,
}

impl LocalSigner {
    pub fn new(keys: PartyKeys) -> Self {
        Self { keys }
    }
}

#[async_trait]
impl PartySigner for LocalSigner {
    fn party_id(&self) -> PartyId {
        self.keys.party_id()
    }

    async fn sign(&self, payload: &[u8]) -> Result<bls::Signature> {
        Ok(self.keys.sign(payload))
    }
}

/// Produce a party's signature over a transaction's canonical payload.
pub fn sign_transaction(tx: &Transaction, keys: &PartyKeys) -> (PartyId, bls::Signature) {
    (keys.party_id(), keys.sign(&tx.to_bytes_for_signing()))
}

/// A transaction together with the signatures gathered over its canonical payload.
///
/// Signatures are keyed by party, so aggregation is order independent and a
/// duplicate signature from the same key is idempotent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
    /// The transaction being signed.
    pub tx: Transaction,
    /// Verified signatures over the transaction's canonical payload.
    pub signatures: BTreeMap<PartyId, bls::Signature>,
}

impl SignedTransaction {
    /// Start collecting signatures for the given transaction.
    pub fn new(tx: Transaction) -> Self {
        Self {
            tx,
            signatures: BTreeMap::new(),
        }
    }

    /// Add a party's signature, verifying it over the canonical payload first.
    ///
    /// Re-adding a signature already present is a no-op.
    pub fn add_signature(&mut self, party: PartyId, sig: bls::Signature) -> Result<()> {
        if !self.tx.required_signers.contains(&party) {
            return Err(SignatureError::UnexpectedSigner(party));
        }
        if !party.verify(&sig, self.tx.to_bytes_for_signing()) {
            return Err(SignatureError::InvalidSignature(party));
        }
        let _ = self.signatures.insert(party, sig);
        Ok(())
    }

    /// Whether every required signer has produced a signature.
    pub fn is_fully_signed(&self) -> bool {
        self.tx
            .required_signers
            .iter()
            .all(|p| self.signatures.contains_key(p))
    }

    /// Verify every present signature and that the required signer set is covered.
    pub fn verify(&self) -> Result<()> {
        for (party, sig) in self.signatures.iter() {
            if !party.verify(sig, self.tx.to_bytes_for_signing()) {
                return Err(SignatureError::InvalidSignature(*party));
            }
        }
        for required in self.tx.required_signers.iter() {
            if !self.signatures.contains_key(required) {
                return Err(SignatureError::MissingSignature(*required));
            }
        }
        Ok(())
    }

    /// Return the hex representation of this signed transaction.
    pub fn to_hex(&self) -> crate::Result<String> {
        Ok(hex::encode(rmp_serde::to_vec(self).map_err(|e| {
            crate::Error::HexSerializationFailed(format!("Failed to serialize: {e}"))
        })?))
    }

    /// Reconstruct a signed transaction from its hex representation.
    pub fn from_hex(hex: &str) -> crate::Result<Self> {
        let decoded = hex::decode(hex).map_err(|e| {
            crate::Error::HexDeserializationFailed(format!("Hex decode failed: {e}"))
        })?;
        let s = rmp_serde::from_slice(&decoded).map_err(|e| {
            crate::Error::HexDeserializationFailed(format!("Failed to deserialize: {e}"))
        })?;
        Ok(s)
    }
}

/// Gather the signature of every required signer of `tx` by invoking the
/// matching capability from `signers`.
///
/// Fails with `SignerUnavailable` when no capability is offered for a
/// required signer, and propagates `SignatureRejected` from a capability
/// that declines. The result does not depend on the order capabilities
/// respond in.
pub async fn collect_signatures(
    tx: Transaction,
    signers: &[&dyn PartySigner],
) -> Result<SignedTransaction> {
    let payload = tx.to_bytes_for_signing();
    let mut signed = SignedTransaction::new(tx);
    for required in signed.tx.required_signers.clone() {
        let signer = signers
            .iter()
            .find(|s| s.party_id() == required)
            .ok_or(SignatureError::SignerUnavailable(required))?;
        let sig = signer.sign(&payload).await?;
        signed.add_signature(required, sig)?;
        trace!("Collected signature from {required:?}");
    }
    Ok(signed)
}
