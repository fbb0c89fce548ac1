// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::{Error, Result};

use bls::{serde_impl::SerdeSecret, PublicKey, SecretKey, PK_SIZE};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The public-key identity of a party on the ledger.
///
/// A `PartyId` is established by the external identity service and is immutable;
/// everything in this crate refers to parties only through it.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize, Hash)]
pub struct PartyId(PublicKey);

impl PartyId {
    pub fn new<G: Into<PublicKey>>(public_key: G) -> Self {
        Self(public_key.into())
    }

    pub fn to_bytes(&self) -> [u8; PK_SIZE] {
        self.0.to_bytes()
    }

    /// Returns `true` if the signature matches the message.
    pub fn verify<M: AsRef<[u8]>>(&self, sig: &bls::Signature, msg: M) -> bool {
        self.0.verify(sig, msg)
    }

    pub fn public_key(&self) -> PublicKey {
        self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0.to_bytes())
    }

    pub fn from_hex<T: AsRef<[u8]>>(hex: T) -> Result<Self> {
        let bytes = hex::decode(hex).map_err(|e| Error::HexDeserializationFailed(e.to_string()))?;
        let bytes_fixed_len: [u8; PK_SIZE] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| Error::HexDeserializationFailed("wrong string size".to_string()))?;
        let public_key = PublicKey::from_bytes(bytes_fixed_len)?;
        Ok(Self::new(public_key))
    }
}

impl fmt::Debug for PartyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PartyId({}..)", &self.to_hex()[0..6])
    }
}

/// The signing half of a party's identity. It is held privately
/// and never shared with anyone.
///
/// With this key a party consents to transactions affecting records
/// it is a participant of; no record can be created or destroyed
/// without a signature from every participant's `PartyKeys`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartyKeys(SerdeSecret<SecretKey>);

impl PartyKeys {
    /// Create new `PartyKeys` from a bls SecretKey.
    pub fn new<S: Into<SecretKey>>(secret_key: S) -> Self {
        Self(SerdeSecret(secret_key.into()))
    }

    /// Create randomly generated `PartyKeys`.
    pub fn random() -> Self {
        Self::new(SecretKey::random())
    }

    /// The public identity corresponding to this key.
    pub fn party_id(&self) -> PartyId {
        PartyId(self.0.public_key())
    }

    /// Sign a message with this party's key.
    pub fn sign(&self, msg: &[u8]) -> bls::Signature {
        self.0.sign(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn party_id_hex_round_trip() -> eyre::Result<()> {
        let keys = PartyKeys::random();
        let party = keys.party_id();

        let hex = party.to_hex();
        assert_eq!(PartyId::from_hex(hex)?, party);
        Ok(())
    }

    #[test]
    fn signatures_verify_against_party_id() {
        let keys = PartyKeys::random();
        let other = PartyKeys::random();

        let sig = keys.sign(b"i owe you");
        assert!(keys.party_id().verify(&sig, b"i owe you"));
        assert!(!keys.party_id().verify(&sig, b"you owe me"));
        assert!(!other.party_id().verify(&sig, b"i owe you"));
    }
}
