// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;

/// sha3 256 hash of a transaction's canonical bytes, used as its durable identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct TxHash([u8; 32]);

impl TxHash {
    /// sha3 256 hash of the given bytes.
    pub fn digest(input: &[u8]) -> Self {
        use tiny_keccak::{Hasher, Sha3};

        let mut sha3 = Sha3::v256();
        let mut output = [0; 32];
        sha3.update(input);
        sha3.finalize(&mut output);
        Self(output)
    }

    /// Access the 32 byte slice of the hash.
    pub fn slice(&self) -> &[u8; 32] {
        &self.0
    }

    /// Serialize this `TxHash` to a hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Deserialize a `TxHash` from a hex string.
    pub fn from_hex(hex: &str) -> Result<Self, Error> {
        let mut h = Self::default();
        hex::decode_to_slice(hex, &mut h.0)
            .map_err(|e| Error::HexDeserializationFailed(e.to_string()))?;
        Ok(h)
    }
}

impl From<[u8; 32]> for TxHash {
    fn from(val: [u8; 32]) -> TxHash {
        TxHash(val)
    }
}

impl AsRef<[u8]> for TxHash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

// Display the hash as a short hex prefix to keep Debug output readable.
impl fmt::Debug for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxHash({}..)", &self.to_hex()[0..8])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_deterministic() {
        let a = TxHash::digest(b"an obligation");
        let b = TxHash::digest(b"an obligation");
        assert_eq!(a, b);
        assert_ne!(a, TxHash::digest(b"another obligation"));
    }

    #[test]
    fn hex_round_trip() -> eyre::Result<()> {
        let hash = TxHash::digest(b"hello world");
        let hex = hash.to_hex();
        assert_eq!(TxHash::from_hex(&hex)?, hash);

        let too_short = &hex[0..30];
        assert!(TxHash::from_hex(too_short).is_err());
        Ok(())
    }
}
