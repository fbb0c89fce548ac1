// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::PartyId;

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// An obligation amount.
///
/// Signed on purpose: a candidate transaction may carry a non-positive
/// value, and it is the Create validator's job to reject it. Once a record
/// is committed its value is guaranteed positive and never re-checked.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Amount(i64);

impl Amount {
    /// New amount from a raw number of units.
    pub const fn from(value: i64) -> Self {
        Self(value)
    }

    /// The raw number of units.
    pub const fn as_units(self) -> i64 {
        self.0
    }

    /// Whether this amount is a legal obligation value.
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Big-endian bytes, for the canonical signing payload.
    pub fn to_bytes(self) -> [u8; 8] {
        self.0.to_be_bytes()
    }
}

impl From<i64> for Amount {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A bilateral obligation record: the borrower owes the lender `value` units.
///
/// An `IouRecord` only ever comes into existence as the single output of a
/// validated Create transaction, and only ever leaves the ledger as the single
/// input of a validated Destroy transaction. It is immutable in between;
/// there is no in-place mutation of a committed record.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IouRecord {
    /// The amount owed.
    pub value: Amount,
    /// The party owed to.
    pub lender: PartyId,
    /// The party that owes.
    pub borrower: PartyId,
}

impl IouRecord {
    pub fn new(value: Amount, lender: PartyId, borrower: PartyId) -> Self {
        Self {
            value,
            lender,
            borrower,
        }
    }

    /// The parties whose consent is required for any transaction affecting this record.
    pub fn participants(&self) -> [PartyId; 2] {
        [self.lender, self.borrower]
    }

    /// Whether the given party is one of the record's participants.
    pub fn is_participant(&self, party: &PartyId) -> bool {
        self.lender == *party || self.borrower == *party
    }

    /// The other participant, if `party` is one of them.
    pub fn counterparty_of(&self, party: &PartyId) -> Option<PartyId> {
        if self.lender == *party {
            Some(self.borrower)
        } else if self.borrower == *party {
            Some(self.lender)
        } else {
            None
        }
    }

    /// Represent this record as bytes, for the canonical signing payload.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut v: Vec<u8> = Default::default();
        v.extend(self.value.to_bytes());
        v.extend(self.lender.to_bytes());
        v.extend(self.borrower.to_bytes());
        v
    }
}
