// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Message Kits
//!
//! A [`MessageKit`] is the ciphertext envelope produced by an encrypter and
//! bound to the condition set it was encrypted under. Retrieval annotates it
//! with per-node results, producing a [`PolicyMessageKit`].

use ethers::types::Address;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::conditions::ConditionSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageKit {
    pub id: Uuid,
    pub policy_id: Uuid,
    pub conditions: ConditionSet,
    pub ciphertext: Vec<u8>,
    pub nonce: Vec<u8>,
    pub salt: Vec<u8>,
}

impl MessageKit {
    /// Ciphertext as shown to the user
    pub fn ciphertext_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.ciphertext))
    }

    /// Associated data the ciphertext is authenticated against
    pub fn aad(&self) -> Vec<u8> {
        self.conditions.to_json().into_bytes()
    }
}

/// A message kit annotated with the results of every responding node
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyMessageKit {
    pub message_kit: MessageKit,
    pub threshold: usize,
    /// Key fragments released by nodes whose condition check passed
    pub fragments: BTreeMap<Address, Vec<u8>>,
    /// Error reported by each node that refused or failed
    pub errors: BTreeMap<Address, String>,
}

impl PolicyMessageKit {
    pub fn new(message_kit: MessageKit, threshold: usize) -> Self {
        Self {
            message_kit,
            threshold,
            fragments: BTreeMap::new(),
            errors: BTreeMap::new(),
        }
    }

    pub fn is_decryptable_by_receiver(&self) -> bool {
        self.threshold > 0 && self.fragments.len() >= self.threshold
    }

    /// Number of nodes that answered at all
    pub fn responses(&self) -> usize {
        self.fragments.len() + self.errors.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kit() -> MessageKit {
        MessageKit {
            id: Uuid::new_v4(),
            policy_id: Uuid::new_v4(),
            conditions: ConditionSet::default(),
            ciphertext: vec![0xde, 0xad],
            nonce: vec![0; 24],
            salt: vec![1; 16],
        }
    }

    #[test]
    fn test_ciphertext_hex() {
        assert_eq!(kit().ciphertext_hex(), "0xdead");
    }

    #[test]
    fn test_decryptable_needs_threshold_fragments() {
        let mut pmk = PolicyMessageKit::new(kit(), 2);
        pmk.fragments.insert(Address::repeat_byte(1), vec![1]);
        pmk.errors.insert(Address::repeat_byte(2), "no".to_string());
        assert!(!pmk.is_decryptable_by_receiver());
        assert_eq!(pmk.responses(), 2);

        pmk.fragments.insert(Address::repeat_byte(3), vec![1]);
        assert!(pmk.is_decryptable_by_receiver());
    }
}
