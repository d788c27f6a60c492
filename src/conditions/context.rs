// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Condition Context
//!
//! Runtime values a service node needs to evaluate a condition set: the
//! requester's chain, the current time and, when the set references
//! `:userAddress`, a wallet signature proving the requester controls that
//! address.

use ethers::types::{Address, Signature};
use ethers::utils::hash_message;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::error::ConditionError;
use super::set::ConditionSet;
use super::taxonomy::USER_ADDRESS_PARAM;
use crate::crypto::recover_signer_address;
use crate::wallet::{WalletError, WalletProvider};

/// Signed claim that the requester controls `address`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAddressProof {
    pub address: Address,
    pub message: String,
    /// 65-byte `r || s || v` signature, hex encoded
    pub signature: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionContext {
    pub chain_id: u64,
    pub requester: Option<Address>,
    pub timestamp: u64,
    pub user_address: Option<UserAddressProof>,
}

/// Message the wallet signs to prove address ownership for `set`
pub fn user_address_message(address: Address, set: &ConditionSet) -> String {
    format!(
        "I own {:?} and request decryption under condition set 0x{}",
        address,
        hex::encode(set.digest())
    )
}

impl ConditionContext {
    /// Derive a context from the wallet session for evaluating `set`
    ///
    /// Only asks the wallet for a signature when the set references
    /// `:userAddress`.
    pub async fn build(
        set: &ConditionSet,
        wallet: &dyn WalletProvider,
    ) -> Result<Self, WalletError> {
        let chain_id = wallet.chain_id().await?;
        let requester = wallet.account().await;

        let user_address = if set.references_user_address() {
            let address = requester.ok_or(WalletError::NotConnected)?;
            let message = user_address_message(address, set);
            let signature: Signature = wallet.sign_message(message.as_bytes()).await?;
            debug!("signed :userAddress proof for {:?}", address);
            Some(UserAddressProof {
                address,
                message,
                signature: hex::encode(signature.to_vec()),
            })
        } else {
            None
        };

        Ok(Self {
            chain_id,
            requester,
            timestamp: chrono::Utc::now().timestamp().max(0) as u64,
            user_address,
        })
    }

    /// The proven requester address
    ///
    /// # Errors
    ///
    /// [`ConditionError::MissingContextVariable`] if no proof was supplied or
    /// the signature does not recover to the claimed address.
    pub fn verified_user_address(&self) -> Result<Address, ConditionError> {
        let missing = || ConditionError::MissingContextVariable(USER_ADDRESS_PARAM.to_string());
        let proof = self.user_address.as_ref().ok_or_else(missing)?;
        let signature = hex::decode(&proof.signature).map_err(|_| missing())?;
        let hash = hash_message(proof.message.as_bytes());
        let recovered = recover_signer_address(&signature, hash.as_bytes()).map_err(|e| {
            ConditionError::Evaluation(format!("invalid {} signature: {}", USER_ADDRESS_PARAM, e))
        })?;
        if recovered != proof.address {
            return Err(ConditionError::Evaluation(format!(
                "{} signature was made by {:?}, not {:?}",
                USER_ADDRESS_PARAM, recovered, proof.address
            )));
        }
        Ok(recovered)
    }

    /// Substitute context variables in a parameter or expected value
    pub fn resolve(&self, value: &Value) -> Result<Value, ConditionError> {
        match value.as_str() {
            Some(USER_ADDRESS_PARAM) => {
                let address = self.verified_user_address()?;
                Ok(Value::String(format!("{:?}", address)))
            }
            _ => Ok(value.clone()),
        }
    }
}
