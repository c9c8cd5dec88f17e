// SPDX-FileCopyrightText: 2026 EVMAI Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Zero-argument contract view methods read during event handling.

use std::fmt;

use alloy_primitives::{Selector, keccak256};

/// A view method identified by its Solidity signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContractMethod {
    signature: &'static str,
}

impl ContractMethod {
    pub const fn new(signature: &'static str) -> Self {
        Self { signature }
    }

    pub fn signature(&self) -> &'static str {
        self.signature
    }

    /// First four bytes of the keccak256 hash of the signature.
    pub fn selector(&self) -> Selector {
        let hash = keccak256(self.signature.as_bytes());
        Selector::from_slice(&hash[..4])
    }
}

impl fmt::Display for ContractMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.signature)
    }
}

/// Agent contract: address of the escrow contract it charges fees through.
pub const ESCROW_CONTRACT: ContractMethod = ContractMethod::new("escrowContract()");

/// Escrow contract: fee charged when a pending prompt is cancelled.
pub const CANCELLATION_FEE: ContractMethod = ContractMethod::new("cancellationFee()");

/// Escrow contract: fee charged for branching a conversation.
pub const BRANCH_FEE: ContractMethod = ContractMethod::new("branchFee()");

/// Escrow contract: fee charged for updating conversation metadata.
pub const METADATA_UPDATE_FEE: ContractMethod = ContractMethod::new("metadataUpdateFee()");
