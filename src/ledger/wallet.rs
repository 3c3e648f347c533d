//! Quorum wallet core
//!
//! `WalletLedger` pairs a fixed member set and approval threshold with an
//! append-only log of transaction proposals. All four mutating operations
//! (propose, approve, revoke, execute) require the caller to be a member
//! and enforce their remaining preconditions in a fixed order, so a given
//! bad call always fails with the same error.

use chrono::{DateTime, Utc};
use ripemd::Ripemd160;
use serde::{Deserialize, Serialize};
use sha2::Digest;
use std::collections::BTreeSet;
use thiserror::Error;

use crate::crypto::{double_sha256, sha256};
use crate::custody::{CustodyError, Treasury};
use crate::ledger::proposal::{Proposal, ProposalSubmitted, TransactionExecuted};

/// Errors from wallet operations
#[derive(Error, Debug)]
pub enum WalletError {
    #[error("Not a member: {0}")]
    NotAMember(String),

    #[error("Only the requester may execute their proposal")]
    NotAllowed,

    #[error("Not enough approvals: have {have}, need {need}")]
    NotEnoughApprovals { have: usize, need: u64 },

    #[error("Transaction not found: index {0}")]
    TransactionNotFound(usize),

    #[error("Transaction already executed: index {0}")]
    TransactionAlreadyExecuted(usize),

    #[error("Transaction already approved by {0}")]
    TransactionAlreadyApproved(String),

    #[error("Transaction not approved by {0}")]
    TransactionNotApproved(String),

    #[error("Requester cannot approve their own proposal")]
    SelfApprovalNotAllowed,

    #[error("Wallet not found: {0}")]
    WalletNotFound(String),

    #[error("Wallet already exists: {0}")]
    WalletAlreadyExists(String),

    #[error("Custody error: {0}")]
    Custody(#[from] CustodyError),
}

/// A quorum-controlled wallet
///
/// The member set and threshold are fixed at creation. The threshold is
/// not validated against the member count: a wallet whose quorum exceeds
/// its membership is constructible and simply can never execute.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WalletLedger {
    /// P2SH-style address; also names the wallet's custody pool account
    address: String,
    /// Account that created the wallet (always a member)
    creator: String,
    /// Authorized members
    members: BTreeSet<String>,
    /// Distinct approvals required before a proposal may execute
    required_approvals: u64,
    /// Optional human-readable label
    label: Option<String>,
    /// Creation timestamp
    created_at: DateTime<Utc>,
    /// Append-only proposal log, indexed by creation order
    proposals: Vec<Proposal>,
}

impl WalletLedger {
    /// Create a new wallet
    ///
    /// The creator is added to the member set whether or not it was
    /// listed. `nonce` salts the address so identical configurations
    /// created side by side still get distinct addresses.
    pub fn new(
        creator: &str,
        members: BTreeSet<String>,
        required_approvals: u64,
        label: Option<String>,
        nonce: u64,
    ) -> Self {
        let mut members = members;
        members.insert(creator.to_string());
        let address = derive_address(&members, required_approvals, nonce);

        Self {
            address,
            creator: creator.to_string(),
            members,
            required_approvals,
            label,
            created_at: Utc::now(),
            proposals: Vec::new(),
        }
    }

    /// Submit a new transaction proposal
    ///
    /// Moves `value` from the caller's account into the wallet's custody
    /// pool, then appends the proposal. A failed transfer leaves no
    /// proposal behind. Returns the submission notification carrying the
    /// new proposal's index.
    pub fn propose_transaction(
        &mut self,
        caller: &str,
        beneficiary: &str,
        value: u64,
        treasury: &mut dyn Treasury,
    ) -> Result<ProposalSubmitted, WalletError> {
        self.ensure_member(caller)?;

        treasury.move_value(caller, &self.address, value)?;

        self.proposals.push(Proposal::new(caller, beneficiary, value));
        let index = self.proposals.len() - 1;

        Ok(ProposalSubmitted {
            wallet: self.address.clone(),
            index,
            proposal: self.proposals[index].clone(),
            timestamp: Utc::now(),
        })
    }

    /// Record the caller's approval on a pending proposal
    pub fn approve_transaction(&mut self, caller: &str, index: usize) -> Result<(), WalletError> {
        self.ensure_member(caller)?;

        let proposal = self
            .proposals
            .get_mut(index)
            .ok_or(WalletError::TransactionNotFound(index))?;

        if proposal.requester == caller {
            return Err(WalletError::SelfApprovalNotAllowed);
        }
        if proposal.approvals.contains(caller) {
            return Err(WalletError::TransactionAlreadyApproved(caller.to_string()));
        }
        if proposal.executed {
            return Err(WalletError::TransactionAlreadyExecuted(index));
        }

        proposal.approvals.insert(caller.to_string());
        Ok(())
    }

    /// Withdraw the caller's prior approval from a pending proposal
    pub fn revoke_transaction(&mut self, caller: &str, index: usize) -> Result<(), WalletError> {
        self.ensure_member(caller)?;

        let proposal = self
            .proposals
            .get_mut(index)
            .ok_or(WalletError::TransactionNotFound(index))?;

        if proposal.executed {
            return Err(WalletError::TransactionAlreadyExecuted(index));
        }
        if !proposal.approvals.contains(caller) {
            return Err(WalletError::TransactionNotApproved(caller.to_string()));
        }

        proposal.approvals.remove(caller);
        Ok(())
    }

    /// Execute a proposal that has reached quorum
    ///
    /// Only the requester may execute. The custody transfer runs before
    /// the proposal is marked executed, so a rejected transfer leaves the
    /// proposal pending and retryable.
    pub fn execute_transaction(
        &mut self,
        caller: &str,
        index: usize,
        treasury: &mut dyn Treasury,
    ) -> Result<TransactionExecuted, WalletError> {
        self.ensure_member(caller)?;

        let proposal = self
            .proposals
            .get_mut(index)
            .ok_or(WalletError::TransactionNotFound(index))?;

        if proposal.requester != caller {
            return Err(WalletError::NotAllowed);
        }
        let have = proposal.approvals.len();
        if (have as u64) < self.required_approvals {
            return Err(WalletError::NotEnoughApprovals {
                have,
                need: self.required_approvals,
            });
        }
        if proposal.executed {
            return Err(WalletError::TransactionAlreadyExecuted(index));
        }

        let beneficiary = proposal.beneficiary.clone();
        let value = proposal.value;
        treasury.move_value(&self.address, &beneficiary, value)?;

        proposal.executed = true;

        Ok(TransactionExecuted {
            wallet: self.address.clone(),
            index,
            proposal: self.proposals[index].clone(),
            timestamp: Utc::now(),
        })
    }

    /// Number of approvals currently on a proposal
    pub fn approval_count(&self, index: usize) -> Result<usize, WalletError> {
        Ok(self.transaction_at(index)?.approval_count())
    }

    /// Look up a proposal by index
    pub fn transaction_at(&self, index: usize) -> Result<&Proposal, WalletError> {
        self.proposals
            .get(index)
            .ok_or(WalletError::TransactionNotFound(index))
    }

    /// All proposals in submission order
    pub fn transactions(&self) -> &[Proposal] {
        &self.proposals
    }

    /// Total number of proposals ever submitted
    pub fn transaction_count(&self) -> usize {
        self.proposals.len()
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn creator(&self) -> &str {
        &self.creator
    }

    pub fn is_member(&self, account: &str) -> bool {
        self.members.contains(account)
    }

    pub fn members(&self) -> &BTreeSet<String> {
        &self.members
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn required_approvals(&self) -> u64 {
        self.required_approvals
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Human-readable quorum description, e.g. "2-of-3"
    pub fn description(&self) -> String {
        format!("{}-of-{}", self.required_approvals, self.members.len())
    }

    fn ensure_member(&self, caller: &str) -> Result<(), WalletError> {
        if !self.members.contains(caller) {
            return Err(WalletError::NotAMember(caller.to_string()));
        }
        Ok(())
    }
}

/// Derive a deterministic P2SH-style wallet address
///
/// Hashes the threshold, nonce, and member set (BTreeSet iteration is
/// already sorted) through SHA-256 then RIPEMD-160, and encodes the
/// digest with version byte 0x05 and a double-SHA256 checksum. Addresses
/// start with '3'.
fn derive_address(members: &BTreeSet<String>, required_approvals: u64, nonce: u64) -> String {
    let mut script_data = Vec::new();
    script_data.extend_from_slice(&required_approvals.to_be_bytes());
    script_data.extend_from_slice(&nonce.to_be_bytes());
    for member in members {
        script_data.extend_from_slice(member.as_bytes());
        // Separator so adjacent names cannot alias
        script_data.push(0);
    }

    let sha = sha256(&script_data);
    let mut hasher = Ripemd160::new();
    hasher.update(&sha);
    let script_hash = hasher.finalize();

    let mut payload = vec![0x05];
    payload.extend_from_slice(&script_hash);

    let checksum = double_sha256(&payload);
    payload.extend_from_slice(&checksum[..4]);

    bs58::encode(payload).into_string()
}
