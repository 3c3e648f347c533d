//! Transaction proposals and approval tracking
//!
//! A proposal is an entry in a wallet's append-only ledger: who asked,
//! who gets paid, how much, which members have approved, and whether it
//! has been executed. Entries are never removed or reordered.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A proposed transfer of value out of wallet custody
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Proposal {
    /// Account that created the proposal
    pub requester: String,
    /// Account to receive the funds on execution
    pub beneficiary: String,
    /// Amount of the fungible unit attached to the proposal
    pub value: u64,
    /// Members who have approved (set semantics, no ordering contract)
    pub approvals: BTreeSet<String>,
    /// Set once on successful execution; never reverts to false
    pub executed: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Proposal {
    /// Create a fresh proposal with no approvals
    pub(crate) fn new(requester: &str, beneficiary: &str, value: u64) -> Self {
        Self {
            requester: requester.to_string(),
            beneficiary: beneficiary.to_string(),
            value,
            approvals: BTreeSet::new(),
            executed: false,
            created_at: Utc::now(),
        }
    }

    /// Number of distinct member approvals collected
    pub fn approval_count(&self) -> usize {
        self.approvals.len()
    }

    /// Check whether an account has approved
    pub fn is_approved_by(&self, account: &str) -> bool {
        self.approvals.contains(account)
    }

    /// Accounts that have approved
    pub fn approvers(&self) -> Vec<&str> {
        self.approvals.iter().map(|a| a.as_str()).collect()
    }

    /// Whether quorum is reached and execution is still pending
    ///
    /// Display helper only: executing additionally requires the caller
    /// to be the requester.
    pub fn is_ready(&self, required_approvals: u64) -> bool {
        !self.executed && self.approvals.len() as u64 >= required_approvals
    }
}

/// Notification emitted when a proposal is appended to the ledger
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProposalSubmitted {
    /// Address of the wallet the proposal belongs to
    pub wallet: String,
    /// Index of the proposal in the wallet's ledger
    pub index: usize,
    /// Snapshot of the proposal at submission time
    pub proposal: Proposal,
    pub timestamp: DateTime<Utc>,
}

/// Notification emitted when a proposal's transfer has settled
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransactionExecuted {
    /// Address of the wallet the proposal belongs to
    pub wallet: String,
    /// Index of the executed proposal
    pub index: usize,
    /// Final snapshot of the proposal (`executed` is true)
    pub proposal: Proposal,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_proposal_state() {
        let proposal = Proposal::new("owner", "dave", 50);

        assert_eq!(proposal.requester, "owner");
        assert_eq!(proposal.beneficiary, "dave");
        assert_eq!(proposal.value, 50);
        assert_eq!(proposal.approval_count(), 0);
        assert!(!proposal.executed);
    }

    #[test]
    fn test_is_ready() {
        let mut proposal = Proposal::new("owner", "dave", 50);
        assert!(!proposal.is_ready(1));
        assert!(proposal.is_ready(0), "zero quorum is trivially met");

        proposal.approvals.insert("alice".to_string());
        assert!(proposal.is_ready(1));
        assert!(!proposal.is_ready(2));

        proposal.executed = true;
        assert!(!proposal.is_ready(1), "executed proposals are never ready");
    }

    #[test]
    fn test_approval_queries() {
        let mut proposal = Proposal::new("owner", "dave", 50);
        proposal.approvals.insert("bob".to_string());
        proposal.approvals.insert("alice".to_string());

        assert!(proposal.is_approved_by("alice"));
        assert!(!proposal.is_approved_by("owner"));
        assert_eq!(proposal.approval_count(), 2);
        assert_eq!(proposal.approvers(), vec!["alice", "bob"]);
    }
}
