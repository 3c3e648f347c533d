//! Wallet registry
//!
//! Owns every quorum wallet plus the shared account book, so one lock
//! around the registry covers both the authorization decision and the
//! custody transfer of any operation.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::custody::{AccountBook, Treasury};
use crate::ledger::proposal::{Proposal, ProposalSubmitted, TransactionExecuted};
use crate::ledger::wallet::{WalletError, WalletLedger};

/// Registry of quorum wallets sharing one account book
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct WalletRegistry {
    /// Wallets by address
    wallets: HashMap<String, WalletLedger>,
    /// Balances for every account and wallet custody pool
    book: AccountBook,
    /// Creation counter used to salt wallet addresses
    nonce: u64,
}

impl WalletRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new quorum wallet and return a snapshot of it
    pub fn create_wallet(
        &mut self,
        creator: &str,
        members: BTreeSet<String>,
        required_approvals: u64,
        label: Option<String>,
    ) -> Result<WalletLedger, WalletError> {
        let wallet = WalletLedger::new(creator, members, required_approvals, label, self.nonce);
        self.nonce += 1;

        if self.wallets.contains_key(wallet.address()) {
            return Err(WalletError::WalletAlreadyExists(
                wallet.address().to_string(),
            ));
        }

        log::info!(
            "Created wallet {} ({}, creator {})",
            wallet.address(),
            wallet.description(),
            creator
        );
        self.wallets
            .insert(wallet.address().to_string(), wallet.clone());
        Ok(wallet)
    }

    /// Look up a wallet by address
    pub fn wallet(&self, address: &str) -> Option<&WalletLedger> {
        self.wallets.get(address)
    }

    /// All wallets, ordered by address for stable output
    pub fn list_wallets(&self) -> Vec<&WalletLedger> {
        let mut wallets: Vec<&WalletLedger> = self.wallets.values().collect();
        wallets.sort_by_key(|w| w.address().to_string());
        wallets
    }

    /// Wallets the account belongs to
    pub fn wallets_for_member(&self, account: &str) -> Vec<&WalletLedger> {
        let mut wallets: Vec<&WalletLedger> = self
            .wallets
            .values()
            .filter(|w| w.is_member(account))
            .collect();
        wallets.sort_by_key(|w| w.address().to_string());
        wallets
    }

    pub fn wallet_count(&self) -> usize {
        self.wallets.len()
    }

    /// Submit a proposal on a wallet, drawing the value from the caller's
    /// account into the wallet's custody pool
    pub fn propose_transaction(
        &mut self,
        address: &str,
        caller: &str,
        beneficiary: &str,
        value: u64,
    ) -> Result<ProposalSubmitted, WalletError> {
        let wallet = self
            .wallets
            .get_mut(address)
            .ok_or_else(|| WalletError::WalletNotFound(address.to_string()))?;

        let event = wallet.propose_transaction(caller, beneficiary, value, &mut self.book)?;
        log::info!(
            "Proposal {} on wallet {}: {} -> {} ({} units)",
            event.index,
            address,
            caller,
            beneficiary,
            value
        );
        Ok(event)
    }

    /// Record the caller's approval on a proposal
    pub fn approve_transaction(
        &mut self,
        address: &str,
        caller: &str,
        index: usize,
    ) -> Result<(), WalletError> {
        self.wallet_mut(address)?.approve_transaction(caller, index)
    }

    /// Withdraw the caller's approval from a proposal
    pub fn revoke_transaction(
        &mut self,
        address: &str,
        caller: &str,
        index: usize,
    ) -> Result<(), WalletError> {
        self.wallet_mut(address)?.revoke_transaction(caller, index)
    }

    /// Execute a proposal, paying its beneficiary out of the wallet's
    /// custody pool
    pub fn execute_transaction(
        &mut self,
        address: &str,
        caller: &str,
        index: usize,
    ) -> Result<TransactionExecuted, WalletError> {
        let wallet = self
            .wallets
            .get_mut(address)
            .ok_or_else(|| WalletError::WalletNotFound(address.to_string()))?;

        let event = wallet.execute_transaction(caller, index, &mut self.book)?;
        log::info!(
            "Executed transaction {} on wallet {}: {} units to {}",
            event.index,
            address,
            event.proposal.value,
            event.proposal.beneficiary
        );
        Ok(event)
    }

    /// Number of approvals currently on a proposal
    pub fn approval_count(&self, address: &str, index: usize) -> Result<usize, WalletError> {
        self.wallet_ref(address)?.approval_count(index)
    }

    /// Look up a proposal by wallet address and index
    pub fn transaction_at(&self, address: &str, index: usize) -> Result<&Proposal, WalletError> {
        self.wallet_ref(address)?.transaction_at(index)
    }

    /// Issue new units to an account and return its new balance
    pub fn fund(&mut self, account: &str, amount: u64) -> u64 {
        let balance = self.book.issue(account, amount);
        log::info!("Funded {} with {} units (balance {})", account, amount, balance);
        balance
    }

    /// Balance of any account, wallet custody pools included
    pub fn balance_of(&self, account: &str) -> u64 {
        self.book.balance_of(account)
    }

    fn wallet_ref(&self, address: &str) -> Result<&WalletLedger, WalletError> {
        self.wallets
            .get(address)
            .ok_or_else(|| WalletError::WalletNotFound(address.to_string()))
    }

    fn wallet_mut(&mut self, address: &str) -> Result<&mut WalletLedger, WalletError> {
        self.wallets
            .get_mut(address)
            .ok_or_else(|| WalletError::WalletNotFound(address.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member_set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn registry_with_wallet() -> (WalletRegistry, String) {
        let mut registry = WalletRegistry::new();
        registry.fund("owner", 1_000);
        let wallet = registry
            .create_wallet("owner", member_set(&["alice", "bob"]), 2, None)
            .unwrap();
        let address = wallet.address().to_string();
        (registry, address)
    }

    #[test]
    fn test_create_and_lookup() {
        let (registry, address) = registry_with_wallet();

        assert_eq!(registry.wallet_count(), 1);
        let wallet = registry.wallet(&address).unwrap();
        assert_eq!(wallet.description(), "2-of-3");
        assert!(registry.wallet("3MissingAddress").is_none());
    }

    #[test]
    fn test_identical_configs_get_distinct_addresses() {
        let mut registry = WalletRegistry::new();
        let a = registry
            .create_wallet("owner", member_set(&["alice"]), 1, None)
            .unwrap();
        let b = registry
            .create_wallet("owner", member_set(&["alice"]), 1, None)
            .unwrap();

        assert_ne!(a.address(), b.address());
        assert_eq!(registry.wallet_count(), 2);
    }

    #[test]
    fn test_wallets_for_member() {
        let mut registry = WalletRegistry::new();
        registry
            .create_wallet("owner", member_set(&["alice"]), 1, None)
            .unwrap();
        registry
            .create_wallet("owner", member_set(&["bob"]), 1, None)
            .unwrap();

        assert_eq!(registry.wallets_for_member("owner").len(), 2);
        assert_eq!(registry.wallets_for_member("alice").len(), 1);
        assert_eq!(registry.wallets_for_member("mallory").len(), 0);
    }

    #[test]
    fn test_full_lifecycle_through_registry() {
        let (mut registry, address) = registry_with_wallet();

        let submitted = registry
            .propose_transaction(&address, "owner", "dave", 250)
            .unwrap();
        assert_eq!(submitted.index, 0);
        assert_eq!(registry.balance_of("owner"), 750);
        assert_eq!(registry.balance_of(&address), 250);

        registry.approve_transaction(&address, "alice", 0).unwrap();
        registry.approve_transaction(&address, "bob", 0).unwrap();
        assert_eq!(registry.approval_count(&address, 0).unwrap(), 2);

        let executed = registry
            .execute_transaction(&address, "owner", 0)
            .unwrap();
        assert!(executed.proposal.executed);
        assert_eq!(registry.balance_of("dave"), 250);
        assert_eq!(registry.balance_of(&address), 0);
    }

    #[test]
    fn test_revoke_through_registry() {
        let (mut registry, address) = registry_with_wallet();
        registry
            .propose_transaction(&address, "owner", "dave", 10)
            .unwrap();
        registry.approve_transaction(&address, "alice", 0).unwrap();

        registry.revoke_transaction(&address, "alice", 0).unwrap();
        assert_eq!(registry.approval_count(&address, 0).unwrap(), 0);
    }

    #[test]
    fn test_unknown_wallet_is_reported() {
        let mut registry = WalletRegistry::new();

        let result = registry.propose_transaction("3Nowhere", "owner", "dave", 10);
        assert!(matches!(result, Err(WalletError::WalletNotFound(_))));

        let result = registry.approve_transaction("3Nowhere", "owner", 0);
        assert!(matches!(result, Err(WalletError::WalletNotFound(_))));

        let result = registry.execute_transaction("3Nowhere", "owner", 0);
        assert!(matches!(result, Err(WalletError::WalletNotFound(_))));

        assert!(matches!(
            registry.transaction_at("3Nowhere", 0),
            Err(WalletError::WalletNotFound(_))
        ));
    }

    #[test]
    fn test_fund_accumulates() {
        let mut registry = WalletRegistry::new();
        assert_eq!(registry.fund("alice", 100), 100);
        assert_eq!(registry.fund("alice", 50), 150);
        assert_eq!(registry.balance_of("alice"), 150);
        assert_eq!(registry.balance_of("nobody"), 0);
    }

    #[test]
    fn test_wallet_errors_pass_through() {
        let (mut registry, address) = registry_with_wallet();
        registry
            .propose_transaction(&address, "owner", "dave", 10)
            .unwrap();

        let result = registry.approve_transaction(&address, "owner", 0);
        assert!(matches!(result, Err(WalletError::SelfApprovalNotAllowed)));

        let result = registry.propose_transaction(&address, "mallory", "dave", 10);
        assert!(matches!(result, Err(WalletError::NotAMember(_))));
    }
}
