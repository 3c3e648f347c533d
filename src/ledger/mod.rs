//! Quorum wallet ledger
//!
//! The authorization core: wallets with fixed member sets and approval
//! thresholds, append-only proposal logs, and the registry that manages
//! them against a shared account book.
//!
//! ```
//! use quorum_wallet::ledger::WalletRegistry;
//! use std::collections::BTreeSet;
//!
//! let mut registry = WalletRegistry::new();
//! registry.fund("owner", 100);
//!
//! let members: BTreeSet<String> = ["alice".to_string(), "bob".to_string()].into();
//! let wallet = registry.create_wallet("owner", members, 2, None).unwrap();
//! let address = wallet.address().to_string();
//!
//! registry.propose_transaction(&address, "owner", "dave", 40).unwrap();
//! registry.approve_transaction(&address, "alice", 0).unwrap();
//! registry.approve_transaction(&address, "bob", 0).unwrap();
//! registry.execute_transaction(&address, "owner", 0).unwrap();
//!
//! assert_eq!(registry.balance_of("dave"), 40);
//! ```

pub mod proposal;
pub mod registry;
pub mod wallet;

pub use proposal::{Proposal, ProposalSubmitted, TransactionExecuted};
pub use registry::WalletRegistry;
pub use wallet::{WalletError, WalletLedger};
