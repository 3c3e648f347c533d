//! Quorum Wallet: multi-party authorization over pooled funds
//!
//! This crate provides wallets jointly controlled by a fixed member set:
//! - Any member proposes a transfer, which escrows the value in the
//!   wallet's custody pool
//! - Other members approve (or revoke their approval) while the
//!   proposal is pending
//! - Once a quorum of approvals is collected, the requester executes
//!   and the pool pays the beneficiary
//! - An append-only per-wallet ledger records every proposal
//! - JSON persistence with rotating backups
//! - REST API with WebSocket event push, plus a CLI
//!
//! # Example
//!
//! ```rust
//! use quorum_wallet::ledger::WalletRegistry;
//! use std::collections::BTreeSet;
//!
//! let mut registry = WalletRegistry::new();
//! registry.fund("owner", 1_000);
//!
//! // 2-of-3 wallet: owner plus two more members
//! let members: BTreeSet<String> = ["alice".to_string(), "bob".to_string()].into();
//! let wallet = registry.create_wallet("owner", members, 2, None).unwrap();
//! let address = wallet.address().to_string();
//!
//! // owner proposes, alice and bob approve, owner executes
//! let submitted = registry
//!     .propose_transaction(&address, "owner", "dave", 400)
//!     .unwrap();
//! registry
//!     .approve_transaction(&address, "alice", submitted.index)
//!     .unwrap();
//! registry
//!     .approve_transaction(&address, "bob", submitted.index)
//!     .unwrap();
//! registry
//!     .execute_transaction(&address, "owner", submitted.index)
//!     .unwrap();
//!
//! assert_eq!(registry.balance_of("dave"), 400);
//! ```

pub mod api;
pub mod cli;
pub mod crypto;
pub mod custody;
pub mod ledger;
pub mod storage;

// Re-export commonly used types
pub use api::{create_router, ApiState};
pub use custody::{AccountBook, CustodyError, Treasury};
pub use ledger::{
    Proposal, ProposalSubmitted, TransactionExecuted, WalletError, WalletLedger, WalletRegistry,
};
pub use storage::{Storage, StorageConfig, StorageError};
