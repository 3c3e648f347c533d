//! REST API module
//!
//! Provides HTTP REST API for programmatic access to the wallet registry.
//!
//! # Endpoints
//!
//! ## Wallets
//! - `GET /api/wallets` - List wallets (optional `?member=` filter)
//! - `POST /api/wallets` - Create a quorum wallet
//! - `GET /api/wallets/:address` - Get wallet details
//! - `GET /api/wallets/:address/balance` - Custody pool balance
//!
//! ## Transactions
//! - `GET /api/wallets/:address/transactions` - List proposals
//! - `POST /api/wallets/:address/transactions` - Propose a transaction
//! - `GET /api/wallets/:address/transactions/:index` - Get one proposal
//! - `POST /api/wallets/:address/transactions/:index/approve` - Approve
//! - `POST /api/wallets/:address/transactions/:index/revoke` - Revoke approval
//! - `POST /api/wallets/:address/transactions/:index/execute` - Execute
//! - `GET /api/wallets/:address/transactions/:index/approvals` - List approvers
//!
//! ## Accounts
//! - `POST /api/accounts/:account/fund` - Issue units to an account
//! - `GET /api/accounts/:account/balance` - Get an account balance
//!
//! ## WebSocket
//! - `GET /ws` - Real-time updates (ProposalSubmitted, TransactionExecuted)

pub mod handlers;
pub mod routes;
pub mod websocket;

pub use handlers::ApiState;
pub use routes::create_router;
pub use websocket::WsBroadcaster;
