//! Value custody for quorum wallets
//!
//! The authorization engine never touches balances directly: it moves
//! value through the [`Treasury`] trait, so the approval logic can be
//! tested against mock treasuries and backed by any real settlement
//! layer. [`AccountBook`] is the in-memory implementation used by the
//! service.

pub mod treasury;

pub use treasury::{AccountBook, CustodyError, Treasury};
