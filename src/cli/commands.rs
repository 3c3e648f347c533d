//! CLI commands for the wallet registry
//!
//! Implements all command handlers for the CLI interface.

use crate::ledger::WalletRegistry;
use crate::storage::{Storage, StorageConfig};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Application state
pub struct AppState {
    pub registry: WalletRegistry,
    pub storage: Storage,
}

impl AppState {
    /// Initialize application state
    pub fn new(data_dir: PathBuf) -> CliResult<Self> {
        let storage_config = StorageConfig {
            data_dir,
            ..Default::default()
        };
        let storage = Storage::new(storage_config)?;

        // Load or create registry
        let registry = if storage.exists() {
            println!("📂 Loading existing registry...");
            storage.load()?
        } else {
            println!("🆕 Creating new registry...");
            let registry = WalletRegistry::new();
            storage.save(&registry)?;
            registry
        };

        Ok(Self { registry, storage })
    }

    /// Save the current state
    pub fn save(&self) -> CliResult<()> {
        self.storage.save(&self.registry)?;
        Ok(())
    }
}

/// Initialize a new wallet registry
pub fn cmd_init(data_dir: &PathBuf, force: bool) -> CliResult<()> {
    let storage_config = StorageConfig {
        data_dir: data_dir.clone(),
        ..Default::default()
    };
    let storage = Storage::new(storage_config)?;

    if storage.exists() {
        if !force {
            println!("⚠️  Registry already exists at {:?}", data_dir);
            println!("   Use --force to reinitialize (this will delete existing data)");
            return Ok(());
        }
        storage.delete()?;
    }

    let registry = WalletRegistry::new();
    storage.save(&registry)?;

    println!("✅ Registry initialized!");
    println!("   📁 Data directory: {:?}", data_dir);

    Ok(())
}

/// Create a new quorum wallet
pub fn cmd_wallet_create(
    state: &mut AppState,
    creator: &str,
    members: &[String],
    required_approvals: u64,
    label: Option<&str>,
) -> CliResult<()> {
    let members: BTreeSet<String> = members.iter().map(|m| m.trim().to_string()).collect();

    let wallet = state.registry.create_wallet(
        creator,
        members,
        required_approvals,
        label.map(|l| l.to_string()),
    )?;
    state.save()?;

    println!("🔐 New quorum wallet created!");
    println!("   📍 Address: {}", wallet.address());
    println!(
        "   👥 Members: {}",
        wallet.members().iter().cloned().collect::<Vec<_>>().join(", ")
    );
    println!("   🔏 Quorum: {}", wallet.description());
    if let Some(l) = wallet.label() {
        println!("   🏷️  Label: {}", l);
    }

    Ok(())
}

/// List wallets, optionally only those an account belongs to
pub fn cmd_wallet_list(state: &AppState, member: Option<&str>) -> CliResult<()> {
    let wallets = match member {
        Some(m) => state.registry.wallets_for_member(m),
        None => state.registry.list_wallets(),
    };

    if wallets.is_empty() {
        println!("📭 No wallets found. Create one with: qwallet wallet create");
        return Ok(());
    }

    println!("📋 Wallets:");
    for wallet in wallets {
        let label = wallet.label().unwrap_or("-");
        let pool = state.registry.balance_of(wallet.address());
        println!(
            "   {} ({}) - {} | {} units pooled | {} proposals",
            wallet.address(),
            label,
            wallet.description(),
            pool,
            wallet.transaction_count()
        );
    }

    Ok(())
}

/// Show wallet details
pub fn cmd_wallet_show(state: &AppState, address: &str) -> CliResult<()> {
    let wallet = match state.registry.wallet(address) {
        Some(w) => w,
        None => {
            println!("❌ Wallet not found: {}", address);
            return Ok(());
        }
    };

    println!("🔐 Wallet {}", wallet.address());
    println!("   ├─ Creator: {}", wallet.creator());
    println!("   ├─ Quorum: {}", wallet.description());
    println!(
        "   ├─ Members: {}",
        wallet.members().iter().cloned().collect::<Vec<_>>().join(", ")
    );
    if let Some(l) = wallet.label() {
        println!("   ├─ Label: {}", l);
    }
    println!(
        "   ├─ Custody pool: {} units",
        state.registry.balance_of(address)
    );
    println!("   └─ Proposals: {}", wallet.transaction_count());

    Ok(())
}

/// Propose a transaction
pub fn cmd_propose(
    state: &mut AppState,
    wallet: &str,
    caller: &str,
    beneficiary: &str,
    value: u64,
) -> CliResult<()> {
    let event = state
        .registry
        .propose_transaction(wallet, caller, beneficiary, value)?;
    state.save()?;

    println!("📤 Proposal submitted:");
    println!("   Wallet: {}", event.wallet);
    println!("   Index: {}", event.index);
    println!("   Beneficiary: {}", event.proposal.beneficiary);
    println!("   Value: {} units", event.proposal.value);
    println!("\n   Collect approvals, then execute with:");
    println!(
        "   qwallet tx execute --wallet {} --index {} --caller {}",
        event.wallet, event.index, caller
    );

    Ok(())
}

/// Approve a pending transaction
pub fn cmd_approve(state: &mut AppState, wallet: &str, caller: &str, index: usize) -> CliResult<()> {
    state.registry.approve_transaction(wallet, caller, index)?;
    state.save()?;

    println!("✍️  Approval recorded on transaction {}", index);
    if let Some(w) = state.registry.wallet(wallet) {
        let proposal = w.transaction_at(index)?;
        println!(
            "   Approvals: {}/{} required",
            proposal.approval_count(),
            w.required_approvals()
        );
        if proposal.is_ready(w.required_approvals()) {
            println!("   ✅ Quorum reached! The requester can now execute.");
        }
    }

    Ok(())
}

/// Revoke a prior approval
pub fn cmd_revoke(state: &mut AppState, wallet: &str, caller: &str, index: usize) -> CliResult<()> {
    state.registry.revoke_transaction(wallet, caller, index)?;
    state.save()?;

    println!("↩️  Approval withdrawn from transaction {}", index);
    let count = state.registry.approval_count(wallet, index)?;
    println!("   Approvals remaining: {}", count);

    Ok(())
}

/// Execute a transaction that has reached quorum
pub fn cmd_execute(state: &mut AppState, wallet: &str, caller: &str, index: usize) -> CliResult<()> {
    let event = state.registry.execute_transaction(wallet, caller, index)?;
    state.save()?;

    println!("✅ Transaction {} executed!", event.index);
    println!(
        "   {} units paid to {}",
        event.proposal.value, event.proposal.beneficiary
    );
    println!(
        "   Beneficiary balance: {} units",
        state.registry.balance_of(&event.proposal.beneficiary)
    );

    Ok(())
}

/// List a wallet's transactions
pub fn cmd_tx_list(state: &AppState, address: &str) -> CliResult<()> {
    let wallet = match state.registry.wallet(address) {
        Some(w) => w,
        None => {
            println!("❌ Wallet not found: {}", address);
            return Ok(());
        }
    };

    if wallet.transaction_count() == 0 {
        println!("📭 No proposals yet. Submit one with: qwallet tx propose");
        return Ok(());
    }

    println!("📋 Proposals for {} ({}):", address, wallet.description());
    for (index, proposal) in wallet.transactions().iter().enumerate() {
        let status = if proposal.executed {
            "executed"
        } else if proposal.is_ready(wallet.required_approvals()) {
            "ready"
        } else {
            "pending"
        };
        println!(
            "   #{} | {} -> {} | {} units | {}/{} approvals | {}",
            index,
            proposal.requester,
            proposal.beneficiary,
            proposal.value,
            proposal.approval_count(),
            wallet.required_approvals(),
            status
        );
    }

    Ok(())
}

/// Show one transaction
pub fn cmd_tx_show(state: &AppState, address: &str, index: usize) -> CliResult<()> {
    let wallet = match state.registry.wallet(address) {
        Some(w) => w,
        None => {
            println!("❌ Wallet not found: {}", address);
            return Ok(());
        }
    };
    let proposal = wallet.transaction_at(index)?;

    let status = if proposal.executed {
        "executed"
    } else if proposal.is_ready(wallet.required_approvals()) {
        "ready to execute"
    } else {
        "awaiting approvals"
    };

    println!("📄 Transaction #{} on {}", index, address);
    println!("   ├─ Requester: {}", proposal.requester);
    println!("   ├─ Beneficiary: {}", proposal.beneficiary);
    println!("   ├─ Value: {} units", proposal.value);
    println!(
        "   ├─ Approvals: {}/{}",
        proposal.approval_count(),
        wallet.required_approvals()
    );
    if proposal.approval_count() > 0 {
        println!("   ├─ Approved by: {}", proposal.approvers().join(", "));
    }
    println!(
        "   ├─ Created: {}",
        proposal.created_at.format("%Y-%m-%d %H:%M:%S")
    );
    println!("   └─ Status: {}", status);

    Ok(())
}

/// Issue units to an account
pub fn cmd_fund(state: &mut AppState, account: &str, amount: u64) -> CliResult<()> {
    let balance = state.registry.fund(account, amount);
    state.save()?;

    println!("💰 Funded {} with {} units", account, amount);
    println!("   New balance: {} units", balance);

    Ok(())
}

/// Show an account balance
pub fn cmd_balance(state: &AppState, account: &str) -> CliResult<()> {
    println!(
        "💰 Balance for {}: {} units",
        account,
        state.registry.balance_of(account)
    );

    Ok(())
}
