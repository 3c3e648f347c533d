//! Quorum Wallet CLI Application
//!
//! A command-line interface for managing quorum wallets.

use clap::{Parser, Subcommand};
use quorum_wallet::api::{create_router, ApiState, WsBroadcaster};
use quorum_wallet::cli::{self, AppState};
use quorum_wallet::ledger::WalletRegistry;
use quorum_wallet::storage::{Storage, StorageConfig};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Parser)]
#[command(name = "qwallet")]
#[command(author = "Darshan")]
#[command(version = "0.1.0")]
#[command(about = "Quorum wallets for shared custody of pooled funds", long_about = None)]
struct Cli {
    /// Data directory for registry storage
    #[arg(short, long, default_value = ".qwallet_data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new wallet registry
    Init {
        /// Reinitialize even if a registry already exists
        #[arg(long)]
        force: bool,
    },

    /// Wallet operations
    Wallet {
        #[command(subcommand)]
        action: WalletCommands,
    },

    /// Transaction proposal operations
    Tx {
        #[command(subcommand)]
        action: TxCommands,
    },

    /// Account operations
    Account {
        #[command(subcommand)]
        action: AccountCommands,
    },

    /// Start the REST API server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
}

#[derive(Subcommand)]
enum WalletCommands {
    /// Create a new quorum wallet
    Create {
        /// Creating account (always becomes a member)
        #[arg(short, long)]
        creator: String,

        /// Member accounts (comma-separated)
        #[arg(short, long)]
        members: String,

        /// Approvals required to execute a proposal
        #[arg(short, long)]
        required: u64,

        /// Optional label for the wallet
        #[arg(short, long)]
        label: Option<String>,
    },

    /// List wallets
    List {
        /// Only wallets this account belongs to
        #[arg(long)]
        member: Option<String>,
    },

    /// Show wallet details
    Show {
        /// Wallet address
        #[arg(short, long)]
        address: String,
    },
}

#[derive(Subcommand)]
enum TxCommands {
    /// Propose a transaction
    Propose {
        /// Wallet address
        #[arg(short, long)]
        wallet: String,

        /// Acting member
        #[arg(short, long)]
        caller: String,

        /// Beneficiary account
        #[arg(short, long)]
        to: String,

        /// Amount to transfer on execution
        #[arg(short, long)]
        value: u64,
    },

    /// Approve a pending transaction
    Approve {
        /// Wallet address
        #[arg(short, long)]
        wallet: String,

        /// Acting member
        #[arg(short, long)]
        caller: String,

        /// Transaction index
        #[arg(short, long)]
        index: usize,
    },

    /// Revoke a prior approval
    Revoke {
        /// Wallet address
        #[arg(short, long)]
        wallet: String,

        /// Acting member
        #[arg(short, long)]
        caller: String,

        /// Transaction index
        #[arg(short, long)]
        index: usize,
    },

    /// Execute a transaction that reached quorum
    Execute {
        /// Wallet address
        #[arg(short, long)]
        wallet: String,

        /// Acting member (must be the requester)
        #[arg(short, long)]
        caller: String,

        /// Transaction index
        #[arg(short, long)]
        index: usize,
    },

    /// List a wallet's transactions
    List {
        /// Wallet address
        #[arg(short, long)]
        wallet: String,
    },

    /// Show one transaction
    Show {
        /// Wallet address
        #[arg(short, long)]
        wallet: String,

        /// Transaction index
        #[arg(short, long)]
        index: usize,
    },
}

#[derive(Subcommand)]
enum AccountCommands {
    /// Issue units to an account
    Fund {
        /// Account name
        #[arg(short, long)]
        account: String,

        /// Amount of units to issue
        #[arg(long)]
        amount: u64,
    },

    /// Show an account balance
    Balance {
        /// Account name
        #[arg(short, long)]
        account: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Handle init command separately (doesn't need full state)
    if let Commands::Init { force } = &cli.command {
        return cli::cmd_init(&cli.data_dir, *force);
    }

    // Handle the server with a tokio runtime
    if let Commands::Serve { port } = &cli.command {
        return run_server(*port, &cli.data_dir);
    }

    // Initialize application state
    let mut state = AppState::new(cli.data_dir.clone())?;

    // Process commands
    match cli.command {
        Commands::Init { .. } => unreachable!(),
        Commands::Serve { .. } => unreachable!(),

        Commands::Wallet { action } => match action {
            WalletCommands::Create {
                creator,
                members,
                required,
                label,
            } => {
                let members: Vec<String> = members
                    .split(',')
                    .map(|m| m.trim().to_string())
                    .filter(|m| !m.is_empty())
                    .collect();
                cli::cmd_wallet_create(&mut state, &creator, &members, required, label.as_deref())?;
            }
            WalletCommands::List { member } => {
                cli::cmd_wallet_list(&state, member.as_deref())?;
            }
            WalletCommands::Show { address } => {
                cli::cmd_wallet_show(&state, &address)?;
            }
        },

        Commands::Tx { action } => match action {
            TxCommands::Propose {
                wallet,
                caller,
                to,
                value,
            } => {
                cli::cmd_propose(&mut state, &wallet, &caller, &to, value)?;
            }
            TxCommands::Approve {
                wallet,
                caller,
                index,
            } => {
                cli::cmd_approve(&mut state, &wallet, &caller, index)?;
            }
            TxCommands::Revoke {
                wallet,
                caller,
                index,
            } => {
                cli::cmd_revoke(&mut state, &wallet, &caller, index)?;
            }
            TxCommands::Execute {
                wallet,
                caller,
                index,
            } => {
                cli::cmd_execute(&mut state, &wallet, &caller, index)?;
            }
            TxCommands::List { wallet } => {
                cli::cmd_tx_list(&state, &wallet)?;
            }
            TxCommands::Show { wallet, index } => {
                cli::cmd_tx_show(&state, &wallet, index)?;
            }
        },

        Commands::Account { action } => match action {
            AccountCommands::Fund { account, amount } => {
                cli::cmd_fund(&mut state, &account, amount)?;
            }
            AccountCommands::Balance { account } => {
                cli::cmd_balance(&state, &account)?;
            }
        },
    }

    Ok(())
}

fn run_server(port: u16, data_dir: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;

    rt.block_on(async {
        // Initialize storage
        let storage_config = StorageConfig {
            data_dir: data_dir.clone(),
            ..Default::default()
        };
        let storage = Arc::new(Storage::new(storage_config)?);

        // Load or create the registry
        let registry = if storage.exists() {
            println!("📂 Loading existing registry...");
            Arc::new(RwLock::new(storage.load()?))
        } else {
            println!("🆕 Creating new registry...");
            let registry = WalletRegistry::new();
            storage.save(&registry)?;
            Arc::new(RwLock::new(registry))
        };

        // Create WebSocket broadcaster
        let ws_broadcaster = Arc::new(WsBroadcaster::new());

        // Create API state
        let state = ApiState {
            registry: registry.clone(),
            storage: storage.clone(),
            ws_broadcaster,
        };

        // Clone state for shutdown handler
        let shutdown_state = state.clone();

        // Create router
        let app = create_router(state);

        let addr = format!("0.0.0.0:{}", port);
        println!("🚀 REST API server starting on http://localhost:{}", port);
        println!();
        println!("📖 Available endpoints:");
        println!("   GET  /health                                          - Health check");
        println!("   GET  /ws                                              - WebSocket updates");
        println!("   GET  /api/wallets                                     - List wallets");
        println!("   POST /api/wallets                                     - Create wallet");
        println!("   GET  /api/wallets/{{addr}}                              - Wallet details");
        println!("   GET  /api/wallets/{{addr}}/balance                      - Custody pool balance");
        println!("   GET  /api/wallets/{{addr}}/transactions                 - List proposals");
        println!("   POST /api/wallets/{{addr}}/transactions                 - Propose transaction");
        println!("   GET  /api/wallets/{{addr}}/transactions/{{i}}             - Get proposal");
        println!("   POST /api/wallets/{{addr}}/transactions/{{i}}/approve     - Approve");
        println!("   POST /api/wallets/{{addr}}/transactions/{{i}}/revoke      - Revoke approval");
        println!("   POST /api/wallets/{{addr}}/transactions/{{i}}/execute     - Execute");
        println!("   GET  /api/wallets/{{addr}}/transactions/{{i}}/approvals   - List approvers");
        println!("   POST /api/accounts/{{name}}/fund                        - Fund account");
        println!("   GET  /api/accounts/{{name}}/balance                     - Account balance");
        println!();

        // Handle Ctrl+C with graceful shutdown
        tokio::spawn(async move {
            tokio::signal::ctrl_c().await.ok();
            println!("\n📴 Shutting down API server...");

            // Save the registry before exit
            println!("💾 Saving data...");
            let registry = shutdown_state.registry.read().await;
            let _ = shutdown_state.storage.save(&registry);

            println!("✅ Data saved successfully!");
            std::process::exit(0);
        });

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        axum::serve(listener, app).await?;

        Ok::<(), Box<dyn std::error::Error>>(())
    })?;

    Ok(())
}
