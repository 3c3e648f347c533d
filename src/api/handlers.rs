//! REST API handlers for wallet operations

use crate::api::websocket::{WsBroadcaster, WsEvent};
use crate::ledger::{Proposal, WalletError, WalletLedger, WalletRegistry};
use crate::storage::Storage;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared application state for API handlers
#[derive(Clone)]
pub struct ApiState {
    pub registry: Arc<RwLock<WalletRegistry>>,
    pub storage: Arc<Storage>,
    pub ws_broadcaster: Arc<WsBroadcaster>,
}

// ============================================================================
// Response Types
// ============================================================================

#[derive(Serialize)]
pub struct WalletInfo {
    pub address: String,
    pub creator: String,
    pub members: Vec<String>,
    pub member_count: usize,
    pub required_approvals: u64,
    pub label: Option<String>,
    pub description: String,
    pub created_at: String,
}

impl From<&WalletLedger> for WalletInfo {
    fn from(wallet: &WalletLedger) -> Self {
        Self {
            address: wallet.address().to_string(),
            creator: wallet.creator().to_string(),
            members: wallet.members().iter().cloned().collect(),
            member_count: wallet.member_count(),
            required_approvals: wallet.required_approvals(),
            label: wallet.label().map(|l| l.to_string()),
            description: wallet.description(),
            created_at: wallet.created_at().to_rfc3339(),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct ProposalInfo {
    pub wallet: String,
    pub index: usize,
    pub requester: String,
    pub beneficiary: String,
    pub value: u64,
    pub approvals: Vec<String>,
    pub approval_count: usize,
    pub required_approvals: u64,
    pub executed: bool,
    pub ready: bool,
    pub created_at: String,
}

impl ProposalInfo {
    fn new(wallet: &WalletLedger, index: usize, proposal: &Proposal) -> Self {
        Self {
            wallet: wallet.address().to_string(),
            index,
            requester: proposal.requester.clone(),
            beneficiary: proposal.beneficiary.clone(),
            value: proposal.value,
            approvals: proposal.approvers().iter().map(|s| s.to_string()).collect(),
            approval_count: proposal.approval_count(),
            required_approvals: wallet.required_approvals(),
            executed: proposal.executed,
            ready: proposal.is_ready(wallet.required_approvals()),
            created_at: proposal.created_at.to_rfc3339(),
        }
    }
}

#[derive(Serialize)]
pub struct ApprovalsResponse {
    pub wallet: String,
    pub index: usize,
    pub approvals: Vec<String>,
    pub approval_count: usize,
}

#[derive(Serialize)]
pub struct BalanceResponse {
    pub account: String,
    pub balance: u64,
}

#[derive(Serialize)]
pub struct ApiError {
    pub error: String,
}

// ============================================================================
// Request Types
// ============================================================================

#[derive(Deserialize)]
pub struct CreateWalletRequest {
    pub creator: String,
    pub members: Vec<String>,
    pub required_approvals: u64,
    pub label: Option<String>,
}

#[derive(Deserialize)]
pub struct ProposeRequest {
    pub caller: String,
    pub beneficiary: String,
    pub value: u64,
}

#[derive(Deserialize)]
pub struct CallerRequest {
    pub caller: String,
}

#[derive(Deserialize)]
pub struct FundRequest {
    pub amount: u64,
}

#[derive(Deserialize)]
pub struct ListWalletsQuery {
    pub member: Option<String>,
}

// ============================================================================
// Error Mapping
// ============================================================================

/// Map a wallet error to an HTTP status and JSON body
fn wallet_error(err: WalletError) -> (StatusCode, Json<ApiError>) {
    let status = match err {
        WalletError::WalletNotFound(_) | WalletError::TransactionNotFound(_) => {
            StatusCode::NOT_FOUND
        }
        _ => StatusCode::BAD_REQUEST,
    };
    (
        status,
        Json(ApiError {
            error: err.to_string(),
        }),
    )
}

/// Persist the registry, logging rather than failing the request
fn save_registry(state: &ApiState, registry: &WalletRegistry) {
    if let Err(e) = state.storage.save(registry) {
        log::error!("Failed to save registry: {}", e);
    }
}

// ============================================================================
// Wallet Handlers
// ============================================================================

/// POST /api/wallets - Create a quorum wallet
pub async fn create_wallet(
    State(state): State<ApiState>,
    Json(req): Json<CreateWalletRequest>,
) -> Result<Json<WalletInfo>, (StatusCode, Json<ApiError>)> {
    let members: BTreeSet<String> = req.members.into_iter().collect();

    let mut registry = state.registry.write().await;
    let wallet = registry
        .create_wallet(&req.creator, members, req.required_approvals, req.label)
        .map_err(wallet_error)?;

    save_registry(&state, &registry);

    Ok(Json(WalletInfo::from(&wallet)))
}

/// GET /api/wallets - List wallets, optionally filtered by member
pub async fn list_wallets(
    State(state): State<ApiState>,
    Query(query): Query<ListWalletsQuery>,
) -> Json<Vec<WalletInfo>> {
    let registry = state.registry.read().await;

    let wallets = match query.member {
        Some(member) => registry.wallets_for_member(&member),
        None => registry.list_wallets(),
    };

    Json(wallets.into_iter().map(WalletInfo::from).collect())
}

/// GET /api/wallets/{address} - Get wallet details
pub async fn get_wallet(
    State(state): State<ApiState>,
    Path(address): Path<String>,
) -> Result<Json<WalletInfo>, (StatusCode, Json<ApiError>)> {
    let registry = state.registry.read().await;

    match registry.wallet(&address) {
        Some(wallet) => Ok(Json(WalletInfo::from(wallet))),
        None => Err(wallet_error(WalletError::WalletNotFound(address))),
    }
}

/// GET /api/wallets/{address}/balance - Get a wallet's custody pool balance
pub async fn get_wallet_balance(
    State(state): State<ApiState>,
    Path(address): Path<String>,
) -> Result<Json<BalanceResponse>, (StatusCode, Json<ApiError>)> {
    let registry = state.registry.read().await;

    // Fail loudly for unknown wallets instead of reporting an empty pool
    if registry.wallet(&address).is_none() {
        return Err(wallet_error(WalletError::WalletNotFound(address)));
    }

    let balance = registry.balance_of(&address);
    Ok(Json(BalanceResponse {
        account: address,
        balance,
    }))
}

// ============================================================================
// Transaction Handlers
// ============================================================================

/// POST /api/wallets/{address}/transactions - Propose a transaction
pub async fn propose_transaction(
    State(state): State<ApiState>,
    Path(address): Path<String>,
    Json(req): Json<ProposeRequest>,
) -> Result<Json<ProposalInfo>, (StatusCode, Json<ApiError>)> {
    let mut registry = state.registry.write().await;

    let event = registry
        .propose_transaction(&address, &req.caller, &req.beneficiary, req.value)
        .map_err(wallet_error)?;

    let info = {
        let wallet = registry
            .wallet(&address)
            .ok_or_else(|| wallet_error(WalletError::WalletNotFound(address.clone())))?;
        ProposalInfo::new(wallet, event.index, &event.proposal)
    };

    save_registry(&state, &registry);

    state.ws_broadcaster.broadcast(WsEvent::ProposalSubmitted {
        proposal: info.clone(),
    });

    Ok(Json(info))
}

/// GET /api/wallets/{address}/transactions - List a wallet's proposals
pub async fn list_transactions(
    State(state): State<ApiState>,
    Path(address): Path<String>,
) -> Result<Json<Vec<ProposalInfo>>, (StatusCode, Json<ApiError>)> {
    let registry = state.registry.read().await;

    let wallet = registry
        .wallet(&address)
        .ok_or_else(|| wallet_error(WalletError::WalletNotFound(address.clone())))?;

    let proposals: Vec<ProposalInfo> = wallet
        .transactions()
        .iter()
        .enumerate()
        .map(|(index, proposal)| ProposalInfo::new(wallet, index, proposal))
        .collect();

    Ok(Json(proposals))
}

/// GET /api/wallets/{address}/transactions/{index} - Get one proposal
pub async fn get_transaction(
    State(state): State<ApiState>,
    Path((address, index)): Path<(String, usize)>,
) -> Result<Json<ProposalInfo>, (StatusCode, Json<ApiError>)> {
    let registry = state.registry.read().await;

    let wallet = registry
        .wallet(&address)
        .ok_or_else(|| wallet_error(WalletError::WalletNotFound(address.clone())))?;
    let proposal = wallet.transaction_at(index).map_err(wallet_error)?;

    Ok(Json(ProposalInfo::new(wallet, index, proposal)))
}

/// POST /api/wallets/{address}/transactions/{index}/approve - Approve
pub async fn approve_transaction(
    State(state): State<ApiState>,
    Path((address, index)): Path<(String, usize)>,
    Json(req): Json<CallerRequest>,
) -> Result<Json<ProposalInfo>, (StatusCode, Json<ApiError>)> {
    let mut registry = state.registry.write().await;

    registry
        .approve_transaction(&address, &req.caller, index)
        .map_err(wallet_error)?;

    let info = proposal_info(&registry, &address, index)?;
    save_registry(&state, &registry);

    Ok(Json(info))
}

/// POST /api/wallets/{address}/transactions/{index}/revoke - Revoke approval
pub async fn revoke_transaction(
    State(state): State<ApiState>,
    Path((address, index)): Path<(String, usize)>,
    Json(req): Json<CallerRequest>,
) -> Result<Json<ProposalInfo>, (StatusCode, Json<ApiError>)> {
    let mut registry = state.registry.write().await;

    registry
        .revoke_transaction(&address, &req.caller, index)
        .map_err(wallet_error)?;

    let info = proposal_info(&registry, &address, index)?;
    save_registry(&state, &registry);

    Ok(Json(info))
}

/// POST /api/wallets/{address}/transactions/{index}/execute - Execute
pub async fn execute_transaction(
    State(state): State<ApiState>,
    Path((address, index)): Path<(String, usize)>,
    Json(req): Json<CallerRequest>,
) -> Result<Json<ProposalInfo>, (StatusCode, Json<ApiError>)> {
    let mut registry = state.registry.write().await;

    registry
        .execute_transaction(&address, &req.caller, index)
        .map_err(wallet_error)?;

    let info = proposal_info(&registry, &address, index)?;
    save_registry(&state, &registry);

    state.ws_broadcaster.broadcast(WsEvent::TransactionExecuted {
        proposal: info.clone(),
    });

    Ok(Json(info))
}

/// GET /api/wallets/{address}/transactions/{index}/approvals - List approvers
pub async fn get_approvals(
    State(state): State<ApiState>,
    Path((address, index)): Path<(String, usize)>,
) -> Result<Json<ApprovalsResponse>, (StatusCode, Json<ApiError>)> {
    let registry = state.registry.read().await;

    let proposal = registry
        .transaction_at(&address, index)
        .map_err(wallet_error)?;

    Ok(Json(ApprovalsResponse {
        wallet: address,
        index,
        approvals: proposal.approvers().iter().map(|s| s.to_string()).collect(),
        approval_count: proposal.approval_count(),
    }))
}

/// Rebuild a proposal view after a mutation
fn proposal_info(
    registry: &WalletRegistry,
    address: &str,
    index: usize,
) -> Result<ProposalInfo, (StatusCode, Json<ApiError>)> {
    let wallet = registry
        .wallet(address)
        .ok_or_else(|| wallet_error(WalletError::WalletNotFound(address.to_string())))?;
    let proposal = wallet.transaction_at(index).map_err(wallet_error)?;
    Ok(ProposalInfo::new(wallet, index, proposal))
}

// ============================================================================
// Account Handlers
// ============================================================================

/// POST /api/accounts/{account}/fund - Issue units to an account
pub async fn fund_account(
    State(state): State<ApiState>,
    Path(account): Path<String>,
    Json(req): Json<FundRequest>,
) -> Json<BalanceResponse> {
    let mut registry = state.registry.write().await;
    let balance = registry.fund(&account, req.amount);

    save_registry(&state, &registry);

    Json(BalanceResponse { account, balance })
}

/// GET /api/accounts/{account}/balance - Get an account balance
pub async fn get_balance(
    State(state): State<ApiState>,
    Path(account): Path<String>,
) -> Json<BalanceResponse> {
    let registry = state.registry.read().await;
    let balance = registry.balance_of(&account);

    Json(BalanceResponse { account, balance })
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "OK"
}
