//! Handlers for the caller's wallet and the withdrawal settlement queue.

use axum::extract::{Path, Query, State};
use axum::Json;
use gigboard_core::types::{Cents, DbId};
use gigboard_db::models::wallet::{Deposit, WalletReceipt, WalletTransaction, Withdraw};
use gigboard_db::repositories::WalletRepo;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::query::PaginationParams;
use crate::response::{created, Created, DataResponse};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct Balance {
    pub balance: Cents,
}

#[derive(Debug, Deserialize)]
pub struct SettleWithdrawal {
    pub succeeded: bool,
}

/// GET /api/v1/wallet
pub async fn balance(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Balance>>> {
    let balance = WalletRepo::balance(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse {
        data: Balance { balance },
    }))
}

/// GET /api/v1/wallet/transactions
pub async fn history(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<WalletTransaction>>>> {
    let transactions =
        WalletRepo::history(&state.pool, auth.user_id, page.limit(), page.offset()).await?;
    Ok(Json(DataResponse { data: transactions }))
}

/// POST /api/v1/wallet/deposit
pub async fn deposit(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<Deposit>,
) -> AppResult<Created<WalletReceipt>> {
    let receipt = WalletRepo::deposit(&state.pool, auth.user_id, input.amount).await?;
    tracing::info!(user_id = auth.user_id, amount = input.amount, "Deposit recorded");
    Ok(created(receipt))
}

/// POST /api/v1/wallet/withdraw
///
/// Reserves the amount immediately; the record stays PENDING until settled.
pub async fn withdraw(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<Withdraw>,
) -> AppResult<Created<WalletReceipt>> {
    let receipt = WalletRepo::withdraw(&state.pool, auth.user_id, &input).await?;
    tracing::info!(
        user_id = auth.user_id,
        amount = input.amount,
        method = %input.method,
        transaction_id = receipt.transaction.id,
        "Withdrawal requested"
    );
    Ok(created(receipt))
}

/// POST /api/v1/admin/withdrawals/{id}/settle
pub async fn settle(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<SettleWithdrawal>,
) -> AppResult<Json<DataResponse<WalletReceipt>>> {
    let outcome =
        WalletRepo::settle_withdrawal(&state.pool, id, &admin.actor(), input.succeeded).await?;
    Ok(Json(DataResponse {
        data: state.deliver(outcome),
    }))
}
