//! Wallet ledger models and DTOs.

use gigboard_core::error::CoreError;
use gigboard_core::status::{StatusId, TransactionStatus, TransactionType};
use gigboard_core::types::{Cents, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::decode_status;

/// A row from the `wallet_transactions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WalletTransaction {
    pub id: DbId,
    pub user_id: DbId,
    pub type_id: StatusId,
    pub amount: Cents,
    pub status_id: StatusId,
    pub description: Option<String>,
    pub method: Option<String>,
    pub details: Option<serde_json::Value>,
    pub contract_id: Option<DbId>,
    pub project_id: Option<DbId>,
    /// The accepted proposal behind an earning.
    pub proposal_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl WalletTransaction {
    pub fn kind(&self) -> Result<TransactionType, CoreError> {
        decode_status(self.type_id, TransactionType::from_id, "transaction type")
    }

    pub fn status(&self) -> Result<TransactionStatus, CoreError> {
        decode_status(self.status_id, TransactionStatus::from_id, "transaction")
    }
}

/// Balance after a ledger write, with the record that produced it.
#[derive(Debug, Clone, Serialize)]
pub struct WalletReceipt {
    pub balance: Cents,
    pub transaction: WalletTransaction,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Deposit {
    pub amount: Cents,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Withdraw {
    pub amount: Cents,
    pub method: String,
    pub details: Option<serde_json::Value>,
}

/// Values for one new ledger row.
#[derive(Debug, Clone)]
pub(crate) struct NewTransaction<'a> {
    pub user_id: DbId,
    pub kind: TransactionType,
    pub amount: Cents,
    pub status: TransactionStatus,
    pub description: &'a str,
    pub method: Option<&'a str>,
    pub details: Option<&'a serde_json::Value>,
    pub contract_id: Option<DbId>,
    pub project_id: Option<DbId>,
    pub proposal_id: Option<DbId>,
}
