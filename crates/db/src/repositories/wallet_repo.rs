//! Repository for balances and the `wallet_transactions` ledger.
//!
//! Every balance change locks the `users` row, writes the new balance, and
//! appends the matching ledger row in the same transaction.

use gigboard_core::error::CoreError;
use gigboard_core::ledger::{check_settle, credit, debit, validate_amount, validate_method};
use gigboard_core::notice::{wallet_link, Notice, NoticeKind};
use gigboard_core::roles::Actor;
use gigboard_core::status::{TransactionStatus, TransactionType};
use gigboard_core::types::{Cents, DbId};
use sqlx::{PgConnection, PgPool};

use crate::error::DbError;
use crate::models::wallet::{NewTransaction, WalletReceipt, WalletTransaction, Withdraw};
use crate::Outcome;

const COLUMNS: &str = "id, user_id, type_id, amount, status_id, description, method, details, \
                       contract_id, project_id, proposal_id, created_at, updated_at";

pub struct WalletRepo;

impl WalletRepo {
    /// Credit `amount` to the user's balance with a COMPLETED DEPOSIT record.
    pub async fn deposit(
        pool: &PgPool,
        user_id: DbId,
        amount: Cents,
    ) -> Result<WalletReceipt, DbError> {
        validate_amount(amount)?;

        let mut tx = pool.begin().await?;
        let balance = credit(Self::lock_balance(&mut tx, user_id).await?, amount)?;
        Self::set_balance(&mut tx, user_id, balance).await?;
        let transaction = Self::insert(
            &mut tx,
            &NewTransaction {
                user_id,
                kind: TransactionType::Deposit,
                amount,
                status: TransactionStatus::Completed,
                description: "Wallet deposit",
                method: None,
                details: None,
                contract_id: None,
                project_id: None,
                proposal_id: None,
            },
        )
        .await?;
        tx.commit().await?;

        tracing::info!(user_id, amount, balance, "Deposit recorded");
        Ok(WalletReceipt {
            balance,
            transaction,
        })
    }

    /// Reserve `amount` immediately and append a PENDING WITHDRAWAL record
    /// awaiting settlement.
    pub async fn withdraw(
        pool: &PgPool,
        user_id: DbId,
        input: &Withdraw,
    ) -> Result<WalletReceipt, DbError> {
        validate_amount(input.amount)?;
        validate_method(&input.method)?;

        let mut tx = pool.begin().await?;
        let balance = debit(Self::lock_balance(&mut tx, user_id).await?, input.amount)?;
        Self::set_balance(&mut tx, user_id, balance).await?;
        let transaction = Self::insert(
            &mut tx,
            &NewTransaction {
                user_id,
                kind: TransactionType::Withdrawal,
                amount: input.amount,
                status: TransactionStatus::Pending,
                description: "Withdrawal request",
                method: Some(&input.method),
                details: input.details.as_ref(),
                contract_id: None,
                project_id: None,
                proposal_id: None,
            },
        )
        .await?;
        tx.commit().await?;

        tracing::info!(user_id, amount = input.amount, balance, "Withdrawal reserved");
        Ok(WalletReceipt {
            balance,
            transaction,
        })
    }

    /// Settle a PENDING withdrawal. A failed payout restores the reserved
    /// amount and records a REFUND.
    pub async fn settle_withdrawal(
        pool: &PgPool,
        transaction_id: DbId,
        actor: &Actor,
        succeeded: bool,
    ) -> Result<Outcome<WalletReceipt>, DbError> {
        if !actor.is_admin() {
            return Err(CoreError::forbidden("Only administrators settle withdrawals").into());
        }

        let mut tx = pool.begin().await?;
        let user_id: DbId =
            sqlx::query_scalar("SELECT user_id FROM wallet_transactions WHERE id = $1")
                .bind(transaction_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(CoreError::not_found("WalletTransaction", transaction_id))?;

        let mut balance = Self::lock_balance(&mut tx, user_id).await?;
        let query = format!("SELECT {COLUMNS} FROM wallet_transactions WHERE id = $1 FOR UPDATE");
        let pending = sqlx::query_as::<_, WalletTransaction>(&query)
            .bind(transaction_id)
            .fetch_one(&mut *tx)
            .await?;
        check_settle(pending.kind()?, pending.status()?)?;

        let final_status = if succeeded {
            TransactionStatus::Completed
        } else {
            TransactionStatus::Failed
        };
        let query = format!(
            "UPDATE wallet_transactions SET status_id = $2 WHERE id = $1 RETURNING {COLUMNS}"
        );
        let settled = sqlx::query_as::<_, WalletTransaction>(&query)
            .bind(transaction_id)
            .bind(final_status.id())
            .fetch_one(&mut *tx)
            .await?;

        if !succeeded {
            balance = credit(balance, settled.amount)?;
            Self::set_balance(&mut tx, user_id, balance).await?;
            Self::insert(
                &mut tx,
                &NewTransaction {
                    user_id,
                    kind: TransactionType::Refund,
                    amount: settled.amount,
                    status: TransactionStatus::Completed,
                    description: "Refund of failed withdrawal",
                    method: settled.method.as_deref(),
                    details: None,
                    contract_id: None,
                    project_id: None,
                    proposal_id: None,
                },
            )
            .await?;
        }
        tx.commit().await?;

        tracing::info!(transaction_id, user_id, succeeded, "Withdrawal settled");
        let body = if succeeded {
            format!("Your withdrawal of {} cents was paid out", settled.amount)
        } else {
            format!(
                "Your withdrawal of {} cents failed and was returned to your balance",
                settled.amount
            )
        };
        let notice = Notice::new(
            user_id,
            NoticeKind::WithdrawalSettled,
            "Withdrawal settled",
            body,
            wallet_link(),
        );
        Ok(Outcome::new(
            WalletReceipt {
                balance,
                transaction: settled,
            },
            vec![notice],
        ))
    }

    pub async fn balance(pool: &PgPool, user_id: DbId) -> Result<Cents, DbError> {
        let balance: Option<Cents> = sqlx::query_scalar("SELECT balance FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(pool)
            .await?;
        balance.ok_or_else(|| CoreError::not_found("User", user_id).into())
    }

    /// Ledger history for a user, newest first.
    pub async fn history(
        pool: &PgPool,
        user_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<WalletTransaction>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM wallet_transactions \
             WHERE user_id = $1 \
             ORDER BY created_at DESC, id DESC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, WalletTransaction>(&query)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Credit a paid milestone to the freelancer with a COMPLETED EARNING
    /// record that points back at the contract, project and proposal. Runs
    /// inside the milestone transaction.
    pub(crate) async fn record_earning(
        conn: &mut PgConnection,
        freelancer_id: DbId,
        amount: Cents,
        contract_id: DbId,
        project_id: DbId,
        proposal_id: DbId,
        description: &str,
    ) -> Result<Cents, DbError> {
        let balance = credit(Self::lock_balance(conn, freelancer_id).await?, amount)?;
        Self::set_balance(conn, freelancer_id, balance).await?;
        Self::insert(
            conn,
            &NewTransaction {
                user_id: freelancer_id,
                kind: TransactionType::Earning,
                amount,
                status: TransactionStatus::Completed,
                description,
                method: None,
                details: None,
                contract_id: Some(contract_id),
                project_id: Some(project_id),
                proposal_id: Some(proposal_id),
            },
        )
        .await?;
        Ok(balance)
    }

    async fn lock_balance(conn: &mut PgConnection, user_id: DbId) -> Result<Cents, DbError> {
        let balance: Option<Cents> =
            sqlx::query_scalar("SELECT balance FROM users WHERE id = $1 FOR UPDATE")
                .bind(user_id)
                .fetch_optional(&mut *conn)
                .await?;
        balance.ok_or_else(|| CoreError::not_found("User", user_id).into())
    }

    async fn set_balance(
        conn: &mut PgConnection,
        user_id: DbId,
        balance: Cents,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET balance = $2 WHERE id = $1")
            .bind(user_id)
            .bind(balance)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    async fn insert(
        conn: &mut PgConnection,
        new: &NewTransaction<'_>,
    ) -> Result<WalletTransaction, sqlx::Error> {
        let query = format!(
            "INSERT INTO wallet_transactions \
                 (user_id, type_id, amount, status_id, description, method, details, \
                  contract_id, project_id, proposal_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WalletTransaction>(&query)
            .bind(new.user_id)
            .bind(new.kind.id())
            .bind(new.amount)
            .bind(new.status.id())
            .bind(new.description)
            .bind(new.method)
            .bind(new.details)
            .bind(new.contract_id)
            .bind(new.project_id)
            .bind(new.proposal_id)
            .fetch_one(&mut *conn)
            .await
    }
}
