//! Wallet ledger arithmetic.
//!
//! The balance is a running total kept next to an append-only history. Each
//! function here computes the new balance for one movement; the caller
//! writes balance and history row in the same transaction under the
//! account's row lock.

use crate::error::CoreError;
use crate::status::{TransactionStatus, TransactionType};
use crate::types::Cents;

/// Largest single deposit or withdrawal accepted (10,000,000.00).
pub const MAX_TRANSACTION_AMOUNT: Cents = 1_000_000_000;

pub const METHOD_BANK_TRANSFER: &str = "bank_transfer";
pub const METHOD_PAYPAL: &str = "paypal";
pub const METHOD_CRYPTO: &str = "crypto";

/// All valid withdrawal methods.
pub const WITHDRAWAL_METHODS: &[&str] = &[METHOD_BANK_TRANSFER, METHOD_PAYPAL, METHOD_CRYPTO];

pub fn validate_amount(amount: Cents) -> Result<(), CoreError> {
    if amount <= 0 {
        return Err(CoreError::invalid_argument(
            "Amount must be greater than zero",
        ));
    }
    if amount > MAX_TRANSACTION_AMOUNT {
        return Err(CoreError::invalid_argument(format!(
            "Amount exceeds the per-transaction limit of {MAX_TRANSACTION_AMOUNT}"
        )));
    }
    Ok(())
}

pub fn validate_method(method: &str) -> Result<(), CoreError> {
    if WITHDRAWAL_METHODS.contains(&method) {
        Ok(())
    } else {
        Err(CoreError::invalid_argument(format!(
            "Invalid withdrawal method '{method}'. Must be one of: {}",
            WITHDRAWAL_METHODS.join(", ")
        )))
    }
}

/// New balance after adding `amount`.
pub fn credit(balance: Cents, amount: Cents) -> Result<Cents, CoreError> {
    balance
        .checked_add(amount)
        .ok_or_else(|| CoreError::invalid_argument("Balance would overflow"))
}

/// New balance after removing `amount`; never goes negative.
pub fn debit(balance: Cents, amount: Cents) -> Result<Cents, CoreError> {
    if amount > balance {
        return Err(CoreError::InsufficientFunds {
            requested: amount,
            available: balance,
        });
    }
    Ok(balance - amount)
}

/// Only a PENDING withdrawal can be settled.
pub fn check_settle(kind: TransactionType, status: TransactionStatus) -> Result<(), CoreError> {
    if kind != TransactionType::Withdrawal {
        return Err(CoreError::invalid_state(format!(
            "Only withdrawals are settled, this is a {kind}"
        )));
    }
    if status != TransactionStatus::Pending {
        return Err(CoreError::invalid_state(format!(
            "Withdrawal is already {status}"
        )));
    }
    Ok(())
}
