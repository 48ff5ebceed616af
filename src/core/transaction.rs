//! Points ledger - Records every credit and debit and derives balances from them.
//!
//! A user's balance is never stored: it is the sum of all `earned_*` entries minus
//! the sum of all other entries, floored at zero. Entries are always written with a
//! positive amount; the transaction type carries the direction.

use crate::{
    entities::{Transaction, transaction},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, QuerySelect, Set, prelude::*};
use serde::Serialize;
use std::{fmt, str::FromStr};

/// Prefix shared by every crediting transaction type.
pub const EARNED_PREFIX: &str = "earned";

/// The kinds of ledger entries the service writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Points for submitting a report
    EarnedReport,
    /// Points for collecting reported waste
    EarnedCollect,
    /// Points spent on a reward
    Redeemed,
}

impl TransactionKind {
    /// The value stored in the `transaction_type` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EarnedReport => "earned_report",
            Self::EarnedCollect => "earned_collect",
            Self::Redeemed => "redeemed",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "earned_report" => Ok(Self::EarnedReport),
            "earned_collect" => Ok(Self::EarnedCollect),
            "redeemed" => Ok(Self::Redeemed),
            other => Err(Error::Validation {
                message: format!("Unknown transaction type: {other}"),
            }),
        }
    }
}

/// A ledger entry prepared for display, with the date reduced to `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionEntry {
    /// Transaction id
    pub id: i64,
    /// Stored transaction type
    pub transaction_type: String,
    /// Points moved
    pub amount: i64,
    /// Description shown to the user
    pub description: String,
    /// Calendar date of the entry
    pub date: String,
}

impl From<transaction::Model> for TransactionEntry {
    fn from(model: transaction::Model) -> Self {
        Self {
            id: model.id,
            date: model.date.format("%Y-%m-%d").to_string(),
            transaction_type: model.transaction_type,
            amount: model.amount,
            description: model.description,
        }
    }
}

/// Appends an entry to the ledger.
///
/// The amount must be strictly positive; direction comes from `kind`.
/// Generic over the connection so it can run inside a database transaction.
pub async fn create_transaction<C>(
    db: &C,
    user_id: i64,
    kind: TransactionKind,
    amount: i64,
    description: String,
) -> Result<transaction::Model>
where
    C: ConnectionTrait,
{
    if amount <= 0 {
        return Err(Error::InvalidAmount { amount });
    }

    let entry = transaction::ActiveModel {
        user_id: Set(user_id),
        transaction_type: Set(kind.as_str().to_string()),
        amount: Set(amount),
        description: Set(description),
        date: Set(chrono::Utc::now()),
        ..Default::default()
    };

    entry.insert(db).await.map_err(Into::into)
}

/// Folds ledger rows into a balance.
///
/// Any type starting with `earned` is a credit, everything else a debit.
/// The result is floored at zero.
#[must_use]
pub fn compute_balance(transactions: &[transaction::Model]) -> i64 {
    let balance = transactions.iter().fold(0_i64, |acc, entry| {
        if entry.transaction_type.starts_with(EARNED_PREFIX) {
            acc.saturating_add(entry.amount)
        } else {
            acc.saturating_sub(entry.amount)
        }
    });
    balance.max(0)
}

/// Retrieves every ledger entry for a user, newest first.
pub async fn get_transactions_for_user<C>(db: &C, user_id: i64) -> Result<Vec<transaction::Model>>
where
    C: ConnectionTrait,
{
    Transaction::find()
        .filter(transaction::Column::UserId.eq(user_id))
        .order_by_desc(transaction::Column::Date)
        .order_by_desc(transaction::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Computes a user's current points balance from the ledger.
///
/// A user with no entries has a balance of zero.
pub async fn get_user_balance<C>(db: &C, user_id: i64) -> Result<i64>
where
    C: ConnectionTrait,
{
    let transactions = get_transactions_for_user(db, user_id).await?;
    Ok(compute_balance(&transactions))
}

/// Returns the most recent `limit` ledger entries for display.
pub async fn get_reward_transactions(
    db: &DatabaseConnection,
    user_id: i64,
    limit: u64,
) -> Result<Vec<TransactionEntry>> {
    let transactions = Transaction::find()
        .filter(transaction::Column::UserId.eq(user_id))
        .order_by_desc(transaction::Column::Date)
        .order_by_desc(transaction::Column::Id)
        .limit(limit)
        .all(db)
        .await?;

    Ok(transactions.into_iter().map(TransactionEntry::from).collect())
}
