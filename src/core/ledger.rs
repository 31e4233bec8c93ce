//! Ledger business logic - Double-entry transactions between accounts.
//!
//! Every movement of value is one transaction with exactly two entries: a
//! debit of `-amount` on the source account and a credit of `+amount` on the
//! destination. Balances are never stored; they are the sum of an account's
//! entries. The primitive itself does not check balances or permissions, that
//! is the caller's job (see [`crate::core::account::transfer`]).

use crate::{
    entities::{Account, Entry, LedgerTransaction, entry, ledger_transaction},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{debug, error};

/// Records `amount` moving from one account to another.
///
/// The transaction row and both entries are written inside a single database
/// transaction. After writing, the transaction is re-read and checked for
/// validity; an invalid transaction is rolled back and reported as
/// [`Error::UnbalancedTransaction`], so no half-written or unbalanced data is
/// ever left behind.
///
/// # Errors
/// * [`Error::InvalidAmount`] if `amount` is not positive
/// * [`Error::AccountNotFound`] if either account does not exist
/// * [`Error::UnbalancedTransaction`] if the validity check fails
pub async fn create_transaction(
    db: &DatabaseConnection,
    reason: &str,
    amount: i64,
    from_account_id: i64,
    to_account_id: i64,
) -> Result<ledger_transaction::Model> {
    if amount <= 0 {
        return Err(Error::InvalidAmount { amount });
    }

    // Use a transaction to ensure atomicity
    let txn = db.begin().await?;

    for account_id in [from_account_id, to_account_id] {
        Account::find_by_id(account_id)
            .one(&txn)
            .await?
            .ok_or(Error::AccountNotFound { id: account_id })?;
    }

    let transaction = ledger_transaction::ActiveModel {
        reason: Set(reason.to_string()),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let debit = entry::ActiveModel {
        account_id: Set(from_account_id),
        transaction_id: Set(transaction.id),
        amount: Set(-amount),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let credit = entry::ActiveModel {
        account_id: Set(to_account_id),
        transaction_id: Set(transaction.id),
        amount: Set(amount),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    if !transaction_is_valid(&txn, transaction.id).await? {
        error!(
            "transaction was invalid. please check entry ids {} and {}",
            debit.id, credit.id
        );
        txn.rollback().await?;
        return Err(Error::UnbalancedTransaction {
            transaction_id: transaction.id,
            debit_entry_id: debit.id,
            credit_entry_id: credit.id,
        });
    }

    txn.commit().await?;
    debug!(
        "Recorded transaction {}: {} from account {} to account {}",
        transaction.id, amount, from_account_id, to_account_id
    );

    Ok(transaction)
}

/// Retrieves the entries of a transaction, in insertion order.
pub async fn entries_for_transaction<C>(db: &C, transaction_id: i64) -> Result<Vec<entry::Model>>
where
    C: ConnectionTrait,
{
    Entry::find()
        .filter(entry::Column::TransactionId.eq(transaction_id))
        .order_by_asc(entry::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// A transaction is valid when it has exactly two entries that sum to zero.
pub async fn transaction_is_valid<C>(db: &C, transaction_id: i64) -> Result<bool>
where
    C: ConnectionTrait,
{
    let entries = entries_for_transaction(db, transaction_id).await?;
    let total: i128 = entries.iter().map(|e| i128::from(e.amount)).sum();
    Ok(entries.len() == 2 && total == 0)
}

/// Current balance of an account: the sum of its entries.
pub async fn get_balance<C>(db: &C, account_id: i64) -> Result<i64>
where
    C: ConnectionTrait,
{
    let entries = Entry::find()
        .filter(entry::Column::AccountId.eq(account_id))
        .all(db)
        .await?;
    Ok(entries.iter().map(|e| e.amount).sum())
}

/// An account's entries with their transactions, newest first.
pub async fn account_history(
    db: &DatabaseConnection,
    account_id: i64,
) -> Result<Vec<(entry::Model, Option<ledger_transaction::Model>)>> {
    Entry::find()
        .filter(entry::Column::AccountId.eq(account_id))
        .find_also_related(LedgerTransaction)
        .order_by_desc(entry::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_transaction_validation() -> Result<()> {
        let db = setup_test_db().await?;
        let from = create_test_account(&db, "From", "USD").await?;
        let to = create_test_account(&db, "To", "USD").await?;

        let result = create_transaction(&db, "nothing", 0, from.id, to.id).await;
        assert!(matches!(result, Err(Error::InvalidAmount { amount: 0 })));

        let result = create_transaction(&db, "backwards", -5, from.id, to.id).await;
        assert!(matches!(result, Err(Error::InvalidAmount { amount: -5 })));

        assert!(LedgerTransaction::find().all(&db).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_balanced_transfer_moves_value() -> Result<()> {
        let db = setup_test_db().await?;
        let from = create_test_account(&db, "From", "USD").await?;
        let to = create_test_account(&db, "To", "USD").await?;
        fund_account(&db, from.id, 100).await?;

        let transaction = create_transaction(&db, "rent share", 40, from.id, to.id).await?;

        assert_eq!(transaction.reason, "rent share");
        assert_eq!(get_balance(&db, from.id).await?, 60);
        assert_eq!(get_balance(&db, to.id).await?, 40);

        let entries = entries_for_transaction(&db, transaction.id).await?;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].account_id, from.id);
        assert_eq!(entries[0].amount, -40);
        assert_eq!(entries[1].account_id, to.id);
        assert_eq!(entries[1].amount, 40);
        assert!(transaction_is_valid(&db, transaction.id).await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_account_leaves_nothing_behind() -> Result<()> {
        let db = setup_test_db().await?;
        let from = create_test_account(&db, "From", "USD").await?;

        let result = create_transaction(&db, "lost", 10, from.id, 999).await;
        assert!(matches!(result, Err(Error::AccountNotFound { id: 999 })));

        assert!(LedgerTransaction::find().all(&db).await?.is_empty());
        assert!(Entry::find().all(&db).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_unbalanced_transaction_is_invalid() -> Result<()> {
        let db = setup_test_db().await?;
        let account = create_test_account(&db, "Lonely", "USD").await?;

        let transaction = ledger_transaction::ActiveModel {
            reason: Set("half written".to_string()),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&db)
        .await?;
        entry::ActiveModel {
            account_id: Set(account.id),
            transaction_id: Set(transaction.id),
            amount: Set(-10),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        assert!(!transaction_is_valid(&db, transaction.id).await?);

        entry::ActiveModel {
            account_id: Set(account.id),
            transaction_id: Set(transaction.id),
            amount: Set(5),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        // Two entries, but they do not cancel out
        assert!(!transaction_is_valid(&db, transaction.id).await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_account_history_newest_first() -> Result<()> {
        let db = setup_test_db().await?;
        let from = create_test_account(&db, "From", "USD").await?;
        let to = create_test_account(&db, "To", "USD").await?;
        fund_account(&db, from.id, 50).await?;

        create_transaction(&db, "first", 10, from.id, to.id).await?;
        create_transaction(&db, "second", 15, from.id, to.id).await?;

        let history = account_history(&db, to.id).await?;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].0.amount, 15);
        assert_eq!(history[0].1.as_ref().unwrap().reason, "second");
        assert_eq!(history[1].1.as_ref().unwrap().reason, "first");
        Ok(())
    }

    #[tokio::test]
    async fn test_balance_of_unused_account_is_zero() -> Result<()> {
        let db = setup_test_db().await?;
        let account = create_test_account(&db, "Empty", "USD").await?;
        assert_eq!(get_balance(&db, account.id).await?, 0);
        Ok(())
    }
}
