//! Account business logic - Listing, permissions and the transfer form.
//!
//! This module holds everything the account views need: which accounts a
//! user can see, whether they may move value out of one, and the transfer
//! operation that validates a submitted form, checks every prerequisite and
//! only then calls the ledger primitive.

use crate::{
    core::ledger,
    entities::{Account, AccountMember, AccountRole, account, account_member, ledger_transaction, user},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Deserialize;
use tracing::debug;

/// Message shown when an account is missing or not visible to the user.
pub const NOT_AUTHORIZED_MESSAGE: &str = "The account does not exist or you are not authorized.";

/// An account together with its derived balance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountBalance {
    /// The account
    pub account: account::Model,
    /// Sum of the account's entries
    pub balance: i64,
}

/// Creates a new account with no entries.
pub async fn create_account(
    db: &DatabaseConnection,
    name: &str,
    currency: &str,
) -> Result<account::Model> {
    if name.trim().is_empty() {
        return Err(Error::Validation {
            message: "Account name cannot be empty".to_string(),
        });
    }

    let account = account::ActiveModel {
        name: Set(name.trim().to_string()),
        currency: Set(currency.to_string()),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    account.insert(db).await.map_err(Into::into)
}

/// Adds a user to an account as owner or admin.
pub async fn add_member(
    db: &DatabaseConnection,
    account_id: i64,
    user_id: i64,
    role: AccountRole,
) -> Result<account_member::Model> {
    account_member::ActiveModel {
        account_id: Set(account_id),
        user_id: Set(user_id),
        role: Set(role),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Finds an account by id.
pub async fn get_account_by_id(
    db: &DatabaseConnection,
    account_id: i64,
) -> Result<Option<account::Model>> {
    Account::find_by_id(account_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Whether the user is an owner or an admin of the account.
pub async fn user_can_manage(db: &DatabaseConnection, user_id: i64, account_id: i64) -> Result<bool> {
    let membership = AccountMember::find()
        .filter(account_member::Column::AccountId.eq(account_id))
        .filter(account_member::Column::UserId.eq(user_id))
        .one(db)
        .await?;
    Ok(membership.is_some())
}

async fn accounts_with_role(
    db: &DatabaseConnection,
    user_id: i64,
    roles: &[AccountRole],
) -> Result<Vec<account::Model>> {
    let account_ids: Vec<i64> = AccountMember::find()
        .filter(account_member::Column::UserId.eq(user_id))
        .filter(account_member::Column::Role.is_in(roles.iter().copied()))
        .all(db)
        .await?
        .into_iter()
        .map(|m| m.account_id)
        .collect();

    Account::find()
        .filter(account::Column::Id.is_in(account_ids))
        .order_by_asc(account::Column::Currency)
        .order_by_asc(account::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Accounts owned by the user, ordered by currency, with balances.
pub async fn accounts_owned_by(db: &DatabaseConnection, user_id: i64) -> Result<Vec<AccountBalance>> {
    let accounts = accounts_with_role(db, user_id, &[AccountRole::Owner]).await?;
    let mut balances = Vec::with_capacity(accounts.len());
    for account in accounts {
        let balance = ledger::get_balance(db, account.id).await?;
        balances.push(AccountBalance { account, balance });
    }
    Ok(balances)
}

/// Accounts the user may transfer out of (owned or administered).
pub async fn transferable_accounts(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<account::Model>> {
    accounts_with_role(db, user_id, &[AccountRole::Owner, AccountRole::Admin]).await
}

/// Every account, as destinations for a transfer.
pub async fn all_accounts(db: &DatabaseConnection) -> Result<Vec<account::Model>> {
    Account::find()
        .order_by_asc(account::Column::Currency)
        .order_by_asc(account::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// The account with its balance, if the user may see it.
///
/// Returns `None` both when the account does not exist and when the user is
/// neither an owner nor an admin; callers show the same message for both.
pub async fn account_detail(
    db: &DatabaseConnection,
    user: &user::Model,
    account_id: i64,
) -> Result<Option<AccountBalance>> {
    let Some(account) = get_account_by_id(db, account_id).await? else {
        return Ok(None);
    };
    if !user_can_manage(db, user.id, account.id).await? {
        return Ok(None);
    }
    let balance = ledger::get_balance(db, account.id).await?;
    Ok(Some(AccountBalance { account, balance }))
}

/// Raw transfer form as submitted by the browser.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransferForm {
    /// Source account id
    pub from_account: Option<String>,
    /// Destination account id
    pub to_account: Option<String>,
    /// Whole units to move
    pub amount: Option<String>,
    /// Reason shown in both accounts' history
    pub reason: Option<String>,
}

/// A transfer form that passed field validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedTransfer {
    /// Source account
    pub from_account: account::Model,
    /// Destination account
    pub to_account: account::Model,
    /// Positive amount
    pub amount: i64,
    /// Non-empty reason
    pub reason: String,
}

fn parse_id(field: &str, value: Option<&str>, errors: &mut Vec<String>) -> Option<i64> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => {
            errors.push(format!("{field}: This field is required."));
            None
        }
        Some(raw) => raw.parse().map_or_else(
            |_| {
                errors.push(format!("{field}: Select a valid choice."));
                None
            },
            Some,
        ),
    }
}

impl TransferForm {
    /// Validates the fields and resolves both accounts.
    ///
    /// Returns the list of field errors when anything is wrong.
    pub async fn clean(
        &self,
        db: &DatabaseConnection,
    ) -> Result<std::result::Result<CleanedTransfer, Vec<String>>> {
        let mut errors = Vec::new();

        let from_id = parse_id("from_account", self.from_account.as_deref(), &mut errors);
        let to_id = parse_id("to_account", self.to_account.as_deref(), &mut errors);

        let amount = match self.amount.as_deref().map(str::trim) {
            None | Some("") => {
                errors.push("amount: This field is required.".to_string());
                None
            }
            Some(raw) => match raw.parse::<i64>() {
                Ok(amount) if amount > 0 => Some(amount),
                Ok(_) => {
                    errors.push("amount: Ensure this value is greater than 0.".to_string());
                    None
                }
                Err(_) => {
                    errors.push("amount: Enter a whole number.".to_string());
                    None
                }
            },
        };

        let reason = self.reason.as_deref().map(str::trim).unwrap_or_default();
        if reason.is_empty() {
            errors.push("reason: This field is required.".to_string());
        }

        let from_account = match from_id {
            Some(id) => {
                let found = get_account_by_id(db, id).await?;
                if found.is_none() {
                    errors.push("from_account: Select a valid choice.".to_string());
                }
                found
            }
            None => None,
        };
        let to_account = match to_id {
            Some(id) => {
                let found = get_account_by_id(db, id).await?;
                if found.is_none() {
                    errors.push("to_account: Select a valid choice.".to_string());
                }
                found
            }
            None => None,
        };

        match (from_account, to_account, amount) {
            (Some(from_account), Some(to_account), Some(amount)) if errors.is_empty() => {
                Ok(Ok(CleanedTransfer {
                    from_account,
                    to_account,
                    amount,
                    reason: reason.to_string(),
                }))
            }
            _ => Ok(Err(errors)),
        }
    }
}

/// Result of submitting the transfer form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferOutcome {
    /// The ledger recorded the transfer
    Submitted(ledger_transaction::Model),
    /// Validation or a prerequisite failed; nothing was written
    Rejected(Vec<String>),
    /// The ledger refused the transaction and rolled it back
    Failed,
}

impl TransferOutcome {
    /// Messages to show the user.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        match self {
            Self::Submitted(_) => vec!["Submitted".to_string()],
            Self::Rejected(messages) => messages.clone(),
            Self::Failed => vec!["Oops, something went wrong. Please try again.".to_string()],
        }
    }
}

/// Handles a submitted transfer form for `user`.
///
/// Every prerequisite is checked and each failure contributes its own
/// message; the ledger is only touched when all of them pass.
pub async fn transfer(
    db: &DatabaseConnection,
    user: &user::Model,
    form: &TransferForm,
) -> Result<TransferOutcome> {
    let cleaned = match form.clean(db).await? {
        Ok(cleaned) => cleaned,
        Err(errors) => {
            debug!("Transfer form errors: {:?}", errors);
            return Ok(TransferOutcome::Rejected(vec![format!(
                "The form contained errors, your transfer was not completed. {}",
                errors.join(" ")
            )]));
        }
    };

    let CleanedTransfer {
        from_account,
        to_account,
        amount,
        reason,
    } = cleaned;

    let mut messages = Vec::new();

    if !user_can_manage(db, user.id, from_account.id).await? {
        messages.push("You do not have permission to transfer from this account".to_string());
    }

    let balance = ledger::get_balance(db, from_account.id).await?;
    if balance < amount {
        messages.push(format!(
            "Insufficient balance on source account {} ({})",
            from_account.name, from_account.id
        ));
    }

    if from_account.id == to_account.id {
        messages.push("You must select two different accounts".to_string());
    }

    if from_account.currency != to_account.currency {
        messages.push("Accounts must share a currency".to_string());
    }

    if !messages.is_empty() {
        return Ok(TransferOutcome::Rejected(messages));
    }

    match ledger::create_transaction(db, &reason, amount, from_account.id, to_account.id).await {
        Ok(transaction) => Ok(TransferOutcome::Submitted(transaction)),
        Err(Error::UnbalancedTransaction { .. }) => Ok(TransferOutcome::Failed),
        Err(e) => Err(e),
    }
}
