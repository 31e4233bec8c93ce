//! Account list, transfer form and account detail.

use super::{
    auth::{CurrentUser, denied},
    error::AppResult,
};
use crate::{
    context::AppContext,
    core::{
        access::Access,
        account::{self, AccountBalance, NOT_AUTHORIZED_MESSAGE, TransferForm},
        ledger,
    },
    entities::{account as account_entity, entry, ledger_transaction},
};
use axum::{
    Form, Json,
    extract::{Path, State},
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;
use tracing::info;

#[derive(Debug, Serialize)]
struct AccountView {
    #[serde(flatten)]
    account: account_entity::Model,
    balance: i64,
}

impl From<AccountBalance> for AccountView {
    fn from(found: AccountBalance) -> Self {
        Self {
            account: found.account,
            balance: found.balance,
        }
    }
}

#[derive(Debug, Serialize)]
struct HistoryLine {
    #[serde(flatten)]
    entry: entry::Model,
    transaction: Option<ledger_transaction::Model>,
}

#[derive(Debug, Serialize)]
struct AccountDetailView {
    #[serde(flatten)]
    account: AccountView,
    history: Vec<HistoryLine>,
}

#[derive(Debug, Serialize)]
struct AccountListView {
    accounts: Vec<AccountView>,
    from_choices: Vec<account_entity::Model>,
    to_choices: Vec<account_entity::Model>,
}

fn login_required(user: &CurrentUser, uri: &Uri, ctx: &AppContext) -> Option<Response> {
    let access = if user.0.is_some() {
        Access::Granted
    } else {
        Access::LoginRequired
    };
    denied(access, uri, &ctx.config.server.login_url)
}

/// `GET /accounts`
pub async fn list(State(ctx): State<AppContext>, user: CurrentUser, uri: Uri) -> AppResult<Response> {
    if let Some(redirect) = login_required(&user, &uri, &ctx) {
        return Ok(redirect);
    }
    let Some(user) = user.0 else {
        return Ok(StatusCode::UNAUTHORIZED.into_response());
    };

    let view = AccountListView {
        accounts: account::accounts_owned_by(&ctx.db, user.id)
            .await?
            .into_iter()
            .map(AccountView::from)
            .collect(),
        from_choices: account::transferable_accounts(&ctx.db, user.id).await?,
        to_choices: account::all_accounts(&ctx.db).await?,
    };
    Ok(Json(view).into_response())
}

/// `POST /accounts`
pub async fn transfer(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    uri: Uri,
    Form(form): Form<TransferForm>,
) -> AppResult<Response> {
    if let Some(redirect) = login_required(&user, &uri, &ctx) {
        return Ok(redirect);
    }
    let Some(user) = user.0 else {
        return Ok(StatusCode::UNAUTHORIZED.into_response());
    };

    let outcome = account::transfer(&ctx.db, &user, &form).await?;
    info!("Transfer by {}: {:?}", user.username, outcome.messages());
    Ok(Json(json!({
        "messages": outcome.messages(),
        "redirect": "/accounts",
    }))
    .into_response())
}

/// `GET /accounts/:id`
pub async fn detail(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    uri: Uri,
    Path(account_id): Path<i64>,
) -> AppResult<Response> {
    if let Some(redirect) = login_required(&user, &uri, &ctx) {
        return Ok(redirect);
    }
    let Some(user) = user.0 else {
        return Ok(StatusCode::UNAUTHORIZED.into_response());
    };

    match account::account_detail(&ctx.db, &user, account_id).await? {
        Some(found) => {
            let history = ledger::account_history(&ctx.db, found.account.id)
                .await?
                .into_iter()
                .map(|(entry, transaction)| HistoryLine { entry, transaction })
                .collect();
            let view = AccountDetailView {
                account: AccountView::from(found),
                history,
            };
            Ok(Json(view).into_response())
        }
        None => Ok((StatusCode::NOT_FOUND, Json(json!({ "error": NOT_AUTHORIZED_MESSAGE }))).into_response()),
    }
}
