use api_types::named::{NameSearch, NamedView};
use axum::{
    Json,
    extract::{Query, State},
};
use axum_extra::extract::WithRejection;
use sea_orm::{ColumnTrait, Condition};
use store::{Session, accounts, expenses, incomes, transfers};

use crate::{ServerError, ServerState, common::Rejecting};

named_handlers!(accounts, accounts, "account", "accounts", guard = delete_guard);

/// Accounts still booked against by expenses, incomes or transfers stay.
async fn delete_guard(session: &Session, account: &accounts::Model) -> Result<(), ServerError> {
    let id = account.id;
    let expenses = session
        .expenses()
        .count(Some(Condition::all().add(expenses::Column::AccountId.eq(id))))
        .await?;
    let incomes = session
        .incomes()
        .count(Some(Condition::all().add(incomes::Column::AccountId.eq(id))))
        .await?;
    let transfers = session
        .transfers()
        .count(Some(
            Condition::any()
                .add(transfers::Column::OutgoingAccountId.eq(id))
                .add(transfers::Column::IncomingAccountId.eq(id)),
        ))
        .await?;

    let references = expenses + incomes + transfers;
    if references > 0 {
        return Err(ServerError::Conflict(format!(
            "account {id} is referenced by {references} expense, income or transfer rows"
        )));
    }
    Ok(())
}

/// Case-insensitive substring search; an empty pattern lists every account.
pub async fn search(
    State(state): State<ServerState>,
    WithRejection(Query(query), _): Rejecting<Query<NameSearch>>,
) -> Result<Json<Vec<NamedView>>, ServerError> {
    let session = state.session();
    let pattern = query.name.unwrap_or_default();
    let rows = session.accounts().search_by_name(&pattern).await?;
    Ok(Json(rows.into_iter().map(view).collect()))
}
