use api_types::{
    DateRange, TotalView,
    income::{IncomeBody, IncomeView},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
};
use axum_extra::extract::WithRejection;
use chrono::{DateTime, Utc};
use store::{Money, Session, incomes};
use uuid::Uuid;

use crate::{
    ServerError, ServerState,
    common::{
        IdPath, Rejecting, created, date_range, ensure_account, ensure_category,
        normalize_comment, positive_amount, required_id, to_utc,
    },
};

fn view(model: incomes::Model) -> IncomeView {
    IncomeView {
        id: model.id,
        category_id: model.category_id,
        account_id: model.account_id,
        amount: model.amount.to_string(),
        timestamp: model.timestamp,
        comment: model.comment,
    }
}

fn views(rows: Vec<incomes::Model>) -> Json<Vec<IncomeView>> {
    Json(rows.into_iter().map(view).collect())
}

fn not_found(id: Uuid) -> ServerError {
    ServerError::NotFound(format!("income {id} not found"))
}

/// A request body that passed validation.
struct ValidIncome {
    category_id: Uuid,
    account_id: Uuid,
    amount: Money,
    timestamp: Option<DateTime<Utc>>,
    comment: Option<String>,
}

async fn validate(session: &Session, body: IncomeBody) -> Result<ValidIncome, ServerError> {
    let category_id = required_id(body.category_id, "category_id")?;
    let account_id = required_id(body.account_id, "account_id")?;
    let amount = positive_amount(body.amount.as_deref())?;

    ensure_category(session, category_id).await?;
    ensure_account(session, account_id).await?;

    Ok(ValidIncome {
        category_id,
        account_id,
        amount,
        timestamp: to_utc(body.timestamp),
        comment: normalize_comment(body.comment),
    })
}

pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<IncomeView>>, ServerError> {
    let rows = state.session().incomes().get_all_ordered_by_date().await?;
    Ok(views(rows))
}

pub async fn get(
    State(state): State<ServerState>,
    WithRejection(Path(IdPath { id }), _): Rejecting<Path<IdPath>>,
) -> Result<Json<IncomeView>, ServerError> {
    let model = state
        .session()
        .incomes()
        .get_by_id(id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(view(model)))
}

pub async fn by_account(
    State(state): State<ServerState>,
    WithRejection(Path(IdPath { id }), _): Rejecting<Path<IdPath>>,
) -> Result<Json<Vec<IncomeView>>, ServerError> {
    let rows = state.session().incomes().get_by_account(id).await?;
    Ok(views(rows))
}

pub async fn by_category(
    State(state): State<ServerState>,
    WithRejection(Path(IdPath { id }), _): Rejecting<Path<IdPath>>,
) -> Result<Json<Vec<IncomeView>>, ServerError> {
    let rows = state.session().incomes().get_by_category(id).await?;
    Ok(views(rows))
}

pub async fn by_date_range(
    State(state): State<ServerState>,
    WithRejection(Query(range), _): Rejecting<Query<DateRange>>,
) -> Result<Json<Vec<IncomeView>>, ServerError> {
    let (start, end) = date_range(&range)?;
    let rows = state
        .session()
        .incomes()
        .get_by_date_range(start, end)
        .await?;
    Ok(views(rows))
}

pub async fn by_account_and_date_range(
    State(state): State<ServerState>,
    WithRejection(Path(IdPath { id }), _): Rejecting<Path<IdPath>>,
    WithRejection(Query(range), _): Rejecting<Query<DateRange>>,
) -> Result<Json<Vec<IncomeView>>, ServerError> {
    let (start, end) = date_range(&range)?;
    let rows = state
        .session()
        .incomes()
        .get_by_account_and_date_range(id, start, end)
        .await?;
    Ok(views(rows))
}

pub async fn total_by_account(
    State(state): State<ServerState>,
    WithRejection(Path(IdPath { id }), _): Rejecting<Path<IdPath>>,
) -> Result<Json<TotalView>, ServerError> {
    let total = state.session().incomes().get_total_by_account(id).await?;
    Ok(Json(TotalView {
        id,
        total: total.to_string(),
    }))
}

pub async fn total_by_category(
    State(state): State<ServerState>,
    WithRejection(Path(IdPath { id }), _): Rejecting<Path<IdPath>>,
) -> Result<Json<TotalView>, ServerError> {
    let total = state.session().incomes().get_total_by_category(id).await?;
    Ok(Json(TotalView {
        id,
        total: total.to_string(),
    }))
}

pub async fn create(
    State(state): State<ServerState>,
    WithRejection(Json(body), _): Rejecting<Json<IncomeBody>>,
) -> Result<Response, ServerError> {
    let session = state.session();
    let valid = validate(&session, body).await?;
    let model = incomes::Model::new(
        valid.category_id,
        valid.account_id,
        valid.amount,
        valid.timestamp.unwrap_or_else(Utc::now),
        valid.comment,
    );

    let repo = session.incomes();
    repo.insert(&model);
    repo.save_changes().await?;
    tracing::info!(id = %model.id, amount = %model.amount, "created income");

    Ok(created("incomes", model.id, view(model)))
}

pub async fn update(
    State(state): State<ServerState>,
    WithRejection(Path(IdPath { id }), _): Rejecting<Path<IdPath>>,
    WithRejection(Json(body), _): Rejecting<Json<IncomeBody>>,
) -> Result<StatusCode, ServerError> {
    let session = state.session();
    let repo = session.incomes();
    let mut model = repo.get_by_id(id).await?.ok_or_else(|| not_found(id))?;
    let valid = validate(&session, body).await?;

    model.category_id = valid.category_id;
    model.account_id = valid.account_id;
    model.amount = valid.amount;
    model.timestamp = valid.timestamp.unwrap_or(model.timestamp);
    model.comment = valid.comment;
    repo.update(&model);
    repo.save_changes().await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete(
    State(state): State<ServerState>,
    WithRejection(Path(IdPath { id }), _): Rejecting<Path<IdPath>>,
) -> Result<StatusCode, ServerError> {
    let session = state.session();
    let repo = session.incomes();
    let model = repo.get_by_id(id).await?.ok_or_else(|| not_found(id))?;
    repo.delete(&model);
    repo.save_changes().await?;
    tracing::info!(id = %id, "deleted income");

    Ok(StatusCode::NO_CONTENT)
}
