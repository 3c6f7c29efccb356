use api_types::{
    DateRange, TotalView,
    expense::{ExpenseBody, ExpenseView},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
};
use axum_extra::extract::WithRejection;
use chrono::{DateTime, Utc};
use store::{Money, Session, expenses};
use uuid::Uuid;

use crate::{
    ServerError, ServerState,
    common::{
        IdPath, Rejecting, created, date_range, ensure_account, ensure_category, ensure_tags,
        normalize_comment, positive_amount, required_id, to_utc,
    },
};

fn view(model: expenses::Model, tag_ids: Vec<Uuid>) -> ExpenseView {
    ExpenseView {
        id: model.id,
        category_id: model.category_id,
        account_id: model.account_id,
        amount: model.amount.to_string(),
        timestamp: model.timestamp,
        comment: model.comment,
        tag_ids,
    }
}

async fn views(
    session: &Session,
    rows: Vec<expenses::Model>,
) -> Result<Json<Vec<ExpenseView>>, ServerError> {
    let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
    let mut tags = session.expenses().tag_ids_for(&ids).await?;
    Ok(Json(
        rows.into_iter()
            .map(|row| {
                let tag_ids = tags.remove(&row.id).unwrap_or_default();
                view(row, tag_ids)
            })
            .collect(),
    ))
}

fn not_found(id: Uuid) -> ServerError {
    ServerError::NotFound(format!("expense {id} not found"))
}

/// A request body that passed validation.
struct ValidExpense {
    category_id: Uuid,
    account_id: Uuid,
    amount: Money,
    timestamp: Option<DateTime<Utc>>,
    comment: Option<String>,
    tag_ids: Vec<Uuid>,
}

async fn validate(session: &Session, body: ExpenseBody) -> Result<ValidExpense, ServerError> {
    let category_id = required_id(body.category_id, "category_id")?;
    let account_id = required_id(body.account_id, "account_id")?;
    let amount = positive_amount(body.amount.as_deref())?;

    ensure_category(session, category_id).await?;
    ensure_account(session, account_id).await?;
    ensure_tags(session, &body.tag_ids).await?;

    Ok(ValidExpense {
        category_id,
        account_id,
        amount,
        timestamp: to_utc(body.timestamp),
        comment: normalize_comment(body.comment),
        tag_ids: body.tag_ids,
    })
}

pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<ExpenseView>>, ServerError> {
    let session = state.session();
    let rows = session.expenses().get_all_ordered_by_date().await?;
    views(&session, rows).await
}

pub async fn get(
    State(state): State<ServerState>,
    WithRejection(Path(IdPath { id }), _): Rejecting<Path<IdPath>>,
) -> Result<Json<ExpenseView>, ServerError> {
    let session = state.session();
    let repo = session.expenses();
    let model = repo.get_by_id(id).await?.ok_or_else(|| not_found(id))?;
    let tag_ids = repo.tag_ids(id).await?;
    Ok(Json(view(model, tag_ids)))
}

pub async fn by_account(
    State(state): State<ServerState>,
    WithRejection(Path(IdPath { id }), _): Rejecting<Path<IdPath>>,
) -> Result<Json<Vec<ExpenseView>>, ServerError> {
    let session = state.session();
    let rows = session.expenses().get_by_account(id).await?;
    views(&session, rows).await
}

pub async fn by_category(
    State(state): State<ServerState>,
    WithRejection(Path(IdPath { id }), _): Rejecting<Path<IdPath>>,
) -> Result<Json<Vec<ExpenseView>>, ServerError> {
    let session = state.session();
    let rows = session.expenses().get_by_category(id).await?;
    views(&session, rows).await
}

pub async fn by_date_range(
    State(state): State<ServerState>,
    WithRejection(Query(range), _): Rejecting<Query<DateRange>>,
) -> Result<Json<Vec<ExpenseView>>, ServerError> {
    let (start, end) = date_range(&range)?;
    let session = state.session();
    let rows = session.expenses().get_by_date_range(start, end).await?;
    views(&session, rows).await
}

pub async fn by_account_and_date_range(
    State(state): State<ServerState>,
    WithRejection(Path(IdPath { id }), _): Rejecting<Path<IdPath>>,
    WithRejection(Query(range), _): Rejecting<Query<DateRange>>,
) -> Result<Json<Vec<ExpenseView>>, ServerError> {
    let (start, end) = date_range(&range)?;
    let session = state.session();
    let rows = session
        .expenses()
        .get_by_account_and_date_range(id, start, end)
        .await?;
    views(&session, rows).await
}

pub async fn total_by_account(
    State(state): State<ServerState>,
    WithRejection(Path(IdPath { id }), _): Rejecting<Path<IdPath>>,
) -> Result<Json<TotalView>, ServerError> {
    let total = state.session().expenses().get_total_by_account(id).await?;
    Ok(Json(TotalView {
        id,
        total: total.to_string(),
    }))
}

pub async fn total_by_category(
    State(state): State<ServerState>,
    WithRejection(Path(IdPath { id }), _): Rejecting<Path<IdPath>>,
) -> Result<Json<TotalView>, ServerError> {
    let total = state.session().expenses().get_total_by_category(id).await?;
    Ok(Json(TotalView {
        id,
        total: total.to_string(),
    }))
}

/// Stores the expense and its tag links in one unit of work.
pub async fn create(
    State(state): State<ServerState>,
    WithRejection(Json(body), _): Rejecting<Json<ExpenseBody>>,
) -> Result<Response, ServerError> {
    let session = state.session();
    let valid = validate(&session, body).await?;

    let model = expenses::Model::new(
        valid.category_id,
        valid.account_id,
        valid.amount,
        valid.timestamp.unwrap_or_else(Utc::now),
        valid.comment,
    );
    let repo = session.expenses();
    repo.insert(&model);
    repo.stage_tags(model.id, &valid.tag_ids);
    session.save_changes().await?;
    tracing::info!(id = %model.id, amount = %model.amount, "created expense");

    let tag_ids = repo.tag_ids(model.id).await?;
    Ok(created("expenses", model.id, view(model, tag_ids)))
}

/// Replaces every field and the tag set. A missing timestamp keeps the stored one.
pub async fn update(
    State(state): State<ServerState>,
    WithRejection(Path(IdPath { id }), _): Rejecting<Path<IdPath>>,
    WithRejection(Json(body), _): Rejecting<Json<ExpenseBody>>,
) -> Result<StatusCode, ServerError> {
    let session = state.session();
    let repo = session.expenses();
    let mut model = repo.get_by_id(id).await?.ok_or_else(|| not_found(id))?;
    let valid = validate(&session, body).await?;

    model.category_id = valid.category_id;
    model.account_id = valid.account_id;
    model.amount = valid.amount;
    model.timestamp = valid.timestamp.unwrap_or(model.timestamp);
    model.comment = valid.comment;
    repo.update(&model);
    repo.replace_tags(id, &valid.tag_ids);
    session.save_changes().await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete(
    State(state): State<ServerState>,
    WithRejection(Path(IdPath { id }), _): Rejecting<Path<IdPath>>,
) -> Result<StatusCode, ServerError> {
    let session = state.session();
    let repo = session.expenses();
    let model = repo.get_by_id(id).await?.ok_or_else(|| not_found(id))?;
    repo.delete(&model);
    repo.save_changes().await?;
    tracing::info!(id = %id, "deleted expense");

    Ok(StatusCode::NO_CONTENT)
}
