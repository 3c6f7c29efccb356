use api_types::{
    DateRange,
    transfer::{TransferBody, TransferView},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
};
use axum_extra::extract::WithRejection;
use chrono::{DateTime, Utc};
use store::{Money, Session, transfers};
use uuid::Uuid;

use crate::{
    ServerError, ServerState,
    common::{
        IdPath, Rejecting, created, date_range, ensure_account, normalize_comment,
        positive_amount, required_id, to_utc,
    },
};

fn view(model: transfers::Model) -> TransferView {
    TransferView {
        id: model.id,
        outgoing_account_id: model.outgoing_account_id,
        incoming_account_id: model.incoming_account_id,
        amount: model.amount.to_string(),
        timestamp: model.timestamp,
        comment: model.comment,
    }
}

fn views(rows: Vec<transfers::Model>) -> Json<Vec<TransferView>> {
    Json(rows.into_iter().map(view).collect())
}

fn not_found(id: Uuid) -> ServerError {
    ServerError::NotFound(format!("transfer {id} not found"))
}

struct ValidTransfer {
    outgoing_account_id: Uuid,
    incoming_account_id: Uuid,
    amount: Money,
    timestamp: Option<DateTime<Utc>>,
    comment: Option<String>,
}

async fn validate(session: &Session, body: TransferBody) -> Result<ValidTransfer, ServerError> {
    let outgoing_account_id = required_id(body.outgoing_account_id, "outgoing_account_id")?;
    let incoming_account_id = required_id(body.incoming_account_id, "incoming_account_id")?;
    if outgoing_account_id == incoming_account_id {
        return Err(ServerError::Validation(
            "outgoing and incoming account must differ".to_string(),
        ));
    }
    let amount = positive_amount(body.amount.as_deref())?;

    ensure_account(session, outgoing_account_id).await?;
    ensure_account(session, incoming_account_id).await?;

    Ok(ValidTransfer {
        outgoing_account_id,
        incoming_account_id,
        amount,
        timestamp: to_utc(body.timestamp),
        comment: normalize_comment(body.comment),
    })
}

pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<TransferView>>, ServerError> {
    let rows = state.session().transfers().get_all_ordered_by_date().await?;
    Ok(views(rows))
}

pub async fn get(
    State(state): State<ServerState>,
    WithRejection(Path(IdPath { id }), _): Rejecting<Path<IdPath>>,
) -> Result<Json<TransferView>, ServerError> {
    let model = state
        .session()
        .transfers()
        .get_by_id(id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(view(model)))
}

/// Transfers on either side of the account.
pub async fn by_account(
    State(state): State<ServerState>,
    WithRejection(Path(IdPath { id }), _): Rejecting<Path<IdPath>>,
) -> Result<Json<Vec<TransferView>>, ServerError> {
    let rows = state.session().transfers().get_by_account(id).await?;
    Ok(views(rows))
}

pub async fn by_outgoing_account(
    State(state): State<ServerState>,
    WithRejection(Path(IdPath { id }), _): Rejecting<Path<IdPath>>,
) -> Result<Json<Vec<TransferView>>, ServerError> {
    let rows = state.session().transfers().get_by_outgoing_account(id).await?;
    Ok(views(rows))
}

pub async fn by_incoming_account(
    State(state): State<ServerState>,
    WithRejection(Path(IdPath { id }), _): Rejecting<Path<IdPath>>,
) -> Result<Json<Vec<TransferView>>, ServerError> {
    let rows = state.session().transfers().get_by_incoming_account(id).await?;
    Ok(views(rows))
}

pub async fn by_date_range(
    State(state): State<ServerState>,
    WithRejection(Query(range), _): Rejecting<Query<DateRange>>,
) -> Result<Json<Vec<TransferView>>, ServerError> {
    let (start, end) = date_range(&range)?;
    let rows = state
        .session()
        .transfers()
        .get_by_date_range(start, end)
        .await?;
    Ok(views(rows))
}

pub async fn by_account_and_date_range(
    State(state): State<ServerState>,
    WithRejection(Path(IdPath { id }), _): Rejecting<Path<IdPath>>,
    WithRejection(Query(range), _): Rejecting<Query<DateRange>>,
) -> Result<Json<Vec<TransferView>>, ServerError> {
    let (start, end) = date_range(&range)?;
    let rows = state
        .session()
        .transfers()
        .get_by_account_and_date_range(id, start, end)
        .await?;
    Ok(views(rows))
}

pub async fn create(
    State(state): State<ServerState>,
    WithRejection(Json(body), _): Rejecting<Json<TransferBody>>,
) -> Result<Response, ServerError> {
    let session = state.session();
    let valid = validate(&session, body).await?;
    let model = transfers::Model::new(
        valid.outgoing_account_id,
        valid.incoming_account_id,
        valid.amount,
        valid.timestamp.unwrap_or_else(Utc::now),
        valid.comment,
    );

    let repo = session.transfers();
    repo.insert(&model);
    repo.save_changes().await?;
    tracing::info!(
        id = %model.id,
        from = %model.outgoing_account_id,
        to = %model.incoming_account_id,
        amount = %model.amount,
        "created transfer"
    );

    Ok(created("transfers", model.id, view(model)))
}

pub async fn update(
    State(state): State<ServerState>,
    WithRejection(Path(IdPath { id }), _): Rejecting<Path<IdPath>>,
    WithRejection(Json(body), _): Rejecting<Json<TransferBody>>,
) -> Result<StatusCode, ServerError> {
    let session = state.session();
    let repo = session.transfers();
    let mut model = repo.get_by_id(id).await?.ok_or_else(|| not_found(id))?;
    let valid = validate(&session, body).await?;

    model.outgoing_account_id = valid.outgoing_account_id;
    model.incoming_account_id = valid.incoming_account_id;
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
    let repo = session.transfers();
    let model = repo.get_by_id(id).await?.ok_or_else(|| not_found(id))?;
    repo.delete(&model);
    repo.save_changes().await?;
    tracing::info!(id = %id, "deleted transfer");

    Ok(StatusCode::NO_CONTENT)
}
