use api_types::ErrorBody;
use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::IntoResponse,
};
use store::StoreError;

pub use server::{ApiVersion, ServerState, router, run_with_listener};

#[macro_use]
mod macros;

mod accounts;
mod categories;
mod common;
mod expenses;
mod incomes;
mod server;
mod tags;
mod transfers;

#[derive(Debug)]
pub enum ServerError {
    Store(StoreError),
    NotFound(String),
    Validation(String),
    Conflict(String),
}

fn status_for_store_error(err: &StoreError) -> StatusCode {
    match err {
        StoreError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
        StoreError::Overflow(_) => StatusCode::UNPROCESSABLE_ENTITY,
        StoreError::Database(_) if err.is_constraint_violation() => StatusCode::CONFLICT,
        StoreError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn message_for_store_error(err: StoreError) -> String {
    match err {
        StoreError::Database(_) if err.is_constraint_violation() => {
            tracing::warn!("constraint violation: {err}");
            "request conflicts with existing data".to_string()
        }
        StoreError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Store(err) => (status_for_store_error(&err), message_for_store_error(err)),
            ServerError::NotFound(err) => (StatusCode::NOT_FOUND, err),
            ServerError::Validation(err) => (StatusCode::BAD_REQUEST, err),
            ServerError::Conflict(err) => (StatusCode::CONFLICT, err),
        };

        (status, Json(ErrorBody { error })).into_response()
    }
}

impl From<StoreError> for ServerError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for ServerError {
    fn from(rejection: PathRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ServerError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::DbErr;

    #[test]
    fn invalid_argument_maps_to_400() {
        let res = ServerError::from(StoreError::InvalidArgument("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn overflow_maps_to_422() {
        let res = ServerError::from(StoreError::Overflow("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn plain_database_error_maps_to_500() {
        let err = StoreError::Database(DbErr::Custom("boom".to_string()));
        let res = ServerError::from(err).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn not_found_maps_to_404() {
        let res = ServerError::NotFound("x".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn validation_maps_to_400() {
        let res = ServerError::Validation("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn conflict_maps_to_409() {
        let res = ServerError::Conflict("dup".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }
}
