use std::{collections::HashMap, fmt, str::FromStr};

use axum::{
    Router,
    extract::{Path, Query, Request},
    middleware::{self, Next},
    response::Response,
    routing::get,
};
use axum_extra::{
    extract::WithRejection,
    headers::{Error as AxumError, Header, HeaderMapExt},
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use store::Session;

use crate::{
    ServerError, accounts, categories, common::Rejecting, expenses, incomes, tags, transfers,
};

static API_VERSION_HEADER: axum::http::HeaderName =
    axum::http::HeaderName::from_static("x-api-version");

#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
}

impl ServerState {
    /// Fresh unit of work for one request.
    pub fn session(&self) -> Session {
        Session::new(self.db.clone())
    }
}

/// API version negotiated for a request.
///
/// Accepted spellings are `1`, `1.0`, `v1` and `v1.0`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ApiVersion {
    pub major: u16,
    pub minor: u16,
}

impl ApiVersion {
    pub const V1: ApiVersion = ApiVersion { major: 1, minor: 0 };

    const SUPPORTED: &[ApiVersion] = &[Self::V1];

    fn is_supported(&self) -> bool {
        Self::SUPPORTED.contains(self)
    }
}

impl Default for ApiVersion {
    fn default() -> Self {
        Self::V1
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for ApiVersion {
    type Err = ServerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ServerError::Validation(format!("invalid API version `{s}`"));
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix('v')
            .or_else(|| trimmed.strip_prefix('V'))
            .unwrap_or(trimmed);
        let (major, minor) = match digits.split_once('.') {
            Some((major, minor)) => (major, minor),
            None => (digits, "0"),
        };
        let major = major.parse().map_err(|_| invalid())?;
        let minor = minor.parse().map_err(|_| invalid())?;
        Ok(ApiVersion { major, minor })
    }
}

/// Typed `x-api-version` header.
#[derive(Debug)]
struct ApiVersionHeader(ApiVersion);

impl Header for ApiVersionHeader {
    fn name() -> &'static axum::http::HeaderName {
        &API_VERSION_HEADER
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, AxumError>
    where
        Self: Sized,
        I: Iterator<Item = &'i axum::http::HeaderValue>,
    {
        let value = values.next().ok_or_else(AxumError::invalid)?;
        let Ok(value) = value.to_str() else {
            return Err(AxumError::invalid());
        };
        let Ok(version) = value.parse() else {
            return Err(AxumError::invalid());
        };

        Ok(ApiVersionHeader(version))
    }

    fn encode<E: Extend<axum::http::HeaderValue>>(&self, values: &mut E) {
        let as_string = self.0.to_string();
        match axum::http::HeaderValue::from_str(&as_string) {
            Ok(value) => values.extend(std::iter::once(value)),
            Err(_) => tracing::error!("failed to encode x-api-version header"),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct VersionQuery {
    #[serde(rename = "api-version")]
    api_version: Option<String>,
}

fn accept(version: ApiVersion, mut request: Request) -> Result<Request, ServerError> {
    if !version.is_supported() {
        return Err(ServerError::Validation(format!(
            "unsupported API version {version}"
        )));
    }
    request.extensions_mut().insert(version);
    Ok(request)
}

/// Version taken from the `/api/{version}/...` path segment.
async fn path_version(
    WithRejection(Path(params), _): Rejecting<Path<HashMap<String, String>>>,
    request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let version = match params.get("version") {
        Some(raw) => raw.parse()?,
        None => ApiVersion::default(),
    };
    Ok(next.run(accept(version, request)?).await)
}

/// Version for unversioned `/api/...` paths: header first, then the
/// `api-version` query parameter, then the default.
async fn negotiated_version(
    WithRejection(Query(query), _): Rejecting<Query<VersionQuery>>,
    request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let version_header = request
        .headers()
        .typed_try_get::<ApiVersionHeader>()
        .map_err(|_| ServerError::Validation("invalid x-api-version header".to_string()))?;
    let version = match (version_header, query.api_version) {
        (Some(ApiVersionHeader(version)), _) => version,
        (None, Some(raw)) => raw.parse()?,
        (None, None) => ApiVersion::default(),
    };
    Ok(next.run(accept(version, request)?).await)
}

fn resources() -> Router<ServerState> {
    Router::new()
        .route("/accounts", get(accounts::list).post(accounts::create))
        .route("/accounts/search", get(accounts::search))
        .route(
            "/accounts/{id}",
            get(accounts::get)
                .put(accounts::update)
                .delete(accounts::delete),
        )
        .route("/categories", get(categories::list).post(categories::create))
        .route(
            "/categories/{id}",
            get(categories::get)
                .put(categories::update)
                .delete(categories::delete),
        )
        .route("/tags", get(tags::list).post(tags::create))
        .route(
            "/tags/{id}",
            get(tags::get).put(tags::update).delete(tags::delete),
        )
        .route("/expenses", get(expenses::list).post(expenses::create))
        .route("/expenses/daterange", get(expenses::by_date_range))
        .route("/expenses/account/{id}", get(expenses::by_account))
        .route(
            "/expenses/account/{id}/daterange",
            get(expenses::by_account_and_date_range),
        )
        .route("/expenses/account/{id}/total", get(expenses::total_by_account))
        .route("/expenses/category/{id}", get(expenses::by_category))
        .route(
            "/expenses/category/{id}/total",
            get(expenses::total_by_category),
        )
        .route(
            "/expenses/{id}",
            get(expenses::get)
                .put(expenses::update)
                .delete(expenses::delete),
        )
        .route("/incomes", get(incomes::list).post(incomes::create))
        .route("/incomes/daterange", get(incomes::by_date_range))
        .route("/incomes/account/{id}", get(incomes::by_account))
        .route(
            "/incomes/account/{id}/daterange",
            get(incomes::by_account_and_date_range),
        )
        .route("/incomes/account/{id}/total", get(incomes::total_by_account))
        .route("/incomes/category/{id}", get(incomes::by_category))
        .route(
            "/incomes/category/{id}/total",
            get(incomes::total_by_category),
        )
        .route(
            "/incomes/{id}",
            get(incomes::get)
                .put(incomes::update)
                .delete(incomes::delete),
        )
        .route("/transfers", get(transfers::list).post(transfers::create))
        .route("/transfers/daterange", get(transfers::by_date_range))
        .route("/transfers/account/{id}", get(transfers::by_account))
        .route(
            "/transfers/account/{id}/daterange",
            get(transfers::by_account_and_date_range),
        )
        .route("/transfers/outgoing/{id}", get(transfers::by_outgoing_account))
        .route("/transfers/incoming/{id}", get(transfers::by_incoming_account))
        .route(
            "/transfers/{id}",
            get(transfers::get)
                .put(transfers::update)
                .delete(transfers::delete),
        )
}

/// Every resource is served under `/api/{version}/...` and under `/api/...`.
pub fn router(state: ServerState) -> Router {
    Router::new()
        .nest(
            "/api/{version}",
            resources().route_layer(middleware::from_fn(path_version)),
        )
        .nest(
            "/api",
            resources().route_layer(middleware::from_fn(negotiated_version)),
        )
        .with_state(state)
}

pub async fn run_with_listener(
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(ServerState { db })).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_version_spellings() {
        for raw in ["1", "1.0", "v1", "v1.0", " V1 "] {
            let version: ApiVersion = raw.parse().unwrap();
            assert_eq!(version, ApiVersion::V1, "{raw}");
        }
    }

    #[test]
    fn rejects_garbage_version() {
        assert!("one".parse::<ApiVersion>().is_err());
        assert!("v".parse::<ApiVersion>().is_err());
        assert!("1.x".parse::<ApiVersion>().is_err());
    }

    #[test]
    fn only_v1_is_supported() {
        assert!(ApiVersion::V1.is_supported());
        assert!(!"2.0".parse::<ApiVersion>().unwrap().is_supported());
    }
}
