use api_types::DateRange;
use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use axum_extra::extract::WithRejection;
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use store::{Money, Session};
use uuid::Uuid;

use crate::ServerError;

/// Extractor whose rejection answers `400` with an [`ErrorBody`](api_types::ErrorBody).
pub(crate) type Rejecting<E> = WithRejection<E, ServerError>;

/// `/{id}` path segment. Struct form so the `{version}` capture of the
/// versioned routes is ignored.
#[derive(Debug, Deserialize)]
pub(crate) struct IdPath {
    pub id: Uuid,
}

pub(crate) fn required_name(raw: &str, kind: &str) -> Result<String, ServerError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(ServerError::Validation(format!(
            "{kind} name must not be empty"
        )));
    }
    Ok(name.to_string())
}

pub(crate) fn required_id(id: Option<Uuid>, field: &str) -> Result<Uuid, ServerError> {
    match id {
        Some(id) if !id.is_nil() => Ok(id),
        _ => Err(ServerError::Validation(format!("{field} is required"))),
    }
}

pub(crate) fn positive_amount(raw: Option<&str>) -> Result<Money, ServerError> {
    let raw = raw.ok_or_else(|| ServerError::Validation("amount is required".to_string()))?;
    let amount: Money = raw.parse()?;
    if !amount.is_positive() {
        return Err(ServerError::Validation(
            "amount must be greater than zero".to_string(),
        ));
    }
    Ok(amount)
}

pub(crate) fn to_utc(timestamp: Option<DateTime<FixedOffset>>) -> Option<DateTime<Utc>> {
    timestamp.map(|ts| ts.with_timezone(&Utc))
}

pub(crate) fn normalize_comment(comment: Option<String>) -> Option<String> {
    comment
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
}

fn parse_bound(raw: &str, field: &str) -> Result<DateTime<Utc>, ServerError> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| ServerError::Validation(format!("{field} is not a valid date: `{raw}`")))
}

/// Inclusive `[start, end]` bounds of a `/daterange` query.
pub(crate) fn date_range(range: &DateRange) -> Result<(DateTime<Utc>, DateTime<Utc>), ServerError> {
    let start = parse_bound(&range.start_date, "startDate")?;
    let end = parse_bound(&range.end_date, "endDate")?;
    if start > end {
        return Err(ServerError::Validation(
            "startDate must not be after endDate".to_string(),
        ));
    }
    Ok((start, end))
}

pub(crate) async fn ensure_account(session: &Session, id: Uuid) -> Result<(), ServerError> {
    if session.accounts().get_by_id(id).await?.is_none() {
        return Err(ServerError::Validation(format!("account {id} does not exist")));
    }
    Ok(())
}

pub(crate) async fn ensure_category(session: &Session, id: Uuid) -> Result<(), ServerError> {
    if session.categories().get_by_id(id).await?.is_none() {
        return Err(ServerError::Validation(format!(
            "category {id} does not exist"
        )));
    }
    Ok(())
}

pub(crate) async fn ensure_tags(session: &Session, ids: &[Uuid]) -> Result<(), ServerError> {
    for id in ids {
        if session.tags().get_by_id(*id).await?.is_none() {
            return Err(ServerError::Validation(format!("tag {id} does not exist")));
        }
    }
    Ok(())
}

/// `201 Created` with a `Location` pointing at the new row.
pub(crate) fn created<T: Serialize>(resource: &str, id: Uuid, body: T) -> Response {
    let location = format!("/api/v1/{resource}/{id}");
    match HeaderValue::from_str(&location) {
        Ok(value) => (
            StatusCode::CREATED,
            [(header::LOCATION, value)],
            Json(body),
        )
            .into_response(),
        Err(_) => {
            tracing::error!("failed to encode location header {location}");
            (StatusCode::CREATED, Json(body)).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn trims_names() {
        assert_eq!(required_name("  Cash ", "account").unwrap(), "Cash");
        assert!(required_name("   ", "account").is_err());
    }

    #[test]
    fn nil_ids_are_missing() {
        assert!(required_id(None, "accountId").is_err());
        assert!(required_id(Some(Uuid::nil()), "accountId").is_err());
        assert!(required_id(Some(Uuid::new_v4()), "accountId").is_ok());
    }

    #[test]
    fn amounts_must_be_positive() {
        assert_eq!(positive_amount(Some("12.50")).unwrap(), Money::new(1250));
        assert!(positive_amount(Some("0")).is_err());
        assert!(positive_amount(Some("-1.00")).is_err());
        assert!(positive_amount(Some("1.001")).is_err());
        assert!(positive_amount(None).is_err());
    }

    #[test]
    fn blank_comment_is_none() {
        assert_eq!(normalize_comment(Some("  ".to_string())), None);
        assert_eq!(
            normalize_comment(Some(" rent ".to_string())),
            Some("rent".to_string())
        );
    }

    #[test]
    fn date_only_bounds_are_midnight_utc() {
        let range = DateRange {
            start_date: "2024-01-01".to_string(),
            end_date: "2024-01-31T23:59:59+00:00".to_string(),
        };
        let (start, end) = date_range(&range).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2024, 1, 31, 23, 59, 59).unwrap());
    }

    #[test]
    fn inverted_range_is_rejected() {
        let range = DateRange {
            start_date: "2024-02-01".to_string(),
            end_date: "2024-01-01".to_string(),
        };
        assert!(date_range(&range).is_err());
    }

    #[test]
    fn garbage_bound_is_rejected() {
        let range = DateRange {
            start_date: "yesterday".to_string(),
            end_date: "2024-01-01".to_string(),
        };
        assert!(date_range(&range).is_err());
    }
}
