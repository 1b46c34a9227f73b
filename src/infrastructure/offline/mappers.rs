use super::rows::QueuedRequestRow;
use crate::domain::entities::offline::QueuedRequest;
use crate::domain::value_objects::{HttpMethod, LocalId, QueuedRequestId, RequestHeaders, RequestUrl};
use crate::shared::error::AppError;
use chrono::{DateTime, SecondsFormat, Utc};

pub fn timestamp_to_db(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn timestamp_from_db(value: &str) -> Result<DateTime<Utc>, AppError> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|err| AppError::DeserializationError(format!("invalid created_at {value}: {err}")))
}

pub fn queued_request_from_row(row: QueuedRequestRow) -> Result<QueuedRequest, AppError> {
    let QueuedRequestRow {
        id,
        url,
        method,
        body,
        headers,
        created_at,
        local_id,
    } = row;

    Ok(QueuedRequest {
        id: QueuedRequestId::new(id).map_err(AppError::DeserializationError)?,
        url: RequestUrl::new(url).map_err(AppError::DeserializationError)?,
        method: method
            .parse::<HttpMethod>()
            .map_err(AppError::DeserializationError)?,
        body,
        headers: RequestHeaders::from_json(&headers).map_err(AppError::DeserializationError)?,
        created_at: timestamp_from_db(&created_at)?,
        local_id: local_id
            .map(LocalId::new)
            .transpose()
            .map_err(AppError::DeserializationError)?,
    })
}
