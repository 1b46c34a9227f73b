use super::http_exchange::HttpRequest;
use crate::domain::value_objects::{HttpMethod, LocalId, QueuedRequestId, RequestHeaders, RequestUrl};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A mutating request waiting for delivery. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuedRequest {
    pub id: QueuedRequestId,
    pub url: RequestUrl,
    pub method: HttpMethod,
    pub body: Option<String>,
    pub headers: RequestHeaders,
    pub created_at: DateTime<Utc>,
    pub local_id: Option<LocalId>,
}

impl QueuedRequest {
    pub fn new(id: QueuedRequestId, draft: QueuedRequestDraft, created_at: DateTime<Utc>) -> Self {
        let QueuedRequestDraft {
            url,
            method,
            body,
            headers,
            local_id,
        } = draft;
        Self {
            id,
            url,
            method,
            body,
            headers,
            created_at,
            local_id,
        }
    }

    /// Strictly older than `ttl` at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now.signed_duration_since(self.created_at) > ttl
    }

    pub fn is_create(&self) -> bool {
        self.method == HttpMethod::Post
    }

    pub fn to_http_request(&self) -> HttpRequest {
        HttpRequest {
            method: self.method,
            url: self.url.clone(),
            headers: self.headers.clone(),
            body: self.body.clone(),
        }
    }

    /// Human-readable label for notifications, e.g. `POST /projects/p1/tasks "Draft report"`.
    pub fn describe(&self) -> String {
        match self.body_label() {
            Some(label) => format!("{} {} \"{}\"", self.method, self.url.path(), label),
            None => format!("{} {}", self.method, self.url.path()),
        }
    }

    fn body_label(&self) -> Option<String> {
        let body = self.body.as_deref()?;
        let value: serde_json::Value = serde_json::from_str(body).ok()?;
        ["name", "title"]
            .iter()
            .find_map(|key| value.get(*key).and_then(|v| v.as_str()))
            .map(str::to_string)
    }
}

/// Input to the durable store's append operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuedRequestDraft {
    pub url: RequestUrl,
    pub method: HttpMethod,
    pub body: Option<String>,
    pub headers: RequestHeaders,
    pub local_id: Option<LocalId>,
}

impl QueuedRequestDraft {
    pub fn new(
        url: RequestUrl,
        method: HttpMethod,
        body: Option<String>,
        headers: RequestHeaders,
        local_id: Option<LocalId>,
    ) -> Result<Self, String> {
        if !method.is_mutating() {
            return Err(format!("{method} requests are never queued"));
        }
        let body = match method {
            HttpMethod::Delete => body.filter(|b| !b.is_empty()),
            _ => body,
        };
        Ok(Self {
            url,
            method,
            body,
            headers,
            local_id,
        })
    }

    pub fn from_http_request(
        request: &HttpRequest,
        local_id: Option<LocalId>,
    ) -> Result<Self, String> {
        Self::new(
            request.url.clone(),
            request.method,
            request.body.clone(),
            request.headers.clone(),
            local_id,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(method: HttpMethod, body: Option<&str>) -> QueuedRequestDraft {
        QueuedRequestDraft::new(
            RequestUrl::new("https://api.example.com/projects/p1/tasks".into()).unwrap(),
            method,
            body.map(str::to_string),
            RequestHeaders::json_with_bearer("token"),
            None,
        )
        .unwrap()
    }

    #[test]
    fn get_drafts_are_rejected() {
        let result = QueuedRequestDraft::new(
            RequestUrl::new("https://api.example.com/projects".into()).unwrap(),
            HttpMethod::Get,
            None,
            RequestHeaders::new(),
            None,
        );
        assert!(result.is_err());
    }

    #[test]
    fn expiry_is_strictly_greater_than_ttl() {
        let now = Utc::now();
        let ttl = Duration::hours(24);
        let id = QueuedRequestId::new(1).unwrap();

        let old = QueuedRequest::new(id, draft(HttpMethod::Post, None), now - ttl - Duration::milliseconds(1));
        let exact = QueuedRequest::new(id, draft(HttpMethod::Post, None), now - ttl);
        let fresh = QueuedRequest::new(id, draft(HttpMethod::Post, None), now - ttl + Duration::milliseconds(1));

        assert!(old.is_expired(now, ttl));
        assert!(!exact.is_expired(now, ttl));
        assert!(!fresh.is_expired(now, ttl));
    }

    #[test]
    fn describe_uses_name_from_body() {
        let request = QueuedRequest::new(
            QueuedRequestId::new(3).unwrap(),
            draft(HttpMethod::Post, Some(r#"{"name":"Draft report"}"#)),
            Utc::now(),
        );
        assert_eq!(request.describe(), "POST /projects/p1/tasks \"Draft report\"");

        let delete = QueuedRequest::new(
            QueuedRequestId::new(4).unwrap(),
            draft(HttpMethod::Delete, Some("")),
            Utc::now(),
        );
        assert!(delete.body.is_none());
        assert_eq!(delete.describe(), "DELETE /projects/p1/tasks");
    }
}
