use crate::domain::entities::offline::HttpResponse;
use crate::domain::value_objects::{RequestHeaders, RequestUrl};
use crate::shared::error::AppError;
use std::fmt;

/// Opaque bearer token attached to every backend call.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn headers(&self) -> RequestHeaders {
        RequestHeaders::json_with_bearer(&self.0)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

#[derive(Debug, Clone)]
pub struct ApiRoutes {
    base_url: String,
}

impl ApiRoutes {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn projects(&self) -> Result<RequestUrl, AppError> {
        self.build("/projects")
    }

    pub fn project(&self, project_id: &str) -> Result<RequestUrl, AppError> {
        self.build(&format!("/projects/{project_id}"))
    }

    pub fn tasks(&self, project_id: &str) -> Result<RequestUrl, AppError> {
        self.build(&format!("/projects/{project_id}/tasks"))
    }

    pub fn task(&self, project_id: &str, task_id: &str) -> Result<RequestUrl, AppError> {
        self.build(&format!("/projects/{project_id}/tasks/{task_id}"))
    }

    fn build(&self, path: &str) -> Result<RequestUrl, AppError> {
        RequestUrl::new(format!("{}{path}", self.base_url)).map_err(AppError::ValidationError)
    }
}

/// Collection a creation request targets, recognized from the URL path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateRoute {
    Projects,
    ProjectTasks { project_id: String },
}

impl CreateRoute {
    /// Matches the trailing segments so that base URLs with a path prefix still resolve.
    pub fn from_path(path: &str) -> Option<Self> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [.., "projects", project_id, "tasks"] => Some(Self::ProjectTasks {
                project_id: (*project_id).to_string(),
            }),
            [.., "projects"] => Some(Self::Projects),
            _ => None,
        }
    }
}

/// Maps a non-2xx backend answer to the matching application error.
pub(crate) fn expect_success(response: HttpResponse) -> Result<HttpResponse, AppError> {
    if response.is_success() {
        return Ok(response);
    }
    let message = format!("backend responded with status {}: {}", response.status, response.body);
    Err(match response.status {
        404 => AppError::NotFound(message),
        400 | 409 | 422 => AppError::ValidationError(message),
        _ => AppError::Network(message),
    })
}
