use serde::{Deserialize, Serialize};
use std::fmt;

/// Absolute http(s) destination of a request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestUrl(String);

impl RequestUrl {
    pub fn new(value: String) -> Result<Self, String> {
        Self::validate(&value)?;
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path component without scheme, host or query string.
    pub fn path(&self) -> &str {
        let without_scheme = self
            .0
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(&self.0);
        let path = without_scheme
            .find('/')
            .map(|idx| &without_scheme[idx..])
            .unwrap_or("/");
        path.split(['?', '#']).next().unwrap_or(path)
    }

    fn validate(value: &str) -> Result<(), String> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err("Request URL cannot be empty".to_string());
        }
        let Some((scheme, rest)) = trimmed.split_once("://") else {
            return Err(format!("Request URL must be absolute: {trimmed}"));
        };
        if scheme != "http" && scheme != "https" {
            return Err(format!("Unsupported URL scheme: {scheme}"));
        }
        if rest.is_empty() || rest.starts_with('/') {
            return Err(format!("Request URL is missing a host: {trimmed}"));
        }
        Ok(())
    }
}

impl fmt::Display for RequestUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<RequestUrl> for String {
    fn from(value: RequestUrl) -> Self {
        value.0
    }
}
