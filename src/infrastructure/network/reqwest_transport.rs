use crate::application::ports::HttpTransport;
use crate::domain::entities::offline::{HttpRequest, HttpResponse};
use crate::domain::value_objects::HttpMethod;
use crate::shared::config::ApiConfig;
use crate::shared::error::AppError;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| AppError::ConfigurationError(format!("http client: {err}")))?;
        Ok(Self { client })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self, AppError> {
        Self::new(config.timeout())
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, AppError> {
        let url = request.url.as_str();
        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(url),
            HttpMethod::Post => self.client.post(url),
            HttpMethod::Put => self.client.put(url),
            HttpMethod::Delete => self.client.delete(url),
        };
        for (name, value) in request.headers.iter() {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        tracing::trace!(
            target: "offline::http",
            method = %request.method,
            url,
            status,
            "http exchange completed"
        );
        Ok(HttpResponse::new(status, body))
    }
}
