//! HTTP transport: bearer authentication, bounded timeouts and error mapping.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use shared::protocol::{PageBody, PageQuery};
use tracing::{debug, warn};

use crate::{
    error::{ClientError, ClientResult},
    session::AuthContext,
};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Clone)]
pub struct HttpTransport {
    http: Client,
    base_url: String,
    auth: AuthContext,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, auth: AuthContext) -> ClientResult<Self> {
        Self::with_timeout(base_url, auth, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        auth: AuthContext,
        timeout: Duration,
    ) -> ClientResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ClientError::NetworkFailure(err.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth,
            timeout,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> ClientResult<RequestBuilder> {
        let token = self.auth.token()?;
        Ok(self.http.request(method, self.url(path)).bearer_auth(token))
    }

    async fn execute(&self, builder: RequestBuilder) -> ClientResult<Response> {
        let response = builder
            .send()
            .await
            .map_err(|err| ClientError::from_reqwest(err, self.timeout))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().to_string();
        let body = response.text().await.unwrap_or_default();
        warn!(status = status.as_u16(), url = %url, "http: request rejected");
        Err(ClientError::from_status(status, &body))
    }

    async fn read_text(&self, response: Response) -> ClientResult<String> {
        response
            .text()
            .await
            .map_err(|err| ClientError::from_reqwest(err, self.timeout))
    }

    /// `GET path?query`, decoded as either list shape.
    pub async fn get_page<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &PageQuery,
    ) -> ClientResult<PageBody<T>> {
        debug!(path, page = query.page, page_size = query.page_size, search = ?query.value, "http: GET page");
        let response = self
            .execute(self.request(Method::GET, path)?.query(query))
            .await?;
        let body = self.read_text(response).await?;
        serde_json::from_str(&body).map_err(|err| ClientError::ParseFailure(err.to_string()))
    }

    /// `GET path`; a 404, an empty body or a JSON `null` all mean absent.
    pub async fn get_optional<T: DeserializeOwned>(&self, path: &str) -> ClientResult<Option<T>> {
        debug!(path, "http: GET");
        let builder = self.request(Method::GET, path)?;
        let response = match self.execute(builder).await {
            Ok(response) => response,
            Err(ClientError::HttpError { status, .. }) if status == StatusCode::NOT_FOUND.as_u16() => {
                return Ok(None);
            }
            Err(err) => return Err(err),
        };

        let body = self.read_text(response).await?;
        if body.trim().is_empty() {
            return Ok(None);
        }
        let value: Option<T> = serde_json::from_str(&body)
            .map_err(|err| ClientError::ParseFailure(err.to_string()))?;
        Ok(value)
    }

    /// Sends a JSON body; the response body is not required.
    pub async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> ClientResult<()> {
        debug!(%method, path, "http: send json");
        self.execute(self.request(method, path)?.json(body)).await?;
        Ok(())
    }

    pub async fn delete(&self, path: &str) -> ClientResult<()> {
        debug!(path, "http: DELETE");
        self.execute(self.request(Method::DELETE, path)?).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
