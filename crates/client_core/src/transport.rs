use reqwest::{Client, Method};
use serde::{de::DeserializeOwned, Serialize};
use shared::error::ApiError;
use tracing::debug;
use url::Url;

use crate::error::{ClientError, Result};

/// JSON-over-HTTP access to the server's `/rest/` API.
#[derive(Debug, Clone)]
pub struct RestTransport {
    http: Client,
    base: Url,
}

impl RestTransport {
    pub fn new(server_url: &str) -> Result<Self> {
        Self::with_client(Client::new(), server_url)
    }

    pub fn with_client(http: Client, server_url: &str) -> Result<Self> {
        let mut base = Url::parse(server_url.trim()).map_err(|source| ClientError::InvalidUrl {
            url: server_url.to_string(),
            source,
        })?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self { http, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub fn url(&self, path: &str) -> Result<Url> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|source| ClientError::InvalidUrl {
                url: format!("{}{path}", self.base),
                source,
            })
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let body = self.execute(Method::GET, path, None::<&()>).await?;
        decode(path, &body)
    }

    pub async fn options<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let body = self.execute(Method::OPTIONS, path, None::<&()>).await?;
        decode(path, &body)
    }

    pub async fn send<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let bytes = self.execute(method, path, Some(body)).await?;
        decode(path, &bytes)
    }

    /// Sends a request whose response body is ignored.
    pub async fn call<B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<()>
    where
        B: Serialize + ?Sized,
    {
        self.execute(method, path, body).await.map(|_| ())
    }

    async fn execute<B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<Vec<u8>>
    where
        B: Serialize + ?Sized,
    {
        let url = self.url(path)?;
        debug!(%method, %url, "rest request");

        let mut request = self.http.request(method.clone(), url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let err = ApiError::from_body(
                status.as_u16(),
                &bytes,
                status.canonical_reason().unwrap_or("request failed"),
            );
            debug!(%method, path, status = status.as_u16(), detail = %err.detail, "rest request rejected");
            return Err(err.into());
        }

        Ok(bytes.to_vec())
    }
}

fn decode<T: DeserializeOwned>(path: &str, body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(|source| ClientError::Decode {
        path: path.to_string(),
        source,
    })
}
