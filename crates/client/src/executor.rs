//! Shared request pipeline for every platform endpoint.
//!
//! Every call goes through the same send → status check → envelope check →
//! decode sequence, so endpoint wrappers only marshal parameters.

use crate::{body::BodyMap, endpoint::redact, request_id};
use bytes::Bytes;
use reqwest::{
    Client, Method, RequestBuilder, StatusCode,
    header::{ACCEPT, CONTENT_TYPE},
};
use serde::de::DeserializeOwned;
use weapi_config::HttpConfig;
use weapi_types::{ResponseEnvelope, Result, Subsystem, WeError, codes};

/// Issues platform calls and classifies their failures uniformly.
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Clone)]
pub struct RequestExecutor {
    http: Client,
    subsystem: Subsystem,
}

impl RequestExecutor {
    /// Creates an executor wrapping the given HTTP client.
    #[must_use]
    pub fn new(http: Client) -> Self {
        Self {
            http,
            subsystem: Subsystem::General,
        }
    }

    /// Builds the HTTP client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`WeError::Config`] if the client cannot be constructed.
    pub fn from_config(config: &HttpConfig) -> Result<Self> {
        let mut builder = Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| WeError::Config(format!("failed to build http client: {e}")))?;
        Ok(Self::new(http))
    }

    /// Returns a reference to the inner HTTP client.
    #[must_use]
    pub fn client(&self) -> &Client {
        &self.http
    }

    #[must_use]
    pub fn subsystem(&self) -> Subsystem {
        self.subsystem
    }

    /// Returns an executor whose business errors are described through the
    /// catalog table of `subsystem`.
    #[must_use]
    pub fn scoped(&self, subsystem: Subsystem) -> Self {
        Self {
            http: self.http.clone(),
            subsystem,
        }
    }

    /// `GET uri` and decode the JSON body into `T`.
    ///
    /// # Errors
    ///
    /// See [`RequestExecutor::post`].
    pub async fn get<T: DeserializeOwned>(&self, uri: &str) -> Result<T> {
        let body = self.get_raw(uri).await?;
        decode(&body)
    }

    /// `GET uri` and return the body bytes (e.g. an image).
    ///
    /// A JSON body reporting `errcode != 0` still fails.
    ///
    /// # Errors
    ///
    /// See [`RequestExecutor::post`].
    pub async fn get_raw(&self, uri: &str) -> Result<Bytes> {
        let builder = self.http.get(uri).header(ACCEPT, "application/json");
        self.send(&Method::GET, uri, builder).await
    }

    /// `POST uri` with `body` as JSON and decode the response into `T`.
    ///
    /// # Errors
    ///
    /// - [`WeError::Validation`] if `body` holds a file part.
    /// - [`WeError::Transport`] if the request fails to send or the body fails to read.
    /// - [`WeError::HttpStatus`] on any status other than 200.
    /// - [`WeError::Business`] if the envelope reports `errcode != 0`; `T` is not decoded.
    /// - [`WeError::Decode`] if the body does not match `T`.
    pub async fn post<T: DeserializeOwned>(&self, uri: &str, body: &BodyMap) -> Result<T> {
        let bytes = self.post_raw(uri, body).await?;
        decode(&bytes)
    }

    /// `POST uri` with `body` as JSON and return the body bytes.
    ///
    /// # Errors
    ///
    /// See [`RequestExecutor::post`].
    pub async fn post_raw(&self, uri: &str, body: &BodyMap) -> Result<Bytes> {
        let payload = body.to_json_bytes()?;
        let builder = self
            .http
            .post(uri)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .body(payload);
        self.send(&Method::POST, uri, builder).await
    }

    /// `POST uri` with `body` as `multipart/form-data` and decode into `T`.
    ///
    /// # Errors
    ///
    /// See [`RequestExecutor::post`]; [`WeError::Validation`] also covers
    /// malformed file parts.
    pub async fn upload_file<T: DeserializeOwned>(&self, uri: &str, body: &BodyMap) -> Result<T> {
        let form = body.to_multipart()?;
        let builder = self
            .http
            .post(uri)
            .header(ACCEPT, "application/json")
            .multipart(form);
        let bytes = self.send(&Method::POST, uri, builder).await?;
        decode(&bytes)
    }

    async fn send(&self, method: &Method, uri: &str, builder: RequestBuilder) -> Result<Bytes> {
        let request_id = request_id::generate();
        let path = redact(uri);
        tracing::debug!(%method, uri = path, request_id = %request_id, "dispatching platform request");

        let operation = format!("{method} {path}");
        let resp = builder
            .header(request_id::REQUEST_ID_HEADER, &request_id)
            .send()
            .await
            .map_err(|e| WeError::from(e).context(&operation))?;

        let status = resp.status();
        if status != StatusCode::OK {
            tracing::warn!(%method, uri = path, request_id = %request_id, status = status.as_u16(), "platform returned non-200 status");
            return Err(WeError::HttpStatus {
                status: status.as_u16(),
            });
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| WeError::from(e).context(&format!("{operation}: reading body")))?;
        self.check_envelope(&body).inspect_err(|e| {
            tracing::warn!(%method, uri = path, request_id = %request_id, error = %e, "platform rejected request");
        })?;
        Ok(body)
    }

    /// Fails with [`WeError::Business`] when `body` is a JSON object whose
    /// `errcode` is not zero. Bodies that are not a JSON object pass.
    fn check_envelope(&self, body: &[u8]) -> Result<()> {
        let Some(envelope) = ResponseEnvelope::from_slice(body) else {
            return Ok(());
        };
        if envelope.is_success() {
            return Ok(());
        }
        Err(WeError::Business {
            code: envelope.errcode,
            message: codes::resolve_message(self.subsystem, envelope.errcode, &envelope.errmsg),
        })
    }
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(|e| WeError::decode(&e, body))
}
