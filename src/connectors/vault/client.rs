//! Vault HTTP client
//!
//! Talks to the encrypted record store over HTTPS. Every request carries a
//! bearer token from the client-credentials grant plus an HMAC-SHA256
//! signature keyed by the client's private key.

use super::VaultCredentials;
use crate::config::VaultConfig;
use crate::domain::SecureValue;
use crate::errors::{Result, SecureStorageError};
use async_trait::async_trait;
use hmac::{Hmac, Mac};
use reqwest::{Client, Method, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::Sha256;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, warn};

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the client id
pub const CLIENT_ID_HEADER: &str = "X-Vault-Client-Id";
/// Header carrying the client's public key
pub const PUBLIC_KEY_HEADER: &str = "X-Vault-Public-Key";
/// Header carrying the hex HMAC-SHA256 request signature
pub const SIGNATURE_HEADER: &str = "X-Vault-Signature";

/// Refresh tokens this long before they expire
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(30);

/// A record as returned by a query
#[derive(Debug, Clone, PartialEq)]
pub struct VaultRecord {
    pub record_id: String,
    /// Decrypted payload
    pub data: Map<String, Value>,
}

/// Backend answer to a record delete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VaultDeleteStatus {
    Deleted,
    NotFound,
    /// Another writer deleted or changed the record concurrently
    Conflict,
}

/// Operations the vault connector needs from the record store
#[async_trait]
pub trait VaultApi: Send + Sync + std::fmt::Debug {
    /// Write one record and return its id
    ///
    /// # Arguments
    /// - `record_type`: fixed record type
    /// - `data`: payload, encrypted at rest
    /// - `plain`: indexable attributes, stored in the clear
    async fn write_record(
        &self,
        record_type: &str,
        data: Map<String, Value>,
        plain: BTreeMap<String, String>,
    ) -> Result<String>;

    /// Every record whose plain attribute `name` equals `value`
    async fn query_records(&self, name: &str, value: &str) -> Result<Vec<VaultRecord>>;

    /// Delete one record by id
    async fn delete_record(&self, record_id: &str) -> Result<VaultDeleteStatus>;
}

#[derive(Debug, Serialize)]
struct TokenRequest<'a> {
    grant_type: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

#[derive(Debug, Serialize)]
struct WriteMeta<'a> {
    writer_id: &'a str,
    user_id: &'a str,
    #[serde(rename = "type")]
    record_type: &'a str,
    plain: BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
struct WriteRequest<'a> {
    meta: WriteMeta<'a>,
    data: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct RecordMeta {
    record_id: String,
}

#[derive(Debug, Deserialize)]
struct WriteResponse {
    meta: RecordMeta,
}

#[derive(Debug, Serialize)]
struct PlainEq<'a> {
    name: &'a str,
    value: &'a str,
}

#[derive(Debug, Serialize)]
struct PlainQuery<'a> {
    eq: PlainEq<'a>,
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    include_data: bool,
    plain: PlainQuery<'a>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    meta: RecordMeta,
    #[serde(default)]
    data: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

struct AccessToken {
    value: SecureValue,
    expires_at: Instant,
}

impl AccessToken {
    fn is_fresh(&self) -> bool {
        Instant::now() + TOKEN_EXPIRY_MARGIN < self.expires_at
    }
}

/// reqwest-backed [`VaultApi`]
pub struct HttpVaultClient {
    client: Client,
    base_url: String,
    credentials: VaultCredentials,
    token: RwLock<Option<AccessToken>>,
}

impl std::fmt::Debug for HttpVaultClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpVaultClient")
            .field("base_url", &self.base_url)
            .field("client_id", &self.credentials.client_id())
            .field("client", &"[reqwest::Client]")
            .finish()
    }
}

impl HttpVaultClient {
    /// Create a client for the configured endpoint
    pub fn new(config: &VaultConfig, credentials: VaultCredentials) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout()).build().map_err(|e| {
            SecureStorageError::connection_with_source(
                "vault",
                "Failed to build HTTP client",
                Box::new(e),
            )
        })?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            credentials,
            token: RwLock::new(None),
        })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Hex HMAC-SHA256 over `{METHOD} {path}\n{body}` keyed by the private key
    pub fn sign(&self, method: &Method, path: &str, body: &[u8]) -> Result<String> {
        let mut mac = HmacSha256::new_from_slice(self.credentials.private_key().expose().as_bytes())
            .map_err(|e| SecureStorageError::internal(format!("Invalid signing key: {}", e)))?;
        mac.update(method.as_str().as_bytes());
        mac.update(b" ");
        mac.update(path.as_bytes());
        mac.update(b"\n");
        mac.update(body);
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    async fn access_token(&self) -> Result<String> {
        if let Some(token) = self.token.read().await.as_ref() {
            if token.is_fresh() {
                return Ok(token.value.expose().to_string());
            }
        }

        let mut slot = self.token.write().await;
        if let Some(token) = slot.as_ref() {
            if token.is_fresh() {
                return Ok(token.value.expose().to_string());
            }
        }

        let url = format!("{}/v1/auth/token", self.base_url);
        debug!(url = %url, "Requesting vault access token");

        let response = self
            .client
            .post(&url)
            .basic_auth(
                self.credentials.api_key_id(),
                Some(self.credentials.api_secret().expose()),
            )
            .json(&TokenRequest { grant_type: "client_credentials" })
            .send()
            .await?;

        let response = Self::check_status(response, "token request").await?;
        let token: TokenResponse = response.json().await?;

        let value = token.access_token.clone();
        *slot = Some(AccessToken {
            value: SecureValue::new(token.access_token),
            expires_at: Instant::now() + Duration::from_secs(token.expires_in),
        });
        Ok(value)
    }

    async fn check_status(response: Response, operation: &str) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(SecureStorageError::connection(
                "vault",
                format!("Vault rejected the credentials during {} (status {})", operation, status),
            ));
        }

        Err(SecureStorageError::http(
            format!("Vault {} failed: {}", operation, body.trim()),
            Some(status.as_u16()),
        ))
    }

    async fn send(&self, method: Method, path: &str, body: Option<Vec<u8>>) -> Result<Response> {
        let token = self.access_token().await?;
        let payload = body.unwrap_or_default();
        let signature = self.sign(&method, path, &payload)?;
        let url = format!("{}{}", self.base_url, path);
        debug!(method = %method, url = %url, "Sending vault request");

        let mut request = self
            .client
            .request(method, &url)
            .bearer_auth(token)
            .header(CLIENT_ID_HEADER, self.credentials.client_id())
            .header(PUBLIC_KEY_HEADER, self.credentials.public_key())
            .header(SIGNATURE_HEADER, signature);

        if !payload.is_empty() {
            request = request.header(reqwest::header::CONTENT_TYPE, "application/json").body(payload);
        }

        Ok(request.send().await?)
    }
}

#[async_trait]
impl VaultApi for HttpVaultClient {
    async fn write_record(
        &self,
        record_type: &str,
        data: Map<String, Value>,
        plain: BTreeMap<String, String>,
    ) -> Result<String> {
        let client_id = self.credentials.client_id();
        let body = serde_json::to_vec(&WriteRequest {
            meta: WriteMeta { writer_id: client_id, user_id: client_id, record_type, plain },
            data,
        })?;

        let response = self.send(Method::POST, "/v1/storage/records", Some(body)).await?;
        let response = Self::check_status(response, "record write").await?;
        let written: WriteResponse = response.json().await?;
        Ok(written.meta.record_id)
    }

    async fn query_records(&self, name: &str, value: &str) -> Result<Vec<VaultRecord>> {
        let body = serde_json::to_vec(&SearchRequest {
            include_data: true,
            plain: PlainQuery { eq: PlainEq { name, value } },
        })?;

        let response = self.send(Method::POST, "/v1/storage/search", Some(body)).await?;
        let response = Self::check_status(response, "record search").await?;
        let found: SearchResponse = response.json().await?;

        Ok(found
            .results
            .into_iter()
            .map(|result| VaultRecord { record_id: result.meta.record_id, data: result.data })
            .collect())
    }

    async fn delete_record(&self, record_id: &str) -> Result<VaultDeleteStatus> {
        let path = format!("/v1/storage/records/{}", record_id);
        let response = self.send(Method::DELETE, &path, None).await?;

        match response.status() {
            StatusCode::NOT_FOUND | StatusCode::GONE => Ok(VaultDeleteStatus::NotFound),
            StatusCode::CONFLICT => {
                warn!(record_id = %record_id, "Vault reported a conflict deleting record");
                Ok(VaultDeleteStatus::Conflict)
            }
            _ => {
                Self::check_status(response, "record delete").await?;
                Ok(VaultDeleteStatus::Deleted)
            }
        }
    }
}
