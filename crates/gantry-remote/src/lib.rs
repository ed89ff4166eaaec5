//! gantry-remote — HTTP client for the gantry control plane.
//!
//! One [`RemoteClient`] implements all three capability traits the
//! pipeline consumes, speaking the platform's JSON REST API:
//!
//! | Method | Path | Capability |
//! |---|---|---|
//! | PUT | `/v1/buckets/{bucket}/objects/{key}` | object store |
//! | POST | `/v1/applications/{app}/versions` | version registry |
//! | POST | `/v1/environments/{env}/update` | environment control |
//! | GET | `/v1/environments/{env}/health` | environment control |

use std::time::Duration;

use async_trait::async_trait;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use reqwest::header;
use serde::{Deserialize, Serialize};
use tracing::debug;

use gantry_core::{
    BucketTarget, ClientOptions, EnvironmentControl, EnvironmentStatus, HealthColor,
    HealthSnapshot, ObjectStore, PublishedVersion, RemoteError, SettingOverride, UpdateAck,
    VersionRegistry,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Bytes that cannot appear verbatim in one URL path segment. Notably
/// includes `/`, so a key like `svc/v42.zip` stays a single segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

fn segment(raw: &str) -> percent_encoding::PercentEncode<'_> {
    utf8_percent_encode(raw, SEGMENT)
}

/// A client for one control-plane region.
///
/// Cheap to construct; holds only a connection pool and the resolved
/// base URL. Each deployment invocation builds its own clients and drops
/// them when it finishes.
#[derive(Debug, Clone)]
pub struct RemoteClient {
    http: reqwest::Client,
    base_url: String,
    auth_token: Option<String>,
}

impl RemoteClient {
    /// Build a client from validated plan options.
    ///
    /// The base URL is derived from the region unless `endpoint`
    /// overrides it; the proxy, when set, applies to every request.
    pub fn from_options(options: &ClientOptions) -> Result<Self, RemoteError> {
        let base_url = options
            .endpoint
            .clone()
            .unwrap_or_else(|| format!("https://api.{}.gantry.dev", options.region));

        let mut builder = reqwest::Client::builder().timeout(REQUEST_TIMEOUT);
        if let Some(proxy) = &options.proxy {
            builder = builder
                .proxy(reqwest::Proxy::all(proxy).map_err(|e| RemoteError::Transport(e.to_string()))?);
        }
        let http = builder
            .build()
            .map_err(|e| RemoteError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_token: options.auth_token.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn authed(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth_token {
            Some(token) => request.header(header::AUTHORIZATION, format!("Bearer {token}")),
            None => request,
        }
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, RemoteError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(RemoteError::Service {
            status: status.as_u16(),
            message,
        })
    }
}

fn transport(e: reqwest::Error) -> RemoteError {
    RemoteError::Transport(e.to_string())
}

fn decode_err(e: reqwest::Error) -> RemoteError {
    RemoteError::Decode(e.to_string())
}

#[derive(Serialize)]
struct CreateVersionBody<'a> {
    version_label: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    source: SourceRef<'a>,
}

#[derive(Serialize)]
struct SourceRef<'a> {
    bucket: &'a str,
    key: &'a str,
}

#[derive(Deserialize)]
struct VersionResponse {
    version_label: String,
}

#[derive(Serialize)]
struct UpdateBody<'a> {
    version_label: &'a str,
    option_settings: &'a [SettingOverride],
}

#[derive(Deserialize)]
struct HealthResponse {
    status: EnvironmentStatus,
    health_status: String,
    #[serde(default)]
    color: HealthColor,
}

#[async_trait]
impl ObjectStore for RemoteClient {
    async fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<(), RemoteError> {
        let url = format!(
            "{}/v1/buckets/{}/objects/{}",
            self.base_url,
            segment(bucket),
            segment(key)
        );
        debug!(%url, bytes = body.len(), "PUT object");

        let response = self
            .authed(self.http.put(&url))
            .header(header::CONTENT_TYPE, "application/octet-stream")
            .body(body)
            .send()
            .await
            .map_err(transport)?;
        Self::check(response).await?;
        Ok(())
    }
}

#[async_trait]
impl VersionRegistry for RemoteClient {
    async fn create_version(
        &self,
        application: &str,
        label: &str,
        description: Option<&str>,
        source: &BucketTarget,
    ) -> Result<PublishedVersion, RemoteError> {
        let url = format!(
            "{}/v1/applications/{}/versions",
            self.base_url,
            segment(application)
        );
        debug!(%url, %label, "POST version");

        let body = CreateVersionBody {
            version_label: label,
            description,
            source: SourceRef {
                bucket: &source.bucket,
                key: &source.key,
            },
        };
        let response = self
            .authed(self.http.post(&url))
            .json(&body)
            .send()
            .await
            .map_err(transport)?;
        let confirmed: VersionResponse = Self::check(response)
            .await?
            .json()
            .await
            .map_err(decode_err)?;

        Ok(PublishedVersion {
            label: confirmed.version_label,
        })
    }
}

#[async_trait]
impl EnvironmentControl for RemoteClient {
    async fn update_environment(
        &self,
        environment: &str,
        version_label: &str,
        settings: &[SettingOverride],
    ) -> Result<UpdateAck, RemoteError> {
        let url = format!(
            "{}/v1/environments/{}/update",
            self.base_url,
            segment(environment)
        );
        debug!(%url, %version_label, "POST update");

        let body = UpdateBody {
            version_label,
            option_settings: settings,
        };
        let response = self
            .authed(self.http.post(&url))
            .json(&body)
            .send()
            .await
            .map_err(transport)?;
        let ack: UpdateAck = Self::check(response)
            .await?
            .json()
            .await
            .map_err(decode_err)?;
        Ok(ack)
    }

    async fn describe_health(&self, environment: &str) -> Result<HealthSnapshot, RemoteError> {
        let url = format!(
            "{}/v1/environments/{}/health",
            self.base_url,
            segment(environment)
        );
        debug!(%url, "GET health");

        let response = self
            .authed(self.http.get(&url))
            .send()
            .await
            .map_err(transport)?;
        let health: HealthResponse = Self::check(response)
            .await?
            .json()
            .await
            .map_err(decode_err)?;

        Ok(HealthSnapshot::now(
            health.status,
            health.health_status,
            health.color,
        ))
    }
}
