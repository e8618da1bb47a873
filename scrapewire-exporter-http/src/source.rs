//! HTTP status page source.

use std::time::{Duration, Instant};

use reqwest::Client;
use reqwest::header::{ACCEPT, ACCEPT_ENCODING, USER_AGENT};
use tracing::debug;

use scrapewire_framework::{RawSnapshot, RawValue, ScrapeError, Source, async_trait};

use crate::config::HttpExporterConfig;
use crate::credentials::CredentialProvider;
use crate::profiles::Profile;

/// Longest response body kept in a [`ScrapeError::BadStatus`].
const MAX_ERROR_BODY: usize = 512;

/// Fetches a status page on every pull.
///
/// The client is built lazily and rebuilt whenever the credential provider
/// loads a new identity.
pub struct HttpSource {
    uri: String,
    profile: Profile,
    content_type: Option<String>,
    user_agent: Option<String>,
    timeout: Duration,
    insecure: bool,
    credentials: CredentialProvider,
    client: Option<Client>,
}

impl HttpSource {
    pub fn new(config: &HttpExporterConfig) -> Self {
        let http = &config.http;
        Self {
            uri: http.uri.clone(),
            profile: http.profile,
            content_type: http.content_type.clone(),
            user_agent: http.user_agent.clone(),
            timeout: Duration::from_secs(http.connection_timeout_secs),
            insecure: http.insecure_skip_verify,
            credentials: CredentialProvider::new(config.credentials.clone()),
            client: None,
        }
    }

    /// Replace the credential provider.
    pub fn with_credentials(mut self, credentials: CredentialProvider) -> Self {
        self.credentials = credentials;
        self.client = None;
        self
    }

    fn client(&mut self) -> Result<Client, ScrapeError> {
        let now = Instant::now();
        if self.credentials.is_enabled() && self.credentials.is_expired(now) {
            self.credentials.refresh(now)?;
            self.client = None;
        }

        if let Some(ref client) = self.client {
            return Ok(client.clone());
        }

        let mut builder = Client::builder()
            .timeout(self.timeout)
            .connect_timeout(self.timeout)
            .danger_accept_invalid_certs(self.insecure)
            .pool_max_idle_per_host(0);

        if let Some(identity) = self.credentials.identity() {
            builder = builder.identity(identity.clone());
        }

        let client = builder
            .build()
            .map_err(|e| ScrapeError::transport(&self.uri, e))?;
        self.client = Some(client.clone());
        Ok(client)
    }

    /// Whether the configured content type is JSON, ignoring parameters
    /// such as `charset`.
    fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .and_then(|ct| ct.split(';').next())
            .is_some_and(|media| media.trim().eq_ignore_ascii_case("application/json"))
    }

    fn decode(&self, status: u16, body: &[u8]) -> Result<RawSnapshot, ScrapeError> {
        if self.profile.requires_json() {
            return RawValue::from_json_slice(body).map_err(|e| ScrapeError::parse(&self.uri, e));
        }

        let body = if self.is_json() {
            match RawValue::from_json_slice(body) {
                Ok(value @ (RawValue::Object(_) | RawValue::List(_))) => value,
                Ok(other) => {
                    return Err(ScrapeError::parse(
                        &self.uri,
                        format!("expected a JSON object or list, got {}", other.type_name()),
                    ));
                }
                Err(e) => return Err(ScrapeError::parse(&self.uri, e)),
            }
        } else {
            RawValue::String(String::from_utf8_lossy(body).into_owned())
        };

        Ok(RawValue::object([
            ("status_code", RawValue::from(f64::from(status))),
            ("body", body),
        ]))
    }
}

#[async_trait]
impl Source for HttpSource {
    fn describe(&self) -> String {
        format!("{} ({:?})", self.uri, self.profile)
    }

    async fn fetch(&mut self) -> Result<RawSnapshot, ScrapeError> {
        let client = self.client()?;

        let mut request = client.get(&self.uri).header(ACCEPT_ENCODING, "identity");
        if let Some(ref content_type) = self.content_type {
            request = request.header(ACCEPT, content_type);
        }
        if let Some(ref agent) = self.user_agent {
            request = request.header(USER_AGENT, agent);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ScrapeError::transport(&self.uri, e))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| ScrapeError::transport(&self.uri, e))?;

        debug!(
            uri = %self.uri,
            status = status.as_u16(),
            body = %String::from_utf8_lossy(&body),
            "Fetched status page"
        );

        if !status.is_success() {
            return Err(ScrapeError::BadStatus {
                status: status.as_u16(),
                body: truncate(&String::from_utf8_lossy(&body), MAX_ERROR_BODY),
            });
        }

        self.decode(status.as_u16(), &body)
    }
}

fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
