//! Client configuration and the shared client handle.
//!
//! # Design
//! `ClubCollectClient` is the read-only context every endpoint and resource
//! borrows: API key, company id, base URL and the transport. It holds no
//! mutable state, so one client can serve any number of independent calls.
//! Endpoints are created on demand through [`ClubCollectClient::imports`] and
//! [`ClubCollectClient::tickets`].

use std::env;
use std::fmt;
use std::time::Duration;

use url::Url;

use crate::endpoint::{ImportEndpoint, TicketEndpoint};
use crate::error::ApiError;
use crate::http::{Transport, UreqTransport};
use crate::params::Params;

pub const DEFAULT_BASE_URL: &str = "https://api.clubcollect.com/api/v2";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub const ENV_API_KEY: &str = "CLUBCOLLECT_API_KEY";
pub const ENV_COMPANY_ID: &str = "CLUBCOLLECT_COMPANY_ID";
pub const ENV_API_URL: &str = "CLUBCOLLECT_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "CLUBCOLLECT_TIMEOUT_SECS";

/// Connection settings for a [`ClubCollectClient`].
#[derive(Clone)]
pub struct ClientConfig {
    api_key: String,
    company_id: String,
    base_url: String,
    timeout: Duration,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>, company_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            company_id: company_id.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Read the configuration from `CLUBCOLLECT_*` environment variables.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ApiError> {
        let required = |name: &str| {
            lookup(name)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| ApiError::config(format!("{name} is not set")))
        };
        let mut config = Self::new(required(ENV_API_KEY)?, required(ENV_COMPANY_ID)?);
        if let Some(url) = lookup(ENV_API_URL) {
            config = config.base_url(url);
        }
        if let Some(secs) = lookup(ENV_TIMEOUT_SECS) {
            let secs: u64 = secs
                .parse()
                .map_err(|_| ApiError::config(format!("{ENV_TIMEOUT_SECS} is not a number: {secs:?}")))?;
            config = config.timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("company_id", &self.company_id)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Handle to the ClubCollect API.
pub struct ClubCollectClient {
    api_key: String,
    company_id: String,
    base_url: Url,
    transport: Box<dyn Transport>,
}

impl ClubCollectClient {
    /// Create a client that talks HTTP through [`UreqTransport`].
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let transport = UreqTransport::new(config.timeout);
        Self::with_transport(config, transport)
    }

    pub fn with_transport(
        config: ClientConfig,
        transport: impl Transport + 'static,
    ) -> Result<Self, ApiError> {
        let mut base_url = Url::parse(config.base_url.trim_end_matches('/'))
            .map_err(|e| ApiError::config(format!("invalid base URL {:?}: {e}", config.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::config(format!(
                "base URL {:?} cannot carry a path",
                config.base_url
            )));
        }
        base_url.set_query(None);
        Ok(Self {
            api_key: config.api_key,
            company_id: config.company_id,
            base_url,
            transport: Box::new(transport),
        })
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn company_id(&self) -> &str {
        &self.company_id
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(crate) fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    /// Query parameters every call carries.
    pub fn auth_params(&self) -> Params {
        Params::new().with("api_key", self.api_key.as_str())
    }

    pub fn imports(&self) -> ImportEndpoint<'_> {
        ImportEndpoint::new(self)
    }

    pub fn tickets(&self) -> TicketEndpoint<'_> {
        TicketEndpoint::new(self)
    }
}

impl fmt::Debug for ClubCollectClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClubCollectClient")
            .field("company_id", &self.company_id)
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}
