//! Connector configuration
//!
//! `TapConfig` is deserialized from the JSON mapping the surrounding pipeline
//! hands to the connector: token-based auth credentials, the account id, and
//! a few optional knobs.

use crate::constants::DEFAULT_REQUEST_TIMEOUT_SECS;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Connector configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TapConfig {
    /// The NetSuite account code
    pub account: String,

    /// Integration consumer key
    pub consumer_key: String,

    /// Integration consumer secret
    pub consumer_secret: String,

    /// Token-based auth token key
    pub token_key: String,

    /// Token-based auth token secret
    pub token_secret: String,

    /// Cache the WSDL document on disk between runs
    #[serde(default = "default_cache_wsdl")]
    pub cache_wsdl: bool,

    /// The earliest record date to sync, used when a stream has no bookmark
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,

    /// Bound on each network call, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Override the service host, for sandboxes and test doubles
    #[serde(default)]
    pub base_url: Option<String>,
}

fn default_cache_wsdl() -> bool {
    true
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl TapConfig {
    /// Parse a config from a JSON mapping and validate it
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        let config: TapConfig = serde_json::from_value(value.clone()).map_err(|e| {
            // serde reports a missing struct field by name; surface it as the
            // configuration error the caller expects
            let msg = e.to_string();
            if let Some(field) = msg.strip_prefix("missing field `") {
                let field = field.split('`').next().unwrap_or_default();
                Error::missing_field(field)
            } else {
                Error::config(msg)
            }
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate that every credential field is non-empty
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("account", &self.account),
            ("consumer_key", &self.consumer_key),
            ("consumer_secret", &self.consumer_secret),
            ("token_key", &self.token_key),
            ("token_secret", &self.token_secret),
        ] {
            if value.trim().is_empty() {
                return Err(Error::missing_field(name));
            }
        }
        Ok(())
    }

    /// Account id normalized for use in hostnames
    pub fn account_slug(&self) -> String {
        self.account.replace('_', "-").to_lowercase()
    }

    /// Base URL of the account's SuiteTalk host
    pub fn base_url(&self) -> String {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://{}.suitetalk.api.netsuite.com", self.account_slug()),
        }
    }

    /// URL of the WSDL schema document
    pub fn wsdl_url(&self) -> String {
        format!("{}/wsdl/v2022_2_0/netsuite.wsdl", self.base_url())
    }

    /// URL of the core-types catalog document
    pub fn core_types_url(&self) -> String {
        format!("{}/xsd/platform/v2022_2_0/coreTypes.xsd", self.base_url())
    }

    /// SOAP service endpoint
    pub fn service_url(&self) -> String {
        format!("{}/services/NetSuitePort_2022_2", self.base_url())
    }

    /// Per-call timeout as a Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
