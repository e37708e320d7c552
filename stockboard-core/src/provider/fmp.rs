//! Financial Modeling Prep HTTP client.
//!
//! One blocking GET per call with the API key appended. Status codes are
//! mapped to `ProviderError`; nothing is retried. FMP reports some failures
//! (bad key, plan limits) as HTTP 200 with an `"Error Message"` body, which
//! is surfaced as `ProviderError::Upstream`.

use super::{ApiVersion, Endpoint, MarketDataProvider, ProviderError};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

const ERROR_MESSAGE_KEYS: &[&str] = &["Error Message", "error", "message"];

/// FMP data provider.
pub struct FmpClient {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
}

impl FmpClient {
    pub fn new(
        api_key: impl Into<String>,
        base_url: Option<&str>,
        version: ApiVersion,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("stockboard/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ProviderError::Client(e.to_string()))?;

        let base_url = base_url
            .unwrap_or(version.default_base_url())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            client,
            base_url,
            api_key: api_key.into(),
        })
    }

    /// Absolute URL for an endpoint, without the API key.
    pub fn url_for(&self, endpoint: &Endpoint) -> String {
        format!("{}/{}", self.base_url, endpoint.path.trim_start_matches('/'))
    }

    fn check_error_body(endpoint: &Endpoint, body: &Value) -> Result<(), ProviderError> {
        let Some(map) = body.as_object() else {
            return Ok(());
        };
        // A real record never consists solely of an error key.
        if map.len() > 2 {
            return Ok(());
        }
        for key in ERROR_MESSAGE_KEYS {
            if let Some(Value::String(msg)) = map.get(*key) {
                return Err(ProviderError::Upstream(format!("{endpoint}: {msg}")));
            }
        }
        Ok(())
    }
}

impl MarketDataProvider for FmpClient {
    fn name(&self) -> &str {
        "financial_modeling_prep"
    }

    fn get(&self, endpoint: &Endpoint) -> Result<Value, ProviderError> {
        debug!(%endpoint, "provider request");

        let mut query: Vec<(&str, &str)> = endpoint
            .query
            .iter()
            .map(|(k, v)| (*k, v.as_str()))
            .collect();
        query.push(("apikey", self.api_key.as_str()));

        let resp = self
            .client
            .get(self.url_for(endpoint))
            .query(&query)
            .send()
            // reqwest errors embed the URL, which carries the key
            .map_err(|e| ProviderError::Network(e.without_url().to_string()))?;

        let status = resp.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(ProviderError::Unauthorized(format!("HTTP {status} for {endpoint}")));
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = resp
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok());
            return Err(ProviderError::RateLimited { retry_after_secs });
        }

        if !status.is_success() {
            return Err(ProviderError::Http {
                status: status.as_u16(),
                endpoint: endpoint.to_string(),
            });
        }

        let body: Value = resp.json().map_err(|e| ProviderError::InvalidJson {
            endpoint: endpoint.to_string(),
            reason: e.without_url().to_string(),
        })?;

        Self::check_error_body(endpoint, &body)?;
        Ok(body)
    }
}
