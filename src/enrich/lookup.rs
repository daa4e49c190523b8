//! Geolocation lookups

use std::time::Duration;

use reqwest::blocking::Client;
use tracing::debug;

use super::{EnrichError, IpInfo};

/// Something that can describe an IP address.
pub trait GeoLookup {
    fn lookup(&self, ip: &str) -> Result<IpInfo, EnrichError>;
}

impl<T: GeoLookup + ?Sized> GeoLookup for &T {
    fn lookup(&self, ip: &str) -> Result<IpInfo, EnrichError> {
        (**self).lookup(ip)
    }
}

/// Client for the ipinfo.io JSON API (`{endpoint}/{ip}/json`).
pub struct IpInfoClient {
    client: Client,
    endpoint: String,
    token: Option<String>,
}

impl IpInfoClient {
    pub fn new(
        endpoint: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, EnrichError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("peerlog/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(EnrichError::Client)?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            token: token.filter(|t| !t.is_empty()),
        })
    }

    /// Request URL for `ip`, without the token.
    pub fn url_for(&self, ip: &str) -> String {
        format!("{}/{}/json", self.endpoint.trim_end_matches('/'), ip)
    }
}

impl GeoLookup for IpInfoClient {
    fn lookup(&self, ip: &str) -> Result<IpInfo, EnrichError> {
        let url = self.url_for(ip);
        debug!(url = %url, "querying");

        let mut request = self.client.get(&url);
        if let Some(token) = &self.token {
            request = request.query(&[("token", token.as_str())]);
        }

        let response = request.send().map_err(|source| EnrichError::Http {
            target: url.clone(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(EnrichError::Status {
                target: url,
                status: status.as_u16(),
            });
        }

        response
            .json::<IpInfo>()
            .map_err(|source| EnrichError::Decode {
                target: url,
                source,
            })
    }
}
