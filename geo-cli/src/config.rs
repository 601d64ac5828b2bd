//! Configuration module
//!
//! Handles CLI configuration: where the API lives and how to authenticate.

use geo_client::GeoClient;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// URL of the GEO Sensor API
    pub api_url: String,

    /// Bearer token, if the API requires one
    pub token: Option<String>,
}

impl Config {
    /// Builds an API client from this configuration
    pub fn client(&self) -> GeoClient {
        let client = GeoClient::new(&self.api_url);
        match &self.token {
            Some(token) => client.with_token(token),
            None => client,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_uses_api_url() {
        let config = Config {
            api_url: "http://geo.example:8000/".to_string(),
            token: Some("abc".to_string()),
        };
        assert_eq!(config.client().base_url(), "http://geo.example:8000");
    }
}
