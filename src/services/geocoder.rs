//! Location autocomplete over a Nominatim-compatible geocoder.

use crate::{config::settings::GeocoderConfig, errors::Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// One suggestion returned by the geocoder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Place {
    /// Geocoder's identifier for the place
    pub place_id: u64,
    /// Full human-readable address
    pub display_name: String,
}

/// Client for the geocoder's `/search` endpoint.
#[derive(Debug, Clone)]
pub struct Geocoder {
    client: Client,
    endpoint: String,
    result_limit: u32,
    min_query_len: usize,
}

impl Geocoder {
    /// Creates a client from configuration.
    pub fn new(config: &GeocoderConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            result_limit: config.result_limit,
            min_query_len: config.min_query_len,
        })
    }

    /// Looks up places matching `query`.
    ///
    /// Queries shorter than the configured minimum return nothing without a
    /// request. A non-success answer (typically rate limiting) is logged and
    /// treated as no suggestions; transport failures are errors.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<Vec<Place>> {
        let query = query.trim();
        if query.chars().count() < self.min_query_len {
            debug!("Query too short for lookup");
            return Ok(Vec::new());
        }

        let limit = self.result_limit.to_string();
        let response = self
            .client
            .get(format!("{}/search", self.endpoint))
            .query(&[("format", "json"), ("q", query), ("limit", limit.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            warn!("Geocoder answered {}", response.status());
            return Ok(Vec::new());
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use axum::{Json, Router, extract::Query, http::StatusCode, routing::get};
    use std::collections::HashMap;

    async fn serve(app: Router) -> GeocoderConfig {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await });
        GeocoderConfig {
            endpoint: format!("http://{address}"),
            ..GeocoderConfig::default()
        }
    }

    #[test]
    fn test_place_ignores_extra_fields() {
        let body = r#"[{"place_id": 123, "licence": "ODbL", "lat": "51.5", "lon": "-0.1",
                        "display_name": "London, Greater London, England"}]"#;
        let places: Vec<Place> = serde_json::from_str(body).unwrap();
        assert_eq!(places.len(), 1);
        assert_eq!(places[0].place_id, 123);
        assert_eq!(places[0].display_name, "London, Greater London, England");
    }

    #[tokio::test]
    async fn test_short_query_skips_request() {
        // Nothing listens here; a request would fail
        let config = GeocoderConfig {
            endpoint: "http://127.0.0.1:9".to_string(),
            ..GeocoderConfig::default()
        };
        let geocoder = Geocoder::new(&config).unwrap();
        assert!(geocoder.search("ab ").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_sends_query_and_parses_places() {
        async fn search(Query(params): Query<HashMap<String, String>>) -> Json<serde_json::Value> {
            assert_eq!(params.get("format").map(String::as_str), Some("json"));
            assert_eq!(params.get("limit").map(String::as_str), Some("5"));
            let q = params.get("q").cloned().unwrap_or_default();
            Json(serde_json::json!([
                {"place_id": 1, "display_name": format!("{q} Park")},
                {"place_id": 2, "display_name": format!("{q} Station")}
            ]))
        }

        let config = serve(Router::new().route("/search", get(search))).await;
        let geocoder = Geocoder::new(&config).unwrap();

        let places = geocoder.search("Riverside").await.unwrap();
        assert_eq!(places.len(), 2);
        assert_eq!(places[0].display_name, "Riverside Park");
        assert_eq!(places[1].place_id, 2);
    }

    #[tokio::test]
    async fn test_rate_limited_search_is_empty() {
        async fn limited() -> StatusCode {
            StatusCode::TOO_MANY_REQUESTS
        }

        let config = serve(Router::new().route("/search", get(limited))).await;
        let geocoder = Geocoder::new(&config).unwrap();

        assert!(geocoder.search("Riverside").await.unwrap().is_empty());
    }
}
