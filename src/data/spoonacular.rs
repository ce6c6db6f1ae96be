//! Spoonacular recipe search API client
//!
//! Performs a single `complexSearch` request for a set of query parameters
//! and maps transport and HTTP failures to user-facing [`FetchError`]s.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use thiserror::Error;
use tracing::{debug, warn};

use super::{QueryParameters, RecipeResultSet};

/// Base URL for the Spoonacular API
pub const SPOONACULAR_BASE_URL: &str = "https://api.spoonacular.com";

/// Path of the search endpoint
const SEARCH_PATH: &str = "/recipes/complexSearch";

/// Query key carrying the API key
const QUERY_API_KEY: &str = "apiKey";

/// HTTP request timeout in seconds
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Errors that can occur when fetching recipes
///
/// The display strings are shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The API host could not be reached
    #[error("No Internet Connection.")]
    NetworkUnavailable,

    /// The request did not complete in time
    #[error("Timeout")]
    Timeout,

    /// The daily quota of the API key is used up (HTTP 402)
    #[error("API Key Limited.")]
    ApiKeyLimited,

    /// The search returned no recipes or an unreadable body
    #[error("Recipes not found.")]
    NotFound,

    /// Any other non-success response
    #[error("{0}")]
    Api(String),
}

impl FetchError {
    /// Maps a non-success HTTP status to an error
    pub fn from_status(status: StatusCode) -> Self {
        match status.as_u16() {
            402 => FetchError::ApiKeyLimited,
            404 => FetchError::NotFound,
            429 => FetchError::Api("rate limited".to_string()),
            _ => FetchError::Api(
                status
                    .canonical_reason()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("HTTP {}", status.as_u16())),
            ),
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if err.is_connect() {
            FetchError::NetworkUnavailable
        } else if err.is_decode() {
            FetchError::NotFound
        } else {
            FetchError::Api(err.to_string())
        }
    }
}

/// A remote source of recipe result sets
#[async_trait]
pub trait RecipeSource: Send + Sync {
    /// Runs one search for the given parameters
    async fn fetch(&self, query: &QueryParameters) -> Result<RecipeResultSet, FetchError>;
}

/// Client for the Spoonacular recipe search API
#[derive(Debug, Clone)]
pub struct RecipeClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl RecipeClient {
    /// Creates a client against `base_url` (the public API, a proxy, or a test server)
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// Builds the search URL, appending the API key after the filter parameters
    fn request_url(&self, query: &QueryParameters) -> Result<Url, FetchError> {
        let endpoint = format!("{}{}", self.base_url, SEARCH_PATH);
        let pairs = query
            .iter()
            .chain(std::iter::once((QUERY_API_KEY, self.api_key.as_str())));
        Url::parse_with_params(&endpoint, pairs)
            .map_err(|e| FetchError::Api(format!("Invalid API URL: {}", e)))
    }

    /// Parses a successful response body
    fn parse_body(body: &str) -> Result<RecipeResultSet, FetchError> {
        let results: RecipeResultSet = serde_json::from_str(body).map_err(|e| {
            warn!(error = %e, "Failed to parse recipe search response");
            FetchError::NotFound
        })?;

        if results.is_empty() {
            return Err(FetchError::NotFound);
        }
        Ok(results)
    }
}

#[async_trait]
impl RecipeSource for RecipeClient {
    async fn fetch(&self, query: &QueryParameters) -> Result<RecipeResultSet, FetchError> {
        let url = self.request_url(query)?;
        debug!(
            meal_type = query.get(super::QUERY_TYPE).unwrap_or_default(),
            diet = query.get(super::QUERY_DIET).unwrap_or_default(),
            "Requesting recipes"
        );

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Recipe search failed");
            return Err(FetchError::from_status(status));
        }

        let body = response.text().await?;
        Self::parse_body(&body)
    }
}
