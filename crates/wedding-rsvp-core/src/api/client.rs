//! Client for the hosted backend's REST surface.
//!
//! Data goes through PostgREST (`/rest/v1/<table>` with filter query
//! parameters); hosts sign in through the auth service's password grant.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{header, Client, Method, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

use super::ApiError;
use crate::auth::SessionData;
use crate::models::{Guest, GuestId, GuestUpdate, NewGuest, SongSuggestion};
use crate::store::{GuestStore, PlaylistStore, StoreResult};

// ============================================================================
// Constants
// ============================================================================

/// Path prefix of the PostgREST data API
const REST_PATH: &str = "rest/v1";

/// Path prefix of the auth service
const AUTH_PATH: &str = "auth/v1";

const GUESTS_TABLE: &str = "guests";
const SONGS_TABLE: &str = "playlist_songs";

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum number of retries for rate-limited (429) requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
const INITIAL_BACKOFF_MS: u64 = 1000;

/// Session lifetime assumed when the auth response omits `expires_in`.
const DEFAULT_SESSION_SECS: i64 = 3600;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    user: AuthUser,
}

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

/// Client for the hosted backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct SupabaseClient {
    client: Client,
    base_url: String,
    anon_key: String,
    token: Option<String>,
}

impl SupabaseClient {
    /// Create a client for a project URL and its public anon key
    pub fn new(base_url: &str, anon_key: &str) -> Result<Self, ApiError> {
        if base_url.trim().is_empty() || anon_key.trim().is_empty() {
            return Err(ApiError::NotConfigured(
                "backend URL and anon key are required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            anon_key: anon_key.trim().to_string(),
            token: None,
        })
    }

    /// Create a new client with the given token, sharing the connection pool.
    pub fn with_token(&self, token: String) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            anon_key: self.anon_key.clone(),
            token: Some(token),
        }
    }

    /// Sign a host in with email and password
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<SessionData, ApiError> {
        let url = format!("{}/{}/token?grant_type=password", self.base_url, AUTH_PATH);

        let response = self
            .client
            .post(&url)
            .header("apikey", &self.anon_key)
            .json(&PasswordGrant { email, password })
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        let auth: TokenResponse = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("auth response: {}", e)))?;

        Ok(SessionData {
            access_token: auth.access_token,
            user_id: auth.user.id,
            email: auth.user.email.unwrap_or_else(|| email.to_string()),
            created_at: Utc::now(),
            expires_in_secs: auth.expires_in.unwrap_or(DEFAULT_SESSION_SECS),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{}/{}", self.base_url, REST_PATH, table)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let bearer = self.token.as_deref().unwrap_or(&self.anon_key);
        self.client
            .request(method, url)
            .header("apikey", &self.anon_key)
            .header(header::AUTHORIZATION, format!("Bearer {}", bearer))
    }

    /// Check if response is successful, returning an error with body if not.
    /// Returns Ok(Some(response)) for success, Ok(None) for rate limit (should retry),
    /// or Err for other errors.
    async fn check_response_for_retry(
        response: reqwest::Response,
    ) -> Result<Option<reqwest::Response>, ApiError> {
        if response.status().is_success() {
            Ok(Some(response))
        } else if response.status().as_u16() == 429 {
            Ok(None)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    /// Send a request built by `build`, retrying with backoff while rate limited.
    async fn send_with_retry<F>(&self, url: &str, build: F) -> Result<reqwest::Response, ApiError>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            let response = build().send().await?;

            match Self::check_response_for_retry(response).await? {
                Some(response) => return Ok(response),
                None => {
                    retries += 1;
                    if retries > MAX_RATE_LIMIT_RETRIES {
                        return Err(ApiError::RateLimited);
                    }
                    warn!(url = url, retry = retries, backoff_ms = backoff_ms, "Rate limited, backing off");
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms *= 2;
                }
            }
        }
    }

    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        params: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = self.table_url(table);
        let response = self
            .send_with_retry(&url, || self.request(Method::GET, &url).query(params))
            .await?;
        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("{} rows: {}", table, e)))
    }

    async fn write<B: Serialize + ?Sized>(
        &self,
        method: Method,
        table: &str,
        params: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<(), ApiError> {
        let url = self.table_url(table);
        self.send_with_retry(&url, || {
            let request = self
                .request(method.clone(), &url)
                .query(params)
                .header("Prefer", "return=minimal");
            match body {
                Some(body) => request.json(body),
                None => request,
            }
        })
        .await?;
        Ok(())
    }
}

/// Escape characters PostgREST treats specially inside `ilike` patterns.
fn ilike_pattern(query: &str) -> String {
    let escaped: String = query
        .chars()
        .flat_map(|c| match c {
            '%' | '_' | '*' | '\\' => vec!['\\', c],
            ',' | '(' | ')' => vec![' '],
            _ => vec![c],
        })
        .collect();
    format!("ilike.*{}*", escaped)
}

fn eq_filter(value: &str) -> String {
    format!("eq.{}", value)
}

#[async_trait]
impl GuestStore for SupabaseClient {
    fn backend_tag(&self) -> &'static str {
        "supabase"
    }

    async fn search_by_name(&self, query: &str) -> StoreResult<Vec<Guest>> {
        let guests: Vec<Guest> = self
            .select(
                GUESTS_TABLE,
                &[
                    ("select", "*".to_string()),
                    ("name", ilike_pattern(query)),
                    ("order", "name.asc".to_string()),
                ],
            )
            .await?;
        debug!(query = query, count = guests.len(), "Guest name search");
        Ok(guests)
    }

    async fn list_by_group(&self, label: &str) -> StoreResult<Vec<Guest>> {
        self.select(
            GUESTS_TABLE,
            &[
                ("select", "*".to_string()),
                ("group_name", eq_filter(label)),
                ("order", "name.asc".to_string()),
            ],
        )
        .await
    }

    async fn list_all(&self) -> StoreResult<Vec<Guest>> {
        self.select(
            GUESTS_TABLE,
            &[
                ("select", "*".to_string()),
                ("order", "group_name.asc,name.asc".to_string()),
            ],
        )
        .await
    }

    async fn update_guest(&self, id: &GuestId, update: &GuestUpdate) -> StoreResult<()> {
        self.write(
            Method::PATCH,
            GUESTS_TABLE,
            &[("id", eq_filter(id.as_str()))],
            Some(update),
        )
        .await
    }

    async fn insert_guest(&self, guest: &NewGuest) -> StoreResult<()> {
        self.write(Method::POST, GUESTS_TABLE, &[], Some(std::slice::from_ref(guest)))
            .await
    }

    async fn delete_guest(&self, id: &GuestId) -> StoreResult<()> {
        self.write::<()>(
            Method::DELETE,
            GUESTS_TABLE,
            &[("id", eq_filter(id.as_str()))],
            None,
        )
        .await
    }
}

#[async_trait]
impl PlaylistStore for SupabaseClient {
    async fn insert_song(&self, song: &SongSuggestion) -> StoreResult<()> {
        self.write(Method::POST, SONGS_TABLE, &[], Some(std::slice::from_ref(song)))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_requires_configuration() {
        assert!(matches!(
            SupabaseClient::new("", "key"),
            Err(ApiError::NotConfigured(_))
        ));
        assert!(matches!(
            SupabaseClient::new("https://example.supabase.co", "  "),
            Err(ApiError::NotConfigured(_))
        ));
    }

    #[test]
    fn test_table_url_strips_trailing_slash() {
        let client = SupabaseClient::new("https://example.supabase.co/", "anon")
            .expect("client should build");
        assert_eq!(
            client.table_url(GUESTS_TABLE),
            "https://example.supabase.co/rest/v1/guests"
        );
    }

    #[test]
    fn test_ilike_pattern_escapes_wildcards() {
        assert_eq!(ilike_pattern("Gar"), "ilike.*Gar*");
        assert_eq!(ilike_pattern("50%"), "ilike.*50\\%*");
        assert_eq!(ilike_pattern("a,b"), "ilike.*a b*");
    }

    #[test]
    fn test_parse_token_response() {
        let json = r#"{"access_token":"eyJ...","token_type":"bearer","expires_in":3600,"refresh_token":"r1","user":{"id":"0b6c","email":"novios@example.com"}}"#;
        let parsed: TokenResponse =
            serde_json::from_str(json).expect("Failed to parse token test JSON");
        assert_eq!(parsed.user.id, "0b6c");
        assert_eq!(parsed.expires_in, Some(3600));
        assert_eq!(parsed.user.email.as_deref(), Some("novios@example.com"));
    }

    #[test]
    fn test_update_body_serializes_nulls() {
        let update = GuestUpdate {
            attending: Some(true),
            dietary_restrictions: None,
            bus_departure: Some("Salida desde Madrid".to_string()),
            bus_return: None,
            special_notes: None,
        };
        let body = serde_json::to_value(&update).expect("serialize");
        assert_eq!(body["attending"], serde_json::json!(true));
        assert!(body["dietary_restrictions"].is_null());
        assert!(body.get("bus_return").is_some());
    }
}
