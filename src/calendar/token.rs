use crate::config::Config;
use crate::error::{auth_error, AppResult};
use chrono::Utc;
use reqwest::Client;
use serde_json::{json, Value};
use std::fs;
use std::path::PathBuf;
use tracing::info;

const OAUTH_TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const OAUTH_AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const OAUTH_SCOPE: &str = "https://www.googleapis.com/auth/calendar";
const REDIRECT_URI: &str = "http://localhost:8080";

/// File-backed OAuth token store.
///
/// Tokens live in a local JSON file. A stored token is used as-is while fresh,
/// refreshed through the token endpoint when expired, and replaced through the
/// interactive browser consent flow when missing or unrefreshable. Every
/// failure on this path is an authentication error, the only fatal class.
pub struct TokenStore {
    client: Client,
    client_id: String,
    client_secret: String,
    token_path: PathBuf,
}

impl TokenStore {
    pub fn new(config: &Config, client: Client) -> Self {
        Self {
            client,
            client_id: config.google_client_id.clone(),
            client_secret: config.google_client_secret.clone(),
            token_path: PathBuf::from(&config.token_path),
        }
    }

    /// Get a usable access token, refreshing or re-authorizing as needed
    pub async fn access_token(&self) -> AppResult<String> {
        if let Some(token) = self.load_token()? {
            if token_is_fresh(&token) {
                return extract_access_token(&token);
            }

            if let Some(refresh_token) = token.get("refresh_token").and_then(|v| v.as_str()) {
                info!("Stored token expired, refreshing");
                let refreshed = self.refresh_token(refresh_token).await?;
                return extract_access_token(&refreshed);
            }
        }

        info!("No usable stored token, starting interactive authorization");
        let token = self.interactive_flow().await?;
        extract_access_token(&token)
    }

    fn load_token(&self) -> AppResult<Option<Value>> {
        if !self.token_path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.token_path)
            .map_err(|e| auth_error(&format!("Failed to read token file: {}", e)))?;
        let token = serde_json::from_str(&content)
            .map_err(|e| auth_error(&format!("Failed to parse token file: {}", e)))?;

        Ok(Some(token))
    }

    fn save_token(&self, token: &Value) -> AppResult<()> {
        fs::write(&self.token_path, token.to_string())
            .map_err(|e| auth_error(&format!("Failed to save token file: {}", e)))
    }

    /// Exchange a refresh token for a new access token and persist the result
    async fn refresh_token(&self, refresh_token: &str) -> AppResult<Value> {
        let params = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];

        let response = self
            .client
            .post(OAUTH_TOKEN_ENDPOINT)
            .form(&params)
            .send()
            .await
            .map_err(|e| auth_error(&format!("Failed to refresh token: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(auth_error(&format!(
                "Failed to refresh token: HTTP {} - {}",
                status, error_body
            )));
        }

        let new_token: Value = response
            .json()
            .await
            .map_err(|e| auth_error(&format!("Failed to parse token response: {}", e)))?;

        let token = merge_refreshed_token(&new_token, refresh_token)?;
        self.save_token(&token)?;

        Ok(token)
    }

    /// Run the browser consent flow and persist the obtained token
    async fn interactive_flow(&self) -> AppResult<Value> {
        let state = uuid::Uuid::new_v4().to_string();
        let auth_url = format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&access_type=offline&prompt=consent&scope={}&state={}",
            OAUTH_AUTH_ENDPOINT, self.client_id, REDIRECT_URI, OAUTH_SCOPE, state
        );

        println!("Opening browser for Google Calendar authorization...");
        webbrowser::open(&auth_url)
            .map_err(|e| auth_error(&format!("Failed to open browser: {}", e)))?;

        let server = tiny_http::Server::http("0.0.0.0:8080")
            .map_err(|e| auth_error(&format!("Failed to start callback server: {}", e)))?;
        println!("Waiting for authorization callback...");

        let request = server
            .recv()
            .map_err(|e| auth_error(&format!("Callback server error: {}", e)))?;
        let url = request.url().to_string();

        // The callback must echo our state parameter, otherwise the code may
        // belong to someone else's authorization attempt
        if parse_callback_param(&url, "state") != Some(state.as_str()) {
            return Err(auth_error("State mismatch in authorization callback"));
        }

        let code = parse_callback_param(&url, "code")
            .ok_or_else(|| auth_error("No authorization code found in callback"))?
            .to_string();

        let response = self
            .client
            .post(OAUTH_TOKEN_ENDPOINT)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code.as_str()),
                ("redirect_uri", REDIRECT_URI),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| auth_error(&format!("Failed to exchange code: {}", e)))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(auth_error(&format!("Failed to get token: {}", error_text)));
        }

        let mut token: Value = response
            .json()
            .await
            .map_err(|e| auth_error(&format!("Failed to parse token response: {}", e)))?;

        let expires_in = token.get("expires_in").and_then(|v| v.as_i64()).unwrap_or(3600);
        let expires_at = Utc::now().timestamp() + expires_in;
        token
            .as_object_mut()
            .ok_or_else(|| auth_error("Token data is not an object"))?
            .insert("expires_at".to_string(), json!(expires_at));

        self.save_token(&token)?;

        let reply =
            tiny_http::Response::from_string("Authorization successful! You can close this window.");
        let _ = request.respond(reply);

        info!("Token saved to {}", self.token_path.display());
        Ok(token)
    }
}

/// A token is fresh while its recorded expiry lies in the future
fn token_is_fresh(token: &Value) -> bool {
    token
        .get("expires_at")
        .and_then(|v| v.as_i64())
        .map(|expiry| expiry > Utc::now().timestamp())
        .unwrap_or(false)
}

fn extract_access_token(token: &Value) -> AppResult<String> {
    token
        .get("access_token")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| auth_error("Token is missing 'access_token' field"))
}

/// Combine a token-endpoint refresh response with the surviving refresh token
fn merge_refreshed_token(new_token: &Value, refresh_token: &str) -> AppResult<Value> {
    let access_token = new_token
        .get("access_token")
        .ok_or_else(|| auth_error("Token response missing 'access_token' field"))?;

    let expires_in = new_token
        .get("expires_in")
        .and_then(|v| v.as_i64())
        .unwrap_or(3600);
    let expires_at = Utc::now().timestamp() + expires_in;

    Ok(json!({
        "access_token": access_token,
        "refresh_token": refresh_token,
        "expires_at": expires_at,
    }))
}

/// Pull one query parameter out of the OAuth callback URL
fn parse_callback_param<'a>(url: &'a str, name: &str) -> Option<&'a str> {
    let query = url.split_once('?').map(|(_, q)| q).unwrap_or(url);
    query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (key == name).then_some(value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_callback_params() {
        let url = "/?state=abc&code=4/0AX4XfWh&scope=calendar";
        assert_eq!(parse_callback_param(url, "code"), Some("4/0AX4XfWh"));
        assert_eq!(parse_callback_param(url, "state"), Some("abc"));
        assert_eq!(parse_callback_param(url, "missing"), None);
        assert_eq!(parse_callback_param("/?state=abc", "code"), None);
    }

    #[test]
    fn test_callback_state_must_match() {
        // A forged callback carrying a different state must not be mistaken
        // for ours; the caller compares against the state it generated
        let url = "/?state=attacker&code=stolen";
        assert_ne!(parse_callback_param(url, "state"), Some("expected"));
        assert_eq!(parse_callback_param(url, "state"), Some("attacker"));
    }

    #[test]
    fn test_token_freshness() {
        let now = Utc::now().timestamp();
        assert!(token_is_fresh(&json!({ "expires_at": now + 600 })));
        assert!(!token_is_fresh(&json!({ "expires_at": now - 600 })));
        assert!(!token_is_fresh(&json!({ "access_token": "x" })));
    }

    #[test]
    fn test_merge_refreshed_token_keeps_refresh_token() {
        let response = json!({ "access_token": "new-access", "expires_in": 3600 });
        let merged = merge_refreshed_token(&response, "old-refresh").unwrap();
        assert_eq!(merged["access_token"], "new-access");
        assert_eq!(merged["refresh_token"], "old-refresh");
        assert!(merged["expires_at"].as_i64().unwrap() > Utc::now().timestamp());
    }

    #[test]
    fn test_merge_requires_access_token() {
        let response = json!({ "expires_in": 3600 });
        assert!(merge_refreshed_token(&response, "old-refresh").is_err());
    }

    #[test]
    fn test_extract_access_token() {
        assert_eq!(
            extract_access_token(&json!({ "access_token": "abc" })).unwrap(),
            "abc"
        );
        assert!(extract_access_token(&json!({})).is_err());
    }
}
