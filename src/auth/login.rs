//! OAuth2 device-code login against the Microsoft identity platform.
//!
//! Flow: request a device code, show the user the verification message,
//! poll the token endpoint at the server-given interval until the user
//! completes sign-in, then return a connected `Connection`.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info};

use super::{Connection, now_secs};
use crate::config::AppConfig;
use crate::error::CommandError;
use crate::request::error_message;

pub const DEFAULT_AUTHORITY: &str = "https://login.microsoftonline.com";

#[derive(Debug, Deserialize)]
struct DeviceCodeResponse {
    device_code: String,
    user_code: String,
    verification_uri: String,
    #[serde(default = "default_interval")]
    interval: u64,
    #[serde(default)]
    message: Option<String>,
}

fn default_interval() -> u64 {
    5
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    grant_type: &'a str,
    client_id: &'a str,
    device_code: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
}

/// Device-code client bound to one authority host (overridable for tests).
pub struct DeviceCodeLogin {
    client: Client,
    authority: String,
}

impl DeviceCodeLogin {
    pub fn new(authority: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            authority: authority.into(),
        }
    }

    /// Run the flow for `resource`, returning the connection to persist.
    pub async fn login(
        &self,
        config: &AppConfig,
        resource: &str,
    ) -> Result<Connection, CommandError> {
        let device_url = format!(
            "{}/{}/oauth2/v2.0/devicecode",
            self.authority, config.tenant_id
        );
        let token_url = format!("{}/{}/oauth2/v2.0/token", self.authority, config.tenant_id);
        let scope = format!("{}/.default offline_access", resource.trim_end_matches('/'));

        let params = [
            ("client_id", config.client_id.as_str()),
            ("scope", scope.as_str()),
        ];
        let resp = self
            .client
            .post(&device_url)
            .form(&params[..])
            .send()
            .await
            .map_err(auth_error)?;
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.map_err(auth_error)?;
            return Err(CommandError::Authentication(error_message(status, &body)));
        }
        let code: DeviceCodeResponse = resp.json().await.map_err(auth_error)?;

        match &code.message {
            Some(msg) => eprintln!("{msg}"),
            None => eprintln!(
                "To sign in, open {} and enter the code {}",
                code.verification_uri, code.user_code
            ),
        }

        let mut interval = code.interval;
        loop {
            sleep(Duration::from_secs(interval)).await;

            let request_body = TokenRequest {
                grant_type: "urn:ietf:params:oauth:grant-type:device_code",
                client_id: &config.client_id,
                device_code: &code.device_code,
            };
            let body = serde_urlencoded::to_string(&request_body)
                .map_err(|e| CommandError::Authentication(e.to_string()))?;

            let resp = self
                .client
                .post(&token_url)
                .header("Content-Type", "application/x-www-form-urlencoded")
                .body(body)
                .send()
                .await
                .map_err(auth_error)?;

            if resp.status().is_success() {
                let token: TokenResponse = resp.json().await.map_err(auth_error)?;
                info!(resource, "signed in");
                return Ok(Connection {
                    refresh_token: token.refresh_token,
                    expires_at: token.expires_in.map(|secs| now_secs() + secs),
                    ..Connection::connected_to(resource.trim_end_matches('/'), token.access_token)
                });
            }

            let status = resp.status().as_u16();
            let text = resp.text().await.map_err(auth_error)?;
            let pending = serde_json::from_str::<TokenErrorResponse>(&text)
                .map(|e| e.error)
                .unwrap_or_default();
            match pending.as_str() {
                "authorization_pending" => debug!("waiting for user sign-in"),
                "slow_down" => interval += 5,
                _ => return Err(CommandError::Authentication(error_message(status, &text))),
            }
        }
    }
}

fn auth_error(err: reqwest::Error) -> CommandError {
    CommandError::Authentication(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config() -> AppConfig {
        AppConfig {
            client_id: "client".into(),
            tenant_id: "contoso".into(),
        }
    }

    async fn mount_device_code(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/contoso/oauth2/v2.0/devicecode"))
            .and(body_string_contains("graph.microsoft.com"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "device_code": "dc",
                "user_code": "UC",
                "verification_uri": "https://microsoft.com/devicelogin",
                "interval": 0,
                "message": "Enter UC"
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn device_code_flow_returns_connection() {
        let server = MockServer::start().await;
        mount_device_code(&server).await;
        Mock::given(method("POST"))
            .and(path("/contoso/oauth2/v2.0/token"))
            .and(body_string_contains("device_code=dc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "ABC",
                "refresh_token": "R",
                "expires_in": 3600,
                "token_type": "Bearer"
            })))
            .mount(&server)
            .await;

        let login = DeviceCodeLogin::new(server.uri());
        let conn = login
            .login(&config(), "https://graph.microsoft.com")
            .await
            .unwrap();
        assert!(conn.connected);
        assert_eq!(conn.resource.as_deref(), Some("https://graph.microsoft.com"));
        assert_eq!(conn.access_token.as_deref(), Some("ABC"));
        assert!(conn.token_valid());
    }

    #[tokio::test]
    async fn declined_sign_in_is_auth_error() {
        let server = MockServer::start().await;
        mount_device_code(&server).await;
        Mock::given(method("POST"))
            .and(path("/contoso/oauth2/v2.0/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": "authorization_declined",
                "error_description": "The user declined"
            })))
            .mount(&server)
            .await;

        let login = DeviceCodeLogin::new(server.uri());
        let err = login
            .login(&config(), "https://graph.microsoft.com")
            .await
            .unwrap_err();
        assert_eq!(
            err,
            CommandError::Authentication("The user declined".into())
        );
    }
}
